use crate::state::entity::{Draft, Entity, Record, with_entity};
use crate::state::messages::{NetworkRequest, NetworkResponse};
use futures_util::future::{BoxFuture, FutureExt};
use futures_util::stream::{FuturesUnordered, StreamExt};
use log::{debug, error};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tourney_api::client::{ApiResult, TourneyApi};
use tourney_api::{Game, Player, Team, Tournament, TournamentPlayer, TournamentTeam};

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
pub const ERROR_CHAR: char = '!';

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LoadingState {
    pub is_loading: bool,
    pub spinner_char: char,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self { is_loading: false, spinner_char: ' ' }
    }
}

/// Runs API requests off the UI loop. Requests run concurrently and
/// responses are posted back in completion order.
pub struct NetworkWorker {
    client: TourneyApi,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
    is_loading: Arc<AtomicBool>,
}

impl NetworkWorker {
    pub fn new(
        client: TourneyApi,
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        Self {
            client,
            requests,
            responses,
            is_loading: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn run(mut self) {
        let mut in_flight: FuturesUnordered<BoxFuture<'static, NetworkResponse>> =
            FuturesUnordered::new();
        let mut any_failed = false;

        loop {
            tokio::select! {
                request = self.requests.recv() => {
                    let Some(request) = request else {
                        break;
                    };
                    if in_flight.is_empty() {
                        any_failed = false;
                        self.start_loading_animation().await;
                    }
                    in_flight.push(execute(self.client.clone(), request).boxed());
                }

                Some(response) = in_flight.next(), if !in_flight.is_empty() => {
                    any_failed |= response.is_failure();
                    if in_flight.is_empty() {
                        debug!("network requests settled");
                        self.stop_loading_animation(!any_failed).await;
                    }
                    if let Err(e) = self.responses.send(response).await {
                        error!("Failed to send network response: {e}");
                        break;
                    }
                }
            }
        }
    }

    async fn start_loading_animation(&self) {
        self.is_loading.store(true, Ordering::Relaxed);

        let mut loading_state =
            LoadingState { is_loading: true, spinner_char: SPINNER_CHARS[0] };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged { loading_state })
            .await;

        let responses = self.responses.clone();
        let is_loading = self.is_loading.clone();

        tokio::spawn(async move {
            let mut spinner_index = 1;
            let mut interval = tokio::time::interval(Duration::from_millis(33));
            loop {
                interval.tick().await;
                if !is_loading.load(Ordering::Relaxed) {
                    break;
                }
                loading_state.spinner_char = SPINNER_CHARS[spinner_index];
                spinner_index = (spinner_index + 1) % SPINNER_CHARS.len();
                let _ = responses
                    .send(NetworkResponse::LoadingStateChanged { loading_state })
                    .await;
            }
        });
    }

    async fn stop_loading_animation(&self, is_ok: bool) {
        self.is_loading.store(false, Ordering::Relaxed);
        tokio::time::sleep(Duration::from_millis(15)).await;

        let spinner_char = if is_ok { ' ' } else { ERROR_CHAR };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged {
                loading_state: LoadingState { is_loading: false, spinner_char },
            })
            .await;
    }
}

/// Perform one request and tag the outcome with what it answers.
pub async fn execute(client: TourneyApi, request: NetworkRequest) -> NetworkResponse {
    match request {
        NetworkRequest::List { kind, ticket } => {
            debug!("listing {}", kind.segment());
            let result = with_entity!(kind, E => client.list::<E>().await.map(E::into_records));
            NetworkResponse::Listed { kind, ticket, result }
        }
        NetworkRequest::Get { kind, id, ticket } => {
            debug!("loading {} {id}", kind.noun());
            let result = with_entity!(kind, E => client.get::<E>(id).await.map(E::into_record));
            NetworkResponse::Fetched { kind, id, ticket, result }
        }
        NetworkRequest::Create { draft } => {
            let kind = draft.kind();
            debug!("creating {}", kind.noun());
            let result = match draft {
                Draft::Tournament(d) => create::<Tournament>(&client, &d).await,
                Draft::Team(d) => create::<Team>(&client, &d).await,
                Draft::TournamentTeam(d) => create::<TournamentTeam>(&client, &d).await,
                Draft::Player(d) => create::<Player>(&client, &d).await,
                Draft::TournamentPlayer(d) => create::<TournamentPlayer>(&client, &d).await,
                Draft::Game(d) => create::<Game>(&client, &d).await,
            };
            NetworkResponse::Created { kind, result }
        }
        NetworkRequest::Update { id, draft } => {
            let kind = draft.kind();
            debug!("updating {} {id}", kind.noun());
            let result = match draft {
                Draft::Tournament(d) => update::<Tournament>(&client, id, &d).await,
                Draft::Team(d) => update::<Team>(&client, id, &d).await,
                Draft::TournamentTeam(d) => update::<TournamentTeam>(&client, id, &d).await,
                Draft::Player(d) => update::<Player>(&client, id, &d).await,
                Draft::TournamentPlayer(d) => update::<TournamentPlayer>(&client, id, &d).await,
                Draft::Game(d) => update::<Game>(&client, id, &d).await,
            };
            NetworkResponse::Updated { kind, id, result }
        }
        NetworkRequest::Delete { kind, id, origin } => {
            debug!("deleting {} {id}", kind.noun());
            let result = with_entity!(kind, E => client.delete::<E>(id).await);
            NetworkResponse::Deleted { kind, id, origin, result }
        }
    }
}

async fn create<E: Entity>(client: &TourneyApi, draft: &E::Draft) -> ApiResult<Record> {
    client.create::<E>(draft).await.map(E::into_record)
}

async fn update<E: Entity>(client: &TourneyApi, id: u64, draft: &E::Draft) -> ApiResult<Record> {
    client.update::<E>(id, draft).await.map(E::into_record)
}
