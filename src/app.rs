use crate::components::collection::{CollectionView, RowAction, RowActions, render_collection};
use crate::route::Route;
use crate::state::app_settings::AppSettings;
use crate::state::app_state::{AppState, PendingConfirm};
use crate::state::entity::{Entity, EntityKind, with_entity};
use crate::state::filters;
use crate::state::form::FormState;
use crate::state::messages::{DeleteOrigin, NetworkRequest, NetworkResponse};
use crate::state::page::Page;
use log::{info, warn};
use tourney_api::Identifiable;
use tourney_api::client::{ApiError, ApiResult, TourneyApi};

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
}

/// Unwrap a type-erased payload, treating a kind mismatch as an error.
fn typed<P, V>(
    kind: EntityKind,
    result: ApiResult<P>,
    unwrap: impl FnOnce(P) -> Option<V>,
) -> ApiResult<V> {
    result.and_then(|payload| {
        unwrap(payload)
            .ok_or_else(|| ApiError::Other(format!("unexpected payload for {}", kind.segment())))
    })
}

impl App {
    pub fn new(settings: AppSettings, api: &TourneyApi) -> Self {
        log::set_max_level(settings.log_level);
        tui_logger::set_default_level(settings.log_level);

        Self {
            state: AppState::new(api, settings.start_route),
            settings,
        }
    }

    pub fn page<E: Entity>(&self) -> &Page<E> {
        self.state.collections.page::<E>()
    }

    pub fn page_mut<E: Entity>(&mut self) -> &mut Page<E> {
        self.state.collections.page_mut::<E>()
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    /// Leave the current page and start loading `route`.
    pub fn navigate(&mut self, route: Route) -> Vec<NetworkRequest> {
        self.leave();
        info!("navigating to {route}");
        self.state.route = route;
        self.activate()
    }

    /// Issue the loads the current page needs: its own list or record and
    /// the collections its forms and filters choose from.
    pub fn activate(&mut self) -> Vec<NetworkRequest> {
        let route = self.state.route;
        let kind = route.kind();
        let mut requests = Vec::new();

        match route {
            Route::Collection(kind) => requests.push(self.begin_list(kind)),
            Route::Detail(kind, id) => {
                let ticket = with_entity!(kind, E => self.page_mut::<E>().detail.begin_load(id));
                requests.push(NetworkRequest::Get { kind, id, ticket });
            }
        }

        let lookups = with_entity!(kind, E => E::LOOKUPS);
        for lookup in lookups.iter().copied().filter(|l| *l != kind) {
            requests.push(self.begin_list(lookup));
        }
        requests
    }

    fn begin_list(&mut self, kind: EntityKind) -> NetworkRequest {
        let ticket = with_entity!(kind, E => self.page_mut::<E>().list.begin_fetch());
        NetworkRequest::List { kind, ticket }
    }

    /// Responses still in flight for the page being left are dropped.
    fn leave(&mut self) {
        let route = self.state.route;
        let kind = route.kind();
        self.state.confirm = None;
        with_entity!(kind, E => {
            let page = self.page_mut::<E>();
            match route {
                Route::Collection(_) => page.list.detach(),
                Route::Detail(..) => page.detail.detach(),
            }
            for lookup in E::LOOKUPS.iter().copied().filter(|l| *l != kind) {
                with_entity!(lookup, L => self.page_mut::<L>().list.detach());
            }
        });
    }

    pub fn select_tab(&mut self, index: usize) -> Vec<NetworkRequest> {
        match EntityKind::ALL.get(index) {
            Some(kind) => self.navigate(Route::Collection(*kind)),
            None => Vec::new(),
        }
    }

    /// Follow the target of the selected row.
    pub fn open_selected(&mut self) -> Vec<NetworkRequest> {
        let Route::Collection(kind) = self.state.route else {
            return Vec::new();
        };
        let target = with_entity!(kind, E => {
            let selected = self.page_mut::<E>().selected();
            let view = self.collection_view::<E>();
            selected
                .and_then(|id| view.position(id))
                .and_then(|pos| view.rows().get(pos))
                .map(|row| row.target)
        });
        match target {
            Some(route) => self.navigate(route),
            None => Vec::new(),
        }
    }

    /// The rows of a collection page as drawn and as navigated.
    pub fn collection_view<E: Entity>(&mut self) -> CollectionView {
        let delete: RowActions<'_, E> = &|_| vec![RowAction::Delete];
        render_collection(
            self.page_mut::<E>().visible(),
            |item: &E| Route::Detail(E::KIND, item.id()),
            E::cells,
            Some(delete),
            E::KIND.empty_text(),
        )
    }

    pub fn back_to_collection(&mut self) -> Vec<NetworkRequest> {
        match self.state.route {
            Route::Detail(..) => self.navigate(self.state.route.collection()),
            Route::Collection(_) => Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Network responses
    // -----------------------------------------------------------------------

    /// Settle a response; returns follow-up requests (e.g. after a detail
    /// page deleted its record).
    pub fn on_network_response(&mut self, response: NetworkResponse) -> Vec<NetworkRequest> {
        match response {
            NetworkResponse::LoadingStateChanged { .. } => {}
            NetworkResponse::Listed { kind, ticket, result } => {
                with_entity!(kind, E => {
                    let result = typed(kind, result, E::from_records);
                    self.page_mut::<E>().list.finish_fetch(ticket, result);
                });
            }
            NetworkResponse::Fetched { kind, id, ticket, result } => {
                with_entity!(kind, E => {
                    let detail = &mut self.page_mut::<E>().detail;
                    if detail.id() == Some(id) {
                        detail.finish_load(ticket, typed(kind, result, E::from_record));
                    } else {
                        warn!("dropping {} {id}: page changed", kind.noun());
                    }
                });
            }
            NetworkResponse::Created { kind, result } => {
                with_entity!(kind, E => {
                    let result = typed(kind, result, E::from_record);
                    if let Ok(record) = &result {
                        info!("created {} {}", kind.noun(), record.id());
                    }
                    self.page_mut::<E>().finish_create(result);
                });
            }
            NetworkResponse::Updated { kind, id, result } => {
                with_entity!(kind, E => {
                    let detail = &mut self.page_mut::<E>().detail;
                    if detail.id() == Some(id) {
                        detail.finish_save(typed(kind, result, E::from_record));
                    } else {
                        warn!("dropping update for {} {id}: page changed", kind.noun());
                    }
                });
            }
            NetworkResponse::Deleted { kind, id, origin: DeleteOrigin::Collection, result } => {
                with_entity!(kind, E => self.page_mut::<E>().list.finish_delete(id, result));
            }
            NetworkResponse::Deleted { kind, id, origin: DeleteOrigin::Detail, result } => {
                let gone = with_entity!(kind, E => self.page_mut::<E>().detail.finish_delete(result));
                if gone {
                    info!("deleted {} {id}", kind.noun());
                    if self.state.route == Route::Detail(kind, id) {
                        return self.navigate(Route::Collection(kind));
                    }
                }
            }
        }
        Vec::new()
    }

    // -----------------------------------------------------------------------
    // Collection page
    // -----------------------------------------------------------------------

    pub fn move_selection(&mut self, forward: bool) {
        if let Route::Collection(kind) = self.state.route {
            with_entity!(kind, E => self.page_mut::<E>().move_selection(forward));
        }
    }

    pub fn refresh(&mut self) -> Vec<NetworkRequest> {
        self.activate()
    }

    pub fn open_form(&mut self) {
        if let Route::Collection(kind) = self.state.route {
            with_entity!(kind, E => self.page_mut::<E>().open_form());
        }
    }

    /// Cycle the filter bound to `key`. Returns `false` when the page has none.
    pub fn cycle_filter(&mut self, key: char) -> bool {
        let Route::Collection(kind) = self.state.route else {
            return false;
        };
        with_entity!(kind, E => {
            let Some(spec) = E::FILTERS.iter().find(|f| f.key == key) else {
                return false;
            };
            let current = self.page::<E>().filters;
            let options = self.state.collections.filter_options(spec.slot, &current);
            let next = filters::cycle(current.get(spec.slot), &options, true);
            self.page_mut::<E>().set_filter(spec.slot, next);
            true
        })
    }

    pub fn clear_filters(&mut self) {
        if let Route::Collection(kind) = self.state.route {
            with_entity!(kind, E => self.page_mut::<E>().clear_filters());
        }
    }

    // -----------------------------------------------------------------------
    // Forms (create form on a collection page, edit buffers on a detail page)
    // -----------------------------------------------------------------------

    pub fn active_form(&self) -> Option<&FormState> {
        let route = self.state.route;
        with_entity!(route.kind(), E => {
            let page = self.page::<E>();
            match route {
                Route::Collection(_) => page.form.as_ref(),
                Route::Detail(..) => page.detail.form(),
            }
        })
    }

    pub fn active_form_mut(&mut self) -> Option<&mut FormState> {
        let route = self.state.route;
        with_entity!(route.kind(), E => {
            let page = self.page_mut::<E>();
            match route {
                Route::Collection(_) => page.form.as_mut(),
                Route::Detail(..) => page.detail.form_mut(),
            }
        })
    }

    pub fn cycle_choice(&mut self, forward: bool) {
        let Some(form) = self.active_form() else {
            return;
        };
        let options = self.state.collections.field_options(form, form.focus());
        if let Some(form) = self.active_form_mut() {
            form.cycle_choice(&options, forward);
        }
    }

    /// Submit the open form: create on a collection page, save on a detail
    /// page. Nothing is sent when validation fails.
    pub fn submit_form(&mut self) -> Vec<NetworkRequest> {
        let route = self.state.route;
        with_entity!(route.kind(), E => {
            let page = self.page_mut::<E>();
            match route {
                Route::Collection(_) => page
                    .submit_form()
                    .map(|draft| NetworkRequest::Create { draft: E::into_draft(draft) }),
                Route::Detail(..) => page
                    .detail
                    .begin_save()
                    .map(|(id, draft)| NetworkRequest::Update { id, draft: E::into_draft(draft) }),
            }
        })
        .into_iter()
        .collect()
    }

    /// Close the create form or abandon the edit.
    pub fn cancel_form(&mut self) {
        let route = self.state.route;
        with_entity!(route.kind(), E => {
            let page = self.page_mut::<E>();
            match route {
                Route::Collection(_) => page.close_form(),
                Route::Detail(..) => page.detail.cancel_edit(),
            }
        });
    }

    pub fn start_edit(&mut self) {
        if let Route::Detail(kind, _) = self.state.route {
            with_entity!(kind, E => self.page_mut::<E>().detail.start_edit());
        }
    }

    // -----------------------------------------------------------------------
    // Delete confirmation
    // -----------------------------------------------------------------------

    pub fn request_delete(&mut self) {
        let route = self.state.route;
        let target = match route {
            Route::Collection(kind) => with_entity!(kind, E => self.page_mut::<E>().selected())
                .map(|id| (id, DeleteOrigin::Collection)),
            Route::Detail(kind, id) => with_entity!(kind, E => self.page::<E>().detail.record().is_some())
                .then_some((id, DeleteOrigin::Detail)),
        };
        self.state.confirm =
            target.map(|(id, origin)| PendingConfirm { kind: route.kind(), id, origin });
    }

    pub fn confirm_delete(&mut self) -> Vec<NetworkRequest> {
        let Some(PendingConfirm { kind, id, origin }) = self.state.confirm.take() else {
            return Vec::new();
        };
        let proceed = with_entity!(kind, E => {
            let page = self.page_mut::<E>();
            match origin {
                DeleteOrigin::Collection => {
                    page.list.begin_delete(id);
                    true
                }
                DeleteOrigin::Detail => page.detail.begin_delete().is_some(),
            }
        });
        if proceed {
            vec![NetworkRequest::Delete { kind, id, origin }]
        } else {
            Vec::new()
        }
    }

    pub fn cancel_confirm(&mut self) {
        self.state.confirm = None;
    }

    // -----------------------------------------------------------------------
    // Chrome
    // -----------------------------------------------------------------------

    pub fn toggle_help(&mut self) {
        self.state.show_help = !self.state.show_help;
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::detail::DetailPhase;
    use crate::state::entity::{Draft, Record, Records};
    use crate::state::list::FetchTicket;
    use crate::state::network::execute;
    use tourney_api::{Team, Tournament};

    const JSON: (&str, &str) = ("content-type", "application/json");

    fn app_at(route: Route) -> App {
        let settings = AppSettings { start_route: route, ..AppSettings::default() };
        App::new(settings, &TourneyApi::new())
    }

    fn list_ticket(requests: &[NetworkRequest], wanted: EntityKind) -> FetchTicket {
        requests
            .iter()
            .find_map(|r| match r {
                NetworkRequest::List { kind, ticket } if *kind == wanted => Some(*ticket),
                _ => None,
            })
            .expect("list request issued")
    }

    fn team(id: u64, name: &str) -> Team {
        Team { id, name: name.into() }
    }

    /// Run requests against `api` the way the network worker does and feed
    /// every response back, including follow-up requests.
    async fn settle(app: &mut App, api: &TourneyApi, mut requests: Vec<NetworkRequest>) {
        while let Some(request) = requests.pop() {
            let response = execute(api.clone(), request).await;
            requests.extend(app.on_network_response(response));
        }
    }

    fn served_app(api: &TourneyApi, route: Route) -> App {
        let settings = AppSettings { start_route: route, ..AppSettings::default() };
        App::new(settings, api)
    }

    #[test]
    fn activating_games_loads_lookups_too() {
        let mut app = app_at(Route::Collection(EntityKind::Games));
        let kinds: Vec<EntityKind> = app
            .activate()
            .iter()
            .filter_map(|r| match r {
                NetworkRequest::List { kind, .. } => Some(*kind),
                _ => None,
            })
            .collect();
        assert_eq!(
            kinds,
            vec![EntityKind::Games, EntityKind::Tournaments, EntityKind::TournamentTeams]
        );
    }

    #[test]
    fn response_for_a_left_page_is_dropped() {
        let mut app = app_at(Route::Collection(EntityKind::Teams));
        let requests = app.activate();
        let ticket = list_ticket(&requests, EntityKind::Teams);

        app.navigate(Route::Collection(EntityKind::Players));
        app.on_network_response(NetworkResponse::Listed {
            kind: EntityKind::Teams,
            ticket,
            result: Ok(Records::Teams(vec![team(1, "Lions")])),
        });
        assert!(app.page::<Team>().list.items().is_none());
    }

    #[test]
    fn create_form_round_trip() {
        let mut app = app_at(Route::Collection(EntityKind::Teams));
        let ticket = list_ticket(&app.activate(), EntityKind::Teams);
        app.on_network_response(NetworkResponse::Listed {
            kind: EntityKind::Teams,
            ticket,
            result: Ok(Records::Teams(vec![team(1, "Lions")])),
        });

        app.open_form();
        assert!(app.submit_form().is_empty());
        for ch in "Tigers".chars() {
            app.active_form_mut().unwrap().insert_char(ch);
        }
        let requests = app.submit_form();
        assert!(matches!(
            requests.as_slice(),
            [NetworkRequest::Create { draft: Draft::Team(d) }] if d.name == "Tigers"
        ));

        app.on_network_response(NetworkResponse::Created {
            kind: EntityKind::Teams,
            result: Ok(Record::Team(team(2, "Tigers"))),
        });
        assert!(app.active_form().is_none());
        assert_eq!(
            app.page::<Team>().list.items(),
            Some(&[team(1, "Lions"), team(2, "Tigers")][..])
        );
    }

    #[test]
    fn collection_delete_needs_confirmation() {
        let mut app = app_at(Route::Collection(EntityKind::Teams));
        let ticket = list_ticket(&app.activate(), EntityKind::Teams);
        app.on_network_response(NetworkResponse::Listed {
            kind: EntityKind::Teams,
            ticket,
            result: Ok(Records::Teams(vec![team(1, "Lions"), team(2, "Tigers")])),
        });

        app.request_delete();
        let confirm = app.state.confirm.expect("prompt shown");
        assert_eq!(confirm.prompt(), "Are you sure you want to delete this team?");

        app.cancel_confirm();
        assert!(app.confirm_delete().is_empty());

        app.request_delete();
        let requests = app.confirm_delete();
        assert!(matches!(
            requests.as_slice(),
            [NetworkRequest::Delete { id: 1, origin: DeleteOrigin::Collection, .. }]
        ));
        assert_eq!(app.page::<Team>().list.items(), Some(&[team(2, "Tigers")][..]));

        app.on_network_response(NetworkResponse::Deleted {
            kind: EntityKind::Teams,
            id: 1,
            origin: DeleteOrigin::Collection,
            result: Err(ApiError::Other("500".into())),
        });
        assert_eq!(app.page::<Team>().list.items().map(<[Team]>::len), Some(2));
    }

    #[test]
    fn deleting_from_detail_returns_to_collection() {
        let mut app = app_at(Route::Detail(EntityKind::Teams, 3));
        let requests = app.activate();
        let ticket = requests
            .iter()
            .find_map(|r| match r {
                NetworkRequest::Get { ticket, .. } => Some(*ticket),
                _ => None,
            })
            .unwrap();
        app.on_network_response(NetworkResponse::Fetched {
            kind: EntityKind::Teams,
            id: 3,
            ticket,
            result: Ok(Record::Team(team(3, "Bears"))),
        });
        assert_eq!(app.page::<Team>().detail.phase(), DetailPhase::Viewing);

        app.request_delete();
        let requests = app.confirm_delete();
        assert_eq!(requests.len(), 1);

        let follow_up = app.on_network_response(NetworkResponse::Deleted {
            kind: EntityKind::Teams,
            id: 3,
            origin: DeleteOrigin::Detail,
            result: Ok(()),
        });
        assert_eq!(app.state.route, Route::Collection(EntityKind::Teams));
        assert!(matches!(
            follow_up.as_slice(),
            [NetworkRequest::List { kind: EntityKind::Teams, .. }]
        ));
    }

    #[test]
    fn tournament_filter_cycles_and_resets_team_filters() {
        let mut app = app_at(Route::Collection(EntityKind::Games));
        let requests = app.activate();
        app.on_network_response(NetworkResponse::Listed {
            kind: EntityKind::Tournaments,
            ticket: list_ticket(&requests, EntityKind::Tournaments),
            result: Ok(Records::Tournaments(vec![
                Tournament { id: 1, name: "Cup".into(), year: 2024 },
                Tournament { id: 2, name: "League".into(), year: 2024 },
            ])),
        });

        assert!(app.cycle_filter('t'));
        assert_eq!(app.page::<tourney_api::Game>().filters.tournament, Some(1));

        app.page_mut::<tourney_api::Game>().filters.team = Some(7);
        assert!(app.cycle_filter('t'));
        let filters = app.page::<tourney_api::Game>().filters;
        assert_eq!(filters.tournament, Some(2));
        assert_eq!(filters.team, None);

        assert!(!app.cycle_filter('x'));
        app.clear_filters();
        assert!(app.page::<tourney_api::Game>().filters.is_empty());
    }

    #[test]
    fn enter_follows_the_selected_rows_target() {
        let mut app = app_at(Route::Collection(EntityKind::Teams));
        let ticket = list_ticket(&app.activate(), EntityKind::Teams);
        app.on_network_response(NetworkResponse::Listed {
            kind: EntityKind::Teams,
            ticket,
            result: Ok(Records::Teams(vec![team(1, "Lions"), team(2, "Tigers")])),
        });
        app.move_selection(true);
        app.move_selection(true);

        let view = app.collection_view::<Team>();
        let target = view.rows()[1].target;
        let requests = app.open_selected();
        assert_eq!(app.state.route, target);
        assert_eq!(target, Route::Detail(EntityKind::Teams, 2));
        assert!(matches!(requests.as_slice(), [NetworkRequest::Get { id: 2, .. }]));
    }

    #[test]
    fn record_for_another_detail_page_is_dropped() {
        let mut app = app_at(Route::Detail(EntityKind::Teams, 3));
        let ticket = app
            .activate()
            .iter()
            .find_map(|r| match r {
                NetworkRequest::Get { ticket, .. } => Some(*ticket),
                _ => None,
            })
            .unwrap();
        app.on_network_response(NetworkResponse::Fetched {
            kind: EntityKind::Teams,
            id: 4,
            ticket,
            result: Ok(Record::Team(team(4, "Owls"))),
        });
        let detail = &app.page::<Team>().detail;
        assert_eq!(detail.phase(), DetailPhase::Loading);
        assert!(detail.record().is_none());
    }

    #[tokio::test]
    async fn reload_is_idempotent() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/teams")
            .with_status(200)
            .with_header(JSON.0, JSON.1)
            .with_body(r#"[{"id": 1, "name": "Lions"}, {"id": 2, "name": "Tigers"}]"#)
            .expect(2)
            .create_async()
            .await;

        let api = TourneyApi::with_base_url(server.url());
        let mut app = served_app(&api, Route::Collection(EntityKind::Teams));
        let expected = vec![team(1, "Lions"), team(2, "Tigers")];

        let requests = app.activate();
        settle(&mut app, &api, requests).await;
        assert_eq!(app.page::<Team>().list.items(), Some(&expected[..]));

        let requests = app.refresh();
        assert!(app.page::<Team>().list.loading());
        settle(&mut app, &api, requests).await;
        let list = &app.page::<Team>().list;
        assert_eq!(list.items(), Some(&expected[..]));
        assert!(!list.loading());
        assert!(list.error().is_none());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn lions_and_tigers_scenario() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/teams")
            .with_status(200)
            .with_header(JSON.0, JSON.1)
            .with_body(r#"[{"id": 1, "name": "Lions"}]"#)
            .create_async()
            .await;
        let create = server
            .mock("POST", "/teams")
            .with_status(201)
            .with_header(JSON.0, JSON.1)
            .with_body(r#"{"id": 2, "name": "Tigers"}"#)
            .expect(1)
            .create_async()
            .await;
        server.mock("DELETE", "/teams/1").with_status(500).create_async().await;

        let api = TourneyApi::with_base_url(server.url());
        let mut app = served_app(&api, Route::Collection(EntityKind::Teams));

        let requests = app.activate();
        settle(&mut app, &api, requests).await;
        assert_eq!(app.page::<Team>().list.items(), Some(&[team(1, "Lions")][..]));
        assert!(!app.page::<Team>().list.loading());

        app.open_form();
        for ch in "Tigers".chars() {
            app.active_form_mut().unwrap().insert_char(ch);
        }
        let requests = app.submit_form();
        settle(&mut app, &api, requests).await;
        assert!(app.active_form().is_none());
        assert_eq!(
            app.page::<Team>().list.items(),
            Some(&[team(1, "Lions"), team(2, "Tigers")][..])
        );
        create.assert_async().await;

        app.move_selection(false);
        app.request_delete();
        assert_eq!(
            app.state.confirm,
            Some(PendingConfirm { kind: EntityKind::Teams, id: 1, origin: DeleteOrigin::Collection })
        );
        let requests = app.confirm_delete();
        assert_eq!(app.page::<Team>().list.items(), Some(&[team(2, "Tigers")][..]));
        settle(&mut app, &api, requests).await;

        let list = &app.page::<Team>().list;
        assert_eq!(list.items(), Some(&[team(1, "Lions"), team(2, "Tigers")][..]));
        assert_eq!(list.error(), Some("Failed to delete item 1"));
    }
}
