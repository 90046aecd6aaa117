use crate::state::entity::{Draft, EntityKind, Record, Records};
use crate::state::list::FetchTicket;
use crate::state::network::LoadingState;
use crossterm::event::KeyEvent;
use tourney_api::client::ApiResult;

/// Which screen asked for a delete; a detail page navigates away on success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOrigin {
    Collection,
    Detail,
}

#[derive(Debug, Clone)]
pub enum NetworkRequest {
    List { kind: EntityKind, ticket: FetchTicket },
    Get { kind: EntityKind, id: u64, ticket: FetchTicket },
    Create { draft: Draft },
    Update { id: u64, draft: Draft },
    Delete { kind: EntityKind, id: u64, origin: DeleteOrigin },
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    Listed { kind: EntityKind, ticket: FetchTicket, result: ApiResult<Records> },
    Fetched { kind: EntityKind, id: u64, ticket: FetchTicket, result: ApiResult<Record> },
    Created { kind: EntityKind, result: ApiResult<Record> },
    Updated { kind: EntityKind, id: u64, result: ApiResult<Record> },
    Deleted { kind: EntityKind, id: u64, origin: DeleteOrigin, result: ApiResult<()> },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
}

impl NetworkResponse {
    pub fn is_failure(&self) -> bool {
        match self {
            NetworkResponse::LoadingStateChanged { .. } => false,
            NetworkResponse::Listed { result, .. } => result.is_err(),
            NetworkResponse::Fetched { result, .. }
            | NetworkResponse::Created { result, .. }
            | NetworkResponse::Updated { result, .. } => result.is_err(),
            NetworkResponse::Deleted { result, .. } => result.is_err(),
        }
    }
}
