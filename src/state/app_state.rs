use crate::route::Route;
use crate::state::entity::EntityKind;
use crate::state::messages::DeleteOrigin;
use crate::state::page::Collections;
use tourney_api::client::TourneyApi;

/// A delete waiting for the user's yes/no.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingConfirm {
    pub kind: EntityKind,
    pub id: u64,
    pub origin: DeleteOrigin,
}

impl PendingConfirm {
    pub fn prompt(&self) -> &'static str {
        self.kind.delete_prompt()
    }
}

#[derive(Debug)]
pub struct AppState {
    pub route: Route,
    pub show_help: bool,
    pub show_logs: bool,
    pub confirm: Option<PendingConfirm>,
    pub collections: Collections,
}

impl AppState {
    pub fn new(api: &TourneyApi, start_route: Route) -> Self {
        Self {
            route: start_route,
            show_help: false,
            show_logs: false,
            confirm: None,
            collections: Collections::new(api),
        }
    }
}
