use log::{debug, warn};
use tourney_api::client::{ApiError, ApiResult, TourneyApi};
use tourney_api::{Identifiable, Resource};

/// Tag of an outstanding collection fetch. Only the most recently issued
/// ticket may settle; older ones are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    seq: u64,
}

impl FetchTicket {
    pub(crate) fn issue(counter: &mut u64) -> Self {
        *counter += 1;
        Self { seq: *counter }
    }

    pub(crate) fn is_current(self, counter: u64) -> bool {
        self.seq == counter
    }
}

#[derive(Debug)]
struct PendingDelete<T> {
    id: u64,
    snapshot: Option<Vec<T>>,
}

/// Client-side copy of one REST collection.
///
/// `items` is `None` until the first successful fetch. Every change to it
/// goes through this type: fetch replaces it, create appends one item,
/// delete removes one item and restores the snapshot if the server refuses.
#[derive(Debug)]
pub struct ListState<T> {
    url: String,
    items: Option<Vec<T>>,
    loading: bool,
    error: Option<String>,
    fetch_seq: u64,
    version: u64,
    pending_deletes: Vec<PendingDelete<T>>,
}

impl<T: Identifiable + Clone> ListState<T> {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            items: None,
            loading: false,
            error: None,
            fetch_seq: 0,
            version: 0,
            pending_deletes: Vec::new(),
        }
    }

    pub fn items(&self) -> Option<&[T]> {
        self.items.as_deref()
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Bumped whenever `items` changes; the key for derived projections.
    pub fn version(&self) -> u64 {
        self.version
    }

    // -----------------------------------------------------------------------
    // Fetch
    // -----------------------------------------------------------------------

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.loading = true;
        self.error = None;
        FetchTicket::issue(&mut self.fetch_seq)
    }

    /// Settle a fetch. Returns `false` when the ticket was stale and the
    /// result has been discarded.
    pub fn finish_fetch(&mut self, ticket: FetchTicket, result: ApiResult<Vec<T>>) -> bool {
        if !ticket.is_current(self.fetch_seq) {
            debug!("discarding stale fetch #{} for {}", ticket.seq, self.url);
            return false;
        }

        match result {
            Ok(items) => {
                self.items = Some(items);
                self.version += 1;
            }
            Err(err) => {
                warn!("fetch failed for {}: {err}", self.url);
                self.error = Some(format!("Failed to fetch items from {}", self.url));
            }
        }
        self.loading = false;
        true
    }

    /// Invalidate every outstanding fetch, e.g. when the page is left.
    pub fn detach(&mut self) {
        self.fetch_seq += 1;
        self.loading = false;
    }

    // -----------------------------------------------------------------------
    // Create
    // -----------------------------------------------------------------------

    /// Settle a create request. On failure the list is untouched so the
    /// caller can keep the user's input on screen.
    ///
    /// A reload that settled while the request was in flight may already
    /// hold the new record; it is replaced in place rather than listed twice.
    pub fn finish_create(&mut self, result: ApiResult<T>) -> bool {
        match result {
            Ok(item) => {
                let items = self.items.get_or_insert_with(Vec::new);
                match items.iter_mut().find(|existing| existing.id() == item.id()) {
                    Some(existing) => *existing = item,
                    None => items.push(item),
                }
                self.version += 1;
                self.error = None;
                true
            }
            Err(err) => {
                warn!("create failed at {}: {err}", self.url);
                self.error = Some(create_error_message(&err, &self.url));
                false
            }
        }
    }

    // -----------------------------------------------------------------------
    // Delete
    // -----------------------------------------------------------------------

    /// Remove the item right away and remember how the list looked before.
    pub fn begin_delete(&mut self, id: u64) {
        let snapshot = self.items.clone();
        if let Some(items) = self.items.as_mut() {
            items.retain(|item| item.id() != id);
        }
        self.version += 1;
        self.pending_deletes.push(PendingDelete { id, snapshot });
    }

    /// Confirm the removal, or put the pre-deletion list back verbatim.
    pub fn finish_delete(&mut self, id: u64, result: ApiResult<()>) {
        let pending = self
            .pending_deletes
            .iter()
            .position(|p| p.id == id)
            .map(|idx| self.pending_deletes.remove(idx));

        match result {
            Ok(()) => self.error = None,
            Err(err) => {
                warn!("delete of {id} failed at {}: {err}", self.url);
                self.error = Some(format!("Failed to delete item {id}"));
                if let Some(pending) = pending {
                    self.items = pending.snapshot;
                    self.version += 1;
                }
            }
        }
    }
}

impl<T: Resource + Clone> ListState<T> {
    pub fn for_resource(api: &TourneyApi) -> Self {
        Self::new(api.collection_url::<T>())
    }
}

fn create_error_message(err: &ApiError, url: &str) -> String {
    match err.server_message() {
        Some(message) => message.to_string(),
        None => format!("Failed to create item at {url}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tourney_api::Team;

    fn team(id: u64, name: &str) -> Team {
        Team { id, name: name.to_string() }
    }

    fn loaded(items: Vec<Team>) -> ListState<Team> {
        let mut list = ListState::new("http://api/teams");
        let ticket = list.begin_fetch();
        assert!(list.finish_fetch(ticket, Ok(items)));
        list
    }

    #[test]
    fn starts_unloaded() {
        let list: ListState<Team> = ListState::new("http://api/teams");
        assert!(list.items().is_none());
        assert!(!list.loading());
        assert!(list.error().is_none());
    }

    #[test]
    fn fetch_toggles_loading_and_clears_error() {
        let mut list = loaded(vec![]);
        list.finish_create(Err(ApiError::Other("boom".into())));
        assert!(list.error().is_some());

        let ticket = list.begin_fetch();
        assert!(list.loading());
        assert!(list.error().is_none());

        list.finish_fetch(ticket, Ok(vec![team(1, "Lions")]));
        assert!(!list.loading());
        assert_eq!(list.items(), Some(&[team(1, "Lions")][..]));
    }

    #[test]
    fn failed_first_fetch_leaves_items_unloaded() {
        let mut list: ListState<Team> = ListState::new("http://api/teams");
        let ticket = list.begin_fetch();
        list.finish_fetch(ticket, Err(ApiError::Other("down".into())));
        assert!(list.items().is_none());
        assert!(!list.loading());
        assert_eq!(list.error(), Some("Failed to fetch items from http://api/teams"));
    }

    #[test]
    fn failed_refetch_keeps_previous_items() {
        let mut list = loaded(vec![team(1, "Lions")]);
        let ticket = list.begin_fetch();
        list.finish_fetch(ticket, Err(ApiError::Other("down".into())));
        assert_eq!(list.items(), Some(&[team(1, "Lions")][..]));
        assert!(list.error().is_some());
    }

    #[test]
    fn stale_fetch_is_discarded() {
        let mut list: ListState<Team> = ListState::new("http://api/teams");
        let slow = list.begin_fetch();
        let fresh = list.begin_fetch();

        assert!(list.finish_fetch(fresh, Ok(vec![team(2, "Tigers")])));
        assert!(!list.finish_fetch(slow, Ok(vec![team(1, "Lions")])));
        assert_eq!(list.items(), Some(&[team(2, "Tigers")][..]));
        assert!(!list.loading());
    }

    #[test]
    fn detached_fetch_does_not_write() {
        let mut list: ListState<Team> = ListState::new("http://api/teams");
        let ticket = list.begin_fetch();
        list.detach();
        assert!(!list.loading());
        assert!(!list.finish_fetch(ticket, Ok(vec![team(1, "Lions")])));
        assert!(list.items().is_none());
    }

    #[test]
    fn create_on_unloaded_list_starts_from_empty() {
        let mut list: ListState<Team> = ListState::new("http://api/teams");
        assert!(list.finish_create(Ok(team(5, "Bears"))));
        assert_eq!(list.items(), Some(&[team(5, "Bears")][..]));
    }

    #[test]
    fn failed_create_leaves_items_and_prefers_server_message() {
        let mut list = loaded(vec![team(1, "Lions")]);
        let version = list.version();

        assert!(!list.finish_create(Err(ApiError::Other("boom".into()))));
        assert_eq!(list.error(), Some("Failed to create item at http://api/teams"));
        assert_eq!(list.version(), version);

        let rejected = ApiError::Status {
            status: tourney_api::client::StatusCode::CONFLICT,
            message: Some("Team already exists".into()),
            url: "http://api/teams".into(),
        };
        list.finish_create(Err(rejected));
        assert_eq!(list.error(), Some("Team already exists"));
        assert_eq!(list.items().map(<[Team]>::len), Some(1));
    }

    #[test]
    fn delete_is_optimistic_and_restores_on_failure() {
        let mut list = loaded(vec![team(1, "Lions"), team(2, "Tigers")]);

        list.begin_delete(1);
        assert_eq!(list.items(), Some(&[team(2, "Tigers")][..]));

        list.finish_delete(1, Err(ApiError::Other("500".into())));
        assert_eq!(list.items(), Some(&[team(1, "Lions"), team(2, "Tigers")][..]));
        assert_eq!(list.error(), Some("Failed to delete item 1"));

        // The pending entry is gone: a second settle has no snapshot to restore.
        list.begin_delete(2);
        list.finish_delete(1, Err(ApiError::Other("500".into())));
        assert_eq!(list.items(), Some(&[team(1, "Lions")][..]));
    }

    #[test]
    fn successful_delete_clears_error() {
        let mut list = loaded(vec![team(1, "Lions"), team(2, "Tigers")]);
        list.finish_create(Err(ApiError::Other("boom".into())));

        list.begin_delete(2);
        list.finish_delete(2, Ok(()));
        assert_eq!(list.items(), Some(&[team(1, "Lions")][..]));
        assert!(list.error().is_none());
    }

    #[test]
    fn create_after_a_reload_that_already_has_the_record_keeps_one_copy() {
        let mut list = loaded(vec![team(1, "Lions")]);
        let reload = list.begin_fetch();
        list.finish_fetch(reload, Ok(vec![team(1, "Lions"), team(2, "Tigers")]));

        assert!(list.finish_create(Ok(team(2, "Tigers FC"))));
        let ids: Vec<u64> = list.items().unwrap_or_default().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(list.items().map(|items| items[1].name.as_str()), Some("Tigers FC"));
    }
}
