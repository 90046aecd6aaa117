use crate::state::detail::DetailState;
use crate::state::entity::{Entity, EntityKind, with_entity};
use crate::state::filters::{self, FilterSlot, Filters};
use crate::state::form::{FieldKind, FormState};
use crate::state::list::ListState;
use crate::state::memo::Memo;
use tourney_api::client::{ApiResult, TourneyApi};
use tourney_api::{Game, Identifiable, Player, Team, Tournament, TournamentPlayer, TournamentTeam};

/// Everything one entity's screens hold: the list controller, the detail
/// view, the create form and the filter/selection state of the list page.
#[derive(Debug)]
pub struct Page<T> {
    pub list: ListState<T>,
    pub detail: DetailState<T>,
    pub form: Option<FormState>,
    pub filters: Filters,
    selected: Option<u64>,
    projection: Memo<(u64, Filters), Vec<T>>,
}

impl<T: Entity> Page<T> {
    pub fn new(api: &TourneyApi) -> Self {
        Self {
            list: ListState::for_resource(api),
            detail: DetailState::default(),
            form: None,
            filters: Filters::default(),
            selected: None,
            projection: Memo::default(),
        }
    }

    /// Filtered, sorted items; `None` until the first fetch lands.
    pub fn visible(&mut self) -> Option<&[T]> {
        let items = self.list.items()?;
        let filters = self.filters;
        let key = (self.list.version(), filters);
        let rows = self.projection.get_or_compute(key, || T::project(items, &filters));
        Some(rows.as_slice())
    }

    #[cfg(test)]
    pub fn projection_computations(&self) -> u64 {
        self.projection.computations()
    }

    fn visible_ids(&mut self) -> Vec<u64> {
        self.visible()
            .map(|rows| rows.iter().map(Identifiable::id).collect())
            .unwrap_or_default()
    }

    /// The selected row, falling back to the first visible one.
    pub fn selected(&mut self) -> Option<u64> {
        let ids = self.visible_ids();
        match self.selected {
            Some(id) if ids.contains(&id) => Some(id),
            _ => {
                self.selected = ids.first().copied();
                self.selected
            }
        }
    }

    pub fn move_selection(&mut self, forward: bool) {
        let ids = self.visible_ids();
        if ids.is_empty() {
            return;
        }
        let position = self.selected.and_then(|id| ids.iter().position(|i| *i == id));
        let next = match (position, forward) {
            (None, _) => 0,
            (Some(p), true) => (p + 1).min(ids.len() - 1),
            (Some(p), false) => p.saturating_sub(1),
        };
        self.selected = Some(ids[next]);
    }

    pub fn set_filter(&mut self, slot: FilterSlot, value: Option<u64>) {
        self.filters.set(slot, value);
    }

    pub fn clear_filters(&mut self) {
        self.filters = Filters::default();
    }

    pub fn open_form(&mut self) {
        if self.form.is_none() {
            self.form = Some(FormState::new(T::FIELDS));
        }
    }

    pub fn close_form(&mut self) {
        self.form = None;
    }

    /// Validate the create form. The validation message stays on the form
    /// when it fails and no request should be sent.
    pub fn submit_form(&mut self) -> Option<T::Draft> {
        let form = self.form.as_mut()?;
        if form.submitting {
            return None;
        }
        match T::draft(form) {
            Ok(draft) => {
                form.error = None;
                form.submitting = true;
                Some(draft)
            }
            Err(message) => {
                form.error = Some(message);
                None
            }
        }
    }

    /// Settle a create. The form closes on success and keeps its input on
    /// failure.
    pub fn finish_create(&mut self, result: ApiResult<T>) {
        let created = result.as_ref().ok().map(Identifiable::id);
        if self.list.finish_create(result) {
            self.form = None;
            self.selected = created;
        } else if let Some(form) = self.form.as_mut() {
            form.submitting = false;
            form.error = self.list.error().map(str::to_string);
        }
    }
}

/// One page per entity plus derivations shared between pages.
#[derive(Debug)]
pub struct Collections {
    pub tournaments: Page<Tournament>,
    pub teams: Page<Team>,
    pub tournament_teams: Page<TournamentTeam>,
    pub players: Page<Player>,
    pub tournament_players: Page<TournamentPlayer>,
    pub games: Page<Game>,
    team_choices: Memo<(u64, Option<u64>), Vec<(u64, String)>>,
}

impl Collections {
    pub fn new(api: &TourneyApi) -> Self {
        Self {
            tournaments: Page::new(api),
            teams: Page::new(api),
            tournament_teams: Page::new(api),
            players: Page::new(api),
            tournament_players: Page::new(api),
            games: Page::new(api),
            team_choices: Memo::default(),
        }
    }

    pub fn page<T: Entity>(&self) -> &Page<T> {
        T::page(self)
    }

    pub fn page_mut<T: Entity>(&mut self) -> &mut Page<T> {
        T::page_mut(self)
    }

    /// (id, label) for every loaded record of `kind`, optionally limited to
    /// the children of `parent`.
    pub fn options(&self, kind: EntityKind, parent: Option<u64>) -> Vec<(u64, String)> {
        with_entity!(kind, E => {
            self.page::<E>()
                .list
                .items()
                .unwrap_or_default()
                .iter()
                .filter(|item| parent.is_none() || item.parent_id() == parent)
                .map(|item| (item.id(), item.label()))
                .collect()
        })
    }

    /// Options of one form field. A dependent field offers nothing until
    /// its parent has a value.
    pub fn field_options(&self, form: &FormState, field: usize) -> Vec<(u64, String)> {
        let Some(spec) = form.specs().get(field) else {
            return Vec::new();
        };
        let FieldKind::Choice(kind) = spec.kind else {
            return Vec::new();
        };
        match spec.narrowed_by {
            Some(parent_field) => match form.choice(parent_field) {
                Some(parent) => self.options(kind, Some(parent)),
                None => Vec::new(),
            },
            None => self.options(kind, None),
        }
    }

    /// Options of a filter control, given the page's current filters.
    pub fn filter_options(&mut self, slot: FilterSlot, current: &Filters) -> Vec<(u64, String)> {
        match slot {
            FilterSlot::Tournament => self.options(EntityKind::Tournaments, None),
            FilterSlot::Team | FilterSlot::AwayTeam => {
                let list = &self.tournament_teams.list;
                let key = (list.version(), current.tournament);
                let items = list.items().unwrap_or_default();
                self.team_choices
                    .get_or_compute(key, || filters::team_choices(items, current.tournament))
                    .clone()
            }
        }
    }

    #[cfg(test)]
    pub fn team_choice_computations(&self) -> u64 {
        self.team_choices.computations()
    }
}
