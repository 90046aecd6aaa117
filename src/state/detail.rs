use crate::state::entity::Entity;
use crate::state::form::FormState;
use crate::state::list::FetchTicket;
use log::{debug, warn};
use tourney_api::client::ApiResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DetailPhase {
    #[default]
    Idle,
    Loading,
    Viewing,
    Editing,
    NotFound,
    Failed,
}

/// View/edit/delete state for a single record.
#[derive(Debug)]
pub struct DetailState<T> {
    id: Option<u64>,
    phase: DetailPhase,
    record: Option<T>,
    form: Option<FormState>,
    error: Option<String>,
    seq: u64,
    pub saving: bool,
    pub deleting: bool,
}

impl<T> Default for DetailState<T> {
    fn default() -> Self {
        Self {
            id: None,
            phase: DetailPhase::Idle,
            record: None,
            form: None,
            error: None,
            seq: 0,
            saving: false,
            deleting: false,
        }
    }
}

fn capitalized(noun: &str) -> String {
    let mut chars = noun.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl<T: Entity> DetailState<T> {
    pub fn id(&self) -> Option<u64> {
        self.id
    }

    pub fn phase(&self) -> DetailPhase {
        self.phase
    }

    pub fn record(&self) -> Option<&T> {
        self.record.as_ref()
    }

    pub fn form(&self) -> Option<&FormState> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut FormState> {
        self.form.as_mut()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn begin_load(&mut self, id: u64) -> FetchTicket {
        if self.id != Some(id) {
            self.record = None;
            self.form = None;
        }
        self.id = Some(id);
        self.phase = DetailPhase::Loading;
        self.error = None;
        self.saving = false;
        self.deleting = false;
        FetchTicket::issue(&mut self.seq)
    }

    /// Returns `false` when the response belonged to an older load.
    pub fn finish_load(&mut self, ticket: FetchTicket, result: ApiResult<T>) -> bool {
        if !ticket.is_current(self.seq) {
            debug!("discarding stale {} load", T::KIND.noun());
            return false;
        }
        match result {
            Ok(record) => {
                self.record = Some(record);
                self.form = None;
                self.phase = DetailPhase::Viewing;
            }
            Err(err) if err.is_not_found() => {
                self.phase = DetailPhase::NotFound;
                self.error = Some(format!("{} not found.", capitalized(T::KIND.noun())));
            }
            Err(err) => {
                warn!("loading {} failed: {err}", T::KIND.noun());
                self.phase = DetailPhase::Failed;
                self.error = Some(format!(
                    "An unexpected error occurred while fetching the {}.",
                    T::KIND.noun()
                ));
            }
        }
        true
    }

    pub fn detach(&mut self) {
        self.seq += 1;
        if self.phase == DetailPhase::Loading {
            self.phase = DetailPhase::Idle;
        }
    }

    pub fn start_edit(&mut self) {
        if self.phase != DetailPhase::Viewing {
            return;
        }
        if let Some(record) = &self.record {
            self.form = Some(FormState::with_values(T::FIELDS, record.field_values()));
            self.phase = DetailPhase::Editing;
            self.error = None;
        }
    }

    /// Drop the staged edits; nothing is sent.
    pub fn cancel_edit(&mut self) {
        if self.phase == DetailPhase::Editing {
            self.form = None;
            self.phase = DetailPhase::Viewing;
            self.error = None;
        }
    }

    /// Validate the buffers. Returns the record id and the PUT payload, or
    /// leaves the validation message on the form.
    pub fn begin_save(&mut self) -> Option<(u64, T::Draft)> {
        if self.phase != DetailPhase::Editing || self.saving {
            return None;
        }
        let id = self.id?;
        let form = self.form.as_mut()?;
        match T::draft(form) {
            Ok(draft) => {
                form.error = None;
                self.saving = true;
                Some((id, draft))
            }
            Err(message) => {
                form.error = Some(message);
                None
            }
        }
    }

    pub fn finish_save(&mut self, result: ApiResult<T>) {
        self.saving = false;
        match result {
            Ok(record) => {
                self.record = Some(record);
                self.form = None;
                self.phase = DetailPhase::Viewing;
                self.error = None;
            }
            Err(err) => {
                warn!("saving {} failed: {err}", T::KIND.noun());
                self.error = Some(format!("Failed to save the {}", T::KIND.noun()));
            }
        }
    }

    pub fn begin_delete(&mut self) -> Option<u64> {
        if self.record.is_none() || self.deleting {
            return None;
        }
        self.deleting = true;
        self.id
    }

    /// Returns `true` when the record is gone and the page should be left.
    pub fn finish_delete(&mut self, result: ApiResult<()>) -> bool {
        self.deleting = false;
        match result {
            Ok(()) => {
                self.record = None;
                self.form = None;
                self.phase = DetailPhase::Idle;
                true
            }
            Err(err) => {
                warn!("deleting {} failed: {err}", T::KIND.noun());
                self.error = Some(format!("Failed to delete the {}", T::KIND.noun()));
                false
            }
        }
    }
}
