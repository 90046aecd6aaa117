use crate::state::entity::EntityKind;
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Date,
    /// Pick one record of another collection; the value is its id.
    Choice(EntityKind),
}

/// One input of a create form or a detail editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub label: &'static str,
    pub placeholder: &'static str,
    pub kind: FieldKind,
    /// Index of a choice field whose selection narrows this field's options.
    pub narrowed_by: Option<usize>,
}

impl FieldSpec {
    pub const fn text(label: &'static str, placeholder: &'static str) -> Self {
        Self { label, placeholder, kind: FieldKind::Text, narrowed_by: None }
    }

    pub const fn number(label: &'static str, placeholder: &'static str) -> Self {
        Self { label, placeholder, kind: FieldKind::Number, narrowed_by: None }
    }

    pub const fn date(label: &'static str, placeholder: &'static str) -> Self {
        Self { label, placeholder, kind: FieldKind::Date, narrowed_by: None }
    }

    pub const fn choice(label: &'static str, placeholder: &'static str, kind: EntityKind) -> Self {
        Self { label, placeholder, kind: FieldKind::Choice(kind), narrowed_by: None }
    }

    pub const fn narrowed_by(mut self, field: usize) -> Self {
        self.narrowed_by = Some(field);
        self
    }

    pub fn is_choice(&self) -> bool {
        matches!(self.kind, FieldKind::Choice(_))
    }
}

/// Buffers for a set of fields plus the focused one.
#[derive(Debug, Clone)]
pub struct FormState {
    specs: &'static [FieldSpec],
    values: Vec<String>,
    focus: usize,
    pub error: Option<String>,
    pub submitting: bool,
}

impl FormState {
    pub fn new(specs: &'static [FieldSpec]) -> Self {
        Self::with_values(specs, vec![String::new(); specs.len()])
    }

    pub fn with_values(specs: &'static [FieldSpec], mut values: Vec<String>) -> Self {
        values.resize(specs.len(), String::new());
        Self { specs, values, focus: 0, error: None, submitting: false }
    }

    pub fn specs(&self) -> &'static [FieldSpec] {
        self.specs
    }

    pub fn value(&self, field: usize) -> &str {
        self.values.get(field).map(String::as_str).unwrap_or_default()
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn focused_spec(&self) -> Option<&'static FieldSpec> {
        self.specs.get(self.focus)
    }

    pub fn focus_next(&mut self) {
        if !self.specs.is_empty() {
            self.focus = (self.focus + 1) % self.specs.len();
        }
    }

    pub fn focus_prev(&mut self) {
        if !self.specs.is_empty() {
            self.focus = (self.focus + self.specs.len() - 1) % self.specs.len();
        }
    }

    /// Replace every buffer, keeping focus.
    #[cfg(test)]
    pub fn reset_to(&mut self, mut values: Vec<String>) {
        values.resize(self.specs.len(), String::new());
        self.values = values;
        self.error = None;
        self.submitting = false;
    }

    pub fn insert_char(&mut self, ch: char) {
        if self.focused_spec().is_some_and(|s| !s.is_choice()) {
            self.values[self.focus].push(ch);
        }
    }

    pub fn backspace(&mut self) {
        if self.focused_spec().is_some_and(|s| !s.is_choice()) {
            self.values[self.focus].pop();
        }
    }

    /// Set a field, clearing the choice fields that depend on it.
    pub fn set_value(&mut self, field: usize, value: String) {
        if field >= self.values.len() || self.values[field] == value {
            return;
        }
        self.values[field] = value;
        for (idx, spec) in self.specs.iter().enumerate() {
            if spec.narrowed_by == Some(field) {
                self.values[idx].clear();
            }
        }
    }

    /// Step the focused choice field through `options` (id, label).
    pub fn cycle_choice(&mut self, options: &[(u64, String)], forward: bool) {
        if options.is_empty() || !self.focused_spec().is_some_and(FieldSpec::is_choice) {
            return;
        }
        let current = self.choice(self.focus);
        let position = current.and_then(|id| options.iter().position(|(opt, _)| *opt == id));
        let next = match (position, forward) {
            (None, true) => 0,
            (None, false) => options.len() - 1,
            (Some(p), true) => (p + 1) % options.len(),
            (Some(p), false) => (p + options.len() - 1) % options.len(),
        };
        self.set_value(self.focus, options[next].0.to_string());
    }

    // -----------------------------------------------------------------------
    // Typed reads used when building payloads
    // -----------------------------------------------------------------------

    pub fn text(&self, field: usize) -> &str {
        self.value(field).trim()
    }

    pub fn choice(&self, field: usize) -> Option<u64> {
        self.text(field).parse().ok()
    }

    pub fn number<N: std::str::FromStr>(&self, field: usize) -> Option<N> {
        self.text(field).parse().ok()
    }

    /// `Ok(None)` for an empty field, `Err` for text that is not a date.
    pub fn date(&self, field: usize) -> Result<Option<NaiveDate>, chrono::ParseError> {
        let raw = self.text(field);
        if raw.is_empty() {
            return Ok(None);
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").map(Some)
    }
}
