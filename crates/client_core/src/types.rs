use std::collections::BTreeMap;

use shared::domain::FieldId;

use crate::bootstrap::Readiness;

/// Read access to the page's input fields.
pub trait FormSource: Send + Sync {
    /// `None` when the field is absent or empty.
    fn read_field(&self, field: FieldId) -> Option<String>;
}

impl FormSource for BTreeMap<FieldId, String> {
    fn read_field(&self, field: FieldId) -> Option<String> {
        self.get(&field).cloned()
    }
}

/// Snapshot of the six form fields taken at the start of an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormValues(BTreeMap<FieldId, String>);

impl FormValues {
    /// Reads every field exactly as entered; missing fields become `""`.
    pub fn collect(source: &dyn FormSource) -> Self {
        Self(
            FieldId::ALL
                .into_iter()
                .map(|field| (field, source.read_field(field).unwrap_or_default()))
                .collect(),
        )
    }

    pub fn get(&self, field: FieldId) -> &str {
        self.0.get(&field).map(String::as_str).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldId, &str)> {
        self.0.iter().map(|(field, value)| (*field, value.as_str()))
    }
}

/// Interactive surface owned by the orchestrator: per-method trigger
/// controls, the response display and the module status indicator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiState {
    controls: BTreeMap<String, bool>,
    display: String,
    readiness: Readiness,
}

impl UiState {
    pub fn new<I, S>(methods: I, display: String) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            controls: methods
                .into_iter()
                .map(|method| (method.into(), false))
                .collect(),
            display,
            readiness: Readiness::Uninitialized,
        }
    }

    pub fn controls(&self) -> impl Iterator<Item = (&str, bool)> {
        self.controls
            .iter()
            .map(|(method, enabled)| (method.as_str(), *enabled))
    }

    /// Unknown controls are reported as disabled.
    pub fn is_enabled(&self, method: &str) -> bool {
        self.controls.get(method).copied().unwrap_or(false)
    }

    pub fn any_enabled(&self) -> bool {
        self.controls.values().any(|enabled| *enabled)
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn readiness(&self) -> Readiness {
        self.readiness
    }

    pub fn status_text(&self) -> &'static str {
        self.readiness.status_text()
    }

    pub(crate) fn set_enabled(&mut self, method: &str, enabled: bool) {
        if let Some(slot) = self.controls.get_mut(method) {
            *slot = enabled;
        }
    }

    pub(crate) fn set_all_enabled(&mut self, enabled: bool) {
        self.controls.values_mut().for_each(|slot| *slot = enabled);
    }

    pub(crate) fn set_display(&mut self, display: String) {
        self.display = display;
    }

    pub(crate) fn set_readiness(&mut self, readiness: Readiness) {
        self.readiness = readiness;
    }
}
