//! Raw persisted shape accepted on load.
//!
//! # Responsibility
//! - Deserialize every historical layout of the planner blob into one struct.
//! - Keep legacy flat fields readable so the migration engine can upgrade them.
//!
//! # Invariants
//! - Week keys stay raw strings here; canonicalization happens in migration.
//! - Nothing in this module is written back; saves use `PlannerState`.

use crate::model::planner::{Day, HabitTemplate, PlannerState, Week};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Planner blob as found in storage, before migration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredState {
    /// Week-keyed mapping (current layout). Keys may be non-Monday dates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weeks: Option<BTreeMap<String, Week>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calendar: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_week_key: Option<String>,

    /// Legacy flat layout: days of the week being edited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<Vec<Day>>,
    /// Legacy flat layout: habits of the week being edited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub habits: Option<Vec<HabitTemplate>>,
    /// Legacy flat layout: raw start date picked for the edited week.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week_start: Option<String>,
    /// Legacy flat layout: archived week snapshots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<ArchivedWeek>>,
}

impl StoredState {
    /// Returns whether any legacy flat field is present.
    pub fn has_legacy_fields(&self) -> bool {
        self.days.is_some()
            || self.habits.is_some()
            || self.week_start.is_some()
            || self.history.is_some()
    }
}

impl From<&PlannerState> for StoredState {
    fn from(state: &PlannerState) -> Self {
        Self {
            weeks: Some(
                state
                    .weeks
                    .iter()
                    .map(|(key, week)| (key.to_string(), week.clone()))
                    .collect(),
            ),
            calendar: Some(state.calendar.clone()),
            theme: serde_json::to_value(state.theme)
                .ok()
                .and_then(|value| value.as_str().map(str::to_string)),
            current_week_key: state.current_week_key.map(|key| key.to_string()),
            ..Self::default()
        }
    }
}

/// Legacy archived snapshot `{weekStart, days, habits}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchivedWeek {
    #[serde(default)]
    pub week_start: Option<String>,
    #[serde(default)]
    pub days: Vec<Day>,
    #[serde(default)]
    pub habits: Vec<HabitTemplate>,
}
