//! Load-time data migration for the planner blob.
//!
//! # Responsibility
//! - Normalize week-keyed mappings to canonical Monday keys.
//! - Upgrade the legacy flat layout (`days`/`habits`/`weekStart` + `history`)
//!   into the week-keyed mapping.
//! - Repair selection and day-count drift left by older versions.
//!
//! # Invariants
//! - Migration is idempotent: migrating its own output changes nothing.
//! - Migration never fails; malformed entries are skipped and counted.
//! - Exact Monday keys win over non-Monday keys mapping to the same week;
//!   among non-Monday keys the lexicographically later one wins.
//! - In the legacy upgrade, the edited week wins over archived snapshots.

pub mod stored;

use crate::model::planner::{Day, HabitTemplate, PlannerState, Theme, Week};
use crate::model::week_key::WeekKey;
use log::{info, warn};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use stored::{ArchivedWeek, StoredState};

/// Layout detected in the persisted blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceLayout {
    /// Nothing recognizable was stored.
    Empty,
    /// Week-keyed mapping.
    Weekly,
    /// Flat current-week fields plus archived snapshots.
    Legacy,
}

/// Counters describing what one migration pass changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationReport {
    pub layout: SourceLayout,
    /// Records moved from a non-canonical key to its Monday key.
    pub moved: usize,
    /// Records discarded because another record won the same Monday key.
    pub collisions: usize,
    /// Entries dropped because their date could not be parsed.
    pub skipped: usize,
    /// Records created from the legacy flat layout.
    pub upgraded: usize,
    /// Weeks whose day sequence was padded or truncated to seven days.
    pub repaired_days: usize,
    /// Whether a dangling `currentWeekKey` was cleared.
    pub cleared_selection: bool,
}

impl MigrationReport {
    fn new(layout: SourceLayout) -> Self {
        Self {
            layout,
            moved: 0,
            collisions: 0,
            skipped: 0,
            upgraded: 0,
            repaired_days: 0,
            cleared_selection: false,
        }
    }

    /// Returns whether the pass left the data untouched.
    pub fn is_noop(&self) -> bool {
        self.layout != SourceLayout::Legacy
            && self.moved == 0
            && self.collisions == 0
            && self.skipped == 0
            && self.repaired_days == 0
            && !self.cleared_selection
    }
}

/// Migrates a raw stored blob into the canonical planner state.
pub fn migrate(stored: StoredState) -> (PlannerState, MigrationReport) {
    let layout = if stored.weeks.is_some() {
        SourceLayout::Weekly
    } else if stored.has_legacy_fields() {
        SourceLayout::Legacy
    } else {
        SourceLayout::Empty
    };
    let mut report = MigrationReport::new(layout);

    let StoredState {
        weeks,
        calendar,
        theme,
        current_week_key,
        days,
        habits,
        week_start,
        history,
    } = stored;

    let (weeks, current_week_key) = match layout {
        SourceLayout::Weekly => {
            let weeks = normalize_week_keys(weeks.unwrap_or_default(), &mut report);
            let current = current_week_key.as_deref().and_then(WeekKey::parse);
            (weeks, current)
        }
        SourceLayout::Legacy => {
            let edited = LegacyWeek {
                week_start,
                days: days.unwrap_or_default(),
                habits: habits.unwrap_or_default(),
            };
            upgrade_legacy_layout(edited, history.unwrap_or_default(), &mut report)
        }
        SourceLayout::Empty => (BTreeMap::new(), None),
    };

    let mut state = PlannerState {
        weeks,
        calendar: calendar.unwrap_or_default(),
        theme: parse_theme(theme.as_deref()),
        current_week_key,
    };
    repair(&mut state, &mut report);

    if !report.is_noop() {
        info!(
            "event=migration module=migration status=ok layout={:?} moved={} collisions={} skipped={} upgraded={} repaired_days={} cleared_selection={}",
            report.layout,
            report.moved,
            report.collisions,
            report.skipped,
            report.upgraded,
            report.repaired_days,
            report.cleared_selection
        );
    }

    (state, report)
}

/// Moves every record to its canonical Monday key.
fn normalize_week_keys(
    raw: BTreeMap<String, Week>,
    report: &mut MigrationReport,
) -> BTreeMap<WeekKey, Week> {
    // Destination -> (record, whether the source key was already exact).
    let mut placed: BTreeMap<WeekKey, (Week, bool)> = BTreeMap::new();

    // BTreeMap iterates in ascending lexicographic key order.
    for (raw_key, week) in raw {
        let Some(key) = WeekKey::parse(&raw_key) else {
            warn!(
                "event=migration_skip module=migration status=skipped reason=unparseable_week_key key={}",
                raw_key
            );
            report.skipped += 1;
            continue;
        };
        let exact = key.is_spelled(&raw_key);
        if !exact {
            report.moved += 1;
        }

        match placed.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert((week, exact));
            }
            Entry::Occupied(mut slot) => {
                report.collisions += 1;
                if !slot.get().1 {
                    slot.insert((week, exact));
                }
            }
        }
    }

    placed
        .into_iter()
        .map(|(key, (week, _))| (key, week))
        .collect()
}

/// Flat current-week fields of the legacy layout.
struct LegacyWeek {
    week_start: Option<String>,
    days: Vec<Day>,
    habits: Vec<HabitTemplate>,
}

/// Builds the week-keyed mapping from the flat legacy layout.
fn upgrade_legacy_layout(
    edited: LegacyWeek,
    history: Vec<ArchivedWeek>,
    report: &mut MigrationReport,
) -> (BTreeMap<WeekKey, Week>, Option<WeekKey>) {
    let mut weeks = BTreeMap::new();
    let mut current = None;

    match edited.week_start.as_deref().map(|raw| (raw, WeekKey::parse(raw))) {
        Some((_, Some(key))) => {
            weeks.insert(
                key,
                Week {
                    days: edited.days,
                    habits: edited.habits,
                },
            );
            report.upgraded += 1;
            current = Some(key);
        }
        Some((raw, None)) => {
            warn!(
                "event=migration_skip module=migration status=skipped reason=unparseable_week_start key={}",
                raw
            );
            report.skipped += 1;
        }
        None => {}
    }

    for archived in history {
        let raw = archived.week_start.unwrap_or_default();
        let Some(key) = WeekKey::parse(&raw) else {
            warn!(
                "event=migration_skip module=migration status=skipped reason=unparseable_archive_week key={}",
                raw
            );
            report.skipped += 1;
            continue;
        };
        match weeks.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(Week {
                    days: archived.days,
                    habits: archived.habits,
                });
                report.upgraded += 1;
            }
            Entry::Occupied(_) => report.collisions += 1,
        }
    }

    (weeks, current)
}

fn repair(state: &mut PlannerState, report: &mut MigrationReport) {
    for (key, week) in state.weeks.iter_mut() {
        if week.normalize_days(*key) {
            report.repaired_days += 1;
        }
    }

    if let Some(key) = state.current_week_key {
        if !state.weeks.contains_key(&key) {
            state.current_week_key = None;
            report.cleared_selection = true;
        }
    }
}

fn parse_theme(raw: Option<&str>) -> Theme {
    match raw {
        Some("dark") => Theme::Dark,
        _ => Theme::Light,
    }
}

#[cfg(test)]
mod tests {
    use super::{migrate, SourceLayout};
    use crate::migration::stored::StoredState;
    use crate::model::planner::Theme;
    use serde_json::json;

    fn stored(value: serde_json::Value) -> StoredState {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn empty_blob_yields_empty_state() {
        let (state, report) = migrate(StoredState::default());
        assert!(state.weeks.is_empty());
        assert_eq!(state.theme, Theme::Light);
        assert_eq!(report.layout, SourceLayout::Empty);
        assert!(report.is_noop());
    }

    #[test]
    fn exact_monday_wins_even_when_processed_first() {
        let (state, report) = migrate(stored(json!({
            "weeks": {
                "2024-01-01": { "days": [], "habits": [{ "name": "monday" }] },
                "2024-01-03": { "days": [], "habits": [{ "name": "wednesday" }] },
                "2024-01-05": { "days": [], "habits": [{ "name": "friday" }] }
            }
        })));
        assert_eq!(state.weeks.len(), 1);
        let week = state.weeks.values().next().unwrap();
        assert_eq!(week.habits[0].name.as_str(), "monday");
        assert_eq!(report.collisions, 2);
        assert_eq!(report.moved, 2);
    }

    #[test]
    fn later_non_canonical_key_wins_without_exact_match() {
        let (state, _) = migrate(stored(json!({
            "weeks": {
                "2024-01-03": { "habits": [{ "name": "wednesday" }] },
                "2024-01-05": { "habits": [{ "name": "friday" }] }
            }
        })));
        let week = state.weeks.values().next().unwrap();
        assert_eq!(week.habits[0].name.as_str(), "friday");
        assert_eq!(state.weeks.keys().next().unwrap().to_string(), "2024-01-01");
    }

    #[test]
    fn unparseable_keys_are_skipped() {
        let (state, report) = migrate(stored(json!({
            "weeks": {
                "garbage": { "days": [] },
                "2024-01-08": { "days": [] }
            }
        })));
        assert_eq!(state.weeks.len(), 1);
        assert_eq!(report.skipped, 1);
    }

    #[test]
    fn dangling_selection_is_cleared() {
        let (state, report) = migrate(stored(json!({
            "weeks": {},
            "currentWeekKey": "2024-01-08"
        })));
        assert_eq!(state.current_week_key, None);
        assert!(report.cleared_selection);
    }

    #[test]
    fn legacy_fields_are_ignored_when_weeks_exist() {
        let (state, report) = migrate(stored(json!({
            "weeks": { "2024-01-08": {} },
            "weekStart": "2023-06-14",
            "days": [],
            "history": []
        })));
        assert_eq!(report.layout, SourceLayout::Weekly);
        assert_eq!(state.weeks.len(), 1);
    }

    #[test]
    fn legacy_current_week_wins_over_archived_snapshot() {
        let (state, report) = migrate(stored(json!({
            "weekStart": "2023-06-14",
            "days": [],
            "habits": [{ "name": "current" }],
            "history": [
                { "weekStart": "2023-06-12", "days": [], "habits": [{ "name": "archived" }] },
                { "weekStart": "not-a-date", "days": [], "habits": [] }
            ],
            "theme": "dark"
        })));
        assert_eq!(state.weeks.len(), 1);
        let week = state.weeks.values().next().unwrap();
        assert_eq!(week.habits[0].name.as_str(), "current");
        assert_eq!(report.collisions, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(state.theme, Theme::Dark);
        assert_eq!(
            state.current_week_key.map(|key| key.to_string()).as_deref(),
            Some("2023-06-12")
        );
    }

    #[test]
    fn legacy_upgrade_keeps_calendar_notes() {
        let (state, report) = migrate(stored(json!({
            "weekStart": "2023-06-12",
            "days": [],
            "habits": [],
            "calendar": { "2023-06-13": "dentist" }
        })));
        assert_eq!(report.layout, SourceLayout::Legacy);
        assert_eq!(state.weeks.len(), 1);
        assert_eq!(
            state.calendar.get("2023-06-13").map(String::as_str),
            Some("dentist")
        );
    }
}
