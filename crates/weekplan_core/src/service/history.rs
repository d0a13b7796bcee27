//! Read-side projections over stored weeks.
//!
//! # Responsibility
//! - Summarize every stored week for the archive view.
//! - Compute progress figures for a single week.
//!
//! # Invariants
//! - Pure functions: input state is never mutated.
//! - Summaries are ordered by week key, most recent first.
//! - Unparseable sleep values and unscored moods are excluded from averages,
//!   never counted as zero.
//! - Sleep entries are read by their leading decimal number, exponent
//!   included (`"1e1ч"` is 10). `Infinity` and values overflowing `f64`
//!   count as unparseable.
//! - Average sleep is shown with one decimal, halves rounded up (`8.25` -> `8.3`).

use crate::model::planner::{Labeled, Mood, PlannerState, Week};
use crate::model::week_key::{WeekKey, DAYS_PER_WEEK};
use once_cell::sync::Lazy;
use regex::Regex;

/// Placeholder shown when an average has no input values.
pub const NO_VALUE: &str = "—";
/// Unit suffix appended to average sleep hours.
pub const SLEEP_UNIT: &str = "ч";

static LEADING_NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?)")
        .expect("valid leading number regex")
});

/// Archive row for one stored week.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekSummary {
    pub week_key: WeekKey,
    pub tasks_done: usize,
    pub tasks_total: usize,
    pub habit_checks_done: usize,
    /// Mean of parseable sleep values, `None` when no day has one.
    pub avg_sleep_hours: Option<f64>,
    /// Mood band of the mean mood score, `None` when no day has a scored mood.
    pub avg_mood: Option<Mood>,
}

impl WeekSummary {
    /// Average sleep rounded to one decimal with unit, e.g. `8.0ч`, or `—`.
    pub fn sleep_label(&self) -> String {
        self.avg_sleep_hours
            .map_or_else(
                || NO_VALUE.to_string(),
                |hours| format!("{:.1}{SLEEP_UNIT}", round_tenths(hours)),
            )
    }

    /// Average mood emoji, or `—`.
    pub fn mood_label(&self) -> &'static str {
        self.avg_mood.map_or(NO_VALUE, Mood::label)
    }
}

/// Progress figures for the week being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekProgress {
    pub tasks_total: usize,
    pub tasks_done: usize,
    /// Rounded share of done tasks, 0 when the week has no tasks.
    pub completion_percent: u8,
    /// Rounded per-day share of done tasks, 0 for days without tasks.
    pub daily_percent: [u8; DAYS_PER_WEEK],
}

/// Summarizes every stored week, most recent first.
pub fn summarize(state: &PlannerState) -> Vec<WeekSummary> {
    state
        .weeks
        .iter()
        .rev()
        .map(|(key, week)| summarize_week(*key, week))
        .collect()
}

/// Summarizes one week.
pub fn summarize_week(week_key: WeekKey, week: &Week) -> WeekSummary {
    let sleep_values: Vec<f64> = week
        .days
        .iter()
        .filter_map(|day| parse_sleep_hours(&day.sleep))
        .collect();
    let mood_scores: Vec<f64> = week
        .days
        .iter()
        .filter_map(|day| day.mood.and_then(Mood::score))
        .map(f64::from)
        .collect();

    WeekSummary {
        week_key,
        tasks_done: week.tasks_done(),
        tasks_total: week.tasks_total(),
        habit_checks_done: week.habit_checks_done(),
        avg_sleep_hours: mean(&sleep_values),
        avg_mood: mean(&mood_scores).map(Mood::from_average),
    }
}

/// Task progress for one week.
pub fn week_progress(week: &Week) -> WeekProgress {
    let mut daily_percent = [0; DAYS_PER_WEEK];
    for (slot, day) in daily_percent.iter_mut().zip(&week.days) {
        *slot = percent(day.tasks_done(), day.tasks.len());
    }
    let tasks_total = week.tasks_total();
    let tasks_done = week.tasks_done();

    WeekProgress {
        tasks_total,
        tasks_done,
        completion_percent: percent(tasks_done, tasks_total),
        daily_percent,
    }
}

/// Parses the leading number of a free-text sleep entry (`"7.5ч"` -> 7.5).
pub fn parse_sleep_hours(raw: &str) -> Option<f64> {
    let captures = LEADING_NUMBER_RE.captures(raw)?;
    captures
        .get(1)?
        .as_str()
        .parse::<f64>()
        .ok()
        .filter(|hours| hours.is_finite())
}

// `{:.1}` alone rounds exact halves to even.
fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn percent(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    ((part as f64 / whole as f64) * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::{parse_sleep_hours, percent, round_tenths};

    #[test]
    fn sleep_parsing_takes_leading_number_only() {
        assert_eq!(parse_sleep_hours("8ч"), Some(8.0));
        assert_eq!(parse_sleep_hours(" 7.5 hours"), Some(7.5));
        assert_eq!(parse_sleep_hours(".5"), Some(0.5));
        assert_eq!(parse_sleep_hours("—"), None);
        assert_eq!(parse_sleep_hours("about 8"), None);
        assert_eq!(parse_sleep_hours(""), None);
    }

    #[test]
    fn sleep_parsing_accepts_exponents_but_not_infinity() {
        assert_eq!(parse_sleep_hours("1e1ч"), Some(10.0));
        assert_eq!(parse_sleep_hours("75E-1"), Some(7.5));
        assert_eq!(parse_sleep_hours("8e"), Some(8.0));
        assert_eq!(parse_sleep_hours("1e400"), None);
        assert_eq!(parse_sleep_hours("Infinity"), None);
    }

    #[test]
    fn tenths_round_halves_up() {
        assert_eq!(format!("{:.1}", round_tenths(8.25)), "8.3");
        assert_eq!(format!("{:.1}", round_tenths(7.25)), "7.3");
        assert_eq!(format!("{:.1}", round_tenths(6.74)), "6.7");
    }

    #[test]
    fn percent_rounds_and_handles_empty() {
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(3, 3), 100);
    }
}
