//! Planner domain model and its persisted JSON shape.
//!
//! # Responsibility
//! - Define week, day, task and habit records edited by the front-end.
//! - Keep the wire format compatible with data written by older versions
//!   (enum-or-empty strings, free-text habit names, short `checks` arrays).
//!
//! # Invariants
//! - A `Week` created by this crate has exactly `DAYS_PER_WEEK` days.
//! - `HabitTemplate::checks` is index-aligned with `Week::days`.
//! - Day index, not `Day::date`, is the weekday identity.

use crate::model::week_key::{format_day_key, WeekKey, DAYS_PER_WEEK};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Values stored as a fixed label string, with `""` meaning "unset".
pub trait Labeled: Sized + Copy + 'static {
    /// All variants in display order.
    const ALL: &'static [Self];

    /// Stable persisted label.
    fn label(self) -> &'static str;

    /// Parses a persisted label. Unknown labels return `None`.
    fn from_label(value: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|item| item.label() == value)
    }
}

/// Self-reported energy level for a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Energy {
    Low,
    Medium,
    High,
    Peak,
}

impl Labeled for Energy {
    const ALL: &'static [Self] = &[Self::Low, Self::Medium, Self::High, Self::Peak];

    fn label(self) -> &'static str {
        match self {
            Self::Low => "⚡",
            Self::Medium => "⚡⚡",
            Self::High => "⚡⚡⚡",
            Self::Peak => "⚡⚡⚡⚡",
        }
    }
}

/// Self-reported mood for a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mood {
    Happy,
    Neutral,
    Tired,
    Sad,
    Angry,
}

impl Mood {
    /// Numeric score used for weekly averages.
    ///
    /// `Angry` can be recorded but has no score, so it never moves the average.
    pub fn score(self) -> Option<u8> {
        match self {
            Self::Happy => Some(4),
            Self::Neutral => Some(3),
            Self::Tired => Some(2),
            Self::Sad => Some(1),
            Self::Angry => None,
        }
    }

    /// Maps an average score back to the nearest mood band.
    pub fn from_average(score: f64) -> Self {
        if score >= 3.5 {
            Self::Happy
        } else if score >= 2.5 {
            Self::Neutral
        } else if score >= 1.5 {
            Self::Tired
        } else {
            Self::Sad
        }
    }
}

impl Labeled for Mood {
    const ALL: &'static [Self] = &[
        Self::Happy,
        Self::Neutral,
        Self::Angry,
        Self::Sad,
        Self::Tired,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::Happy => "🙂",
            Self::Neutral => "😐",
            Self::Tired => "😴",
            Self::Sad => "😞",
            Self::Angry => "😡",
        }
    }
}

/// Enumerated habit set offered by the habit picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HabitPreset {
    Water,
    Exercise,
    Reading,
    Meditation,
    EarlySleep,
    HealthyFood,
    NoPhone,
}

impl HabitPreset {
    /// Human-readable title for pickers.
    pub fn title(self) -> &'static str {
        match self {
            Self::Water => "water",
            Self::Exercise => "exercise",
            Self::Reading => "reading",
            Self::Meditation => "meditation",
            Self::EarlySleep => "early sleep",
            Self::HealthyFood => "healthy food",
            Self::NoPhone => "no phone",
        }
    }
}

impl Labeled for HabitPreset {
    const ALL: &'static [Self] = &[
        Self::Water,
        Self::Exercise,
        Self::Reading,
        Self::Meditation,
        Self::EarlySleep,
        Self::HealthyFood,
        Self::NoPhone,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::Water => "💧",
            Self::Exercise => "🏃",
            Self::Reading => "📚",
            Self::Meditation => "🧘",
            Self::EarlySleep => "😴",
            Self::HealthyFood => "🥗",
            Self::NoPhone => "📵",
        }
    }
}

/// Habit label: empty, one of the presets, or free text from older data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HabitName {
    #[default]
    Unnamed,
    Preset(HabitPreset),
    Legacy(String),
}

impl HabitName {
    /// Classifies a persisted label.
    pub fn from_label(value: &str) -> Self {
        if value.is_empty() {
            return Self::Unnamed;
        }
        match HabitPreset::from_label(value) {
            Some(preset) => Self::Preset(preset),
            None => Self::Legacy(value.to_string()),
        }
    }

    /// Persisted label (`""` for unnamed).
    pub fn as_str(&self) -> &str {
        match self {
            Self::Unnamed => "",
            Self::Preset(preset) => preset.label(),
            Self::Legacy(text) => text.as_str(),
        }
    }
}

impl Display for HabitName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for HabitName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for HabitName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map_or(Self::Unnamed, |value| Self::from_label(&value)))
    }
}

/// One to-do item of a day.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Task {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub done: bool,
}

/// One of the seven day slots of a week.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Day {
    /// ISO date (`YYYY-MM-DD`) or, for older records, a full timestamp.
    #[serde(default)]
    pub date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tasks: Vec<Task>,
    #[serde(default, with = "label_or_empty")]
    pub energy: Option<Energy>,
    #[serde(default, with = "label_or_empty")]
    pub mood: Option<Mood>,
    /// Free text such as `8ч`; parsed leniently by history aggregation.
    #[serde(default, deserialize_with = "null_as_default")]
    pub sleep: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub note: String,
}

impl Day {
    /// Creates an empty day slot for `date`.
    pub fn blank(date: NaiveDate) -> Self {
        Self {
            date: format_day_key(date),
            ..Self::default()
        }
    }

    pub fn tasks_done(&self) -> usize {
        self.tasks.iter().filter(|task| task.done).count()
    }
}

/// Habit row with one completion flag per weekday.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HabitTemplate {
    #[serde(default)]
    pub name: HabitName,
    #[serde(default, deserialize_with = "checks_from_seq")]
    pub checks: [bool; DAYS_PER_WEEK],
}

impl HabitTemplate {
    pub fn new(name: HabitName) -> Self {
        Self {
            name,
            checks: [false; DAYS_PER_WEEK],
        }
    }

    /// Copy used when a new week inherits this habit: name kept, checks cleared.
    pub fn carried_over(&self) -> Self {
        Self::new(self.name.clone())
    }

    pub fn checks_done(&self) -> usize {
        self.checks.iter().filter(|checked| **checked).count()
    }
}

/// Persisted `{days, habits}` pair for one calendar week.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Week {
    #[serde(default, deserialize_with = "null_as_default")]
    pub days: Vec<Day>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub habits: Vec<HabitTemplate>,
}

impl Week {
    /// Creates seven blank days dated `key + 0..6` and the given habits.
    pub fn blank(key: WeekKey, habits: Vec<HabitTemplate>) -> Self {
        Self {
            days: (0..DAYS_PER_WEEK).map(|i| Day::blank(key.day(i))).collect(),
            habits,
        }
    }

    /// Pads or truncates `days` to exactly one week, dating new slots from `key`.
    ///
    /// Returns whether the sequence changed.
    pub fn normalize_days(&mut self, key: WeekKey) -> bool {
        let original_len = self.days.len();
        self.days.truncate(DAYS_PER_WEEK);
        for index in self.days.len()..DAYS_PER_WEEK {
            self.days.push(Day::blank(key.day(index)));
        }
        original_len != DAYS_PER_WEEK
    }

    pub fn tasks_total(&self) -> usize {
        self.days.iter().map(|day| day.tasks.len()).sum()
    }

    pub fn tasks_done(&self) -> usize {
        self.days.iter().map(Day::tasks_done).sum()
    }

    pub fn habit_checks_done(&self) -> usize {
        self.habits.iter().map(HabitTemplate::checks_done).sum()
    }
}

/// UI color scheme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

/// Root persisted record after migration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerState {
    #[serde(default)]
    pub weeks: BTreeMap<WeekKey, Week>,
    /// Day notes keyed by `YYYY-MM-DD`, independent of week boundaries.
    #[serde(default)]
    pub calendar: BTreeMap<String, String>,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_week_key: Option<WeekKey>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn checks_from_seq<'de, D>(deserializer: D) -> Result<[bool; DAYS_PER_WEEK], D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<Option<bool>>>::deserialize(deserializer)?.unwrap_or_default();
    let mut checks = [false; DAYS_PER_WEEK];
    for (slot, value) in checks.iter_mut().zip(raw) {
        *slot = value.unwrap_or(false);
    }
    Ok(checks)
}

/// Serde adapter for `Option<T: Labeled>` persisted as `""` when unset.
mod label_or_empty {
    use super::Labeled;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S, T>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Labeled,
    {
        serializer.serialize_str(value.map_or("", |item| item.label()))
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Labeled,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.and_then(|value| T::from_label(&value)))
    }
}
