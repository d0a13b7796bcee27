//! Week-keyed planner store.
//!
//! # Responsibility
//! - Load the planner blob once, migrate it, and hold it in memory.
//! - Switch between weeks, creating new weeks with carried-over habits.
//! - Apply front-end edits to the live week and write through after each one.
//! - Expose calendar notes, theme and onboarding flag.
//!
//! # Invariants
//! - `save()` is the only write path and always writes the whole state.
//! - The live week is flushed into `weeks` before `currentWeekKey` changes.
//! - `currentWeekKey` never points at a missing week.
//! - A blob that failed to decode is copied to `planer_unreadable` before the
//!   first save overwrites it.
//! - Every week in `weeks` is stored under its canonical Monday key.

use crate::migration::migrate;
use crate::migration::stored::StoredState;
use crate::model::planner::{
    Day, Energy, HabitName, HabitTemplate, Mood, PlannerState, Task, Theme, Week,
};
use crate::model::week_key::{format_day_key, parse_calendar_date, WeekKey, DAYS_PER_WEEK};
use crate::repo::state_repo::{
    RepoError, StateRepository, INSTRUCTIONS_SEEN_KEY, PLANNER_STATE_KEY, UNREADABLE_STATE_KEY,
};
use crate::service::history::{summarize, week_progress, WeekProgress, WeekSummary};
use log::{debug, error, info, warn};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Error for week store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Edit requested while no week is selected.
    NoActiveWeek,
    /// Day index outside `0..7`.
    DayOutOfRange(usize),
    /// Task index outside the day's task list.
    TaskOutOfRange { day: usize, index: usize },
    /// Habit index outside the live week's habit list.
    HabitOutOfRange(usize),
    /// Calendar key is not a `YYYY-MM-DD` date.
    InvalidDayKey(String),
    /// State could not be encoded for persistence.
    Encode(serde_json::Error),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoActiveWeek => write!(f, "no week is selected"),
            Self::DayOutOfRange(day) => {
                write!(f, "day index {day} is outside 0..{DAYS_PER_WEEK}")
            }
            Self::TaskOutOfRange { day, index } => {
                write!(f, "task {index} does not exist on day {day}")
            }
            Self::HabitOutOfRange(index) => write!(f, "habit {index} does not exist"),
            Self::InvalidDayKey(raw) => write!(f, "invalid day key `{raw}`"),
            Self::Encode(err) => write!(f, "failed to encode planner state: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encode(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

/// In-memory planner state with write-through persistence.
pub struct WeekStore<R: StateRepository> {
    repo: R,
    state: PlannerState,
    /// Editable copy of `weeks[currentWeekKey]`.
    live: Option<Week>,
    /// Undecodable blob found on load, pending backup.
    unreadable: Option<String>,
}

impl<R: StateRepository> WeekStore<R> {
    /// Loads, migrates and returns the store.
    ///
    /// Never fails: unreadable or undecodable data yields an empty store.
    /// When migration changed the data, the result is written back at once
    /// so legacy fields are never read again.
    pub fn load(repo: R) -> Self {
        let (stored, unreadable) = read_stored_state(&repo);
        let (state, report) = migrate(stored);
        let live = state
            .current_week_key
            .and_then(|key| state.weeks.get(&key).cloned());

        info!(
            "event=store_load module=store status=ok weeks={} current={}",
            state.weeks.len(),
            display_key(state.current_week_key)
        );

        let mut store = Self {
            repo,
            state,
            live,
            unreadable,
        };
        if !report.is_noop() {
            if let Err(err) = store.save() {
                warn!(
                    "event=store_load module=store status=warn reason=migrated_state_not_saved error={}",
                    err
                );
            }
        }
        store
    }

    /// Flushes the live week into `weeks` and writes the whole state.
    pub fn save(&mut self) -> StoreResult<()> {
        if let (Some(key), Some(live)) = (self.state.current_week_key, self.live.as_ref()) {
            self.state.weeks.insert(key, live.clone());
        }

        self.back_up_unreadable()?;

        let blob = serde_json::to_string(&self.state)?;
        if let Err(err) = self.repo.write_blob(PLANNER_STATE_KEY, &blob) {
            error!(
                "event=store_save module=store status=error error={}",
                err
            );
            return Err(err.into());
        }
        debug!(
            "event=store_save module=store status=ok bytes={} weeks={}",
            blob.len(),
            self.state.weeks.len()
        );
        Ok(())
    }

    fn back_up_unreadable(&mut self) -> StoreResult<()> {
        let Some(raw) = self.unreadable.as_deref() else {
            return Ok(());
        };
        self.repo.write_blob(UNREADABLE_STATE_KEY, raw)?;
        warn!(
            "event=store_backup module=store status=ok key={} bytes={}",
            UNREADABLE_STATE_KEY,
            raw.len()
        );
        self.unreadable = None;
        Ok(())
    }

    /// Makes the week containing `raw_date` the live week.
    ///
    /// Blank or unparseable input is a no-op returning `Ok(None)`.
    /// A missing week is created with blank days and habits carried over from
    /// the closest earlier week (or, failing that, from the outgoing week).
    pub fn switch_to(&mut self, raw_date: &str) -> StoreResult<Option<WeekKey>> {
        let raw_date = raw_date.trim();
        if raw_date.is_empty() {
            return Ok(None);
        }
        let Some(key) = WeekKey::parse(raw_date) else {
            warn!(
                "event=week_switch module=store status=skipped reason=unparseable_date input={}",
                raw_date
            );
            return Ok(None);
        };

        self.save()?;

        let week = match self.state.weeks.get(&key) {
            Some(existing) => {
                info!("event=week_switch module=store status=ok mode=open key={key}");
                existing.clone()
            }
            None => {
                let habits = self.carried_over_habits(key);
                info!(
                    "event=week_switch module=store status=ok mode=create key={key} carried_habits={}",
                    habits.len()
                );
                let created = Week::blank(key, habits);
                self.state.weeks.insert(key, created.clone());
                created
            }
        };

        self.live = Some(week);
        self.state.current_week_key = Some(key);
        self.save()?;
        Ok(Some(key))
    }

    /// Removes one week. Removing the live week clears the selection.
    ///
    /// Returns whether a week was stored under `key`.
    pub fn delete_week(&mut self, key: WeekKey) -> StoreResult<bool> {
        let removed = self.state.weeks.remove(&key).is_some();
        if self.state.current_week_key == Some(key) {
            self.state.current_week_key = None;
            self.live = None;
        }
        self.save()?;
        info!("event=week_delete module=store status=ok key={key} removed={removed}");
        Ok(removed)
    }

    /// Habit templates for a newly created week at `key`.
    fn carried_over_habits(&self, key: WeekKey) -> Vec<HabitTemplate> {
        let source = self
            .state
            .weeks
            .range(..key)
            .next_back()
            .map(|(_, week)| week)
            .or(self.live.as_ref());
        source
            .map(|week| week.habits.iter().map(HabitTemplate::carried_over).collect())
            .unwrap_or_default()
    }

    pub fn state(&self) -> &PlannerState {
        &self.state
    }

    pub fn weeks(&self) -> &BTreeMap<WeekKey, Week> {
        &self.state.weeks
    }

    pub fn current_week_key(&self) -> Option<WeekKey> {
        self.state.current_week_key
    }

    pub fn live_week(&self) -> Option<&Week> {
        self.live.as_ref()
    }

    /// Mutable access to the live week; the caller must call `save()` after.
    pub fn live_week_mut(&mut self) -> Option<&mut Week> {
        self.live.as_mut()
    }

    /// Archive view over all stored weeks, most recent first.
    pub fn history(&self) -> Vec<WeekSummary> {
        summarize(&self.state)
    }

    /// Progress figures for the live week.
    pub fn live_progress(&self) -> Option<WeekProgress> {
        self.live.as_ref().map(week_progress)
    }

    // ----- live week edits -----

    /// Appends an empty task to `day` and returns its index.
    pub fn add_task(&mut self, day: usize) -> StoreResult<usize> {
        self.edit_day(day, |slot| {
            slot.tasks.push(Task::default());
            Ok(slot.tasks.len() - 1)
        })
    }

    pub fn set_task_text(&mut self, day: usize, index: usize, text: &str) -> StoreResult<()> {
        self.edit_task(day, index, |task| task.text = text.to_string())
    }

    pub fn set_task_done(&mut self, day: usize, index: usize, done: bool) -> StoreResult<()> {
        self.edit_task(day, index, |task| task.done = done)
    }

    pub fn remove_task(&mut self, day: usize, index: usize) -> StoreResult<Task> {
        self.edit_day(day, |slot| {
            if index >= slot.tasks.len() {
                return Err(StoreError::TaskOutOfRange { day, index });
            }
            Ok(slot.tasks.remove(index))
        })
    }

    pub fn set_energy(&mut self, day: usize, energy: Option<Energy>) -> StoreResult<()> {
        self.edit_day(day, |slot| {
            slot.energy = energy;
            Ok(())
        })
    }

    pub fn set_mood(&mut self, day: usize, mood: Option<Mood>) -> StoreResult<()> {
        self.edit_day(day, |slot| {
            slot.mood = mood;
            Ok(())
        })
    }

    pub fn set_sleep(&mut self, day: usize, sleep: &str) -> StoreResult<()> {
        self.edit_day(day, |slot| {
            slot.sleep = sleep.to_string();
            Ok(())
        })
    }

    pub fn set_note(&mut self, day: usize, note: &str) -> StoreResult<()> {
        self.edit_day(day, |slot| {
            slot.note = note.to_string();
            Ok(())
        })
    }

    /// Appends a habit with all checks cleared and returns its index.
    pub fn add_habit(&mut self, name: HabitName) -> StoreResult<usize> {
        self.edit_live(|week| {
            week.habits.push(HabitTemplate::new(name));
            Ok(week.habits.len() - 1)
        })
    }

    pub fn rename_habit(&mut self, index: usize, name: HabitName) -> StoreResult<()> {
        self.edit_habit(index, |habit| habit.name = name)
    }

    pub fn set_habit_check(&mut self, index: usize, day: usize, checked: bool) -> StoreResult<()> {
        if day >= DAYS_PER_WEEK {
            return Err(StoreError::DayOutOfRange(day));
        }
        self.edit_habit(index, |habit| habit.checks[day] = checked)
    }

    pub fn remove_habit(&mut self, index: usize) -> StoreResult<HabitTemplate> {
        self.edit_live(|week| {
            if index >= week.habits.len() {
                return Err(StoreError::HabitOutOfRange(index));
            }
            Ok(week.habits.remove(index))
        })
    }

    fn edit_live<T>(
        &mut self,
        edit: impl FnOnce(&mut Week) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let week = self.live.as_mut().ok_or(StoreError::NoActiveWeek)?;
        let value = edit(week)?;
        self.save()?;
        Ok(value)
    }

    fn edit_day<T>(
        &mut self,
        day: usize,
        edit: impl FnOnce(&mut Day) -> StoreResult<T>,
    ) -> StoreResult<T> {
        self.edit_live(|week| {
            let slot = week
                .days
                .get_mut(day)
                .ok_or(StoreError::DayOutOfRange(day))?;
            edit(slot)
        })
    }

    fn edit_task(
        &mut self,
        day: usize,
        index: usize,
        edit: impl FnOnce(&mut Task),
    ) -> StoreResult<()> {
        self.edit_day(day, |slot| {
            let task = slot
                .tasks
                .get_mut(index)
                .ok_or(StoreError::TaskOutOfRange { day, index })?;
            edit(task);
            Ok(())
        })
    }

    fn edit_habit(&mut self, index: usize, edit: impl FnOnce(&mut HabitTemplate)) -> StoreResult<()> {
        self.edit_live(|week| {
            let habit = week
                .habits
                .get_mut(index)
                .ok_or(StoreError::HabitOutOfRange(index))?;
            edit(habit);
            Ok(())
        })
    }

    // ----- calendar overlay -----

    /// Note stored for a calendar day, if any.
    pub fn calendar_note(&self, day_key: &str) -> Option<&str> {
        let key = normalize_day_key(day_key).ok()?;
        self.state.calendar.get(&key).map(String::as_str)
    }

    /// Stores a calendar note; blank text deletes the note.
    pub fn set_calendar_note(&mut self, day_key: &str, text: &str) -> StoreResult<()> {
        let key = normalize_day_key(day_key)?;
        if text.trim().is_empty() {
            self.state.calendar.remove(&key);
        } else {
            self.state.calendar.insert(key, text.to_string());
        }
        self.save()
    }

    /// Removes a calendar note. Returns whether one existed.
    pub fn delete_calendar_note(&mut self, day_key: &str) -> StoreResult<bool> {
        let key = normalize_day_key(day_key)?;
        let removed = self.state.calendar.remove(&key).is_some();
        self.save()?;
        Ok(removed)
    }

    pub fn calendar(&self) -> &BTreeMap<String, String> {
        &self.state.calendar
    }

    // ----- preferences -----

    pub fn theme(&self) -> Theme {
        self.state.theme
    }

    pub fn set_theme(&mut self, theme: Theme) -> StoreResult<()> {
        self.state.theme = theme;
        self.save()
    }

    pub fn toggle_theme(&mut self) -> StoreResult<Theme> {
        let theme = self.state.theme.toggled();
        self.set_theme(theme)?;
        Ok(theme)
    }

    /// Whether the onboarding instructions were dismissed before.
    ///
    /// Read failures count as "not seen".
    pub fn instructions_seen(&self) -> bool {
        matches!(
            self.repo.read_blob(INSTRUCTIONS_SEEN_KEY),
            Ok(Some(value)) if value == "true"
        )
    }

    pub fn mark_instructions_seen(&self) -> StoreResult<()> {
        self.repo.write_blob(INSTRUCTIONS_SEEN_KEY, "true")?;
        Ok(())
    }
}

/// Reads the stored blob; the raw text is returned alongside when it failed to decode.
fn read_stored_state(repo: &impl StateRepository) -> (StoredState, Option<String>) {
    let blob = match repo.read_blob(PLANNER_STATE_KEY) {
        Ok(Some(blob)) => blob,
        Ok(None) => return (StoredState::default(), None),
        Err(err) => {
            error!(
                "event=store_load module=store status=error reason=read_failed error={}",
                err
            );
            return (StoredState::default(), None);
        }
    };

    match serde_json::from_str::<Option<StoredState>>(&blob) {
        Ok(stored) => (stored.unwrap_or_default(), None),
        Err(err) => {
            error!(
                "event=store_load module=store status=error reason=decode_failed bytes={} error={}",
                blob.len(),
                err
            );
            (StoredState::default(), Some(blob))
        }
    }
}

fn normalize_day_key(raw: &str) -> StoreResult<String> {
    parse_calendar_date(raw)
        .map(format_day_key)
        .ok_or_else(|| StoreError::InvalidDayKey(raw.to_string()))
}

fn display_key(key: Option<WeekKey>) -> String {
    key.map_or_else(|| "none".to_string(), |key| key.to_string())
}

#[cfg(test)]
mod tests {
    use super::{normalize_day_key, StoreError};

    #[test]
    fn day_keys_are_normalized() {
        assert_eq!(
            normalize_day_key("2024-03-05T10:00:00Z").unwrap(),
            "2024-03-05"
        );
        assert!(matches!(
            normalize_day_key("05.03.2024"),
            Err(StoreError::InvalidDayKey(_))
        ));
    }
}
