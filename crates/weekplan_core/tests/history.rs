use serde_json::json;
use weekplan_core::migration::stored::StoredState;
use weekplan_core::{migrate, summarize, week_progress, Mood, PlannerState, WeekKey};

fn state(value: serde_json::Value) -> PlannerState {
    let stored: StoredState = serde_json::from_value(value).unwrap();
    migrate(stored).0
}

fn day(sleep: &str, mood: &str, tasks: serde_json::Value) -> serde_json::Value {
    json!({ "date": "", "tasks": tasks, "energy": "", "mood": mood, "sleep": sleep, "note": "" })
}

#[test]
fn only_parseable_sleep_values_are_averaged() {
    let planner = state(json!({
        "weeks": {
            "2024-01-01": {
                "days": [
                    day("8ч", "", json!([])),
                    day("—", "", json!([])),
                    day("not a number", "", json!([]))
                ]
            }
        }
    }));

    let summaries = summarize(&planner);
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].avg_sleep_hours, Some(8.0));
    assert_eq!(summaries[0].sleep_label(), "8.0ч");
}

#[test]
fn average_sleep_rounds_halves_up() {
    let planner = state(json!({
        "weeks": {
            "2024-01-01": { "days": [day("8ч", "", json!([])), day("8.5ч", "", json!([]))] },
            "2024-01-08": { "days": [day("7ч", "", json!([])), day("7.5ч", "", json!([]))] }
        }
    }));

    let summaries = summarize(&planner);
    assert_eq!(summaries[0].avg_sleep_hours, Some(7.25));
    assert_eq!(summaries[0].sleep_label(), "7.3ч");
    assert_eq!(summaries[1].avg_sleep_hours, Some(8.25));
    assert_eq!(summaries[1].sleep_label(), "8.3ч");
}

#[test]
fn empty_week_renders_placeholders() {
    let planner = state(json!({ "weeks": { "2024-01-01": {} } }));
    let summary = &summarize(&planner)[0];

    assert_eq!(summary.tasks_total, 0);
    assert_eq!(summary.tasks_done, 0);
    assert_eq!(summary.habit_checks_done, 0);
    assert_eq!(summary.sleep_label(), "—");
    assert_eq!(summary.mood_label(), "—");
}

#[test]
fn summary_counts_tasks_habits_and_mood() {
    let planner = state(json!({
        "weeks": {
            "2024-01-08": {
                "days": [
                    day("7", "🙂", json!([{ "text": "a", "done": true }, { "text": "b", "done": false }])),
                    day("6.4ч", "😐", json!([{ "text": "c", "done": true }])),
                    day("", "😡", json!([])),
                    day("", "😞", json!([]))
                ],
                "habits": [
                    { "name": "💧", "checks": [true, true, true, false, false, false, false] },
                    { "name": "stretch", "checks": [false, false, false, false, false, false, true] }
                ]
            }
        }
    }));

    let summary = &summarize(&planner)[0];
    assert_eq!(summary.week_key, WeekKey::parse("2024-01-08").unwrap());
    assert_eq!(summary.tasks_done, 2);
    assert_eq!(summary.tasks_total, 3);
    assert_eq!(summary.habit_checks_done, 4);
    assert_eq!(summary.sleep_label(), "6.7ч");
    // (4 + 3 + 1) / 3 = 2.67; the unscored angry mood is left out.
    assert_eq!(summary.avg_mood, Some(Mood::Neutral));
    assert_eq!(summary.mood_label(), "😐");
}

#[test]
fn summaries_are_most_recent_first_and_leave_state_untouched() {
    let planner = state(json!({
        "weeks": {
            "2023-12-25": {},
            "2024-01-08": {},
            "2024-01-01": {}
        }
    }));
    let before = planner.clone();

    let keys: Vec<String> = summarize(&planner)
        .iter()
        .map(|summary| summary.week_key.to_string())
        .collect();
    assert_eq!(keys, vec!["2024-01-08", "2024-01-01", "2023-12-25"]);
    assert_eq!(planner, before);
}

#[test]
fn week_progress_reports_daily_percentages() {
    let planner = state(json!({
        "weeks": {
            "2024-01-01": {
                "days": [
                    day("", "", json!([{ "text": "a", "done": true }, { "text": "b", "done": false }])),
                    day("", "", json!([{ "text": "c", "done": true }])),
                    day("", "", json!([{ "text": "d", "done": false }, { "text": "e", "done": false }, { "text": "f", "done": true }]))
                ]
            }
        }
    }));

    let progress = week_progress(planner.weeks.values().next().unwrap());
    assert_eq!(progress.tasks_total, 6);
    assert_eq!(progress.tasks_done, 3);
    assert_eq!(progress.completion_percent, 50);
    assert_eq!(progress.daily_percent, [50, 100, 33, 0, 0, 0, 0]);
}
