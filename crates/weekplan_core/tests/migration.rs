use serde_json::json;
use weekplan_core::migration::stored::StoredState;
use weekplan_core::{migrate, SourceLayout};

fn stored(value: serde_json::Value) -> StoredState {
    serde_json::from_value(value).unwrap()
}

fn day(date: &str, task: &str) -> serde_json::Value {
    json!({
        "date": date,
        "tasks": [{ "text": task, "done": true }],
        "energy": "⚡⚡",
        "mood": "🙂",
        "sleep": "7ч",
        "note": ""
    })
}

#[test]
fn legacy_layout_upgrades_to_monday_keys() {
    let (state, report) = migrate(stored(json!({
        "weekStart": "2023-06-14",
        "days": [day("2023-06-14T00:00:00.000Z", "current")],
        "habits": [{ "name": "💧", "checks": [true, false, false, false, false, false, false] }],
        "history": [{
            "weekStart": "2023-06-07",
            "days": [day("2023-06-07T00:00:00.000Z", "archived")],
            "habits": [{ "name": "read", "checks": [] }]
        }],
        "calendar": { "2023-06-20": "dentist" },
        "theme": "dark"
    })));

    assert_eq!(report.layout, SourceLayout::Legacy);
    assert_eq!(report.upgraded, 2);

    let keys: Vec<String> = state.weeks.keys().map(|key| key.to_string()).collect();
    assert_eq!(keys, vec!["2023-06-05", "2023-06-12"]);

    let current = &state.weeks[&weekplan_core::WeekKey::parse("2023-06-12").unwrap()];
    assert_eq!(current.days[0].tasks[0].text, "current");
    assert_eq!(current.habits[0].name.as_str(), "💧");
    assert!(current.habits[0].checks[0]);

    let archived = &state.weeks[&weekplan_core::WeekKey::parse("2023-06-05").unwrap()];
    assert_eq!(archived.days[0].tasks[0].text, "archived");
    assert_eq!(archived.habits[0].name.as_str(), "read");

    assert_eq!(state.calendar.get("2023-06-20").map(String::as_str), Some("dentist"));
}

#[test]
fn upgraded_state_no_longer_carries_flat_fields() {
    let (state, _) = migrate(stored(json!({
        "weekStart": "2023-06-14",
        "days": [],
        "habits": [],
        "history": []
    })));

    let written = serde_json::to_value(&state).unwrap();
    let object = written.as_object().unwrap();
    for legacy_field in ["days", "habits", "weekStart", "history"] {
        assert!(!object.contains_key(legacy_field), "{legacy_field} still present");
    }
    assert_eq!(written["currentWeekKey"], "2023-06-12");
}

#[test]
fn migrating_own_output_is_identity() {
    let inputs = [
        json!({
            "weeks": {
                "2024-01-03": { "days": [day("2024-01-03", "a")], "habits": [] },
                "2024-01-01": { "days": [day("2024-01-01", "b")], "habits": [] },
                "2024-01-10": { "days": [], "habits": [{ "name": "🧘" }] },
                "junk": { "days": [] }
            },
            "currentWeekKey": "2024-01-10"
        }),
        json!({
            "weekStart": "2023-06-14",
            "days": [day("2023-06-14", "x")],
            "habits": [{ "name": "stretch" }],
            "history": [{ "weekStart": "2023-06-15", "days": [], "habits": [] }]
        }),
        json!({}),
    ];

    for input in inputs {
        let (first, _) = migrate(stored(input));
        let reencoded: StoredState =
            serde_json::from_value(serde_json::to_value(&first).unwrap()).unwrap();
        let (second, report) = migrate(reencoded);
        assert_eq!(second, first);
        assert!(report.is_noop(), "{report:?}");

        let (third, _) = migrate(StoredState::from(&second));
        assert_eq!(third, first);
    }
}

#[test]
fn normalization_keeps_exact_monday_and_canonical_selection() {
    let (state, _) = migrate(stored(json!({
        "weeks": {
            "2024-01-01": { "habits": [{ "name": "exact" }] },
            "2024-01-07": { "habits": [{ "name": "sunday" }] }
        },
        "currentWeekKey": "2024-01-04"
    })));

    assert_eq!(state.weeks.len(), 1);
    let (key, week) = state.weeks.iter().next().unwrap();
    assert_eq!(key.to_string(), "2024-01-01");
    assert_eq!(week.habits[0].name.as_str(), "exact");
    assert_eq!(week.days.len(), 7);
    assert_eq!(state.current_week_key, Some(*key));
}
