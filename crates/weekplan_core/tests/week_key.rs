use chrono::{Duration, NaiveDate};
use weekplan_core::{canonical_week_key, WeekKey};

#[test]
fn canonical_key_is_idempotent() {
    let mut date = NaiveDate::from_ymd_opt(2023, 12, 1).unwrap();
    for _ in 0..60 {
        let raw = date.format("%Y-%m-%d").to_string();
        let key = canonical_week_key(&raw).unwrap();
        assert_eq!(canonical_week_key(&key).unwrap(), key, "input {raw}");
        date += Duration::days(1);
    }
}

#[test]
fn all_days_of_a_week_share_one_key() {
    let days = [
        "2024-02-26",
        "2024-02-27",
        "2024-02-28",
        "2024-02-29",
        "2024-03-01",
        "2024-03-02",
        "2024-03-03",
    ];
    for raw in days {
        assert_eq!(canonical_week_key(raw).as_deref(), Some("2024-02-26"), "{raw}");
    }
    assert_eq!(canonical_week_key("2024-03-04").as_deref(), Some("2024-03-04"));
}

#[test]
fn week_key_serializes_as_plain_string() {
    let key = WeekKey::parse("2023-06-14").unwrap();
    assert_eq!(serde_json::to_value(key).unwrap(), "2023-06-12");
    let decoded: WeekKey = serde_json::from_value(serde_json::json!("2023-06-12")).unwrap();
    assert_eq!(decoded, key);
}
