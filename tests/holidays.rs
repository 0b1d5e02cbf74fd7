#![forbid(unsafe_code)]
use calendrier_astreinte::{compute_holidays, easter_sunday};
use chrono::NaiveDate;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn holidays_2026() {
    let listing = compute_holidays(2026)
        .unwrap()
        .iter()
        .map(|h| format!("{} {} {}", h.date, h.date.format("%a"), h.key))
        .collect::<Vec<_>>()
        .join("\n");
    insta::assert_snapshot!(listing, @r###"
    2026-01-01 Thu 01-01
    2026-01-06 Tue 01-06
    2026-04-05 Sun EASTER
    2026-04-06 Mon EASTER_MON
    2026-04-25 Sat 04-25
    2026-05-01 Fri 05-01
    2026-06-02 Tue 06-02
    2026-08-15 Sat 08-15
    2026-11-01 Sun 11-01
    2026-12-08 Tue 12-08
    2026-12-25 Fri 12-25
    2026-12-26 Sat 12-26
    "###);
}

#[test]
fn easter_dates() {
    assert_eq!(easter_sunday(2024), Some(d(2024, 3, 31)));
    assert_eq!(easter_sunday(2025), Some(d(2025, 4, 20)));
    assert_eq!(easter_sunday(2026), Some(d(2026, 4, 5)));
    assert_eq!(easter_sunday(2027), Some(d(2027, 3, 28)));
    assert_eq!(easter_sunday(2038), Some(d(2038, 4, 25)));
}

#[test]
fn keys_are_stable_across_years() {
    for year in 2024..=2031 {
        let holidays = compute_holidays(year).unwrap();
        assert_eq!(holidays.len(), 12);
        let mut keys: Vec<&str> = holidays.iter().map(|h| h.key.as_str()).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            [
                "01-01",
                "01-06",
                "04-25",
                "05-01",
                "06-02",
                "08-15",
                "11-01",
                "12-08",
                "12-25",
                "12-26",
                "EASTER",
                "EASTER_MON"
            ]
        );
        assert!(holidays.windows(2).all(|w| w[0].date <= w[1].date));
    }
}
