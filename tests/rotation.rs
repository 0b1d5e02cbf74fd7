#![forbid(unsafe_code)]
use calendrier_astreinte::scheduler::availability::{AvailabilityTracker, CooldownMode};
use calendrier_astreinte::scheduler::rotation::{round_robin, Pick, RotationState};
use calendrier_astreinte::{DateWindow, LeavePeriod, SubjectKind};
use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn round_robin_wraps_and_skips() {
    assert_eq!(
        round_robin(4, 2, |_| true),
        Some(Pick { winner: 2, next: 3 })
    );
    assert_eq!(
        round_robin(4, 3, |i| i != 3),
        Some(Pick { winner: 0, next: 1 })
    );
    assert_eq!(
        round_robin(4, 1, |i| i == 0),
        Some(Pick { winner: 0, next: 1 })
    );
    assert_eq!(round_robin(4, 0, |_| false), None);
    assert_eq!(round_robin(0, 0, |_| true), None);
}

#[test]
fn round_robin_visits_each_candidate_once() {
    let mut seen = Vec::new();
    let pick = round_robin(5, 3, |i| {
        seen.push(i);
        false
    });
    assert_eq!(pick, None);
    assert_eq!(seen, vec![3, 4, 0, 1, 2]);
}

#[test]
fn rotation_state_tracks_keys() {
    let mut prior = BTreeMap::new();
    prior.insert("01-01".to_string(), 11);
    let mut state = RotationState::new(9, 10, 0, prior);

    assert_eq!(state.main_index(), 1);
    assert_eq!(state.holiday_index("01-01"), 2);
    assert_eq!(state.holiday_index("EASTER"), 0);

    state.advance_holiday_key("EASTER", 8);
    state.advance_main(9);
    state.set_helper_offset(3);

    let (main, holidays) = state.snapshot(2026);
    assert_eq!(main.year, 2026);
    assert_eq!(main.main_index, 0);
    assert_eq!(main.helper_offset, 3);
    assert_eq!(holidays.indices.get("EASTER"), Some(&0));
    assert_eq!(holidays.indices.get("01-01"), Some(&11));
}

#[test]
fn single_day_cooldown_blocks_both_sides() {
    let mut tracker = AvailabilityTracker::new(7);
    let holiday = d(2026, 6, 2);
    tracker.add_cooldown("Likaj", holiday, CooldownMode::SingleDay);

    let tech = SubjectKind::Technician;
    for i in 1..=7 {
        assert!(!tracker.is_available(tech, "Likaj", holiday - Duration::days(i)));
        assert!(!tracker.is_available(tech, "Likaj", holiday + Duration::days(i)));
    }
    assert!(tracker.is_available(tech, "Likaj", holiday));
    assert!(tracker.is_available(tech, "Likaj", holiday - Duration::days(8)));
    assert!(tracker.is_available(tech, "Likaj", holiday + Duration::days(8)));
    assert!(tracker.is_available(tech, "Ferraris", holiday + Duration::days(1)));
}

#[test]
fn weekend_cooldown_starts_on_monday() {
    let mut tracker = AvailabilityTracker::new(7);
    let saturday = d(2026, 3, 14);
    tracker.add_cooldown("Mancin", saturday, CooldownMode::Weekend);

    let tech = SubjectKind::Technician;
    // vendredi précédent et lundi suivant bloqués, week-end lui-même libre
    assert!(!tracker.is_available(tech, "Mancin", d(2026, 3, 13)));
    assert!(!tracker.is_available(tech, "Mancin", d(2026, 3, 7)));
    assert!(tracker.is_available(tech, "Mancin", d(2026, 3, 6)));
    assert!(tracker.is_available(tech, "Mancin", d(2026, 3, 15)));
    assert!(!tracker.is_available(tech, "Mancin", d(2026, 3, 16)));
    assert!(!tracker.is_available(tech, "Mancin", d(2026, 3, 23)));
    assert!(tracker.is_available(tech, "Mancin", d(2026, 3, 24)));
}

#[test]
fn leave_blocks_only_its_subject() {
    let mut tracker = AvailabilityTracker::new(7);
    let period =
        LeavePeriod::new(SubjectKind::Helper, "Mancin", d(2026, 8, 1), d(2026, 8, 3)).unwrap();
    tracker.apply_leave(&[period]);

    assert!(!tracker.is_available(SubjectKind::Helper, "Mancin", d(2026, 8, 2)));
    assert!(tracker.is_available(SubjectKind::Helper, "Mancin", d(2026, 8, 4)));
    // même nom, autre roster
    assert!(tracker.is_available(SubjectKind::Technician, "Mancin", d(2026, 8, 2)));
}

#[test]
fn window_expands_and_snaps_to_weekends() {
    let year = DateWindow::year(2026).unwrap();
    let requested = DateWindow::new(d(2026, 3, 12), d(2026, 3, 14)).unwrap();

    let published = requested.snap_weekends().clamp_to(&year);
    assert_eq!((published.start, published.end), (d(2026, 3, 12), d(2026, 3, 15)));

    // 12 mars - 7 = 5 mars (jeudi) ; 14 mars + 7 = 21 mars (samedi)
    let window = requested.expand(7).snap_weekends().clamp_to(&year);
    assert_eq!((window.start, window.end), (d(2026, 3, 5), d(2026, 3, 22)));

    let edge = DateWindow::new(d(2026, 1, 2), d(2026, 12, 30))
        .unwrap()
        .expand(7)
        .clamp_to(&year);
    assert_eq!((edge.start, edge.end), (year.start, year.end));
    assert_eq!(year.days().count(), 365);

    assert!(DateWindow::new(d(2026, 3, 14), d(2026, 3, 12)).is_err());
}
