use crate::scheduler::PlanError;
use chrono::{Duration, NaiveDate};

/// Clé du dimanche de Pâques.
pub const EASTER_KEY: &str = "EASTER";
/// Clé du lundi de Pâques.
pub const EASTER_MONDAY_KEY: &str = "EASTER_MON";

/// Jours fériés fixes (mois, jour). La clé est `MM-DD`.
const FIXED: [(u32, u32); 10] = [
    (1, 1),
    (1, 6),
    (4, 25),
    (5, 1),
    (6, 2),
    (8, 15),
    (11, 1),
    (12, 8),
    (12, 25),
    (12, 26),
];

/// Jour férié daté, avec une clé stable d'une année à l'autre.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Holiday {
    pub date: NaiveDate,
    pub key: String,
}

/// Dimanche de Pâques (comput grégorien anonyme).
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year.rem_euclid(19);
    let b = year.div_euclid(100);
    let c = year.rem_euclid(100);
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15).rem_euclid(30);
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k).rem_euclid(7);
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}

/// Liste triée des jours fériés de `year`.
pub fn compute_holidays(year: i32) -> Result<Vec<Holiday>, PlanError> {
    let mut out = Vec::with_capacity(FIXED.len() + 2);
    for (month, day) in FIXED {
        let date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| PlanError::InvalidDate(format!("{year}-{month:02}-{day:02}")))?;
        out.push(Holiday {
            date,
            key: format!("{month:02}-{day:02}"),
        });
    }

    let easter =
        easter_sunday(year).ok_or_else(|| PlanError::InvalidDate(format!("easter {year}")))?;
    out.push(Holiday {
        date: easter,
        key: EASTER_KEY.to_string(),
    });
    out.push(Holiday {
        date: easter + Duration::days(1),
        key: EASTER_MONDAY_KEY.to_string(),
    });

    out.sort_by_key(|h| h.date);
    Ok(out)
}
