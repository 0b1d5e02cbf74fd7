use super::util::{weekend_anchor, DateWindow};
use super::{Conflict, ConflictKind, PlanConfig, ValidationWarning};
use crate::model::{AssignmentMap, Counters, DayType, SubjectKind};
use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;

/// Re-vérifie une carte publiée : week-ends scindés, blocs de repos, congés, date imposée.
pub(super) fn audit(config: &PlanConfig, assignments: &AssignmentMap) -> Vec<Conflict> {
    let mut out = Vec::new();
    let cooldown = i64::from(config.options.cooldown_days);

    // week-end : samedi et dimanche au même technicien
    for (date, assignment) in assignments {
        if assignment.day_type != DayType::Weekend || weekend_anchor(*date) != *date {
            continue;
        }
        let sunday = *date + Duration::days(1);
        if let Some(other) = assignments.get(&sunday) {
            if other.technician != assignment.technician {
                out.push(Conflict {
                    technician: assignment.technician.clone(),
                    date: *date,
                    other: Some(sunday),
                    kind: ConflictKind::SplitWeekend,
                });
            }
        }
    }

    // astreintes d'ancrage par technicien, un week-end comptant pour un seul bloc
    let mut anchors: BTreeMap<&str, Vec<(NaiveDate, NaiveDate)>> = BTreeMap::new();
    for (date, assignment) in assignments {
        let span = match assignment.day_type {
            DayType::Holiday => (*date, *date),
            DayType::Weekend => {
                let saturday = weekend_anchor(*date);
                (saturday, saturday + Duration::days(1))
            }
            DayType::Weekday => continue,
        };
        let list = anchors.entry(assignment.technician.as_str()).or_default();
        if list.last() != Some(&span) {
            list.push(span);
        }
    }
    for (technician, spans) in &anchors {
        for pair in spans.windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            if (next.0 - prev.1).num_days() <= cooldown {
                out.push(Conflict {
                    technician: (*technician).to_string(),
                    date: prev.0,
                    other: Some(next.0),
                    kind: ConflictKind::CooldownViolation,
                });
            }
        }
    }

    for period in &config.leave {
        for date in period.days() {
            let Some(assignment) = assignments.get(&date) else {
                continue;
            };
            let hit = match period.kind {
                SubjectKind::Technician => assignment.technician == period.name,
                SubjectKind::Helper => assignment.helper.as_deref() == Some(period.name.as_str()),
            };
            if hit {
                out.push(Conflict {
                    technician: period.name.clone(),
                    date,
                    other: None,
                    kind: ConflictKind::LeaveViolation,
                });
            }
        }
    }

    if let Some(rule) = config.forced_day.as_ref().filter(|r| r.applies_to(config.year)) {
        let holder = assignments.get(&rule.date).map(|a| a.technician.as_str());
        if holder != Some(rule.technician.as_str()) {
            out.push(Conflict {
                technician: rule.technician.clone(),
                date: rule.date,
                other: None,
                kind: ConflictKind::ForcedDayMismatch,
            });
        }
    }

    out
}

/// Une unité par date affectée dans `year`. Chaque membre des rosters apparaît, même à zéro.
pub(super) fn count(
    config: &PlanConfig,
    assignments: &AssignmentMap,
    year: &DateWindow,
) -> (Counters, Counters) {
    let mut technicians: Counters = config.technicians.iter().map(|t| (t.clone(), 0)).collect();
    let mut helpers: Counters = config.helpers.iter().map(|h| (h.clone(), 0)).collect();

    for (_, assignment) in assignments.range(year.start..=year.end) {
        *technicians.entry(assignment.technician.clone()).or_default() += 1;
        if let Some(helper) = &assignment.helper {
            *helpers.entry(helper.clone()).or_default() += 1;
        }
    }
    (technicians, helpers)
}

/// Techniciens du roster dont le total s'écarte de la moyenne au-delà de la tolérance.
pub(super) fn fairness_warnings(config: &PlanConfig, counts: &Counters) -> Vec<ValidationWarning> {
    if config.technicians.is_empty() {
        return Vec::new();
    }
    let total: u32 = config
        .technicians
        .iter()
        .map(|t| counts.get(t).copied().unwrap_or(0))
        .sum();
    let mean = f64::from(total) / config.technicians.len() as f64;

    config
        .technicians
        .iter()
        .filter_map(|name| {
            let count = counts.get(name).copied().unwrap_or(0);
            let deviation = (f64::from(count) - mean).abs();
            (deviation > config.options.fairness_tolerance).then(|| ValidationWarning::Unbalanced {
                name: name.clone(),
                count,
                mean,
            })
        })
        .collect()
}
