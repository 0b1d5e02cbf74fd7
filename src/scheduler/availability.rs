use crate::model::{LeavePeriod, SubjectKind};
use chrono::{Duration, NaiveDate};
use std::collections::{HashMap, HashSet};

/// Forme du bloc de repos posé autour d'une astreinte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownMode {
    /// `cooldown_days` jours avant et après la date.
    SingleDay,
    /// Ancré sur le samedi : `cooldown_days` jours avant, puis `cooldown_days + 1`
    /// jours à partir du lundi suivant.
    Weekend,
}

/// Dates bloquées par sujet (congés + blocs de repos).
///
/// La disponibilité ne dépend que des blocs enregistrés : vérifier qu'une date n'est
/// pas déjà affectée à quelqu'un d'autre reste à la charge de l'appelant.
#[derive(Debug, Clone)]
pub struct AvailabilityTracker {
    cooldown_days: u32,
    blocked: HashMap<(SubjectKind, String), HashSet<NaiveDate>>,
}

impl AvailabilityTracker {
    pub fn new(cooldown_days: u32) -> Self {
        Self {
            cooldown_days,
            blocked: HashMap::new(),
        }
    }

    pub fn apply_leave(&mut self, periods: &[LeavePeriod]) {
        for period in periods {
            let set = self
                .blocked
                .entry((period.kind, period.name.clone()))
                .or_default();
            set.extend(period.days());
        }
    }

    /// Les blocs de repos ne concernent que les techniciens.
    pub fn add_cooldown(&mut self, technician: &str, anchor: NaiveDate, mode: CooldownMode) {
        let days = i64::from(self.cooldown_days);
        let after = match mode {
            CooldownMode::SingleDay => 1..=days,
            // samedi + dimanche sont l'astreinte elle-même : on repart du lundi
            CooldownMode::Weekend => 2..=days + 2,
        };
        let set = self
            .blocked
            .entry((SubjectKind::Technician, technician.to_string()))
            .or_default();
        set.extend((1..=days).map(|i| anchor - Duration::days(i)));
        set.extend(after.map(|i| anchor + Duration::days(i)));
    }

    pub fn is_available(&self, kind: SubjectKind, name: &str, date: NaiveDate) -> bool {
        self.blocked
            .get(&(kind, name.to_string()))
            .map_or(true, |set| !set.contains(&date))
    }
}
