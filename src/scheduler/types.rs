use crate::model::{ForcedDayRule, LeavePeriod, SubjectKind};
use chrono::{Datelike, NaiveDate, Weekday};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use thiserror::Error;

/// Options de génération
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct PlanOptions {
    /// Jours bloqués avant et après une astreinte de week-end ou de jour férié.
    pub cooldown_days: u32,
    /// Écart toléré entre le total d'un technicien et la moyenne du roster.
    pub fairness_tolerance: f64,
    /// Un jour férié fait aussi avancer la rotation principale.
    pub couple_main_to_holidays: bool,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            cooldown_days: 7,
            fairness_tolerance: 2.0,
            couple_main_to_holidays: true,
        }
    }
}

/// Entrée complète d'une génération ou d'une régénération partielle.
///
/// Construite à neuf pour chaque appel et jamais modifiée ensuite.
#[derive(Debug, Clone, Default)]
pub struct PlanConfig {
    pub year: i32,
    /// Ordre de rotation des techniciens.
    pub technicians: Vec<String>,
    /// Vide : aucune affectation d'aide.
    pub helpers: Vec<String>,
    pub helper_dates: BTreeSet<NaiveDate>,
    /// Filtre optionnel sur `helper_dates` ; vide = tous les jours.
    pub helper_weekdays: Vec<Weekday>,
    pub leave: Vec<LeavePeriod>,
    pub forced_day: Option<ForcedDayRule>,
    pub prior_main_index: usize,
    pub prior_helper_offset: usize,
    pub prior_holidays: BTreeMap<String, usize>,
    pub options: PlanOptions,
}

impl PlanConfig {
    pub fn new<S: Into<String>>(year: i32, technicians: impl IntoIterator<Item = S>) -> Self {
        Self {
            year,
            technicians: technicians.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn technician_index(&self, name: &str) -> Option<usize> {
        self.technicians.iter().position(|t| t == name)
    }

    fn roster(&self, kind: SubjectKind) -> &[String] {
        match kind {
            SubjectKind::Technician => &self.technicians,
            SubjectKind::Helper => &self.helpers,
        }
    }

    /// Vérifie toute l'entrée avant le moindre calcul.
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.technicians.is_empty() {
            return Err(PlanError::EmptyRoster);
        }
        for kind in [SubjectKind::Technician, SubjectKind::Helper] {
            let mut seen = HashSet::new();
            for name in self.roster(kind) {
                if !seen.insert(name.as_str()) {
                    return Err(PlanError::DuplicateName {
                        kind,
                        name: name.clone(),
                    });
                }
            }
        }
        for period in &self.leave {
            if period.end < period.start {
                return Err(PlanError::InvalidRange {
                    from: period.start,
                    to: period.end,
                });
            }
            if !self.roster(period.kind).contains(&period.name) {
                return Err(PlanError::UnknownSubject {
                    kind: period.kind,
                    name: period.name.clone(),
                });
            }
        }
        if let Some(rule) = &self.forced_day {
            if rule.date.year() != rule.year {
                return Err(PlanError::ForcedDayYear {
                    date: rule.date,
                    year: rule.year,
                });
            }
            if self.technician_index(&rule.technician).is_none() {
                return Err(PlanError::UnknownSubject {
                    kind: SubjectKind::Technician,
                    name: rule.technician.clone(),
                });
            }
        }
        Ok(())
    }

    /// Rang de chaque date éligible (après filtre des jours) dans la liste triée.
    pub(crate) fn helper_slots(&self) -> HashMap<NaiveDate, usize> {
        self.helper_dates
            .iter()
            .filter(|d| {
                self.helper_weekdays.is_empty() || self.helper_weekdays.contains(&d.weekday())
            })
            .enumerate()
            .map(|(slot, d)| (*d, slot))
            .collect()
    }
}

/// Classe d'erreur : aucune n'est rejouable telle quelle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// L'appelant doit corriger son entrée.
    Configuration,
    /// La configuration est logiquement incohérente (roster trop court, congés trop larges).
    Integrity,
}

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("invalid date: {0}")]
    InvalidDate(String),
    #[error("invalid range: {from} is after {to}")]
    InvalidRange { from: NaiveDate, to: NaiveDate },
    #[error("range {from}..{to} is not within year {year}")]
    RangeOutsideYear {
        from: NaiveDate,
        to: NaiveDate,
        year: i32,
    },
    #[error("technician roster is empty")]
    EmptyRoster,
    #[error("duplicate {kind} name: {name}")]
    DuplicateName { kind: SubjectKind, name: String },
    #[error("unknown {kind}: {name}")]
    UnknownSubject { kind: SubjectKind, name: String },
    #[error("forced day {date} does not belong to year {year}")]
    ForcedDayYear { date: NaiveDate, year: i32 },
    #[error("no technician available on {date}")]
    NoCandidate { date: NaiveDate },
    #[error("forced technician {name} is on leave on {date}")]
    ForcedDayOnLeave { name: String, date: NaiveDate },
}

impl PlanError {
    pub fn class(&self) -> ErrorClass {
        match self {
            PlanError::NoCandidate { .. } | PlanError::ForcedDayOnLeave { .. } => {
                ErrorClass::Integrity
            }
            _ => ErrorClass::Configuration,
        }
    }
}

/// Avertissement non bloquant, calculé après une génération réussie.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ValidationWarning {
    Unbalanced { name: String, count: u32, mean: f64 },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationWarning::Unbalanced { name, count, mean } => write!(
                f,
                "{name} has {count} assignments (mean {mean:.1}, deviation {:.1})",
                (f64::from(*count) - mean).abs()
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    CooldownViolation,
    SplitWeekend,
    LeaveViolation,
    ForcedDayMismatch,
}

impl ConflictKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ConflictKind::CooldownViolation => "cooldown",
            ConflictKind::SplitWeekend => "split-weekend",
            ConflictKind::LeaveViolation => "leave",
            ConflictKind::ForcedDayMismatch => "forced-day",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub technician: String,
    pub date: NaiveDate,
    pub other: Option<NaiveDate>,
    pub kind: ConflictKind,
}
