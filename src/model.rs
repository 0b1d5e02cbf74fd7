use crate::scheduler::PlanError;
use chrono::{Datelike, NaiveDate};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Les deux rosters d'astreinte : technicien (titulaire) ou aide (secondaire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum SubjectKind {
    Technician,
    Helper,
}

impl SubjectKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SubjectKind::Technician => "technician",
            SubjectKind::Helper => "helper",
        }
    }
}

impl fmt::Display for SubjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubjectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "technician" | "tech" => Ok(SubjectKind::Technician),
            "helper" => Ok(SubjectKind::Helper),
            other => Err(format!("unknown subject kind: {other}")),
        }
    }
}

/// Identifiant fort pour LeavePeriod
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LeaveId(String);

impl LeaveId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Période de congés, bornes incluses `[start, end]`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LeavePeriod {
    pub id: LeaveId,
    #[cfg_attr(feature = "serde", serde(default = "default_kind"))]
    pub kind: SubjectKind,
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[cfg(feature = "serde")]
fn default_kind() -> SubjectKind {
    SubjectKind::Technician
}

impl LeavePeriod {
    /// Crée une période en validant que `end >= start`.
    pub fn new<N: Into<String>>(
        kind: SubjectKind,
        name: N,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Self, PlanError> {
        if end < start {
            return Err(PlanError::InvalidRange {
                from: start,
                to: end,
            });
        }
        Ok(Self {
            id: LeaveId::random(),
            kind,
            name: name.into(),
            start,
            end,
        })
    }

    /// Tous les jours couverts, dans l'ordre.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

/// Nature d'une journée d'astreinte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum DayType {
    Weekday,
    Weekend,
    Holiday,
}

impl DayType {
    pub fn as_str(self) -> &'static str {
        match self {
            DayType::Weekday => "weekday",
            DayType::Weekend => "weekend",
            DayType::Holiday => "holiday",
        }
    }
}

impl fmt::Display for DayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Affectation d'une date. La date elle-même est la clé de [`AssignmentMap`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Assignment {
    pub technician: String,
    pub day_type: DayType,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub helper: Option<String>,
}

impl Assignment {
    pub fn new<T: Into<String>>(technician: T, day_type: DayType) -> Self {
        Self {
            technician: technician.into(),
            day_type,
            helper: None,
        }
    }
}

/// Au plus une affectation par date, triée chronologiquement.
pub type AssignmentMap = BTreeMap<NaiveDate, Assignment>;

/// Compteurs par nom (technicien ou aide).
pub type Counters = BTreeMap<String, u32>;

/// Pointeur de rotation principal, émis après l'année `year` pour amorcer `year + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RotationPointer {
    pub year: i32,
    pub main_index: usize,
    pub helper_offset: usize,
}

/// Pointeurs de rotation par jour férié (clé stable d'une année à l'autre).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HolidayRotationPointer {
    pub year: i32,
    pub indices: BTreeMap<String, usize>,
}

/// Date imposée à un technicien pour une seule année historique. Un samedi ou un
/// dimanche imposé emporte tout le week-end.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ForcedDayRule {
    pub year: i32,
    pub date: NaiveDate,
    pub technician: String,
}

impl ForcedDayRule {
    pub fn applies_to(&self, year: i32) -> bool {
        self.year == year && self.date.year() == year
    }
}
