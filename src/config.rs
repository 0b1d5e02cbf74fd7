use crate::model::{
    AssignmentMap, ForcedDayRule, HolidayRotationPointer, LeaveId, LeavePeriod, RotationPointer,
    SubjectKind,
};
use crate::scheduler::{PatchOutcome, PlanConfig, PlanOptions, YearSchedule};
use anyhow::{bail, Result};
use chrono::{DateTime, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// État persistant de l'outil : rosters, congés, pointeurs par année, dernier calendrier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_year")]
    pub year: i32,
    #[serde(default)]
    pub technicians: Vec<String>,
    #[serde(default)]
    pub helpers: Vec<String>,
    #[serde(default)]
    pub helper_dates: BTreeSet<NaiveDate>,
    #[serde(default)]
    pub helper_weekdays: Vec<Weekday>,
    #[serde(default)]
    pub leave: Vec<LeavePeriod>,
    #[serde(default)]
    pub forced_day: Option<ForcedDayRule>,
    #[serde(default)]
    pub options: PlanOptions,
    /// Pointeurs émis après chaque année générée.
    #[serde(default)]
    pub rotation_after_year: BTreeMap<i32, RotationPointer>,
    #[serde(default)]
    pub holiday_rotation_after_year: BTreeMap<i32, HolidayRotationPointer>,
    #[serde(default)]
    pub cache: Option<CachedSchedule>,
}

/// Dernier calendrier calculé, base des régénérations partielles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedSchedule {
    pub year: i32,
    pub assignments: AssignmentMap,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub last_patch: Option<PatchRange>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

fn default_year() -> i32 {
    2026
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            year: default_year(),
            technicians: Vec::new(),
            helpers: Vec::new(),
            helper_dates: BTreeSet::new(),
            helper_weekdays: Vec::new(),
            leave: Vec::new(),
            forced_day: None,
            options: PlanOptions::default(),
            rotation_after_year: BTreeMap::new(),
            holiday_rotation_after_year: BTreeMap::new(),
            cache: None,
        }
    }
}

impl Settings {
    /// Entrée de génération pour `year`, amorcée par les pointeurs de `year - 1`.
    pub fn plan_config(&self, year: i32) -> PlanConfig {
        let prior = self.rotation_after_year.get(&(year - 1));
        let prior_holidays = self
            .holiday_rotation_after_year
            .get(&(year - 1))
            .map(|p| p.indices.clone())
            .unwrap_or_default();

        PlanConfig {
            year,
            technicians: self.technicians.clone(),
            helpers: self.helpers.clone(),
            helper_dates: self.helper_dates.clone(),
            helper_weekdays: self.helper_weekdays.clone(),
            leave: self.leave.clone(),
            forced_day: self.forced_day.clone(),
            prior_main_index: prior.map_or(0, |p| p.main_index),
            prior_helper_offset: prior.map_or(0, |p| p.helper_offset),
            prior_holidays,
            options: self.options,
        }
    }

    /// Enregistre les pointeurs émis et met le calendrier en cache.
    pub fn record_generation(&mut self, schedule: &YearSchedule, now: DateTime<Utc>) {
        self.rotation_after_year
            .insert(schedule.year, schedule.next_pointer);
        self.holiday_rotation_after_year
            .insert(schedule.year, schedule.next_holiday_pointer.clone());
        self.cache = Some(CachedSchedule {
            year: schedule.year,
            assignments: schedule.assignments.clone(),
            updated_at: now,
            last_patch: None,
        });
    }

    /// Remplace le cache ; les pointeurs restent ceux de la dernière génération complète.
    pub fn record_patch(
        &mut self,
        year: i32,
        outcome: &PatchOutcome,
        range: PatchRange,
        now: DateTime<Utc>,
    ) {
        self.cache = Some(CachedSchedule {
            year,
            assignments: outcome.assignments.clone(),
            updated_at: now,
            last_patch: Some(range),
        });
    }

    pub fn cached(&self, year: i32) -> Option<&AssignmentMap> {
        self.cache
            .as_ref()
            .filter(|c| c.year == year)
            .map(|c| &c.assignments)
    }

    pub fn add_leave(&mut self, period: LeavePeriod) -> Result<LeaveId> {
        let roster = match period.kind {
            SubjectKind::Technician => &self.technicians,
            SubjectKind::Helper => &self.helpers,
        };
        if !roster.contains(&period.name) {
            bail!("unknown {}: {}", period.kind, period.name);
        }
        let id = period.id.clone();
        self.leave.push(period);
        Ok(id)
    }

    pub fn remove_leave(&mut self, id: &LeaveId) -> bool {
        let before = self.leave.len();
        self.leave.retain(|p| &p.id != id);
        self.leave.len() != before
    }
}
