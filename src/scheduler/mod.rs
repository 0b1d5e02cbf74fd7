pub mod availability;
mod builder;
mod conflicts;
mod patch;
pub mod rotation;
mod types;
mod util;

pub use types::{
    Conflict, ConflictKind, ErrorClass, PlanConfig, PlanError, PlanOptions, ValidationWarning,
};
pub use util::DateWindow;

use crate::model::{AssignmentMap, Counters, HolidayRotationPointer, RotationPointer};
use builder::ScheduleBuilder;
use chrono::NaiveDate;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Résultat d'une génération annuelle complète.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct YearSchedule {
    pub year: i32,
    pub assignments: AssignmentMap,
    pub technician_counts: Counters,
    pub helper_counts: Counters,
    /// À persister puis à fournir comme pointeurs antérieurs de `year + 1`.
    pub next_pointer: RotationPointer,
    pub next_holiday_pointer: HolidayRotationPointer,
    pub warnings: Vec<ValidationWarning>,
}

/// Résultat d'une régénération partielle.
#[derive(Debug, Clone)]
pub struct PatchOutcome {
    pub assignments: AssignmentMap,
    pub technician_counts: Counters,
    pub helper_counts: Counters,
    /// Fenêtre recalculée (élargie, alignée, bornée à l'année).
    pub window: DateWindow,
    /// Dates effectivement remplacées dans la carte.
    pub published: DateWindow,
    pub warnings: Vec<ValidationWarning>,
}

/// Scheduler : porte une configuration validée, immuable le temps des appels.
#[derive(Debug, Clone)]
pub struct Scheduler {
    config: PlanConfig,
}

impl Scheduler {
    pub fn new(config: PlanConfig) -> Result<Self, PlanError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Génère l'année entière en quatre phases : date imposée, fériés, week-ends, jours ouvrés.
    pub fn generate(&self) -> Result<YearSchedule, PlanError> {
        let config = &self.config;
        let year = DateWindow::year(config.year)?;
        let output = ScheduleBuilder::new(config, year)?.run()?;

        let mut rotation = output.rotation;
        if let Some(offset) = next_helper_offset(config, &output.assignments) {
            rotation.set_helper_offset(offset);
        }
        let (next_pointer, next_holiday_pointer) = rotation.snapshot(config.year);

        let (technician_counts, helper_counts) =
            conflicts::count(config, &output.assignments, &year);
        let warnings = conflicts::fairness_warnings(config, &technician_counts);
        for w in &warnings {
            warn!(year = config.year, "{w}");
        }
        info!(
            year = config.year,
            assigned = output.assignments.len(),
            next_main = next_pointer.main_index,
            "year generated"
        );

        Ok(YearSchedule {
            year: config.year,
            assignments: output.assignments,
            technician_counts,
            helper_counts,
            next_pointer,
            next_holiday_pointer,
            warnings,
        })
    }

    /// Recalcule `[from, to]` d'une carte précédente sans toucher au reste.
    pub fn patch(
        &self,
        prior: &AssignmentMap,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<PatchOutcome, PlanError> {
        patch::patch_range(&self.config, prior, from, to)
    }

    pub fn audit(&self, assignments: &AssignmentMap) -> Vec<Conflict> {
        conflicts::audit(&self.config, assignments)
    }
}

/// Aide suivant le dernier aide affecté de l'année ; `None` si aucun aide n'a servi.
fn next_helper_offset(config: &PlanConfig, assignments: &AssignmentMap) -> Option<usize> {
    let last = assignments
        .values()
        .rev()
        .find_map(|a| a.helper.as_deref())?;
    let index = config.helpers.iter().position(|h| h == last)?;
    Some((index + 1) % config.helpers.len())
}
