#![forbid(unsafe_code)]
//! Calendrier d'astreinte annuel : génération équitable et régénération partielle.
//!
//! - Une astreinte par jour, week-ends tenus par un seul technicien.
//! - Rotation round-robin reportée d'une année sur l'autre, plus une rotation par jour férié.
//! - Blocs de repos autour des week-ends et fériés, congés respectés.
//! - Recalcul d'une plage de dates sans toucher au reste de l'année.

pub mod holidays;
pub mod model;
pub mod scheduler;

#[cfg(feature = "serde")]
pub mod config;
#[cfg(feature = "serde")]
pub mod io;
#[cfg(feature = "serde")]
pub mod storage;

pub use holidays::{compute_holidays, easter_sunday, Holiday};
pub use model::{
    Assignment, AssignmentMap, Counters, DayType, ForcedDayRule, HolidayRotationPointer, LeaveId,
    LeavePeriod, RotationPointer, SubjectKind,
};
pub use scheduler::{
    Conflict, ConflictKind, DateWindow, ErrorClass, PatchOutcome, PlanConfig, PlanError,
    PlanOptions, Scheduler, ValidationWarning, YearSchedule,
};

#[cfg(feature = "serde")]
pub use config::Settings;
#[cfg(feature = "serde")]
pub use storage::{JsonStorage, Storage};
