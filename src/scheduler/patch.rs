use super::builder::ScheduleBuilder;
use super::conflicts;
use super::util::DateWindow;
use super::{PatchOutcome, PlanConfig, PlanError};
use crate::model::{AssignmentMap, DayType};
use chrono::{Datelike, NaiveDate, Weekday};
use tracing::{debug, info};

/// Recalcule `[from, to]` contre une carte annuelle existante.
///
/// La fenêtre de calcul est élargie de `cooldown_days` de chaque côté puis alignée sur
/// des week-ends entiers. Seul `[from, to]` (aligné sur les week-ends) est publié : toute
/// affectation antérieure hors de cette plage, marge comprise, est donc figée et ses
/// blocs de repos recréés, puisqu'elle reste dans la carte fusionnée. Les pointeurs de
/// rotation persistés ne sont ni lus en sortie ni modifiés.
pub(super) fn patch_range(
    config: &PlanConfig,
    prior: &AssignmentMap,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<PatchOutcome, PlanError> {
    let requested = DateWindow::new(from, to)?;
    let year = DateWindow::year(config.year)?;
    if !year.contains(from) || !year.contains(to) {
        return Err(PlanError::RangeOutsideYear {
            from,
            to,
            year: config.year,
        });
    }

    let window = requested
        .expand(config.options.cooldown_days)
        .snap_weekends()
        .clamp_to(&year);
    let published = requested.snap_weekends().clamp_to(&year);
    debug!(start = %window.start, end = %window.end, "patch window");

    let mut builder = ScheduleBuilder::new(config, window)?;
    for (date, assignment) in prior {
        if !published.contains(*date) {
            builder.freeze(*date, assignment, prior);
        }
    }
    if let Some(index) = resume_index(config, prior, &year, window.start) {
        builder.resume_main_at(index);
    }

    let output = builder.run()?;

    let mut merged = prior.clone();
    merged.retain(|date, _| !published.contains(*date));
    merged.extend(
        output
            .assignments
            .range(published.start..=published.end)
            .map(|(date, assignment)| (*date, assignment.clone())),
    );

    let (technician_counts, helper_counts) = conflicts::count(config, &merged, &year);
    let warnings = conflicts::fairness_warnings(config, &technician_counts);
    info!(
        from = %published.start,
        to = %published.end,
        changed = published.days().filter(|d| prior.get(d) != merged.get(d)).count(),
        "patch applied"
    );

    Ok(PatchOutcome {
        assignments: merged,
        technician_counts,
        helper_counts,
        window,
        published,
        warnings,
    })
}

/// Indice qui suit le dernier technicien ayant une astreinte (le samedi pour un
/// week-end) avant le début de la fenêtre. Approximation locale de la rotation.
fn resume_index(
    config: &PlanConfig,
    prior: &AssignmentMap,
    year: &DateWindow,
    window_start: NaiveDate,
) -> Option<usize> {
    let last = prior
        .range(year.start..window_start)
        .filter(|(date, a)| a.day_type != DayType::Weekend || date.weekday() == Weekday::Sat)
        .map(|(_, a)| a.technician.as_str())
        .last()?;
    let index = config.technician_index(last)?;
    Some((index + 1) % config.technicians.len())
}
