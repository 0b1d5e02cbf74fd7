use super::availability::{AvailabilityTracker, CooldownMode};
use super::rotation::{round_robin, Pick, RotationState};
use super::util::{is_weekend, weekend_anchor, weekend_pair, DateWindow};
use super::{PlanConfig, PlanError};
use crate::holidays::{compute_holidays, Holiday};
use crate::model::{Assignment, AssignmentMap, DayType, SubjectKind};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Contexte de génération éphémère : une année complète, ou une fenêtre de celle-ci
/// dont l'extérieur est figé.
pub(super) struct ScheduleBuilder<'a> {
    config: &'a PlanConfig,
    year: DateWindow,
    scope: DateWindow,
    holidays: Vec<Holiday>,
    holiday_dates: HashSet<NaiveDate>,
    helper_slots: HashMap<NaiveDate, usize>,
    availability: AvailabilityTracker,
    rotation: RotationState,
    assignments: AssignmentMap,
}

/// Dates à couvrir par une astreinte d'ancrage : la date seule, ou le week-end entier.
struct AnchorShape {
    required: Vec<NaiveDate>,
    day_type: DayType,
    mode: CooldownMode,
    anchor: NaiveDate,
}

impl AnchorShape {
    fn of(date: NaiveDate) -> Self {
        if is_weekend(date) {
            let saturday = weekend_anchor(date);
            Self {
                required: weekend_pair(saturday).to_vec(),
                day_type: DayType::Weekend,
                mode: CooldownMode::Weekend,
                anchor: saturday,
            }
        } else {
            Self {
                required: vec![date],
                day_type: DayType::Holiday,
                mode: CooldownMode::SingleDay,
                anchor: date,
            }
        }
    }
}

pub(super) struct BuildOutput {
    pub assignments: AssignmentMap,
    pub rotation: RotationState,
}

impl<'a> ScheduleBuilder<'a> {
    /// `config` doit avoir été validée. Les congés sont appliqués ici, avant toute affectation.
    pub(super) fn new(config: &'a PlanConfig, scope: DateWindow) -> Result<Self, PlanError> {
        let year = DateWindow::year(config.year)?;
        let holidays = compute_holidays(config.year)?;
        let holiday_dates = holidays.iter().map(|h| h.date).collect();

        let mut availability = AvailabilityTracker::new(config.options.cooldown_days);
        availability.apply_leave(&config.leave);

        let rotation = RotationState::new(
            config.technicians.len(),
            config.prior_main_index,
            config.prior_helper_offset,
            config.prior_holidays.clone(),
        );

        Ok(Self {
            config,
            year,
            scope: scope.clamp_to(&year),
            holidays,
            holiday_dates,
            helper_slots: config.helper_slots(),
            availability,
            rotation,
            assignments: AssignmentMap::new(),
        })
    }

    /// Fige une affectation conservée telle quelle et recrée le bloc de repos qu'elle implique.
    /// Un technicien absent du roster est ignoré.
    pub(super) fn freeze(&mut self, date: NaiveDate, assignment: &Assignment, prior: &AssignmentMap) {
        if self.config.technician_index(&assignment.technician).is_none() {
            return;
        }
        self.assignments.insert(date, assignment.clone());

        let name = assignment.technician.as_str();
        match assignment.day_type {
            DayType::Holiday => {
                self.availability
                    .add_cooldown(name, date, CooldownMode::SingleDay);
            }
            DayType::Weekend if date.weekday() == Weekday::Sat => {
                self.availability
                    .add_cooldown(name, date, CooldownMode::Weekend);
            }
            DayType::Weekend if date.weekday() == Weekday::Sun => {
                // dimanche orphelin (samedi hors année ou tenu par un autre) : on ancre quand même
                let saturday = date - Duration::days(1);
                let paired = prior
                    .get(&saturday)
                    .is_some_and(|a| a.technician == assignment.technician);
                if !paired {
                    self.availability
                        .add_cooldown(name, saturday, CooldownMode::Weekend);
                }
            }
            _ => {}
        }
    }

    pub(super) fn resume_main_at(&mut self, index: usize) {
        self.rotation.advance_main(index);
    }

    pub(super) fn run(mut self) -> Result<BuildOutput, PlanError> {
        let forced = self.apply_forced_day()?;
        self.assign_holidays(forced)?;
        self.assign_weekends()?;
        self.assign_weekdays()?;
        Ok(BuildOutput {
            assignments: self.assignments,
            rotation: self.rotation,
        })
    }

    /// Phase 1 : date imposée. Un samedi ou un dimanche emporte tout le week-end.
    ///
    /// Une date déjà figée (régénération partielle) n'est pas réécrite, mais les
    /// congés du technicien imposé sont toujours vérifiés.
    fn apply_forced_day(&mut self) -> Result<Option<NaiveDate>, PlanError> {
        let config = self.config;
        let Some(rule) = config.forced_day.as_ref() else {
            return Ok(None);
        };
        if !rule.applies_to(config.year) || !self.scope.contains(rule.date) {
            return Ok(None);
        }
        let index = config.technician_index(&rule.technician).ok_or_else(|| {
            PlanError::UnknownSubject {
                kind: SubjectKind::Technician,
                name: rule.technician.clone(),
            }
        })?;

        let shape = AnchorShape::of(rule.date);
        if let Some(date) = shape.required.iter().copied().find(|d| {
            !self
                .availability
                .is_available(SubjectKind::Technician, &rule.technician, *d)
        }) {
            return Err(PlanError::ForcedDayOnLeave {
                name: rule.technician.clone(),
                date,
            });
        }

        let publish = self.publishable(&shape.required);
        if !publish.iter().any(|d| self.assignments.contains_key(d)) {
            self.commit(&publish, index, shape.day_type);
            self.availability
                .add_cooldown(&rule.technician, shape.anchor, shape.mode);
        }

        let keys: Vec<String> = self
            .holidays
            .iter()
            .filter(|h| h.date == rule.date)
            .map(|h| h.key.clone())
            .collect();
        for key in keys {
            self.rotation.advance_holiday_key(&key, index);
        }
        debug!(date = %rule.date, technician = %rule.technician, "forced day applied");
        Ok(Some(rule.date))
    }

    /// Phase 2 : jours fériés, chacun avec sa propre rotation.
    fn assign_holidays(&mut self, forced: Option<NaiveDate>) -> Result<(), PlanError> {
        let holidays: Vec<Holiday> = self
            .holidays
            .iter()
            .filter(|h| self.scope.contains(h.date) && Some(h.date) != forced)
            .cloned()
            .collect();

        for holiday in holidays {
            let base = self.rotation.holiday_index(&holiday.key);

            let shape = AnchorShape::of(holiday.date);
            let publish = self.publishable(&shape.required);
            if publish.iter().any(|d| self.assignments.contains_key(d)) {
                // déjà couvert (week-end pris par un autre férié) : la clé est consommée
                self.rotation.advance_holiday_key(&holiday.key, base);
                continue;
            }

            let pick = self.search(base, &shape.required)?;
            let name = self.config.technicians[pick.winner].clone();
            self.commit(&publish, pick.winner, shape.day_type);
            self.availability
                .add_cooldown(&name, shape.anchor, shape.mode);

            self.rotation.advance_holiday_key(&holiday.key, pick.winner);
            if self.config.options.couple_main_to_holidays {
                self.rotation.advance_main(pick.next);
            }
            debug!(date = %holiday.date, key = %holiday.key, technician = %name, "holiday assigned");
        }
        Ok(())
    }

    /// Phase 3 : week-ends ordinaires, samedi et dimanche au même technicien.
    fn assign_weekends(&mut self) -> Result<(), PlanError> {
        let saturdays: Vec<NaiveDate> = self
            .scope
            .days()
            .filter(|d| d.weekday() == Weekday::Sat)
            .collect();

        for saturday in saturdays {
            let pair = weekend_pair(saturday);
            if pair.iter().any(|d| self.holiday_dates.contains(d)) {
                continue;
            }
            let publish = self.publishable(&pair);
            if publish.iter().any(|d| self.assignments.contains_key(d)) {
                continue;
            }

            let pick = self.search(self.rotation.main_index(), &pair)?;
            let name = self.config.technicians[pick.winner].clone();
            self.commit(&publish, pick.winner, DayType::Weekend);
            self.availability
                .add_cooldown(&name, saturday, CooldownMode::Weekend);
            self.rotation.advance_main(pick.next);
        }
        debug!(main_index = self.rotation.main_index(), "weekends assigned");
        Ok(())
    }

    /// Phase 4 : jours ouvrés restants.
    fn assign_weekdays(&mut self) -> Result<(), PlanError> {
        let days: Vec<NaiveDate> = self
            .scope
            .days()
            .filter(|d| !is_weekend(*d) && !self.holiday_dates.contains(d))
            .collect();

        for date in days {
            if self.assignments.contains_key(&date) {
                continue;
            }
            let pick = self.search(self.rotation.main_index(), &[date])?;
            self.commit(&[date], pick.winner, DayType::Weekday);
            self.rotation.advance_main(pick.next);
        }
        debug!(main_index = self.rotation.main_index(), "weekdays assigned");
        Ok(())
    }

    /// Premier technicien libre sur toutes les dates, en partant de `start`.
    fn search(&self, start: usize, dates: &[NaiveDate]) -> Result<Pick, PlanError> {
        let roster = &self.config.technicians;
        round_robin(roster.len(), start, |idx| {
            dates.iter().all(|d| {
                self.availability
                    .is_available(SubjectKind::Technician, &roster[idx], *d)
            })
        })
        .ok_or(PlanError::NoCandidate { date: dates[0] })
    }

    /// Dates que ce contexte a le droit d'écrire : dans l'année et dans la fenêtre.
    fn publishable(&self, dates: &[NaiveDate]) -> Vec<NaiveDate> {
        dates
            .iter()
            .copied()
            .filter(|d| self.year.contains(*d) && self.scope.contains(*d))
            .collect()
    }

    fn commit(&mut self, dates: &[NaiveDate], technician: usize, day_type: DayType) {
        let name = &self.config.technicians[technician];
        for &date in dates {
            debug_assert!(!self.assignments.contains_key(&date));
            let mut assignment = Assignment::new(name.clone(), day_type);
            assignment.helper = self.pick_helper(date);
            self.assignments.insert(date, assignment);
        }
    }

    /// Aide éventuel : seulement sur une date éligible, premier aide hors congés.
    fn pick_helper(&self, date: NaiveDate) -> Option<String> {
        let helpers = &self.config.helpers;
        if helpers.is_empty() {
            return None;
        }
        let slot = *self.helper_slots.get(&date)?;
        let start = (slot + self.rotation.helper_offset()) % helpers.len();
        round_robin(helpers.len(), start, |idx| {
            self.availability
                .is_available(SubjectKind::Helper, &helpers[idx], date)
        })
        .map(|pick| helpers[pick.winner].clone())
    }
}
