use crate::model::{HolidayRotationPointer, RotationPointer};
use std::collections::BTreeMap;

/// Résultat d'un tour de rotation : le gagnant et l'indice de reprise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pick {
    pub winner: usize,
    pub next: usize,
}

/// Parcourt circulairement au plus `size` candidats à partir de `start` et renvoie le
/// premier accepté. `None` après un tour complet sans candidat.
pub fn round_robin<F>(size: usize, start: usize, mut accept: F) -> Option<Pick>
where
    F: FnMut(usize) -> bool,
{
    if size == 0 {
        return None;
    }
    (0..size)
        .map(|offset| (start + offset) % size)
        .find(|&idx| accept(idx))
        .map(|winner| Pick {
            winner,
            next: (winner + 1) % size,
        })
}

/// Pointeurs de rotation d'une génération : lus au départ, remplacés en bloc à la fin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationState {
    roster_size: usize,
    main_index: usize,
    helper_offset: usize,
    holiday_indices: BTreeMap<String, usize>,
}

impl RotationState {
    pub fn new(
        roster_size: usize,
        main_index: usize,
        helper_offset: usize,
        holiday_indices: BTreeMap<String, usize>,
    ) -> Self {
        let size = roster_size.max(1);
        Self {
            roster_size: size,
            main_index: main_index % size,
            helper_offset,
            holiday_indices,
        }
    }

    pub fn main_index(&self) -> usize {
        self.main_index
    }

    pub fn helper_offset(&self) -> usize {
        self.helper_offset
    }

    /// Indice de départ pour une clé de jour férié (0 si jamais vue).
    pub fn holiday_index(&self, key: &str) -> usize {
        self.holiday_indices.get(key).copied().unwrap_or(0) % self.roster_size
    }

    pub fn advance_main(&mut self, to: usize) {
        self.main_index = to % self.roster_size;
    }

    pub fn advance_holiday_key(&mut self, key: &str, base_index: usize) {
        self.holiday_indices
            .insert(key.to_string(), (base_index + 1) % self.roster_size);
    }

    pub fn set_helper_offset(&mut self, offset: usize) {
        self.helper_offset = offset;
    }

    pub fn snapshot(&self, year: i32) -> (RotationPointer, HolidayRotationPointer) {
        (
            RotationPointer {
                year,
                main_index: self.main_index,
                helper_offset: self.helper_offset,
            },
            HolidayRotationPointer {
                year,
                indices: self.holiday_indices.clone(),
            },
        )
    }
}
