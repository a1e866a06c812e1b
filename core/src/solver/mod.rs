use std::collections::BTreeMap;

use smallvec::SmallVec;

use crate::*;
use zone::MinedZone;

mod zone;

/// Constraint-based deduction engine bound to one field.
///
/// Every pass re-derives its reasoning from the field's current projection;
/// nothing is cached between passes. All mutation goes through the field's
/// own operations, and only moves that are logically certain are played, so
/// a correct run can never detonate a mine.
pub struct Solver<'a> {
    field: &'a mut MineField,
}

impl<'a> Solver<'a> {
    pub fn new(field: &'a mut MineField) -> Self {
        Self { field }
    }

    /// Plays at most one deduction: the first easy move found while scanning
    /// the uncovered cells, or failing that a single zone comparison.
    /// Returns whether any progress was made.
    pub fn play_next_step(&mut self) -> bool {
        for coords in self.numbered_cells() {
            if self.easy_move(coords, true) {
                return true;
            }
        }
        self.hard_move(true)
    }

    /// Runs full deduction passes until the game leaves `InProgress` or a
    /// whole pass makes no progress. A board left `InProgress` has no legal
    /// deduction left; that is the caller's signal to regenerate.
    pub fn uncover_grid(&mut self) -> GameState {
        loop {
            let mut progress = false;
            for coords in self.numbered_cells() {
                progress |= self.easy_move(coords, false);
            }
            if !progress {
                progress = self.hard_move(false);
            }
            log::debug!(
                "deduction pass done, progress: {progress}, state: {:?}",
                self.field.state()
            );

            if !progress || !matches!(self.field.state(), GameState::InProgress) {
                return self.field.state();
            }
        }
    }

    /// Coordinates of every currently uncovered cell, in row-major order.
    fn numbered_cells(&self) -> Vec<Coord2> {
        self.field
            .iter_visible()
            .filter_map(|(coords, view)| match view {
                CellView::Uncovered(_) => Some(coords),
                _ => None,
            })
            .collect()
    }

    fn split_neighbours(&self, coords: Coord2) -> (u8, SmallVec<[Coord2; 8]>) {
        let mut flagged = 0;
        let mut covered = SmallVec::new();
        for pos in self.field.neighbours(coords) {
            match self.field.project_at(pos) {
                CellView::Flagged => flagged += 1,
                CellView::Covered => covered.push(pos),
                _ => {}
            }
        }
        (flagged, covered)
    }

    /// Single-cell deduction. When the count equals flags plus covered
    /// neighbours every covered neighbour is a mine; when the flags already
    /// account for the count every covered neighbour is safe.
    fn easy_move(&mut self, coords: Coord2, first_action_only: bool) -> bool {
        let CellView::Uncovered(count) = self.field.project_at(coords) else {
            return false;
        };
        let (flagged, covered) = self.split_neighbours(coords);
        if covered.is_empty() {
            return false;
        }

        let count = usize::from(count);
        let flagged = usize::from(flagged);
        let mut progress = false;

        if count == flagged + covered.len() {
            for &pos in &covered {
                if self.field.force_flag(pos).is_ok_and(FlagOutcome::has_update) {
                    log::trace!("flagged {:?}: clue {:?} pins all covered neighbours", pos, coords);
                    progress = true;
                    if first_action_only {
                        return true;
                    }
                }
            }
        } else if count == flagged {
            for &pos in &covered {
                if self.field.uncover(pos).is_ok_and(UncoverOutcome::has_update) {
                    log::trace!("uncovered {:?}: clue {:?} is satisfied", pos, coords);
                    progress = true;
                    if first_action_only {
                        return true;
                    }
                }
            }
        }

        progress
    }

    /// Pairwise zone deduction, tried only when no easy move exists. The
    /// first applicable pair is applied in full, then the pass ends.
    fn hard_move(&mut self, first_action_only: bool) -> bool {
        let zones = self.collect_zones();

        for (i, zone) in zones.iter().enumerate() {
            for (j, other) in zones.iter().enumerate() {
                if i == j || !zone.intersects(other) {
                    continue;
                }

                let exclusive = zone.difference(other);
                if exclusive.is_empty() {
                    continue;
                }

                // The overlap holds at most `other`'s budget, so when the
                // rest of `zone`'s mines exactly fill its exclusive cells,
                // each one of them is a mine.
                if zone.mines() as isize - exclusive.len() as isize == other.mines() as isize {
                    for &pos in &exclusive {
                        let _ = self.field.force_flag(pos);
                        log::trace!("zone comparison flagged {:?}", pos);
                        if first_action_only {
                            return true;
                        }
                    }
                    return true;
                }

                // Dual: when every mine of `other` must already sit in the
                // overlap, `zone`'s exclusive cells cannot hold any.
                let other_exclusive = other.difference(zone);
                if other.mines() as isize - other_exclusive.len() as isize == zone.mines() as isize
                {
                    for &pos in &exclusive {
                        let _ = self.field.uncover(pos);
                        log::trace!("zone comparison uncovered {:?}", pos);
                        if first_action_only {
                            return true;
                        }
                    }
                    return true;
                }
            }
        }

        false
    }

    /// One zone per clue cell that still has undetermined covered
    /// neighbours, deduplicated by member set.
    fn collect_zones(&self) -> Vec<MinedZone> {
        let mut zones: BTreeMap<SmallVec<[Coord2; 8]>, MinedZone> = BTreeMap::new();

        for coords in self.numbered_cells() {
            let CellView::Uncovered(count) = self.field.project_at(coords) else {
                continue;
            };
            let (flagged, covered) = self.split_neighbours(coords);

            let remaining = i16::from(count) - i16::from(flagged);
            if remaining > 0 && (remaining as usize) < covered.len() {
                zones.insert(covered.clone(), MinedZone::new(remaining as u8, covered));
            }
        }

        zones.into_values().collect()
    }
}
