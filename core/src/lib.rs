use core::ops::{BitOr, Index};

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

pub use cell::*;
pub use error::*;
pub use field::*;
pub use generator::*;
pub use solver::*;
pub use types::*;

mod cell;
mod error;
mod field;
mod generator;
mod solver;
mod types;

/// Board dimensions and target mine count.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub size: Coord2,
    pub mines: CellCount,
}

impl GameConfig {
    pub const fn new_unchecked(size: Coord2, mines: CellCount) -> Self {
        Self { size, mines }
    }

    pub fn new((rows, cols): Coord2, mines: CellCount) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(GameError::InvalidDimension);
        }
        if mines >= mult(rows, cols) {
            return Err(GameError::InvalidMineCount);
        }
        Ok(Self::new_unchecked((rows, cols), mines))
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }

    pub fn contains(&self, coords: Coord2) -> bool {
        coords.0 < self.size.0 && coords.1 < self.size.1
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if self.contains(coords) {
            Ok(coords)
        } else {
            Err(GameError::OutOfBounds)
        }
    }

    pub fn neighbours(&self, center: Coord2) -> SmallVec<[Coord2; 8]> {
        neighbours_of(self.size, center)
    }
}

/// Authoritative mine layout, kept separate from the player-visible board.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MinePlacement {
    mine_mask: Array2<bool>,
    mine_count: CellCount,
}

impl MinePlacement {
    pub fn from_mine_mask(mine_mask: Array2<bool>) -> Self {
        let mine_count = mine_mask.iter().filter(|&&is_mine| is_mine).count() as CellCount;
        Self {
            mine_mask,
            mine_count,
        }
    }

    /// Deterministic placement from an explicit coordinate list. Duplicate
    /// entries collapse through the mask, so the resulting count is the
    /// number of distinct mined cells.
    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let mut mine_mask: Array2<bool> = Array2::default(size.to_nd_index());

        for &coords in mine_coords {
            if coords.0 >= size.0 || coords.1 >= size.1 {
                return Err(GameError::OutOfBounds);
            }
            mine_mask[coords.to_nd_index()] = true;
        }

        Ok(Self::from_mine_mask(mine_mask))
    }

    pub fn size(&self) -> Coord2 {
        let dim = self.mine_mask.dim();
        (dim.0 as Coord, dim.1 as Coord)
    }

    pub fn total_cells(&self) -> CellCount {
        self.mine_mask.len() as CellCount
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn contains_mine(&self, coords: Coord2) -> bool {
        self[coords]
    }

    /// Mined cells among the clamped 3x3 neighbourhood, excluding the center.
    pub fn adjacent_mine_count(&self, coords: Coord2) -> u8 {
        neighbours_of(self.size(), coords)
            .iter()
            .filter(|&&pos| self[pos])
            .count() as u8
    }
}

impl Index<Coord2> for MinePlacement {
    type Output = bool;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.mine_mask[coords.to_nd_index()]
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum FlagOutcome {
    NoChange,
    Changed,
}

impl FlagOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Changed => true,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum UncoverOutcome {
    NoChange,
    Safe,
    Detonated,
    Won,
}

impl UncoverOutcome {
    pub const fn has_update(self) -> bool {
        use UncoverOutcome::*;
        match self {
            NoChange => false,
            Safe => true,
            Detonated => true,
            Won => true,
        }
    }
}

/// Merges per-cell outcomes when chording over several neighbours.
impl BitOr for UncoverOutcome {
    type Output = UncoverOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        use UncoverOutcome::*;
        match (self, rhs) {
            (Detonated, _) => Detonated,
            (_, Detonated) => Detonated,
            (Won, _) => Won,
            (_, Won) => Won,
            (Safe, _) => Safe,
            (_, Safe) => Safe,
            (NoChange, NoChange) => NoChange,
        }
    }
}
