use smallvec::SmallVec;

use crate::Coord2;

/// A set of covered cells known to contain exactly `mines` mines.
///
/// Members stay sorted in row-major order and the member set is the zone's
/// identity: two clue cells describing the same covered cells produce equal
/// zones, whatever order the members were found in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct MinedZone {
    mines: u8,
    cells: SmallVec<[Coord2; 8]>,
}

impl MinedZone {
    pub(crate) fn new(mines: u8, cells: SmallVec<[Coord2; 8]>) -> Self {
        debug_assert!(cells.windows(2).all(|pair| pair[0] < pair[1]));
        Self { mines, cells }
    }

    pub(crate) fn mines(&self) -> u8 {
        self.mines
    }

    pub(crate) fn contains(&self, coords: Coord2) -> bool {
        self.cells.binary_search(&coords).is_ok()
    }

    pub(crate) fn intersects(&self, other: &Self) -> bool {
        self.cells.iter().any(|&coords| other.contains(coords))
    }

    /// Members of `self` that are not members of `other`, in order.
    pub(crate) fn difference(&self, other: &Self) -> SmallVec<[Coord2; 8]> {
        self.cells
            .iter()
            .copied()
            .filter(|&coords| !other.contains(coords))
            .collect()
    }
}
