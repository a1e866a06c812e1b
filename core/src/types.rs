use smallvec::SmallVec;

/// Single board axis, used for row and column coordinates and extents.
pub type Coord = u8;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u16;

/// Board position as `(row, col)`.
pub type Coord2 = (Coord, Coord);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

/// All positions of the clamped 3x3 neighbourhood around `center`, excluding
/// the center itself, in row-major scan order.
pub fn neighbours_of(bounds: Coord2, center: Coord2) -> SmallVec<[Coord2; 8]> {
    let (rows, cols) = bounds;
    let (row, col) = center;
    let mut out = SmallVec::new();

    if row >= rows || col >= cols {
        return out;
    }

    let row_end = (row + 1).min(rows - 1);
    let col_end = (col + 1).min(cols - 1);
    for r in row.saturating_sub(1)..=row_end {
        for c in col.saturating_sub(1)..=col_end {
            if (r, c) != (row, col) {
                out.push((r, c));
            }
        }
    }

    out
}
