/// Single coordinate axis used for grid rows, columns and positions.
pub type Coord = u8;

/// Count type used for tile totals.
pub type CellCount = u16;

/// Two-dimensional grid size `(rows, columns)`.
pub type Coord2 = (Coord, Coord);

/// Token stamped on every scheduled timer, bumped whenever older timers must be ignored.
pub type Generation = u32;

/// Smallest accepted number of rows or columns.
pub const MIN_GRID: Coord = 2;

/// Largest accepted number of rows or columns.
pub const MAX_GRID: Coord = 7;

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

pub const fn is_valid_extent(extent: Coord) -> bool {
    extent >= MIN_GRID && extent <= MAX_GRID
}
