use std::fmt;

/// Cell address on the routing grid. `z` is the copper layer index.
///
/// Components are signed so that neighbor and footprint candidates can step
/// off the board; bounds are enforced by the grid, not by this type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct GridCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl GridCoord {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    #[inline(always)]
    pub fn offset(&self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    pub fn with_layer(&self, z: i32) -> Self {
        Self::new(self.x, self.y, z)
    }

    /// Euclidean distance in the x/y plane, ignoring layers.
    pub fn distance_2d(&self, other: &GridCoord) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }

    /// True when both cells are within one step of each other on every axis.
    pub fn is_adjacent_or_same(&self, other: &GridCoord) -> bool {
        (self.x - other.x).abs() <= 1 && (self.y - other.y).abs() <= 1 && (self.z - other.z).abs() <= 1
    }
}

impl fmt::Display for GridCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}
