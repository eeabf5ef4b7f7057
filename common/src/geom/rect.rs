/// Half-open integer rectangle `[ll.x, ur.x) x [ll.y, ur.y)` in grid cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GridRect {
    pub ll: (i32, i32),
    pub ur: (i32, i32),
}

impl GridRect {
    pub fn new(ll: (i32, i32), ur: (i32, i32)) -> Self {
        Self { ll, ur }
    }

    /// Rectangle covering a `width` x `height` pad centered at (`cx`, `cy`).
    /// Lower-left is floored and upper-right ceiled, so partially covered
    /// cells are included.
    pub fn from_center(cx: f64, cy: f64, width: f64, height: f64) -> Self {
        let ll = (
            (cx - width / 2.0).floor() as i32,
            (cy - height / 2.0).floor() as i32,
        );
        let ur = (
            (cx + width / 2.0).ceil() as i32,
            (cy + height / 2.0).ceil() as i32,
        );
        Self { ll, ur }
    }

    /// Number of cells covered. Inverted rectangles are empty.
    pub fn area(&self) -> i64 {
        let w = (self.ur.0 as i64 - self.ll.0 as i64).max(0);
        let h = (self.ur.1 as i64 - self.ll.1 as i64).max(0);
        w.saturating_mul(h)
    }

    /// Overlap of two rectangles. Empty (zero area) when they are disjoint.
    pub fn intersection(&self, other: &GridRect) -> GridRect {
        GridRect {
            ll: (self.ll.0.max(other.ll.0), self.ll.1.max(other.ll.1)),
            ur: (self.ur.0.min(other.ur.0), self.ur.1.min(other.ur.1)),
        }
    }
}
