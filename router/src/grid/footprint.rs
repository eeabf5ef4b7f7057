use pcb_common::geom::rect::GridRect;

/// Shape stamped into the cost planes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Footprint {
    /// Pad outline.
    Rect(GridRect),
    /// Every cell whose center lies within `radius` cells of `center`.
    Disc { center: (i32, i32), radius: i32 },
}

impl Footprint {
    pub fn disc(x: i32, y: i32, radius: i32) -> Self {
        Footprint::Disc {
            center: (x, y),
            radius: radius.max(0),
        }
    }

    /// Bounding box of the shape.
    pub fn bounds(&self) -> GridRect {
        match *self {
            Footprint::Rect(rect) => rect,
            Footprint::Disc {
                center: (cx, cy),
                radius,
            } => GridRect::new(
                (cx.saturating_sub(radius), cy.saturating_sub(radius)),
                (
                    cx.saturating_add(radius).saturating_add(1),
                    cy.saturating_add(radius).saturating_add(1),
                ),
            ),
        }
    }

    /// Calls `f` once per planar cell of the shape inside `window`, in a
    /// fixed order. Work is bounded by the window, not by the shape.
    pub fn for_each_cell_within(&self, window: GridRect, mut f: impl FnMut(i32, i32)) {
        let clip = self.bounds().intersection(&window);
        if clip.area() == 0 {
            return;
        }
        match *self {
            Footprint::Rect(_) => {
                for x in clip.ll.0..clip.ur.0 {
                    for y in clip.ll.1..clip.ur.1 {
                        f(x, y);
                    }
                }
            }
            Footprint::Disc {
                center: (cx, cy),
                radius,
            } => {
                let r2 = (radius as i64) * (radius as i64);
                for y in clip.ll.1..clip.ur.1 {
                    let dy = y as i64 - cy as i64;
                    for x in clip.ll.0..clip.ur.0 {
                        let dx = x as i64 - cx as i64;
                        if dx * dx + dy * dy <= r2 {
                            f(x, y);
                        }
                    }
                }
            }
        }
    }
}

/// Which planes a stamp writes to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StampTargets {
    pub base: bool,
    pub via: bool,
    pub via_forbidden: bool,
}

impl StampTargets {
    pub const BASE: Self = Self {
        base: true,
        via: false,
        via_forbidden: false,
    };
    pub const VIA: Self = Self {
        base: false,
        via: true,
        via_forbidden: false,
    };
    pub const BASE_AND_VIA: Self = Self {
        base: true,
        via: true,
        via_forbidden: false,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    const EVERYWHERE: GridRect = GridRect {
        ll: (-100, -100),
        ur: (100, 100),
    };

    fn cells(fp: &Footprint, window: GridRect) -> Vec<(i32, i32)> {
        let mut cells = Vec::new();
        fp.for_each_cell_within(window, |x, y| cells.push((x, y)));
        cells
    }

    #[test]
    fn disc_sizes() {
        assert_eq!(cells(&Footprint::disc(0, 0, 0), EVERYWHERE).len(), 1);
        assert_eq!(cells(&Footprint::disc(0, 0, 1), EVERYWHERE).len(), 5);
        assert_eq!(cells(&Footprint::disc(0, 0, 2), EVERYWHERE).len(), 13);
        assert_eq!(cells(&Footprint::disc(0, 0, -3), EVERYWHERE).len(), 1);
    }

    #[test]
    fn rect_matches_area() {
        let rect = GridRect::new((2, 3), (5, 4));
        let fp = Footprint::Rect(rect);
        assert_eq!(cells(&fp, EVERYWHERE), vec![(2, 3), (3, 3), (4, 3)]);
        assert_eq!(cells(&fp, EVERYWHERE).len() as i64, rect.area());
    }

    #[test]
    fn shapes_are_clipped_to_the_window() {
        let window = GridRect::new((0, 0), (4, 4));
        let corner = cells(&Footprint::disc(0, 0, 1), window);
        assert_eq!(corner, vec![(0, 0), (1, 0), (0, 1)]);

        let pad = Footprint::Rect(GridRect::new((-5, 2), (2, 50)));
        assert_eq!(cells(&pad, window).len(), 4);
        assert!(cells(&Footprint::disc(10, 10, 2), window).is_empty());
    }

    #[test]
    fn huge_shapes_only_visit_the_window() {
        let window = GridRect::new((0, 0), (4, 4));
        let disc = Footprint::disc(2, 2, i32::MAX);
        assert_eq!(cells(&disc, window).len(), 16);

        let pad = Footprint::Rect(GridRect::new((i32::MIN, i32::MIN), (i32::MAX, i32::MAX)));
        assert_eq!(cells(&pad, window).len(), 16);
    }
}
