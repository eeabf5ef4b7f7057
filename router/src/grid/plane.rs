use super::RoutingGrid;
use crate::error::{Result, RouterError};
use pcb_common::geom::coord::GridCoord;

/// Extent of the routing grid and the coordinate <-> offset mapping shared
/// by every plane. Offsets are layer-major, then row-major.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridDims {
    pub width: i32,
    pub height: i32,
    pub layers: i32,
}

impl GridDims {
    pub fn new(width: i32, height: i32, layers: i32) -> Result<Self> {
        let invalid = RouterError::InvalidDimensions {
            width,
            height,
            layers,
        };
        if width <= 0 || height <= 0 || layers <= 0 {
            return Err(invalid);
        }
        let cells = (width as u64) * (height as u64) * (layers as u64);
        // Search states store offsets as u32.
        if cells > u32::MAX as u64 {
            return Err(invalid);
        }
        Ok(Self {
            width,
            height,
            layers,
        })
    }

    pub fn len(&self) -> usize {
        self.width as usize * self.height as usize * self.layers as usize
    }

    #[inline(always)]
    pub fn contains(&self, c: GridCoord) -> bool {
        c.x >= 0 && c.x < self.width && c.y >= 0 && c.y < self.height && c.z >= 0 && c.z < self.layers
    }

    /// Offset of an in-bounds coordinate. Callers validate first.
    #[inline(always)]
    pub fn index(&self, c: GridCoord) -> usize {
        (c.z as usize) * (self.width as usize) * (self.height as usize)
            + (c.y as usize) * (self.width as usize)
            + (c.x as usize)
    }

    pub fn checked_index(&self, c: GridCoord) -> Result<usize> {
        if self.contains(c) {
            Ok(self.index(c))
        } else {
            Err(self.out_of_bounds(c))
        }
    }

    #[inline(always)]
    pub fn coord(&self, idx: usize) -> GridCoord {
        let plane = self.width as usize * self.height as usize;
        let z = idx / plane;
        let rem = idx % plane;
        GridCoord::new(
            (rem % self.width as usize) as i32,
            (rem / self.width as usize) as i32,
            z as i32,
        )
    }

    pub fn out_of_bounds(&self, coord: GridCoord) -> RouterError {
        RouterError::OutOfBounds {
            coord,
            width: self.width,
            height: self.height,
            layers: self.layers,
        }
    }
}

pub(crate) fn allocate<T: Clone>(plane: &'static str, cells: usize, value: T) -> Result<Vec<T>> {
    let mut values = Vec::new();
    values
        .try_reserve_exact(cells)
        .map_err(|_| RouterError::Allocation { plane, cells })?;
    values.resize(cells, value);
    Ok(values)
}

/// One dense `f32` value per grid cell.
#[derive(Clone, Debug)]
pub struct CostPlane {
    dims: GridDims,
    values: Vec<f32>,
}

impl CostPlane {
    pub fn new(name: &'static str, dims: GridDims, value: f32) -> Result<Self> {
        Ok(Self {
            dims,
            values: allocate(name, dims.len(), value)?,
        })
    }

    pub fn dims(&self) -> GridDims {
        self.dims
    }

    pub fn fill(&mut self, value: f32) {
        self.values.fill(value);
    }

    pub fn at(&self, c: GridCoord) -> Result<f32> {
        Ok(self.values[self.dims.checked_index(c)?])
    }

    pub fn set(&mut self, value: f32, c: GridCoord) -> Result<()> {
        let idx = self.dims.checked_index(c)?;
        self.values[idx] = value;
        Ok(())
    }

    pub fn add(&mut self, delta: f32, c: GridCoord) -> Result<()> {
        let idx = self.dims.checked_index(c)?;
        self.values[idx] += delta;
        Ok(())
    }

    #[inline(always)]
    pub(crate) fn at_index(&self, idx: usize) -> f32 {
        self.values[idx]
    }

    #[inline(always)]
    pub(crate) fn set_index(&mut self, value: f32, idx: usize) {
        self.values[idx] = value;
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }
}

/// One flag per grid cell. Flags are only ever raised.
#[derive(Clone, Debug)]
pub struct FlagPlane {
    dims: GridDims,
    flags: Vec<bool>,
}

impl FlagPlane {
    pub fn new(name: &'static str, dims: GridDims) -> Result<Self> {
        Ok(Self {
            dims,
            flags: allocate(name, dims.len(), false)?,
        })
    }

    pub fn set(&mut self, c: GridCoord) -> Result<()> {
        let idx = self.dims.checked_index(c)?;
        self.flags[idx] = true;
        Ok(())
    }

    #[inline(always)]
    pub(crate) fn set_index(&mut self, idx: usize) {
        self.flags[idx] = true;
    }

    pub fn is_set(&self, c: GridCoord) -> Result<bool> {
        Ok(self.flags[self.dims.checked_index(c)?])
    }

    pub fn count(&self) -> usize {
        self.flags.iter().filter(|&&f| f).count()
    }
}

/// Route and pad stamps layered over a cost plane. Sums are kept in `f64`,
/// which holds any mix of `f32` stamps a few dozen binary orders apart
/// exactly, so removing a stamp leaves exactly the sum of the others. Each
/// cell also counts its live stamps and reads exactly zero once the last
/// one is removed.
#[derive(Clone, Debug)]
pub struct StampPlane {
    sum: Vec<f64>,
    count: Vec<u32>,
}

impl StampPlane {
    pub fn new(name: &'static str, dims: GridDims) -> Result<Self> {
        Ok(Self {
            sum: allocate(name, dims.len(), 0.0)?,
            count: allocate(name, dims.len(), 0)?,
        })
    }

    #[inline(always)]
    pub(crate) fn push(&mut self, idx: usize, value: f32) {
        self.count[idx] += 1;
        self.sum[idx] += f64::from(value);
    }

    /// Removes one stamp of `value`. A cell without stamps is left alone.
    #[inline(always)]
    pub(crate) fn pop(&mut self, idx: usize, value: f32) {
        match self.count[idx] {
            0 => {}
            1 => {
                self.count[idx] = 0;
                self.sum[idx] = 0.0;
            }
            _ => {
                self.count[idx] -= 1;
                self.sum[idx] -= f64::from(value);
            }
        }
    }

    #[inline(always)]
    pub(crate) fn at_index(&self, idx: usize) -> f32 {
        self.sum[idx] as f32
    }
}

/// The persistent planes of a routing session. Base and via cost are each
/// a caller-owned plane plus the stamps of pads and committed routes; reads
/// see the sum.
#[derive(Clone, Debug)]
pub struct CostPlanes {
    pub(crate) dims: GridDims,
    pub(crate) base_cost: CostPlane,
    pub(crate) via_cost: CostPlane,
    pub(crate) base_stamps: StampPlane,
    pub(crate) via_stamps: StampPlane,
    pub(crate) via_forbidden: FlagPlane,
}

impl CostPlanes {
    pub fn new(dims: GridDims) -> Result<Self> {
        Ok(Self {
            dims,
            base_cost: CostPlane::new("base cost", dims, 0.0)?,
            via_cost: CostPlane::new("via cost", dims, 0.0)?,
            base_stamps: StampPlane::new("base stamps", dims)?,
            via_stamps: StampPlane::new("via stamps", dims)?,
            via_forbidden: FlagPlane::new("via forbidden", dims)?,
        })
    }

    /// Effective base cost of every cell, stamps included.
    pub fn base_cost(&self) -> CostPlane {
        combine(&self.base_cost, &self.base_stamps)
    }

    /// Effective via cost of every cell, stamps included.
    pub fn via_cost(&self) -> CostPlane {
        combine(&self.via_cost, &self.via_stamps)
    }

    pub fn via_forbidden(&self) -> &FlagPlane {
        &self.via_forbidden
    }

    #[inline(always)]
    pub(crate) fn base_at_index(&self, idx: usize) -> f32 {
        self.base_cost.at_index(idx) + self.base_stamps.at_index(idx)
    }

    #[inline(always)]
    pub(crate) fn via_at_index(&self, idx: usize) -> f32 {
        self.via_cost.at_index(idx) + self.via_stamps.at_index(idx)
    }
}

fn combine(plane: &CostPlane, stamps: &StampPlane) -> CostPlane {
    let mut total = plane.clone();
    for (v, s) in total.values.iter_mut().zip(&stamps.sum) {
        *v += *s as f32;
    }
    total
}

impl RoutingGrid for CostPlanes {
    fn dims(&self) -> GridDims {
        self.dims
    }

    fn base_cost_at(&self, c: GridCoord) -> Result<f32> {
        Ok(self.base_at_index(self.dims.checked_index(c)?))
    }

    fn via_cost_at(&self, c: GridCoord) -> Result<f32> {
        Ok(self.via_at_index(self.dims.checked_index(c)?))
    }

    fn is_via_forbidden(&self, c: GridCoord) -> Result<bool> {
        self.via_forbidden.is_set(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_is_a_bijection() {
        let dims = GridDims::new(3, 4, 2).unwrap();
        let mut seen = vec![false; dims.len()];
        for z in 0..2 {
            for y in 0..4 {
                for x in 0..3 {
                    let c = GridCoord::new(x, y, z);
                    let idx = dims.index(c);
                    assert!(!seen[idx]);
                    seen[idx] = true;
                    assert_eq!(dims.coord(idx), c);
                }
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn contains_matches_bounds() {
        let dims = GridDims::new(5, 5, 2).unwrap();
        for x in -1..=5 {
            for y in -1..=5 {
                for z in -1..=2 {
                    let expected = (0..5).contains(&x) && (0..5).contains(&y) && (0..2).contains(&z);
                    assert_eq!(dims.contains(GridCoord::new(x, y, z)), expected);
                }
            }
        }
    }

    #[test]
    fn rejects_degenerate_dimensions() {
        assert!(GridDims::new(0, 4, 1).is_err());
        assert!(GridDims::new(4, 4, -1).is_err());
        assert!(GridDims::new(100_000, 100_000, 1).is_err());
    }

    #[test]
    fn plane_access_is_bounds_checked() {
        let dims = GridDims::new(2, 2, 1).unwrap();
        let mut plane = CostPlane::new("test", dims, 0.0).unwrap();
        plane.set(3.0, GridCoord::new(1, 1, 0)).unwrap();
        plane.add(1.5, GridCoord::new(1, 1, 0)).unwrap();
        assert_eq!(plane.at(GridCoord::new(1, 1, 0)).unwrap(), 4.5);

        let outside = GridCoord::new(2, 0, 0);
        assert_eq!(plane.add(1.0, outside), Err(dims.out_of_bounds(outside)));
        assert!(plane.at(GridCoord::new(0, 0, 1)).is_err());
        assert!(plane.set(1.0, GridCoord::new(-1, 0, 0)).is_err());
        assert_eq!(plane.as_slice().iter().sum::<f32>(), 4.5);
    }

    #[test]
    fn flags_only_rise() {
        let dims = GridDims::new(2, 1, 2).unwrap();
        let mut flags = FlagPlane::new("test", dims).unwrap();
        let c = GridCoord::new(1, 0, 1);
        assert!(!flags.is_set(c).unwrap());
        flags.set(c).unwrap();
        flags.set(c).unwrap();
        assert!(flags.is_set(c).unwrap());
        assert_eq!(flags.count(), 1);
        assert!(flags.set(GridCoord::new(0, 1, 0)).is_err());
    }

    #[test]
    fn stamps_return_to_exact_zero() {
        let dims = GridDims::new(1, 1, 1).unwrap();
        let mut stamps = StampPlane::new("test", dims).unwrap();
        stamps.push(0, 0.1);
        stamps.push(0, 0.7);
        stamps.pop(0, 0.1);
        stamps.pop(0, 0.7);
        assert_eq!(stamps.at_index(0).to_bits(), 0.0f32.to_bits());
        assert_eq!(stamps.count[0], 0);

        stamps.pop(0, 5.0);
        assert_eq!(stamps.at_index(0), 0.0);
    }

    #[test]
    fn removing_one_stamp_leaves_the_others_exactly() {
        let dims = GridDims::new(1, 1, 1).unwrap();
        let mut stamps = StampPlane::new("test", dims).unwrap();
        stamps.push(0, 0.1);
        stamps.push(0, 10.0);
        stamps.push(0, 1000.0);
        stamps.pop(0, 10.0);
        stamps.pop(0, 1000.0);
        assert_eq!(stamps.at_index(0), 0.1);
        assert_eq!(stamps.count[0], 1);
    }

    #[test]
    fn reads_include_stamps() {
        let dims = GridDims::new(2, 1, 1).unwrap();
        let mut planes = CostPlanes::new(dims).unwrap();
        planes.base_cost.fill(0.1);
        planes.base_stamps.push(1, 10.0);
        let c = GridCoord::new(1, 0, 0);
        assert_eq!(planes.base_cost_at(c).unwrap(), 0.1 + 10.0);
        assert_eq!(planes.base_cost().as_slice(), &[0.1, 0.1 + 10.0]);

        planes.base_stamps.pop(1, 10.0);
        assert_eq!(planes.base_cost_at(c).unwrap(), 0.1);
        assert_eq!(planes.via_cost().as_slice(), &[0.0, 0.0]);
    }
}
