use crate::error::{Result, RouterError};
use pcb_common::geom::coord::GridCoord;

/// Parent pointers recorded by one search, sorted by cell. Sources are
/// present with no parent, so "reached as a source" and "never reached"
/// stay distinct.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CameFrom {
    entries: Vec<(GridCoord, Option<GridCoord>)>,
}

impl CameFrom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the map from cells that are each listed once.
    pub(crate) fn from_entries(
        entries: impl IntoIterator<Item = (GridCoord, Option<GridCoord>)>,
    ) -> Self {
        let mut entries: Vec<_> = entries.into_iter().collect();
        entries.sort_unstable_by_key(|&(c, _)| key(c));
        Self { entries }
    }

    pub fn insert_source(&mut self, c: GridCoord) {
        self.put(c, None);
    }

    pub fn insert(&mut self, child: GridCoord, parent: GridCoord) {
        self.put(child, Some(parent));
    }

    fn put(&mut self, c: GridCoord, parent: Option<GridCoord>) {
        match self.find(c) {
            Ok(i) => self.entries[i].1 = parent,
            Err(i) => self.entries.insert(i, (c, parent)),
        }
    }

    fn find(&self, c: GridCoord) -> std::result::Result<usize, usize> {
        self.entries.binary_search_by_key(&key(c), |&(e, _)| key(e))
    }

    pub fn contains(&self, c: GridCoord) -> bool {
        self.find(c).is_ok()
    }

    pub fn parent(&self, c: GridCoord) -> Option<GridCoord> {
        self.find(c).ok().and_then(|i| self.entries[i].1)
    }

    pub fn is_source(&self, c: GridCoord) -> bool {
        matches!(self.find(c), Ok(i) if self.entries[i].1.is_none())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Follows parents from `end` back to a source and returns the cells in
    /// source-to-end order.
    pub fn path_to(&self, end: GridCoord) -> Result<Vec<GridCoord>> {
        let mut path = vec![end];
        let mut curr = end;
        while !self.is_source(curr) {
            let parent = self.parent(curr).ok_or(RouterError::NotReached(curr))?;
            if path.len() > self.entries.len() {
                return Err(RouterError::CameFromCycle(curr));
            }
            path.push(parent);
            curr = parent;
        }
        path.reverse();
        Ok(path)
    }
}

fn key(c: GridCoord) -> (i32, i32, i32) {
    (c.z, c.y, c.x)
}
