//! Board description handed to the router, already expressed in grid cells.

use crate::db::indices::{NetId, NetclassId, PadId};
use crate::geom::rect::GridRect;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NetclassData {
    pub id: NetclassId,
    pub name: String,
    pub clearance: i32,
    pub trace_width: i32,
    pub via_diameter: i32,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NetData {
    pub id: NetId,
    pub name: String,
    pub netclass: NetclassId,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PadData {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net: Option<NetId>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Copper layers of an SMD pad. Ignored when `through_hole` is set.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub layers: Vec<i32>,
    #[serde(default)]
    pub through_hole: bool,
}

impl PadData {
    /// Grid cell holding the pad center.
    pub fn center(&self) -> (i32, i32) {
        (self.x.floor() as i32, self.y.floor() as i32)
    }

    pub fn outline(&self) -> GridRect {
        GridRect::from_center(self.x, self.y, self.width, self.height)
    }

    /// Layers the pad occupies, clipped to `0..layer_count`.
    pub fn grid_layers(&self, layer_count: i32) -> Vec<i32> {
        if self.through_hole {
            return (0..layer_count).collect();
        }
        let mut layers: Vec<i32> = self
            .layers
            .iter()
            .copied()
            .filter(|&l| l >= 0 && l < layer_count)
            .collect();
        layers.sort_unstable();
        layers.dedup();
        layers
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Board {
    pub width: i32,
    pub height: i32,
    pub layers: i32,
    #[serde(default)]
    pub netclasses: Vec<NetclassData>,
    #[serde(default)]
    pub nets: Vec<NetData>,
    #[serde(default)]
    pub pads: Vec<PadData>,
}

impl Board {
    pub fn net(&self, id: NetId) -> Option<&NetData> {
        self.nets.iter().find(|n| n.id == id)
    }

    pub fn netclass(&self, id: NetclassId) -> Option<&NetclassData> {
        self.netclasses.iter().find(|c| c.id == id)
    }

    pub fn pads_of(&self, net: NetId) -> impl Iterator<Item = (PadId, &PadData)> + '_ {
        self.pads
            .iter()
            .enumerate()
            .filter(move |(_, p)| p.net == Some(net))
            .map(|(i, p)| (PadId::new(i), p))
    }

    pub fn num_nets(&self) -> usize {
        self.nets.len()
    }
}
