use crate::db::board::{Board, NetData, NetclassData, PadData};
use crate::db::indices::{NetId, NetclassId};
use rand::Rng;
use std::collections::HashSet;

pub struct BoardSpec {
    pub width: i32,
    pub height: i32,
    pub layers: i32,
    pub nets: usize,
    pub pins_per_net: usize,
}

pub fn generate_random_board(spec: &BoardSpec) -> Board {
    generate_random_board_with(&mut rand::thread_rng(), spec)
}

/// Scatters `pins_per_net` single-cell pads per net over the board, keeping
/// at least one free cell between any two pads. Stops early when the board
/// runs out of room.
pub fn generate_random_board_with<R: Rng>(rng: &mut R, spec: &BoardSpec) -> Board {
    let width = spec.width.max(1);
    let height = spec.height.max(1);
    let layers = spec.layers.max(1);

    let mut board = Board {
        width,
        height,
        layers,
        netclasses: vec![NetclassData {
            id: NetclassId(0),
            name: "Default".to_string(),
            clearance: 1,
            trace_width: 1,
            via_diameter: 2,
        }],
        ..Board::default()
    };

    let mut taken: HashSet<(i32, i32)> = HashSet::new();
    let max_attempts = 64;

    'nets: for n in 0..spec.nets {
        let net_id = NetId::new(n);
        let mut pads = Vec::with_capacity(spec.pins_per_net);
        for p in 0..spec.pins_per_net {
            let mut placed = None;
            for _ in 0..max_attempts {
                let x = rng.gen_range(0..width);
                let y = rng.gen_range(0..height);
                let crowded = (-1..=1).any(|dx| (-1..=1).any(|dy| taken.contains(&(x + dx, y + dy))));
                if !crowded {
                    placed = Some((x, y));
                    break;
                }
            }
            let Some((x, y)) = placed else {
                log::warn!(
                    "Board {}x{} is full after {} nets; stopping generation.",
                    width,
                    height,
                    n
                );
                break 'nets;
            };
            taken.insert((x, y));

            let through_hole = rng.gen_bool(0.3);
            let layers = if through_hole {
                Vec::new()
            } else if rng.gen_bool(0.5) {
                vec![0]
            } else {
                vec![layers - 1]
            };
            pads.push(PadData {
                name: format!("N{}-P{}", n, p),
                net: Some(net_id),
                x: x as f64 + 0.5,
                y: y as f64 + 0.5,
                width: 1.0,
                height: 1.0,
                layers,
                through_hole,
            });
        }

        board.nets.push(NetData {
            id: net_id,
            name: format!("net{}", n),
            netclass: NetclassId(0),
        });
        board.pads.extend(pads);
    }

    log::info!(
        "Generated board {}x{}x{}: {} nets, {} pads",
        width,
        height,
        layers,
        board.nets.len(),
        board.pads.len()
    );
    board
}
