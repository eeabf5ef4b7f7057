//! Plain-text route report: one block per net, in board order.

use pcb_common::db::board::Board;
use pcb_common::db::indices::NetId;
use pcb_router::route::RouteSegment;
use pcb_router::{NetFailure, Route, RoutingReport};
use std::collections::HashMap;
use std::io::Write;

pub fn write_report<W: Write>(board: &Board, report: &RoutingReport, mut out: W) -> std::io::Result<()> {
    let routed: HashMap<NetId, &Route> = report.routed.iter().map(|r| (r.net_id, r)).collect();
    let failed: HashMap<NetId, &NetFailure> = report.failed.iter().map(|f| (f.net_id, f)).collect();
    let skipped: HashMap<NetId, &NetFailure> =
        report.skipped.iter().map(|f| (f.net_id, f)).collect();

    writeln!(
        out,
        "# board {}x{}x{}, {} nets, {} pads",
        board.width,
        board.height,
        board.layers,
        board.nets.len(),
        board.pads.len()
    )?;

    for net in &board.nets {
        if let Some(route) = routed.get(&net.id) {
            let stats = route.stats();
            writeln!(
                out,
                "net {} {}: routed, wirelength {:.3}, vias {}",
                net.id, net.name, stats.wirelength, stats.vias
            )?;
            for segment in route.segments() {
                match segment {
                    RouteSegment::Wire { start, end } => {
                        writeln!(out, "  wire {} -> {}", start, end)?
                    }
                    RouteSegment::Via { x, y, from, to } => {
                        writeln!(out, "  via ({}, {}) layer {} -> {}", x, y, from, to)?
                    }
                }
            }
        } else if let Some(failure) = failed.get(&net.id) {
            writeln!(out, "net {} {}: failed ({})", net.id, net.name, failure.error)?;
        } else if let Some(failure) = skipped.get(&net.id) {
            writeln!(out, "net {} {}: skipped ({})", net.id, net.name, failure.error)?;
        } else {
            writeln!(out, "net {} {}: unrouted (fewer than two pads)", net.id, net.name)?;
        }
    }

    writeln!(
        out,
        "# routed {}/{}, failed {}, skipped {}, trivial {}",
        report.routed.len(),
        board.nets.len(),
        report.failed.len(),
        report.skipped.len(),
        report.trivial
    )?;
    writeln!(
        out,
        "# total wirelength {:.3}, vias {}",
        report.total_wirelength(),
        report.total_vias()
    )?;
    Ok(())
}

pub fn save_report(board: &Board, report: &RoutingReport, filename: &str) -> std::io::Result<()> {
    let file = std::fs::File::create(filename)?;
    write_report(board, report, std::io::BufWriter::new(file))
}
