//! Plain-text plane dumps for plotting tools.

use super::plane::CostPlane;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes `x y z value` rows, one block per grid row, blank lines between
/// blocks and two between layers, which gnuplot's `splot` reads as a surface.
pub fn write_gnuplot<W: Write>(plane: &CostPlane, mut out: W) -> std::io::Result<()> {
    let dims = plane.dims();
    let values = plane.as_slice();
    let row = dims.width as usize;
    let layer = row * dims.height as usize;

    for z in 0..dims.layers as usize {
        writeln!(out, "# layer {}", z)?;
        for y in 0..dims.height as usize {
            for x in 0..row {
                writeln!(out, "{} {} {} {}", x, y, z, values[z * layer + y * row + x])?;
            }
            writeln!(out)?;
        }
        writeln!(out)?;
    }
    out.flush()
}

pub fn save_gnuplot(plane: &CostPlane, filename: &str) -> std::io::Result<()> {
    let file = File::create(Path::new(filename))?;
    write_gnuplot(plane, BufWriter::new(file))
}
