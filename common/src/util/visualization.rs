use crate::geom::coord::GridCoord;
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect as ImageRect;
use std::path::Path;

/// Dense per-cell values laid out layer-major, then row-major.
pub struct PlaneView<'a> {
    pub values: &'a [f32],
    pub width: u32,
    pub height: u32,
    pub layers: u32,
}

const LAYER_COLORS: [Rgb<u8>; 6] = [
    Rgb([255, 20, 80]),
    Rgb([0, 110, 255]),
    Rgb([0, 255, 100]),
    Rgb([255, 215, 0]),
    Rgb([180, 50, 255]),
    Rgb([0, 240, 255]),
];

/// Renders one panel per layer, left to right, shading each cell by its cost
/// on a log scale and painting routed cells in their layer color.
pub fn draw_cost_map(
    view: &PlaneView,
    routes: &[&[GridCoord]],
    filename: &str,
    cell_px: u32,
) -> anyhow::Result<()> {
    let expected = view.width as usize * view.height as usize * view.layers as usize;
    if view.values.len() != expected {
        anyhow::bail!(
            "plane has {} values, expected {} for {}x{}x{}",
            view.values.len(),
            expected,
            view.width,
            view.height,
            view.layers
        );
    }

    let px = cell_px.max(1);
    let gap = px;
    let panel_w = view.width * px;
    let img_w = (panel_w + gap) * view.layers.max(1);
    let img_h = view.height * px;
    let mut img = RgbImage::from_pixel(img_w.max(1), img_h.max(1), Rgb([20, 20, 20]));

    let max_cost = view
        .values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(0.0f32, f32::max);
    let norm = (1.0 + max_cost.max(0.0)).ln().max(f32::EPSILON);

    let plane = (view.width * view.height) as usize;
    let paint = |img: &mut RgbImage, x: i32, y: i32, z: i32, color: Rgb<u8>| {
        let left = z * (panel_w + gap) as i32 + x * px as i32;
        let top = (view.height as i32 - 1 - y) * px as i32;
        draw_filled_rect_mut(img, ImageRect::at(left, top).of_size(px, px), color);
    };

    for z in 0..view.layers {
        for y in 0..view.height {
            for x in 0..view.width {
                let idx = z as usize * plane + (y * view.width + x) as usize;
                let cost = view.values[idx].max(0.0);
                let shade = if cost.is_finite() {
                    (60.0 + 195.0 * (1.0 + cost).ln() / norm).min(255.0) as u8
                } else {
                    255
                };
                let color = if cost > 0.0 {
                    Rgb([shade, shade, shade])
                } else {
                    Rgb([40, 40, 40])
                };
                paint(&mut img, x as i32, y as i32, z as i32, color);
            }
        }
    }

    for route in routes {
        for c in route.iter() {
            if c.x < 0
                || c.y < 0
                || c.z < 0
                || c.x >= view.width as i32
                || c.y >= view.height as i32
                || c.z >= view.layers as i32
            {
                continue;
            }
            let color = LAYER_COLORS[(c.z as usize).min(LAYER_COLORS.len() - 1)];
            paint(&mut img, c.x, c.y, c.z, color);
        }
    }

    img.save(Path::new(filename))?;
    Ok(())
}
