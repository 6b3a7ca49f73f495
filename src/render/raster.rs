//! Raster backend for plate diagrams
//!
//! Draws a [`PlateDiagram`] into an RGB image with an 8x8 bitmap font, so the
//! snapshot needs no system fonts.

use egui::Color32;
use font8x8::{BASIC_FONTS, LATIN_FONTS, UnicodeFonts};
use image::{Rgb, RgbImage};

use super::diagram::PlateDiagram;
use super::palette;
use crate::plate::{COLS, ROWS, Well, row_letter};

pub const WIDTH: u32 = 1500;
pub const HEIGHT: u32 = 1000;

const CELL: i32 = 72;
const GRID_X: i32 = 110;
const GRID_Y: i32 = 200;
const AXIS_SCALE: u32 = 3;
const TITLE_SCALE: u32 = 4;
const LEGEND_X: i32 = GRID_X + CELL * COLS as i32 + 48;
const LEGEND_MARGIN: i32 = 40;
const LEGEND_COL_GAP: i32 = 16;

/// Top-left pixel of a well's square.
fn well_origin(well: Well) -> (i32, i32) {
    (
        GRID_X + well.col() as i32 * CELL,
        GRID_Y + well.row() as i32 * CELL,
    )
}

pub fn rasterize(diagram: &PlateDiagram) -> RgbImage {
    let mut img = RgbImage::from_pixel(WIDTH, HEIGHT, rgb(palette::BACKGROUND));
    let grid_w = CELL * COLS as i32;

    draw_text_centered(
        &mut img,
        GRID_X + grid_w / 2,
        GRID_Y - 130,
        diagram.title(),
        palette::TEXT,
        TITLE_SCALE,
    );

    for col in 0..COLS {
        let cx = GRID_X + col as i32 * CELL + CELL / 2;
        draw_text_centered(
            &mut img,
            cx,
            GRID_Y - CELL / 2,
            &(col + 1).to_string(),
            palette::TEXT,
            AXIS_SCALE,
        );
    }
    for row in 0..ROWS {
        let cy = GRID_Y + row as i32 * CELL + CELL / 2;
        draw_text_centered(
            &mut img,
            GRID_X - CELL / 2,
            cy,
            &row_letter(row).to_string(),
            palette::TEXT,
            AXIS_SCALE,
        );
    }

    for well in Well::all() {
        let (x, y) = well_origin(well);
        fill_rect(&mut img, x, y, CELL, CELL, diagram.fill(well));
        stroke_rect(&mut img, x, y, CELL, CELL, palette::BORDER);
    }

    let longest = diagram
        .legend
        .iter()
        .map(|e| e.value.chars().count())
        .max()
        .unwrap_or(0);
    let layout = LegendLayout::fit(diagram.legend.len(), longest);
    for (i, entry) in diagram.legend.iter().enumerate() {
        let (x, y) = layout.origin(i);
        fill_rect(&mut img, x, y, layout.swatch, layout.swatch, entry.color);
        let text_y = y + layout.swatch / 2 - (8 * layout.scale as i32) / 2;
        draw_text(
            &mut img,
            layout.text_x(x),
            text_y,
            &layout.fit_text(&entry.value),
            palette::TEXT,
            layout.scale,
        );
    }

    img
}

/// Placement of legend entries right of the grid. Entries fill columns top
/// to bottom and the block is centered on the grid's middle line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LegendLayout {
    scale: u32,
    swatch: i32,
    line: i32,
    /// Entries per column
    rows: usize,
    col_w: i32,
    top: i32,
    /// Longest value drawn without truncation
    max_chars: usize,
}

impl LegendLayout {
    fn at_scale(scale: u32, count: usize) -> Self {
        let s = scale as i32;
        let swatch = 12 * s;
        let line = 16 * s + 4;
        let avail_w = WIDTH as i32 - LEGEND_X - LEGEND_MARGIN;
        let avail_h = HEIGHT as i32 - 2 * LEGEND_MARGIN;

        let per_col = (avail_h / line).max(1) as usize;
        let cols = count.div_ceil(per_col).max(1);
        let rows = count.min(per_col);
        let col_w = avail_w / cols as i32;
        let text_room = col_w - swatch - (4 * s + 2) - LEGEND_COL_GAP;
        let block_h = rows as i32 * line;
        let middle = GRID_Y + CELL * ROWS as i32 / 2;

        Self {
            scale,
            swatch,
            line,
            rows: rows.max(1),
            col_w,
            top: (middle - block_h / 2).max(LEGEND_MARGIN),
            max_chars: (text_room / (8 * s)).max(1) as usize,
        }
    }

    /// Largest text scale at which `count` entries of up to `longest`
    /// characters fit whole; values are truncated only at scale 1.
    fn fit(count: usize, longest: usize) -> Self {
        let mut scale = AXIS_SCALE;
        loop {
            let layout = Self::at_scale(scale, count);
            if scale == 1 || layout.max_chars >= longest {
                return layout;
            }
            scale -= 1;
        }
    }

    /// Top-left pixel of the i-th swatch.
    fn origin(&self, index: usize) -> (i32, i32) {
        let col = (index / self.rows) as i32;
        let row = (index % self.rows) as i32;
        (LEGEND_X + col * self.col_w, self.top + row * self.line)
    }

    fn text_x(&self, swatch_x: i32) -> i32 {
        swatch_x + self.swatch + 4 * self.scale as i32 + 2
    }

    fn fit_text(&self, value: &str) -> String {
        if value.chars().count() <= self.max_chars {
            return value.to_string();
        }
        let keep = self.max_chars.saturating_sub(2);
        let mut out: String = value.chars().take(keep).collect();
        out.push_str(&"..."[..self.max_chars - keep]);
        out
    }
}

fn rgb(color: Color32) -> Rgb<u8> {
    Rgb([color.r(), color.g(), color.b()])
}

fn put(img: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}

fn fill_rect(img: &mut RgbImage, x: i32, y: i32, w: i32, h: i32, color: Color32) {
    let color = rgb(color);
    for yy in y..y + h {
        for xx in x..x + w {
            put(img, xx, yy, color);
        }
    }
}

/// One-pixel outline on the rectangle's edge.
fn stroke_rect(img: &mut RgbImage, x: i32, y: i32, w: i32, h: i32, color: Color32) {
    let color = rgb(color);
    for xx in x..x + w {
        put(img, xx, y, color);
        put(img, xx, y + h - 1, color);
    }
    for yy in y..y + h {
        put(img, x, yy, color);
        put(img, x + w - 1, yy, color);
    }
}

fn glyph(ch: char) -> [u8; 8] {
    BASIC_FONTS
        .get(ch)
        .or_else(|| LATIN_FONTS.get(ch))
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or([0; 8])
}

fn text_width(text: &str, scale: u32) -> i32 {
    text.chars().count() as i32 * 8 * scale.max(1) as i32
}

fn draw_text(img: &mut RgbImage, x: i32, y: i32, text: &str, color: Color32, scale: u32) {
    let color = rgb(color);
    let scale = scale.max(1) as i32;
    let mut cursor_x = x;
    for ch in text.chars() {
        for (row_idx, bits) in glyph(ch).iter().enumerate() {
            for col_idx in 0..8 {
                if (bits >> col_idx) & 1 == 0 {
                    continue;
                }
                let px = cursor_x + col_idx * scale;
                let py = y + row_idx as i32 * scale;
                for sy in 0..scale {
                    for sx in 0..scale {
                        put(img, px + sx, py + sy, color);
                    }
                }
            }
        }
        cursor_x += 8 * scale;
    }
}

fn draw_text_centered(
    img: &mut RgbImage,
    cx: i32,
    cy: i32,
    text: &str,
    color: Color32,
    scale: u32,
) {
    let x = cx - text_width(text, scale) / 2;
    let y = cy - (8 * scale as i32) / 2;
    draw_text(img, x, y, text, color, scale);
}
