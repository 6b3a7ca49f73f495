//! Color-coded plate diagram
//!
//! A [`PlateDiagram`] is the backend-independent description of one plot:
//! a fill per well, the title and the legend. The raster backend and the
//! egui plot window both draw from it.

use egui::Color32;

use super::palette;
use crate::plate::{COLS, Label, PlateGrid, ROWS, Well};

/// How legend entries are ordered for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LegendOrdering {
    /// Order of the first well holding the value, scanning row-major. This is
    /// also the order colors are handed out in.
    #[default]
    FirstWell,
    /// Position of the value's first match inside all cells concatenated
    /// row-major. A short value contained in an earlier, longer one sorts by
    /// that earlier match.
    TextScan,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegendEntry {
    pub value: String,
    pub color: Color32,
}

#[derive(Debug, Clone)]
pub struct PlateDiagram {
    pub label: Label,
    pub fills: [[Color32; COLS]; ROWS],
    pub legend: Vec<LegendEntry>,
}

impl PlateDiagram {
    pub fn build(label: Label, grid: &PlateGrid, ordering: LegendOrdering) -> Self {
        let mut legend = assign_colors(grid);

        let mut fills = [[palette::EMPTY_WELL; COLS]; ROWS];
        for (well, value) in grid.iter() {
            if let Some(entry) = legend.iter().find(|e| e.value == value) {
                fills[well.row()][well.col()] = entry.color;
            }
        }

        if ordering == LegendOrdering::TextScan {
            let text = grid.concatenated();
            legend.sort_by_key(|e| text.find(&e.value).unwrap_or(usize::MAX));
        }

        Self {
            label,
            fills,
            legend,
        }
    }

    pub fn title(&self) -> &'static str {
        self.label.as_str()
    }

    pub fn fill(&self, well: Well) -> Color32 {
        self.fills[well.row()][well.col()]
    }
}

/// Distinct non-empty values in row-major discovery order, each with the
/// next palette color.
fn assign_colors(grid: &PlateGrid) -> Vec<LegendEntry> {
    let mut entries: Vec<LegendEntry> = Vec::new();
    for (_, value) in grid.iter() {
        if value.is_empty() || entries.iter().any(|e| e.value == value) {
            continue;
        }
        entries.push(LegendEntry {
            value: value.to_string(),
            color: palette::categorical(entries.len()),
        });
    }
    entries
}
