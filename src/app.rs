//! Main application state and UI

use eframe::egui;
use tracing::{error, info};

use crate::config::AppConfig;
use crate::editor::{self, EditorState, WellToggle};
use crate::error::Result;
use crate::plate::{COLS, Label, PlateGrid, PlateStore, ROWS, Well, row_letter};
use crate::render::{DiagramRegistry, ExportSettings, PlateDiagram, palette};

const LEGEND_LINE: f32 = 22.0;
const LEGEND_SWATCH: f32 = 16.0;
const LEGEND_TEXT_GAP: f32 = 8.0;

/// Application state
pub struct PlateLayoutApp {
    config: AppConfig,
    store: PlateStore,

    // One editor per label, in label order
    editors: Vec<EditorState>,
    // Wells clicked during the current frame
    pending_toggles: Vec<WellToggle>,

    plots: DiagramRegistry,
    open_plots: Vec<Label>,

    status: StatusLine,
}

/// Bottom-bar message. An error stays until the next successful action.
#[derive(Debug, Default)]
struct StatusLine {
    message: Option<String>,
    error: Option<String>,
}

impl StatusLine {
    fn info(&mut self, message: String) {
        self.message = Some(message);
        self.error = None;
    }

    fn report(&mut self, result: Result<String>) {
        match result {
            Ok(message) => self.info(message),
            Err(e) => {
                error!("{e}");
                self.error = Some(e.to_string());
            }
        }
    }
}

impl PlateLayoutApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig, store: PlateStore) -> Self {
        Self {
            config,
            store,
            editors: Label::ALL.into_iter().map(EditorState::new).collect(),
            pending_toggles: Vec::new(),
            plots: DiagramRegistry::default(),
            open_plots: Vec::new(),
            status: StatusLine::default(),
        }
    }

    fn open_editor(&mut self, label: Label) {
        if let Some(editor) = self.editors.iter_mut().find(|e| e.label == label) {
            editor.open = true;
        }
    }

    fn plot(&mut self, label: Label) {
        let diagram = PlateDiagram::build(label, self.store.grid(label), self.config.legend_order);
        self.plots.register(diagram);
        if !self.open_plots.contains(&label) {
            self.open_plots.push(label);
        }
        self.status.info(format!("Plotted {label}"));
    }

    fn export(&mut self, settings: &ExportSettings) {
        let result = self.plots.export(settings).map(|()| {
            let labels: Vec<&str> = self.plots.labels().map(|l| l.as_str()).collect();
            format!("Exported {} to {}", labels.join(", "), settings.path.display())
        });
        self.status.report(result);
    }

    fn export_as(&mut self) {
        let default_name = self
            .config
            .export
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "plot.jpg".to_string());

        if let Some(path) = rfd::FileDialog::new()
            .add_filter("JPEG", &["jpg", "jpeg"])
            .add_filter("PNG", &["png"])
            .set_file_name(default_name)
            .save_file()
        {
            let settings = ExportSettings {
                path,
                ..self.config.export.clone()
            };
            self.export(&settings);
        }
    }

    fn reset(&mut self) {
        self.store.reset_all();
        let result = self.store.save_all().map(|()| "All plates reset".to_string());
        self.status.report(result);
    }

    fn apply_toggles(&mut self) {
        if self.pending_toggles.is_empty() {
            return;
        }
        let toggles = std::mem::take(&mut self.pending_toggles);
        let result = editor::apply_all(&toggles, &self.editors, &mut self.store).map(|n| {
            info!(wells = n, "plate updated");
            match toggles.last() {
                Some(t) => format!("Saved {} {}", t.label, t.well),
                None => String::new(),
            }
        });
        self.status.report(result);
    }
}

impl eframe::App for PlateLayoutApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Status bar
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if let Some(ref err) = self.status.error {
                    ui.colored_label(egui::Color32::RED, err);
                } else if let Some(ref status) = self.status.message {
                    ui.label(status);
                } else {
                    ui.label(format!("Plates in {}", self.store.data_dir().display()));
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Plate Layout");
            ui.separator();

            for label in Label::ALL {
                ui.horizontal(|ui| {
                    if ui
                        .add(egui::Button::new(label.as_str()).min_size(egui::vec2(160.0, 28.0)))
                        .clicked()
                    {
                        self.open_editor(label);
                    }
                    if ui.button("Plot").clicked() {
                        self.plot(label);
                    }
                });
            }

            ui.add_space(10.0);
            ui.separator();

            let can_export = !self.plots.is_empty();
            ui.horizontal(|ui| {
                if ui
                    .add_enabled(can_export, egui::Button::new("Plot All"))
                    .on_hover_text(format!("Write {}", self.config.export.path.display()))
                    .clicked()
                {
                    let settings = self.config.export.clone();
                    self.export(&settings);
                }
                if ui
                    .add_enabled(can_export, egui::Button::new("Export As..."))
                    .clicked()
                {
                    self.export_as();
                }
            });
            if !can_export {
                ui.colored_label(egui::Color32::GRAY, "Plot a label to enable export");
            }

            ui.add_space(10.0);
            ui.horizontal(|ui| {
                if ui.button("Reset").clicked() {
                    self.reset();
                }
                if ui.button("Quit").clicked() {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });
        });

        // Editor windows
        for editor in &mut self.editors {
            if !editor.open {
                continue;
            }
            let label = editor.label;
            let mut open = true;
            egui::Window::new(label.as_str())
                .id(egui::Id::new(("editor", label)))
                .open(&mut open)
                .default_size([1000.0, 500.0])
                .show(ctx, |ui| {
                    show_editor(ui, editor, self.store.grid(label), &mut self.pending_toggles);
                });
            editor.open = open;
        }
        self.apply_toggles();

        // Plot windows
        let mut closed = Vec::new();
        for &label in &self.open_plots {
            let Some(rendered) = self.plots.get(label) else {
                continue;
            };
            let mut open = true;
            egui::Window::new(format!("{label} plot"))
                .id(egui::Id::new(("plot", label)))
                .open(&mut open)
                .show(ctx, |ui| {
                    egui::ScrollArea::both().show(ui, |ui| paint_diagram(ui, &rendered.diagram));
                });
            if !open {
                closed.push(label);
            }
        }
        self.open_plots.retain(|l| !closed.contains(l));
    }
}

fn show_editor(
    ui: &mut egui::Ui,
    editor: &mut EditorState,
    grid: &PlateGrid,
    toggles: &mut Vec<WellToggle>,
) {
    ui.horizontal_top(|ui| {
        ui.vertical(|ui| {
            ui.strong(editor.label.as_str());
            ui.label("Value for next well:");
            ui.add(egui::TextEdit::singleline(&mut editor.pending).desired_width(150.0));
            ui.label("Click an empty well to fill it, a filled well to clear it.");
        });

        ui.separator();

        egui::Grid::new(("plate_grid", editor.label))
            .spacing([4.0, 4.0])
            .show(ui, |ui| {
                ui.label("");
                for col in 1..=COLS {
                    ui.label(col.to_string());
                }
                ui.end_row();

                for well in Well::all() {
                    if well.col() == 0 {
                        ui.label(row_letter(well.row()).to_string());
                    }
                    let value = grid.get(well);
                    let mut button = egui::Button::new(value).min_size(egui::vec2(64.0, 40.0));
                    if !value.is_empty() {
                        button = button.fill(palette::FILLED_BUTTON);
                    }
                    if ui.add(button).on_hover_text(well.to_string()).clicked() {
                        toggles.push(editor.toggle(well));
                    }
                    if well.col() == COLS - 1 {
                        ui.end_row();
                    }
                }
            });
    });
}

fn paint_diagram(ui: &mut egui::Ui, diagram: &PlateDiagram) {
    let cell: f32 = 36.0;
    let label_w: f32 = 28.0;
    let title_h: f32 = 34.0;
    let header_h: f32 = 22.0;
    let legend_gap: f32 = 24.0;
    let legend_font = egui::FontId::proportional(13.0);

    let longest = diagram
        .legend
        .iter()
        .map(|e| {
            ui.fonts(|f| f.layout_no_wrap(e.value.clone(), legend_font.clone(), palette::TEXT))
                .size()
                .x
        })
        .fold(0.0, f32::max);
    let legend_w = (LEGEND_SWATCH + LEGEND_TEXT_GAP + longest).max(120.0);

    let grid_w = cell * COLS as f32;
    let grid_h = cell * ROWS as f32;
    let grid_top = title_h + header_h;
    let (legend_top, legend_h) = legend_span(diagram.legend.len(), grid_top, grid_h, title_h);
    let size = egui::vec2(
        label_w + grid_w + legend_gap + legend_w,
        (grid_top + grid_h).max(legend_top + legend_h) + 8.0,
    );
    let (response, painter) = ui.allocate_painter(size, egui::Sense::hover());
    let origin = response.rect.min;
    painter.rect_filled(response.rect, 0.0, palette::BACKGROUND);

    let grid_x = origin.x + label_w;
    let grid_y = origin.y + grid_top;

    painter.text(
        egui::pos2(grid_x + grid_w / 2.0, origin.y + title_h / 2.0),
        egui::Align2::CENTER_CENTER,
        diagram.title(),
        egui::FontId::proportional(18.0),
        palette::TEXT,
    );

    for col in 0..COLS {
        painter.text(
            egui::pos2(grid_x + col as f32 * cell + cell / 2.0, grid_y - header_h / 2.0),
            egui::Align2::CENTER_CENTER,
            (col + 1).to_string(),
            egui::FontId::proportional(13.0),
            palette::TEXT,
        );
    }
    for row in 0..ROWS {
        painter.text(
            egui::pos2(origin.x + label_w / 2.0, grid_y + row as f32 * cell + cell / 2.0),
            egui::Align2::CENTER_CENTER,
            row_letter(row).to_string(),
            egui::FontId::proportional(13.0),
            palette::TEXT,
        );
    }

    for well in Well::all() {
        let rect = egui::Rect::from_min_size(
            egui::pos2(
                grid_x + well.col() as f32 * cell,
                grid_y + well.row() as f32 * cell,
            ),
            egui::vec2(cell, cell),
        );
        painter.rect_filled(rect, 0.0, diagram.fill(well));
        painter.rect_stroke(
            rect,
            0.0,
            egui::Stroke::new(1.0, palette::BORDER),
            egui::StrokeKind::Inside,
        );
    }

    let legend_x = grid_x + grid_w + legend_gap;
    let mut y = origin.y + legend_top;
    for entry in &diagram.legend {
        let swatch = egui::Rect::from_min_size(
            egui::pos2(legend_x, y + (LEGEND_LINE - LEGEND_SWATCH) / 2.0),
            egui::vec2(LEGEND_SWATCH, LEGEND_SWATCH),
        );
        painter.rect_filled(swatch, 2.0, entry.color);
        painter.text(
            egui::pos2(legend_x + LEGEND_SWATCH + LEGEND_TEXT_GAP, y + LEGEND_LINE / 2.0),
            egui::Align2::LEFT_CENTER,
            &entry.value,
            legend_font.clone(),
            palette::TEXT,
        );
        y += LEGEND_LINE;
    }
}

/// Top offset and height of a legend of `count` lines. The block is centered
/// on the grid and pushed down when it would rise above `min_top`.
fn legend_span(count: usize, grid_top: f32, grid_h: f32, min_top: f32) -> (f32, f32) {
    let height = count as f32 * LEGEND_LINE;
    let top = (grid_top + grid_h / 2.0 - height / 2.0).max(min_top);
    (top, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_status_info_clears_error() {
        let mut status = StatusLine::default();
        status.report(Err(Error::NothingToExport));
        assert!(status.error.is_some());

        status.info("Plotted Donor".to_string());
        assert_eq!(status.error, None);
        assert_eq!(status.message.as_deref(), Some("Plotted Donor"));

        status.report(Ok("All plates reset".to_string()));
        status.report(Err(Error::NothingToExport));
        // the last good message is kept behind the error
        assert_eq!(status.message.as_deref(), Some("All plates reset"));
    }

    #[test]
    fn test_legend_span_grows_past_grid() {
        let (top, height) = legend_span(2, 56.0, 288.0, 34.0);
        assert_eq!(height, 44.0);
        assert_eq!(top, 56.0 + 144.0 - 22.0);

        // 96 values: starts under the title and runs past the grid's bottom
        let (top, height) = legend_span(96, 56.0, 288.0, 34.0);
        assert_eq!(top, 34.0);
        assert_eq!(height, 96.0 * LEGEND_LINE);
        assert!(top + height > 56.0 + 288.0);
    }
}
