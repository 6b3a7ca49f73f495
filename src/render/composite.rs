//! Composite export of every plotted label
//!
//! Plotting a label registers a raster snapshot of its diagram. The composite
//! arranges those snapshots on a two-row grid and writes one image.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::codecs::jpeg::{JpegEncoder, PixelDensity};
use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use tracing::{debug, info};

use super::diagram::PlateDiagram;
use super::palette;
use super::raster;
use crate::error::{Error, Result};
use crate::plate::Label;

const COMPOSITE_ROWS: usize = 2;
const JPEG_QUALITY: u8 = 95;

/// Output file and page geometry for the composite image.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSettings {
    pub path: PathBuf,
    /// Page width in inches
    pub width_in: f32,
    /// Page height in inches
    pub height_in: f32,
    pub dpi: u16,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("plot.jpg"),
            width_in: 29.7,
            height_in: 21.0,
            dpi: 300,
        }
    }
}

impl ExportSettings {
    pub fn pixel_size(&self) -> (u32, u32) {
        let px = |inches: f32| ((inches * self.dpi as f32).round() as u32).max(1);
        (px(self.width_in), px(self.height_in))
    }
}

/// Slot arrangement for `count` snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompositeLayout {
    pub rows: usize,
    pub cols: usize,
    pub count: usize,
}

impl CompositeLayout {
    pub fn for_count(count: usize) -> Self {
        Self {
            rows: COMPOSITE_ROWS,
            cols: count.div_ceil(COMPOSITE_ROWS).max(1),
            count,
        }
    }

    pub fn blank_slots(&self) -> usize {
        self.rows * self.cols - self.count
    }

    /// (row, col) of the i-th snapshot.
    pub fn slot(&self, index: usize) -> (usize, usize) {
        (index / self.cols, index % self.cols)
    }
}

/// A plotted diagram together with its raster snapshot.
pub struct RenderedDiagram {
    pub diagram: PlateDiagram,
    pub snapshot: RgbImage,
}

/// Plotted diagrams in the order they were first plotted.
#[derive(Default)]
pub struct DiagramRegistry {
    entries: Vec<RenderedDiagram>,
}

impl DiagramRegistry {
    /// Rasterize and store `diagram`. Re-plotting a label replaces its
    /// snapshot without moving it.
    pub fn register(&mut self, diagram: PlateDiagram) -> &RenderedDiagram {
        let label = diagram.label;
        let rendered = RenderedDiagram {
            snapshot: raster::rasterize(&diagram),
            diagram,
        };
        let index = match self.entries.iter().position(|e| e.diagram.label == label) {
            Some(i) => {
                self.entries[i] = rendered;
                i
            }
            None => {
                self.entries.push(rendered);
                self.entries.len() - 1
            }
        };
        &self.entries[index]
    }

    pub fn get(&self, label: Label) -> Option<&RenderedDiagram> {
        self.entries.iter().find(|e| e.diagram.label == label)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = Label> + '_ {
        self.entries.iter().map(|e| e.diagram.label)
    }

    pub fn compose(&self, settings: &ExportSettings) -> Result<RgbImage> {
        let snapshots: Vec<&RgbImage> = self.entries.iter().map(|e| &e.snapshot).collect();
        compose(&snapshots, settings)
    }

    pub fn export(&self, settings: &ExportSettings) -> Result<()> {
        let img = self.compose(settings)?;
        write_image(&img, settings)?;
        info!(
            path = %settings.path.display(),
            plots = self.len(),
            width = img.width(),
            height = img.height(),
            "composite exported"
        );
        Ok(())
    }
}

/// Place each snapshot, scaled to fit and centered, in its slot. Slots past
/// the last snapshot are left blank.
pub fn compose(snapshots: &[&RgbImage], settings: &ExportSettings) -> Result<RgbImage> {
    if snapshots.is_empty() {
        return Err(Error::NothingToExport);
    }
    let layout = CompositeLayout::for_count(snapshots.len());
    debug!(
        rows = layout.rows,
        cols = layout.cols,
        blank = layout.blank_slots(),
        "composite layout"
    );
    let (width, height) = settings.pixel_size();
    let bg = palette::BACKGROUND;
    let mut canvas = RgbImage::from_pixel(width, height, Rgb([bg.r(), bg.g(), bg.b()]));

    let slot_w = width / layout.cols as u32;
    let slot_h = height / layout.rows as u32;

    for (i, snapshot) in snapshots.iter().enumerate() {
        let (row, col) = layout.slot(i);
        let scale = (slot_w as f32 / snapshot.width() as f32)
            .min(slot_h as f32 / snapshot.height() as f32);
        let w = ((snapshot.width() as f32 * scale) as u32).max(1);
        let h = ((snapshot.height() as f32 * scale) as u32).max(1);
        let resized = imageops::resize(*snapshot, w, h, FilterType::Triangle);

        let x = col as u32 * slot_w + (slot_w.saturating_sub(w)) / 2;
        let y = row as u32 * slot_h + (slot_h.saturating_sub(h)) / 2;
        imageops::overlay(&mut canvas, &resized, x as i64, y as i64);
    }

    Ok(canvas)
}

fn is_jpeg(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"))
        .unwrap_or(false)
}

/// Write `img` to `settings.path`. JPEG output carries the DPI; other
/// formats are picked from the extension.
pub fn write_image(img: &RgbImage, settings: &ExportSettings) -> Result<()> {
    let path = settings.path.as_path();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    if is_jpeg(path) {
        let file = File::create(path).map_err(|e| Error::io(path, e))?;
        let mut writer = BufWriter::new(file);
        {
            let mut encoder = JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY);
            encoder.set_pixel_density(PixelDensity::dpi(settings.dpi));
            encoder.encode_image(img)?;
        }
        // the encoder leaves its last bytes buffered
        writer.flush().map_err(|e| Error::io(path, e))?;
    } else {
        img.save(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plate::{PlateGrid, Well};
    use crate::render::diagram::LegendOrdering;

    fn small_settings(path: PathBuf) -> ExportSettings {
        ExportSettings {
            path,
            width_in: 3.0,
            height_in: 2.0,
            dpi: 50,
        }
    }

    fn is_red(p: &Rgb<u8>) -> bool {
        p.0[0] > 200 && p.0[1] < 50 && p.0[2] < 50
    }

    #[test]
    fn test_layout_five() {
        let layout = CompositeLayout::for_count(5);
        assert_eq!((layout.rows, layout.cols), (2, 3));
        assert_eq!(layout.blank_slots(), 1);
        assert_eq!(layout.slot(4), (1, 1));
    }

    #[test]
    fn test_layout_small_counts() {
        let one = CompositeLayout::for_count(1);
        assert_eq!((one.rows, one.cols, one.blank_slots()), (2, 1, 1));
        let four = CompositeLayout::for_count(4);
        assert_eq!((four.cols, four.blank_slots()), (2, 0));
        assert_eq!(CompositeLayout::for_count(0).cols, 1);
    }

    #[test]
    fn test_compose_leaves_blank_slot() {
        let red = RgbImage::from_pixel(30, 20, Rgb([255, 0, 0]));
        let snapshots = vec![&red; 5];
        let settings = small_settings(PathBuf::from("unused.png"));
        let img = compose(&snapshots, &settings).unwrap();
        assert_eq!(img.dimensions(), (150, 100));

        // 3 columns of 50px, 2 rows of 50px
        for (col, row) in [(0, 0), (1, 0), (2, 0), (0, 1), (1, 1)] {
            assert!(is_red(img.get_pixel(col * 50 + 25, row * 50 + 25)));
        }
        assert_eq!(*img.get_pixel(2 * 50 + 25, 50 + 25), Rgb([255, 255, 255]));
    }

    #[test]
    fn test_compose_empty_is_error() {
        let settings = small_settings(PathBuf::from("unused.png"));
        assert!(matches!(compose(&[], &settings), Err(Error::NothingToExport)));
        assert!(matches!(
            DiagramRegistry::default().export(&settings),
            Err(Error::NothingToExport)
        ));
    }

    #[test]
    fn test_register_replaces_in_place() {
        let mut registry = DiagramRegistry::default();
        let mut grid = PlateGrid::empty();
        for label in [Label::Donor, Label::ConditionName] {
            registry.register(PlateDiagram::build(label, &grid, LegendOrdering::FirstWell));
        }
        grid.set(Well::new(0, 0).unwrap(), "D1");
        let rendered =
            registry.register(PlateDiagram::build(Label::Donor, &grid, LegendOrdering::FirstWell));
        assert_eq!(rendered.diagram.legend.len(), 1);

        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.labels().collect::<Vec<_>>(),
            [Label::Donor, Label::ConditionName]
        );
        assert_eq!(registry.get(Label::Donor).unwrap().diagram.legend.len(), 1);
        assert!(registry.get(Label::CellsPerWell).is_none());
    }

    #[test]
    fn test_export_writes_jpeg_and_png() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = DiagramRegistry::default();
        for label in Label::ALL {
            registry.register(PlateDiagram::build(
                label,
                &PlateGrid::empty(),
                LegendOrdering::FirstWell,
            ));
        }

        for name in ["out/plot.jpg", "plot.png"] {
            let settings = small_settings(dir.path().join(name));
            registry.export(&settings).unwrap();
            let written = image::open(&settings.path).unwrap();
            assert_eq!((written.width(), written.height()), (150, 100));
        }
    }

    #[test]
    fn test_export_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();

        let mut registry = DiagramRegistry::default();
        registry.register(PlateDiagram::build(
            Label::Donor,
            &PlateGrid::empty(),
            LegendOrdering::FirstWell,
        ));
        let settings = small_settings(blocker.join("plot.jpg"));
        assert!(registry.export(&settings).is_err());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_jpeg_write_failure_is_reported() {
        // /dev/full accepts the open and fails every write with ENOSPC. The
        // small image fits the write buffer, so only the final flush fails.
        let full = Path::new("/dev/full");
        if !full.exists() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plot.jpg");
        std::os::unix::fs::symlink(full, &path).unwrap();

        let img = RgbImage::from_pixel(8, 8, Rgb([255, 255, 255]));
        let result = write_image(&img, &small_settings(path));
        assert!(matches!(result, Err(Error::Io { .. })), "{result:?}");
    }
}
