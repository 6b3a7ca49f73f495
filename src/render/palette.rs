use egui::Color32;

/// Ten-color categorical cycle used for legend entries.
pub const CATEGORICAL: [Color32; 10] = [
    Color32::from_rgb(0x1f, 0x77, 0xb4), // Blue
    Color32::from_rgb(0xff, 0x7f, 0x0e), // Orange
    Color32::from_rgb(0x2c, 0xa0, 0x2c), // Green
    Color32::from_rgb(0xd6, 0x27, 0x28), // Red
    Color32::from_rgb(0x94, 0x67, 0xbd), // Purple
    Color32::from_rgb(0x8c, 0x56, 0x4b), // Brown
    Color32::from_rgb(0xe3, 0x77, 0xc2), // Pink
    Color32::from_rgb(0x7f, 0x7f, 0x7f), // Gray
    Color32::from_rgb(0xbc, 0xbd, 0x22), // Olive
    Color32::from_rgb(0x17, 0xbe, 0xcf), // Cyan
];

/// Fill for unannotated wells (whitesmoke).
pub const EMPTY_WELL: Color32 = Color32::from_rgb(245, 245, 245);
pub const BORDER: Color32 = Color32::BLACK;
pub const TEXT: Color32 = Color32::BLACK;
pub const BACKGROUND: Color32 = Color32::WHITE;
/// Button fill for annotated wells in the editor.
pub const FILLED_BUTTON: Color32 = Color32::from_rgb(169, 169, 169);

pub fn categorical(index: usize) -> Color32 {
    CATEGORICAL[index % CATEGORICAL.len()]
}
