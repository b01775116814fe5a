//! The fixed color palette used for category charts.

use std::fmt;

use serde::Serialize;

/// A CSS hex color, e.g. `#3498db`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Color(&'static str);

impl Color {
    /// The hex string for this color.
    pub fn hex(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// The colors handed out to categories in the order they are discovered.
pub const PALETTE: [Color; 15] = [
    Color("#3498db"),
    Color("#e74c3c"),
    Color("#2ecc71"),
    Color("#f39c12"),
    Color("#9b59b6"),
    Color("#1abc9c"),
    Color("#34495e"),
    Color("#e67e22"),
    Color("#95a5a6"),
    Color("#d35400"),
    Color("#8e44ad"),
    Color("#27ae60"),
    Color("#2980b9"),
    Color("#c0392b"),
    Color("#16a085"),
];

/// The slice color for income in the income vs expenses chart.
pub const INCOME_COLOR: Color = Color("#2ecc71");

/// The slice color for expenses in the income vs expenses chart.
pub const EXPENSES_COLOR: Color = Color("#e74c3c");

/// Get the palette color for the category discovered at `category_index`.
///
/// Indices past the end of the palette wrap around.
pub fn color_for(category_index: usize) -> Color {
    PALETTE[category_index % PALETTE.len()]
}
