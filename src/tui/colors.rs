//! Color constants for the terminal user interface.

use ratatui::style::Color;

use crate::fields::Category;

/// Title bar and focused pane border.
pub const ACCENT: Color = Color::Rgb(99, 102, 241);
/// Section headers.
pub const HEADER_GRAY: Color = Color::Rgb(156, 163, 175);
/// Validation messages and destructive dialogs.
pub const ERROR_RED: Color = Color::Rgb(239, 68, 68);
pub const DARK_RED: Color = Color::Rgb(114, 0, 0);

/// Dot color for a category.
pub fn category_color(category: Category) -> Color {
    let (r, g, b) = category.rgb();
    Color::Rgb(r, g, b)
}
