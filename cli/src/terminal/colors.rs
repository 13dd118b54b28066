use colored::Color;

pub const PRIMARY: Color = Color::BrightGreen;
pub const ACCENT: Color = Color::BrightYellow;
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::White;

pub const VERSION: Color = Color::BrightCyan;
pub const HARDWARE: Color = Color::BrightMagenta;
pub const IMAGE: Color = Color::BrightBlue;
