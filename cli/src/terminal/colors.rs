use colored::Color;

pub const PRIMARY: Color = Color::TrueColor { r: 137, g: 180, b: 250 };
pub const ACCENT: Color = Color::TrueColor { r: 250, g: 179, b: 135 };
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::TrueColor { r: 205, g: 214, b: 244 };

pub const MODEL: Color = Color::TrueColor { r: 166, g: 227, b: 161 };
pub const ENDPOINT: Color = Color::TrueColor { r: 148, g: 226, b: 213 };
pub const FAILURE: Color = Color::TrueColor { r: 243, g: 139, b: 168 };
