//! Color themes for the dashboard.
//!
//! Four schemes, selected with `--theme`.

use ratatui::style::Color;
use std::fmt;

/// Available color themes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    /// Nord-inspired theme (default) - modern muted colors
    #[default]
    Nord,
    /// Classic DOS Blue - bright white on blue background
    DosBlue,
    /// Amber CRT - orange/amber text on black (retro terminal)
    AmberCrt,
    /// Green Phosphor - green text on black (classic terminal)
    GreenPhosphor,
}

impl std::str::FromStr for Theme {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "nord" => Ok(Theme::Nord),
            "dos" | "dosblue" | "dos-blue" => Ok(Theme::DosBlue),
            "amber" | "ambercrt" | "amber-crt" => Ok(Theme::AmberCrt),
            "green" | "greenphosphor" | "green-phosphor" => Ok(Theme::GreenPhosphor),
            _ => Err(format!(
                "Unknown theme '{s}'. Available: nord, dos-blue, amber-crt, green-phosphor"
            )),
        }
    }
}

impl Theme {
    pub fn colors(&self) -> ColorScheme {
        match self {
            Theme::Nord => ColorScheme::nord(),
            Theme::DosBlue => ColorScheme::dos_blue(),
            Theme::AmberCrt => ColorScheme::amber_crt(),
            Theme::GreenPhosphor => ColorScheme::green_phosphor(),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Nord => write!(f, "nord"),
            Theme::DosBlue => write!(f, "dos-blue"),
            Theme::AmberCrt => write!(f, "amber-crt"),
            Theme::GreenPhosphor => write!(f, "green-phosphor"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ColorScheme {
    pub background: Color,
    /// Primary text color
    pub text: Color,
    /// Labels and secondary info
    pub text_dim: Color,
    pub border: Color,
    /// Title bar and section headings
    pub accent: Color,
    pub selection_bg: Color,
    pub selection_fg: Color,
    /// Connected, confirmed
    pub ok: Color,
    /// Connecting, searching, mempool
    pub warn: Color,
    pub error: Color,
    /// Block results, hashes
    pub info: Color,
    /// Fill of the recent-blocks bars
    pub bar: Color,
}

impl ColorScheme {
    pub fn nord() -> Self {
        Self {
            background: Color::Reset,
            text: Color::White,
            text_dim: Color::DarkGray,
            border: Color::Gray,
            accent: Color::Rgb(255, 215, 0),
            selection_bg: Color::Yellow,
            selection_fg: Color::Black,
            ok: Color::Green,
            warn: Color::Yellow,
            error: Color::Red,
            info: Color::Cyan,
            bar: Color::Rgb(247, 147, 26),
        }
    }

    pub fn dos_blue() -> Self {
        Self {
            background: Color::Blue,
            text: Color::White,
            text_dim: Color::LightBlue,
            border: Color::Cyan,
            accent: Color::Yellow,
            selection_bg: Color::Cyan,
            selection_fg: Color::Black,
            ok: Color::LightGreen,
            warn: Color::Yellow,
            error: Color::LightRed,
            info: Color::LightCyan,
            bar: Color::White,
        }
    }

    pub fn amber_crt() -> Self {
        let amber = Color::Rgb(255, 176, 0);
        let amber_bright = Color::Rgb(255, 200, 100);
        let amber_dim = Color::Rgb(180, 120, 0);

        Self {
            background: Color::Black,
            text: amber,
            text_dim: amber_dim,
            border: amber_dim,
            accent: amber_bright,
            selection_bg: amber,
            selection_fg: Color::Black,
            ok: amber_bright,
            warn: amber,
            error: Color::Red,
            info: amber_bright,
            bar: amber,
        }
    }

    pub fn green_phosphor() -> Self {
        let green = Color::Rgb(0, 255, 0);
        let green_dim = Color::Rgb(0, 180, 0);
        let green_bright = Color::Rgb(100, 255, 100);

        Self {
            background: Color::Black,
            text: green,
            text_dim: green_dim,
            border: green_dim,
            accent: green_bright,
            selection_bg: green,
            selection_fg: Color::Black,
            ok: green_bright,
            warn: green,
            // Red stands out against green
            error: Color::Red,
            info: green_bright,
            bar: green,
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::nord()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_parsing() {
        assert_eq!("nord".parse::<Theme>().unwrap(), Theme::Nord);
        assert_eq!("NORD".parse::<Theme>().unwrap(), Theme::Nord);
        assert_eq!("dos".parse::<Theme>().unwrap(), Theme::DosBlue);
        assert_eq!("dos-blue".parse::<Theme>().unwrap(), Theme::DosBlue);
        assert_eq!("amber".parse::<Theme>().unwrap(), Theme::AmberCrt);
        assert_eq!("green".parse::<Theme>().unwrap(), Theme::GreenPhosphor);
        assert!("invalid".parse::<Theme>().is_err());
    }

    #[test]
    fn display_round_trips() {
        for theme in [Theme::Nord, Theme::DosBlue, Theme::AmberCrt, Theme::GreenPhosphor] {
            assert_eq!(theme.to_string().parse::<Theme>().unwrap(), theme);
        }
    }

    #[test]
    fn error_color_stays_distinct() {
        for theme in [Theme::Nord, Theme::DosBlue, Theme::AmberCrt, Theme::GreenPhosphor] {
            let c = theme.colors();
            assert_ne!(c.error, c.ok);
            assert_ne!(c.selection_bg, c.selection_fg);
        }
    }
}
