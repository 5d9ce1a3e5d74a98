use clap::ValueEnum;
use ratatui::style::Color;
use serde::Deserialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::Dark => Palette {
                background: Color::Black,
                foreground: Color::White,
                muted: Color::Gray,
                accent: Color::Cyan,
                highlight: Color::DarkGray,
                online: Color::Green,
                offline: Color::Red,
                other: Color::Yellow,
            },
            Theme::Light => Palette {
                background: Color::White,
                foreground: Color::Black,
                muted: Color::DarkGray,
                accent: Color::Blue,
                highlight: Color::Gray,
                online: Color::Rgb(0, 128, 0),
                offline: Color::Rgb(178, 34, 34),
                other: Color::Rgb(184, 134, 11),
            },
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Color,
    pub foreground: Color,
    pub muted: Color,
    pub accent: Color,
    pub highlight: Color,
    pub online: Color,
    pub offline: Color,
    pub other: Color,
}

impl Palette {
    /// Colour for a status label, keyed by its lowercase class
    pub fn status(&self, class: &str) -> Color {
        match class {
            "online" => self.online,
            "offline" => self.offline,
            _ => self.other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_between_themes() {
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Theme::Dark.toggled().toggled(), Theme::Dark);
    }

    #[test]
    fn status_colours_follow_class() {
        let p = Theme::Dark.palette();
        assert_eq!(p.status("online"), Color::Green);
        assert_eq!(p.status("offline"), Color::Red);
        assert_eq!(p.status("maintenance"), Color::Yellow);
    }
}
