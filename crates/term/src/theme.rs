//! Light and dark color themes.

use crate::fb::{CellStyle, Rgb};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeKind {
    Light,
    #[default]
    Dark,
}

impl ThemeKind {
    pub fn toggle(self) -> Self {
        match self {
            ThemeKind::Light => ThemeKind::Dark,
            ThemeKind::Dark => ThemeKind::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeKind::Light => "light",
            ThemeKind::Dark => "dark",
        }
    }
}

/// Colors for every non-train element on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub kind: ThemeKind,
    pub background: Rgb,
    /// Correct picks, selection cursor.
    pub primary: Rgb,
    /// Positive feedback.
    pub secondary: Rgb,
    /// Combo meter fill, express banner.
    pub accent: Rgb,
    pub error: Rgb,
    pub text: Rgb,
    pub button: Rgb,
    pub track: Rgb,
    pub rail: Rgb,
}

impl Theme {
    pub const fn light() -> Self {
        Self {
            kind: ThemeKind::Light,
            background: Rgb::new(245, 245, 245),
            primary: Rgb::new(66, 133, 244),
            secondary: Rgb::new(52, 168, 83),
            accent: Rgb::new(251, 188, 4),
            error: Rgb::new(234, 67, 53),
            text: Rgb::new(32, 33, 36),
            button: Rgb::new(255, 255, 255),
            track: Rgb::new(200, 200, 200),
            rail: Rgb::new(100, 100, 100),
        }
    }

    pub const fn dark() -> Self {
        Self {
            kind: ThemeKind::Dark,
            background: Rgb::new(30, 30, 30),
            primary: Rgb::new(138, 180, 248),
            secondary: Rgb::new(129, 201, 149),
            accent: Rgb::new(253, 214, 99),
            error: Rgb::new(242, 139, 130),
            text: Rgb::new(232, 234, 237),
            button: Rgb::new(70, 70, 70),
            track: Rgb::new(70, 70, 70),
            rail: Rgb::new(200, 200, 200),
        }
    }

    pub fn of(kind: ThemeKind) -> Self {
        match kind {
            ThemeKind::Light => Self::light(),
            ThemeKind::Dark => Self::dark(),
        }
    }

    pub fn toggled(&self) -> Self {
        Self::of(self.kind.toggle())
    }

    /// Plain text on the background.
    pub fn text_style(&self) -> CellStyle {
        CellStyle::new(self.text, self.background)
    }

    pub fn label_style(&self) -> CellStyle {
        self.text_style().bold()
    }

    pub fn muted_style(&self) -> CellStyle {
        CellStyle::new(self.text.mix(self.background, 0.5), self.background)
    }

    pub fn fg_style(&self, fg: Rgb) -> CellStyle {
        CellStyle::new(fg, self.background)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_round_trips() {
        let dark = Theme::default();
        assert_eq!(dark.kind, ThemeKind::Dark);
        let light = dark.toggled();
        assert_eq!(light, Theme::light());
        assert_eq!(light.toggled(), dark);
    }

    #[test]
    fn text_contrasts_background() {
        for theme in [Theme::light(), Theme::dark()] {
            let diff = (theme.text.luma() as i32 - theme.background.luma() as i32).abs();
            assert!(diff > 150, "{:?} text too close to background", theme.kind);
        }
    }
}
