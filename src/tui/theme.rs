use ratatui::style::Color;

/// Colours used by every widget of the form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub bg: Color,
    pub fg: Color,
    pub muted: Color,
    pub accent: Color,
    pub border: Color,
    pub success: Color,
    pub error: Color,
}

const DARK: Palette = Palette {
    bg: Color::Reset,
    fg: Color::White,
    muted: Color::DarkGray,
    accent: Color::Cyan,
    border: Color::Gray,
    success: Color::Green,
    error: Color::Red,
};

const LIGHT: Palette = Palette {
    bg: Color::White,
    fg: Color::Black,
    muted: Color::Gray,
    accent: Color::Blue,
    border: Color::DarkGray,
    success: Color::Green,
    error: Color::Red,
};

/// Dark/light switch. The label names what pressing it will do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeToggle {
    dark: bool,
}

impl ThemeToggle {
    pub fn new(dark: bool) -> Self {
        Self { dark }
    }

    /// `"light"` starts light, anything else dark
    pub fn from_name(name: &str) -> Self {
        Self::new(!name.eq_ignore_ascii_case("light"))
    }

    pub fn toggle(&mut self) {
        self.dark = !self.dark;
    }

    pub fn is_dark(&self) -> bool {
        self.dark
    }

    pub fn label(&self) -> &'static str {
        if self.dark {
            "Light mode"
        } else {
            "Dark mode"
        }
    }

    pub fn palette(&self) -> Palette {
        if self.dark {
            DARK
        } else {
            LIGHT
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_flips_label_and_palette() {
        let mut theme = ThemeToggle::from_name("dark");
        assert!(theme.is_dark());
        assert_eq!(theme.label(), "Light mode");
        assert_eq!(theme.palette(), DARK);

        theme.toggle();
        assert!(!theme.is_dark());
        assert_eq!(theme.label(), "Dark mode");
        assert_eq!(theme.palette(), LIGHT);

        theme.toggle();
        assert!(theme.is_dark());
    }

    #[test]
    fn test_from_name() {
        assert!(!ThemeToggle::from_name("Light").is_dark());
        assert!(ThemeToggle::from_name("whatever").is_dark());
    }
}
