//! Light and dark color palettes for the terminal UI.
//!
//! Colors are RGB approximations of a gray/blue design scale so the chat looks
//! the same in light and dark terminals regardless of their own color scheme.

use corpspeak_core::ThemeMode;
use ratatui::style::{Color, Modifier, Style};

const GRAY_50: Color = Color::Rgb(0xF7, 0xFA, 0xFC);
const GRAY_200: Color = Color::Rgb(0xE2, 0xE8, 0xF0);
const GRAY_300: Color = Color::Rgb(0xCB, 0xD5, 0xE0);
const GRAY_500: Color = Color::Rgb(0x71, 0x80, 0x96);
const GRAY_600: Color = Color::Rgb(0x4A, 0x55, 0x68);
const GRAY_700: Color = Color::Rgb(0x2D, 0x37, 0x48);
const GRAY_800: Color = Color::Rgb(0x1A, 0x20, 0x2C);
const GRAY_900: Color = Color::Rgb(0x17, 0x19, 0x23);
const BLUE_50: Color = Color::Rgb(0xEB, 0xF8, 0xFF);
const BLUE_500: Color = Color::Rgb(0x31, 0x82, 0xCE);
const BLUE_900: Color = Color::Rgb(0x1A, 0x36, 0x5D);
const WHITE: Color = Color::Rgb(0xFF, 0xFF, 0xFF);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    /// App background
    pub background: Color,
    /// Header, side panels and assistant bubbles
    pub surface: Color,
    pub text: Color,
    pub text_muted: Color,
    pub border: Color,
    pub border_focused: Color,
    pub accent: Color,
    pub user_bubble: Color,
    pub assistant_bubble: Color,
}

impl Palette {
    pub fn light() -> Self {
        Self {
            background: GRAY_50,
            surface: WHITE,
            text: GRAY_800,
            text_muted: GRAY_500,
            border: GRAY_200,
            border_focused: BLUE_500,
            accent: BLUE_500,
            user_bubble: BLUE_50,
            assistant_bubble: WHITE,
        }
    }

    pub fn dark() -> Self {
        Self {
            background: GRAY_900,
            surface: GRAY_800,
            text: WHITE,
            text_muted: GRAY_500,
            border: GRAY_700,
            border_focused: BLUE_500,
            accent: BLUE_500,
            user_bubble: BLUE_900,
            assistant_bubble: GRAY_800,
        }
    }

    pub fn for_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Light => Self::light(),
            ThemeMode::Dark => Self::dark(),
        }
    }

    pub fn base(&self) -> Style {
        Style::default().fg(self.text).bg(self.background)
    }

    pub fn surface(&self) -> Style {
        Style::default().fg(self.text).bg(self.surface)
    }

    pub fn muted(&self) -> Style {
        Style::default().fg(self.text_muted)
    }

    pub fn border(&self, focused: bool) -> Style {
        let color = if focused { self.border_focused } else { self.border };
        Style::default().fg(color)
    }

    pub fn label(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    /// Scrollbar thumb, a step lighter than the border
    pub fn scrollbar(&self) -> Color {
        if self.background == GRAY_900 { GRAY_600 } else { GRAY_300 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_selects_palette() {
        assert_eq!(Palette::for_mode(ThemeMode::Light), Palette::light());
        assert_eq!(Palette::for_mode(ThemeMode::Dark), Palette::dark());
    }

    #[test]
    fn test_palettes_differ_where_it_matters() {
        let light = Palette::light();
        let dark = Palette::dark();
        assert_ne!(light.background, dark.background);
        assert_ne!(light.text, dark.text);
        assert_ne!(light.user_bubble, dark.user_bubble);
        assert_eq!(light.accent, dark.accent);
    }

    #[test]
    fn test_scrollbar_follows_mode() {
        assert_eq!(Palette::dark().scrollbar(), GRAY_600);
        assert_eq!(Palette::light().scrollbar(), GRAY_300);
    }
}
