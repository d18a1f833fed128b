//! Built-in color palettes for the demo.

use ratatui::style::Color;

/// All runtime colors used in the UI.
#[derive(Debug, Clone)]
pub struct ThemeColors {
    // Tree panel
    pub tree_fg: Color,
    pub tree_selected_bg: Color,
    pub tree_selected_fg: Color,
    pub tree_branch_fg: Color,
    pub tree_chevron_fg: Color,

    // Prices
    pub price_up_fg: Color,
    pub price_down_fg: Color,

    // Status bar
    pub status_fg: Color,
    pub search_fg: Color,

    // Borders
    pub border_fg: Color,

    // Semantic
    pub error_fg: Color,
    pub info_fg: Color,
    pub accent_fg: Color,
    pub dim_fg: Color,
}

/// Dark theme using Catppuccin Mocha palette.
pub fn dark_theme() -> ThemeColors {
    ThemeColors {
        tree_fg: Color::Rgb(205, 214, 244),          // #cdd6f4 (text)
        tree_selected_bg: Color::Rgb(69, 71, 90),    // #45475a (surface1)
        tree_selected_fg: Color::Rgb(205, 214, 244), // #cdd6f4
        tree_branch_fg: Color::Rgb(137, 180, 250),   // #89b4fa (blue)
        tree_chevron_fg: Color::Rgb(108, 112, 134),  // #6c7086 (overlay0)

        price_up_fg: Color::Rgb(2, 192, 118),
        price_down_fg: Color::Rgb(248, 73, 96),

        status_fg: Color::Rgb(205, 214, 244),
        search_fg: Color::Rgb(249, 226, 175), // #f9e2af (yellow)

        border_fg: Color::Rgb(88, 91, 112), // #585b70 (surface2)

        error_fg: Color::Rgb(243, 139, 168), // #f38ba8 (red)
        info_fg: Color::Rgb(137, 180, 250),  // #89b4fa (blue)
        accent_fg: Color::Rgb(203, 166, 247), // #cba6f7 (mauve)
        dim_fg: Color::Rgb(108, 112, 134),   // #6c7086
    }
}

/// Light theme, Catppuccin Latte.
pub fn light_theme() -> ThemeColors {
    ThemeColors {
        tree_fg: Color::Rgb(76, 79, 105),             // #4c4f69 (text)
        tree_selected_bg: Color::Rgb(204, 208, 218),  // #ccd0da (surface1)
        tree_selected_fg: Color::Rgb(76, 79, 105),
        tree_branch_fg: Color::Rgb(30, 102, 245),     // #1e66f5 (blue)
        tree_chevron_fg: Color::Rgb(156, 160, 176),   // #9ca0b0 (overlay0)

        price_up_fg: Color::Rgb(64, 160, 43),  // #40a02b (green)
        price_down_fg: Color::Rgb(210, 15, 57), // #d20f39 (red)

        status_fg: Color::Rgb(76, 79, 105),
        search_fg: Color::Rgb(223, 142, 29), // #df8e1d (yellow)

        border_fg: Color::Rgb(172, 176, 190), // #acb0be (surface2)

        error_fg: Color::Rgb(210, 15, 57),
        info_fg: Color::Rgb(30, 102, 245),
        accent_fg: Color::Rgb(136, 57, 239), // #8839ef (mauve)
        dim_fg: Color::Rgb(156, 160, 176),
    }
}

/// Resolve a palette by name; anything but `"light"` is dark.
pub fn resolve_theme(scheme: &str) -> ThemeColors {
    match scheme {
        "light" => light_theme(),
        _ => dark_theme(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_schemes() {
        assert_eq!(resolve_theme("light").tree_fg, light_theme().tree_fg);
        assert_eq!(resolve_theme("dark").tree_fg, dark_theme().tree_fg);
    }

    #[test]
    fn test_unknown_scheme_falls_back_to_dark() {
        assert_eq!(resolve_theme("neon").price_up_fg, dark_theme().price_up_fg);
    }

    #[test]
    fn test_price_colors_differ() {
        for theme in [dark_theme(), light_theme()] {
            assert_ne!(theme.price_up_fg, theme.price_down_fg);
        }
    }
}
