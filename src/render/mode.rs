//! Render mode detection
//!
//! Picks between plain ASCII and Unicode glyphs for the viewer.

use std::env;

/// Available glyph sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Classic ASCII characters, works everywhere
    #[default]
    Ascii,

    /// Unicode block and shade symbols
    Unicode,
}

impl RenderMode {
    /// Get a human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            RenderMode::Ascii => "ASCII",
            RenderMode::Unicode => "Unicode",
        }
    }

    /// Cycle to the other mode
    pub fn toggled(self) -> Self {
        match self {
            RenderMode::Ascii => RenderMode::Unicode,
            RenderMode::Unicode => RenderMode::Ascii,
        }
    }
}

/// Detect the best glyph set for the current terminal
pub fn detect_render_mode() -> RenderMode {
    if is_unicode_supported() {
        log::info!("Using Unicode rendering mode");
        return RenderMode::Unicode;
    }

    log::info!("Falling back to ASCII rendering mode");
    RenderMode::Ascii
}

/// Check the locale for UTF-8
fn is_unicode_supported() -> bool {
    ["LC_ALL", "LC_CTYPE", "LANG"]
        .iter()
        .filter_map(|var| env::var(var).ok())
        .any(|value| value.to_uppercase().contains("UTF"))
}
