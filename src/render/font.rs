// Chart font registration
// plotters draws text only with a registered TrueType font; the bitmap
// renderer has no built-in glyphs.

use std::path::PathBuf;

use plotters::style::{register_font, FontStyle};

use crate::logger;

/// Family name the chart asks for when drawing text
pub const FONT_FAMILY: &str = "sans-serif";

const SYSTEM_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Register the first readable font, trying `configured` before the system paths
///
/// Call once at startup. Returns the path that was registered, or `None`
/// when charts will have to be drawn without text.
pub fn register_chart_font(configured: Option<&str>) -> Option<PathBuf> {
    for candidate in configured.into_iter().chain(SYSTEM_FONT_PATHS.iter().copied()) {
        let bytes = match std::fs::read(candidate) {
            Ok(bytes) => bytes,
            Err(e) => {
                if configured == Some(candidate) {
                    logger::log_warning(&format!("Cannot read chart font {candidate}: {e}"));
                }
                continue;
            }
        };

        // The font registry holds on to the data for the life of the process
        let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
        if register_font(FONT_FAMILY, FontStyle::Normal, bytes).is_ok() {
            return Some(PathBuf::from(candidate));
        }
        logger::log_warning(&format!("Not a usable TrueType font: {candidate}"));
    }
    None
}
