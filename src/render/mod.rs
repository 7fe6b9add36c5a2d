//! Renderer module
//!
//! Turns a validated [`ClimateTable`](crate::data::ClimateTable) into one of:
//! - an HTML page with the temperature chart embedded as base64 PNG
//! - a column-oriented JSON document

pub mod chart;
pub mod font;
pub mod json;
pub mod page;

pub use chart::{render_chart_base64, ChartOptions};
pub use font::register_chart_font;
pub use json::render_json;
pub use page::render_index_page;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ClimateRecord, ClimateTable};
    use crate::error::ClimateError;

    fn sample() -> ClimateTable {
        ClimateTable::from_records(vec![
            ClimateRecord {
                year: 2020,
                temperature: 14.2,
            },
            ClimateRecord {
                year: 2021,
                temperature: 14.5,
            },
        ])
    }

    fn options(labels: bool) -> ChartOptions<'static> {
        ChartOptions {
            width: 1000,
            height: 600,
            title: "Temperature Changes Over Years",
            labels,
        }
    }

    /// Count near-black pixels: axis lines and text
    fn dark_pixels(png: &[u8]) -> usize {
        image::load_from_memory(png)
            .unwrap()
            .to_rgb8()
            .pixels()
            .filter(|p| p.0.iter().all(|c| *c < 64))
            .count()
    }

    #[test]
    fn test_unlabelled_chart_has_no_text() {
        let png = chart::render_chart_png(&sample(), &options(false)).unwrap();
        assert_eq!(dark_pixels(&png), 0);
    }

    #[test]
    fn test_labelled_chart_depends_on_font() {
        match register_chart_font(None) {
            Some(_) => {
                let png = chart::render_chart_png(&sample(), &options(true)).unwrap();
                assert!(dark_pixels(&png) > 0);
            }
            // Text cannot be drawn at all without a registered font
            None => assert!(matches!(
                render_chart_base64(&sample(), &options(true)),
                Err(ClimateError::Render(_))
            )),
        }
    }
}
