use eframe::egui::Color32;
use palette::{LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Continuous colour scale for the choropleth
// ---------------------------------------------------------------------------

/// ColorBrewer `YlOrRd`, light to dark.
const YL_OR_RD: [(u8, u8, u8); 9] = [
    (0xff, 0xff, 0xcc),
    (0xff, 0xed, 0xa0),
    (0xfe, 0xd9, 0x76),
    (0xfe, 0xb2, 0x4c),
    (0xfd, 0x8d, 0x3c),
    (0xfc, 0x4e, 0x2a),
    (0xe3, 0x1a, 0x1c),
    (0xbd, 0x00, 0x26),
    (0x80, 0x00, 0x26),
];

/// Fill opacity of shaded regions.
pub const FILL_OPACITY: f32 = 0.7;

/// Maps a numeric range onto a multi-stop gradient, interpolating in linear RGB.
#[derive(Debug, Clone)]
pub struct ColorScale {
    pub title: String,
    pub min: f64,
    pub max: f64,
    stops: Vec<LinSrgb>,
}

impl ColorScale {
    /// `YlOrRd` scale over `[min, max]`.
    pub fn yl_or_rd(title: &str, min: f64, max: f64) -> Self {
        let stops: Vec<LinSrgb> = YL_OR_RD
            .iter()
            .map(|&(r, g, b)| Srgb::new(r, g, b).into_format::<f32>().into_linear())
            .collect();
        ColorScale {
            title: title.to_string(),
            min,
            max,
            stops,
        }
    }

    /// Colour for `value`; values outside the range clamp to the ends.
    pub fn color_for(&self, value: f64) -> Color32 {
        let span = self.max - self.min;
        let t = if span > 0.0 {
            ((value - self.min) / span).clamp(0.0, 1.0) as f32
        } else {
            0.5
        };
        let segments = (self.stops.len() - 1) as f32;
        let pos = t * segments;
        let lower = (pos.floor() as usize).min(self.stops.len() - 2);
        let mixed = self.stops[lower].mix(self.stops[lower + 1], pos - lower as f32);
        let rgb: Srgb<u8> = Srgb::<f32>::from_linear(mixed).into_format();
        Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
    }

    /// Same colour with the region fill opacity applied.
    pub fn fill_for(&self, value: f64) -> Color32 {
        let c = self.color_for(value);
        Color32::from_rgba_unmultiplied(c.r(), c.g(), c.b(), (FILL_OPACITY * 255.0) as u8)
    }

    /// `n` evenly spaced legend entries (value label → colour), low to high.
    pub fn legend_entries(&self, n: usize) -> Vec<(String, Color32)> {
        let n = n.max(2);
        (0..n)
            .map(|i| {
                let value = self.min + (self.max - self.min) * i as f64 / (n - 1) as f64;
                (format!("{value:.0}"), self.color_for(value))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_match_palette() {
        let scale = ColorScale::yl_or_rd("AVG PRICE", 100.0, 900.0);
        assert_eq!(scale.color_for(100.0), Color32::from_rgb(0xff, 0xff, 0xcc));
        assert_eq!(scale.color_for(900.0), Color32::from_rgb(0x80, 0x00, 0x26));
    }

    #[test]
    fn test_out_of_range_clamps() {
        let scale = ColorScale::yl_or_rd("AVG PRICE", 0.0, 1.0);
        assert_eq!(scale.color_for(-5.0), scale.color_for(0.0));
        assert_eq!(scale.color_for(5.0), scale.color_for(1.0));
    }

    #[test]
    fn test_degenerate_range_uses_middle() {
        let scale = ColorScale::yl_or_rd("AVG PRICE", 3.0, 3.0);
        assert_eq!(scale.color_for(3.0), Color32::from_rgb(0xfd, 0x8d, 0x3c));
    }

    #[test]
    fn test_legend_entries_span_range() {
        let scale = ColorScale::yl_or_rd("AVG PRICE", 0.0, 100.0);
        let entries = scale.legend_entries(5);
        let labels: Vec<_> = entries.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, vec!["0", "25", "50", "75", "100"]);
    }

    #[test]
    fn test_fill_applies_opacity() {
        let scale = ColorScale::yl_or_rd("AVG PRICE", 0.0, 1.0);
        assert_eq!(scale.fill_for(0.5).a(), (FILL_OPACITY * 255.0) as u8);
    }
}
