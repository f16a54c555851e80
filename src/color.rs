use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};
use plotters::style::RGBColor;

// ---------------------------------------------------------------------------
// Shared colours for figure files and the viewer
// ---------------------------------------------------------------------------

/// Hue of the measured series.
pub const MEASURED_HUE: f32 = 215.0;
/// Hue of the `cos²` prediction.
pub const THEORY_HUE: f32 = 5.0;

/// 8-bit sRGB for a hue at the saturation/lightness used everywhere.
pub fn hue_rgb(hue: f32) -> [u8; 3] {
    let hsl = Hsl::new(hue, 0.75, 0.45);
    let rgb: Srgb = hsl.into_color();
    [
        (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
    ]
}

pub fn plot_color(hue: f32) -> RGBColor {
    let [r, g, b] = hue_rgb(hue);
    RGBColor(r, g, b)
}

pub fn ui_color(hue: f32) -> Color32 {
    let [r, g, b] = hue_rgb(hue);
    Color32::from_rgb(r, g, b)
}

/// Generates `n` visually distinct colours using evenly spaced hues.
///
/// Used to tell entries apart in the viewer's side panel and table.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| ui_color((i as f32 / n as f32) * 360.0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measured_is_bluish_and_theory_reddish() {
        let [r, _, b] = hue_rgb(MEASURED_HUE);
        assert!(b > r);
        let [r, _, b] = hue_rgb(THEORY_HUE);
        assert!(r > b);
    }

    #[test]
    fn palette_has_requested_size() {
        assert!(generate_palette(0).is_empty());
        let p = generate_palette(5);
        assert_eq!(p.len(), 5);
        assert_ne!(p[0], p[1]);
    }
}
