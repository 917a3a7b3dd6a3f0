use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

fn hsl_to_color32(hue: f32, saturation: f32, lightness: f32) -> Color32 {
    let rgb: Srgb = Hsl::new(hue, saturation, lightness).into_color();
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
    )
}

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    (0..n)
        .map(|i| hsl_to_color32((i as f32 / n as f32) * 360.0, 0.75, 0.55))
        .collect()
}

// ---------------------------------------------------------------------------
// City colours
// ---------------------------------------------------------------------------

/// Stable colour per city, assigned in sorted order.
#[derive(Debug, Clone, Default)]
pub struct CityColors {
    mapping: BTreeMap<String, Color32>,
}

impl CityColors {
    pub fn new<'a>(cities: impl IntoIterator<Item = &'a String>) -> Self {
        let cities: Vec<&String> = cities.into_iter().collect();
        let mapping = cities
            .iter()
            .zip(generate_palette(cities.len()))
            .map(|(c, color)| ((*c).clone(), color))
            .collect();
        CityColors { mapping }
    }

    pub fn color_for(&self, city: &str) -> Color32 {
        self.mapping.get(city).copied().unwrap_or(Color32::LIGHT_BLUE)
    }
}

// ---------------------------------------------------------------------------
// Correlation heat scale
// ---------------------------------------------------------------------------

/// Blue for negative, red for positive, darker as |r| grows; grey if
/// undefined.
pub fn correlation_color(r: Option<f64>) -> Color32 {
    match r {
        None => Color32::DARK_GRAY,
        Some(r) => {
            let hue = if r < 0.0 { 220.0 } else { 5.0 };
            let strength = r.abs().min(1.0) as f32;
            hsl_to_color32(hue, 0.7, 0.92 - 0.5 * strength)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_size() {
        assert!(generate_palette(0).is_empty());
        assert_eq!(generate_palette(5).len(), 5);
    }

    #[test]
    fn city_colours_are_distinct_and_stable() {
        let cities = vec!["Delhi".to_string(), "Mumbai".to_string()];
        let colors = CityColors::new(&cities);
        assert_ne!(colors.color_for("Delhi"), colors.color_for("Mumbai"));
        assert_eq!(colors.color_for("Oslo"), Color32::LIGHT_BLUE);
    }

    #[test]
    fn correlation_scale_is_diverging() {
        assert_ne!(correlation_color(Some(0.9)), correlation_color(Some(-0.9)));
        assert_eq!(correlation_color(None), Color32::DARK_GRAY);
    }
}
