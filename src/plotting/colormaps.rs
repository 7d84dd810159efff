//! Colormaps: viridis comes with plotters, the others are piecewise-linear tables
//! sampled from matplotlib.
use crate::errors::{RenderError, RenderResult};
use plotters::style::RGBColor;
use plotters::style::colors::colormaps::ViridisRGB;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

type Anchors = &'static [(f64, (u8, u8, u8))];

const GREYS: Anchors = &[
    (0.0, (255, 255, 255)),
    (0.25, (217, 217, 217)),
    (0.5, (150, 150, 150)),
    (0.75, (82, 82, 82)),
    (1.0, (0, 0, 0)),
];
const AUTUMN: Anchors = &[(0.0, (255, 0, 0)), (1.0, (255, 255, 0))];
const COOLWARM: Anchors = &[
    (0.0, (59, 76, 192)),
    (0.25, (141, 176, 254)),
    (0.5, (221, 221, 221)),
    (0.75, (244, 154, 123)),
    (1.0, (180, 4, 38)),
];
const REDS: Anchors = &[
    (0.0, (255, 245, 240)),
    (0.25, (252, 187, 161)),
    (0.5, (251, 106, 74)),
    (0.75, (203, 24, 29)),
    (1.0, (103, 0, 13)),
];
const BLUES: Anchors = &[
    (0.0, (247, 251, 255)),
    (0.25, (198, 219, 239)),
    (0.5, (107, 174, 214)),
    (0.75, (33, 113, 181)),
    (1.0, (8, 48, 107)),
];

/// the palest end of the level families is nearly white; level colours start here
const FAMILY_OFFSET: f64 = 0.2;

fn interpolate(anchors: Anchors, t: f64) -> RGBColor {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    for pair in anchors.windows(2) {
        let (t0, c0) = pair[0];
        let (t1, c1) = pair[1];
        if t <= t1 {
            let s = if t1 > t0 { (t - t0) / (t1 - t0) } else { 0.0 };
            let mix = |a: u8, b: u8| (a as f64 + s * (b as f64 - a as f64)).round() as u8;
            return RGBColor(mix(c0.0, c1.0), mix(c0.1, c1.1), mix(c0.2, c1.2));
        }
    }
    let (_, c) = anchors[anchors.len() - 1];
    RGBColor(c.0, c.1, c.2)
}

/// Colormaps offered for the heatmap panel.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Colormap {
    #[default]
    Viridis,
    Greys,
    Autumn,
    Coolwarm,
}

impl Colormap {
    pub fn by_name(name: &str) -> RenderResult<Colormap> {
        Colormap::from_str(name.trim()).map_err(|_| {
            let known: Vec<String> = Colormap::iter().map(|c| c.to_string()).collect();
            RenderError::invalid(
                "colormap",
                name,
                &format!("expected one of {}", known.join(", ")),
            )
        })
    }

    /// Colour at `t` in `[0, 1]`; out of range values are clamped.
    pub fn color_at(&self, t: f64) -> RGBColor {
        match self {
            Colormap::Viridis => {
                // plotters' map panics on NaN
                let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
                ViridisRGB::get_color(t)
            }
            Colormap::Greys => interpolate(GREYS, t),
            Colormap::Autumn => interpolate(AUTUMN, t),
            Colormap::Coolwarm => interpolate(COOLWARM, t),
        }
    }
}

/// Position of the `distance`-th level (1 = nearest to the basepoint) in its family.
fn family_position(distance: usize, count: usize) -> f64 {
    if count <= 1 {
        return FAMILY_OFFSET;
    }
    let s = (distance.saturating_sub(1)) as f64 / (count - 1) as f64;
    FAMILY_OFFSET + (1.0 - FAMILY_OFFSET) * s.clamp(0.0, 1.0)
}

/// Red family for levels above the basepoint, lightest nearest to it.
pub fn above_level_color(distance: usize, count: usize) -> RGBColor {
    interpolate(REDS, family_position(distance, count))
}

/// Blue family for levels below the basepoint, lightest nearest to it.
pub fn below_level_color(distance: usize, count: usize) -> RGBColor {
    interpolate(BLUES, family_position(distance, count))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lightness(c: RGBColor) -> u32 {
        c.0 as u32 + c.1 as u32 + c.2 as u32
    }

    #[test]
    fn test_end_points() {
        assert_eq!(Colormap::Viridis.color_at(0.0), RGBColor(68, 1, 84));
        assert_eq!(Colormap::Viridis.color_at(1.0), RGBColor(254, 232, 37));
        assert_eq!(Colormap::Viridis.color_at(f64::NAN), RGBColor(68, 1, 84));
        assert_eq!(Colormap::Viridis.color_at(2.0), RGBColor(254, 232, 37));
        assert_eq!(Colormap::Greys.color_at(0.0), RGBColor(255, 255, 255));
        assert_eq!(Colormap::Greys.color_at(1.0), RGBColor(0, 0, 0));
        assert_eq!(Colormap::Autumn.color_at(0.5), RGBColor(255, 128, 0));
        // clamped
        assert_eq!(Colormap::Coolwarm.color_at(-3.0), RGBColor(59, 76, 192));
        assert_eq!(Colormap::Coolwarm.color_at(7.0), RGBColor(180, 4, 38));
    }

    #[test]
    fn test_names() {
        assert_eq!(Colormap::by_name("greys").unwrap(), Colormap::Greys);
        assert_eq!(Colormap::by_name(" coolwarm ").unwrap(), Colormap::Coolwarm);
        assert_eq!(Colormap::default(), Colormap::Viridis);
        assert_eq!(Colormap::Autumn.to_string(), "autumn");
        assert!(matches!(
            Colormap::by_name("jet"),
            Err(RenderError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_level_families_darken_outward() {
        for k in 1..15 {
            assert!(lightness(above_level_color(k, 15)) > lightness(above_level_color(k + 1, 15)));
            assert!(lightness(below_level_color(k, 15)) > lightness(below_level_color(k + 1, 15)));
        }
        let red = above_level_color(15, 15);
        assert!(red.0 > red.2);
        let blue = below_level_color(15, 15);
        assert!(blue.2 > blue.0);
    }
}
