//! Colors, colorscales and outline styles shared by the chart builders.

/// Focus states on the scatter and box plots.
pub const FOCUS: &str = "#FF0066";
pub const OTHER: &str = "#0066FF";
pub const GLOBAL_FIT: &str = "#009999";
pub const SUBSET_FIT: &str = "#FF6600";
pub const SUBSET_EXTENT_FIT: &str = "#FF0000";
pub const DENSITY_INITIAL: &str = "#AAAAFF";
pub const DENSITY_FINAL: &str = "#FF0000";
pub const MAP_BACKGROUND: &str = "rgb(233,233,255)";

/// Sequential blues for the choropleth.
pub const BLUES_SCALE: [(f64, &str); 6] = [
    (0.0, "#eff3ff"),
    (0.2, "#c6dbef"),
    (0.4, "#9ecae1"),
    (0.6, "#6baed6"),
    (0.8, "#3182bd"),
    (1.0, "#08519c"),
];

/// Binary white-to-yellow scale of the spatial-travel highlight layer.
pub const HIGHLIGHT_SCALE: [(f64, &str); 2] = [(0.0, "#ffffff"), (1.0, "#FFFF00")];

const REDS: [&str; 9] = [
    "#fff5f0", "#fee0d2", "#fcbba1", "#fc9272", "#fb6a4a", "#ef3b2c", "#cb181d", "#a50f15",
    "#67000d",
];

/// Fill for values a palette cannot place.
pub const NO_DATA: Rgb = Rgb([0xbd, 0xbd, 0xbd]);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    /// Parses `#RRGGBB`.
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#')?;
        if hex.len() != 6 {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        Some(Self([channel(0)?, channel(2)?, channel(4)?]))
    }

    pub fn to_hex(self) -> String {
        let [r, g, b] = self.0;
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

/// A single color stop along a 1D value domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub v: f64,
    pub rgb: Rgb,
}

/// Continuous palette over strictly increasing stops, interpolated in sRGB.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub stops: Vec<ColorStop>,
}

impl Palette {
    /// Evenly spaced stops over `[0, 1]`.
    pub fn even(colors: &[&str]) -> Option<Self> {
        if colors.len() < 2 {
            return None;
        }
        let last = (colors.len() - 1) as f64;
        let stops = colors
            .iter()
            .enumerate()
            .map(|(i, hex)| {
                Some(ColorStop {
                    v: i as f64 / last,
                    rgb: Rgb::from_hex(hex)?,
                })
            })
            .collect::<Option<Vec<_>>>()?;
        Some(Self { stops })
    }

    /// Nine-step sequential reds over `[0, 1]`.
    pub fn reds() -> Self {
        Self::even(&REDS).unwrap_or(Self {
            stops: vec![
                ColorStop { v: 0.0, rgb: Rgb([0xff, 0xf5, 0xf0]) },
                ColorStop { v: 1.0, rgb: Rgb([0x67, 0x00, 0x0d]) },
            ],
        })
    }

    /// Color at `v`, clamped to the palette's domain. `NaN` maps to
    /// [`NO_DATA`].
    pub fn sample(&self, v: f64) -> Rgb {
        let (Some(first), Some(last)) = (self.stops.first(), self.stops.last()) else {
            return NO_DATA;
        };
        if v.is_nan() {
            return NO_DATA;
        }
        if v <= first.v {
            return first.rgb;
        }
        if v >= last.v {
            return last.rgb;
        }
        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if v <= b.v {
                let t = (v - a.v) / (b.v - a.v);
                let mix = |i: usize| {
                    let (x, y) = (a.rgb.0[i] as f64, b.rgb.0[i] as f64);
                    (x + (y - x) * t).round().clamp(0.0, 255.0) as u8
                };
                return Rgb([mix(0), mix(1), mix(2)]);
            }
        }
        last.rgb
    }
}

/// How a state polygon is drawn on the outline maps.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineStyle {
    pub line_color: &'static str,
    pub line_width: f64,
    pub fill: String,
}

impl OutlineStyle {
    pub fn filled(fill: Rgb) -> Self {
        Self {
            fill: fill.to_hex(),
            ..Self::default()
        }
    }
}

impl Default for OutlineStyle {
    fn default() -> Self {
        Self {
            line_color: "black",
            line_width: 1.5,
            fill: "lightyellow".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{NO_DATA, Palette, Rgb};
    use pretty_assertions::assert_eq;

    #[test]
    fn hex_parses_and_prints() {
        assert_eq!(Rgb::from_hex("#fb6a4a"), Some(Rgb([0xfb, 0x6a, 0x4a])));
        assert_eq!(Rgb([0xfb, 0x6a, 0x4a]).to_hex(), "#fb6a4a");
        assert_eq!(Rgb::from_hex("fb6a4a"), None);
        assert_eq!(Rgb::from_hex("#fb6a"), None);
    }

    #[test]
    fn reds_clamps_and_interpolates() {
        let reds = Palette::reds();
        assert_eq!(reds.stops.len(), 9);
        assert_eq!(reds.sample(-1.0).to_hex(), "#fff5f0");
        assert_eq!(reds.sample(0.0).to_hex(), "#fff5f0");
        assert_eq!(reds.sample(0.5).to_hex(), "#fb6a4a");
        assert_eq!(reds.sample(2.0).to_hex(), "#67000d");
        assert_eq!(reds.sample(f64::NAN), NO_DATA);

        // Halfway between the first two stops.
        let mid = reds.sample(1.0 / 16.0);
        assert_eq!(mid, Rgb([0xff, 0xeb, 0xe1]));
    }
}
