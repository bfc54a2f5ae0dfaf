use palette::Srgb;
use plotters::style::RGBColor;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Colour names → RGB
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq)]
#[error("unknown colour '{0}' (expected a CSS colour name or #rrggbb)")]
pub struct UnknownColor(pub String);

/// Resolve a CSS colour name (`"green"`, `"DarkOrange"`) or a hex triplet
/// (`"#1f77b4"`, `"#fa0"`) to an RGB colour.
pub fn resolve_color(name: &str) -> Result<RGBColor, UnknownColor> {
    let name = name.trim();

    let rgb: Option<Srgb<u8>> = if name.starts_with('#') {
        name.parse::<Srgb<u8>>().ok()
    } else {
        palette::named::from_str(&name.to_ascii_lowercase())
    };

    rgb.map(|c| RGBColor(c.red, c.green, c.blue))
        .ok_or_else(|| UnknownColor(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_colours_resolve_case_insensitively() {
        assert_eq!(resolve_color("green").unwrap(), RGBColor(0, 128, 0));
        assert_eq!(resolve_color("Yellow").unwrap(), RGBColor(255, 255, 0));
    }

    #[test]
    fn hex_colours_resolve() {
        assert_eq!(resolve_color("#1f77b4").unwrap(), RGBColor(0x1f, 0x77, 0xb4));
    }

    #[test]
    fn unknown_names_are_rejected() {
        let err = resolve_color("blurple").unwrap_err();
        assert_eq!(err, UnknownColor("blurple".to_string()));
    }
}
