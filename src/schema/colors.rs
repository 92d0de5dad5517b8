//! Colour codes used by `G:` display lines.
//!
//! The documented palette is 16 single-letter codes:
//!
//! ```text
//! D - Dark Gray    w - White          s - Gray          o - Orange
//! r - Red          g - Green          b - Blue          u - Brown
//! d - Black        W - Light Gray     v - Violet        y - Yellow
//! R - Light Red    G - Light Green    B - Light Blue    U - Light Brown
//! ```
//!
//! Real data files also use undocumented extended codes (a base letter
//! plus a numeric suffix, e.g. `D1`); each format carries its own observed
//! extension set in its [`ColorPolicy`](super::ColorPolicy).

/// The 16 documented base colour codes.
pub const BASE: &[&str] = &[
    "D", "w", "s", "o", "r", "g", "b", "u", "d", "W", "v", "y", "R", "G", "B", "U",
];

/// Whether a colour code is in the base set or a format's extension set.
pub fn is_valid(color: &str, extended: &[&str]) -> bool {
    BASE.contains(&color) || extended.contains(&color)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_colors() {
        assert!(is_valid("D", &[]));
        assert!(is_valid("U", &[]));
        assert!(!is_valid("x", &[]));
        assert!(!is_valid("", &[]));
    }

    #[test]
    fn test_extended_colors() {
        assert!(!is_valid("b1", &[]));
        assert!(is_valid("b1", &["b1"]));
        assert!(is_valid("r", &["b1"]));
    }
}
