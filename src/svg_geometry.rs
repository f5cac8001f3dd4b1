//! SVG path geometry for drawn elements.
//!
//! The surd outline is derived from glyph U+221A of the math fonts and
//! parameterized over the extra vinculum thickness requested through
//! `min_rule_thickness`. All coordinates are in the glyph's 1000-unit
//! em space.

/// Vertical padding above the vinculum, in glyph units.
pub const HLINE_PAD: f64 = 80.0;

/// The surd outline with a vinculum thickened by `extra_vinculum`.
#[must_use]
pub fn sqrt_main(extra_vinculum: f64, h_line_pad: f64) -> String {
    format!(
        "M95,{}\n\
         c-2.7,0,-7.17,-2.7,-13.5,-8c-5.8,-5.3,-9.5,-10,-9.5,-14\n\
         c0,-2,0.3,-3.3,1,-4c1.3,-2.7,23.83,-20.7,67.5,-54\n\
         c44.2,-33.3,65.8,-50.3,66.5,-51c1.3,-1.3,3,-2,5,-2c4.7,0,8.7,3.3,12,10\n\
         s173,378,173,378c0.7,0,35.3,-71,104,-213c68.7,-142,137.5,-285,206.5,-429\n\
         c69,-144,104.5,-217.7,106.5,-221\n\
         l{} -{}\n\
         c5.3,-9.3,12,-14,20,-14\n\
         H400000v{}H845.2724\n\
         s-225.272,467,-225.272,467s-235,486,-235,486c-2.7,4.7,-9,7,-19,7\n\
         c-6,0,-10,-1,-12,-3s-194,-422,-194,-422s-65,47,-65,47z\n\
         M{} {}h400000v{}h-400000z",
        622.0 + extra_vinculum + h_line_pad,
        extra_vinculum / 2.075,
        extra_vinculum,
        40.0 + extra_vinculum,
        834.0 + extra_vinculum,
        h_line_pad,
        40.0 + extra_vinculum,
    )
}

/// Path data for the named surd variant.
///
/// Every size variant shares the base surd geometry; the SVG container's
/// view box does the scaling. `extra_vinculum` is in glyph units
/// (1000 per em).
#[must_use]
pub fn sqrt_path(_size: &str, extra_vinculum: f64, _view_box_height: f64) -> String {
    sqrt_main(extra_vinculum, HLINE_PAD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqrt_path_reflects_extra_vinculum() {
        let thin = sqrt_path("sqrtMain", 0.0, 1080.0);
        let thick = sqrt_path("sqrtMain", 40.0, 1120.0);
        assert!(thin.starts_with("M95,702"));
        assert!(thick.starts_with("M95,742"));
        assert!(thin.contains("v40H"));
        assert!(thick.contains("v80H"));
    }

    #[test]
    fn test_size_variants_share_geometry() {
        assert_eq!(
            sqrt_path("sqrtSize1", 0.0, 1200.0),
            sqrt_path("sqrtTall", 0.0, 2000.0)
        );
    }
}
