//! Conversion between TeX length units and CSS ems.

use crate::context::EngineContext;
use crate::options::Options;
use crate::spacing_data::Measurement;
use crate::types::{ParseError, ParseErrorKind};

/// TeX points per unit, for the absolute units.
fn pt_per_unit<T>(unit: &T) -> Option<f64>
where
    T: AsRef<str>,
{
    match unit.as_ref() {
        "pt" => Some(1.0),
        "mm" => Some(7227.0 / 2540.0),
        "cm" => Some(7227.0 / 254.0),
        "in" => Some(72.27),
        // px is defined as 1 bp (\pdfpxdimen default)
        "bp" | "px" => Some(803.0 / 800.0),
        "pc" => Some(12.0),
        "dd" => Some(1238.0 / 1157.0),
        "cc" => Some(14856.0 / 1157.0),
        "nd" => Some(685.0 / 642.0),
        "nc" => Some(1370.0 / 107.0),
        "sp" => Some(1.0 / 65536.0),
        _ => None,
    }
}

/// Whether a unit string is a recognized length unit.
pub fn valid_unit_str<T>(unit: T) -> bool
where
    T: AsRef<str>,
{
    pt_per_unit(&unit).is_some() || matches!(unit.as_ref(), "ex" | "em" | "mu")
}

/// Whether a measurement carries a recognized unit.
pub fn valid_unit<T>(measurement: &Measurement<T>) -> bool
where
    T: AsRef<str>,
{
    valid_unit_str(&measurement.unit)
}

impl EngineContext {
    /// Convert a measurement into CSS ems under the given options.
    ///
    /// Absolute units go through points; `mu` scales with the script
    /// styles; `ex` and `em` always refer to the text-style font of the
    /// current size. The result is clamped to `options.max_size`.
    pub fn calculate_size<T>(
        &self,
        size: &Measurement<T>,
        options: &Options,
    ) -> Result<f64, ParseError>
    where
        T: AsRef<str>,
    {
        let mut scale: f64;

        if let Some(pt) = pt_per_unit(&size.unit) {
            let metrics = self.get_global_metrics(options.size as f64);
            scale = pt / metrics.pt_per_em / options.size_multiplier;
        } else if size.unit.as_ref() == "mu" {
            let metrics = self.get_global_metrics(options.size as f64);
            scale = metrics.css_em_per_mu;
        } else {
            let unit_options = if options.style.is_tight() {
                options.having_style(options.style.text())
            } else {
                options.clone()
            };

            let metrics = self.get_global_metrics(unit_options.size as f64);
            scale = match size.unit.as_ref() {
                "ex" => metrics.x_height,
                "em" => metrics.quad,
                other => {
                    return Err(ParseError::new(ParseErrorKind::InvalidUnit {
                        unit: other.to_owned(),
                    }));
                }
            };

            if unit_options.size != options.size {
                scale *= unit_options.size_multiplier / options.size_multiplier;
            }
        }

        Ok(f64::min(size.number * scale, options.max_size))
    }
}

/// Format a length as an em string, rounded to 4 decimals with trailing
/// zeros dropped.
#[must_use]
pub fn make_em(n: f64) -> String {
    let mut s = format!("{n:.4}");

    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }

    if s == "-0" {
        "0".clone_into(&mut s);
    }

    s.push_str("em");
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Options;
    use crate::spacing_data::MeasurementOwned;
    use crate::style;

    fn text_options() -> Options {
        Options::builder()
            .style(style::TEXT)
            .max_size(1_000_000.0)
            .min_rule_thickness(0.04)
            .build()
    }

    #[test]
    fn test_valid_unit() {
        for unit in ["pt", "cm", "px", "em", "ex", "mu", "sp"] {
            assert!(valid_unit_str(unit), "{unit} should be valid");
        }
        assert!(!valid_unit_str("bogus"));
    }

    #[test]
    fn test_make_em_rounding() {
        assert_eq!(make_em(1.0), "1em");
        assert_eq!(make_em(1.23456), "1.2346em");
        assert_eq!(make_em(0.00004), "0em");
        assert_eq!(make_em(-0.000_01), "0em");
    }

    #[test]
    fn test_calculate_size_absolute_units() {
        let opts = text_options();
        let ctx = EngineContext::default();
        // 10pt per em, so 10pt is exactly 1em.
        let m = MeasurementOwned {
            number: 10.0,
            unit: "pt".to_owned(),
        };
        let ems = ctx.calculate_size(&m, &opts).unwrap();
        assert!((ems - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_calculate_size_relative_units() {
        let opts = text_options();
        let ctx = EngineContext::default();
        let m_em = MeasurementOwned {
            number: 2.0,
            unit: "em".to_owned(),
        };
        let ems = ctx.calculate_size(&m_em, &opts).unwrap();
        assert!((ems - 2.0).abs() < 1e-9);

        let m_ex = MeasurementOwned {
            number: 1.0,
            unit: "ex".to_owned(),
        };
        let ems = ctx.calculate_size(&m_ex, &opts).unwrap();
        assert!((ems - 0.431).abs() < 1e-9);
    }

    #[test]
    fn test_calculate_size_clamps_to_max_size() {
        let opts = Options::builder()
            .style(style::TEXT)
            .max_size(2.0)
            .min_rule_thickness(0.04)
            .build();
        let ctx = EngineContext::default();
        let m = MeasurementOwned {
            number: 100.0,
            unit: "em".to_owned(),
        };
        let ems = ctx.calculate_size(&m, &opts).unwrap();
        assert!((ems - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_calculate_size_rejects_unknown_unit() {
        let opts = text_options();
        let ctx = EngineContext::default();
        let m = MeasurementOwned {
            number: 1.0,
            unit: "parsec".to_owned(),
        };
        assert!(ctx.calculate_size(&m, &opts).is_err());
    }
}
