//! Inter-atom spacing tables and the measurement type they are built from.

use phf::{Map, phf_map};

/// A length: a number and its unit.
///
/// The unit is generic so constant tables can use `&'static str` while
/// parsed sizes carry owned strings.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement<T>
where
    T: AsRef<str>,
{
    /// Numeric value.
    pub number: f64,
    /// Unit, e.g. `"mu"`, `"em"`, `"pt"`.
    pub unit: T,
}

/// Measurement with an owned unit string, for parsed sizes.
pub type MeasurementOwned = Measurement<String>;

/// Measurement with a static unit, for constant tables.
pub type MeasurementStatic = Measurement<&'static str>;

impl<T: AsRef<str>> Measurement<T> {
    /// The same measurement with its unit converted to an owned string.
    #[must_use]
    pub fn to_owned_unit(&self) -> MeasurementOwned {
        MeasurementOwned {
            number: self.number,
            unit: self.unit.as_ref().to_owned(),
        }
    }
}

/// Thin space, `\,` (3mu).
pub const THINSPACE: MeasurementStatic = MeasurementStatic {
    number: 3.0,
    unit: "mu",
};

/// Medium space, `\:` (4mu).
pub const MEDIUMSPACE: MeasurementStatic = MeasurementStatic {
    number: 4.0,
    unit: "mu",
};

/// Thick space, `\;` (5mu).
pub const THICKSPACE: MeasurementStatic = MeasurementStatic {
    number: 5.0,
    unit: "mu",
};

/// Pair-keyed spacing table: left atom class to right atom class to the
/// space inserted between them.
pub type Spacings = Map<&'static str, Map<&'static str, MeasurementStatic>>;

/// Spacing between adjacent atoms in display and text styles, per the
/// TeXbook chapter 18 table.
pub const SPACINGS: Spacings = phf_map! {
    "mord" => phf_map! {
        "mop" => THINSPACE,
        "mbin" => MEDIUMSPACE,
        "mrel" => THICKSPACE,
        "minner" => THINSPACE,
    },
    "mop" => phf_map! {
        "mord" => THINSPACE,
        "mop" => THINSPACE,
        "mrel" => THICKSPACE,
        "minner" => THINSPACE,
    },
    "mbin" => phf_map! {
        "mord" => MEDIUMSPACE,
        "mop" => MEDIUMSPACE,
        "mopen" => MEDIUMSPACE,
        "minner" => MEDIUMSPACE,
    },
    "mrel" => phf_map! {
        "mord" => THICKSPACE,
        "mop" => THICKSPACE,
        "mopen" => THICKSPACE,
        "minner" => THICKSPACE,
    },
    "mopen" => phf_map!{},
    "mclose" => phf_map! {
        "mop" => THINSPACE,
        "mbin" => MEDIUMSPACE,
        "mrel" => THICKSPACE,
        "minner" => THINSPACE,
    },
    "mpunct" => phf_map! {
        "mord" => THINSPACE,
        "mop" => THINSPACE,
        "mrel" => THICKSPACE,
        "mopen" => THINSPACE,
        "mclose" => THINSPACE,
        "mpunct" => THINSPACE,
        "minner" => THINSPACE,
    },
    "minner" => phf_map! {
        "mord" => THINSPACE,
        "mop" => THINSPACE,
        "mbin" => MEDIUMSPACE,
        "mrel" => THICKSPACE,
        "mopen" => THINSPACE,
        "mpunct" => THINSPACE,
        "minner" => THINSPACE,
    },
};

/// Spacing in script and scriptscript styles, where only the thin spaces
/// around operators survive.
pub const TIGHT_SPACINGS: Spacings = phf_map! {
    "mord" => phf_map! {
        "mop" => THINSPACE,
    },
    "mop" => phf_map! {
        "mord" => THINSPACE,
        "mop" => THINSPACE,
    },
    "mbin" => phf_map!{},
    "mrel" => phf_map!{},
    "mopen" => phf_map!{},
    "mclose" => phf_map! {
        "mop" => THINSPACE,
    },
    "mpunct" => phf_map!{},
    "minner" => phf_map! {
        "mop" => THINSPACE,
    },
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_space_constants_are_mu() {
        for space in [&THINSPACE, &MEDIUMSPACE, &THICKSPACE] {
            assert_eq!(space.unit, "mu");
        }
        assert_eq!(THINSPACE.number, 3.0);
        assert_eq!(MEDIUMSPACE.number, 4.0);
        assert_eq!(THICKSPACE.number, 5.0);
    }

    #[test]
    fn test_spacing_table_covers_all_classes() {
        for class in [
            "mord", "mop", "mbin", "mrel", "mopen", "mclose", "mpunct", "minner",
        ] {
            assert!(SPACINGS.contains_key(class), "missing class: {class}");
            assert!(TIGHT_SPACINGS.contains_key(class), "missing class: {class}");
        }
        let mord = SPACINGS.get("mord").unwrap();
        assert_eq!(mord.get("mbin"), Some(&MEDIUMSPACE));
        assert_eq!(mord.get("mrel"), Some(&THICKSPACE));
        assert_eq!(mord.get("mopen"), None);
    }

    #[test]
    fn test_tight_spacing_drops_bin_and_rel() {
        assert_eq!(TIGHT_SPACINGS.get("mbin").unwrap().len(), 0);
        assert_eq!(TIGHT_SPACINGS.get("mrel").unwrap().len(), 0);
        assert_eq!(
            TIGHT_SPACINGS.get("mord").unwrap().get("mop"),
            Some(&THINSPACE)
        );
    }
}
