//! The eight TeX styles and the transitions between them.
//!
//! A style is a (size, cramped) pair. Size 0 is display, 1 is text, 2 is
//! script and 3 is scriptscript; each size has a cramped variant used under
//! bars and in subscripts, where superscripts are raised less.

/// One of the eight TeX styles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Style {
    /// Index into the style table.
    pub id: usize,
    /// Size level (0=display, 1=text, 2=script, 3=scriptscript).
    pub size: usize,
    /// Whether the style is cramped.
    pub cramped: bool,
}

impl Style {
    const fn new(id: usize, size: usize, cramped: bool) -> Self {
        Self { id, size, cramped }
    }

    /// Style of a superscript on a base in this style.
    #[must_use]
    pub fn sup(&self) -> &'static Self {
        &STYLES[SUP[self.id]]
    }

    /// Style of a subscript on a base in this style.
    ///
    /// Subscripts are always cramped.
    #[must_use]
    pub fn sub(&self) -> &'static Self {
        &STYLES[SUB[self.id]]
    }

    /// Style of a fraction numerator when the fraction is in this style.
    #[must_use]
    pub fn frac_num(&self) -> &'static Self {
        &STYLES[FRAC_NUM[self.id]]
    }

    /// Style of a fraction denominator when the fraction is in this style.
    #[must_use]
    pub fn frac_den(&self) -> &'static Self {
        &STYLES[FRAC_DEN[self.id]]
    }

    /// The cramped variant of this style; cramping is idempotent.
    #[must_use]
    pub fn cramp(&self) -> &'static Self {
        &STYLES[CRAMP[self.id]]
    }

    /// The text-size variant of this style; display stays display.
    #[must_use]
    pub fn text(&self) -> &'static Self {
        &STYLES[TEXT_LOOKUP[self.id]]
    }

    /// Whether this style uses tight script spacing.
    #[must_use]
    pub const fn is_tight(&self) -> bool {
        self.size >= 2
    }
}

const D: usize = 0;
const DC: usize = 1;
const T: usize = 2;
const TC: usize = 3;
const S: usize = 4;
const SC: usize = 5;
const SS: usize = 6;
const SSC: usize = 7;

static STYLES: [Style; 8] = [
    Style::new(D, 0, false),
    Style::new(DC, 0, true),
    Style::new(T, 1, false),
    Style::new(TC, 1, true),
    Style::new(S, 2, false),
    Style::new(SC, 2, true),
    Style::new(SS, 3, false),
    Style::new(SSC, 3, true),
];

const SUP: [usize; 8] = [S, SC, S, SC, SS, SSC, SS, SSC];
const SUB: [usize; 8] = [SC, SC, SC, SC, SSC, SSC, SSC, SSC];
const FRAC_NUM: [usize; 8] = [T, TC, S, SC, SS, SSC, SS, SSC];
const FRAC_DEN: [usize; 8] = [TC, TC, SC, SC, SSC, SSC, SSC, SSC];
const CRAMP: [usize; 8] = [DC, DC, TC, TC, SC, SC, SSC, SSC];
const TEXT_LOOKUP: [usize; 8] = [D, DC, T, TC, T, TC, T, TC];

/// Display style, for standalone equations.
pub static DISPLAY: &Style = &STYLES[D];
/// Text style, for inline math.
pub static TEXT: &Style = &STYLES[T];
/// Script style, for first-level super- and subscripts.
pub static SCRIPT: &Style = &STYLES[S];
/// Scriptscript style, for nested scripts. There is no further reduction.
pub static SCRIPTSCRIPT: &Style = &STYLES[SS];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripts_shrink_then_stop() {
        assert_eq!(DISPLAY.sup().id, S);
        assert_eq!(TEXT.sup().id, S);
        assert_eq!(SCRIPT.sup().id, SS);
        assert_eq!(SCRIPTSCRIPT.sup().id, SS);
    }

    #[test]
    fn test_subscripts_are_cramped() {
        assert_eq!(DISPLAY.sub().id, SC);
        assert_eq!(SCRIPT.sub().id, SSC);
        assert!(TEXT.sub().cramped);
    }

    #[test]
    fn test_fraction_parts() {
        assert_eq!(DISPLAY.frac_num().id, T);
        assert_eq!(DISPLAY.frac_den().id, TC);
        assert_eq!(TEXT.frac_num().id, S);
        assert_eq!(TEXT.frac_den().id, SC);
    }

    #[test]
    fn test_cramp_is_idempotent() {
        assert_eq!(DISPLAY.cramp().id, DC);
        assert_eq!(DISPLAY.cramp().cramp().id, DC);
        assert_eq!(SCRIPT.cramp().id, SC);
    }

    #[test]
    fn test_text_variant() {
        assert_eq!(DISPLAY.text().id, D);
        assert_eq!(SCRIPT.text().id, T);
        assert_eq!(SCRIPTSCRIPT.cramp().text().id, TC);
    }

    #[test]
    fn test_transitions_return_canonical_refs() {
        use std::ptr;
        // Options and the builders compare styles by address, so every
        // transition must hand back the one table entry.
        assert!(ptr::eq(DISPLAY.text(), DISPLAY));
        assert!(ptr::eq(TEXT.sup(), SCRIPT));
        assert!(ptr::eq(SCRIPT.sup(), SCRIPTSCRIPT));
        assert!(ptr::eq(TEXT.cramp().text(), TEXT.cramp()));
    }

    #[test]
    fn test_is_tight() {
        assert!(!DISPLAY.is_tight());
        assert!(!TEXT.is_tight());
        assert!(SCRIPT.is_tight());
        assert!(SCRIPTSCRIPT.is_tight());
    }
}
