//! Base virtual-node abstractions shared by the HTML and MathML trees.

use core::cell::RefCell;
use core::fmt;

use crate::types::{CssStyle, ParseError, ParseErrorKind};

/// A node that can render itself as markup. Implemented by both the
/// box tree and the MathML tree.
pub trait VirtualNode {
    /// Writes the node's markup into the formatter.
    fn write_markup(&self, fmt: &mut fmt::Formatter<'_>) -> Result<(), ParseError>;

    /// Renders the node into a [`String`].
    fn to_markup(&self) -> Result<String, ParseError>
    where
        Self: Sized,
    {
        markup_to_string(self)
    }
}

/// A run of sibling nodes with no markup element of its own.
///
/// Fragments carry the aggregate layout dimensions of their children so
/// they can stand in for a single node during layout.
#[derive(Debug)]
pub struct DocumentFragment<ChildType: VirtualNode> {
    /// The contained nodes.
    pub children: Vec<ChildType>,
    /// CSS classes, consulted for atom-class queries but never emitted.
    pub classes: Vec<String>,
    /// Extent above the baseline, in ems.
    pub height: f64,
    /// Extent below the baseline, in ems.
    pub depth: f64,
    /// Largest font size used inside, as a multiple of the base size.
    pub max_font_size: f64,
    /// Inline styles; fragments never render them.
    pub style: CssStyle,
}

impl<ChildType: VirtualNode + Clone> Clone for DocumentFragment<ChildType> {
    fn clone(&self) -> Self {
        Self {
            children: self.children.clone(),
            classes: self.classes.clone(),
            height: self.height,
            depth: self.depth,
            max_font_size: self.max_font_size,
            style: self.style.clone(),
        }
    }
}

impl<ChildType: VirtualNode> DocumentFragment<ChildType> {
    /// Wraps the given children in a dimensionless fragment.
    #[must_use]
    pub fn new(children: Vec<ChildType>) -> Self {
        Self {
            children,
            classes: Vec::new(),
            height: 0.0,
            depth: 0.0,
            max_font_size: 0.0,
            style: CssStyle::default(),
        }
    }

    /// Whether the fragment carries the given class.
    #[must_use]
    pub fn has_class(&self, class_name: &str) -> bool {
        self.classes.iter().any(|cls| cls == class_name)
    }
}

impl<ChildType: VirtualNode + Clone + 'static> VirtualNode for DocumentFragment<ChildType> {
    fn write_markup(&self, fmt: &mut fmt::Formatter<'_>) -> Result<(), ParseError> {
        for child in &self.children {
            child.write_markup(fmt)?;
        }
        Ok(())
    }
}

/// Renders a [`VirtualNode`] into a [`String`], recovering the markup
/// error that `fmt` flattened away.
pub fn markup_to_string<T: VirtualNode + ?Sized>(node: &T) -> Result<String, ParseError> {
    struct FormatterWriter<'a> {
        buf: &'a mut String,
    }

    impl fmt::Write for FormatterWriter<'_> {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            self.buf.push_str(s);
            Ok(())
        }
    }

    struct DisplayAdapter<'a, T: VirtualNode + ?Sized> {
        node: &'a T,
        error: &'a RefCell<Option<ParseError>>,
    }

    impl<T: VirtualNode + ?Sized> fmt::Display for DisplayAdapter<'_, T> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self.node.write_markup(f) {
                Ok(()) => Ok(()),
                Err(err) => {
                    self.error.replace(Some(err));
                    Err(fmt::Error)
                }
            }
        }
    }

    let mut buffer = String::new();
    let error = RefCell::new(None);
    let mut writer = FormatterWriter { buf: &mut buffer };
    let adapter = DisplayAdapter {
        node,
        error: &error,
    };

    if fmt::write(&mut writer, format_args!("{adapter}")).is_err() {
        if let Some(err) = error.into_inner() {
            return Err(err);
        }
        return Err(ParseError::new(ParseErrorKind::MarkupWriteFailure));
    }

    Ok(buffer)
}
