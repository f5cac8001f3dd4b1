//! Scoped name tables with TeX grouping semantics.

use std::cell::RefMut;

use rapidhash::{RapidHashMap, RapidHashSet};

use crate::types::{ParseError, ParseErrorKind};

/// Default hash map used throughout the engine.
pub type KeyMap<K, V> = RapidHashMap<K, V>;
/// Default hash set.
pub type KeySet<K> = RapidHashSet<K>;
/// String-keyed map, the common case for namespaces.
pub type Mapping<V> = KeyMap<String, V>;

/// A space of nameable things (macros, for instance) with begin/end group
/// scoping implemented by an undo stack.
///
/// `get` and local `set` are O(1); global `set` is O(depth) because it must
/// clear pending undos at every level.
#[derive(Debug)]
pub struct Namespace<'a, V: Clone + 'static> {
    /// Mutable table holding the outermost scope; local changes are recorded
    /// against it on the undo stack.
    current: RefMut<'a, Mapping<V>>,
    /// Immutable builtin definitions consulted after `current`.
    builtins: &'static phf::Map<&'static str, V>,
    /// One undo map per open group. Each entry stores the value to restore
    /// on pop, `None` meaning the name was previously undefined.
    undef_stack: Vec<KeyMap<String, Option<V>>>,
}

impl<'a, V: Clone> Namespace<'a, V> {
    /// Create a namespace over a mutable outer table and static builtins.
    #[must_use]
    pub const fn new(
        builtins: &'static phf::Map<&'static str, V>,
        global: RefMut<'a, Mapping<V>>,
    ) -> Self {
        Self {
            current: global,
            builtins,
            undef_stack: Vec::new(),
        }
    }

    /// Open a nested group; later local sets are undone when it closes.
    pub fn begin_group(&mut self) {
        self.undef_stack.push(KeyMap::default());
    }

    /// Remove a name from the mutable table outright.
    pub fn purge(&mut self, name: &str) {
        self.current.remove(name);
    }

    fn restore_changes<I>(&mut self, undefs: I)
    where
        I: IntoIterator<Item = (String, Option<V>)>,
    {
        for (name, previous) in undefs {
            match previous {
                Some(v) => {
                    self.current.insert(name, v);
                }
                None => {
                    self.current.remove(&name);
                }
            }
        }
    }

    /// Close the innermost group, restoring every name it shadowed.
    ///
    /// Errors when no group is open.
    pub fn end_group(&mut self) -> Result<(), ParseError> {
        let undefs = self
            .undef_stack
            .pop()
            .ok_or_else(|| ParseError::new(ParseErrorKind::UnbalancedNamespaceDestruction))?;
        self.restore_changes(undefs);
        Ok(())
    }

    /// Close all open groups, returning how many there were.
    pub fn end_groups(&mut self) -> usize {
        let mut count = 0;
        while let Some(undefs) = self.undef_stack.pop() {
            self.restore_changes(undefs);
            count += 1;
        }
        count
    }

    /// Whether `name` is defined, either mutably or as a builtin.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.current.contains_key(name) || self.builtins.contains_key(name)
    }

    /// Current value of `name`, builtins included.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&V> {
        self.current.get(name).or_else(|| self.builtins.get(name))
    }

    /// Set `name` locally, or in every open scope when `global`.
    ///
    /// A local set records an undo in the innermost group unless one is
    /// already pending (the older value is the right one to restore). A
    /// global set discards pending undos for the name at every level, then
    /// re-records the new value at the top so a later local set inside the
    /// same group still scopes correctly. `None` deletes the definition.
    pub fn set(&mut self, name: &str, value: Option<V>, global: bool) {
        if global {
            for level in &mut self.undef_stack {
                level.remove(name);
            }
            if let Some(top) = self.undef_stack.last_mut() {
                top.insert(name.to_owned(), value.clone());
            }
        } else if let Some(top) = self.undef_stack.last_mut()
            && !top.contains_key(name)
        {
            let prev = self.current.get(name).cloned();
            top.insert(name.to_owned(), prev);
        }

        match value {
            Some(v) => {
                self.current.insert(name.to_owned(), v);
            }
            None => {
                self.current.remove(name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    static NO_BUILTINS: phf::Map<&'static str, i32> = phf::phf_map! {};
    static ONE_BUILTIN: phf::Map<&'static str, i32> = phf::phf_map! {
        "pi" => 314,
    };

    #[test]
    fn test_local_set_is_undone_at_group_end() {
        let global = RefCell::new(Mapping::default());
        let mut ns = Namespace::new(&NO_BUILTINS, global.borrow_mut());
        ns.set("x", Some(1), false);
        ns.begin_group();
        ns.set("x", Some(2), false);
        assert_eq!(ns.get("x"), Some(&2));
        ns.end_group().unwrap();
        assert_eq!(ns.get("x"), Some(&1));
    }

    #[test]
    fn test_global_set_survives_group_end() {
        let global = RefCell::new(Mapping::default());
        let mut ns = Namespace::new(&NO_BUILTINS, global.borrow_mut());
        ns.begin_group();
        ns.begin_group();
        ns.set("x", Some(7), true);
        ns.end_group().unwrap();
        ns.end_group().unwrap();
        assert_eq!(ns.get("x"), Some(&7));
    }

    #[test]
    fn test_builtins_are_shadowable() {
        let global = RefCell::new(Mapping::default());
        let mut ns = Namespace::new(&ONE_BUILTIN, global.borrow_mut());
        assert_eq!(ns.get("pi"), Some(&314));
        ns.begin_group();
        ns.set("pi", Some(3), false);
        assert_eq!(ns.get("pi"), Some(&3));
        ns.end_group().unwrap();
        assert_eq!(ns.get("pi"), Some(&314));
    }

    #[test]
    fn test_unbalanced_end_group_errors() {
        let global = RefCell::new(Mapping::default());
        let mut ns: Namespace<'_, i32> = Namespace::new(&NO_BUILTINS, global.borrow_mut());
        assert!(ns.end_group().is_err());
    }
}
