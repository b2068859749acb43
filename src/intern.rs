//! Identifier interning.
//!
//! Every identifier spelling is stored once; the rest of the front end works
//! with [`Symbol`] handles, so identity comparison is an integer compare.
//! The table is append-only and first occurrence keeps its slot.

use std::{fmt, num::NonZeroU32, rc::Rc};

use rustc_hash::{FxBuildHasher, FxHashMap};

/// A handle to an interned string. To retrieve the spelling, use
/// [`Interner::get`]. Equal handles always name equal spellings.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(
    // NonZeroU32 so that Option<Symbol> stays four bytes.
    NonZeroU32,
);

impl Symbol {
    const fn unchecked_new(handle: NonZeroU32) -> Symbol {
        Symbol(handle)
    }

    fn index(self) -> usize {
        self.0.get() as usize - 1
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.0)
    }
}

/// The interning table: a lookup map plus the append-only spelling store.
pub struct Interner {
    map: FxHashMap<Rc<str>, NonZeroU32>,
    vec: Vec<Rc<str>>,
}

impl Default for Interner {
    fn default() -> Self {
        Interner::with_capacity(0)
    }
}

impl fmt::Debug for Interner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (i, spelling) in self.vec.iter().enumerate() {
            let i = i + 1;
            map.entry(&i, &spelling);
        }
        map.finish()
    }
}

impl Interner {
    pub fn new() -> Interner {
        Interner::default()
    }

    pub fn with_capacity(capacity: usize) -> Interner {
        Interner {
            map: FxHashMap::with_capacity_and_hasher(capacity, FxBuildHasher),
            vec: Vec::with_capacity(capacity),
        }
    }

    /// Number of distinct spellings interned so far.
    pub fn len(&self) -> usize {
        self.vec.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vec.is_empty()
    }

    /// Interns `value`, returning its handle. A spelling seen before returns
    /// the handle minted at its first occurrence; nothing is stored twice.
    pub fn intern(&mut self, value: &str) -> Symbol {
        if let Some(&handle) = self.map.get(value) {
            return Symbol::unchecked_new(handle);
        }
        let key: Rc<str> = Rc::from(value);
        let i = {
            let len = u32::try_from(self.vec.len()).expect("interner out of capacity");
            // SAFETY: This will never be zero due to the +1.
            unsafe { NonZeroU32::new_unchecked(len + 1) }
        };
        self.vec.push(Rc::clone(&key));
        self.map.insert(key, i);
        Symbol::unchecked_new(i)
    }

    /// Looks `value` up without inserting it.
    pub fn find(&self, value: &str) -> Option<Symbol> {
        self.map.get(value).map(|&h| Symbol::unchecked_new(h))
    }

    pub fn contains(&self, value: &str) -> bool {
        self.map.contains_key(value)
    }

    /// Returns the spelling for `sym`. Panics on a handle minted by another
    /// table.
    pub fn get(&self, sym: Symbol) -> &str {
        &self.vec[sym.index()]
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn interning_is_idempotent() {
        let mut i = Interner::with_capacity(3);

        let foo1 = i.intern("foo");
        let bar1 = i.intern("bar");
        let foo2 = i.intern("foo");
        let bar2 = i.intern("bar");

        assert_eq!(foo1, foo2);
        assert_eq!(bar1, bar2);
        assert_eq!(i.get(foo1), "foo");
        assert_eq!(i.get(bar2), "bar");
        assert_eq!(i.len(), 2);
    }

    #[test]
    fn prefixes_get_their_own_handles() {
        let mut i = Interner::new();
        let foo = i.intern("foo");
        let fo = i.intern("fo");
        assert_ne!(foo, fo);
        assert_eq!(i.get(fo), "fo");
    }

    #[test]
    fn find_does_not_insert() {
        let mut i = Interner::new();
        assert_eq!(i.find("x"), None);
        assert!(!i.contains("x"));
        assert!(i.is_empty());

        let x = i.intern("x");
        assert_eq!(i.find("x"), Some(x));
        assert!(i.contains("x"));
        assert_eq!(i.len(), 1);
    }

    #[test]
    fn first_occurrence_keeps_its_slot() {
        let mut i = Interner::new();
        let a = i.intern("a");
        i.intern("b");
        i.intern("c");
        i.intern("b");
        assert_eq!(i.intern("a"), a);
        assert_eq!(i.len(), 3);
    }
}
