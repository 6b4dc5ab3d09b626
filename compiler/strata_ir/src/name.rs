//! Interned identifier.

use std::fmt;

/// Interned string identifier.
///
/// A plain index into the `StringInterner`. The first few indices are
/// reserved for names the resolver needs without a lookup; the interner
/// pre-interns them in exactly this order.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
#[repr(transparent)]
pub struct Name(u32);

impl Name {
    pub const EMPTY: Name = Name(0);
    /// Name of the root namespace that owns every top-level constant.
    pub const ROOT: Name = Name(1);
    pub const BASIC_OBJECT: Name = Name(2);
    pub const OBJECT: Name = Name(3);
    pub const MODULE: Name = Name(4);
    pub const CLASS: Name = Name(5);

    /// Strings behind the reserved names, indexed by raw value.
    pub(crate) const RESERVED: [&'static str; 6] =
        ["", "<root>", "BasicObject", "Object", "Module", "Class"];

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Name(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}
