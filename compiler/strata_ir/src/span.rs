//! Source locations.
//!
//! A `Span` is a byte range inside one file; a `Loc` pins a span to the file
//! it came from so diagnostics produced by whole-program passes can point at
//! any file in the forest.

use std::fmt;

/// Byte range inside a single source file.
///
/// Layout: 8 bytes, `end` is exclusive.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
#[repr(C)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// Placeholder for synthesized symbols that have no source text.
    pub const DUMMY: Span = Span { start: 0, end: 0 };

    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }

    #[inline]
    pub const fn len(&self) -> u32 {
        self.end - self.start
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Smallest span covering both.
    #[inline]
    #[must_use]
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Index of a source file in the compilation session.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[repr(transparent)]
pub struct FileId(u32);

impl FileId {
    /// Files that exist only in memory (well-known symbols, synthesized code).
    pub const SYNTHETIC: FileId = FileId(u32::MAX);

    #[inline]
    pub const fn new(raw: u32) -> Self {
        FileId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// A span in a specific file.
///
/// Ordering is by file, then by position, which is the order diagnostics are
/// reported in.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct Loc {
    pub file: FileId,
    pub span: Span,
}

impl Loc {
    pub const NONE: Loc = Loc {
        file: FileId::SYNTHETIC,
        span: Span::DUMMY,
    };

    #[inline]
    pub const fn new(file: FileId, span: Span) -> Self {
        Loc { file, span }
    }

    #[inline]
    pub fn is_synthetic(&self) -> bool {
        self.file == FileId::SYNTHETIC
    }
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_synthetic() {
            write!(f, "<synthetic>")
        } else {
            write!(f, "file#{}:{}", self.file.raw(), self.span)
        }
    }
}
