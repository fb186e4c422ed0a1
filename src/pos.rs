//! Source code locations.

use std::fmt;
use std::num::NonZeroU32;

use codespan_reporting::files as cs_files;

pub use codespan::{ByteIndex as BytePos, RawIndex};

/// Identifies a source file registered in [`Files`].
///
/// `None` is the "absent" file used by compiler-synthesized spans; such spans
/// are not fit for diagnostic rendering.
pub type FileId = Option<NonZeroU32>;

/// The source map handed to diagnostic rendering.
#[derive(Debug, Clone)]
pub struct Files {
    inner: cs_files::SimpleFiles<String, String>,
}

impl Files {
    pub fn new() -> Self {
        Files { inner: cs_files::SimpleFiles::new() }
    }

    pub fn add(&mut self, name: &str, source: &str) -> FileId {
        Self::shift_file_id(self.inner.add(name.to_owned(), source.to_owned()))
    }

    fn unshift_file_id(file_id: FileId) -> Result<usize, cs_files::Error> {
        // produce Error on file_id = None; such spans aren't fit for diagnostics
        let file_id: u32 = file_id.ok_or(cs_files::Error::FileMissing)?.into();
        Ok(file_id as usize - 1)
    }

    fn shift_file_id(file_id: usize) -> FileId {
        NonZeroU32::new(file_id as u32 + 1)
    }
}

impl Default for Files {
    fn default() -> Self {
        Files::new()
    }
}

impl<'a> cs_files::Files<'a> for Files {
    type FileId = FileId;
    type Name = String;
    type Source = &'a str;

    // Just delegate everything
    fn name(&self, file_id: FileId) -> Result<String, cs_files::Error> {
        cs_files::Files::name(&self.inner, Self::unshift_file_id(file_id)?)
    }

    fn source(&self, file_id: FileId) -> Result<&str, cs_files::Error> {
        cs_files::Files::source(&self.inner, Self::unshift_file_id(file_id)?)
    }

    fn line_index(&self, file_id: FileId, byte_index: usize) -> Result<usize, cs_files::Error> {
        cs_files::Files::line_index(&self.inner, Self::unshift_file_id(file_id)?, byte_index)
    }

    fn line_range(&self, file_id: FileId, line_index: usize) -> Result<std::ops::Range<usize>, cs_files::Error> {
        cs_files::Files::line_range(&self.inner, Self::unshift_file_id(file_id)?, line_index)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    pub start: BytePos,
    pub end: BytePos,
    pub file_id: FileId,
}

impl Span {
    pub fn new(file_id: FileId, start: impl Into<BytePos>, end: impl Into<BytePos>) -> Span {
        let start = start.into();
        let end = end.into();
        assert!(end >= start);

        Span { file_id, start, end }
    }

    /// Gives an empty span at the start of a source.
    pub const fn initial(file_id: FileId) -> Span {
        Span {
            file_id,
            start: BytePos(0),
            end: BytePos(0),
        }
    }

    /// Combine two spans by taking the start of the earlier span
    /// and the end of the later span.
    pub fn merge(self, other: Span) -> Span {
        use std::cmp::{max, min};

        assert_eq!(self.file_id, other.file_id);
        let start = min(self.start, other.start);
        let end = max(self.end, other.end);
        Span::new(self.file_id, start, end)
    }

    pub fn start(self) -> BytePos {
        self.start
    }

    pub fn end(self) -> BytePos {
        self.end
    }
}

impl Default for Span {
    fn default() -> Span {
        Span::initial(None)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{start}, {end})",
            start = self.start(),
            end = self.end(),
        )
    }
}

impl<I> From<std::ops::Range<I>> for Span
where
    I: Into<BytePos>,
{
    fn from(range: std::ops::Range<I>) -> Span {
        Span::new(None, range.start, range.end)
    }
}

impl From<Span> for std::ops::Range<usize> {
    fn from(span: Span) -> std::ops::Range<usize> {
        span.start.0 as usize..span.end.0 as usize
    }
}

/// Types that know their source location.
///
/// This is what lets the diagnostic macros accept either a raw [`Span`] or
/// any spanned node.
pub trait HasSpan {
    fn span(&self) -> Span;
}

impl HasSpan for Span {
    fn span(&self) -> Span { *self }
}

impl<T: ?Sized> HasSpan for Sp<T> {
    fn span(&self) -> Span { self.span }
}

impl<T: HasSpan + ?Sized> HasSpan for &T {
    fn span(&self) -> Span { (**self).span() }
}

/// An AST node with a span.  The span is not included in comparisons or hashes.
#[derive(Copy, Clone, Default)]
pub struct Sp<T: ?Sized> {
    pub span: Span,
    pub value: T,
}

impl<T: fmt::Debug> fmt::Debug for Sp<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sp")
            // format as a range instead of Span's derived Debug
            .field("span", &(self.span.start().0..self.span.end().0))
            .field("value", &self.value)
            .finish()
    }
}

impl<T> Sp<T> {
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Sp<U> {
        Sp {
            span: self.span,
            value: f(self.value),
        }
    }
}

impl<T> From<T> for Sp<T> {
    fn from(value: T) -> Self {
        Sp {
            span: Span::default(),
            value,
        }
    }
}

impl<T: ?Sized + Eq> Eq for Sp<T> {}

impl<T: ?Sized + PartialEq> PartialEq for Sp<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T: ?Sized + PartialEq> PartialEq<T> for Sp<T> {
    fn eq(&self, other: &T) -> bool {
        self.value == *other
    }
}

impl<T: ?Sized + std::hash::Hash> std::hash::Hash for Sp<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T: ?Sized> std::ops::Deref for Sp<T> {
    type Target = T;
    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T: ?Sized> std::ops::DerefMut for Sp<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T: ?Sized + fmt::Display> fmt::Display for Sp<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", &self.value)
    }
}
