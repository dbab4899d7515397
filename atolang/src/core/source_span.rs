use std::fmt;
use std::ops::Range;
use std::path::{Path, PathBuf};

/// Indicates a region in the source code
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SourceSpan {
	start: usize,
	end: usize,
}

impl SourceSpan {
	/// Creates a new source span from offset and length
	pub fn new(offset: usize, len: usize) -> SourceSpan {
		SourceSpan {
			start: offset,
			end: offset + len,
		}
	}

	pub fn new_between(start: usize, end: usize) -> SourceSpan {
		SourceSpan { start, end }
	}

	/// Creates a new span from a Range type
	pub fn new_from_range(range: &Range<usize>) -> SourceSpan {
		SourceSpan {
			start: range.start,
			end: range.end,
		}
	}

	/// Smallest span covering both spans
	pub fn join(self, other: SourceSpan) -> SourceSpan {
		SourceSpan {
			start: self.start.min(other.start),
			end: self.end.max(other.end),
		}
	}

	/// Returns offset of the span
	pub fn offset(&self) -> usize {
		self.start
	}

	/// Returns start of the span
	pub fn start(&self) -> usize {
		self.offset()
	}

	/// Returns end of the span
	pub fn end(&self) -> usize {
		self.end
	}

	/// Returns length of the span
	pub fn len(&self) -> usize {
		self.end - self.start
	}

	pub fn is_empty(&self) -> bool {
		self.start == self.end
	}
}

impl From<(usize, usize)> for SourceSpan {
	fn from(pair: (usize, usize)) -> Self {
		SourceSpan::new(pair.0, pair.1)
	}
}

impl From<SourceSpan> for miette::SourceSpan {
	fn from(span: SourceSpan) -> Self {
		(span.start, span.len()).into()
	}
}

/// A span tied to the file it was found in
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Location {
	pub file: PathBuf,
	pub span: SourceSpan,
}

impl Location {
	pub fn new(file: impl Into<PathBuf>, span: SourceSpan) -> Self {
		Self {
			file: file.into(),
			span,
		}
	}

	pub fn file(&self) -> &Path {
		&self.file
	}
}

impl fmt::Display for Location {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{}@{}..{}", self.file.display(), self.span.start, self.span.end)
	}
}
