use derive_more::Display;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One element of a dotted reference - a name or a pin number
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize)]
pub enum Segment {
	Name(String),
	Index(u64),
}

impl From<&str> for Segment {
	fn from(text: &str) -> Self {
		match text.parse::<u64>() {
			Ok(index) if text.chars().all(|c| c.is_ascii_digit()) => Segment::Index(index),
			_ => Segment::Name(String::from(text)),
		}
	}
}

impl From<String> for Segment {
	fn from(text: String) -> Self {
		Segment::from(text.as_str())
	}
}

impl From<u64> for Segment {
	fn from(index: u64) -> Self {
		Segment::Index(index)
	}
}

/// Non-empty sequence of segments used for lexical lookup and relative addressing
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Vec<Segment>", into = "Vec<Segment>")]
pub struct Reference {
	segments: Vec<Segment>,
}

/// Raised when a reference would end up with no segments
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("a reference needs at least one segment")]
pub struct EmptyReference;

impl Reference {
	pub fn new(segments: Vec<Segment>) -> Result<Self, EmptyReference> {
		if segments.is_empty() {
			return Err(EmptyReference);
		}
		Ok(Self { segments })
	}

	pub fn from_one(segment: impl Into<Segment>) -> Self {
		Self {
			segments: vec![segment.into()],
		}
	}

	pub fn segments(&self) -> &[Segment] {
		&self.segments
	}

	pub fn len(&self) -> usize {
		self.segments.len()
	}

	/// Always false, kept for API symmetry with collections
	pub fn is_empty(&self) -> bool {
		self.segments.is_empty()
	}

	pub fn first(&self) -> &Segment {
		&self.segments[0]
	}

	pub fn last(&self) -> &Segment {
		&self.segments[self.segments.len() - 1]
	}

	/// Segments following the first one
	pub fn tail(&self) -> &[Segment] {
		&self.segments[1..]
	}

	/// The reference without its last segment
	pub fn parent(&self) -> Option<Reference> {
		if self.segments.len() < 2 {
			return None;
		}
		Some(Self {
			segments: self.segments[..self.segments.len() - 1].to_vec(),
		})
	}

	/// Returns the first `len` segments
	pub fn prefix(&self, len: usize) -> Option<Reference> {
		Reference::new(self.segments.iter().take(len).cloned().collect()).ok()
	}

	pub fn child(&self, segment: impl Into<Segment>) -> Reference {
		let mut segments = self.segments.clone();
		segments.push(segment.into());
		Self { segments }
	}

	pub fn concat(&self, other: &Reference) -> Reference {
		let mut segments = self.segments.clone();
		segments.extend(other.segments.iter().cloned());
		Self { segments }
	}

	pub fn starts_with(&self, prefix: &Reference) -> bool {
		self.segments.starts_with(&prefix.segments)
	}

	/// Remaining segments once `prefix` is removed
	pub fn strip_prefix(&self, prefix: &Reference) -> Option<&[Segment]> {
		self.segments.strip_prefix(prefix.segments.as_slice())
	}

	/// Segments rendered as address path components
	pub fn names(&self) -> impl Iterator<Item = String> + '_ {
		self.segments.iter().map(|segment| segment.to_string())
	}
}

impl fmt::Display for Reference {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{}", self.segments.iter().join("."))
	}
}

impl FromStr for Reference {
	type Err = EmptyReference;

	fn from_str(text: &str) -> Result<Self, Self::Err> {
		Reference::new(text.split('.').filter(|part| !part.is_empty()).map(Segment::from).collect())
	}
}

impl TryFrom<Vec<Segment>> for Reference {
	type Error = EmptyReference;

	fn try_from(segments: Vec<Segment>) -> Result<Self, Self::Error> {
		Reference::new(segments)
	}
}

impl From<Reference> for Vec<Segment> {
	fn from(reference: Reference) -> Self {
		reference.segments
	}
}
