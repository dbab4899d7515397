//! Syntax tree of `.ato` sources.
//!
//! Every node remembers the span it was parsed from, relative to its file.

mod block_definition;
mod import_statement;
mod root;
mod statement;

pub use block_definition::*;
pub use import_statement::*;
pub use root::*;
pub use statement::*;

use crate::core::{Reference, SourceSpan};
use serde::{Deserialize, Serialize};

pub trait SourceLocation {
	fn get_location(&self) -> SourceSpan;
}

/// Dotted reference as written in the source
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NameReference {
	pub reference: Reference,
	pub location: SourceSpan,
}

impl SourceLocation for NameReference {
	fn get_location(&self) -> SourceSpan {
		self.location
	}
}
