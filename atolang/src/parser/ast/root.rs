use super::{SourceLocation, Statement};
use crate::core::SourceSpan;
use serde::{Deserialize, Serialize};

/// Contents of a whole source file
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct FileInput {
	pub statements: Vec<Statement>,
	pub location: SourceSpan,
}

impl SourceLocation for FileInput {
	fn get_location(&self) -> SourceSpan {
		self.location
	}
}
