use super::{NameReference, SourceLocation};
use crate::core::SourceSpan;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum ImportedNames {
	/// `import * from "..."`
	All,
	Specific { names: Vec<NameReference> },
}

/// Both `import A, B from "file.ato"` and `from "file.ato" import A, B`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ImportStatement {
	pub names: ImportedNames,
	pub from_path: String,
	pub location: SourceSpan,
}

impl SourceLocation for ImportStatement {
	fn get_location(&self) -> SourceSpan {
		self.location
	}
}
