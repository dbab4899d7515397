use super::{NameReference, SourceLocation, Statement};
use crate::core::SourceSpan;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
	Module,
	Component,
	Interface,
}

impl fmt::Display for BlockKind {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			BlockKind::Module => write!(f, "module"),
			BlockKind::Component => write!(f, "component"),
			BlockKind::Interface => write!(f, "interface"),
		}
	}
}

/// `module|component|interface NAME [from REF]:` and its body
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BlockDefinition {
	pub kind: BlockKind,
	pub name: String,
	pub super_ref: Option<NameReference>,
	pub body: Vec<Statement>,
	pub location: SourceSpan,
}

impl SourceLocation for BlockDefinition {
	fn get_location(&self) -> SourceSpan {
		self.location
	}
}
