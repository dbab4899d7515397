use crate::core::{Address, Location, Reference, SourceSpan};
use crate::parser::ast::{BlockDefinition, FileInput, Statement};
use indexmap::IndexMap;
use std::fmt;
use std::rc::Rc;

/// A name bound to a definition in another file
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Import {
	pub obj_addr: Address,
	pub location: Location,
}

/// `original -> replacement` written in a block
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Replacement {
	pub original: Reference,
	pub replacement: Reference,
	pub location: Location,
}

/// Statements an ObjectDef was built from
#[derive(Clone, Debug)]
pub enum DefinitionSource {
	File(Rc<FileInput>),
	Block(Rc<BlockDefinition>),
	Builtin,
}

impl DefinitionSource {
	pub fn statements(&self) -> &[Statement] {
		match self {
			DefinitionSource::File(file) => &file.statements,
			DefinitionSource::Block(block) => &block.body,
			DefinitionSource::Builtin => &[],
		}
	}
}

/// Names visible in one lexical scope
#[derive(Clone, Debug)]
pub struct Scope {
	pub address: Address,
	pub local_defs: IndexMap<String, Address>,
	pub imports: IndexMap<Reference, Import>,
}

/// Chain of lexical scopes, innermost first
///
/// Closures only point outwards, so sharing them between
/// a definition and its nested definitions creates no cycles.
#[derive(Debug)]
pub struct Closure {
	scope: Scope,
	enclosing: Option<Rc<Closure>>,
}

impl Closure {
	pub fn new(scope: Scope, enclosing: Option<Rc<Closure>>) -> Self {
		Self { scope, enclosing }
	}

	pub fn scope(&self) -> &Scope {
		&self.scope
	}

	pub fn enclosing(&self) -> Option<&Closure> {
		self.enclosing.as_deref()
	}

	/// Scopes from this one outwards
	pub fn scopes(&self) -> impl Iterator<Item = &Scope> {
		std::iter::successors(Some(self), |closure| closure.enclosing()).map(Closure::scope)
	}
}

/// Unresolved skeleton of a file or a block
#[derive(Debug)]
pub struct ObjectDef {
	pub address: Address,
	pub super_ref: Option<Reference>,
	pub super_location: Option<Location>,
	pub local_defs: IndexMap<String, Rc<ObjectDef>>,
	pub imports: IndexMap<Reference, Import>,
	pub replacements: IndexMap<Reference, Replacement>,

	/// Head scope is this definition's own
	pub closure: Rc<Closure>,
	pub source: DefinitionSource,
	pub location: Option<Location>,
}

impl ObjectDef {
	pub fn statements(&self) -> &[Statement] {
		self.source.statements()
	}

	/// Pairs a span from this definition's file with the file
	pub fn locate(&self, span: SourceSpan) -> Location {
		Location::new(self.address.file_path(), span)
	}

	pub fn is_builtin(&self) -> bool {
		matches!(self.source, DefinitionSource::Builtin)
	}
}

impl fmt::Display for ObjectDef {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "<ObjectDef {}>", self.address)
	}
}
