use super::{BlockDefinition, ImportStatement, NameReference, SourceLocation};
use crate::core::{SourceSpan, Value};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// `target -> new_type`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RetypeStatement {
	pub target: NameReference,
	pub new_type: NameReference,
	pub location: SourceSpan,
}

/// Right hand side of an assignment
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum Assignable {
	Literal { value: Value, location: SourceSpan },
	New { class: NameReference, location: SourceSpan },

	/// Bare references cannot be assigned, kept for reporting
	Reference(NameReference),
}

impl SourceLocation for Assignable {
	fn get_location(&self) -> SourceSpan {
		match self {
			Assignable::Literal { location, .. } | Assignable::New { location, .. } => *location,
			Assignable::Reference(reference) => reference.location,
		}
	}
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AssignmentStatement {
	pub target: NameReference,
	pub value: Assignable,
	pub location: SourceSpan,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum PinName {
	Name(String),

	/// Raw numeric text, validated when the pin is instantiated
	Number(String),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PinDefinition {
	pub name: PinName,
	pub location: SourceSpan,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SignalDefinition {
	pub name: String,
	pub location: SourceSpan,
}

/// One side of a `~` connection
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum Connectable {
	Reference(NameReference),
	Pin(PinDefinition),
	Signal(SignalDefinition),
}

impl SourceLocation for Connectable {
	fn get_location(&self) -> SourceSpan {
		match self {
			Connectable::Reference(reference) => reference.location,
			Connectable::Pin(pin) => pin.location,
			Connectable::Signal(signal) => signal.location,
		}
	}
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ConnectStatement {
	pub source: Connectable,
	pub target: Connectable,
	pub location: SourceSpan,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum Statement {
	BlockDefinition(Rc<BlockDefinition>),
	Import(ImportStatement),
	Retype(RetypeStatement),
	Assignment(AssignmentStatement),
	Connect(ConnectStatement),
	PinDefinition(PinDefinition),
	SignalDefinition(SignalDefinition),
}

impl SourceLocation for Statement {
	fn get_location(&self) -> SourceSpan {
		use self::Statement::*;
		match self {
			BlockDefinition(block) => block.location,
			Import(import) => import.location,
			Retype(retype) => retype.location,
			Assignment(assignment) => assignment.location,
			Connect(connect) => connect.location,
			PinDefinition(pin) => pin.location,
			SignalDefinition(signal) => signal.location,
		}
	}
}
