use crate::core::compiler_diagnostic::*;
use crate::core::{AddressError, Location};
use std::path::Path;
use thiserror::Error;

/// Category of a front end failure
#[derive(Copy, Clone, Debug, Error, PartialEq, Eq, Hash)]
pub enum ErrorKind {
	#[error("Unknown reference")]
	UnknownReference,

	#[error("Ambiguous reference")]
	AmbiguousReference,

	#[error("Malformed statement")]
	MalformedStatement,

	#[error("Name collision")]
	NameCollision,

	#[error("Type error")]
	TypeError,

	#[error("Unknown child")]
	StructuralError,

	#[error("Import not found")]
	ImportNotFound,

	#[error("Inheritance cycle")]
	InheritanceCycle,

	#[error("Instantiation cycle")]
	InstantiationCycle,

	#[error("Syntax error")]
	SyntaxError,

	#[error("I/O error")]
	IoError,
}

impl ErrorKind {
	/// Short machine friendly code shown next to the diagnostic
	pub fn code(&self) -> &'static str {
		use ErrorKind::*;
		match self {
			UnknownReference => "ato::unknown_reference",
			AmbiguousReference => "ato::ambiguous_reference",
			MalformedStatement => "ato::malformed_statement",
			NameCollision => "ato::name_collision",
			TypeError => "ato::type_error",
			StructuralError => "ato::unknown_child",
			ImportNotFound => "ato::import_not_found",
			InheritanceCycle => "ato::inheritance_cycle",
			InstantiationCycle => "ato::instantiation_cycle",
			SyntaxError => "ato::syntax",
			IoError => "ato::io",
		}
	}

	fn help(&self) -> Option<&'static str> {
		use ErrorKind::*;
		match self {
			UnknownReference => Some("Make sure the name is defined in this file or imported."),
			AmbiguousReference => Some("A name must not be both defined and imported in the same scope."),
			NameCollision => Some("Each name may only be defined once per scope."),
			StructuralError => Some("Overrides and connections may only reach through existing children."),
			ImportNotFound => Some("Import paths are searched relative to the importing file, then the project search paths."),
			InheritanceCycle => Some("A block cannot inherit from itself, directly or indirectly."),
			InstantiationCycle => Some("A block cannot contain an instance of itself, directly or indirectly."),
			MalformedStatement | TypeError | SyntaxError | IoError => None,
		}
	}
}

/// General compiler error
///
/// Carries its kind, a human readable message and, when known,
/// the place in the sources that caused it.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct CompilerError {
	pub kind: ErrorKind,
	pub message: String,
	pub location: Option<Location>,
}

impl CompilerError {
	pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
		Self {
			kind,
			message: message.into(),
			location: None,
		}
	}

	pub fn located(kind: ErrorKind, message: impl Into<String>, location: Location) -> Self {
		Self::new(kind, message).with_location(location)
	}

	/// Attaches a location unless one is already known
	pub fn with_location(mut self, location: Location) -> Self {
		if self.location.is_none() {
			self.location = Some(location);
		}
		self
	}

	pub fn file_not_found(path: &Path) -> Self {
		Self::new(ErrorKind::IoError, format!("File not found: {}", path.display()))
	}

	pub fn io(path: &Path, err: &std::io::Error) -> Self {
		Self::new(ErrorKind::IoError, format!("Failed to read {}: {}", path.display(), err))
	}
}

impl ProvidesCompilerDiagnostic for CompilerError {
	fn to_diagnostic(&self) -> CompilerDiagnostic {
		let mut builder = CompilerDiagnosticBuilder::from_error(self).error_code(self.kind.code());
		if let Some(location) = &self.location {
			builder = builder.located_label(location, &self.kind.to_string());
		}
		if let Some(help) = self.kind.help() {
			builder = builder.help(help);
		}
		builder.build()
	}
}

impl From<AddressError> for CompilerError {
	fn from(err: AddressError) -> Self {
		Self::new(ErrorKind::MalformedStatement, err.to_string())
	}
}

/// A non-empty set of errors raised together
///
/// Stage getters return groups so that independent failures found
/// while visiting sibling statements are reported at once.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{} error(s) occurred", .errors.len())]
pub struct ErrorGroup {
	errors: Vec<CompilerError>,
}

impl ErrorGroup {
	pub fn new(errors: Vec<CompilerError>) -> Self {
		debug_assert!(!errors.is_empty(), "error groups are never empty");
		Self { errors }
	}

	pub fn errors(&self) -> &[CompilerError] {
		&self.errors
	}

	pub fn into_errors(self) -> Vec<CompilerError> {
		self.errors
	}

	pub fn len(&self) -> usize {
		self.errors.len()
	}

	pub fn is_empty(&self) -> bool {
		self.errors.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &CompilerError> {
		self.errors.iter()
	}

	/// First error of the group
	pub fn first(&self) -> &CompilerError {
		&self.errors[0]
	}

	pub fn contains_kind(&self, kind: ErrorKind) -> bool {
		self.errors.iter().any(|err| err.kind == kind)
	}
}

impl From<CompilerError> for ErrorGroup {
	fn from(err: CompilerError) -> Self {
		Self { errors: vec![err] }
	}
}

impl IntoIterator for ErrorGroup {
	type Item = CompilerError;
	type IntoIter = std::vec::IntoIter<CompilerError>;
	fn into_iter(self) -> Self::IntoIter {
		self.errors.into_iter()
	}
}

impl Extend<CompilerError> for ErrorGroup {
	fn extend<I: IntoIterator<Item = CompilerError>>(&mut self, iter: I) {
		self.errors.extend(iter)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::core::SourceSpan;
	use miette::Diagnostic;

	#[test]
	fn located_error_becomes_labelled_diagnostic() {
		let err = CompilerError::located(
			ErrorKind::UnknownReference,
			"Couldn't find ref Foo",
			Location::new("a.ato", SourceSpan::new(0, 3)),
		);
		let diag = err.to_diagnostic();
		assert_eq!(diag.to_string(), "Couldn't find ref Foo");
		assert_eq!(diag.code().map(|c| c.to_string()), Some(String::from("ato::unknown_reference")));
		assert_eq!(diag.file(), Some(Path::new("a.ato")));
	}

	#[test]
	fn first_location_wins() {
		let first = Location::new("a.ato", SourceSpan::new(0, 1));
		let second = Location::new("b.ato", SourceSpan::new(5, 1));
		let err = CompilerError::new(ErrorKind::TypeError, "bad")
			.with_location(first.clone())
			.with_location(second);
		assert_eq!(err.location, Some(first));
	}

	#[test]
	fn single_error_converts_to_group() {
		let group: ErrorGroup = CompilerError::new(ErrorKind::IoError, "nope").into();
		assert_eq!(group.len(), 1);
		assert!(group.contains_kind(ErrorKind::IoError));
	}
}
