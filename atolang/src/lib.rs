pub mod analyzer;
pub mod compiler;
pub mod core;
pub mod instance_methods;
pub mod lexer;
pub mod parser;
pub mod project;

pub use crate::compiler::Compiler;
pub use crate::core::{
	Address, CompilerDiagnostic, CompilerError, DiagnosticBuffer, ErrorGroup, ErrorKind, ProvidesCompilerDiagnostic,
	Reference, SourceSpan, Value,
};
pub use crate::project::{Project, ProjectConfig, ProjectError};
