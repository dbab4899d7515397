pub mod address;
pub mod compiler_diagnostic;
pub mod compiler_error;
pub mod diagnostic_buffer;
pub mod reference;
pub mod source_span;
mod value;

pub use address::Address;
pub use address::AddressError;
pub use compiler_diagnostic::CompilerDiagnostic;
pub use compiler_diagnostic::CompilerDiagnosticBuilder;
pub use compiler_diagnostic::ProvidesCompilerDiagnostic;
pub use compiler_error::CompilerError;
pub use compiler_error::ErrorGroup;
pub use compiler_error::ErrorKind;
pub use diagnostic_buffer::DiagnosticBuffer;
pub use reference::Reference;
pub use reference::Segment;
pub use source_span::Location;
pub use source_span::SourceSpan;
pub use value::Value;
