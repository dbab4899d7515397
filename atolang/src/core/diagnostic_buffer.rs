use crate::core::compiler_diagnostic::{CompilerDiagnostic, ProvidesCompilerDiagnostic};
use crate::core::ErrorGroup;
use std::path::Path;

/// Collects diagnostics produced while resolving a design
/// so they can be printed together, each with the source file it points into.
#[derive(Clone, Default)]
pub struct DiagnosticBuffer {
	error_buffer: Vec<CompilerDiagnostic>,
}

impl DiagnosticBuffer {
	pub fn new() -> Self {
		Self {
			error_buffer: vec![],
		}
	}

	pub fn push_error(&mut self, diag: CompilerDiagnostic) {
		self.error_buffer.push(diag);
	}

	/// Queues every error of a group
	pub fn push_group(&mut self, group: &ErrorGroup) {
		for err in group.iter() {
			self.push_error(err.to_diagnostic());
		}
	}

	pub fn error_count(&self) -> usize {
		self.error_buffer.len()
	}

	fn to_report<F>(diag: CompilerDiagnostic, source_of: &F) -> miette::Report
	where
		F: Fn(&Path) -> Option<String>,
	{
		let named_source = diag
			.file()
			.and_then(|file| source_of(file).map(|src| (file.display().to_string(), src)));
		let report = miette::Report::new(diag);
		match named_source {
			Some((name, src)) => report.with_source_code(miette::NamedSource::new(name, src)),
			None => report,
		}
	}

	/// Prints every buffered error to stderr.
	///
	/// `source_of` provides the text of the files labels point into.
	/// Returns the last error as a report if any errors were buffered.
	pub fn print_diagnostics<F>(self, source_of: F) -> miette::Result<()>
	where
		F: Fn(&Path) -> Option<String>,
	{
		let mut errors = self.error_buffer;
		let last = match errors.pop() {
			None => return Ok(()),
			Some(last) => last,
		};
		eprintln!("During resolution the following errors were generated:");
		for diag in errors {
			eprintln!("{:?}", Self::to_report(diag, &source_of));
		}
		Err(Self::to_report(last, &source_of))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::core::{CompilerError, ErrorKind, Location, SourceSpan};

	#[test]
	fn empty_buffer_prints_ok() {
		assert!(DiagnosticBuffer::new().print_diagnostics(|_| None).is_ok());
	}

	#[test]
	fn group_errors_are_all_buffered() {
		let group = ErrorGroup::new(vec![
			CompilerError::new(ErrorKind::UnknownReference, "a"),
			CompilerError::located(ErrorKind::TypeError, "b", Location::new("x.ato", SourceSpan::new(0, 1))),
		]);
		let mut buffer = DiagnosticBuffer::new();
		buffer.push_group(&group);
		assert_eq!(buffer.error_count(), 2);
		assert!(buffer.print_diagnostics(|_| Some(String::from("pin 1.5"))).is_err());
	}
}
