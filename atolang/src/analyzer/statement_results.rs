use crate::core::{CompilerError, ErrorGroup};

/// Results of visiting the statements of one block
///
/// Every statement is attempted. Successes are kept and failures
/// are collected, then raised together by `into_result`.
#[derive(Debug)]
pub struct StatementResults<T> {
	items: Vec<T>,
	errors: Vec<CompilerError>,
}

impl<T> Default for StatementResults<T> {
	fn default() -> Self {
		Self {
			items: Vec::new(),
			errors: Vec::new(),
		}
	}
}

impl<T> StatementResults<T> {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push_item(&mut self, item: T) {
		self.items.push(item);
	}

	pub fn push_error(&mut self, error: impl Into<ErrorGroup>) {
		self.errors.extend(error.into());
	}

	/// Records the outcome of one statement
	pub fn push<E: Into<ErrorGroup>>(&mut self, result: Result<T, E>) {
		match result {
			Ok(item) => self.push_item(item),
			Err(err) => self.push_error(err),
		}
	}

	/// Records the outcome of a statement yielding several items
	pub fn extend<E: Into<ErrorGroup>>(&mut self, result: Result<Vec<T>, E>) {
		match result {
			Ok(items) => self.items.extend(items),
			Err(err) => self.push_error(err),
		}
	}

	pub fn items(&self) -> &[T] {
		&self.items
	}

	pub fn into_result(self) -> Result<Vec<T>, ErrorGroup> {
		if self.errors.is_empty() {
			Ok(self.items)
		}
		else {
			Err(ErrorGroup::new(self.errors))
		}
	}
}

impl<T, E: Into<ErrorGroup>> FromIterator<Result<T, E>> for StatementResults<T> {
	fn from_iter<I: IntoIterator<Item = Result<T, E>>>(iter: I) -> Self {
		let mut results = Self::new();
		for result in iter {
			results.push(result);
		}
		results
	}
}
