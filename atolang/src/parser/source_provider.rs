use super::ast::FileInput;
use super::parse_source;
use crate::core::CompilerError;
use log::debug;
use std::collections::HashMap;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::rc::Rc;

/// Where source text comes from
pub trait SourceProvider {
	fn read_source(&self, path: &Path) -> io::Result<String>;

	fn is_file(&self, path: &Path) -> bool;
}

/// Reads sources from disk
#[derive(Clone, Copy, Debug, Default)]
pub struct FileSystem;

impl SourceProvider for FileSystem {
	fn read_source(&self, path: &Path) -> io::Result<String> {
		std::fs::read_to_string(path)
	}

	fn is_file(&self, path: &Path) -> bool {
		path.is_file()
	}
}

/// Sources kept in memory, keyed by normalized path
#[derive(Clone, Debug, Default)]
pub struct InMemorySources {
	files: HashMap<PathBuf, String>,
}

impl InMemorySources {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&mut self, path: impl AsRef<Path>, source: impl Into<String>) {
		self.files.insert(normalize_path(path.as_ref()), source.into());
	}

	pub fn with_file(mut self, path: impl AsRef<Path>, source: impl Into<String>) -> Self {
		self.insert(path, source);
		self
	}
}

impl SourceProvider for InMemorySources {
	fn read_source(&self, path: &Path) -> io::Result<String> {
		self.files
			.get(&normalize_path(path))
			.cloned()
			.ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("{} not found", path.display())))
	}

	fn is_file(&self, path: &Path) -> bool {
		self.files.contains_key(&normalize_path(path))
	}
}

/// Removes `.` and resolves `..` components without touching the file system
pub fn normalize_path(path: &Path) -> PathBuf {
	let mut normalized = PathBuf::new();
	for component in path.components() {
		match component {
			Component::CurDir => {},
			Component::ParentDir => {
				let ends_with_name = matches!(normalized.components().next_back(), Some(Component::Normal(_)));
				if ends_with_name {
					normalized.pop();
				}
				else if !normalized.has_root() {
					normalized.push("..");
				}
			},
			other => normalized.push(other),
		}
	}
	normalized
}

/// Parses each file once and keeps both its tree and its text
pub struct SyntaxCache {
	provider: Box<dyn SourceProvider>,
	trees: HashMap<PathBuf, Rc<FileInput>>,
	sources: HashMap<PathBuf, String>,
}

impl SyntaxCache {
	pub fn new(provider: impl SourceProvider + 'static) -> Self {
		Self {
			provider: Box::new(provider),
			trees: HashMap::new(),
			sources: HashMap::new(),
		}
	}

	pub fn is_file(&self, path: &Path) -> bool {
		self.provider.is_file(path)
	}

	/// Returns the syntax tree of a file, parsing it on first request
	pub fn parse(&mut self, path: &Path) -> Result<Rc<FileInput>, CompilerError> {
		let path = normalize_path(path);
		if let Some(tree) = self.trees.get(&path) {
			return Ok(tree.clone());
		}

		if !self.provider.is_file(&path) {
			return Err(CompilerError::file_not_found(&path));
		}
		let source = self
			.provider
			.read_source(&path)
			.map_err(|err| CompilerError::io(&path, &err))?;
		debug!("Parsing {}", path.display());
		let parsed = parse_source(&source);
		self.sources.insert(path.clone(), source);

		let tree = Rc::new(parsed.map_err(|err| err.into_compiler_error(&path))?);
		self.trees.insert(path, tree.clone());
		Ok(tree)
	}

	/// Text of a file that has been parsed before
	pub fn source(&self, path: &Path) -> Option<&str> {
		self.sources.get(&normalize_path(path)).map(String::as_str)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::core::ErrorKind;
	use rstest::rstest;

	#[rstest]
	#[case("a/./b.ato", "a/b.ato")]
	#[case("a/c/../b.ato", "a/b.ato")]
	#[case("../b.ato", "../b.ato")]
	#[case("/x/../../b.ato", "/b.ato")]
	fn lexical_normalization(#[case] path: &str, #[case] expected: &str) {
		assert_eq!(normalize_path(Path::new(path)), PathBuf::from(expected));
	}

	#[test]
	fn trees_are_parsed_once() {
		let mut cache = SyntaxCache::new(InMemorySources::new().with_file("a.ato", "module A:\n    pin p1\n"));
		let first = cache.parse(Path::new("a.ato")).unwrap();
		let second = cache.parse(Path::new("./a.ato")).unwrap();
		assert!(Rc::ptr_eq(&first, &second));
		assert!(cache.source(Path::new("a.ato")).is_some());
	}

	#[test]
	fn syntax_errors_keep_the_source() {
		let mut cache = SyntaxCache::new(InMemorySources::new().with_file("bad.ato", "module :\n"));
		let err = cache.parse(Path::new("bad.ato")).unwrap_err();
		assert_eq!(err.kind, ErrorKind::SyntaxError);
		assert!(cache.source(Path::new("bad.ato")).is_some());
	}

	#[test]
	fn missing_files_are_io_errors() {
		let mut cache = SyntaxCache::new(InMemorySources::new());
		assert_eq!(cache.parse(Path::new("nope.ato")).unwrap_err().kind, ErrorKind::IoError);
	}
}
