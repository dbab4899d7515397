use crate::analyzer::{
	DefinitionCatalog, Instance, InstanceBuilder, InstanceHandle, LayerBuilder, ObjectDef, ObjectLayer,
	StatementResults,
};
use crate::core::{Address, ErrorGroup};
use crate::parser::{normalize_path, FileSystem, SourceProvider, SyntaxCache};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Owns the three stage caches of one compilation
///
/// Every getter resolves what it is asked for plus its dependencies and
/// caches the result. Sources that change on disk require a new `Compiler`.
pub struct Compiler {
	instances: InstanceBuilder,
}

impl Compiler {
	pub fn new(provider: impl SourceProvider + 'static, search_paths: Vec<PathBuf>) -> Self {
		let catalog = DefinitionCatalog::new(SyntaxCache::new(provider), search_paths);
		Self {
			instances: InstanceBuilder::new(LayerBuilder::new(catalog)),
		}
	}

	pub fn with_file_system(search_paths: Vec<PathBuf>) -> Self {
		Self::new(FileSystem, search_paths)
	}

	pub fn search_paths(&self) -> &[PathBuf] {
		self.instances.layers().catalog().search_paths()
	}

	pub fn get_definition(&mut self, address: &Address) -> Result<Rc<ObjectDef>, ErrorGroup> {
		self.instances.layers_mut().catalog_mut().get_definition(&normalized(address))
	}

	pub fn get_layer(&mut self, address: &Address) -> Result<Rc<ObjectLayer>, ErrorGroup> {
		self.instances.layers_mut().get_layer(&normalized(address))
	}

	pub fn get_instance_tree(&mut self, address: &Address) -> Result<Rc<Instance>, ErrorGroup> {
		self.instances.get_instance_tree(&normalized(address))
	}

	/// Any instance, including ones nested below a root
	pub fn instance(&mut self, address: &Address) -> Result<InstanceHandle, ErrorGroup> {
		self.instances.instance(&normalized(address))
	}

	/// Instantiates every top-level block of a file
	///
	/// Errors of all blocks are reported together.
	pub fn resolve_file(&mut self, file: &Path) -> Result<Vec<Rc<Instance>>, ErrorGroup> {
		let file_def = self.get_definition(&Address::from_file(file))?;
		let results: StatementResults<Rc<Instance>> = file_def
			.local_defs
			.values()
			.map(|def| self.get_instance_tree(&def.address))
			.collect();
		results.into_result()
	}

	/// Text of a parsed file, for rendering diagnostics
	pub fn source(&self, path: &Path) -> Option<&str> {
		self.instances.layers().catalog().syntax().source(path)
	}
}

/// Same address with its file path in the form the caches are keyed by
fn normalized(address: &Address) -> Address {
	Address::from_parts(
		normalize_path(address.file_path()),
		address.entry(),
		address.instance().unwrap_or_default(),
	)
}
