use super::builtins::{self, BUILTIN_FILE};
use super::object_def::{Closure, DefinitionSource, Import, ObjectDef, Replacement, Scope};
use super::statement_results::StatementResults;
use crate::core::{Address, CompilerError, ErrorGroup, ErrorKind, Location, Reference};
use crate::parser::ast::{BlockDefinition, BlockKind, ImportStatement, ImportedNames, Statement};
use crate::parser::{normalize_path, SyntaxCache};
use indexmap::IndexMap;
use log::{debug, info};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Builds ObjectDefs from syntax trees, one whole file at a time
pub struct DefinitionCatalog {
	syntax: SyntaxCache,
	search_paths: Vec<PathBuf>,
	cache: HashMap<Address, Rc<ObjectDef>>,
}

/// What a block contributes to the scope of its body
struct BlockContents {
	blocks: Vec<Rc<BlockDefinition>>,
	imports: IndexMap<Reference, Import>,
	replacements: IndexMap<Reference, Replacement>,
}

impl DefinitionCatalog {
	pub fn new(syntax: SyntaxCache, search_paths: Vec<PathBuf>) -> Self {
		let cache = builtins::definitions()
			.into_iter()
			.map(|def| (def.address.clone(), def))
			.collect();
		Self {
			syntax,
			search_paths,
			cache,
		}
	}

	pub fn syntax(&self) -> &SyntaxCache {
		&self.syntax
	}

	pub fn search_paths(&self) -> &[PathBuf] {
		&self.search_paths
	}

	/// Returns the definition at `address`, cataloging its file on first request
	pub fn get_definition(&mut self, address: &Address) -> Result<Rc<ObjectDef>, ErrorGroup> {
		if let Some(def) = self.cache.get(address) {
			return Ok(def.clone());
		}

		let file_address = address.file_address();
		if address.file() == BUILTIN_FILE || self.cache.contains_key(&file_address) {
			return Err(CompilerError::new(
				ErrorKind::UnknownReference,
				format!("No definition found at {}", address),
			)
			.into());
		}

		info!("Cataloging {}", address.file());
		let file_def = self.build_file(address.file_path())?;
		self.register(&file_def);

		self.cache.get(address).cloned().ok_or_else(|| {
			CompilerError::new(
				ErrorKind::UnknownReference,
				format!("No definition found at {}", address),
			)
			.into()
		})
	}

	fn register(&mut self, def: &Rc<ObjectDef>) {
		debug!("Registered definition {}", def.address);
		self.cache.insert(def.address.clone(), def.clone());
		for child in def.local_defs.values() {
			self.register(child);
		}
	}

	fn build_file(&mut self, path: &Path) -> Result<Rc<ObjectDef>, ErrorGroup> {
		let path = normalize_path(path);
		let tree = self.syntax.parse(&path)?;
		let address = Address::from_file(&path);
		let location = Location::new(&path, tree.location);
		self.build_definition(
			address,
			Some(builtins::Category::Module.reference()),
			None,
			DefinitionSource::File(tree),
			Some(location),
			None,
		)
	}

	/// Builds the definition of a block and every block nested in it
	///
	/// Errors of sibling statements and sibling blocks are collected
	/// and raised together.
	fn build_definition(
		&self,
		address: Address,
		super_ref: Option<Reference>,
		super_location: Option<Location>,
		source: DefinitionSource,
		location: Option<Location>,
		enclosing: Option<Rc<Closure>>,
	) -> Result<Rc<ObjectDef>, ErrorGroup> {
		let file = address.file_path().to_path_buf();
		let mut errors = StatementResults::<()>::new();
		let BlockContents {
			blocks,
			imports,
			replacements,
		} = self.collect_contents(&file, source.statements(), &mut errors);

		let mut local_addresses = IndexMap::new();
		for block in &blocks {
			match address.add_entry(&block.name) {
				Ok(child) => {
					local_addresses.insert(block.name.clone(), child);
				},
				Err(err) => errors.push_error(CompilerError::from(err)),
			}
		}

		let closure = Rc::new(Closure::new(
			Scope {
				address: address.clone(),
				local_defs: local_addresses.clone(),
				imports: imports.clone(),
			},
			enclosing,
		));

		let mut local_defs = IndexMap::new();
		for block in blocks {
			let Some(child_address) = local_addresses.get(&block.name) else {
				continue;
			};
			let block_location = Location::new(&file, block.location);
			let (child_super, child_super_location) = match &block.super_ref {
				Some(super_ref) => (super_ref.reference.clone(), Location::new(&file, super_ref.location)),
				None => (block_kind_reference(block.kind), block_location.clone()),
			};
			let child = self.build_definition(
				child_address.clone(),
				Some(child_super),
				Some(child_super_location),
				DefinitionSource::Block(block.clone()),
				Some(block_location),
				Some(closure.clone()),
			);
			match child {
				Ok(def) => {
					local_defs.insert(block.name.clone(), def);
				},
				Err(group) => errors.push_error(group),
			}
		}

		errors.into_result()?;
		Ok(Rc::new(ObjectDef {
			address,
			super_ref,
			super_location,
			local_defs,
			imports,
			replacements,
			closure,
			source,
			location,
		}))
	}

	fn collect_contents(
		&self,
		file: &Path,
		statements: &[Statement],
		errors: &mut StatementResults<()>,
	) -> BlockContents {
		let mut contents = BlockContents {
			blocks: Vec::new(),
			imports: IndexMap::new(),
			replacements: IndexMap::new(),
		};
		let mut block_locations: HashMap<&str, Location> = HashMap::new();

		for statement in statements {
			match statement {
				Statement::BlockDefinition(block) => {
					let location = Location::new(file, block.location);
					if let Some(previous) = block_locations.get(block.name.as_str()) {
						errors.push_error(CompilerError::located(
							ErrorKind::NameCollision,
							format!("'{}' is already defined at {}", block.name, previous),
							location,
						));
						continue;
					}
					block_locations.insert(&block.name, location);
					contents.blocks.push(block.clone());
				},
				Statement::Import(import) => match self.collect_import(file, import) {
					Ok(imports) => {
						for (name, import) in imports {
							if let Some(previous) = contents.imports.get(&name) {
								errors.push_error(CompilerError::located(
									ErrorKind::NameCollision,
									format!("'{}' is already imported at {}", name, previous.location),
									import.location,
								));
								continue;
							}
							contents.imports.insert(name, import);
						}
					},
					Err(err) => errors.push_error(err),
				},
				Statement::Retype(retype) => {
					let replacement = Replacement {
						original: retype.target.reference.clone(),
						replacement: retype.new_type.reference.clone(),
						location: Location::new(file, retype.location),
					};
					contents.replacements.insert(replacement.original.clone(), replacement);
				},
				_ => {},
			}
		}
		contents
	}

	fn collect_import(&self, file: &Path, import: &ImportStatement) -> Result<Vec<(Reference, Import)>, CompilerError> {
		let location = Location::new(file, import.location);
		let names = match &import.names {
			ImportedNames::All => {
				return Err(CompilerError::located(
					ErrorKind::MalformedStatement,
					"Wildcard imports are not supported",
					location,
				))
			},
			ImportedNames::Specific { names } => names,
		};

		let path = self.resolve_import_path(file, &import.from_path).ok_or_else(|| {
			CompilerError::located(
				ErrorKind::ImportNotFound,
				format!("Unable to find file to import for \"{}\"", import.from_path),
				location.clone(),
			)
		})?;

		names
			.iter()
			.map(|name| {
				let obj_addr = Address::from_file(&path)
					.add_entries(name.reference.segments())
					.map_err(|err| CompilerError::from(err).with_location(location.clone()))?;
				Ok((
					name.reference.clone(),
					Import {
						obj_addr,
						location: location.clone(),
					},
				))
			})
			.collect()
	}

	/// Finds the file an import statement refers to
	///
	/// Relative paths are tried against the importing file's directory,
	/// then against every search path, in order.
	pub fn resolve_import_path(&self, importing_file: &Path, import_path: &str) -> Option<PathBuf> {
		let import_path = Path::new(import_path);
		if import_path.is_absolute() {
			let path = normalize_path(import_path);
			return self.syntax.is_file(&path).then_some(path);
		}

		let importing_dir = importing_file.parent().map(Path::to_path_buf).unwrap_or_default();
		std::iter::once(importing_dir)
			.chain(self.search_paths.iter().cloned())
			.map(|dir| normalize_path(&dir.join(import_path)))
			.find(|candidate| self.syntax.is_file(candidate))
	}
}

fn block_kind_reference(kind: BlockKind) -> Reference {
	let category = match kind {
		BlockKind::Module => builtins::Category::Module,
		BlockKind::Component => builtins::Category::Component,
		BlockKind::Interface => builtins::Category::Interface,
	};
	category.reference()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::parser::InMemorySources;

	fn catalog(files: &[(&str, &str)], search_paths: &[&str]) -> DefinitionCatalog {
		let sources = files
			.iter()
			.fold(InMemorySources::new(), |sources, (path, text)| sources.with_file(path, *text));
		DefinitionCatalog::new(
			SyntaxCache::new(sources),
			search_paths.iter().map(PathBuf::from).collect(),
		)
	}

	fn address(text: &str) -> Address {
		text.parse().unwrap()
	}

	#[test]
	fn whole_file_is_registered_at_once() {
		let mut catalog = catalog(&[("a.ato", "module Top:\n    component R:\n        pin p1\n")], &[]);
		let top = catalog.get_definition(&address("a.ato:Top")).unwrap();
		let r = catalog.get_definition(&address("a.ato:Top.R")).unwrap();
		assert!(Rc::ptr_eq(&top.local_defs["R"], &r));
		assert_eq!(r.super_ref, Some(builtins::Category::Component.reference()));

		let again = catalog.get_definition(&address("a.ato:Top")).unwrap();
		assert!(Rc::ptr_eq(&top, &again));
	}

	#[test]
	fn file_definitions_derive_from_module() {
		let mut catalog = catalog(&[("a.ato", "x = 1\n")], &[]);
		let file = catalog.get_definition(&address("a.ato")).unwrap();
		assert_eq!(file.super_ref, Some(builtins::Category::Module.reference()));
		assert!(file.closure.enclosing().is_none());
	}

	#[test]
	fn imports_are_searched_in_order() {
		let mut catalog = catalog(
			&[
				("src/top.ato", "import Foo from \"lib.ato\"\n"),
				("first/lib.ato", "module Foo: pin p1\n"),
				("second/lib.ato", "module Foo: pin p2\n"),
			],
			&["first", "second"],
		);
		let top = catalog.get_definition(&address("src/top.ato")).unwrap();
		let import = &top.imports[&"Foo".parse::<Reference>().unwrap()];
		assert_eq!(import.obj_addr, address("first/lib.ato:Foo"));
	}

	#[test]
	fn importing_directory_comes_first() {
		let catalog = catalog(&[("src/lib.ato", ""), ("other/lib.ato", "")], &["other"]);
		assert_eq!(
			catalog.resolve_import_path(Path::new("src/top.ato"), "lib.ato"),
			Some(PathBuf::from("src/lib.ato"))
		);
		assert_eq!(
			catalog.resolve_import_path(Path::new("src/top.ato"), "../other/lib.ato"),
			Some(PathBuf::from("other/lib.ato"))
		);
		assert_eq!(catalog.resolve_import_path(Path::new("src/top.ato"), "nope.ato"), None);
	}

	#[test]
	fn statement_errors_are_collected() {
		let source = "import A from \"missing.ato\"\nimport * from \"b.ato\"\nmodule X: pin p\nmodule X: pin q\n";
		let mut catalog = catalog(&[("a.ato", source), ("b.ato", "")], &[]);
		let group = catalog.get_definition(&address("a.ato")).unwrap_err();
		assert_eq!(group.len(), 3);
		assert!(group.contains_kind(ErrorKind::ImportNotFound));
		assert!(group.contains_kind(ErrorKind::MalformedStatement));
		assert!(group.contains_kind(ErrorKind::NameCollision));
		assert!(group.iter().all(|err| err.location.is_some()));
	}

	#[test]
	fn failed_files_are_not_cached() {
		let mut catalog = catalog(&[("a.ato", "import A from \"missing.ato\"\nmodule B: pin p\n")], &[]);
		assert!(catalog.get_definition(&address("a.ato:B")).is_err());
		assert!(catalog.get_definition(&address("a.ato:B")).is_err());
	}

	#[test]
	fn unknown_entries_in_known_files_fail() {
		let mut catalog = catalog(&[("a.ato", "module B: pin p\n")], &[]);
		catalog.get_definition(&address("a.ato")).unwrap();
		let err = catalog.get_definition(&address("a.ato:C")).unwrap_err();
		assert!(err.contains_kind(ErrorKind::UnknownReference));
	}

	#[test]
	fn builtins_are_cataloged() {
		let mut catalog = catalog(&[], &[]);
		let component = catalog.get_definition(&builtins::Category::Component.address()).unwrap();
		assert!(component.is_builtin());
	}
}
