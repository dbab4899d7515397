use super::builtins::Category;
use super::definition_catalog::DefinitionCatalog;
use super::object_def::ObjectDef;
use super::statement_results::StatementResults;
use crate::core::{Address, CompilerError, ErrorGroup, ErrorKind, Value};
use crate::parser::ast::{Assignable, Statement};
use indexmap::IndexMap;
use log::debug;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

/// One inheritance level: the resolved super layer plus this block's own scalars
#[derive(Debug)]
pub struct ObjectLayer {
	pub definition: Rc<ObjectDef>,
	pub super_layer: Option<Rc<ObjectLayer>>,
	pub data: IndexMap<String, Value>,
}

impl ObjectLayer {
	pub fn address(&self) -> &Address {
		&self.definition.address
	}

	/// This layer followed by every super layer, most derived first
	pub fn supers(self: &Rc<Self>) -> Vec<Rc<ObjectLayer>> {
		std::iter::successors(Some(self.clone()), |layer| layer.super_layer.clone()).collect()
	}

	pub fn category(&self) -> Option<Category> {
		Category::from_address(self.address())
	}
}

impl fmt::Display for ObjectLayer {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "<ObjectLayer {}>", self.address())
	}
}

/// Resolves definitions into cached layers
pub struct LayerBuilder {
	catalog: DefinitionCatalog,
	cache: HashMap<Address, Rc<ObjectLayer>>,
	in_progress: HashSet<Address>,
}

impl LayerBuilder {
	pub fn new(mut catalog: DefinitionCatalog) -> Self {
		let mut cache: HashMap<Address, Rc<ObjectLayer>> = HashMap::new();
		// Module comes first so Component can point at it
		for category in [
			Category::Module,
			Category::Component,
			Category::Interface,
			Category::Pin,
			Category::Signal,
		] {
			let Ok(definition) = catalog.get_definition(&category.address()) else {
				continue;
			};
			let super_layer = definition
				.super_ref
				.as_ref()
				.and_then(Category::from_reference)
				.and_then(|super_category| cache.get(&super_category.address()).cloned());
			cache.insert(
				category.address(),
				Rc::new(ObjectLayer {
					definition,
					super_layer,
					data: IndexMap::new(),
				}),
			);
		}

		Self {
			catalog,
			cache,
			in_progress: HashSet::new(),
		}
	}

	pub fn catalog(&self) -> &DefinitionCatalog {
		&self.catalog
	}

	pub fn catalog_mut(&mut self) -> &mut DefinitionCatalog {
		&mut self.catalog
	}

	/// Layer of a built-in root, always present
	pub fn builtin(&self, category: Category) -> Rc<ObjectLayer> {
		self.cache[&category.address()].clone()
	}

	/// Returns the layer at `address`, building it and its supers on first request
	pub fn get_layer(&mut self, address: &Address) -> Result<Rc<ObjectLayer>, ErrorGroup> {
		if let Some(layer) = self.cache.get(address) {
			return Ok(layer.clone());
		}

		let definition = self.catalog.get_definition(address)?;
		if !self.in_progress.insert(address.clone()) {
			let mut err = CompilerError::new(
				ErrorKind::InheritanceCycle,
				format!("{} inherits from itself", address),
			);
			if let Some(location) = definition.super_location.clone().or(definition.location.clone()) {
				err = err.with_location(location);
			}
			return Err(err.into());
		}

		let layer = self.make_layer(definition);
		self.in_progress.remove(address);

		let layer = Rc::new(layer?);
		debug!("Built layer {}", address);
		self.cache.insert(address.clone(), layer.clone());
		Ok(layer)
	}

	fn make_layer(&mut self, definition: Rc<ObjectDef>) -> Result<ObjectLayer, ErrorGroup> {
		// A bad super is fatal for this layer, no point looking at the statements
		let super_layer = match definition.lookup_super()? {
			Some(super_address) => Some(self.get_layer(&super_address)?),
			None => None,
		};

		let data = collect_data(&definition)?;
		Ok(ObjectLayer {
			definition,
			super_layer,
			data,
		})
	}
}

/// Single-segment scalar assignments of a block
///
/// Instantiations and assignments reaching into children are left
/// for the instance builder.
fn collect_data(definition: &ObjectDef) -> Result<IndexMap<String, Value>, ErrorGroup> {
	let results: StatementResults<(String, Value)> = definition
		.statements()
		.iter()
		.filter_map(|statement| match statement {
			Statement::Assignment(assignment) if assignment.target.reference.len() == 1 => Some(assignment),
			_ => None,
		})
		.filter_map(|assignment| {
			let name = assignment.target.reference.first().to_string();
			match &assignment.value {
				Assignable::Literal { value, .. } => Some(Ok((name, value.clone()))),
				Assignable::New { .. } => None,
				Assignable::Reference(reference) => Some(Err(CompilerError::located(
					ErrorKind::TypeError,
					format!("Cannot assign the reference {} to {}, use `new` to instantiate", reference.reference, name),
					definition.locate(assignment.location),
				))),
			}
		})
		.collect();

	// Later assignments of the same name win
	Ok(results.into_result()?.into_iter().collect())
}

/// Layer addresses of a chain, most derived first
pub fn chain_addresses(layer: &Rc<ObjectLayer>) -> Vec<Address> {
	layer.supers().iter().map(|layer| layer.address().clone()).collect()
}
