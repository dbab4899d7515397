use super::builtins::Category;
use super::layer_builder::ObjectLayer;
use crate::core::{Address, Location, Value};
use indexmap::IndexMap;
use serde::Serialize;
use std::rc::Rc;

/// Connection between two instances, held by the instance that declared it
///
/// Endpoints are addresses into the same tree, never owning pointers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Link {
	pub parent: Address,
	pub source: Address,
	pub target: Address,
	#[serde(skip)]
	pub location: Option<Location>,
}

/// Where an override was written
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OverrideOrigin {
	/// Layer whose statements contain the override
	pub layer: Address,
	pub location: Location,
}

/// One node of the resolved circuit tree
#[derive(Debug)]
pub struct Instance {
	pub(super) address: Address,
	pub(super) supers: Vec<Rc<ObjectLayer>>,
	pub(super) children: IndexMap<String, Instance>,
	pub(super) links: Vec<Link>,
	pub(super) override_data: IndexMap<String, Value>,
	pub(super) override_locations: IndexMap<String, OverrideOrigin>,
	pub(super) location: Option<Location>,
}

impl Instance {
	pub fn address(&self) -> &Address {
		&self.address
	}

	/// Layers this instance is made of, most derived first
	pub fn supers(&self) -> &[Rc<ObjectLayer>] {
		&self.supers
	}

	pub fn children(&self) -> &IndexMap<String, Instance> {
		&self.children
	}

	pub fn child(&self, name: &str) -> Option<&Instance> {
		self.children.get(name)
	}

	/// Walks down the tree along `path`
	pub fn descend<S: AsRef<str>>(&self, path: &[S]) -> Option<&Instance> {
		path.iter()
			.try_fold(self, |instance, name| instance.children.get(name.as_ref()))
	}

	pub(super) fn descend_mut<S: AsRef<str>>(&mut self, path: &[S]) -> Option<&mut Instance> {
		path.iter()
			.try_fold(self, |instance, name| instance.children.get_mut(name.as_ref()))
	}

	pub fn links(&self) -> &[Link] {
		&self.links
	}

	/// Values set on this instance from an enclosing block
	pub fn override_data(&self) -> &IndexMap<String, Value> {
		&self.override_data
	}

	pub fn override_location(&self, key: &str) -> Option<&OverrideOrigin> {
		self.override_locations.get(key)
	}

	pub fn location(&self) -> Option<&Location> {
		self.location.as_ref()
	}

	/// Most specific value of an attribute: overrides first, then each layer
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.override_data
			.get(key)
			.or_else(|| self.supers.iter().find_map(|layer| layer.data.get(key)))
	}

	/// Merged view of every attribute visible on this instance
	pub fn data(&self) -> IndexMap<String, Value> {
		let mut data = IndexMap::new();
		let layers = self.supers.iter().rev().map(|layer| &layer.data);
		for source in layers.chain(std::iter::once(&self.override_data)) {
			for (key, value) in source {
				data.insert(key.clone(), value.clone());
			}
		}
		data
	}

	/// First built-in found walking the super chain
	pub fn category(&self) -> Option<Category> {
		self.supers.iter().find_map(|layer| layer.category())
	}

	/// Tests whether any layer of the chain is the given built-in
	pub fn derives_from(&self, category: Category) -> bool {
		let address = category.address();
		self.supers.iter().any(|layer| *layer.address() == address)
	}

	/// Every instance below this one, children before their parents
	pub fn descendants_post_order(&self) -> Vec<&Instance> {
		let mut result = Vec::new();
		self.collect_post_order(&mut result);
		result
	}

	fn collect_post_order<'a>(&'a self, result: &mut Vec<&'a Instance>) {
		for child in self.children.values() {
			child.collect_post_order(result);
		}
		result.push(self);
	}
}
