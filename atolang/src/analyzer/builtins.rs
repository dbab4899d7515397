//! The five built-in roots every inheritance chain ends in.

use super::object_def::{Closure, DefinitionSource, ObjectDef, Scope};
use crate::core::{Address, Reference};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// File part of built-in addresses
pub const BUILTIN_FILE: &str = "<Built-in>";

/// Classification of an instance by the built-in it derives from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
	Module,
	Component,
	Interface,
	Pin,
	Signal,
}

impl Category {
	pub const ALL: [Category; 5] = [
		Category::Module,
		Category::Component,
		Category::Interface,
		Category::Pin,
		Category::Signal,
	];

	/// Name the built-in is entered under in the built-in file
	pub fn entry_name(&self) -> &'static str {
		match self {
			Category::Module => "Module",
			Category::Component => "Component",
			Category::Interface => "Interface",
			Category::Pin => "Pin",
			Category::Signal => "Signal",
		}
	}

	/// Name the built-in is looked up by from source
	pub fn reference_name(&self) -> &'static str {
		match self {
			Category::Module => "MODULE",
			Category::Component => "COMPONENT",
			Category::Interface => "INTERFACE",
			Category::Pin => "PIN",
			Category::Signal => "SIGNAL",
		}
	}

	pub fn address(&self) -> Address {
		Address::from_parts(BUILTIN_FILE, [self.entry_name()], Vec::<String>::new())
	}

	pub fn reference(&self) -> Reference {
		Reference::from_one(self.reference_name())
	}

	pub fn from_address(address: &Address) -> Option<Category> {
		if address.file() != BUILTIN_FILE || address.is_instance() {
			return None;
		}
		match address.entry() {
			[name] => Self::ALL.into_iter().find(|c| c.entry_name() == name),
			_ => None,
		}
	}

	pub fn from_reference(reference: &Reference) -> Option<Category> {
		Self::ALL
			.into_iter()
			.find(|c| reference.len() == 1 && reference.first().to_string() == c.reference_name())
	}

	fn super_category(&self) -> Option<Category> {
		match self {
			Category::Component => Some(Category::Module),
			_ => None,
		}
	}
}

impl fmt::Display for Category {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{}", self.entry_name().to_lowercase())
	}
}

/// Definitions backing the built-ins, they carry no source
pub fn definitions() -> Vec<Rc<ObjectDef>> {
	let closure = Rc::new(Closure::new(
		Scope {
			address: Address::from_file(BUILTIN_FILE),
			local_defs: IndexMap::new(),
			imports: IndexMap::new(),
		},
		None,
	));

	Category::ALL
		.into_iter()
		.map(|category| {
			Rc::new(ObjectDef {
				address: category.address(),
				super_ref: category.super_category().map(|c| c.reference()),
				super_location: None,
				local_defs: IndexMap::new(),
				imports: IndexMap::new(),
				replacements: IndexMap::new(),
				closure: closure.clone(),
				source: DefinitionSource::Builtin,
				location: None,
			})
		})
		.collect()
}
