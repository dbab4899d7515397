//! Read-only queries over resolved instances, addressed by `Address`.
//!
//! Every query accepts any instance address. The tree owning it is
//! built on first use.

use crate::analyzer::{Category, OverrideOrigin};
use crate::compiler::Compiler;
use crate::core::{Address, ErrorGroup, Value};
use indexmap::IndexMap;

/// Direct children with their names
pub fn children_items(compiler: &mut Compiler, address: &Address) -> Result<Vec<(String, Address)>, ErrorGroup> {
	let instance = compiler.instance(address)?;
	Ok(instance
		.children()
		.iter()
		.map(|(name, child)| (name.clone(), child.address().clone()))
		.collect())
}

pub fn children(compiler: &mut Compiler, address: &Address) -> Result<Vec<Address>, ErrorGroup> {
	Ok(children_items(compiler, address)?.into_iter().map(|(_, child)| child).collect())
}

/// The address and everything below it, depth first, children before parents
pub fn all_descendants(compiler: &mut Compiler, address: &Address) -> Result<Vec<Address>, ErrorGroup> {
	let instance = compiler.instance(address)?;
	Ok(instance
		.descendants_post_order()
		.into_iter()
		.map(|descendant| descendant.address().clone())
		.collect())
}

/// Merged attributes, overrides over every layer's own data
pub fn data(compiler: &mut Compiler, address: &Address) -> Result<IndexMap<String, Value>, ErrorGroup> {
	Ok(compiler.instance(address)?.data())
}

/// Addresses of the layers the instance is made of, most derived first
pub fn supers(compiler: &mut Compiler, address: &Address) -> Result<Vec<Address>, ErrorGroup> {
	let instance = compiler.instance(address)?;
	Ok(instance.supers().iter().map(|layer| layer.address().clone()).collect())
}

pub fn next_super(compiler: &mut Compiler, address: &Address) -> Result<Option<Address>, ErrorGroup> {
	Ok(supers(compiler, address)?.into_iter().next())
}

/// Parent of an instance address, `None` for roots and definitions
pub fn parent(address: &Address) -> Option<Address> {
	address.instance_parent()
}

/// Every ancestor, nearest first
pub fn iter_parents(address: &Address) -> impl Iterator<Item = Address> {
	std::iter::successors(parent(address), parent)
}

/// (source, target) pairs of the links declared by the instance
pub fn links(compiler: &mut Compiler, address: &Address) -> Result<Vec<(Address, Address)>, ErrorGroup> {
	let instance = compiler.instance(address)?;
	Ok(instance
		.links()
		.iter()
		.map(|link| (link.source.clone(), link.target.clone()))
		.collect())
}

pub fn category(compiler: &mut Compiler, address: &Address) -> Result<Option<Category>, ErrorGroup> {
	Ok(compiler.instance(address)?.category())
}

/// Which layer and statement set an override
pub fn override_location(
	compiler: &mut Compiler,
	address: &Address,
	key: &str,
) -> Result<Option<OverrideOrigin>, ErrorGroup> {
	Ok(compiler.instance(address)?.override_location(key).cloned())
}

fn matches_any(compiler: &mut Compiler, address: &Address, categories: &[Category]) -> Result<bool, ErrorGroup> {
	let instance = compiler.instance(address)?;
	Ok(categories.iter().any(|category| instance.derives_from(*category)))
}

pub fn is_component(compiler: &mut Compiler, address: &Address) -> Result<bool, ErrorGroup> {
	matches_any(compiler, address, &[Category::Component])
}

/// True for components as well, they derive from Module
pub fn is_module(compiler: &mut Compiler, address: &Address) -> Result<bool, ErrorGroup> {
	matches_any(compiler, address, &[Category::Module])
}

pub fn is_interface(compiler: &mut Compiler, address: &Address) -> Result<bool, ErrorGroup> {
	matches_any(compiler, address, &[Category::Interface])
}

pub fn is_pin(compiler: &mut Compiler, address: &Address) -> Result<bool, ErrorGroup> {
	matches_any(compiler, address, &[Category::Pin])
}

pub fn is_signal(compiler: &mut Compiler, address: &Address) -> Result<bool, ErrorGroup> {
	matches_any(compiler, address, &[Category::Signal])
}

pub fn is_pin_or_signal(compiler: &mut Compiler, address: &Address) -> Result<bool, ErrorGroup> {
	matches_any(compiler, address, &[Category::Pin, Category::Signal])
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::parser::InMemorySources;

	const SOURCE: &str = "\
component R:
    pin 1
    pin 2
    value = \"10k\"

module Top:
    signal vcc
    r1 = new R
    r1.value = \"4k7\"
    vcc ~ r1.1
";

	fn compiler() -> Compiler {
		Compiler::new(InMemorySources::new().with_file("a.ato", SOURCE), Vec::new())
	}

	fn address(text: &str) -> Address {
		text.parse().unwrap()
	}

	#[test]
	fn parents_and_children_agree() {
		let mut compiler = compiler();
		for descendant in all_descendants(&mut compiler, &address("a.ato:Top")).unwrap() {
			if let Some(parent) = parent(&descendant) {
				assert!(children(&mut compiler, &parent).unwrap().contains(&descendant));
			}
		}
	}

	#[test]
	fn descendants_are_post_order() {
		let mut compiler = compiler();
		let descendants = all_descendants(&mut compiler, &address("a.ato:Top")).unwrap();
		let names: Vec<String> = descendants.iter().map(|a| a.to_string()).collect();
		assert_eq!(
			names,
			vec![
				"a.ato:Top::vcc",
				"a.ato:Top::r1.1",
				"a.ato:Top::r1.2",
				"a.ato:Top::r1",
				"a.ato:Top"
			]
		);
	}

	#[test]
	fn ancestors_nearest_first() {
		let parents: Vec<Address> = iter_parents(&address("a.ato:Top::r1.1")).collect();
		assert_eq!(parents, vec![address("a.ato:Top::r1"), address("a.ato:Top")]);
		assert_eq!(parent(&address("a.ato:Top")), None);
	}

	#[test]
	fn classification() {
		let mut compiler = compiler();
		let r1 = address("a.ato:Top::r1");
		assert!(is_component(&mut compiler, &r1).unwrap());
		assert!(is_module(&mut compiler, &r1).unwrap());
		assert_eq!(category(&mut compiler, &r1).unwrap(), Some(Category::Component));
		assert!(is_pin(&mut compiler, &address("a.ato:Top::r1.1")).unwrap());
		assert!(is_signal(&mut compiler, &address("a.ato:Top::vcc")).unwrap());
		assert!(is_pin_or_signal(&mut compiler, &address("a.ato:Top::vcc")).unwrap());
		assert!(!is_interface(&mut compiler, &r1).unwrap());
		assert_eq!(
			next_super(&mut compiler, &r1).unwrap(),
			Some(address("a.ato:R"))
		);
	}

	#[test]
	fn overrides_and_their_origin() {
		let mut compiler = compiler();
		let r1 = address("a.ato:Top::r1");
		assert_eq!(data(&mut compiler, &r1).unwrap()["value"], Value::from("4k7"));
		let origin = override_location(&mut compiler, &r1, "value").unwrap().unwrap();
		assert_eq!(origin.layer, address("a.ato:Top"));
		assert_eq!(data(&mut compiler, &address("a.ato:R")).unwrap()["value"], Value::from("10k"));
	}

	#[test]
	fn links_point_at_children() {
		let mut compiler = compiler();
		let links = links(&mut compiler, &address("a.ato:Top")).unwrap();
		assert_eq!(links, vec![(address("a.ato:Top::vcc"), address("a.ato:Top::r1.1"))]);
		assert_eq!(children_items(&mut compiler, &address("a.ato:Top::vcc")).unwrap(), vec![]);
	}
}
