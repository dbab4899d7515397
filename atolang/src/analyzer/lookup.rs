use super::builtins::Category;
use super::object_def::{Closure, ObjectDef, Scope};
use crate::core::{Address, CompilerError, ErrorKind, Reference};

/// Outcome of searching a single scope
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Lookup {
	LocalDefinition(Address),
	Import(Address),
	NotFound,
}

/// Searches one scope for the first segment of `reference`
///
/// A name that is both defined locally and imported is ambiguous.
/// Imports are matched on their whole name, the remaining segments
/// address definitions nested in the imported one.
pub fn lookup_in_scope(scope: &Scope, reference: &Reference) -> Result<Lookup, CompilerError> {
	let first = reference.first().to_string();
	let local = scope.local_defs.get(&first);
	let import_lead = scope.imports.keys().any(|key| key.first() == reference.first());

	if local.is_some() && import_lead {
		return Err(CompilerError::new(
			ErrorKind::AmbiguousReference,
			format!("Name '{}' is ambiguous in '{}'", first, scope.address),
		));
	}

	if let Some(address) = local {
		return Ok(Lookup::LocalDefinition(address.add_entries(reference.tail())?));
	}

	let import = scope
		.imports
		.iter()
		.filter(|(key, _)| reference.starts_with(key))
		.max_by_key(|(key, _)| key.len());
	match import {
		Some((key, import)) => {
			let rest = reference.strip_prefix(key).unwrap_or_default();
			Ok(Lookup::Import(import.obj_addr.add_entries(rest)?))
		},
		None => Ok(Lookup::NotFound),
	}
}

/// Searches the scopes innermost first, then the built-ins
pub fn lookup_in_closure(closure: Option<&Closure>, reference: &Reference) -> Result<Address, CompilerError> {
	for scope in closure.into_iter().flat_map(Closure::scopes) {
		match lookup_in_scope(scope, reference)? {
			Lookup::LocalDefinition(address) | Lookup::Import(address) => return Ok(address),
			Lookup::NotFound => {},
		}
	}

	Category::from_reference(reference)
		.map(|category| category.address())
		.ok_or_else(|| CompilerError::new(ErrorKind::UnknownReference, format!("Couldn't find ref {}", reference)))
}

impl ObjectDef {
	/// Resolves a name used by one of this definition's statements
	pub fn lookup(&self, reference: &Reference) -> Result<Address, CompilerError> {
		lookup_in_closure(Some(&self.closure), reference)
	}

	/// Resolves the super reference, if any
	///
	/// The definition's own names are not in view, so `A from B`
	/// finds the `B` next to `A` rather than one nested inside it.
	pub fn lookup_super(&self) -> Result<Option<Address>, CompilerError> {
		let Some(super_ref) = &self.super_ref else {
			return Ok(None);
		};
		let located = |err: CompilerError| match &self.super_location {
			Some(location) => err.with_location(location.clone()),
			None => err,
		};
		lookup_in_closure(self.closure.enclosing(), super_ref)
			.map(Some)
			.map_err(located)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use super::super::object_def::Import;
	use crate::core::{Location, SourceSpan};
	use indexmap::IndexMap;
	use std::rc::Rc;

	fn reference(text: &str) -> Reference {
		text.parse().unwrap()
	}

	fn address(text: &str) -> Address {
		text.parse().unwrap()
	}

	fn scope(file: &str, locals: &[&str], imports: &[(&str, &str)]) -> Scope {
		Scope {
			address: address(file),
			local_defs: locals
				.iter()
				.map(|name| (String::from(*name), address(file).add_entry(name).unwrap()))
				.collect(),
			imports: imports
				.iter()
				.map(|(name, target)| {
					(
						reference(name),
						Import {
							obj_addr: address(target),
							location: Location::new(file, SourceSpan::default()),
						},
					)
				})
				.collect::<IndexMap<_, _>>(),
		}
	}

	#[test]
	fn local_definitions_extend_with_remaining_segments() {
		let scope = scope("a.ato", &["Foo"], &[]);
		assert_eq!(
			lookup_in_scope(&scope, &reference("Foo.Inner")).unwrap(),
			Lookup::LocalDefinition(address("a.ato:Foo.Inner"))
		);
		assert_eq!(lookup_in_scope(&scope, &reference("Bar")).unwrap(), Lookup::NotFound);
	}

	#[test]
	fn imports_resolve_to_their_target() {
		let scope = scope("a.ato", &[], &[("Foo", "b.ato:Foo")]);
		assert_eq!(
			lookup_in_scope(&scope, &reference("Foo")).unwrap(),
			Lookup::Import(address("b.ato:Foo"))
		);
	}

	#[test]
	fn ambiguity_only_affects_the_shared_name() {
		let scope = scope("a.ato", &["Foo", "Baz"], &[("Foo", "b.ato:Foo")]);
		let err = lookup_in_scope(&scope, &reference("Foo")).unwrap_err();
		assert_eq!(err.kind, ErrorKind::AmbiguousReference);
		assert!(matches!(
			lookup_in_scope(&scope, &reference("Baz")).unwrap(),
			Lookup::LocalDefinition(_)
		));
	}

	#[test]
	fn inner_scopes_shadow_outer_ones() {
		let outer = Rc::new(Closure::new(scope("a.ato", &["R"], &[]), None));
		let inner = Closure::new(scope("a.ato:Top", &["R"], &[]), Some(outer.clone()));
		assert_eq!(lookup_in_closure(Some(&inner), &reference("R")).unwrap(), address("a.ato:Top.R"));
		assert_eq!(lookup_in_closure(Some(&outer), &reference("R")).unwrap(), address("a.ato:R"));
	}

	#[test]
	fn builtins_are_the_fallback() {
		assert_eq!(
			lookup_in_closure(None, &reference("COMPONENT")).unwrap(),
			Category::Component.address()
		);
		let err = lookup_in_closure(None, &reference("Nope")).unwrap_err();
		assert_eq!(err.kind, ErrorKind::UnknownReference);
	}
}
