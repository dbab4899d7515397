use super::builtins::Category;
use super::instance::{Instance, Link, OverrideOrigin};
use super::layer_builder::{LayerBuilder, ObjectLayer};
use super::replacements::{PendingReplacement, ReplacementStack};
use super::statement_results::StatementResults;
use crate::core::{Address, CompilerError, ErrorGroup, ErrorKind, Location, Reference, Value};
use crate::parser::ast::{
	Assignable, AssignmentStatement, Connectable, ConnectStatement, PinDefinition, PinName, SignalDefinition,
	Statement,
};
use indexmap::IndexMap;
use log::{debug, info};
use std::collections::HashMap;
use std::ops::Deref;
use std::rc::Rc;

/// Connection waiting for the children it names to exist
struct LinkDef {
	source: Reference,
	target: Reference,
	location: Location,
}

/// What visiting one statement yields
enum InstanceItem {
	Child(String, Instance),
	Link(LinkDef),
	Override {
		key: Reference,
		value: Value,
		origin: OverrideOrigin,
	},
}

/// Any instance of a cached tree, addressed by its path below the root
#[derive(Clone, Debug)]
pub struct InstanceHandle {
	root: Rc<Instance>,
	path: Vec<String>,
}

impl InstanceHandle {
	pub fn root(&self) -> &Rc<Instance> {
		&self.root
	}
}

impl Deref for InstanceHandle {
	type Target = Instance;

	fn deref(&self) -> &Instance {
		self.root
			.descend(&self.path)
			.expect("handle paths are checked on creation")
	}
}

/// Builds the instance tree rooted at a definition
pub struct InstanceBuilder {
	layers: LayerBuilder,
	cache: HashMap<Address, Rc<Instance>>,
	replacements: ReplacementStack,
	/// Layers of the instantiations currently on the call stack
	instantiating: Vec<Address>,
}

impl InstanceBuilder {
	pub fn new(layers: LayerBuilder) -> Self {
		Self {
			layers,
			cache: HashMap::new(),
			replacements: ReplacementStack::new(),
			instantiating: Vec::new(),
		}
	}

	pub fn layers(&self) -> &LayerBuilder {
		&self.layers
	}

	pub fn layers_mut(&mut self) -> &mut LayerBuilder {
		&mut self.layers
	}

	/// Returns the tree instantiated from the definition at `address`
	pub fn get_instance_tree(&mut self, address: &Address) -> Result<Rc<Instance>, ErrorGroup> {
		if let Some(instance) = self.cache.get(address) {
			return Ok(instance.clone());
		}

		info!("Instantiating {}", address);
		let layer = self.layers.get_layer(address)?;
		let location = layer.definition.location.clone();
		let instance = Rc::new(self.make_instance(address.clone(), layer, location)?);
		self.cache.insert(address.clone(), instance.clone());
		Ok(instance)
	}

	/// Looks up any instance, building the tree it belongs to if needed
	pub fn instance(&mut self, address: &Address) -> Result<InstanceHandle, ErrorGroup> {
		let root = self.get_instance_tree(&address.entry_address())?;
		let path = address.instance().map(<[String]>::to_vec).unwrap_or_default();
		if root.descend(&path).is_none() {
			return Err(CompilerError::new(
				ErrorKind::StructuralError,
				format!("No instance at {}", address),
			)
			.into());
		}
		Ok(InstanceHandle { root, path })
	}

	fn make_instance(
		&mut self,
		address: Address,
		layer: Rc<ObjectLayer>,
		location: Option<Location>,
	) -> Result<Instance, ErrorGroup> {
		debug!("Making {} from {}", address, layer.address());
		if self.instantiating.contains(layer.address()) {
			let err = CompilerError::new(
				ErrorKind::InstantiationCycle,
				format!("{} contains an instance of itself at {}", layer.address(), address),
			);
			return Err(match location {
				Some(location) => err.with_location(location),
				None => err,
			}
			.into());
		}
		let supers = layer.supers();

		self.instantiating.push(layer.address().clone());
		self.replacements.push_frame();
		for super_layer in &supers {
			for (target, replacement) in &super_layer.definition.replacements {
				self.replacements.register(
					address.add_instances(target.names()),
					PendingReplacement {
						replacement: replacement.clone(),
						declared_in: super_layer.definition.clone(),
					},
				);
			}
		}
		let visited = self.visit_layers(&address, &supers);
		self.replacements.pop_frame();
		self.instantiating.pop();

		let mut children = IndexMap::new();
		let mut link_defs = Vec::new();
		let mut overrides = Vec::new();
		for item in visited? {
			match item {
				InstanceItem::Child(name, child) => {
					// Derived blocks replace same-named children of their bases
					children.insert(name, child);
				},
				InstanceItem::Link(link_def) => link_defs.push(link_def),
				InstanceItem::Override { key, value, origin } => overrides.push((key, value, origin)),
			}
		}

		let mut instance = Instance {
			address,
			supers,
			children,
			links: Vec::new(),
			override_data: IndexMap::new(),
			override_locations: IndexMap::new(),
			location,
		};

		let mut errors = StatementResults::<()>::new();
		for link_def in link_defs {
			errors.push(resolve_link(&instance, link_def).map(|link| instance.links.push(link)));
		}
		for (key, value, origin) in overrides {
			errors.push(apply_override(&mut instance, &key, value, origin));
		}
		errors.into_result()?;

		Ok(instance)
	}

	/// Visits the statements of every layer, base-most first
	///
	/// Each block's statement errors are raised together once the
	/// whole block has been visited.
	fn visit_layers(&mut self, address: &Address, supers: &[Rc<ObjectLayer>]) -> Result<Vec<InstanceItem>, ErrorGroup> {
		let mut items = Vec::new();
		for layer in supers.iter().rev() {
			let mut results = StatementResults::new();
			for statement in layer.definition.statements() {
				results.extend(self.visit_statement(address, layer, statement));
			}
			items.extend(results.into_result()?);
		}
		Ok(items)
	}

	fn visit_statement(
		&mut self,
		address: &Address,
		layer: &Rc<ObjectLayer>,
		statement: &Statement,
	) -> Result<Vec<InstanceItem>, ErrorGroup> {
		match statement {
			Statement::Assignment(assignment) => self.visit_assignment(address, layer, assignment),
			Statement::PinDefinition(pin) => Ok(vec![self.make_pin(address, layer, pin)?]),
			Statement::SignalDefinition(signal) => Ok(vec![self.make_signal(address, layer, signal)]),
			Statement::Connect(connect) => self.visit_connect(address, layer, connect),
			Statement::BlockDefinition(_) | Statement::Import(_) | Statement::Retype(_) => Ok(Vec::new()),
		}
	}

	fn visit_assignment(
		&mut self,
		address: &Address,
		layer: &Rc<ObjectLayer>,
		assignment: &AssignmentStatement,
	) -> Result<Vec<InstanceItem>, ErrorGroup> {
		let definition = &layer.definition;
		let target = &assignment.target.reference;
		let location = definition.locate(assignment.location);

		if target.len() == 1 {
			// Scalars already live in the layer
			let Assignable::New { class, .. } = &assignment.value else {
				return Ok(Vec::new());
			};

			let name = target.first().to_string();
			let child_address = address.add_instance(&name);
			let class_address = match self.replacements.take(&child_address) {
				Some(pending) => {
					debug!("Retyping {} to {}", child_address, pending.replacement.replacement);
					pending
						.declared_in
						.lookup(&pending.replacement.replacement)
						.map_err(|err| err.with_location(pending.replacement.location.clone()))?
				},
				None => definition
					.lookup(&class.reference)
					.map_err(|err| err.with_location(definition.locate(class.location)))?,
			};

			let child_layer = self.layers.get_layer(&class_address).map_err(|group| locate_group(group, &location))?;
			let child = self.make_instance(child_address, child_layer, Some(location))?;
			return Ok(vec![InstanceItem::Child(name, child)]);
		}

		match &assignment.value {
			Assignable::Literal { value, .. } => Ok(vec![InstanceItem::Override {
				key: target.clone(),
				value: value.clone(),
				origin: OverrideOrigin {
					layer: layer.address().clone(),
					location,
				},
			}]),
			Assignable::New { .. } => Err(CompilerError::located(
				ErrorKind::MalformedStatement,
				format!("Cannot assign a new object to the multi-part reference {}", target),
				location,
			)
			.into()),
			Assignable::Reference(reference) => Err(CompilerError::located(
				ErrorKind::TypeError,
				format!("Cannot assign the reference {} to {}", reference.reference, target),
				location,
			)
			.into()),
		}
	}

	fn make_pin(&self, address: &Address, layer: &ObjectLayer, pin: &PinDefinition) -> Result<InstanceItem, CompilerError> {
		let location = layer.definition.locate(pin.location);
		let name = match &pin.name {
			PinName::Name(name) => name.clone(),
			PinName::Number(text) => text
				.parse::<u64>()
				.map(|number| number.to_string())
				.map_err(|_| {
					CompilerError::located(
						ErrorKind::TypeError,
						format!("Expected an integer, but got {}", text),
						location.clone(),
					)
				})?,
		};
		Ok(self.make_leaf(address, name, Category::Pin, location))
	}

	fn make_signal(&self, address: &Address, layer: &ObjectLayer, signal: &SignalDefinition) -> InstanceItem {
		let location = layer.definition.locate(signal.location);
		self.make_leaf(address, signal.name.clone(), Category::Signal, location)
	}

	fn make_leaf(&self, address: &Address, name: String, category: Category, location: Location) -> InstanceItem {
		let leaf = Instance {
			address: address.add_instance(&name),
			supers: vec![self.layers.builtin(category)],
			children: IndexMap::new(),
			links: Vec::new(),
			override_data: IndexMap::new(),
			override_locations: IndexMap::new(),
			location: Some(location),
		};
		InstanceItem::Child(name, leaf)
	}

	fn visit_connect(
		&self,
		address: &Address,
		layer: &Rc<ObjectLayer>,
		connect: &ConnectStatement,
	) -> Result<Vec<InstanceItem>, ErrorGroup> {
		let mut items = Vec::new();
		let mut endpoint = |connectable: &Connectable| -> Result<Reference, CompilerError> {
			let item = match connectable {
				Connectable::Reference(reference) => return Ok(reference.reference.clone()),
				Connectable::Pin(pin) => self.make_pin(address, layer, pin)?,
				Connectable::Signal(signal) => self.make_signal(address, layer, signal),
			};
			let InstanceItem::Child(name, _) = &item else {
				unreachable!("declarations yield children");
			};
			let reference = Reference::from_one(name.as_str());
			items.push(item);
			Ok(reference)
		};

		let (source, target) = match (endpoint(&connect.source), endpoint(&connect.target)) {
			(Ok(source), Ok(target)) => (source, target),
			(source, target) => return Err(ErrorGroup::new(source.err().into_iter().chain(target.err()).collect())),
		};
		items.push(InstanceItem::Link(LinkDef {
			source,
			target,
			location: layer.definition.locate(connect.location),
		}));
		Ok(items)
	}
}

/// Gives errors raised while resolving a dependency the location that needed it
fn locate_group(group: ErrorGroup, location: &Location) -> ErrorGroup {
	ErrorGroup::new(group.into_iter().map(|err| err.with_location(location.clone())).collect())
}

/// Resolves both endpoints, reporting every one that is missing
fn resolve_link(instance: &Instance, link_def: LinkDef) -> Result<Link, ErrorGroup> {
	let find = |reference: &Reference| {
		let path: Vec<String> = reference.names().collect();
		instance.descend(&path).map(|found| found.address().clone()).ok_or_else(|| {
			CompilerError::located(
				ErrorKind::StructuralError,
				format!("Unknown reference: {}", reference),
				link_def.location.clone(),
			)
		})
	};
	match (find(&link_def.source), find(&link_def.target)) {
		(Ok(source), Ok(target)) => Ok(Link {
			parent: instance.address().clone(),
			source,
			target,
			location: Some(link_def.location.clone()),
		}),
		(source, target) => Err(ErrorGroup::new(source.err().into_iter().chain(target.err()).collect())),
	}
}

/// Writes an override into the descendant that owns the attribute
fn apply_override(instance: &mut Instance, key: &Reference, value: Value, origin: OverrideOrigin) -> Result<(), CompilerError> {
	let mut path: Vec<String> = key.names().collect();
	let Some(attribute) = path.pop() else {
		return Ok(());
	};
	let owner = instance.descend_mut(&path).ok_or_else(|| {
		CompilerError::located(
			ErrorKind::StructuralError,
			format!("Unknown reference: {}", key),
			origin.location.clone(),
		)
	})?;
	debug!("Override {}.{} = {}", owner.address(), attribute, value);
	owner.override_data.insert(attribute.clone(), value);
	owner.override_locations.insert(attribute, origin);
	Ok(())
}
