use super::object_def::{ObjectDef, Replacement};
use crate::core::Address;
use log::debug;
use std::collections::HashMap;
use std::rc::Rc;

/// A retype waiting for the instantiation it applies to
#[derive(Clone, Debug)]
pub struct PendingReplacement {
	pub replacement: Replacement,

	/// Definition the retype was written in, its names resolve the new type
	pub declared_in: Rc<ObjectDef>,
}

/// Retypes pending during a recursive instantiation
///
/// Each instantiation pushes a frame, registers the retypes of its
/// super chain and pops the frame when it is done, successful or not.
/// A retype registered by an outer frame takes precedence over one
/// for the same instance registered further down.
#[derive(Debug, Default)]
pub struct ReplacementStack {
	pending: HashMap<Address, PendingReplacement>,
	frames: Vec<Vec<Address>>,
}

impl ReplacementStack {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push_frame(&mut self) {
		self.frames.push(Vec::new());
	}

	/// Drops whatever the current frame registered and did not consume
	pub fn pop_frame(&mut self) {
		for address in self.frames.pop().unwrap_or_default() {
			if self.pending.remove(&address).is_some() {
				debug!("Retype of {} was never used", address);
			}
		}
	}

	/// Registers a retype for the instance at `target` unless one is already pending
	pub fn register(&mut self, target: Address, pending: PendingReplacement) -> bool {
		if self.pending.contains_key(&target) {
			return false;
		}
		if let Some(frame) = self.frames.last_mut() {
			frame.push(target.clone());
		}
		self.pending.insert(target, pending);
		true
	}

	/// Consumes the retype pending for `target`
	pub fn take(&mut self, target: &Address) -> Option<PendingReplacement> {
		self.pending.remove(target)
	}

	pub fn is_pending(&self, target: &Address) -> bool {
		self.pending.contains_key(target)
	}

	pub fn depth(&self) -> usize {
		self.frames.len()
	}
}
