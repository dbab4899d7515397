//! Addresses identify files, definitions and instances.
//!
//! They take the form `path/to/file.ato:Entry.Path::instance.path`:
//! the file, then the dotted definition (entry) path, then the dotted
//! path of an instance below that definition.

use itertools::Itertools;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AddressError {
	#[error("Cannot add entry `{entry}` to instance address `{address}`")]
	EntryAfterInstance { address: String, entry: String },

	#[error("Malformed address `{0}`")]
	Malformed(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, SerializeDisplay, DeserializeFromStr)]
pub struct Address {
	file: String,
	entry: Vec<String>,
	instance: Vec<String>,
}

impl Address {
	/// Address of a whole file
	pub fn from_file(file: impl AsRef<Path>) -> Self {
		Self {
			file: file.as_ref().to_string_lossy().into_owned(),
			entry: Vec::new(),
			instance: Vec::new(),
		}
	}

	pub fn from_parts<E, I>(file: impl AsRef<Path>, entry: E, instance: I) -> Self
	where
		E: IntoIterator,
		E::Item: ToString,
		I: IntoIterator,
		I::Item: ToString,
	{
		Self {
			file: file.as_ref().to_string_lossy().into_owned(),
			entry: entry.into_iter().map(|e| e.to_string()).collect(),
			instance: instance.into_iter().map(|i| i.to_string()).collect(),
		}
	}

	/// Appends one segment to the entry section
	pub fn add_entry(&self, entry: impl ToString) -> Result<Address, AddressError> {
		let entry = entry.to_string();
		if !self.instance.is_empty() {
			return Err(AddressError::EntryAfterInstance {
				address: self.to_string(),
				entry,
			});
		}
		let mut address = self.clone();
		address.entry.push(entry);
		Ok(address)
	}

	pub fn add_entries<I>(&self, entries: I) -> Result<Address, AddressError>
	where
		I: IntoIterator,
		I::Item: ToString,
	{
		entries.into_iter().try_fold(self.clone(), |address, entry| address.add_entry(entry))
	}

	/// Appends one segment to the instance section
	pub fn add_instance(&self, instance: impl ToString) -> Address {
		let mut address = self.clone();
		address.instance.push(instance.to_string());
		address
	}

	pub fn add_instances<I>(&self, instances: I) -> Address
	where
		I: IntoIterator,
		I::Item: ToString,
	{
		let mut address = self.clone();
		address.instance.extend(instances.into_iter().map(|i| i.to_string()));
		address
	}

	/// Strips the last segment, dropping into the entry section
	/// once the instance section is exhausted.
	/// A bare file address has no parent.
	pub fn parent(&self) -> Option<Address> {
		let mut address = self.clone();
		if address.instance.pop().is_some() {
			return Some(address);
		}
		address.entry.pop()?;
		Some(address)
	}

	/// Parent within the instance tree; `None` unless this is an instance address
	pub fn instance_parent(&self) -> Option<Address> {
		if self.instance.is_empty() {
			return None;
		}
		self.parent()
	}

	pub fn file(&self) -> &str {
		&self.file
	}

	pub fn file_path(&self) -> &Path {
		Path::new(&self.file)
	}

	pub fn entry(&self) -> &[String] {
		&self.entry
	}

	pub fn instance(&self) -> Option<&[String]> {
		if self.instance.is_empty() {
			None
		} else {
			Some(&self.instance)
		}
	}

	pub fn is_instance(&self) -> bool {
		!self.instance.is_empty()
	}

	/// The address with its instance section removed
	pub fn entry_address(&self) -> Address {
		Self {
			file: self.file.clone(),
			entry: self.entry.clone(),
			instance: Vec::new(),
		}
	}

	/// The bare file address
	pub fn file_address(&self) -> Address {
		Address::from_file(&self.file)
	}

	/// Last name of the address, the file itself if there's nothing else
	pub fn name(&self) -> &str {
		self.instance
			.last()
			.or_else(|| self.entry.last())
			.map(String::as_str)
			.unwrap_or(&self.file)
	}

	/// File name followed by the rest of the address, without directories
	pub fn relative(&self) -> String {
		let full = self.to_string();
		let file_name = self
			.file_path()
			.file_name()
			.map(|name| name.to_string_lossy().into_owned())
			.unwrap_or_else(|| self.file.clone());
		format!("{}{}", file_name, &full[self.file.len()..])
	}
}

impl fmt::Display for Address {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{}", self.file)?;
		if !self.entry.is_empty() {
			write!(f, ":{}", self.entry.iter().join("."))?;
		}
		if !self.instance.is_empty() {
			write!(f, "::{}", self.instance.iter().join("."))?;
		}
		Ok(())
	}
}

fn split_path(section: &str) -> Vec<String> {
	section
		.split('.')
		.filter(|part| !part.is_empty())
		.map(String::from)
		.collect()
}

impl FromStr for Address {
	type Err = AddressError;

	fn from_str(text: &str) -> Result<Self, Self::Err> {
		let (head, instance) = match text.find("::") {
			Some(idx) => (&text[..idx], split_path(&text[idx + 2..])),
			None => (text, Vec::new()),
		};

		// a colon followed by path separators belongs to the file (eg. a drive letter)
		let (file, entry) = match head.rfind(':') {
			Some(idx) if !head[idx + 1..].contains(['/', '\\']) => (&head[..idx], split_path(&head[idx + 1..])),
			_ => (head, Vec::new()),
		};

		if file.is_empty() {
			return Err(AddressError::Malformed(String::from(text)));
		}

		Ok(Self {
			file: String::from(file),
			entry,
			instance,
		})
	}
}
