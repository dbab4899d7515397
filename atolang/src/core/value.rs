use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw literal assigned to an attribute
///
/// Units and expressions are not interpreted, strings are kept verbatim.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
	Bool(bool),
	Int(i64),
	Float(f64),
	String(String),
}

impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Value::Bool(v) => write!(f, "{}", v),
			Value::Int(v) => write!(f, "{}", v),
			Value::Float(v) => write!(f, "{}", v),
			Value::String(v) => write!(f, "{:?}", v),
		}
	}
}

impl From<&str> for Value {
	fn from(s: &str) -> Self {
		Value::String(String::from(s))
	}
}

impl From<String> for Value {
	fn from(s: String) -> Self {
		Value::String(s)
	}
}

impl From<i64> for Value {
	fn from(v: i64) -> Self {
		Value::Int(v)
	}
}

impl From<f64> for Value {
	fn from(v: f64) -> Self {
		Value::Float(v)
	}
}

impl From<bool> for Value {
	fn from(v: bool) -> Self {
		Value::Bool(v)
	}
}
