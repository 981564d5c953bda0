// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{any::Any, fmt, sync::Arc};

use crate::ChannelId;

/// Minimal stand-in for the managed value model at the native boundary.
///
/// The object model itself lives outside this core; sends only need to
/// distinguish values that are already in transferable (immutable) form
/// from ones that still reference mutable heap state. Producing the
/// immutable form is the sender's collaborator's job — this core merely
/// checks it.
#[derive(Clone)]
pub enum Value {
	Null,
	Integer(i64),
	/// An immutable object graph, shareable across processes.
	Immutable(Arc<dyn Any + Send + Sync>),
	/// A mutable heap object, addressed by its stable channel id.
	/// Not transferable.
	Heap(ChannelId),
}

impl Value {
	/// Whether this value may cross a process boundary as-is.
	pub fn is_transferable(&self) -> bool {
		!matches!(self, Value::Heap(_))
	}

	pub fn as_integer(&self) -> Option<i64> {
		match self {
			Value::Integer(raw) => Some(*raw),
			_ => None,
		}
	}
}

impl PartialEq for Value {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Value::Null, Value::Null) => true,
			(Value::Integer(a), Value::Integer(b)) => a == b,
			(Value::Immutable(a), Value::Immutable(b)) => Arc::ptr_eq(a, b),
			(Value::Heap(a), Value::Heap(b)) => a == b,
			_ => false,
		}
	}
}

impl fmt::Debug for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Value::Null => write!(f, "Null"),
			Value::Integer(raw) => write!(f, "Integer({})", raw),
			Value::Immutable(_) => write!(f, "Immutable(..)"),
			Value::Heap(id) => write!(f, "Heap({})", id),
		}
	}
}
