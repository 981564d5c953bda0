// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt,
	sync::atomic::{AtomicU64, Ordering},
};

static NEXT_PROCESS_ID: AtomicU64 = AtomicU64::new(1);

/// Identifier of an isolated execution unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProcessId(pub u64);

impl ProcessId {
	/// Allocate the next process id.
	pub fn next() -> Self {
		Self(NEXT_PROCESS_ID.fetch_add(1, Ordering::Relaxed))
	}
}

impl fmt::Display for ProcessId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "process-{}", self.0)
	}
}

/// Opaque index of a port in the port table.
///
/// The managed heap never sees a native address; a handle carries only this
/// index, encoded as an integer value. Zero encodes "no port", so the index
/// is shifted by one on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortId(pub usize);

impl PortId {
	/// Integer encoding stored in a managed handle.
	pub fn encode(self) -> i64 {
		self.0 as i64 + 1
	}

	/// Decode a handle integer. Zero (and anything negative) means
	/// "no port".
	pub fn decode(raw: i64) -> Option<Self> {
		if raw <= 0 {
			None
		} else {
			Some(Self((raw - 1) as usize))
		}
	}
}

impl fmt::Display for PortId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "port-{}", self.0)
	}
}

/// Stable logical identifier of a channel object on the managed heap.
///
/// A port never holds a raw heap pointer; the collector resolves this id
/// through its own relocation table during the registry sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelId(pub u64);

impl ChannelId {
	/// Sentinel written into a port slot as it is swept away, to surface
	/// stale accesses.
	pub const POISON: ChannelId = ChannelId(0xcafe_cafe);
}

impl fmt::Display for ChannelId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "channel-{}", self.0)
	}
}
