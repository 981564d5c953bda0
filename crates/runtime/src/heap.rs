// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Callback contracts consumed from the heap and its collector.
//!
//! The collector's marking/copying algorithms are external; the registry
//! sweep only needs a reachability query or a forwarding-address lookup,
//! selected by collector flavor, plus an allocation seam for the managed
//! integer cells that encode port handles.

use isle_core::{ChannelId, NativeError, NativeResult, PortId, Value};

/// Which of the two channel-revalidation rules the sweep applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectorFlavor {
	/// Non-relocating: unreached channels are cleared.
	MarkSweep,
	/// Relocating: channels are rewritten to their forwarding address,
	/// which is absent for unreached objects.
	Relocating,
}

/// Reachability/relocation queries answered by the collector at the end of
/// a cycle. Exactly one of the two lookups is consulted, per flavor.
pub trait CollectorHooks: Send + Sync {
	fn flavor(&self) -> CollectorFlavor;

	/// Mark-sweep flavor: was the channel reached during the cycle?
	fn is_reached(&self, channel: ChannelId) -> bool;

	/// Relocating flavor: the channel's post-relocation id, absent when
	/// the object was not reached.
	fn forwarding_address(&self, channel: ChannelId) -> Option<ChannelId>;
}

/// The heap region a collection cycle covered. Channels outside it are
/// left untouched by the sweep.
pub trait HeapRegion {
	fn contains(&self, channel: ChannelId) -> bool;
}

/// Proof that a managed integer cell exists for a handle encoding.
///
/// The cell is reserved *before* the native port is created or its
/// refcount touched, so an allocation retry never leaks a port.
pub struct HandleCell(());

impl HandleCell {
	pub fn new() -> Self {
		Self(())
	}

	/// Write the port index into the reserved cell.
	pub fn fill(self, id: PortId) -> Value {
		Value::Integer(id.encode())
	}
}

impl Default for HandleCell {
	fn default() -> Self {
		Self::new()
	}
}

/// Allocation seam for handle encodings on the managed heap.
pub trait HandleAllocator: Send + Sync {
	/// Reserve a cell for an integer-encoded handle. Fails with
	/// [`NativeError::RetryAfterGc`] when a collection must run first;
	/// the caller re-invokes the whole native afterwards.
	fn reserve_handle(&self) -> NativeResult<HandleCell>;
}

/// Allocator for hosts without a cooperating collector: reservation always
/// succeeds.
pub struct ImmediateAllocator;

impl HandleAllocator for ImmediateAllocator {
	fn reserve_handle(&self) -> NativeResult<HandleCell> {
		Ok(HandleCell::new())
	}
}

/// Test/host helper: fails a fixed number of reservations with
/// `RetryAfterGc` before succeeding, mimicking an allocation that needs a
/// collection cycle.
pub struct FlakyAllocator {
	remaining_failures: std::sync::atomic::AtomicUsize,
}

impl FlakyAllocator {
	pub fn failing(times: usize) -> Self {
		Self {
			remaining_failures: std::sync::atomic::AtomicUsize::new(times),
		}
	}
}

impl HandleAllocator for FlakyAllocator {
	fn reserve_handle(&self) -> NativeResult<HandleCell> {
		use std::sync::atomic::Ordering;

		let outcome = self.remaining_failures.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| {
			left.checked_sub(1)
		});
		match outcome {
			Ok(_) => Err(NativeError::RetryAfterGc),
			Err(_) => Ok(HandleCell::new()),
		}
	}
}
