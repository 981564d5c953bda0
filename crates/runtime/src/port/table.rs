// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::{Arc, Weak};

use isle_core::{ChannelId, PortId};
use parking_lot::Mutex;
use slab::Slab;

use crate::{
	heap::{CollectorFlavor, CollectorHooks, HeapRegion},
	port::Port,
	process::Process,
};

/// The side table of native port entries — the port registry.
///
/// The managed heap stores only slot indices ([`PortId`]); the collector's
/// finalization pass and the registry sweep both reach ports exclusively
/// through this table. A slot is freed exactly once: either synchronously,
/// when a refcount hits zero with the owner already gone, or by the sweep,
/// so an owner iterating its port set never observes a freed slot.
pub struct PortTable {
	slots: Mutex<Slab<Port>>,
}

impl PortTable {
	pub fn new() -> Self {
		Self {
			slots: Mutex::new(Slab::new()),
		}
	}

	/// Create a port owned by `process`, bound to `channel`, with an
	/// initial refcount of one. Invoked on the thread that owns the
	/// process.
	pub fn create(&self, process: &Arc<Process>, channel: Option<ChannelId>) -> PortId {
		let id = {
			let mut slots = self.slots.lock();
			let entry = slots.vacant_entry();
			let id = PortId(entry.key());
			entry.insert(Port::new(process, channel, id));
			id
		};
		process.add_port(id);
		tracing::trace!("created {} for {}", id, process.id());
		id
	}

	/// Resolve an index to its port. Absent for freed or never-allocated
	/// slots.
	pub fn get(&self, id: PortId) -> Option<Port> {
		self.slots.lock().get(id.0).cloned()
	}

	pub fn contains(&self, id: PortId) -> bool {
		self.slots.lock().contains(id.0)
	}

	pub fn len(&self) -> usize {
		self.slots.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.slots.lock().is_empty()
	}

	/// Locked decrement. On reaching zero the slot is freed immediately
	/// iff the owning process is already absent; otherwise the slot is
	/// left for the registry sweep, so the owner can still walk its set
	/// without racing a free.
	pub fn decrement_ref(&self, id: PortId) {
		let Some(port) = self.get(id) else {
			debug_assert!(false, "decrementing unknown port {}", id);
			return;
		};

		let mut inner = port.inner.lock();
		debug_assert!(inner.ref_count > 0, "double free of {}", id);
		if inner.ref_count == 0 {
			return;
		}
		inner.ref_count -= 1;

		let owner_absent = inner.owner.as_ref().map_or(true, |weak| Weak::upgrade(weak).is_none());
		if inner.ref_count == 0 && owner_absent {
			inner.channel = Some(ChannelId::POISON);
			drop(inner);
			self.remove(&port);
		}
	}

	/// The bridge between managed-handle lifetime and native reference
	/// counting: the heap's finalization pass calls this with the index
	/// it stored when the wrapping handle became unreachable.
	pub fn on_handle_unreachable(&self, id: PortId) {
		self.decrement_ref(id);
	}

	/// Called exactly once as the owning process tears down. Frees the
	/// slot when nobody else holds a reference; otherwise the port
	/// survives as an orphan and subsequent sends to it fail.
	pub fn owner_terminating(&self, id: PortId) {
		let Some(port) = self.get(id) else {
			return;
		};

		let mut inner = port.inner.lock();
		if inner.ref_count == 0 {
			inner.channel = Some(ChannelId::POISON);
			drop(inner);
			self.remove(&port);
		} else {
			inner.owner = None;
		}
	}

	/// Registry sweep: reconcile `process`'s port set with heap state
	/// after a collection cycle over `region`.
	///
	/// Zero-refcount entries are poisoned and their slots freed exactly
	/// once; survivors keep their relative order and have their channel
	/// revalidated — cleared when the collector did not reach it
	/// (mark-sweep), or rewritten to the forwarding address
	/// (relocating). Runs under the collector's pause discipline, which
	/// serializes it against mutators.
	pub fn cleanup_ports(&self, process: &Process, region: &dyn HeapRegion, collector: &dyn CollectorHooks) {
		let mut slots = self.slots.lock();
		process.with_ports(|ports| {
			ports.retain(|id| {
				let Some(port) = slots.get(id.0).cloned() else {
					return false;
				};

				let mut inner = port.inner.lock();
				if inner.ref_count == 0 {
					inner.channel = Some(ChannelId::POISON);
					slots.remove(id.0);
					return false;
				}

				if let Some(channel) = inner.channel {
					if region.contains(channel) {
						match collector.flavor() {
							CollectorFlavor::MarkSweep => {
								if !collector.is_reached(channel) {
									inner.channel = None;
								}
							}
							CollectorFlavor::Relocating => {
								inner.channel = collector.forwarding_address(channel);
							}
						}
					}
				}
				true
			});
		});
	}

	/// Free a slot, verifying it still holds the given port. Slot reuse
	/// means a stale index could otherwise free a stranger.
	fn remove(&self, port: &Port) {
		let mut slots = self.slots.lock();
		let matches = slots.get(port.id().0).is_some_and(|existing| Arc::ptr_eq(&existing.inner, &port.inner));
		debug_assert!(matches, "slot {} no longer holds the port being freed", port.id());
		if matches {
			slots.remove(port.id().0);
			tracing::trace!("freed {}", port.id());
		}
	}
}

impl Default for PortTable {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_create_resolves() {
		let table = PortTable::new();
		let process = Process::new();
		let id = table.create(&process, Some(ChannelId(9)));

		let port = table.get(id).unwrap();
		assert_eq!(port.ref_count(), 1);
		assert_eq!(port.channel(), Some(ChannelId(9)));
		assert_eq!(process.ports(), vec![id]);
	}

	#[test]
	fn test_decrement_with_live_owner_defers_deletion() {
		let table = PortTable::new();
		let process = Process::new();
		let id = table.create(&process, None);

		table.decrement_ref(id);

		// The slot survives until the sweep runs.
		assert!(table.contains(id));
		assert_eq!(table.get(id).unwrap().ref_count(), 0);
	}

	#[test]
	fn test_decrement_with_absent_owner_frees_slot() {
		let table = PortTable::new();
		let process = Process::new();
		let id = table.create(&process, None);

		process.terminate(&table);
		assert!(table.contains(id), "refcount is still one, the port must survive as an orphan");

		table.decrement_ref(id);
		assert!(!table.contains(id));
	}

	#[test]
	fn test_owner_terminating_orphans_referenced_port() {
		let table = PortTable::new();
		let process = Process::new();
		let id = table.create(&process, None);

		table.owner_terminating(id);

		let port = table.get(id).unwrap();
		assert!(port.owner().is_none());
		assert_eq!(port.ref_count(), 1);
	}
}
