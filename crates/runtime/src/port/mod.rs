// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Ports: reference-counted handles binding a channel object to a
//! process's mailbox.
//!
//! One rule holds across this module: **no managed-heap allocation happens
//! while a port's lock is held**. The lock may be the last thing standing
//! between a dying process and a live one; an allocation inside the
//! critical section could trigger a collection and block on other locks.
//! Message payloads are therefore built before the lock is taken, and the
//! mailbox enqueue is the only call made under it.

mod table;

use std::sync::{Arc, Weak};

use isle_core::{ChannelId, PortId};
use parking_lot::{Mutex, RawMutex, lock_api::ArcMutexGuard};
pub use table::PortTable;

use crate::process::Process;

pub(crate) struct PortInner {
	/// Owning process; absent once the process has terminated. Sends to
	/// an orphaned port fail with illegal-state.
	pub(crate) owner: Option<Weak<Process>>,
	/// Stable id of the channel object, revalidated by the registry
	/// sweep. Absent when the collector found the channel unreachable.
	pub(crate) channel: Option<ChannelId>,
	/// External holders plus the implicit reference from creation.
	/// Transitions to zero are guarded by the port lock.
	pub(crate) ref_count: u32,
}

/// A resolved port: the slot index plus a shared reference to its state.
///
/// Cloning is cheap; the slot in the table may be freed while clones are
/// still held, in which case they only keep the inner state alive — the
/// table will no longer resolve the index.
#[derive(Clone)]
pub struct Port {
	id: PortId,
	pub(crate) inner: Arc<Mutex<PortInner>>,
}

impl Port {
	pub(crate) fn new(owner: &Arc<Process>, channel: Option<ChannelId>, id: PortId) -> Self {
		Self {
			id,
			inner: Arc::new(Mutex::new(PortInner {
				owner: Some(Arc::downgrade(owner)),
				channel,
				ref_count: 1,
			})),
		}
	}

	pub fn id(&self) -> PortId {
		self.id
	}

	/// The owning process, if it is still alive.
	pub fn owner(&self) -> Option<Arc<Process>> {
		self.inner.lock().owner.as_ref().and_then(Weak::upgrade)
	}

	/// Snapshot of the channel reference. Only guaranteed valid right
	/// after a registry sweep.
	pub fn channel(&self) -> Option<ChannelId> {
		self.inner.lock().channel
	}

	pub fn ref_count(&self) -> u32 {
		self.inner.lock().ref_count
	}

	/// Locked increment. Incrementing a dead port is a programming
	/// error.
	pub fn increment_ref(&self) {
		let mut inner = self.inner.lock();
		debug_assert!(inner.ref_count > 0, "incrementing a dead port {}", self.id);
		inner.ref_count += 1;
	}

	pub(crate) fn lock_arc(&self) -> ArcMutexGuard<RawMutex, PortInner> {
		Mutex::lock_arc(&self.inner)
	}
}

/// Result of a successful send.
pub enum SendOutcome {
	/// Same-process delivery; the port was unlocked immediately.
	Delivered,
	/// Cross-process delivery; the destination must be woken.
	Wake(WakeToken),
}

/// Marker carrying a still-locked port after a cross-process send.
///
/// The scheduler wakes the destination process while the token exists —
/// the held lock guarantees the port (and with it the destination's
/// liveness check) cannot be torn down concurrently. Dropping the token
/// releases the lock.
pub struct WakeToken {
	port: PortId,
	process: Arc<Process>,
	_guard: ArcMutexGuard<RawMutex, PortInner>,
}

impl WakeToken {
	pub(crate) fn new(port: PortId, process: Arc<Process>, guard: ArcMutexGuard<RawMutex, PortInner>) -> Self {
		Self {
			port,
			process,
			_guard: guard,
		}
	}

	pub fn port(&self) -> PortId {
		self.port
	}

	/// The process to wake.
	pub fn process(&self) -> &Arc<Process> {
		&self.process
	}
}
