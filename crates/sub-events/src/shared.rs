// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{cmp::Ordering as CmpOrdering, collections::BinaryHeap, time::Instant};

use isle_core::PortId;
use mio::Token;
use parking_lot::{Condvar, Mutex};
use slab::Slab;

/// Token of the wakeup/shutdown side-channel (the `mio::Waker`).
pub(crate) const WAKE_TOKEN: Token = Token(0);
/// First token handed out to I/O registrations.
pub(crate) const TOKEN_BASE: usize = 1;

/// A pending deadline for a port.
pub(crate) struct TimerEntry {
	pub(crate) deadline: Instant,
	pub(crate) port: PortId,
}

impl Eq for TimerEntry {}

impl PartialEq for TimerEntry {
	fn eq(&self, other: &Self) -> bool {
		self.deadline == other.deadline && self.port == other.port
	}
}

impl Ord for TimerEntry {
	// BinaryHeap is a max-heap; reverse for a min-heap by deadline.
	fn cmp(&self, other: &Self) -> CmpOrdering {
		other.deadline.cmp(&self.deadline).then_with(|| other.port.0.cmp(&self.port.0))
	}
}

impl PartialOrd for TimerEntry {
	fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
		Some(self.cmp(other))
	}
}

/// State under the driver monitor: the timer queue (its head is the
/// `next_timeout` the wait is computed from) and the terminal stop marker.
pub(crate) struct DriverState {
	pub(crate) timers: BinaryHeap<TimerEntry>,
	pub(crate) stopped: bool,
}

/// State shared between the registration handle and the driver thread.
pub(crate) struct Shared {
	/// Token slot → destination port, the per-registration association
	/// carried as opaque user data in each kernel event.
	pub(crate) registrations: Mutex<Slab<PortId>>,
	pub(crate) state: Mutex<DriverState>,
	/// Notified exactly once, when the driver reaches its terminal
	/// state.
	pub(crate) stopped_cond: Condvar,
}

impl Shared {
	pub(crate) fn new() -> Self {
		Self {
			registrations: Mutex::new(Slab::new()),
			state: Mutex::new(DriverState {
				timers: BinaryHeap::new(),
				stopped: false,
			}),
			stopped_cond: Condvar::new(),
		}
	}
}
