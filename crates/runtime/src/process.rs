// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use isle_core::{PortId, ProcessId};
use parking_lot::Mutex;

use crate::{mailbox::Mailbox, port::PortTable};

/// The "wake this process" signal produced when a send crosses processes.
///
/// Scheduling policy lives outside this core; the scheduler supplies the
/// implementation and is invoked while the sender still holds the target
/// port's lock, so the destination cannot be destroyed concurrently.
pub trait ProcessWaker: Send + Sync {
	fn wake(&self, process: &Arc<Process>);
}

/// An isolated execution unit: owns a mailbox and an ordered set of port
/// indices.
///
/// The port set is mutated only by the owning process's own thread
/// (creation, teardown) and by the registry sweep, which the collector
/// serializes against mutators with its own pause discipline.
pub struct Process {
	id: ProcessId,
	mailbox: Mailbox,
	ports: Mutex<Vec<PortId>>,
}

impl Process {
	pub fn new() -> Arc<Self> {
		Arc::new(Self {
			id: ProcessId::next(),
			mailbox: Mailbox::new(),
			ports: Mutex::new(Vec::new()),
		})
	}

	pub fn id(&self) -> ProcessId {
		self.id
	}

	pub fn mailbox(&self) -> &Mailbox {
		&self.mailbox
	}

	/// Snapshot of the port set, in creation order.
	pub fn ports(&self) -> Vec<PortId> {
		self.ports.lock().clone()
	}

	pub(crate) fn add_port(&self, id: PortId) {
		self.ports.lock().push(id);
	}

	pub(crate) fn with_ports<R>(&self, f: impl FnOnce(&mut Vec<PortId>) -> R) -> R {
		f(&mut self.ports.lock())
	}

	/// Tear this process down: orphan or delete every port it owns and
	/// drop all pending mail. Called exactly once, by the owning thread.
	pub fn terminate(&self, table: &PortTable) {
		let ports = std::mem::take(&mut *self.ports.lock());
		for id in ports {
			table.owner_terminating(id);
		}
		let dropped = self.mailbox.drain();
		if dropped > 0 {
			tracing::trace!("{} dropped {} undelivered messages at teardown", self.id, dropped);
		}
	}
}
