// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use isle_core::{EventMask, PortId, ProcessId, Value};

/// What a message carries.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageKind {
	/// An ordinary send; the value is already in transferable form.
	Data(Value),
	/// A process-termination notification. The value may still be
	/// mutable; the destination copies it under its own discipline.
	Exit { sender: ProcessId, value: Value },
	/// I/O readiness delivered by the events subsystem.
	IoEvent(EventMask),
	/// A registered deadline expired.
	Timeout,
}

/// Transfer-of-ownership envelope enqueued into a process's mailbox.
///
/// Allocated by the sender before the port lock is taken; ownership moves
/// into the mailbox on enqueue, and an aborted send simply drops it.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
	pub port: PortId,
	pub kind: MessageKind,
}

impl Message {
	pub fn data(port: PortId, value: Value) -> Self {
		Self {
			port,
			kind: MessageKind::Data(value),
		}
	}

	pub fn exit(port: PortId, sender: ProcessId, value: Value) -> Self {
		Self {
			port,
			kind: MessageKind::Exit {
				sender,
				value,
			},
		}
	}

	pub fn io_event(port: PortId, mask: EventMask) -> Self {
		Self {
			port,
			kind: MessageKind::IoEvent(mask),
		}
	}

	pub fn timeout(port: PortId) -> Self {
		Self {
			port,
			kind: MessageKind::Timeout,
		}
	}
}
