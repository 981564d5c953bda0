// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use isle_core::EventMask;
use mio::event::Event;

/// Flag snapshot of one kernel event, decoupled from the multiplexer's
/// own event type so translation stays a pure function.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct RawReadiness {
	pub(crate) readable: bool,
	pub(crate) writable: bool,
	pub(crate) read_closed: bool,
	pub(crate) write_closed: bool,
	pub(crate) error: bool,
}

impl RawReadiness {
	pub(crate) fn from_event(event: &Event) -> Self {
		Self {
			readable: event.is_readable(),
			writable: event.is_writable(),
			read_closed: event.is_read_closed(),
			write_closed: event.is_write_closed(),
			error: event.is_error(),
		}
	}
}

/// Translate raw readiness into the semantic mask a process observes.
///
/// Read side: plain readability is `READ`; end-of-stream downgrades to
/// `READ | CLOSE`, unless the kernel also flagged an error, which
/// dominates everything as `ERROR`. Write side: `WRITE`, or `ERROR` when
/// end-of-stream carries the error flag.
pub(crate) fn translate(raw: RawReadiness) -> EventMask {
	let mut mask = EventMask::empty();

	if raw.readable || raw.read_closed {
		if raw.read_closed && raw.error {
			return EventMask::ERROR;
		}
		mask |= EventMask::READ;
		if raw.read_closed {
			mask |= EventMask::CLOSE;
		}
	}

	if raw.writable {
		if raw.write_closed && raw.error {
			return EventMask::ERROR;
		}
		mask |= EventMask::WRITE;
	}

	mask
}
