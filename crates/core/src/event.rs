// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use bitflags::bitflags;

bitflags! {
	/// Semantic classification of raw kernel readiness.
	///
	/// This is what a process observes in its mailbox when the event
	/// handler delivers I/O readiness; the raw multiplexer flags never
	/// cross the boundary.
	#[derive(Debug, Clone, Copy, PartialEq, Eq)]
	pub struct EventMask: u8 {
		const READ = 1 << 0;
		const WRITE = 1 << 1;
		const CLOSE = 1 << 2;
		const ERROR = 1 << 3;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_read_close_combines() {
		let mask = EventMask::READ | EventMask::CLOSE;
		assert!(mask.contains(EventMask::READ));
		assert!(mask.contains(EventMask::CLOSE));
		assert!(!mask.contains(EventMask::ERROR));
	}
}
