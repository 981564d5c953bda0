// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::message::Message;

/// Error returned by a timed receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecvTimeoutError {
	Timeout,
	Closed,
}

/// Per-process inbound message queue.
///
/// The mailbox owns both channel ends, so an enqueue never fails while the
/// process exists. Concurrent enqueues are serialized by the sender's port
/// lock hand-off; messages from a single sender arrive in send order.
pub struct Mailbox {
	tx: Sender<Message>,
	rx: Receiver<Message>,
}

impl Mailbox {
	pub fn new() -> Self {
		let (tx, rx) = unbounded();
		Self {
			tx,
			rx,
		}
	}

	/// Enqueue a message, transferring ownership to the mailbox.
	pub fn enqueue(&self, message: Message) {
		// Both ends live in the mailbox, so the channel cannot be
		// disconnected here.
		let _ = self.tx.send(message);
	}

	pub fn try_recv(&self) -> Option<Message> {
		self.rx.try_recv().ok()
	}

	pub fn recv_timeout(&self, timeout: Duration) -> Result<Message, RecvTimeoutError> {
		self.rx.recv_timeout(timeout).map_err(|err| match err {
			crossbeam_channel::RecvTimeoutError::Timeout => RecvTimeoutError::Timeout,
			crossbeam_channel::RecvTimeoutError::Disconnected => RecvTimeoutError::Closed,
		})
	}

	pub fn len(&self) -> usize {
		self.rx.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rx.is_empty()
	}

	/// Drop all pending messages. Used at process teardown.
	pub fn drain(&self) -> usize {
		let mut dropped = 0;
		while self.rx.try_recv().is_ok() {
			dropped += 1;
		}
		dropped
	}
}

impl Default for Mailbox {
	fn default() -> Self {
		Self::new()
	}
}
