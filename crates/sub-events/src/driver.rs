// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	io,
	sync::{
		Arc,
		atomic::{AtomicBool, Ordering},
	},
	time::{Duration, Instant},
};

use isle_runtime::{MessageKind, PortTable, ProcessWaker, SendOutcome, post_event, send_io_event};
use mio::{Events, Poll, Token};

use crate::{
	shared::{Shared, WAKE_TOKEN},
	translate::{RawReadiness, translate},
};

/// The loop running on the dedicated events thread.
pub(crate) struct Driver {
	pub(crate) poll: Poll,
	pub(crate) events: Events,
	pub(crate) table: Arc<PortTable>,
	pub(crate) process_waker: Arc<dyn ProcessWaker>,
	pub(crate) shared: Arc<Shared>,
	pub(crate) running: Arc<AtomicBool>,
}

impl Driver {
	pub(crate) fn run(mut self) {
		tracing::debug!("events thread entering multiplexer loop");

		loop {
			let timeout = self.next_wait();

			match self.poll.poll(&mut self.events, timeout) {
				Ok(()) => {}
				Err(err) if err.kind() == io::ErrorKind::Interrupted => {
					// Interrupted wait: retried silently, but
					// timers still get their turn below.
				}
				Err(err) => {
					// A poisoned multiplexer is not masked;
					// the loop ends and stays ended.
					tracing::error!("multiplexer wait failed: {}", err);
					break;
				}
			}

			// Expiry runs on every iteration — pure timeout, spurious
			// wake or I/O burst alike — so timers are never starved
			// by unrelated activity.
			self.fire_expired_timers();

			if !self.running.load(Ordering::Acquire) {
				break;
			}

			for event in self.events.iter() {
				let token = event.token();
				if token == WAKE_TOKEN {
					// Deliberate external wake: a deadline or
					// registration changed, recompute the wait
					// on the next iteration.
					continue;
				}
				deliver(&self.table, &*self.process_waker, &self.shared, token, RawReadiness::from_event(event));
			}
		}

		// Terminal state: no further event translation occurs.
		let mut state = self.shared.state.lock();
		state.stopped = true;
		self.shared.stopped_cond.notify_all();
		drop(state);
		tracing::debug!("events thread stopped");
	}

	/// Relative wait until the soonest deadline, clamped at zero; an
	/// empty timer queue waits indefinitely.
	fn next_wait(&self) -> Option<Duration> {
		let state = self.shared.state.lock();
		state.timers.peek().map(|entry| entry.deadline.saturating_duration_since(Instant::now()))
	}

	fn fire_expired_timers(&self) {
		let now = Instant::now();
		let mut expired = Vec::new();
		{
			let mut state = self.shared.state.lock();
			while state.timers.peek().is_some_and(|entry| entry.deadline <= now) {
				if let Some(entry) = state.timers.pop() {
					expired.push(entry.port);
				}
			}
		}

		for port in expired {
			match post_event(&self.table, port, MessageKind::Timeout) {
				Ok(SendOutcome::Wake(token)) => {
					self.process_waker.wake(token.process());
				}
				Ok(SendOutcome::Delivered) => {}
				Err(err) => {
					tracing::trace!("timer for {} dropped: {}", port, err);
				}
			}
		}
	}
}

/// Recover the registered port from the event's token and hand the
/// translated mask to the owning process's mailbox.
fn deliver(table: &PortTable, process_waker: &dyn ProcessWaker, shared: &Shared, token: Token, raw: RawReadiness) {
	let Some(port) = shared.registrations.lock().get(token.0 - crate::shared::TOKEN_BASE).copied() else {
		tracing::trace!("event for stale token {:?} ignored", token);
		return;
	};

	let mask = translate(raw);
	if mask.is_empty() {
		return;
	}

	match send_io_event(table, port, mask) {
		Ok(SendOutcome::Wake(wake)) => {
			// Wake while the port lock is held so the destination
			// cannot be torn down underneath the scheduler.
			process_waker.wake(wake.process());
		}
		Ok(SendOutcome::Delivered) => {}
		Err(err) => {
			// Orphaned or already-freed port: readiness has nowhere
			// to go, which is fine.
			tracing::trace!("event for {} dropped: {}", port, err);
		}
	}
}
