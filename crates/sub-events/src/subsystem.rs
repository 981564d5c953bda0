// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	any::Any,
	sync::{
		Arc,
		atomic::{AtomicBool, Ordering},
	},
	thread::{self, JoinHandle},
	time::Instant,
};

use isle_core::{Error, PortId, Result, Subsystem};
use isle_runtime::{PortTable, ProcessWaker};
use mio::{Events, Interest, Poll, Registry, Token, Waker, event::Source};

use crate::{
	config::EventsConfig,
	driver::Driver,
	shared::{Shared, TOKEN_BASE, TimerEntry, WAKE_TOKEN},
};

/// Registration surface of the events subsystem.
///
/// Clonable and usable from any thread: the multiplexer registry is
/// thread-safe, and deadline changes interrupt an in-flight wait through
/// the waker so the loop recomputes its timeout.
#[derive(Clone)]
pub struct EventsHandle {
	registry: Arc<Registry>,
	waker: Arc<Waker>,
	shared: Arc<Shared>,
}

impl EventsHandle {
	/// Register read/write interest on an OS handle, associated with
	/// `port`. Readiness arrives in the owning process's mailbox as an
	/// event-mask message.
	pub fn register<S>(&self, source: &mut S, interest: Interest, port: PortId) -> Result<Token>
	where
		S: Source + ?Sized,
	{
		let token = Token(TOKEN_BASE + self.shared.registrations.lock().insert(port));
		if let Err(err) = self.registry.register(source, token, interest) {
			self.shared.registrations.lock().remove(token.0 - TOKEN_BASE);
			return Err(err.into());
		}
		Ok(token)
	}

	pub fn deregister<S>(&self, source: &mut S, token: Token) -> Result<()>
	where
		S: Source + ?Sized,
	{
		self.registry.deregister(source)?;
		if token.0 >= TOKEN_BASE {
			self.shared.registrations.lock().try_remove(token.0 - TOKEN_BASE);
		}
		Ok(())
	}

	/// Arm a deadline for `port`. When it expires, the port's owner
	/// receives a timeout message. An earlier-than-pending deadline
	/// wakes the blocked wait so it is recomputed.
	pub fn schedule_timeout(&self, port: PortId, deadline: Instant) {
		let needs_wake = {
			let mut state = self.shared.state.lock();
			let sooner = state.timers.peek().map_or(true, |entry| deadline < entry.deadline);
			state.timers.push(TimerEntry {
				deadline,
				port,
			});
			sooner
		};
		if needs_wake {
			let _ = self.waker.wake();
		}
	}
}

/// The event-handler subsystem: one dedicated thread multiplexing OS
/// readiness and deadlines into port sends.
pub struct EventsSubsystem {
	config: EventsConfig,
	table: Arc<PortTable>,
	process_waker: Arc<dyn ProcessWaker>,
	running: Arc<AtomicBool>,
	shared: Arc<Shared>,
	waker: Arc<Waker>,
	registry: Arc<Registry>,
	poll: Option<Poll>,
	thread: Option<JoinHandle<()>>,
}

impl EventsSubsystem {
	/// Acquire the kernel event queue and the wakeup side-channel.
	///
	/// OS resource exhaustion here is fatal for the host: there is no
	/// retry policy at this layer, the error escalates to startup
	/// failure.
	pub fn new(config: EventsConfig, table: Arc<PortTable>, process_waker: Arc<dyn ProcessWaker>) -> Result<Self> {
		let poll = Poll::new()?;
		let waker = Arc::new(Waker::new(poll.registry(), WAKE_TOKEN)?);
		let registry = Arc::new(poll.registry().try_clone()?);

		Ok(Self {
			config,
			table,
			process_waker,
			running: Arc::new(AtomicBool::new(false)),
			shared: Arc::new(Shared::new()),
			waker,
			registry,
			poll: Some(poll),
			thread: None,
		})
	}

	pub fn handle(&self) -> EventsHandle {
		EventsHandle {
			registry: Arc::clone(&self.registry),
			waker: Arc::clone(&self.waker),
			shared: Arc::clone(&self.shared),
		}
	}

	/// Block until the driver thread has reached its terminal state.
	pub fn wait_until_stopped(&self) {
		let mut state = self.shared.state.lock();
		while !state.stopped {
			self.shared.stopped_cond.wait(&mut state);
		}
	}
}

impl Subsystem for EventsSubsystem {
	fn name(&self) -> &'static str {
		"Events"
	}

	fn start(&mut self) -> Result<()> {
		if self.running.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_err() {
			// Already running
			return Ok(());
		}

		let Some(poll) = self.poll.take() else {
			// Shutdown is terminal; the multiplexer is gone.
			self.running.store(false, Ordering::Release);
			return Err(Error::NotRunning);
		};

		let driver = Driver {
			poll,
			events: Events::with_capacity(self.config.events_capacity),
			table: Arc::clone(&self.table),
			process_waker: Arc::clone(&self.process_waker),
			shared: Arc::clone(&self.shared),
			running: Arc::clone(&self.running),
		};

		let handle = thread::Builder::new()
			.name(self.config.thread_name.clone())
			.spawn(move || driver.run())
			.map_err(Error::Os)?;
		self.thread = Some(handle);

		Ok(())
	}

	fn shutdown(&mut self) -> Result<()> {
		if self.running.compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire).is_err() {
			// Already shut down
			return Ok(());
		}

		// Interrupt the blocking wait; the driver observes the cleared
		// flag, marks itself stopped and notifies any waiter.
		let _ = self.waker.wake();

		if let Some(handle) = self.thread.take() {
			let _ = handle.join();
		}

		Ok(())
	}

	fn is_running(&self) -> bool {
		self.running.load(Ordering::Acquire) && !self.shared.state.lock().stopped
	}

	fn as_any(&self) -> &dyn Any {
		self
	}
}

impl Drop for EventsSubsystem {
	fn drop(&mut self) {
		let _ = self.shutdown();
	}
}
