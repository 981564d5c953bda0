// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

/// Configuration for the events subsystem.
#[derive(Debug, Clone)]
pub struct EventsConfig {
	/// Capacity of the kernel event batch per wait.
	pub events_capacity: usize,
	/// Name of the dedicated multiplexer thread.
	pub thread_name: String,
}

impl Default for EventsConfig {
	fn default() -> Self {
		Self {
			events_capacity: 1024,
			thread_name: "events".to_string(),
		}
	}
}

impl EventsConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn events_capacity(mut self, capacity: usize) -> Self {
		self.events_capacity = capacity;
		self
	}

	pub fn thread_name(mut self, name: impl Into<String>) -> Self {
		self.thread_name = name.into();
		self
	}
}
