// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Subsystem lifecycle contract.

use std::any::Any;

use crate::Result;

/// Health of a running subsystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
	Healthy,
	Degraded { description: String },
	/// Shut down, or never started; the state cannot be assessed.
	Unknown,
}

/// A component with its own thread(s) and an explicit lifecycle.
///
/// `start` and `shutdown` are idempotent; shutdown is terminal — a stopped
/// subsystem stays stopped.
pub trait Subsystem: Send {
	fn name(&self) -> &'static str;

	fn start(&mut self) -> Result<()>;

	fn shutdown(&mut self) -> Result<()>;

	fn is_running(&self) -> bool;

	fn health_status(&self) -> HealthStatus {
		if self.is_running() {
			HealthStatus::Healthy
		} else {
			HealthStatus::Unknown
		}
	}

	fn as_any(&self) -> &dyn Any;
}
