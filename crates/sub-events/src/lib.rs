// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! The events subsystem: a dedicated thread around the OS event
//! multiplexer.
//!
//! External I/O registrations associate an OS handle with a [`PortId`];
//! when the kernel reports readiness, the raw flags are translated into a
//! semantic [`EventMask`](isle_core::EventMask) and delivered to the
//! port's owning process through the same send primitive as
//! user-originated messages — I/O readiness is just mail. Deadline timers
//! ride the same loop: the blocking wait is bounded by the soonest
//! deadline and expiry runs on every iteration, so timers are never
//! starved by unrelated I/O.
//!
//! [`PortId`]: isle_core::PortId

mod config;
mod driver;
mod shared;
mod subsystem;
mod translate;

pub use config::EventsConfig;
pub use mio::{Interest, Token};
pub use subsystem::{EventsHandle, EventsSubsystem};
