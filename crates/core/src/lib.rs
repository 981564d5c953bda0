// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Shared leaf types for the isle messaging core.
//!
//! Everything here is consumed by both the runtime crate (ports, mailboxes,
//! native entry points) and the events subsystem (the multiplexer thread):
//! identifiers, the semantic event mask, the language-boundary value
//! stand-in, the error taxonomy and the subsystem lifecycle contract.

mod error;
mod event;
mod id;
mod subsystem;
mod value;

pub use error::{Error, NativeError, NativeResult, Result};
pub use event::EventMask;
pub use id::{ChannelId, PortId, ProcessId};
pub use subsystem::{HealthStatus, Subsystem};
pub use value::Value;
