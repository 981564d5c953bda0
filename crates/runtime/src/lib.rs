// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Process-to-process messaging for the isle runtime.
//!
//! The unit of addressability is the [`Port`]: a reference-counted entry in
//! a side table ([`PortTable`]) binding a possibly-absent owning
//! [`Process`] to a possibly-absent channel object on the managed heap.
//! Sends — whether user-originated or I/O readiness from the events
//! subsystem — lock the target port, re-check that the owner is alive and
//! enqueue onto its [`Mailbox`]; a cross-process delivery hands the caller
//! a [`WakeToken`] that keeps the port locked until the destination has
//! been woken.
//!
//! Port lifetime is reconciled with the collector by the registry sweep
//! ([`PortTable::cleanup_ports`]), driven through the callback contracts in
//! [`heap`].

pub mod heap;
mod mailbox;
mod message;
mod natives;
mod port;
mod process;

pub use mailbox::{Mailbox, RecvTimeoutError};
pub use message::{Message, MessageKind};
pub use natives::{increment_port_ref, port_create, port_send, port_send_exit, post_event, send_io_event};
pub use port::{Port, PortTable, SendOutcome, WakeToken};
pub use process::{Process, ProcessWaker};
