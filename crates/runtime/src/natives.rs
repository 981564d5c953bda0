// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Native entry points — the language-boundary surface for ports.
//!
//! Failures are returned as values and handled by the immediate caller;
//! `RetryAfterGc` in particular tells the interpreter to re-invoke the
//! operation after a collection cycle.

use std::sync::{Arc, Weak};

use isle_core::{EventMask, NativeError, NativeResult, PortId, Value};

use crate::{
	heap::HandleAllocator,
	message::{Message, MessageKind},
	port::{Port, PortTable, SendOutcome, WakeToken},
	process::Process,
};

/// Resolve a managed handle to its port. Anything that does not encode a
/// live slot index is an illegal state.
fn resolve(table: &PortTable, handle: &Value) -> NativeResult<Port> {
	let raw = handle.as_integer().ok_or(NativeError::IllegalState)?;
	let id = PortId::decode(raw).ok_or(NativeError::IllegalState)?;
	table.get(id).ok_or(NativeError::IllegalState)
}

/// Create a port bound to `channel` and return its encoded handle.
///
/// The managed cell for the encoding is reserved first, so an allocation
/// retry propagates before any port exists; the host registers the
/// finalizer that will call [`PortTable::on_handle_unreachable`] with the
/// returned index.
pub fn port_create(
	table: &PortTable,
	allocator: &dyn HandleAllocator,
	process: &Arc<Process>,
	channel: Option<isle_core::ChannelId>,
) -> NativeResult<Value> {
	let cell = allocator.reserve_handle()?;
	let id = table.create(process, channel);
	Ok(cell.fill(id))
}

/// Send a transferable value to the port behind `handle`.
///
/// The message is built outside the port lock; the owner is re-checked
/// under it. A cross-process delivery returns the still-locked port so the
/// scheduler can wake the destination while it cannot be destroyed; a
/// same-process delivery unlocks immediately.
pub fn port_send(table: &PortTable, caller: &Process, handle: &Value, value: Value) -> NativeResult<SendOutcome> {
	let port = resolve(table, handle)?;

	if !value.is_transferable() {
		return Err(NativeError::WrongArgumentType);
	}

	// Early out while nothing is allocated yet: an orphaned port can
	// never be delivered to.
	if port.owner().is_none() {
		return Err(NativeError::IllegalState);
	}

	let message = Message::data(port.id(), value);

	let guard = port.lock_arc();
	let Some(destination) = guard.owner.as_ref().and_then(Weak::upgrade) else {
		// The owner died between the check and the lock; the message
		// is dropped here, never enqueued.
		drop(guard);
		return Err(NativeError::IllegalState);
	};

	destination.mailbox().enqueue(message);

	if destination.id() != caller.id() {
		let id = port.id();
		return Ok(SendOutcome::Wake(WakeToken::new(id, destination, guard)));
	}
	Ok(SendOutcome::Delivered)
}

/// Send a process-termination notification.
///
/// The destination must be a different, live process. A value still in
/// mutable form is carried as an exit entry for the destination to copy
/// under its own discipline; an already-transferable value is enqueued
/// like ordinary data.
pub fn port_send_exit(table: &PortTable, caller: &Process, handle: &Value, value: Value) -> NativeResult<WakeToken> {
	let port = resolve(table, handle)?;

	let message = if value.is_transferable() {
		Message::data(port.id(), value)
	} else {
		Message::exit(port.id(), caller.id(), value)
	};

	let guard = port.lock_arc();
	let Some(destination) = guard.owner.as_ref().and_then(Weak::upgrade) else {
		drop(guard);
		return Err(NativeError::IllegalState);
	};
	if destination.id() == caller.id() {
		drop(guard);
		return Err(NativeError::IllegalState);
	}

	destination.mailbox().enqueue(message);

	let id = port.id();
	Ok(WakeToken::new(id, destination, guard))
}

/// Take an extra reference on the port behind `handle` and return the
/// re-encoded handle.
///
/// The encoding cell is reserved before the increment, so a retry leaves
/// the refcount untouched.
pub fn increment_port_ref(table: &PortTable, allocator: &dyn HandleAllocator, handle: &Value) -> NativeResult<Value> {
	let port = resolve(table, handle)?;
	let cell = allocator.reserve_handle()?;
	port.increment_ref();
	Ok(cell.fill(port.id()))
}

/// Deliver a runtime-originated event to a port — the send primitive the
/// events subsystem uses. Same locking discipline as [`port_send`], no
/// managed allocation involved.
pub fn post_event(table: &PortTable, port: PortId, kind: MessageKind) -> NativeResult<SendOutcome> {
	let target = table.get(port).ok_or(NativeError::IllegalState)?;

	let message = Message {
		port,
		kind,
	};

	let guard = target.lock_arc();
	let Some(destination) = guard.owner.as_ref().and_then(Weak::upgrade) else {
		drop(guard);
		return Err(NativeError::IllegalState);
	};

	destination.mailbox().enqueue(message);
	Ok(SendOutcome::Wake(WakeToken::new(port, destination, guard)))
}

/// Deliver an I/O readiness mask to a port.
pub fn send_io_event(table: &PortTable, port: PortId, mask: EventMask) -> NativeResult<SendOutcome> {
	post_event(table, port, MessageKind::IoEvent(mask))
}
