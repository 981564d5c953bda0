// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{sync::Arc, thread};

use isle_core::{ChannelId, NativeError, PortId, Value};
use isle_runtime::{
	MessageKind, PortTable, Process, SendOutcome,
	heap::{FlakyAllocator, ImmediateAllocator},
	increment_port_ref, port_create, port_send, port_send_exit,
};

fn decode(handle: &Value) -> PortId {
	PortId::decode(handle.as_integer().unwrap()).unwrap()
}

#[test]
fn test_messages_from_one_sender_arrive_in_order() {
	let table = Arc::new(PortTable::new());
	let owner = Process::new();
	let sender = Process::new();
	let allocator = ImmediateAllocator;

	let handle = port_create(&table, &allocator, &owner, None).unwrap();
	let id = decode(&handle);

	let join = {
		let table = Arc::clone(&table);
		let sender = Arc::clone(&sender);
		let handle = handle.clone();
		thread::spawn(move || {
			for n in 0..200 {
				port_send(&table, &sender, &handle, Value::Integer(n)).unwrap();
			}
		})
	};
	join.join().unwrap();

	for expected in 0..200 {
		let message = owner.mailbox().try_recv().unwrap();
		assert_eq!(message.port, id);
		match message.kind {
			MessageKind::Data(Value::Integer(got)) => assert_eq!(got, expected),
			other => panic!("unexpected message: {:?}", other),
		}
	}
	assert!(owner.mailbox().is_empty());
}

#[test]
fn test_same_process_delivery_unlocks_immediately() {
	let table = PortTable::new();
	let process = Process::new();
	let allocator = ImmediateAllocator;

	let handle = port_create(&table, &allocator, &process, None).unwrap();

	match port_send(&table, &process, &handle, Value::Integer(7)) {
		Ok(SendOutcome::Delivered) => {}
		Ok(SendOutcome::Wake(_)) => panic!("same-process delivery must not require a wake"),
		Err(err) => panic!("send failed: {}", err),
	}

	// The lock was released; a second send goes straight through.
	match port_send(&table, &process, &handle, Value::Integer(8)) {
		Ok(SendOutcome::Delivered) => {}
		_ => panic!("second send must succeed"),
	}
	assert_eq!(process.mailbox().len(), 2);
}

#[test]
fn test_cross_process_delivery_hands_back_a_wake_token() {
	let table = PortTable::new();
	let owner = Process::new();
	let sender = Process::new();
	let allocator = ImmediateAllocator;

	let handle = port_create(&table, &allocator, &owner, None).unwrap();
	let id = decode(&handle);

	let token = match port_send(&table, &sender, &handle, Value::Integer(1)) {
		Ok(SendOutcome::Wake(token)) => token,
		Ok(SendOutcome::Delivered) => panic!("cross-process delivery must hand back a wake token"),
		Err(err) => panic!("send failed: {}", err),
	};

	assert_eq!(token.port(), id);
	assert_eq!(token.process().id(), owner.id());
	assert_eq!(owner.mailbox().len(), 1);

	// Dropping the token releases the port lock.
	drop(token);
	assert!(port_send(&table, &sender, &handle, Value::Integer(2)).is_ok());
}

#[test]
fn test_malformed_handles_are_rejected() {
	let table = PortTable::new();
	let sender = Process::new();

	for handle in [Value::Null, Value::Integer(0), Value::Integer(-1), Value::Integer(9999)] {
		match port_send(&table, &sender, &handle, Value::Integer(1)) {
			Err(NativeError::IllegalState) => {}
			Err(other) => panic!("expected illegal state for {:?}, got {}", handle, other),
			Ok(_) => panic!("send through {:?} must fail", handle),
		}
	}
}

#[test]
fn test_heap_values_are_not_transferable() {
	let table = PortTable::new();
	let owner = Process::new();
	let sender = Process::new();
	let allocator = ImmediateAllocator;

	let handle = port_create(&table, &allocator, &owner, None).unwrap();

	match port_send(&table, &sender, &handle, Value::Heap(ChannelId(4))) {
		Err(NativeError::WrongArgumentType) => {}
		Err(other) => panic!("expected wrong argument type, got {}", other),
		Ok(_) => panic!("a heap value must not cross processes as data"),
	}
	assert!(owner.mailbox().is_empty());
}

#[test]
fn test_exit_wraps_values_still_in_mutable_form() {
	let table = PortTable::new();
	let owner = Process::new();
	let sender = Process::new();
	let allocator = ImmediateAllocator;

	let handle = port_create(&table, &allocator, &owner, None).unwrap();

	let token = port_send_exit(&table, &sender, &handle, Value::Heap(ChannelId(5))).unwrap();
	assert_eq!(token.process().id(), owner.id());
	drop(token);

	let message = owner.mailbox().try_recv().unwrap();
	match message.kind {
		MessageKind::Exit {
			sender: from,
			value: Value::Heap(channel),
		} => {
			assert_eq!(from, sender.id());
			assert_eq!(channel, ChannelId(5));
		}
		other => panic!("unexpected message: {:?}", other),
	}
}

#[test]
fn test_exit_with_transferable_value_is_plain_data() {
	let table = PortTable::new();
	let owner = Process::new();
	let sender = Process::new();
	let allocator = ImmediateAllocator;

	let handle = port_create(&table, &allocator, &owner, None).unwrap();

	drop(port_send_exit(&table, &sender, &handle, Value::Integer(42)).unwrap());

	let message = owner.mailbox().try_recv().unwrap();
	match message.kind {
		MessageKind::Data(Value::Integer(got)) => assert_eq!(got, 42),
		other => panic!("unexpected message: {:?}", other),
	}
}

#[test]
fn test_exit_to_own_process_is_illegal() {
	let table = PortTable::new();
	let process = Process::new();
	let allocator = ImmediateAllocator;

	let handle = port_create(&table, &allocator, &process, None).unwrap();

	match port_send_exit(&table, &process, &handle, Value::Integer(1)) {
		Err(NativeError::IllegalState) => {}
		Err(other) => panic!("expected illegal state, got {}", other),
		Ok(_) => panic!("exit to the calling process must fail"),
	}
	assert!(process.mailbox().is_empty());
}

#[test]
fn test_create_retry_leaves_no_port_behind() {
	let table = PortTable::new();
	let process = Process::new();
	let flaky = FlakyAllocator::failing(1);

	assert_eq!(port_create(&table, &flaky, &process, None).unwrap_err(), NativeError::RetryAfterGc);
	assert!(table.is_empty());
	assert!(process.ports().is_empty());

	// The interpreter re-invokes the native after a collection.
	port_create(&table, &flaky, &process, None).unwrap();
	assert_eq!(table.len(), 1);
}

#[test]
fn test_increment_retry_leaves_the_refcount_untouched() {
	let table = PortTable::new();
	let process = Process::new();
	let allocator = ImmediateAllocator;

	let handle = port_create(&table, &allocator, &process, None).unwrap();
	let id = decode(&handle);

	let flaky = FlakyAllocator::failing(1);
	assert_eq!(increment_port_ref(&table, &flaky, &handle).unwrap_err(), NativeError::RetryAfterGc);
	assert_eq!(table.get(id).unwrap().ref_count(), 1);

	let re_encoded = increment_port_ref(&table, &flaky, &handle).unwrap();
	assert_eq!(decode(&re_encoded), id);
	assert_eq!(table.get(id).unwrap().ref_count(), 2);
}
