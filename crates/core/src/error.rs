// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{error, fmt, io};

/// Recoverable failure value returned by a native entry point.
///
/// These are returned to the immediate caller (interpreter or scheduler)
/// and never unwind across the event-handler thread boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeError {
	/// The handle resolves to no port, or the port's owning process is
	/// gone.
	IllegalState,
	/// The payload is not in transferable (immutable) form.
	WrongArgumentType,
	/// A managed allocation cannot proceed without a collection cycle;
	/// the caller re-invokes the operation after the collector has run.
	RetryAfterGc,
}

impl fmt::Display for NativeError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			NativeError::IllegalState => write!(f, "illegal state: no port or owner behind the handle"),
			NativeError::WrongArgumentType => write!(f, "wrong argument type: payload is not transferable"),
			NativeError::RetryAfterGc => write!(f, "allocation failed: retry after gc"),
		}
	}
}

impl error::Error for NativeError {}

pub type NativeResult<T> = std::result::Result<T, NativeError>;

/// Error type for subsystem lifecycle and OS-level failures.
#[derive(Debug)]
pub enum Error {
	/// The OS refused a resource (multiplexer, waker, registration).
	/// Fatal at creation time; there is no retry policy at this layer.
	Os(io::Error),
	/// A start/shutdown call found the subsystem in the wrong state.
	NotRunning,
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Error::Os(err) => write!(f, "os error: {}", err),
			Error::NotRunning => write!(f, "subsystem is not running"),
		}
	}
}

impl error::Error for Error {
	fn source(&self) -> Option<&(dyn error::Error + 'static)> {
		match self {
			Error::Os(err) => Some(err),
			Error::NotRunning => None,
		}
	}
}

impl From<io::Error> for Error {
	fn from(err: io::Error) -> Self {
		Error::Os(err)
	}
}

pub type Result<T> = std::result::Result<T, Error>;
