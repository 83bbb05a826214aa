// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! RPC protocol for daemon communication.
//!
//! Wire format: 4-byte length prefix (big-endian) + JSON payload.
//!
//! Every connection carries one request and one response, except `GraphSync`:
//! after the initial `Response::Ok` the server keeps the connection open and
//! writes a stream of framed [`lattice_core::SyncEvent`]s until the client
//! disconnects or the graph is replaced.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod request;
mod response;
mod wire;

pub use request::Request;
pub use response::Response;
pub use wire::{decode, encode, read_message, write_message, ProtocolError};
pub use wire::{read_event, read_request, read_response, write_event, write_request, write_response};
