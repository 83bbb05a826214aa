// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Lattice daemon library.
//!
//! The thin RPC façade over [`lattice_engine::Engine`]: a TCP listener
//! accepting one framed request per connection, a dispatcher translating
//! requests into engine calls, and the long-lived sync streaming sessions.

pub mod dispatch;
pub mod env;
pub mod server;

pub use dispatch::{dispatch, Outcome};
pub use server::serve;
