//! Local models that run without a network connection.
//!
//! [`ScriptedModelProvider`] answers requests from a fixed conversation
//! script and is meant for tests. [`ReplayResponse`] is the response type
//! behind it, and can be reused by other offline models that decide their
//! events up front.

#[macro_use]
extern crate tracing;

mod preset;
mod replay;
mod scripted;

pub use preset::*;
pub use replay::{Error, ReplayResponse};
pub use scripted::ScriptedModelProvider;
