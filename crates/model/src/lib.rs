//! The protocol spoken between the agent runtime and language models.
//!
//! A model is reached through a [`ModelProvider`], which turns a
//! [`ModelRequest`] into a streaming [`ModelResponse`]. The runtime never
//! depends on a concrete vendor: live HTTP backends, scripted test models and
//! offline rule-based models all implement the same traits.
//!
//! Types in this crate carry no behavior of their own beyond small
//! conveniences; they are the contract that implementors follow.

#![deny(missing_docs)]

mod error;
mod provider;
mod request;
mod response;

pub use error::*;
pub use provider::*;
pub use request::*;
pub use response::*;
