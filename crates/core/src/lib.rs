//! A small agent runtime: sessions, tools, and the runner that turns one
//! user message into an ordered stream of events.
//!
//! The runtime is narrow. A [`Runner`] owns one [`Agent`]
//! (instruction, tools, model) and a [`SessionService`]; each call to
//! [`AgentRuntime::run`] loads the session, alternates model calls and tool
//! calls until the model answers in plain text, and reports every step as
//! an [`Event`] on the returned [`EventStream`].

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod agent;
pub mod content;
mod error;
pub mod event;
mod model_client;
mod runner;
pub mod session;
pub mod tool;

pub use agent::{Agent, AgentBuilder};
pub use content::{Content, Part, Role};
pub use error::{RunError, SessionError};
pub use event::{Event, EventActions, EventStream};
pub use runner::{AgentRuntime, RunConfig, Runner};
pub use session::{
    InMemorySessionService, Session, SessionContext, SessionService,
};
