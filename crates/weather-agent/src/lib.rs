//! A weather agent that answers questions about a few cities with a mock
//! lookup tool.
//!
//! The crate can be used as a library: [`tools::GetWeatherTool`] plugs into
//! any [`weather_agent_core`] agent, and [`ConversationDriver`] runs turns
//! against any [`AgentRuntime`](weather_agent_core::AgentRuntime).

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

pub mod app;
pub mod config;
pub mod driver;
pub mod offline;
pub mod tools;

pub use config::{Config, ConfigError, ModelBackend};
pub use driver::{ConversationDriver, ConversationTurn, DriverConfig};

/// Re-exports of [`weather_agent_core`] crate.
pub mod core {
    pub use weather_agent_core::*;
}
