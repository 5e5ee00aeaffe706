//! Sends one query at a time to an agent runtime and extracts the answer.

use std::time::Duration;

use tokio::time::timeout;
use weather_agent_core::{
    AgentRuntime, Content, Event, EventStream, RunError, SessionContext,
};

/// Reported when a turn ends without a usable final event.
pub const FALLBACK_RESPONSE: &str = "Agent did not produce a final response.";

/// Used when an escalation carries no message.
pub const NO_ESCALATION_MESSAGE: &str = "No specific message.";

/// Options for a [`ConversationDriver`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DriverConfig {
    /// Upper bound for a whole turn.
    ///
    /// With `None`, a runtime that stalls without a final event blocks the
    /// turn forever. With `Some`, the turn gives up when the bound elapses
    /// and reports [`FALLBACK_RESPONSE`].
    pub turn_timeout: Option<Duration>,
}

/// A query and the answer it got.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConversationTurn {
    /// The user query.
    pub query: String,
    /// The text extracted from the final event.
    pub final_response_text: String,
}

/// Runs conversation turns against one session.
pub struct ConversationDriver<'a> {
    runtime: &'a dyn AgentRuntime,
    session: SessionContext,
    config: DriverConfig,
}

impl<'a> ConversationDriver<'a> {
    /// Creates a driver with the default [`DriverConfig`].
    #[inline]
    pub fn new(runtime: &'a dyn AgentRuntime, session: SessionContext) -> Self {
        Self {
            runtime,
            session,
            config: DriverConfig::default(),
        }
    }

    /// Replaces the driver configuration.
    #[inline]
    pub fn with_config(mut self, config: DriverConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the session the driver talks in.
    #[inline]
    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Sends `query` to the runtime and waits for the final event.
    ///
    /// Events after the final one are never read: the stream is dropped as
    /// soon as the final event arrives. The query and the extracted answer
    /// are printed to stdout.
    pub async fn run_turn(
        &self,
        query: &str,
    ) -> Result<ConversationTurn, RunError> {
        println!("\n>>>User Query: {query}");

        let mut events = self.runtime.run(
            &self.session.user_id,
            &self.session.session_id,
            Content::user_text(query),
        );
        let final_event = match self.config.turn_timeout {
            None => wait_for_final(&mut events).await?,
            Some(limit) => {
                match timeout(limit, wait_for_final(&mut events)).await {
                    Ok(result) => result?,
                    Err(_) => {
                        warn!("no final response within {limit:?}");
                        None
                    }
                }
            }
        };
        drop(events);

        let final_response_text = final_response_text(final_event.as_ref());
        println!("<<< Agent Response: {final_response_text}");
        Ok(ConversationTurn {
            query: query.to_owned(),
            final_response_text,
        })
    }
}

async fn wait_for_final(
    events: &mut EventStream,
) -> Result<Option<Event>, RunError> {
    while let Some(event) = events.next().await {
        let event = event?;
        if event.is_final_response() {
            return Ok(Some(event));
        }
        trace!("skipped intermediate event {}", event.id);
    }
    debug!("event stream ended without a final response");
    Ok(None)
}

/// Extracts the text to show for a turn's final event.
///
/// Content wins over escalation: the first part's text is used. If that part
/// is not text the result is an empty string, never a placeholder like
/// `None`.
pub fn final_response_text(event: Option<&Event>) -> String {
    let Some(event) = event else {
        return FALLBACK_RESPONSE.to_owned();
    };
    if let Some(content) = &event.content {
        if let Some(first) = content.parts.first() {
            return first.as_text().unwrap_or_default().to_owned();
        }
    }
    if event.actions.escalate {
        let message = event
            .error_message
            .as_deref()
            .filter(|message| !message.is_empty())
            .unwrap_or(NO_ESCALATION_MESSAGE);
        return format!("Agent escalated: {message}");
    }
    FALLBACK_RESPONSE.to_owned()
}
