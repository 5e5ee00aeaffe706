//! Events emitted while an agent handles one user message.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::stream::{self, BoxStream, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::content::{Content, FunctionCall, FunctionResponse};
use crate::error::RunError;

/// Side effects an event asks its consumer to apply.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventActions {
    /// The agent cannot proceed and hands control back to the caller.
    pub escalate: bool,
}

/// A step in a run: user input, a model reply, tool results, or a failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier of this event.
    pub id: String,
    /// Identifier shared by all events of the same run.
    pub invocation_id: String,
    /// `"user"` or the name of the agent that produced the event.
    pub author: String,
    /// The message carried by this event, if any.
    pub content: Option<Content>,
    /// Actions attached to this event.
    pub actions: EventActions,
    /// Whether this is a streamed fragment of a later complete event.
    pub partial: bool,
    /// Machine-readable failure code.
    pub error_code: Option<String>,
    /// Human-readable failure message.
    pub error_message: Option<String>,
}

impl Event {
    /// Creates an empty event with a fresh identifier.
    pub fn new<S1: Into<String>, S2: Into<String>>(
        invocation_id: S1,
        author: S2,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            invocation_id: invocation_id.into(),
            author: author.into(),
            content: None,
            actions: EventActions::default(),
            partial: false,
            error_code: None,
            error_message: None,
        }
    }

    /// Attaches content to the event.
    #[inline]
    pub fn with_content(mut self, content: Content) -> Self {
        self.content = Some(content);
        self
    }

    /// Marks the event as a streamed fragment.
    #[inline]
    pub fn into_partial(mut self) -> Self {
        self.partial = true;
        self
    }

    /// Turns the event into an escalation carrying the given failure.
    #[inline]
    pub fn with_escalation<S: Into<String>>(
        mut self,
        error_code: Option<&str>,
        error_message: S,
    ) -> Self {
        self.actions.escalate = true;
        self.error_code = error_code.map(ToOwned::to_owned);
        self.error_message = Some(error_message.into());
        self
    }

    /// Iterates over the tool call requests in this event.
    pub fn function_calls(&self) -> impl Iterator<Item = &FunctionCall> {
        self.content.iter().flat_map(Content::function_calls)
    }

    /// Iterates over the tool call results in this event.
    pub fn function_responses(
        &self,
    ) -> impl Iterator<Item = &FunctionResponse> {
        self.content.iter().flat_map(Content::function_responses)
    }

    /// Returns whether this event concludes the run it belongs to.
    ///
    /// Partial fragments, tool call requests and tool results are always
    /// followed by more events; anything else is the final response.
    pub fn is_final_response(&self) -> bool {
        !self.partial
            && self.function_calls().next().is_none()
            && self.function_responses().next().is_none()
    }
}

/// The ordered events of one run.
///
/// The stream may be infinite, so consumers decide when to stop reading.
/// Dropping the stream abandons the rest of the run.
pub struct EventStream {
    inner: BoxStream<'static, Result<Event, RunError>>,
}

impl EventStream {
    /// Wraps an arbitrary stream of events.
    #[inline]
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<Event, RunError>> + Send + 'static,
    {
        Self {
            inner: stream.boxed(),
        }
    }

    /// Creates a finite stream that yields the given events.
    pub fn from_events<I>(events: I) -> Self
    where
        I: IntoIterator<Item = Event>,
        I::IntoIter: Send + 'static,
    {
        Self::new(stream::iter(events.into_iter().map(Ok)))
    }

    /// Creates a stream that never yields anything.
    #[inline]
    pub fn pending() -> Self {
        Self::new(stream::pending())
    }

    /// Creates a stream fed by a producer task, which is aborted when the
    /// stream is dropped.
    pub(crate) fn from_channel(
        event_rx: mpsc::UnboundedReceiver<Result<Event, RunError>>,
        producer: JoinHandle<()>,
    ) -> Self {
        let state = (event_rx, AbortOnDrop(producer));
        Self::new(stream::unfold(state, |(mut event_rx, producer)| async move {
            let item = event_rx.recv().await?;
            Some((item, (event_rx, producer)))
        }))
    }

    /// Waits for the next event, or `None` once the run has ended.
    #[inline]
    pub async fn next(&mut self) -> Option<Result<Event, RunError>> {
        self.inner.next().await
    }
}

impl Stream for EventStream {
    type Item = Result<Event, RunError>;

    #[inline]
    fn poll_next(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

struct AbortOnDrop(JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}
