use std::collections::VecDeque;
use std::error::Error as StdError;
use std::fmt::{self, Display, Formatter};
use std::pin::Pin;
use std::task::{Context, Poll, ready};
use std::time::Duration;

use tokio::time::{Sleep, sleep};
use weather_agent_model::{
    ErrorKind, ModelFinishReason, ModelProviderError, ModelResponse,
    ModelResponseEvent,
};

use crate::PresetEvent;

const DEFAULT_DELAY: Duration = Duration::from_millis(1);

/// The error type of the local models.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Error {
    /// Creates an error with the given message and kind.
    #[inline]
    pub fn new<S: Into<String>>(message: S, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for Error {}

impl ModelProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// A response that replays events decided ahead of time.
///
/// Each event is delivered after a short delay so that consumers observe
/// a real suspension point between events. A `Completed` event is appended
/// automatically, with the finish reason inferred from whether any tool
/// call was replayed.
#[derive(Debug)]
pub struct ReplayResponse {
    events: VecDeque<Result<ModelResponseEvent, Error>>,
    delay: Duration,
    sleep: Option<Pin<Box<Sleep>>>,
    finished: bool,
}

impl ReplayResponse {
    /// Creates a response from preset events.
    pub fn new<I: IntoIterator<Item = PresetEvent>>(events: I) -> Self {
        let mut replayed = VecDeque::new();
        let mut has_tool_call = false;
        for event in events {
            match event {
                PresetEvent::MessageDelta(delta) => {
                    replayed.push_back(Ok(ModelResponseEvent::MessageDelta(delta)))
                }
                PresetEvent::ToolCall(req) => {
                    has_tool_call = true;
                    replayed.push_back(Ok(ModelResponseEvent::ToolCall(req)));
                }
                PresetEvent::Error(message) => {
                    // Nothing after a failure is ever delivered.
                    replayed.push_back(Err(Error::new(message, ErrorKind::Other)));
                    return Self::from_queue(replayed);
                }
            }
        }
        replayed.push_back(Ok(ModelResponseEvent::Completed(if has_tool_call {
            ModelFinishReason::ToolCalls
        } else {
            ModelFinishReason::Stop
        })));
        Self::from_queue(replayed)
    }

    /// Creates a response that fails on the first poll.
    #[inline]
    pub fn failure(error: Error) -> Self {
        Self::from_queue(VecDeque::from([Err(error)]))
    }

    /// Sets the delay before each event.
    #[inline]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    #[inline]
    fn from_queue(events: VecDeque<Result<ModelResponseEvent, Error>>) -> Self {
        Self {
            events,
            delay: DEFAULT_DELAY,
            sleep: None,
            finished: false,
        }
    }
}

impl ModelResponse for ReplayResponse {
    type Error = Error;

    fn poll_next_event(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<ModelResponseEvent>, Self::Error>> {
        if self.finished {
            return Poll::Ready(Ok(None));
        }

        let delay = self.delay;
        let sleep = self.sleep.get_or_insert_with(|| Box::pin(sleep(delay)));
        ready!(sleep.as_mut().poll(cx));
        self.sleep = None;

        match self.events.pop_front() {
            Some(Ok(event)) => {
                trace!("replaying event: {event:?}");
                Poll::Ready(Ok(Some(event)))
            }
            Some(Err(err)) => {
                self.finished = true;
                Poll::Ready(Err(err))
            }
            None => {
                self.finished = true;
                Poll::Ready(Ok(None))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::future::poll_fn;

    use super::*;

    async fn next(
        resp: &mut ReplayResponse,
    ) -> Result<Option<ModelResponseEvent>, Error> {
        poll_fn(|cx| Pin::new(&mut *resp).poll_next_event(cx)).await
    }

    #[tokio::test(start_paused = true)]
    async fn test_appends_completion() {
        let mut resp = ReplayResponse::new([PresetEvent::MessageDelta(
            "Hello".to_owned(),
        )]);
        assert_eq!(
            next(&mut resp).await.unwrap(),
            Some(ModelResponseEvent::MessageDelta("Hello".to_owned()))
        );
        assert_eq!(
            next(&mut resp).await.unwrap(),
            Some(ModelResponseEvent::Completed(ModelFinishReason::Stop))
        );
        assert_eq!(next(&mut resp).await.unwrap(), None);
        assert_eq!(next(&mut resp).await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_after_error() {
        let mut resp = ReplayResponse::new([
            PresetEvent::Error("boom".to_owned()),
            PresetEvent::MessageDelta("never".to_owned()),
        ]);
        let err = next(&mut resp).await.unwrap_err();
        assert_eq!(err.message(), "boom");
        assert_eq!(err.kind(), ErrorKind::Other);
        assert_eq!(next(&mut resp).await.unwrap(), None);
    }
}
