use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use pin_project_lite::pin_project;
use serde_json::Value;
use weather_agent_model::{
    ErrorKind, ModelFinishReason, ModelResponse, ModelResponseEvent,
    ToolCallRequest,
};

use crate::Error;
use crate::io::Sse;
use crate::proto::{ChatCompletionChunk, FunctionCall, ToolCall};

/// Decoding state that travels through each pull future.
struct StreamState {
    sse: Sse,
    // Tool calls arrive in fragments and are only emitted once the server
    // reports a finish reason (or the stream ends).
    tool_calls: Vec<ToolCall>,
    completed: bool,
    exhausted: bool,
}

impl StreamState {
    fn merge_tool_calls(&mut self, fragments: Vec<ToolCall>) {
        for fragment in fragments {
            let existing = match fragment.index {
                Some(index) => self
                    .tool_calls
                    .iter_mut()
                    .find(|call| call.index == Some(index)),
                // Without an index every fragment is a complete call.
                None => None,
            };
            let Some(call) = existing else {
                self.tool_calls.push(fragment);
                continue;
            };

            if call.id.is_none() {
                call.id = fragment.id;
            }
            if call.r#type.is_none() {
                call.r#type = fragment.r#type;
            }
            let Some(function) = fragment.function else {
                continue;
            };
            let partial = call.function.get_or_insert_default();
            if let Some(name) = function.name {
                partial.name.get_or_insert_default().push_str(&name);
            }
            if let Some(arguments) = function.arguments {
                partial
                    .arguments
                    .get_or_insert_default()
                    .push_str(&arguments);
            }
        }
    }

    /// Emits the collected tool calls followed by the completion event.
    fn complete(
        &mut self,
        finish_reason: Option<&str>,
    ) -> Vec<ModelResponseEvent> {
        if self.completed {
            return vec![];
        }
        self.completed = true;

        let mut events = self
            .tool_calls
            .drain(..)
            .enumerate()
            .map(|(idx, call)| {
                ModelResponseEvent::ToolCall(convert_tool_call(idx, call))
            })
            .collect::<Vec<_>>();
        let has_tool_calls = !events.is_empty();
        let reason = match finish_reason {
            Some("tool_calls") => ModelFinishReason::ToolCalls,
            Some(_) => ModelFinishReason::Stop,
            None if has_tool_calls => ModelFinishReason::ToolCalls,
            None => ModelFinishReason::Stop,
        };
        events.push(ModelResponseEvent::Completed(reason));
        events
    }
}

fn convert_tool_call(idx: usize, call: ToolCall) -> ToolCallRequest {
    let id = call.id.unwrap_or_else(|| format!("call_{idx}"));
    let FunctionCall { name, arguments } = call.function.unwrap_or_default();
    let arguments = match arguments.as_deref().map(str::trim) {
        None | Some("") => Value::Object(Default::default()),
        Some(raw) => serde_json::from_str(raw).unwrap_or_else(|err| {
            warn!("tool call ({id}) has malformed arguments: {err}");
            Value::Null
        }),
    };
    ToolCallRequest {
        id,
        name: name.unwrap_or_default(),
        arguments,
    }
}

type PinnedFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;
type Pulled = (Result<Vec<ModelResponseEvent>, Error>, StreamState);

pin_project! {
    /// A streaming chat-completion response.
    pub struct OpenAIResponse {
        pending: VecDeque<ModelResponseEvent>,
        pull_fut: Option<PinnedFuture<Pulled>>,
    }
}

impl OpenAIResponse {
    pub(crate) fn from_sse(sse: Sse) -> Self {
        let state = StreamState {
            sse,
            tool_calls: vec![],
            completed: false,
            exhausted: false,
        };
        Self {
            pending: VecDeque::new(),
            pull_fut: Some(Box::pin(pull(state))),
        }
    }
}

impl ModelResponse for OpenAIResponse {
    type Error = crate::Error;

    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<ModelResponseEvent>, Self::Error>> {
        let this = self.project();
        loop {
            if let Some(event) = this.pending.pop_front() {
                return Poll::Ready(Ok(Some(event)));
            }
            let Some(pull_fut) = this.pull_fut.as_mut() else {
                return Poll::Ready(Ok(None));
            };

            let (result, state) = ready!(pull_fut.as_mut().poll(cx));
            *this.pull_fut = None;
            this.pending.extend(result?);
            if !state.exhausted {
                *this.pull_fut = Some(Box::pin(pull(state)));
            }
        }
    }
}

async fn pull(mut state: StreamState) -> Pulled {
    let result = pull_events(&mut state).await;
    if result.is_err() {
        state.exhausted = true;
    }
    (result, state)
}

/// Reads one SSE payload and turns it into zero or more model events.
async fn pull_events(
    state: &mut StreamState,
) -> Result<Vec<ModelResponseEvent>, Error> {
    let payload = match state.sse.next_event().await {
        Ok(Some(payload)) => payload,
        Ok(None) => {
            state.exhausted = true;
            return Ok(state.complete(None));
        }
        Err(err) => {
            return Err(Error::new(format!("{err:?}"), ErrorKind::Other));
        }
    };
    trace!("got sse event: {payload}");
    if payload.trim() == "[DONE]" {
        state.exhausted = true;
        return Ok(state.complete(None));
    }

    let chunk = serde_json::from_str::<ChatCompletionChunk>(&payload)
        .map_err(|err| Error::new(format!("{err}"), ErrorKind::Other))?;
    let Some(choice) = chunk.choices.into_iter().next() else {
        // Usage-only chunks carry no choices.
        return Ok(vec![]);
    };

    let mut events = vec![];
    if let Some(content) = choice.delta.content {
        if !content.is_empty() {
            events.push(ModelResponseEvent::MessageDelta(content));
        }
    }
    if let Some(tool_calls) = choice.delta.tool_calls {
        state.merge_tool_calls(tool_calls);
    }
    if let Some(finish_reason) = choice.finish_reason.as_deref() {
        events.extend(state.complete(Some(finish_reason)));
    }
    Ok(events)
}
