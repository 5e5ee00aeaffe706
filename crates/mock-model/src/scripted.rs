use std::future::ready;
use std::time::Duration;

use weather_agent_model::{
    ErrorKind, ModelMessage, ModelProvider, ModelRequest,
};

use crate::{Error, PresetResponse, ReplayResponse};

#[derive(Clone, Debug)]
enum ConversationStep {
    UserInput,
    ToolResult,
    AssistantResponse(PresetResponse),
}

/// A local fake model for testing purpose.
///
/// Before sending requests, set up the conversation script, which is how
/// the model should respond to a request. A step is selected by the number
/// of non-system messages in the request, so a script mirrors the history
/// the runtime is expected to build: a user input step, an assistant step,
/// a tool result step, another assistant step, and so on. If the script has
/// no assistant step at that position, the response fails.
///
/// # Note
///
/// This type is not optimized for production use, the whole script is
/// cloned into each response. You should only use it for testing.
#[derive(Clone, Debug, Default)]
pub struct ScriptedModelProvider {
    conversation_script: Vec<ConversationStep>,
    delay: Option<Duration>,
}

impl ScriptedModelProvider {
    #[inline]
    pub fn add_user_input_step(&mut self) {
        self.conversation_script.push(ConversationStep::UserInput);
    }

    #[inline]
    pub fn add_tool_result_step(&mut self) {
        self.conversation_script.push(ConversationStep::ToolResult);
    }

    #[inline]
    pub fn add_assistant_response_step(&mut self, preset: PresetResponse) {
        self.conversation_script
            .push(ConversationStep::AssistantResponse(preset));
    }

    #[inline]
    pub fn set_delay(&mut self, duration: Duration) {
        self.delay = Some(duration);
    }

    fn respond(&self, req: &ModelRequest) -> ReplayResponse {
        let step_idx = req
            .messages
            .iter()
            .filter(|msg| !matches!(msg, ModelMessage::System(_)))
            .count();
        let resp = match self.conversation_script.get(step_idx) {
            Some(ConversationStep::AssistantResponse(preset)) => {
                ReplayResponse::new(preset.events.clone())
            }
            Some(step) => {
                debug!("step {step_idx} is {step:?}, not an assistant step");
                ReplayResponse::failure(Error::new(
                    "not an assistant response step",
                    ErrorKind::Other,
                ))
            }
            None => ReplayResponse::failure(Error::new(
                "not enough steps",
                ErrorKind::Other,
            )),
        };
        match self.delay {
            Some(delay) => resp.with_delay(delay),
            None => resp,
        }
    }
}

impl ModelProvider for ScriptedModelProvider {
    type Error = Error;
    type Response = ReplayResponse;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send + 'static
    {
        ready(Ok(self.respond(req)))
    }
}

#[cfg(test)]
mod tests {
    use std::future::poll_fn;
    use std::pin::pin;

    use serde_json::json;
    use weather_agent_model::{
        AssistantMessage, ModelProviderError, ModelResponse,
        ModelResponseEvent, ModelTool, ToolCallRequest, ToolCallResult,
    };

    use super::*;
    use crate::PresetEvent;

    async fn collect_response(
        resp: ReplayResponse,
    ) -> Result<(String, Option<ToolCallRequest>), Error> {
        let mut resp = pin!(resp);
        let mut msg = String::new();
        let mut tool_call = None;
        loop {
            let Some(event) =
                poll_fn(|cx| resp.as_mut().poll_next_event(cx)).await?
            else {
                break;
            };
            match event {
                ModelResponseEvent::Completed(_) => break,
                ModelResponseEvent::MessageDelta(delta) => {
                    msg.push_str(&delta);
                }
                ModelResponseEvent::ToolCall(req) => tool_call = Some(req),
            }
        }
        Ok((msg, tool_call))
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_request() {
        let mut provider = ScriptedModelProvider::default();
        provider.add_user_input_step();
        provider.add_assistant_response_step(PresetResponse::with_events([
            PresetEvent::MessageDelta("Let me check. ".to_owned()),
            PresetEvent::ToolCall(ToolCallRequest {
                id: "call:1".to_owned(),
                name: "get_weather".to_owned(),
                arguments: json!({ "city": "London" }),
            }),
        ]));
        provider.add_tool_result_step();
        provider.add_assistant_response_step(PresetResponse::text(
            "It's cloudy in London.",
        ));

        let mut req = ModelRequest {
            messages: vec![
                ModelMessage::System("You are a weather agent.".to_owned()),
                ModelMessage::User("Weather in London?".to_owned()),
            ],
            tools: vec![ModelTool {
                name: "get_weather".to_owned(),
                description: "Retrieves the weather report".to_owned(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "city": { "type": "string" }
                    }
                }),
                response: None,
            }],
        };
        let resp = provider.send_request(&req).await.unwrap();
        let (msg, tool_call) = collect_response(resp).await.unwrap();
        assert_eq!(msg, "Let me check. ");
        let tool_call = tool_call.unwrap();
        assert_eq!(tool_call.name, "get_weather");
        assert_eq!(tool_call.arguments, json!({ "city": "London" }));

        req.messages.push(ModelMessage::Assistant(AssistantMessage {
            text: Some(msg),
            tool_calls: vec![tool_call],
        }));
        req.messages.push(ModelMessage::Tool(ToolCallResult {
            id: "call:1".to_owned(),
            name: "get_weather".to_owned(),
            content: r#"{"status":"success"}"#.to_owned(),
        }));
        let resp = provider.send_request(&req).await.unwrap();
        let (msg, tool_call) = collect_response(resp).await.unwrap();
        assert_eq!(msg, "It's cloudy in London.");
        assert!(tool_call.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_script_exhausted() {
        let provider = ScriptedModelProvider::default();
        let req = ModelRequest {
            messages: vec![ModelMessage::User("Hi".to_owned())],
            tools: vec![],
        };
        let resp = provider.send_request(&req).await.unwrap();
        let err = collect_response(resp).await.unwrap_err();
        assert_eq!(err.message(), "not enough steps");
        assert_eq!(err.kind(), ErrorKind::Other);
    }
}
