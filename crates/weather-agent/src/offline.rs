//! A keyword-driven stand-in for a real model, used when no API key is
//! available.
//!
//! It understands just enough to exercise the weather tool: a query that
//! names a city after "in" or "about" triggers a `get_weather` call, and the
//! tool result is turned into the answer.

use std::future::ready;

use serde_json::{Value, json};
use weather_agent_mock_model::{Error, PresetEvent, ReplayResponse};
use weather_agent_model::{
    ErrorKind, ModelMessage, ModelProvider, ModelRequest, ToolCallRequest,
    ToolCallResult,
};

use crate::tools::{GET_WEATHER, WeatherRecord};

const CITY_MARKERS: [&str; 2] = [" in ", " about "];
const ASK_FOR_CITY: &str =
    "Which city would you like the weather for? Try asking about London.";

/// A local model that answers weather questions by keyword matching.
#[derive(Clone, Debug, Default)]
pub struct OfflineModelProvider;

impl OfflineModelProvider {
    fn respond(&self, req: &ModelRequest) -> Result<Vec<PresetEvent>, Error> {
        match req.last_turn_message() {
            Some(ModelMessage::User(query)) => {
                let city = extract_city(query)
                    .filter(|_| req.has_tool(GET_WEATHER));
                let Some(city) = city else {
                    return Ok(text_events(ASK_FOR_CITY));
                };
                debug!("offline model picked city {city:?}");
                Ok(vec![PresetEvent::ToolCall(ToolCallRequest {
                    id: format!("call_{}", req.messages.len()),
                    name: GET_WEATHER.to_owned(),
                    arguments: json!({ "city": city }),
                })])
            }
            Some(ModelMessage::Tool(result)) if result.name == GET_WEATHER => {
                Ok(text_events(&describe_tool_result(result)?))
            }
            _ => Ok(text_events(ASK_FOR_CITY)),
        }
    }
}

impl ModelProvider for OfflineModelProvider {
    type Error = Error;
    type Response = ReplayResponse;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send + 'static
    {
        let resp = match self.respond(req) {
            Ok(events) => ReplayResponse::new(events),
            Err(err) => ReplayResponse::failure(err),
        };
        ready(Ok(resp))
    }
}

/// Returns the words after the last "in" or "about", without trailing
/// punctuation.
fn extract_city(query: &str) -> Option<&str> {
    // ASCII lowercasing keeps byte offsets intact.
    let lowered = query.to_ascii_lowercase();
    let (start, marker) = CITY_MARKERS
        .iter()
        .filter_map(|marker| lowered.rfind(marker).map(|idx| (idx, marker)))
        .max_by_key(|(idx, _)| *idx)?;
    let city = query[start + marker.len()..]
        .trim()
        .trim_end_matches(['?', '.', '!'])
        .trim_end();
    (!city.is_empty()).then_some(city)
}

fn describe_tool_result(result: &ToolCallResult) -> Result<String, Error> {
    let value: Value = serde_json::from_str(&result.content).map_err(|err| {
        Error::new(format!("malformed tool result: {err}"), ErrorKind::Other)
    })?;
    if let Some(reason) = value.get("error").and_then(Value::as_str) {
        return Ok(format!("I couldn't check the weather: {reason}"));
    }
    let record: WeatherRecord = serde_json::from_value(value).map_err(|err| {
        Error::new(format!("unexpected tool result: {err}"), ErrorKind::Other)
    })?;
    Ok(match record {
        WeatherRecord::Success { report } => report,
        WeatherRecord::Error { error_message } => error_message,
    })
}

fn text_events(text: &str) -> Vec<PresetEvent> {
    text.split_inclusive(' ')
        .map(|word| PresetEvent::MessageDelta(word.to_owned()))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::future::poll_fn;
    use std::pin::pin;

    use weather_agent_model::{
        AssistantMessage, ModelProviderError, ModelResponse,
        ModelResponseEvent, ModelTool,
    };

    use super::*;

    fn weather_tool() -> ModelTool {
        ModelTool {
            name: GET_WEATHER.to_owned(),
            description: "Retrieves the weather".to_owned(),
            parameters: json!({ "type": "object" }),
            response: None,
        }
    }

    async fn collect(
        req: &ModelRequest,
    ) -> Result<(String, Vec<ToolCallRequest>), Error> {
        let resp = OfflineModelProvider.send_request(req).await?;
        let mut resp = pin!(resp);
        let mut text = String::new();
        let mut tool_calls = vec![];
        while let Some(event) =
            poll_fn(|cx| resp.as_mut().poll_next_event(cx)).await?
        {
            match event {
                ModelResponseEvent::MessageDelta(delta) => {
                    text.push_str(&delta)
                }
                ModelResponseEvent::ToolCall(req) => tool_calls.push(req),
                ModelResponseEvent::Completed(_) => {}
            }
        }
        Ok((text, tool_calls))
    }

    #[test]
    fn test_extract_city() {
        assert_eq!(
            extract_city("What is the weather like in London?"),
            Some("London")
        );
        assert_eq!(extract_city("How about Paris?"), Some("Paris"));
        assert_eq!(
            extract_city("Tell me the weather in New York"),
            Some("New York")
        );
        assert_eq!(
            extract_city("Is it raining IN tokyo right now?"),
            Some("tokyo right now")
        );
        assert_eq!(extract_city("What about ?"), None);
        assert_eq!(extract_city("Hello"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_requests_weather_tool() {
        let req = ModelRequest {
            messages: vec![
                ModelMessage::System("Be helpful.".to_owned()),
                ModelMessage::User("How about Paris?".to_owned()),
            ],
            tools: vec![weather_tool()],
        };
        let (text, tool_calls) = collect(&req).await.unwrap();
        assert!(text.is_empty());
        assert_eq!(tool_calls.len(), 1);
        assert_eq!(tool_calls[0].name, "get_weather");
        assert_eq!(tool_calls[0].arguments, json!({ "city": "Paris" }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_asks_for_city_without_tool() {
        let req = ModelRequest {
            messages: vec![ModelMessage::User("How about Paris?".to_owned())],
            tools: vec![],
        };
        let (text, tool_calls) = collect(&req).await.unwrap();
        assert_eq!(text, ASK_FOR_CITY);
        assert!(tool_calls.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_phrases_tool_result() {
        let mut req = ModelRequest {
            messages: vec![
                ModelMessage::User("How about Paris?".to_owned()),
                ModelMessage::Assistant(AssistantMessage::default()),
            ],
            tools: vec![weather_tool()],
        };
        let cases = [
            (
                r#"{"status":"success","report":"Sunny"}"#,
                "Sunny".to_owned(),
            ),
            (
                r#"{"status":"error","error_message":"Sorry, no data"}"#,
                "Sorry, no data".to_owned(),
            ),
            (
                r#"{"error":"Tool `get_weather` is not available"}"#,
                "I couldn't check the weather: Tool `get_weather` is not \
                 available"
                    .to_owned(),
            ),
        ];
        for (content, expected) in cases {
            req.messages.push(ModelMessage::Tool(ToolCallResult {
                id: "call_2".to_owned(),
                name: GET_WEATHER.to_owned(),
                content: content.to_owned(),
            }));
            let (text, _) = collect(&req).await.unwrap();
            assert_eq!(text, expected);
            req.messages.pop();
        }

        req.messages.push(ModelMessage::Tool(ToolCallResult {
            id: "call_2".to_owned(),
            name: GET_WEATHER.to_owned(),
            content: "not json".to_owned(),
        }));
        let err = collect(&req).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Other);
        assert!(err.message().starts_with("malformed tool result"));
    }
}
