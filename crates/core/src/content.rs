//! Messages exchanged between the user, the agent and its tools.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Who produced a [`Content`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user, or tool results reported back to the model.
    User,
    /// The language model.
    Model,
}

/// A tool invocation requested by the model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Identifier pairing the call with its response.
    pub id: String,
    /// Name of the tool to invoke.
    pub name: String,
    /// Arguments object for the tool.
    pub args: Value,
}

/// The value a tool returned for a [`FunctionCall`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionResponse {
    /// Identifier of the call this answers.
    pub id: String,
    /// Name of the tool that ran.
    pub name: String,
    /// The tool's result, or an `{"error": …}` object.
    pub response: Value,
}

/// One piece of a [`Content`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Part {
    /// Plain text.
    Text(String),
    /// A tool call request.
    FunctionCall(FunctionCall),
    /// A tool call result.
    FunctionResponse(FunctionResponse),
}

impl Part {
    /// Returns the text of a text part.
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Part::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// A message with a role and ordered parts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    /// The producer of this message.
    pub role: Role,
    /// The parts, in order.
    pub parts: Vec<Part>,
}

impl Content {
    /// Creates a user message with a single text part.
    #[inline]
    pub fn user_text<S: Into<String>>(text: S) -> Self {
        Self {
            role: Role::User,
            parts: vec![Part::Text(text.into())],
        }
    }

    /// Concatenates all text parts.
    pub fn text(&self) -> String {
        self.parts.iter().filter_map(Part::as_text).collect()
    }

    /// Iterates over the tool call requests.
    pub fn function_calls(&self) -> impl Iterator<Item = &FunctionCall> {
        self.parts.iter().filter_map(|part| match part {
            Part::FunctionCall(call) => Some(call),
            _ => None,
        })
    }

    /// Iterates over the tool call results.
    pub fn function_responses(
        &self,
    ) -> impl Iterator<Item = &FunctionResponse> {
        self.parts.iter().filter_map(|part| match part {
            Part::FunctionResponse(resp) => Some(resp),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_part_accessors() {
        let content = Content {
            role: Role::Model,
            parts: vec![
                Part::Text("Checking ".to_owned()),
                Part::FunctionCall(FunctionCall {
                    id: "call:0".to_owned(),
                    name: "get_weather".to_owned(),
                    args: json!({ "city": "Tokyo" }),
                }),
                Part::Text("now.".to_owned()),
            ],
        };
        assert_eq!(content.text(), "Checking now.");
        assert_eq!(content.function_calls().count(), 1);
        assert_eq!(content.function_responses().count(), 0);
        assert_eq!(content.parts[1].as_text(), None);
    }

    #[test]
    fn test_serialized_shape() {
        let value = serde_json::to_value(Content::user_text("Hi")).unwrap();
        assert_eq!(value, json!({ "role": "user", "parts": [{ "text": "Hi" }] }));
    }
}
