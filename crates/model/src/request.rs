use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::response::ToolCallRequest;

/// A request to be sent to the model provider.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelRequest {
    /// The input messages, oldest first.
    pub messages: Vec<ModelMessage>,
    /// Tools that are available to the model.
    pub tools: Vec<ModelTool>,
}

impl ModelRequest {
    /// Returns the latest message that is not a system instruction.
    #[inline]
    pub fn last_turn_message(&self) -> Option<&ModelMessage> {
        self.messages
            .iter()
            .rev()
            .find(|msg| !matches!(msg, ModelMessage::System(_)))
    }

    /// Returns whether a tool with the given name is offered to the model.
    #[inline]
    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.iter().any(|tool| tool.name == name)
    }
}

/// A complete message in the conversation history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ModelMessage {
    /// The system instructions.
    System(String),
    /// A user input text.
    User(String),
    /// A previous reply from the model.
    Assistant(AssistantMessage),
    /// A tool call result.
    Tool(ToolCallResult),
}

/// A previous reply from the model, possibly requesting tools.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AssistantMessage {
    /// The text the model generated, if any.
    pub text: Option<String>,
    /// The tool calls the model requested, in order.
    pub tool_calls: Vec<ToolCallRequest>,
}

/// The result of calling a tool.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToolCallResult {
    /// The identifier of the tool call request this answers.
    pub id: String,
    /// The name of the tool that was called.
    pub name: String,
    /// The serialized result of the tool call.
    pub content: String,
}

/// Describes a tool that can be used by the model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelTool {
    /// Name of the tool.
    pub name: String,
    /// Description of the tool.
    pub description: String,
    /// Parameters definition of the tool.
    ///
    /// For most model providers, the parameters should be defined by a
    /// [JSON schema](https://json-schema.org/).
    pub parameters: Value,
    /// Schema of the value the tool returns, for providers that can use it.
    pub response: Option<Value>,
}
