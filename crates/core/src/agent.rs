mod builder;
#[cfg(test)]
mod tests;

use weather_agent_model::{
    AssistantMessage, ModelMessage, ModelRequest, ModelTool, ToolCallRequest,
    ToolCallResult,
};

use crate::content::{Content, Part, Role};
use crate::event::Event;
use crate::model_client::ModelClient;
use crate::tool::ToolRegistry;
pub use builder::AgentBuilder;

/// An agent definition: who it is, how it should behave, which tools it may
/// call and which model drives it.
///
/// An agent holds no conversation state. Everything it needs for a model
/// request is derived from the session history it is given.
pub struct Agent {
    name: String,
    description: String,
    instruction: String,
    tools: ToolRegistry,
    model_client: ModelClient,
}

impl Agent {
    /// Returns the name of the agent, used as the author of its events.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description of the agent.
    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the system instruction of the agent.
    #[inline]
    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    /// Returns the definitions of the registered tools.
    #[inline]
    pub fn tool_definitions(&self) -> Vec<ModelTool> {
        self.tools.definitions()
    }

    #[inline]
    pub(crate) fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    #[inline]
    pub(crate) fn model_client(&self) -> &ModelClient {
        &self.model_client
    }

    /// Builds the next model request from the session history.
    ///
    /// Partial events and events without content are not part of the
    /// conversation and are skipped.
    pub(crate) fn build_model_request(
        &self,
        history: &[Event],
    ) -> ModelRequest {
        let mut messages = Vec::with_capacity(history.len() + 1);
        if !self.instruction.is_empty() {
            messages.push(ModelMessage::System(self.instruction.clone()));
        }

        for event in history.iter().filter(|event| !event.partial) {
            let Some(content) = &event.content else {
                continue;
            };
            match content.role {
                Role::User => push_user_content(&mut messages, content),
                Role::Model => push_model_content(&mut messages, content),
            }
        }

        ModelRequest {
            messages,
            tools: self.tools.definitions(),
        }
    }
}

fn push_user_content(messages: &mut Vec<ModelMessage>, content: &Content) {
    let text = content.text();
    if !text.is_empty() {
        messages.push(ModelMessage::User(text));
    }
    for resp in content.function_responses() {
        messages.push(ModelMessage::Tool(ToolCallResult {
            id: resp.id.clone(),
            name: resp.name.clone(),
            content: resp.response.to_string(),
        }));
    }
}

fn push_model_content(messages: &mut Vec<ModelMessage>, content: &Content) {
    let text = content.text();
    let tool_calls: Vec<_> = content
        .parts
        .iter()
        .filter_map(|part| match part {
            Part::FunctionCall(call) => Some(ToolCallRequest {
                id: call.id.clone(),
                name: call.name.clone(),
                arguments: call.args.clone(),
            }),
            _ => None,
        })
        .collect();
    if text.is_empty() && tool_calls.is_empty() {
        return;
    }
    messages.push(ModelMessage::Assistant(AssistantMessage {
        text: (!text.is_empty()).then_some(text),
        tool_calls,
    }));
}
