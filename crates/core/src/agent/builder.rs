use weather_agent_model::ModelProvider;

use super::Agent;
use crate::model_client::ModelClient;
use crate::tool::{Tool, ToolRegistry};

/// [`Agent`] builder.
pub struct AgentBuilder {
    name: String,
    description: String,
    instruction: String,
    tools: ToolRegistry,
    model_client: ModelClient,
}

impl AgentBuilder {
    /// Creates a new builder with the specified model provider.
    #[inline]
    pub fn with_model_provider<P: ModelProvider + 'static>(
        provider: P,
    ) -> Self {
        Self {
            name: "agent".to_owned(),
            description: String::new(),
            instruction: String::new(),
            tools: ToolRegistry::default(),
            model_client: ModelClient::new(provider),
        }
    }

    /// Sets the name of the agent.
    #[inline]
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the description of the agent.
    #[inline]
    pub fn description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the system instruction sent with every model request.
    #[inline]
    pub fn instruction<S: Into<String>>(mut self, instruction: S) -> Self {
        self.instruction = instruction.into();
        self
    }

    /// Registers a tool.
    #[inline]
    pub fn with_tool<T: Tool>(mut self, tool: T) -> Self {
        self.tools.add_tool(tool);
        self
    }

    /// Builds the agent.
    #[inline]
    pub fn build(self) -> Agent {
        let Self {
            name,
            description,
            instruction,
            tools,
            model_client,
        } = self;
        debug!("built agent {name} with {} tools", tools.definitions().len());
        Agent {
            name,
            description,
            instruction,
            tools,
            model_client,
        }
    }
}
