use serde_json::json;
use weather_agent_model::{ModelTool, ToolCallRequest};

use crate::content::FunctionResponse;
use crate::tool::object::{ToolObject, ToolObjectImpl};
use crate::tool::{Error, Tool, ToolResult};

/// The toolset of an agent, in registration order.
#[derive(Default)]
pub(crate) struct ToolRegistry {
    tools: Vec<Box<dyn ToolObject>>,
}

impl ToolRegistry {
    /// Registers a tool, replacing any tool with the same name.
    pub fn add_tool<T: Tool>(&mut self, tool: T) {
        let tool: Box<dyn ToolObject> = Box::new(ToolObjectImpl(tool));
        let name = &tool.descriptor().name;
        match self.tools.iter().position(|t| &t.descriptor().name == name) {
            Some(idx) => {
                warn!("tool {name} registered twice, keeping the latest");
                self.tools[idx] = tool;
            }
            None => self.tools.push(tool),
        }
    }

    pub fn definitions(&self) -> Vec<ModelTool> {
        self.tools
            .iter()
            .map(|tool| {
                let descriptor = tool.descriptor();
                ModelTool {
                    name: descriptor.name.clone(),
                    description: descriptor.description.clone(),
                    parameters: descriptor.parameters.clone(),
                    response: descriptor.response.clone(),
                }
            })
            .collect()
    }

    /// Runs the requested tool and packs its result for the model.
    ///
    /// Failures are reported as an `{"error": reason}` object, so that the
    /// model can recover from them.
    pub async fn call(&self, req: &ToolCallRequest) -> FunctionResponse {
        let result = match self.find(&req.name) {
            Some(tool) => {
                trace!(
                    "calling tool {} ({}): {:?}",
                    req.name, req.id, req.arguments
                );
                tool.execute(req.arguments.clone()).await
            }
            None => {
                warn!("tool not found: {}", req.name);
                Err(Error::not_found().with_reason(format!(
                    "Tool `{}` is not available",
                    req.name
                )))
            }
        };
        FunctionResponse {
            id: req.id.clone(),
            name: req.name.clone(),
            response: into_response(result),
        }
    }

    fn find(&self, name: &str) -> Option<&dyn ToolObject> {
        self.tools
            .iter()
            .find(|tool| tool.descriptor().name == name)
            .map(|tool| tool.as_ref())
    }
}

fn into_response(result: ToolResult) -> serde_json::Value {
    match result {
        Ok(value) => value,
        Err(err) => {
            debug!("tool call failed: {err}");
            json!({ "error": err.reason() })
        }
    }
}
