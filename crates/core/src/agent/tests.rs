use std::future::ready;
use std::sync::LazyLock;

use serde_json::json;
use weather_agent_mock_model::ScriptedModelProvider;
use weather_agent_model::{
    AssistantMessage, ModelMessage, ToolCallRequest, ToolCallResult,
};

use crate::content::{FunctionCall, FunctionResponse};
use crate::tool::{Tool, ToolDescriptor, ToolResult};
use crate::{AgentBuilder, Content, Event, Part, Role};

static LOOKUP_DESCRIPTOR: LazyLock<ToolDescriptor> =
    LazyLock::new(|| ToolDescriptor {
        name: "get_weather".to_owned(),
        description: "Retrieves the weather report for a city".to_owned(),
        parameters: json!({ "type": "object" }),
        response: Some(json!({ "type": "object" })),
    });

struct LookupTool;

impl Tool for LookupTool {
    type Input = serde_json::Value;

    fn descriptor(&self) -> &ToolDescriptor {
        &LOOKUP_DESCRIPTOR
    }

    fn execute(
        &self,
        _input: Self::Input,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        ready(Ok(json!({ "status": "success" })))
    }
}

fn model_event(parts: Vec<Part>) -> Event {
    Event::new("e-1", "weather_agent").with_content(Content {
        role: Role::Model,
        parts,
    })
}

#[test]
fn test_builder() {
    let agent = AgentBuilder::with_model_provider(
        ScriptedModelProvider::default(),
    )
    .name("weather_agent")
    .description("Provides weather information.")
    .instruction("Use the tool.")
    .with_tool(LookupTool)
    .build();

    assert_eq!(agent.name(), "weather_agent");
    assert_eq!(agent.description(), "Provides weather information.");
    assert_eq!(agent.instruction(), "Use the tool.");
    let definitions = agent.tool_definitions();
    assert_eq!(definitions.len(), 1);
    assert_eq!(definitions[0].response, Some(json!({ "type": "object" })));
}

#[test]
fn test_build_model_request() {
    let agent = AgentBuilder::with_model_provider(
        ScriptedModelProvider::default(),
    )
    .instruction("Use the tool.")
    .with_tool(LookupTool)
    .build();

    let call = FunctionCall {
        id: "call:0".to_owned(),
        name: "get_weather".to_owned(),
        args: json!({ "city": "London" }),
    };
    let history = vec![
        Event::new("e-1", "user")
            .with_content(Content::user_text("Weather in London?")),
        model_event(vec![Part::Text("Let ".to_owned())]).into_partial(),
        model_event(vec![Part::FunctionCall(call)]),
        Event::new("e-1", "weather_agent").with_content(Content {
            role: Role::User,
            parts: vec![Part::FunctionResponse(FunctionResponse {
                id: "call:0".to_owned(),
                name: "get_weather".to_owned(),
                response: json!({ "status": "success" }),
            })],
        }),
        model_event(vec![Part::Text("Cloudy.".to_owned())]),
        Event::new("e-1", "weather_agent")
            .with_escalation(None, "model unavailable"),
    ];

    let req = agent.build_model_request(&history);
    assert_eq!(
        req.messages,
        vec![
            ModelMessage::System("Use the tool.".to_owned()),
            ModelMessage::User("Weather in London?".to_owned()),
            ModelMessage::Assistant(AssistantMessage {
                text: None,
                tool_calls: vec![ToolCallRequest {
                    id: "call:0".to_owned(),
                    name: "get_weather".to_owned(),
                    arguments: json!({ "city": "London" }),
                }],
            }),
            ModelMessage::Tool(ToolCallResult {
                id: "call:0".to_owned(),
                name: "get_weather".to_owned(),
                content: r#"{"status":"success"}"#.to_owned(),
            }),
            ModelMessage::Assistant(AssistantMessage {
                text: Some("Cloudy.".to_owned()),
                tool_calls: vec![],
            }),
        ]
    );
    assert!(req.has_tool("get_weather"));
}

#[test]
fn test_empty_instruction_is_omitted() {
    let agent = AgentBuilder::with_model_provider(
        ScriptedModelProvider::default(),
    )
    .build();
    let history =
        vec![Event::new("e-1", "user").with_content(Content::user_text("Hi"))];

    let req = agent.build_model_request(&history);
    assert_eq!(req.messages, vec![ModelMessage::User("Hi".to_owned())]);
    assert!(req.tools.is_empty());
}
