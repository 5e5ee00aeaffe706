//! Wires the weather agent together and runs the scripted conversation.

use std::sync::Arc;

use anyhow::Context as _;
use weather_agent_core::{
    Agent, AgentBuilder, InMemorySessionService, RunConfig, Runner,
    SessionContext, SessionService,
};
use weather_agent_model::ModelProvider;
use weather_agent_openai_model::OpenAIProvider;

use crate::config::{Config, ModelBackend};
use crate::driver::{ConversationDriver, ConversationTurn, DriverConfig};
use crate::offline::OfflineModelProvider;
use crate::tools::GetWeatherTool;

/// The application sessions are created under.
pub const APP_NAME: &str = "weather_tutorial_app";
/// The only user.
pub const USER_ID: &str = "user_1";
/// The only session.
pub const SESSION_ID: &str = "session_001";

/// Name of the weather agent.
pub const AGENT_NAME: &str = "weather_agent_v1";
/// Description of the weather agent.
pub const AGENT_DESCRIPTION: &str =
    "Provides weather information for specific cities.";
/// System instruction of the weather agent.
pub const AGENT_INSTRUCTION: &str = "You are a helpful weather agent. \
    When the user asks for weather in a specific city, \
    use the 'get_weather' tool to find the information. \
    If the tool returns an error, inform the user politely. \
    If the tool is successful, present the weather report clearly.";

/// The queries sent, in order, on the one session.
pub const QUERIES: [&str; 3] = [
    "What is the weather like in London?",
    "How about Paris?",
    "Tell me the weather in New York",
];

/// Builds the weather agent on top of the given model.
pub fn build_weather_agent<P: ModelProvider + 'static>(provider: P) -> Agent {
    AgentBuilder::with_model_provider(provider)
        .name(AGENT_NAME)
        .description(AGENT_DESCRIPTION)
        .instruction(AGENT_INSTRUCTION)
        .with_tool(GetWeatherTool::new())
        .build()
}

/// Builds a runner for the configured model backend.
pub fn build_runner(
    config: &Config,
    session_service: Arc<dyn SessionService>,
) -> Runner {
    let agent = match &config.backend {
        ModelBackend::Offline => build_weather_agent(OfflineModelProvider),
        ModelBackend::OpenAI(openai) => {
            info!("using model {} at {}", openai.model(), openai.base_url());
            build_weather_agent(OpenAIProvider::new(openai.clone()))
        }
    };
    let run_config = RunConfig {
        streaming: config.streaming,
        ..Default::default()
    };
    Runner::new(APP_NAME, agent, session_service).with_config(run_config)
}

/// Creates the session and runs every query in [`QUERIES`] on it.
pub async fn run(config: Config) -> anyhow::Result<Vec<ConversationTurn>> {
    let session_service = Arc::new(InMemorySessionService::default());
    let session = session_service
        .create_session(SessionContext::new(APP_NAME, USER_ID, SESSION_ID))
        .await
        .context("failed to create the session")?;
    println!(
        "Session created: App='{APP_NAME}',user='{USER_ID}',Session='{SESSION_ID}'"
    );

    let runner = build_runner(&config, session_service);
    println!("Runner created for agent {}.", runner.agent().name());

    let driver = ConversationDriver::new(&runner, session.context)
        .with_config(DriverConfig {
            turn_timeout: config.turn_timeout,
        });
    let mut turns = Vec::with_capacity(QUERIES.len());
    for query in QUERIES {
        let turn = driver
            .run_turn(query)
            .await
            .with_context(|| format!("failed to answer {query:?}"))?;
        turns.push(turn);
    }
    Ok(turns)
}
