use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::Instrument;
use uuid::Uuid;

use crate::agent::Agent;
use crate::content::{Content, FunctionCall, Part, Role};
use crate::error::RunError;
use crate::event::{Event, EventStream};
use crate::session::{SessionContext, SessionService};

const USER_AUTHOR: &str = "user";
const LLM_CALLS_LIMIT_CODE: &str = "LLM_CALLS_LIMIT_EXCEEDED";

/// Something that can handle a user message within a session.
pub trait AgentRuntime: Send + Sync {
    /// Starts handling `message` in the given session.
    ///
    /// The returned stream reports every step after the message in order.
    /// It ends after the final event, or yields an error if the run cannot
    /// start. The message itself is stored in the session but not reported.
    fn run(
        &self,
        user_id: &str,
        session_id: &str,
        message: Content,
    ) -> EventStream;
}

/// Limits and switches for a single run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunConfig {
    /// The maximum number of model calls while handling one message.
    pub max_llm_calls: usize,
    /// Whether text deltas are reported as partial events.
    pub streaming: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_llm_calls: 20,
            streaming: false,
        }
    }
}

/// Runs an [`Agent`] against the sessions of one application.
pub struct Runner {
    app_name: String,
    agent: Arc<Agent>,
    session_service: Arc<dyn SessionService>,
    config: RunConfig,
}

impl Runner {
    /// Creates a runner with the default [`RunConfig`].
    pub fn new<S: Into<String>>(
        app_name: S,
        agent: Agent,
        session_service: Arc<dyn SessionService>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            agent: Arc::new(agent),
            session_service,
            config: RunConfig::default(),
        }
    }

    /// Replaces the run configuration.
    #[inline]
    pub fn with_config(mut self, config: RunConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the application name sessions are looked up under.
    #[inline]
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Returns the agent this runner drives.
    #[inline]
    pub fn agent(&self) -> &Agent {
        &self.agent
    }
}

impl AgentRuntime for Runner {
    fn run(
        &self,
        user_id: &str,
        session_id: &str,
        message: Content,
    ) -> EventStream {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let invocation = Invocation {
            id: format!("e-{}", Uuid::new_v4()),
            context: SessionContext::new(&self.app_name, user_id, session_id),
            agent: Arc::clone(&self.agent),
            session_service: Arc::clone(&self.session_service),
            config: self.config.clone(),
            event_tx,
        };
        let span = info_span!("invocation", id = %invocation.id);
        let producer = tokio::spawn(invocation.run(message).instrument(span));
        EventStream::from_channel(event_rx, producer)
    }
}

type EventSender = mpsc::UnboundedSender<Result<Event, RunError>>;

/// The state of one run, owned by its producer task.
struct Invocation {
    id: String,
    context: SessionContext,
    agent: Arc<Agent>,
    session_service: Arc<dyn SessionService>,
    config: RunConfig,
    event_tx: EventSender,
}

impl Invocation {
    async fn run(self, message: Content) {
        debug!("started run in session {}", self.context);
        match self.drive(message).await {
            Ok(()) => debug!("run finished"),
            Err(RunError::Abandoned) => debug!("run abandoned by consumer"),
            Err(err) => {
                warn!("run failed: {err}");
                self.event_tx.send(Err(err)).ok();
            }
        }
    }

    async fn drive(&self, message: Content) -> Result<(), RunError> {
        let Some(session) =
            self.session_service.get_session(&self.context).await?
        else {
            return Err(RunError::SessionNotFound(self.context.clone()));
        };
        let mut history = session.events;

        let user_event =
            Event::new(&self.id, USER_AUTHOR).with_content(message);
        self.store(&mut history, user_event).await?;

        let model_client = self.agent.model_client();
        let mut llm_calls = 0;
        loop {
            if llm_calls >= self.config.max_llm_calls {
                let message = format!(
                    "Exceeded the maximum of {} model calls in one turn.",
                    self.config.max_llm_calls
                );
                warn!("{message}");
                let event = self
                    .agent_event()
                    .with_escalation(Some(LLM_CALLS_LIMIT_CODE), message);
                return self.publish(&mut history, event).await;
            }
            llm_calls += 1;

            let req = self.agent.build_model_request(&history);
            let on_delta = self.on_delta();
            let resp = match model_client.send_request(req, on_delta).await {
                Ok(resp) => resp,
                Err(err) => {
                    let code = err.kind().code();
                    let event = self
                        .agent_event()
                        .with_escalation(Some(code), err.to_string());
                    return self.publish(&mut history, event).await;
                }
            };

            let mut parts = Vec::with_capacity(resp.tool_calls.len() + 1);
            if !resp.transcript.is_empty() {
                parts.push(Part::Text(resp.transcript));
            }
            parts.extend(resp.tool_calls.iter().map(|req| {
                Part::FunctionCall(FunctionCall {
                    id: req.id.clone(),
                    name: req.name.clone(),
                    args: req.arguments.clone(),
                })
            }));
            let model_event = self.agent_event().with_content(Content {
                role: Role::Model,
                parts,
            });
            self.publish(&mut history, model_event).await?;

            if resp.tool_calls.is_empty() {
                return Ok(());
            }

            let tools = self.agent.tools();
            let mut parts = Vec::with_capacity(resp.tool_calls.len());
            for req in &resp.tool_calls {
                parts.push(Part::FunctionResponse(tools.call(req).await));
            }
            let tool_event = self.agent_event().with_content(Content {
                role: Role::User,
                parts,
            });
            self.publish(&mut history, tool_event).await?;
        }
    }

    fn agent_event(&self) -> Event {
        Event::new(&self.id, self.agent.name())
    }

    /// Persists a complete event without reporting it.
    async fn store(
        &self,
        history: &mut Vec<Event>,
        event: Event,
    ) -> Result<(), RunError> {
        self.session_service
            .append_event(&self.context, event.clone())
            .await?;
        history.push(event);
        Ok(())
    }

    /// Persists a complete event and hands it to the consumer.
    async fn publish(
        &self,
        history: &mut Vec<Event>,
        event: Event,
    ) -> Result<(), RunError> {
        self.store(history, event.clone()).await?;
        self.event_tx
            .send(Ok(event))
            .map_err(|_| RunError::Abandoned)
    }

    fn on_delta(&self) -> Box<dyn Fn(String) + Send + 'static> {
        if !self.config.streaming {
            return Box::new(|_| {});
        }
        let event_tx = self.event_tx.clone();
        let invocation_id = self.id.clone();
        let author = self.agent.name().to_owned();
        Box::new(move |delta| {
            let event = Event::new(&invocation_id, &author)
                .with_content(Content {
                    role: Role::Model,
                    parts: vec![Part::Text(delta)],
                })
                .into_partial();
            event_tx.send(Ok(event)).ok();
        })
    }
}
