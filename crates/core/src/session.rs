//! Conversation sessions and the store that keeps them.

use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use crate::error::SessionError;
use crate::event::Event;

/// The identifiers of a session.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SessionContext {
    /// The application that owns the session.
    pub app_name: String,
    /// The user the session belongs to.
    pub user_id: String,
    /// The session identifier, unique per app and user.
    pub session_id: String,
}

impl SessionContext {
    /// Creates a context from its three identifiers.
    #[inline]
    pub fn new<S1, S2, S3>(app_name: S1, user_id: S2, session_id: S3) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        Self {
            app_name: app_name.into(),
            user_id: user_id.into(),
            session_id: session_id.into(),
        }
    }
}

impl Display for SessionContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.app_name, self.user_id, self.session_id)
    }
}

/// A conversation and its history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    /// The identifiers of this session.
    pub context: SessionContext,
    /// Complete events of the conversation, oldest first.
    pub events: Vec<Event>,
}

/// A store of sessions.
#[async_trait]
pub trait SessionService: Send + Sync {
    /// Creates an empty session.
    async fn create_session(
        &self,
        context: SessionContext,
    ) -> Result<Session, SessionError>;

    /// Returns the session with the given identifiers, if any.
    async fn get_session(
        &self,
        context: &SessionContext,
    ) -> Result<Option<Session>, SessionError>;

    /// Appends an event to the history of a session.
    ///
    /// Partial events are accepted and discarded.
    async fn append_event(
        &self,
        context: &SessionContext,
        event: Event,
    ) -> Result<(), SessionError>;

    /// Removes a session and its history.
    async fn delete_session(
        &self,
        context: &SessionContext,
    ) -> Result<(), SessionError>;
}

/// A [`SessionService`] that keeps everything in process memory.
///
/// Clones share the same sessions.
#[derive(Clone, Debug, Default)]
pub struct InMemorySessionService {
    sessions: Arc<Mutex<HashMap<SessionContext, Vec<Event>>>>,
}

impl InMemorySessionService {
    fn with_sessions<R>(
        &self,
        f: impl FnOnce(&mut HashMap<SessionContext, Vec<Event>>) -> R,
    ) -> R {
        let mut sessions =
            self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut sessions)
    }
}

#[async_trait]
impl SessionService for InMemorySessionService {
    async fn create_session(
        &self,
        context: SessionContext,
    ) -> Result<Session, SessionError> {
        self.with_sessions(|sessions| {
            if sessions.contains_key(&context) {
                return Err(SessionError::AlreadyExists(context));
            }
            debug!("created session {context}");
            sessions.insert(context.clone(), vec![]);
            Ok(Session {
                context,
                events: vec![],
            })
        })
    }

    async fn get_session(
        &self,
        context: &SessionContext,
    ) -> Result<Option<Session>, SessionError> {
        Ok(self.with_sessions(|sessions| {
            sessions.get(context).map(|events| Session {
                context: context.clone(),
                events: events.clone(),
            })
        }))
    }

    async fn append_event(
        &self,
        context: &SessionContext,
        event: Event,
    ) -> Result<(), SessionError> {
        self.with_sessions(|sessions| {
            let Some(events) = sessions.get_mut(context) else {
                return Err(SessionError::NotFound(context.clone()));
            };
            if event.partial {
                trace!("skipped partial event {}", event.id);
                return Ok(());
            }
            events.push(event);
            Ok(())
        })
    }

    async fn delete_session(
        &self,
        context: &SessionContext,
    ) -> Result<(), SessionError> {
        self.with_sessions(|sessions| match sessions.remove(context) {
            Some(_) => Ok(()),
            None => Err(SessionError::NotFound(context.clone())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Content;

    fn context() -> SessionContext {
        SessionContext::new("weather_tutorial_app", "user_1", "session_001")
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let service = InMemorySessionService::default();
        let session = service.create_session(context()).await.unwrap();
        assert_eq!(session.context, context());
        assert!(session.events.is_empty());

        let err = service.create_session(context()).await.unwrap_err();
        assert!(matches!(err, SessionError::AlreadyExists(_)));
        assert_eq!(
            err.to_string(),
            "session weather_tutorial_app/user_1/session_001 already exists"
        );

        let missing = SessionContext::new("weather_tutorial_app", "user_1", "x");
        assert!(service.get_session(&missing).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_append_event() {
        let service = InMemorySessionService::default();
        service.create_session(context()).await.unwrap();

        let event = Event::new("e-1", "user")
            .with_content(Content::user_text("How about Paris?"));
        service.append_event(&context(), event.clone()).await.unwrap();
        service
            .append_event(&context(), event.clone().into_partial())
            .await
            .unwrap();

        let session = service.get_session(&context()).await.unwrap().unwrap();
        assert_eq!(session.events, vec![event]);
    }

    #[tokio::test]
    async fn test_missing_session() {
        let service = InMemorySessionService::default();
        let err = service
            .append_event(&context(), Event::new("e-1", "user"))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::NotFound(_)));

        service.create_session(context()).await.unwrap();
        service.delete_session(&context()).await.unwrap();
        assert!(service.delete_session(&context()).await.is_err());
    }
}
