use thiserror::Error;

use crate::session::SessionContext;

/// Errors reported by a [`SessionService`](crate::SessionService).
#[derive(Debug, Error)]
pub enum SessionError {
    /// A session with the same identifiers already exists.
    #[error("session {0} already exists")]
    AlreadyExists(SessionContext),
    /// No session has these identifiers.
    #[error("session {0} not found")]
    NotFound(SessionContext),
}

/// Errors that end a run before it produces a final event.
#[derive(Debug, Error)]
pub enum RunError {
    /// The run targeted a session that was never created.
    #[error("session {0} not found")]
    SessionNotFound(SessionContext),
    /// The session store failed.
    #[error(transparent)]
    Session(#[from] SessionError),
    /// The consumer dropped the event stream mid-run.
    #[error("the event stream was dropped before the run finished")]
    Abandoned,
}
