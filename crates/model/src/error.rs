use std::fmt::{self, Display, Formatter};

/// The kind of error that occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The content is moderated.
    Moderated,
    /// The model provider is rate limited.
    RateLimitExceeded,
    /// The credentials were rejected by the provider.
    Unauthorized,
    /// Any other errors.
    Other,
}

impl ErrorKind {
    /// Returns a stable, upper-case code for this kind.
    ///
    /// The code is attached to escalation events so that consumers can
    /// tell failure classes apart without parsing messages.
    #[inline]
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Moderated => "MODERATED",
            ErrorKind::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            ErrorKind::Unauthorized => "UNAUTHORIZED",
            ErrorKind::Other => "OTHER",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
