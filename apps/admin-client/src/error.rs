use thiserror::Error;

/// Every failure an admin client operation can report.
///
/// Message-carrying variants display the message verbatim so a
/// server-provided reason reaches the caller unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Credentials rejected, not logged in, or HTTP 401.
    #[error("{0}")]
    Auth(String),

    /// The backend answered an authenticated call with envelope code 401.
    #[error("{0}")]
    SessionExpired(String),

    /// An envelope with a non-200 code, or a request the client refused.
    #[error("{0}")]
    RequestFailed(String),

    /// Any other HTTP error status.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// The request was sent but no response arrived.
    #[error("{0}")]
    Network(String),

    /// The request could not be built or sent at all.
    #[error("{0}")]
    InvalidRequest(String),

    /// The response body did not match the expected shape.
    #[error("{0}")]
    UnexpectedResponse(String),

    /// Unparsable local data (stored profile, live frame).
    #[error("Malformed data: {0}")]
    MalformedData(String),

    /// Durable storage could not be read or written.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl ClientError {
    /// HTTP status behind the error, when the transport supplied one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Auth(_) => Some(401),
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the error ended the session.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Auth(_) | Self::SessionExpired(_))
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        tracing::debug!(?err, "response decode failed");
        Self::UnexpectedResponse(format!("响应数据格式错误: {err}"))
    }
}
