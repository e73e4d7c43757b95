//! Response body shapes, decided once at the boundary.

use serde_json::Value;

/// The `{code, message, data}` wrapper some endpoints answer with.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub code: i64,
    pub message: Option<String>,
    pub data: Value,
}

/// A response body is either an envelope (an object whose `code` is a
/// number) or a raw payload such as the login token pair.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Envelope(Envelope),
    Raw(Value),
}

/// What the caller gets once the body has been classified.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Data(Value),
    /// Envelope code 401.
    Expired(Option<String>),
    /// Any other non-200 envelope code.
    Failed { code: i64, message: Option<String> },
}

impl ResponseBody {
    pub fn parse(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::Raw(Value::Null));
        }
        serde_json::from_slice(bytes).map(Self::from_value)
    }

    /// Only a numeric `code` makes an envelope; the other fields never
    /// demote it to a raw payload.
    pub fn from_value(mut value: Value) -> Self {
        let Some(code) = value.get("code").and_then(Value::as_i64) else {
            return Self::Raw(value);
        };
        let message = value.get("message").and_then(message_text);
        let data = value.get_mut("data").map(Value::take).unwrap_or(Value::Null);
        Self::Envelope(Envelope {
            code,
            message,
            data,
        })
    }

    pub fn classify(self) -> Outcome {
        match self {
            Self::Raw(value) => Outcome::Data(value),
            Self::Envelope(env) => match env.code {
                200 => Outcome::Data(env.data),
                401 => Outcome::Expired(non_empty(env.message)),
                code => Outcome::Failed {
                    code,
                    message: non_empty(env.message),
                },
            },
        }
    }
}

fn message_text(message: &Value) -> Option<String> {
    match message {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn non_empty(message: Option<String>) -> Option<String> {
    message.filter(|m| !m.trim().is_empty())
}
