//! Response envelopes

use serde::{Deserialize, Serialize};

use lanpub_core::LanpubError;

/// Outcome marker carried in response bodies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Success,
    Failure,
}

/// JSON response body: `{status, message?}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Status code plus optional body, handed back to the host listener.
#[derive(Clone, Debug, PartialEq)]
pub struct Reply {
    pub code: u16,
    pub body: Option<Body>,
}

impl Reply {
    /// 200 with an empty body (join acknowledgements).
    pub fn ok_empty() -> Self {
        Reply {
            code: 200,
            body: None,
        }
    }

    /// 200 with `{status: SUCCESS}`.
    pub fn success() -> Self {
        Reply {
            code: 200,
            body: Some(Body {
                status: Status::Success,
                message: None,
            }),
        }
    }

    /// 400 with `{status: FAILURE, message}` built from the error.
    pub fn failure(err: &LanpubError) -> Self {
        Reply {
            code: 400,
            body: Some(Body {
                status: Status::Failure,
                message: Some(err.to_string()),
            }),
        }
    }

    /// Whether the peer reported success. A 200 carrying a `FAILURE` body
    /// does not count.
    pub fn is_success(&self) -> bool {
        if self.code != 200 {
            return false;
        }
        match &self.body {
            Some(body) => body.status == Status::Success,
            None => true,
        }
    }
}
