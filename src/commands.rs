use std::fmt::Display;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::Html;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::serial::{PortDescriptor, SerialError};
use crate::session::{SerialSession, SessionStatus};

const INDEX_HTML: &str = include_str!("../assets/index.html");

const NO_PORT_SPECIFIED: &str = "No port specified";

pub type SharedSession = Arc<SerialSession>;

/// Raw query pairs, in order. Repeated keys are legal and the first one wins.
pub type QueryPairs = Vec<(String, String)>;

/// Outcome of relaying a command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SendResult {
    fn ok(response: String) -> Self {
        Self {
            success: true,
            response: Some(response),
            error: None,
        }
    }

    fn failed(error: impl Display) -> Self {
        Self {
            success: false,
            response: None,
            error: Some(error.to_string()),
        }
    }
}

/// Outcome of connect/disconnect; `error` is always present, null on success
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    pub error: Option<String>,
}

impl ActionResult {
    fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    fn failed(error: impl Display) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortList {
    pub ports: Vec<PortDescriptor>,
}

// First non-empty value of `key`. Browsers send `?cmd=` for an empty input box,
// which reads the same as a missing parameter.
fn first_param(pairs: QueryPairs, key: &str) -> Option<String> {
    pairs
        .into_iter()
        .filter(|(k, v)| k == key && !v.is_empty())
        .map(|(_, v)| v)
        .next()
}

/// Serve the control panel page
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Report whether a port is open and which one
pub async fn status(State(session): State<SharedSession>) -> Json<SessionStatus> {
    Json(session.status().await)
}

/// Relay `cmd` to the robot
pub async fn send(
    State(session): State<SharedSession>,
    Query(pairs): Query<QueryPairs>,
) -> Json<SendResult> {
    let Some(cmd) = first_param(pairs, "cmd") else {
        return Json(SendResult::failed(SerialError::EmptyCommand));
    };

    match session.send(&cmd).await {
        Ok(response) => Json(SendResult::ok(response)),
        Err(e) => Json(SendResult::failed(e)),
    }
}

/// List serial ports on this machine
pub async fn ports(State(session): State<SharedSession>) -> Json<PortList> {
    Json(PortList {
        ports: session.list_ports(),
    })
}

/// Close whatever is open, then open `port`.
///
/// Reconnecting to the port that is already open still goes through a full
/// close/open cycle, which also resets the controller.
pub async fn connect(
    State(session): State<SharedSession>,
    Query(pairs): Query<QueryPairs>,
) -> Json<ActionResult> {
    let Some(port) = first_param(pairs, "port") else {
        return Json(ActionResult::failed(NO_PORT_SPECIFIED));
    };

    session.disconnect().await;
    match session.connect(&port).await {
        Ok(()) => Json(ActionResult::ok()),
        Err(e) => Json(ActionResult::failed(e)),
    }
}

/// Close the port; succeeds whether or not one was open
pub async fn disconnect(State(session): State<SharedSession>) -> Json<ActionResult> {
    if !session.disconnect().await {
        log::debug!("Disconnect requested with no open port");
    }
    Json(ActionResult::ok())
}
