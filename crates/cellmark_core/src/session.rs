//! Session configuration resolved once at plugin activation.
//!
//! # Responsibility
//! - Model the enablement/role response served at `rmotr-solutions`.
//! - Resolve it into an explicit `SessionConfig` handed to controllers.
//!
//! # Invariants
//! - Any fetch or parse failure resolves to a disabled session (inert
//!   feature), never to a crash.
//! - Resolution happens once; controllers receive the result by value.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Host-relative endpoint serving the enablement response.
pub const ENABLEMENT_ENDPOINT: &str = "rmotr-solutions";
/// Role value granting instructor access.
pub const ROLE_TEACHER: &str = "teacher";

/// Response body of the enablement query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnablementResponse {
    pub is_enabled: bool,
    pub role: String,
}

/// Who is looking at the notebook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewerAccess {
    /// Sees every cell and gets the marking controls.
    Instructor,
    /// Sees classified cells collapsed behind a reveal control.
    Student,
}

impl ViewerAccess {
    /// Maps a role string to viewer access; only `teacher` is an instructor.
    pub fn from_role(role: &str) -> Self {
        if role.trim() == ROLE_TEACHER {
            Self::Instructor
        } else {
            Self::Student
        }
    }

    /// Whether classified content is shown without a reveal control.
    pub fn can_see_all_content(self) -> bool {
        matches!(self, Self::Instructor)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Instructor => "instructor",
            Self::Student => "student",
        }
    }
}

/// Configuration every controller is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionConfig {
    pub enabled: bool,
    pub viewer: ViewerAccess,
}

impl SessionConfig {
    /// Inert session used when the enablement query fails.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            viewer: ViewerAccess::Student,
        }
    }

    /// Enabled session for a known viewer, bypassing the query.
    pub fn enabled_for(viewer: ViewerAccess) -> Self {
        Self {
            enabled: true,
            viewer,
        }
    }

    pub fn from_response(response: &EnablementResponse) -> Self {
        Self {
            enabled: response.is_enabled,
            viewer: ViewerAccess::from_role(&response.role),
        }
    }

    /// Runs the enablement query once and resolves the session.
    ///
    /// Failures are logged and resolve to [`SessionConfig::disabled`].
    pub fn resolve(source: &impl EnablementSource) -> Self {
        match source.fetch() {
            Ok(response) => {
                let config = Self::from_response(&response);
                info!(
                    "event=session_resolve module=session status=ok enabled={} viewer={}",
                    config.enabled,
                    config.viewer.as_str()
                );
                config
            }
            Err(err) => {
                warn!(
                    "event=session_resolve module=session status=error fallback=disabled error={err}"
                );
                Self::disabled()
            }
        }
    }
}

/// Single call producing the enablement response.
pub trait EnablementSource {
    fn fetch(&self) -> Result<EnablementResponse, EnablementError>;
}

/// Fixed response, for hosts that already know the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticEnablement(pub EnablementResponse);

impl EnablementSource for StaticEnablement {
    fn fetch(&self) -> Result<EnablementResponse, EnablementError> {
        Ok(self.0.clone())
    }
}

/// Raw response body handed over by the host's HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonBodyEnablement<'a> {
    body: &'a str,
}

impl<'a> JsonBodyEnablement<'a> {
    pub fn new(body: &'a str) -> Self {
        Self { body }
    }
}

impl EnablementSource for JsonBodyEnablement<'_> {
    fn fetch(&self) -> Result<EnablementResponse, EnablementError> {
        parse_enablement_body(self.body)
    }
}

/// Parses the endpoint's JSON body.
pub fn parse_enablement_body(body: &str) -> Result<EnablementResponse, EnablementError> {
    if body.trim().is_empty() {
        return Err(EnablementError::EmptyBody);
    }
    serde_json::from_str(body).map_err(EnablementError::Malformed)
}

/// Joins the enablement endpoint onto the host base URL.
pub fn enablement_url(base_url: &str) -> String {
    let base = base_url.trim();
    if base.ends_with('/') {
        format!("{base}{ENABLEMENT_ENDPOINT}")
    } else {
        format!("{base}/{ENABLEMENT_ENDPOINT}")
    }
}

/// Failures of the enablement query.
#[derive(Debug)]
pub enum EnablementError {
    EmptyBody,
    Malformed(serde_json::Error),
    Unavailable(String),
}

impl Display for EnablementError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyBody => write!(f, "enablement response body is empty"),
            Self::Malformed(err) => write!(f, "enablement response is malformed: {err}"),
            Self::Unavailable(reason) => write!(f, "enablement endpoint unavailable: {reason}"),
        }
    }
}

impl Error for EnablementError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Malformed(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        enablement_url, parse_enablement_body, EnablementError, EnablementResponse,
        EnablementSource, JsonBodyEnablement, SessionConfig, ViewerAccess,
    };

    struct FailingSource;

    impl EnablementSource for FailingSource {
        fn fetch(&self) -> Result<EnablementResponse, EnablementError> {
            Err(EnablementError::Unavailable("connection refused".to_string()))
        }
    }

    #[test]
    fn teacher_role_resolves_to_instructor() {
        let body = r#"{"is_enabled": true, "role": "teacher"}"#;
        let config = SessionConfig::resolve(&JsonBodyEnablement::new(body));
        assert!(config.enabled);
        assert_eq!(config.viewer, ViewerAccess::Instructor);
        assert!(config.viewer.can_see_all_content());
    }

    #[test]
    fn other_roles_resolve_to_student() {
        let body = r#"{"is_enabled": true, "role": "student"}"#;
        let config = SessionConfig::resolve(&JsonBodyEnablement::new(body));
        assert_eq!(config.viewer, ViewerAccess::Student);
        assert!(!config.viewer.can_see_all_content());
    }

    #[test]
    fn failures_fail_open_to_disabled() {
        assert_eq!(SessionConfig::resolve(&FailingSource), SessionConfig::disabled());
        let malformed = SessionConfig::resolve(&JsonBodyEnablement::new("{\"role\": 3}"));
        assert!(!malformed.enabled);
        let empty = SessionConfig::resolve(&JsonBodyEnablement::new("  "));
        assert!(!empty.enabled);
    }

    #[test]
    fn disabled_flag_is_respected() {
        let response = parse_enablement_body(r#"{"is_enabled": false, "role": "teacher"}"#)
            .expect("valid body");
        assert!(!SessionConfig::from_response(&response).enabled);
    }

    #[test]
    fn url_join_handles_trailing_slash() {
        assert_eq!(
            enablement_url("http://localhost:8888/"),
            "http://localhost:8888/rmotr-solutions"
        );
        assert_eq!(enablement_url("/user/ada"), "/user/ada/rmotr-solutions");
    }
}
