use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How pushes to the remote authenticate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// Credentials are supplied interactively (or by a credential helper).
    #[default]
    Password,
    /// A personal access token is embedded in the remote URL.
    Token,
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMode::Password => write!(f, "password"),
            AuthMode::Token => write!(f, "token"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid auth mode '{0}'; supported values are password, token")]
pub struct ParseAuthModeError(pub String);

impl FromStr for AuthMode {
    type Err = ParseAuthModeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "password" => Ok(AuthMode::Password),
            "token" => Ok(AuthMode::Token),
            _ => Err(ParseAuthModeError(value.to_string())),
        }
    }
}

/// The single active project record.
///
/// A stored record is either complete and valid or absent altogether; the
/// configuration store refuses to hand out anything in between.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub repository_url: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub auth_mode: AuthMode,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token: String,
}

impl ProjectConfig {
    pub fn new(
        repository_url: impl Into<String>,
        username: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            repository_url: repository_url.into(),
            username: username.into(),
            email: email.into(),
            auth_mode: AuthMode::Password,
            token: String::new(),
        }
    }

    /// Switch the record to token authentication.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.auth_mode = AuthMode::Token;
        self.token = token.into();
        self
    }

    pub fn uses_token(&self) -> bool {
        self.auth_mode == AuthMode::Token
    }

    /// Trimmed copy; password-mode records never carry a token.
    pub fn normalized(&self) -> Self {
        let token = match self.auth_mode {
            AuthMode::Token => self.token.trim().to_string(),
            AuthMode::Password => String::new(),
        };
        Self {
            repository_url: self.repository_url.trim().to_string(),
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            auth_mode: self.auth_mode,
            token,
        }
    }
}
