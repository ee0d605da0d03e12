use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationHeader {
    pub name: String,
    pub value: String,
}

impl AuthenticationHeader {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Credentials attached to a REST call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AuthenticationInfo {
    NoAuth,
    Headers {
        name: String,
        headers: Vec<AuthenticationHeader>,
    },
}

impl AuthenticationInfo {
    pub fn headers_auth(name: impl Into<String>, headers: Vec<AuthenticationHeader>) -> Self {
        AuthenticationInfo::Headers {
            name: name.into(),
            headers,
        }
    }

    pub fn is_no_auth(&self) -> bool {
        matches!(self, AuthenticationInfo::NoAuth)
    }

    pub fn name(&self) -> &str {
        match self {
            AuthenticationInfo::NoAuth => "NoAuth",
            AuthenticationInfo::Headers { name, .. } => name,
        }
    }

    pub fn headers(&self) -> &[AuthenticationHeader] {
        match self {
            AuthenticationInfo::NoAuth => &[],
            AuthenticationInfo::Headers { headers, .. } => headers,
        }
    }
}

impl Default for AuthenticationInfo {
    fn default() -> Self {
        AuthenticationInfo::NoAuth
    }
}
