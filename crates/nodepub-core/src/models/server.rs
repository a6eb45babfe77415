use std::fmt::{Display, Formatter};

use serde::Serialize;

/// Shape of the repository-discovery response, which decides the effective base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolVersion {
    V1,
    V2,
}

impl ProtocolVersion {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::V1 => "v1",
            Self::V2 => "v2",
        }
    }
}

impl Display for ProtocolVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Server {
    url: String,
    user: String,
    #[serde(skip)]
    password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    validated_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    protocol: Option<ProtocolVersion>,
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("url", &self.url)
            .field("user", &self.user)
            .field("validated_url", &self.validated_url)
            .field("protocol", &self.protocol)
            .finish_non_exhaustive()
    }
}

impl Server {
    pub fn new(
        url: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into().trim().to_string(),
            user: user.into(),
            password: password.into(),
            validated_url: None,
            protocol: None,
        }
    }

    /// Returns a copy bound to the base URL that validation settled on.
    #[must_use]
    pub fn as_validated(&self, base_url: impl Into<String>, protocol: ProtocolVersion) -> Self {
        Self {
            validated_url: Some(base_url.into()),
            protocol: Some(protocol),
            ..self.clone()
        }
    }

    /// Returns a copy with any earlier validation result dropped.
    #[must_use]
    pub fn unvalidated(&self) -> Self {
        Self {
            validated_url: None,
            protocol: None,
            ..self.clone()
        }
    }

    /// The URL the caller supplied; also used as the display name.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The URL all node, repository and query addresses are built from.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.validated_url.as_deref().unwrap_or(&self.url)
    }

    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    #[must_use]
    pub const fn protocol(&self) -> Option<ProtocolVersion> {
        self.protocol
    }

    #[must_use]
    pub const fn is_validated(&self) -> bool {
        self.protocol.is_some()
    }
}

impl Display for Server {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Repository {
    name: String,
    #[serde(skip)]
    server: Server,
}

impl Repository {
    pub fn new(name: impl Into<String>, server: Server) -> Self {
        Self {
            name: name.into(),
            server,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn server(&self) -> &Server {
        &self.server
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Workspace {
    name: String,
    repository: Repository,
}

impl Workspace {
    pub fn new(name: impl Into<String>, repository: Repository) -> Self {
        Self {
            name: name.into(),
            repository,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn repository(&self) -> &Repository {
        &self.repository
    }

    #[must_use]
    pub const fn server(&self) -> &Server {
        self.repository.server()
    }
}

impl Display for Workspace {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.repository.name(), self.name)
    }
}
