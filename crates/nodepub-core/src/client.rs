use crate::config::ClientConfig;
use crate::error::Result;
use crate::remote::Remote;
use crate::transport::{HttpTransport, Transport};

mod discovery_service;
mod publish_service;
mod query_service;

/// Publishes files and runs queries against a repository server.
///
/// Holds no state besides the transport, so one client can serve any number of servers and
/// workspaces, from several threads.
#[derive(Debug, Clone)]
pub struct RestClient<T = HttpTransport> {
    transport: T,
}

impl RestClient<HttpTransport> {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Ok(Self::with_transport(HttpTransport::new(config)?))
    }

    pub fn from_env() -> Result<Self> {
        Self::new(&ClientConfig::from_env())
    }
}

impl<T: Transport> RestClient<T> {
    pub const fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    pub const fn transport(&self) -> &T {
        &self.transport
    }

    pub(crate) const fn remote(&self) -> Remote<'_, T> {
        Remote::new(&self.transport)
    }
}
