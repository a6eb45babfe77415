use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::codec::decode_query_rows;
use crate::error::{NodepubError, Result};
use crate::models::{QueryRow, Workspace};
use crate::node::{query_plan_url, query_url};
use crate::query::{QueryOptions, build_query_request};
use crate::transport::{Response, Transport};

use super::RestClient;

impl<T: Transport> RestClient<T> {
    /// Runs `statement` in `language` against the workspace and decodes the result rows.
    ///
    /// The language is checked before any request is sent.
    pub fn query(
        &self,
        workspace: &Workspace,
        language: &str,
        statement: &str,
        options: &QueryOptions,
    ) -> Result<Vec<QueryRow>> {
        let request = build_query_request(&query_url(workspace)?, language, statement, options)?;
        debug!(url = %request.url, language, "running query");
        let resp = self.remote().send(workspace.server(), request)?;
        let body = expect_query_ok(resp)?;
        decode_query_rows(&body)
    }

    /// Shorthand for [`RestClient::query`] with paging only.
    pub fn query_page(
        &self,
        workspace: &Workspace,
        language: &str,
        statement: &str,
        offset: u64,
        limit: Option<u64>,
    ) -> Result<Vec<QueryRow>> {
        self.query(
            workspace,
            language,
            statement,
            &QueryOptions::page(offset, limit),
        )
    }

    /// The server's plan for `statement`, returned as the raw response text.
    pub fn plan_for_query(
        &self,
        workspace: &Workspace,
        language: &str,
        statement: &str,
        options: &QueryOptions,
    ) -> Result<String> {
        let request =
            build_query_request(&query_plan_url(workspace)?, language, statement, options)?;
        debug!(url = %request.url, language, "requesting query plan");
        let resp = self.remote().send(workspace.server(), request)?;
        expect_query_ok(resp)
    }
}

fn expect_query_ok(resp: Response) -> Result<String> {
    if resp.status == StatusCode::OK {
        return Ok(resp.body);
    }
    warn!(status = resp.status.as_u16(), "query rejected");
    let message = resp.body.trim();
    Err(NodepubError::InvalidQuery(if message.is_empty() {
        format!("server answered status {}", resp.status.as_u16())
    } else {
        message.to_string()
    }))
}
