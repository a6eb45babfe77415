use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use reqwest::Url;
use url::form_urlencoded::byte_serialize;

use crate::error::{NodepubError, Result};
use crate::transport::{Method, Request};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryLanguage {
    XPath,
    Sql,
    Sql2,
    Search,
}

impl QueryLanguage {
    pub const ALL: [Self; 4] = [Self::XPath, Self::Sql, Self::Sql2, Self::Search];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::XPath => "xpath",
            Self::Sql => "sql",
            Self::Sql2 => "JCR-SQL2",
            Self::Search => "Search",
        }
    }

    #[must_use]
    pub const fn content_type(&self) -> &'static str {
        match self {
            Self::XPath => "application/jcr+xpath",
            Self::Sql => "application/jcr+sql",
            Self::Sql2 => "application/jcr+sql2",
            Self::Search => "application/jcr+search",
        }
    }

    #[must_use]
    pub fn valid_names() -> String {
        Self::ALL
            .iter()
            .map(Self::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Display for QueryLanguage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryLanguage {
    type Err = NodepubError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|language| language.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| NodepubError::InvalidLanguage {
                language: s.to_string(),
                valid: Self::valid_names(),
            })
    }
}

/// Paging and bound variables for one query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Rows to skip; `0` sends no `offset` parameter.
    pub offset: u64,
    /// Maximum rows; `None` sends no `limit` parameter.
    pub limit: Option<u64>,
    pub variables: BTreeMap<String, String>,
}

impl QueryOptions {
    #[must_use]
    pub fn page(offset: u64, limit: Option<u64>) -> Self {
        Self {
            offset,
            limit,
            variables: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }
}

/// Writes `?first&second&...`, remembering whether the first parameter went out yet.
#[derive(Debug, Default)]
struct QueryString {
    out: String,
    wrote_first: bool,
}

impl QueryString {
    fn push(&mut self, name: &str, value: impl Display) {
        if self.wrote_first {
            self.out.push('&');
        } else {
            self.out.push('?');
            self.wrote_first = true;
        }
        self.out.extend(byte_serialize(name.as_bytes()));
        self.out.push('=');
        self.out.extend(byte_serialize(value.to_string().as_bytes()));
    }

    fn finish(self) -> String {
        self.out
    }
}

pub(crate) fn query_suffix(options: &QueryOptions) -> String {
    let mut query = QueryString::default();
    if options.offset > 0 {
        query.push("offset", options.offset);
    }
    if let Some(limit) = options.limit {
        query.push("limit", limit);
    }
    for (name, value) in &options.variables {
        if name.trim().is_empty() || value.trim().is_empty() {
            continue;
        }
        query.push(name, value);
    }
    query.finish()
}

/// Builds the POST for a query or query plan. The language is checked before anything else.
pub(crate) fn build_query_request(
    endpoint: &Url,
    language: &str,
    statement: &str,
    options: &QueryOptions,
) -> Result<Request> {
    let language = language.parse::<QueryLanguage>()?;
    let raw = format!("{endpoint}{}", query_suffix(options));
    let url = Url::parse(&raw).map_err(|err| NodepubError::InvalidUrl(format!("{raw}: {err}")))?;
    Ok(Request::new(Method::Post, url)
        .with_body(language.content_type(), statement.as_bytes().to_vec()))
}
