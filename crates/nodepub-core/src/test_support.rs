use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use reqwest::StatusCode;

use crate::error::Result;
use crate::models::{Repository, Server, Workspace};
use crate::transport::{Method, Request, Response, Transport};

pub(crate) const BASE_URL: &str = "http://localhost:8080/resources";
pub(crate) const ITEMS_ROOT: &str = "/resources/repo/default/items";

#[derive(Debug, Default)]
struct FakeState {
    nodes: BTreeSet<String>,
    bodies: BTreeMap<String, Vec<u8>>,
    routes: BTreeMap<(Method, String), Response>,
    calls: Vec<(Method, String)>,
    refuse_delete: bool,
}

/// In-memory stand-in for the repository server. Node paths are URL paths; a POST only
/// succeeds when the parent path already exists.
#[derive(Debug, Default)]
pub(crate) struct FakeRepository {
    state: Mutex<FakeState>,
}

impl FakeRepository {
    pub(crate) fn new() -> Self {
        let repo = Self::default();
        repo.add_node(ITEMS_ROOT);
        repo
    }

    pub(crate) fn add_node(&self, path: &str) {
        self.lock().nodes.insert(path.to_string());
    }

    pub(crate) fn has_node(&self, path: &str) -> bool {
        self.lock().nodes.contains(path)
    }

    pub(crate) fn body_of(&self, path: &str) -> Option<Vec<u8>> {
        self.lock().bodies.get(path).cloned()
    }

    /// Answers `method` on the URL path with a canned response instead of node state.
    pub(crate) fn route(&self, method: Method, path: &str, status: StatusCode, body: &str) {
        self.lock()
            .routes
            .insert((method, path.to_string()), Response::new(status, body));
    }

    /// Makes DELETE answer 500 while leaving the node in place.
    pub(crate) fn refuse_deletes(&self) {
        self.lock().refuse_delete = true;
    }

    pub(crate) fn calls(&self) -> Vec<(Method, String)> {
        self.lock().calls.clone()
    }

    pub(crate) fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake repository lock")
    }
}

impl Transport for FakeRepository {
    fn send(&self, _server: &Server, request: Request) -> Result<Response> {
        let mut state = self.lock();
        state
            .calls
            .push((request.method, request.url.as_str().to_string()));
        let path = request.url.path().to_string();
        if let Some(resp) = state.routes.get(&(request.method, path.clone())) {
            return Ok(resp.clone());
        }

        let status = match request.method {
            Method::Get if state.nodes.contains(&path) => StatusCode::OK,
            Method::Get => StatusCode::NOT_FOUND,
            Method::Post => {
                let parent = path.rsplit_once('/').map_or("", |(parent, _)| parent);
                if state.nodes.contains(&path) || !state.nodes.contains(parent) {
                    StatusCode::CONFLICT
                } else {
                    state.nodes.insert(path.clone());
                    state.bodies.insert(path, request.body.unwrap_or_default());
                    StatusCode::CREATED
                }
            }
            Method::Put if state.nodes.contains(&path) => {
                state.bodies.insert(path, request.body.unwrap_or_default());
                StatusCode::OK
            }
            Method::Put => StatusCode::NOT_FOUND,
            Method::Delete if state.refuse_delete => StatusCode::INTERNAL_SERVER_ERROR,
            Method::Delete if state.nodes.remove(&path) => {
                state.bodies.remove(&path);
                StatusCode::NO_CONTENT
            }
            Method::Delete => StatusCode::NOT_FOUND,
        };
        Ok(Response::new(status, ""))
    }
}

pub(crate) fn server() -> Server {
    Server::new(BASE_URL, "admin", "admin")
}

pub(crate) fn repository() -> Repository {
    Repository::new("repo", server())
}

pub(crate) fn workspace() -> Workspace {
    Workspace::new("default", repository())
}
