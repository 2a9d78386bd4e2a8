//! The post route table.
//!
//! Routes are declared as data ([`POST_ROUTES`]) and turned into an Axum
//! router by [`RouteTable::into_router`]. Each entry is an ordered handler
//! chain: zero or more [`Guard`]s followed by exactly one [`Action`]. A guard
//! either forwards the request or answers it itself, so a rejected request
//! never reaches the action.
//!
//! # Endpoints
//!
//! - `POST   /create` - Create a post (bearer token)
//! - `GET    /`       - List all posts
//! - `GET    /{id}`   - Fetch one post
//! - `PUT    /{id}`   - Update a post (bearer token)
//! - `DELETE /{id}`   - Delete a post (bearer token)

use std::fmt;

use axum::{
    Router,
    http::Method,
    middleware,
    routing::{MethodFilter, MethodRouter, on},
};
use thiserror::Error;

use crate::api::handlers::{
    create_post_handler, delete_post_handler, get_post_handler, list_posts_handler,
    update_post_handler,
};
use crate::api::middleware::auth;
use crate::state::AppState;

/// HTTP methods a route entry can bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl RouteMethod {
    pub fn as_method(self) -> Method {
        match self {
            RouteMethod::Get => Method::GET,
            RouteMethod::Post => Method::POST,
            RouteMethod::Put => Method::PUT,
            RouteMethod::Patch => Method::PATCH,
            RouteMethod::Delete => Method::DELETE,
        }
    }

    fn filter(self) -> MethodFilter {
        match self {
            RouteMethod::Get => MethodFilter::GET,
            RouteMethod::Post => MethodFilter::POST,
            RouteMethod::Put => MethodFilter::PUT,
            RouteMethod::Patch => MethodFilter::PATCH,
            RouteMethod::Delete => MethodFilter::DELETE,
        }
    }
}

impl fmt::Display for RouteMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_method())
    }
}

/// A handler that may stop a request before it reaches the action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// Requires a valid bearer token; see [`auth::layer`].
    Bearer,
}

impl Guard {
    pub fn name(self) -> &'static str {
        match self {
            Guard::Bearer => "bearer",
        }
    }

    fn wrap(self, endpoint: MethodRouter<AppState>, state: &AppState) -> MethodRouter<AppState> {
        match self {
            Guard::Bearer => {
                endpoint.route_layer(middleware::from_fn_with_state(state.clone(), auth::layer))
            }
        }
    }
}

/// Terminal handler producing the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    List,
    Get,
    Update,
    Delete,
}

impl Action {
    pub fn name(self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::List => "list",
            Action::Get => "get",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }

    fn endpoint(self, filter: MethodFilter) -> MethodRouter<AppState> {
        match self {
            Action::Create => on(filter, create_post_handler),
            Action::List => on(filter, list_posts_handler),
            Action::Get => on(filter, get_post_handler),
            Action::Update => on(filter, update_post_handler),
            Action::Delete => on(filter, delete_post_handler),
        }
    }
}

/// One step of a route's handler chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    Guard(Guard),
    Action(Action),
}

/// A route: method, path pattern, and handler chain.
///
/// Path patterns use Axum syntax: `{name}` captures one path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteEntry {
    pub method: RouteMethod,
    pub path: &'static str,
    pub guards: &'static [Guard],
    pub action: Action,
}

impl RouteEntry {
    /// Handlers in invocation order: guards first, the action last.
    pub fn chain(&self) -> Vec<Handler> {
        self.guards
            .iter()
            .copied()
            .map(Handler::Guard)
            .chain(std::iter::once(Handler::Action(self.action)))
            .collect()
    }

    pub fn is_guarded(&self) -> bool {
        !self.guards.is_empty()
    }
}

impl fmt::Display for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)?;
        for guard in self.guards {
            write!(f, " [{}]", guard.name())?;
        }
        write!(f, " -> {}", self.action.name())
    }
}

/// The post resource bindings, in declaration order.
pub const POST_ROUTES: [RouteEntry; 5] = [
    RouteEntry {
        method: RouteMethod::Post,
        path: "/create",
        guards: &[Guard::Bearer],
        action: Action::Create,
    },
    RouteEntry {
        method: RouteMethod::Get,
        path: "/",
        guards: &[],
        action: Action::List,
    },
    RouteEntry {
        method: RouteMethod::Get,
        path: "/{id}",
        guards: &[],
        action: Action::Get,
    },
    RouteEntry {
        method: RouteMethod::Put,
        path: "/{id}",
        guards: &[Guard::Bearer],
        action: Action::Update,
    },
    RouteEntry {
        method: RouteMethod::Delete,
        path: "/{id}",
        guards: &[Guard::Bearer],
        action: Action::Delete,
    },
];

/// Reasons a route table is rejected at construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteTableError {
    #[error("route table has no entries")]
    Empty,

    #[error("invalid path pattern '{0}'")]
    InvalidPath(String),

    #[error("{method} {path} is declared more than once")]
    Duplicate { method: RouteMethod, path: String },

    #[error("{method} {literal} is shadowed by the earlier route {method} {wildcard}")]
    Shadowed {
        method: RouteMethod,
        literal: String,
        wildcard: String,
    },

    #[error("{path} captures a segment that {other} captures under another name")]
    CaptureConflict { path: String, other: String },
}

/// A successful [`RouteTable::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub entry: RouteEntry,
    pub params: Vec<(String, String)>,
}

impl RouteMatch {
    /// Value captured for the parameter `name`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Literal(&'a str),
    Capture(&'a str),
}

/// An explicit, validated route table.
///
/// Invariants checked by [`RouteTable::new`]:
///
/// - every path is a well-formed pattern
/// - no method + pattern pair is declared twice
/// - no route is unreachable because an earlier route of the same method
///   matches everything it matches (a literal path must come before any
///   wildcard path that would capture it)
/// - patterns sharing a prefix name the next captured segment the same way,
///   whatever their methods
#[derive(Debug, Clone)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    /// Builds a table, rejecting entries that break the invariants above.
    pub fn new(entries: Vec<RouteEntry>) -> Result<Self, RouteTableError> {
        if entries.is_empty() {
            return Err(RouteTableError::Empty);
        }

        let mut parsed = Vec::with_capacity(entries.len());
        for entry in &entries {
            let segments = parse_pattern(entry.path)
                .ok_or_else(|| RouteTableError::InvalidPath(entry.path.to_string()))?;
            parsed.push(segments);
        }

        for (j, later) in entries.iter().enumerate() {
            for (i, earlier) in entries.iter().enumerate().take(j) {
                if earlier.method == later.method {
                    let earlier_covers = covers(&parsed[i], &parsed[j]);
                    let later_covers = covers(&parsed[j], &parsed[i]);

                    if earlier_covers && later_covers {
                        return Err(RouteTableError::Duplicate {
                            method: later.method,
                            path: later.path.to_string(),
                        });
                    }
                    if earlier_covers {
                        return Err(RouteTableError::Shadowed {
                            method: later.method,
                            literal: later.path.to_string(),
                            wildcard: earlier.path.to_string(),
                        });
                    }
                }

                // Methods share one path tree in the router.
                if captures_conflict(&parsed[i], &parsed[j]) {
                    return Err(RouteTableError::CaptureConflict {
                        path: later.path.to_string(),
                        other: earlier.path.to_string(),
                    });
                }
            }
        }

        Ok(Self { entries })
    }

    /// The post resource table ([`POST_ROUTES`]).
    pub fn posts() -> Self {
        Self {
            entries: POST_ROUTES.to_vec(),
        }
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    /// Finds the first entry, in declaration order, whose method and pattern
    /// match the request, and captures its path parameters.
    ///
    /// A single trailing slash is ignored, as it is by the served router.
    /// Empty segments elsewhere never match.
    pub fn resolve(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        let concrete = request_segments(path)?;

        self.entries
            .iter()
            .filter(|entry| entry.method.as_method() == *method)
            .find_map(|entry| {
                let pattern = parse_pattern(entry.path)?;
                let params = capture(&pattern, &concrete)?;
                Some(RouteMatch {
                    entry: *entry,
                    params,
                })
            })
    }

    /// Builds the Axum router for this table.
    ///
    /// Guards wrap the action with `route_layer`, outermost first, so they only
    /// run for requests that matched their own method and path.
    pub fn into_router(self, state: &AppState) -> Router<AppState> {
        self.entries
            .iter()
            .fold(Router::new(), |router, entry| {
                let endpoint = entry
                    .guards
                    .iter()
                    .rev()
                    .fold(entry.action.endpoint(entry.method.filter()), |endpoint, guard| {
                        guard.wrap(endpoint, state)
                    });

                router.route(entry.path, endpoint)
            })
    }
}

/// Router for the post resource, to be nested under the configured base path.
pub fn post_routes(state: &AppState) -> Router<AppState> {
    RouteTable::posts().into_router(state)
}

fn parse_pattern(path: &str) -> Option<Vec<Segment<'_>>> {
    let rest = path.strip_prefix('/')?;
    if rest.is_empty() {
        return Some(Vec::new());
    }

    rest.split('/')
        .map(|segment| {
            if segment.is_empty() {
                return None;
            }
            match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(name)
                    if !name.is_empty()
                        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') =>
                {
                    Some(Segment::Capture(name))
                }
                Some(_) => None,
                None if segment.contains(['{', '}']) => None,
                None => Some(Segment::Literal(segment)),
            }
        })
        .collect()
}

/// Splits a request path into segments after dropping one trailing slash.
fn request_segments(path: &str) -> Option<Vec<&str>> {
    let path = path.strip_suffix('/').unwrap_or(path);
    if path.is_empty() {
        return Some(Vec::new());
    }

    path.strip_prefix('/')?
        .split('/')
        .map(|segment| (!segment.is_empty()).then_some(segment))
        .collect()
}

/// True if every path matched by `specific` is also matched by `general`.
fn covers(general: &[Segment<'_>], specific: &[Segment<'_>]) -> bool {
    general.len() == specific.len()
        && general.iter().zip(specific).all(|pair| match pair {
            (Segment::Capture(_), _) => true,
            (Segment::Literal(a), Segment::Literal(b)) => a == b,
            (Segment::Literal(_), Segment::Capture(_)) => false,
        })
}

/// True if both patterns reach the same segment through an identical prefix
/// and capture it under different names.
fn captures_conflict(a: &[Segment<'_>], b: &[Segment<'_>]) -> bool {
    for pair in a.iter().zip(b) {
        match pair {
            (Segment::Literal(x), Segment::Literal(y)) if x == y => {}
            (Segment::Capture(x), Segment::Capture(y)) if x == y => {}
            (Segment::Capture(_), Segment::Capture(_)) => return true,
            _ => return false,
        }
    }
    false
}

fn capture(pattern: &[Segment<'_>], concrete: &[&str]) -> Option<Vec<(String, String)>> {
    if pattern.len() != concrete.len() {
        return None;
    }

    let mut params = Vec::new();
    for (segment, value) in pattern.iter().zip(concrete) {
        match segment {
            Segment::Literal(literal) if literal == value => {}
            Segment::Literal(_) => return None,
            Segment::Capture(name) => params.push((name.to_string(), value.to_string())),
        }
    }

    Some(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::{AuthService, PostService};
    use crate::domain::entities::Post;
    use crate::domain::repositories::MockPostRepository;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use chrono::{Duration, Utc};
    use serde_json::json;
    use std::sync::Arc;

    const SECRET: &str = "route-table-secret";

    fn make_server(repo: MockPostRepository) -> (TestServer, Arc<AuthService>) {
        let auth_service = Arc::new(AuthService::new(SECRET, 0));
        let state = AppState::new(
            Arc::new(PostService::new(Arc::new(repo))),
            auth_service.clone(),
        );
        let app = post_routes(&state).with_state(state);
        (TestServer::new(app).unwrap(), auth_service)
    }

    fn bearer(auth: &AuthService, subject: &str, ttl: Duration) -> String {
        format!("Bearer {}", auth.issue_token(subject, ttl).unwrap())
    }

    fn stored_post(id: i64, author: &str) -> Post {
        let now = Utc::now();
        Post::new(
            id,
            "Title".to_string(),
            "Content".to_string(),
            author.to_string(),
            now,
            now,
        )
    }

    #[test]
    fn test_post_routes_table_is_valid() {
        assert!(RouteTable::new(POST_ROUTES.to_vec()).is_ok());
    }

    #[test]
    fn test_handler_chains() {
        let chains: Vec<(String, Vec<Handler>)> = RouteTable::posts()
            .entries()
            .iter()
            .map(|e| (format!("{} {}", e.method, e.path), e.chain()))
            .collect();

        assert_eq!(
            chains,
            vec![
                (
                    "POST /create".to_string(),
                    vec![Handler::Guard(Guard::Bearer), Handler::Action(Action::Create)]
                ),
                ("GET /".to_string(), vec![Handler::Action(Action::List)]),
                ("GET /{id}".to_string(), vec![Handler::Action(Action::Get)]),
                (
                    "PUT /{id}".to_string(),
                    vec![Handler::Guard(Guard::Bearer), Handler::Action(Action::Update)]
                ),
                (
                    "DELETE /{id}".to_string(),
                    vec![Handler::Guard(Guard::Bearer), Handler::Action(Action::Delete)]
                ),
            ]
        );
    }

    #[test]
    fn test_entry_display() {
        assert_eq!(POST_ROUTES[0].to_string(), "POST /create [bearer] -> create");
        assert_eq!(POST_ROUTES[2].to_string(), "GET /{id} -> get");
    }

    #[test]
    fn test_literal_after_wildcard_is_rejected() {
        let entries = vec![
            RouteEntry {
                method: RouteMethod::Get,
                path: "/{id}",
                guards: &[],
                action: Action::Get,
            },
            RouteEntry {
                method: RouteMethod::Get,
                path: "/create",
                guards: &[],
                action: Action::List,
            },
        ];

        assert_eq!(
            RouteTable::new(entries).unwrap_err(),
            RouteTableError::Shadowed {
                method: RouteMethod::Get,
                literal: "/create".to_string(),
                wildcard: "/{id}".to_string(),
            }
        );
    }

    #[test]
    fn test_literal_before_wildcard_is_accepted() {
        let entries = vec![
            RouteEntry {
                method: RouteMethod::Get,
                path: "/latest",
                guards: &[],
                action: Action::List,
            },
            RouteEntry {
                method: RouteMethod::Get,
                path: "/{id}",
                guards: &[],
                action: Action::Get,
            },
        ];

        let table = RouteTable::new(entries).unwrap();
        let matched = table.resolve(&Method::GET, "/latest").unwrap();
        assert_eq!(matched.entry.action, Action::List);
    }

    #[test]
    fn test_duplicate_route_is_rejected() {
        let entries = vec![
            RouteEntry {
                method: RouteMethod::Put,
                path: "/{id}",
                guards: &[Guard::Bearer],
                action: Action::Update,
            },
            RouteEntry {
                method: RouteMethod::Put,
                path: "/{post_id}",
                guards: &[],
                action: Action::Update,
            },
        ];

        assert!(matches!(
            RouteTable::new(entries),
            Err(RouteTableError::Duplicate { .. })
        ));
    }

    #[test]
    fn test_capture_names_conflicting_across_methods_are_rejected() {
        let entries = vec![
            RouteEntry {
                method: RouteMethod::Get,
                path: "/{post_id}",
                guards: &[],
                action: Action::Get,
            },
            RouteEntry {
                method: RouteMethod::Put,
                path: "/{id}",
                guards: &[Guard::Bearer],
                action: Action::Update,
            },
        ];

        assert_eq!(
            RouteTable::new(entries).unwrap_err(),
            RouteTableError::CaptureConflict {
                path: "/{id}".to_string(),
                other: "/{post_id}".to_string(),
            }
        );
    }

    #[test]
    fn test_nested_capture_conflict_is_rejected() {
        let entries = vec![
            RouteEntry {
                method: RouteMethod::Get,
                path: "/{id}",
                guards: &[],
                action: Action::Get,
            },
            RouteEntry {
                method: RouteMethod::Get,
                path: "/{post_id}/comments",
                guards: &[],
                action: Action::List,
            },
        ];

        assert!(matches!(
            RouteTable::new(entries),
            Err(RouteTableError::CaptureConflict { .. })
        ));
    }

    #[test]
    fn test_accepted_tables_build_a_router() {
        let entries = vec![
            RouteEntry {
                method: RouteMethod::Get,
                path: "/latest",
                guards: &[],
                action: Action::List,
            },
            RouteEntry {
                method: RouteMethod::Get,
                path: "/{id}",
                guards: &[],
                action: Action::Get,
            },
            RouteEntry {
                method: RouteMethod::Delete,
                path: "/{id}",
                guards: &[Guard::Bearer],
                action: Action::Delete,
            },
        ];

        let table = RouteTable::new(entries).unwrap();
        let state = AppState::new(
            Arc::new(PostService::new(Arc::new(MockPostRepository::new()))),
            Arc::new(AuthService::new(SECRET, 0)),
        );

        let _router = table.into_router(&state);
    }

    #[test]
    fn test_invalid_patterns_are_rejected() {
        for path in ["create", "/a//b", "/{}", "/{id", "/x{id}", "/{a-b}"] {
            let entries = vec![RouteEntry {
                method: RouteMethod::Get,
                path,
                guards: &[],
                action: Action::Get,
            }];
            assert_eq!(
                RouteTable::new(entries).unwrap_err(),
                RouteTableError::InvalidPath(path.to_string()),
                "{path}"
            );
        }

        assert_eq!(RouteTable::new(vec![]).unwrap_err(), RouteTableError::Empty);
    }

    #[test]
    fn test_resolve_binds_id() {
        let table = RouteTable::posts();

        let matched = table.resolve(&Method::GET, "/42").unwrap();

        assert_eq!(matched.entry.action, Action::Get);
        assert_eq!(matched.param("id"), Some("42"));
    }

    #[test]
    fn test_resolve_all_routes() {
        let table = RouteTable::posts();

        let cases = [
            (Method::POST, "/create", Action::Create),
            (Method::GET, "/", Action::List),
            (Method::GET, "", Action::List),
            (Method::GET, "/7/", Action::Get),
            (Method::PUT, "/7", Action::Update),
            (Method::DELETE, "/7", Action::Delete),
        ];

        for (method, path, action) in cases {
            let matched = table.resolve(&method, path).unwrap();
            assert_eq!(matched.entry.action, action, "{method} {path}");
        }
    }

    #[test]
    fn test_resolve_misses() {
        let table = RouteTable::posts();

        assert!(table.resolve(&Method::PATCH, "/7").is_none());
        assert!(table.resolve(&Method::POST, "/7").is_none());
        assert!(table.resolve(&Method::DELETE, "/").is_none());
        assert!(table.resolve(&Method::GET, "/7/comments").is_none());
        assert!(table.resolve(&Method::GET, "//7").is_none());
        assert!(table.resolve(&Method::GET, "/7//").is_none());
        assert!(table.resolve(&Method::GET, "7").is_none());
    }

    #[tokio::test]
    async fn test_create_without_token_never_reaches_action() {
        let mut repo = MockPostRepository::new();
        repo.expect_create().never();

        let (server, _) = make_server(repo);

        let response = server
            .post("/create")
            .json(&json!({ "title": "Hello", "content": "World" }))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["error"]["details"]["reason"], "missing_token");
    }

    #[tokio::test]
    async fn test_create_with_token_calls_action_once_with_identity() {
        let mut repo = MockPostRepository::new();
        repo.expect_create()
            .withf(|new_post| new_post.author == "alice")
            .times(1)
            .returning(|new_post| {
                let mut post = stored_post(1, &new_post.author);
                post.title = new_post.title;
                post.content = new_post.content;
                Ok(post)
            });

        let (server, auth) = make_server(repo);

        let response = server
            .post("/create")
            .add_header("Authorization", bearer(&auth, "alice", Duration::hours(1)))
            .json(&json!({ "title": "Hello", "content": "World" }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["author"], "alice");
        assert_eq!(body["title"], "Hello");
    }

    #[tokio::test]
    async fn test_delete_with_expired_token_never_reaches_action() {
        let mut repo = MockPostRepository::new();
        repo.expect_find_by_id().never();
        repo.expect_delete().never();

        let (server, auth) = make_server(repo);

        let response = server
            .delete("/7")
            .add_header("Authorization", bearer(&auth, "alice", Duration::hours(-1)))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["error"]["details"]["reason"], "expired_token");
    }

    #[tokio::test]
    async fn test_update_with_forged_token_never_reaches_action() {
        let mut repo = MockPostRepository::new();
        repo.expect_find_by_id().never();
        repo.expect_update().never();

        let (server, _) = make_server(repo);
        let forger = AuthService::new("some-other-secret", 0);

        let response = server
            .put("/7")
            .add_header("Authorization", bearer(&forger, "alice", Duration::hours(1)))
            .json(&json!({ "title": "Hijacked" }))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_get_binds_id_before_action() {
        let mut repo = MockPostRepository::new();
        repo.expect_find_by_id()
            .withf(|id| *id == 42)
            .times(1)
            .returning(|id| Ok(Some(stored_post(id, "alice"))));

        let (server, _) = make_server(repo);

        let response = server.get("/42").await;

        response.assert_status_ok();
        assert_eq!(response.json::<serde_json::Value>()["id"], 42);
    }

    #[tokio::test]
    async fn test_public_routes_ignore_credentials() {
        let mut repo = MockPostRepository::new();
        repo.expect_list().times(2).returning(|| Ok(vec![]));

        let (server, _) = make_server(repo);

        server.get("/").await.assert_status_ok();
        server
            .get("/")
            .add_header("Authorization", "Bearer garbage")
            .await
            .assert_status_ok();
    }
}
