//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store the compiled route table
//! - Run the first matching route's handler
//! - Fall through to `404 Not Found` when nothing answers
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - A handler may decline (missing header, no serving directory, file
//!   error); the scan then continues with the remaining routes

use crate::config::FilesConfig;
use crate::files::FileStore;
use crate::http::{Request, Response, StatusCode};
use crate::routing::matcher::{ExactMatcher, Matcher, PrefixMatcher};

/// The fixed set of routes, in match order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// `GET /`
    Root,
    /// `GET /echo/<text>`
    Echo,
    /// `GET /user-agent`
    UserAgent,
    /// `GET /files/<name>`
    ReadFile,
    /// `POST /files/<name>`
    WriteFile,
}

impl Route {
    pub fn name(&self) -> &'static str {
        match self {
            Route::Root => "root",
            Route::Echo => "echo",
            Route::UserAgent => "user_agent",
            Route::ReadFile => "read_file",
            Route::WriteFile => "write_file",
        }
    }
}

#[derive(Debug)]
struct CompiledRoute {
    route: Route,
    matcher: Box<dyn Matcher>,
}

impl CompiledRoute {
    fn new(route: Route, matcher: impl Matcher + 'static) -> Self {
        Self {
            route,
            matcher: Box::new(matcher),
        }
    }
}

/// Dispatches parsed requests to the route handlers.
#[derive(Debug)]
pub struct Router {
    routes: Vec<CompiledRoute>,
    files: Option<FileStore>,
}

impl Router {
    /// Build the route table. `files` is the serving directory, if any.
    pub fn new(files: Option<FileStore>) -> Self {
        let routes = vec![
            CompiledRoute::new(Route::Root, ExactMatcher::new("GET", "/")),
            CompiledRoute::new(Route::Echo, PrefixMatcher::new("GET", "/echo/")),
            CompiledRoute::new(Route::UserAgent, ExactMatcher::new("GET", "/user-agent")),
            CompiledRoute::new(Route::ReadFile, PrefixMatcher::new("GET", "/files/")),
            CompiledRoute::new(Route::WriteFile, PrefixMatcher::new("POST", "/files/")),
        ];

        Self { routes, files }
    }

    pub fn from_config(config: &FilesConfig) -> Self {
        Self::new(FileStore::from_config(config))
    }

    /// Routes whose matcher accepts `req`, with the captured path tail.
    pub fn matching_routes<'a>(
        &'a self,
        req: &'a Request,
    ) -> impl Iterator<Item = (Route, &'a str)> + 'a {
        self.routes
            .iter()
            .filter_map(move |r| r.matcher.matches(req).map(|tail| (r.route, tail)))
    }

    /// Produce the response for `req`.
    pub async fn dispatch(&self, req: &Request) -> Response {
        for (route, tail) in self.matching_routes(req) {
            if let Some(response) = self.handle(route, tail, req).await {
                tracing::debug!(route = route.name(), status = response.status.code(), "Route matched");
                return response;
            }
        }

        tracing::debug!(method = %req.method, path = %req.path, "No route matched");
        Response::not_found()
    }

    async fn handle(&self, route: Route, tail: &str, req: &Request) -> Option<Response> {
        match route {
            Route::Root => Some(Response::new(StatusCode::Ok)),
            Route::Echo => Some(Response::text(tail)),
            Route::UserAgent => req.header("user-agent").map(Response::text),
            Route::ReadFile => {
                let files = self.files.as_ref()?;
                match files.read(tail).await {
                    Ok(contents) => Some(Response::octets(contents)),
                    Err(e) => {
                        tracing::warn!(name = %tail, error = %e, "File read failed");
                        None
                    }
                }
            }
            Route::WriteFile => {
                let files = self.files.as_ref()?;
                match files.write(tail, &req.body).await {
                    Ok(()) => Some(Response::new(StatusCode::Created)),
                    Err(e) => {
                        tracing::warn!(name = %tail, error = %e, "File write failed");
                        None
                    }
                }
            }
        }
    }
}
