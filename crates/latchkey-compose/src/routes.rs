//! Route table and CORS policy.
//!
//! Routes map HTTP path templates to function resources. A template may
//! end in a `{proxy+}` segment, which forwards every sub-path to the
//! target. Registering a template whose method set overlaps an existing
//! registration at the same path fails with a collision error; routes
//! are never silently merged.
//!
//! CORS preflight (`OPTIONS`) is answered by the table itself with a
//! fixed header set; no target function is consulted.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ComposeError, ComposeResult};

const PROXY_SEGMENT: &str = "{proxy+}";

/// HTTP methods a route accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteMethods {
    /// Every method, including ones added later.
    Any,
    Only(Vec<String>),
}

impl RouteMethods {
    fn overlaps(&self, other: &RouteMethods) -> bool {
        match (self, other) {
            (RouteMethods::Any, _) | (_, RouteMethods::Any) => true,
            (RouteMethods::Only(a), RouteMethods::Only(b)) => {
                a.iter().any(|m| b.contains(m))
            }
        }
    }
}

/// Authentication requirement on a route tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// Valid identity-pool-issued token required before the target runs.
    IdentityPool,
    /// Open; third-party callback delivery.
    None,
}

/// One path-template → function mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub path: String,
    pub methods: RouteMethods,
    pub auth: AuthMode,
    /// Resource id of the target function.
    pub target: String,
}

impl Route {
    pub fn proxy(base: &str, auth: AuthMode, target: &str) -> Self {
        let base = base.trim_end_matches('/');
        Route {
            path: format!("{base}/{PROXY_SEGMENT}"),
            methods: RouteMethods::Any,
            auth,
            target: target.to_string(),
        }
    }

    /// Whether a concrete request path falls under this template.
    pub fn matches(&self, path: &str) -> bool {
        match self.path.strip_suffix(PROXY_SEGMENT) {
            Some(prefix) => path.starts_with(prefix) && path.len() > prefix.len(),
            None => self.path == path,
        }
    }
}

/// Fixed CORS policy answered on preflight for the authenticated tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorsPolicy {
    pub allow_headers: Vec<String>,
    pub allow_origin: String,
    pub allow_credentials: bool,
    pub allow_methods: Vec<String>,
}

impl Default for CorsPolicy {
    fn default() -> Self {
        CorsPolicy {
            allow_headers: [
                "Content-Type",
                "X-Amz-Date",
                "X-Amz-Security-Token",
                "Authorization",
                "X-Api-Key",
                "X-Requested-With",
                "Accept",
                "Access-Control-Allow-Methods",
                "Access-Control-Allow-Origin",
                "Access-Control-Allow-Headers",
            ]
            .iter()
            .map(|h| h.to_string())
            .collect(),
            allow_origin: "*".to_string(),
            allow_credentials: false,
            allow_methods: ["OPTIONS", "GET", "PUT", "POST", "DELETE"]
                .iter()
                .map(|m| m.to_string())
                .collect(),
        }
    }
}

impl CorsPolicy {
    /// The four `Access-Control-Allow-*` response headers.
    pub fn preflight_headers(&self) -> BTreeMap<String, String> {
        let mut headers = BTreeMap::new();
        headers.insert(
            "Access-Control-Allow-Headers".to_string(),
            self.allow_headers.join(","),
        );
        headers.insert(
            "Access-Control-Allow-Origin".to_string(),
            self.allow_origin.clone(),
        );
        headers.insert(
            "Access-Control-Allow-Credentials".to_string(),
            self.allow_credentials.to_string(),
        );
        headers.insert(
            "Access-Control-Allow-Methods".to_string(),
            self.allow_methods.join(","),
        );
        headers
    }
}

/// Collision-checked set of routes.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
    cors: CorsPolicy,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route. Same path with an overlapping method set is a
    /// collision regardless of target.
    pub fn register(&mut self, route: Route) -> ComposeResult<()> {
        if let Some(existing) = self
            .routes
            .iter()
            .find(|r| r.path == route.path && r.methods.overlaps(&route.methods))
        {
            return Err(ComposeError::RouteCollision {
                path: route.path,
                existing_target: existing.target.clone(),
            });
        }
        debug!(path = %route.path, target = %route.target, "route registered");
        self.routes.push(route);
        Ok(())
    }

    /// Resolve a concrete path to its route, if any.
    pub fn resolve(&self, path: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.matches(path))
    }

    /// Answer a CORS preflight for a path under a registered tree. The
    /// target function is never consulted; the header set is fixed.
    pub fn preflight(&self, path: &str) -> Option<BTreeMap<String, String>> {
        self.resolve(path)?;
        Some(self.cors.preflight_headers())
    }

    pub fn cors(&self) -> &CorsPolicy {
        &self.cors
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    pub(crate) fn into_routes(self) -> Vec<Route> {
        self.routes
    }
}
