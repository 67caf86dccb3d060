//! Route guard.

use crate::config::EngineConfig;
use crate::menu::MenuNode;
use recruitdesk_types::Role;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

/// User-facing denial: show `message`, then navigate to `redirect_to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessDenied {
    pub route: String,
    pub redirect_to: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum RouteDecision {
    Allow,
    Deny(AccessDenied),
}

impl RouteDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Route checks against one resolved menu. Rebuilt on every resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGuard {
    role: Role,
    routes: BTreeSet<String>,
    login_route: String,
    root_route: String,
}

impl RouteGuard {
    pub fn new(role: Role, menu: &[MenuNode], config: &EngineConfig) -> Self {
        let routes = menu
            .iter()
            .flat_map(MenuNode::routes)
            .map(str::to_string)
            .collect();
        Self {
            role,
            routes,
            login_route: config.login_route.clone(),
            root_route: config.root_route.clone(),
        }
    }

    pub fn can_access_route(&self, route: &str) -> bool {
        if route == self.login_route || route == self.root_route {
            return true;
        }
        match self.role {
            Role::SuperAdmin => true,
            Role::Admin | Role::Staff => self.routes.contains(route),
        }
    }

    /// Precondition check before rendering a protected view.
    pub fn require_route(&self, route: &str) -> RouteDecision {
        if self.can_access_route(route) {
            return RouteDecision::Allow;
        }
        debug!(route, role = %self.role, "Route denied");
        RouteDecision::Deny(AccessDenied {
            route: route.to_string(),
            redirect_to: self.root_route.clone(),
            message: "You do not have access to this page.".to_string(),
        })
    }

    pub fn root_route(&self) -> &str {
        &self.root_route
    }
}
