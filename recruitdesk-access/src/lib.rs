//! Permission resolution, menu assembly and delegation checks for RecruitDesk.
//!
//! Given a user's role, the global feature-flag ceiling and per-user
//! overrides, this crate computes what the user may reach for the length of
//! a session, and enforces that no effective permission ever exceeds what a
//! super-ordinate role has authorized.
//!
//! # Components
//!
//! - **Resolver**: merges role + ceiling + overrides into an
//!   `EffectivePermissionSet`; granular tabs resolve independently
//! - **Menu / tabs**: filter the module catalog into a menu tree and a
//!   candidate tab list
//! - **Route guard**: decides whether a route may be rendered
//! - **Delegation**: decides what a grantor may hand out to whom
//! - **Session**: fetches inputs, resolves, and tracks staleness
//! - **Admin**: the validated write path for flags, overrides and tabs
//!
//! # Example
//!
//! ```
//! use recruitdesk_access::{resolve_modules, GlobalFlagSet, OverrideSet};
//! use recruitdesk_types::{ModuleKey, Role};
//!
//! let ceiling: GlobalFlagSet = [
//!     (ModuleKey::new("docs"), true),
//!     (ModuleKey::new("finance"), false),
//! ]
//! .into_iter()
//! .collect();
//! let overrides: OverrideSet = [(ModuleKey::new("finance"), true)].into_iter().collect();
//!
//! let effective = resolve_modules(Role::Staff, &ceiling, &overrides);
//! assert_eq!(effective[&ModuleKey::new("docs")], true);
//! assert_eq!(effective[&ModuleKey::new("finance")], false);
//! ```

mod admin;
mod config;
mod delegation;
mod error;
mod guard;
mod menu;
mod resolver;
mod session;
mod sets;
mod tabs;

pub use admin::PermissionAdmin;
pub use config::{EngineConfig, DEFAULT_LOGIN_ROUTE, DEFAULT_ROOT_ROUTE, DEFAULT_STAFF_DENIED_KEYS};
pub use delegation::{DelegationPolicy, Grantor};
pub use error::{AccessError, AccessResult};
pub use guard::{AccessDenied, RouteDecision, RouteGuard};
pub use menu::{active_entry, build_menu, MenuNode, MenuState};
pub use resolver::{resolve, resolve_modules, resolve_tabs, EffectivePermissionSet};
pub use session::{PermissionSession, PermissionSnapshot, ResolutionWarning};
pub use sets::{GlobalFlagSet, GranularTabSet, OverrideSet};
pub use tabs::{build_candidate_tabs, select_tab, CandidateTabList, TabNode, TabSelection};
