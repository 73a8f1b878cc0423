//! Access-control evaluation.
//!
//! Nodes only carry a declarative [`AccessControl`]; deciding whether a
//! subject may see a node is delegated to a [`PermissionChecker`].

use std::collections::BTreeSet;

use crate::node::AccessControl;

/// The authenticated (or anonymous) party a user sitemap is derived for.
///
/// Equality and hashing cover everything that affects filtering, so a
/// `Subject` can key a cache of derived sitemaps directly.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Subject {
    authenticated: bool,
    roles: BTreeSet<String>,
    permissions: BTreeSet<String>,
}

impl Subject {
    /// Anonymous subject with no roles or permissions.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Authenticated subject with no roles or permissions yet.
    #[must_use]
    pub fn authenticated() -> Self {
        Self {
            authenticated: true,
            ..Self::default()
        }
    }

    /// Add roles.
    #[must_use]
    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles.extend(roles.into_iter().map(Into::into));
        self
    }

    /// Add permissions.
    #[must_use]
    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions
            .extend(permissions.into_iter().map(Into::into));
        self
    }

    /// True if the subject has logged in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// True if the subject holds `role`.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    /// True if the subject holds `permission`.
    #[must_use]
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    /// Printable summary of everything that affects filtering.
    ///
    /// Roles and permissions are quoted, so distinct subjects never share a
    /// fingerprint even when a role name contains a separator.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let state = if self.authenticated { "auth" } else { "anon" };
        format!(
            "{state};roles={:?};perms={:?}",
            self.roles, self.permissions
        )
    }
}

/// Decides whether a subject may see a node.
pub trait PermissionChecker: Send + Sync {
    /// True if `subject` may see a node with `access` and `roles`.
    fn is_allowed(&self, access: &AccessControl, roles: &[String], subject: &Subject) -> bool;
}

/// Role and permission based [`PermissionChecker`].
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultPermissionChecker;

impl PermissionChecker for DefaultPermissionChecker {
    fn is_allowed(&self, access: &AccessControl, roles: &[String], subject: &Subject) -> bool {
        match access {
            AccessControl::Public => true,
            AccessControl::Authenticated => subject.is_authenticated(),
            AccessControl::Guest => !subject.is_authenticated(),
            AccessControl::Permission(permission) => {
                subject.is_authenticated() && subject.has_permission(permission)
            }
            AccessControl::Roles => roles.iter().any(|role| subject.has_role(role)),
        }
    }
}
