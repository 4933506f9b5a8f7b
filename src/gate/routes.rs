use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

use super::matcher::normalize;
use super::role::Principal;
use crate::config::ConfigError;

/// The route classification tables the gate decides against.
///
/// Built once at startup (defaults or a YAML file) and shared read-only
/// between requests. Role allow-lists are exact paths; trailing slashes on the
/// request path are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteTable {
    /// Exact paths anyone may open, signed in or not
    pub public: Vec<String>,
    /// Prefixes anyone may open (plain `starts_with`)
    pub public_prefixes: Vec<String>,
    /// Exact storefront paths ADMIN/SUPER are bounced off
    pub elevated_redirect: Vec<String>,
    /// Storefront prefixes ADMIN/SUPER are bounced off
    pub elevated_redirect_prefixes: Vec<String>,
    pub admin: Vec<String>,
    /// Added on top of `admin` for SUPER
    pub super_admin_extra: Vec<String>,
    pub user: Vec<String>,
    /// Where ADMIN/SUPER land when a path is not theirs
    pub admin_home: String,
    /// Where anonymous visitors and USER land when a path is not theirs
    pub storefront_home: String,
    /// Patterns the gate runs for
    pub matcher: Vec<String>,
    /// Pages the application serves, audited by `coverage_gaps`
    pub served: Vec<String>,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self {
            public: strings(&[
                "/",
                "/login",
                "/register",
                "/reset-password",
                "/reset-password-confirmation",
                "/manage-password",
                "/product",
            ]),
            public_prefixes: strings(&["/product"]),
            elevated_redirect: strings(&["/"]),
            elevated_redirect_prefixes: strings(&["/product"]),
            admin: strings(&[
                "/admin/dashboard",
                "/admin/category",
                "/admin/product",
                "/admin/stock-mutation",
            ]),
            super_admin_extra: strings(&["/admin/warehouse", "/admin/admin-management"]),
            user: strings(&[
                "/cartdetail",
                "/checkout",
                "/profile",
                "/managepayment",
                "/order",
                "/",
                "/product",
            ]),
            admin_home: "/admin/dashboard".to_string(),
            storefront_home: "/".to_string(),
            matcher: strings(&[
                "/",
                "/login",
                "/register",
                "/reset-password",
                "/reset-password-confirmation",
                "/manage-password",
                "/product/:path*",
                "/cartdetail",
                "/checkout",
                "/profile",
                "/managepayment",
                "/order",
                "/admin/:path*",
            ]),
            served: strings(&[
                "/",
                "/login",
                "/register",
                "/reset-password",
                "/reset-password-confirmation",
                "/manage-password",
                "/product",
                "/cartdetail",
                "/checkout",
                "/profile",
                "/managepayment",
                "/order",
                "/admin/dashboard",
                "/admin/category",
                "/admin/product",
                "/admin/stock-mutation",
                "/admin/warehouse",
                "/admin/admin-management",
                "/admin/order",
                "/admin/report/sales",
            ]),
        }
    }
}

impl RouteTable {
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        let table: RouteTable = serde_yaml::from_str(source)?;
        table.validate()?;
        Ok(table)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&source)
    }

    /// Reject tables whose redirect targets would themselves be redirected.
    ///
    /// Completeness against `served` is reported by
    /// [`RouteTable::coverage_gaps`], not rejected here.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.admin.iter().any(|p| same_path(p, &self.admin_home)) {
            return Err(ConfigError::InvalidRouteTable(format!(
                "admin_home '{}' is not in the admin allow-list",
                self.admin_home
            )));
        }
        if !self.is_public(&self.storefront_home) {
            return Err(ConfigError::InvalidRouteTable(format!(
                "storefront_home '{}' is not public",
                self.storefront_home
            )));
        }
        if self.is_elevated_storefront(&self.admin_home) {
            return Err(ConfigError::InvalidRouteTable(format!(
                "admin_home '{}' is itself redirected for elevated roles",
                self.admin_home
            )));
        }
        Ok(())
    }

    /// Public pages: an exact public path, or under a public prefix.
    pub fn is_public(&self, path: &str) -> bool {
        self.public.iter().any(|p| same_path(p, path))
            || self.public_prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// Storefront pages elevated roles must not see.
    pub fn is_elevated_storefront(&self, path: &str) -> bool {
        self.elevated_redirect.iter().any(|p| same_path(p, path))
            || self
                .elevated_redirect_prefixes
                .iter()
                .any(|prefix| path.starts_with(prefix.as_str()))
    }

    pub fn allows(&self, principal: &Principal, path: &str) -> bool {
        match principal {
            Principal::Admin => self.admin.iter().any(|p| same_path(p, path)),
            Principal::Super => self
                .admin
                .iter()
                .chain(self.super_admin_extra.iter())
                .any(|p| same_path(p, path)),
            Principal::User => self.user.iter().any(|p| same_path(p, path)),
            Principal::Anonymous | Principal::Other(_) => false,
        }
    }

    /// `admin` followed by `super_admin_extra`, without duplicates.
    pub fn super_admin_routes(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.admin
            .iter()
            .chain(self.super_admin_extra.iter())
            .map(String::as_str)
            .filter(|p| seen.insert(*p))
            .collect()
    }

    /// Served pages that no table governs.
    ///
    /// Such a page is public to nobody and allowed for no role, so every
    /// signed-in visitor gets bounced to their home page.
    pub fn coverage_gaps(&self) -> Vec<&str> {
        self.served
            .iter()
            .map(String::as_str)
            .filter(|path| {
                !self.is_public(path)
                    && !self.allows(&Principal::Admin, path)
                    && !self.allows(&Principal::Super, path)
                    && !self.allows(&Principal::User, path)
            })
            .collect()
    }
}

fn same_path(configured: &str, requested: &str) -> bool {
    normalize(configured) == normalize(requested)
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
