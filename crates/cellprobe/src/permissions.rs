//! Runtime permission checks.
//!
//! The probe only ever asks whether a permission is held. Requesting one
//! needs UI context and belongs to the host.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// A runtime permission the probe depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    FineLocation,
    CoarseLocation,
    ReadPhoneState,
}

/// Every permission the probe requires, in check order.
pub const REQUIRED_PERMISSIONS: [Permission; 3] = [
    Permission::FineLocation,
    Permission::CoarseLocation,
    Permission::ReadPhoneState,
];

impl Permission {
    /// Name used by the mobile platform's permission manager.
    pub fn platform_name(self) -> &'static str {
        match self {
            Permission::FineLocation => "android.permission.ACCESS_FINE_LOCATION",
            Permission::CoarseLocation => "android.permission.ACCESS_COARSE_LOCATION",
            Permission::ReadPhoneState => "android.permission.READ_PHONE_STATE",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Permission::FineLocation => write!(f, "fine_location"),
            Permission::CoarseLocation => write!(f, "coarse_location"),
            Permission::ReadPhoneState => write!(f, "read_phone_state"),
        }
    }
}

impl std::str::FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        REQUIRED_PERMISSIONS
            .into_iter()
            .find(|p| p.to_string() == s || p.platform_name() == s)
            .ok_or_else(|| format!("unknown permission: {s}"))
    }
}

/// Yes/no permission query against the host OS.
pub trait PermissionChecker: Send + Sync {
    fn is_granted(&self, permission: Permission) -> bool;

    /// True when every permission in [`REQUIRED_PERMISSIONS`] is held.
    fn all_required_granted(&self) -> bool {
        REQUIRED_PERMISSIONS.iter().all(|p| self.is_granted(*p))
    }
}

/// A fixed set of granted permissions, typically from configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrantedPermissions {
    granted: HashSet<Permission>,
}

impl GrantedPermissions {
    pub fn new(granted: impl IntoIterator<Item = Permission>) -> Self {
        Self {
            granted: granted.into_iter().collect(),
        }
    }

    pub fn all() -> Self {
        Self::new(REQUIRED_PERMISSIONS)
    }

    pub fn none() -> Self {
        Self::default()
    }

    /// Build from permission names, accepting short or platform names.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, String> {
        let granted = names
            .iter()
            .map(|n| n.as_ref().trim().parse::<Permission>())
            .collect::<Result<HashSet<_>, _>>()?;
        Ok(Self { granted })
    }

    pub fn missing(&self) -> Vec<Permission> {
        REQUIRED_PERMISSIONS
            .into_iter()
            .filter(|p| !self.granted.contains(p))
            .collect()
    }
}

impl PermissionChecker for GrantedPermissions {
    fn is_granted(&self, permission: Permission) -> bool {
        self.granted.contains(&permission)
    }
}
