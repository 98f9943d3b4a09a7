//! Roles, permissions and the authenticated session
//!
//! A `Session` is an explicit value owned by the caller. Logging in and out are
//! its only mutations; every permission check reads the role it holds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::User;
use crate::error::{Result, SimulationError};

/// User role (wire codes 1 = Admin, 2 = Agent, 3 = User)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "u8")]
pub enum Role {
    Admin,
    Agent,
    User,
}

impl Role {
    pub fn code(&self) -> u8 {
        match self {
            Role::Admin => 1,
            Role::Agent => 2,
            Role::User => 3,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Agent => "Agent",
            Role::User => "User",
        }
    }

    /// Whether an authenticated user with this role holds `permission`
    pub fn allows(&self, permission: Permission) -> bool {
        use Permission::*;

        match permission {
            SimulationCreate | SimulationDelete | ClientCreate | ClientEdit | ClientDelete
            | ClientViewAll | PropertyCreate | PropertyView | ReportView => true,
            SimulationViewAll | PropertyEdit | PropertyDelete => {
                matches!(self, Role::Admin | Role::Agent)
            }
            BankManage | UserManage => matches!(self, Role::Admin),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<Role> for u8 {
    fn from(role: Role) -> u8 {
        role.code()
    }
}

impl TryFrom<u8> for Role {
    type Error = SimulationError;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            1 => Ok(Role::Admin),
            2 => Ok(Role::Agent),
            3 => Ok(Role::User),
            other => Err(SimulationError::UnknownRole(other.to_string())),
        }
    }
}

impl FromStr for Role {
    type Err = SimulationError;

    /// Accepts a numeric code ("2") or a case-insensitive name ("agent")
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if let Ok(code) = trimmed.parse::<u8>() {
            return Role::try_from(code);
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "agent" => Ok(Role::Agent),
            "user" => Ok(Role::User),
            _ => Err(SimulationError::UnknownRole(s.to_string())),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRole {
    Code(u64),
    Name(String),
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let parsed = match RawRole::deserialize(deserializer)? {
            RawRole::Code(code) => u8::try_from(code)
                .map_err(|_| SimulationError::UnknownRole(code.to_string()))
                .and_then(Role::try_from),
            RawRole::Name(name) => name.parse(),
        };
        parsed.map_err(serde::de::Error::custom)
    }
}

/// Actions gated by role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    SimulationCreate,
    SimulationViewAll,
    SimulationDelete,
    ClientCreate,
    ClientEdit,
    ClientDelete,
    ClientViewAll,
    PropertyCreate,
    PropertyEdit,
    PropertyDelete,
    PropertyView,
    BankManage,
    UserManage,
    ReportView,
}

impl Permission {
    pub const ALL: [Permission; 14] = [
        Permission::SimulationCreate,
        Permission::SimulationViewAll,
        Permission::SimulationDelete,
        Permission::ClientCreate,
        Permission::ClientEdit,
        Permission::ClientDelete,
        Permission::ClientViewAll,
        Permission::PropertyCreate,
        Permission::PropertyEdit,
        Permission::PropertyDelete,
        Permission::PropertyView,
        Permission::BankManage,
        Permission::UserManage,
        Permission::ReportView,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Permission::SimulationCreate => "simulation.create",
            Permission::SimulationViewAll => "simulation.viewAll",
            Permission::SimulationDelete => "simulation.delete",
            Permission::ClientCreate => "client.create",
            Permission::ClientEdit => "client.edit",
            Permission::ClientDelete => "client.delete",
            Permission::ClientViewAll => "client.viewAll",
            Permission::PropertyCreate => "property.create",
            Permission::PropertyEdit => "property.edit",
            Permission::PropertyDelete => "property.delete",
            Permission::PropertyView => "property.view",
            Permission::BankManage => "bank.manage",
            Permission::UserManage => "user.manage",
            Permission::ReportView => "report.view",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Permission {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self> {
        Permission::ALL
            .into_iter()
            .find(|permission| permission.key() == s)
            .ok_or_else(|| SimulationError::invalid_input("permission", format!("unknown key '{}'", s)))
    }
}

/// Authenticated user plus bearer token
#[derive(Debug, Clone, Default)]
pub struct Session {
    user: Option<User>,
    token: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn login(&mut self, user: User, token: impl Into<String>) {
        log::info!("User '{}' logged in as {}", user.username, user.role);
        self.user = Some(user);
        self.token = Some(token.into());
    }

    pub fn logout(&mut self) {
        if let Some(user) = self.user.take() {
            log::info!("User '{}' logged out", user.username);
        }
        self.token = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|user| user.role)
    }

    pub fn can(&self, permission: Permission) -> bool {
        self.is_authenticated() && self.role().is_some_and(|role| role.allows(permission))
    }

    pub fn require(&self, permission: Permission) -> Result<()> {
        if !self.is_authenticated() {
            return Err(SimulationError::NotAuthenticated);
        }
        if !self.can(permission) {
            return Err(SimulationError::PermissionDenied(permission));
        }
        Ok(())
    }

    /// `Authorization` header value for backend requests
    pub fn bearer_header(&self) -> Option<String> {
        self.token.as_ref().map(|token| format!("Bearer {}", token))
    }
}
