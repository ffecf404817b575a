use std::fmt;

use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Identity-provider subject (`sub` claim).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into)]
#[serde(transparent)]
pub struct SubjectId(pub String);

/// Raw bearer token as issued by the identity provider.
///
/// `Debug` is redacted so tokens don't end up in logs.
#[derive(Clone, PartialEq, Eq, Hash, From, Into)]
pub struct AccessToken(String);

impl AccessToken {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Role tag carried in the identity claims.
///
/// Parsing is case-insensitive and treats `_` and `-` alike, so `MOT_ADMIN`,
/// `mot-admin` and `mot` all resolve to [`Role::MotOfficial`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Role {
    Admin,
    MotOfficial,
    Conductor,
    Timekeeper,
    PassengerService,
    FleetOperator,
}

impl Role {
    pub const ALL: [Self; 6] = [
        Self::Admin,
        Self::MotOfficial,
        Self::Conductor,
        Self::Timekeeper,
        Self::PassengerService,
        Self::FleetOperator,
    ];

    /// Canonical tag.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::MotOfficial => "mot-admin",
            Self::Conductor => "conductor",
            Self::Timekeeper => "timekeeper",
            Self::PassengerService => "passenger-service",
            Self::FleetOperator => "fleet-operator",
        }
    }

    /// Human-readable label for menus and profile pages.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Admin => "System Administrator",
            Self::MotOfficial => "Ministry of Transport Official",
            Self::Conductor => "Conductor",
            Self::Timekeeper => "Timekeeper",
            Self::PassengerService => "Passenger Service",
            Self::FleetOperator => "Fleet Operator",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "admin" | "system-admin" => Ok(Self::Admin),
            "mot-admin" | "mot" | "mot-official" => Ok(Self::MotOfficial),
            "conductor" => Ok(Self::Conductor),
            "timekeeper" | "time-keeper" => Ok(Self::Timekeeper),
            "passenger-service" => Ok(Self::PassengerService),
            "fleet-operator" | "operator" | "fleet-admin" => Ok(Self::FleetOperator),
            _ => Err(Error::UnknownRole(s.to_owned())),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_owned()
    }
}

/// Roles admitted by an [`AuthGate`](crate::AuthGate).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleSet {
    /// Any authenticated session, including one without a recognised role.
    Any,
    Only(Vec<Role>),
}

impl RoleSet {
    #[must_use]
    pub fn only(roles: impl IntoIterator<Item = Role>) -> Self {
        Self::Only(roles.into_iter().collect())
    }

    #[must_use]
    pub fn admits(&self, role: Option<Role>) -> bool {
        match self {
            Self::Any => true,
            Self::Only(roles) => role.is_some_and(|r| roles.contains(&r)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_tags_parse() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn aliases_parse() {
        assert_eq!("MOT_ADMIN".parse::<Role>().unwrap(), Role::MotOfficial);
        assert_eq!("mot".parse::<Role>().unwrap(), Role::MotOfficial);
        assert_eq!("Time_Keeper".parse::<Role>().unwrap(), Role::Timekeeper);
        assert_eq!("operator".parse::<Role>().unwrap(), Role::FleetOperator);
        assert_eq!(" system_admin ".parse::<Role>().unwrap(), Role::Admin);
    }

    #[test]
    fn unknown_role_rejected() {
        assert!(matches!(
            "authenticated".parse::<Role>(),
            Err(Error::UnknownRole(s)) if s == "authenticated"
        ));
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn role_serializes_as_canonical_tag() {
        let json = serde_json::to_string(&Role::FleetOperator).unwrap();
        assert_eq!(json, "\"fleet-operator\"");
        let parsed: Role = serde_json::from_str("\"FLEET_OPERATOR\"").unwrap();
        assert_eq!(parsed, Role::FleetOperator);
    }

    #[test]
    fn role_set_admits() {
        let set = RoleSet::only([Role::Admin]);
        assert!(set.admits(Some(Role::Admin)));
        assert!(!set.admits(Some(Role::MotOfficial)));
        assert!(!set.admits(None));

        assert!(RoleSet::Any.admits(None));
        assert!(RoleSet::Any.admits(Some(Role::Conductor)));
    }

    #[test]
    fn access_token_debug_is_redacted() {
        let token = AccessToken::from("secret.token.value".to_string());
        assert_eq!(format!("{token:?}"), "AccessToken(***)");
        assert_eq!(token.as_str(), "secret.token.value");
    }
}
