//! One profile page for every dashboard shell.

use time::format_description::well_known::Rfc3339;

use crate::dto::UserProfile;
use crate::router::Shell;
use crate::token::IdentityClaims;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileField {
    pub label: &'static str,
    pub value: String,
}

/// Data behind a profile page, keyed by the shell it renders in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileView {
    pub variant: Shell,
    pub display_name: String,
    pub initials: String,
    pub role_label: String,
    pub email: Option<String>,
    pub email_verified: bool,
    pub fields: Vec<ProfileField>,
    pub edit_route: String,
}

impl ProfileView {
    /// Merge the token claims with the API profile (when loaded) for `variant`.
    ///
    /// API values win over claims; claims fill in while the profile request
    /// is still in flight or failed.
    #[must_use]
    pub fn build(variant: Shell, claims: &IdentityClaims, profile: Option<&UserProfile>) -> Self {
        let email = profile
            .and_then(|p| p.email.clone())
            .or_else(|| claims.email.clone());

        let display_name = profile
            .and_then(|p| p.full_name.clone())
            .filter(|n| !n.trim().is_empty())
            .or_else(|| email.clone())
            .unwrap_or_else(|| claims.sub.to_string());

        let role_label = claims
            .role()
            .map(|r| r.label().to_owned())
            .or_else(|| profile.and_then(|p| p.role.clone()))
            .unwrap_or_else(|| "Unassigned".to_owned());

        let mut fields = Vec::new();
        push(&mut fields, "Full name", profile.and_then(|p| p.full_name.clone()));
        push(&mut fields, "Email", email.clone());
        push(&mut fields, "Phone", profile.and_then(|p| p.phone_number.clone()));
        push(&mut fields, "Role", Some(role_label.clone()));
        push(&mut fields, "Status", profile.and_then(|p| p.account_status.clone()));

        match variant {
            Shell::Admin => {
                let last_login = profile
                    .and_then(|p| p.last_login)
                    .and_then(|t| t.format(&Rfc3339).ok());
                push(&mut fields, "Last login", last_login);
            }
            Shell::Mot => {
                push(&mut fields, "Department", profile.and_then(|p| p.department.clone()));
                push(&mut fields, "Designation", profile.and_then(|p| p.designation.clone()));
            }
            Shell::Operator => {
                push(&mut fields, "Company", profile.and_then(|p| p.company_name.clone()));
                push(
                    &mut fields,
                    "Fleet size",
                    profile.and_then(|p| p.fleet_size).map(|n| n.to_string()),
                );
            }
            Shell::Unauthorized => {}
        }

        Self {
            variant,
            initials: initials(&display_name),
            display_name,
            role_label,
            email,
            email_verified: claims.email_verified.unwrap_or(false),
            fields,
            edit_route: format!("{}/profile/edit", variant.home_route()),
        }
    }

    #[must_use]
    pub fn field(&self, label: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.label == label)
            .map(|f| f.value.as_str())
    }
}

fn push(fields: &mut Vec<ProfileField>, label: &'static str, value: Option<String>) {
    if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
        fields.push(ProfileField { label, value });
    }
}

fn initials(name: &str) -> String {
    let source = name.split('@').next().unwrap_or(name);
    let initials: String = source
        .split(|c: char| c.is_whitespace() || c == '.' || c == '_' || c == '-')
        .filter_map(|word| word.chars().next())
        .filter(|c| c.is_alphanumeric())
        .take(2)
        .flat_map(char::to_uppercase)
        .collect();
    if initials.is_empty() {
        "?".to_owned()
    } else {
        initials
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::test_support::unsigned_token;
    use crate::token::decode_claims;

    fn claims(role: &str) -> IdentityClaims {
        decode_claims(&unsigned_token(&json!({
            "sub": "sub-1",
            "email": "kamal.silva@transport.gov.lk",
            "user_role": role,
            "email_verified": true,
            "exp": 4_000_000_000_i64,
        })))
        .unwrap()
    }

    fn profile() -> UserProfile {
        serde_json::from_value(json!({
            "id": "u1",
            "fullName": "Kamal Silva",
            "email": "kamal@transport.gov.lk",
            "phoneNumber": "+94 71 234 5678",
            "department": "Road Passenger Transport",
            "designation": "Deputy Director",
            "companyName": "Lanka Express",
            "fleetSize": 42,
            "lastLogin": "2024-05-01T08:30:00Z",
        }))
        .unwrap()
    }

    #[test]
    fn mot_variant_shows_department() {
        let view = ProfileView::build(Shell::Mot, &claims("mot-admin"), Some(&profile()));

        assert_eq!(view.display_name, "Kamal Silva");
        assert_eq!(view.initials, "KS");
        assert_eq!(view.role_label, "Ministry of Transport Official");
        assert_eq!(view.email.as_deref(), Some("kamal@transport.gov.lk"));
        assert!(view.email_verified);
        assert_eq!(view.field("Department"), Some("Road Passenger Transport"));
        assert_eq!(view.field("Designation"), Some("Deputy Director"));
        assert_eq!(view.field("Company"), None);
        assert_eq!(view.edit_route, "/mot/profile/edit");
    }

    #[test]
    fn operator_variant_shows_fleet() {
        let view = ProfileView::build(Shell::Operator, &claims("fleet-operator"), Some(&profile()));
        assert_eq!(view.field("Company"), Some("Lanka Express"));
        assert_eq!(view.field("Fleet size"), Some("42"));
        assert_eq!(view.field("Department"), None);
        assert_eq!(view.edit_route, "/operator/profile/edit");
    }

    #[test]
    fn admin_variant_shows_last_login() {
        let view = ProfileView::build(Shell::Admin, &claims("admin"), Some(&profile()));
        assert_eq!(view.field("Last login"), Some("2024-05-01T08:30:00Z"));
    }

    #[test]
    fn falls_back_to_claims_without_profile() {
        let view = ProfileView::build(Shell::Mot, &claims("mot-admin"), None);
        assert_eq!(view.display_name, "kamal.silva@transport.gov.lk");
        assert_eq!(view.initials, "KS");
        assert_eq!(view.field("Email"), Some("kamal.silva@transport.gov.lk"));
        assert_eq!(view.field("Department"), None);
    }

    #[test]
    fn unknown_role_is_unassigned() {
        let view = ProfileView::build(Shell::Unauthorized, &claims("driver"), None);
        assert_eq!(view.role_label, "Unassigned");
        assert_eq!(view.edit_route, "/unauthorized/profile/edit");
    }

    #[test]
    fn initials_edge_cases() {
        assert_eq!(initials("nimal"), "N");
        assert_eq!(initials("  "), "?");
        assert_eq!(initials("a b c"), "AB");
    }
}
