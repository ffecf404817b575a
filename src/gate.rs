//! Auth gate guarding a subtree of pages.
//!
//! Each [`check`](AuthGate::check) reads the session store and either admits
//! or redirects. The redirect is issued through a [`Navigator`] exactly once
//! per check; callers never have to deduplicate it.

use crate::clock::Clock;
use crate::router::{Shell, select_shell};
use crate::storage::CredentialStorage;
use crate::store::SessionStore;
use crate::token::Credential;
use crate::types::RoleSet;

/// Lifecycle of a gate. `Admitted` and `Redirecting` are terminal for the
/// current check; the next navigation starts over at `Checking`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Unchecked,
    Checking,
    Admitted,
    Redirecting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Admit(Credential),
    /// No session, or the session expired.
    Unauthenticated { redirect_to: String },
    /// Session present but its role isn't allowed here.
    Forbidden { redirect_to: String },
}

impl GateDecision {
    #[must_use]
    pub fn is_admitted(&self) -> bool {
        matches!(self, Self::Admit(_))
    }

    #[must_use]
    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            Self::Admit(_) => None,
            Self::Unauthenticated { redirect_to } | Self::Forbidden { redirect_to } => {
                Some(redirect_to)
            }
        }
    }
}

/// Receives the gate's redirect.
pub trait Navigator {
    fn navigate(&mut self, to: &str);
}

impl<F: FnMut(&str)> Navigator for F {
    fn navigate(&mut self, to: &str) {
        self(to);
    }
}

/// Records the last target instead of navigating.
impl Navigator for Option<String> {
    fn navigate(&mut self, to: &str) {
        *self = Some(to.to_owned());
    }
}

#[derive(Debug, Clone)]
pub struct AuthGate {
    required: RoleSet,
    state: GateState,
}

impl AuthGate {
    #[must_use]
    pub fn new(required: RoleSet) -> Self {
        Self {
            required,
            state: GateState::Unchecked,
        }
    }

    /// Gate admitting any authenticated session.
    #[must_use]
    pub fn any() -> Self {
        Self::new(RoleSet::Any)
    }

    #[must_use]
    pub fn for_shell(shell: Shell) -> Self {
        Self::new(shell.required_roles())
    }

    #[must_use]
    pub fn state(&self) -> GateState {
        self.state
    }

    #[must_use]
    pub fn required(&self) -> &RoleSet {
        &self.required
    }

    /// Evaluate the gate against the store's current session.
    pub fn check<S, C, N>(&mut self, store: &SessionStore<S, C>, navigator: &mut N) -> GateDecision
    where
        S: CredentialStorage,
        C: Clock,
        N: Navigator + ?Sized,
    {
        self.state = GateState::Checking;
        let decision = evaluate(&self.required, store.credential(), store.config().login_route());

        match decision.redirect_target() {
            None => self.state = GateState::Admitted,
            Some(target) => {
                self.state = GateState::Redirecting;
                tracing::debug!(to = %target, "Auth gate redirecting");
                navigator.navigate(target);
            }
        }
        decision
    }
}

/// Pure gate rule: who gets in, and where everyone else goes.
#[must_use]
pub fn evaluate(required: &RoleSet, credential: Option<Credential>, login_route: &str) -> GateDecision {
    let Some(credential) = credential else {
        return GateDecision::Unauthenticated {
            redirect_to: login_route.to_owned(),
        };
    };

    let role = credential.role();
    if required.admits(role) {
        GateDecision::Admit(credential)
    } else {
        GateDecision::Forbidden {
            redirect_to: select_shell(role).home_route().to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use time::Duration;

    use super::*;
    use crate::config::SessionConfig;
    use crate::storage::MemoryStorage;
    use crate::test_support::{token_expiring_in, token_with_role};
    use crate::types::Role;

    fn signed_in(token: String) -> SessionStore<MemoryStorage> {
        let store = SessionStore::restore(MemoryStorage::new());
        store.set_credential(token);
        store
    }

    #[test]
    fn initial_state_is_unchecked() {
        assert_eq!(AuthGate::any().state(), GateState::Unchecked);
    }

    #[test]
    fn admits_allowed_role() {
        let store = signed_in(token_expiring_in(Role::Admin, Duration::HOUR));
        let mut gate = AuthGate::for_shell(Shell::Admin);
        let mut visits = Vec::new();

        let decision = gate.check(&store, &mut |to: &str| visits.push(to.to_owned()));

        assert!(decision.is_admitted());
        assert_eq!(gate.state(), GateState::Admitted);
        assert!(visits.is_empty());
    }

    #[test]
    fn no_session_redirects_to_login_once() {
        let store = SessionStore::restore(MemoryStorage::new());
        let mut gate = AuthGate::any();
        let mut visits = Vec::new();

        let decision = gate.check(&store, &mut |to: &str| visits.push(to.to_owned()));

        assert_eq!(
            decision,
            GateDecision::Unauthenticated {
                redirect_to: "/login".into()
            }
        );
        assert_eq!(gate.state(), GateState::Redirecting);
        assert_eq!(visits, ["/login"]);
    }

    #[test]
    fn expired_session_is_unauthenticated_regardless_of_role() {
        for role in Role::ALL {
            let store = signed_in(token_expiring_in(role, -Duration::SECOND));
            for shell in [Shell::Admin, Shell::Mot, Shell::Operator, Shell::Unauthorized] {
                let mut target: Option<String> = None;
                let decision = AuthGate::for_shell(shell).check(&store, &mut target);
                assert!(matches!(decision, GateDecision::Unauthenticated { .. }));
                assert_eq!(target.as_deref(), Some("/login"));
            }
        }
    }

    #[test]
    fn disallowed_roles_are_forbidden() {
        for role in Role::ALL {
            if role == Role::Admin {
                continue;
            }
            let store = signed_in(token_expiring_in(role, Duration::HOUR));
            let mut target: Option<String> = None;
            let decision = AuthGate::for_shell(Shell::Admin).check(&store, &mut target);

            assert!(matches!(decision, GateDecision::Forbidden { .. }), "{role}");
            assert!(!decision.is_admitted());
            assert_eq!(target.as_deref(), Some(select_shell(Some(role)).home_route()));
        }
    }

    #[test]
    fn mot_official_lands_in_mot_shell() {
        let store = signed_in(token_with_role("mot-admin", Duration::HOUR));
        let role = store.claims().unwrap().role();
        assert_eq!(select_shell(role), Shell::Mot);

        let mut target: Option<String> = None;
        let decision = AuthGate::for_shell(Shell::Admin).check(&store, &mut target);
        assert_eq!(
            decision,
            GateDecision::Forbidden {
                redirect_to: "/mot".into()
            }
        );
        assert_eq!(target.as_deref(), Some("/mot"));

        assert!(AuthGate::for_shell(Shell::Mot).check(&store, &mut target).is_admitted());
    }

    #[test]
    fn unknown_role_admitted_by_any_but_forbidden_elsewhere() {
        let store = signed_in(token_with_role("driver", Duration::HOUR));

        assert!(AuthGate::any().check(&store, &mut None::<String>).is_admitted());

        let decision = AuthGate::for_shell(Shell::Operator).check(&store, &mut None::<String>);
        assert_eq!(decision.redirect_target(), Some("/unauthorized"));
    }

    #[test]
    fn each_check_starts_over() {
        let store = signed_in(token_expiring_in(Role::FleetOperator, Duration::HOUR));
        let mut gate = AuthGate::for_shell(Shell::Operator);
        let mut visits = Vec::new();

        assert!(gate.check(&store, &mut |to: &str| visits.push(to.to_owned())).is_admitted());

        store.clear_credential();
        gate.check(&store, &mut |to: &str| visits.push(to.to_owned()));
        assert_eq!(gate.state(), GateState::Redirecting);

        gate.check(&store, &mut |to: &str| visits.push(to.to_owned()));
        assert_eq!(visits, ["/login", "/login"]);
    }

    #[test]
    fn custom_login_route() {
        let store = SessionStore::restore_with(
            MemoryStorage::new(),
            crate::clock::SystemClock,
            SessionConfig::default().with_login_route("/sign-in"),
        );
        let decision = AuthGate::any().check(&store, &mut None::<String>);
        assert_eq!(decision.redirect_target(), Some("/sign-in"));
    }
}
