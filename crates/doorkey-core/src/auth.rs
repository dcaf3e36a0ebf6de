//! Authentication and lockout state machine.
//!
//! Both nodes run one instance of [`Authenticator`] per device. The control
//! node drives it with [`Authenticator::compare`], because it holds the
//! stored password; the interface node mirrors the same transitions with
//! [`Authenticator::submit`] and [`Authenticator::record`] as it learns each
//! result from the link. Keeping the two instances in lock-step is what lets
//! both sides agree on when the lockout sequence starts.
//!
//! # States
//!
//! - `Idle`: no transaction in progress
//! - `AwaitingCandidate`: waiting for 5 candidate symbols
//! - `Comparing`: candidate received, result pending
//! - `Authenticated`: candidate matched; one privileged operation may follow
//! - `Retry`: candidate mismatched, attempts remain
//! - `Locked`: attempts exhausted; only the lockout sequence may follow
//!
//! # Valid Transitions
//!
//! - Idle → AwaitingCandidate → Comparing
//! - Comparing → Authenticated | Retry | Locked
//! - Retry → AwaitingCandidate
//! - Authenticated → Idle
//! - Locked → Idle (attempt counter reset)
//!
//! # Examples
//!
//! ```
//! use doorkey_core::{AuthOutcome, AuthState, Authenticator, Password};
//!
//! let stored = Password::new([1, 2, 3, 4, 5]).unwrap();
//! let mut auth = Authenticator::new(3).unwrap();
//!
//! auth.begin().unwrap();
//! let wrong = Password::new([9, 9, 9, 9, 9]).unwrap();
//! assert_eq!(auth.compare(&stored, &wrong).unwrap(), AuthOutcome::Retry { attempts: 1 });
//!
//! assert_eq!(auth.compare(&stored, &stored).unwrap(), AuthOutcome::Authenticated);
//! assert_eq!(auth.state(), AuthState::Authenticated);
//! assert_eq!(auth.attempts(), 0);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{AttemptCounter, Candidate, Password, Result, error::Error};

/// States of the authentication sub-machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthState {
    Idle,
    AwaitingCandidate,
    Comparing,
    Authenticated,
    Retry,
    Locked,
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state_str = match self {
            AuthState::Idle => "Idle",
            AuthState::AwaitingCandidate => "AwaitingCandidate",
            AuthState::Comparing => "Comparing",
            AuthState::Authenticated => "Authenticated",
            AuthState::Retry => "Retry",
            AuthState::Locked => "Locked",
        };
        write!(f, "{}", state_str)
    }
}

impl AuthState {
    /// Check if transition to target state is valid from this state.
    pub fn can_transition_to(&self, target: &AuthState) -> bool {
        matches!(
            (self, target),
            (AuthState::Idle, AuthState::AwaitingCandidate)
                | (AuthState::AwaitingCandidate, AuthState::Comparing)
                | (
                    AuthState::Comparing,
                    AuthState::Authenticated | AuthState::Retry | AuthState::Locked
                )
                | (AuthState::Retry, AuthState::AwaitingCandidate)
                | (AuthState::Authenticated, AuthState::Idle)
                | (AuthState::Locked, AuthState::Idle)
        )
    }
}

/// Result of one candidate comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthOutcome {
    /// Candidate matched; the attempt counter is back at 0.
    Authenticated,
    /// Candidate mismatched; another attempt is allowed.
    Retry { attempts: u8 },
    /// Candidate mismatched and the attempt limit was reached.
    Locked,
}

impl AuthOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, AuthOutcome::Authenticated)
    }
}

/// Authentication state machine with its attempt counter.
#[derive(Debug, Clone)]
pub struct Authenticator {
    state: AuthState,
    attempts: AttemptCounter,
}

impl Authenticator {
    /// Create an idle machine that locks after `max_attempts` failures.
    ///
    /// # Errors
    /// Returns `Error::Config` if `max_attempts` is 0.
    pub fn new(max_attempts: u8) -> Result<Self> {
        Ok(Self {
            state: AuthState::Idle,
            attempts: AttemptCounter::new(max_attempts)?,
        })
    }

    #[must_use]
    pub fn state(&self) -> AuthState {
        self.state
    }

    /// Current number of consecutive failures.
    #[must_use]
    pub fn attempts(&self) -> u8 {
        self.attempts.count()
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.state == AuthState::Locked
    }

    /// Start a transaction: Idle → AwaitingCandidate.
    ///
    /// # Errors
    /// Returns `Error::InvalidStateTransition` outside `Idle`.
    pub fn begin(&mut self) -> Result<()> {
        self.transition(AuthState::AwaitingCandidate)
    }

    /// Mark a candidate as received or sent and its result pending.
    ///
    /// Valid from `AwaitingCandidate`, or from `Retry` (which first returns
    /// to `AwaitingCandidate`).
    ///
    /// # Errors
    /// Returns `Error::InvalidStateTransition` from any other state, in
    /// particular from `Locked`: no comparison happens once attempts are
    /// exhausted.
    pub fn submit(&mut self) -> Result<()> {
        if self.state == AuthState::Retry {
            self.transition(AuthState::AwaitingCandidate)?;
        }
        self.transition(AuthState::Comparing)
    }

    /// Apply the result of the pending comparison.
    ///
    /// # Errors
    /// Returns `Error::InvalidStateTransition` outside `Comparing`.
    pub fn record(&mut self, matched: bool) -> Result<AuthOutcome> {
        if self.state != AuthState::Comparing {
            return Err(Error::transition(self.state, "comparison result"));
        }

        if matched {
            self.attempts.reset();
            self.transition(AuthState::Authenticated)?;
            return Ok(AuthOutcome::Authenticated);
        }

        let attempts = self.attempts.increment();
        if self.attempts.is_exhausted() {
            warn!(attempts, "Attempt limit reached, locking out");
            self.transition(AuthState::Locked)?;
            Ok(AuthOutcome::Locked)
        } else {
            warn!(attempts, limit = self.attempts.limit(), "Candidate rejected");
            self.transition(AuthState::Retry)?;
            Ok(AuthOutcome::Retry { attempts })
        }
    }

    /// Compare a candidate against the stored password and record the result.
    ///
    /// # Errors
    /// Same as [`submit`](Self::submit).
    pub fn compare(&mut self, stored: &Password, candidate: &Candidate) -> Result<AuthOutcome> {
        self.submit()?;
        self.record(stored.matches(candidate))
    }

    /// End a successful transaction once its privileged operation is done.
    ///
    /// # Errors
    /// Returns `Error::InvalidStateTransition` outside `Authenticated`.
    pub fn finish(&mut self) -> Result<()> {
        self.transition(AuthState::Idle)
    }

    /// Return to idle after the lockout/alarm sequence completed.
    ///
    /// # Errors
    /// Returns `Error::InvalidStateTransition` outside `Locked`.
    pub fn complete_lockout(&mut self) -> Result<()> {
        if self.state != AuthState::Locked {
            return Err(Error::transition(self.state, AuthState::Idle));
        }
        self.attempts.reset();
        self.transition(AuthState::Idle)
    }

    fn transition(&mut self, target: AuthState) -> Result<()> {
        if !self.state.can_transition_to(&target) {
            return Err(Error::transition(self.state, target));
        }
        debug!(from = %self.state, to = %target, "Auth transition");
        self.state = target;
        Ok(())
    }
}

impl Default for Authenticator {
    fn default() -> Self {
        Self {
            state: AuthState::Idle,
            attempts: AttemptCounter::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn password(bytes: [u8; 5]) -> Password {
        Password::new(bytes).unwrap()
    }

    #[test]
    fn test_new_machine_starts_idle() {
        let auth = Authenticator::new(3).unwrap();
        assert_eq!(auth.state(), AuthState::Idle);
        assert_eq!(auth.attempts(), 0);
    }

    #[test]
    fn test_first_attempt_success() {
        let stored = password([1, 2, 3, 4, 5]);
        let mut auth = Authenticator::new(3).unwrap();
        auth.begin().unwrap();

        let outcome = auth.compare(&stored, &password([1, 2, 3, 4, 5])).unwrap();

        assert_eq!(outcome, AuthOutcome::Authenticated);
        assert_eq!(auth.attempts(), 0);
        auth.finish().unwrap();
        assert_eq!(auth.state(), AuthState::Idle);
    }

    #[test]
    fn test_three_failures_lock() {
        let stored = password([1, 2, 3, 4, 5]);
        let wrong = password([9, 9, 9, 9, 9]);
        let mut auth = Authenticator::new(3).unwrap();
        auth.begin().unwrap();

        assert_eq!(auth.compare(&stored, &wrong).unwrap(), AuthOutcome::Retry { attempts: 1 });
        assert_eq!(auth.compare(&stored, &wrong).unwrap(), AuthOutcome::Retry { attempts: 2 });
        assert_eq!(auth.compare(&stored, &wrong).unwrap(), AuthOutcome::Locked);
        assert!(auth.is_locked());
        assert_eq!(auth.attempts(), 3);
    }

    #[test]
    fn test_locked_rejects_further_comparison() {
        let stored = password([1, 2, 3, 4, 5]);
        let wrong = password([0, 0, 0, 0, 0]);
        let mut auth = Authenticator::new(1).unwrap();
        auth.begin().unwrap();
        assert_eq!(auth.compare(&stored, &wrong).unwrap(), AuthOutcome::Locked);

        let result = auth.compare(&stored, &stored);
        assert!(matches!(result, Err(Error::InvalidStateTransition { .. })));
        assert!(auth.is_locked());
    }

    #[test]
    fn test_success_after_failure_resets_counter() {
        let stored = password([1, 2, 3, 4, 5]);
        let mut auth = Authenticator::new(3).unwrap();
        auth.begin().unwrap();

        auth.compare(&stored, &password([1, 2, 3, 4, 6])).unwrap();
        auth.compare(&stored, &password([0, 2, 3, 4, 5])).unwrap();
        assert_eq!(auth.attempts(), 2);

        assert!(auth.compare(&stored, &stored).unwrap().is_success());
        assert_eq!(auth.attempts(), 0);
    }

    #[test]
    fn test_complete_lockout_resets_to_idle() {
        let stored = password([1, 2, 3, 4, 5]);
        let wrong = password([9, 9, 9, 9, 9]);
        let mut auth = Authenticator::new(3).unwrap();
        auth.begin().unwrap();
        for _ in 0..3 {
            auth.compare(&stored, &wrong).unwrap();
        }

        auth.complete_lockout().unwrap();

        assert_eq!(auth.state(), AuthState::Idle);
        assert_eq!(auth.attempts(), 0);
        auth.begin().unwrap();
    }

    #[test]
    fn test_mirrored_machine_via_record() {
        let mut auth = Authenticator::new(3).unwrap();
        auth.begin().unwrap();
        auth.submit().unwrap();
        assert_eq!(auth.state(), AuthState::Comparing);
        assert_eq!(auth.record(false).unwrap(), AuthOutcome::Retry { attempts: 1 });
        auth.submit().unwrap();
        assert_eq!(auth.record(true).unwrap(), AuthOutcome::Authenticated);
    }

    #[rstest]
    #[case(AuthState::Idle, AuthState::Comparing)]
    #[case(AuthState::Idle, AuthState::Authenticated)]
    #[case(AuthState::AwaitingCandidate, AuthState::Authenticated)]
    #[case(AuthState::Retry, AuthState::Comparing)]
    #[case(AuthState::Locked, AuthState::AwaitingCandidate)]
    #[case(AuthState::Authenticated, AuthState::Comparing)]
    fn test_invalid_transitions(#[case] from: AuthState, #[case] to: AuthState) {
        assert!(!from.can_transition_to(&to));
    }

    #[test]
    fn test_record_outside_comparing_fails() {
        let mut auth = Authenticator::new(3).unwrap();
        assert!(auth.record(true).is_err());
        assert!(auth.finish().is_err());
        assert!(auth.complete_lockout().is_err());
    }

    fn digits() -> impl Strategy<Value = [u8; 5]> {
        prop::array::uniform5(0u8..=9)
    }

    proptest! {
        #[test]
        fn prop_same_password_always_authenticates(bytes in digits()) {
            let stored = password(bytes);
            let mut auth = Authenticator::new(3).unwrap();
            auth.begin().unwrap();
            prop_assert_eq!(auth.compare(&stored, &password(bytes)).unwrap(), AuthOutcome::Authenticated);
        }

        #[test]
        fn prop_any_differing_position_rejects(bytes in digits(), position in 0usize..5, delta in 1u8..=9) {
            let stored = password(bytes);
            let mut other = bytes;
            other[position] = (other[position] + delta) % 10;
            let mut auth = Authenticator::new(3).unwrap();
            auth.begin().unwrap();
            prop_assert_eq!(
                auth.compare(&stored, &password(other)).unwrap(),
                AuthOutcome::Retry { attempts: 1 }
            );
        }

        #[test]
        fn prop_three_mismatches_always_lock(
            stored in digits(),
            a in digits(),
            b in digits(),
            c in digits(),
        ) {
            prop_assume!(stored != a && stored != b && stored != c);
            let stored = password(stored);
            let mut auth = Authenticator::new(3).unwrap();
            auth.begin().unwrap();
            auth.compare(&stored, &password(a)).unwrap();
            auth.compare(&stored, &password(b)).unwrap();
            prop_assert_eq!(auth.compare(&stored, &password(c)).unwrap(), AuthOutcome::Locked);

            auth.complete_lockout().unwrap();
            prop_assert_eq!(auth.attempts(), 0);
            prop_assert_eq!(auth.state(), AuthState::Idle);
        }
    }
}
