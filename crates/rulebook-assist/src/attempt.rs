//! Bounded retry state machine for grouping requests.
//!
//! The machine never touches the network. The driver feeds it the outcome
//! of each attempt and asks it what to do next:
//!
//! ```text
//! FirstAttempt ──correctable──▶ Retrying ──correctable──▶ FallenBack
//!      │                           │
//!      └──────── fatal ────────────┴──────────────────────▶ FallenBack
//! ```

/// Attempts allowed before falling back to deterministic segmentation.
pub const MAX_ATTEMPTS: u32 = 2;

/// Where the retry loop stands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttemptState {
    /// Nothing has been tried yet.
    FirstAttempt,
    /// A previous answer was rejected and another attempt is allowed.
    Retrying {
        /// 1-based number of the attempt about to run.
        attempt: u32,
        /// Why the previous answer was rejected; sent back to the model.
        last_error: String,
    },
    /// Groupings are abandoned.
    FallenBack {
        /// Why the loop gave up.
        reason: String,
    },
}

/// Result of one attempt, as far as the state machine cares.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Groupings were valid and produced sections.
    Accepted,
    /// The answer was unusable but a corrected answer could fix it.
    Correctable(String),
    /// The provider itself failed; retrying with feedback will not help.
    Fatal(String),
}

/// What the driver should do next.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NextAction {
    /// Ask the provider, passing feedback when retrying.
    Request {
        /// Rejection reason from the previous attempt.
        feedback: Option<String>,
    },
    /// Stop and use the deterministic segmenter.
    FallBack {
        /// Why the loop gave up.
        reason: String,
    },
}

impl AttemptState {
    /// 1-based number of the attempt this state would run.
    pub fn attempt(&self) -> u32 {
        match self {
            Self::FirstAttempt => 1,
            Self::Retrying { attempt, .. } => *attempt,
            Self::FallenBack { .. } => MAX_ATTEMPTS + 1,
        }
    }

    /// The action this state calls for.
    pub fn next_action(&self) -> NextAction {
        match self {
            Self::FirstAttempt => NextAction::Request { feedback: None },
            Self::Retrying { last_error, .. } => NextAction::Request {
                feedback: Some(last_error.clone()),
            },
            Self::FallenBack { reason } => NextAction::FallBack {
                reason: reason.clone(),
            },
        }
    }
}

/// Advance the machine after an attempt.
///
/// Returns `None` once an attempt is accepted; there is nothing left to do.
pub fn next_state(state: &AttemptState, outcome: AttemptOutcome) -> Option<AttemptState> {
    if let AttemptState::FallenBack { .. } = state {
        return Some(state.clone());
    }
    match outcome {
        AttemptOutcome::Accepted => None,
        AttemptOutcome::Fatal(reason) => Some(AttemptState::FallenBack { reason }),
        AttemptOutcome::Correctable(error) => {
            let attempt = state.attempt();
            Some(if attempt < MAX_ATTEMPTS {
                AttemptState::Retrying {
                    attempt: attempt + 1,
                    last_error: error,
                }
            } else {
                AttemptState::FallenBack { reason: error }
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn correctable(msg: &str) -> AttemptOutcome {
        AttemptOutcome::Correctable(msg.to_string())
    }

    #[test]
    fn first_attempt_requests_without_feedback() {
        assert_eq!(
            AttemptState::FirstAttempt.next_action(),
            NextAction::Request { feedback: None }
        );
    }

    #[test]
    fn correctable_failure_retries_once_with_feedback() {
        let state = next_state(&AttemptState::FirstAttempt, correctable("bad name")).unwrap();
        assert_eq!(
            state,
            AttemptState::Retrying {
                attempt: 2,
                last_error: "bad name".into()
            }
        );
        assert_eq!(
            state.next_action(),
            NextAction::Request {
                feedback: Some("bad name".into())
            }
        );
    }

    #[test]
    fn second_correctable_failure_falls_back() {
        let retrying = next_state(&AttemptState::FirstAttempt, correctable("first")).unwrap();
        let done = next_state(&retrying, correctable("second")).unwrap();
        assert_eq!(
            done.next_action(),
            NextAction::FallBack {
                reason: "second".into()
            }
        );
    }

    #[test]
    fn fatal_failure_falls_back_immediately() {
        let state = next_state(
            &AttemptState::FirstAttempt,
            AttemptOutcome::Fatal("connection refused".into()),
        )
        .unwrap();
        assert_eq!(
            state,
            AttemptState::FallenBack {
                reason: "connection refused".into()
            }
        );
    }

    #[test]
    fn accepted_ends_the_loop() {
        assert_eq!(next_state(&AttemptState::FirstAttempt, AttemptOutcome::Accepted), None);
    }

    #[test]
    fn fallen_back_is_terminal() {
        let state = AttemptState::FallenBack {
            reason: "gone".into(),
        };
        assert_eq!(next_state(&state, AttemptOutcome::Accepted), Some(state.clone()));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn outcome() -> impl Strategy<Value = AttemptOutcome> {
            prop_oneof![
                Just(AttemptOutcome::Accepted),
                "[a-z]{1,8}".prop_map(AttemptOutcome::Correctable),
                "[a-z]{1,8}".prop_map(AttemptOutcome::Fatal),
            ]
        }

        proptest! {
            #[test]
            fn never_exceeds_budget(outcomes in proptest::collection::vec(outcome(), 1..10)) {
                let mut state = AttemptState::FirstAttempt;
                let mut requests = 0;
                for outcome in outcomes {
                    if let NextAction::FallBack { .. } = state.next_action() {
                        break;
                    }
                    requests += 1;
                    match next_state(&state, outcome) {
                        Some(next) => state = next,
                        None => break,
                    }
                }
                prop_assert!(requests <= MAX_ATTEMPTS);
            }
        }
    }
}
