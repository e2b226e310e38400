use std::time::Duration;

pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(3);

/// Fixed-delay reconnect policy. Unbounded by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub delay: Duration,
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            delay: DEFAULT_RECONNECT_DELAY,
            max_attempts: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReconnectInput {
    /// The session reached `Ready` at least once since the last reset.
    pub was_authenticated: bool,
    pub terminal_failure: bool,
    pub signed_in: bool,
    pub timer_pending: bool,
    /// Consecutive attempts already scheduled since the last `Ready`.
    pub attempts: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NeverAuthenticated,
    TerminalFailure,
    SignedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectDecision {
    Schedule { after: Duration },
    AlreadyPending,
    Skip(SkipReason),
    GiveUp { attempts: u32 },
}

impl ReconnectPolicy {
    pub fn decide(&self, input: ReconnectInput) -> ReconnectDecision {
        if input.terminal_failure {
            return ReconnectDecision::Skip(SkipReason::TerminalFailure);
        }
        if !input.signed_in {
            return ReconnectDecision::Skip(SkipReason::SignedOut);
        }
        if !input.was_authenticated {
            return ReconnectDecision::Skip(SkipReason::NeverAuthenticated);
        }
        if input.timer_pending {
            return ReconnectDecision::AlreadyPending;
        }
        if let Some(max) = self.max_attempts {
            if input.attempts >= max {
                return ReconnectDecision::GiveUp {
                    attempts: input.attempts,
                };
            }
        }
        ReconnectDecision::Schedule { after: self.delay }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eligible() -> ReconnectInput {
        ReconnectInput {
            was_authenticated: true,
            signed_in: true,
            ..ReconnectInput::default()
        }
    }

    #[test]
    fn schedules_after_fixed_delay() {
        let policy = ReconnectPolicy::default();
        assert_eq!(
            policy.decide(eligible()),
            ReconnectDecision::Schedule {
                after: Duration::from_secs(3)
            }
        );
        // Not exponential: the delay ignores the attempt count.
        let later = ReconnectInput {
            attempts: 7,
            ..eligible()
        };
        assert_eq!(
            policy.decide(later),
            ReconnectDecision::Schedule {
                after: Duration::from_secs(3)
            }
        );
    }

    #[test]
    fn never_stacks_timers() {
        let input = ReconnectInput {
            timer_pending: true,
            ..eligible()
        };
        assert_eq!(
            ReconnectPolicy::default().decide(input),
            ReconnectDecision::AlreadyPending
        );
    }

    #[test]
    fn skips_terminal_signed_out_and_unauthenticated() {
        let policy = ReconnectPolicy::default();
        let terminal = ReconnectInput {
            terminal_failure: true,
            ..eligible()
        };
        assert_eq!(
            policy.decide(terminal),
            ReconnectDecision::Skip(SkipReason::TerminalFailure)
        );
        let signed_out = ReconnectInput {
            signed_in: false,
            ..eligible()
        };
        assert_eq!(
            policy.decide(signed_out),
            ReconnectDecision::Skip(SkipReason::SignedOut)
        );
        let fresh = ReconnectInput {
            was_authenticated: false,
            ..eligible()
        };
        assert_eq!(
            policy.decide(fresh),
            ReconnectDecision::Skip(SkipReason::NeverAuthenticated)
        );
    }

    #[test]
    fn bounded_policy_gives_up() {
        let policy = ReconnectPolicy {
            max_attempts: Some(2),
            ..ReconnectPolicy::default()
        };
        let input = ReconnectInput {
            attempts: 2,
            ..eligible()
        };
        assert_eq!(policy.decide(input), ReconnectDecision::GiveUp { attempts: 2 });
    }
}
