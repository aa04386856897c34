use shift_types::SessionState;

/// Outcome of assessing a session at a point in time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Accrual {
    /// No session running. `milli` is the settled balance in thousandths.
    Idle { milli: u64 },
    /// Session running and still inside its window.
    Accruing { milli: u64, elapsed_secs: i64 },
    /// Session ran past its window and must be settled with the reward.
    Expired { elapsed_secs: i64 },
}

impl Accrual {
    /// Displayed value in thousandths, if no settlement is pending.
    pub fn milli(&self) -> Option<u64> {
        match *self {
            Self::Idle { milli } | Self::Accruing { milli, .. } => Some(milli),
            Self::Expired { .. } => None,
        }
    }
}

/// The lazy accrual formula.
///
/// While a session runs the displayed balance is
/// `balance * scale + floor(elapsed_hours * rate_per_hour)`. A session that has
/// run for more than `window_secs` is closed with a flat `reward` booking,
/// regardless of how far past the window it went.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MintingPolicy {
    pub window_secs: i64,
    pub rate_per_hour: u64,
    pub scale: u64,
    pub reward: u64,
    pub reward_description: String,
}

impl MintingPolicy {
    pub const SECS_PER_HOUR: i64 = 3600;
    pub const DEFAULT_WINDOW_SECS: i64 = 20 * Self::SECS_PER_HOUR;
    pub const DEFAULT_REWARD_DESCRIPTION: &'static str = "Liquid scooped";

    /// Assess `session` at `now` (unix seconds) for a whole-token `balance`.
    ///
    /// A session start in the future (clock moved backwards) counts as zero
    /// elapsed time.
    pub fn assess(&self, balance: u64, session: SessionState, now: i64) -> Accrual {
        let settled = self.settled(balance);
        let Some(start) = session.started() else {
            return Accrual::Idle { milli: settled };
        };

        let elapsed_secs = now.saturating_sub(start).max(0);
        if elapsed_secs > self.window_secs {
            return Accrual::Expired { elapsed_secs };
        }

        // floor(elapsed_secs / 3600 * rate) without going through floats.
        let partial = (elapsed_secs as u64).saturating_mul(self.rate_per_hour)
            / Self::SECS_PER_HOUR as u64;
        Accrual::Accruing {
            milli: settled.saturating_add(partial),
            elapsed_secs,
        }
    }

    /// Whole-token balance scaled to the displayed unit.
    pub fn settled(&self, balance: u64) -> u64 {
        balance.saturating_mul(self.scale)
    }
}

impl Default for MintingPolicy {
    fn default() -> Self {
        Self {
            window_secs: Self::DEFAULT_WINDOW_SECS,
            rate_per_hour: 500,
            scale: 1000,
            reward: 10,
            reward_description: Self::DEFAULT_REWARD_DESCRIPTION.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;
    const HOUR: i64 = MintingPolicy::SECS_PER_HOUR;

    fn assess(balance: u64, start: i64) -> Accrual {
        MintingPolicy::default().assess(balance, SessionState::started_at(start), NOW)
    }

    #[test]
    fn idle_scales_balance() {
        let policy = MintingPolicy::default();
        assert_eq!(
            policy.assess(5, SessionState::idle(), NOW),
            Accrual::Idle { milli: 5000 }
        );
    }

    #[test]
    fn three_hours_accrue_1500() {
        assert_eq!(
            assess(5, NOW - 3 * HOUR),
            Accrual::Accruing {
                milli: 6500,
                elapsed_secs: 3 * HOUR
            }
        );
    }

    #[test]
    fn partial_hours_are_floored() {
        // 1 second = 500/3600 = 0.138.. units
        assert_eq!(assess(0, NOW - 1).milli(), Some(0));
        // 1.5 hours = 750
        assert_eq!(assess(0, NOW - 5400).milli(), Some(750));
        // 7 seconds = 0.97 units
        assert_eq!(assess(0, NOW - 7).milli(), Some(0));
        assert_eq!(assess(0, NOW - 8).milli(), Some(1));
    }

    #[test]
    fn exactly_twenty_hours_still_accrues() {
        assert_eq!(assess(1, NOW - 20 * HOUR).milli(), Some(1000 + 10_000));
    }

    #[test]
    fn past_window_expires() {
        assert_eq!(
            assess(5, NOW - 20 * HOUR - 1),
            Accrual::Expired {
                elapsed_secs: 20 * HOUR + 1
            }
        );
        assert!(matches!(assess(5, NOW - 21 * HOUR), Accrual::Expired { .. }));
        assert_eq!(assess(5, NOW - 100 * HOUR).milli(), None);
    }

    #[test]
    fn future_start_counts_as_zero() {
        assert_eq!(
            assess(2, NOW + HOUR),
            Accrual::Accruing {
                milli: 2000,
                elapsed_secs: 0
            }
        );
    }

    #[test]
    fn huge_balance_saturates() {
        let policy = MintingPolicy::default();
        assert_eq!(
            policy.assess(u64::MAX, SessionState::idle(), NOW),
            Accrual::Idle { milli: u64::MAX }
        );
    }
}
