// src/serial/timeout.rs

//! Wait policies for polling the transmitter
//!
//! The transmit path spins on the line status register. By default the spin
//! is unbounded: a UART that never reports ready hangs the caller. A bounded
//! [`WaitPolicy`] turns that hang into a [`TimeoutError`].

/// How long, and how politely, to poll a hardware condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    /// Maximum number of condition checks; `None` spins forever
    pub max_iterations: Option<u32>,
    /// Extra spin iterations inserted between checks
    pub backoff: BackoffStrategy,
}

impl WaitPolicy {
    /// Spin until the condition holds, however long that takes.
    pub const fn unbounded() -> Self {
        Self {
            max_iterations: None,
            backoff: BackoffStrategy::None,
        }
    }

    /// Give up after `max_iterations` checks, no backoff.
    pub const fn bounded(max_iterations: u32) -> Self {
        Self {
            max_iterations: Some(max_iterations),
            backoff: BackoffStrategy::None,
        }
    }

    /// Short ceiling for probing hardware that may be absent
    pub const fn short() -> Self {
        Self::bounded(100)
    }

    /// Long ceiling for slow or emulated hardware
    pub const fn long() -> Self {
        Self::bounded(10_000).with_backoff(BackoffStrategy::Exponential { base: 2, max: 100 })
    }

    /// Same ceiling, different spacing between checks.
    pub const fn with_backoff(mut self, backoff: BackoffStrategy) -> Self {
        self.backoff = backoff;
        self
    }

    /// Whether a wait under this policy can end without the condition holding.
    #[inline]
    pub const fn is_bounded(&self) -> bool {
        self.max_iterations.is_some()
    }
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// Spacing between two checks of a polled condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffStrategy {
    /// Check again immediately
    None,
    /// Spin `n` times before the `n`-th check
    Linear,
    /// Spin `base^n` times before the `n`-th check, capped at `max`
    Exponential {
        /// Growth factor per check
        base: u32,
        /// Upper bound on spins between two checks
        max: u32,
    },
}

impl BackoffStrategy {
    /// Spins to insert before check number `check` (1-based).
    pub const fn spins(self, check: u32) -> u32 {
        match self {
            BackoffStrategy::None => 0,
            BackoffStrategy::Linear => check,
            BackoffStrategy::Exponential { base, max } => {
                let spins = base.saturating_pow(check);
                if spins < max { spins } else { max }
            }
        }
    }
}

/// Progress of one polling loop under a [`WaitPolicy`]
#[derive(Debug, Clone)]
pub struct TimeoutContext {
    policy: WaitPolicy,
    checks: u32,
    spun: u64,
}

impl TimeoutContext {
    /// Start a loop with no checks spent.
    pub const fn new(policy: WaitPolicy) -> Self {
        Self {
            policy,
            checks: 0,
            spun: 0,
        }
    }

    /// True once a bounded policy has used up its checks; never for unbounded.
    pub fn is_expired(&self) -> bool {
        self.remaining() == Some(0)
    }

    /// Spend one check, spinning for the backoff first.
    ///
    /// Returns false, without spinning, when the ceiling has been reached.
    pub fn tick(&mut self) -> bool {
        if self.is_expired() {
            return false;
        }

        self.checks = self.checks.saturating_add(1);
        let spins = self.policy.backoff.spins(self.checks);
        self.spun += u64::from(spins);
        for _ in 0..spins {
            core::hint::spin_loop();
        }
        true
    }

    /// Checks spent so far
    pub fn iteration(&self) -> u32 {
        self.checks
    }

    /// Backoff spins performed so far
    pub fn total_waits(&self) -> u64 {
        self.spun
    }

    /// Checks left before expiry, or `None` when unbounded
    pub fn remaining(&self) -> Option<u32> {
        self.policy
            .max_iterations
            .map(|max| max.saturating_sub(self.checks))
    }
}

/// Outcome of [`poll_with_timeout`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutResult<T> {
    /// Condition held
    Ok(T),
    /// Ceiling reached first
    Timeout {
        /// Checks made before giving up
        iterations: u32,
        /// Backoff spins performed
        total_waits: u64,
    },
}

impl<T> TimeoutResult<T> {
    /// Move the timeout case into `Err`.
    pub fn into_result(self) -> Result<T, TimeoutError> {
        match self {
            TimeoutResult::Ok(v) => Ok(v),
            TimeoutResult::Timeout {
                iterations,
                total_waits,
            } => Err(TimeoutError {
                iterations,
                total_waits,
            }),
        }
    }
}

/// A bounded wait ran out of checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutError {
    /// Checks made before giving up
    pub iterations: u32,
    /// Backoff spins performed
    pub total_waits: u64,
}

impl core::fmt::Display for TimeoutError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "condition not met after {} checks ({} backoff spins)",
            self.iterations, self.total_waits
        )
    }
}

/// Poll `condition` under `policy`.
///
/// The condition is checked once per tick; with an unbounded policy this only
/// returns once the condition holds.
pub fn poll_with_timeout<F>(policy: WaitPolicy, mut condition: F) -> TimeoutResult<()>
where
    F: FnMut() -> bool,
{
    let mut ctx = TimeoutContext::new(policy);

    while ctx.tick() {
        if condition() {
            return TimeoutResult::Ok(());
        }
    }

    TimeoutResult::Timeout {
        iterations: ctx.iteration(),
        total_waits: ctx.total_waits(),
    }
}
