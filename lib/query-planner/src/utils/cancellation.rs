use std::time::{Duration, Instant};

/// Cooperative cancellation for a single planning call. The planner performs
/// no I/O, so this is the only way to bound a pathological search externally.
#[derive(Debug, Default)]
pub struct CancellationToken {
    inner: tokio_util::sync::CancellationToken,
    deadline: Option<Instant>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum CancellationError {
    #[error("planning was cancelled")]
    Cancelled,
    #[error("planning exceeded its deadline")]
    TimedOut,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(duration: Duration) -> Self {
        Self {
            inner: tokio_util::sync::CancellationToken::new(),
            deadline: Some(Instant::now() + duration),
        }
    }

    pub fn cancel(&self) {
        self.inner.cancel();
    }

    /// A deadline that has passed cancels the token, so later checks fail
    /// without consulting the clock again.
    #[inline]
    pub fn bail_if_cancelled(&self) -> Result<(), CancellationError> {
        if !self.inner.is_cancelled() {
            match self.deadline {
                Some(deadline) if deadline <= Instant::now() => self.inner.cancel(),
                _ => return Ok(()),
            }
            return Err(CancellationError::TimedOut);
        }

        Err(CancellationError::Cancelled)
    }

    /// A checker that consults the token once per `every` calls, for hot
    /// loops where checking on every iteration would dominate. `every` must
    /// be a power of two.
    #[inline]
    pub fn throttled(&self, every: u32) -> ThrottledCheck<'_> {
        assert!(every.is_power_of_two(), "every must be a power of two");

        ThrottledCheck {
            token: self,
            mask: every - 1,
            calls: 0,
        }
    }
}

#[derive(Debug)]
pub struct ThrottledCheck<'a> {
    token: &'a CancellationToken,
    mask: u32,
    calls: u32,
}

impl ThrottledCheck<'_> {
    #[inline(always)]
    pub fn bail_if_cancelled(&mut self) -> Result<(), CancellationError> {
        // `every` is a power of two, so `x & (every - 1)` replaces `x % every`.
        if self.calls & self.mask == 0 {
            self.token.bail_if_cancelled()?;
        }
        self.calls = self.calls.wrapping_add(1);

        Ok(())
    }
}
