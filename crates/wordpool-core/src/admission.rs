//! Admission control: may this visitor draw again yet?
//!
//! A visitor is admitted once `interval` has elapsed since their last
//! *allowed* draw. Refused visits never move the window.

use chrono::{DateTime, Duration, Utc};

use crate::{Error, Result};

/// Longest accepted interval between draws. Keeps `last + interval` well
/// inside chrono's representable range.
pub fn max_interval() -> Duration { Duration::days(365 * 100) }

// ─── Policy ──────────────────────────────────────────────────────────────────

/// How often a visitor may draw and how much text one draw may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawPolicy {
  /// Minimum wall-clock time between two allowed draws.
  pub interval:    Duration,
  /// Maximum length, in characters, of a draw's joined text.
  pub char_budget: usize,
}

impl DrawPolicy {
  pub fn new(interval: Duration, char_budget: usize) -> Result<Self> {
    if char_budget == 0 {
      return Err(Error::InvalidPolicy("character budget must be positive".into()));
    }
    if interval < Duration::zero() {
      return Err(Error::InvalidPolicy("interval must not be negative".into()));
    }
    if interval > max_interval() {
      return Err(Error::InvalidPolicy(format!(
        "interval exceeds {} days",
        max_interval().num_days()
      )));
    }
    Ok(Self { interval, char_budget })
  }

  /// Build a policy from whole seconds, as found in configuration files.
  pub fn from_secs(interval_secs: u64, char_budget: usize) -> Result<Self> {
    let secs = i64::try_from(interval_secs)
      .map_err(|_| Error::InvalidPolicy(format!("interval too large: {interval_secs}s")))?;
    let interval = Duration::try_seconds(secs)
      .ok_or_else(|| Error::InvalidPolicy(format!("interval too large: {interval_secs}s")))?;
    Self::new(interval, char_budget)
  }
}

// ─── Check ───────────────────────────────────────────────────────────────────

/// Result of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
  Allowed,
  Wait {
    remaining:       Duration,
    next_allowed_at: DateTime<Utc>,
  },
}


/// Decide whether a visitor last admitted at `last_access` may draw at `now`.
///
/// A `last_access` in the future (clock skew between writers) is honoured as
/// is: the visitor waits until `last_access + interval`.
pub fn check(
  last_access: Option<DateTime<Utc>>,
  now:         DateTime<Utc>,
  interval:    Duration,
) -> Admission {
  let Some(last) = last_access else {
    return Admission::Allowed;
  };

  let next_allowed_at = last + interval;
  if now >= next_allowed_at {
    Admission::Allowed
  } else {
    Admission::Wait { remaining: next_allowed_at - now, next_allowed_at }
  }
}
