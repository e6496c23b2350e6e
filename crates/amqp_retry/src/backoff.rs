// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

use crate::rnd::Rnd;

/// The factor used to determine the range of jitter applied to the growth term.
const JITTER_FACTOR: f64 = 0.5;

/// The base of the exponential growth term.
const EXPONENTIAL_FACTOR: f64 = 2.0;

/// Backoff bounds shared by every interval computed for one policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct BackoffRange {
    pub min: Duration,
    pub max: Duration,
}

impl BackoffRange {
    /// Computes the jittered interval for `retry_count` out of `max_retry_count` attempts.
    ///
    /// The growth term is `(max - min) * 2^(retry_count - max_retry_count)`: it doubles with
    /// every attempt and reaches the full span at the retry ceiling. Jitter of ±25% around the
    /// growth term keeps consecutive attempts strictly increasing until the result is clamped
    /// to `max`, since `1.25 * g < 0.75 * 2g`.
    ///
    /// The result is `base_wait + min + jittered growth`, clamped to `[min, max]`.
    pub fn interval(self, base_wait: Duration, retry_count: u32, max_retry_count: u32, rnd: &Rnd) -> Duration {
        let span = self.max.saturating_sub(self.min);
        let exponent = i64::from(retry_count) - i64::from(max_retry_count);
        let growth = duration_mul_pow2(span, exponent);
        let jittered = apply_jitter(growth, rnd.next_f64(retry_count));

        let candidate = base_wait.saturating_add(self.min).saturating_add(jittered);
        self.clamp(candidate)
    }

    fn clamp(self, d: Duration) -> Duration {
        d.max(self.min).min(self.max)
    }
}

fn duration_mul_pow2(base: Duration, exponent: i64) -> Duration {
    let exponent = i32::try_from(exponent).unwrap_or(if exponent < 0 { i32::MIN } else { i32::MAX });
    let factor = EXPONENTIAL_FACTOR.powi(exponent);
    secs_to_duration_saturating(base.as_secs_f64() * factor)
}

/// Adds a symmetric, uniform jitter around the given delay.
///
/// - Jitter is in both directions and relative to `delay` (centered on it).
/// - With `JITTER_FACTOR = 0.5`, the result lies in `[0.75*delay, 1.25*delay]`.
/// - Conversion saturates on overflow and clamps at zero.
#[inline]
fn apply_jitter(delay: Duration, random: f64) -> Duration {
    let secs = delay.as_secs_f64();
    let offset = (secs * JITTER_FACTOR) / 2.0;
    let random_delay = (secs * JITTER_FACTOR).mul_add(random, -offset);

    secs_to_duration_saturating(secs + random_delay)
}

fn secs_to_duration_saturating(secs: f64) -> Duration {
    if secs.is_nan() || secs <= 0.0 {
        return Duration::ZERO;
    }

    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}
