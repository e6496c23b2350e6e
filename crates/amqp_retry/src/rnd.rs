// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::Debug;

/// Odd 64-bit constant (2^64 / golden ratio) that spreads retry counts across the seed space.
const SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// Non-cryptographic source of jitter for backoff calculations.
///
/// This RNG is **NOT cryptographically secure** and is only used to spread retries of many
/// clients over time.
///
/// Every variant is a pure function of the retry count it is asked about, so computing an
/// interval never mutates the policy and clones never share generator state.
#[derive(Clone, Default)]
pub(crate) enum Rnd {
    #[default]
    Real,

    Seeded(u64),

    #[cfg(test)]
    Test(std::sync::Arc<dyn Fn(u32) -> f64 + Send + Sync>),
}

impl Debug for Rnd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Real => write!(f, "Real"),
            Self::Seeded(seed) => write!(f, "Seeded({seed})"),
            #[cfg(test)]
            Self::Test(_) => write!(f, "Test"),
        }
    }
}

impl Rnd {
    #[cfg(test)]
    pub fn new_fixed(value: f64) -> Self {
        Self::Test(std::sync::Arc::new(move |_| value))
    }

    #[cfg(test)]
    pub fn new_function<F>(f: F) -> Self
    where
        F: Fn(u32) -> f64 + Send + Sync + 'static,
    {
        Self::Test(std::sync::Arc::new(f))
    }

    /// Returns a value in `[0, 1)` used to jitter the interval of the given retry count.
    pub fn next_f64(&self, retry_count: u32) -> f64 {
        match self {
            Self::Real => fastrand::f64(),
            Self::Seeded(seed) => fastrand::Rng::with_seed(seed ^ u64::from(retry_count).wrapping_mul(SEED_MIX)).f64(),
            #[cfg(test)]
            Self::Test(generator) => generator(retry_count),
        }
    }
}
