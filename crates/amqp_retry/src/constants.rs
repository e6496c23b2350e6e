// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

/// Default minimal backoff: no floor.
///
/// The first retries of a default policy happen almost immediately; the exponential growth
/// term takes over as attempts accumulate.
pub const DEFAULT_MIN_BACKOFF: Duration = Duration::ZERO;

/// Default maximum backoff: 30 seconds.
///
/// No single wait granted by the default policy exceeds this value.
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Default maximum retry count: 10.
pub const DEFAULT_MAX_RETRY_COUNT: u32 = 10;

/// Extra base wait applied when the peer reports `com.microsoft:server-busy`.
///
/// A throttled namespace needs time to drain; retrying after the regular backoff alone would
/// most likely be throttled again.
pub const SERVER_BUSY_BASE_WAIT: Duration = Duration::from_secs(4);
