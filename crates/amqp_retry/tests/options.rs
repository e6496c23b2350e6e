// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg(feature = "serde")]

//! Integration tests for loading retry options from configuration.

use std::time::Duration;

use amqp_retry::{DEFAULT_MAX_BACKOFF, ExponentialRetry, RetryOptions, RetryPolicy};

#[test]
fn empty_config_builds_default_policy() {
    let options: RetryOptions = serde_json::from_str("{}").unwrap();
    assert_eq!(options.build().unwrap(), RetryPolicy::default_retry());
}

#[test]
fn full_config_builds_configured_policy() {
    let json = r#"{
        "mode": "exponential",
        "min_backoff": "PT2S",
        "max_backoff": "PT1M",
        "max_retries": 6
    }"#;

    let options: RetryOptions = serde_json::from_str(json).unwrap();
    let expected = ExponentialRetry::new(Duration::from_secs(2), Duration::from_secs(60), 6).unwrap();

    assert_eq!(RetryPolicy::try_from(options).unwrap(), RetryPolicy::from(expected));
}

#[test]
fn inverted_range_fails_to_build() {
    let options: RetryOptions = serde_json::from_str(r#"{ "min_backoff": "PT1M" }"#).unwrap();

    let error = options.build().unwrap_err();
    assert!(error.to_string().contains(&format!("{DEFAULT_MAX_BACKOFF:?}")));
}

#[test]
fn unknown_mode_is_rejected() {
    let result = serde_json::from_str::<RetryOptions>(r#"{ "mode": "linear" }"#);
    assert!(result.is_err());
}
