//! Canonical test configurations.
//!
//! Single source of truth for config structs used across tests.
//! Avoids each test module defining its own slightly-different defaults.

use std::time::Duration;

use crate::application::activity::ActivityRequestSettings;
use crate::application::executor::ConfirmationPolicy;
use crate::application::polling::PollPlan;

use super::fixture;

/// Polling with the production attempt count and a short delay.
pub fn poll_plan(max_attempts: u32, delay_ms: u64) -> PollPlan {
    PollPlan {
        max_attempts,
        delay: Duration::from_millis(delay_ms),
        lookback: 100,
    }
}

/// Confirmation that gives up after `timeout_secs` and polls every 100 ms.
pub fn confirmation(timeout_secs: u64) -> ConfirmationPolicy {
    ConfirmationPolicy {
        timeout: Duration::from_secs(timeout_secs),
        poll_interval: Duration::from_millis(100),
    }
}

/// Fully populated activity settings pointing at [`fixture::ACTIVITY`].
pub fn activity(poll: PollPlan) -> ActivityRequestSettings {
    ActivityRequestSettings {
        contract: Some(fixture::ACTIVITY),
        secrets_slot: Some(0),
        secrets_version: Some(1_712_345_678),
        subscription_id: Some(42),
        poll,
    }
}

/// TOML for a complete configuration against the fixture contracts.
pub fn toml() -> String {
    format!(
        r#"
[network]
rpc_url = "http://127.0.0.1:8545"
chain_id = 31337

[contracts]
marketplace = "{}"
activity = "{}"

[activity]
secrets_slot = 0
secrets_version = 1712345678
subscription_id = 42

[polling]
max_attempts = 20
delay_ms = 5000
lookback_blocks = 100

[logging]
level = "info"
format = "pretty"
"#,
        fixture::MARKETPLACE,
        fixture::ACTIVITY
    )
}
