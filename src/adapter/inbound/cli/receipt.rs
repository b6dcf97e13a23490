//! Shared reporting for state-changing commands.

use chrono::DateTime;
use serde::Serialize;

use super::output;
use crate::domain::event::{DomainEvent, EventKind};
use crate::domain::receipt::Receipt;
use crate::error::Result;

/// Report an included transaction and the event it was expected to emit.
///
/// A missing event is a warning, not a failure: the ledger accepted the
/// transaction either way.
pub fn report(
    command: &str,
    title: &str,
    outcome: &impl Serialize,
    receipt: &Receipt,
    event: Option<&DomainEvent>,
    expected: EventKind,
) -> Result<()> {
    if output::is_json() {
        return output::result(command, outcome);
    }

    output::section(title);
    output::field("Transaction", receipt.handle());
    output::field("Block", receipt.block_number());
    match event {
        Some(event) => output::field("Event", output::positive(event.kind())),
        None => output::warning(&format!(
            "Transaction included but no {expected} event found in receipt"
        )),
    }
    Ok(())
}

/// Render a unix timestamp as UTC, falling back to the raw number.
#[must_use]
pub fn timestamp(secs: u64) -> String {
    i64::try_from(secs)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map_or_else(
            || secs.to_string(),
            |time| time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_unix_seconds() {
        assert_eq!(timestamp(1_700_000_000), "2023-11-14 22:13:20 UTC");
    }

    #[test]
    fn out_of_range_falls_back_to_raw() {
        assert_eq!(timestamp(u64::MAX), u64::MAX.to_string());
    }
}
