//! Bounded polling of recent log history.
//!
//! Used when a result is published asynchronously, after the receipt of the
//! request that triggered it. Exhausting the attempts is a soft miss, not an
//! error.

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::Address;
use tracing::{debug, info, warn};

use super::resolver::EventResolver;
use crate::domain::event::{DomainEvent, EventKind};
use crate::port::outbound::ledger::{Ledger, LedgerResult};

/// How long and how far back to look.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPlan {
    /// Total number of scans, including the first.
    pub max_attempts: u32,
    /// Pause between scans. Not applied after the last one.
    pub delay: Duration,
    /// Number of blocks below the head included in each scan.
    pub lookback: u64,
}

impl Default for PollPlan {
    fn default() -> Self {
        Self {
            max_attempts: 20,
            delay: Duration::from_millis(5_000),
            lookback: 100,
        }
    }
}

/// Scans `[head - lookback, head]` at one emitter until a populated event
/// of the requested kind shows up.
pub struct PollingResolver {
    ledger: Arc<dyn Ledger>,
    resolver: EventResolver,
    emitter: Address,
}

impl PollingResolver {
    pub fn new(ledger: Arc<dyn Ledger>, resolver: EventResolver, emitter: Address) -> Self {
        Self {
            ledger,
            resolver,
            emitter,
        }
    }

    #[must_use]
    pub const fn emitter(&self) -> Address {
        self.emitter
    }

    /// Poll for the first populated event of `kind`.
    ///
    /// Read failures are logged and use up an attempt. Returns `None` once
    /// all attempts are spent. Dropping the future stops polling at the next
    /// await point; no lock is held while sleeping.
    pub async fn poll(&self, kind: EventKind, plan: PollPlan) -> Option<DomainEvent> {
        for attempt in 1..=plan.max_attempts {
            debug!(
                attempt,
                max_attempts = plan.max_attempts,
                %kind,
                emitter = %self.emitter,
                "Polling attempt"
            );

            match self.scan(kind, plan.lookback).await {
                Ok(Some(event)) => {
                    info!(attempt, %kind, "Found populated event");
                    return Some(event);
                }
                Ok(None) => debug!(attempt, %kind, "No populated event yet"),
                Err(e) => warn!(attempt, %kind, error = %e, "Log read failed"),
            }

            if attempt < plan.max_attempts {
                tokio::time::sleep(plan.delay).await;
            }
        }

        info!(
            attempts = plan.max_attempts,
            %kind,
            "No populated event found, giving up"
        );
        None
    }

    async fn scan(&self, kind: EventKind, lookback: u64) -> LedgerResult<Option<DomainEvent>> {
        let head = self.ledger.block_number().await?;
        let from = head.saturating_sub(lookback);
        let logs = self.ledger.get_logs(self.emitter, from, head).await?;
        Ok(self.resolver.find_populated(&logs, kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::fixture;
    use crate::testkit::ledger::{LogRead, ScriptedLedger};

    fn plan(max_attempts: u32) -> PollPlan {
        PollPlan {
            max_attempts,
            delay: Duration::from_millis(5_000),
            lookback: 100,
        }
    }

    fn poller(ledger: Arc<ScriptedLedger>) -> PollingResolver {
        PollingResolver::new(ledger, EventResolver::default(), fixture::ACTIVITY)
    }

    #[tokio::test(start_paused = true)]
    async fn empty_payloads_are_not_matches() {
        let ledger = Arc::new(ScriptedLedger::new());
        ledger.script_log_reads(vec![
            LogRead::Logs(vec![fixture::empty_activity_log()]),
            LogRead::Logs(vec![fixture::empty_activity_log()]),
            LogRead::Logs(vec![fixture::empty_activity_log()]),
        ]);

        let found = poller(ledger.clone())
            .poll(EventKind::ActivityCalculated, plan(3))
            .await;
        assert_eq!(found, None);
        assert_eq!(ledger.log_read_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn read_errors_consume_attempts() {
        let ledger = Arc::new(ScriptedLedger::new());
        ledger.script_log_reads(vec![
            LogRead::Error("rate limited".into()),
            LogRead::Logs(vec![fixture::activity_log(vec![fixture::BOB], vec![12])]),
        ]);

        let event = poller(ledger.clone())
            .poll(EventKind::ActivityCalculated, plan(5))
            .await
            .unwrap();
        assert!(event.has_payload());
        assert_eq!(ledger.log_read_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn window_saturates_at_genesis() {
        let ledger = Arc::new(ScriptedLedger::new());
        ledger.set_block(40);

        poller(ledger.clone())
            .poll(EventKind::ActivityCalculated, plan(1))
            .await;
        assert_eq!(ledger.log_ranges(), vec![(0, 40)]);

        ledger.set_block(1_000);
        poller(ledger.clone())
            .poll(EventKind::ActivityCalculated, plan(1))
            .await;
        assert_eq!(ledger.log_ranges()[1], (900, 1_000));
    }

    #[tokio::test(start_paused = true)]
    async fn no_sleep_after_last_attempt() {
        let ledger = Arc::new(ScriptedLedger::new());
        let start = tokio::time::Instant::now();

        let found = poller(ledger)
            .poll(EventKind::ActivityCalculated, plan(4))
            .await;

        assert_eq!(found, None);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(15_000));
        assert!(elapsed < Duration::from_millis(20_000));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_attempts_is_an_immediate_miss() {
        let ledger = Arc::new(ScriptedLedger::new());
        let found = poller(ledger.clone())
            .poll(EventKind::ActivityCalculated, plan(0))
            .await;
        assert_eq!(found, None);
        assert_eq!(ledger.log_read_count(), 0);
    }
}
