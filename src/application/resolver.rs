//! Extracting typed events from log entries.

use std::sync::Arc;

use tracing::debug;

use crate::contract::schema::EventSchema;
use crate::domain::event::{DomainEvent, EventKind};
use crate::domain::receipt::{LogEntry, Receipt};

/// Schema-driven log decoder.
///
/// Pure: the same logs always give the same answer. Entries that do not
/// decode are skipped, never fatal.
#[derive(Debug, Clone)]
pub struct EventResolver {
    schema: Arc<EventSchema>,
}

impl EventResolver {
    pub fn new(schema: Arc<EventSchema>) -> Self {
        Self { schema }
    }

    #[must_use]
    pub fn schema(&self) -> &EventSchema {
        &self.schema
    }

    /// Decode every entry the schema understands, in log order.
    #[must_use]
    pub fn decode_logs(&self, logs: &[LogEntry]) -> Vec<DomainEvent> {
        logs.iter()
            .filter_map(|log| match self.schema.decode(log) {
                Ok(event) => Some(event),
                Err(e) => {
                    debug!(address = %log.address, error = %e, "Skipping log entry");
                    None
                }
            })
            .collect()
    }

    /// All events of `kind` in log order.
    #[must_use]
    pub fn extract_all(&self, logs: &[LogEntry], kind: EventKind) -> Vec<DomainEvent> {
        self.decode_logs(logs)
            .into_iter()
            .filter(|e| e.kind() == kind)
            .collect()
    }

    /// The first event of `kind` in the receipt, if any.
    #[must_use]
    pub fn extract(&self, receipt: &Receipt, kind: EventKind) -> Option<DomainEvent> {
        self.first_in(receipt.logs(), kind)
    }

    /// The first event of `kind` among `logs`.
    #[must_use]
    pub fn first_in(&self, logs: &[LogEntry], kind: EventKind) -> Option<DomainEvent> {
        logs.iter()
            .filter(|log| self.schema.kind_of(log) == Some(kind))
            .find_map(|log| match self.schema.decode(log) {
                Ok(event) => Some(event),
                Err(e) => {
                    debug!(%kind, error = %e, "Skipping undecodable log entry");
                    None
                }
            })
    }

    /// The first event of `kind` that carries a payload.
    #[must_use]
    pub fn find_populated(&self, logs: &[LogEntry], kind: EventKind) -> Option<DomainEvent> {
        self.extract_all(logs, kind)
            .into_iter()
            .find(DomainEvent::has_payload)
    }
}

impl Default for EventResolver {
    fn default() -> Self {
        Self::new(Arc::new(EventSchema::v1()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::id::AssetId;
    use crate::domain::receipt::{ReceiptStatus, TransactionHandle};
    use crate::testkit::fixture;
    use alloy_primitives::{Bytes, B256};

    fn receipt(logs: Vec<LogEntry>) -> Receipt {
        Receipt::new(
            TransactionHandle::new(B256::ZERO),
            ReceiptStatus::Included,
            logs,
            10,
        )
    }

    #[test]
    fn empty_receipt_yields_nothing() {
        let resolver = EventResolver::default();
        assert_eq!(
            resolver.extract(&receipt(vec![]), EventKind::ActivityCalculated),
            None
        );
    }

    #[test]
    fn first_match_wins_despite_interspersed_entries() {
        let resolver = EventResolver::default();
        let logs = vec![
            fixture::unrelated_log(),
            fixture::sale_created_log(1, fixture::ALICE, fixture::usd(10)),
            fixture::unrelated_log(),
            fixture::sale_created_log(2, fixture::BOB, fixture::usd(20)),
        ];

        let event = resolver
            .extract(&receipt(logs), EventKind::SaleCreated)
            .unwrap();
        assert_eq!(event.asset_id(), Some(AssetId::from(1u64)));
    }

    #[test]
    fn garbled_entries_are_skipped() {
        let resolver = EventResolver::default();
        let mut broken = fixture::sale_created_log(1, fixture::ALICE, fixture::usd(10));
        broken.data = Bytes::from_static(&[1, 2, 3]);
        let logs = vec![
            broken,
            fixture::sale_created_log(5, fixture::BOB, fixture::usd(30)),
        ];

        let event = resolver.first_in(&logs, EventKind::SaleCreated).unwrap();
        assert_eq!(event.asset_id(), Some(AssetId::from(5u64)));
        assert_eq!(resolver.decode_logs(&logs).len(), 1);
    }

    #[test]
    fn find_populated_ignores_empty_activity() {
        let resolver = EventResolver::default();
        let logs = vec![
            fixture::empty_activity_log(),
            fixture::activity_log(vec![fixture::ALICE], vec![7]),
        ];

        assert!(!resolver
            .first_in(&logs, EventKind::ActivityCalculated)
            .unwrap()
            .has_payload());
        let populated = resolver
            .find_populated(&logs, EventKind::ActivityCalculated)
            .and_then(DomainEvent::into_activity)
            .unwrap();
        assert_eq!(populated.wallets, vec![fixture::ALICE]);
    }

    #[test]
    fn extract_all_keeps_log_order() {
        let resolver = EventResolver::default();
        let logs = vec![
            fixture::loan_liquidated_log(3, fixture::BOB),
            fixture::unrelated_log(),
            fixture::loan_liquidated_log(1, fixture::CAROL),
        ];
        let ids: Vec<_> = resolver
            .extract_all(&logs, EventKind::LoanLiquidated)
            .iter()
            .filter_map(DomainEvent::asset_id)
            .collect();
        assert_eq!(ids, vec![AssetId::from(3u64), AssetId::from(1u64)]);
    }
}
