//! Versioned event schema.
//!
//! Maps an event signature hash to the layout used to decode it into a
//! [`DomainEvent`]. The schema is built once and injected into resolvers, so
//! a contract upgrade only needs a new layout set, and tests can decode
//! fixture logs without a ledger.

use std::collections::HashMap;

use alloy_primitives::{B256, U256};
use alloy_sol_types::SolEvent;
use thiserror::Error;

use super::activity::IActivityRequest;
use super::marketplace::IMarketplace;
use crate::domain::activity::ActivityPoints;
use crate::domain::event::{DomainEvent, EventKind};
use crate::domain::id::AssetId;
use crate::domain::money::Money;
use crate::domain::receipt::LogEntry;

/// Version of the contract event layouts this build understands.
pub const SCHEMA_VERSION: u32 = 1;

/// Why a log entry could not be turned into a domain event.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("log has no topics")]
    Anonymous,

    #[error("no layout for event signature {0}")]
    UnknownSignature(B256),

    #[error("malformed {kind} log: {reason}")]
    Malformed { kind: EventKind, reason: String },

    #[error("{field} out of range in {kind} log")]
    OutOfRange { kind: EventKind, field: &'static str },
}

type DecodeFn = fn(&LogEntry) -> Result<DomainEvent, DecodeError>;

/// Field layout of one event.
#[derive(Clone, Copy)]
pub struct EventLayout {
    pub kind: EventKind,
    pub signature: B256,
    decode: DecodeFn,
}

impl EventLayout {
    #[must_use]
    pub const fn new(kind: EventKind, signature: B256, decode: DecodeFn) -> Self {
        Self {
            kind,
            signature,
            decode,
        }
    }

    /// Layout keyed by the signature hash of a `sol!` event type.
    fn of<E: SolEvent>(kind: EventKind, decode: DecodeFn) -> Self {
        Self::new(kind, E::SIGNATURE_HASH, decode)
    }
}

impl std::fmt::Debug for EventLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLayout")
            .field("kind", &self.kind)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

/// Signature-indexed set of event layouts.
#[derive(Debug, Clone)]
pub struct EventSchema {
    version: u32,
    layouts: HashMap<B256, EventLayout>,
}

impl EventSchema {
    /// Schema with no layouts. Every log decodes to `UnknownSignature`.
    #[must_use]
    pub fn empty(version: u32) -> Self {
        Self {
            version,
            layouts: HashMap::new(),
        }
    }

    /// The layouts of the currently deployed contracts.
    #[must_use]
    pub fn v1() -> Self {
        Self::empty(SCHEMA_VERSION)
            .with_layout(EventLayout::of::<IActivityRequest::ActivityCalculated>(
                EventKind::ActivityCalculated,
                decode_activity_calculated,
            ))
            .with_layout(EventLayout::of::<IMarketplace::SaleCreated>(
                EventKind::SaleCreated,
                decode_sale_created,
            ))
            .with_layout(EventLayout::of::<IMarketplace::SaleCancelled>(
                EventKind::SaleCancelled,
                decode_sale_cancelled,
            ))
            .with_layout(EventLayout::of::<IMarketplace::NFTPurchased>(
                EventKind::NftPurchased,
                decode_nft_purchased,
            ))
            .with_layout(EventLayout::of::<IMarketplace::LoanRequested>(
                EventKind::LoanRequested,
                decode_loan_requested,
            ))
            .with_layout(EventLayout::of::<IMarketplace::LoanFunded>(
                EventKind::LoanFunded,
                decode_loan_funded,
            ))
            .with_layout(EventLayout::of::<IMarketplace::LoanRepaid>(
                EventKind::LoanRepaid,
                decode_loan_repaid,
            ))
            .with_layout(EventLayout::of::<IMarketplace::LoanLiquidated>(
                EventKind::LoanLiquidated,
                decode_loan_liquidated,
            ))
            .with_layout(EventLayout::of::<IMarketplace::LoanCancelled>(
                EventKind::LoanCancelled,
                decode_loan_cancelled,
            ))
    }

    /// Add or replace a layout.
    #[must_use]
    pub fn with_layout(mut self, layout: EventLayout) -> Self {
        self.layouts.insert(layout.signature, layout);
        self
    }

    #[must_use]
    pub const fn version(&self) -> u32 {
        self.version
    }

    /// The layout registered for `kind`, if any.
    #[must_use]
    pub fn layout_for(&self, kind: EventKind) -> Option<&EventLayout> {
        self.layouts.values().find(|l| l.kind == kind)
    }

    /// Kind of a log, judged by its signature topic alone.
    #[must_use]
    pub fn kind_of(&self, log: &LogEntry) -> Option<EventKind> {
        log.signature()
            .and_then(|sig| self.layouts.get(&sig))
            .map(|l| l.kind)
    }

    /// Decode a log into a domain event.
    ///
    /// # Errors
    ///
    /// Fails when the log is anonymous, its signature is unknown, or its
    /// topics and data do not match the registered layout.
    pub fn decode(&self, log: &LogEntry) -> Result<DomainEvent, DecodeError> {
        let signature = log.signature().ok_or(DecodeError::Anonymous)?;
        let layout = self
            .layouts
            .get(&signature)
            .ok_or(DecodeError::UnknownSignature(signature))?;
        (layout.decode)(log)
    }
}

impl Default for EventSchema {
    fn default() -> Self {
        Self::v1()
    }
}

fn raw<E: SolEvent>(kind: EventKind, log: &LogEntry) -> Result<E, DecodeError> {
    E::decode_raw_log(log.topics.iter().copied(), &log.data).map_err(|e| DecodeError::Malformed {
        kind,
        reason: e.to_string(),
    })
}

fn to_u64(kind: EventKind, field: &'static str, value: U256) -> Result<u64, DecodeError> {
    u64::try_from(value).map_err(|_| DecodeError::OutOfRange { kind, field })
}

fn decode_activity_calculated(log: &LogEntry) -> Result<DomainEvent, DecodeError> {
    let ev: IActivityRequest::ActivityCalculated = raw(EventKind::ActivityCalculated, log)?;
    Ok(DomainEvent::ActivityCalculated(ActivityPoints::new(
        ev.wallets,
        ev.activityPoints,
    )))
}

fn decode_sale_created(log: &LogEntry) -> Result<DomainEvent, DecodeError> {
    let ev: IMarketplace::SaleCreated = raw(EventKind::SaleCreated, log)?;
    Ok(DomainEvent::SaleCreated {
        asset_id: AssetId::new(ev.tokenId),
        seller: ev.seller,
        price_usd: Money::usd(ev.priceUSD),
    })
}

fn decode_sale_cancelled(log: &LogEntry) -> Result<DomainEvent, DecodeError> {
    let ev: IMarketplace::SaleCancelled = raw(EventKind::SaleCancelled, log)?;
    Ok(DomainEvent::SaleCancelled {
        asset_id: AssetId::new(ev.tokenId),
        seller: ev.seller,
    })
}

fn decode_nft_purchased(log: &LogEntry) -> Result<DomainEvent, DecodeError> {
    let ev: IMarketplace::NFTPurchased = raw(EventKind::NftPurchased, log)?;
    Ok(DomainEvent::NftPurchased {
        asset_id: AssetId::new(ev.tokenId),
        buyer: ev.buyer,
        seller: ev.seller,
        price_native: Money::native(ev.priceETH),
    })
}

fn decode_loan_requested(log: &LogEntry) -> Result<DomainEvent, DecodeError> {
    let kind = EventKind::LoanRequested;
    let ev: IMarketplace::LoanRequested = raw(kind, log)?;
    Ok(DomainEvent::LoanRequested {
        asset_id: AssetId::new(ev.tokenId),
        borrower: ev.borrower,
        principal_usd: Money::usd(ev.loanAmountUSD),
        duration_days: to_u64(kind, "durationInDays", ev.durationInDays)?,
    })
}

fn decode_loan_funded(log: &LogEntry) -> Result<DomainEvent, DecodeError> {
    let kind = EventKind::LoanFunded;
    let ev: IMarketplace::LoanFunded = raw(kind, log)?;
    Ok(DomainEvent::LoanFunded {
        asset_id: AssetId::new(ev.tokenId),
        lender: ev.lender,
        principal_native: Money::native(ev.loanAmount),
        deadline: to_u64(kind, "deadline", ev.deadline)?,
    })
}

fn decode_loan_repaid(log: &LogEntry) -> Result<DomainEvent, DecodeError> {
    let ev: IMarketplace::LoanRepaid = raw(EventKind::LoanRepaid, log)?;
    Ok(DomainEvent::LoanRepaid {
        asset_id: AssetId::new(ev.tokenId),
        borrower: ev.borrower,
        amount_native: Money::native(ev.repaymentAmount),
    })
}

fn decode_loan_liquidated(log: &LogEntry) -> Result<DomainEvent, DecodeError> {
    let ev: IMarketplace::LoanLiquidated = raw(EventKind::LoanLiquidated, log)?;
    Ok(DomainEvent::LoanLiquidated {
        asset_id: AssetId::new(ev.tokenId),
        lender: ev.lender,
    })
}

fn decode_loan_cancelled(log: &LogEntry) -> Result<DomainEvent, DecodeError> {
    let ev: IMarketplace::LoanCancelled = raw(EventKind::LoanCancelled, log)?;
    Ok(DomainEvent::LoanCancelled {
        asset_id: AssetId::new(ev.tokenId),
        borrower: ev.borrower,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, Address, Bytes};

    fn entry<E: SolEvent>(event: &E) -> LogEntry {
        let data = event.encode_log_data();
        LogEntry {
            address: Address::ZERO,
            topics: data.topics().to_vec(),
            data: data.data,
            block_number: Some(1),
            log_index: Some(0),
        }
    }

    #[test]
    fn decodes_every_registered_kind() {
        let schema = EventSchema::v1();
        assert_eq!(schema.version(), SCHEMA_VERSION);
        for kind in [
            EventKind::ActivityCalculated,
            EventKind::SaleCreated,
            EventKind::SaleCancelled,
            EventKind::NftPurchased,
            EventKind::LoanRequested,
            EventKind::LoanFunded,
            EventKind::LoanRepaid,
            EventKind::LoanLiquidated,
            EventKind::LoanCancelled,
        ] {
            assert!(schema.layout_for(kind).is_some(), "missing layout for {kind}");
        }
    }

    #[test]
    fn decodes_loan_funded_fields() {
        let lender = address!("00000000000000000000000000000000000000c0");
        let log = entry(&IMarketplace::LoanFunded {
            tokenId: U256::from(7u64),
            lender,
            loanAmount: U256::from(500u64),
            deadline: U256::from(1_702_592_000u64),
        });

        let event = EventSchema::v1().decode(&log).unwrap();
        assert_eq!(
            event,
            DomainEvent::LoanFunded {
                asset_id: AssetId::from(7u64),
                lender,
                principal_native: Money::native(U256::from(500u64)),
                deadline: 1_702_592_000,
            }
        );
    }

    #[test]
    fn unknown_signature_is_reported() {
        let log = entry(&IMarketplace::Transfer {
            from: Address::ZERO,
            to: Address::ZERO,
            tokenId: U256::from(1u64),
        });
        let err = EventSchema::v1().decode(&log).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownSignature(_)));
    }

    #[test]
    fn empty_schema_decodes_nothing() {
        let log = entry(&IMarketplace::LoanLiquidated {
            tokenId: U256::from(1u64),
            lender: Address::ZERO,
        });
        assert!(EventSchema::empty(0).decode(&log).is_err());
        assert_eq!(EventSchema::empty(0).kind_of(&log), None);
        assert_eq!(
            EventSchema::v1().kind_of(&log),
            Some(EventKind::LoanLiquidated)
        );
    }

    #[test]
    fn truncated_data_is_malformed() {
        let mut log = entry(&IMarketplace::LoanRepaid {
            tokenId: U256::from(1u64),
            borrower: Address::ZERO,
            repaymentAmount: U256::from(9u64),
        });
        log.data = Bytes::from(log.data[..8].to_vec());
        let err = EventSchema::v1().decode(&log).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed { .. }));
    }

    #[test]
    fn oversized_deadline_is_out_of_range() {
        let log = entry(&IMarketplace::LoanFunded {
            tokenId: U256::from(1u64),
            lender: Address::ZERO,
            loanAmount: U256::from(1u64),
            deadline: U256::MAX,
        });
        let err = EventSchema::v1().decode(&log).unwrap_err();
        assert_eq!(
            err,
            DecodeError::OutOfRange {
                kind: EventKind::LoanFunded,
                field: "deadline"
            }
        );
    }
}
