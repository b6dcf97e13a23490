//! Sale lifecycle: list, purchase, cancel.
//!
//! Sales are priced in USD; the native amount a buyer pays is read fresh
//! right before submission and attached exactly.

use std::sync::Arc;

use alloy_primitives::Address;
use serde::Serialize;
use tracing::info;

use super::executor::TransactionExecutor;
use super::resolver::EventResolver;
use crate::contract::call::read;
use crate::contract::marketplace::IMarketplace;
use crate::domain::error::DomainError;
use crate::domain::event::{DomainEvent, EventKind};
use crate::domain::id::AssetId;
use crate::domain::money::{Money, Unit};
use crate::domain::receipt::Receipt;
use crate::domain::sale::{Sale, SaleListing, SaleQuote};
use crate::error::{LedgerError, Result};
use crate::port::outbound::ledger::{Ledger, LedgerCall};

/// Receipt of a sale operation and the event it emitted, if found.
#[derive(Debug, Clone, Serialize)]
pub struct SaleOutcome {
    pub receipt: Receipt,
    pub event: Option<DomainEvent>,
}

/// Orchestrates sales against the marketplace contract.
pub struct SaleLifecycle {
    ledger: Arc<dyn Ledger>,
    executor: Arc<TransactionExecutor>,
    resolver: EventResolver,
    marketplace: Address,
}

impl SaleLifecycle {
    pub fn new(
        ledger: Arc<dyn Ledger>,
        executor: Arc<TransactionExecutor>,
        resolver: EventResolver,
        marketplace: Address,
    ) -> Self {
        Self {
            ledger,
            executor,
            resolver,
            marketplace,
        }
    }

    /// List `asset_id` for `price_usd`.
    ///
    /// # Errors
    ///
    /// [`DomainError::InvalidPrice`] for a zero price, checked before any
    /// ledger interaction; otherwise ledger errors.
    pub async fn create(&self, asset_id: AssetId, price_usd: Money) -> Result<SaleOutcome> {
        price_usd.expect_unit(Unit::Usd)?;
        if price_usd.is_zero() {
            return Err(DomainError::InvalidPrice {
                price: price_usd.to_string(),
            }
            .into());
        }

        let call = LedgerCall::new(
            self.marketplace,
            &IMarketplace::createSaleCall {
                tokenId: asset_id.as_u256(),
                priceUSD: price_usd.raw(),
            },
        );
        let receipt = self.executor.execute(&call).await?;
        info!(%asset_id, price = %price_usd, "Sale created");
        Ok(self.outcome(receipt, EventKind::SaleCreated))
    }

    /// Buy `asset_id`, paying the current native price.
    ///
    /// # Errors
    ///
    /// [`LedgerError::ExecutionReverted`] when the sale is not active or the
    /// price moved between the read and inclusion.
    pub async fn purchase(&self, asset_id: AssetId) -> Result<SaleOutcome> {
        let quote = self.sale_quote(asset_id).await?;
        let call = LedgerCall::new(
            self.marketplace,
            &IMarketplace::purchaseNFTCall {
                tokenId: asset_id.as_u256(),
            },
        )
        .with_value(quote.native.raw());

        let receipt = self.executor.execute(&call).await?;
        info!(%asset_id, paid = %quote.native, "Asset purchased");
        Ok(self.outcome(receipt, EventKind::NftPurchased))
    }

    /// Withdraw the listing. Only the seller may; the ledger decides.
    ///
    /// # Errors
    ///
    /// [`LedgerError::ExecutionReverted`] when the caller is not the seller
    /// or the sale is not active.
    pub async fn cancel(&self, asset_id: AssetId) -> Result<SaleOutcome> {
        let call = LedgerCall::new(
            self.marketplace,
            &IMarketplace::cancelSaleCall {
                tokenId: asset_id.as_u256(),
            },
        );
        let receipt = self.executor.execute(&call).await?;
        info!(%asset_id, "Sale cancelled");
        Ok(self.outcome(receipt, EventKind::SaleCancelled))
    }

    /// All active sales with their native price as of now.
    ///
    /// # Errors
    ///
    /// Read or decode failures, including mismatched array lengths.
    pub async fn active_sales(&self) -> Result<Vec<SaleListing>> {
        let sales = read(
            self.ledger.as_ref(),
            self.marketplace,
            IMarketplace::getAllActiveSalesCall {},
        )
        .await?;

        let n = sales.tokenIds.len();
        if sales.sellers.len() != n || sales.pricesUSD.len() != n || sales.pricesETH.len() != n {
            return Err(LedgerError::Decode(format!(
                "getAllActiveSales returned uneven arrays ({n} tokens)"
            ))
            .into());
        }

        Ok((0..n)
            .map(|i| SaleListing {
                sale: Sale {
                    asset_id: AssetId::new(sales.tokenIds[i]),
                    seller: sales.sellers[i],
                    price_usd: Money::usd(sales.pricesUSD[i]),
                    active: true,
                },
                price_native: Money::native(sales.pricesETH[i]),
            })
            .collect())
    }

    /// The active sale of `asset_id`, if there is one.
    ///
    /// # Errors
    ///
    /// Read or decode failures.
    pub async fn sale_info(&self, asset_id: AssetId) -> Result<Option<Sale>> {
        let info = read(
            self.ledger.as_ref(),
            self.marketplace,
            IMarketplace::getSaleInfoCall {
                tokenId: asset_id.as_u256(),
            },
        )
        .await?;

        Ok(info.isActive.then(|| Sale {
            asset_id,
            seller: info.seller,
            price_usd: Money::usd(info.priceUSD),
            active: true,
        }))
    }

    /// What buying `asset_id` costs right now.
    ///
    /// # Errors
    ///
    /// [`LedgerError::ExecutionReverted`] when the sale is not active.
    pub async fn sale_quote(&self, asset_id: AssetId) -> Result<SaleQuote> {
        let price = read(
            self.ledger.as_ref(),
            self.marketplace,
            IMarketplace::getSaleETHPriceCall {
                tokenId: asset_id.as_u256(),
            },
        )
        .await?;
        Ok(SaleQuote {
            native: Money::native(price.ethPrice),
            usd: Money::usd(price.priceUSD),
        })
    }

    /// Ids of every asset currently for sale.
    ///
    /// # Errors
    ///
    /// Read or decode failures.
    pub async fn tokens_for_sale(&self) -> Result<Vec<AssetId>> {
        let ids = read(
            self.ledger.as_ref(),
            self.marketplace,
            IMarketplace::getTokensForSaleCall {},
        )
        .await?;
        Ok(ids.into_iter().map(AssetId::new).collect())
    }

    fn outcome(&self, receipt: Receipt, kind: EventKind) -> SaleOutcome {
        let event = self.resolver.extract(&receipt, kind);
        SaleOutcome { receipt, event }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::executor::ConfirmationPolicy;
    use crate::error::{Error, FailureCategory};
    use crate::testkit::fixture;
    use crate::testkit::ledger::ScriptedLedger;
    use alloy_primitives::U256;
    use rust_decimal_macros::dec;

    fn lifecycle(ledger: &Arc<ScriptedLedger>) -> SaleLifecycle {
        let executor = Arc::new(TransactionExecutor::new(
            ledger.clone(),
            ConfirmationPolicy::default(),
        ));
        SaleLifecycle::new(
            ledger.clone(),
            executor,
            EventResolver::default(),
            ledger.marketplace(),
        )
    }

    #[tokio::test]
    async fn zero_price_is_rejected_locally() {
        let ledger = Arc::new(ScriptedLedger::new());
        let id = AssetId::new(ledger.seed_token(fixture::ALICE, "ipfs://a"));

        let err = lifecycle(&ledger)
            .create(id, Money::zero(Unit::Usd))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Domain(DomainError::InvalidPrice { .. })));
        assert!(ledger.submissions().is_empty());
    }

    #[tokio::test]
    async fn create_reports_sale_created_event() {
        let ledger = Arc::new(ScriptedLedger::new());
        let id = AssetId::new(ledger.seed_token(fixture::ALICE, "ipfs://a"));
        let price = Money::from_decimal(dec!(1500), Unit::Usd).unwrap();

        let outcome = lifecycle(&ledger).create(id, price).await.unwrap();
        assert_eq!(
            outcome.event,
            Some(DomainEvent::SaleCreated {
                asset_id: id,
                seller: fixture::ALICE,
                price_usd: price,
            })
        );
    }

    #[tokio::test]
    async fn purchase_attaches_freshly_read_price() {
        let ledger = Arc::new(ScriptedLedger::new());
        let id = AssetId::new(ledger.seed_token(fixture::ALICE, "ipfs://a"));
        let sales = lifecycle(&ledger);
        sales
            .create(id, Money::usd(fixture::usd(1_500)))
            .await
            .unwrap();

        ledger.set_price_usd(2_000);
        ledger.set_sender(Some(fixture::BOB));
        let outcome = sales.purchase(id).await.unwrap();

        let paid = ledger.submissions().last().unwrap().value;
        assert_eq!(paid, fixture::eth(3) / U256::from(4u64));
        assert!(matches!(
            outcome.event,
            Some(DomainEvent::NftPurchased { buyer, .. }) if buyer == fixture::BOB
        ));
        assert_eq!(ledger.owner_of(id.as_u256()), Some(fixture::BOB));
        assert_eq!(sales.sale_info(id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn purchase_of_inactive_sale_fails_on_ledger() {
        let ledger = Arc::new(ScriptedLedger::new());
        let id = AssetId::new(ledger.seed_token(fixture::ALICE, "ipfs://a"));

        let err = lifecycle(&ledger).purchase(id).await.unwrap_err();
        assert_eq!(err.category(), FailureCategory::FailedOnLedger);
        assert_eq!(err.revert_reason(), Some("Sale not active"));
    }

    #[tokio::test]
    async fn cancel_by_non_seller_surfaces_revert() {
        let ledger = Arc::new(ScriptedLedger::new());
        let id = AssetId::new(ledger.seed_token(fixture::ALICE, "ipfs://a"));
        let sales = lifecycle(&ledger);
        sales
            .create(id, Money::usd(fixture::usd(10)))
            .await
            .unwrap();

        ledger.set_sender(Some(fixture::CAROL));
        let err = sales.cancel(id).await.unwrap_err();
        assert_eq!(err.revert_reason(), Some("Not the seller"));

        ledger.set_sender(Some(fixture::ALICE));
        let outcome = sales.cancel(id).await.unwrap();
        assert_eq!(outcome.event.map(|e| e.kind()), Some(EventKind::SaleCancelled));
    }

    #[tokio::test]
    async fn active_sales_lists_only_active_entries() {
        let ledger = Arc::new(ScriptedLedger::new());
        let sales = lifecycle(&ledger);
        assert!(sales.active_sales().await.unwrap().is_empty());

        let a = AssetId::new(ledger.seed_token(fixture::ALICE, "ipfs://a"));
        let b = AssetId::new(ledger.seed_token(fixture::ALICE, "ipfs://b"));
        sales.create(a, Money::usd(fixture::usd(300))).await.unwrap();
        sales.create(b, Money::usd(fixture::usd(600))).await.unwrap();
        sales.cancel(a).await.unwrap();

        let listings = sales.active_sales().await.unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].sale.asset_id, b);
        assert_eq!(listings[0].price_native, Money::native(fixture::eth(1) / U256::from(5u64)));
        assert_eq!(sales.tokens_for_sale().await.unwrap(), vec![b]);
    }
}
