//! USD/native price queries.

use std::sync::Arc;

use alloy_primitives::Address;
use tracing::debug;

use crate::contract::call::read;
use crate::contract::marketplace::IMarketplace;
use crate::domain::money::{ExchangeRate, Money, Unit};
use crate::error::Result;
use crate::port::outbound::ledger::Ledger;

/// Reads the price feed through the marketplace contract. Holds no state;
/// every call is a fresh read.
pub struct PriceOracle {
    ledger: Arc<dyn Ledger>,
    marketplace: Address,
}

impl PriceOracle {
    pub fn new(ledger: Arc<dyn Ledger>, marketplace: Address) -> Self {
        Self {
            ledger,
            marketplace,
        }
    }

    /// Current USD price of one native unit.
    ///
    /// # Errors
    ///
    /// Fails on a read error or a non-positive feed answer.
    pub async fn latest_price(&self) -> Result<ExchangeRate> {
        let answer = read(
            self.ledger.as_ref(),
            self.marketplace,
            IMarketplace::getLatestPriceCall {},
        )
        .await?;
        let rate = ExchangeRate::from_answer(answer)?;
        debug!(%rate, "Read price feed");
        Ok(rate)
    }

    /// Ledger-side USD to native conversion.
    ///
    /// # Errors
    ///
    /// Fails when `usd` is not a USD amount or the read fails.
    pub async fn usd_to_native(&self, usd: Money) -> Result<Money> {
        usd.expect_unit(Unit::Usd)?;
        let raw = read(
            self.ledger.as_ref(),
            self.marketplace,
            IMarketplace::convertUSDToETHCall {
                usdAmount: usd.raw(),
            },
        )
        .await?;
        Ok(Money::native(raw))
    }

    /// Ledger-side native to USD conversion.
    ///
    /// # Errors
    ///
    /// Fails when `native` is not a native amount or the read fails.
    pub async fn native_to_usd(&self, native: Money) -> Result<Money> {
        native.expect_unit(Unit::Native)?;
        let raw = read(
            self.ledger.as_ref(),
            self.marketplace,
            IMarketplace::convertETHToUSDCall {
                ethAmount: native.raw(),
            },
        )
        .await?;
        Ok(Money::usd(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::DomainError;
    use crate::error::Error;
    use crate::testkit::fixture;
    use crate::testkit::ledger::ScriptedLedger;
    use alloy_primitives::{I256, U256};
    use rust_decimal_macros::dec;

    fn oracle(ledger: Arc<ScriptedLedger>) -> PriceOracle {
        let marketplace = ledger.marketplace();
        PriceOracle::new(ledger, marketplace)
    }

    #[tokio::test]
    async fn latest_price_reads_feed() {
        let ledger = Arc::new(ScriptedLedger::new());
        let rate = oracle(ledger).latest_price().await.unwrap();
        assert_eq!(rate.as_money(), Money::usd(fixture::usd(3_000)));
    }

    #[tokio::test]
    async fn ledger_and_local_conversions_agree() {
        let ledger = Arc::new(ScriptedLedger::new());
        let oracle = oracle(ledger);
        let usd = Money::from_decimal(dec!(1500), Unit::Usd).unwrap();

        let remote = oracle.usd_to_native(usd).await.unwrap();
        let local = oracle
            .latest_price()
            .await
            .unwrap()
            .usd_to_native(usd)
            .unwrap();
        assert_eq!(remote, local);
        assert_eq!(remote.to_decimal(), Some(dec!(0.5)));

        let back = oracle.native_to_usd(remote).await.unwrap();
        assert_eq!(back, usd);
    }

    #[tokio::test]
    async fn negative_feed_answer_is_rejected() {
        let ledger = Arc::new(ScriptedLedger::new());
        ledger.set_price_answer(I256::ZERO - I256::from_raw(U256::from(1u64)));
        let err = oracle(ledger).latest_price().await.unwrap_err();
        assert!(matches!(
            err,
            Error::Domain(DomainError::InvalidPriceFeed { .. })
        ));
    }

    #[tokio::test]
    async fn wrong_unit_never_reaches_the_ledger() {
        let ledger = Arc::new(ScriptedLedger::new());
        let err = oracle(ledger)
            .usd_to_native(Money::native(U256::from(1u64)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Domain(DomainError::UnitMismatch { .. })
        ));
    }
}
