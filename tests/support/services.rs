//! Services wired over one [`ScriptedLedger`].

use std::sync::Arc;

use nftlend::application::activity::{ActivityRequestFlow, ActivityRequestSettings};
use nftlend::application::asset::AssetCatalog;
use nftlend::application::executor::TransactionExecutor;
use nftlend::application::loan::LoanLifecycle;
use nftlend::application::oracle::PriceOracle;
use nftlend::application::resolver::EventResolver;
use nftlend::application::sale::SaleLifecycle;
use nftlend::testkit::config;
use nftlend::testkit::ledger::ScriptedLedger;

pub struct Services {
    pub ledger: Arc<ScriptedLedger>,
    pub executor: Arc<TransactionExecutor>,
}

impl Services {
    pub fn new() -> Self {
        Self::with_ledger(Arc::new(ScriptedLedger::new()))
    }

    pub fn with_ledger(ledger: Arc<ScriptedLedger>) -> Self {
        let executor = Arc::new(TransactionExecutor::new(
            ledger.clone(),
            config::confirmation(5),
        ));
        Self { ledger, executor }
    }

    pub fn oracle(&self) -> PriceOracle {
        PriceOracle::new(self.ledger.clone(), self.ledger.marketplace())
    }

    pub fn sales(&self) -> SaleLifecycle {
        SaleLifecycle::new(
            self.ledger.clone(),
            self.executor.clone(),
            EventResolver::default(),
            self.ledger.marketplace(),
        )
    }

    pub fn loans(&self) -> LoanLifecycle {
        LoanLifecycle::new(
            self.ledger.clone(),
            self.executor.clone(),
            EventResolver::default(),
            self.ledger.marketplace(),
        )
    }

    pub fn assets(&self) -> AssetCatalog {
        AssetCatalog::new(
            self.ledger.clone(),
            self.executor.clone(),
            self.ledger.marketplace(),
        )
    }

    pub fn activity(&self, settings: ActivityRequestSettings) -> ActivityRequestFlow {
        ActivityRequestFlow::new(
            self.ledger.clone(),
            self.executor.clone(),
            EventResolver::default(),
            settings,
        )
    }
}
