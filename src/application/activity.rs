//! Activity-point requests.
//!
//! A request starts an off-ledger computation. Its result is published as an
//! `ActivityCalculated` log, either in the request receipt or some blocks
//! later, so the flow checks the receipt first and then polls.

use std::sync::Arc;

use alloy_primitives::Address;
use tracing::info;

use super::executor::TransactionExecutor;
use super::polling::{PollPlan, PollingResolver};
use super::resolver::EventResolver;
use crate::contract::activity::IActivityRequest;
use crate::domain::activity::ActivityResult;
use crate::domain::event::{DomainEvent, EventKind};
use crate::error::{ConfigError, Result};
use crate::port::outbound::identity::normalize_handle;
use crate::port::outbound::ledger::{Ledger, LedgerCall};

/// Parameters of the activity request contract. Any unset field makes
/// requests fail before submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityRequestSettings {
    pub contract: Option<Address>,
    pub secrets_slot: Option<u8>,
    pub secrets_version: Option<u64>,
    pub subscription_id: Option<u64>,
    pub poll: PollPlan,
}

struct ResolvedSettings {
    contract: Address,
    slot: u8,
    version: u64,
    subscription: u64,
}

impl ActivityRequestSettings {
    fn resolve(&self) -> std::result::Result<ResolvedSettings, ConfigError> {
        let contract = self
            .contract
            .filter(|a| !a.is_zero())
            .ok_or(ConfigError::MissingField {
                field: "contracts.activity",
            })?;
        let slot = self.secrets_slot.ok_or(ConfigError::MissingField {
            field: "activity.secrets_slot",
        })?;
        let version = self.secrets_version.ok_or(ConfigError::MissingField {
            field: "activity.secrets_version",
        })?;
        let subscription = self.subscription_id.ok_or(ConfigError::MissingField {
            field: "activity.subscription_id",
        })?;
        Ok(ResolvedSettings {
            contract,
            slot,
            version,
            subscription,
        })
    }
}

/// Submits activity requests and resolves their results.
pub struct ActivityRequestFlow {
    ledger: Arc<dyn Ledger>,
    executor: Arc<TransactionExecutor>,
    resolver: EventResolver,
    settings: ActivityRequestSettings,
}

impl ActivityRequestFlow {
    pub fn new(
        ledger: Arc<dyn Ledger>,
        executor: Arc<TransactionExecutor>,
        resolver: EventResolver,
        settings: ActivityRequestSettings,
    ) -> Self {
        Self {
            ledger,
            executor,
            resolver,
            settings,
        }
    }

    /// Request activity points for `identifier` and wait for the result.
    ///
    /// `results` is `None` when the computation had not published anything
    /// by the time polling gave up.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingField`] when the contract or its parameters are
    /// unset, checked before submission; otherwise ledger errors.
    pub async fn request(&self, identifier: &str) -> Result<ActivityResult> {
        let settings = self.settings.resolve()?;
        let identifier = normalize_handle(identifier)?;

        let call = LedgerCall::new(
            settings.contract,
            &IActivityRequest::sendRequestCall {
                donHostedSecretsSlotID: settings.slot,
                donHostedSecretsVersion: settings.version,
                args: vec![identifier.clone()],
                subscriptionId: settings.subscription,
            },
        );
        let receipt = self.executor.execute(&call).await?;

        let results = match self
            .resolver
            .find_populated(receipt.logs(), EventKind::ActivityCalculated)
        {
            Some(event) => {
                info!(identifier = %identifier, "Activity result found in receipt");
                event.into_activity()
            }
            None => {
                info!(
                    identifier = %identifier,
                    max_attempts = self.settings.poll.max_attempts,
                    "No activity result in receipt, polling"
                );
                PollingResolver::new(
                    self.ledger.clone(),
                    self.resolver.clone(),
                    settings.contract,
                )
                .poll(EventKind::ActivityCalculated, self.settings.poll)
                .await
                .and_then(DomainEvent::into_activity)
            }
        };

        Ok(ActivityResult {
            handle: receipt.handle(),
            from: self.ledger.sender(),
            to: settings.contract,
            identifier,
            block_number: receipt.block_number(),
            results,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::executor::ConfirmationPolicy;
    use crate::domain::activity::ActivityPoints;
    use crate::error::Error;
    use crate::testkit::fixture;
    use crate::testkit::ledger::ScriptedLedger;
    use alloy_primitives::U256;
    use std::time::Duration;

    fn settings(ledger: &ScriptedLedger) -> ActivityRequestSettings {
        ActivityRequestSettings {
            contract: Some(ledger.activity()),
            secrets_slot: Some(0),
            secrets_version: Some(1_712_345_678),
            subscription_id: Some(42),
            poll: PollPlan {
                max_attempts: 3,
                delay: Duration::from_millis(100),
                lookback: 100,
            },
        }
    }

    fn flow(ledger: &Arc<ScriptedLedger>, settings: ActivityRequestSettings) -> ActivityRequestFlow {
        let executor = Arc::new(TransactionExecutor::new(
            ledger.clone(),
            ConfirmationPolicy::default(),
        ));
        ActivityRequestFlow::new(ledger.clone(), executor, EventResolver::default(), settings)
    }

    #[tokio::test]
    async fn unset_parameters_fail_before_submission() {
        let ledger = Arc::new(ScriptedLedger::new());
        let mut missing = settings(&ledger);
        missing.subscription_id = None;

        let err = flow(&ledger, missing).request("alice").await.unwrap_err();
        assert!(err.is_configuration());
        assert!(matches!(
            err,
            Error::Config(ConfigError::MissingField {
                field: "activity.subscription_id"
            })
        ));
        assert!(ledger.submissions().is_empty());

        let mut no_contract = settings(&ledger);
        no_contract.contract = Some(Address::ZERO);
        let err = flow(&ledger, no_contract).request("alice").await.unwrap_err();
        assert!(err.is_configuration());
    }

    #[tokio::test]
    async fn result_in_receipt_skips_polling() {
        let ledger = Arc::new(ScriptedLedger::new());
        ledger.set_activity_result(
            ActivityPoints::new(vec![fixture::ALICE], vec![U256::from(250u64)]),
            true,
        );

        let result = flow(&ledger, settings(&ledger))
            .request("@Alice")
            .await
            .unwrap();
        assert!(result.is_ready());
        assert_eq!(result.identifier, "Alice");
        assert_eq!(result.from, Some(fixture::ALICE));
        assert_eq!(result.to, ledger.activity());
        assert_eq!(ledger.log_read_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_receipt_result_falls_back_to_polling() {
        let ledger = Arc::new(ScriptedLedger::new());
        ledger.set_activity_result(ActivityPoints::default(), true);

        let result = flow(&ledger, settings(&ledger))
            .request("carol")
            .await
            .unwrap();
        assert!(!result.is_ready());
        assert_eq!(ledger.log_read_count(), 3);
    }
}
