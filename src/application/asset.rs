//! Minting and collection queries.

use std::sync::Arc;

use alloy_primitives::{Address, U256};
use alloy_sol_types::SolEvent;
use tracing::{debug, info};

use super::executor::TransactionExecutor;
use crate::contract::call::read;
use crate::contract::marketplace::IMarketplace;
use crate::domain::asset::{AssetInfo, Collection, ContractAddresses, MintOutcome};
use crate::domain::id::AssetId;
use crate::error::{LedgerError, Result};
use crate::port::outbound::ledger::{Ledger, LedgerCall};

/// Mints assets and reads the collection.
pub struct AssetCatalog {
    ledger: Arc<dyn Ledger>,
    executor: Arc<TransactionExecutor>,
    marketplace: Address,
}

impl AssetCatalog {
    pub fn new(
        ledger: Arc<dyn Ledger>,
        executor: Arc<TransactionExecutor>,
        marketplace: Address,
    ) -> Self {
        Self {
            ledger,
            executor,
            marketplace,
        }
    }

    /// Address submissions are signed with, if any.
    #[must_use]
    pub fn signer(&self) -> Option<Address> {
        self.ledger.sender()
    }

    /// Mint a new asset pointing at `uri`.
    ///
    /// The asset id comes from the mint `Transfer` log (zero `from`). It is
    /// `None` if the receipt carries no such log.
    ///
    /// # Errors
    ///
    /// Ledger errors.
    pub async fn mint(&self, uri: &str) -> Result<MintOutcome> {
        let call = LedgerCall::new(
            self.marketplace,
            &IMarketplace::mintCall {
                uri: uri.to_string(),
            },
        );
        let receipt = self.executor.execute(&call).await?;

        let asset_id = receipt
            .logs()
            .iter()
            .filter(|log| {
                log.address == self.marketplace
                    && log.signature() == Some(IMarketplace::Transfer::SIGNATURE_HASH)
            })
            .find_map(|log| {
                match IMarketplace::Transfer::decode_raw_log(log.topics.iter().copied(), &log.data)
                {
                    Ok(t) if t.from.is_zero() => Some(AssetId::new(t.tokenId)),
                    Ok(_) => None,
                    Err(e) => {
                        debug!(error = %e, "Skipping malformed Transfer log");
                        None
                    }
                }
            });

        match asset_id {
            Some(id) => info!(asset_id = %id, uri, "Asset minted"),
            None => info!(uri, "Asset minted, id not reported in receipt"),
        }
        Ok(MintOutcome { receipt, asset_id })
    }

    /// Ids owned by `owner`.
    ///
    /// # Errors
    ///
    /// Read or decode failures.
    pub async fn tokens_of_owner(&self, owner: Address) -> Result<Vec<AssetId>> {
        let ids = read(
            self.ledger.as_ref(),
            self.marketplace,
            IMarketplace::getTokensOfOwnerCall { owner },
        )
        .await?;
        Ok(ids.into_iter().map(AssetId::new).collect())
    }

    /// Every minted id.
    ///
    /// # Errors
    ///
    /// Read or decode failures.
    pub async fn all_tokens(&self) -> Result<Vec<AssetId>> {
        let ids = read(
            self.ledger.as_ref(),
            self.marketplace,
            IMarketplace::getAllTokensCall {},
        )
        .await?;
        Ok(ids.into_iter().map(AssetId::new).collect())
    }

    /// Number of assets minted so far.
    ///
    /// # Errors
    ///
    /// Read or decode failures.
    pub async fn total_minted(&self) -> Result<u64> {
        let total = read(
            self.ledger.as_ref(),
            self.marketplace,
            IMarketplace::totalMintedCall {},
        )
        .await?;
        u64_from(total, "totalMinted")
    }

    /// Metadata URI of `asset_id`.
    ///
    /// # Errors
    ///
    /// [`LedgerError::ExecutionReverted`] for an unknown asset.
    pub async fn token_uri(&self, asset_id: AssetId) -> Result<String> {
        Ok(read(
            self.ledger.as_ref(),
            self.marketplace,
            IMarketplace::tokenURICall {
                tokenId: asset_id.as_u256(),
            },
        )
        .await?)
    }

    /// Current owner of `asset_id`.
    ///
    /// # Errors
    ///
    /// [`LedgerError::ExecutionReverted`] for an unknown asset.
    pub async fn owner_of(&self, asset_id: AssetId) -> Result<Address> {
        Ok(read(
            self.ledger.as_ref(),
            self.marketplace,
            IMarketplace::ownerOfCall {
                tokenId: asset_id.as_u256(),
            },
        )
        .await?)
    }

    /// Owner and URI together.
    ///
    /// # Errors
    ///
    /// [`LedgerError::ExecutionReverted`] for an unknown asset.
    pub async fn info(&self, asset_id: AssetId) -> Result<AssetInfo> {
        let (owner, uri) = tokio::join!(self.owner_of(asset_id), self.token_uri(asset_id));
        Ok(AssetInfo {
            asset_id,
            owner: owner?,
            uri: uri?,
        })
    }

    /// Number of assets `owner` holds.
    ///
    /// # Errors
    ///
    /// Read or decode failures.
    pub async fn balance_of(&self, owner: Address) -> Result<u64> {
        let balance = read(
            self.ledger.as_ref(),
            self.marketplace,
            IMarketplace::balanceOfCall { owner },
        )
        .await?;
        u64_from(balance, "balanceOf")
    }

    /// Activity points recorded on the ledger for `user`.
    ///
    /// # Errors
    ///
    /// Read or decode failures.
    pub async fn activity_points(&self, user: Address) -> Result<U256> {
        Ok(read(
            self.ledger.as_ref(),
            self.marketplace,
            IMarketplace::getUserActivityPointsCall { user },
        )
        .await?)
    }

    /// Addresses of the collection, lending and price feed contracts.
    ///
    /// # Errors
    ///
    /// Read or decode failures.
    pub async fn contract_addresses(&self) -> Result<ContractAddresses> {
        let ledger = self.ledger.as_ref();
        let (nft, lending, price_feed) = tokio::join!(
            read(ledger, self.marketplace, IMarketplace::getNftContractAddressCall {}),
            read(ledger, self.marketplace, IMarketplace::getLendingContractAddressCall {}),
            read(ledger, self.marketplace, IMarketplace::getPriceFeedAddressCall {}),
        );
        Ok(ContractAddresses {
            nft: nft?,
            lending: lending?,
            price_feed: price_feed?,
        })
    }

    /// Collection name, symbol and size.
    ///
    /// # Errors
    ///
    /// Read or decode failures.
    pub async fn collection(&self) -> Result<Collection> {
        let ledger = self.ledger.as_ref();
        let (name, symbol, total) = tokio::join!(
            read(ledger, self.marketplace, IMarketplace::nameCall {}),
            read(ledger, self.marketplace, IMarketplace::symbolCall {}),
            self.total_minted(),
        );
        Ok(Collection {
            name: name?,
            symbol: symbol?,
            total_minted: total?,
        })
    }
}

fn u64_from(value: U256, field: &str) -> Result<u64> {
    u64::try_from(value)
        .map_err(|_| LedgerError::Decode(format!("{field} does not fit in u64")).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::executor::ConfirmationPolicy;
    use crate::testkit::fixture;
    use crate::testkit::ledger::ScriptedLedger;

    fn catalog(ledger: &Arc<ScriptedLedger>) -> AssetCatalog {
        let executor = Arc::new(TransactionExecutor::new(
            ledger.clone(),
            ConfirmationPolicy::default(),
        ));
        AssetCatalog::new(ledger.clone(), executor, ledger.marketplace())
    }

    #[tokio::test]
    async fn mint_reports_id_from_transfer_log() {
        let ledger = Arc::new(ScriptedLedger::new());
        ledger.seed_token(fixture::BOB, "ipfs://first");
        let assets = catalog(&ledger);

        let outcome = assets.mint("ipfs://second").await.unwrap();
        let id = outcome.asset_id.unwrap();
        assert_eq!(id, AssetId::from(2u64));

        let info = assets.info(id).await.unwrap();
        assert_eq!(info.owner, fixture::ALICE);
        assert_eq!(info.uri, "ipfs://second");
        assert_eq!(assets.total_minted().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn owner_queries_agree() {
        let ledger = Arc::new(ScriptedLedger::new());
        let a = AssetId::new(ledger.seed_token(fixture::ALICE, "ipfs://a"));
        ledger.seed_token(fixture::BOB, "ipfs://b");
        let c = AssetId::new(ledger.seed_token(fixture::ALICE, "ipfs://c"));
        let assets = catalog(&ledger);

        assert_eq!(
            assets.tokens_of_owner(fixture::ALICE).await.unwrap(),
            vec![a, c]
        );
        assert_eq!(assets.balance_of(fixture::ALICE).await.unwrap(), 2);
        assert_eq!(assets.all_tokens().await.unwrap().len(), 3);
        assert_eq!(assets.signer(), Some(fixture::ALICE));
    }

    #[tokio::test]
    async fn unknown_token_uri_reverts() {
        let ledger = Arc::new(ScriptedLedger::new());
        let err = catalog(&ledger)
            .token_uri(AssetId::from(77u64))
            .await
            .unwrap_err();
        assert_eq!(err.revert_reason(), Some("Token does not exist"));
    }

    #[tokio::test]
    async fn collection_metadata() {
        let ledger = Arc::new(ScriptedLedger::new());
        ledger.set_activity_points(fixture::CAROL, 40);
        let assets = catalog(&ledger);

        let collection = assets.collection().await.unwrap();
        assert_eq!(collection.symbol, "POA");
        assert_eq!(collection.total_minted, 0);

        let addresses = assets.contract_addresses().await.unwrap();
        assert_eq!(addresses.price_feed, fixture::PRICE_FEED);
        assert_eq!(
            assets.activity_points(fixture::CAROL).await.unwrap(),
            U256::from(40u64)
        );
    }
}
