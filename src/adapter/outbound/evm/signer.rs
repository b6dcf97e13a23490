//! Local signer construction.

use std::str::FromStr;

use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;

use crate::error::{ConfigError, Result};

/// Build a signer from a hex private key, bound to `chain_id` when known.
///
/// # Errors
///
/// Returns an error if the key is empty or not a valid secp256k1 key.
pub fn from_private_key(key: &str, chain_id: Option<u64>) -> Result<PrivateKeySigner> {
    if key.trim().is_empty() {
        return Err(ConfigError::MissingField {
            field: "WALLET_PRIVATE_KEY",
        }
        .into());
    }

    let signer = PrivateKeySigner::from_str(key.trim())
        .map_err(|e| ConfigError::InvalidValue {
            field: "WALLET_PRIVATE_KEY",
            reason: e.to_string(),
        })?
        .with_chain_id(chain_id);
    Ok(signer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    // Well-known development key (first account of the default test mnemonic)
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn derives_address_and_chain() {
        let signer = from_private_key(DEV_KEY, Some(31337)).unwrap();
        assert_eq!(
            signer.address().to_string().to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
        assert_eq!(signer.chain_id(), Some(31337));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            from_private_key("not-a-key", None),
            Err(Error::Config(ConfigError::InvalidValue { .. }))
        ));
        assert!(matches!(
            from_private_key("  ", None),
            Err(Error::Config(ConfigError::MissingField { .. }))
        ));
    }
}
