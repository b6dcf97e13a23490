//! Activity request contract interface.
//!
//! `sendRequest` starts an off-ledger computation; its result arrives later
//! as an `ActivityCalculated` log from the same contract.

use alloy_sol_types::sol;

sol! {
    #[derive(Debug, PartialEq, Eq)]
    interface IActivityRequest {
        function sendRequest(
            uint8 donHostedSecretsSlotID,
            uint64 donHostedSecretsVersion,
            string[] args,
            uint64 subscriptionId
        ) external returns (bytes32 requestId);

        event ActivityCalculated(address[] wallets, uint256[] activityPoints);
    }
}
