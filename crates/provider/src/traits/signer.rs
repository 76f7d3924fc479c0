// This file is part of Detour.
//
// Detour is free software: you can redistribute it and/or modify it under the
// terms of the GNU Lesser General Public License as published by the Free Software
// Foundation, either version 3 of the License, or (at your option) any later version.
//
// Detour is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with Detour.
// If not, see https://www.gnu.org/licenses/.

//! Trait for signing and submitting transactions.

use alloy_primitives::{Address, Bytes, Signature, TxHash};
use alloy_rpc_types_eth::TransactionRequest;
#[cfg(feature = "test-utils")]
use mockall::automock;

use super::error::ProviderResult;

/// Trait for an account that signs and submits transactions.
#[cfg_attr(feature = "test-utils", automock)]
#[async_trait::async_trait]
pub trait Signer: Send + Sync {
    /// Address of the account
    fn address(&self) -> Address;

    /// Sign an EIP-191 personal message
    async fn sign_message(&self, message: &[u8]) -> ProviderResult<Signature>;

    /// Sign a transaction, returning its EIP-2718 encoding
    async fn sign_transaction(&self, tx: TransactionRequest) -> ProviderResult<Bytes>;

    /// Fill every field the transaction leaves unset (sender, nonce, chain id, fees, gas)
    async fn populate_transaction(
        &self,
        tx: TransactionRequest,
    ) -> ProviderResult<TransactionRequest>;

    /// Populate, sign and submit a transaction
    async fn send_transaction(&self, tx: TransactionRequest) -> ProviderResult<TxHash>;
}
