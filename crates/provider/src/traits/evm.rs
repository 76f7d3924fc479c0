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

//! Trait for interacting with chain data and contracts.

use std::sync::Arc;

use alloy_eips::BlockId;
use alloy_json_rpc::{RpcRecv, RpcSend};
use alloy_primitives::{Address, Bytes, TxHash, U256};
use alloy_rpc_types_eth::{TransactionReceipt, TransactionRequest};
#[cfg(feature = "test-utils")]
use mockall::automock;

use super::{error::ProviderResult, signer::Signer};

/// Trait for interacting with chain data and contracts.
#[cfg_attr(feature = "test-utils", automock)]
#[async_trait::async_trait]
pub trait EvmProvider: Send + Sync {
    /// Make an arbitrary JSON RPC request to the provider
    async fn request<P, R>(&self, method: &'static str, params: P) -> ProviderResult<R>
    where
        P: RpcSend + 'static,
        R: RpcRecv;

    /// Execute a read-only call via `eth_call`
    async fn call(&self, tx: &TransactionRequest, block: Option<BlockId>) -> ProviderResult<Bytes>;

    /// Get the chain id
    async fn get_chain_id(&self) -> ProviderResult<u64>;

    /// Get the current block number
    async fn get_block_number(&self) -> ProviderResult<u64>;

    /// Get the balance of an address
    async fn get_balance(&self, address: Address, block: Option<BlockId>) -> ProviderResult<U256>;

    /// Get the code at an address
    async fn get_code(&self, address: Address, block: Option<BlockId>) -> ProviderResult<Bytes>;

    /// Get the nonce/transaction count of an address
    async fn get_transaction_count(&self, address: Address) -> ProviderResult<u64>;

    /// Estimate the gas a transaction would use
    async fn estimate_gas(
        &self,
        tx: &TransactionRequest,
        block: Option<BlockId>,
    ) -> ProviderResult<u64>;

    /// Get the max fee per gas as reported by the node's RPC
    async fn get_max_priority_fee(&self) -> ProviderResult<u128>;

    /// Get the base fee per gas of the pending block
    async fn get_pending_base_fee(&self) -> ProviderResult<u128>;

    /// Submit a signed, encoded transaction
    async fn send_raw_transaction(&self, tx: Bytes) -> ProviderResult<TxHash>;

    /// Get transaction receipt by hash
    async fn get_transaction_receipt(
        &self,
        tx: TxHash,
    ) -> ProviderResult<Option<TransactionReceipt>>;

    /// A signer bound to this provider, if it can produce one
    fn signer(&self) -> Option<Arc<dyn Signer>> {
        None
    }
}
