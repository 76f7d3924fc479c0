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

use alloy_eips::BlockId;
use alloy_json_rpc::{RpcRecv, RpcSend};
use alloy_primitives::{Address, Bytes, TxHash, U256};
use alloy_provider::Provider as AlloyProvider;
use alloy_rpc_types_eth::{TransactionReceipt, TransactionRequest};
use anyhow::Context;

use crate::{EvmProvider, ProviderResult};

/// Evm Provider implementation using [alloy-provider](https://github.com/alloy-rs/alloy-rs)
#[derive(Clone, Debug)]
pub struct AlloyEvmProvider<AP> {
    inner: AP,
}

impl<AP> AlloyEvmProvider<AP> {
    /// Create a new `AlloyEvmProvider`
    pub fn new(inner: AP) -> Self {
        Self { inner }
    }
}

impl<AP: AlloyProvider> From<AP> for AlloyEvmProvider<AP> {
    fn from(inner: AP) -> Self {
        Self::new(inner)
    }
}

#[async_trait::async_trait]
impl<AP> EvmProvider for AlloyEvmProvider<AP>
where
    AP: AlloyProvider,
{
    async fn request<P, R>(&self, method: &'static str, params: P) -> ProviderResult<R>
    where
        P: RpcSend + 'static,
        R: RpcRecv,
    {
        Ok(self.inner.raw_request(method.into(), params).await?)
    }

    async fn call(&self, tx: &TransactionRequest, block: Option<BlockId>) -> ProviderResult<Bytes> {
        let mut call = self.inner.call(tx.clone());
        if let Some(block) = block {
            call = call.block(block);
        }

        Ok(call.await?)
    }

    async fn get_chain_id(&self) -> ProviderResult<u64> {
        Ok(self.inner.get_chain_id().await?)
    }

    async fn get_block_number(&self) -> ProviderResult<u64> {
        Ok(self.inner.get_block_number().await?)
    }

    async fn get_balance(&self, address: Address, block: Option<BlockId>) -> ProviderResult<U256> {
        let mut call = self.inner.get_balance(address);
        if let Some(block) = block {
            call = call.block_id(block);
        }

        Ok(call.await?)
    }

    async fn get_code(&self, address: Address, block: Option<BlockId>) -> ProviderResult<Bytes> {
        let mut call = self.inner.get_code_at(address);
        if let Some(block) = block {
            call = call.block_id(block);
        }

        Ok(call.await?)
    }

    async fn get_transaction_count(&self, address: Address) -> ProviderResult<u64> {
        Ok(self.inner.get_transaction_count(address).await?)
    }

    async fn estimate_gas(
        &self,
        tx: &TransactionRequest,
        block: Option<BlockId>,
    ) -> ProviderResult<u64> {
        let mut call = self.inner.estimate_gas(tx.clone());
        if let Some(block) = block {
            call = call.block(block);
        }

        Ok(call.await?)
    }

    async fn get_max_priority_fee(&self) -> ProviderResult<u128> {
        Ok(self.inner.get_max_priority_fee_per_gas().await?)
    }

    async fn get_pending_base_fee(&self) -> ProviderResult<u128> {
        let base_fee = self
            .inner
            .get_block(BlockId::pending())
            .await?
            .context("pending block should exist")?
            .header
            .base_fee_per_gas
            .context("pending block should have a nonempty base fee")?;
        Ok(base_fee.into())
    }

    async fn send_raw_transaction(&self, tx: Bytes) -> ProviderResult<TxHash> {
        let pending = self.inner.send_raw_transaction(&tx).await?;
        Ok(*pending.tx_hash())
    }

    async fn get_transaction_receipt(
        &self,
        tx: TxHash,
    ) -> ProviderResult<Option<TransactionReceipt>> {
        Ok(self.inner.get_transaction_receipt(tx).await?)
    }
}
