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

use std::sync::Arc;

use alloy_eips::BlockId;
use alloy_json_rpc::{RpcRecv, RpcSend};
use alloy_primitives::{Address, Bytes, TxHash, U256};
use alloy_rpc_types_eth::{TransactionReceipt, TransactionRequest};
use detour_types::{CallContext, ResolutionResult};

use super::{
    resolver::{resolve_call, ResolverSettings},
    signer::CcipSigner,
};
use crate::{EvmProvider, GatewayClient, ProviderResult, ResolutionError, Signer};

struct CcipProviderInner<EP, G> {
    inner: EP,
    gateway: G,
    settings: ResolverSettings,
}

/// Provider that resolves offchain lookups raised by `eth_call`.
///
/// `call` goes through [`resolve_call`]; every other method is forwarded to
/// the wrapped provider unchanged.
pub struct CcipProvider<EP, G>(Arc<CcipProviderInner<EP, G>>);

impl<EP, G> Clone for CcipProvider<EP, G> {
    fn clone(&self) -> Self {
        CcipProvider(Arc::clone(&self.0))
    }
}

impl<EP, G> CcipProvider<EP, G> {
    /// Wrap `inner`, fetching offchain data through `gateway`
    pub fn new(inner: EP, gateway: G) -> Self {
        Self::with_settings(inner, gateway, ResolverSettings::default())
    }

    /// Wrap `inner` with custom resolver settings
    pub fn with_settings(inner: EP, gateway: G, settings: ResolverSettings) -> Self {
        CcipProvider(Arc::new(CcipProviderInner {
            inner,
            gateway,
            settings,
        }))
    }

    /// The wrapped provider
    pub fn inner(&self) -> &EP {
        &self.0.inner
    }

    /// The resolver settings
    pub fn settings(&self) -> &ResolverSettings {
        &self.0.settings
    }
}

impl<EP, G> CcipProvider<EP, G>
where
    EP: EvmProvider,
    G: GatewayClient,
{
    /// Resolve `call`, returning the final call alongside its result
    pub async fn resolve(&self, call: CallContext) -> ProviderResult<ResolutionResult> {
        resolve_call(&self.0.inner, &self.0.gateway, &self.0.settings, call).await
    }

    /// A signer that resolves lookups before submitting transactions.
    ///
    /// Fails with [`ResolutionError::NotSupported`] if the wrapped provider
    /// cannot produce a signer.
    pub fn get_signer(&self) -> ProviderResult<CcipSigner<EP, G>> {
        let signer = self
            .0
            .inner
            .signer()
            .ok_or(ResolutionError::NotSupported(
                "wrapped provider cannot produce a signer",
            ))?;
        Ok(CcipSigner::new(signer, self.clone()))
    }
}

#[async_trait::async_trait]
impl<EP, G> EvmProvider for CcipProvider<EP, G>
where
    EP: EvmProvider + 'static,
    G: GatewayClient + 'static,
{
    async fn request<P, R>(&self, method: &'static str, params: P) -> ProviderResult<R>
    where
        P: RpcSend + 'static,
        R: RpcRecv,
    {
        self.0.inner.request(method, params).await
    }

    async fn call(&self, tx: &TransactionRequest, block: Option<BlockId>) -> ProviderResult<Bytes> {
        if !self.0.settings.enabled {
            return self.0.inner.call(tx, block).await;
        }

        let res = self.resolve(CallContext::new(tx.clone(), block)).await?;
        Ok(res.result)
    }

    async fn get_chain_id(&self) -> ProviderResult<u64> {
        self.0.inner.get_chain_id().await
    }

    async fn get_block_number(&self) -> ProviderResult<u64> {
        self.0.inner.get_block_number().await
    }

    async fn get_balance(&self, address: Address, block: Option<BlockId>) -> ProviderResult<U256> {
        self.0.inner.get_balance(address, block).await
    }

    async fn get_code(&self, address: Address, block: Option<BlockId>) -> ProviderResult<Bytes> {
        self.0.inner.get_code(address, block).await
    }

    async fn get_transaction_count(&self, address: Address) -> ProviderResult<u64> {
        self.0.inner.get_transaction_count(address).await
    }

    async fn estimate_gas(
        &self,
        tx: &TransactionRequest,
        block: Option<BlockId>,
    ) -> ProviderResult<u64> {
        self.0.inner.estimate_gas(tx, block).await
    }

    async fn get_max_priority_fee(&self) -> ProviderResult<u128> {
        self.0.inner.get_max_priority_fee().await
    }

    async fn get_pending_base_fee(&self) -> ProviderResult<u128> {
        self.0.inner.get_pending_base_fee().await
    }

    async fn send_raw_transaction(&self, tx: Bytes) -> ProviderResult<TxHash> {
        self.0.inner.send_raw_transaction(tx).await
    }

    async fn get_transaction_receipt(
        &self,
        tx: TxHash,
    ) -> ProviderResult<Option<TransactionReceipt>> {
        self.0.inner.get_transaction_receipt(tx).await
    }

    fn signer(&self) -> Option<Arc<dyn Signer>> {
        self.get_signer()
            .ok()
            .map(|signer| Arc::new(signer) as Arc<dyn Signer>)
    }
}
