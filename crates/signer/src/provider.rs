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

use alloy_primitives::{Address, Bytes, TxHash, U256};
use alloy_rpc_types_eth::{TransactionReceipt, TransactionRequest};
use alloy_signer_local::PrivateKeySigner;
use detour_provider::{BlockId, EvmProvider, ProviderResult, RpcRecv, RpcSend, Signer};

use crate::LocalSigner;

/// An [`EvmProvider`] that can produce a [`LocalSigner`] bound to itself.
///
/// Every request is forwarded to the wrapped provider.
pub struct SignerProvider<P> {
    inner: Arc<P>,
    signer: Arc<LocalSigner<P>>,
}

impl<P> Clone for SignerProvider<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            signer: Arc::clone(&self.signer),
        }
    }
}

impl<P> SignerProvider<P> {
    /// Wrap `provider` with an account signing through it
    pub fn new(provider: P, signer: PrivateKeySigner) -> Self {
        let inner = Arc::new(provider);
        Self {
            signer: Arc::new(LocalSigner::new(signer, Arc::clone(&inner))),
            inner,
        }
    }

    /// The wrapped provider
    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// The local signer bound to this provider
    pub fn local_signer(&self) -> &LocalSigner<P> {
        &self.signer
    }
}

#[async_trait::async_trait]
impl<P: EvmProvider + 'static> EvmProvider for SignerProvider<P> {
    async fn request<Params, R>(&self, method: &'static str, params: Params) -> ProviderResult<R>
    where
        Params: RpcSend + 'static,
        R: RpcRecv,
    {
        self.inner.request(method, params).await
    }

    async fn call(&self, tx: &TransactionRequest, block: Option<BlockId>) -> ProviderResult<Bytes> {
        self.inner.call(tx, block).await
    }

    async fn get_chain_id(&self) -> ProviderResult<u64> {
        self.inner.get_chain_id().await
    }

    async fn get_block_number(&self) -> ProviderResult<u64> {
        self.inner.get_block_number().await
    }

    async fn get_balance(&self, address: Address, block: Option<BlockId>) -> ProviderResult<U256> {
        self.inner.get_balance(address, block).await
    }

    async fn get_code(&self, address: Address, block: Option<BlockId>) -> ProviderResult<Bytes> {
        self.inner.get_code(address, block).await
    }

    async fn get_transaction_count(&self, address: Address) -> ProviderResult<u64> {
        self.inner.get_transaction_count(address).await
    }

    async fn estimate_gas(
        &self,
        tx: &TransactionRequest,
        block: Option<BlockId>,
    ) -> ProviderResult<u64> {
        self.inner.estimate_gas(tx, block).await
    }

    async fn get_max_priority_fee(&self) -> ProviderResult<u128> {
        self.inner.get_max_priority_fee().await
    }

    async fn get_pending_base_fee(&self) -> ProviderResult<u128> {
        self.inner.get_pending_base_fee().await
    }

    async fn send_raw_transaction(&self, tx: Bytes) -> ProviderResult<TxHash> {
        self.inner.send_raw_transaction(tx).await
    }

    async fn get_transaction_receipt(
        &self,
        tx: TxHash,
    ) -> ProviderResult<Option<TransactionReceipt>> {
        self.inner.get_transaction_receipt(tx).await
    }

    fn signer(&self) -> Option<Arc<dyn Signer>> {
        Some(Arc::clone(&self.signer) as Arc<dyn Signer>)
    }
}
