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
use alloy_primitives::{Address, Bytes, Signature, TxHash};
use alloy_rpc_types_eth::TransactionRequest;
use detour_types::CallContext;
use tracing::debug;

use super::provider::CcipProvider;
use crate::{EvmProvider, GatewayClient, ProviderResult, ResolutionError, Signer};

/// Signer that resolves offchain lookups in a transaction's call data before submitting it.
///
/// Only obtainable through [`CcipProvider::get_signer`].
pub struct CcipSigner<EP, G> {
    signer: Arc<dyn Signer>,
    provider: CcipProvider<EP, G>,
}

impl<EP, G> Clone for CcipSigner<EP, G> {
    fn clone(&self) -> Self {
        Self {
            signer: Arc::clone(&self.signer),
            provider: self.provider.clone(),
        }
    }
}

impl<EP, G> CcipSigner<EP, G> {
    pub(crate) fn new(signer: Arc<dyn Signer>, provider: CcipProvider<EP, G>) -> Self {
        Self { signer, provider }
    }

    /// The provider this signer resolves through
    pub fn provider(&self) -> &CcipProvider<EP, G> {
        &self.provider
    }

    /// Rebinding to another provider would bypass preflight resolution, so it always fails.
    pub fn connect<Q>(&self, _provider: Q) -> ProviderResult<Self> {
        Err(ResolutionError::NotSupported(
            "cannot connect a lookup-resolving signer to another provider",
        )
        .into())
    }
}

#[async_trait::async_trait]
impl<EP, G> Signer for CcipSigner<EP, G>
where
    EP: EvmProvider + 'static,
    G: GatewayClient + 'static,
{
    fn address(&self) -> Address {
        self.signer.address()
    }

    async fn sign_message(&self, message: &[u8]) -> ProviderResult<Signature> {
        self.signer.sign_message(message).await
    }

    async fn sign_transaction(&self, _tx: TransactionRequest) -> ProviderResult<Bytes> {
        Err(ResolutionError::NotSupported(
            "signing without submitting skips preflight resolution",
        )
        .into())
    }

    async fn populate_transaction(
        &self,
        tx: TransactionRequest,
    ) -> ProviderResult<TransactionRequest> {
        self.signer.populate_transaction(tx).await
    }

    async fn send_transaction(&self, mut tx: TransactionRequest) -> ProviderResult<TxHash> {
        // nonce, fees and gas are filled by the wrapped signer on the resolved transaction
        tx.from.get_or_insert(self.signer.address());

        // a caller-set gas limit is for the mined transaction, not the preflight call
        let gas = tx.gas.take();
        let resolved = self
            .provider
            .resolve(CallContext::new(tx, Some(BlockId::latest())))
            .await?;

        debug!(to = ?resolved.call.target(), "submitting resolved transaction");
        let mut tx = resolved.call.tx;
        tx.gas = gas;

        self.signer.send_transaction(tx).await
    }
}
