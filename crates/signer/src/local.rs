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

use alloy_eips::eip2718::Encodable2718;
use alloy_network::{EthereumWallet, TransactionBuilder};
use alloy_primitives::{Address, Bytes, Signature, TxHash};
use alloy_rpc_types_eth::TransactionRequest;
use alloy_signer_local::{coins_bip39::English, MnemonicBuilder, PrivateKeySigner};
use anyhow::Context;
use detour_provider::{EvmProvider, ProviderResult, Signer};
use secrecy::{ExposeSecret, SecretString};

use crate::Result;

/// Multiplier applied to the pending base fee when filling `max_fee_per_gas`
pub const DEFAULT_BASE_FEE_MULTIPLIER: u128 = 2;

/// Parse a hex private key into a signer
pub fn construct_local_signer_from_private_key(
    private_key: &SecretString,
    chain_id: Option<u64>,
) -> Result<PrivateKeySigner> {
    let signer = private_key
        .expose_secret()
        .parse::<PrivateKeySigner>()
        .context("failed to parse private key signer")?;
    Ok(alloy_signer::Signer::with_chain_id(signer, chain_id))
}

/// Derive the signer at `index` of a BIP-39 mnemonic
pub fn construct_local_signer_from_mnemonic(
    mnemonic: &SecretString,
    index: u32,
    chain_id: Option<u64>,
) -> Result<PrivateKeySigner> {
    let signer = MnemonicBuilder::<English>::default()
        .phrase(mnemonic.expose_secret())
        .index(index)?
        .build()?;
    Ok(alloy_signer::Signer::with_chain_id(signer, chain_id))
}

/// A signer holding its key in memory.
///
/// Unset transaction fields are filled from the provider, transactions are signed as EIP-1559
/// and submitted with `eth_sendRawTransaction`.
pub struct LocalSigner<P> {
    signer: PrivateKeySigner,
    wallet: EthereumWallet,
    provider: Arc<P>,
    base_fee_multiplier: u128,
}

impl<P> Clone for LocalSigner<P> {
    fn clone(&self) -> Self {
        Self {
            signer: self.signer.clone(),
            wallet: self.wallet.clone(),
            provider: Arc::clone(&self.provider),
            base_fee_multiplier: self.base_fee_multiplier,
        }
    }
}

impl<P> LocalSigner<P> {
    /// Create a new local signer submitting through `provider`
    pub fn new(signer: PrivateKeySigner, provider: Arc<P>) -> Self {
        Self {
            wallet: EthereumWallet::from(signer.clone()),
            signer,
            provider,
            base_fee_multiplier: DEFAULT_BASE_FEE_MULTIPLIER,
        }
    }

    /// Set the base fee multiplier used when filling fees
    pub fn with_base_fee_multiplier(mut self, base_fee_multiplier: u128) -> Self {
        self.base_fee_multiplier = base_fee_multiplier;
        self
    }

    /// The provider this signer submits through
    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }
}

impl<P: EvmProvider> LocalSigner<P> {
    async fn fill_fees(&self, tx: &mut TransactionRequest) -> Result<()> {
        if tx.gas_price.is_some() {
            return Ok(());
        }

        let priority_fee = match tx.max_priority_fee_per_gas {
            Some(fee) => fee,
            None => {
                let fee = self.provider.get_max_priority_fee().await?;
                tx.max_fee_per_gas.map_or(fee, |max_fee| fee.min(max_fee))
            }
        };
        tx.max_priority_fee_per_gas = Some(priority_fee);

        if tx.max_fee_per_gas.is_none() {
            let base_fee = self.provider.get_pending_base_fee().await?;
            tx.max_fee_per_gas = Some(
                base_fee
                    .saturating_mul(self.base_fee_multiplier)
                    .saturating_add(priority_fee),
            );
        }

        Ok(())
    }

    async fn fill(&self, mut tx: TransactionRequest) -> Result<TransactionRequest> {
        let from = *tx.from.get_or_insert(self.signer.address());

        if tx.nonce.is_none() {
            tx.nonce = Some(self.provider.get_transaction_count(from).await?);
        }
        if tx.chain_id.is_none() {
            tx.chain_id = Some(self.provider.get_chain_id().await?);
        }
        self.fill_fees(&mut tx).await?;
        if tx.gas.is_none() {
            tx.gas = Some(self.provider.estimate_gas(&tx, None).await?);
        }

        tracing::debug!(
            "populated transaction from {from:?} nonce {:?} gas {:?}",
            tx.nonce,
            tx.gas
        );

        Ok(tx)
    }

    async fn sign(&self, tx: TransactionRequest) -> Result<Bytes> {
        let tx = self.fill(tx).await?;
        let envelope = tx.build(&self.wallet).await?;
        Ok(envelope.encoded_2718().into())
    }
}

#[async_trait::async_trait]
impl<P: EvmProvider> Signer for LocalSigner<P> {
    fn address(&self) -> Address {
        self.signer.address()
    }

    async fn sign_message(&self, message: &[u8]) -> ProviderResult<Signature> {
        let signature = alloy_signer::Signer::sign_message(&self.signer, message)
            .await
            .map_err(crate::Error::from)?;
        Ok(signature)
    }

    async fn sign_transaction(&self, tx: TransactionRequest) -> ProviderResult<Bytes> {
        Ok(self.sign(tx).await?)
    }

    async fn populate_transaction(
        &self,
        tx: TransactionRequest,
    ) -> ProviderResult<TransactionRequest> {
        Ok(self.fill(tx).await?)
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> ProviderResult<TxHash> {
        let raw = self.sign(tx).await?;
        let tx_hash = self.provider.send_raw_transaction(raw).await?;
        tracing::info!("submitted transaction {tx_hash:?}");
        Ok(tx_hash)
    }
}
