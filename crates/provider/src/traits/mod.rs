//! Traits for the provider module.

mod error;
pub use error::{ProviderError, ProviderResult, ResolutionError};

mod evm;
#[cfg(feature = "test-utils")]
pub use evm::MockEvmProvider;
pub use evm::EvmProvider;

mod gateway;
#[cfg(feature = "test-utils")]
pub use gateway::MockGatewayClient;
pub use gateway::GatewayClient;

mod signer;
#[cfg(feature = "test-utils")]
pub use signer::MockSigner;
pub use signer::Signer;
