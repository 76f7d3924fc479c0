//! Offchain lookup (CCIP read) resolution.
//!
//! A contract that needs offchain data reverts with `OffchainLookup`. The
//! [`CcipProvider`] catches the revert, asks the listed gateways for the
//! data and calls the contract's callback with the answer, repeating until
//! the call returns normally. [`CcipSigner`] runs the same resolution as a
//! preflight before submitting a transaction.

mod decoder;
pub use decoder::{decode_call_outcome, is_offchain_lookup, CallOutcome};

mod gateway;
pub use gateway::{expand_url_template, fetch_offchain_data, HttpGatewayClient, HttpGatewaySettings};

mod provider;
pub use provider::CcipProvider;

mod resolver;
pub use resolver::{resolve_call, ResolverSettings, RevertExtractor, DEFAULT_MAX_HOPS};

mod signer;
pub use signer::CcipSigner;
