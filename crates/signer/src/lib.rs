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

#![warn(missing_docs, unreachable_pub, unused_crate_dependencies)]
#![deny(unused_must_use, rust_2018_idioms)]
#![doc(test(
    no_crate_inject,
    attr(deny(warnings, rust_2018_idioms), allow(dead_code, unused_variables))
))]
//! Signer implementations for Detour
//!
//! [`LocalSigner`] holds a private key and fills, signs and submits transactions through an
//! [`EvmProvider`](detour_provider::EvmProvider). [`SignerProvider`] binds one to a provider so
//! that a `CcipProvider` built on top of it can hand out a `CcipSigner`.

mod error;
pub use error::{Error, Result};

mod local;
pub use local::{
    construct_local_signer_from_mnemonic, construct_local_signer_from_private_key, LocalSigner,
    DEFAULT_BASE_FEE_MULTIPLIER,
};

mod provider;
pub use provider::SignerProvider;
