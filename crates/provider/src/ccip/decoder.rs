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

//! Recognizes and decodes offchain lookup reverts.

use alloy_primitives::{Address, Bytes};
use alloy_sol_types::SolError;
use detour_types::{OffchainLookup, RedirectSignal};

use crate::ResolutionError;

/// What a call's return or revert bytes turned out to be
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallOutcome {
    /// A lookup raised by the call target
    Redirect(RedirectSignal),
    /// Anything else, unchanged
    Result(Bytes),
}

/// True if `data` is the lookup selector followed by whole 32-byte words
pub fn is_offchain_lookup(data: &[u8]) -> bool {
    data.len() >= 4 && (data.len() - 4) % 32 == 0 && data[..4] == OffchainLookup::SELECTOR
}

/// Decode `data` returned or reverted by a call to `target`.
///
/// Bytes that are not a lookup are returned as [`CallOutcome::Result`]. A
/// lookup whose sender is not `target` is a [`ResolutionError::NestedScopeViolation`].
pub fn decode_call_outcome(
    target: Option<Address>,
    data: Bytes,
) -> Result<CallOutcome, ResolutionError> {
    if !is_offchain_lookup(&data) {
        return Ok(CallOutcome::Result(data));
    }

    let signal: RedirectSignal = OffchainLookup::abi_decode(&data)
        .map_err(|e| ResolutionError::MalformedRedirect(e.to_string()))?
        .into();

    if target != Some(signal.sender) {
        return Err(ResolutionError::NestedScopeViolation { target, signal });
    }

    Ok(CallOutcome::Redirect(signal))
}
