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

//! Call state carried through offchain lookup resolution.

use alloy_eips::BlockId;
use alloy_primitives::{Address, Bytes};
use alloy_rpc_types_eth::{TransactionInput, TransactionRequest};

/// A read call, replaced (never mutated) at each resolution hop
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CallContext {
    /// The call. Only its input changes between hops.
    pub tx: TransactionRequest,
    /// Block to execute the call at, `None` for the node's default
    pub block: Option<BlockId>,
}

impl CallContext {
    /// Create a new call context
    pub fn new(tx: TransactionRequest, block: Option<BlockId>) -> Self {
        Self { tx, block }
    }

    /// The address being called, if the call has one
    pub fn target(&self) -> Option<Address> {
        self.tx.to.and_then(|kind| kind.to().copied())
    }

    /// The call data of the call
    pub fn call_data(&self) -> Bytes {
        self.tx.input.input().cloned().unwrap_or_default()
    }

    /// A copy of this context with its call data replaced
    pub fn with_call_data(&self, data: Bytes) -> Self {
        let mut tx = self.tx.clone();
        tx.input = TransactionInput::new(data);
        Self {
            tx,
            block: self.block,
        }
    }
}

/// Terminal output of a resolution
#[derive(Clone, Debug, PartialEq)]
pub struct ResolutionResult {
    /// The call that produced `result`
    pub call: CallContext,
    /// Return data of the final call
    pub result: Bytes,
}
