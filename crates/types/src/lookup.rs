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

//! The offchain lookup revert and its decoded form.

use alloy_primitives::{Address, Bytes, FixedBytes};
use alloy_sol_types::{sol, SolValue};

sol!(
    /// Revert raised by a contract asking the caller to fetch data from one
    /// of `urls` and call `callbackFunction(response, extraData)` on `sender`.
    #[allow(missing_docs)]
    #[derive(Debug, PartialEq, Eq)]
    error OffchainLookup(
        address sender,
        string[] urls,
        bytes callData,
        bytes4 callbackFunction,
        bytes extraData
    );
);

/// A decoded offchain lookup revert
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RedirectSignal {
    /// Contract that raised the lookup
    pub sender: Address,
    /// Gateway URL templates, in the order they should be tried
    pub urls: Vec<String>,
    /// Opaque request data for the gateway
    pub call_data: Bytes,
    /// Selector of the function to call with the gateway response
    pub callback: FixedBytes<4>,
    /// Opaque data passed back to the callback untouched
    pub extra_data: Bytes,
}

impl RedirectSignal {
    /// Call data for the callback: `callback ++ abi.encode(response, extraData)`
    pub fn callback_call_data(&self, response: &Bytes) -> Bytes {
        let params = (response.clone(), self.extra_data.clone()).abi_encode_params();
        let mut data = Vec::with_capacity(4 + params.len());
        data.extend_from_slice(self.callback.as_slice());
        data.extend_from_slice(&params);
        data.into()
    }
}

impl From<OffchainLookup> for RedirectSignal {
    fn from(lookup: OffchainLookup) -> Self {
        Self {
            sender: lookup.sender,
            urls: lookup.urls,
            call_data: lookup.callData,
            callback: lookup.callbackFunction,
            extra_data: lookup.extraData,
        }
    }
}

impl From<RedirectSignal> for OffchainLookup {
    fn from(signal: RedirectSignal) -> Self {
        Self {
            sender: signal.sender,
            urls: signal.urls,
            callData: signal.call_data,
            callbackFunction: signal.callback,
            extraData: signal.extra_data,
        }
    }
}
