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

//! Gateway request and response payloads.

use alloy_primitives::{Address, Bytes};
use serde_json::{json, Value};

/// Logical payload sent to a gateway
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatewayRequest {
    /// Contract that raised the lookup
    pub sender: Address,
    /// Request data from the lookup
    pub data: Bytes,
}

impl GatewayRequest {
    /// Lowercase `0x`-prefixed hex of the sender
    pub fn sender_hex(&self) -> String {
        const_hex::encode_prefixed(self.sender)
    }

    /// `0x`-prefixed hex of the request data
    pub fn data_hex(&self) -> String {
        const_hex::encode_prefixed(&self.data)
    }

    /// The JSON body used when a URL template carries no `{data}` placeholder
    pub fn to_json(&self) -> Value {
        json!({
            "sender": self.sender_hex(),
            "data": self.data_hex(),
        })
    }
}

/// A gateway's answer: HTTP status plus the decoded JSON body
#[derive(Clone, Debug, PartialEq)]
pub struct GatewayResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body, `Value::Null` if it was not JSON
    pub body: Value,
}

impl GatewayResponse {
    /// Status in `[200, 299]`
    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }

    /// Status in `[400, 499]`
    pub fn is_declined(&self) -> bool {
        (400..=499).contains(&self.status)
    }

    /// The hex `data` field of the body, if present and well formed
    pub fn data(&self) -> Option<Bytes> {
        let data = self.body.get("data")?.as_str()?;
        const_hex::decode(data).ok().map(Bytes::from)
    }

    /// The `message` field of the body, if present
    pub fn message(&self) -> Option<&str> {
        self.body.get("message")?.as_str()
    }
}
