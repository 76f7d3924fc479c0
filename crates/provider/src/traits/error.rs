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

use alloy_json_rpc::RpcError;
use alloy_primitives::{Address, Bytes};
use alloy_transport::TransportError;
use detour_types::RedirectSignal;
use serde_json::Value;

/// Result of a provider method call
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Error enumeration for the Provider trait
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// RPC Error
    #[error(transparent)]
    RPC(TransportError),
    /// A call reverted with the given data
    #[error("call reverted: {0}")]
    Revert(Bytes),
    /// Offchain lookup resolution failed
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    /// Internal errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<TransportError> for ProviderError {
    fn from(err: TransportError) -> Self {
        ProviderError::RPC(err)
    }
}

impl ProviderError {
    /// Revert data carried by this error, if it is a revert.
    ///
    /// Besides the node's standard revert shape, this accepts error payloads
    /// whose `data` wraps the revert bytes in a nested object, as some node
    /// implementations and proxies return regardless of the error message.
    pub fn revert_data(&self) -> Option<Bytes> {
        match self {
            ProviderError::Revert(data) => Some(data.clone()),
            ProviderError::RPC(RpcError::ErrorResp(payload)) => {
                payload.as_revert_data().or_else(|| {
                    payload
                        .try_data_as::<Value>()
                        .and_then(Result::ok)
                        .as_ref()
                        .and_then(nested_revert_data)
                })
            }
            _ => None,
        }
    }
}

fn nested_revert_data(value: &Value) -> Option<Bytes> {
    match value {
        Value::String(data) => const_hex::decode(data).ok().map(Bytes::from),
        Value::Object(map) => map
            .get("data")
            .and_then(nested_revert_data)
            .or_else(|| map.get("originalError").and_then(nested_revert_data)),
        _ => None,
    }
}

/// Fatal offchain lookup failures. None of these are retried.
#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    /// The call failed without revert data that could be interpreted
    #[error("unknown call error: {0}")]
    Unknown(Box<ProviderError>),
    /// A lookup was raised by a contract other than the call target
    #[error(
        "offchain lookup sender {} does not match call target {target:?} (urls: {:?})",
        signal.sender,
        signal.urls
    )]
    NestedScopeViolation {
        /// Target of the call that reverted
        target: Option<Address>,
        /// The decoded lookup
        signal: RedirectSignal,
    },
    /// Revert carried the lookup selector but did not decode
    #[error("malformed offchain lookup: {0}")]
    MalformedRedirect(String),
    /// No gateway returned a successful response
    #[error("all gateways failed for sender {sender} (urls: {urls:?}, data: {data})")]
    AllGatewaysFailed {
        /// URL templates that were tried
        urls: Vec<String>,
        /// Sender of the lookup
        sender: Address,
        /// Request data of the lookup
        data: Bytes,
    },
    /// Redirect hop bound reached
    #[error("too many offchain lookup redirects for target {target:?}")]
    TooManyRedirects {
        /// Target of the call
        target: Option<Address>,
    },
    /// Operation is unavailable on this adapter
    #[error("operation not supported: {0}")]
    NotSupported(&'static str),
}

#[cfg(test)]
mod tests {
    use alloy_json_rpc::ErrorPayload;
    use alloy_primitives::bytes;
    use serde_json::json;

    use super::*;

    fn error_resp(message: &str, data: Value) -> ProviderError {
        let payload: ErrorPayload = serde_json::from_value(json!({
            "code": 3,
            "message": message,
            "data": data,
        }))
        .unwrap();
        ProviderError::RPC(RpcError::ErrorResp(payload))
    }

    #[test]
    fn test_direct_revert() {
        let err = ProviderError::Revert(bytes!("01020304"));
        assert_eq!(err.revert_data(), Some(bytes!("01020304")));
    }

    #[test]
    fn test_standard_revert() {
        let err = error_resp("execution reverted", json!("0xdeadbeef"));
        assert_eq!(err.revert_data(), Some(bytes!("deadbeef")));
    }

    #[test]
    fn test_wrapped_revert() {
        let err = error_resp("call exception", json!({ "data": "0xdeadbeef" }));
        assert_eq!(err.revert_data(), Some(bytes!("deadbeef")));

        let err = error_resp(
            "call exception",
            json!({ "originalError": { "data": "0xcafe" } }),
        );
        assert_eq!(err.revert_data(), Some(bytes!("cafe")));
    }

    #[test]
    fn test_wrapped_revert_falls_back_to_original_error() {
        let err = error_resp(
            "call exception",
            json!({ "data": null, "originalError": { "data": "0xcafe" } }),
        );
        assert_eq!(err.revert_data(), Some(bytes!("cafe")));
    }

    #[test]
    fn test_no_revert() {
        let err = error_resp("header not found", Value::Null);
        assert_eq!(err.revert_data(), None);

        let err = ProviderError::Other(anyhow::anyhow!("connection refused"));
        assert_eq!(err.revert_data(), None);
    }
}
