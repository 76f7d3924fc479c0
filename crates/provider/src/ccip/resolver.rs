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

//! The offchain lookup resolution loop.

use alloy_primitives::Bytes;
use detour_types::{CallContext, GatewayRequest, ResolutionResult};
use metrics::Counter;
use metrics_derive::Metrics;
use tracing::debug;

use super::{
    decoder::{decode_call_outcome, CallOutcome},
    gateway::fetch_offchain_data,
};
use crate::{EvmProvider, GatewayClient, ProviderError, ProviderResult, ResolutionError};

/// Default bound on chain calls made while resolving one call
pub const DEFAULT_MAX_HOPS: usize = 4;

/// Extracts revert bytes from a failed call
pub type RevertExtractor = fn(&ProviderError) -> Option<Bytes>;

/// Settings for offchain lookup resolution
#[derive(Clone, Copy, Debug)]
pub struct ResolverSettings {
    /// Maximum number of chain calls per resolution
    pub max_hops: usize,
    /// When false, calls are forwarded without handling lookups
    pub enabled: bool,
    /// How revert bytes are pulled out of the chain client's errors
    pub revert_extractor: RevertExtractor,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            max_hops: DEFAULT_MAX_HOPS,
            enabled: true,
            revert_extractor: ProviderError::revert_data,
        }
    }
}

#[derive(Metrics)]
#[metrics(scope = "detour_resolver")]
struct ResolverMetrics {
    #[metric(describe = "the number of offchain lookups followed.")]
    redirects: Counter,
    #[metric(describe = "the number of resolutions that hit the hop bound.")]
    too_many_redirects: Counter,
}

/// Resolve `call`, following offchain lookups until a call returns a plain result.
///
/// Each hop calls the chain, and on a lookup raised by the call target
/// fetches from the lookup's gateways and re-calls the target's callback.
/// A revert that is not a lookup is returned as the original error. At most
/// `settings.max_hops` chain calls are made.
pub async fn resolve_call<P, G>(
    provider: &P,
    gateway: &G,
    settings: &ResolverSettings,
    mut call: CallContext,
) -> ProviderResult<ResolutionResult>
where
    P: EvmProvider + ?Sized,
    G: GatewayClient + ?Sized,
{
    let metrics = ResolverMetrics::default();

    for hop in 0..settings.max_hops {
        let (data, reverted) = match provider.call(&call.tx, call.block).await {
            Ok(data) => (data, None),
            Err(error) => match (settings.revert_extractor)(&error) {
                Some(data) => (data, Some(error)),
                None => return Err(ResolutionError::Unknown(Box::new(error)).into()),
            },
        };

        let signal = match (decode_call_outcome(call.target(), data)?, reverted) {
            (CallOutcome::Redirect(signal), _) => signal,
            (CallOutcome::Result(_), Some(error)) => return Err(error),
            (CallOutcome::Result(result), None) => return Ok(ResolutionResult { call, result }),
        };

        debug!(
            hop,
            sender = %signal.sender,
            urls = signal.urls.len(),
            "following offchain lookup"
        );

        let request = GatewayRequest {
            sender: signal.sender,
            data: signal.call_data.clone(),
        };
        let response = fetch_offchain_data(gateway, &signal.urls, &request).await?;

        call = call.with_call_data(signal.callback_call_data(&response));
        metrics.redirects.increment(1);
    }

    metrics.too_many_redirects.increment(1);
    Err(ResolutionError::TooManyRedirects {
        target: call.target(),
    }
    .into())
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use alloy_eips::BlockId;
    use alloy_primitives::{address, bytes, fixed_bytes, Address};
    use alloy_rpc_types_eth::{TransactionInput, TransactionRequest};
    use alloy_sol_types::SolError;
    use detour_types::{GatewayResponse, OffchainLookup, RedirectSignal};
    use mockall::Sequence;
    use serde_json::json;

    use super::*;
    use crate::{MockEvmProvider, MockGatewayClient};

    const TARGET: Address = address!("00000000000000000000000000000000000000c0");

    fn call_to_target() -> CallContext {
        CallContext::new(
            TransactionRequest::default()
                .to(TARGET)
                .input(TransactionInput::new(bytes!("12345678"))),
            Some(BlockId::latest()),
        )
    }

    fn lookup(sender: Address) -> RedirectSignal {
        RedirectSignal {
            sender,
            urls: vec!["http://gw/{sender}/{data}.json".to_string()],
            call_data: bytes!("dead"),
            callback: fixed_bytes!("abcd1234"),
            extra_data: bytes!("beef"),
        }
    }

    fn revert(signal: RedirectSignal) -> ProviderError {
        ProviderError::Revert(OffchainLookup::from(signal).abi_encode().into())
    }

    fn gateway_ok(data: &'static str) -> MockGatewayClient {
        let mut gateway = MockGatewayClient::new();
        gateway.expect_fetch().returning(move |_, _| {
            Ok(GatewayResponse {
                status: 200,
                body: json!({ "data": data }),
            })
        });
        gateway
    }

    #[tokio::test]
    async fn test_plain_result_single_call() {
        let mut provider = MockEvmProvider::new();
        provider
            .expect_call()
            .times(1)
            .returning(|_, _| {
                Ok(bytes!(
                    "0000000000000000000000000000000000000000000000000000000000000007"
                ))
            });
        let gateway = MockGatewayClient::new();

        let res = resolve_call(
            &provider,
            &gateway,
            &ResolverSettings::default(),
            call_to_target(),
        )
        .await
        .unwrap();

        assert_eq!(
            res.result,
            bytes!("0000000000000000000000000000000000000000000000000000000000000007")
        );
        assert_eq!(res.call, call_to_target());
    }

    #[tokio::test]
    async fn test_single_hop() {
        let mut provider = MockEvmProvider::new();
        let mut seq = Sequence::new();
        provider
            .expect_call()
            .withf(|tx, block| {
                tx.input.input() == Some(&bytes!("12345678")) && *block == Some(BlockId::latest())
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(revert(lookup(TARGET))));

        let expected_callback = lookup(TARGET).callback_call_data(&bytes!("1111"));
        let expected = expected_callback.clone();
        provider
            .expect_call()
            .withf(move |tx, _| tx.input.input() == Some(&expected))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(bytes!("42")));

        let mut gateway = MockGatewayClient::new();
        gateway
            .expect_fetch()
            .withf(|url, body| {
                url.to_string()
                    == "http://gw/0x00000000000000000000000000000000000000c0/0xdead.json"
                    && body.is_none()
            })
            .times(1)
            .returning(|_, _| {
                Ok(GatewayResponse {
                    status: 200,
                    body: json!({ "data": "0x1111" }),
                })
            });

        let res = resolve_call(
            &provider,
            &gateway,
            &ResolverSettings::default(),
            call_to_target(),
        )
        .await
        .unwrap();

        assert_eq!(res.result, bytes!("42"));
        assert_eq!(res.call.call_data(), expected_callback);
        assert_eq!(res.call.target(), Some(TARGET));
        assert_eq!(res.call.block, Some(BlockId::latest()));
    }

    #[tokio::test]
    async fn test_redirect_chain_within_bound() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut provider = MockEvmProvider::new();
        provider.expect_call().returning(move |_, _| {
            // three lookups, then a result on the fourth call
            if counter.fetch_add(1, Ordering::SeqCst) < 3 {
                Err(revert(lookup(TARGET)))
            } else {
                Ok(bytes!("99"))
            }
        });

        let res = resolve_call(
            &provider,
            &gateway_ok("0x1111"),
            &ResolverSettings::default(),
            call_to_target(),
        )
        .await
        .unwrap();

        assert_eq!(res.result, bytes!("99"));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_too_many_redirects() {
        let mut provider = MockEvmProvider::new();
        provider
            .expect_call()
            .times(DEFAULT_MAX_HOPS)
            .returning(|_, _| Err(revert(lookup(TARGET))));

        let err = resolve_call(
            &provider,
            &gateway_ok("0x1111"),
            &ResolverSettings::default(),
            call_to_target(),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            ProviderError::Resolution(ResolutionError::TooManyRedirects {
                target: Some(TARGET)
            })
        ));
    }

    #[tokio::test]
    async fn test_custom_hop_bound() {
        let mut provider = MockEvmProvider::new();
        provider
            .expect_call()
            .times(1)
            .returning(|_, _| Err(revert(lookup(TARGET))));
        let settings = ResolverSettings {
            max_hops: 1,
            ..Default::default()
        };

        let err = resolve_call(&provider, &gateway_ok("0x1111"), &settings, call_to_target())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProviderError::Resolution(ResolutionError::TooManyRedirects { .. })
        ));
    }

    #[tokio::test]
    async fn test_nested_scope_violation_skips_gateway() {
        let other = address!("00000000000000000000000000000000000000d0");
        let mut provider = MockEvmProvider::new();
        provider
            .expect_call()
            .times(1)
            .returning(move |_, _| Err(revert(lookup(other))));
        // no expectations: any fetch panics
        let gateway = MockGatewayClient::new();

        let err = resolve_call(
            &provider,
            &gateway,
            &ResolverSettings::default(),
            call_to_target(),
        )
        .await
        .unwrap_err();

        match err {
            ProviderError::Resolution(ResolutionError::NestedScopeViolation { target, signal }) => {
                assert_eq!(target, Some(TARGET));
                assert_eq!(signal, lookup(other));
            }
            e => panic!("unexpected error {e:?}"),
        }
    }

    #[tokio::test]
    async fn test_all_gateways_failed_stops_resolution() {
        let mut provider = MockEvmProvider::new();
        provider
            .expect_call()
            .times(1)
            .returning(|_, _| Err(revert(lookup(TARGET))));
        let mut gateway = MockGatewayClient::new();
        gateway.expect_fetch().times(1).returning(|_, _| {
            Ok(GatewayResponse {
                status: 500,
                body: json!({ "message": "internal" }),
            })
        });

        let err = resolve_call(
            &provider,
            &gateway,
            &ResolverSettings::default(),
            call_to_target(),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            ProviderError::Resolution(ResolutionError::AllGatewaysFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_unknown_error() {
        let mut provider = MockEvmProvider::new();
        provider
            .expect_call()
            .times(1)
            .returning(|_, _| Err(anyhow::anyhow!("connection reset").into()));

        let err = resolve_call(
            &provider,
            &MockGatewayClient::new(),
            &ResolverSettings::default(),
            call_to_target(),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            ProviderError::Resolution(ResolutionError::Unknown(_))
        ));
    }

    #[tokio::test]
    async fn test_plain_revert_is_returned_unchanged() {
        let mut provider = MockEvmProvider::new();
        provider
            .expect_call()
            .times(1)
            .returning(|_, _| Err(ProviderError::Revert(bytes!("08c379a0"))));

        let err = resolve_call(
            &provider,
            &MockGatewayClient::new(),
            &ResolverSettings::default(),
            call_to_target(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ProviderError::Revert(data) if data == bytes!("08c379a0")));
    }

    #[tokio::test]
    async fn test_custom_revert_extractor() {
        fn never(_: &ProviderError) -> Option<Bytes> {
            None
        }

        let mut provider = MockEvmProvider::new();
        provider
            .expect_call()
            .times(1)
            .returning(|_, _| Err(revert(lookup(TARGET))));
        let settings = ResolverSettings {
            revert_extractor: never,
            ..Default::default()
        };

        let err = resolve_call(
            &provider,
            &MockGatewayClient::new(),
            &settings,
            call_to_target(),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            ProviderError::Resolution(ResolutionError::Unknown(_))
        ));
    }
}
