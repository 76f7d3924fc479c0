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

use std::time::Duration;

use alloy_provider::{Provider as AlloyProvider, ProviderBuilder};
use alloy_rpc_client::ClientBuilder;
use alloy_transport::layers::RetryBackoffLayer;
use alloy_transport_http::Http;
use anyhow::Context;
use evm::AlloyEvmProvider;
use url::Url;

use crate::EvmProvider;

pub(crate) mod evm;

/// Create a new alloy evm provider from a given RPC URL
pub fn new_alloy_evm_provider(
    rpc_url: &str,
    provider_client_timeout_seconds: u64,
) -> anyhow::Result<impl EvmProvider + Clone> {
    let provider = new_alloy_provider(rpc_url, provider_client_timeout_seconds)?;
    Ok(AlloyEvmProvider::new(provider))
}

/// Create a new alloy provider from a given RPC URL
///
/// Requests that take longer than `provider_client_timeout_seconds` are
/// aborted client side. Rate-limited requests are retried with backoff.
pub fn new_alloy_provider(
    rpc_url: &str,
    provider_client_timeout_seconds: u64,
) -> anyhow::Result<impl AlloyProvider + Clone> {
    let url = Url::parse(rpc_url).context("invalid rpc url")?;
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(provider_client_timeout_seconds))
        .build()
        .context("failed to build reqwest client")?;
    // use a large number for CUPS
    let retry_layer = RetryBackoffLayer::new(10, 500, 1_000_000);
    let http = Http::with_client(http_client, url);
    let is_local = http.guess_local();
    let client = ClientBuilder::default()
        .layer(retry_layer)
        .transport(http, is_local);
    Ok(ProviderBuilder::new().connect_client(client))
}

#[cfg(test)]
mod tests {
    use std::{io::Read, thread};

    use alloy_primitives::{address, bytes, fixed_bytes, Address};
    use alloy_rpc_types_eth::{TransactionInput, TransactionRequest};
    use alloy_sol_types::SolError;
    use detour_types::{GatewayResponse, OffchainLookup, RedirectSignal};
    use serde_json::{json, Value};
    use tiny_http::{Header, Response, Server};

    use crate::{new_alloy_evm_provider, CcipProvider, EvmProvider, MockGatewayClient};

    const TARGET: Address = address!("00000000000000000000000000000000000000c0");

    /// Answers each JSON-RPC request with the next result or error, echoing its id
    fn serve(replies: Vec<Value>) -> (String, thread::JoinHandle<Vec<Value>>) {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = format!("http://{}", server.server_addr().to_ip().unwrap());
        let handle = thread::spawn(move || {
            let mut seen = vec![];
            for reply in replies {
                let mut request = server.recv().unwrap();
                let mut body = String::new();
                request.as_reader().read_to_string(&mut body).unwrap();
                let body: Value = serde_json::from_str(&body).unwrap();

                let mut response = json!({ "jsonrpc": "2.0", "id": body["id"].clone() });
                if reply.get("code").is_some() {
                    response["error"] = reply;
                } else {
                    response["result"] = reply;
                }
                seen.push(body);

                let header = Header::from_bytes("Content-Type", "application/json").unwrap();
                let _ = request
                    .respond(Response::from_string(response.to_string()).with_header(header));
            }
            seen
        });
        (addr, handle)
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_alloy_provider_requests() {
        let (addr, handle) = serve(vec![json!("0x1"), json!("0x3e8")]);
        let provider = new_alloy_evm_provider(&addr, 5).unwrap();

        assert_eq!(provider.get_chain_id().await.unwrap(), 1);
        assert_eq!(provider.get_block_number().await.unwrap(), 1000);

        let seen = handle.join().unwrap();
        assert_eq!(seen[0]["method"], "eth_chainId");
        assert_eq!(seen[1]["method"], "eth_blockNumber");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_lookup_over_json_rpc() {
        let lookup = OffchainLookup::from(RedirectSignal {
            sender: TARGET,
            urls: vec!["https://gw.example/{sender}/{data}.json".to_string()],
            call_data: bytes!("dead"),
            callback: fixed_bytes!("abcd1234"),
            extra_data: bytes!("beef"),
        });
        let revert = json!({
            "code": 3,
            "message": "execution reverted",
            "data": const_hex::encode_prefixed(lookup.abi_encode()),
        });
        let (addr, handle) = serve(vec![revert, json!("0x0102")]);

        let mut gateway = MockGatewayClient::new();
        gateway.expect_fetch().times(1).returning(|_, _| {
            Ok(GatewayResponse {
                status: 200,
                body: json!({ "data": "0x1111" }),
            })
        });
        let provider = CcipProvider::new(new_alloy_evm_provider(&addr, 5).unwrap(), gateway);

        let tx = TransactionRequest::default()
            .to(TARGET)
            .input(TransactionInput::new(bytes!("12345678")));
        assert_eq!(provider.call(&tx, None).await.unwrap(), bytes!("0102"));

        let seen = handle.join().unwrap();
        assert_eq!(seen[0]["method"], "eth_call");
        assert_eq!(seen[1]["method"], "eth_call");
        let callback = RedirectSignal::from(lookup).callback_call_data(&bytes!("1111"));
        let sent = &seen[1]["params"][0];
        let sent_data = sent
            .get("input")
            .or_else(|| sent.get("data"))
            .and_then(Value::as_str)
            .unwrap();
        assert_eq!(sent_data, const_hex::encode_prefixed(&callback));
    }
}
