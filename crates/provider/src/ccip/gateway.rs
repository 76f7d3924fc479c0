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

//! Fetching offchain data from lookup gateways.

use std::time::Duration;

use alloy_primitives::Bytes;
use anyhow::Context;
use detour_types::{GatewayRequest, GatewayResponse};
use metrics::Counter;
use metrics_derive::Metrics;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{GatewayClient, ResolutionError};

const SENDER_PLACEHOLDER: &str = "{sender}";
const DATA_PLACEHOLDER: &str = "{data}";

#[derive(Metrics)]
#[metrics(scope = "detour_gateway")]
struct GatewayMetrics {
    #[metric(describe = "the number of gateway fetch attempts.")]
    attempts: Counter,
    #[metric(describe = "the number of gateway fetches that returned data.")]
    successes: Counter,
    #[metric(describe = "the number of gateway fetches declined with a 4xx status.")]
    declined: Counter,
    #[metric(describe = "the number of gateway fetches that failed for any other reason.")]
    failures: Counter,
}

/// Substitute `{sender}` and `{data}` in a gateway URL template
pub fn expand_url_template(template: &str, request: &GatewayRequest) -> String {
    template
        .replace(SENDER_PLACEHOLDER, &request.sender_hex())
        .replace(DATA_PLACEHOLDER, &request.data_hex())
}

/// Try each URL template in order and return the `data` of the first 2xx response.
///
/// Templates containing `{data}` are fetched with a GET, all others are sent
/// the request as a JSON POST body. Any failure moves on to the next template.
pub async fn fetch_offchain_data<G>(
    gateway: &G,
    urls: &[String],
    request: &GatewayRequest,
) -> Result<Bytes, ResolutionError>
where
    G: GatewayClient + ?Sized,
{
    let metrics = GatewayMetrics::default();

    for template in urls {
        let url = expand_url_template(template, request);
        let body = if template.contains(DATA_PLACEHOLDER) {
            None
        } else {
            Some(request.to_json())
        };

        metrics.attempts.increment(1);
        match gateway.fetch(&url, body).await {
            Ok(response) if response.is_success() => match response.data() {
                Some(data) => {
                    debug!(%url, "gateway returned offchain data");
                    metrics.successes.increment(1);
                    return Ok(data);
                }
                None => {
                    warn!(
                        %url,
                        status = response.status,
                        "gateway response has no valid data field"
                    );
                    metrics.failures.increment(1);
                }
            },
            Ok(response) if response.is_declined() => {
                warn!(
                    %url,
                    status = response.status,
                    gateway_message = response.message(),
                    "gateway declined offchain lookup"
                );
                metrics.declined.increment(1);
            }
            Ok(response) => {
                warn!(
                    %url,
                    status = response.status,
                    gateway_message = response.message(),
                    "gateway error"
                );
                metrics.failures.increment(1);
            }
            Err(error) => {
                warn!(%url, ?error, "gateway request failed");
                metrics.failures.increment(1);
            }
        }
    }

    Err(ResolutionError::AllGatewaysFailed {
        urls: urls.to_vec(),
        sender: request.sender,
        data: request.data.clone(),
    })
}

/// Settings for [`HttpGatewayClient`]
#[derive(Clone, Copy, Debug)]
pub struct HttpGatewaySettings {
    /// Total time allowed for a single gateway request
    pub request_timeout: Duration,
    /// Time allowed to establish a connection
    pub connect_timeout: Duration,
}

impl Default for HttpGatewaySettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(2),
        }
    }
}

/// Gateway client over HTTP(S) using `reqwest`
#[derive(Clone, Debug)]
pub struct HttpGatewayClient {
    client: reqwest::Client,
}

impl HttpGatewayClient {
    /// Create a new client
    pub fn new(settings: &HttpGatewaySettings) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .connect_timeout(settings.connect_timeout)
            .build()
            .context("failed to build reqwest client")?;
        Ok(Self { client })
    }

    /// Create a client on top of an existing `reqwest` client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl GatewayClient for HttpGatewayClient {
    async fn fetch(&self, url: &str, body: Option<Value>) -> anyhow::Result<GatewayResponse> {
        let request = match body {
            Some(body) => self.client.post(url).json(&body),
            None => self.client.get(url),
        };

        let response = request
            .send()
            .await
            .with_context(|| format!("request to gateway {url} failed"))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .with_context(|| format!("failed to read response from gateway {url}"))?;
        // non-JSON bodies still carry a meaningful status
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);

        Ok(GatewayResponse { status, body })
    }
}
