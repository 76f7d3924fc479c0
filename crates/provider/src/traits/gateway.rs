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

//! Transport used to reach offchain gateways.

use detour_types::GatewayResponse;
#[cfg(feature = "test-utils")]
use mockall::automock;
use serde_json::Value;

/// Fetches a gateway URL, as a GET when `body` is `None` and a JSON POST otherwise.
///
/// Transport failures are errors. Any HTTP status, including 4xx and 5xx, is
/// a response.
#[cfg_attr(feature = "test-utils", automock)]
#[async_trait::async_trait]
pub trait GatewayClient: Send + Sync {
    /// Fetch `url`
    async fn fetch(&self, url: &str, body: Option<Value>) -> anyhow::Result<GatewayResponse>;
}
