//! XenAPI JSON-RPC session client

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, instrument};
use url::Url;

use xeninv_core::{RecordMap, Snapshot};

use crate::error::{ClientError, Result};
use crate::object_class::ObjectClass;

/// Transport settings for the API endpoint.
///
/// Explicit per-connection configuration; process-global TLS state is never
/// touched.
#[derive(Debug, Clone, Copy)]
pub struct TransportConfig {
    /// Connect over HTTPS
    pub use_ssl: bool,
    /// Verify the TLS certificate when using HTTPS
    pub validate_certs: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            use_ssl: true,
            validate_certs: true,
        }
    }
}

impl TransportConfig {
    fn scheme(self) -> &'static str {
        if self.use_ssl { "https" } else { "http" }
    }
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: Value,
    id: u64,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcFailure>,
}

#[derive(Debug, Deserialize)]
struct RpcFailure {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

/// Authenticated session against a XenServer / Xen Orchestra API host
#[derive(Debug, Clone)]
pub struct XenSession {
    client: Client,
    endpoint: Url,
    session_id: String,
}

impl XenSession {
    /// Log in and return an authenticated session.
    ///
    /// # Errors
    /// Returns `ClientError::Connection` carrying the remote diagnostic when
    /// the endpoint is unreachable or the credentials are rejected.
    #[instrument(skip(password))]
    pub async fn connect(
        api_host: &str,
        user: &str,
        password: &str,
        transport: TransportConfig,
    ) -> Result<Self> {
        let endpoint = Url::parse(&format!("{}://{api_host}/jsonrpc", transport.scheme()))?;

        let mut builder = Client::builder();
        if transport.use_ssl && !transport.validate_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }
        let client = builder.build()?;

        let result = call(
            &client,
            &endpoint,
            "session.login_with_password",
            json!([user, password]),
        )
        .await
        .map_err(|e| ClientError::Connection(e.to_string()))?;

        let session_id = result
            .as_str()
            .ok_or_else(|| {
                ClientError::Connection("login returned no session reference".to_string())
            })?
            .to_string();

        debug!("session established");

        Ok(Self {
            client,
            endpoint,
            session_id,
        })
    }

    /// Fetch every record of one object class, keyed by object identifier.
    ///
    /// # Errors
    /// Returns `ClientError::Fetch` identifying the failed class; raw
    /// transport errors never escape this boundary.
    #[instrument(skip(self))]
    pub async fn get_all_records(&self, class: ObjectClass) -> Result<RecordMap> {
        let method = format!("{}.get_all_records", class.api_name());
        let result = call(&self.client, &self.endpoint, &method, json!([self.session_id]))
            .await
            .map_err(|e| ClientError::Fetch {
                class,
                detail: e.to_string(),
            })?;

        let records: RecordMap = serde_json::from_value(result).map_err(|e| ClientError::Fetch {
            class,
            detail: e.to_string(),
        })?;

        debug!(count = records.len(), "records fetched");

        Ok(records)
    }

    /// Best-effort session teardown; failures are logged, not surfaced.
    #[instrument(skip(self))]
    pub async fn logout(self) {
        let result = call(
            &self.client,
            &self.endpoint,
            "session.logout",
            json!([self.session_id]),
        )
        .await;

        if let Err(e) = result {
            debug!(error = %e, "logout failed");
        }
    }
}

/// Fetch the full pool/host/VM snapshot.
///
/// The three fetches are independent and run concurrently; all complete
/// before the snapshot is returned.
///
/// # Errors
/// Returns the first `ClientError::Fetch` encountered.
pub async fn fetch_snapshot(session: &XenSession) -> Result<Snapshot> {
    let (pools, hosts, vms) = tokio::try_join!(
        session.get_all_records(ObjectClass::Pool),
        session.get_all_records(ObjectClass::Host),
        session.get_all_records(ObjectClass::Vm),
    )?;

    Ok(Snapshot { pools, hosts, vms })
}

async fn call(client: &Client, endpoint: &Url, method: &str, params: Value) -> Result<Value> {
    let request = RpcRequest {
        jsonrpc: "2.0",
        method,
        params,
        id: 1,
    };

    let response = client.post(endpoint.clone()).json(&request).send().await?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();
        return Err(ClientError::Api { status, message });
    }

    let body: RpcResponse = response.json().await?;

    if let Some(failure) = body.error {
        let message = match failure.data {
            Some(data) => format!("{} ({data})", failure.message),
            None => failure.message,
        };
        return Err(ClientError::Rpc {
            code: failure.code,
            message,
        });
    }

    body.result.ok_or_else(|| ClientError::Rpc {
        code: 0,
        message: "response carried neither result nor error".to_string(),
    })
}
