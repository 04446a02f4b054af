//! OpenStack collectors.
//!
//! Authentication goes through Keystone v2.0. The resulting [`Session`]
//! carries the token and the service catalog used to locate the Glance and
//! Nova endpoints.

mod glance;
mod keystone;
mod nova;

pub use glance::{normalize_endpoint, GlanceClient};
pub use keystone::{KeystoneClient, KeystoneClientBuilder, Session};
pub use nova::{management_host, NovaClient, ServiceFilter};

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use crate::CollectError;

/// Header carrying the Keystone token.
const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// GET `url` with the session token and decode a JSON body.
async fn get_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    token: &str,
    query: &[(&str, &str)],
) -> Result<T, CollectError> {
    tracing::debug!(%url, "GET");
    let response = client
        .get(url)
        .header(AUTH_TOKEN_HEADER, token)
        .query(query)
        .send()
        .await?;

    check_status(response.status(), url)?;

    response
        .json()
        .await
        .map_err(|e| CollectError::Parse(e.to_string()))
}

fn check_status(status: StatusCode, url: &str) -> Result<(), CollectError> {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(CollectError::Auth(format!("{url} returned status {status}")));
    }
    if !status.is_success() {
        return Err(CollectError::Http(format!("{url} returned status {status}")));
    }
    Ok(())
}

/// Authenticate against `server`, which answers `POST /v2.0/tokens` with a
/// token for tenant `ten1` and the given service catalog.
#[cfg(test)]
async fn mock_session(
    server: &wiremock::MockServer,
    catalog: serde_json::Value,
) -> Result<Session, CollectError> {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, ResponseTemplate};

    Mock::given(method("POST"))
        .and(path("/v2.0/tokens"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access": {
                "token": {"id": "tok-123", "tenant": {"id": "ten1", "name": "admin"}},
                "serviceCatalog": catalog
            }
        })))
        .mount(server)
        .await;

    KeystoneClient::builder()
        .auth_url(format!("{}/v2.0", server.uri()))
        .credentials("admin", "secret")
        .tenant("admin")
        .build()?
        .authenticate()
        .await
}
