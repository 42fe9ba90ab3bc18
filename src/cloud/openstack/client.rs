// ABOUTME: Authenticated HTTP session against an OpenStack deployment.
// ABOUTME: Keystone v3 token issue, catalog lookup, and JSON request helpers.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, trace};

use super::models::{Auth, AuthRequest, CatalogEntry, Identity, Named, PasswordMethod, Project, Scope, TokenResponse, User};
use super::settings::OpenStackSettings;
use crate::cloud::CloudError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const TOKEN_HEADER: &str = "X-Auth-Token";
const SUBJECT_TOKEN_HEADER: &str = "X-Subject-Token";

/// Service endpoints resolved from the token's catalog.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub compute: String,
    pub network: String,
    pub image: String,
}

// TODO: re-authenticate when the token expires during a long wait.
#[derive(Debug, Clone)]
pub struct Session {
    http: Client,
    token: String,
    pub endpoints: Endpoints,
}

impl Session {
    /// Issue a project-scoped token with password credentials.
    pub async fn authenticate(settings: &OpenStackSettings) -> Result<Self, CloudError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CloudError::Transport(e.to_string()))?;

        let body = AuthRequest {
            auth: Auth {
                identity: Identity {
                    methods: ["password"],
                    password: PasswordMethod {
                        user: User {
                            name: &settings.username,
                            domain: Named {
                                name: &settings.user_domain_name,
                            },
                            password: &settings.password,
                        },
                    },
                },
                scope: Scope {
                    project: Project {
                        name: &settings.project_name,
                        domain: Named {
                            name: &settings.project_domain_name,
                        },
                    },
                },
            },
        };

        let url = format!("{}/auth/tokens", settings.identity_url());
        debug!(url = %url, user = %settings.username, "requesting keystone token");

        let response = http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let message = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), "keystone rejected credentials");
            return Err(CloudError::Auth(message));
        }
        let response = check_status(response, "token", &settings.username).await?;

        let token = response
            .headers()
            .get(SUBJECT_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                CloudError::InvalidResponse(format!("missing {SUBJECT_TOKEN_HEADER} header"))
            })?;

        let parsed: TokenResponse = decode(response).await?;
        let catalog = &parsed.token.catalog;
        let endpoints = Endpoints {
            compute: find_endpoint(catalog, "compute", settings)?,
            network: versioned(&find_endpoint(catalog, "network", settings)?, "v2.0"),
            image: versioned(&find_endpoint(catalog, "image", settings)?, "v2"),
        };
        debug!(?endpoints, "resolved service catalog");

        Ok(Self {
            http,
            token,
            endpoints,
        })
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        trace!(%method, url, "openstack request");
        self.http
            .request(method, url)
            .header(TOKEN_HEADER, &self.token)
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        kind: &'static str,
        name: &str,
    ) -> Result<T, CloudError> {
        let response = self
            .request(Method::GET, url)
            .send()
            .await
            .map_err(transport_error)?;
        decode(check_status(response, kind, name).await?).await
    }

    pub async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        body: &B,
        kind: &'static str,
        name: &str,
    ) -> Result<T, CloudError> {
        let response = self
            .request(method, url)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;
        decode(check_status(response, kind, name).await?).await
    }

    /// Send a body and discard whatever comes back.
    pub async fn send_unit<B: Serialize>(
        &self,
        method: Method,
        url: &str,
        body: &B,
        kind: &'static str,
        name: &str,
    ) -> Result<(), CloudError> {
        let response = self
            .request(method, url)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;
        check_status(response, kind, name).await?;
        Ok(())
    }

    pub async fn delete(&self, url: &str, kind: &'static str, name: &str) -> Result<(), CloudError> {
        let response = self
            .request(Method::DELETE, url)
            .send()
            .await
            .map_err(transport_error)?;
        check_status(response, kind, name).await?;
        Ok(())
    }
}

fn transport_error(e: reqwest::Error) -> CloudError {
    if e.is_timeout() {
        error!("openstack request timed out");
    }
    CloudError::Transport(e.to_string())
}

async fn check_status(
    response: Response,
    kind: &'static str,
    name: &str,
) -> Result<Response, CloudError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    debug!(status = status.as_u16(), body = %message, "openstack error response");

    Err(match status {
        StatusCode::NOT_FOUND => CloudError::not_found(kind, name),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => CloudError::Auth(message),
        StatusCode::CONFLICT => CloudError::Conflict(message),
        _ => CloudError::Api {
            status: status.as_u16(),
            message,
        },
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, CloudError> {
    let body = response.text().await.map_err(transport_error)?;
    serde_json::from_str(&body)
        .map_err(|e| CloudError::InvalidResponse(format!("JSON parse error: {e}")))
}

fn find_endpoint(
    catalog: &[CatalogEntry],
    service_type: &str,
    settings: &OpenStackSettings,
) -> Result<String, CloudError> {
    catalog
        .iter()
        .filter(|entry| entry.service_type == service_type)
        .flat_map(|entry| &entry.endpoints)
        .find(|endpoint| {
            endpoint.interface == settings.interface
                && settings.region_name.as_ref().is_none_or(|region| {
                    endpoint.region.as_ref() == Some(region)
                        || endpoint.region_id.as_ref() == Some(region)
                })
        })
        .map(|endpoint| endpoint.url.trim_end_matches('/').to_string())
        .ok_or_else(|| {
            CloudError::InvalidResponse(format!(
                "no {} endpoint for service '{service_type}' in catalog",
                settings.interface
            ))
        })
}

/// Append an API version segment unless the catalog URL already carries it.
fn versioned(url: &str, version: &str) -> String {
    if url.ends_with(&format!("/{version}")) {
        url.to_string()
    } else {
        format!("{url}/{version}")
    }
}
