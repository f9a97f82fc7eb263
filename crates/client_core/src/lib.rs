use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use shared::{
    domain::{Cart, ProductId},
    error::ApiErrorBody,
    protocol::{GetCartResponse, RemoveCartLineRequest, CARTS_PATH},
};
use tracing::{debug, warn};
use url::Url;

pub mod cart_view;
pub mod error;
pub mod notifier;
pub mod pricing;
pub mod routes;

pub use cart_view::{render, CartRow, CartSnapshot, CartView, CartViewModel, RemoveOutcome};
pub use error::{error_text, CartApiError};
pub use notifier::{Notice, NoticeLevel, Notifier, RecordingNotifier};
pub use routes::Route;

/// Remote cart endpoints consumed by [`CartView`].
#[async_trait]
pub trait CartApi: Send + Sync {
    /// `GET /carts`. `Ok(None)` when the server has no cart for the shopper.
    async fn fetch_cart(&self) -> Result<Option<Cart>, CartApiError>;
    /// `DELETE /carts` with the product id in the body.
    async fn remove_line(&self, product_id: &ProductId) -> Result<(), CartApiError>;
}

#[derive(Debug, Clone)]
pub struct HttpCartApiConfig {
    pub base_url: Url,
    pub auth_token: Option<String>,
    pub request_timeout: Option<Duration>,
}

impl HttpCartApiConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            auth_token: None,
            request_timeout: None,
        }
    }
}

pub struct HttpCartApi {
    http: Client,
    carts_url: Url,
    auth_token: Option<String>,
}

impl HttpCartApi {
    pub fn new(config: HttpCartApiConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("failed to build cart http client")?;
        Self::with_client(http, config).context("failed to resolve carts endpoint")
    }

    pub fn with_client(http: Client, config: HttpCartApiConfig) -> Result<Self, CartApiError> {
        Ok(Self {
            http,
            carts_url: carts_url(&config.base_url)?,
            auth_token: config
                .auth_token
                .filter(|token| !token.trim().is_empty()),
        })
    }

    pub fn carts_url(&self) -> &Url {
        &self.carts_url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn transport_error(&self, source: reqwest::Error) -> CartApiError {
        CartApiError::Transport {
            url: self.carts_url.to_string(),
            source,
        }
    }
}

#[async_trait]
impl CartApi for HttpCartApi {
    async fn fetch_cart(&self) -> Result<Option<Cart>, CartApiError> {
        debug!(url = %self.carts_url, "GET cart");
        let response = self
            .authorize(self.http.get(self.carts_url.clone()))
            .send()
            .await
            .map_err(|err| self.transport_error(err))?;
        let response = check_status(&self.carts_url, response).await?;
        let body = response
            .bytes()
            .await
            .map_err(|err| self.transport_error(err))?;
        let parsed: GetCartResponse =
            serde_json::from_slice(&body).map_err(|err| CartApiError::Decode {
                url: self.carts_url.to_string(),
                reason: err.to_string(),
            })?;

        if let Some(cart) = &parsed.cart {
            cart.validate()?;
        }
        Ok(parsed.cart)
    }

    async fn remove_line(&self, product_id: &ProductId) -> Result<(), CartApiError> {
        debug!(url = %self.carts_url, product_id = %product_id, "DELETE cart line");
        let response = self
            .authorize(self.http.delete(self.carts_url.clone()))
            .json(&RemoveCartLineRequest {
                product: product_id.clone(),
            })
            .send()
            .await
            .map_err(|err| self.transport_error(err))?;
        check_status(&self.carts_url, response).await?;
        Ok(())
    }
}

/// Joins `carts` onto `base`, keeping any path prefix (`/api` -> `/api/carts`).
fn carts_url(base: &Url) -> Result<Url, url::ParseError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(CARTS_PATH)
}

async fn check_status(url: &Url, response: Response) -> Result<Response, CartApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = match response.text().await {
        Ok(body) => body,
        Err(err) => {
            warn!(url = %url, %status, "failed to read error body: {err}");
            String::new()
        }
    };
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .ok()
        .and_then(ApiErrorBody::into_message);

    Err(CartApiError::Status {
        url: url.to_string(),
        status,
        message,
    })
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
