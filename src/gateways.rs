use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client};
use tracing::{event, Level};

use crate::{
    domain::{CheckoutSession, UpstreamCheckoutRequest},
    errors::CheckoutError,
};

#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamResponse {
    Created(CheckoutSession),
    Rejected {
        status: u16,
        content_type: Option<String>,
        body: String,
    },
}

#[async_trait]
pub trait CheckoutGateway {
    async fn create_checkout(&self, request: &UpstreamCheckoutRequest) -> Result<UpstreamResponse, CheckoutError>;
}

/// Talks to the provider's checkout endpoint. The `reqwest::Client` is built
/// once and shared by every request.
#[derive(Clone)]
pub struct HttpCheckoutGateway {
    client: Client,
    endpoint: String,
    secret_key: String,
}

impl HttpCheckoutGateway {
    pub fn new(client: Client, endpoint: String, secret_key: String) -> Self {
        HttpCheckoutGateway {
            client: client,
            endpoint: endpoint,
            secret_key: secret_key,
        }
    }
}

#[async_trait]
impl CheckoutGateway for HttpCheckoutGateway {
    async fn create_checkout(&self, request: &UpstreamCheckoutRequest) -> Result<UpstreamResponse, CheckoutError> {
        let response = self.client
            .post(&self.endpoint)
            .bearer_auth(&self.secret_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let content_type = response.headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .map(String::from);
            let body = response.text().await?;

            event!(Level::DEBUG, "checkout provider answered {}: {}", status, body);

            return Ok(UpstreamResponse::Rejected {
                status: status.as_u16(),
                content_type: content_type,
                body: body,
            });
        }

        let session = response.json::<CheckoutSession>().await?;
        Ok(UpstreamResponse::Created(session))
    }
}
