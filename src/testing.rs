use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use crate::{
    domain::{CheckoutSession, UpstreamCheckoutRequest},
    errors::CheckoutError,
    gateways::{CheckoutGateway, UpstreamResponse},
    repositories::CheckoutRepository,
};

/// Answers every call with the same response and remembers what it was sent.
pub struct StubCheckoutGateway {
    response: UpstreamResponse,
    requests: Mutex<Vec<UpstreamCheckoutRequest>>,
}

impl StubCheckoutGateway {
    pub fn new(response: UpstreamResponse) -> Self {
        StubCheckoutGateway {
            response: response,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }

    pub async fn requests(&self) -> Vec<UpstreamCheckoutRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl CheckoutGateway for StubCheckoutGateway {
    async fn create_checkout(&self, request: &UpstreamCheckoutRequest) -> Result<UpstreamResponse, CheckoutError> {
        self.requests.lock().await.push(request.clone());
        Ok(self.response.clone())
    }
}

pub struct RecordingCheckoutRepository {
    writes: Mutex<Vec<(String, Map<String, Value>)>>,
}

impl RecordingCheckoutRepository {
    pub fn new() -> Self {
        RecordingCheckoutRepository {
            writes: Mutex::new(Vec::new()),
        }
    }

    pub async fn writes(&self) -> Vec<(String, Map<String, Value>)> {
        self.writes.lock().await.clone()
    }
}

#[async_trait]
impl CheckoutRepository for RecordingCheckoutRepository {
    async fn save(&self, id: &str, session: &CheckoutSession) -> Result<(), CheckoutError> {
        self.writes.lock().await.push((id.to_string(), session.fields().clone()));
        Ok(())
    }
}

pub struct FailingCheckoutRepository;

#[async_trait]
impl CheckoutRepository for FailingCheckoutRepository {
    async fn save(&self, id: &str, _session: &CheckoutSession) -> Result<(), CheckoutError> {
        Err(CheckoutError::Store { id: id.to_string(), reason: String::from("store unavailable") })
    }
}
