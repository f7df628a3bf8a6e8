use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{event, Level};

use crate::{
    config::StoreFailurePolicy,
    domain::{parse_amount, Metadata, UpstreamCheckoutRequest},
    dtos::{CreateCheckoutResponse, Response},
    errors::CheckoutError,
    gateways::{CheckoutGateway, UpstreamResponse},
    repositories::CheckoutRepository,
};

// traits
pub trait Command{}

pub trait CommandHandler<C: Command, R: Response>{
    async fn handle(&self, input: &C) -> Result<R, CheckoutError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CreateCheckoutCommand {
    #[serde(default)]
    pub amount: Option<Value>,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}
impl Command for CreateCheckoutCommand{}

pub struct CreateCheckoutCommandHandler {
    gateway: Arc<dyn CheckoutGateway + Send + Sync>,
    repository: Arc<dyn CheckoutRepository + Send + Sync>,
    frontend_url: String,
    store_failure_policy: StoreFailurePolicy,
}

impl CreateCheckoutCommandHandler {
    pub fn new(
        gateway: Arc<dyn CheckoutGateway + Send + Sync>,
        repository: Arc<dyn CheckoutRepository + Send + Sync>,
        frontend_url: String,
        store_failure_policy: StoreFailurePolicy,
    ) -> Self {
        CreateCheckoutCommandHandler {
            gateway: gateway,
            repository: repository,
            frontend_url: frontend_url,
            store_failure_policy: store_failure_policy,
        }
    }
}

impl CommandHandler<CreateCheckoutCommand, CreateCheckoutResponse> for CreateCheckoutCommandHandler {
    async fn handle(&self, input: &CreateCheckoutCommand) -> Result<CreateCheckoutResponse, CheckoutError> {
        let amount = parse_amount(input.amount.as_ref())?;
        let metadata = input.metadata.clone().unwrap_or_default();
        let request = UpstreamCheckoutRequest::new(amount, metadata, &self.frontend_url);

        event!(Level::DEBUG, "creating checkout for amount {}", request.amount);

        match self.gateway.create_checkout(&request).await? {
            UpstreamResponse::Rejected { status, content_type, body } => {
                event!(Level::WARN, "checkout provider rejected request with status {}", status);
                Ok(CreateCheckoutResponse::Relayed {
                    status: status,
                    content_type: content_type,
                    body: body,
                })
            },
            UpstreamResponse::Created(session) => {
                let id = match session.id() {
                    Some(id) => id.to_string(),
                    None => return Err(CheckoutError::MalformedRecord(String::from("record has no string id"))),
                };

                if let Err(e) = self.repository.save(&id, &session).await {
                    match self.store_failure_policy {
                        StoreFailurePolicy::Escalate => {
                            event!(Level::ERROR, "checkout {} created upstream but not stored: {}", id, e);
                            return Err(e);
                        },
                        StoreFailurePolicy::LogOnly => {
                            event!(Level::WARN, "checkout {} created upstream but not stored: {}", id, e);
                        }
                    }
                }

                event!(Level::INFO, "checkout {} created", id);
                Ok(CreateCheckoutResponse::Created(session))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Map};

    use super::*;
    use crate::{
        domain::CheckoutSession,
        testing::{FailingCheckoutRepository, RecordingCheckoutRepository, StubCheckoutGateway},
    };

    const FRONTEND_URL: &str = "https://shop.example.com";

    fn command(value: Value) -> CreateCheckoutCommand {
        serde_json::from_value(value).unwrap()
    }

    fn created(value: Value) -> UpstreamResponse {
        UpstreamResponse::Created(serde_json::from_value::<CheckoutSession>(value).unwrap())
    }

    fn handler(
        gateway: Arc<StubCheckoutGateway>,
        repository: Arc<dyn CheckoutRepository + Send + Sync>,
        policy: StoreFailurePolicy,
    ) -> CreateCheckoutCommandHandler {
        CreateCheckoutCommandHandler::new(gateway, repository, String::from(FRONTEND_URL), policy)
    }

    #[tokio::test]
    async fn invalid_amount_never_reaches_provider() {
        let gateway = Arc::new(StubCheckoutGateway::new(created(json!({"id": "chk_1"}))));
        let repository = Arc::new(RecordingCheckoutRepository::new());
        let handler = handler(gateway.clone(), repository.clone(), StoreFailurePolicy::Escalate);

        for body in [json!({}), json!({"amount": null}), json!({"amount": "abc"}), json!({"amount": false})] {
            let result = handler.handle(&command(body)).await;
            assert!(matches!(result, Err(CheckoutError::Validation(_))));
        }

        assert_eq!(gateway.call_count().await, 0);
        assert!(repository.writes().await.is_empty());
    }

    #[tokio::test]
    async fn outbound_request_is_normalised() {
        let gateway = Arc::new(StubCheckoutGateway::new(created(json!({"id": "chk_1"}))));
        let handler = handler(gateway.clone(), Arc::new(RecordingCheckoutRepository::new()), StoreFailurePolicy::Escalate);

        for amount in [json!(1), json!(500), json!(999999)] {
            handler.handle(&command(json!({"amount": amount}))).await.unwrap();
        }

        let requests = gateway.requests().await;
        assert_eq!(requests.len(), 3);
        for request in requests {
            assert_eq!(request.currency, "ZAR");
            assert_eq!(request.success_url, "https://shop.example.com/success");
            assert_eq!(request.cancel_url, "https://shop.example.com/cancel");
            assert_eq!(request.failure_url, "https://shop.example.com/failure");
            assert!(request.metadata.is_empty());
        }
    }

    #[tokio::test]
    async fn metadata_is_forwarded_unchanged() {
        let gateway = Arc::new(StubCheckoutGateway::new(created(json!({"id": "chk_1"}))));
        let handler = handler(gateway.clone(), Arc::new(RecordingCheckoutRepository::new()), StoreFailurePolicy::Escalate);
        let metadata = json!({"orderId": "ord_9", "items": [1, 2, 3], "nested": {"gift": true}});

        handler.handle(&command(json!({"amount": 500, "metadata": metadata.clone()}))).await.unwrap();

        let requests = gateway.requests().await;
        assert_eq!(Value::Object(requests[0].metadata.clone()), metadata);
    }

    #[tokio::test]
    async fn rejection_is_relayed_without_store_write() {
        let gateway = Arc::new(StubCheckoutGateway::new(UpstreamResponse::Rejected {
            status: 402,
            content_type: None,
            body: String::from("insufficient funds"),
        }));
        let repository = Arc::new(RecordingCheckoutRepository::new());
        let handler = handler(gateway, repository.clone(), StoreFailurePolicy::Escalate);

        let response = handler.handle(&command(json!({"amount": 500}))).await.unwrap();

        assert_eq!(
            response,
            CreateCheckoutResponse::Relayed {
                status: 402,
                content_type: None,
                body: String::from("insufficient funds"),
            }
        );
        assert!(repository.writes().await.is_empty());
    }

    #[tokio::test]
    async fn created_session_is_stored_once_under_its_id() {
        let gateway = Arc::new(StubCheckoutGateway::new(created(json!({"id": "chk_123", "amount": 500}))));
        let repository = Arc::new(RecordingCheckoutRepository::new());
        let handler = handler(gateway, repository.clone(), StoreFailurePolicy::Escalate);

        let response = handler.handle(&command(json!({"amount": 500}))).await.unwrap();

        let mut expected = Map::new();
        expected.insert(String::from("id"), json!("chk_123"));
        expected.insert(String::from("amount"), json!(500));
        assert_eq!(response, CreateCheckoutResponse::Created(CheckoutSession::from(expected.clone())));

        let writes = repository.writes().await;
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].0, "chk_123");
        assert_eq!(writes[0].1, expected);
    }

    #[tokio::test]
    async fn record_without_id_is_an_internal_error() {
        let gateway = Arc::new(StubCheckoutGateway::new(created(json!({"amount": 500}))));
        let repository = Arc::new(RecordingCheckoutRepository::new());
        let handler = handler(gateway, repository.clone(), StoreFailurePolicy::Escalate);

        let result = handler.handle(&command(json!({"amount": 500}))).await;

        assert!(matches!(result, Err(CheckoutError::MalformedRecord(_))));
        assert!(repository.writes().await.is_empty());
    }

    #[tokio::test]
    async fn store_failure_escalates_by_default() {
        let gateway = Arc::new(StubCheckoutGateway::new(created(json!({"id": "chk_123"}))));
        let handler = handler(gateway, Arc::new(FailingCheckoutRepository), StoreFailurePolicy::Escalate);

        let result = handler.handle(&command(json!({"amount": 500}))).await;

        assert!(matches!(result, Err(CheckoutError::Store { .. })));
    }

    #[tokio::test]
    async fn store_failure_is_only_logged_when_configured() {
        let gateway = Arc::new(StubCheckoutGateway::new(created(json!({"id": "chk_123"}))));
        let handler = handler(gateway, Arc::new(FailingCheckoutRepository), StoreFailurePolicy::LogOnly);

        let response = handler.handle(&command(json!({"amount": 500}))).await.unwrap();

        assert!(matches!(response, CreateCheckoutResponse::Created(session) if session.id() == Some("chk_123")));
    }
}
