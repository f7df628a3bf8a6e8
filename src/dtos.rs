use serde::{Deserialize, Serialize};

use crate::domain::CheckoutSession;

pub trait Response{}

/// Outcome of a checkout creation that reached the provider.
#[derive(Debug, Clone, PartialEq)]
pub enum CreateCheckoutResponse {
    Created(CheckoutSession),
    /// Provider refused the request; status and body go back to the caller as is.
    Relayed {
        status: u16,
        content_type: Option<String>,
        body: String,
    },
}
impl Response for CreateCheckoutResponse{}

#[derive(Serialize, Deserialize)]
pub struct ApiError {
    pub error: String
}

#[derive(Serialize, Deserialize)]
pub struct InternalApiError {
    pub error: String,
    pub details: String,
}
