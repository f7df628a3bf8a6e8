use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::errors::CheckoutError;

pub const CHECKOUT_CURRENCY: &str = "ZAR";
pub const SUCCESS_PATH: &str = "/success";
pub const CANCEL_PATH: &str = "/cancel";
pub const FAILURE_PATH: &str = "/failure";

pub type Metadata = Map<String, Value>;

/// Checkout record as returned by the payment provider. Only `id` is read;
/// everything else is carried through untouched and in its original order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckoutSession(Map<String, Value>);

impl CheckoutSession {
    pub fn id(&self) -> Option<&str> {
        self.0.get("id").and_then(Value::as_str)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for CheckoutSession {
    fn from(fields: Map<String, Value>) -> Self {
        CheckoutSession(fields)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamCheckoutRequest {
    pub amount: Number,
    pub currency: String,
    pub success_url: String,
    pub cancel_url: String,
    pub failure_url: String,
    pub metadata: Metadata,
}

impl UpstreamCheckoutRequest {
    pub fn new(amount: Number, metadata: Metadata, frontend_url: &str) -> Self {
        UpstreamCheckoutRequest {
            amount,
            currency: String::from(CHECKOUT_CURRENCY),
            success_url: format!("{}{}", frontend_url, SUCCESS_PATH),
            cancel_url: format!("{}{}", frontend_url, CANCEL_PATH),
            failure_url: format!("{}{}", frontend_url, FAILURE_PATH),
            metadata,
        }
    }
}

/// Accepts a JSON number, or a string holding one, and normalises it to a
/// JSON number for the provider.
pub fn parse_amount(amount: Option<&Value>) -> Result<Number, CheckoutError> {
    match amount {
        None | Some(Value::Null) => Err(CheckoutError::Validation(String::from(
            "Missing required field: amount",
        ))),
        Some(Value::Number(number)) => Ok(number.clone()),
        Some(Value::String(text)) => {
            let text = text.trim();
            if let Ok(integer) = text.parse::<i64>() {
                return Ok(Number::from(integer));
            }

            text.parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .ok_or_else(|| invalid_amount(text))
        }
        Some(other) => Err(invalid_amount(&other.to_string())),
    }
}

fn invalid_amount(raw: &str) -> CheckoutError {
    CheckoutError::Validation(format!("Invalid amount: {} is not a number", raw))
}
