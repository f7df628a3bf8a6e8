use std::sync::Arc;

use crate::cqrs::CreateCheckoutCommandHandler;

#[derive(Clone)]
pub struct AppState {
    pub create_checkout_command_handler: Arc<CreateCheckoutCommandHandler>,
}
