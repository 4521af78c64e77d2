use std::sync::Arc;

use chatlog_service::MessageService;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<MessageService>,
}
impl AppState {
	pub fn new(config: chatlog_config::Config) -> color_eyre::Result<Self> {
		let service = MessageService::new(config)?;

		Ok(Self::from_service(service))
	}

	pub fn from_service(service: MessageService) -> Self {
		Self { service: Arc::new(service) }
	}
}
