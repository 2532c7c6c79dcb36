use darkpool_core::handler::MessageHandler;
use darkpool_core::message::Message;
use darkpool_core::queues::QueueHandle;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub handler: Arc<Mutex<MessageHandler>>,
    pub messages: QueueHandle<Message>,
    pub signature_validity: Duration,
}
