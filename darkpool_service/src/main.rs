use axum::middleware;
use axum::routing::get;
use axum::Router;
use darkpool_chain::{DepositListener, MockDepositSource, MockTransactionSubmitter, RpcDepositSource, RpcSubmitter};
use darkpool_core::action_handler::ActionHandler;
use darkpool_core::chain::{DepositEventSource, TransactionSubmitter};
use darkpool_core::handler::MessageHandler;
use darkpool_core::queues::{ActionQueue, MessageQueue};
use darkpool_service::{auth, routes, AppState, Config};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "darkpool_service=info".into()))
        .init();

    let config = Config::from_env()?;
    tracing::info!(bind_addr = %config.bind_addr, contract = %config.orderbook_contract_id, "starting darkpool service");

    let mut action_queue = ActionQueue::new();
    let action_queue_handle = action_queue.handle();

    let mut message_queue = MessageQueue::new();
    let message_queue_handle = message_queue.handle();

    let handler = Arc::new(Mutex::new(MessageHandler::new(action_queue_handle)));

    let (deposit_source, submitter): (Arc<dyn DepositEventSource>, Arc<dyn TransactionSubmitter>) = if config.admin_secret_key.is_some() {
        (
            Arc::new(RpcDepositSource::new(config.soroban_rpc_url.clone(), config.orderbook_contract_id.clone())),
            Arc::new(RpcSubmitter::new(config.soroban_rpc_url.clone(), config.orderbook_contract_id.clone())),
        )
    } else {
        tracing::warn!("ADMIN_SECRET_KEY not set, running with mock chain adapters");
        (Arc::new(MockDepositSource::new(Vec::new())), Arc::new(MockTransactionSubmitter::default()))
    };

    tokio::spawn(run_message_loop(handler.clone(), message_queue));
    tokio::spawn(run_action_loop(action_queue, submitter, config.action_submit_timeout));
    tokio::spawn(run_deposit_listener(
        deposit_source,
        handler.clone(),
        message_queue_handle.clone(),
        config.deposit_poll_interval,
        config.starting_ledger.unwrap_or(0),
    ));

    let state = AppState {
        handler,
        messages: message_queue_handle,
        signature_validity: config.signature_validity,
    };

    let orders_router = routes::order_routes().layer(middleware::from_fn_with_state(state.clone(), auth::require_signature));
    let withdrawals_router = routes::withdrawal_routes().layer(middleware::from_fn_with_state(state.clone(), auth::require_signature));

    let app = Router::new()
        .merge(routes::health_routes())
        .nest("/orders", orders_router)
        .nest("/withdrawals", withdrawals_router)
        .nest("/messages", routes::status_routes())
        .route("/", get(|| async { "darkpool" }))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("listening on {}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn run_message_loop(handler: Arc<Mutex<MessageHandler>>, mut queue: MessageQueue) {
    loop {
        if let Some(message) = queue.recv_timeout(std::time::Duration::from_secs(1)).await {
            let mut handler = handler.lock().await;
            handler.intake(message.clone());
            handler.handle(message, unix_now());
        }
    }
}

async fn run_action_loop<S: TransactionSubmitter + ?Sized>(mut queue: ActionQueue, submitter: Arc<S>, submit_timeout: std::time::Duration) {
    let mut action_handler = ActionHandler::new(submitter, 0, submit_timeout);
    loop {
        if let Some(action) = queue.recv_timeout(std::time::Duration::from_secs(1)).await {
            let result = action_handler.submit(action, unix_now()).await;
            if result.tx_hash.is_none() {
                tracing::warn!(action_id = %result.id, reason = ?result.failure_reason, "action submission failed");
            }
        }
    }
}

async fn run_deposit_listener<S: DepositEventSource + ?Sized + 'static>(
    source: Arc<S>,
    handler: Arc<Mutex<MessageHandler>>,
    messages: darkpool_core::queues::QueueHandle<darkpool_core::message::Message>,
    poll_interval: std::time::Duration,
    starting_cursor: i64,
) {
    let (_shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let listener = DepositListener::new(source, handler, messages, poll_interval, starting_cursor);
    listener.run(shutdown_rx).await;
}

fn unix_now() -> i64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs() as i64).unwrap_or(0)
}
