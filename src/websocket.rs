//! MCP WebSocket Handler
//!
//! One task per connection; messages on a connection are answered in order.

use {
    super::logging::{
        connection_span, log_connection_closed, log_connection_upgrade, log_parse_error,
        log_response_error, log_response_sent, McpConnectionId,
    },
    super::shared::McpProtocolEngine,
    futures_util::{SinkExt, StreamExt},
    std::sync::Arc,
    std::time::Instant,
    tracing::{debug, warn, Instrument},
    warp::{ws::Message, ws::WebSocket, ws::Ws, Filter, Rejection, Reply},
};

/// Floor for the transport-level frame cap. The engine enforces the
/// configured message limit itself so oversized messages get a reply.
const TRANSPORT_MESSAGE_LIMIT: usize = 64 * 1024 * 1024;

fn transport_limit(max_message_size: usize) -> usize {
    max_message_size
        .saturating_mul(2)
        .max(TRANSPORT_MESSAGE_LIMIT)
}

/// WebSocket route at `/mcp`.
pub fn create_ws_handler(
    protocol_engine: Arc<McpProtocolEngine>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("mcp")
        .and(warp::ws())
        .and(warp::any().map(move || protocol_engine.clone()))
        .map(|ws: Ws, engine: Arc<McpProtocolEngine>| {
            let limit = transport_limit(engine.max_message_size());
            ws.max_message_size(limit)
                .max_frame_size(limit)
                .on_upgrade(move |websocket| handle_mcp_ws(websocket, engine))
        })
}

/// Handle MCP WebSocket connection
async fn handle_mcp_ws(websocket: WebSocket, protocol_engine: Arc<McpProtocolEngine>) {
    let connection_id = McpConnectionId::new();
    let span = connection_span(&connection_id);

    async move {
        let started = Instant::now();
        log_connection_upgrade(&connection_id);

        let (mut ws_sender, mut ws_receiver) = websocket.split();
        while let Some(msg_result) = ws_receiver.next().await {
            let msg = match msg_result {
                Ok(msg) => msg,
                Err(e) => {
                    warn!(error = %e, "WebSocket receive failed");
                    break;
                }
            };
            if msg.is_close() {
                break;
            }
            let Ok(text) = msg.to_str() else {
                debug!("Ignoring non-text message");
                continue;
            };

            match protocol_engine.handle_text(text).await {
                Ok(Some(response)) => {
                    let size = response.len();
                    if let Err(e) = ws_sender.send(Message::text(response)).await {
                        log_response_error(&e.to_string());
                        break;
                    }
                    log_response_sent(size);
                }
                Ok(None) => {}
                Err(e) => {
                    // A broken frame ends this connection only.
                    log_parse_error(&e.to_string(), text);
                    let reply = e.to_json_rpc_error(None).to_string();
                    if let Err(e) = ws_sender.send(Message::text(reply)).await {
                        log_response_error(&e.to_string());
                    }
                    let _ = ws_sender.send(Message::close()).await;
                    break;
                }
            }
        }

        log_connection_closed(&connection_id, started.elapsed());
    }
    .instrument(span)
    .await
}
