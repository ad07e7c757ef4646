//! MCP Server Core
//!
//! Wires the dispatcher to its transports and runs them.

use {
    super::generator::MockeryInvoker,
    super::health::HealthChecker,
    super::logging::{log_server_ready, log_server_shutdown},
    super::protocol_impl::McpProtocolHandlerImpl,
    super::protocol_testable::McpProtocolHandler,
    super::settings::ServerSettings,
    super::shared::McpProtocolEngine,
    anyhow::{Context, Result},
    std::future::Future,
    std::net::SocketAddr,
    std::sync::Arc,
    tokio::net::TcpListener,
    tokio_stream::wrappers::TcpListenerStream,
    tracing::info,
    warp::Filter,
};

pub struct McpServer {
    protocol_engine: Arc<McpProtocolEngine>,
    health: HealthChecker,
}

impl McpServer {
    /// Create a server around any protocol handler.
    pub fn new(handler: Arc<dyn McpProtocolHandler>, max_message_size: usize) -> Self {
        Self {
            protocol_engine: Arc::new(McpProtocolEngine::with_max_message_size(
                handler,
                max_message_size,
            )),
            health: HealthChecker::default(),
        }
    }

    /// Create the mockery-backed server described by `settings`.
    pub fn from_settings(settings: &ServerSettings) -> Self {
        let invoker = MockeryInvoker::new(settings.mockery_command.clone())
            .with_timeout(settings.generation_timeout());
        let handler = McpProtocolHandlerImpl::with_generator(Arc::new(invoker));
        info!(
            mockery = %settings.mockery_command,
            timeout = ?settings.generation_timeout(),
            "Initializing MCP Server"
        );
        Self::new(Arc::new(handler), settings.max_message_size)
    }

    pub fn protocol_engine(&self) -> Arc<McpProtocolEngine> {
        self.protocol_engine.clone()
    }

    /// Serve WebSocket `/mcp` and `GET /health` on an already bound
    /// listener until `shutdown` resolves.
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener
            .local_addr()
            .context("listener has no local address")?;

        let ws_route = super::websocket::create_ws_handler(self.protocol_engine.clone());
        let routes = ws_route.or(self.health.clone().route());

        log_server_ready(&format!("ws://{addr}/mcp"));
        warp::serve(routes)
            .serve_incoming_with_graceful_shutdown(TcpListenerStream::new(listener), shutdown)
            .await;

        log_server_shutdown();
        Ok(())
    }

    /// Bind `addr` and serve until ctrl-c.
    pub async fn start(&self, addr: SocketAddr) -> Result<()> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Could not bind to {addr}"))?;

        self.serve(listener, async {
            if tokio::signal::ctrl_c().await.is_err() {
                // No signal handler; run until the process is killed.
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Serve line-delimited JSON on stdin/stdout until EOF.
    pub async fn run_stdio(&self) -> Result<()> {
        super::stdio::serve_stdio(&self.protocol_engine)
            .await
            .context("stdio transport failed")
    }
}
