//! The embeddable server facade.
//!
//! # Responsibilities
//! - Own the route registry while the server is configurable
//! - `start()`: freeze routes, bind, and serve on a dedicated thread
//! - `stop()`: signal shutdown, drain, join the thread
//!
//! # Design Decisions
//! - `start()` and `stop()` are synchronous; the server thread owns its
//!   own multi-threaded tokio runtime, so embedders need no runtime of their own
//! - The listener is bound on the caller's thread so bind errors surface
//!   from `start()` itself
//! - Dropping a running server stops it

use std::net::SocketAddr;
use std::thread::JoinHandle;
use std::time::Duration;

use axum::http::Method;

use crate::config::ServerConfig;
use crate::http::{HttpServer, Request, RequestContext, Response};
use crate::lifecycle::{LifecycleError, LifecycleState, Shutdown};
use crate::routing::{FilterResult, RegistrationError, RouteRegistry, RouteTable, Scope};

/// Handle on the serving thread.
#[derive(Debug)]
struct Running {
    shutdown: Shutdown,
    thread: JoinHandle<std::io::Result<()>>,
}

/// Route registration plus a start/stop lifecycle around the HTTP listener.
#[derive(Debug)]
pub struct WebServer {
    config: ServerConfig,
    registry: RouteRegistry,
    running: Option<Running>,
    local_addr: Option<SocketAddr>,
}

impl WebServer {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            registry: RouteRegistry::new(),
            running: None,
            local_addr: None,
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn state(&self) -> LifecycleState {
        self.registry.state()
    }

    /// Read access to the route table, in any state.
    pub fn routes(&self) -> &RouteTable {
        self.registry.table()
    }

    /// The bound address, once started.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Run `block` against the node for `prefix`, claiming that path.
    pub fn path<F>(&mut self, prefix: &str, block: F) -> Result<(), RegistrationError>
    where
        F: FnOnce(&mut Scope<'_>) -> Result<(), RegistrationError>,
    {
        self.registry.path(prefix, block)
    }

    pub fn end_point<F>(&mut self, method: Method, sub_path: &str, handler: F) -> Result<(), RegistrationError>
    where
        F: Fn(&Request, &mut Response, &mut RequestContext) + Send + Sync + 'static,
    {
        self.registry.end_point(method, sub_path, handler)
    }

    pub fn filter<F>(&mut self, pattern: &str, handler: F) -> Result<(), RegistrationError>
    where
        F: Fn(&Request, &mut Response, &mut RequestContext) -> FilterResult + Send + Sync + 'static,
    {
        self.registry.filter(pattern, handler)
    }

    pub fn method_filter<F>(&mut self, method: Method, pattern: &str, handler: F) -> Result<(), RegistrationError>
    where
        F: Fn(&Request, &mut Response, &mut RequestContext) -> FilterResult + Send + Sync + 'static,
    {
        self.registry.method_filter(method, pattern, handler)
    }

    /// Freeze the routes and begin serving.
    pub fn start(&mut self) -> Result<(), LifecycleError> {
        self.registry.lifecycle().can_start()?;

        let address = self.config.listener.bind_address.clone();
        let bind_err = |source| LifecycleError::Bind {
            address: address.clone(),
            source,
        };
        let std_listener = std::net::TcpListener::bind(&address).map_err(bind_err)?;
        std_listener.set_nonblocking(true).map_err(bind_err)?;
        let local_addr = std_listener.local_addr().map_err(bind_err)?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.listener.worker_threads)
            .thread_name("tinyweb-worker")
            .enable_all()
            .build()
            .map_err(LifecycleError::Runtime)?;

        let routes = self.registry.freeze()?;
        let server = HttpServer::new(self.config.clone(), routes);
        let shutdown = Shutdown::new();
        let signal = shutdown.clone();
        let drain = Duration::from_secs(self.config.timeouts.shutdown_secs);

        let spawned = std::thread::Builder::new()
            .name("tinyweb-server".into())
            .spawn(move || {
                let result = runtime.block_on(async move {
                    let listener = tokio::net::TcpListener::from_std(std_listener)?;
                    server.run(listener, signal).await
                });
                // Handlers still running on the blocking pool get the same drain window.
                runtime.shutdown_timeout(drain);
                result
            });

        let thread = match spawned {
            Ok(thread) => thread,
            Err(e) => {
                let _ = self.registry.mark_stopped();
                return Err(LifecycleError::Runtime(e));
            }
        };

        self.running = Some(Running { shutdown, thread });
        self.local_addr = Some(local_addr);
        tracing::info!(
            address = %local_addr,
            endpoints = self.registry.table().describe().len(),
            "Server started"
        );
        Ok(())
    }

    /// Stop serving. The route table stays readable.
    pub fn stop(&mut self) -> Result<(), LifecycleError> {
        self.registry.mark_stopped()?;
        let Some(running) = self.running.take() else {
            return Err(LifecycleError::NotRunning);
        };

        tracing::info!("Server stopping");
        running.shutdown.trigger();
        match running.thread.join() {
            Ok(Ok(())) => {
                tracing::info!("Server stopped");
                Ok(())
            }
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Server loop failed");
                Err(LifecycleError::Runtime(e))
            }
            Err(_) => Err(LifecycleError::ServerThread),
        }
    }
}

impl Drop for WebServer {
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            running.shutdown.trigger();
            let _ = running.thread.join();
        }
    }
}
