//! tinyweb demo server.
//!
//! Loads configuration, registers a small route tree and serves it until
//! Ctrl-C or SIGTERM.
//!
//! ```text
//! GET /health          -> "OK"
//! GET /hello           -> "Hello, World!"
//! GET /hello/{name}    -> "Hello, {name}!"
//! GET /hi, /hi/{name}  -> same greeting block, mounted again
//! ```

use std::path::PathBuf;
use std::time::Instant;

use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use clap::Parser;

use tinyweb::config::{load_config, ServerConfig};
use tinyweb::lifecycle::signals::shutdown_signal;
use tinyweb::observability::{init_logging, init_metrics};
use tinyweb::routing::{FilterResult, RegistrationError, Scope};
use tinyweb::{Request, RequestContext, Response, WebServer};

#[derive(Parser)]
#[command(name = "tinyweb")]
#[command(about = "Embeddable route registry demo server", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`
    #[arg(short, long)]
    bind: Option<String>,
}

/// Set by the greeting block's filter, read by its endpoints.
const RECEIVED_AT: &str = "received_at";

fn greeting(p: &mut Scope<'_>) -> Result<(), RegistrationError> {
    p.filter(".*", |_req, _res, ctx| {
        ctx.set_attribute(RECEIVED_AT, Instant::now());
        FilterResult::Continue
    })?;
    p.end_point(Method::GET, "", |req, res, ctx| greet(req, res, ctx, "World"))?;
    p.end_point(Method::GET, "/{name}", |req, res, ctx| {
        let name = req.param("name").unwrap_or("World").to_string();
        greet(req, res, ctx, &name)
    })
}

fn greet(_req: &Request, res: &mut Response, ctx: &mut RequestContext, name: &str) {
    if let Some(at) = ctx.attribute::<Instant>(RECEIVED_AT) {
        if let Ok(value) = HeaderValue::from_str(&at.elapsed().as_micros().to_string()) {
            res.set_header(HeaderName::from_static("x-handled-micros"), value);
        }
    }
    res.write(format!("Hello, {}!", name), StatusCode::OK);
}

fn register_routes(server: &mut WebServer) -> Result<(), RegistrationError> {
    server.end_point(Method::GET, "/health", |_req, res, _ctx| res.ok("OK"))?;
    server.path("/hello", greeting)?;
    server.path("/hi", greeting)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    init_logging(&config.observability);
    tracing::info!("tinyweb v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        worker_threads = config.listener.worker_threads,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let mut server = WebServer::new(config);
    register_routes(&mut server)?;
    for (method, path) in server.routes().describe() {
        tracing::info!(method = %method, path = %path, "Route");
    }

    server.start()?;

    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(shutdown_signal());

    server.stop()?;
    tracing::info!("Shutdown complete");
    Ok(())
}
