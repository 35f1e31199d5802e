pub mod error;
pub mod routes;
pub mod store;

use core::future::Future;
use std::net::SocketAddr;
use std::path::Path;
use std::pin::pin;
use std::sync::Arc;

use activity_roster_config::Config;
use headers::{Header, HeaderMapExt as _};
use http::Request;
use hyper::body::Incoming;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use tokio::net::TcpListener;
use tokio::select;
use tokio::sync::watch;
use tracing::{debug_span, error, info, warn, Instrument as _};

use crate::error::AppError;
use crate::store::{Catalog, RosterStore};

/// Shared with every request handler.
#[derive(Clone)]
pub struct AppState {
    pub roster: Arc<RosterStore>,
    pub static_dir: Arc<Path>,
}

pub trait ResponseTypedHeaderExt {
    #[must_use]
    fn typed_header<H: Header>(self, header: H) -> Self;
}

impl ResponseTypedHeaderExt for http::response::Builder {
    fn typed_header<H: Header>(self, header: H) -> Self {
        let mut this = self;
        if let Some(headers) = this.headers_mut() {
            headers.typed_insert(header);
        }
        this
    }
}

pub async fn setup_server(config: &Config) -> Result<AppState, AppError> {
    let catalog = match &config.seed_file {
        Some(path) => Catalog::load(path).await?,
        None => Catalog::mergington(),
    };
    info!(activities = catalog.len(), "seeding roster");
    Ok(AppState {
        roster: Arc::new(RosterStore::new(catalog)?),
        static_dir: config.static_dir.clone().into(),
    })
}

/// Binds the listener and returns its address together with the future that
/// serves connections until Ctrl+C or SIGTERM.
pub async fn run_server(
    config: Config,
) -> Result<(SocketAddr, impl Future<Output = Result<(), AppError>>), AppError> {
    run_server_with_shutdown(config, shutdown_signal()).await
}

#[allow(clippy::redundant_pub_crate)]
pub async fn run_server_with_shutdown(
    config: Config,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(SocketAddr, impl Future<Output = Result<(), AppError>>), AppError> {
    info!("starting up server...");

    let state = setup_server(&config).await?;
    let listener = TcpListener::bind(config.address).await?;
    let local_addr = listener.local_addr()?;

    // tell the connections to shutdown
    let (shutdown_tx, shutdown_rx) = watch::channel(());
    let shutdown_tx = Arc::new(shutdown_tx);

    // wait for the connections to finish shutdown
    let (closed_tx, closed_rx) = watch::channel(());

    info!(%local_addr, "started up server...");

    Ok((local_addr, async move {
        let mut shutdown = pin!(shutdown);
        loop {
            select! {
                accept = listener.accept() => {
                    let (socket, remote_addr) = match accept {
                        Ok(accepted) => accepted,
                        Err(err) => {
                            error!("failed to accept connection: {err}");
                            continue;
                        }
                    };

                    let state = state.clone();
                    let shutdown_tx = Arc::clone(&shutdown_tx);
                    let closed_rx = closed_rx.clone();

                    let fut = async move {
                        let service = hyper::service::service_fn(move |request: Request<Incoming>| {
                            routes::handle(state.clone(), request)
                        });

                        let builder = auto::Builder::new(TokioExecutor::new());
                        let connection =
                            builder.serve_connection_with_upgrades(TokioIo::new(socket), service);
                        let mut connection = pin!(connection);

                        let result = select! {
                            result = connection.as_mut() => result,
                            () = shutdown_tx.closed() => {
                                connection.as_mut().graceful_shutdown();
                                connection.as_mut().await
                            }
                        };
                        if let Err(err) = result {
                            error!("failed to serve connection: {err:#}");
                        }

                        drop(closed_rx);
                    };

                    tokio::spawn(fut.instrument(debug_span!("connection", %remote_addr)));
                }
                () = &mut shutdown => {
                    warn!("shutting down, waiting for open connections");
                    drop(shutdown_rx); // initiate shutdown
                    drop(closed_rx);
                    closed_tx.closed().await;
                    break;
                }
            }
        }

        info!("server stopped");
        Ok(())
    }))
}

#[allow(clippy::redundant_pub_crate)]
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {err}");
            core::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!("failed to install signal handler: {err}");
                core::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = core::future::pending::<()>();

    select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
