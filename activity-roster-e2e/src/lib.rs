// cargo test -p activity-roster-e2e
// https://github.com/hyperium/hyper/blob/master/examples/client.rs

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::{Path, PathBuf};

use activity_roster_backend::error::AppError;
use activity_roster_backend::run_server_with_shutdown;
use activity_roster_config::Config;
use bytes::Bytes;
use http_body_util::{BodyExt as _, Empty};
use hyper::header::HOST;
use hyper::{HeaderMap, Method, Request, StatusCode};
use hyper_util::rt::TokioIo;
use serde::de::DeserializeOwned;
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::error;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[must_use]
pub fn static_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../activity-roster-backend/static")
}

/// Listens on an ephemeral port with the built-in catalog.
#[must_use]
pub fn test_config() -> Config {
    Config {
        address: SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 0)),
        static_dir: static_dir(),
        seed_file: None,
    }
}

pub struct TestServer {
    pub address: SocketAddr,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<std::result::Result<(), AppError>>,
}

impl TestServer {
    pub async fn start(config: Config) -> std::result::Result<Self, AppError> {
        let (shutdown, stop) = oneshot::channel::<()>();
        let (address, server) = run_server_with_shutdown(config, async move {
            stop.await.ok();
        })
        .await?;
        Ok(Self {
            address,
            shutdown,
            handle: tokio::spawn(server),
        })
    }

    pub async fn request(&self, method: Method, path: &str) -> Result<TestResponse> {
        request(self.address, method, path).await
    }

    pub async fn stop(self) -> Result<()> {
        self.shutdown
            .send(())
            .map_err(|()| "server already stopped")?;
        self.handle.await?.map_err(|err| err.to_string())?;
        Ok(())
    }
}

#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    pub fn text(&self) -> Result<&str> {
        Ok(std::str::from_utf8(&self.body)?)
    }
}

/// Sends one request over a fresh HTTP/1 connection and reads the whole body.
pub async fn request(address: SocketAddr, method: Method, path: &str) -> Result<TestResponse> {
    let stream = TcpStream::connect(address).await?;
    let io = TokioIo::new(stream);

    let (mut sender, conn) = hyper::client::conn::http1::handshake(io).await?;
    let connection = tokio::task::spawn(async move {
        if let Err(err) = conn.await {
            error!("client connection failed: {err}");
        }
    });

    let request = Request::builder()
        .method(method)
        .uri(path)
        .header(HOST, address.to_string())
        .body(Empty::<Bytes>::new())?;

    let response = sender.send_request(request).await?;
    let (parts, body) = response.into_parts();
    let body = body.collect().await?.to_bytes();

    drop(sender);
    connection.await?;

    Ok(TestResponse {
        status: parts.status,
        headers: parts.headers,
        body,
    })
}
