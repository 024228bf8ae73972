use crate::core::engine::AccountEngine;
use crate::http::router;
use crate::utils::error::Result;
use http_body_util::{BodyExt, Full, Limited};
use hyper::body::{Bytes, Incoming};
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde_json::Value;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};

/// JSON body 上限 100 KiB
const MAX_BODY_BYTES: usize = 100 * 1024;

pub struct HttpServer {
    listener: TcpListener,
    engine: AccountEngine,
}

impl HttpServer {
    pub async fn bind(addr: SocketAddr, engine: AccountEngine) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener, engine })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// 接受連線直到 `shutdown` 完成；每條連線在獨立的 task 中處理
    pub async fn serve<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tracing::info!("🚀 Listening on http://{}", self.local_addr()?);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let engine = self.engine.clone();
                        tokio::spawn(async move {
                            handle_connection(stream, peer, engine).await;
                        });
                    }
                    Err(e) => {
                        tracing::error!("Failed to accept connection: {}", e);
                    }
                },
                _ = &mut shutdown => {
                    tracing::info!("Shutdown signal received, no longer accepting connections");
                    break;
                }
            }
        }

        Ok(())
    }
}

async fn handle_connection(stream: TcpStream, peer: SocketAddr, engine: AccountEngine) {
    let io = TokioIo::new(stream);
    let service = service_fn(move |req| handle_request(req, engine.clone()));

    if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
        tracing::debug!("Connection from {} closed with error: {}", peer, e);
    }
}

async fn handle_request(
    req: Request<Incoming>,
    engine: AccountEngine,
) -> std::result::Result<Response<Full<Bytes>>, Infallible> {
    let (parts, body) = req.into_parts();
    tracing::debug!("{} {}", parts.method, parts.uri.path());

    let (status, payload) = match Limited::new(body, MAX_BODY_BYTES).collect().await {
        Ok(collected) => {
            let bytes = collected.to_bytes();
            router::route(&engine, &parts.method, parts.uri.path(), &bytes).await
        }
        Err(e) => {
            tracing::warn!("Failed to read request body: {}", e);
            router::error_body(
                StatusCode::PAYLOAD_TOO_LARGE,
                "El cuerpo de la solicitud es demasiado grande o no se pudo leer",
            )
        }
    };

    Ok(json_response(status, &payload))
}

fn json_response(status: StatusCode, payload: &Value) -> Response<Full<Bytes>> {
    let body = serde_json::to_vec(payload).unwrap_or_default();
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/json; charset=utf-8"),
    );
    response
}
