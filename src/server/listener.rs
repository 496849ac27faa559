// ────────────────────────────────
// src/server/listener.rs
// Owns the bound socket and the sequential accept → respond loop.
// ────────────────────────────────
use hyper::server::conn::Http;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

use crate::config::ListenPrefix;
use crate::error::ProbeError;
use crate::health::HealthCheckService;
use crate::server::handler::HealthResponder;
use crate::shutdown::ShutdownSignal;

pub async fn bind_tcp(addr: SocketAddr) -> Result<TcpListener, ProbeError> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| ProbeError::Bind { addr, source })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeState {
    Created,
    Started,
    Running,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AcceptErrorClass {
    /// The listener is going away because shutdown was requested.
    Shutdown,
    /// The peer gave up before the handshake finished.
    Transient,
    Fatal,
}

pub(crate) fn classify_accept_error(err: &io::Error, shutting_down: bool) -> AcceptErrorClass {
    if shutting_down {
        return AcceptErrorClass::Shutdown;
    }
    match err.kind() {
        io::ErrorKind::ConnectionAborted
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::Interrupted
        | io::ErrorKind::TimedOut => AcceptErrorClass::Transient,
        _ => AcceptErrorClass::Fatal,
    }
}

/// Health probe endpoint: `Created → Started → Running → Stopped`.
pub struct HealthProbe<S> {
    prefix: ListenPrefix,
    service: Arc<S>,
    api_name: String,
    api_version: String,
    request_timeout: Duration,
    state: ProbeState,
    listener: Option<TcpListener>,
}

impl<S> HealthProbe<S>
where
    S: HealthCheckService + 'static,
{
    pub(crate) fn new(
        prefix: ListenPrefix,
        service: Arc<S>,
        api_name: String,
        api_version: String,
        request_timeout: Duration,
    ) -> Self {
        Self {
            prefix,
            service,
            api_name,
            api_version,
            request_timeout,
            state: ProbeState::Created,
            listener: None,
        }
    }

    pub fn state(&self) -> ProbeState {
        self.state
    }

    /// Address actually bound, available once started.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().and_then(|l| l.local_addr().ok())
    }

    /// Binds the listener. Returns the bound address, which differs from the
    /// configured one when port 0 was requested.
    pub async fn start(&mut self) -> Result<SocketAddr, ProbeError> {
        if self.state != ProbeState::Created {
            return Err(ProbeError::InvalidState {
                operation: "start",
                state: self.state,
            });
        }

        let listener = bind_tcp(self.prefix.addr).await?;
        let local_addr = listener.local_addr().map_err(|source| ProbeError::Bind {
            addr: self.prefix.addr,
            source,
        })?;

        info!("Health probe bound to http://{}{}", local_addr, self.prefix.path);
        self.listener = Some(listener);
        self.state = ProbeState::Started;
        Ok(local_addr)
    }

    /// Serves probes one connection at a time until `shutdown` fires.
    /// The listener is released when this returns, whatever the outcome.
    pub async fn run(&mut self, shutdown: ShutdownSignal) -> Result<(), ProbeError> {
        let listener = match (self.state, self.listener.take()) {
            (ProbeState::Started, Some(listener)) => listener,
            (state, _) => {
                return Err(ProbeError::InvalidState {
                    operation: "run",
                    state,
                })
            }
        };
        self.state = ProbeState::Running;

        let responder = HealthResponder::new(
            self.service.clone(),
            self.prefix.clone(),
            &self.api_name,
            &self.api_version,
            shutdown.clone(),
        );

        debug!("Healthcheck listening...");
        let result = accept_loop(&listener, &responder, &shutdown, self.request_timeout).await;

        drop(listener);
        self.state = ProbeState::Stopped;
        match &result {
            Ok(()) => info!("Health probe stopped"),
            Err(e) => warn!("Health probe stopped with error: {}", e),
        }
        result
    }

    /// Releases the listener. Safe to call more than once.
    pub fn stop(&mut self) {
        if self.listener.take().is_some() {
            info!("Health probe listener released");
        }
        self.state = ProbeState::Stopped;
    }
}

async fn accept_loop<S>(
    listener: &TcpListener,
    responder: &HealthResponder<S>,
    shutdown: &ShutdownSignal,
    request_timeout: Duration,
) -> Result<(), ProbeError>
where
    S: HealthCheckService + 'static,
{
    loop {
        if shutdown.is_triggered() {
            return Ok(());
        }

        let accepted = tokio::select! {
            biased;
            _ = shutdown.triggered() => return Ok(()),
            accepted = listener.accept() => accepted,
        };

        let (stream, peer) = match accepted {
            Ok(conn) => conn,
            Err(e) => match classify_accept_error(&e, shutdown.is_triggered()) {
                AcceptErrorClass::Shutdown => {
                    debug!("Accept interrupted by shutdown: {}", e);
                    return Ok(());
                }
                AcceptErrorClass::Transient => {
                    warn!("Transient accept error: {}", e);
                    continue;
                }
                AcceptErrorClass::Fatal => return Err(ProbeError::Accept(e)),
            },
        };

        serve_connection(stream, peer, responder.clone(), request_timeout).await;
    }
}

/// Drives a single connection to completion; failures stay local to it.
/// `request_timeout` bounds only the wait for the request to arrive. Once
/// the request is read, evaluation and the write run to completion.
async fn serve_connection<S>(
    stream: TcpStream,
    peer: SocketAddr,
    responder: HealthResponder<S>,
    request_timeout: Duration,
) where
    S: HealthCheckService + 'static,
{
    // hyper's header timer only starts on the first byte, so an idle
    // client is bounded here.
    let mut first = [0u8; 1];
    match tokio::time::timeout(request_timeout, stream.peek(&mut first)).await {
        Ok(Ok(0)) => {
            debug!(%peer, "connection closed before sending a request");
            return;
        }
        Ok(Ok(_)) => {}
        Ok(Err(err)) => {
            warn!(%peer, %err, "connection error");
            return;
        }
        Err(_) => {
            warn!(%peer, "no request received within {:?}, dropping connection", request_timeout);
            return;
        }
    }

    let connection = Http::new()
        .http1_only(true)
        .http1_keep_alive(false)
        .http1_header_read_timeout(request_timeout)
        .serve_connection(stream, responder);

    match connection.await {
        Ok(()) => debug!(%peer, "probe served"),
        Err(err) => warn!(%peer, %err, "connection error"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accept_errors_during_shutdown_are_expected() {
        let err = io::Error::new(io::ErrorKind::Other, "listener closed");
        assert_eq!(classify_accept_error(&err, true), AcceptErrorClass::Shutdown);
    }

    #[test]
    fn test_peer_aborts_are_transient() {
        for kind in [
            io::ErrorKind::ConnectionAborted,
            io::ErrorKind::ConnectionReset,
            io::ErrorKind::Interrupted,
            io::ErrorKind::TimedOut,
        ] {
            let err = io::Error::from(kind);
            assert_eq!(classify_accept_error(&err, false), AcceptErrorClass::Transient);
        }
    }

    #[test]
    fn test_other_accept_errors_are_fatal() {
        let err = io::Error::from(io::ErrorKind::PermissionDenied);
        assert_eq!(classify_accept_error(&err, false), AcceptErrorClass::Fatal);

        let err = io::Error::new(io::ErrorKind::Other, "too many open files");
        assert_eq!(classify_accept_error(&err, false), AcceptErrorClass::Fatal);
    }
}
