//! TCP front end: listener setup and the accept loop

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use socket2::{Domain, Protocol, Socket, Type};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::error::{NewsError, Result};
use crate::ratelimit::ConnectionLimiter;
use crate::response::{Response, codes};
use crate::session::Session;
use crate::spool::Spool;

/// Status text for clients turned away by the connection limit
pub const TOO_MANY_CONNECTIONS: &str = "Server has too many connections open -- try again later";

const LISTEN_BACKLOG: i32 = 128;

/// A bound news server
pub struct NewsServer {
    listener: TcpListener,
    spool: Arc<Spool>,
    config: Arc<ServerConfig>,
    limiter: ConnectionLimiter,
}

impl NewsServer {
    /// Bind the listening socket described by `config`
    ///
    /// Must be called from within a tokio runtime.
    pub fn bind(config: ServerConfig) -> Result<Self> {
        config.validate()?;
        let listener = listen(config.listen)?;
        info!(
            "listening on {} (spool {})",
            config.listen,
            config.spool_dir.display()
        );
        Ok(Self {
            listener,
            spool: Arc::new(Spool::from_config(&config)),
            limiter: ConnectionLimiter::new(config.max_clients),
            config: Arc::new(config),
        })
    }

    /// Address actually bound; useful when the configured port was 0
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve clients until the process is stopped
    pub async fn run(self) -> Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Serve clients until `shutdown` completes
    ///
    /// Sessions already running are left to finish on their own.
    pub async fn run_until(self, shutdown: impl Future<Output = ()>) -> Result<()> {
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("shutting down listener");
                    return Ok(());
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, addr)) => self.spawn_session(stream, addr),
                    Err(e) => warn!("accept failed: {}", e),
                },
            }
        }
    }

    fn spawn_session(&self, mut stream: TcpStream, addr: SocketAddr) {
        let Some(permit) = self.limiter.try_acquire() else {
            warn!(
                "refusing {}: {} connections already open",
                addr,
                self.limiter.max_connections()
            );
            tokio::spawn(async move {
                let refusal = Response::new(codes::SERVICE_UNAVAILABLE, TOO_MANY_CONNECTIONS);
                if let Err(e) = stream.write_all(&refusal.encode()).await {
                    debug!("could not notify {}: {}", addr, e);
                }
                let _ = stream.shutdown().await;
            });
            return;
        };

        let session = Session::new(
            stream,
            addr.ip().to_string(),
            Arc::clone(&self.spool),
            Arc::clone(&self.config),
        );
        tokio::spawn(async move {
            let _permit = permit;
            if let Err(e) = session.run().await {
                error!("session with {} ended: {}", addr, e);
            }
        });
    }
}

/// Create the listening socket with address reuse and TCP keepalive
fn listen(addr: SocketAddr) -> Result<TcpListener> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };
    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    socket.set_keepalive(true)?;
    socket
        .bind(&addr.into())
        .map_err(|e| NewsError::Config(format!("cannot bind {addr}: {e}")))?;
    socket.listen(LISTEN_BACKLOG)?;
    socket.set_nonblocking(true)?;

    let std_listener: std::net::TcpListener = socket.into();
    Ok(TcpListener::from_std(std_listener)?)
}
