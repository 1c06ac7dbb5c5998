use may::coroutine::JoinHandle;
use may_minihttp::{HttpServerWithHeaders, HttpService};
use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::Duration;
use tracing::info;

/// Maximum request headers accepted per request
const MAX_HEADERS: usize = 32;

/// Listener wrapping a service such as [`AppService`](super::AppService).
///
/// The service is cloned per connection by `may_minihttp`; requests carry at
/// most [`MAX_HEADERS`] headers.
pub struct HttpServer<T>(pub T);

/// Handle to a running listener.
///
/// Lets callers wait until the socket accepts connections, stop the listener
/// coroutine, or block on it for the process lifetime.
pub struct ServerHandle {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl ServerHandle {
    /// Address the listener is bound to
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Poll the listening address until it accepts connections.
    ///
    /// Tests call this before sending their first request.
    ///
    /// # Returns
    ///
    /// `Ok(())` once a TCP connect succeeds
    ///
    /// # Errors
    ///
    /// `TimedOut` if the listener is not reachable within ~250ms (50 attempts
    /// of 5ms).
    pub fn wait_ready(&self) -> io::Result<()> {
        for _ in 0..50 {
            if TcpStream::connect(self.addr).is_ok() {
                return Ok(());
            }
            thread::sleep(Duration::from_millis(5));
        }
        Err(io::Error::new(io::ErrorKind::TimedOut, "server not ready"))
    }

    /// Cancel the listener coroutine and wait for it to finish.
    ///
    /// Consumes the handle.
    pub fn stop(self) {
        // SAFETY: cancelling our own listener coroutine during shutdown; the
        // handle is valid and is joined right after.
        unsafe {
            self.handle.coroutine().cancel();
        }
        let _ = self.handle.join();
        info!(addr = %self.addr, "Server stopped");
    }

    /// Block until the listener exits.
    ///
    /// The listener runs until it is cancelled or panics, so `serve` never
    /// returns from here in normal operation.
    ///
    /// # Returns
    ///
    /// `Ok(())` when the listener coroutine finished
    ///
    /// # Errors
    ///
    /// Returns the panic payload if the listener panicked.
    pub fn join(self) -> thread::Result<()> {
        self.handle.join()
    }
}

impl<T: HttpService + Clone + Send + Sync + 'static> HttpServer<T> {
    /// Bind `addr` and start serving.
    ///
    /// # Arguments
    ///
    /// * `addr` - Address to bind (`"0.0.0.0:8080"`, `"127.0.0.1:0"`, ...); the
    ///   first resolved address is used
    ///
    /// # Returns
    ///
    /// A [`ServerHandle`] for the running listener
    ///
    /// # Errors
    ///
    /// Fails if the address does not resolve or cannot be bound.
    pub fn start<A: ToSocketAddrs>(self, addr: A) -> io::Result<ServerHandle> {
        let addr = addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid address"))?;
        let handle = HttpServerWithHeaders::<_, MAX_HEADERS>(self.0).start(addr)?;
        info!(addr = %addr, max_headers = MAX_HEADERS, "Server listening");
        Ok(ServerHandle { addr, handle })
    }
}
