//! A single bounded-time TCP connection attempt.
use log::{debug, trace};
use std::{fmt, io, sync::Arc, time::Duration};
use tokio::{io::AsyncWriteExt, net::TcpStream, time};

/// Outcome of probing one port.
///
/// A result is either open, or carries the error that made the attempt fail.
/// It is never mutated after the probe that produced it returns.
#[derive(Debug, Clone)]
pub struct ProbeResult {
    port: u16,
    failure_reason: Option<Arc<io::Error>>,
}

impl ProbeResult {
    pub(crate) const fn open(port: u16) -> Self {
        Self {
            port,
            failure_reason: None,
        }
    }

    pub(crate) fn failed(port: u16, reason: io::Error) -> Self {
        Self {
            port,
            failure_reason: Some(Arc::new(reason)),
        }
    }

    pub const fn port(&self) -> u16 {
        self.port
    }

    /// True when the handshake completed within the timeout.
    pub const fn is_open(&self) -> bool {
        self.failure_reason.is_none()
    }

    /// Why the connection attempt failed, if it did.
    ///
    /// Callers wanting to tell a refusal from a timeout can inspect
    /// [`io::Error::kind`]; the engine itself treats every failure alike.
    pub fn failure_reason(&self) -> Option<&io::Error> {
        self.failure_reason.as_deref()
    }
}

impl fmt::Display for ProbeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.failure_reason() {
            None => write!(f, "{} open", self.port),
            Some(reason) => write!(f, "{} closed ({reason})", self.port),
        }
    }
}

/// Connects to ports on one host, giving each attempt at most `timeout`.
///
/// Shared between all workers of a scan behind an `Arc`.
#[derive(Debug)]
pub struct Probe {
    host: String,
    timeout: Duration,
}

impl Probe {
    pub fn new(host: impl Into<String>, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            timeout,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Attempts one connection to `port` and classifies the outcome.
    ///
    /// A successful connection is shut down before this returns, so no socket
    /// outlives the probe. There are no retries.
    ///
    /// ```no_run
    /// # use portsweep::scanner::Probe;
    /// # use std::time::Duration;
    /// # async fn demo() {
    /// let probe = Probe::new("127.0.0.1", Duration::from_millis(200));
    /// let result = probe.probe(22).await;
    /// println!("{result}");
    /// # }
    /// ```
    pub async fn probe(&self, port: u16) -> ProbeResult {
        match self.connect(port).await {
            Ok(mut stream) => {
                trace!("Connected to {}:{}, shutting down stream", self.host, port);
                if let Err(e) = stream.shutdown().await {
                    debug!("Shutdown stream error {e}");
                }
                ProbeResult::open(port)
            }
            Err(e) => {
                trace!("Probe of {}:{} failed: {}", self.host, port, e);
                ProbeResult::failed(port, e)
            }
        }
    }

    /// Name resolution happens inside the timeout too, so a hostname that
    /// never resolves costs no more than an unreachable address.
    async fn connect(&self, port: u16) -> io::Result<TcpStream> {
        time::timeout(
            self.timeout,
            TcpStream::connect((self.host.as_str(), port)),
        )
        .await?
    }
}

#[cfg(test)]
mod tests {
    use super::{Probe, ProbeResult};
    use std::io;
    use std::time::{Duration, Instant};
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn listening_port_is_open() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let probe = Probe::new("127.0.0.1", Duration::from_millis(500));
        let result = probe.probe(port).await;

        assert!(result.is_open());
        assert_eq!(result.port(), port);
        assert!(result.failure_reason().is_none());
    }

    #[tokio::test]
    async fn closed_port_fails_before_timeout() {
        // Grab a free port, then release it so nothing listens there.
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };

        let timeout = Duration::from_secs(2);
        let probe = Probe::new("127.0.0.1", timeout);
        let started = Instant::now();
        let result = probe.probe(port).await;

        assert!(!result.is_open());
        assert!(result.failure_reason().is_some());
        assert!(started.elapsed() < timeout);
    }

    #[tokio::test]
    async fn unresolvable_host_is_a_failed_probe() {
        let probe = Probe::new("host.invalid", Duration::from_millis(500));
        let result = probe.probe(80).await;

        assert!(!result.is_open());
        assert!(result.failure_reason().is_some());
    }

    #[test]
    fn display_includes_reason() {
        let open = ProbeResult::open(80);
        let closed =
            ProbeResult::failed(81, io::Error::from(io::ErrorKind::ConnectionRefused));

        assert_eq!(open.to_string(), "80 open");
        assert!(closed.to_string().starts_with("81 closed ("));
    }
}
