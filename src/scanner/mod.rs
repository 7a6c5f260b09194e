//! Core functionality for actual scanning behaviour.
//!
//! A scan fills a [`WorkQueue`] with every requested port, seals it, and lets
//! a fixed number of workers drain it. Each claimed port gets one [`Probe`]
//! attempt whose [`ProbeResult`] goes into a [`ResultAggregator`]. The result
//! set is only released once every worker has been joined.
use log::{debug, error, trace};
use std::{sync::Arc, time::Duration};
use thiserror::Error;
use tokio::task::JoinSet;

mod aggregator;
mod probe;
mod queue;

pub use aggregator::ResultAggregator;
pub use probe::{Probe, ProbeResult};
pub use queue::WorkQueue;

/// Reasons a scan cannot be started, or could not finish cleanly.
///
/// Failed connections are never errors; they show up as closed
/// [`ProbeResult`]s instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScanError {
    #[error("no target host given")]
    EmptyHost,
    #[error("no ports to scan")]
    NoPorts,
    #[error("port {0} is outside the range 1-65535")]
    InvalidPort(u16),
    #[error("concurrency must be at least 1")]
    ZeroConcurrency,
    #[error("timeout must be greater than zero")]
    ZeroTimeout,
    #[error("{0} scan worker(s) stopped unexpectedly")]
    WorkerPanicked(usize),
}

/// Everything needed to run one scan. Read-only once the scan starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    pub host: String,
    pub ports: Vec<u16>,
    pub timeout: Duration,
    pub concurrency: usize,
}

impl ScanRequest {
    pub fn new(
        host: impl Into<String>,
        ports: Vec<u16>,
        timeout: Duration,
        concurrency: usize,
    ) -> Self {
        Self {
            host: host.into(),
            ports,
            timeout,
            concurrency,
        }
    }

    /// Checks the request without touching the network.
    pub fn validate(&self) -> Result<(), ScanError> {
        if self.host.trim().is_empty() {
            return Err(ScanError::EmptyHost);
        }
        if self.ports.is_empty() {
            return Err(ScanError::NoPorts);
        }
        if self.ports.contains(&0) {
            return Err(ScanError::InvalidPort(0));
        }
        if self.concurrency == 0 {
            return Err(ScanError::ZeroConcurrency);
        }
        if self.timeout.is_zero() {
            return Err(ScanError::ZeroTimeout);
        }
        Ok(())
    }
}

/// Results of a finished scan, one per probed port, in completion order.
#[derive(Debug, Clone, Default)]
pub struct ScanResultSet(Vec<ProbeResult>);

impl ScanResultSet {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProbeResult> {
        self.0.iter()
    }

    /// Ports that accepted a connection, ascending.
    pub fn open_ports(&self) -> Vec<u16> {
        let mut ports: Vec<u16> = self
            .0
            .iter()
            .filter(|result| result.is_open())
            .map(ProbeResult::port)
            .collect();
        ports.sort_unstable();
        ports
    }

    /// Results ordered by port number, for presentation.
    pub fn into_sorted(mut self) -> Vec<ProbeResult> {
        self.0.sort_by_key(ProbeResult::port);
        self.0
    }
}

impl IntoIterator for ScanResultSet {
    type Item = ProbeResult;
    type IntoIter = std::vec::IntoIter<ProbeResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ScanResultSet {
    type Item = &'a ProbeResult;
    type IntoIter = std::slice::Iter<'a, ProbeResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// The scan engine.
///
/// Construction validates the request, so an invalid one never opens a
/// socket.
///
/// ```no_run
/// use portsweep::scanner::{ScanRequest, Scanner};
/// use std::time::Duration;
///
/// # async fn demo() -> Result<(), portsweep::scanner::ScanError> {
/// let request = ScanRequest::new("127.0.0.1", vec![22, 80, 443], Duration::from_millis(200), 2);
/// let results = Scanner::new(request)?.run().await?;
/// println!("open: {:?}", results.open_ports());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Scanner {
    ports: Vec<u16>,
    concurrency: usize,
    probe: Arc<Probe>,
}

impl Scanner {
    pub fn new(request: ScanRequest) -> Result<Self, ScanError> {
        request.validate()?;
        let ScanRequest {
            host,
            ports,
            timeout,
            concurrency,
        } = request;

        Ok(Self {
            ports,
            concurrency,
            probe: Arc::new(Probe::new(host, timeout)),
        })
    }

    /// Spawns `concurrency` workers over a freshly sealed queue and waits for
    /// all of them before returning the collected results.
    pub async fn run(&self) -> Result<ScanResultSet, ScanError> {
        let queue = Arc::new(WorkQueue::sealed(&self.ports));
        let aggregator = Arc::new(ResultAggregator::with_capacity(self.ports.len()));

        debug!(
            "Start scanning {}. \nWorkers {}\nNumber of ports {}",
            self.probe.host(),
            self.concurrency,
            self.ports.len()
        );

        let mut workers = JoinSet::new();
        for id in 0..self.concurrency {
            workers.spawn(worker(
                id,
                Arc::clone(&queue),
                Arc::clone(&self.probe),
                Arc::clone(&aggregator),
            ));
        }

        let mut failed_workers = 0;
        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                error!("Scan worker failed: {e}");
                failed_workers += 1;
            }
        }
        if failed_workers > 0 {
            return Err(ScanError::WorkerPanicked(failed_workers));
        }

        // Every worker has been joined and dropped its handle by now.
        let results = Arc::try_unwrap(aggregator)
            .map_or_else(|shared| shared.take(), ResultAggregator::finish);

        debug!(
            "Scan of {} finished: {} ports claimed, {} results",
            self.probe.host(),
            queue.claimed(),
            results.len()
        );
        Ok(ScanResultSet(results))
    }
}

/// Claims ports until the queue runs dry. Returns how many it probed.
async fn worker(
    id: usize,
    queue: Arc<WorkQueue>,
    probe: Arc<Probe>,
    aggregator: Arc<ResultAggregator>,
) -> usize {
    let mut probed = 0;
    while let Some(port) = queue.next().await {
        let result = probe.probe(port).await;
        trace!("Worker {id}: {result}");
        aggregator.push(result);
        probed += 1;
    }
    trace!("Worker {id} done after {probed} probes");
    probed
}
