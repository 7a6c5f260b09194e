//! This crate exposes the internal functionality of the portsweep TCP port
//! scanner.
//!
//! portsweep checks which TCP ports on a single host accept a connection. It
//! is a plain connect scan: no raw sockets, no service identification, no
//! retries.
//!
//! ## Architecture Overview
//!
//! The core scanning behaviour is managed by
//! [`Scanner`](crate::scanner::Scanner), built from a validated
//! [`ScanRequest`](crate::scanner::ScanRequest):
//!
//! 1. **Input Processing**: the host and port list are parsed from the
//!    command line and the optional config file ([`input`])
//! 2. **Port Strategy**: the port list is kept in order or shuffled
//!    ([`port_strategy`])
//! 3. **Socket Scanning**: the ports are loaded into a sealed queue and a
//!    fixed pool of workers drains it, one connect-with-timeout per port
//! 4. **Result Processing**: results are collected behind a lock and handed
//!    back only after every worker has finished
//!
//! Connection failures are data, not errors: each port probed produces one
//! [`ProbeResult`](crate::scanner::ProbeResult), open or carrying the reason
//! it is not. Only a malformed request makes the scan fail.
//!
//! ## Basic Usage Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use portsweep::scanner::{ScanRequest, Scanner};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let request = ScanRequest::new(
//!         "127.0.0.1",
//!         (1..=1_000).collect(),
//!         Duration::from_millis(200), // per-port connect timeout
//!         100,                        // workers
//!     );
//!
//!     let results = Scanner::new(request)?.run().await?;
//!
//!     println!("Probed {} ports", results.len());
//!     for port in results.open_ports() {
//!         println!("  {port} open");
//!     }
//!     Ok(())
//! }
//! ```
#![allow(clippy::needless_doctest_main)]

pub mod tui;

pub mod input;

pub mod scanner;

pub mod port_strategy;
