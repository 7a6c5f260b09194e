use anyhow::{Context, Result};
use log::debug;
use portsweep::input::{Config, Opts};
use portsweep::port_strategy::PortStrategy;
use portsweep::scanner::{ScanRequest, Scanner};
use portsweep::tui::{closed_line, greppable_line, open_line};
use portsweep::{detail, output, warning};
use std::time::Instant;

#[cfg(unix)]
const DEFAULT_FILE_DESCRIPTORS_LIMIT: u64 = 8000;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let mut opts = Opts::read();
    if !opts.no_config {
        let config =
            Config::read(opts.config_path.clone()).context("Invalid configuration file")?;
        opts.merge(&config);
    }

    debug!("Main() `opts` arguments are {opts:?}");

    let host = opts
        .host
        .clone()
        .context("No host given. Pass one with --host or set `host` in the config file")?;

    let concurrency = opts.concurrency();
    let file_limit = adjust_ulimit_size(&opts);
    if u64::try_from(concurrency).unwrap_or(u64::MAX) > file_limit {
        warning!(
            format!(
                "Concurrency {concurrency} is above the open file limit of {file_limit}. \
                 Lower it with -c or raise the limit with --ulimit."
            ),
            opts.greppable,
            opts.accessible
        );
    }

    let ports = PortStrategy::pick(opts.ports(), opts.scan_order()).order();
    let port_count = ports.len();
    let request = ScanRequest::new(host.clone(), ports, opts.timeout(), concurrency);
    let scanner = Scanner::new(request).context("Invalid scan request")?;

    detail!(
        format!("Scanning {port_count} ports on {host} with {concurrency} workers"),
        opts.greppable,
        opts.accessible
    );

    let started = Instant::now();
    let results = scanner.run().await?;
    let elapsed = started.elapsed();
    let open_ports = results.open_ports();

    if opts.greppable {
        println!("{}", greppable_line(&host, &open_ports));
        return Ok(());
    }

    for result in results.into_sorted() {
        if result.is_open() {
            println!("{}", open_line(&host, result.port(), opts.accessible));
        } else if opts.show_closed {
            println!("{}", closed_line(&host, &result, opts.accessible));
        }
    }

    output!(
        format!(
            "{} of {port_count} ports open on {host} ({elapsed:.2?})",
            open_ports.len()
        ),
        opts.greppable,
        opts.accessible
    );

    Ok(())
}

/// Raises the soft open file limit when `--ulimit` is given and returns the
/// limit in effect.
#[cfg(unix)]
fn adjust_ulimit_size(opts: &Opts) -> u64 {
    use rlimit::Resource;

    if let Some(limit) = opts.ulimit {
        let hard = Resource::NOFILE.get().map_or(limit, |(_, hard)| hard);
        if Resource::NOFILE.set(limit, hard).is_ok() {
            detail!(
                format!("Automatically increasing ulimit value to {limit}."),
                opts.greppable,
                opts.accessible
            );
        } else {
            warning!(
                format!("ERROR. Failed to set ulimit value to {limit}."),
                opts.greppable,
                opts.accessible
            );
        }
    }

    Resource::NOFILE
        .get()
        .map_or(DEFAULT_FILE_DESCRIPTORS_LIMIT, |(soft, _)| soft)
}

#[cfg(not(unix))]
fn adjust_ulimit_size(_opts: &Opts) -> u64 {
    u64::MAX
}
