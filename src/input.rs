//! Provides a means to read, parse and hold configuration options for scans.
use clap::{Parser, ValueEnum};
use serde_derive::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

const LOWEST_PORT_NUMBER: u16 = 1;
const TOP_PORT_NUMBER: u16 = 65535;

pub const DEFAULT_TOP_PORT: u16 = 1024;
pub const DEFAULT_TIMEOUT_MS: u64 = 1_000;
pub const DEFAULT_CONCURRENCY: usize = 100;

/// Represents the order in which ports are queued.
///   - Serial keeps the order they were given in, for example 1 to 1_000.
///   - Random shuffles them before the scan starts.
#[derive(Deserialize, Debug, ValueEnum, Clone, Copy, PartialEq, Eq)]
pub enum ScanOrder {
    Serial,
    Random,
}

pub type Ports = Vec<u16>;

/// Expands a textual port list such as `22,80,443` or `1-1024,8080`.
///
/// Input order is kept and so are duplicates; each listed port is scanned
/// once per mention.
pub fn parse_ports_and_ranges(input: &str) -> Result<Ports, String> {
    let mut ports = Vec::new();

    for part in input.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        if part.contains('-') {
            ports.extend(parse_port_range(part)?);
        } else {
            ports.push(parse_single_port(part)?);
        }
    }

    if ports.is_empty() {
        return Err(String::from("No valid ports or ranges provided"));
    }

    Ok(ports)
}

fn parse_port_range(range_str: &str) -> Result<Vec<u16>, String> {
    let range_parts: Vec<&str> = range_str.split('-').map(str::trim).collect();
    if range_parts.len() != 2 {
        return Err(format!(
            "Invalid range format '{range_str}'. Expected 'start-end'. Example: 1-1000.",
        ));
    }

    let start: u16 = range_parts[0].parse().map_err(|_| {
        format!(
            "Invalid start port '{}' in range '{range_str}'",
            range_parts[0]
        )
    })?;
    let end: u16 = range_parts[1].parse().map_err(|_| {
        format!(
            "Invalid end port '{}' in range '{range_str}'",
            range_parts[1]
        )
    })?;

    if start > end {
        return Err(format!(
            "Start port {start} is greater than end port {end} in range '{range_str}'",
        ));
    }

    if start < LOWEST_PORT_NUMBER {
        return Err(format!(
            "Ports in range '{range_str}' must be between {LOWEST_PORT_NUMBER} and {TOP_PORT_NUMBER}",
        ));
    }

    Ok((start..=end).collect())
}

fn parse_single_port(port_str: &str) -> Result<u16, String> {
    let port: u16 = port_str
        .parse()
        .map_err(|_| format!("Invalid port number '{port_str}'"))?;

    if port < LOWEST_PORT_NUMBER {
        return Err(format!(
            "Port {port} must be between {LOWEST_PORT_NUMBER} and {TOP_PORT_NUMBER}",
        ));
    }

    Ok(port)
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "portsweep",
    version = env!("CARGO_PKG_VERSION"),
    max_term_width = 120,
    help_template = "{bin} {version}\n{about}\n\nUSAGE:\n    {usage}\n\nOPTIONS:\n{options}",
)]
#[allow(clippy::struct_excessive_bools)]
/// Checks which TCP ports on a host accept a connection.
/// Only scan hosts you are allowed to scan.
pub struct Opts {
    /// The host to scan, as an IP address or a name.
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Ports and/or port ranges to scan. Examples: 80,443,8080 or 1-1024 or 1-1024,8080
    /// [default: 1-1024]
    #[arg(short, long, alias = "range", value_parser = parse_ports_and_ranges)]
    pub ports: Option<Ports>,

    /// The timeout in milliseconds before a port is assumed to be closed. [default: 1000]
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// How many ports are probed at the same time. Each worker holds at most
    /// one socket, so this is bounded by your open file limit. [default: 100]
    #[arg(short, long)]
    pub concurrency: Option<usize>,

    /// The order ports are queued in. Serial keeps the given order, random
    /// shuffles it. [default: serial]
    #[arg(long, value_enum, ignore_case = true)]
    pub scan_order: Option<ScanOrder>,

    /// Automatically raises the open file limit to the value you provide.
    #[arg(short, long)]
    pub ulimit: Option<u64>,

    /// Greppable mode. Only output the host and its open ports.
    #[arg(short, long)]
    pub greppable: bool,

    /// Accessible mode. Turns off features which negatively affect screen readers.
    #[arg(long)]
    pub accessible: bool,

    /// Also list ports that did not accept a connection, with the reason.
    #[arg(long)]
    pub show_closed: bool,

    /// Whether to ignore the configuration file or not.
    #[arg(short, long)]
    pub no_config: bool,

    /// Custom path to config file
    #[arg(long, value_parser)]
    pub config_path: Option<PathBuf>,
}

impl Opts {
    pub fn read() -> Self {
        Self::parse()
    }

    /// Fills in values the command line left unset from the user
    /// configuration file. Command line values always win.
    pub fn merge(&mut self, config: &Config) {
        if !self.no_config {
            self.merge_optional(config);
            self.merge_flags(config);
        }
    }

    fn merge_optional(&mut self, config: &Config) {
        macro_rules! merge_optional {
            ($($field: ident),+) => {
                $(
                    if self.$field.is_none() {
                        self.$field = config.$field.clone();
                    }
                )+
            }
        }

        merge_optional!(host, ports, timeout, concurrency, scan_order, ulimit);
    }

    fn merge_flags(&mut self, config: &Config) {
        macro_rules! merge_flags {
            ($($field: ident),+) => {
                $(
                    if let Some(true) = config.$field {
                        self.$field = true;
                    }
                )+
            }
        }

        merge_flags!(greppable, accessible, show_closed);
    }

    /// The ports to scan, falling back to 1 through [`DEFAULT_TOP_PORT`].
    pub fn ports(&self) -> Ports {
        self.ports
            .clone()
            .unwrap_or_else(|| (LOWEST_PORT_NUMBER..=DEFAULT_TOP_PORT).collect())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout.unwrap_or(DEFAULT_TIMEOUT_MS))
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency.unwrap_or(DEFAULT_CONCURRENCY)
    }

    pub fn scan_order(&self) -> ScanOrder {
        self.scan_order.unwrap_or(ScanOrder::Serial)
    }
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            host: None,
            ports: None,
            timeout: None,
            concurrency: None,
            scan_order: None,
            ulimit: None,
            greppable: true,
            accessible: false,
            show_closed: false,
            no_config: true,
            config_path: None,
        }
    }
}

/// Struct used to deserialize the options specified within our config file.
/// These will be further merged with our command line arguments in order to
/// generate the final Opts struct.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    host: Option<String>,
    ports: Option<Vec<u16>>,
    timeout: Option<u64>,
    concurrency: Option<usize>,
    scan_order: Option<ScanOrder>,
    ulimit: Option<u64>,
    greppable: Option<bool>,
    accessible: Option<bool>,
    show_closed: Option<bool>,
}

impl Config {
    /// Reads the configuration file with TOML format and parses it into a
    /// Config struct. A missing or unreadable file yields an empty config.
    ///
    /// # Format
    ///
    /// host = "127.0.0.1"
    /// ports = [22, 80, 443]
    /// timeout = 500
    /// concurrency = 200
    /// scan_order = "Random"
    ///
    pub fn read(custom_config_path: Option<PathBuf>) -> Result<Self, toml::de::Error> {
        let content = custom_config_path
            .or_else(default_config_path)
            .filter(|path| path.exists())
            .and_then(|path| fs::read_to_string(path).ok())
            .unwrap_or_default();

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Constructs default path to config toml, `~/.portsweep.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    let mut config_path = dirs::home_dir()?;
    config_path.push(".portsweep.toml");
    Some(config_path)
}
