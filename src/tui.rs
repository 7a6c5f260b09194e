//! Utilities for terminal output.
//!
//! The scan engine never prints; everything a user sees goes through the
//! macros and formatters here.
#[doc(hidden)]
pub use colored::Colorize;

use crate::scanner::ProbeResult;

/// Prints a `[!]` warning unless greppable mode is on.
#[macro_export]
macro_rules! warning {
    ($name:expr) => {{
        use $crate::tui::Colorize as _;
        println!("{} {}", "[!]".red().bold(), $name);
    }};
    ($name:expr, $greppable:expr, $accessible:expr) => {{
        use $crate::tui::Colorize as _;
        if !$greppable {
            if $accessible {
                println!("{}", $name);
            } else {
                println!("{} {}", "[!]".red().bold(), $name);
            }
        }
    }};
}

/// Prints a `[~]` progress detail unless greppable mode is on.
#[macro_export]
macro_rules! detail {
    ($name:expr) => {{
        use $crate::tui::Colorize as _;
        println!("{} {}", "[~]".blue().bold(), $name);
    }};
    ($name:expr, $greppable:expr, $accessible:expr) => {{
        use $crate::tui::Colorize as _;
        if !$greppable {
            if $accessible {
                println!("{}", $name);
            } else {
                println!("{} {}", "[~]".blue().bold(), $name);
            }
        }
    }};
}

/// Prints a `[>]` summary line unless greppable mode is on.
#[macro_export]
macro_rules! output {
    ($name:expr) => {{
        use $crate::tui::Colorize as _;
        println!("{} {}", "[>]".green().bold(), $name);
    }};
    ($name:expr, $greppable:expr, $accessible:expr) => {{
        use $crate::tui::Colorize as _;
        if !$greppable {
            if $accessible {
                println!("{}", $name);
            } else {
                println!("{} {}", "[>]".green().bold(), $name);
            }
        }
    }};
}

/// `host:port`, bracketing IPv6 literals.
pub fn socket_label(host: &str, port: u16) -> String {
    if host.contains(':') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}

pub fn open_line(host: &str, port: u16, accessible: bool) -> String {
    let target = socket_label(host, port);
    if accessible {
        format!("Open {target}")
    } else {
        format!("Open {}", target.purple())
    }
}

pub fn closed_line(host: &str, result: &ProbeResult, accessible: bool) -> String {
    let target = socket_label(host, result.port());
    let reason = result
        .failure_reason()
        .map_or_else(|| String::from("no reason given"), ToString::to_string);
    if accessible {
        format!("Closed {target} ({reason})")
    } else {
        format!("Closed {} ({})", target.dimmed(), reason)
    }
}

/// `host -> [p1,p2]`, the whole output of greppable mode.
pub fn greppable_line(host: &str, open_ports: &[u16]) -> String {
    let ports = open_ports
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",");
    format!("{host} -> [{ports}]")
}
