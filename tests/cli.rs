use std::io::Read;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::time::Duration;
use wait_timeout::ChildExt;

const TIMEOUT: Duration = Duration::from_secs(30);

fn portsweep(args: &[&str]) -> Child {
    Command::new(env!("CARGO_BIN_EXE_portsweep"))
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap()
}

/// Waits for the child, killing it if it runs past `TIMEOUT`.
fn finish(mut child: Child) -> (i32, String) {
    let status = match child.wait_timeout(TIMEOUT).unwrap() {
        Some(status) => status,
        None => {
            child.kill().unwrap();
            panic!("portsweep did not finish within {TIMEOUT:?}");
        }
    };

    let mut stdout = String::new();
    child
        .stdout
        .take()
        .unwrap()
        .read_to_string(&mut stdout)
        .unwrap();
    (status.code().unwrap_or(-1), stdout)
}

#[test]
fn greppable_output_lists_open_port() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port().to_string();

    let child = portsweep(&["-n", "-g", "-H", "127.0.0.1", "-p", &port, "-t", "500"]);
    let (code, stdout) = finish(child);

    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), format!("127.0.0.1 -> [{port}]"));
}

#[test]
fn accessible_output_reports_open_port() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let child = portsweep(&[
        "-n",
        "--accessible",
        "-H",
        "127.0.0.1",
        "-p",
        &port.to_string(),
        "-c",
        "1",
    ]);
    let (code, stdout) = finish(child);

    assert_eq!(code, 0);
    assert!(stdout.contains(&format!("Open 127.0.0.1:{port}")), "{stdout}");
    assert!(stdout.contains("1 of 1 ports open"), "{stdout}");
}

#[test]
fn missing_host_fails() {
    let (code, _) = finish(portsweep(&["-n", "-p", "80"]));
    assert_eq!(code, 1);
}

#[test]
fn zero_concurrency_fails() {
    let (code, _) = finish(portsweep(&["-n", "-H", "127.0.0.1", "-p", "80", "-c", "0"]));
    assert_eq!(code, 1);
}
