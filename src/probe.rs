//! Resource readers backing trigger evaluation
//!
//! Each reader reduces one probe kind (HTTP GET, file read, ICMP ping) to a
//! `read(target) -> text` call. Readers never fail the run: an I/O failure
//! is rendered to text so the trigger can match against the error
//! description just like any other probe output.

use crate::trigger::ResourceKind;
use serde::Deserialize;
use std::fs;
use std::io::Read;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use ureq::Agent;

/// Echo probes sent per ping check
const PING_COUNT: u32 = 2;

/// Probe output: the resource text on success, or the rendered failure
/// description. Both sides participate in trigger matching.
pub type ProbeOutput = std::result::Result<String, String>;

/// A probe reducing one resource kind to text
pub trait ResourceReader {
    fn read(&self, target: &str, timeout: Duration) -> ProbeOutput;
}

/// One reader per resource kind
pub struct ProbeSet {
    url: Box<dyn ResourceReader>,
    file: Box<dyn ResourceReader>,
    ping: Box<dyn ResourceReader>,
}

impl ProbeSet {
    /// Wire up the production readers
    pub fn production(ping_mode: PingMode) -> Self {
        Self {
            url: Box::new(UrlReader),
            file: Box::new(FileReader),
            ping: Box::new(PingReader::new(ping_mode)),
        }
    }

    /// Wire up an explicit set of readers
    #[cfg(test)]
    pub fn new(
        url: Box<dyn ResourceReader>,
        file: Box<dyn ResourceReader>,
        ping: Box<dyn ResourceReader>,
    ) -> Self {
        Self { url, file, ping }
    }

    /// Select the reader for a resource kind
    pub fn reader(&self, kind: ResourceKind) -> &dyn ResourceReader {
        match kind {
            ResourceKind::Url => self.url.as_ref(),
            ResourceKind::File => self.file.as_ref(),
            ResourceKind::Ping => self.ping.as_ref(),
        }
    }
}

/// HTTP GET reader
///
/// HTTP error statuses are not transport errors: a 500 page body is
/// legitimate probe content for a trigger to match.
pub struct UrlReader;

impl ResourceReader for UrlReader {
    fn read(&self, target: &str, timeout: Duration) -> ProbeOutput {
        let config = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build();
        let agent: Agent = config.into();

        match agent.get(target).call() {
            Ok(response) => response
                .into_body()
                .read_to_string()
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        }
    }
}

/// Whole-file reader
pub struct FileReader;

impl ResourceReader for FileReader {
    fn read(&self, target: &str, _timeout: Duration) -> ProbeOutput {
        fs::read_to_string(target).map_err(|e| e.to_string())
    }
}

/// Ping probe mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PingMode {
    /// Send real echo probes via ping(8)
    #[default]
    Production,
    /// Report every host as reachable (deterministic testing)
    Simulated,
}

/// ICMP ping reader
///
/// Reports the literal string `OK` when all probes returned and `FAILURE`
/// otherwise, so triggers match on reachability rather than raw ping output.
pub struct PingReader {
    mode: PingMode,
}

impl PingReader {
    pub fn new(mode: PingMode) -> Self {
        Self { mode }
    }
}

impl ResourceReader for PingReader {
    fn read(&self, target: &str, timeout: Duration) -> ProbeOutput {
        if self.mode == PingMode::Simulated {
            return Ok("OK".to_string());
        }

        let received = ping_host(target, PING_COUNT, timeout).unwrap_or(0);
        if received >= PING_COUNT {
            Ok("OK".to_string())
        } else {
            Ok("FAILURE".to_string())
        }
    }
}

/// Run ping(8) against a host and return the received-packet count.
///
/// The child is killed and reaped if it outlives the timeout, which counts
/// as zero packets received.
fn ping_host(host: &str, count: u32, timeout: Duration) -> std::io::Result<u32> {
    let mut child = Command::new("ping")
        .arg("-c")
        .arg(count.to_string())
        .arg(host)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()?;

    let start = Instant::now();
    loop {
        match child.try_wait()? {
            Some(_status) => {
                let mut stdout = String::new();
                if let Some(mut out) = child.stdout.take() {
                    let _ = out.read_to_string(&mut stdout);
                }
                return Ok(packets_received(&stdout).unwrap_or(0));
            }
            None => {
                if start.elapsed() > timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Ok(0);
                }
                thread::sleep(Duration::from_millis(100));
            }
        }
    }
}

/// Parse the received-packet count from the ping(8) statistics line.
///
/// Handles both the Linux shape (`2 received`) and the BSD shape
/// (`2 packets received`).
fn packets_received(output: &str) -> Option<u32> {
    for line in output.lines() {
        if let Some(part) = line.split(',').find(|part| part.contains("received")) {
            return part.trim().split_whitespace().next()?.parse().ok();
        }
    }
    None
}
