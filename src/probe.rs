//! TCP reachability probe that writes the markdown status log.
//!
//! This is the producer side of the services view: every pass connects to
//! each configured endpoint and appends `| time | service | status | last seen |`
//! rows. Stamps are written in UTC.

use crate::error::Result;
use crate::localtime::to_log_stamp;
use crate::notify::{
    DesktopNotifier, NOTIFICATION_TITLE, Notifier, START_MESSAGE, change_message,
};
use crate::status::{LastSeen, LogRow, ServiceStatus};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::{MissedTickBehavior, interval, timeout};
use tokio_util::sync::CancellationToken;

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(1);
pub const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_secs(10);

const TABLE_HEADER: &str =
    "| Time | Service | Status | Last Seen |\n| ---- | ------- | ------ | --------- |\n";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProbeTarget {
    pub name: String,
    pub host: String,
    pub port: u16,
}

impl ProbeTarget {
    pub fn new(name: &str, host: &str, port: u16) -> Self {
        Self {
            name: name.to_string(),
            host: host.to_string(),
            port,
        }
    }
}

pub fn default_probes() -> Vec<ProbeTarget> {
    vec![
        ProbeTarget::new("Website", "198.185.159.145", 80),
        ProbeTarget::new("Auth Server", "198.244.165.233", 3724),
        ProbeTarget::new("Kezan (PvE)", "198.244.165.233", 8085),
        ProbeTarget::new("Gurubashi (PvP)", "198.244.165.233", 8086),
        ProbeTarget::new("Cloudflare", "1.1.1.1", 443),
    ]
}

/// Whether a TCP connection to `host:port` opens within `limit`
pub async fn check_port(host: &str, port: u16, limit: Duration) -> bool {
    matches!(
        timeout(limit, TcpStream::connect((host, port))).await,
        Ok(Ok(_))
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeMode {
    /// Log every service on every pass
    Once,
    /// Log only status changes after the first pass
    Watch,
}

#[derive(Debug, Default)]
pub struct ProbeState {
    last_seen: HashMap<String, String>,
    previous: HashMap<String, bool>,
}

impl ProbeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_seen(&self, name: &str) -> LastSeen {
        self.last_seen
            .get(name)
            .map(|s| LastSeen::At(s.clone()))
            .unwrap_or(LastSeen::NotAvailable)
    }

    /// Record one check result and return the row to log, if any.
    pub fn observe(
        &mut self,
        mode: ProbeMode,
        name: &str,
        online: bool,
        now: DateTime<Utc>,
    ) -> Option<LogRow> {
        let stamp = to_log_stamp(now);
        let previous = self.previous.insert(name.to_string(), online);

        let log = match mode {
            ProbeMode::Once => {
                if online {
                    self.last_seen.insert(name.to_string(), stamp.clone());
                }
                true
            }
            ProbeMode::Watch => match previous {
                None => {
                    if online {
                        self.last_seen.insert(name.to_string(), stamp.clone());
                    }
                    false
                }
                Some(was_online) if was_online != online => {
                    if online {
                        self.last_seen.insert(name.to_string(), stamp.clone());
                    }
                    true
                }
                Some(_) => false,
            },
        };

        log.then(|| LogRow {
            time: stamp,
            service: name.to_string(),
            status: if online {
                ServiceStatus::Online
            } else {
                ServiceStatus::Offline
            },
            last_seen: self.last_seen(name),
        })
    }
}

#[derive(Debug, Clone)]
pub struct StatusLogWriter {
    path: PathBuf,
}

impl StatusLogWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append rows, writing the table header first when the file is new
    pub async fn append(&self, rows: &[LogRow]) -> Result<()> {
        let is_new = !tokio::fs::try_exists(&self.path).await?;

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        let mut out = String::new();
        if is_new {
            out.push_str(TABLE_HEADER);
        }
        for row in rows {
            out.push_str(&row.to_line());
            out.push('\n');
        }

        file.write_all(out.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

pub struct Prober {
    targets: Vec<ProbeTarget>,
    limit: Duration,
    writer: StatusLogWriter,
    state: ProbeState,
    notifier: Box<dyn Notifier>,
}

impl Prober {
    pub fn new(targets: Vec<ProbeTarget>, limit: Duration, writer: StatusLogWriter) -> Self {
        Self {
            targets,
            limit,
            writer,
            state: ProbeState::new(),
            notifier: Box::new(DesktopNotifier),
        }
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    /// Check every target once and append the resulting rows
    pub async fn run_pass(&mut self, mode: ProbeMode) -> Result<Vec<LogRow>> {
        let mut rows = Vec::new();

        for target in &self.targets {
            let online = check_port(&target.host, target.port, self.limit).await;
            tracing::debug!(service = %target.name, online, "checked");

            if let Some(row) = self.state.observe(mode, &target.name, online, Utc::now()) {
                if mode == ProbeMode::Watch {
                    tracing::info!(
                        service = %row.service,
                        status = %row.status,
                        "service status changed"
                    );
                    let message = change_message(&row.service, row.status.label());
                    self.notifier.notify(NOTIFICATION_TITLE, &message);
                }
                rows.push(row);
            }
        }

        // Once mode always writes, so a fresh log still gets its header
        if !rows.is_empty() || mode == ProbeMode::Once {
            self.writer.append(&rows).await?;
        }

        Ok(rows)
    }

    /// Keep probing every `every` until cancelled
    pub async fn watch(&mut self, every: Duration, cancel: CancellationToken) -> Result<()> {
        tracing::info!(
            targets = self.targets.len(),
            log = %self.writer.path().display(),
            "dashboard probe started"
        );
        self.notifier.notify(NOTIFICATION_TITLE, START_MESSAGE);

        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }
            self.run_pass(ProbeMode::Watch).await?;
        }

        Ok(())
    }
}
