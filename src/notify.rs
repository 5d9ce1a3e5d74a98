//! Desktop notifications for probe start and status changes.
//!
//! Notifications go through the platform's command line notifier. A missing
//! notifier is not an error; the event is still in the tracing output.

use std::io::ErrorKind;
use tokio::process::Command;

pub const NOTIFICATION_TITLE: &str = "Epoch Dashboard";
pub const START_MESSAGE: &str = "Dashboard has started";

pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, message: &str);
}

/// Notifier that discards everything, for `--no-notify`
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Notifier for Silent {
    fn notify(&self, _title: &str, _message: &str) {}
}

/// Spawns the first available platform notifier without waiting for it
#[derive(Debug, Default, Clone, Copy)]
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn notify(&self, title: &str, message: &str) {
        for (program, args) in notifier_commands(title, message) {
            match Command::new(program).args(&args).spawn() {
                Ok(_) => return,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => {
                    tracing::debug!(program, "notifier failed: {}", e);
                    return;
                }
            }
        }
        tracing::debug!("no desktop notifier available");
    }
}

/// Candidate notifier invocations for this platform, most preferred first
pub fn notifier_commands(title: &str, message: &str) -> Vec<(&'static str, Vec<String>)> {
    if cfg!(target_os = "macos") {
        let script = format!(
            "display notification \"{}\" with title \"{}\"",
            applescript_quote(message),
            applescript_quote(title)
        );
        vec![
            (
                "terminal-notifier",
                vec![
                    "-title".to_string(),
                    title.to_string(),
                    "-message".to_string(),
                    message.to_string(),
                ],
            ),
            ("osascript", vec!["-e".to_string(), script]),
        ]
    } else if cfg!(unix) {
        vec![("notify-send", vec![title.to_string(), message.to_string()])]
    } else {
        Vec::new()
    }
}

fn applescript_quote(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('"', "\\\"")
}

pub fn change_message(service: &str, status: &str) -> String {
    format!("{service} is now {status}")
}
