//! Failure notification mail
//!
//! Builds the notification envelope for a failing application and delivers
//! it over plain SMTP to the configured relay.

use crate::error::{Error, Result};
use crate::manifest::{ApplicationSpec, WatcherSettings};
use chrono::{DateTime, Local};
use lettre::message::Mailbox;
use lettre::{Address, Message, SmtpTransport, Transport};
use std::net::ToSocketAddrs;

/// A notification mail ready for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Display name embedding the local host identity
    pub sender_name: String,
    /// Sender address (configured `email_from`)
    pub from: String,
    /// Recipient addresses
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

impl Envelope {
    /// Compose the failure notification for one application.
    ///
    /// Requires `email_from` to be configured and at least one recipient in
    /// the application's `notify_mail` list.
    pub fn compose(
        settings: &WatcherSettings,
        app: &ApplicationSpec,
        now: &DateTime<Local>,
    ) -> Result<Envelope> {
        let to: Vec<String> = app
            .notify_mail
            .as_deref()
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_string)
            .collect();
        if to.is_empty() {
            return Err(Error::ConfigValidation(format!(
                "Application '{}' has no notification recipients",
                app.name
            )));
        }

        let from = settings.email_from.clone().ok_or_else(|| {
            Error::ConfigValidation("email_from is not configured under [watcher]".into())
        })?;

        let (host, ip) = host_identity();
        let sender_name = format!("Lookout ({}, {})", host, ip);
        let subject = format!("{}: {} failure report", sender_name, app.name);

        let command = app
            .command
            .as_deref()
            .unwrap_or("(no restart command configured)");
        let body = format!(
            "Hello,\n\n\
             Lookout detected an application failure:\n\n\
             \x20   Application name: {}\n\
             \x20   Date: {}\n\n\
             Command '{}' has been executed to fix the problem.\n\n\
             --\n\
             {}\n",
            app.name,
            now.format("%Y-%m-%d %H:%M:%S"),
            command,
            sender_name
        );

        Ok(Envelope {
            sender_name,
            from,
            to,
            subject,
            body,
        })
    }
}

/// Local hostname and resolved address for the sender identity.
///
/// Falls back to localhost values when the host cannot identify itself;
/// notification delivery matters more than an exact identity line.
fn host_identity() -> (String, String) {
    let host = nix::unistd::gethostname()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "localhost".to_string());

    let ip = (host.as_str(), 0u16)
        .to_socket_addrs()
        .ok()
        .and_then(|mut addrs| addrs.next())
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "127.0.0.1".to_string());

    (host, ip)
}

/// Delivery capability for notification envelopes
pub trait MailTransport {
    fn send(&self, envelope: &Envelope) -> Result<()>;
}

/// Plain SMTP relay to the configured server, no TLS negotiation
pub struct SmtpMailer {
    server: String,
}

impl SmtpMailer {
    pub fn new(server: String) -> Self {
        Self { server }
    }
}

impl MailTransport for SmtpMailer {
    fn send(&self, envelope: &Envelope) -> Result<()> {
        let from = Mailbox::new(
            Some(envelope.sender_name.clone()),
            envelope.from.parse::<Address>()?,
        );

        let mut message = Message::builder()
            .from(from)
            .subject(envelope.subject.clone());
        for recipient in &envelope.to {
            message = message.to(recipient.parse::<Mailbox>()?);
        }
        let message = message.body(envelope.body.clone())?;

        let transport = SmtpTransport::builder_dangerous(self.server.as_str()).build();
        transport.send(&message).map_err(|e| Error::MailSend {
            server: self.server.clone(),
            source: e,
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(notify_mail: Option<&str>, command: Option<&str>) -> ApplicationSpec {
        ApplicationSpec {
            name: "webapp".to_string(),
            trigger: "url http://localhost:8080 contains: error".to_string(),
            command: command.map(str::to_string),
            log_file: None,
            notify_mail: notify_mail.map(str::to_string),
        }
    }

    fn settings(email_from: Option<&str>) -> WatcherSettings {
        WatcherSettings {
            email_from: email_from.map(str::to_string),
            ..WatcherSettings::default()
        }
    }

    #[test]
    fn test_compose_splits_recipients() {
        let envelope = Envelope::compose(
            &settings(Some("watchdog@example.com")),
            &app(Some("ops@example.com  oncall@example.com"), Some("/usr/bin/app restart")),
            &Local::now(),
        )
        .unwrap();

        assert_eq!(envelope.to, vec!["ops@example.com", "oncall@example.com"]);
        assert_eq!(envelope.from, "watchdog@example.com");
    }

    #[test]
    fn test_compose_templates() {
        let envelope = Envelope::compose(
            &settings(Some("watchdog@example.com")),
            &app(Some("ops@example.com"), Some("/usr/bin/app restart")),
            &Local::now(),
        )
        .unwrap();

        assert!(envelope.sender_name.starts_with("Lookout ("));
        assert!(envelope.subject.contains("webapp failure report"));
        assert!(envelope.body.contains("Application name: webapp"));
        assert!(envelope.body.contains("Command '/usr/bin/app restart'"));
    }

    #[test]
    fn test_compose_without_command_uses_placeholder() {
        let envelope = Envelope::compose(
            &settings(Some("watchdog@example.com")),
            &app(Some("ops@example.com"), None),
            &Local::now(),
        )
        .unwrap();

        assert!(envelope.body.contains("(no restart command configured)"));
    }

    #[test]
    fn test_compose_requires_email_from() {
        let err = Envelope::compose(
            &settings(None),
            &app(Some("ops@example.com"), None),
            &Local::now(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::ConfigValidation(_)));
    }

    #[test]
    fn test_compose_requires_recipients() {
        let err = Envelope::compose(
            &settings(Some("watchdog@example.com")),
            &app(Some("   "), None),
            &Local::now(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::ConfigValidation(_)));
    }
}
