//! The Watcher - check/repair orchestrator
//!
//! Evaluates every configured application in declaration order, accumulates
//! the failing ones, and optionally runs the repair actions over them.
//! Failures are contained at the smallest scope: a broken trigger skips one
//! application, a broken repair action skips one action.

use crate::error::Result;
use crate::mail::{Envelope, MailTransport, SmtpMailer};
use crate::manifest::{ApplicationSpec, LookoutConfig};
use crate::probe::ProbeSet;
use crate::repair::{self, CommandSpawner, ShellSpawner};
use crate::trigger::Trigger;
use chrono::Local;
use std::time::Duration;

/// The Watcher
pub struct Watcher {
    config: LookoutConfig,
    probes: ProbeSet,
    mailer: Box<dyn MailTransport>,
    spawner: Box<dyn CommandSpawner>,
    failures: Vec<ApplicationSpec>,
    verbose: bool,
}

impl Watcher {
    /// Create a Watcher wired to the production readers, mailer and spawner
    pub fn new(config: LookoutConfig) -> Self {
        let probes = ProbeSet::production(config.watcher.ping_mode);
        let mailer = Box::new(SmtpMailer::new(config.watcher.smtp_server.clone()));
        Self {
            config,
            probes,
            mailer,
            spawner: Box::new(ShellSpawner),
            failures: Vec::new(),
            verbose: false,
        }
    }

    /// Enable verbose output
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Applications whose trigger fired during the last run, in declaration
    /// order
    pub fn failures(&self) -> &[ApplicationSpec] {
        &self.failures
    }

    /// Check every application; with `repair`, run the repair actions over
    /// the accumulated failures afterwards.
    ///
    /// Never aborts: configuration errors in a single trigger are reported
    /// and that application is skipped.
    pub fn run(&mut self, repair: bool) {
        self.failures.clear();

        for idx in 0..self.config.applications.len() {
            let app = self.config.applications[idx].clone();
            match self.check(&app) {
                Ok(true) => {
                    if self.verbose {
                        println!("'{}': trigger fired", app.name);
                    }
                    self.failures.push(app);
                }
                Ok(false) => {
                    if self.verbose {
                        println!("'{}': healthy", app.name);
                    }
                }
                Err(e) => {
                    eprintln!("lookout error: skipping '{}': {}", app.name, e);
                }
            }
        }

        if repair {
            let failed = self.failures.clone();
            for app in &failed {
                self.repair(app);
            }
        }
    }

    /// Evaluate one application's trigger.
    ///
    /// A probe I/O failure is folded into the probe text so the trigger can
    /// match against the error description; only a malformed trigger is an
    /// error here.
    fn check(&self, app: &ApplicationSpec) -> Result<bool> {
        let trigger = Trigger::parse(&app.trigger)?;
        let timeout = Duration::from_secs(self.config.watcher.probe_timeout);

        let observed = match self.probes.reader(trigger.kind).read(&trigger.target, timeout) {
            Ok(body) => body,
            Err(description) => description,
        };

        Ok(trigger.verdict(&observed))
    }

    /// Run the three repair actions for one failing application.
    ///
    /// Each action is gated by its own config field and isolated: an error
    /// is reported and the next action still runs.
    fn repair(&self, app: &ApplicationSpec) {
        let now = Local::now();

        if let Some(log_file) = &app.log_file {
            if let Err(e) = repair::append_failure_log(log_file, &app.name, &now) {
                eprintln!("lookout error: {}", e);
            }
        }

        if let Some(recipients) = &app.notify_mail {
            let sent = Envelope::compose(&self.config.watcher, app, &now)
                .and_then(|envelope| self.mailer.send(&envelope));
            if let Err(e) = sent {
                eprintln!(
                    "lookout error: unable to notify {} about '{}': {}",
                    recipients, app.name, e
                );
            }
        }

        if let Some(command) = &app.command {
            if let Err(e) = self.spawner.spawn(command) {
                eprintln!("lookout error: {}", e);
            }
        }
    }
}

#[cfg(test)]
impl Watcher {
    /// Create a Watcher with explicit collaborators
    pub fn with_collaborators(
        config: LookoutConfig,
        probes: ProbeSet,
        mailer: Box<dyn MailTransport>,
        spawner: Box<dyn CommandSpawner>,
    ) -> Self {
        Self {
            config,
            probes,
            mailer,
            spawner,
            failures: Vec::new(),
            verbose: false,
        }
    }
}
