use crate::core::idempotency::IdempotencyGuard;
use crate::core::resolver::{resolve_channels, Applicability, PlannedChannel};
use crate::core::template::ContentRenderer;
use crate::domain::model::{
    AdapterError, ApplicationAttempt, AttemptStatus, Channel, Company, Mode,
};
use crate::domain::ports::{AttemptLog, ChannelAdapter};
use crate::utils::error::Result;
use serde::Deserialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// What to record for a channel the mode requests but the company cannot
/// support. `Skip` is the default; `Fail` is the hard interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InapplicablePolicy {
    #[default]
    Skip,
    Fail,
}

/// Bounded retry with fixed or exponentially doubling backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
    pub exponential: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_secs(5),
            exponential: false,
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after `completed` failed attempts (1-based).
    pub fn delay_after(&self, completed: u32) -> Duration {
        if self.exponential {
            let factor = 2u32.saturating_pow(completed.saturating_sub(1).min(16));
            self.backoff.saturating_mul(factor)
        } else {
            self.backoff
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub mode: Mode,
    pub dry_run: bool,
    pub retry: RetryPolicy,
    pub on_inapplicable: InapplicablePolicy,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            mode: Mode::Both,
            dry_run: false,
            retry: RetryPolicy::default(),
            on_inapplicable: InapplicablePolicy::default(),
        }
    }
}

/// Counts of terminal outcomes for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub companies: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub dry_run: usize,
    pub cancelled: bool,
}

impl RunReport {
    fn tally(&mut self, status: AttemptStatus) {
        match status {
            AttemptStatus::Succeeded => self.succeeded += 1,
            AttemptStatus::Failed => self.failed += 1,
            AttemptStatus::Skipped => self.skipped += 1,
            AttemptStatus::DryRun => self.dry_run += 1,
        }
    }

    pub fn records(&self) -> usize {
        self.succeeded + self.failed + self.skipped + self.dry_run
    }
}

/// Per-company, per-channel processing engine.
///
/// Companies are processed strictly sequentially, channels within a company
/// in resolver order. Every channel reaching a terminal state appends exactly
/// one log record immediately; a log append failure aborts the whole run.
pub struct OutreachEngine<L: AttemptLog> {
    adapters: Vec<Box<dyn ChannelAdapter>>,
    renderer: ContentRenderer,
    guard: IdempotencyGuard,
    log: L,
    options: EngineOptions,
    shutdown: Arc<AtomicBool>,
}

impl<L: AttemptLog> OutreachEngine<L> {
    pub fn new(
        adapters: Vec<Box<dyn ChannelAdapter>>,
        renderer: ContentRenderer,
        guard: IdempotencyGuard,
        log: L,
        options: EngineOptions,
    ) -> Self {
        Self {
            adapters,
            renderer,
            guard,
            log,
            options,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Honored only at company boundaries; an in-flight attempt always runs
    /// to its terminal state.
    pub fn with_shutdown(mut self, shutdown: Arc<AtomicBool>) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn log(&self) -> &L {
        &self.log
    }

    pub async fn run(&mut self, companies: &[Company]) -> Result<RunReport> {
        let mut report = RunReport::default();

        for company in companies {
            if self.shutdown.load(Ordering::Relaxed) {
                tracing::warn!("🛑 Cancellation requested, stopping before {}", company.name);
                report.cancelled = true;
                break;
            }

            tracing::debug!("Processing {}", company.name);
            for planned in resolve_channels(self.options.mode, company) {
                let status = self.process_channel(company, planned).await?;
                report.tally(status);
            }
            report.companies += 1;
        }

        self.log.flush()?;
        Ok(report)
    }

    async fn process_channel(
        &mut self,
        company: &Company,
        planned: PlannedChannel,
    ) -> Result<AttemptStatus> {
        let channel = planned.channel;

        if planned.applicability == Applicability::MissingField {
            let status = match self.options.on_inapplicable {
                InapplicablePolicy::Skip => AttemptStatus::Skipped,
                InapplicablePolicy::Fail => AttemptStatus::Failed,
            };
            return self.finish(company, channel, status, "missing target field");
        }

        if self.guard.already_succeeded(&company.name, channel) {
            return self.finish(company, channel, AttemptStatus::Skipped, "already sent");
        }

        // Rendered even in dry-run mode so template errors surface.
        let content = match self.renderer.render(channel, company) {
            Ok(content) => content,
            Err(e) => {
                return self.finish(
                    company,
                    channel,
                    AttemptStatus::Failed,
                    format!("template error: {e}"),
                )
            }
        };

        if self.options.dry_run {
            return self.finish(company, channel, AttemptStatus::DryRun, "");
        }

        let retry = self.options.retry;
        let Some(adapter) = self.adapters.iter().find(|a| a.channel() == channel) else {
            return self.finish(
                company,
                channel,
                AttemptStatus::Failed,
                "no adapter registered",
            );
        };

        // Explicit bounded loop so retry accounting stays inspectable.
        let max_attempts = retry.max_attempts.max(1);
        let mut attempt = 1;
        let (status, detail) = loop {
            match adapter.deliver(company, &content).await {
                Ok(delivery) => break (AttemptStatus::Succeeded, delivery.detail),
                Err(AdapterError::Fatal(reason)) => break (AttemptStatus::Failed, reason),
                Err(AdapterError::Retryable(reason)) => {
                    if attempt >= max_attempts {
                        break (
                            AttemptStatus::Failed,
                            format!("{reason} (after {attempt} attempts)"),
                        );
                    }
                    let delay = retry.delay_after(attempt);
                    tracing::warn!(
                        "⏳ {} -> {}: attempt {}/{} failed ({}), retrying in {:.1}s",
                        channel,
                        company.name,
                        attempt,
                        max_attempts,
                        reason,
                        delay.as_secs_f64()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        };

        if status == AttemptStatus::Succeeded {
            self.guard.mark_succeeded(&company.name, channel);
        }
        self.finish(company, channel, status, detail)
    }

    /// Append the terminal record. The append happening here, immediately,
    /// is what bounds the blast radius of an interruption.
    fn finish(
        &mut self,
        company: &Company,
        channel: Channel,
        status: AttemptStatus,
        detail: impl Into<String>,
    ) -> Result<AttemptStatus> {
        let detail = detail.into();
        let attempt = ApplicationAttempt::new(company.name.clone(), channel, status, detail.clone());
        self.log.append(&attempt)?;

        match status {
            AttemptStatus::Succeeded => {
                tracing::info!("✅ {} -> {} [succeeded] {}", channel, company.name, detail)
            }
            AttemptStatus::Failed => {
                tracing::error!("❌ {} -> {}: {}", channel, company.name, detail)
            }
            AttemptStatus::Skipped => {
                tracing::info!("⏭️ {} -> {}: skipped ({})", channel, company.name, detail)
            }
            AttemptStatus::DryRun => {
                tracing::info!("🔍 {} -> {}: dry run", channel, company.name)
            }
        }
        Ok(status)
    }
}
