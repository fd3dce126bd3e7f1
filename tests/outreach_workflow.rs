//! End-to-end engine runs against a real CSV audit log: rerun idempotency,
//! dry-run behavior and validator exclusion.

use async_trait::async_trait;
use auto_apply::adapters::log_csv::CsvAttemptLog;
use auto_apply::adapters::roster;
use auto_apply::core::engine::{EngineOptions, OutreachEngine, RetryPolicy, RunReport};
use auto_apply::core::idempotency::IdempotencyGuard;
use auto_apply::core::template::ContentRenderer;
use auto_apply::domain::model::{
    AdapterError, AttemptStatus, Channel, Company, Delivery, Mode, OutreachContent,
};
use auto_apply::domain::ports::ChannelAdapter;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

struct CountingAdapter {
    channel: Channel,
    calls: Arc<AtomicUsize>,
}

impl CountingAdapter {
    fn new(channel: Channel) -> (Box<Self>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Box::new(Self {
                channel,
                calls: Arc::clone(&calls),
            }),
            calls,
        )
    }
}

#[async_trait]
impl ChannelAdapter for CountingAdapter {
    fn channel(&self) -> Channel {
        self.channel
    }

    async fn deliver(
        &self,
        _company: &Company,
        _content: &OutreachContent,
    ) -> Result<Delivery, AdapterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Delivery::new("sent"))
    }
}

fn renderer() -> ContentRenderer {
    let mut base = HashMap::new();
    base.insert("first_name".to_string(), "Jane".to_string());
    base.insert("last_name".to_string(), "Doe".to_string());
    ContentRenderer::new(
        base,
        "Application — {company}",
        "Hello {contact_name_or_team}, {intro_note}",
        "Hello, I am applying. {intro_note}",
        "the hiring team",
    )
}

fn companies() -> Vec<Company> {
    vec![
        Company {
            name: "ACME".to_string(),
            contact_email: Some("jobs@acme.com".to_string()),
            apply_url: None,
            contact_name: None,
            intro_note: None,
        },
        Company {
            name: "BetaSoft".to_string(),
            contact_email: None,
            apply_url: Some("https://betasoft.com/apply".to_string()),
            contact_name: None,
            intro_note: None,
        },
    ]
}

fn options(dry_run: bool) -> EngineOptions {
    EngineOptions {
        mode: Mode::Both,
        dry_run,
        retry: RetryPolicy {
            max_attempts: 3,
            backoff: Duration::ZERO,
            exponential: false,
        },
        ..EngineOptions::default()
    }
}

async fn run_once(
    log_path: &Path,
    targets: &[Company],
    dry_run: bool,
) -> (RunReport, Arc<AtomicUsize>, Arc<AtomicUsize>) {
    let (log, history) = CsvAttemptLog::open(log_path).unwrap();
    let (email, email_calls) = CountingAdapter::new(Channel::Email);
    let (form, form_calls) = CountingAdapter::new(Channel::Form);

    let mut engine = OutreachEngine::new(
        vec![email, form],
        renderer(),
        IdempotencyGuard::from_history(&history),
        log,
        options(dry_run),
    );
    let report = engine.run(targets).await.unwrap();
    (report, email_calls, form_calls)
}

#[tokio::test]
async fn rerunning_an_identical_run_sends_nothing_twice() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("applications_log.csv");
    let targets = companies();

    let (first, email_calls, form_calls) = run_once(&log_path, &targets, false).await;
    assert_eq!(first.succeeded, 2);
    assert_eq!(first.skipped, 2);
    assert_eq!(email_calls.load(Ordering::SeqCst), 1);
    assert_eq!(form_calls.load(Ordering::SeqCst), 1);

    let (second, email_calls, form_calls) = run_once(&log_path, &targets, false).await;
    assert_eq!(second.succeeded, 0);
    assert_eq!(second.skipped, 4);
    assert_eq!(email_calls.load(Ordering::SeqCst), 0);
    assert_eq!(form_calls.load(Ordering::SeqCst), 0);

    // The log keeps one record per channel per run, but never a second
    // Succeeded for the same (company, channel) pair.
    let (_, history) = CsvAttemptLog::open(&log_path).unwrap();
    assert_eq!(history.len(), 8);
    let mut succeeded = HashMap::new();
    for record in &history {
        if record.status == AttemptStatus::Succeeded {
            *succeeded
                .entry((record.company.clone(), record.channel))
                .or_insert(0) += 1;
        }
    }
    assert!(succeeded.values().all(|&count| count == 1));

    let rerun_details: Vec<_> = history[4..].iter().map(|r| r.detail.as_str()).collect();
    assert_eq!(
        rerun_details,
        vec![
            "already sent",
            "missing target field",
            "missing target field",
            "already sent"
        ]
    );
}

#[tokio::test]
async fn dry_run_records_every_applicable_channel_without_sending() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("applications_log.csv");
    let targets = companies();

    let (report, email_calls, form_calls) = run_once(&log_path, &targets, true).await;

    assert_eq!(report.dry_run, 2);
    assert_eq!(report.skipped, 2);
    assert_eq!(email_calls.load(Ordering::SeqCst), 0);
    assert_eq!(form_calls.load(Ordering::SeqCst), 0);

    let (_, history) = CsvAttemptLog::open(&log_path).unwrap();
    let dry_runs: Vec<_> = history
        .iter()
        .filter(|r| r.status == AttemptStatus::DryRun)
        .map(|r| (r.company.as_str(), r.channel))
        .collect();
    assert_eq!(
        dry_runs,
        vec![("ACME", Channel::Email), ("BetaSoft", Channel::Form)]
    );
}

#[tokio::test]
async fn dry_run_does_not_block_a_later_real_run() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("applications_log.csv");
    let targets = companies();

    run_once(&log_path, &targets, true).await;
    let (report, email_calls, form_calls) = run_once(&log_path, &targets, false).await;

    assert_eq!(report.succeeded, 2);
    assert_eq!(email_calls.load(Ordering::SeqCst), 1);
    assert_eq!(form_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn invalid_roster_rows_never_reach_the_log() {
    let dir = tempfile::tempdir().unwrap();
    let roster_path = dir.path().join("companies.csv");
    let log_path = dir.path().join("applications_log.csv");

    let mut file = std::fs::File::create(&roster_path).unwrap();
    file.write_all(
        b"company,contact_email,apply_url,contact_name,intro_note\n\
          ACME,jobs@acme.com,,,\n\
          NoTarget,,,,\n\
          BetaSoft,,https://betasoft.com/apply,,\n",
    )
    .unwrap();

    let targets = roster::read_companies(&roster_path).unwrap();
    assert_eq!(targets.len(), 2);

    run_once(&log_path, &targets, false).await;

    let (_, history) = CsvAttemptLog::open(&log_path).unwrap();
    assert!(!history.is_empty());
    assert!(history.iter().all(|r| r.company != "NoTarget"));
}
