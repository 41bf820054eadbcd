//! Scripted collector for tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use osreport_session::ProgressOutlet;
use osreport_types::{ProgressMessage, Report};

use crate::collector::Collector;
use crate::error::{CollectionError, Result};

#[derive(Debug, Clone)]
enum Outcome {
    Report(Report),
    Fail(String),
}

/// A collector that returns pre-configured outcomes.
///
/// Outcomes are returned in order; once the script is exhausted the last
/// outcome repeats. Both fetch methods share the script.
#[derive(Debug)]
pub struct MockCollector {
    name: String,
    script: Mutex<Vec<Outcome>>,
    progress: Vec<ProgressMessage>,
    delay: Option<Duration>,
    fetch_calls: AtomicUsize,
    progress_calls: AtomicUsize,
}

impl MockCollector {
    /// A collector that always returns `report`.
    pub fn new(report: Report) -> Self {
        Self::from_script(vec![Outcome::Report(report)])
    }

    /// A collector that returns each report once, in order.
    pub fn with_reports(reports: Vec<Report>) -> Self {
        Self::from_script(reports.into_iter().map(Outcome::Report).collect())
    }

    /// A collector that always fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::from_script(vec![Outcome::Fail(message.into())])
    }

    fn from_script(script: Vec<Outcome>) -> Self {
        Self {
            name: "mock".to_string(),
            script: Mutex::new(script),
            progress: Vec::new(),
            delay: None,
            fetch_calls: AtomicUsize::new(0),
            progress_calls: AtomicUsize::new(0),
        }
    }

    /// Events pushed by `fetch_all_with_progress` before it returns.
    pub fn with_progress(mut self, events: Vec<ProgressMessage>) -> Self {
        self.progress = events;
        self
    }

    /// Sleep for `delay` before every outcome.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `fetch_all` calls.
    pub fn fetch_count(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// Number of `fetch_all_with_progress` calls.
    pub fn progress_fetch_count(&self) -> usize {
        self.progress_calls.load(Ordering::SeqCst)
    }

    /// Total calls across both methods.
    pub fn total_calls(&self) -> usize {
        self.fetch_count() + self.progress_fetch_count()
    }

    async fn next_outcome(&self) -> Result<Report> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let outcome = {
            let mut script = self.script.lock().unwrap_or_else(|e| e.into_inner());
            if script.len() > 1 {
                script.remove(0)
            } else {
                script
                    .first()
                    .cloned()
                    .unwrap_or_else(|| Outcome::Fail("MockCollector: empty script".to_string()))
            }
        };

        match outcome {
            Outcome::Report(report) => Ok(report),
            Outcome::Fail(message) => Err(CollectionError::Backend(message)),
        }
    }
}

#[async_trait]
impl Collector for MockCollector {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_all(&self) -> Result<Report> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.next_outcome().await
    }

    async fn fetch_all_with_progress(&self, outlet: &ProgressOutlet) -> Result<Report> {
        self.progress_calls.fetch_add(1, Ordering::SeqCst);
        for event in &self.progress {
            outlet.try_push(event.clone());
        }
        self.next_outcome().await
    }
}
