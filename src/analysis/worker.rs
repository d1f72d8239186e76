// src/analysis/worker.rs
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use tracing::{debug, error};

use super::client::{AnalyzeError, Analyzer};
use super::submit::submit;
use crate::config::HistoryEntry;
use crate::input::ImageFile;

pub type SubmissionResult = Result<HistoryEntry, AnalyzeError>;

/// Runs one submission at a time off the UI thread.
pub struct AnalysisWorker {
    analyzer: Arc<dyn Analyzer>,
    pending: Option<Receiver<SubmissionResult>>,
}

impl AnalysisWorker {
    pub fn new(analyzer: Arc<dyn Analyzer>) -> Self {
        Self { analyzer, pending: None }
    }

    /// Takes effect for the next submission; one in flight keeps its analyzer.
    pub fn set_analyzer(&mut self, analyzer: Arc<dyn Analyzer>) {
        self.analyzer = analyzer;
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Returns `false` without doing anything while a submission is outstanding.
    /// `notify` runs on the worker thread once the result is ready.
    pub fn start(&mut self, image: ImageFile, notify: Box<dyn FnOnce() + Send>) -> bool {
        if self.is_busy() {
            debug!("Submission already in flight");
            return false;
        }

        let (tx, rx) = mpsc::channel();
        let analyzer = Arc::clone(&self.analyzer);
        thread::spawn(move || {
            let result = submit(analyzer.as_ref(), &image);
            let _ = tx.send(result);
            notify();
        });

        self.pending = Some(rx);
        true
    }

    /// Non-blocking; `Some` exactly once per started submission.
    pub fn poll(&mut self) -> Option<SubmissionResult> {
        let outcome = match self.pending.as_ref()?.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => {
                error!("Analysis worker disconnected unexpectedly");
                Err(AnalyzeError::Failed)
            }
        };
        self.pending = None;
        Some(outcome)
    }

    #[cfg(test)]
    pub fn wait(&mut self) -> Option<SubmissionResult> {
        let outcome = self
            .pending
            .take()?
            .recv()
            .unwrap_or(Err(AnalyzeError::Failed));
        Some(outcome)
    }
}
