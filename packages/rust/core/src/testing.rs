//! Test doubles shared by the core tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use camara_generative::{GenerateObjectRequest, StructuredObject, TextGenerator};
use camara_shared::{CamaraError, Operation, Procedure, PropositionId, Result};

use crate::enrichment::ProcedureSource;
use crate::pipeline::{ProgressReporter, Step};

/// Generator that replays one canned answer and records every request.
pub(crate) struct ScriptedGenerator {
    answer: Option<Value>,
    fail: bool,
    calls: AtomicUsize,
    requests: Mutex<Vec<GenerateObjectRequest>>,
}

impl ScriptedGenerator {
    fn build(answer: Option<Value>, fail: bool) -> Arc<Self> {
        Arc::new(Self {
            answer,
            fail,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn returning(answer: Value) -> Arc<Self> {
        Self::build(Some(answer), false)
    }

    /// Succeeds without a structured object.
    pub(crate) fn empty() -> Arc<Self> {
        Self::build(None, false)
    }

    pub(crate) fn failing() -> Arc<Self> {
        Self::build(None, true)
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn last_request(&self) -> Option<GenerateObjectRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate_object(
        &self,
        request: &GenerateObjectRequest,
    ) -> Result<Option<StructuredObject>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        if self.fail {
            return Err(CamaraError::Generation("HTTP 500: scripted failure".into()));
        }
        Ok(self.answer.as_ref().and_then(Value::as_object).cloned())
    }
}

/// Procedure source returning a fixed list.
pub(crate) struct StaticProcedures(Vec<Procedure>);

impl StaticProcedures {
    pub(crate) fn new(procedures: Vec<Procedure>) -> ProcedureSource {
        Arc::new(Self(procedures))
    }
}

#[async_trait]
impl Operation for StaticProcedures {
    type Input = PropositionId;
    type Output = Vec<Procedure>;

    fn name(&self) -> &'static str {
        "procedures"
    }

    async fn run(&self, _id: PropositionId) -> Result<Vec<Procedure>> {
        Ok(self.0.clone())
    }
}

/// Progress reporter that records settled steps and the final failure count.
#[derive(Default)]
pub(crate) struct RecordingProgress {
    steps: Mutex<Vec<(Step, bool)>>,
    done: Mutex<Option<usize>>,
}

impl RecordingProgress {
    pub(crate) fn settled(&self) -> Vec<(Step, bool)> {
        self.steps.lock().unwrap().clone()
    }

    pub(crate) fn done_with(&self) -> Option<usize> {
        *self.done.lock().unwrap()
    }
}

impl ProgressReporter for RecordingProgress {
    fn stage(&self, _index: usize, _total: usize, _steps: &[Step]) {}

    fn step_done(&self, step: Step, ok: bool) {
        self.steps.lock().unwrap().push((step, ok));
    }

    fn done(&self, failures: usize) {
        *self.done.lock().unwrap() = Some(failures);
    }
}
