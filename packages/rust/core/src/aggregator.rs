//! Composite aggregation: run a pipeline description's stages and merge
//! every step's output into one [`Collected`] record.
//!
//! Each stage fans its steps out concurrently within the calling task and
//! waits for all of them to settle; nothing is cancelled. The
//! [`AggregationPolicy`] then decides whether a failed step fails the call
//! or is recorded next to the parts that succeeded.

use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tracing::{info, instrument, warn};

use camara_generative::TextGenerator;
use camara_opendata::{FetchAuthors, FetchProcedures, FetchProposition, FetchThemes, OpenDataClient};
use camara_shared::{
    AggregationPolicy, AppConfig, Author, CamaraError, CompositeRecord, Explanation, Operation,
    Procedure, ProcedureAnalysis, Proposition, PropositionId, Result, Theme,
};

use crate::enrichment::{ExplanationEnricher, ProcedureAnalysisEnricher};
use crate::ordering::{sort_authors, sort_procedures_desc};
use crate::pipeline::{PipelineDescription, ProgressReporter, Step};

/// A shared fetcher keyed by proposition id.
pub type SharedFetch<T> = Arc<dyn Operation<Input = PropositionId, Output = T>>;

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// A part that failed or was skipped under the best-effort policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartFailure {
    pub part: Step,
    pub error: String,
}

/// Everything a pipeline run produced. Parts the description did not
/// request, or that failed, stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Collected {
    pub proposition: Option<Proposition>,
    pub authors: Option<Vec<Author>>,
    pub procedures: Option<Vec<Procedure>>,
    pub themes: Option<Vec<Theme>>,
    pub explanation: Option<Explanation>,
    pub procedure_analysis: Option<ProcedureAnalysis>,
    pub failures: Vec<PartFailure>,
}

impl Collected {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failure(&self, part: Step) -> Option<&PartFailure> {
        self.failures.iter().find(|f| f.part == part)
    }

    /// Convert into a [`CompositeRecord`]. Requires the proposition and
    /// explanation parts; missing sequences become empty.
    pub fn into_composite(self) -> Result<CompositeRecord> {
        let (Some(proposition), Some(explanation)) = (self.proposition, self.explanation) else {
            return Err(CamaraError::validation(
                "composite record requires proposition and explanation parts",
            ));
        };
        Ok(CompositeRecord {
            proposition,
            authors: self.authors.unwrap_or_default(),
            procedures: self.procedures.unwrap_or_default(),
            themes: self.themes.unwrap_or_default(),
            explanation,
        })
    }

    fn absorb(&mut self, output: StepOutput) {
        match output {
            StepOutput::Proposition(p) => self.proposition = Some(p),
            StepOutput::Authors(a) => self.authors = Some(a),
            StepOutput::Procedures(p) => self.procedures = Some(p),
            StepOutput::Themes(t) => self.themes = Some(t),
            StepOutput::Explanation(e) => self.explanation = Some(e),
            StepOutput::Analysis(a) => self.procedure_analysis = Some(a),
        }
    }
}

enum StepOutput {
    Proposition(Proposition),
    Authors(Vec<Author>),
    Procedures(Vec<Procedure>),
    Themes(Vec<Theme>),
    Explanation(Explanation),
    Analysis(ProcedureAnalysis),
}

// ---------------------------------------------------------------------------
// Aggregator
// ---------------------------------------------------------------------------

/// Runs pipeline descriptions against the fetchers and enrichers it holds.
#[derive(Clone)]
pub struct Aggregator {
    proposition: SharedFetch<Proposition>,
    authors: SharedFetch<Vec<Author>>,
    procedures: SharedFetch<Vec<Procedure>>,
    themes: SharedFetch<Vec<Theme>>,
    explanation: Option<ExplanationEnricher>,
    analysis: Option<ProcedureAnalysisEnricher>,
    policy: AggregationPolicy,
}

impl Aggregator {
    /// Fetch-only aggregator over an open-data client.
    pub fn new(client: &OpenDataClient, policy: AggregationPolicy) -> Self {
        Self {
            proposition: Arc::new(FetchProposition::new(client.clone())),
            authors: Arc::new(FetchAuthors::new(client.clone())),
            procedures: Arc::new(FetchProcedures::new(client.clone())),
            themes: Arc::new(FetchThemes::new(client.clone())),
            explanation: None,
            analysis: None,
            policy,
        }
    }

    /// Aggregator with both enrichers wired to `generator` when one is
    /// given, using the policies from `config`.
    pub fn from_config(
        client: &OpenDataClient,
        generator: Option<Arc<dyn TextGenerator>>,
        config: &AppConfig,
    ) -> Self {
        let aggregator = Self::new(client, config.pipeline.policy);
        let Some(generator) = generator else {
            return aggregator;
        };

        let explanation =
            ExplanationEnricher::new(generator.clone(), config.pipeline.explanation_on_missing);
        let analysis = ProcedureAnalysisEnricher::new(
            aggregator.procedures.clone(),
            generator,
            config.generative.analysis_temperature,
            config.pipeline.analysis_on_missing,
        );
        aggregator.with_explanation(explanation).with_analysis(analysis)
    }

    pub fn with_explanation(mut self, enricher: ExplanationEnricher) -> Self {
        self.explanation = Some(enricher);
        self
    }

    pub fn with_analysis(mut self, enricher: ProcedureAnalysisEnricher) -> Self {
        self.analysis = Some(enricher);
        self
    }

    pub fn with_policy(mut self, policy: AggregationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Run `description` for proposition `id`.
    ///
    /// Under fail-fast the first failing step of a stage (in declared order)
    /// fails the call once the whole stage has settled, and later stages do
    /// not run. Under best-effort failures are collected and dependent steps
    /// are recorded as failed without running.
    #[instrument(skip_all, fields(id = %id, pipeline = %description.name, policy = ?self.policy))]
    pub async fn run(
        &self,
        description: &PipelineDescription,
        id: PropositionId,
        progress: &dyn ProgressReporter,
    ) -> Result<Collected> {
        description.validate()?;
        self.check_enrichers(description)?;

        let mut collected = Collected::default();
        let total = description.stages.len();

        for (index, stage) in description.stages.iter().enumerate() {
            progress.stage(index + 1, total, &stage.steps);
            info!(stage = index + 1, steps = stage.steps.len(), "running stage");

            let outcomes = join_all(
                stage
                    .steps
                    .iter()
                    .map(|&step| self.run_step(step, id, &collected)),
            )
            .await;

            let mut first_error: Option<CamaraError> = None;
            let mut stage_failures = 0;
            for (&step, outcome) in stage.steps.iter().zip(outcomes) {
                progress.step_done(step, outcome.is_ok());
                match outcome {
                    Ok(output) => collected.absorb(output),
                    Err(e) => {
                        stage_failures += 1;
                        warn!(part = %step, error = %e, "pipeline step failed");
                        match self.policy {
                            AggregationPolicy::FailFast => {
                                first_error.get_or_insert(e);
                            }
                            AggregationPolicy::BestEffort => {
                                collected.failures.push(PartFailure {
                                    part: step,
                                    error: e.to_string(),
                                });
                            }
                        }
                    }
                }
            }

            if let Some(e) = first_error {
                progress.done(stage_failures);
                return Err(e);
            }
        }

        if let Some(authors) = collected.authors.as_mut() {
            sort_authors(authors);
        }
        if let Some(procedures) = collected.procedures.as_mut() {
            sort_procedures_desc(procedures);
        }

        progress.done(collected.failures.len());
        info!(failures = collected.failures.len(), "pipeline complete");
        Ok(collected)
    }

    fn check_enrichers(&self, description: &PipelineDescription) -> Result<()> {
        for step in description.steps() {
            let wired = match step {
                Step::Explain => self.explanation.is_some(),
                Step::AnalyzeProcedures => self.analysis.is_some(),
                _ => true,
            };
            if !wired {
                return Err(CamaraError::config(format!(
                    "step `{step}` needs a generative service; configure an API key"
                )));
            }
        }
        Ok(())
    }

    async fn run_step(
        &self,
        step: Step,
        id: PropositionId,
        collected: &Collected,
    ) -> Result<StepOutput> {
        match step {
            Step::Proposition => self.proposition.run(id).await.map(StepOutput::Proposition),
            Step::Authors => self.authors.run(id).await.map(StepOutput::Authors),
            Step::Procedures => self.procedures.run(id).await.map(StepOutput::Procedures),
            Step::Themes => self.themes.run(id).await.map(StepOutput::Themes),
            Step::Explain => {
                let enricher = self
                    .explanation
                    .as_ref()
                    .ok_or_else(|| CamaraError::config("explanation enricher not configured"))?;
                let proposition = collected
                    .proposition
                    .as_ref()
                    .ok_or_else(|| skipped(step, Step::Proposition))?;
                enricher
                    .explain(proposition.explanation_source())
                    .await
                    .map(StepOutput::Explanation)
            }
            Step::AnalyzeProcedures => {
                let enricher = self
                    .analysis
                    .as_ref()
                    .ok_or_else(|| CamaraError::config("analysis enricher not configured"))?;
                let analysis = match &collected.procedures {
                    Some(procedures) => enricher.analyze_procedures(procedures.clone()).await,
                    None => enricher.analyze(id).await,
                };
                analysis.map(StepOutput::Analysis)
            }
        }
    }
}

fn skipped(step: Step, missing: Step) -> CamaraError {
    CamaraError::validation(format!("{step} skipped: {missing} unavailable"))
}
