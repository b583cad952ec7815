//! Pipeline descriptions and named views.
//!
//! A [`PipelineDescription`] is an ordered list of stages; each stage is a
//! group of [`Step`]s the aggregator runs concurrently. Views are fixed
//! descriptions, and the [`Orchestrator`] hands them to the aggregator.

use std::collections::HashSet;

use serde::Serialize;
use tracing::instrument;

use camara_shared::{CamaraError, PropositionId, Result};

use crate::aggregator::{Aggregator, Collected};

// ---------------------------------------------------------------------------
// Steps and stages
// ---------------------------------------------------------------------------

/// One unit of work in a pipeline, named after the record part it fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Proposition,
    Authors,
    Procedures,
    Themes,
    Explain,
    AnalyzeProcedures,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Proposition => "proposition",
            Self::Authors => "authors",
            Self::Procedures => "procedures",
            Self::Themes => "themes",
            Self::Explain => "explain",
            Self::AnalyzeProcedures => "analyze_procedures",
        }
    }

    /// Steps whose output this step consumes.
    pub fn depends_on(&self) -> &'static [Step] {
        match self {
            Self::Explain => &[Self::Proposition],
            _ => &[],
        }
    }

    pub fn needs_generator(&self) -> bool {
        matches!(self, Self::Explain | Self::AnalyzeProcedures)
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A group of steps run concurrently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub steps: Vec<Step>,
}

/// Ordered stages. A stage starts only after the previous one settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineDescription {
    pub name: String,
    pub stages: Vec<Stage>,
}

impl PipelineDescription {
    pub fn new(name: impl Into<String>, stages: Vec<Vec<Step>>) -> Self {
        Self {
            name: name.into(),
            stages: stages.into_iter().map(|steps| Stage { steps }).collect(),
        }
    }

    /// `[proposition ∥ authors ∥ procedures ∥ themes]`
    pub fn basic() -> Self {
        Self::new(
            "basic",
            vec![vec![Step::Proposition, Step::Authors, Step::Procedures, Step::Themes]],
        )
    }

    /// `[proposition ∥ authors ∥ procedures] → [explain]`
    pub fn explained() -> Self {
        Self::new(
            "explained",
            vec![
                vec![Step::Proposition, Step::Authors, Step::Procedures],
                vec![Step::Explain],
            ],
        )
    }

    /// `[proposition ∥ authors ∥ procedures ∥ themes] → [explain]`
    pub fn details() -> Self {
        Self::new(
            "details",
            vec![
                vec![Step::Proposition, Step::Authors, Step::Procedures, Step::Themes],
                vec![Step::Explain],
            ],
        )
    }

    /// `[analyze-procedures]`
    pub fn procedure_analysis() -> Self {
        Self::new("procedure-analysis", vec![vec![Step::AnalyzeProcedures]])
    }

    pub fn steps(&self) -> impl Iterator<Item = Step> + '_ {
        self.stages.iter().flat_map(|s| s.steps.iter().copied())
    }

    /// Reject empty stages, repeated steps, and steps scheduled no later
    /// than a step they depend on.
    pub fn validate(&self) -> Result<()> {
        if self.stages.is_empty() {
            return Err(CamaraError::validation(format!(
                "pipeline `{}` has no stages",
                self.name
            )));
        }

        let mut earlier: HashSet<Step> = HashSet::new();
        for (index, stage) in self.stages.iter().enumerate() {
            if stage.steps.is_empty() {
                return Err(CamaraError::validation(format!(
                    "pipeline `{}` stage {} is empty",
                    self.name,
                    index + 1
                )));
            }

            let mut current: HashSet<Step> = HashSet::new();
            for &step in &stage.steps {
                if earlier.contains(&step) || !current.insert(step) {
                    return Err(CamaraError::validation(format!(
                        "pipeline `{}` runs step `{step}` more than once",
                        self.name
                    )));
                }
                if let Some(missing) = step.depends_on().iter().find(|d| !earlier.contains(*d)) {
                    return Err(CamaraError::validation(format!(
                        "pipeline `{}`: step `{step}` needs `{missing}` in an earlier stage",
                        self.name
                    )));
                }
            }
            earlier.extend(current);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// Named views over a proposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Basic,
    Explained,
    Details,
    ProcedureAnalysis,
}

impl View {
    pub const ALL: [View; 4] = [
        Self::Basic,
        Self::Explained,
        Self::Details,
        Self::ProcedureAnalysis,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Explained => "explained",
            Self::Details => "details",
            Self::ProcedureAnalysis => "procedure-analysis",
        }
    }

    pub fn description(&self) -> PipelineDescription {
        match self {
            Self::Basic => PipelineDescription::basic(),
            Self::Explained => PipelineDescription::explained(),
            Self::Details => PipelineDescription::details(),
            Self::ProcedureAnalysis => PipelineDescription::procedure_analysis(),
        }
    }
}

impl std::str::FromStr for View {
    type Err = CamaraError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| CamaraError::validation(format!("unknown view `{s}`")))
    }
}

// ---------------------------------------------------------------------------
// Progress reporting
// ---------------------------------------------------------------------------

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when a stage starts (1-based index).
    fn stage(&self, index: usize, total: usize, steps: &[Step]);
    /// Called as each step settles.
    fn step_done(&self, step: Step, ok: bool);
    /// Called once the pipeline finished with `failures` failed parts.
    fn done(&self, failures: usize);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn stage(&self, _index: usize, _total: usize, _steps: &[Step]) {}
    fn step_done(&self, _step: Step, _ok: bool) {}
    fn done(&self, _failures: usize) {}
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Maps views to descriptions and runs them.
pub struct Orchestrator {
    aggregator: Aggregator,
}

impl Orchestrator {
    pub fn new(aggregator: Aggregator) -> Self {
        Self { aggregator }
    }

    #[instrument(skip_all, fields(view = view.as_str(), id = %id))]
    pub async fn run_view(
        &self,
        view: View,
        id: PropositionId,
        progress: &dyn ProgressReporter,
    ) -> Result<Collected> {
        self.aggregator.run(&view.description(), id, progress).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_validate() {
        for view in View::ALL {
            view.description().validate().unwrap();
        }
    }

    #[test]
    fn presets_match_views() {
        let details = PipelineDescription::details();
        assert_eq!(details.stages.len(), 2);
        assert_eq!(details.stages[1].steps, vec![Step::Explain]);
        assert!(!PipelineDescription::basic().steps().any(|s| s.needs_generator()));
        assert_eq!(
            PipelineDescription::explained().steps().collect::<Vec<_>>(),
            vec![Step::Proposition, Step::Authors, Step::Procedures, Step::Explain]
        );
    }

    #[test]
    fn explain_must_follow_proposition() {
        let same_stage = PipelineDescription::new("bad", vec![vec![Step::Proposition, Step::Explain]]);
        let err = same_stage.validate().unwrap_err();
        assert!(err.to_string().contains("needs `proposition`"));

        let missing = PipelineDescription::new("bad", vec![vec![Step::Authors], vec![Step::Explain]]);
        assert!(missing.validate().is_err());
    }

    #[test]
    fn duplicate_and_empty_stages_rejected() {
        let dup = PipelineDescription::new(
            "dup",
            vec![vec![Step::Authors], vec![Step::Authors]],
        );
        assert!(dup.validate().is_err());

        let empty = PipelineDescription::new("empty", vec![vec![Step::Authors], vec![]]);
        assert!(empty.validate().is_err());

        assert!(PipelineDescription::new("none", vec![]).validate().is_err());
    }

    #[tokio::test]
    async fn orchestrator_runs_basic_view() {
        use camara_opendata::OpenDataClient;
        use camara_shared::{AggregationPolicy, OpenDataConfig};
        use serde_json::json;
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        let routes = [
            (
                "/proposicoes/42",
                json!({ "dados": { "id": 42, "siglaTipo": "PEC", "codTipo": 136, "numero": 1, "ano": 2024, "ementa": "E." } }),
            ),
            ("/proposicoes/42/autores", json!({ "dados": [{ "nome": "Autora", "ordemAssinatura": 1 }] })),
            ("/proposicoes/42/tramitacoes", json!({ "dados": [] })),
            ("/proposicoes/42/temas", json!({ "dados": [{ "codTema": 46, "tema": "Educação" }] })),
        ];
        for (route, body) in routes {
            Mock::given(method("GET"))
                .and(path(route))
                .respond_with(ResponseTemplate::new(200).set_body_json(body))
                .expect(1)
                .mount(&server)
                .await;
        }

        let client = OpenDataClient::new(&OpenDataConfig {
            base_url: server.uri(),
            timeout_secs: 5,
        })
        .unwrap();
        let orchestrator = Orchestrator::new(Aggregator::new(&client, AggregationPolicy::FailFast));

        let collected = orchestrator
            .run_view(View::Basic, PropositionId(42), &SilentProgress)
            .await
            .unwrap();
        assert!(collected.is_complete());
        assert_eq!(collected.proposition.map(|p| p.id), Some(PropositionId(42)));
        assert_eq!(collected.authors.map(|a| a.len()), Some(1));
        assert_eq!(collected.procedures, Some(Vec::new()));
        assert_eq!(collected.themes.map(|t| t[0].label.clone()), Some("Educação".to_string()));
        assert!(collected.explanation.is_none());
    }

    #[test]
    fn view_names_roundtrip() {
        for view in View::ALL {
            assert_eq!(view.as_str().parse::<View>().unwrap(), view);
        }
        assert!("everything".parse::<View>().is_err());
    }
}
