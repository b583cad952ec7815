//! Generative enrichers: plain-language explanations of a proposition's
//! ementa and narrative analysis of its procedural history.
//!
//! Both enrichers ask the generator for a JSON object with a single
//! `explanation` string. What happens when no object comes back is set by
//! [`MissingOutput`]; an object without the key always falls back.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{info, instrument, warn};

use camara_generative::{ChatMessage, GenerateObjectRequest, StructuredObject, TextGenerator};
use camara_shared::{
    CamaraError, Explanation, MissingOutput, Operation, Procedure, ProcedureAnalysis,
    PropositionId, Result,
};

use crate::ordering::format_date_br;

/// Substituted when the explanation output is missing.
pub const EXPLANATION_FALLBACK: &str = "Unable to generate explanation.";

/// Returned, without calling the generator, for a proposition with no procedures.
pub const NO_PROCEDURES_MESSAGE: &str = "Esta proposição não possui tramitações registradas ainda.";

/// Substituted when the analysis object lacks its `explanation`.
pub const ANALYSIS_FALLBACK: &str = "Não foi possível gerar a análise das tramitações.";

const EXPLANATION_SYSTEM_PROMPT: &str = "You are an expert in Brazilian law and public policy, skilled at explaining complex topics to the general public.";

const EXPLANATION_FIELD: &str = "Explain the following legislative proposition's summary (ementa) in simple, clear, and impartial terms for a layperson. Focus on the practical impact on a citizen's life.";

const ANALYSIS_SYSTEM_PROMPT: &str = "Você é um especialista em direito constitucional e processo legislativo brasileiro. Analise as tramitações fornecidas e forneça insights claros sobre o que aconteceu e o que pode acontecer a seguir. Use linguagem acessível mas precisa, focando no impacto prático para os cidadãos.";

const ANALYSIS_FIELD: &str = "Uma explicação clara e objetiva em português brasileiro sobre o que aconteceu nas tramitações e o que provavelmente vai acontecer a seguir. Use linguagem acessível mas precisa, considerando o contexto legislativo brasileiro.";

/// Procedure fetcher seam used by the analysis enricher.
pub type ProcedureSource = Arc<dyn Operation<Input = PropositionId, Output = Vec<Procedure>>>;

fn explanation_schema(description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "explanation": { "type": "string", "description": description }
        },
        "required": ["explanation"],
        "additionalProperties": false
    })
}

/// Pull the `explanation` string out of a generated object.
fn read_explanation(
    object: Option<StructuredObject>,
    on_missing: MissingOutput,
    fallback: &str,
    failure: &str,
) -> Result<String> {
    let Some(object) = object else {
        return match on_missing {
            MissingOutput::Fallback => {
                warn!("no structured output, substituting fallback");
                Ok(fallback.to_string())
            }
            MissingOutput::Fail => Err(CamaraError::Generation(failure.to_string())),
        };
    };

    match object.get("explanation").and_then(Value::as_str) {
        Some(text) => Ok(text.to_string()),
        None => {
            warn!("structured output lacks explanation, substituting fallback");
            Ok(fallback.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Explanation
// ---------------------------------------------------------------------------

/// Explains an ementa in lay terms.
#[derive(Clone)]
pub struct ExplanationEnricher {
    generator: Arc<dyn TextGenerator>,
    on_missing: MissingOutput,
}

impl ExplanationEnricher {
    pub fn new(generator: Arc<dyn TextGenerator>, on_missing: MissingOutput) -> Self {
        Self {
            generator,
            on_missing,
        }
    }

    /// Explain `ementa`. An empty ementa is sent as-is.
    #[instrument(skip_all, fields(chars = ementa.chars().count()))]
    pub async fn explain(&self, ementa: &str) -> Result<Explanation> {
        let request = GenerateObjectRequest {
            messages: vec![
                ChatMessage::system(EXPLANATION_SYSTEM_PROMPT),
                ChatMessage::user(ementa),
            ],
            schema_name: "explanation".into(),
            schema: explanation_schema(EXPLANATION_FIELD),
            temperature: None,
        };

        let object = self.generator.generate_object(&request).await?;
        let explanation = read_explanation(
            object,
            self.on_missing,
            EXPLANATION_FALLBACK,
            "Failed to generate explanation",
        )?;

        info!(chars = explanation.chars().count(), "explanation generated");
        Ok(Explanation { explanation })
    }
}

#[async_trait]
impl Operation for ExplanationEnricher {
    type Input = String;
    type Output = Explanation;

    fn name(&self) -> &'static str {
        "explanation"
    }

    async fn run(&self, ementa: String) -> Result<Explanation> {
        self.explain(&ementa).await
    }
}

// ---------------------------------------------------------------------------
// Procedure analysis
// ---------------------------------------------------------------------------

/// Narrates what happened in a proposition's procedures and what comes next.
#[derive(Clone)]
pub struct ProcedureAnalysisEnricher {
    procedures: ProcedureSource,
    generator: Arc<dyn TextGenerator>,
    temperature: f32,
    on_missing: MissingOutput,
}

impl ProcedureAnalysisEnricher {
    pub fn new(
        procedures: ProcedureSource,
        generator: Arc<dyn TextGenerator>,
        temperature: f32,
        on_missing: MissingOutput,
    ) -> Self {
        Self {
            procedures,
            generator,
            temperature,
            on_missing,
        }
    }

    /// Fetch the procedures for `id`, then analyze them.
    #[instrument(skip_all, fields(id = %id))]
    pub async fn analyze(&self, id: PropositionId) -> Result<ProcedureAnalysis> {
        let procedures = self.procedures.run(id).await?;
        self.analyze_procedures(procedures).await
    }

    /// Analyze an already fetched procedure list.
    #[instrument(skip_all, fields(procedures = procedures.len()))]
    pub async fn analyze_procedures(&self, procedures: Vec<Procedure>) -> Result<ProcedureAnalysis> {
        if procedures.is_empty() {
            info!("no procedures recorded, skipping generation");
            return Ok(ProcedureAnalysis {
                explanation: NO_PROCEDURES_MESSAGE.to_string(),
                procedures,
            });
        }

        let request = GenerateObjectRequest {
            messages: vec![
                ChatMessage::system(ANALYSIS_SYSTEM_PROMPT),
                ChatMessage::user(analysis_prompt(&procedures)),
            ],
            schema_name: "procedures_analysis".into(),
            schema: explanation_schema(ANALYSIS_FIELD),
            temperature: Some(self.temperature),
        };

        let object = self.generator.generate_object(&request).await?;
        let explanation = read_explanation(
            object,
            self.on_missing,
            ANALYSIS_FALLBACK,
            "Failed to generate procedures analysis",
        )?;

        Ok(ProcedureAnalysis {
            explanation,
            procedures,
        })
    }
}

#[async_trait]
impl Operation for ProcedureAnalysisEnricher {
    type Input = PropositionId;
    type Output = ProcedureAnalysis;

    fn name(&self) -> &'static str {
        "procedure_analysis"
    }

    async fn run(&self, id: PropositionId) -> Result<ProcedureAnalysis> {
        self.analyze(id).await
    }
}

/// One numbered line per procedure, in input order.
pub fn render_procedures(procedures: &[Procedure]) -> String {
    procedures
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let date = p
                .timestamp
                .as_deref()
                .and_then(format_date_br)
                .unwrap_or_else(|| "Data não informada".to_string());
            format!(
                "{}. Data: {} | Órgão: {} | Tramitação: {} | Situação: {} | Despacho: {}",
                i + 1,
                date,
                or_placeholder(&p.committee, "Órgão não especificado"),
                or_placeholder(&p.tramitation, "Descrição não disponível"),
                or_placeholder(&p.situation, "Situação não especificada"),
                or_placeholder(&p.dispatch, "Sem despacho"),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn or_placeholder<'a>(value: &'a Option<String>, placeholder: &'a str) -> &'a str {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => v,
        _ => placeholder,
    }
}

fn analysis_prompt(procedures: &[Procedure]) -> String {
    format!(
        "Analise as seguintes tramitações legislativas brasileiras e forneça uma explicação clara sobre:\n\n\
         {}\n\n\
         Por favor, explique:\n\
         1. O que aconteceu em cada etapa importante\n\
         2. O status atual da proposição\n\
         3. Os próximos passos prováveis no processo legislativo\n\
         4. Qual o impacto prático para os cidadãos\n\n\
         Use linguagem clara e objetiva, considerando o contexto legislativo brasileiro.",
        render_procedures(procedures)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedGenerator, StaticProcedures};

    fn procedure(ts: Option<&str>, committee: Option<&str>, dispatch: Option<&str>) -> Procedure {
        Procedure {
            timestamp: ts.map(str::to_string),
            committee: committee.map(str::to_string),
            tramitation: Some("Apresentação de Proposição".into()),
            dispatch: dispatch.map(str::to_string),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn explanation_is_extracted() {
        let generator = ScriptedGenerator::returning(json!({ "explanation": "Muda a merenda." }));
        let enricher = ExplanationEnricher::new(generator.clone(), MissingOutput::Fallback);

        let out = enricher.explain("Dispõe sobre a merenda escolar.").await.unwrap();
        assert_eq!(out.explanation, "Muda a merenda.");

        let request = generator.last_request().expect("request captured");
        assert_eq!(request.messages[0].content, EXPLANATION_SYSTEM_PROMPT);
        assert_eq!(request.messages[1].content, "Dispõe sobre a merenda escolar.");
        assert_eq!(request.temperature, None);
        assert_eq!(request.schema["required"], json!(["explanation"]));
    }

    #[tokio::test]
    async fn explanation_missing_key_falls_back() {
        let generator = ScriptedGenerator::returning(json!({ "summary": "wrong key" }));
        let enricher = ExplanationEnricher::new(generator, MissingOutput::Fallback);
        let out = enricher.explain("x").await.unwrap();
        assert_eq!(out.explanation, EXPLANATION_FALLBACK);
    }

    #[tokio::test]
    async fn explanation_missing_object_follows_policy() {
        let lenient = ExplanationEnricher::new(ScriptedGenerator::empty(), MissingOutput::Fallback);
        assert_eq!(lenient.explain("").await.unwrap().explanation, EXPLANATION_FALLBACK);

        let strict = ExplanationEnricher::new(ScriptedGenerator::empty(), MissingOutput::Fail);
        let err = strict.explain("").await.unwrap_err();
        assert!(matches!(err, CamaraError::Generation(_)));
    }

    #[tokio::test]
    async fn explanation_propagates_service_errors() {
        let enricher = ExplanationEnricher::new(ScriptedGenerator::failing(), MissingOutput::Fallback);
        assert!(enricher.explain("x").await.is_err());
    }

    #[tokio::test]
    async fn empty_procedures_skip_generation() {
        let generator = ScriptedGenerator::returning(json!({ "explanation": "unused" }));
        let enricher = ProcedureAnalysisEnricher::new(
            StaticProcedures::new(Vec::new()),
            generator.clone(),
            0.3,
            MissingOutput::Fail,
        );

        let out = enricher.analyze(PropositionId(1)).await.unwrap();
        assert_eq!(out.explanation, NO_PROCEDURES_MESSAGE);
        assert!(out.procedures.is_empty());
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn analysis_renders_prompt_and_keeps_procedures() {
        let procedures = vec![
            procedure(Some("2023-10-17T15:42"), Some("PLEN"), Some("Apresentação do PL")),
            procedure(None, None, None),
        ];
        let generator =
            ScriptedGenerator::returning(json!({ "explanation": "Foi apresentado e aguarda relator." }));
        let enricher = ProcedureAnalysisEnricher::new(
            StaticProcedures::new(procedures.clone()),
            generator.clone(),
            0.3,
            MissingOutput::Fail,
        );

        let out = enricher.analyze(PropositionId(5)).await.unwrap();
        assert_eq!(out.explanation, "Foi apresentado e aguarda relator.");
        assert_eq!(out.procedures, procedures);
        assert_eq!(generator.calls(), 1);

        let request = generator.last_request().unwrap();
        assert_eq!(request.temperature, Some(0.3));
        let prompt = &request.messages[1].content;
        assert!(prompt.contains(
            "1. Data: 17/10/2023 | Órgão: PLEN | Tramitação: Apresentação de Proposição | Situação: Situação não especificada | Despacho: Apresentação do PL"
        ));
        assert!(prompt.contains(
            "2. Data: Data não informada | Órgão: Órgão não especificado | Tramitação: Apresentação de Proposição | Situação: Situação não especificada | Despacho: Sem despacho"
        ));
        assert!(prompt.contains("4. Qual o impacto prático para os cidadãos"));
    }

    #[tokio::test]
    async fn analysis_missing_object_is_hard_failure() {
        let enricher = ProcedureAnalysisEnricher::new(
            StaticProcedures::new(vec![procedure(None, Some("CCJC"), None)]),
            ScriptedGenerator::empty(),
            0.3,
            MissingOutput::Fail,
        );
        let err = enricher.analyze(PropositionId(5)).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "generation error: Failed to generate procedures analysis"
        );
    }

    #[tokio::test]
    async fn analysis_missing_key_falls_back() {
        let enricher = ProcedureAnalysisEnricher::new(
            StaticProcedures::new(vec![procedure(None, Some("CCJC"), None)]),
            ScriptedGenerator::returning(json!({})),
            0.3,
            MissingOutput::Fail,
        );
        let out = enricher.analyze(PropositionId(5)).await.unwrap();
        assert_eq!(out.explanation, ANALYSIS_FALLBACK);
        assert_eq!(out.procedures.len(), 1);
    }

    #[tokio::test]
    async fn enrichers_are_operations() {
        let enricher = ExplanationEnricher::new(
            ScriptedGenerator::returning(json!({ "explanation": "ok" })),
            MissingOutput::Fallback,
        );
        assert_eq!(enricher.name(), "explanation");
        let out = enricher.run("texto".to_string()).await.unwrap();
        assert_eq!(out.explanation, "ok");
    }
}
