//! Core domain types for legislative records.
//!
//! Field names follow the open-data API's camelCase Portuguese keys on the
//! wire so records serialize back in the shape the remote service uses.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Numeric proposition identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropositionId(pub u64);

impl std::fmt::Display for PropositionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PropositionId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

impl From<u64> for PropositionId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Poll identifier. Served both as `"2265603-43"` and as a bare number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PollId(pub String);

impl<'de> Deserialize<'de> for PollId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Ok(Self(StringOrNumber::deserialize(deserializer)?.into_string()))
    }
}

impl std::fmt::Display for PollId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for PollId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Text(String),
    Number(i64),
}

impl StringOrNumber {
    fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Number(n) => n.to_string(),
        }
    }
}

fn opt_string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<StringOrNumber>::deserialize(deserializer)?.map(StringOrNumber::into_string))
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Response envelope
// ---------------------------------------------------------------------------

/// Every open-data response wraps its payload in `{ "dados": ... }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub dados: T,
}

// ---------------------------------------------------------------------------
// Propositions
// ---------------------------------------------------------------------------

/// One entry of the proposition listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropositionSummary {
    pub id: PropositionId,
    #[serde(default)]
    pub uri: String,
    #[serde(rename = "siglaTipo")]
    pub type_abbreviation: String,
    #[serde(rename = "codTipo")]
    pub type_code: i64,
    #[serde(rename = "numero")]
    pub number: i64,
    #[serde(rename = "ano")]
    pub year: i32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ementa: String,
}

/// Full proposition record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposition {
    pub id: PropositionId,
    #[serde(default)]
    pub uri: String,
    #[serde(rename = "siglaTipo")]
    pub type_abbreviation: String,
    #[serde(rename = "codTipo")]
    pub type_code: i64,
    #[serde(rename = "numero")]
    pub number: i64,
    #[serde(rename = "ano")]
    pub year: i32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ementa: String,
    #[serde(rename = "ementaDetalhada", default)]
    pub detailed_ementa: Option<String>,
    #[serde(rename = "dataApresentacao", default)]
    pub presented_at: Option<String>,
    #[serde(rename = "justificativa", default)]
    pub justification: Option<String>,
    #[serde(default)]
    pub keywords: Option<String>,
    #[serde(rename = "urlInteiroTeor", default)]
    pub full_text_url: Option<String>,
    #[serde(rename = "statusProposicao", default)]
    pub status: Option<PropositionStatus>,
}

impl Proposition {
    /// Text handed to the explanation enricher: the detailed ementa when
    /// present and non-blank, otherwise the short one.
    pub fn explanation_source(&self) -> &str {
        match self.detailed_ementa.as_deref() {
            Some(detailed) if !detailed.trim().is_empty() => detailed,
            _ => &self.ementa,
        }
    }

    /// Display title such as `PL 1234/2023`.
    pub fn title(&self) -> String {
        format!("{} {}/{}", self.type_abbreviation, self.number, self.year)
    }
}

/// Latest procedural status of a proposition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropositionStatus {
    #[serde(rename = "dataHora", default)]
    pub updated_at: Option<String>,
    #[serde(rename = "sequencia", default)]
    pub sequence: Option<i64>,
    #[serde(rename = "siglaOrgao", default)]
    pub committee: Option<String>,
    #[serde(rename = "uriOrgao", default)]
    pub committee_uri: Option<String>,
    #[serde(rename = "uriUltimoRelator", default)]
    pub rapporteur_uri: Option<String>,
    #[serde(default)]
    pub regime: Option<String>,
    #[serde(rename = "descricaoTramitacao", default)]
    pub tramitation: Option<String>,
    #[serde(rename = "codTipoTramitacao", default, deserialize_with = "opt_string_or_number")]
    pub tramitation_code: Option<String>,
    #[serde(rename = "descricaoSituacao", default)]
    pub situation: Option<String>,
    #[serde(rename = "codSituacao", default)]
    pub situation_code: Option<i64>,
    #[serde(rename = "despacho", default)]
    pub dispatch: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(rename = "ambito", default)]
    pub scope: Option<String>,
    #[serde(rename = "apreciacao", default)]
    pub appreciation: Option<String>,
}

/// Human label for the common proposition type abbreviations.
pub fn proposition_type_label(abbreviation: &str) -> &str {
    match abbreviation {
        "PEC" => "Proposta de Emenda à Constituição",
        "PL" => "Projeto de Lei",
        "MPV" => "Medida Provisória",
        other => other,
    }
}

// ---------------------------------------------------------------------------
// Authors, procedures, themes
// ---------------------------------------------------------------------------

/// A signatory of a proposition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "tipo", default)]
    pub kind: String,
    #[serde(default)]
    pub uri: String,
    #[serde(rename = "ordemAssinatura", default)]
    pub signature_order: i64,
    #[serde(rename = "proponente", default)]
    pub proponent: u8,
}

impl Author {
    pub fn is_proponent(&self) -> bool {
        self.proponent == 1
    }
}

/// One recorded step (tramitação) of a proposition. The source is
/// inconsistent, so every field may be null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Procedure {
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(rename = "dataHora", default)]
    pub timestamp: Option<String>,
    #[serde(rename = "sequencia", default)]
    pub sequence: Option<i64>,
    #[serde(rename = "siglaOrgao", default)]
    pub committee: Option<String>,
    #[serde(rename = "uriOrgao", default)]
    pub committee_uri: Option<String>,
    #[serde(default)]
    pub regime: Option<String>,
    #[serde(rename = "descricaoTramitacao", default)]
    pub tramitation: Option<String>,
    #[serde(rename = "codTipoTramitacao", default, deserialize_with = "opt_string_or_number")]
    pub tramitation_code: Option<String>,
    #[serde(rename = "descricaoSituacao", default)]
    pub situation: Option<String>,
    #[serde(rename = "codSituacao", default)]
    pub situation_code: Option<i64>,
    #[serde(rename = "despacho", default)]
    pub dispatch: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Subject theme attached to a proposition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    #[serde(rename = "codTema")]
    pub code: i64,
    #[serde(rename = "tema")]
    pub label: String,
}

// ---------------------------------------------------------------------------
// Polls and votes
// ---------------------------------------------------------------------------

/// Outcome of a poll. Encoded on the wire as `1`, `0` or `null`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Approval {
    Approved,
    Rejected,
    #[default]
    NotApplicable,
}

impl Approval {
    /// Decode the wire value. Anything other than 1 or 0 is not applicable.
    pub fn from_code(code: Option<i64>) -> Self {
        match code {
            Some(1) => Self::Approved,
            Some(0) => Self::Rejected,
            _ => Self::NotApplicable,
        }
    }

    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Approved => Some(1),
            Self::Rejected => Some(0),
            Self::NotApplicable => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Approved => "Aprovada",
            Self::Rejected => "Rejeitada",
            Self::NotApplicable => "Não se aplica",
        }
    }
}

impl Serialize for Approval {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.code().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Approval {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Ok(Self::from_code(Option::<i64>::deserialize(deserializer)?))
    }
}

/// Vote counts, present only on some endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollTally {
    pub yes: u32,
    pub no: u32,
    pub abstain: u32,
    pub present: Option<u32>,
}

/// A vote event (votação) as listed for a proposition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poll {
    pub id: PollId,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(rename = "data", default)]
    pub date: Option<String>,
    #[serde(rename = "dataHoraRegistro", default)]
    pub registered_at: Option<String>,
    #[serde(rename = "siglaOrgao", default)]
    pub committee: Option<String>,
    #[serde(rename = "uriOrgao", default)]
    pub committee_uri: Option<String>,
    #[serde(rename = "descricao", default)]
    pub description: Option<String>,
    #[serde(rename = "aprovacao", default)]
    pub approval: Approval,
    #[serde(rename = "placarSim", default, skip_serializing_if = "Option::is_none")]
    pub yes_count: Option<u32>,
    #[serde(rename = "placarNao", default, skip_serializing_if = "Option::is_none")]
    pub no_count: Option<u32>,
    #[serde(rename = "placarAbstencao", default, skip_serializing_if = "Option::is_none")]
    pub abstain_count: Option<u32>,
    #[serde(rename = "placarPresentes", default, skip_serializing_if = "Option::is_none")]
    pub present_count: Option<u32>,
}

impl Poll {
    /// Tallies, when the serving endpoint included them.
    pub fn tally(&self) -> Option<PollTally> {
        Some(PollTally {
            yes: self.yes_count?,
            no: self.no_count?,
            abstain: self.abstain_count.unwrap_or(0),
            present: self.present_count,
        })
    }

    /// Timestamp used for ordering: registration time, else the poll date.
    pub fn timestamp(&self) -> Option<&str> {
        self.registered_at.as_deref().or(self.date.as_deref())
    }
}

/// Proposition referenced from a poll detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffectedProposition {
    pub id: u64,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(rename = "siglaTipo", default)]
    pub type_abbreviation: Option<String>,
    #[serde(rename = "codTipo", default)]
    pub type_code: Option<i64>,
    #[serde(rename = "numero", default)]
    pub number: Option<i64>,
    #[serde(rename = "ano", default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub ementa: Option<String>,
}

/// Last proposition presented before a poll was opened.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CitedProposition {
    #[serde(rename = "dataHoraRegistro", default)]
    pub registered_at: Option<String>,
    #[serde(rename = "descricao", default)]
    pub description: Option<String>,
    #[serde(rename = "uriProposicaoCitada", default)]
    pub cited_uri: Option<String>,
}

/// Poll record served by the poll detail endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollDetail {
    #[serde(flatten)]
    pub poll: Poll,
    #[serde(rename = "idOrgao", default)]
    pub committee_id: Option<i64>,
    #[serde(rename = "uriEvento", default)]
    pub event_uri: Option<String>,
    #[serde(rename = "idEvento", default)]
    pub event_id: Option<i64>,
    #[serde(rename = "descUltimaAberturaVotacao", default)]
    pub last_opening_description: Option<String>,
    #[serde(rename = "dataHoraUltimaAberturaVotacao", default)]
    pub last_opening_at: Option<String>,
    #[serde(rename = "ultimaApresentacaoProposicao", default)]
    pub last_cited_proposition: Option<CitedProposition>,
    #[serde(rename = "efeitosRegistrados", default, deserialize_with = "null_as_default")]
    pub registered_effects: Vec<serde_json::Value>,
    #[serde(rename = "objetosPossiveis", default, deserialize_with = "null_as_default")]
    pub possible_objects: Vec<AffectedProposition>,
    #[serde(rename = "proposicoesAfetadas", default, deserialize_with = "null_as_default")]
    pub affected_propositions: Vec<AffectedProposition>,
}

/// Deputy record nested in a vote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deputy {
    pub id: u64,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(rename = "nome", default)]
    pub name: Option<String>,
    #[serde(rename = "siglaPartido", default)]
    pub party: Option<String>,
    #[serde(rename = "uriPartido", default)]
    pub party_uri: Option<String>,
    #[serde(rename = "siglaUf", default)]
    pub uf: Option<String>,
    #[serde(rename = "idLegislatura", default)]
    pub legislature_id: Option<i64>,
    #[serde(rename = "urlFoto", default)]
    pub photo_url: Option<String>,
}

/// A single deputy's vote in a poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(rename = "nome", default)]
    pub name: Option<String>,
    #[serde(rename = "siglaPartido", default)]
    pub party: Option<String>,
    #[serde(rename = "uriPartido", default)]
    pub party_uri: Option<String>,
    #[serde(rename = "voto", alias = "tipoVoto", default)]
    pub choice: Option<String>,
    #[serde(rename = "dataRegistroVoto", default)]
    pub registered_at: Option<String>,
    #[serde(rename = "deputado", alias = "deputado_", default)]
    pub deputy: Option<Deputy>,
}

impl Vote {
    /// Voter name, preferring the nested deputy record.
    pub fn voter_name(&self) -> Option<&str> {
        self.deputy
            .as_ref()
            .and_then(|d| d.name.as_deref())
            .or(self.name.as_deref())
    }

    /// Party, preferring the nested deputy record.
    pub fn voter_party(&self) -> Option<&str> {
        self.deputy
            .as_ref()
            .and_then(|d| d.party.as_deref())
            .or(self.party.as_deref())
    }

    pub fn voter_uf(&self) -> Option<&str> {
        self.deputy.as_ref().and_then(|d| d.uf.as_deref())
    }

    /// Cast choice, or `"Sem voto"` when none was recorded.
    pub fn choice_label(&self) -> &str {
        self.choice.as_deref().unwrap_or("Sem voto")
    }
}

/// Poll detail joined with its individual votes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollWithVotes {
    pub poll: PollDetail,
    pub votes: Vec<Vote>,
}

// ---------------------------------------------------------------------------
// Enrichment outputs and composites
// ---------------------------------------------------------------------------

/// Plain-language explanation of a proposition summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explanation {
    pub explanation: String,
}

/// Narrative over a proposition's procedural history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcedureAnalysis {
    pub explanation: String,
    pub procedures: Vec<Procedure>,
}

/// Proposition joined with its sub-resources, recomputed on every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeRecord {
    pub proposition: Proposition,
    pub authors: Vec<Author>,
    pub procedures: Vec<Procedure>,
    pub themes: Vec<Theme>,
    pub explanation: Explanation,
}

// ---------------------------------------------------------------------------
// Listing filter
// ---------------------------------------------------------------------------

/// Filters for the proposition listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropositionFilter {
    /// Type abbreviations (`PL`, `PEC`, ...), sent as repeated parameters.
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub year: Option<i32>,
    /// Keyword tokens; all must match.
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub theme: Option<i64>,
    /// 1-indexed page number.
    #[serde(default)]
    pub page: Option<u32>,
}

impl PropositionFilter {
    /// Tokenize free-text keyword input on whitespace.
    pub fn with_keywords_str(mut self, input: &str) -> Self {
        self.keywords = input.split_whitespace().map(str::to_string).collect();
        self
    }

    /// All keyword tokens combined into the single value the remote service
    /// ANDs together. `None` when there are no non-blank tokens.
    pub fn keywords_param(&self) -> Option<String> {
        let tokens: Vec<&str> = self
            .keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .collect();
        if tokens.is_empty() {
            None
        } else {
            Some(tokens.join(" "))
        }
    }

    /// Page following `current`, given how many items `current` returned.
    /// An empty page means there is nothing after it.
    pub fn next_page(current: u32, items_on_page: usize) -> Option<u32> {
        (items_on_page > 0).then(|| current.max(1) + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proposition_id_roundtrip() {
        let id: PropositionId = " 2345678 ".parse().expect("parse id");
        assert_eq!(id, PropositionId(2345678));
        assert_eq!(id.to_string(), "2345678");
    }

    #[test]
    fn poll_id_accepts_string_and_number() {
        let a: PollId = serde_json::from_str(r#""2265603-43""#).unwrap();
        let b: PollId = serde_json::from_str("12345").unwrap();
        assert_eq!(a.0, "2265603-43");
        assert_eq!(b.0, "12345");
        assert_eq!(serde_json::to_string(&b).unwrap(), r#""12345""#);
    }

    #[test]
    fn approval_tri_state() {
        let polls: Vec<Poll> = serde_json::from_str(
            r#"[
                {"id": "1-1", "aprovacao": 1},
                {"id": "1-2", "aprovacao": 0},
                {"id": "1-3", "aprovacao": null},
                {"id": "1-4"}
            ]"#,
        )
        .unwrap();
        assert_eq!(polls[0].approval, Approval::Approved);
        assert_eq!(polls[1].approval, Approval::Rejected);
        assert_eq!(polls[2].approval, Approval::NotApplicable);
        assert_eq!(polls[3].approval, Approval::NotApplicable);

        let json = serde_json::to_value(&polls[2]).unwrap();
        assert!(json["aprovacao"].is_null());
        let json = serde_json::to_value(&polls[1]).unwrap();
        assert_eq!(json["aprovacao"], 0);
    }

    #[test]
    fn poll_tally_requires_yes_and_no() {
        let poll: Poll = serde_json::from_str(
            r#"{"id": 9, "placarSim": 300, "placarNao": 120, "placarAbstencao": 3}"#,
        )
        .unwrap();
        let tally = poll.tally().expect("tally present");
        assert_eq!(tally.yes, 300);
        assert_eq!(tally.no, 120);
        assert_eq!(tally.abstain, 3);
        assert_eq!(tally.present, None);

        let poll: Poll = serde_json::from_str(r#"{"id": 9}"#).unwrap();
        assert!(poll.tally().is_none());
    }

    #[test]
    fn explanation_source_prefers_detailed_ementa() {
        let mut prop: Proposition = serde_json::from_str(
            r#"{"id": 1, "uri": "u", "siglaTipo": "PL", "codTipo": 139,
                "numero": 10, "ano": 2024, "ementa": "Curta",
                "ementaDetalhada": "Longa e detalhada"}"#,
        )
        .unwrap();
        assert_eq!(prop.explanation_source(), "Longa e detalhada");

        prop.detailed_ementa = Some("   ".into());
        assert_eq!(prop.explanation_source(), "Curta");

        prop.detailed_ementa = None;
        assert_eq!(prop.explanation_source(), "Curta");
        assert_eq!(prop.title(), "PL 10/2024");
    }

    #[test]
    fn procedure_fields_are_nullable() {
        let procs: Vec<Procedure> = serde_json::from_str(
            r#"[{"id": null, "dataHora": null, "sequencia": null, "siglaOrgao": null},
                {"id": 77, "codTipoTramitacao": 100, "despacho": "Apense-se"}]"#,
        )
        .unwrap();
        assert_eq!(procs[0], Procedure::default());
        assert_eq!(procs[1].id.as_deref(), Some("77"));
        assert_eq!(procs[1].tramitation_code.as_deref(), Some("100"));
        assert_eq!(procs[1].dispatch.as_deref(), Some("Apense-se"));
    }

    #[test]
    fn poll_detail_null_lists_become_empty() {
        let detail: PollDetail = serde_json::from_str(
            r#"{"id": "2265603-43", "aprovacao": 1, "siglaOrgao": "PLEN",
                "efeitosRegistrados": null, "objetosPossiveis": null,
                "proposicoesAfetadas": [{"id": 5, "siglaTipo": "PL", "numero": 1, "ano": 2020}]}"#,
        )
        .unwrap();
        assert_eq!(detail.poll.id.0, "2265603-43");
        assert_eq!(detail.poll.approval, Approval::Approved);
        assert!(detail.registered_effects.is_empty());
        assert!(detail.possible_objects.is_empty());
        assert_eq!(detail.affected_propositions.len(), 1);
    }

    #[test]
    fn vote_accepts_both_payload_shapes() {
        let legacy: Vote = serde_json::from_str(
            r#"{"id": 1, "nome": "Fulano", "siglaPartido": "ABC", "voto": "Sim"}"#,
        )
        .unwrap();
        assert_eq!(legacy.voter_name(), Some("Fulano"));
        assert_eq!(legacy.choice_label(), "Sim");
        assert_eq!(legacy.voter_uf(), None);

        let current: Vote = serde_json::from_str(
            r#"{"tipoVoto": "Não", "dataRegistroVoto": "2023-05-10T18:02:11",
                "deputado_": {"id": 204554, "nome": "Beltrana", "siglaPartido": "XYZ", "siglaUf": "SP"}}"#,
        )
        .unwrap();
        assert_eq!(current.voter_name(), Some("Beltrana"));
        assert_eq!(current.voter_party(), Some("XYZ"));
        assert_eq!(current.voter_uf(), Some("SP"));
        assert_eq!(current.choice_label(), "Não");

        let blank: Vote = serde_json::from_str("{}").unwrap();
        assert_eq!(blank.choice_label(), "Sem voto");
    }

    #[test]
    fn keyword_tokens_combine_into_one_value() {
        let filter = PropositionFilter::default().with_keywords_str("  saúde   criança ");
        assert_eq!(filter.keywords, vec!["saúde", "criança"]);
        assert_eq!(filter.keywords_param().as_deref(), Some("saúde criança"));

        let empty = PropositionFilter::default().with_keywords_str("   ");
        assert_eq!(empty.keywords_param(), None);
    }

    #[test]
    fn next_page_stops_on_empty_page() {
        assert_eq!(PropositionFilter::next_page(1, 15), Some(2));
        assert_eq!(PropositionFilter::next_page(4, 0), None);
    }

    #[test]
    fn type_labels() {
        assert_eq!(proposition_type_label("PEC"), "Proposta de Emenda à Constituição");
        assert_eq!(proposition_type_label("REQ"), "REQ");
    }

    #[test]
    fn proposition_fixture_validates() {
        let fixture = std::fs::read_to_string("../../../fixtures/json/proposition.fixture.json")
            .expect("read fixture");
        let envelope: Envelope<Proposition> =
            serde_json::from_str(&fixture).expect("deserialize fixture proposition");
        let prop = envelope.dados;
        assert_eq!(prop.id, PropositionId(2270800));
        assert_eq!(prop.type_abbreviation, "PL");
        let status = prop.status.expect("status present");
        assert_eq!(status.committee.as_deref(), Some("CSAUDE"));
        assert_eq!(status.tramitation_code.as_deref(), Some("322"));
    }

    #[test]
    fn procedures_fixture_validates() {
        let fixture = std::fs::read_to_string("../../../fixtures/json/procedures.fixture.json")
            .expect("read fixture");
        let envelope: Envelope<Vec<Procedure>> =
            serde_json::from_str(&fixture).expect("deserialize fixture procedures");
        assert_eq!(envelope.dados.len(), 3);
        assert!(envelope.dados[2].timestamp.is_none());
    }
}
