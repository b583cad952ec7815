//! Client for the Chamber of Deputies open-data API.
//!
//! Every endpoint answers with a `{ "dados": ... }` envelope. The client
//! unwraps it, maps non-success statuses to [`CamaraError::Fetch`] tagged
//! with the resource kind, and validates payloads into typed records.
//! Nothing is cached: every call goes to the network.

mod fetchers;

use camara_shared::{
    Author, CamaraError, Envelope, OpenDataConfig, Poll, PollDetail, PollId, PollWithVotes,
    Procedure, Proposition, PropositionFilter, PropositionId, PropositionSummary, Resource,
    Result, Theme, Vote,
};
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};
use url::Url;

pub use fetchers::{
    FetchAuthors, FetchPollDetails, FetchPolls, FetchProcedures, FetchProposition, FetchThemes,
    ListPropositions,
};

/// User-Agent string for open-data requests.
const USER_AGENT: &str = concat!("camara/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Typed access to the open-data endpoints. Cheap to clone.
#[derive(Debug, Clone)]
pub struct OpenDataClient {
    client: Client,
    base_url: Url,
}

impl OpenDataClient {
    /// Build a client from the `[opendata]` config section.
    pub fn new(config: &OpenDataConfig) -> Result<Self> {
        let base_url = Url::parse(config.base_url.trim_end_matches('/')).map_err(|e| {
            CamaraError::config(format!("invalid open-data base URL {}: {e}", config.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(CamaraError::config(format!(
                "open-data base URL cannot carry a path: {base_url}"
            )));
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CamaraError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    /// List propositions matching `filter`, newest first.
    #[instrument(skip_all, fields(page = ?filter.page))]
    pub async fn list_propositions(
        &self,
        filter: &PropositionFilter,
    ) -> Result<Vec<PropositionSummary>> {
        let mut url = self.endpoint(&["proposicoes"]);
        url.query_pairs_mut().extend_pairs(listing_query(filter));

        let items: Vec<PropositionSummary> = self.get_dados(Resource::Propositions, url).await?;
        info!(count = items.len(), "listed propositions");
        Ok(items)
    }

    /// Fetch one proposition. The returned record's id must match `id`.
    #[instrument(skip_all, fields(id = %id))]
    pub async fn get_proposition(&self, id: PropositionId) -> Result<Proposition> {
        let url = self.endpoint(&["proposicoes", &id.to_string()]);
        let proposition: Proposition = self.get_dados(Resource::Proposition, url).await?;

        if proposition.id != id {
            return Err(CamaraError::validation(format!(
                "requested proposition {id}, received {}",
                proposition.id
            )));
        }
        Ok(proposition)
    }

    #[instrument(skip_all, fields(id = %id))]
    pub async fn get_authors(&self, id: PropositionId) -> Result<Vec<Author>> {
        let url = self.endpoint(&["proposicoes", &id.to_string(), "autores"]);
        self.get_dados(Resource::Authors, url).await
    }

    #[instrument(skip_all, fields(id = %id))]
    pub async fn get_procedures(&self, id: PropositionId) -> Result<Vec<Procedure>> {
        let url = self.endpoint(&["proposicoes", &id.to_string(), "tramitacoes"]);
        self.get_dados(Resource::Procedures, url).await
    }

    #[instrument(skip_all, fields(id = %id))]
    pub async fn get_themes(&self, id: PropositionId) -> Result<Vec<Theme>> {
        let url = self.endpoint(&["proposicoes", &id.to_string(), "temas"]);
        self.get_dados(Resource::Themes, url).await
    }

    #[instrument(skip_all, fields(id = %id))]
    pub async fn get_polls(&self, id: PropositionId) -> Result<Vec<Poll>> {
        let url = self.endpoint(&["proposicoes", &id.to_string(), "votacoes"]);
        self.get_dados(Resource::Polls, url).await
    }

    #[instrument(skip_all, fields(poll = %poll_id))]
    pub async fn get_poll(&self, poll_id: &PollId) -> Result<PollDetail> {
        let url = self.endpoint(&["votacoes", &poll_id.0]);
        self.get_dados(Resource::Poll, url).await
    }

    #[instrument(skip_all, fields(poll = %poll_id))]
    pub async fn get_votes(&self, poll_id: &PollId) -> Result<Vec<Vote>> {
        let url = self.endpoint(&["votacoes", &poll_id.0, "votos"]);
        self.get_dados(Resource::Votes, url).await
    }

    /// Poll detail joined with its votes.
    ///
    /// The detail fetch must succeed. The votes fetch runs only after it and
    /// degrades to an empty list on any failure.
    #[instrument(skip_all, fields(poll = %poll_id))]
    pub async fn get_poll_details(&self, poll_id: &PollId) -> Result<PollWithVotes> {
        let poll = self.get_poll(poll_id).await?;

        let votes = match self.get_votes(poll_id).await {
            Ok(votes) => votes,
            Err(e) => {
                warn!(error = %e, "votes unavailable, returning poll without votes");
                Vec::new()
            }
        };

        Ok(PollWithVotes { poll, votes })
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Append path segments to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// GET `url`, check the status, and unwrap the `dados` envelope.
    async fn get_dados<T: DeserializeOwned>(&self, resource: Resource, url: Url) -> Result<T> {
        debug!(%url, %resource, "requesting");

        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| CamaraError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CamaraError::fetch(resource, status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| CamaraError::Network(format!("{url}: failed to read body: {e}")))?;

        let envelope: Envelope<T> = serde_json::from_str(&body)
            .map_err(|e| CamaraError::parse(format!("invalid {resource} payload: {e}")))?;
        Ok(envelope.dados)
    }
}

/// Query parameters for the proposition listing.
///
/// Types repeat as `siglaTipo`; keyword tokens travel as one `keywords`
/// value so the remote service ANDs them. Results are always ordered by
/// descending id.
fn listing_query(filter: &PropositionFilter) -> Vec<(&'static str, String)> {
    let mut pairs: Vec<(&'static str, String)> = filter
        .types
        .iter()
        .filter(|t| !t.trim().is_empty())
        .map(|t| ("siglaTipo", t.trim().to_string()))
        .collect();

    if let Some(year) = filter.year {
        pairs.push(("ano", year.to_string()));
    }
    if let Some(page) = filter.page.filter(|p| *p > 0) {
        pairs.push(("pagina", page.to_string()));
    }
    if let Some(keywords) = filter.keywords_param() {
        pairs.push(("keywords", keywords));
    }
    if let Some(theme) = filter.theme {
        pairs.push(("codTema", theme.to_string()));
    }

    pairs.push(("ordem", "DESC".into()));
    pairs.push(("ordenarPor", "id".into()));
    pairs
}
