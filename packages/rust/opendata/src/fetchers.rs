//! Fetchers as [`Operation`] units, so the aggregator can compose them.
//!
//! Each unit wraps a clone of the shared [`OpenDataClient`] and performs
//! exactly one client call per run.

use async_trait::async_trait;
use camara_shared::{
    Author, Operation, Poll, PollId, PollWithVotes, Procedure, Proposition, PropositionFilter,
    PropositionId, PropositionSummary, Result, Theme,
};

use crate::OpenDataClient;

// ---------------------------------------------------------------------------
// ListPropositions
// ---------------------------------------------------------------------------

/// One page of the proposition listing.
#[derive(Debug, Clone)]
pub struct ListPropositions {
    client: OpenDataClient,
}

impl ListPropositions {
    pub fn new(client: OpenDataClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Operation for ListPropositions {
    type Input = PropositionFilter;
    type Output = Vec<PropositionSummary>;

    fn name(&self) -> &'static str {
        "list_propositions"
    }

    async fn run(&self, filter: PropositionFilter) -> Result<Vec<PropositionSummary>> {
        self.client.list_propositions(&filter).await
    }
}

// ---------------------------------------------------------------------------
// FetchProposition
// ---------------------------------------------------------------------------

/// Full proposition record, id-checked.
#[derive(Debug, Clone)]
pub struct FetchProposition {
    client: OpenDataClient,
}

impl FetchProposition {
    pub fn new(client: OpenDataClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Operation for FetchProposition {
    type Input = PropositionId;
    type Output = Proposition;

    fn name(&self) -> &'static str {
        "proposition"
    }

    async fn run(&self, id: PropositionId) -> Result<Proposition> {
        self.client.get_proposition(id).await
    }
}

// ---------------------------------------------------------------------------
// FetchAuthors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FetchAuthors {
    client: OpenDataClient,
}

impl FetchAuthors {
    pub fn new(client: OpenDataClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Operation for FetchAuthors {
    type Input = PropositionId;
    type Output = Vec<Author>;

    fn name(&self) -> &'static str {
        "authors"
    }

    async fn run(&self, id: PropositionId) -> Result<Vec<Author>> {
        self.client.get_authors(id).await
    }
}

// ---------------------------------------------------------------------------
// FetchProcedures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FetchProcedures {
    client: OpenDataClient,
}

impl FetchProcedures {
    pub fn new(client: OpenDataClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Operation for FetchProcedures {
    type Input = PropositionId;
    type Output = Vec<Procedure>;

    fn name(&self) -> &'static str {
        "procedures"
    }

    async fn run(&self, id: PropositionId) -> Result<Vec<Procedure>> {
        self.client.get_procedures(id).await
    }
}

// ---------------------------------------------------------------------------
// FetchThemes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FetchThemes {
    client: OpenDataClient,
}

impl FetchThemes {
    pub fn new(client: OpenDataClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Operation for FetchThemes {
    type Input = PropositionId;
    type Output = Vec<Theme>;

    fn name(&self) -> &'static str {
        "themes"
    }

    async fn run(&self, id: PropositionId) -> Result<Vec<Theme>> {
        self.client.get_themes(id).await
    }
}

// ---------------------------------------------------------------------------
// FetchPolls
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FetchPolls {
    client: OpenDataClient,
}

impl FetchPolls {
    pub fn new(client: OpenDataClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Operation for FetchPolls {
    type Input = PropositionId;
    type Output = Vec<Poll>;

    fn name(&self) -> &'static str {
        "polls"
    }

    async fn run(&self, id: PropositionId) -> Result<Vec<Poll>> {
        self.client.get_polls(id).await
    }
}

// ---------------------------------------------------------------------------
// FetchPollDetails
// ---------------------------------------------------------------------------

/// Poll detail plus votes; votes degrade to empty on failure.
#[derive(Debug, Clone)]
pub struct FetchPollDetails {
    client: OpenDataClient,
}

impl FetchPollDetails {
    pub fn new(client: OpenDataClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Operation for FetchPollDetails {
    type Input = PollId;
    type Output = PollWithVotes;

    fn name(&self) -> &'static str {
        "poll_details"
    }

    async fn run(&self, poll_id: PollId) -> Result<PollWithVotes> {
        self.client.get_poll_details(&poll_id).await
    }
}
