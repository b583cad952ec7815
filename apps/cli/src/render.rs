//! Human-readable output.

use camara_core::Collected;
use camara_core::ordering::{PollSummary, format_date_br};
use camara_shared::{
    Author, Poll, PollWithVotes, Procedure, ProcedureAnalysis, Proposition, PropositionSummary,
    Theme, proposition_type_label,
};

const EMENTA_PREVIEW_CHARS: usize = 110;

fn truncate(text: &str, max: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max).collect();
    if chars.next().is_some() {
        format!("{}…", head.trim_end())
    } else {
        head
    }
}

fn date_or_dash(raw: Option<&str>) -> String {
    raw.and_then(format_date_br)
        .unwrap_or_else(|| "-".to_string())
}

pub(crate) fn summaries(items: &[PropositionSummary]) {
    if items.is_empty() {
        println!("  No propositions found.");
        return;
    }
    for item in items {
        println!(
            "  {:<10} {:>5} {}/{}  {}",
            item.id.to_string(),
            item.type_abbreviation,
            item.number,
            item.year,
            truncate(&item.ementa, EMENTA_PREVIEW_CHARS)
        );
    }
}

pub(crate) fn proposition(p: &Proposition) {
    println!();
    println!("  {}  ({})", p.title(), proposition_type_label(&p.type_abbreviation));
    println!("  ID:        {}", p.id);
    println!("  Presented: {}", date_or_dash(p.presented_at.as_deref()));
    if let Some(status) = &p.status {
        println!(
            "  Status:    {} ({})",
            status.situation.as_deref().unwrap_or("-"),
            status.committee.as_deref().unwrap_or("-")
        );
    }
    println!();
    println!("  {}", p.ementa);
    if let Some(url) = &p.full_text_url {
        println!("  Full text: {url}");
    }
}

pub(crate) fn authors(authors: &[Author]) {
    println!();
    println!("  Authors");
    for a in authors {
        let marker = if a.is_proponent() { "*" } else { " " };
        println!("  {marker} {:>3}. {} ({})", a.signature_order, a.name, a.kind);
    }
}

pub(crate) fn procedures(procedures: &[Procedure]) {
    println!();
    println!("  Procedures");
    for p in procedures {
        println!(
            "  {:<10} {:<8} {}",
            date_or_dash(p.timestamp.as_deref()),
            p.committee.as_deref().unwrap_or("-"),
            p.tramitation.as_deref().unwrap_or("-")
        );
        if let Some(dispatch) = p.dispatch.as_deref().filter(|d| !d.trim().is_empty()) {
            println!("  {:<19} {}", "", truncate(dispatch, EMENTA_PREVIEW_CHARS));
        }
    }
}

pub(crate) fn themes(themes: &[Theme]) {
    println!();
    println!("  Themes");
    for t in themes {
        println!("  {:>4}  {}", t.code, t.label);
    }
}

pub(crate) fn analysis(analysis: &ProcedureAnalysis) {
    println!();
    println!("  Procedure analysis");
    println!();
    println!("{}", analysis.explanation);
}

pub(crate) fn collected(c: &Collected) {
    if let Some(p) = &c.proposition {
        proposition(p);
    }
    if let Some(e) = &c.explanation {
        println!();
        println!("  In plain words");
        println!("  {}", e.explanation);
    }
    if let Some(a) = &c.authors {
        authors(a);
    }
    if let Some(t) = &c.themes {
        themes(t);
    }
    if let Some(p) = &c.procedures {
        procedures(p);
    }
    if let Some(a) = &c.procedure_analysis {
        analysis(a);
    }
    if !c.failures.is_empty() {
        println!();
        println!("  Unavailable parts");
        for f in &c.failures {
            println!("  ✗ {}: {}", f.part, f.error);
        }
    }
    println!();
}

fn tally(poll: &Poll) -> String {
    match poll.tally() {
        Some(t) => format!("Sim {} · Não {} · Abst {}", t.yes, t.no, t.abstain),
        None => String::new(),
    }
}

pub(crate) fn polls(polls: &[Poll]) {
    let summary = PollSummary::from_polls(polls);
    println!(
        "  {} polls: {} approved, {} rejected, {} not applicable",
        summary.total, summary.approved, summary.rejected, summary.not_applicable
    );
    println!();
    for poll in polls {
        println!(
            "  {:<14} {:<10} {:<8} {:<14} {}",
            poll.id,
            date_or_dash(poll.timestamp()),
            poll.committee.as_deref().unwrap_or("-"),
            poll.approval.label(),
            tally(poll)
        );
        if let Some(d) = &poll.description {
            println!("  {:<14} {}", "", truncate(d, EMENTA_PREVIEW_CHARS));
        }
    }
}

pub(crate) fn poll_details(details: &PollWithVotes) {
    let poll = &details.poll.poll;
    println!();
    println!("  Poll {}  ({})", poll.id, poll.approval.label());
    println!("  Date:  {}", date_or_dash(poll.timestamp()));
    println!("  Organ: {}", poll.committee.as_deref().unwrap_or("-"));
    if let Some(d) = &poll.description {
        println!("  {d}");
    }
    for affected in &details.poll.affected_propositions {
        println!(
            "  Affects: {} {}/{}",
            affected.type_abbreviation.as_deref().unwrap_or("?"),
            affected.number.map(|n| n.to_string()).unwrap_or_default(),
            affected.year.map(|y| y.to_string()).unwrap_or_default()
        );
    }

    println!();
    if details.votes.is_empty() {
        println!("  No individual votes recorded.");
        return;
    }
    println!("  Votes ({})", details.votes.len());
    for vote in &details.votes {
        println!(
            "  {:<32} {:<12} {:<3} {}",
            vote.voter_name().unwrap_or("-"),
            vote.voter_party().unwrap_or("-"),
            vote.voter_uf().unwrap_or("-"),
            vote.choice_label()
        );
    }
}
