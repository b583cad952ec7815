//! CLI command definitions, routing, and tracing setup.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use serde::Serialize;
use tracing::info;

use camara_core::ordering::{PollSummary, sort_polls_desc};
use camara_core::{
    Aggregator, ExplanationEnricher, Orchestrator, ProcedureAnalysisEnricher, SilentProgress, View,
};
use camara_generative::{OpenRouterGenerator, TextGenerator};
use camara_opendata::{
    FetchPollDetails, FetchPolls, FetchProcedures, ListPropositions, OpenDataClient,
};
use camara_shared::{
    AggregationPolicy, AppConfig, Operation, PollId, PropositionFilter, PropositionId, THEMES,
    init_config, load_config, theme_label,
};

use crate::progress::CliProgress;
use crate::render;
use crate::retry::with_retries;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Câmara explorer: legislative open data with plain-language explanations.
#[derive(Parser)]
#[command(
    name = "camara",
    version,
    about = "Browse propositions, procedures and polls of the Brazilian Chamber of Deputies.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Print JSON instead of human-readable output.
    #[arg(long, global = true)]
    pub json: bool,

    /// Retry failed remote calls up to N times with exponential backoff.
    #[arg(long, default_value_t = 0, global = true)]
    pub retries: u32,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Named proposition views.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum ViewArg {
    /// Proposition, authors, procedures and themes.
    Basic,
    /// Proposition, authors and procedures, then an explanation.
    Explained,
    /// Everything in `basic`, then an explanation.
    Details,
    /// Generated analysis of the procedural history.
    ProcedureAnalysis,
}

impl From<ViewArg> for View {
    fn from(arg: ViewArg) -> Self {
        match arg {
            ViewArg::Basic => View::Basic,
            ViewArg::Explained => View::Explained,
            ViewArg::Details => View::Details,
            ViewArg::ProcedureAnalysis => View::ProcedureAnalysis,
        }
    }
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// List propositions, newest first.
    List {
        /// Type abbreviation (PL, PEC, MPV, ...). Repeatable.
        #[arg(short = 't', long = "type")]
        types: Vec<String>,

        /// Presentation year.
        #[arg(short, long)]
        year: Option<i32>,

        /// Keywords; every word must match.
        #[arg(short, long)]
        keywords: Option<String>,

        /// Theme code (see `camara themes`).
        #[arg(long)]
        theme: Option<i64>,

        /// Page number, starting at 1.
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },

    /// Show one proposition through a named view.
    Show {
        /// Proposition id.
        id: PropositionId,

        /// Which parts to fetch and generate.
        #[arg(long, value_enum, default_value = "details")]
        view: ViewArg,

        /// Keep the parts that succeeded when others fail.
        #[arg(long)]
        best_effort: bool,
    },

    /// Explain a legal summary in plain words.
    Explain {
        /// The ementa text.
        text: String,
    },

    /// Analyze a proposition's procedural history.
    Analyze {
        /// Proposition id.
        id: PropositionId,
    },

    /// List the polls held on a proposition.
    Polls {
        /// Proposition id.
        id: PropositionId,
    },

    /// Show one poll and its individual votes.
    Poll {
        /// Poll id, e.g. 2265603-43.
        id: String,
    },

    /// List theme codes, or the themes of one proposition.
    Themes {
        /// Proposition id.
        #[arg(long)]
        proposition: Option<PropositionId>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr so `--json`
/// output stays clean.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = ["camara_cli", "camara_core", "camara_opendata", "camara_generative", "camara_shared"]
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",");

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Global output and retry settings shared by every handler.
struct Ctx {
    config: AppConfig,
    json: bool,
    retries: u32,
}

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    if let Command::Config { action } = &cli.command {
        return match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        };
    }

    let ctx = Ctx {
        config: load_config()?,
        json: cli.json,
        retries: cli.retries,
    };

    match cli.command {
        Command::List {
            types,
            year,
            keywords,
            theme,
            page,
        } => {
            let filter = PropositionFilter {
                types,
                year,
                theme,
                page: Some(page),
                ..Default::default()
            }
            .with_keywords_str(keywords.as_deref().unwrap_or_default());
            cmd_list(&ctx, filter).await
        }
        Command::Show {
            id,
            view,
            best_effort,
        } => cmd_show(&ctx, id, view.into(), best_effort).await,
        Command::Explain { text } => cmd_explain(&ctx, &text).await,
        Command::Analyze { id } => cmd_analyze(&ctx, id).await,
        Command::Polls { id } => cmd_polls(&ctx, id).await,
        Command::Poll { id } => cmd_poll(&ctx, PollId(id)).await,
        Command::Themes { proposition } => cmd_themes(&ctx, proposition).await,
        Command::Config { .. } => Ok(()),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn text_generator(config: &AppConfig) -> Result<Arc<dyn TextGenerator>> {
    let generator = OpenRouterGenerator::from_config(&config.generative)?;
    info!(model = generator.model(), "generative service configured");
    Ok(Arc::new(generator))
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_list(ctx: &Ctx, filter: PropositionFilter) -> Result<()> {
    let list = ListPropositions::new(OpenDataClient::new(&ctx.config.opendata)?);
    let items = with_retries(ctx.retries, || list.run(filter.clone())).await?;

    if ctx.json {
        return print_json(&items);
    }

    if let Some(label) = filter.theme.and_then(theme_label) {
        println!("  Theme: {label}");
        println!();
    }
    render::summaries(&items);
    let page = filter.page.unwrap_or(1);
    if let Some(next) = PropositionFilter::next_page(page, items.len()) {
        println!();
        println!("  Page {page}. Next: --page {next}");
    }
    Ok(())
}

async fn cmd_show(ctx: &Ctx, id: PropositionId, view: View, best_effort: bool) -> Result<()> {
    let client = OpenDataClient::new(&ctx.config.opendata)?;
    let description = view.description();

    let generator = if description.steps().any(|s| s.needs_generator()) {
        Some(text_generator(&ctx.config)?)
    } else {
        None
    };

    let mut aggregator = Aggregator::from_config(&client, generator, &ctx.config);
    if best_effort {
        aggregator = aggregator.with_policy(AggregationPolicy::BestEffort);
    }
    let orchestrator = Orchestrator::new(aggregator);

    info!(%id, view = view.as_str(), "showing proposition");

    let collected = if ctx.json {
        with_retries(ctx.retries, || orchestrator.run_view(view, id, &SilentProgress)).await?
    } else {
        let progress = CliProgress::new(&format!("Loading proposition {id}"));
        let result =
            with_retries(ctx.retries, || orchestrator.run_view(view, id, &progress)).await;
        progress.finish();
        result?
    };

    if ctx.json {
        return print_json(&collected);
    }
    render::collected(&collected);
    Ok(())
}

async fn cmd_explain(ctx: &Ctx, text: &str) -> Result<()> {
    let enricher =
        ExplanationEnricher::new(text_generator(&ctx.config)?, ctx.config.pipeline.explanation_on_missing);
    let explanation = with_retries(ctx.retries, || enricher.explain(text)).await?;

    if ctx.json {
        return print_json(&explanation);
    }
    println!("{}", explanation.explanation);
    Ok(())
}

async fn cmd_analyze(ctx: &Ctx, id: PropositionId) -> Result<()> {
    let client = OpenDataClient::new(&ctx.config.opendata)?;
    let enricher = ProcedureAnalysisEnricher::new(
        Arc::new(FetchProcedures::new(client)),
        text_generator(&ctx.config)?,
        ctx.config.generative.analysis_temperature,
        ctx.config.pipeline.analysis_on_missing,
    );

    let progress: Option<CliProgress> =
        (!ctx.json).then(|| CliProgress::new(&format!("Analyzing procedures of {id}")));
    let result = with_retries(ctx.retries, || enricher.analyze(id)).await;
    if let Some(p) = &progress {
        p.finish();
    }
    let analysis = result?;

    if ctx.json {
        return print_json(&analysis);
    }
    render::analysis(&analysis);
    Ok(())
}

async fn cmd_polls(ctx: &Ctx, id: PropositionId) -> Result<()> {
    let fetch = FetchPolls::new(OpenDataClient::new(&ctx.config.opendata)?);
    let mut polls = with_retries(ctx.retries, || fetch.run(id)).await?;
    sort_polls_desc(&mut polls);

    if ctx.json {
        #[derive(Serialize)]
        struct PollsOutput<'a> {
            summary: PollSummary,
            polls: &'a [camara_shared::Poll],
        }
        return print_json(&PollsOutput {
            summary: PollSummary::from_polls(&polls),
            polls: &polls,
        });
    }
    render::polls(&polls);
    Ok(())
}

async fn cmd_poll(ctx: &Ctx, id: PollId) -> Result<()> {
    let fetch = FetchPollDetails::new(OpenDataClient::new(&ctx.config.opendata)?);
    let details = with_retries(ctx.retries, || fetch.run(id.clone())).await?;

    if ctx.json {
        return print_json(&details);
    }
    render::poll_details(&details);
    Ok(())
}

async fn cmd_themes(ctx: &Ctx, proposition: Option<PropositionId>) -> Result<()> {
    let Some(id) = proposition else {
        if ctx.json {
            let catalogue: Vec<_> = THEMES
                .iter()
                .map(|(code, label)| serde_json::json!({ "codTema": code, "tema": label }))
                .collect();
            return print_json(&catalogue);
        }
        for (code, label) in THEMES {
            println!("  {code:>4}  {label}");
        }
        return Ok(());
    };

    let client = OpenDataClient::new(&ctx.config.opendata)?;
    let themes = with_retries(ctx.retries, || client.get_themes(id)).await?;
    if ctx.json {
        return print_json(&themes);
    }
    render::themes(&themes);
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
