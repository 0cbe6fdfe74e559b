use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use entityscope_common::{AnalysisForm, AnalysisRun, Persona};
use entityscope_engine::aggregate::{
    backlink_gap, category_scores, leadership_sentiment, overall_score, persona_scores, StatusBand,
};
use entityscope_engine::{export, run_analysis, ClaudePersonaQuery};

#[derive(Parser)]
#[command(name = "entityscope", about = "AI search visibility analyzer")]
struct Cli {
    /// Path to the analysis form TOML file
    #[arg(long, default_value = "./entityscope.toml")]
    form: PathBuf,

    /// Comma-separated persona ids to simulate
    #[arg(long, default_value = "claude,chatgpt,perplexity")]
    personas: String,

    /// Write the per-cell CSV export here
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write the HTML report here
    #[arg(long)]
    html: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let form = load_form(&cli.form)?;
    let personas = parse_personas(&cli.personas)?;

    let api_key = std::env::var("ANTHROPIC_API_KEY")
        .context("ANTHROPIC_API_KEY environment variable is required")?;
    let client = ClaudePersonaQuery::new(api_key);

    info!(form = %cli.form.display(), personas = personas.len(), "Starting analysis");

    let run = run_analysis(&client, &form, &personas, |progress| {
        println!(
            "[{}/{}] {}",
            progress.completed, progress.total, progress.message
        );
    })
    .await?;

    print_report(&run);

    if let Some(path) = &cli.csv {
        fs::write(path, export::to_csv(&run))
            .with_context(|| format!("Failed to write CSV to {}", path.display()))?;
        info!(path = %path.display(), "CSV export written");
    }
    if let Some(path) = &cli.html {
        fs::write(path, export::to_html(&form.company_name, &run))
            .with_context(|| format!("Failed to write HTML report to {}", path.display()))?;
        info!(path = %path.display(), "HTML report written");
    }

    Ok(())
}

fn load_form(path: &Path) -> Result<AnalysisForm> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read form file: {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("Failed to parse form file: {}", path.display()))
}

fn parse_personas(raw: &str) -> Result<Vec<Persona>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| Persona::from_id(s).ok_or_else(|| anyhow::anyhow!("Unknown persona id: {s}")))
        .collect()
}

fn print_report(run: &AnalysisRun) {
    let overall = overall_score(run);
    let band = StatusBand::for_score(overall);
    let categories = category_scores(run);

    println!("\nOverall visibility: {overall}/10 ({band})");
    println!("{}", band.description());
    println!("\nCategory scores:");
    println!("  Company:    {}/10", categories.company);
    println!("  Leadership: {}/10", categories.leadership);
    println!("  Keywords:   {}/10", categories.keywords);

    println!("\nAI engine scores:");
    for entry in persona_scores(run) {
        println!("  {:<22} {}/10", entry.persona.display_name(), entry.score);
    }

    let sentiment = leadership_sentiment(run);
    if !sentiment.is_empty() {
        println!("\nLeadership sentiment:");
        for leader in &sentiment {
            println!("  {:<22} {}/10", leader.label, leader.sentiment_score);
        }
    }

    let gap = backlink_gap(run);
    if !gap.is_empty() {
        println!("\nBacklink gap:");
        for link in &gap {
            match (link.url.as_deref(), link.domain_authority) {
                (Some(url), Some(da)) => println!("  {url} (DA {da})"),
                (Some(url), None) => println!("  {url}"),
                _ => {}
            }
        }
    }
}
