//! The fan-out loop. Every derived target is asked of every selected persona,
//! one call at a time, in derivation then selection order. The full work
//! queue is materialized before the first call, so the progress total is
//! fixed up front. A failed call is recorded as a synthetic error cell and
//! never aborts the run.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use ai_client::Claude;
use entityscope_common::{
    AnalysisForm, AnalysisHint, AnalysisRun, EntityScopeError, Persona, PersonaCell, PersonaResult,
    Progress, TargetResult,
};

use crate::normalize::normalize;
use crate::prompt::{build_prompt, build_query_prompt};
use crate::targets::derive_targets;

/// Model every persona simulation runs on.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Reply cap per persona call. Normalized JSON replies fit well under this.
pub const MAX_REPLY_TOKENS: u32 = 1500;

/// One persona query round trip. The engine only needs raw reply text back;
/// tests substitute scripted implementations.
#[async_trait]
pub trait PersonaQuery: Send + Sync {
    async fn query(&self, prompt: &str) -> anyhow::Result<String>;
}

/// Production client: Anthropic Messages API with server-side web search.
#[derive(Clone)]
pub struct ClaudePersonaQuery {
    claude: Claude,
}

impl ClaudePersonaQuery {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            claude: Claude::new(api_key, DEFAULT_MODEL),
        }
    }
}

#[async_trait]
impl PersonaQuery for ClaudePersonaQuery {
    async fn query(&self, prompt: &str) -> anyhow::Result<String> {
        self.claude.search_completion(prompt, MAX_REPLY_TOKENS).await
    }
}

/// One unit of fan-out work: a single (target, persona) pair. Items are
/// dispatched strictly in queue order today; the queue shape leaves room for
/// a bounded worker pool without touching the aggregation contract.
struct WorkItem {
    target_index: usize,
    persona: Persona,
}

/// Run the full matrix for one form. Progress is reported after each cell is
/// stored, ending at `completed == total`. Validation failures surface before
/// any persona call is made.
pub async fn run_analysis(
    client: &dyn PersonaQuery,
    form: &AnalysisForm,
    personas: &[Persona],
    mut on_progress: impl FnMut(&Progress),
) -> Result<AnalysisRun, EntityScopeError> {
    if personas.is_empty() {
        return Err(EntityScopeError::Validation(
            "Please select at least one AI search engine.".to_string(),
        ));
    }

    let targets = derive_targets(form);
    if targets.is_empty() {
        return Err(EntityScopeError::Validation(
            "Please fill in at least one field.".to_string(),
        ));
    }

    // Target-major order: every persona answers one target before the run
    // moves to the next.
    let queue: Vec<WorkItem> = (0..targets.len())
        .flat_map(|target_index| {
            personas.iter().map(move |&persona| WorkItem {
                target_index,
                persona,
            })
        })
        .collect();
    let total = queue.len();

    info!(
        targets = targets.len(),
        personas = personas.len(),
        total,
        "Starting entity analysis"
    );

    let mut run = AnalysisRun {
        personas: personas.to_vec(),
        targets: targets
            .iter()
            .map(|t| TargetResult {
                label: t.label.clone(),
                kind: t.kind,
                query_text: t.query_text.clone(),
                cells: Vec::with_capacity(personas.len()),
            })
            .collect(),
    };

    let mut completed = 0;
    for item in queue {
        let target = &targets[item.target_index];
        let prompt = build_prompt(target, item.persona.display_name());
        let result = match client.query(&prompt).await {
            Ok(raw) => normalize(&raw),
            Err(e) => {
                warn!(
                    target = target.label.as_str(),
                    persona = item.persona.id(),
                    error = %e,
                    "Persona query failed"
                );
                PersonaResult::failure(format!("Error: {e}"))
            }
        };
        debug!(
            target = target.label.as_str(),
            persona = item.persona.id(),
            error = result.error,
            "Cell recorded"
        );
        run.targets[item.target_index].cells.push(PersonaCell {
            persona: item.persona,
            result,
        });

        completed += 1;
        on_progress(&Progress {
            completed,
            total,
            message: format!(
                "Analyzing {} with {}...",
                target.label,
                item.persona.display_name()
            ),
        });
    }

    let summary = RunSummary::from_run(&run);
    info!("{summary}");
    Ok(run)
}

/// One-shot analysis of a single query, as submitted over the HTTP surface.
/// Upstream failures are surfaced to the caller instead of being folded into
/// a synthetic cell.
pub async fn analyze_single(
    client: &dyn PersonaQuery,
    query: &str,
    persona_name: &str,
    hint: AnalysisHint,
) -> Result<PersonaResult, EntityScopeError> {
    let prompt = build_query_prompt(query, persona_name, hint);
    let raw = client
        .query(&prompt)
        .await
        .map_err(|e| EntityScopeError::Upstream(e.to_string()))?;
    Ok(normalize(&raw))
}

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub targets: usize,
    pub cells: usize,
    pub errors: usize,
    pub found: usize,
}

impl RunSummary {
    pub fn from_run(run: &AnalysisRun) -> Self {
        Self {
            targets: run.targets.len(),
            cells: run.cell_count(),
            errors: run.error_count(),
            found: run
                .cells()
                .filter(|(_, c)| c.result.entity_found == Some(true))
                .count(),
        }
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Analysis Run Complete ===")?;
        writeln!(f, "Targets analyzed: {}", self.targets)?;
        writeln!(f, "Persona answers:  {}", self.cells)?;
        writeln!(f, "Entity sightings: {}", self.found)?;
        writeln!(f, "Failed queries:   {}", self.errors)
    }
}
