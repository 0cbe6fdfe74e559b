use serde::{Deserialize, Serialize};

use crate::persona::Persona;

// --- Targets ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Company,
    Website,
    Leader,
    Keyword,
    Competitor,
    CompetitorLeader,
}

impl TargetKind {
    /// Competitor-derived cells feed the gap and recommendation views but
    /// never the visibility score means.
    pub fn is_competitor(&self) -> bool {
        matches!(self, TargetKind::Competitor | TargetKind::CompetitorLeader)
    }
}

impl std::fmt::Display for TargetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetKind::Company => write!(f, "company"),
            TargetKind::Website => write!(f, "website"),
            TargetKind::Leader => write!(f, "leader"),
            TargetKind::Keyword => write!(f, "keyword"),
            TargetKind::Competitor => write!(f, "competitor"),
            TargetKind::CompetitorLeader => write!(f, "competitor_leader"),
        }
    }
}

/// Steers which output schema the prompt asks the model to fill in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisHint {
    Entity,
    Backlinks,
    Leadership,
    Competitor,
}

impl std::fmt::Display for AnalysisHint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisHint::Entity => write!(f, "entity"),
            AnalysisHint::Backlinks => write!(f, "backlinks"),
            AnalysisHint::Leadership => write!(f, "leadership"),
            AnalysisHint::Competitor => write!(f, "competitor"),
        }
    }
}

/// One thing to ask the personas about. Built once per run from the form,
/// immutable afterward. `label` doubles as the mapping key in the run matrix,
/// so derivation keeps it unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityTarget {
    pub kind: TargetKind,
    pub label: String,
    pub query_text: String,
    pub hint: AnalysisHint,
}

// --- Sentiment ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub fn from_str_loose(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "positive" => Sentiment::Positive,
            "negative" => Sentiment::Negative,
            _ => Sentiment::Neutral,
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sentiment::Positive => write!(f, "positive"),
            Sentiment::Neutral => write!(f, "neutral"),
            Sentiment::Negative => write!(f, "negative"),
        }
    }
}

// --- Persona reply records ---

/// A source the model claims to have consulted. Everything here is
/// model-supplied and unverified, domain authority included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_authority: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backlink {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_authority: Option<u32>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub link_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PressOpportunity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outlet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodcastOpportunity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

// --- Persona result ---

/// One persona's answer to one target, as normalized from the model's output.
/// Fields the model omitted stay absent; sequence fields keep the distinction
/// between "absent" and "present but empty" because the fallback shape emits
/// empty sequences explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_found: Option<bool>,
    /// 1-10 when the model supplied one; 0 only on synthetic error cells.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment_score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_sources: Option<Vec<SourceRef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backlinks: Option<Vec<Backlink>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub press_opportunities: Option<Vec<PressOpportunity>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub podcast_opportunities: Option<Vec<PodcastOpportunity>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub error: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl PersonaResult {
    /// Fixed shape returned when the model's output had no parseable JSON
    /// object in it. The raw text survives as the summary.
    pub fn fallback(raw_text: &str) -> Self {
        Self {
            summary: Some(raw_text.to_string()),
            entity_found: Some(false),
            confidence_score: Some(5),
            sentiment_score: Some(5),
            sentiment: Some(Sentiment::Neutral),
            top_sources: Some(Vec::new()),
            backlinks: Some(Vec::new()),
            press_opportunities: Some(Vec::new()),
            podcast_opportunities: Some(Vec::new()),
            recommendations: Some("Analysis completed".to_string()),
            error: false,
        }
    }

    /// Synthetic cell recorded when the persona call itself failed. Zero
    /// confidence keeps it out of every score mean.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            summary: Some(message.into()),
            entity_found: None,
            confidence_score: Some(0),
            sentiment_score: Some(5),
            sentiment: None,
            top_sources: None,
            backlinks: None,
            press_opportunities: None,
            podcast_opportunities: None,
            recommendations: None,
            error: true,
        }
    }
}

// --- Run matrix ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaCell {
    pub persona: Persona,
    pub result: PersonaResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetResult {
    pub label: String,
    pub kind: TargetKind,
    pub query_text: String,
    pub cells: Vec<PersonaCell>,
}

/// The frozen result matrix for one submitted form. Target order is the
/// derivation order; cell order within a target is the persona selection
/// order. Written by exactly one orchestration loop, read only afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRun {
    pub personas: Vec<Persona>,
    pub targets: Vec<TargetResult>,
}

impl AnalysisRun {
    /// Flat iteration over every (target, cell) pair in run order.
    pub fn cells(&self) -> impl Iterator<Item = (&TargetResult, &PersonaCell)> {
        self.targets
            .iter()
            .flat_map(|t| t.cells.iter().map(move |c| (t, c)))
    }

    pub fn cell_count(&self) -> usize {
        self.targets.iter().map(|t| t.cells.len()).sum()
    }

    pub fn error_count(&self) -> usize {
        self.cells().filter(|(_, c)| c.result.error).count()
    }
}

// --- Progress ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    pub message: String,
}
