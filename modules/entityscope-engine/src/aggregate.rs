//! Aggregate views over a completed run. Score means count only cells that
//! hold a real model-supplied confidence (non-error, 1-10); competitor-derived
//! cells feed the gap and recommendation views but never the visibility means.

use std::collections::HashSet;

use serde::Serialize;

use entityscope_common::{
    AnalysisRun, Backlink, Persona, PersonaResult, PodcastOpportunity, PressOpportunity,
    TargetKind,
};

/// How many gap links and recommendation entries each view keeps.
const GAP_LIMIT: usize = 3;
const RECOMMENDATION_LIMIT: usize = 5;

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// A cell contributes to score means only when the call succeeded and the
/// model supplied an in-range confidence. Synthetic error cells carry 0 and
/// are excluded here.
fn contributing_score(result: &PersonaResult) -> Option<f64> {
    if result.error {
        return None;
    }
    match result.confidence_score {
        Some(s) if (1..=10).contains(&s) => Some(f64::from(s)),
        _ => None,
    }
}

fn mean_for_kinds(run: &AnalysisRun, kinds: &[TargetKind]) -> f64 {
    let scores: Vec<f64> = run
        .cells()
        .filter(|(t, _)| kinds.contains(&t.kind))
        .filter_map(|(_, c)| contributing_score(&c.result))
        .collect();
    round1(mean(&scores))
}

/// Mean confidence across every non-competitor cell, one decimal place.
/// 0.0 when nothing contributed.
pub fn overall_score(run: &AnalysisRun) -> f64 {
    let scores: Vec<f64> = run
        .cells()
        .filter(|(t, _)| !t.kind.is_competitor())
        .filter_map(|(_, c)| contributing_score(&c.result))
        .collect();
    round1(mean(&scores))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryScores {
    pub company: f64,
    pub leadership: f64,
    pub keywords: f64,
}

/// Per-category means. Company covers both the company name and website
/// targets; competitors stay out of every bucket.
pub fn category_scores(run: &AnalysisRun) -> CategoryScores {
    CategoryScores {
        company: mean_for_kinds(run, &[TargetKind::Company, TargetKind::Website]),
        leadership: mean_for_kinds(run, &[TargetKind::Leader]),
        keywords: mean_for_kinds(run, &[TargetKind::Keyword]),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonaScore {
    pub persona: Persona,
    pub score: f64,
}

/// Per-engine means over non-competitor cells, in the run's persona order.
pub fn persona_scores(run: &AnalysisRun) -> Vec<PersonaScore> {
    run.personas
        .iter()
        .map(|&persona| {
            let scores: Vec<f64> = run
                .cells()
                .filter(|(t, c)| !t.kind.is_competitor() && c.persona == persona)
                .filter_map(|(_, c)| contributing_score(&c.result))
                .collect();
            PersonaScore {
                persona,
                score: round1(mean(&scores)),
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderSentiment {
    pub label: String,
    pub sentiment_score: f64,
}

/// Mean sentiment per leader target. Every cell counts here, error cells
/// included, with 5 standing in where the model gave no sentiment score.
pub fn leadership_sentiment(run: &AnalysisRun) -> Vec<LeaderSentiment> {
    run.targets
        .iter()
        .filter(|t| t.kind == TargetKind::Leader)
        .map(|t| {
            let scores: Vec<f64> = t
                .cells
                .iter()
                .map(|c| f64::from(c.result.sentiment_score.unwrap_or(5)))
                .collect();
            LeaderSentiment {
                label: t.label.clone(),
                sentiment_score: round1(mean(&scores)),
            }
        })
        .collect()
}

/// Backlinks competitors hold that the analyzed website does not, strongest
/// first. Links without a url cannot be compared and are dropped.
pub fn backlink_gap(run: &AnalysisRun) -> Vec<Backlink> {
    let own: HashSet<&str> = run
        .cells()
        .filter(|(t, _)| t.kind == TargetKind::Website)
        .filter_map(|(_, c)| c.result.backlinks.as_deref())
        .flatten()
        .filter_map(|b| b.url.as_deref())
        .collect();

    let mut seen: HashSet<String> = HashSet::new();
    let mut gap: Vec<Backlink> = run
        .cells()
        .filter(|(t, _)| t.kind == TargetKind::Competitor)
        .filter_map(|(_, c)| c.result.backlinks.as_deref())
        .flatten()
        .filter(|b| match b.url.as_deref() {
            Some(url) => !own.contains(url) && seen.insert(url.to_string()),
            None => false,
        })
        .cloned()
        .collect();

    gap.sort_by(|a, b| {
        b.domain_authority
            .unwrap_or(0)
            .cmp(&a.domain_authority.unwrap_or(0))
    });
    gap.truncate(GAP_LIMIT);
    gap
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Recommendations {
    pub press: Vec<PressOpportunity>,
    pub podcasts: Vec<PodcastOpportunity>,
    pub backlinks: Vec<Backlink>,
}

/// Outreach candidates pooled across the whole run. Press entries are keyed
/// by outlet and podcasts by name; entries without their key are dropped.
/// Backlink candidates come from competitor cells only.
pub fn recommendations(run: &AnalysisRun) -> Recommendations {
    let mut press: Vec<PressOpportunity> = Vec::new();
    let mut seen_outlets: HashSet<String> = HashSet::new();
    let mut podcasts: Vec<PodcastOpportunity> = Vec::new();
    let mut seen_names: HashSet<String> = HashSet::new();

    for (_, cell) in run.cells() {
        for p in cell.result.press_opportunities.as_deref().unwrap_or_default() {
            let Some(outlet) = p.outlet.as_deref() else {
                continue;
            };
            if seen_outlets.insert(outlet.to_string()) {
                press.push(p.clone());
            }
        }
        for p in cell
            .result
            .podcast_opportunities
            .as_deref()
            .unwrap_or_default()
        {
            let Some(name) = p.name.as_deref() else {
                continue;
            };
            if seen_names.insert(name.to_string()) {
                podcasts.push(p.clone());
            }
        }
    }

    let mut backlinks: Vec<Backlink> = Vec::new();
    let mut seen_urls: HashSet<String> = HashSet::new();
    for (target, cell) in run.cells() {
        if target.kind != TargetKind::Competitor {
            continue;
        }
        for b in cell.result.backlinks.as_deref().unwrap_or_default() {
            let Some(url) = b.url.as_deref() else {
                continue;
            };
            if seen_urls.insert(url.to_string()) {
                backlinks.push(b.clone());
            }
        }
    }

    press.truncate(RECOMMENDATION_LIMIT);
    podcasts.truncate(RECOMMENDATION_LIMIT);
    backlinks.truncate(RECOMMENDATION_LIMIT);
    Recommendations {
        press,
        podcasts,
        backlinks,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusBand {
    Excellent,
    Good,
    NeedsWork,
    Poor,
    Critical,
}

impl StatusBand {
    pub fn for_score(score: f64) -> Self {
        if score >= 8.0 {
            StatusBand::Excellent
        } else if score >= 6.0 {
            StatusBand::Good
        } else if score >= 4.0 {
            StatusBand::NeedsWork
        } else if score >= 2.0 {
            StatusBand::Poor
        } else {
            StatusBand::Critical
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusBand::Excellent => "Excellent",
            StatusBand::Good => "Good",
            StatusBand::NeedsWork => "Needs Work",
            StatusBand::Poor => "Poor",
            StatusBand::Critical => "Critical",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            StatusBand::Excellent => "Strong visibility across AI search engines.",
            StatusBand::Good => "Solid presence with room to grow.",
            StatusBand::NeedsWork => "Visibility is inconsistent across engines.",
            StatusBand::Poor => "AI engines rarely surface this entity.",
            StatusBand::Critical => "Effectively invisible to AI search.",
        }
    }
}

impl std::fmt::Display for StatusBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
