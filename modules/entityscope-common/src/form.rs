use serde::{Deserialize, Serialize};

/// Everything the user tells us about the company. All fields are optional at
/// this layer; target derivation decides what is usable. Empty strings count
/// as absent, mirroring how the intake form submits untouched fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisForm {
    pub company_name: String,
    pub website_url: String,
    pub leaders: Vec<LeaderEntry>,
    pub keywords: Vec<String>,
    pub competitors: Vec<CompetitorEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaderEntry {
    pub name: String,
    pub role: String,
}

/// A competitor is tracked by site; naming its leader adds a second,
/// leadership-flavored target for the same competitor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompetitorEntry {
    pub url: String,
    pub leader_name: String,
    pub leader_role: String,
}

impl AnalysisForm {
    /// True when no field carries usable (non-blank) input.
    pub fn is_empty(&self) -> bool {
        self.company_name.trim().is_empty()
            && self.website_url.trim().is_empty()
            && self
                .leaders
                .iter()
                .all(|l| l.name.trim().is_empty() && l.role.trim().is_empty())
            && self.keywords.iter().all(|k| k.trim().is_empty())
            && self.competitors.iter().all(|c| c.url.trim().is_empty())
    }
}
