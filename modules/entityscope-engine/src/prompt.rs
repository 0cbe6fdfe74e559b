//! Prompt construction for persona queries. One prompt per cell; the output
//! schema the model is asked to fill depends on the target's analysis hint.

use entityscope_common::{AnalysisHint, EntityTarget};

/// Base shape every hint requests.
const ENTITY_SCHEMA: &str = r#"{
  "summary": "2-3 sentence summary of findings",
  "entityFound": true/false,
  "confidenceScore": 1-10,
  "topSources": [
    {"url": "source url", "title": "source title", "snippet": "brief description"}
  ],
  "sentiment": "positive/neutral/negative",
  "recommendations": "brief recommendation for improving visibility"
}"#;

/// Backlink and competitor targets also probe link and coverage placement.
const BACKLINK_SCHEMA: &str = r#"{
  "summary": "2-3 sentence summary of findings",
  "entityFound": true/false,
  "confidenceScore": 1-10,
  "topSources": [
    {"url": "source url", "title": "source title", "snippet": "brief description", "domainAuthority": 1-100}
  ],
  "sentiment": "positive/neutral/negative",
  "backlinks": [
    {"url": "linking page url", "anchorText": "link text", "domainAuthority": 1-100, "type": "editorial/directory/guest-post"}
  ],
  "pressOpportunities": [
    {"outlet": "publication name", "reason": "why this outlet fits", "url": "outlet url"}
  ],
  "podcastOpportunities": [
    {"name": "podcast name", "reason": "why this show fits", "url": "show url"}
  ],
  "recommendations": "brief recommendation for improving visibility"
}"#;

/// Leadership targets additionally ask how the coverage reads.
const LEADERSHIP_SCHEMA: &str = r#"{
  "summary": "2-3 sentence summary of findings",
  "entityFound": true/false,
  "confidenceScore": 1-10,
  "sentimentScore": 1-10,
  "topSources": [
    {"url": "source url", "title": "source title", "snippet": "brief description"}
  ],
  "sentiment": "positive/neutral/negative",
  "recommendations": "brief recommendation for improving visibility"
}"#;

pub fn build_prompt(target: &EntityTarget, persona_name: &str) -> String {
    build_query_prompt(&target.query_text, persona_name, target.hint)
}

/// `persona_name` is a display label the model role-plays, not a credential.
pub fn build_query_prompt(query: &str, persona_name: &str, hint: AnalysisHint) -> String {
    format!(
        r#"You are simulating how the AI search engine "{persona_name}" would respond to a query. Search the web and provide information as that AI would.

Query: {query}

Provide your response in this JSON format (respond ONLY with valid JSON, no markdown):
{schema}"#,
        schema = schema_for(hint),
    )
}

fn schema_for(hint: AnalysisHint) -> &'static str {
    match hint {
        AnalysisHint::Entity => ENTITY_SCHEMA,
        AnalysisHint::Backlinks | AnalysisHint::Competitor => BACKLINK_SCHEMA,
        AnalysisHint::Leadership => LEADERSHIP_SCHEMA,
    }
}
