//! Turns whatever the model sent back into a [`PersonaResult`]. Two stages:
//! a greedy brace-span extractor, then a strict decode of that span. Anything
//! that fails either stage takes the fixed fallback shape instead. Total by
//! construction; a parse problem never reaches the caller.

use serde::Deserialize;
use tracing::debug;

use entityscope_common::{
    Backlink, PersonaResult, PodcastOpportunity, PressOpportunity, Sentiment, SourceRef,
};

/// Loose decode target for the model's reply. Scores arrive as arbitrary
/// numbers and get rounded and clamped during conversion; unknown fields are
/// ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReply {
    summary: Option<String>,
    entity_found: Option<bool>,
    confidence_score: Option<f64>,
    sentiment_score: Option<f64>,
    sentiment: Option<String>,
    top_sources: Option<Vec<SourceRef>>,
    backlinks: Option<Vec<Backlink>>,
    press_opportunities: Option<Vec<PressOpportunity>>,
    podcast_opportunities: Option<Vec<PodcastOpportunity>>,
    recommendations: Option<String>,
}

pub fn normalize(raw_text: &str) -> PersonaResult {
    let Some(span) = extract_braced(raw_text) else {
        return PersonaResult::fallback(raw_text);
    };

    match decode(span) {
        Ok(reply) => convert(reply),
        Err(e) => {
            debug!(error = %e, "model reply had a brace span but no decodable JSON");
            PersonaResult::fallback(raw_text)
        }
    }
}

/// Greedy span: first `{` through last `}`. Two objects side by side
/// therefore produce one undecodable span and fall back, which matches how
/// the models actually misbehave (one object wrapped in prose).
fn extract_braced(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}

fn decode(span: &str) -> Result<RawReply, serde_json::Error> {
    serde_json::from_str(span)
}

fn convert(reply: RawReply) -> PersonaResult {
    PersonaResult {
        summary: reply.summary,
        entity_found: reply.entity_found,
        confidence_score: reply.confidence_score.map(clamp_score),
        sentiment_score: reply.sentiment_score.map(clamp_score),
        sentiment: reply.sentiment.as_deref().map(Sentiment::from_str_loose),
        top_sources: reply.top_sources,
        backlinks: reply.backlinks,
        press_opportunities: reply.press_opportunities,
        podcast_opportunities: reply.podcast_opportunities,
        recommendations: reply.recommendations,
        error: false,
    }
}

/// Model-supplied scores land on the 1-10 integer scale no matter what the
/// reply contained.
fn clamp_score(score: f64) -> u8 {
    (score.round() as i64).clamp(1, 10) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_object_wrapped_in_prose() {
        let result =
            normalize("Here you go: {\"summary\":\"ok\",\"confidenceScore\":7} thanks");
        assert_eq!(result.summary.as_deref(), Some("ok"));
        assert_eq!(result.confidence_score, Some(7));
        assert!(!result.error);
        // Fields the model omitted stay absent.
        assert_eq!(result.sentiment, None);
        assert_eq!(result.top_sources, None);
    }

    #[test]
    fn extracts_object_inside_markdown_fence() {
        let raw = "```json\n{\"summary\": \"fenced\", \"entityFound\": true}\n```";
        let result = normalize(raw);
        assert_eq!(result.summary.as_deref(), Some("fenced"));
        assert_eq!(result.entity_found, Some(true));
    }

    #[test]
    fn never_fails_on_arbitrary_input() {
        for raw in ["", "plain prose", "{{{", "}{", "{not json}", "{\"a\": }"] {
            let result = normalize(raw);
            assert_eq!(result.summary.as_deref(), Some(raw));
            assert_eq!(result.confidence_score, Some(5));
            assert_eq!(result.sentiment_score, Some(5));
            assert_eq!(result.sentiment, Some(Sentiment::Neutral));
            assert_eq!(result.entity_found, Some(false));
            assert_eq!(
                result.recommendations.as_deref(),
                Some("Analysis completed")
            );
            assert_eq!(result.top_sources.as_deref(), Some(&[][..]));
            assert!(!result.error);
        }
    }

    #[test]
    fn two_objects_take_the_fallback_path() {
        // The greedy span covers both objects and is not valid JSON.
        let raw = "{\"summary\":\"a\"} and {\"summary\":\"b\"}";
        let result = normalize(raw);
        assert_eq!(result.summary.as_deref(), Some(raw));
        assert_eq!(result.confidence_score, Some(5));
    }

    #[test]
    fn wrong_score_type_takes_the_fallback_path() {
        let raw = "{\"summary\":\"x\",\"confidenceScore\":\"high\"}";
        let result = normalize(raw);
        assert_eq!(result.summary.as_deref(), Some(raw));
        assert_eq!(result.confidence_score, Some(5));
    }

    #[test]
    fn scores_are_rounded_and_clamped() {
        let result = normalize("{\"confidenceScore\": 7.6, \"sentimentScore\": 15}");
        assert_eq!(result.confidence_score, Some(8));
        assert_eq!(result.sentiment_score, Some(10));

        let result = normalize("{\"confidenceScore\": -3, \"sentimentScore\": 0.2}");
        assert_eq!(result.confidence_score, Some(1));
        assert_eq!(result.sentiment_score, Some(1));
    }

    #[test]
    fn sentiment_string_parses_loosely() {
        let result = normalize("{\"sentiment\": \"Positive\"}");
        assert_eq!(result.sentiment, Some(Sentiment::Positive));

        let result = normalize("{\"sentiment\": \"somewhat favorable\"}");
        assert_eq!(result.sentiment, Some(Sentiment::Neutral));
    }

    #[test]
    fn full_reply_decodes_with_nested_records() {
        let raw = r#"{
            "summary": "Rival Corp is well covered.",
            "entityFound": true,
            "confidenceScore": 8,
            "sentiment": "positive",
            "topSources": [{"url": "https://a.example", "title": "A"}],
            "backlinks": [
                {"url": "https://news.example/rival", "anchorText": "Rival feature",
                 "domainAuthority": 72, "type": "editorial"}
            ],
            "pressOpportunities": [{"outlet": "TechDaily", "reason": "covers the space"}],
            "podcastOpportunities": [{"name": "Industry Hour"}],
            "recommendations": "Pitch the feature angle."
        }"#;

        let result = normalize(raw);
        assert_eq!(result.confidence_score, Some(8));
        let links = result.backlinks.as_ref().unwrap();
        assert_eq!(links[0].domain_authority, Some(72));
        assert_eq!(links[0].link_type.as_deref(), Some("editorial"));
        assert_eq!(
            result.press_opportunities.as_ref().unwrap()[0]
                .outlet
                .as_deref(),
            Some("TechDaily")
        );
        assert_eq!(
            result.podcast_opportunities.as_ref().unwrap()[0]
                .name
                .as_deref(),
            Some("Industry Hour")
        );
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let result = normalize("{\"summary\":\"x\",\"confidenceScore\":6,\"modelNotes\":[1,2]}");
        assert_eq!(result.confidence_score, Some(6));
        assert!(!result.error);
    }
}
