//! Integration tests for the fan-out pipeline: scripted persona replies in,
//! run matrix, aggregates, and exports out. No network involved.

use std::collections::VecDeque;
use std::sync::Mutex;

use anyhow::anyhow;
use async_trait::async_trait;

use entityscope_common::{
    AnalysisForm, AnalysisHint, CompetitorEntry, EntityScopeError, LeaderEntry, Persona,
};
use entityscope_engine::aggregate::{
    backlink_gap, category_scores, leadership_sentiment, overall_score,
};
use entityscope_engine::{analyze_single, export, run_analysis, PersonaQuery};

// ---------------------------------------------------------------------------
// Scripted persona client
// ---------------------------------------------------------------------------

struct ScriptedClient {
    replies: Mutex<VecDeque<Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedClient {
    fn new(replies: Vec<Result<&str, &str>>) -> Self {
        Self {
            replies: Mutex::new(
                replies
                    .into_iter()
                    .map(|r| match r {
                        Ok(s) => Ok(s.to_string()),
                        Err(s) => Err(s.to_string()),
                    })
                    .collect(),
            ),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl PersonaQuery for ScriptedClient {
    async fn query(&self, prompt: &str) -> anyhow::Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Err(anyhow!("scripted client ran out of replies")),
        }
    }
}

fn company_form(name: &str) -> AnalysisForm {
    AnalysisForm {
        company_name: name.to_string(),
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Orchestration
// ---------------------------------------------------------------------------

#[tokio::test]
async fn single_target_single_persona_yields_one_cell() {
    let client = ScriptedClient::new(vec![Ok(
        r#"{"summary": "Acme makes widgets.", "entityFound": true, "confidenceScore": 8, "sentiment": "positive"}"#,
    )]);
    let mut events = Vec::new();

    let run = run_analysis(&client, &company_form("Acme"), &[Persona::ChatGpt], |p| {
        events.push((p.completed, p.total, p.message.clone()))
    })
    .await
    .unwrap();

    assert_eq!(run.targets.len(), 1);
    assert_eq!(run.targets[0].label, "Company: Acme");
    assert_eq!(run.targets[0].cells.len(), 1);

    let cell = &run.targets[0].cells[0];
    assert_eq!(cell.persona, Persona::ChatGpt);
    assert_eq!(cell.result.confidence_score, Some(8));
    assert_eq!(cell.result.entity_found, Some(true));
    assert!(!cell.result.error);

    assert_eq!(client.prompts().len(), 1);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].0, 1);
    assert_eq!(events[0].1, 1);
}

#[tokio::test]
async fn failed_calls_become_error_cells_without_aborting_the_run() {
    let client = ScriptedClient::new(vec![
        Err("API returned 500"),
        Ok(r#"{"summary": "Acme found.", "entityFound": true, "confidenceScore": 7}"#),
    ]);

    let run = run_analysis(
        &client,
        &company_form("Acme"),
        &[Persona::Claude, Persona::ChatGpt],
        |_| {},
    )
    .await
    .unwrap();

    let cells = &run.targets[0].cells;
    assert_eq!(cells.len(), 2);

    assert!(cells[0].result.error);
    assert_eq!(cells[0].result.confidence_score, Some(0));
    assert_eq!(cells[0].result.summary.as_deref(), Some("Error: API returned 500"));

    assert!(!cells[1].result.error);
    assert_eq!(cells[1].result.confidence_score, Some(7));

    assert_eq!(run.error_count(), 1);
}

#[tokio::test]
async fn progress_advances_once_per_pair_to_completion() {
    let form = AnalysisForm {
        company_name: "Acme".to_string(),
        website_url: "https://acme.com".to_string(),
        ..Default::default()
    };
    let good = r#"{"summary": "ok", "confidenceScore": 6}"#;
    let client = ScriptedClient::new(vec![Ok(good), Ok(good), Ok(good), Ok(good)]);
    let mut events = Vec::new();

    run_analysis(
        &client,
        &form,
        &[Persona::Claude, Persona::Gemini],
        |p| events.push((p.completed, p.total, p.message.clone())),
    )
    .await
    .unwrap();

    let counts: Vec<usize> = events.iter().map(|(c, _, _)| *c).collect();
    assert_eq!(counts, vec![1, 2, 3, 4]);
    assert!(events.iter().all(|(_, total, _)| *total == 4));

    assert_eq!(
        events[0].2,
        "Analyzing Company: Acme with Claude (Anthropic)..."
    );
    assert_eq!(
        events[3].2,
        "Analyzing Website: https://acme.com with Gemini (Google)..."
    );
}

#[tokio::test]
async fn empty_persona_selection_is_rejected_before_any_call() {
    let client = ScriptedClient::new(vec![]);

    let err = run_analysis(&client, &company_form("Acme"), &[], |_| {})
        .await
        .unwrap_err();

    match err {
        EntityScopeError::Validation(message) => {
            assert_eq!(message, "Please select at least one AI search engine.")
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(client.prompts().is_empty());
}

#[tokio::test]
async fn empty_form_is_rejected_before_any_call() {
    let client = ScriptedClient::new(vec![]);

    let err = run_analysis(&client, &AnalysisForm::default(), &[Persona::Claude], |_| {})
        .await
        .unwrap_err();

    match err {
        EntityScopeError::Validation(message) => {
            assert_eq!(message, "Please fill in at least one field.")
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(client.prompts().is_empty());
}

#[tokio::test]
async fn prompts_embed_the_query_and_persona_display_name() {
    let client = ScriptedClient::new(vec![Ok(r#"{"summary": "ok"}"#)]);

    run_analysis(&client, &company_form("Acme"), &[Persona::Gemini], |_| {})
        .await
        .unwrap();

    let prompts = client.prompts();
    assert!(prompts[0].contains("\"Gemini (Google)\""));
    assert!(prompts[0].contains("Query: What is Acme? Tell me about this company."));
    assert!(prompts[0].contains("respond ONLY with valid JSON"));
}

#[tokio::test]
async fn prose_wrapped_json_still_normalizes() {
    let client = ScriptedClient::new(vec![Ok(
        "Sure! Here is the JSON you asked for:\n{\"summary\": \"ok\", \"entityFound\": true, \"confidenceScore\": 7}\nHope this helps!",
    )]);

    let run = run_analysis(&client, &company_form("Acme"), &[Persona::Claude], |_| {})
        .await
        .unwrap();

    let result = &run.targets[0].cells[0].result;
    assert_eq!(result.summary.as_deref(), Some("ok"));
    assert_eq!(result.confidence_score, Some(7));
    assert_eq!(result.entity_found, Some(true));
    assert!(!result.error);
}

// ---------------------------------------------------------------------------
// Run matrix into aggregates and exports
// ---------------------------------------------------------------------------

#[tokio::test]
async fn full_run_flows_into_aggregates_and_exports() {
    let form = AnalysisForm {
        company_name: "Acme".to_string(),
        leaders: vec![LeaderEntry {
            name: "Jane Smith".to_string(),
            role: "CEO".to_string(),
        }],
        competitors: vec![CompetitorEntry {
            url: "https://rival.com".to_string(),
            leader_name: "Bob Jones".to_string(),
            leader_role: "Founder".to_string(),
        }],
        ..Default::default()
    };

    // Derivation order: company, leader, competitor, competitor leader.
    let client = ScriptedClient::new(vec![
        Ok(r#"{"summary": "Acme found.", "entityFound": true, "confidenceScore": 8}"#),
        Ok(r#"{"summary": "Jane is well covered.", "confidenceScore": 6, "sentimentScore": 9}"#),
        Ok(
            r#"{"summary": "Rival profile.", "confidenceScore": 9,
                "backlinks": [{"url": "https://forbes.com/rival", "domainAuthority": 95}]}"#,
        ),
        Ok(r#"{"summary": "Bob profile.", "confidenceScore": 10}"#),
    ]);

    let run = run_analysis(&client, &form, &[Persona::Claude], |_| {})
        .await
        .unwrap();

    // Competitor cells stay out of the visibility means.
    assert_eq!(overall_score(&run), 7.0);
    let categories = category_scores(&run);
    assert_eq!(categories.company, 8.0);
    assert_eq!(categories.leadership, 6.0);
    assert_eq!(categories.keywords, 0.0);

    let sentiment = leadership_sentiment(&run);
    assert_eq!(sentiment.len(), 1);
    assert_eq!(sentiment[0].sentiment_score, 9.0);

    // No website backlinks were reported, so the rival's link is a gap.
    let gap = backlink_gap(&run);
    assert_eq!(gap.len(), 1);
    assert_eq!(gap[0].url.as_deref(), Some("https://forbes.com/rival"));

    let csv = export::to_csv(&run);
    assert_eq!(csv.lines().count(), 5);
    assert!(csv.contains("\"Competitor: https://rival.com\",\"competitor\""));

    let html = export::to_html(&form.company_name, &run);
    assert!(html.contains("Competitor: https://rival.com"));
    assert!(html.contains("Jane Smith (CEO)"));
}

// ---------------------------------------------------------------------------
// Single-query entry point
// ---------------------------------------------------------------------------

#[tokio::test]
async fn analyze_single_normalizes_a_good_reply() {
    let client = ScriptedClient::new(vec![Ok(
        r#"{"summary": "Acme found.", "entityFound": true, "confidenceScore": 8}"#,
    )]);

    let result = analyze_single(&client, "What is Acme?", "ChatGPT (OpenAI)", AnalysisHint::Entity)
        .await
        .unwrap();

    assert_eq!(result.confidence_score, Some(8));
    assert!(client.prompts()[0].contains("\"ChatGPT (OpenAI)\""));
}

#[tokio::test]
async fn analyze_single_surfaces_upstream_failures() {
    let client = ScriptedClient::new(vec![Err("connection refused")]);

    let err = analyze_single(&client, "What is Acme?", "ChatGPT (OpenAI)", AnalysisHint::Entity)
        .await
        .unwrap_err();

    match err {
        EntityScopeError::Upstream(message) => assert!(message.contains("connection refused")),
        other => panic!("expected upstream error, got {other:?}"),
    }
}
