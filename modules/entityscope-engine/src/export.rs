//! CSV and HTML renderings of a completed run. Both walk the matrix in run
//! order so exported rows line up with the progress the user watched.

use chrono::Utc;

use entityscope_common::AnalysisRun;

use crate::aggregate::{
    backlink_gap, category_scores, leadership_sentiment, overall_score, persona_scores,
    recommendations, StatusBand,
};

const SUMMARY_PREVIEW_CHARS: usize = 200;

/// One row per cell, in run order. Numeric and boolean columns are unquoted;
/// absent scores export as 0 and absent text as an empty field.
pub fn to_csv(run: &AnalysisRun) -> String {
    let mut csv = String::from("Entity,Type,Persona,Score,Sentiment,Found,Summary\n");
    for (target, cell) in run.cells() {
        let result = &cell.result;
        let sentiment = result.sentiment.map(|s| s.to_string()).unwrap_or_default();
        csv.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            quote(&target.label),
            quote(&target.kind.to_string()),
            quote(cell.persona.display_name()),
            result.confidence_score.unwrap_or(0),
            quote(&sentiment),
            result.entity_found.unwrap_or(false),
            quote(result.summary.as_deref().unwrap_or("")),
        ));
    }
    csv
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Download name for the CSV, dated so repeated runs do not collide.
pub fn csv_filename(company_name: &str) -> String {
    let company = company_name.trim();
    let name = if company.is_empty() { "report" } else { company };
    format!("entity-seo-{}-{}.csv", name, Utc::now().format("%Y-%m-%d"))
}

const REPORT_CSS: &str = "*{box-sizing:border-box;margin:0;padding:0}\
body{font-family:system-ui,sans-serif;padding:40px;max-width:900px;margin:auto;color:#1a1a2e}\
.header{text-align:center;border-bottom:3px solid #7c3aed;padding-bottom:20px;margin-bottom:30px}\
.header h1{font-size:24px;margin-bottom:8px}\
.scores{display:flex;justify-content:space-around;background:#f5f5f5;padding:30px;border-radius:12px;margin-bottom:12px}\
.score-box{text-align:center}\
.score-box .num{font-size:36px;font-weight:700}\
.score-box .label{font-size:12px;color:#666;margin-top:4px}\
.band{text-align:center;margin-bottom:30px;color:#444;font-size:14px}\
.section{margin:24px 0}\
.section h2{font-size:18px;border-bottom:2px solid #eee;padding-bottom:8px;margin-bottom:16px}\
.card{background:#fff;border:1px solid #ddd;border-radius:8px;padding:16px;margin-bottom:12px}\
.card h3{font-size:14px;margin-bottom:8px}\
.llm-row{background:#f9f9f9;padding:10px;border-radius:6px;margin-top:8px;font-size:13px}\
.footer{text-align:center;margin-top:40px;color:#888;font-size:11px;border-top:1px solid #eee;padding-top:20px}";

/// Self-contained printable report: score row, status band, per-engine
/// scores, the derived views, and the full cell-by-cell detail.
pub fn to_html(company_name: &str, run: &AnalysisRun) -> String {
    let overall = overall_score(run);
    let categories = category_scores(run);
    let band = StatusBand::for_score(overall);
    let engines = persona_scores(run);
    let sentiment = leadership_sentiment(run);
    let gap = backlink_gap(run);
    let recs = recommendations(run);

    let company = company_name.trim();
    let heading = if company.is_empty() { "Analysis" } else { company };
    let date = Utc::now().format("%Y-%m-%d");

    let mut html = String::new();
    html.push_str("<!DOCTYPE html><html><head><title>Entity SEO Report</title><style>");
    html.push_str(REPORT_CSS);
    html.push_str("</style></head><body>");
    html.push_str(&format!(
        "<div class=\"header\"><h1>Entity-Based SEO Report</h1><p>{} | {date}</p></div>",
        esc(heading)
    ));

    html.push_str("<div class=\"scores\">");
    for (label, score) in [
        ("Overall", overall),
        ("Company", categories.company),
        ("Leadership", categories.leadership),
        ("Keywords", categories.keywords),
    ] {
        html.push_str(&format!(
            "<div class=\"score-box\"><div class=\"num\" style=\"color:{}\">{score}</div><div class=\"label\">{label}</div></div>",
            score_color(score)
        ));
    }
    html.push_str("</div>");

    html.push_str(&format!(
        "<div class=\"band\"><strong>{}</strong> {}</div>",
        band.label(),
        band.description()
    ));

    html.push_str("<div class=\"section\"><h2>AI Engine Scores</h2>");
    for entry in &engines {
        html.push_str(&format!(
            "<div class=\"card\"><strong>{}</strong>: <span style=\"color:{}\">{}/10</span></div>",
            esc(entry.persona.display_name()),
            score_color(entry.score),
            entry.score
        ));
    }
    html.push_str("</div>");

    if !sentiment.is_empty() {
        html.push_str("<div class=\"section\"><h2>Leadership Sentiment</h2>");
        for leader in &sentiment {
            html.push_str(&format!(
                "<div class=\"card\"><strong>{}</strong>: <span style=\"color:{}\">{}/10</span></div>",
                esc(&leader.label),
                score_color(leader.sentiment_score),
                leader.sentiment_score
            ));
        }
        html.push_str("</div>");
    }

    if !gap.is_empty() {
        html.push_str("<div class=\"section\"><h2>Backlink Gap</h2>");
        for link in &gap {
            let url = link.url.as_deref().unwrap_or("");
            match link.domain_authority {
                Some(da) => html.push_str(&format!(
                    "<div class=\"card\">{} (DA {da})</div>",
                    esc(url)
                )),
                None => html.push_str(&format!("<div class=\"card\">{}</div>", esc(url))),
            }
        }
        html.push_str("</div>");
    }

    html.push_str("<div class=\"section\"><h2>Recommendations</h2>");
    if categories.company < 5.0 {
        html.push_str("<div class=\"card\"><strong>Company:</strong> Create more authoritative content and build citations on directories.</div>");
    }
    if categories.leadership < 5.0 {
        html.push_str("<div class=\"card\"><strong>Leadership:</strong> Build personal brands through LinkedIn, thought leadership, and speaking.</div>");
    }
    if categories.keywords < 5.0 {
        html.push_str("<div class=\"card\"><strong>Keywords:</strong> Create targeted content and build topical authority in your niche.</div>");
    }
    if overall >= 7.0 {
        html.push_str("<div class=\"card\"><strong>Great Job!</strong> Your entity visibility is strong. Focus on maintaining presence across AI platforms.</div>");
    }
    for press in &recs.press {
        html.push_str(&opportunity_card(
            "Press",
            press.outlet.as_deref().unwrap_or(""),
            press.reason.as_deref(),
        ));
    }
    for podcast in &recs.podcasts {
        html.push_str(&opportunity_card(
            "Podcast",
            podcast.name.as_deref().unwrap_or(""),
            podcast.reason.as_deref(),
        ));
    }
    for link in &recs.backlinks {
        html.push_str(&opportunity_card(
            "Backlink",
            link.url.as_deref().unwrap_or(""),
            link.anchor_text.as_deref(),
        ));
    }
    html.push_str("</div>");

    html.push_str("<div class=\"section\"><h2>Detailed Results</h2>");
    for target in &run.targets {
        html.push_str(&format!("<div class=\"card\"><h3>{}</h3>", esc(&target.label)));
        for cell in &target.cells {
            let score = cell.result.confidence_score.unwrap_or(0);
            let summary: String = match cell.result.summary.as_deref() {
                Some(s) if !s.is_empty() => s.chars().take(SUMMARY_PREVIEW_CHARS).collect(),
                _ => "N/A".to_string(),
            };
            html.push_str(&format!(
                "<div class=\"llm-row\"><strong>{}</strong> ({score}/10): {}...</div>",
                esc(cell.persona.display_name()),
                esc(&summary)
            ));
        }
        html.push_str("</div>");
    }
    html.push_str("</div>");

    html.push_str("<div class=\"footer\">EntityScope | AI Search Visibility Analysis</div>");
    html.push_str("</body></html>");
    html
}

fn opportunity_card(kind: &str, name: &str, reason: Option<&str>) -> String {
    match reason {
        Some(reason) => format!(
            "<div class=\"card\"><strong>{kind}:</strong> {} ({})</div>",
            esc(name),
            esc(reason)
        ),
        None => format!("<div class=\"card\"><strong>{kind}:</strong> {}</div>", esc(name)),
    }
}

fn score_color(score: f64) -> &'static str {
    if score >= 7.0 {
        "#00c853"
    } else if score >= 4.0 {
        "#ffc107"
    } else {
        "#ff5252"
    }
}

fn esc(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
