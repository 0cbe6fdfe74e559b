//! Form-to-target derivation. Order is fixed for label readability: company,
//! website, leaders, keywords, then competitors.

use std::collections::HashSet;

use entityscope_common::{AnalysisForm, AnalysisHint, EntityTarget, TargetKind};

/// Expand the form into the ordered target list. Blank fields are skipped; a
/// leader needs both name and role; a competitor needs a url, and naming its
/// leader adds a second leadership-flavored target. Duplicate labels keep
/// their first occurrence so the run matrix keys stay unique.
pub fn derive_targets(form: &AnalysisForm) -> Vec<EntityTarget> {
    let mut targets: Vec<EntityTarget> = Vec::new();

    let company = form.company_name.trim();
    if !company.is_empty() {
        targets.push(EntityTarget {
            kind: TargetKind::Company,
            label: format!("Company: {company}"),
            query_text: format!("What is {company}? Tell me about this company."),
            hint: AnalysisHint::Entity,
        });
    }

    let website = form.website_url.trim();
    if !website.is_empty() {
        targets.push(EntityTarget {
            kind: TargetKind::Website,
            label: format!("Website: {website}"),
            query_text: format!("What can you tell me about {website}?"),
            hint: AnalysisHint::Backlinks,
        });
    }

    for leader in &form.leaders {
        let name = leader.name.trim();
        let role = leader.role.trim();
        if name.is_empty() || role.is_empty() {
            continue;
        }
        let query_text = if company.is_empty() {
            format!("Who is {name}, {role}?")
        } else {
            format!("Who is {name}, {role} at {company}?")
        };
        targets.push(EntityTarget {
            kind: TargetKind::Leader,
            label: format!("{name} ({role})"),
            query_text,
            hint: AnalysisHint::Leadership,
        });
    }

    for keyword in &form.keywords {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            continue;
        }
        targets.push(EntityTarget {
            kind: TargetKind::Keyword,
            label: format!("Keyword: {keyword}"),
            query_text: format!("{keyword} - what are the best companies or solutions for this?"),
            hint: AnalysisHint::Entity,
        });
    }

    for competitor in &form.competitors {
        let url = competitor.url.trim();
        if url.is_empty() {
            continue;
        }
        targets.push(EntityTarget {
            kind: TargetKind::Competitor,
            label: format!("Competitor: {url}"),
            query_text: format!(
                "What can you tell me about {url}? Which sites link to it and where has it been featured?"
            ),
            hint: AnalysisHint::Competitor,
        });

        let name = competitor.leader_name.trim();
        let role = competitor.leader_role.trim();
        if !name.is_empty() && !role.is_empty() {
            targets.push(EntityTarget {
                kind: TargetKind::CompetitorLeader,
                label: format!("Competitor leader: {name} ({role})"),
                query_text: format!("Who is {name}, {role} at {url}?"),
                hint: AnalysisHint::Leadership,
            });
        }
    }

    dedupe_labels(targets)
}

fn dedupe_labels(targets: Vec<EntityTarget>) -> Vec<EntityTarget> {
    let mut seen = HashSet::new();
    targets
        .into_iter()
        .filter(|t| seen.insert(t.label.clone()))
        .collect()
}
