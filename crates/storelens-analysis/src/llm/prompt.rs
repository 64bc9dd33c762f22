//! Classification prompts.
//!
//! The Goldilocks prompt feeds `flatten-llm`. The presence prompt asks for
//! an explicit flag per taxonomy feature and feeds `agreement --llm`.

use storelens_core::config::PromptStyle;

const PROMPT_TEMPLATE: &str = "\
You are an analyst classifying app features using the Goldilocks Support model.
Extract concrete product features and map each to one of:
- strong_support, neutral, undermining (how it affects self-regulation)

APP: {title}

WEBSITE TEXT (snippets):
{website_text}

STORE DESCRIPTION (snippets):
{store_desc}

FEATURE TAXONOMY (prefer these names when they apply):
{taxonomy}

Return STRICT JSON with keys:
- \"features\": string[]  (feature names)
- \"goldilocks_support\": object   (feature -> \"strong_support\" | \"neutral\" | \"undermining\")
- \"summary\": string  (1-2 sentence overview)
";

const PRESENCE_TEMPLATE: &str = "\
You are labeling whether an app supports specific features. Return strict JSON.

Features to check: {taxonomy}.

App:
- Title: {title}
- Description: {store_desc}
- Website: {website_text}

Rules:
- If evidence is strong the feature exists -> flag=true, confidence 0.7-0.95 (higher if very explicit).
- If clearly NOT present -> flag=false, confidence 0.7-0.9.
- If unclear/insufficient -> flag=false, confidence 0.5.
- Answer every feature listed above exactly once.
- Keep evidence short: a few words or a short phrase.
- JSON only. Use this schema:

{
  \"app_key\": \"{app_key}\",
  \"features\": [
    {\"name\": \"<feature>\", \"flag\": true, \"confidence\": 0.9, \"evidence\": \"...\"}
  ]
}
";

const TITLE_LIMIT: usize = 120;
const WEBSITE_LIMIT: usize = 3500;
const DESCRIPTION_LIMIT: usize = 1200;

/// First `limit` characters of the trimmed text.
fn trim_to(text: &str, limit: usize) -> &str {
    let t = text.trim();
    match t.char_indices().nth(limit) {
        Some((i, _)) => &t[..i],
        None => t,
    }
}

/// Fields substituted into a prompt template.
#[derive(Debug, Clone, Copy)]
pub struct PromptFields<'a> {
    pub app_key: &'a str,
    pub title: &'a str,
    pub website_text: &'a str,
    pub description: &'a str,
    pub taxonomy: &'a [String],
}

/// Goldilocks prompt.
pub fn render_prompt(title: &str, website_text: &str, description: &str, taxonomy: &[String]) -> String {
    render(
        PROMPT_TEMPLATE,
        &PromptFields {
            app_key: "",
            title,
            website_text,
            description,
            taxonomy,
        },
    )
}

pub fn render_prompt_for(style: PromptStyle, fields: &PromptFields<'_>) -> String {
    match style {
        PromptStyle::Goldilocks => render(PROMPT_TEMPLATE, fields),
        PromptStyle::Presence => render(PRESENCE_TEMPLATE, fields),
    }
}

fn render(template: &str, f: &PromptFields<'_>) -> String {
    template
        .replace("{app_key}", f.app_key)
        .replace("{title}", trim_to(f.title, TITLE_LIMIT))
        .replace("{website_text}", trim_to(f.website_text, WEBSITE_LIMIT))
        .replace("{store_desc}", trim_to(f.description, DESCRIPTION_LIMIT))
        .replace("{taxonomy}", &f.taxonomy.join(", "))
}
