//! Task dispatch tables and prompt templates for the AI proxy.
//!
//! A request names a task and carries free-text fields. Each task picks the
//! fields it needs; absent fields render as empty text.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use super::error::ProxyError;

/// Fixed system prompt sent with every completion.
pub const SYSTEM_PROMPT: &str = "You are the creative assistant inside a studio dashboard for \
independent creators. Answer concisely and concretely. Do not add preambles, disclaimers or \
closing remarks. Match the requested format exactly.";

/// Tasks served by `POST /api/ai/assist`, answered as free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistTask {
    BrandVoice,
    Tagline,
    ContentCaption,
    ContentIdeas,
    ExperimentHypothesis,
    NoteSummary,
}

impl AssistTask {
    pub const ALL: [AssistTask; 6] = [
        Self::BrandVoice,
        Self::Tagline,
        Self::ContentCaption,
        Self::ContentIdeas,
        Self::ExperimentHypothesis,
        Self::NoteSummary,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BrandVoice => "brand_voice",
            Self::Tagline => "tagline",
            Self::ContentCaption => "content_caption",
            Self::ContentIdeas => "content_ideas",
            Self::ExperimentHypothesis => "experiment_hypothesis",
            Self::NoteSummary => "note_summary",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, ProxyError> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == name)
            .ok_or_else(|| ProxyError::UnknownTask(name.to_string()))
    }

    pub fn prompt(&self, fields: &Map<String, Value>) -> String {
        let f = |name| field(fields, name);
        match self {
            Self::BrandVoice => format!(
                "Describe the brand voice for \"{}\" in three short adjectives followed by one \
                 sentence of guidance.\nMission: {}\nAudience: {}",
                f("name"),
                f("mission"),
                f("audience"),
            ),
            Self::Tagline => format!(
                "Write one tagline of at most eight words for \"{}\".\nMission: {}\nVoice: {}",
                f("name"),
                f("mission"),
                f("voice"),
            ),
            Self::ContentCaption => format!(
                "Write a {} caption for a post titled \"{}\". Keep it under 60 words and end \
                 with three hashtags.\nNotes: {}",
                f("channel"),
                f("title"),
                f("notes"),
            ),
            Self::ContentIdeas => format!(
                "Suggest five content ideas for {} about: {}\nAudience: {}",
                f("channel"),
                f("topic"),
                f("audience"),
            ),
            Self::ExperimentHypothesis => format!(
                "Rewrite this growth experiment as a testable hypothesis in the form \"If we \
                 ..., then ..., because ...\".\nExperiment: {}\nIdea: {}",
                f("name"),
                f("idea"),
            ),
            Self::NoteSummary => format!(
                "Summarize this note in at most three sentences.\nTitle: {}\n\n{}",
                f("title"),
                f("body"),
            ),
        }
    }
}

/// Tasks served by `POST /api/ai/list`, answered as one item per line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListTask {
    ContentIdeas,
    GrowthTactics,
    AssetTags,
    NoteActions,
}

impl ListTask {
    pub const ALL: [ListTask; 4] = [
        Self::ContentIdeas,
        Self::GrowthTactics,
        Self::AssetTags,
        Self::NoteActions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ContentIdeas => "content_ideas",
            Self::GrowthTactics => "growth_tactics",
            Self::AssetTags => "asset_tags",
            Self::NoteActions => "note_actions",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, ProxyError> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == name)
            .ok_or_else(|| ProxyError::UnknownTask(name.to_string()))
    }

    pub fn prompt(&self, fields: &Map<String, Value>) -> String {
        let f = |name| field(fields, name);
        let body = match self {
            Self::ContentIdeas => format!(
                "List five content ideas for {} about: {}\nAudience: {}",
                f("channel"),
                f("topic"),
                f("audience"),
            ),
            Self::GrowthTactics => format!(
                "List five low-cost growth tactics for \"{}\".\nAudience: {}\nGoal: {}",
                f("name"),
                f("audience"),
                f("goal"),
            ),
            Self::AssetTags => format!(
                "List up to eight lowercase single-word tags for a {} asset named \"{}\".\n\
                 Description: {}",
                f("kind"),
                f("name"),
                f("description"),
            ),
            Self::NoteActions => format!(
                "List the concrete next actions contained in this note.\nTitle: {}\n\n{}",
                f("title"),
                f("body"),
            ),
        };
        format!("{body}\nReturn one item per line with no extra text.")
    }
}

/// Render a request field as prompt text.
///
/// Strings are used as-is, arrays are joined with `", "`, other scalars use
/// their JSON form, and missing or null fields are empty.
fn field(fields: &Map<String, Value>, name: &str) -> String {
    match fields.get(name) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| match v {
                Value::String(s) => s.trim().to_string(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Some(other) => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// List splitting
// ---------------------------------------------------------------------------

/// Leading bullets (`-`, `*`, `•`) or ordinals (`1.`, `2)`).
static LIST_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-*•]+|\d+[.)])\s*").expect("valid regex"));

/// Split model output into items, one per non-blank line, with list markers
/// removed.
pub fn strip_list_items(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| LIST_MARKER_RE.replace(line, "").trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    fn fields(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    // -- dispatch ------------------------------------------------------------

    #[test]
    fn task_tables_resolve_names() {
        for task in AssistTask::ALL {
            assert_eq!(AssistTask::from_name(task.as_str()).unwrap(), task);
        }
        for task in ListTask::ALL {
            assert_eq!(ListTask::from_name(task.as_str()).unwrap(), task);
        }
    }

    #[test]
    fn unknown_task_is_rejected() {
        assert_matches!(AssistTask::from_name("poem"), Err(ProxyError::UnknownTask(t)) if t == "poem");
        assert_matches!(ListTask::from_name("tagline"), Err(ProxyError::UnknownTask(_)));
    }

    // -- prompts -------------------------------------------------------------

    #[test]
    fn prompt_interpolates_fields() {
        let prompt = AssistTask::Tagline.prompt(&fields(json!({
            "name": " Acme ",
            "mission": "Make tools",
            "voice": ["bold", "warm"]
        })));
        assert!(prompt.contains("\"Acme\""));
        assert!(prompt.contains("Mission: Make tools"));
        assert!(prompt.contains("Voice: bold, warm"));
    }

    #[test]
    fn missing_fields_render_empty() {
        let prompt = AssistTask::NoteSummary.prompt(&Map::new());
        assert!(prompt.contains("Title: \n"));
    }

    #[test]
    fn list_prompts_ask_for_one_item_per_line() {
        for task in ListTask::ALL {
            assert!(task.prompt(&Map::new()).ends_with("one item per line with no extra text."));
        }
    }

    // -- strip_list_items ----------------------------------------------------

    #[test]
    fn strips_bullets_and_ordinals() {
        let text = "1. First idea\n2) Second idea\n- third\n* fourth\n• fifth\n\n   \nplain";
        assert_eq!(
            strip_list_items(text),
            vec!["First idea", "Second idea", "third", "fourth", "fifth", "plain"]
        );
    }

    #[test]
    fn keeps_inner_hyphens_and_numbers() {
        assert_eq!(
            strip_list_items("- low-cost referral loop\n10. Post 3 times a week"),
            vec!["low-cost referral loop", "Post 3 times a week"]
        );
    }

    #[test]
    fn empty_text_yields_no_items() {
        assert!(strip_list_items("").is_empty());
        assert!(strip_list_items("\n \n").is_empty());
    }
}
