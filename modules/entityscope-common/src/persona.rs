use serde::{Deserialize, Serialize};

/// The AI search products the upstream model is asked to role-play. The
/// display name goes into prompts and exports; the id is the wire/CLI token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Persona {
    Claude,
    ChatGpt,
    Perplexity,
    Gemini,
    Copilot,
}

impl Persona {
    pub const ALL: [Persona; 5] = [
        Persona::Claude,
        Persona::ChatGpt,
        Persona::Perplexity,
        Persona::Gemini,
        Persona::Copilot,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Persona::Claude => "claude",
            Persona::ChatGpt => "chatgpt",
            Persona::Perplexity => "perplexity",
            Persona::Gemini => "gemini",
            Persona::Copilot => "copilot",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Persona::Claude => "Claude (Anthropic)",
            Persona::ChatGpt => "ChatGPT (OpenAI)",
            Persona::Perplexity => "Perplexity AI",
            Persona::Gemini => "Gemini (Google)",
            Persona::Copilot => "Copilot (Microsoft)",
        }
    }

    pub fn from_id(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "claude" => Some(Persona::Claude),
            "chatgpt" => Some(Persona::ChatGpt),
            "perplexity" => Some(Persona::Perplexity),
            "gemini" => Some(Persona::Gemini),
            "copilot" => Some(Persona::Copilot),
            _ => None,
        }
    }
}

impl std::fmt::Display for Persona {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}
