//! Process configuration read from environment variables.
//!
//! `main` calls `dotenv().ok()` first, so a local `.env` file works too.

use std::env;

use anyhow::Context;

/// Default Gemini model identifier.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
/// Default Gemini REST endpoint root.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Default JSON body limit, large enough for a 5 MB image as base64.
pub const DEFAULT_JSON_LIMIT_BYTES: usize = 8 * 1024 * 1024;

/// Fact-checking persona sent as the system instruction of every request.
pub const DEFAULT_SYSTEM_INSTRUCTION: &str = r#"You are an expert fact-checker focused on Bangladesh and international news.
Analyze the submitted text, link or image. Use Google Search to verify claims against reliable, up-to-date sources.
For images, check whether the picture is AI-generated, manipulated, or used out of context.

Respond ONLY with a single JSON object, no prose before or after it, in this exact shape:
{
  "verdict": "REAL" | "FAKE" | "AI_GENERATED" | "MISLEADING" | "UNSURE",
  "title": "short headline in Bengali",
  "reason": "two or three sentence explanation in Bengali",
  "confidenceScore": integer between 0 and 100
}
If the evidence is insufficient, use "UNSURE"."#;

/// Immutable configuration shared by the whole process.
#[derive(Clone)]
pub struct AppConfig {
    /// Gemini API credential
    pub api_key: String,
    /// Model identifier, e.g. `gemini-2.0-flash`
    pub model: String,
    /// REST endpoint root without trailing slash
    pub api_base: String,
    /// System instruction attached to every request
    pub system_instruction: String,
    pub host: String,
    pub port: u16,
    /// Maximum accepted JSON body size
    pub json_limit_bytes: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("json_limit_bytes", &self.json_limit_bytes)
            .finish_non_exhaustive()
    }
}

impl AppConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `GEMINI_API_KEY` (or `API_KEY`): required
    /// - `GEMINI_MODEL`, `GEMINI_API_BASE`, `SYSTEM_INSTRUCTION`: optional
    /// - `HOST`, `PORT`, `JSON_LIMIT_BYTES`: optional
    ///
    /// # Errors
    ///
    /// Fails if the API key is missing or a numeric variable does not parse.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = non_empty("GEMINI_API_KEY")
            .or_else(|| non_empty("API_KEY"))
            .context("GEMINI_API_KEY (or API_KEY) must be set")?;

        let port = match non_empty("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("PORT is not a valid port number: {raw}"))?,
            None => 8080,
        };

        let json_limit_bytes = match non_empty("JSON_LIMIT_BYTES") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .with_context(|| format!("JSON_LIMIT_BYTES is not a valid size: {raw}"))?,
            None => DEFAULT_JSON_LIMIT_BYTES,
        };

        Ok(Self {
            api_key,
            model: non_empty("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_base: non_empty("GEMINI_API_BASE")
                .map(|base| base.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            system_instruction: non_empty("SYSTEM_INSTRUCTION")
                .unwrap_or_else(|| DEFAULT_SYSTEM_INSTRUCTION.to_string()),
            host: non_empty("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            json_limit_bytes,
        })
    }
}
