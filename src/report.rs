//! Display-ready projection of an [`AnalysisResult`].
//!
//! The UI renders a [`ReportView`] as is: a verdict badge with label and
//! tone, the title and reason, a confidence percentage, and up to
//! [`MAX_SOURCES`] source links showing their hostnames.

use reqwest::Url;
use serde::Serialize;

use crate::models::{AnalysisResult, Verdict};

/// Maximum number of source links rendered.
pub const MAX_SOURCES: usize = 3;

/// Reminder shown under every report.
pub const DISCLAIMER: &str = "AI ১০০% নির্ভুল নাও হতে পারে। অনুগ্রহ করে নিজে যাচাই করুন।";

/// Colour family of the verdict badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Purple,
    Red,
    Green,
    Slate,
}

impl Verdict {
    /// Localized badge label.
    pub fn label(self) -> &'static str {
        match self {
            Verdict::AiGenerated => "AI জেনারেটেড",
            Verdict::Fake | Verdict::Misleading => "মিথ্যা তথ্য / ভুয়া",
            Verdict::Real => "সত্য তথ্য",
            Verdict::Unsure => "নিশ্চিত নয়",
        }
    }

    pub fn tone(self) -> Tone {
        match self {
            Verdict::AiGenerated => Tone::Purple,
            Verdict::Fake | Verdict::Misleading => Tone::Red,
            Verdict::Real => Tone::Green,
            Verdict::Unsure => Tone::Slate,
        }
    }
}

/// One rendered citation link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLink {
    /// Hostname without a leading `www.`
    pub host: String,
    /// Full URL used as the link target
    pub url: String,
}

impl SourceLink {
    /// Returns `None` for URLs without a host.
    pub fn parse(url: &str) -> Option<Self> {
        let parsed = Url::parse(url).ok()?;
        let host = parsed.host_str()?;
        Some(Self {
            host: host.strip_prefix("www.").unwrap_or(host).to_string(),
            url: url.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportView {
    pub verdict: Verdict,
    pub label: &'static str,
    pub tone: Tone,
    pub title: String,
    pub reason: String,
    pub confidence_percent: u8,
    pub sources: Vec<SourceLink>,
    pub disclaimer: &'static str,
}

impl From<&AnalysisResult> for ReportView {
    fn from(result: &AnalysisResult) -> Self {
        Self {
            verdict: result.verdict,
            label: result.verdict.label(),
            tone: result.verdict.tone(),
            title: result.title.clone(),
            reason: result.reason.clone(),
            confidence_percent: result.confidence_score,
            sources: result
                .grounding_urls
                .iter()
                .filter_map(|url| SourceLink::parse(url))
                .take(MAX_SOURCES)
                .collect(),
            disclaimer: DISCLAIMER,
        }
    }
}
