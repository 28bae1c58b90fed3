//! Deterministic prompt assembly from structured creative fields

use crate::types::{ThumbnailRequest, non_empty};

const PREAMBLE: &str = "Create a professional YouTube thumbnail.";

/// Creative-framing subset of a request
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptFields<'a> {
    pub prompt: &'a str,
    pub title: Option<&'a str>,
    pub subtitle: Option<&'a str>,
    pub ratio: Option<&'a str>,
    pub style: Option<&'a str>,
    pub mood: Option<&'a str>,
    pub brand_color: Option<&'a str>,
    pub accent_color: Option<&'a str>,
}

impl<'a> PromptFields<'a> {
    pub fn from_request(request: &'a ThumbnailRequest, prompt: &'a str) -> Self {
        Self {
            prompt,
            title: request.title.as_deref(),
            subtitle: request.subtitle.as_deref(),
            ratio: Some(request.ratio()),
            style: request.style.as_deref(),
            mood: request.mood.as_deref(),
            brand_color: request.brand_color.as_deref(),
            accent_color: request.accent_color.as_deref(),
        }
    }
}

/// Compile the fields into the single prompt sent upstream
///
/// Clause order is fixed and empty fields drop their clause entirely.
pub fn compile(fields: &PromptFields<'_>) -> String {
    let mut segments = vec![PREAMBLE.to_string()];

    if let Some(ratio) = non_empty(fields.ratio) {
        segments.push(format!("Aspect ratio {ratio}."));
    }
    if let Some(style) = non_empty(fields.style) {
        segments.push(format!("Visual style: {style}."));
    }
    if let Some(mood) = non_empty(fields.mood) {
        segments.push(format!("Mood: {mood}."));
    }

    let brand = non_empty(fields.brand_color);
    let accent = non_empty(fields.accent_color);
    if brand.is_some() || accent.is_some() {
        segments.push(format!(
            "Brand palette: {} and {}.",
            brand.unwrap_or_default(),
            accent.unwrap_or_default()
        ));
    }

    if let Some(title) = non_empty(fields.title) {
        segments.push(format!("Main headline: {title}."));
    }
    if let Some(subtitle) = non_empty(fields.subtitle) {
        segments.push(format!("Subtitle: {subtitle}."));
    }
    if !fields.prompt.is_empty() {
        segments.push(format!("Creative direction: {}.", fields.prompt));
    }

    segments.join(" ")
}
