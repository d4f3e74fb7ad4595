use crate::adapters::{ChatPrompt, TextGenerator};
use crate::error::GenerationError;
use std::sync::Arc;
use tracing::info;

const SYSTEM_INSTRUCTION: &str =
    "You are an expert web developer who returns only raw HTML code for 'index.html'.";

/// Turns a brief into a single self-contained HTML page.
#[derive(Clone)]
pub struct ContentGenerator {
    llm: Arc<dyn TextGenerator>,
}

impl ContentGenerator {
    pub fn new(llm: Arc<dyn TextGenerator>) -> Self {
        Self { llm }
    }

    pub async fn generate(
        &self,
        brief: &str,
        attachment_names: &[&str],
    ) -> Result<String, GenerationError> {
        let prompt = build_prompt(brief, attachment_names);
        let raw = self.llm.complete(&prompt).await?;

        let html = strip_code_fence(&raw);
        if html.is_empty() {
            return Err(GenerationError::EmptyContent);
        }

        info!("Generated {} bytes of HTML", html.len());
        Ok(html.to_string())
    }
}

pub fn build_prompt(brief: &str, attachment_names: &[&str]) -> ChatPrompt {
    let manifest = if attachment_names.is_empty() {
        "None.".to_string()
    } else {
        attachment_names
            .iter()
            .map(|name| format!("File: {}", name))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let user = format!(
        "Generate a single, self-contained HTML file named 'index.html' based on the brief below.\n\
         Return ONLY the raw HTML document, with no explanations, comments outside the markup, or markdown fences.\n\
         \n\
         Brief: {brief}\n\
         \n\
         Attachments (served from the same directory; reference them by relative path, e.g. './data.csv'):\n\
         {manifest}\n"
    );

    ChatPrompt {
        system: SYSTEM_INSTRUCTION.to_string(),
        user,
    }
}

/// Trims the reply and removes one leading "```html" and one trailing "```" fence.
pub fn strip_code_fence(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```html") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}
