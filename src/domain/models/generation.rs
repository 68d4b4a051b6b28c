/// Fallback text used when the inference server answers with an empty result.
pub const EMPTY_RESPONSE_PLACEHOLDER: &str = "(No response)";

/// Model used when a caller does not name one.
pub const DEFAULT_MODEL: &str = "dolphin-llama3";

const PREAMBLE_SEPARATOR: &str = "\n\n";

/// One single-shot completion request. Built per call, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    prompt: String,
    model: String,
    system_preamble: Option<String>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
            system_preamble: None,
        }
    }

    pub fn with_system_preamble(mut self, preamble: impl Into<String>) -> Self {
        let preamble = preamble.into();
        self.system_preamble = if preamble.trim().is_empty() {
            None
        } else {
            Some(preamble)
        };
        self
    }

    pub fn with_optional_preamble(self, preamble: Option<&str>) -> Self {
        match preamble {
            Some(p) => self.with_system_preamble(p),
            None => self,
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn system_preamble(&self) -> Option<&str> {
        self.system_preamble.as_deref()
    }

    /// The text actually sent for completion. The preamble is plain prepended
    /// text, not a structured system message.
    pub fn full_prompt(&self) -> String {
        match &self.system_preamble {
            Some(preamble) => format!("{preamble}{PREAMBLE_SEPARATOR}User: {}", self.prompt),
            None => self.prompt.clone(),
        }
    }
}

/// Trims generated text, substituting [`EMPTY_RESPONSE_PLACEHOLDER`] for an
/// absent or blank result.
pub fn normalize_response(text: Option<&str>) -> String {
    match text.map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => EMPTY_RESPONSE_PLACEHOLDER.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_prompt_without_preamble_is_prompt() {
        let request = GenerationRequest::new("What is 2+2?", DEFAULT_MODEL);
        assert_eq!(request.full_prompt(), "What is 2+2?");
    }

    #[test]
    fn full_prompt_prepends_preamble() {
        let request =
            GenerationRequest::new("hi", "m").with_system_preamble("You are terse.");
        assert_eq!(request.full_prompt(), "You are terse.\n\nUser: hi");
    }

    #[test]
    fn blank_preamble_is_ignored() {
        let request = GenerationRequest::new("hi", "m").with_system_preamble("  ");
        assert_eq!(request.system_preamble(), None);
        assert_eq!(request.full_prompt(), "hi");
    }

    #[test]
    fn normalize_response_trims_and_substitutes() {
        assert_eq!(normalize_response(Some("  4\n")), "4");
        assert_eq!(normalize_response(Some("   ")), EMPTY_RESPONSE_PLACEHOLDER);
        assert_eq!(normalize_response(None), EMPTY_RESPONSE_PLACEHOLDER);
    }
}
