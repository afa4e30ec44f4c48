//! CLI errors that tell the operator what to do next.

use std::fmt;
use std::path::Path;

#[derive(Debug)]
pub struct HelpfulError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
}

impl HelpfulError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn database_unavailable(path: &Path, reason: impl fmt::Display) -> Self {
        Self::new("Failed to open the submission database")
            .with_context(format!("Database: {} ({})", path.display(), reason))
            .with_suggestion("TRY: Check that the directory is writable")
            .with_suggestion("TRY: Pass another location with --db <path>")
    }

    pub fn submission_not_found(id: i64) -> Self {
        Self::new(format!("Submission not found: {}", id))
            .with_suggestion("TRY: formanswers list                 # forms and counts per scope")
            .with_suggestion("TRY: formanswers submit ... --json    # prints the id of a new entry")
    }

    pub fn invalid_answers(reason: impl fmt::Display) -> Self {
        Self::new("Answers must be a JSON object")
            .with_context(reason.to_string())
            .with_suggestion(r#"TRY: formanswers submit --scope 5 --form contact '{"name":"Ada"}'"#)
    }
}

impl fmt::Display for HelpfulError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ERROR: {}", self.message)?;
        if let Some(context) = &self.context {
            writeln!(f)?;
            writeln!(f, "{}", context)?;
        }
        if !self.suggestions.is_empty() {
            writeln!(f)?;
            for suggestion in &self.suggestions {
                writeln!(f, "{}", suggestion)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for HelpfulError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_context_and_suggestions() {
        let err = HelpfulError::new("Something failed")
            .with_context("while exporting")
            .with_suggestion("TRY: again");
        let text = err.to_string();
        assert!(text.starts_with("ERROR: Something failed\n"));
        assert!(text.contains("while exporting"));
        assert!(text.contains("TRY: again"));
    }

    #[test]
    fn test_not_found_suggestions_are_read_only() {
        let text = HelpfulError::submission_not_found(42).to_string();
        assert!(text.contains("Submission not found: 42"));
        assert!(text.contains("formanswers list"));
        assert!(!text.contains("export"));
    }
}
