//! The persona the assistant speaks for, and the system prompt built from it.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

/// The individual the assistant represents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    /// Display name, used throughout the prompt and the page title.
    pub name: String,
    /// Background summary the model answers from.
    pub summary: String,
}

impl Persona {
    /// Creates a persona.
    pub fn new(name: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            summary: summary.into(),
        }
    }

    /// Renders the system prompt for this persona.
    ///
    /// ```rust
    /// use persona_chat::Persona;
    ///
    /// let prompt = Persona::new("Rohit", "Ten years of data engineering.").system_prompt();
    /// assert!(prompt.starts_with("You are acting as Rohit."));
    /// assert!(prompt.contains("## Summary:\nTen years of data engineering."));
    /// ```
    pub fn system_prompt(&self) -> String {
        let name = &self.name;
        let mut prompt = format!(
            "You are acting as {name}. You are answering questions on {name}'s website, \
             particularly questions related to {name}'s career, background, skills and experience. \
             Your responsibility is to represent {name} for interactions on the website as faithfully as possible. \
             You are given a summary of {name}'s background which you can use to answer questions. \
             Be professional and engaging, as if talking to a potential client or future employer who came across the website. \
             If someone asks a generic question that is not about {name}, politely decline to answer it. \
             If you don't know the answer to any question, use your record_unknown_question tool to record the question \
             that you couldn't answer, even if it's about something trivial or unrelated to career. \
             If the user is engaging in discussion, try to steer them towards getting in touch via email; \
             ask for their email and record it using your record_user_details tool."
        );
        let _ = write!(
            prompt,
            "\n\n## Summary:\n{}\n\n##With this context, please chat with the user, \
             always staying in character as {name}.",
            self.summary
        );
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_names_both_tools() {
        let prompt = Persona::new("Rohit", "summary").system_prompt();
        assert!(prompt.contains("record_unknown_question"));
        assert!(prompt.contains("record_user_details"));
    }

    #[test]
    fn test_prompt_ends_in_character() {
        let prompt = Persona::new("Ada", "Engines.").system_prompt();
        assert!(prompt.ends_with("always staying in character as Ada."));
        assert!(prompt.contains("\n\n## Summary:\nEngines.\n\n##"));
    }

    #[test]
    fn test_prompt_with_empty_summary() {
        let prompt = Persona::new("Ada", "").system_prompt();
        assert!(prompt.contains("## Summary:\n\n\n##"));
    }
}
