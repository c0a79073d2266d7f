//! Persona context: the query a collection is ranked against.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::text::{is_stopword, tokenize};

/// Objectives beyond this count are ignored.
pub const MAX_OBJECTIVES: usize = 3;

/// Task verbs that call for step-by-step content.
const ACTION_VERBS: &[&str] = &[
    "arrange", "book", "build", "configure", "convert", "cook", "create", "design", "develop",
    "fill", "implement", "install", "learn", "make", "manage", "organise", "organize", "plan",
    "prepare", "schedule", "set", "setup", "write",
];

/// Kind of content a task asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// Instructions, steps, how-to material
    Procedural,
    /// Narrative or explanatory prose
    Descriptive,
}

/// Role, task and optional context of the reader.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonaContext {
    pub role: String,
    pub task: String,
    pub expertise: Option<String>,
    pub background: Option<String>,
    /// Job objectives (at most three)
    pub objectives: Vec<String>,
    /// All non-empty parts joined into one query
    pub combined_query: String,
    /// Lowercase query terms used for keyword overlap
    pub salient_terms: Vec<String>,
    /// Content type implied by the task
    pub content_type: ContentType,
}

impl PersonaContext {
    /// Start building a context from role and task.
    pub fn builder(role: impl Into<String>, task: impl Into<String>) -> PersonaBuilder {
        PersonaBuilder {
            role: role.into(),
            task: task.into(),
            expertise: None,
            background: None,
            objectives: Vec::new(),
        }
    }

    /// Context from role and task only.
    pub fn new(role: impl Into<String>, task: impl Into<String>) -> Result<Self> {
        Self::builder(role, task).build()
    }
}

/// Builder for [`PersonaContext`].
#[derive(Debug, Clone, Default)]
pub struct PersonaBuilder {
    role: String,
    task: String,
    expertise: Option<String>,
    background: Option<String>,
    objectives: Vec<String>,
}

impl PersonaBuilder {
    /// Set the reader's expertise.
    pub fn with_expertise(mut self, expertise: impl Into<String>) -> Self {
        self.expertise = Some(expertise.into());
        self
    }

    /// Set the reader's background.
    pub fn with_background(mut self, background: impl Into<String>) -> Self {
        self.background = Some(background.into());
        self
    }

    /// Set job objectives.
    pub fn with_objectives<I, S>(mut self, objectives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.objectives = objectives.into_iter().map(Into::into).collect();
        self
    }

    /// Build the context.
    ///
    /// Fails with [`Error::Config`] when both role and task are empty.
    pub fn build(self) -> Result<PersonaContext> {
        let role = self.role.trim().to_string();
        let task = self.task.trim().to_string();
        if role.is_empty() && task.is_empty() {
            return Err(Error::Config(
                "persona needs a role or a task to rank against".to_string(),
            ));
        }

        let clean = |s: Option<String>| s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let expertise = clean(self.expertise);
        let background = clean(self.background);
        let objectives: Vec<String> = self
            .objectives
            .into_iter()
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .take(MAX_OBJECTIVES)
            .collect();

        let mut parts: Vec<&str> = vec![role.as_str(), task.as_str()];
        parts.extend(expertise.as_deref());
        parts.extend(background.as_deref());
        parts.extend(objectives.iter().map(String::as_str));
        let combined_query = parts
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(". ");

        let salient_terms = salient_terms(&combined_query);
        let content_type = task_content_type(&task);

        log::debug!(
            "Persona query {:?}: {} salient terms, {:?} content",
            combined_query,
            salient_terms.len(),
            content_type
        );

        Ok(PersonaContext {
            role,
            task,
            expertise,
            background,
            objectives,
            combined_query,
            salient_terms,
            content_type,
        })
    }
}

/// Distinct non-stop-word tokens of at least three characters (or
/// containing a digit), in order of first appearance.
pub fn salient_terms(text: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for token in tokenize(text) {
        let long_enough = token.chars().count() >= 3 || token.chars().any(|c| c.is_ascii_digit());
        if long_enough && !is_stopword(&token) && !terms.contains(&token) {
            terms.push(token);
        }
    }
    terms
}

/// Content type implied by a task description.
pub fn task_content_type(task: &str) -> ContentType {
    let procedural = tokenize(task)
        .iter()
        .any(|t| ACTION_VERBS.binary_search(&t.as_str()).is_ok());
    if procedural {
        ContentType::Procedural
    } else {
        ContentType::Descriptive
    }
}
