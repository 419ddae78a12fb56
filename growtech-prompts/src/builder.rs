use std::fmt;

use growtech_primitives::{SkillLevel, TaskKind, TaskRequest};
use tracing::trace;

use crate::error::{PromptError, PromptResult};
use crate::template::PromptTemplate;

/// Instructional preamble placed in front of every coding question.
pub const TUTOR_PREAMBLE: &str = "You are GrowTech, a friendly AI tutor for technical skills. \
Provide clear, beginner-friendly answers with Python code examples. Break explanations into \
steps, avoid jargon, and suggest next steps. For debugging, identify errors and suggest fixes. \
Respond to: ";

/// Template for the debug tab.
pub const DEBUG_TEMPLATE: &str = "Debug this code and explain errors in simple terms: {{code}}";

/// Template for the learning-path tab.
pub const LEARNING_PATH_TEMPLATE: &str =
    "Suggest a 4-week learning path for a {{level}} to achieve: {{goal}}";

const TEMPLATE_VERSION: &str = "v1";

/// Finished prompt text, ready for the generation model.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Prompt(String);

impl Prompt {
    /// Returns the prompt text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the prompt, returning the owned text.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for Prompt {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Maps a task request onto its fixed template.
///
/// Holds no state beyond the parsed templates, so one instance can be shared
/// freely between controllers.
#[derive(Clone, Debug)]
pub struct PromptBuilder {
    qa: PromptTemplate,
    debug: PromptTemplate,
    learning_path: PromptTemplate,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptBuilder {
    /// Creates a builder loaded with the built-in templates.
    #[must_use]
    pub fn new() -> Self {
        Self {
            qa: PromptTemplate::new(format!("{TUTOR_PREAMBLE}{{{{question}}}}")),
            debug: PromptTemplate::new(DEBUG_TEMPLATE),
            learning_path: PromptTemplate::new(LEARNING_PATH_TEMPLATE),
        }
    }

    /// Version tag of the built-in template set.
    #[must_use]
    pub const fn version(&self) -> &'static str {
        TEMPLATE_VERSION
    }

    /// Returns the template used for `kind`.
    #[must_use]
    pub fn template(&self, kind: TaskKind) -> &PromptTemplate {
        match kind {
            TaskKind::Qa => &self.qa,
            TaskKind::Debug => &self.debug,
            TaskKind::LearningPath => &self.learning_path,
        }
    }

    /// Builds the prompt for a request.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError::InvalidRequest`] when the text is empty or
    /// whitespace only. The check runs before any template is touched.
    pub fn build_request(&self, request: &TaskRequest) -> PromptResult<Prompt> {
        self.build(request.kind(), request.text(), request.skill_level())
    }

    /// Builds the prompt for the given task, text, and skill level.
    ///
    /// `skill_level` is only read by [`TaskKind::LearningPath`].
    ///
    /// # Errors
    ///
    /// Returns [`PromptError::InvalidRequest`] when `text` is empty or
    /// whitespace only.
    pub fn build(
        &self,
        kind: TaskKind,
        text: &str,
        skill_level: SkillLevel,
    ) -> PromptResult<Prompt> {
        if text.trim().is_empty() {
            return Err(PromptError::invalid_request(format!(
                "{kind} prompt requires non-empty input"
            )));
        }

        let rendered = match kind {
            TaskKind::Qa => self.qa.render(&[("question", text)])?,
            TaskKind::Debug => self.debug.render(&[("code", text)])?,
            TaskKind::LearningPath => self
                .learning_path
                .render(&[("level", skill_level.prompt_form()), ("goal", text)])?,
        };

        trace!(%kind, chars = rendered.chars().count(), "prompt assembled");
        Ok(Prompt(rendered))
    }
}
