//! Task kinds, skill levels, and the request a user submits from one tab.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// The three interaction modes offered by the tutor.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum TaskKind {
    /// Free-form coding question.
    Qa,
    /// Code snippet to explain and fix.
    Debug,
    /// Goal to turn into a four-week learning plan.
    LearningPath,
}

impl TaskKind {
    /// All task kinds, in tab order.
    pub const ALL: [Self; 3] = [Self::Qa, Self::Debug, Self::LearningPath];

    /// Stable label used in routes and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Qa => "qa",
            Self::Debug => "debug",
            Self::LearningPath => "learning-path",
        }
    }

    /// Title of the tab that hosts this task.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Qa => "Coding Q&A",
            Self::Debug => "Debug Code",
            Self::LearningPath => "Learning Path",
        }
    }

    /// Heading shown above a generated result.
    #[must_use]
    pub const fn result_heading(self) -> &'static str {
        match self {
            Self::Qa => "Answer",
            Self::Debug => "Debug Report",
            Self::LearningPath => "Your Learning Path",
        }
    }

    /// Text displayed while the model is generating.
    #[must_use]
    pub const fn loading_text(self) -> &'static str {
        match self {
            Self::Qa => "GrowTech is thinking... 🤔",
            Self::Debug => "Analyzing your code... 🔍",
            Self::LearningPath => "Crafting your learning path... 📝",
        }
    }

    /// Message shown when the user submits without any input.
    #[must_use]
    pub const fn empty_input_message(self) -> &'static str {
        match self {
            Self::Qa => "Please enter a question!",
            Self::Debug => "Please paste some code to debug!",
            Self::LearningPath => "Please enter a learning goal!",
        }
    }

    /// Acknowledgement shown after a successful generation.
    #[must_use]
    pub const fn success_acknowledgement(self) -> &'static str {
        match self {
            Self::Qa => "Done! Try another question or check other tabs! 🚀",
            Self::Debug => "Debug complete! Fix your code and test again! 🛠",
            Self::LearningPath => "Path generated! Start learning and share feedback! 🎉",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "qa" | "q&a" => Ok(Self::Qa),
            "debug" => Ok(Self::Debug),
            "learning-path" | "learning_path" | "learningpath" => Ok(Self::LearningPath),
            _ => Err(Error::UnknownTaskKind {
                value: s.to_owned(),
            }),
        }
    }
}

/// Experience level of the learner; only the learning-path task reads it.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String")]
pub enum SkillLevel {
    /// New to programming.
    #[default]
    Beginner,
    /// Comfortable with the basics.
    Intermediate,
    /// Experienced practitioner.
    Advanced,
}

impl SkillLevel {
    /// All levels in the order the selector lists them.
    pub const ALL: [Self; 3] = [Self::Beginner, Self::Intermediate, Self::Advanced];

    /// Capitalised label as shown in the selector.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
        }
    }

    /// Lower-case form used inside prompts.
    #[must_use]
    pub const fn prompt_form(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

impl fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SkillLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownSkillLevel {
                value: s.to_owned(),
            })
    }
}

impl TryFrom<String> for SkillLevel {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A single submission from one tab.
///
/// Created per submit, never mutated, dropped once the outcome is rendered.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct TaskRequest {
    kind: TaskKind,
    text: String,
    #[serde(default)]
    skill_level: SkillLevel,
}

impl TaskRequest {
    /// Creates a request for the supplied task with the default skill level.
    #[must_use]
    pub fn new(kind: TaskKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            skill_level: SkillLevel::default(),
        }
    }

    /// Sets the learner's skill level.
    #[must_use]
    pub fn with_skill_level(mut self, skill_level: SkillLevel) -> Self {
        self.skill_level = skill_level;
        self
    }

    /// Returns the task kind.
    #[must_use]
    pub const fn kind(&self) -> TaskKind {
        self.kind
    }

    /// Returns the raw user text (question, code, or goal).
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the learner's skill level.
    #[must_use]
    pub const fn skill_level(&self) -> SkillLevel {
        self.skill_level
    }

    /// Returns `true` when the text is empty or whitespace only.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}
