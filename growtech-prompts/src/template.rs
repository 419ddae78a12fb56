//! `{{variable}}` templates rendered in a single pass.
//!
//! The template text is split into literal and placeholder segments once, at
//! construction. Rendering walks the segments and copies values verbatim, so a
//! value that itself contains `{{...}}` is never expanded again.

use std::fmt;

/// Result alias for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Errors that can occur while rendering a template.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TemplateError {
    /// A placeholder in the template has no value.
    #[error("missing template variable: {name}")]
    MissingVariable {
        /// Name of the missing variable.
        name: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Variable(String),
}

/// A parsed prompt template.
///
/// # Examples
///
/// ```
/// use growtech_prompts::PromptTemplate;
///
/// let template = PromptTemplate::new("Explain {{topic}} to a {{level}}.");
/// let rendered = template
///     .render(&[("topic", "closures"), ("level", "beginner")])
///     .unwrap();
/// assert_eq!(rendered, "Explain closures to a beginner.");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PromptTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl PromptTemplate {
    /// Parses the supplied template text.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let segments = parse_segments(&source);
        Self { source, segments }
    }

    /// Returns the raw template text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the placeholder names in order of appearance.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Variable(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Renders the template, looking each placeholder up in `values`.
    ///
    /// When a name appears more than once in `values`, the first entry wins.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::MissingVariable`] if a placeholder has no value.
    pub fn render(&self, values: &[(&str, &str)]) -> TemplateResult<String> {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Variable(name) => {
                    let value = values
                        .iter()
                        .find_map(|(key, value)| (*key == name).then_some(*value))
                        .ok_or_else(|| TemplateError::MissingVariable { name: name.clone() })?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }
}

impl fmt::Display for PromptTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn parse_segments(source: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = source;

    while let Some(open) = rest.find("{{") {
        let after_open = &rest[open + 2..];
        let Some(close) = after_open.find("}}") else {
            break;
        };
        let name = after_open[..close].trim();
        if name.is_empty() {
            // `{{}}` carries no name; keep it as text.
            literal.push_str(&rest[..open + 2 + close + 2]);
        } else {
            literal.push_str(&rest[..open]);
            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(Segment::Variable(name.to_owned()));
        }
        rest = &after_open[close + 2..];
    }

    literal.push_str(rest);
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    segments
}
