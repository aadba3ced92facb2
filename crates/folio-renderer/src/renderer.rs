//! Template and markdown rendering.

use minijinja::{Environment, context};
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

use crate::util::HeadingIds;

/// Error returned when a content file cannot be rendered.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Template syntax or evaluation error.
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),
}

/// Renders templated markdown to HTML.
///
/// The renderer is immutable after construction and can be shared across
/// threads while a content tree is loaded in parallel.
pub struct MarkdownRenderer {
    env: Environment<'static>,
    restricted: bool,
}

impl MarkdownRenderer {
    /// Create a renderer for unrestricted mode.
    #[must_use]
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        Self {
            env,
            restricted: false,
        }
    }

    /// Set the value of the `restricted` template variable.
    #[must_use]
    pub fn with_restricted(mut self, restricted: bool) -> Self {
        self.restricted = restricted;
        self
    }

    /// Whether templates see `restricted = true`.
    #[must_use]
    pub fn restricted(&self) -> bool {
        self.restricted
    }

    /// Markdown extensions: tables. Fenced code is part of `CommonMark`.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        Options::ENABLE_TABLES
    }

    /// Run the template stage, then render the result as markdown.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Template`] if the template fails to parse or
    /// evaluate.
    pub fn render(&self, source: &str) -> Result<String, RenderError> {
        let markdown = self.apply_template(source)?;
        Ok(self.render_markdown(&markdown))
    }

    /// Evaluate `source` as a template with the `restricted` variable.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Template`] on syntax or evaluation errors.
    pub fn apply_template(&self, source: &str) -> Result<String, RenderError> {
        let rendered = self
            .env
            .render_str(source, context! { restricted => self.restricted })?;
        Ok(rendered)
    }

    /// Render markdown to HTML, generating heading ids.
    #[must_use]
    pub fn render_markdown(&self, markdown: &str) -> String {
        let mut events: Vec<Event<'_>> =
            Parser::new_ext(markdown, self.parser_options()).collect();
        assign_heading_ids(&mut events);

        let mut html = String::with_capacity(markdown.len() * 3 / 2);
        pulldown_cmark::html::push_html(&mut html, events.into_iter());
        html
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Give every heading without an explicit id one derived from its text.
fn assign_heading_ids(events: &mut [Event<'_>]) {
    let mut ids = HeadingIds::default();

    for i in 0..events.len() {
        if !matches!(&events[i], Event::Start(Tag::Heading { id: None, .. })) {
            continue;
        }
        let text = heading_text(&events[i + 1..]);
        let Some(generated) = ids.generate(&text) else {
            continue;
        };
        if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
            *id = Some(generated.into());
        }
    }
}

/// Collect the plain text of a heading up to its end tag.
fn heading_text(events: &[Event<'_>]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::End(TagEnd::Heading(_)) => break,
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            _ => {}
        }
    }
    text
}
