//! Rendering of syntax errors for terminals and logs.

use std::fmt::Write;
use std::ops::Range;

use annotate_snippets::{AnnotationKind, Level, Renderer, Snippet};

use super::Diagnostics;
use super::message::DiagnosticMessage;

/// Renders [`Diagnostics`] as annotated source excerpts, or as one line per
/// message when no source is attached.
pub struct DiagnosticsPrinter<'d, 's> {
    diagnostics: &'d Diagnostics,
    source: Option<&'s str>,
    path: Option<&'s str>,
    colored: bool,
    limit: Option<usize>,
}

impl<'d, 's> DiagnosticsPrinter<'d, 's> {
    pub fn new(diagnostics: &'d Diagnostics) -> Self {
        Self {
            diagnostics,
            source: None,
            path: None,
            colored: false,
            limit: None,
        }
    }

    /// Query text the message ranges point into.
    pub fn source(mut self, source: &'s str) -> Self {
        self.source = Some(source);
        self
    }

    /// Name shown in the excerpt header (or as a line prefix in plain output).
    pub fn path(mut self, path: &'s str) -> Self {
        self.path = Some(path);
        self
    }

    pub fn colored(mut self, value: bool) -> Self {
        self.colored = value;
        self
    }

    /// Render at most `count` messages, then a line saying how many were left out.
    pub fn limit(mut self, count: usize) -> Self {
        self.limit = Some(count);
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        let shown = self.limit.unwrap_or(usize::MAX).min(self.diagnostics.len());

        for (i, message) in self.diagnostics.iter().take(shown).enumerate() {
            if i > 0 {
                w.write_char('\n')?;
            }
            match self.source {
                Some(source) => self.format_excerpt(message, source, w)?,
                None => self.format_line(message, w)?,
            }
        }

        let hidden = self.diagnostics.len() - shown;
        if hidden > 0 {
            let noun = if hidden == 1 { "message" } else { "messages" };
            write!(w, "\n... {hidden} more {noun} not shown")?;
        }
        Ok(())
    }

    fn format_excerpt(
        &self,
        message: &DiagnosticMessage,
        source: &str,
        w: &mut impl Write,
    ) -> std::fmt::Result {
        let renderer = if self.colored {
            Renderer::styled()
        } else {
            Renderer::plain()
        };

        let mut snippet = Snippet::source(source)
            .line_start(1)
            .annotation(AnnotationKind::Primary.span(caret_range(message.range(), source)));
        if let Some(path) = self.path {
            snippet = snippet.path(path);
        }

        let report = [Level::ERROR
            .primary_title(message.message())
            .element(snippet)];
        write!(w, "{}", renderer.render(&report))
    }

    fn format_line(&self, message: &DiagnosticMessage, w: &mut impl Write) -> std::fmt::Result {
        match self.path {
            Some(path) => write!(w, "{path}: {message}"),
            None => write!(w, "{message}"),
        }
    }
}

/// Missing tokens are zero-width; widen them to the character they precede so
/// the caret shows. At end of input the range stays empty.
fn caret_range(range: Range<usize>, source: &str) -> Range<usize> {
    let start = range.start.min(source.len());
    let end = range.end.clamp(start, source.len());
    if start < end {
        return start..end;
    }
    let width = source
        .get(start..)
        .and_then(|rest| rest.chars().next())
        .map_or(0, char::len_utf8);
    start..start + width
}
