//! Markdown transform.
//!
//! Finds fenced code blocks tagged with a map directive language and
//! replaces each one, in the source text, with its placeholder `div`.
//! Everything else in the document is copied through byte for byte, so the
//! output can be handed to any markdown renderer that passes raw HTML.
//!
//! A block whose payload cannot be parsed is left untouched and reported;
//! it never affects the rest of the document.

use std::ops::Range;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, html};
use serde::Serialize;

use crate::config::schema::{DEFAULT_LANGUAGE, EmbedConfig};
use crate::directive::{DirectiveOptions, MapDirective};
use crate::markup::Placeholder;
use crate::observability::metrics;

/// Settings for a [`Transformer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOptions {
    /// Info-string languages that mark a map directive.
    pub languages: Vec<String>,

    /// Options forwarded to the directive parser.
    pub directive: DirectiveOptions,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            languages: vec![DEFAULT_LANGUAGE.to_string()],
            directive: DirectiveOptions::default(),
        }
    }
}

impl From<&EmbedConfig> for TransformOptions {
    fn from(config: &EmbedConfig) -> Self {
        Self {
            languages: config.languages.clone(),
            directive: DirectiveOptions::from(config),
        }
    }
}

/// What happened to one map directive block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BlockOutcome {
    /// Replaced with a placeholder carrying an image.
    Rendered {
        /// Element id of the placeholder.
        id: String,
    },
    /// Replaced with a placeholder that has no image and will not become a map.
    MissingImage {
        /// Element id of the placeholder.
        id: String,
    },
    /// Left in place because the payload could not be parsed.
    ParseFailed {
        /// Parser error message.
        message: String,
    },
}

impl BlockOutcome {
    /// Short label used in logs and metrics.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Rendered { .. } => "rendered",
            Self::MissingImage { .. } => "missing_image",
            Self::ParseFailed { .. } => "parse_failed",
        }
    }
}

/// Report for one map directive block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockReport {
    /// Byte range of the whole fenced block in the input.
    pub range: Range<usize>,
    /// 1-based line of the opening fence.
    pub line: usize,
    /// What the transform did with the block.
    #[serde(flatten)]
    pub outcome: BlockOutcome,
}

/// Result of transforming one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformed {
    /// Transformed markdown.
    pub output: String,
    /// One report per map directive block, in document order.
    pub blocks: Vec<BlockReport>,
}

impl Transformed {
    /// Number of blocks left unrendered because of parse failures.
    #[must_use]
    pub fn failures(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| matches!(b.outcome, BlockOutcome::ParseFailed { .. }))
            .count()
    }
}

/// A located directive block awaiting replacement.
struct DirectiveBlock {
    range: Range<usize>,
    body: String,
}

/// Replaces map directive code blocks with placeholder markup.
#[derive(Debug, Clone, Default)]
pub struct Transformer {
    options: TransformOptions,
}

impl Transformer {
    /// Creates a transformer with the given options.
    #[must_use]
    pub const fn new(options: TransformOptions) -> Self {
        Self { options }
    }

    /// Transforms one markdown document.
    #[must_use]
    pub fn transform(&self, source: &str) -> Transformed {
        let located = self.locate(source);
        let mut output = String::with_capacity(source.len());
        let mut blocks = Vec::with_capacity(located.len());
        let mut cursor = 0;
        let mut line = 1;
        let mut counted = 0;

        for block in located {
            line += source[counted..block.range.start].matches('\n').count();
            counted = block.range.start;
            output.push_str(&source[cursor..block.range.start]);

            let outcome = match MapDirective::parse(&block.body, &self.options.directive) {
                Ok(directive) => {
                    let placeholder = Placeholder::from_directive(&directive);
                    push_replacement(
                        &mut output,
                        quote_markers(source, block.range.start),
                        &source[block.range.end..],
                        &placeholder.to_html(),
                    );
                    let id = directive.id;
                    if directive.image_path.is_empty() {
                        tracing::warn!(line, id = %id, "map directive has no usable image");
                        BlockOutcome::MissingImage { id }
                    } else {
                        tracing::debug!(
                            line,
                            id = %id,
                            image = %directive.image_path,
                            "rendered map directive"
                        );
                        BlockOutcome::Rendered { id }
                    }
                }
                Err(e) => {
                    tracing::error!(line, error = %e, "failed to parse map directive");
                    output.push_str(&source[block.range.clone()]);
                    BlockOutcome::ParseFailed {
                        message: e.to_string(),
                    }
                }
            };

            metrics::record_directive(outcome.label());
            cursor = block.range.end;
            blocks.push(BlockReport {
                range: block.range,
                line,
                outcome,
            });
        }

        output.push_str(&source[cursor..]);
        Transformed { output, blocks }
    }

    fn locate(&self, source: &str) -> Vec<DirectiveBlock> {
        let mut blocks = Vec::new();
        let mut current: Option<DirectiveBlock> = None;

        for (event, range) in Parser::new_ext(source, Options::all()).into_offset_iter() {
            match event {
                Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info)))
                    if self.is_directive_language(&info) =>
                {
                    current = Some(DirectiveBlock {
                        range,
                        body: String::new(),
                    });
                }
                Event::Text(text) => {
                    if let Some(block) = current.as_mut() {
                        block.body.push_str(&text);
                    }
                }
                Event::End(Tag::CodeBlock(_)) => {
                    if let Some(mut block) = current.take() {
                        block.range = include_line_break(source, block.range);
                        blocks.push(block);
                    }
                }
                _ => {}
            }
        }

        blocks
    }

    fn is_directive_language(&self, info: &str) -> bool {
        info.split_whitespace()
            .next()
            .is_some_and(|lang| self.options.languages.iter().any(|l| l == lang))
    }
}

/// Writes the placeholder in place of a block. A blank line follows it
/// so the next markdown line is not swallowed into the HTML block. Inside
/// a block quote the blank line carries the quote markers, otherwise it
/// would end the quote.
fn push_replacement(output: &mut String, markers: &str, rest: &str, html: &str) {
    output.push_str(html);
    output.push('\n');

    let next_line = rest.split('\n').next().unwrap_or_default();
    if rest.is_empty() || strip_quote_markers(next_line).trim().is_empty() {
        return;
    }
    output.push_str(markers);
    output.push('\n');
}

/// Block quote markers (`>`, `> >`, ...) that open the line a block
/// starts on, without trailing whitespace. Empty outside quotes.
fn quote_markers(source: &str, start: usize) -> &str {
    let line_start = source[..start].rfind('\n').map_or(0, |i| i + 1);
    let prefix = &source[line_start..start];
    let run = prefix
        .find(|c: char| c != '>' && !c.is_whitespace())
        .map_or(prefix, |end| &prefix[..end]);
    run.rfind('>').map_or("", |last| &run[..=last])
}

fn strip_quote_markers(line: &str) -> &str {
    line.trim_start_matches(|c: char| c == '>' || c.is_whitespace())
}

/// Extends a block range over the line break that ends its closing fence.
fn include_line_break(source: &str, mut range: Range<usize>) -> Range<usize> {
    if source[..range.end].ends_with('\n') {
        return range;
    }
    let rest = &source[range.end..];
    if rest.starts_with("\r\n") {
        range.end += 2;
    } else if rest.starts_with('\n') {
        range.end += 1;
    }
    range
}

/// Renders markdown to HTML, passing placeholder markup through verbatim.
#[must_use]
pub fn render_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, Options::all());
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}
