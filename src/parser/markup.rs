// Lightweight markup parser for use case insights

use super::ast::{Block, Document, Inline};
use crate::tooltip::escape_html;
use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, take_until},
    character::complete::{anychar, char, satisfy},
    combinator::{map, not, verify},
    sequence::{delimited, pair, terminated},
    IResult,
};

/// Parse a whole insights text into blocks.
///
/// Blank lines separate paragraphs; `- ` / `* ` lines form lists and `#`
/// lines are headings. Never fails: anything unrecognised is text.
pub fn parse_markup(input: &str) -> Document {
    let mut blocks = Vec::new();
    let mut paragraph: Vec<&str> = Vec::new();
    let mut items: Vec<Vec<Inline>> = Vec::new();

    for line in input.lines() {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            flush_paragraph(&mut paragraph, &mut blocks);
            flush_list(&mut items, &mut blocks);
            continue;
        }

        if let Some(item) = list_item(trimmed) {
            flush_paragraph(&mut paragraph, &mut blocks);
            items.push(parse_inlines(item));
            continue;
        }

        if let Some((level, text)) = heading(trimmed) {
            flush_paragraph(&mut paragraph, &mut blocks);
            flush_list(&mut items, &mut blocks);
            blocks.push(Block::Heading { level, content: parse_inlines(text) });
            continue;
        }

        flush_list(&mut items, &mut blocks);
        paragraph.push(trimmed);
    }

    flush_paragraph(&mut paragraph, &mut blocks);
    flush_list(&mut items, &mut blocks);

    Document { blocks }
}

fn flush_paragraph(lines: &mut Vec<&str>, blocks: &mut Vec<Block>) {
    if !lines.is_empty() {
        blocks.push(Block::Paragraph(parse_inlines(&lines.join(" "))));
        lines.clear();
    }
}

fn flush_list(items: &mut Vec<Vec<Inline>>, blocks: &mut Vec<Block>) {
    if !items.is_empty() {
        blocks.push(Block::List(std::mem::take(items)));
    }
}

fn list_item(line: &str) -> Option<&str> {
    line.strip_prefix("- ").or_else(|| line.strip_prefix("* "))
}

fn heading(line: &str) -> Option<(u8, &str)> {
    let level = line.chars().take_while(|&c| c == '#').count();
    if level == 0 || level > 6 {
        return None;
    }
    let text = line[level..].strip_prefix(' ')?;
    Some((level as u8, text.trim()))
}

/// Parse inline spans, merging adjacent text
pub fn parse_inlines(input: &str) -> Vec<Inline> {
    let mut merged: Vec<Inline> = Vec::new();
    let mut rest = input;
    let mut prev: Option<char> = None;

    while !rest.is_empty() {
        // `_` inside a word (snake_case names) never opens emphasis
        let intraword = rest.starts_with('_') && prev.is_some_and(char::is_alphanumeric);
        let parsed = if intraword {
            map(anychar, |c| Inline::Text(c.to_string()))(rest)
        } else {
            parse_inline(rest)
        };
        let Ok((next, span)) = parsed else {
            merged.push(Inline::Text(rest.to_string()));
            break;
        };
        prev = rest[..rest.len() - next.len()].chars().last();
        rest = next;

        match (merged.last_mut(), span) {
            (Some(Inline::Text(text)), Inline::Text(more)) => text.push_str(&more),
            (_, span) => merged.push(span),
        }
    }
    merged
}

fn parse_inline(input: &str) -> IResult<&str, Inline> {
    alt((
        parse_strong,
        parse_emphasis,
        parse_code,
        parse_link,
        map(is_not("*_`["), |s: &str| Inline::Text(s.to_string())),
        // unterminated delimiter: keep it literally
        map(anychar, |c| Inline::Text(c.to_string())),
    ))(input)
}

fn parse_strong(input: &str) -> IResult<&str, Inline> {
    map(
        delimited(tag("**"), verify(take_until("**"), |s: &str| !s.is_empty()), tag("**")),
        |s: &str| Inline::Strong(s.to_string()),
    )(input)
}

fn parse_emphasis(input: &str) -> IResult<&str, Inline> {
    map(
        alt((
            delimited(char('*'), is_not("*\n"), char('*')),
            delimited(
                char('_'),
                is_not("_\n"),
                terminated(char('_'), not(satisfy(|c: char| c.is_alphanumeric()))),
            ),
        )),
        |s: &str| Inline::Emphasis(s.to_string()),
    )(input)
}

fn parse_code(input: &str) -> IResult<&str, Inline> {
    map(delimited(char('`'), is_not("`"), char('`')), |s: &str| {
        Inline::Code(s.to_string())
    })(input)
}

fn parse_link(input: &str) -> IResult<&str, Inline> {
    map(
        pair(
            delimited(char('['), is_not("]"), char(']')),
            delimited(char('('), is_not(")"), char(')')),
        ),
        |(text, url): (&str, &str)| Inline::Link {
            text: text.to_string(),
            url: url.trim().to_string(),
        },
    )(input)
}

// =============================================================================
// Rendering
// =============================================================================

impl Document {
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for block in &self.blocks {
            match block {
                Block::Heading { level, content } => {
                    out.push_str(&format!("<h{0}>{1}</h{0}>", level, inlines_html(content)));
                }
                Block::Paragraph(content) => {
                    out.push_str(&format!("<p>{}</p>", inlines_html(content)));
                }
                Block::List(items) => {
                    out.push_str("<ul>");
                    for item in items {
                        out.push_str(&format!("<li>{}</li>", inlines_html(item)));
                    }
                    out.push_str("</ul>");
                }
            }
        }
        out
    }

    /// Terminal rendering: markup dropped, links spelled out
    pub fn to_plain(&self) -> String {
        let mut paragraphs = Vec::new();
        for block in &self.blocks {
            match block {
                Block::Heading { content, .. } => paragraphs.push(inlines_plain(content).to_uppercase()),
                Block::Paragraph(content) => paragraphs.push(inlines_plain(content)),
                Block::List(items) => paragraphs.push(
                    items
                        .iter()
                        .map(|item| format!("  - {}", inlines_plain(item)))
                        .collect::<Vec<_>>()
                        .join("\n"),
                ),
            }
        }
        paragraphs.join("\n\n")
    }
}

fn inlines_html(spans: &[Inline]) -> String {
    spans
        .iter()
        .map(|span| match span {
            Inline::Text(t) => escape_html(t),
            Inline::Strong(t) => format!("<strong>{}</strong>", escape_html(t)),
            Inline::Emphasis(t) => format!("<em>{}</em>", escape_html(t)),
            Inline::Code(t) => format!("<code>{}</code>", escape_html(t)),
            Inline::Link { text, url } => {
                format!("<a href=\"{}\">{}</a>", escape_html(url), escape_html(text))
            }
        })
        .collect()
}

fn inlines_plain(spans: &[Inline]) -> String {
    spans
        .iter()
        .map(|span| match span {
            Inline::Text(t) | Inline::Strong(t) | Inline::Emphasis(t) | Inline::Code(t) => t.clone(),
            Inline::Link { text, url } => format!("{} ({})", text, url),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_spans() {
        let spans = parse_inlines("Churn is **high** in *low* tiers, see `churn_v2` or [docs](http://x/y).");
        assert_eq!(
            spans,
            vec![
                Inline::Text("Churn is ".to_string()),
                Inline::Strong("high".to_string()),
                Inline::Text(" in ".to_string()),
                Inline::Emphasis("low".to_string()),
                Inline::Text(" tiers, see ".to_string()),
                Inline::Code("churn_v2".to_string()),
                Inline::Text(" or ".to_string()),
                Inline::Link { text: "docs".to_string(), url: "http://x/y".to_string() },
                Inline::Text(".".to_string()),
            ]
        );
    }

    #[test]
    fn test_unterminated_delimiters_are_text() {
        assert_eq!(
            parse_inlines("5 * 3 and [oops"),
            vec![Inline::Text("5 * 3 and [oops".to_string())]
        );
        assert_eq!(parse_inlines("**open"), vec![Inline::Text("**open".to_string())]);
    }

    #[test]
    fn test_underscores_inside_words_are_text() {
        assert_eq!(
            parse_inlines("discount_v2 vs churn_v3"),
            vec![Inline::Text("discount_v2 vs churn_v3".to_string())]
        );
        assert_eq!(
            parse_inlines("see _this_ and a_b_c"),
            vec![
                Inline::Text("see ".to_string()),
                Inline::Emphasis("this".to_string()),
                Inline::Text(" and a_b_c".to_string()),
            ]
        );
        assert_eq!(parse_inlines("_open x_y"), vec![Inline::Text("_open x_y".to_string())]);
    }

    #[test]
    fn test_blocks() {
        let doc = parse_markup("# Summary\nFirst line\nsecond line.\n\n- one\n* **two**\n\nTail");
        assert_eq!(doc.blocks.len(), 4);
        assert_eq!(
            doc.blocks[0],
            Block::Heading { level: 1, content: vec![Inline::Text("Summary".to_string())] }
        );
        assert_eq!(
            doc.blocks[1],
            Block::Paragraph(vec![Inline::Text("First line second line.".to_string())])
        );
        let Block::List(items) = &doc.blocks[2] else {
            panic!("expected list");
        };
        assert_eq!(items.len(), 2);
        assert_eq!(items[1], vec![Inline::Strong("two".to_string())]);
    }

    #[test]
    fn test_html_escapes_text() {
        let doc = parse_markup("a < b & **c**");
        assert_eq!(doc.to_html(), "<p>a &lt; b &amp; <strong>c</strong></p>");
    }

    #[test]
    fn test_plain_rendering() {
        let doc = parse_markup("Top **3** segments\n\n- [report](http://r)");
        assert_eq!(doc.to_plain(), "Top 3 segments\n\n  - report (http://r)");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_markup(""), Document::default());
        assert!(parse_inlines("").is_empty());
    }
}
