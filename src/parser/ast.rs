// Abstract Syntax Tree for insights markup

/// A parsed insights document
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// `#` to `######` prefix
    Heading { level: u8, content: Vec<Inline> },
    Paragraph(Vec<Inline>),
    /// Consecutive `- ` / `* ` lines
    List(Vec<Vec<Inline>>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Text(String),
    Strong(String),
    Emphasis(String),
    Code(String),
    Link { text: String, url: String },
}
