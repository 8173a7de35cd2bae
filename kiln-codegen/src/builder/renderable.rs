/// A node in the layout tree of generated source.
#[derive(Debug, Clone, PartialEq)]
pub enum CodeFragment {
    /// One line; the builder adds indentation and the newline
    Line(String),
    Blank,
    /// `///` comment, one line per text line
    Doc(String),
    /// `header`, the body one level deeper, then `close` at the header's level
    Block {
        header: String,
        body: Vec<CodeFragment>,
        close: Option<String>,
    },
}

impl CodeFragment {
    pub fn line(s: impl Into<String>) -> Self {
        Self::Line(s.into())
    }

    pub fn blank() -> Self {
        Self::Blank
    }

    pub fn doc(s: impl Into<String>) -> Self {
        Self::Doc(s.into())
    }

    pub fn block(header: impl Into<String>, body: Vec<CodeFragment>, close: Option<String>) -> Self {
        Self::Block {
            header: header.into(),
            body,
            close,
        }
    }
}

/// Something that lays itself out as fragments.
pub trait Renderable {
    fn to_fragments(&self) -> Vec<CodeFragment>;
}

impl<T: Renderable + ?Sized> Renderable for &T {
    fn to_fragments(&self) -> Vec<CodeFragment> {
        (*self).to_fragments()
    }
}
