//! Queries run against the render engine's current page, and typed
//! helpers over [`RenderEnginePort`].

use crate::app::ports::RenderEnginePort;
use crate::error::{Result, ScraperError};
use async_trait::async_trait;

/// What to pull out of the current page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Trimmed text of the first element matching `selector` that has any text
    Text { selector: String },
    /// An attribute of the first matching element that carries it
    Attr { selector: String, attr: String },
    /// An attribute of every matching element
    AllAttrs { selector: String, attr: String },
    /// Every `<img>` on the page with its declared width
    Images,
}

/// An image found on the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageImage {
    pub src: String,
    pub width: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Extracted {
    Text(Option<String>),
    Texts(Vec<String>),
    Images(Vec<PageImage>),
}

/// Typed conveniences so callers never match on [`Extracted`] themselves.
#[async_trait]
pub trait PageQuery {
    async fn text(&self, selector: &str) -> Result<Option<String>>;
    async fn attr(&self, selector: &str, attr: &str) -> Result<Option<String>>;
    async fn all_attrs(&self, selector: &str, attr: &str) -> Result<Vec<String>>;
    async fn images(&self) -> Result<Vec<PageImage>>;
}

#[async_trait]
impl<T: RenderEnginePort + ?Sized> PageQuery for T {
    async fn text(&self, selector: &str) -> Result<Option<String>> {
        match self.extract(&Query::Text { selector: selector.to_string() }).await? {
            Extracted::Text(t) => Ok(t),
            other => Err(unexpected("text", &other)),
        }
    }

    async fn attr(&self, selector: &str, attr: &str) -> Result<Option<String>> {
        let query = Query::Attr { selector: selector.to_string(), attr: attr.to_string() };
        match self.extract(&query).await? {
            Extracted::Text(t) => Ok(t),
            other => Err(unexpected("attr", &other)),
        }
    }

    async fn all_attrs(&self, selector: &str, attr: &str) -> Result<Vec<String>> {
        let query = Query::AllAttrs { selector: selector.to_string(), attr: attr.to_string() };
        match self.extract(&query).await? {
            Extracted::Texts(v) => Ok(v),
            other => Err(unexpected("all_attrs", &other)),
        }
    }

    async fn images(&self) -> Result<Vec<PageImage>> {
        match self.extract(&Query::Images).await? {
            Extracted::Images(v) => Ok(v),
            other => Err(unexpected("images", &other)),
        }
    }
}

fn unexpected(query: &str, got: &Extracted) -> ScraperError {
    ScraperError::Render(format!("{} query returned mismatched result: {:?}", query, got))
}
