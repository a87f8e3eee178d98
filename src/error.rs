use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Render engine error: {0}")]
    Render(String),

    #[error("Image fetch failed: {0}")]
    ImageFetch(String),

    #[error("Image processing failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("Object storage error: {message}")]
    Storage { message: String },

    #[error("Content store error: {message}")]
    Store { message: String },
}

pub type Result<T> = std::result::Result<T, ScraperError>;
