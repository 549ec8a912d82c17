pub type PosterResult<T> = Result<T, PosterError>;

#[derive(thiserror::Error, Debug)]
pub enum PosterError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("unknown style: {0}")]
    UnknownStyle(String),

    #[error("asset timeout: {0}")]
    AssetTimeout(String),

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error("superseded by generation {0}")]
    Superseded(u64),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PosterError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn unknown_style(id: impl Into<String>) -> Self {
        Self::UnknownStyle(id.into())
    }

    pub fn asset_timeout(msg: impl Into<String>) -> Self {
        Self::AssetTimeout(msg.into())
    }

    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Provider failures may succeed on a later attempt; everything else is final.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Provider(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
