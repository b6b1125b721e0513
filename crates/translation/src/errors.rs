use oneul_core::{RetryClass, SourceError};
use thiserror::Error;

/// Failure of one translation attempt. Never returned by [`Translator::translate`](crate::Translator::translate).
#[derive(Error, Debug)]
pub enum TranslationError {
    #[error(transparent)]
    Upstream(#[from] SourceError),

    /// The endpoint answered but gave nothing usable (empty or unchanged text).
    #[error("No usable translation from {provider}")]
    NoTranslation { provider: String },
}

impl TranslationError {
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::Upstream(e) => e.retry_class(),
            Self::NoTranslation { .. } => RetryClass::Never,
        }
    }
}
