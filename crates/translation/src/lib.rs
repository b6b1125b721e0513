//! Best-effort translation of history entries into Korean.
//!
//! [`Translator::translate`] never fails: it resolves to a translation or to
//! the input text. Results are cached in a single key-value record, rate
//! limiting on the primary endpoint starts a shared cooldown, and
//! [`translate_history`] spaces live calls out to stay under public API limits.

mod backends;
mod cache;
mod config;
mod cooldown;
mod errors;
mod history;
mod translator;

pub use backends::{LibreTranslateBackend, MyMemoryBackend, TranslationBackend};
pub use cache::{CachedTranslation, TranslationCache};
pub use config::{BulkPacing, TranslationConfig};
pub use cooldown::CooldownState;
pub use errors::TranslationError;
pub use history::{translate_history, translate_history_cached};
pub use translator::{needs_translation, Translator};
