use crate::error::Result;
use crate::grammar::Grammar;
use crate::linear::Linearizer;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

/// Runtime settings, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Grammar resource replacing the built-in PENMAN grammar.
    pub grammar_path: Option<PathBuf>,
    /// Linearization used for relation records and generation requests.
    pub linearizer: Linearizer,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grammar_path: None,
            linearizer: Linearizer::plain(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Linearizer::plain();
        Self {
            grammar_path: lookup("AMR_GRAMMAR_PATH").map(PathBuf::from),
            linearizer: Linearizer {
                delimiter: lookup("AMR_LINEAR_DELIMITER").unwrap_or(defaults.delimiter),
                literal_begin: lookup("AMR_LITERAL_BEGIN").unwrap_or(defaults.literal_begin),
                literal_end: lookup("AMR_LITERAL_END").unwrap_or(defaults.literal_end),
            },
        }
    }

    /// The configured grammar, or the shared built-in one.
    pub fn grammar(&self) -> Result<Arc<Grammar>> {
        match &self.grammar_path {
            Some(path) => {
                tracing::info!(path = %path.display(), "loading AMR grammar");
                Ok(Arc::new(Grammar::load(path)?))
            }
            None => Grammar::shared(),
        }
    }
}
