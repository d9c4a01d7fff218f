//! Translator backends for RowQL.
//!
//! A [`Translator`] renders each statement of a validated [`Query`] into a
//! fragment of a foreign filter language and owns the AND/OR composition
//! syntax that joins them. Backends are registered by name in a
//! [`Registry`]; [`translate`] uses a registry preloaded with the
//! built-in backends:
//!
//! - `"search"` — [`SearchSyntax`], a token-search filter language
//!   (`field:"value"`, `-` negation, `(a AND b) OR (c)`)
//! - `"formula"` — [`FormulaSyntax`], a spreadsheet formula language
//!   (`{field}=value`, `OR(AND(…),…)`)
//! - `"filter"` — [`FilterTree`], a structured JSON filter tree
//!   (`{field: {"values": […]}}`, nested `"and"`/`"or"`/`"not"` nodes)
//!
//! Translation is all-or-nothing: if any statement uses an operator the
//! backend has no mapping for, the whole translation fails with
//! [`TranslateError::UnsupportedOperator`].

mod filter;
mod formula;
mod search;

pub use filter::FilterTree;
pub use formula::FormulaSyntax;
pub use search::SearchSyntax;

use rowql_query::{Operator, Query};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Result type for translation.
pub type TranslateResult<T> = Result<T, TranslateError>;

/// Errors raised while rendering a query into a foreign language.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslateError {
    /// No translator is registered under the requested name.
    #[error("unknown target language: \"{0}\"")]
    UnknownLanguage(String),

    /// The target language has no mapping for an operator in the query.
    #[error("operator \"{0}\" is not supported by the target language")]
    UnsupportedOperator(String),
}

/// Renders validated query statements into a foreign filter language.
pub trait Translator {
    /// Render one statement, or `None` if the operator has no mapping.
    fn render(&self, operator: Operator, field: &str, value: &Value) -> Option<String>;

    /// Join rendered statements into the final expression. The outer
    /// vector is OR; each inner vector is an AND group.
    fn combine(&self, clauses: Vec<Vec<String>>) -> String;
}

/// A name-keyed set of translator backends.
#[derive(Default)]
pub struct Registry {
    languages: BTreeMap<String, Box<dyn Translator>>,
}

impl Registry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry preloaded with the built-in backends.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("search", SearchSyntax);
        registry.register("formula", FormulaSyntax);
        registry.register("filter", FilterTree);
        registry
    }

    /// Register a backend under a name, replacing any previous entry.
    pub fn register(&mut self, name: &str, translator: impl Translator + 'static) {
        self.languages.insert(name.to_string(), Box::new(translator));
    }

    /// Registered language names, sorted.
    #[must_use]
    pub fn languages(&self) -> Vec<&str> {
        self.languages.keys().map(String::as_str).collect()
    }

    /// Render a validated query in the named target language.
    pub fn translate(&self, query: &Query, language: &str) -> TranslateResult<String> {
        let translator = self
            .languages
            .get(language)
            .ok_or_else(|| TranslateError::UnknownLanguage(language.to_string()))?;
        let clauses = query
            .clauses
            .iter()
            .map(|clause| {
                clause
                    .statements
                    .iter()
                    .map(|s| {
                        translator.render(s.operator, &s.field, &s.value).ok_or_else(|| {
                            TranslateError::UnsupportedOperator(s.operator.as_str().to_string())
                        })
                    })
                    .collect::<TranslateResult<Vec<_>>>()
            })
            .collect::<TranslateResult<Vec<_>>>()?;
        Ok(translator.combine(clauses))
    }
}

/// Render a validated query using the built-in backends.
pub fn translate(query: &Query, language: &str) -> TranslateResult<String> {
    Registry::with_builtins().translate(query, language)
}
