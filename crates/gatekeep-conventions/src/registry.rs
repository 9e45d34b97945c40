//! Convention lookup by id.

use crate::{
    CoreLibraryConvention, CoverageConvention, FrameworkLibraryConvention, LanguageConvention,
    LintConvention, StyleCheckConvention,
};
use gatekeep_core::{ConfigurationError, ConventionBox};

/// Returns the convention registered as `id`.
#[must_use]
pub fn resolve(id: &str) -> Option<ConventionBox> {
    all_conventions().into_iter().find(|c| c.id() == id)
}

/// Like [`resolve`], but an unknown id is a configuration error.
///
/// # Errors
///
/// Returns [`ConfigurationError::UnknownConvention`] for unknown ids.
pub fn require(id: &str) -> Result<ConventionBox, ConfigurationError> {
    resolve(id).ok_or_else(|| ConfigurationError::UnknownConvention { id: id.to_string() })
}

/// Returns all available conventions, bundles first.
#[must_use]
pub fn all_conventions() -> Vec<ConventionBox> {
    vec![
        Box::new(CoreLibraryConvention::new()),
        Box::new(FrameworkLibraryConvention::new()),
        Box::new(LanguageConvention::new()),
        Box::new(CoverageConvention::new()),
        Box::new(StyleCheckConvention::new()),
        Box::new(LintConvention::new()),
    ]
}
