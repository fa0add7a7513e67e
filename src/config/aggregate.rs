//! Merging of per-section validation results.

use crate::config::validation::ValidationErrors;

/// Outcome of validating one section.
pub type SectionResult = Result<(), SectionFailure>;

/// Why a section failed validation.
#[derive(Debug, thiserror::Error)]
pub enum SectionFailure {
    /// Field violations, keyed by section then field.
    #[error("{0}")]
    Fields(ValidationErrors),

    /// A failure that is not a field violation. Passed through untouched.
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync + 'static>),
}

/// Merge the results of independently validated sections into one report.
///
/// `Ok` entries are skipped and field errors are combined, with the last
/// entry winning if two results share a section key. The first
/// [`SectionFailure::Other`] is returned as-is and stops the merge. Returns
/// `Ok(())` when no section reported anything.
pub fn merge_section_results<I>(results: I) -> SectionResult
where
    I: IntoIterator<Item = SectionResult>,
{
    let mut merged = ValidationErrors::new();

    for result in results {
        match result {
            Ok(()) => continue,
            Err(SectionFailure::Fields(errors)) => merged.merge(errors),
            Err(other @ SectionFailure::Other(_)) => return Err(other),
        }
    }

    if merged.is_empty() {
        Ok(())
    } else {
        Err(SectionFailure::Fields(merged))
    }
}
