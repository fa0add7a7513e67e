//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Per-field rules: required, enumerated, conditional-required,
//!   conditional-empty, dependent-required, length-matched
//! - Section-keyed error collection
//!
//! # Design Decisions
//! - Each section validates only its own fields; [`ConfigDocument::validate`]
//!   merges the per-section results through [`merge_section_results`]
//! - A field reports at most one violation: the first failing rule wins
//! - Returns all violations of all sections, not just the first
//! - Validation is a pure function of the (defaulted) document

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::config::aggregate::{merge_section_results, SectionFailure, SectionResult};
use crate::config::schema::{
    CommonConfig, ConfigDocument, CoreConnectionConfig, LogFormat, LogLevel, LogSinkKind,
    LoggingConfig, NbdServerConfig,
};

/// Field name → message for a single section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionErrors(BTreeMap<String, String>);

impl SectionErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` for `field` unless the field already failed.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(f, m)| (f.as_str(), m.as_str()))
    }
}

/// Section name → field errors, the combined report shown to the operator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<String, SectionErrors>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// A report holding a single section.
    pub fn section(name: impl Into<String>, errors: SectionErrors) -> Self {
        let mut report = Self::new();
        report.insert(name, errors);
        report
    }

    /// Insert a section's errors, replacing any previous entry for the name.
    /// Empty collections are dropped.
    pub fn insert(&mut self, name: impl Into<String>, errors: SectionErrors) {
        if !errors.is_empty() {
            self.0.insert(name.into(), errors);
        }
    }

    /// Copy every section of `other` into `self`.
    pub fn merge(&mut self, other: ValidationErrors) {
        for (name, errors) in other.0 {
            self.insert(name, errors);
        }
    }

    pub fn get(&self, section: &str) -> Option<&SectionErrors> {
        self.0.get(section)
    }

    /// Message reported for `section.field`, if any.
    pub fn field(&self, section: &str, field: &str) -> Option<&str> {
        self.get(section).and_then(|errors| errors.get(field))
    }

    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of field violations across all sections.
    pub fn len(&self) -> usize {
        self.0.values().map(SectionErrors::len).sum()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (section, errors) in &self.0 {
            for (field, message) in errors.iter() {
                if !first {
                    write!(f, "; ")?;
                }
                first = false;
                write!(f, "{}.{}: {}", section, field, message)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Something a rule can test for emptiness.
pub trait FieldValue {
    fn is_blank(&self) -> bool;
}

impl FieldValue for str {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl FieldValue for String {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl FieldValue for Path {
    fn is_blank(&self) -> bool {
        self.as_os_str().is_empty()
    }
}

impl FieldValue for PathBuf {
    fn is_blank(&self) -> bool {
        self.as_os_str().is_empty()
    }
}

impl<T> FieldValue for [T] {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl<T> FieldValue for Vec<T> {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    fn is_blank(&self) -> bool {
        self.as_ref().map_or(true, FieldValue::is_blank)
    }
}

/// Collects the rule results of one section.
#[derive(Debug)]
pub struct SectionValidator {
    name: &'static str,
    errors: SectionErrors,
}

impl SectionValidator {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            errors: SectionErrors::new(),
        }
    }

    /// Start a rule chain for `field`.
    pub fn field<'a, V: FieldValue + ?Sized>(
        &'a mut self,
        field: &'static str,
        value: &'a V,
    ) -> FieldCheck<'a, V> {
        FieldCheck {
            errors: &mut self.errors,
            field,
            value,
        }
    }

    pub fn finish(self) -> SectionResult {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(SectionFailure::Fields(ValidationErrors::section(
                self.name,
                self.errors,
            )))
        }
    }
}

/// Rule chain for a single field.
///
/// Once a rule fails, the remaining rules of the chain (and of any later
/// chain for the same field) are skipped.
pub struct FieldCheck<'a, V: ?Sized> {
    errors: &'a mut SectionErrors,
    field: &'static str,
    value: &'a V,
}

impl<'a, V: FieldValue + ?Sized> FieldCheck<'a, V> {
    fn failed(&self) -> bool {
        self.errors.contains(self.field)
    }

    fn fail(self, message: impl Into<String>) -> Self {
        self.errors.add(self.field, message);
        self
    }

    /// Generic rule: `ok` must hold for the value.
    pub fn check(self, ok: impl FnOnce(&V) -> bool, message: impl Into<String>) -> Self {
        if self.failed() || ok(self.value) {
            self
        } else {
            self.fail(message)
        }
    }

    /// The value must be non-empty.
    pub fn required(self, message: impl Into<String>) -> Self {
        self.check(|v| !v.is_blank(), message)
    }

    /// The value must be empty.
    pub fn empty(self, message: impl Into<String>) -> Self {
        self.check(|v| v.is_blank(), message)
    }

    /// Apply `rules` only when `condition` holds.
    pub fn when(self, condition: bool, rules: impl FnOnce(Self) -> Self) -> Self {
        if condition {
            rules(self)
        } else {
            self
        }
    }
}

impl<'a> FieldCheck<'a, str> {
    /// A non-empty value must parse as `T`. Empty values are left to
    /// [`FieldCheck::required`].
    pub fn parses<T: FromStr>(self, allowed: &[&str]) -> Self {
        let ok = self.value.is_empty() || self.value.parse::<T>().is_ok();
        if self.failed() || ok {
            return self;
        }
        let message = format!(
            "invalid value {:?} (allowed: {})",
            self.value,
            allowed.join(", ")
        );
        self.fail(message)
    }
}

impl<'a, T> FieldCheck<'a, [T]> {
    /// The list must hold exactly `expected` entries.
    pub fn length(self, expected: usize, message: impl Into<String>) -> Self {
        let actual = self.value.len();
        if self.failed() || actual == expected {
            return self;
        }
        let message = format!("{} (expected {}, got {})", message.into(), expected, actual);
        self.fail(message)
    }
}

impl ConfigDocument {
    /// Validate every section and merge the results.
    pub fn validate(&self) -> SectionResult {
        merge_section_results([
            self.common.validate(),
            self.nbdserver.validate(),
            self.core.validate(),
            self.logging.validate(),
        ])
    }
}

impl CommonConfig {
    pub const SECTION: &'static str = "common";

    pub fn validate(&self) -> SectionResult {
        let mut v = SectionValidator::new(Self::SECTION);
        v.field("state_dir", &self.state_dir).required("required");
        v.finish()
    }
}

impl NbdServerConfig {
    pub const SECTION: &'static str = "nbdserver";

    pub fn validate(&self) -> SectionResult {
        let mut v = SectionValidator::new(Self::SECTION);
        v.field("socket", &self.socket).required("required");
        v.finish()
    }
}

impl CoreConnectionConfig {
    pub const SECTION: &'static str = "core";

    pub fn validate(&self) -> SectionResult {
        let mut v = SectionValidator::new(Self::SECTION);
        v.field("server", &self.server).required("required");
        v.field("control", &self.control).required("required");

        let has_fallback = !self.server_fallback.is_empty();
        let has_control_fallback = !self.control_fallback.is_empty();
        v.field("control_fallback", self.control_fallback.as_slice())
            .when(has_fallback, |c| {
                c.required("required when core.server_fallback is set")
            })
            .when(has_control_fallback, |c| {
                c.length(
                    self.server_fallback.len(),
                    "must be of same length as core.server_fallback",
                )
            });
        v.finish()
    }
}

impl LoggingConfig {
    pub const SECTION: &'static str = "logging";

    pub fn validate(&self) -> SectionResult {
        let mut v = SectionValidator::new(Self::SECTION);
        let kind = self.kind.as_deref().unwrap_or_default();
        let sink = self.sink_kind();

        v.field("type", kind)
            .required("required")
            .parses::<LogSinkKind>(LogSinkKind::ALLOWED);
        v.field("format", self.format.as_deref().unwrap_or_default())
            .required("required")
            .parses::<LogFormat>(LogFormat::ALLOWED);
        v.field("filename", &self.filename)
            .when(sink == Some(LogSinkKind::File), |c| {
                c.required("required when logging.type=file")
            })
            .when(sink == Some(LogSinkKind::Stdout), |c| {
                c.empty(format!("must be empty when logging.type={}", kind))
            });
        v.field("level", self.level.as_deref().unwrap_or_default())
            .required("required")
            .parses::<LogLevel>(LogLevel::ALLOWED);
        v.finish()
    }
}
