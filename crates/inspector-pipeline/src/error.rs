//! Error and diagnostic types for attribute resolution and drawing.
//!
//! Nothing in this crate propagates an error past the pipeline boundary.
//! Host-facing failures are converted into [`Diagnostic`]s and reported to a
//! [`DiagnosticSink`](crate::diagnostics::DiagnosticSink); drawing always
//! continues with a safe default.

use thiserror::Error;

use crate::model::TypeClass;

/// Diagnostic codes reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    /// W001: A member named by an attribute could not be resolved
    MemberNotFound,
    /// W002: An attribute was declared somewhere it cannot apply
    AttributeUsageInvalid,
    /// W003: A value did not have the type an attribute or field expects
    TypeMismatch,
    /// W004: No drawer is registered for an attribute type
    UnmappedAttribute,
    /// W005: An End entry has no open Begin on the same field
    UnbalancedScope,
    /// W006: A drawer faulted while rendering
    DrawerFailed,
}

impl DiagnosticCode {
    /// Returns the code string (e.g., "W001").
    pub fn code(&self) -> &'static str {
        match self {
            DiagnosticCode::MemberNotFound => "W001",
            DiagnosticCode::AttributeUsageInvalid => "W002",
            DiagnosticCode::TypeMismatch => "W003",
            DiagnosticCode::UnmappedAttribute => "W004",
            DiagnosticCode::UnbalancedScope => "W005",
            DiagnosticCode::DrawerFailed => "W006",
        }
    }
}

/// A structured warning emitted while classifying or drawing a field.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Diagnostic {
    #[error("[W001] member `{member}` not found on {owner} (field `{field}`, {attribute})")]
    MemberNotFound {
        field: String,
        attribute: &'static str,
        member: String,
        owner: String,
    },

    #[error("[W002] {attribute} cannot be used on field `{field}`: {reason}")]
    AttributeUsageInvalid {
        field: String,
        attribute: &'static str,
        reason: String,
    },

    #[error("[W003] type mismatch on field `{field}` ({attribute}): expected {expected:?}, found {found:?}")]
    TypeMismatch {
        field: String,
        attribute: &'static str,
        expected: TypeClass,
        found: TypeClass,
    },

    #[error("[W004] no drawer registered for {attribute} (field `{field}`)")]
    UnmappedAttribute {
        field: String,
        attribute: &'static str,
    },

    #[error("[W005] {attribute} on field `{field}` has no open Begin to close")]
    UnbalancedScope {
        field: String,
        attribute: &'static str,
    },

    #[error("[W006] {attribute} failed on field `{field}`: {message}")]
    DrawerFailed {
        field: String,
        attribute: &'static str,
        message: String,
    },
}

impl Diagnostic {
    /// Returns the code for this diagnostic.
    pub fn code(&self) -> DiagnosticCode {
        match self {
            Diagnostic::MemberNotFound { .. } => DiagnosticCode::MemberNotFound,
            Diagnostic::AttributeUsageInvalid { .. } => DiagnosticCode::AttributeUsageInvalid,
            Diagnostic::TypeMismatch { .. } => DiagnosticCode::TypeMismatch,
            Diagnostic::UnmappedAttribute { .. } => DiagnosticCode::UnmappedAttribute,
            Diagnostic::UnbalancedScope { .. } => DiagnosticCode::UnbalancedScope,
            Diagnostic::DrawerFailed { .. } => DiagnosticCode::DrawerFailed,
        }
    }

    /// Returns the offending field path.
    pub fn field(&self) -> &str {
        match self {
            Diagnostic::MemberNotFound { field, .. }
            | Diagnostic::AttributeUsageInvalid { field, .. }
            | Diagnostic::TypeMismatch { field, .. }
            | Diagnostic::UnmappedAttribute { field, .. }
            | Diagnostic::UnbalancedScope { field, .. }
            | Diagnostic::DrawerFailed { field, .. } => field,
        }
    }

    /// Returns the name of the offending attribute.
    pub fn attribute(&self) -> &'static str {
        match self {
            Diagnostic::MemberNotFound { attribute, .. }
            | Diagnostic::AttributeUsageInvalid { attribute, .. }
            | Diagnostic::TypeMismatch { attribute, .. }
            | Diagnostic::UnmappedAttribute { attribute, .. }
            | Diagnostic::UnbalancedScope { attribute, .. }
            | Diagnostic::DrawerFailed { attribute, .. } => attribute,
        }
    }
}

/// Error returned by the host's member access provider.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MemberError {
    #[error("member not found")]
    Missing,

    #[error("member is read-only")]
    ReadOnly,

    #[error("expected {expected:?}, found {found:?}")]
    TypeMismatch { expected: TypeClass, found: TypeClass },

    #[error("member access faulted: {0}")]
    Faulted(String),
}

/// Error returned by a value drawer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DrawerError {
    #[error("expected {expected:?}, found {found:?}")]
    TypeMismatch { expected: TypeClass, found: TypeClass },

    #[error("{0}")]
    Failed(String),
}

/// Error in drawer or attribute configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("a drawer is already registered for {attribute}")]
    DuplicateDrawer { attribute: &'static str },

    #[error("no drawer registered for {attribute}")]
    UnmappedAttribute { attribute: &'static str },

    #[error("{attribute} is a {category} attribute but its drawer renders {drawer}")]
    CapabilityMismatch {
        attribute: &'static str,
        category: &'static str,
        drawer: &'static str,
    },
}
