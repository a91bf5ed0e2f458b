//! Member value extraction.
//!
//! A [`ValueExtractor`] resolves a member name against one owner using one
//! strategy. [`ExtractionService`] tries its extractors in order (field,
//! accessor, method) and returns the first success; it never combines
//! results from different strategies. Storage lookups come first because
//! they are side-effect free.
//!
//! Across several targets, the first resolved value seeds a running value
//! and each later one is checked against it. The first disagreement marks
//! the result as mixed and stops further checks; extraction itself still
//! visits every target.

use crate::error::MemberError;
use crate::model::{Inspectable, ObjectRef, Value};

/// Member resolution strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractionStrategy {
    Field,
    Accessor,
    Method,
}

/// One member resolution strategy.
pub trait ValueExtractor {
    fn strategy(&self) -> ExtractionStrategy;

    fn try_get_value(&self, member: &str, owner: &dyn Inspectable) -> Result<Value, MemberError>;
}

/// Resolves stored fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldExtractor;

impl ValueExtractor for FieldExtractor {
    fn strategy(&self) -> ExtractionStrategy {
        ExtractionStrategy::Field
    }

    fn try_get_value(&self, member: &str, owner: &dyn Inspectable) -> Result<Value, MemberError> {
        owner.field(member)
    }
}

/// Resolves computed accessors.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessorExtractor;

impl ValueExtractor for AccessorExtractor {
    fn strategy(&self) -> ExtractionStrategy {
        ExtractionStrategy::Accessor
    }

    fn try_get_value(&self, member: &str, owner: &dyn Inspectable) -> Result<Value, MemberError> {
        owner.accessor(member)
    }
}

/// Invokes zero-argument methods.
#[derive(Debug, Clone, Copy, Default)]
pub struct MethodExtractor;

impl ValueExtractor for MethodExtractor {
    fn strategy(&self) -> ExtractionStrategy {
        ExtractionStrategy::Method
    }

    fn try_get_value(&self, member: &str, owner: &dyn Inspectable) -> Result<Value, MemberError> {
        owner.invoke(member)
    }
}

/// Result of extracting a member across targets.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExtractionResult {
    /// First resolved value, if any target resolved.
    pub value: Option<Value>,
    /// True when at least two resolved values disagree.
    pub has_mixed_values: bool,
    /// Number of targets that resolved the member.
    pub resolved: usize,
    /// Why unresolved targets failed. A fault outranks a plain miss.
    pub error: Option<MemberError>,
}

impl ExtractionResult {
    /// Returns true if at least one target resolved the member.
    pub fn found(&self) -> bool {
        self.value.is_some()
    }

    /// Returns the resolved value, or `Null` if nothing resolved.
    pub fn value_or_null(&self) -> &Value {
        const NULL: &Value = &Value::Null;
        self.value.as_ref().unwrap_or(NULL)
    }
}

/// Ordered chain of extractors.
pub struct ExtractionService {
    extractors: Vec<Box<dyn ValueExtractor>>,
}

impl ExtractionService {
    /// Creates the default chain: field, accessor, method.
    pub fn new() -> Self {
        Self {
            extractors: vec![
                Box::new(FieldExtractor),
                Box::new(AccessorExtractor),
                Box::new(MethodExtractor),
            ],
        }
    }

    /// Creates a service with a custom chain.
    pub fn with_extractors(extractors: Vec<Box<dyn ValueExtractor>>) -> Self {
        Self { extractors }
    }

    /// Returns the strategies in the order they are tried.
    pub fn strategies(&self) -> Vec<ExtractionStrategy> {
        self.extractors.iter().map(|e| e.strategy()).collect()
    }

    /// Resolves `member` on a single owner.
    ///
    /// Returns the first strategy's success. If every strategy fails, the
    /// most specific error is returned: a fault outranks a plain miss.
    pub fn try_get_value(
        &self,
        member: &str,
        owner: &dyn Inspectable,
    ) -> Result<Value, MemberError> {
        let mut error = MemberError::Missing;
        for extractor in &self.extractors {
            match extractor.try_get_value(member, owner) {
                Ok(value) => return Ok(value),
                Err(MemberError::Missing) => {}
                Err(e) => {
                    tracing::debug!(
                        member,
                        owner = owner.type_name(),
                        strategy = ?extractor.strategy(),
                        error = %e,
                        "member access faulted"
                    );
                    error = e;
                }
            }
        }
        Err(error)
    }

    /// Resolves `member` on every owner, detecting mixed values with `==`.
    pub fn try_get_value_across_targets(
        &self,
        member: &str,
        owners: &[ObjectRef],
    ) -> ExtractionResult {
        self.try_get_value_across_targets_with(member, owners, |a, b| a == b)
    }

    /// Resolves `member` on every owner, detecting mixed values with `eq`.
    ///
    /// Owners that fail to resolve are skipped. `eq` is not called again
    /// once a mismatch has been seen.
    pub fn try_get_value_across_targets_with<F>(
        &self,
        member: &str,
        owners: &[ObjectRef],
        mut eq: F,
    ) -> ExtractionResult
    where
        F: FnMut(&Value, &Value) -> bool,
    {
        let mut result = ExtractionResult::default();
        for owner in owners {
            let value = match self.try_get_value(member, owner.get()) {
                Ok(value) => value,
                Err(error) => {
                    if result.error.as_ref().is_none_or(|e| *e == MemberError::Missing) {
                        result.error = Some(error);
                    }
                    continue;
                }
            };
            result.resolved += 1;
            match &result.value {
                None => result.value = Some(value),
                Some(first) => {
                    if !result.has_mixed_values && !eq(first, &value) {
                        result.has_mixed_values = true;
                    }
                }
            }
        }
        result
    }
}

impl Default for ExtractionService {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ExtractionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractionService")
            .field("strategies", &self.strategies())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::model::MapObject;

    fn with_health(health: i64) -> ObjectRef {
        MapObject::new("Enemy").with_field("health", health).into_ref()
    }

    #[test]
    fn test_field_before_accessor_before_method() {
        let obj = MapObject::new("Enemy")
            .with_field("speed", 1)
            .with_accessor("speed", |_| Value::Int(2))
            .with_method("speed", |_| Ok(Value::Int(3)))
            .with_accessor("mood", |_| Value::from("calm"))
            .with_method("mood", |_| Ok(Value::from("angry")))
            .with_method("roar", |_| Ok(Value::from("rawr")));

        let service = ExtractionService::new();
        assert_eq!(service.try_get_value("speed", &obj), Ok(Value::Int(1)));
        assert_eq!(service.try_get_value("mood", &obj), Ok(Value::from("calm")));
        assert_eq!(service.try_get_value("roar", &obj), Ok(Value::from("rawr")));
        assert_eq!(service.try_get_value("none", &obj), Err(MemberError::Missing));
    }

    #[test]
    fn test_fault_reported_when_nothing_resolves() {
        let obj = MapObject::new("Enemy")
            .with_method("explode", |_| Err(MemberError::Faulted("boom".into())));
        let service = ExtractionService::new();
        assert_eq!(
            service.try_get_value("explode", &obj),
            Err(MemberError::Faulted("boom".into()))
        );
    }

    #[test]
    fn test_custom_chain_order() {
        let service = ExtractionService::with_extractors(vec![
            Box::new(MethodExtractor),
            Box::new(FieldExtractor),
        ]);
        let obj = MapObject::new("Enemy")
            .with_field("speed", 1)
            .with_method("speed", |_| Ok(Value::Int(3)));
        assert_eq!(service.try_get_value("speed", &obj), Ok(Value::Int(3)));
        assert_eq!(
            service.strategies(),
            vec![ExtractionStrategy::Method, ExtractionStrategy::Field]
        );
    }

    #[test]
    fn test_uniform_targets_not_mixed() {
        let owners = [with_health(3), with_health(3), with_health(3)];
        let result = ExtractionService::new().try_get_value_across_targets("health", &owners);
        assert!(result.found());
        assert!(!result.has_mixed_values);
        assert_eq!(result.value, Some(Value::Int(3)));
        assert_eq!(result.resolved, 3);
    }

    #[test]
    fn test_mixed_targets_stop_comparing() {
        let owners = [with_health(3), with_health(4), with_health(4), with_health(5)];
        let calls = Cell::new(0);
        let result = ExtractionService::new().try_get_value_across_targets_with(
            "health",
            &owners,
            |a, b| {
                calls.set(calls.get() + 1);
                a == b
            },
        );
        assert!(result.has_mixed_values);
        assert_eq!(result.value, Some(Value::Int(3)));
        assert_eq!(calls.get(), 1);
        // Extraction still visits every target.
        assert_eq!(result.resolved, 4);
    }

    #[test]
    fn test_last_target_mismatch() {
        let owners = [with_health(3), with_health(3), with_health(4)];
        let calls = Cell::new(0);
        let result = ExtractionService::new().try_get_value_across_targets_with(
            "health",
            &owners,
            |a, b| {
                calls.set(calls.get() + 1);
                a == b
            },
        );
        assert!(result.has_mixed_values);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_unresolved_targets_skipped() {
        let owners = [MapObject::new("Enemy").into_ref(), with_health(7)];
        let result = ExtractionService::new().try_get_value_across_targets("health", &owners);
        assert_eq!(result.value, Some(Value::Int(7)));
        assert!(!result.has_mixed_values);
        assert_eq!(result.resolved, 1);

        let none = ExtractionService::new().try_get_value_across_targets("health", &owners[..1]);
        assert!(!none.found());
        assert_eq!(none.value_or_null(), &Value::Null);
        assert_eq!(none.error, Some(MemberError::Missing));
    }

    #[test]
    fn test_fault_kept_across_targets() {
        let owners = [
            MapObject::new("Enemy").into_ref(),
            MapObject::new("Enemy")
                .with_method("health", |_| Err(MemberError::Faulted("boom".into())))
                .into_ref(),
            MapObject::new("Enemy").into_ref(),
        ];
        let result = ExtractionService::new().try_get_value_across_targets("health", &owners);
        assert!(!result.found());
        assert_eq!(result.error, Some(MemberError::Faulted("boom".into())));
    }
}
