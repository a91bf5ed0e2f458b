//! Built-in comparers.

use std::cmp::Ordering;

use crate::compare::{
    ComparisonOperator, ComparisonRequest, OperatorSet, TypeClassSet, ValueComparer,
};

/// Applies an ordering operator to a partial ordering result.
///
/// Incomparable operands (NaN) satisfy no operator.
fn satisfies(ordering: Option<Ordering>, operator: ComparisonOperator) -> bool {
    let Some(ordering) = ordering else {
        return false;
    };
    match operator {
        ComparisonOperator::Equal => ordering == Ordering::Equal,
        ComparisonOperator::Greater => ordering == Ordering::Greater,
        ComparisonOperator::Less => ordering == Ordering::Less,
        ComparisonOperator::GreaterEqual => ordering != Ordering::Less,
        ComparisonOperator::LessEqual => ordering != Ordering::Greater,
        ComparisonOperator::Mask => false,
    }
}

/// Compares booleans for equality.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolComparer;

impl ValueComparer for BoolComparer {
    fn name(&self) -> &'static str {
        "bool"
    }

    fn accepted_type_classes(&self) -> TypeClassSet {
        TypeClassSet::BOOL
    }

    fn accepted_operators(&self) -> OperatorSet {
        OperatorSet::EQUAL
    }

    fn compare(&self, request: &ComparisonRequest<'_>) -> bool {
        request.source.as_bool() == request.target.as_bool()
    }
}

/// Compares integers, including bit masks for flag fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerComparer;

impl ValueComparer for IntegerComparer {
    fn name(&self) -> &'static str {
        "integer"
    }

    fn accepted_type_classes(&self) -> TypeClassSet {
        TypeClassSet::INT
    }

    fn accepted_operators(&self) -> OperatorSet {
        OperatorSet::ORDERING | OperatorSet::MASK
    }

    fn compare(&self, request: &ComparisonRequest<'_>) -> bool {
        let (Some(source), Some(target)) = (request.source.as_i64(), request.target.as_i64())
        else {
            return false;
        };
        match request.operator {
            ComparisonOperator::Mask => source & target == target,
            op => satisfies(Some(source.cmp(&target)), op),
        }
    }
}

/// Compares any two numeric values after normalizing both to `f64`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatComparer;

impl ValueComparer for FloatComparer {
    fn name(&self) -> &'static str {
        "float"
    }

    fn accepted_type_classes(&self) -> TypeClassSet {
        TypeClassSet::NUMERIC
    }

    fn accepted_operators(&self) -> OperatorSet {
        OperatorSet::ORDERING
    }

    fn compare(&self, request: &ComparisonRequest<'_>) -> bool {
        let (Some(source), Some(target)) = (request.source.as_f64(), request.target.as_f64())
        else {
            return false;
        };
        satisfies(source.partial_cmp(&target), request.operator)
    }
}

/// Compares text for equality.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringComparer;

impl ValueComparer for StringComparer {
    fn name(&self) -> &'static str {
        "string"
    }

    fn accepted_type_classes(&self) -> TypeClassSet {
        TypeClassSet::TEXT
    }

    fn accepted_operators(&self) -> OperatorSet {
        OperatorSet::EQUAL
    }

    fn compare(&self, request: &ComparisonRequest<'_>) -> bool {
        request.source.as_str() == request.target.as_str()
    }
}

/// Compares a reference against a boolean presence flag.
///
/// `Equal(reference, true)` holds when the reference is non-null.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceComparer;

impl ValueComparer for ReferenceComparer {
    fn name(&self) -> &'static str {
        "reference"
    }

    fn accepted_type_classes(&self) -> TypeClassSet {
        TypeClassSet::OBJECT | TypeClassSet::NULL
    }

    fn accepted_target_classes(&self) -> TypeClassSet {
        TypeClassSet::BOOL
    }

    fn accepted_operators(&self) -> OperatorSet {
        OperatorSet::EQUAL
    }

    fn compare(&self, request: &ComparisonRequest<'_>) -> bool {
        let present = request.source.as_object().is_some();
        request.target.as_bool() == Some(present)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Value;

    #[test]
    fn test_satisfies_nan() {
        assert!(!satisfies(f64::NAN.partial_cmp(&1.0), ComparisonOperator::Equal));
        assert!(!satisfies(f64::NAN.partial_cmp(&1.0), ComparisonOperator::LessEqual));
    }

    #[test]
    fn test_integer_rejects_float() {
        let (a, b) = (Value::Int(1), Value::Float(1.0));
        let request = ComparisonRequest::new(&a, &b, ComparisonOperator::Equal);
        assert!(!IntegerComparer.is_valid_input(&request));
        assert!(FloatComparer.is_valid_input(&request));
        assert!(FloatComparer.compare(&request));
    }

    #[test]
    fn test_float_rejects_mask() {
        let (a, b) = (Value::Int(3), Value::Int(1));
        let request = ComparisonRequest::new(&a, &b, ComparisonOperator::Mask);
        assert!(IntegerComparer.is_valid_input(&request));
        assert!(!FloatComparer.is_valid_input(&request));
    }

    #[test]
    fn test_reference_requires_bool_target() {
        let (a, b) = (Value::Object(None), Value::Int(0));
        let request = ComparisonRequest::new(&a, &b, ComparisonOperator::Equal);
        assert!(!ReferenceComparer.is_valid_input(&request));
    }
}
