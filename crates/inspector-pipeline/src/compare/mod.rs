//! Type-polymorphic value comparison.
//!
//! A [`ComparisonEngine`] holds an ordered set of [`ValueComparer`]s. Each
//! comparer declares the type classes and operators it accepts; a request is
//! dispatched to the first comparer that accepts it. When none does, the
//! result is "unsupported" (`None`), which callers treat as "condition not
//! applicable" rather than as a failure.

pub mod comparers;

use lazy_static::lazy_static;

use crate::model::{TypeClass, Value};

pub use comparers::{
    BoolComparer, FloatComparer, IntegerComparer, ReferenceComparer, StringComparer,
};

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    Equal,
    Greater,
    Less,
    GreaterEqual,
    LessEqual,
    /// Bitwise AND of source and target equals target.
    Mask,
}

impl ComparisonOperator {
    /// All operators, in declaration order.
    pub const ALL: [ComparisonOperator; 6] = [
        ComparisonOperator::Equal,
        ComparisonOperator::Greater,
        ComparisonOperator::Less,
        ComparisonOperator::GreaterEqual,
        ComparisonOperator::LessEqual,
        ComparisonOperator::Mask,
    ];

    /// Returns the flag for this operator.
    pub const fn as_set(self) -> OperatorSet {
        match self {
            ComparisonOperator::Equal => OperatorSet::EQUAL,
            ComparisonOperator::Greater => OperatorSet::GREATER,
            ComparisonOperator::Less => OperatorSet::LESS,
            ComparisonOperator::GreaterEqual => OperatorSet::GREATER_EQUAL,
            ComparisonOperator::LessEqual => OperatorSet::LESS_EQUAL,
            ComparisonOperator::Mask => OperatorSet::MASK,
        }
    }
}

bitflags::bitflags! {
    /// A set of comparison operators.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct OperatorSet: u8 {
        const EQUAL = 1 << 0;
        const GREATER = 1 << 1;
        const LESS = 1 << 2;
        const GREATER_EQUAL = 1 << 3;
        const LESS_EQUAL = 1 << 4;
        const MASK = 1 << 5;

        /// Every operator except `Mask`.
        const ORDERING = Self::EQUAL.bits()
            | Self::GREATER.bits()
            | Self::LESS.bits()
            | Self::GREATER_EQUAL.bits()
            | Self::LESS_EQUAL.bits();
    }
}

bitflags::bitflags! {
    /// A set of type classes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TypeClassSet: u8 {
        const NULL = 1 << 0;
        const BOOL = 1 << 1;
        const INT = 1 << 2;
        const FLOAT = 1 << 3;
        const TEXT = 1 << 4;
        const OBJECT = 1 << 5;
        const LIST = 1 << 6;

        const NUMERIC = Self::INT.bits() | Self::FLOAT.bits();
    }
}

impl TypeClass {
    /// Returns the flag for this type class.
    pub const fn as_set(self) -> TypeClassSet {
        match self {
            TypeClass::Null => TypeClassSet::NULL,
            TypeClass::Bool => TypeClassSet::BOOL,
            TypeClass::Int => TypeClassSet::INT,
            TypeClass::Float => TypeClassSet::FLOAT,
            TypeClass::Text => TypeClassSet::TEXT,
            TypeClass::Object => TypeClassSet::OBJECT,
            TypeClass::List => TypeClassSet::LIST,
        }
    }
}

/// A single comparison to perform.
#[derive(Debug, Clone, Copy)]
pub struct ComparisonRequest<'a> {
    pub source: &'a Value,
    pub target: &'a Value,
    pub operator: ComparisonOperator,
}

impl<'a> ComparisonRequest<'a> {
    pub fn new(source: &'a Value, target: &'a Value, operator: ComparisonOperator) -> Self {
        Self {
            source,
            target,
            operator,
        }
    }
}

/// A comparer for one family of type classes.
pub trait ValueComparer: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Type classes accepted for the source value.
    fn accepted_type_classes(&self) -> TypeClassSet;

    /// Type classes accepted for the target value. Defaults to the source set.
    fn accepted_target_classes(&self) -> TypeClassSet {
        self.accepted_type_classes()
    }

    /// Operators this comparer supports.
    fn accepted_operators(&self) -> OperatorSet;

    /// Returns true if this comparer accepts both values and the operator.
    fn is_valid_input(&self, request: &ComparisonRequest<'_>) -> bool {
        self.accepted_operators()
            .contains(request.operator.as_set())
            && self
                .accepted_type_classes()
                .contains(request.source.type_class().as_set())
            && self
                .accepted_target_classes()
                .contains(request.target.type_class().as_set())
    }

    /// Performs the comparison. Only called after [`is_valid_input`](Self::is_valid_input).
    fn compare(&self, request: &ComparisonRequest<'_>) -> bool;
}

lazy_static! {
    static ref SHARED_ENGINE: ComparisonEngine = ComparisonEngine::new();
}

/// Dispatches comparisons to the first accepting comparer.
pub struct ComparisonEngine {
    comparers: Vec<Box<dyn ValueComparer>>,
}

impl ComparisonEngine {
    /// Creates an engine with the built-in comparers, in registration order:
    /// bool, integer, float, string, reference.
    pub fn new() -> Self {
        Self {
            comparers: vec![
                Box::new(BoolComparer),
                Box::new(IntegerComparer),
                Box::new(FloatComparer),
                Box::new(StringComparer),
                Box::new(ReferenceComparer),
            ],
        }
    }

    /// Creates an engine with no comparers.
    pub fn empty() -> Self {
        Self {
            comparers: Vec::new(),
        }
    }

    /// Returns a process-wide engine with the built-in comparers.
    pub fn shared() -> &'static ComparisonEngine {
        &SHARED_ENGINE
    }

    /// Appends a comparer after the existing ones.
    pub fn with_comparer(mut self, comparer: impl ValueComparer + 'static) -> Self {
        self.comparers.push(Box::new(comparer));
        self
    }

    /// Returns the names of the registered comparers, in order.
    pub fn comparer_names(&self) -> Vec<&'static str> {
        self.comparers.iter().map(|c| c.name()).collect()
    }

    /// Compares using the first comparer that accepts the request.
    ///
    /// Returns `None` when no comparer accepts it.
    pub fn try_compare(&self, request: &ComparisonRequest<'_>) -> Option<bool> {
        let comparer = self.comparers.iter().find(|c| c.is_valid_input(request));
        match comparer {
            Some(c) => Some(c.compare(request)),
            None => {
                tracing::trace!(
                    source = request.source.type_class().name(),
                    target = request.target.type_class().name(),
                    operator = ?request.operator,
                    "comparison unsupported"
                );
                None
            }
        }
    }

    /// Convenience wrapper around [`try_compare`](Self::try_compare).
    pub fn compare(
        &self,
        source: &Value,
        target: &Value,
        operator: ComparisonOperator,
    ) -> Option<bool> {
        self.try_compare(&ComparisonRequest::new(source, target, operator))
    }
}

impl Default for ComparisonEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ComparisonEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComparisonEngine")
            .field("comparers", &self.comparer_names())
            .finish()
    }
}
