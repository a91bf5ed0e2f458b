//! Condition attributes.
//!
//! `ShowIf`, `HideIf`, `EnableIf`, and `DisableIf` compare a member of the
//! edited objects against an operand. When the member resolves nowhere the
//! condition does not apply (and a `W001` is reported, or a `W006` if the
//! host's member access faulted). Mixed values count as
//! "comparison false". An unsupported comparison does not apply either.

use crate::compare::ComparisonOperator;
use crate::drawers::ConditionDrawer;
use crate::model::{Attribute, Category, Value};
use crate::pipeline::{ConditionMode, DrawContext, PropertyCondition};

/// Member, operand, and operator shared by the comparison conditions.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonCondition {
    pub member: String,
    pub operand: Value,
    pub operator: ComparisonOperator,
    pub mode: ConditionMode,
}

impl ComparisonCondition {
    pub fn new(member: impl Into<String>, operand: impl Into<Value>) -> Self {
        Self {
            member: member.into(),
            operand: operand.into(),
            operator: ComparisonOperator::Equal,
            mode: ConditionMode::And,
        }
    }
}

/// An attribute whose verdict follows from one comparison.
pub trait ComparisonAttribute: Attribute {
    fn condition(&self) -> &ComparisonCondition;

    /// Maps the comparison result to a verdict.
    fn verdict(&self, matched: bool) -> PropertyCondition;
}

macro_rules! comparison_attribute {
    ($(#[$doc:meta])* $name:ident, |$matched:ident| $verdict:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name(pub ComparisonCondition);

        impl $name {
            /// Compares `member` for equality with `operand`.
            pub fn new(member: impl Into<String>, operand: impl Into<Value>) -> Self {
                Self(ComparisonCondition::new(member, operand))
            }

            pub fn operator(mut self, operator: ComparisonOperator) -> Self {
                self.0.operator = operator;
                self
            }

            /// Joins the field's OR group instead of the AND group.
            pub fn or(mut self) -> Self {
                self.0.mode = ConditionMode::Or;
                self
            }
        }

        impl Attribute for $name {
            fn name(&self) -> &'static str {
                stringify!($name)
            }

            fn category(&self) -> Category {
                Category::Condition
            }
        }

        impl ComparisonAttribute for $name {
            fn condition(&self) -> &ComparisonCondition {
                &self.0
            }

            fn verdict(&self, $matched: bool) -> PropertyCondition {
                $verdict
            }
        }
    };
}

comparison_attribute!(
    /// Shows the field only when the comparison holds.
    ShowIf,
    |matched| if matched { PropertyCondition::Valid } else { PropertyCondition::NonValid }
);

comparison_attribute!(
    /// Hides the field when the comparison holds.
    HideIf,
    |matched| if matched { PropertyCondition::NonValid } else { PropertyCondition::Valid }
);

comparison_attribute!(
    /// Leaves the field interactive only when the comparison holds.
    EnableIf,
    |matched| if matched { PropertyCondition::Valid } else { PropertyCondition::Disabled }
);

comparison_attribute!(
    /// Makes the field non-interactive when the comparison holds.
    DisableIf,
    |matched| if matched { PropertyCondition::Disabled } else { PropertyCondition::Valid }
);

/// Always non-interactive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadOnly;

impl Attribute for ReadOnly {
    fn name(&self) -> &'static str {
        "ReadOnly"
    }

    fn category(&self) -> Category {
        Category::Condition
    }
}

/// Evaluates any [`ComparisonAttribute`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ComparisonDrawer;

impl<A: ComparisonAttribute + 'static> ConditionDrawer<A> for ComparisonDrawer {
    fn evaluate(&self, attribute: &A, cx: &mut DrawContext<'_>) -> PropertyCondition {
        let condition = attribute.condition();
        let extracted = cx.extract(&condition.member);
        if !extracted.found() {
            cx.report_unresolved(attribute.name(), &condition.member, &extracted);
            return PropertyCondition::Valid;
        }
        if extracted.has_mixed_values {
            return attribute.verdict(false);
        }
        match cx.compare(extracted.value_or_null(), &condition.operand, condition.operator) {
            Some(matched) => attribute.verdict(matched),
            None => PropertyCondition::Valid,
        }
    }

    fn mode(&self, attribute: &A) -> ConditionMode {
        attribute.condition().mode
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOnlyDrawer;

impl ConditionDrawer<ReadOnly> for ReadOnlyDrawer {
    fn evaluate(&self, _: &ReadOnly, _: &mut DrawContext<'_>) -> PropertyCondition {
        PropertyCondition::Disabled
    }
}
