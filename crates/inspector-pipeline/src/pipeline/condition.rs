//! Tri-state field conditions.

/// Verdict of a condition attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PropertyCondition {
    /// Render normally.
    #[default]
    Valid,
    /// Suppress the field entirely.
    NonValid,
    /// Render, but non-interactive.
    Disabled,
}

impl PropertyCondition {
    pub fn is_valid(self) -> bool {
        self == PropertyCondition::Valid
    }

    /// AND combination: the first non-`Valid` verdict wins.
    ///
    /// The iterator is consumed lazily and stops at that verdict.
    pub fn all<I>(conditions: I) -> Self
    where
        I: IntoIterator<Item = PropertyCondition>,
    {
        conditions
            .into_iter()
            .find(|c| !c.is_valid())
            .unwrap_or(PropertyCondition::Valid)
    }

    /// OR combination: any `Valid` verdict wins, otherwise the first
    /// non-`Valid` one. An empty group is `Valid`.
    ///
    /// The iterator stops at the first `Valid` verdict.
    pub fn any<I>(conditions: I) -> Self
    where
        I: IntoIterator<Item = PropertyCondition>,
    {
        let mut fallback = None;
        for condition in conditions {
            if condition.is_valid() {
                return PropertyCondition::Valid;
            }
            fallback.get_or_insert(condition);
        }
        fallback.unwrap_or(PropertyCondition::Valid)
    }
}

/// How a condition joins the others on the same field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConditionMode {
    #[default]
    And,
    Or,
}

#[cfg(test)]
mod tests {
    use super::PropertyCondition::*;
    use super::*;

    #[test]
    fn test_and_first_non_valid() {
        assert_eq!(PropertyCondition::all([Valid, Disabled]), Disabled);
        assert_eq!(PropertyCondition::all([Valid, NonValid, Disabled]), NonValid);
        assert_eq!(PropertyCondition::all([Valid, Valid]), Valid);
        assert_eq!(PropertyCondition::all(std::iter::empty()), Valid);
    }

    #[test]
    fn test_or_any_valid() {
        assert_eq!(PropertyCondition::any([NonValid, Valid]), Valid);
        assert_eq!(PropertyCondition::any([NonValid, Disabled]), NonValid);
        assert_eq!(PropertyCondition::any([Disabled, NonValid]), Disabled);
        assert_eq!(PropertyCondition::any(std::iter::empty()), Valid);
    }

    #[test]
    fn test_short_circuit() {
        let mut evaluated = 0;
        let verdict = PropertyCondition::all([Valid, Disabled, NonValid].into_iter().inspect(|_| {
            evaluated += 1;
        }));
        assert_eq!(verdict, Disabled);
        assert_eq!(evaluated, 2);

        let mut evaluated = 0;
        let verdict = PropertyCondition::any([NonValid, Valid, Disabled].into_iter().inspect(|_| {
            evaluated += 1;
        }));
        assert_eq!(verdict, Valid);
        assert_eq!(evaluated, 2);
    }
}
