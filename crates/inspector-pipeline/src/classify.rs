//! Attribute classification.
//!
//! [`AttributeRegistry`] turns a field's declared entries into ordered
//! categories:
//!
//! 1. Archetypes are expanded in place; their products take the
//!    archetype's priority and declaration slot.
//! 2. Entries are stably sorted by priority (ties keep declaration order).
//! 3. Entries are partitioned by category. `End` entries of areas and
//!    decorators are checked against the still-open `Begin` entries with the
//!    same pair tag and then dropped, since the pipeline closes every scope
//!    it opens.
//!
//! Problems are returned as diagnostics alongside the result; nothing here
//! fails.

use std::rc::Rc;

use crate::error::Diagnostic;
use crate::model::{Attribute, Category, Edge, FieldDescriptor, FieldMetadataEntry};
use crate::options::DEFAULT_MAX_ARCHETYPE_DEPTH;

/// A field's entries grouped by category, each group in draw order.
#[derive(Debug, Clone, Default)]
pub struct ClassifiedField {
    pub conditions: Vec<FieldMetadataEntry>,
    pub areas: Vec<FieldMetadataEntry>,
    pub decorators: Vec<FieldMetadataEntry>,
    pub target_types: Vec<FieldMetadataEntry>,
    pub property: Option<FieldMetadataEntry>,
    pub list: Option<FieldMetadataEntry>,
    pub issues: Vec<Diagnostic>,
}

impl ClassifiedField {
    /// Number of classified entries.
    pub fn len(&self) -> usize {
        self.conditions.len()
            + self.areas.len()
            + self.decorators.len()
            + self.target_types.len()
            + usize::from(self.property.is_some())
            + usize::from(self.list.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Classifies field metadata.
#[derive(Debug, Clone, Copy)]
pub struct AttributeRegistry {
    max_archetype_depth: usize,
}

impl Default for AttributeRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ARCHETYPE_DEPTH)
    }
}

impl AttributeRegistry {
    pub fn new(max_archetype_depth: usize) -> Self {
        Self {
            max_archetype_depth,
        }
    }

    /// Classifies the entries of `field`.
    pub fn classify(&self, field: &FieldDescriptor) -> ClassifiedField {
        let mut result = ClassifiedField::default();
        let field_name = field.qualified_name();

        let mut expanded = Vec::with_capacity(field.entries.len());
        for entry in &field.entries {
            self.expand(
                entry.attribute_rc(),
                entry.priority(),
                0,
                &field_name,
                &mut expanded,
                &mut result.issues,
            );
        }
        let mut entries: Vec<FieldMetadataEntry> = expanded
            .into_iter()
            .enumerate()
            .map(|(order, (attribute, priority))| FieldMetadataEntry::new(attribute, priority, order))
            .collect();
        entries.sort_by_key(FieldMetadataEntry::sort_key);

        // Begin entries whose pair tag has not been closed yet.
        let mut open: Vec<(Category, &'static str)> = Vec::new();

        for entry in entries {
            let category = entry.category();
            match category {
                Category::Condition => result.conditions.push(entry),
                Category::Area | Category::Decorator => {
                    let attribute = entry.attribute();
                    match attribute.edge() {
                        Edge::Begin => {
                            open.push((category, attribute.pair_tag()));
                            if category == Category::Area {
                                result.areas.push(entry);
                            } else {
                                result.decorators.push(entry);
                            }
                        }
                        Edge::End => {
                            let tag = attribute.pair_tag();
                            match open.iter().rposition(|(c, t)| *c == category && *t == tag) {
                                Some(index) => {
                                    open.remove(index);
                                }
                                None => result.issues.push(Diagnostic::UnbalancedScope {
                                    field: field_name.clone(),
                                    attribute: attribute.name(),
                                }),
                            }
                        }
                    }
                }
                Category::TargetType => {
                    if entry.attribute().target_type().is_none() {
                        result.issues.push(usage(
                            &field_name,
                            &entry,
                            "target-type attribute declares no target type",
                        ));
                    } else {
                        result.target_types.push(entry);
                    }
                }
                Category::Property => {
                    if field.is_sequence {
                        result.issues.push(usage(
                            &field_name,
                            &entry,
                            "property drawers do not apply to sequence fields",
                        ));
                    } else if result.property.is_some() {
                        result.issues.push(usage(
                            &field_name,
                            &entry,
                            "field already has a property drawer",
                        ));
                    } else {
                        result.property = Some(entry);
                    }
                }
                Category::ListProperty => {
                    if !field.is_sequence {
                        result.issues.push(usage(
                            &field_name,
                            &entry,
                            "list drawers require a sequence field",
                        ));
                    } else if result.list.is_some() {
                        result.issues.push(usage(
                            &field_name,
                            &entry,
                            "field already has a list drawer",
                        ));
                    } else {
                        result.list = Some(entry);
                    }
                }
                // Depth-limited expansion leaves nothing of this category.
                Category::Archetype => {}
            }
        }

        result
    }

    fn expand(
        &self,
        attribute: &Rc<dyn Attribute>,
        priority: i32,
        depth: usize,
        field_name: &str,
        out: &mut Vec<(Rc<dyn Attribute>, i32)>,
        issues: &mut Vec<Diagnostic>,
    ) {
        if attribute.category() != Category::Archetype {
            out.push((Rc::clone(attribute), priority));
            return;
        }
        if depth >= self.max_archetype_depth {
            issues.push(Diagnostic::AttributeUsageInvalid {
                field: field_name.to_string(),
                attribute: attribute.name(),
                reason: format!("archetype expansion deeper than {}", self.max_archetype_depth),
            });
            return;
        }
        for product in attribute.expand() {
            self.expand(&product, priority, depth + 1, field_name, out, issues);
        }
    }
}

fn usage(field_name: &str, entry: &FieldMetadataEntry, reason: &str) -> Diagnostic {
    Diagnostic::AttributeUsageInvalid {
        field: field_name.to_string(),
        attribute: entry.name(),
        reason: reason.to_string(),
    }
}
