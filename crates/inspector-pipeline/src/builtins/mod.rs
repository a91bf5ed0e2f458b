//! Built-in attributes and drawers.
//!
//! | Category    | Attributes                                                      |
//! |-------------|-----------------------------------------------------------------|
//! | condition   | `ShowIf`, `HideIf`, `EnableIf`, `DisableIf`, `ReadOnly`         |
//! | decorator   | `Space`, `Label`, `Line`, `Help`, `Indent`, `Highlight`, `EndDecorator` |
//! | area        | `Group`, `Horizontal`, `ScrollArea`, `EndArea`                  |
//! | property    | `Range`, `Multiline`, `Suffix`                                  |
//! | list        | `ReorderableList`                                               |
//! | target-type | `InlineEditor`                                                  |
//! | archetype   | `Title`                                                         |

mod archetypes;
mod areas;
mod conditions;
mod decorators;
mod inline;
mod lists;
mod properties;

pub use archetypes::Title;
pub use areas::{
    EndArea, Group, GroupDrawer, Horizontal, HorizontalDrawer, ScrollArea, ScrollAreaDrawer,
};
pub use conditions::{
    ComparisonAttribute, ComparisonCondition, ComparisonDrawer, DisableIf, EnableIf, HideIf,
    ReadOnly, ReadOnlyDrawer, ShowIf,
};
pub use decorators::{
    EndDecorator, Help, HelpDrawer, HelpPosition, Highlight, HighlightDrawer, Indent,
    IndentDrawer, Label, LabelDrawer, Line, LineDrawer, Space, SpaceDrawer,
};
pub use inline::{InlineEditor, InlineEditorDrawer, NestedEditor, NestedTarget};
pub use lists::{ReorderableList, ReorderableListDrawer};
pub use properties::{Multiline, MultilineDrawer, Range, RangeDrawer, Suffix, SuffixDrawer};

use crate::cache::StoreRegistry;
use crate::drawers::DrawerResolver;
use crate::error::ConfigurationError;

/// Registers every built-in drawer, and the stores of the stateful ones.
pub fn install(
    resolver: &mut DrawerResolver,
    stores: &mut StoreRegistry,
) -> Result<(), ConfigurationError> {
    resolver.register_condition::<ShowIf, _>(ComparisonDrawer)?;
    resolver.register_condition::<HideIf, _>(ComparisonDrawer)?;
    resolver.register_condition::<EnableIf, _>(ComparisonDrawer)?;
    resolver.register_condition::<DisableIf, _>(ComparisonDrawer)?;
    resolver.register_condition::<ReadOnly, _>(ReadOnlyDrawer)?;

    resolver.register_scope::<Space, _>(SpaceDrawer)?;
    resolver.register_scope::<Label, _>(LabelDrawer)?;
    resolver.register_scope::<Line, _>(LineDrawer)?;
    resolver.register_scope::<Help, _>(HelpDrawer)?;
    resolver.register_scope::<Indent, _>(IndentDrawer)?;
    resolver.register_scope::<Highlight, _>(HighlightDrawer)?;

    resolver.register_scope::<Group, _>(GroupDrawer)?;
    resolver.register_scope::<Horizontal, _>(HorizontalDrawer)?;
    let scroll = ScrollAreaDrawer::new();
    stores.register(scroll.store());
    resolver.register_scope::<ScrollArea, _>(scroll)?;

    resolver.register_value::<Range, _>(RangeDrawer)?;
    resolver.register_value::<Multiline, _>(MultilineDrawer)?;
    resolver.register_value::<Suffix, _>(SuffixDrawer)?;

    let lists = ReorderableListDrawer::new();
    stores.register(lists.store());
    resolver.register_value::<ReorderableList, _>(lists)?;

    let inline = InlineEditorDrawer::new();
    stores.register(inline.store());
    resolver.register_value::<InlineEditor, _>(inline)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::KeyKind;

    #[test]
    fn test_install() {
        let mut resolver = DrawerResolver::new();
        let mut stores = StoreRegistry::new();
        install(&mut resolver, &mut stores).unwrap();

        assert_eq!(resolver.len(), 19);
        let kinds: Vec<_> = stores.stats().into_iter().map(|s| (s.name, s.key_kind)).collect();
        assert_eq!(
            kinds,
            vec![
                ("scroll-offsets".to_string(), KeyKind::Persistent),
                ("list-states".to_string(), KeyKind::Volatile),
                ("nested-editors".to_string(), KeyKind::Volatile),
            ]
        );

        // A second install collides.
        assert!(matches!(
            install(&mut resolver, &mut stores),
            Err(ConfigurationError::DuplicateDrawer { attribute: "ShowIf" })
        ));
    }
}
