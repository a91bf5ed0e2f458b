//! Inline editing of referenced objects.

use std::rc::Rc;

use crate::cache::{CacheStore, SharedStore};
use crate::drawers::ValueDrawer;
use crate::error::DrawerError;
use crate::model::{
    Attribute, Category, EditingSession, FieldIdentity, KeyKind, ObjectRef, TypeClass, Value,
};
use crate::pipeline::DrawContext;
use crate::render::{Canvas, LabelStyle, Scope, WidgetHint};

/// Draws a referenced object's fields inside the referencing field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InlineEditor {
    /// Start folded.
    pub collapsed: bool,
}

impl InlineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collapsed(mut self) -> Self {
        self.collapsed = true;
        self
    }
}

impl Attribute for InlineEditor {
    fn name(&self) -> &'static str {
        "InlineEditor"
    }

    fn category(&self) -> Category {
        Category::TargetType
    }

    fn target_type(&self) -> Option<TypeClass> {
        Some(TypeClass::Object)
    }
}

/// A sub-editor for one referenced object.
#[derive(Debug, Clone)]
pub struct NestedEditor {
    pub session: EditingSession,
    pub expanded: bool,
}

/// Factory arguments for a nested editor.
pub struct NestedTarget {
    object: ObjectRef,
    expanded: bool,
}

#[derive(Debug, Clone)]
pub struct InlineEditorDrawer {
    editors: SharedStore<NestedEditor, NestedTarget>,
}

impl InlineEditorDrawer {
    pub fn new() -> Self {
        let factory = |_: &FieldIdentity, target: &NestedTarget| NestedEditor {
            session: EditingSession::single(target.object.clone()),
            expanded: target.expanded,
        };
        let editors = CacheStore::new("nested-editors", KeyKind::Volatile, factory).with_dispose(
            |key, editor: NestedEditor| {
                tracing::debug!(%key, session = %editor.session.id(), "nested editor disposed");
            },
        );
        Self {
            editors: editors.shared(),
        }
    }

    pub fn store(&self) -> SharedStore<NestedEditor, NestedTarget> {
        Rc::clone(&self.editors)
    }

    /// Returns the editor session for `object`, replacing a stale one.
    fn session_for(
        &self,
        cx: &DrawContext<'_>,
        inline: &InlineEditor,
        object: &ObjectRef,
    ) -> Result<Option<EditingSession>, DrawerError> {
        let identity = cx.volatile_identity();
        let mut editors = self
            .editors
            .try_borrow_mut()
            .map_err(|_| DrawerError::Failed("nested editor store busy".to_string()))?;

        let stale = editors
            .get(&identity)
            .is_some_and(|editor| !editor.session.has_targets(std::slice::from_ref(object)));
        if stale {
            editors.clear_item(&identity);
        }

        let target = NestedTarget {
            object: object.clone(),
            expanded: !inline.collapsed,
        };
        let editor = editors.return_item(&identity, &target);
        Ok(editor.expanded.then(|| editor.session.clone()))
    }
}

impl Default for InlineEditorDrawer {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueDrawer<InlineEditor> for InlineEditorDrawer {
    fn render(
        &self,
        inline: &InlineEditor,
        cx: &mut DrawContext<'_>,
        canvas: &mut dyn Canvas,
    ) -> Result<(), DrawerError> {
        let object = match cx.value().value.as_ref().and_then(Value::as_object) {
            Some(object) if !cx.has_mixed_values() => object.clone(),
            _ => return cx.value_field(canvas, WidgetHint::Default),
        };

        // The store borrow ends here, before recursing.
        let session = self.session_for(cx, inline, &object)?;

        canvas.label(cx.label(), LabelStyle::Normal);
        if let Some(session) = session {
            let scope = Scope::Nested {
                type_name: object.type_name().to_string(),
            };
            canvas.begin_scope(&scope);
            cx.draw_nested(&session, canvas);
            canvas.end_scope(&scope);
        }
        Ok(())
    }
}
