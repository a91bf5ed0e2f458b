//! List attributes.

use std::rc::Rc;

use crate::cache::{CacheStore, SharedStore};
use crate::drawers::ValueDrawer;
use crate::error::DrawerError;
use crate::model::{Attribute, Category, KeyKind};
use crate::pipeline::DrawContext;
use crate::render::{Canvas, ListState, ListStyle};

/// A list with drag handles and a header.
///
/// The widget state (selection, fold) lives in a volatile store, so it is
/// dropped on selection changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderableList {
    pub style: ListStyle,
    pub draggable: bool,
    pub header: Option<String>,
}

impl Default for ReorderableList {
    fn default() -> Self {
        Self {
            style: ListStyle::Default,
            draggable: true,
            header: None,
        }
    }
}

impl ReorderableList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn style(mut self, style: ListStyle) -> Self {
        self.style = style;
        self
    }

    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    /// Disables reordering.
    pub fn fixed(mut self) -> Self {
        self.draggable = false;
        self
    }

    fn initial_state(&self) -> ListState {
        ListState {
            draggable: self.draggable,
            header: self.header.clone(),
            ..ListState::new(self.style)
        }
    }
}

impl Attribute for ReorderableList {
    fn name(&self) -> &'static str {
        "ReorderableList"
    }

    fn category(&self) -> Category {
        Category::ListProperty
    }
}

#[derive(Debug, Clone)]
pub struct ReorderableListDrawer {
    states: SharedStore<ListState, ReorderableList>,
}

impl ReorderableListDrawer {
    pub fn new() -> Self {
        let states = CacheStore::new("list-states", KeyKind::Volatile, |_, list: &ReorderableList| {
            list.initial_state()
        });
        Self {
            states: states.shared(),
        }
    }

    pub fn store(&self) -> SharedStore<ListState, ReorderableList> {
        Rc::clone(&self.states)
    }
}

impl Default for ReorderableListDrawer {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueDrawer<ReorderableList> for ReorderableListDrawer {
    fn render(
        &self,
        list: &ReorderableList,
        cx: &mut DrawContext<'_>,
        canvas: &mut dyn Canvas,
    ) -> Result<(), DrawerError> {
        let identity = cx.volatile_identity();
        let mut states = self
            .states
            .try_borrow_mut()
            .map_err(|_| DrawerError::Failed("list store busy".to_string()))?;
        let state = states.return_item(&identity, list);
        cx.list_field(canvas, state)
    }
}
