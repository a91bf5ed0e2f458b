//! Area attributes. Areas wrap decorators.

use std::rc::Rc;

use crate::cache::{CacheStore, SharedStore};
use crate::drawers::ScopeDrawer;
use crate::error::DrawerError;
use crate::model::{Attribute, Category, Edge, KeyKind};
use crate::pipeline::DrawContext;
use crate::render::{Canvas, Scope};

/// A group box, optionally titled.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Group {
    pub title: Option<String>,
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
        }
    }

    fn scope(&self) -> Scope {
        Scope::Group {
            title: self.title.clone(),
        }
    }
}

impl Attribute for Group {
    fn name(&self) -> &'static str {
        "Group"
    }

    fn category(&self) -> Category {
        Category::Area
    }
}

/// Lays the field's decorations and value out horizontally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Horizontal;

impl Attribute for Horizontal {
    fn name(&self) -> &'static str {
        "Horizontal"
    }

    fn category(&self) -> Category {
        Category::Area
    }
}

/// A scrollable region of fixed height.
///
/// The scroll offset is a property of the field kind and survives
/// selection changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollArea {
    pub height: f32,
}

impl ScrollArea {
    pub fn new(height: f32) -> Self {
        Self { height }
    }
}

impl Attribute for ScrollArea {
    fn name(&self) -> &'static str {
        "ScrollArea"
    }

    fn category(&self) -> Category {
        Category::Area
    }
}

/// Closes the area with pair tag `tag`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndArea {
    pub tag: &'static str,
}

impl EndArea {
    pub fn new(tag: &'static str) -> Self {
        Self { tag }
    }
}

impl Attribute for EndArea {
    fn name(&self) -> &'static str {
        "EndArea"
    }

    fn category(&self) -> Category {
        Category::Area
    }

    fn edge(&self) -> Edge {
        Edge::End
    }

    fn pair_tag(&self) -> &'static str {
        self.tag
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GroupDrawer;

impl ScopeDrawer<Group> for GroupDrawer {
    fn begin(
        &self,
        group: &Group,
        _: &mut DrawContext<'_>,
        canvas: &mut dyn Canvas,
    ) -> Result<(), DrawerError> {
        canvas.begin_scope(&group.scope());
        Ok(())
    }

    fn end(
        &self,
        group: &Group,
        _: &mut DrawContext<'_>,
        canvas: &mut dyn Canvas,
    ) -> Result<(), DrawerError> {
        canvas.end_scope(&group.scope());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HorizontalDrawer;

impl ScopeDrawer<Horizontal> for HorizontalDrawer {
    fn begin(
        &self,
        _: &Horizontal,
        _: &mut DrawContext<'_>,
        canvas: &mut dyn Canvas,
    ) -> Result<(), DrawerError> {
        canvas.begin_scope(&Scope::Horizontal);
        Ok(())
    }

    fn end(
        &self,
        _: &Horizontal,
        _: &mut DrawContext<'_>,
        canvas: &mut dyn Canvas,
    ) -> Result<(), DrawerError> {
        canvas.end_scope(&Scope::Horizontal);
        Ok(())
    }
}

/// Keeps scroll offsets in a persistent-keyed store.
#[derive(Debug, Clone)]
pub struct ScrollAreaDrawer {
    offsets: SharedStore<f32>,
}

impl ScrollAreaDrawer {
    pub fn new() -> Self {
        Self {
            offsets: CacheStore::new("scroll-offsets", KeyKind::Persistent, |_, _| 0.0).shared(),
        }
    }

    pub fn store(&self) -> SharedStore<f32> {
        Rc::clone(&self.offsets)
    }
}

impl Default for ScrollAreaDrawer {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeDrawer<ScrollArea> for ScrollAreaDrawer {
    fn begin(
        &self,
        area: &ScrollArea,
        cx: &mut DrawContext<'_>,
        canvas: &mut dyn Canvas,
    ) -> Result<(), DrawerError> {
        let identity = cx.persistent_identity();
        let mut offsets = self
            .offsets
            .try_borrow_mut()
            .map_err(|_| DrawerError::Failed("scroll store busy".to_string()))?;
        canvas.begin_scope(&Scope::Scroll {
            height: area.height,
        });
        let offset = offsets.return_item(&identity, &());
        *offset = canvas.scroll(*offset);
        Ok(())
    }

    fn end(
        &self,
        area: &ScrollArea,
        _: &mut DrawContext<'_>,
        canvas: &mut dyn Canvas,
    ) -> Result<(), DrawerError> {
        canvas.end_scope(&Scope::Scroll {
            height: area.height,
        });
        Ok(())
    }
}
