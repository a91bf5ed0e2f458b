//! Archetypes: attributes that stand for a fixed set of other attributes.

use std::rc::Rc;

use crate::builtins::{Label, Line};
use crate::model::{Attribute, Category};

/// A bold heading followed by a separator line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Title {
    pub text: String,
}

impl Title {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Attribute for Title {
    fn name(&self) -> &'static str {
        "Title"
    }

    fn category(&self) -> Category {
        Category::Archetype
    }

    fn expand(&self) -> Vec<Rc<dyn Attribute>> {
        vec![Rc::new(Label::bold(self.text.clone())), Rc::new(Line::default())]
    }
}
