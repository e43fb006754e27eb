//! Hypermedia decoration of response entities.
//!
//! # Responsibilities
//! - Define the [`HypermediaDecorator`] contract applied before encoding
//! - Hold entity metadata (class, title, key, href, links, actions) per entity type
//! - Keep the content-type keyed decorator table
//!
//! # Design Decisions
//! - Decorators work on `serde_json::Value`, after the operation returned
//! - The first decorator registered for a content type is kept
//! - Link and action hrefs are relative; the decorator gets the absolute
//!   `http://<host>` prefix per request

mod siren;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::codec::essence;

pub use siren::{SirenDecorator, SIREN_JSON};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EntityLink {
    pub rel: String,
    pub href: String,
    pub title: Option<String>,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EntityAction {
    pub name: String,
    pub method: String,
    pub href: String,
    pub class: Option<String>,
    pub title: Option<String>,
    pub content_type: Option<String>,
}

/// Hypermedia description of one entity type.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EntityMetadata {
    pub class: String,
    pub title: Option<String>,
    /// Property holding the entity's identifier; fills `{key}` in hrefs.
    pub key: Option<String>,
    pub href: Option<String>,
    pub links: Vec<EntityLink>,
    pub actions: Vec<EntityAction>,
}

impl EntityMetadata {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            ..Default::default()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }

    pub fn link(mut self, rel: impl Into<String>, href: impl Into<String>) -> Self {
        self.links.push(EntityLink {
            rel: rel.into(),
            href: href.into(),
            ..Default::default()
        });
        self
    }

    pub fn action(
        mut self,
        name: impl Into<String>,
        method: impl Into<String>,
        href: impl Into<String>,
    ) -> Self {
        self.actions.push(EntityAction {
            name: name.into(),
            method: method.into(),
            href: href.into(),
            ..Default::default()
        });
        self
    }
}

/// Entity metadata keyed by entity type name (e.g. `State`).
pub type EntityTable = HashMap<String, EntityMetadata>;

/// Post-processing of a response entity for one content type.
pub trait HypermediaDecorator: Send + Sync {
    fn decorate(&self, prefix: &str, value: Value, entity: Option<&EntityMetadata>) -> Value;
}

/// Content-type keyed decorator table.
#[derive(Clone, Default)]
pub struct Decorators {
    table: HashMap<String, Arc<dyn HypermediaDecorator>>,
}

impl Decorators {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `decorator` unless one already serves `content_type`.
    pub fn register(&mut self, content_type: &str, decorator: Arc<dyn HypermediaDecorator>) {
        self.table.entry(essence(content_type)).or_insert(decorator);
    }

    pub fn get(&self, content_type: &str) -> Option<&Arc<dyn HypermediaDecorator>> {
        self.table.get(&essence(content_type))
    }
}

impl fmt::Debug for Decorators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.table.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Tag(&'static str);

    impl HypermediaDecorator for Tag {
        fn decorate(&self, _: &str, value: Value, _: Option<&EntityMetadata>) -> Value {
            json!({ "tag": self.0, "value": value })
        }
    }

    #[test]
    fn test_first_registration_wins() {
        let mut decorators = Decorators::new();
        decorators.register("application/hal+json", Arc::new(Tag("first")));
        decorators.register("application/hal+json", Arc::new(Tag("second")));
        let out = decorators
            .get("application/hal+json; charset=utf-8")
            .unwrap()
            .decorate("", json!(1), None);
        assert_eq!(out["tag"], "first");
    }

    #[test]
    fn test_entity_metadata_builder() {
        let entity = EntityMetadata::new("state")
            .key("Abbreviation")
            .href("/states")
            .link("capital", "/capitals")
            .action("remove", "DELETE", "/states");
        assert_eq!(entity.links.len(), 1);
        assert_eq!(entity.actions[0].method, "DELETE");
    }
}
