//! Siren-style decorator for `application/vnd.siren+json`.

use serde_json::{json, Map, Value};

use super::{EntityMetadata, HypermediaDecorator};

pub const SIREN_JSON: &str = "application/vnd.siren+json";

const KEY_PLACEHOLDER: &str = "{key}";

/// Wraps objects as `properties` and arrays as `entities`, then adds
/// the entity's links and actions with absolute hrefs.
///
/// Hrefs may contain `{key}`, replaced by the value of the entity's key
/// property. A self href without the placeholder gets the key appended.
#[derive(Debug, Clone, Copy, Default)]
pub struct SirenDecorator;

impl HypermediaDecorator for SirenDecorator {
    fn decorate(&self, prefix: &str, value: Value, entity: Option<&EntityMetadata>) -> Value {
        let class = entity.map(|e| e.class.as_str()).unwrap_or_default();
        let mut out = Map::new();

        match value {
            Value::Array(items) => {
                out.insert("class".into(), json!([format!("{class} list").trim()]));
                let entities = items
                    .into_iter()
                    .map(|item| list_item(prefix, class, item, entity))
                    .collect();
                out.insert("entities".into(), Value::Array(entities));
            }
            other => {
                if !class.is_empty() {
                    out.insert("class".into(), json!([class]));
                }
                if let Some(entity) = entity {
                    if let Some(title) = &entity.title {
                        out.insert("title".into(), json!(title));
                    }
                    let key = key_of(&other, entity);
                    out.insert("links".into(), links(prefix, key.as_deref(), entity));
                    if !entity.actions.is_empty() {
                        out.insert("actions".into(), actions(prefix, key.as_deref(), entity));
                    }
                }
                out.insert("properties".into(), other);
            }
        }

        Value::Object(out)
    }
}

fn list_item(prefix: &str, class: &str, item: Value, entity: Option<&EntityMetadata>) -> Value {
    let mut out = Map::new();
    out.insert("class".into(), json!([format!("{class} list-item").trim()]));
    if let Some(entity) = entity {
        let key = key_of(&item, entity);
        out.insert("links".into(), links(prefix, key.as_deref(), entity));
    }
    out.insert("properties".into(), item);
    Value::Object(out)
}

fn key_of(value: &Value, entity: &EntityMetadata) -> Option<String> {
    let id = value.get(entity.key.as_deref()?)?;
    Some(match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

fn expand(prefix: &str, href: &str, key: Option<&str>) -> String {
    match key {
        Some(key) => format!("{prefix}{}", href.replace(KEY_PLACEHOLDER, key)),
        None => format!("{prefix}{href}"),
    }
}

fn links(prefix: &str, key: Option<&str>, entity: &EntityMetadata) -> Value {
    let mut links = Vec::new();
    if let Some(href) = entity.href.as_deref() {
        let href = match key {
            Some(key) if !href.contains(KEY_PLACEHOLDER) => format!("{prefix}{href}/{key}"),
            _ => expand(prefix, href, key),
        };
        links.push(json!({ "rel": ["self"], "href": href }));
    }
    links.extend(entity.links.iter().map(|link| {
        let mut out = json!({ "rel": [link.rel], "href": expand(prefix, &link.href, key) });
        if let Some(title) = &link.title {
            out["title"] = json!(title);
        }
        if let Some(content_type) = &link.content_type {
            out["type"] = json!(content_type);
        }
        out
    }));
    Value::Array(links)
}

fn actions(prefix: &str, key: Option<&str>, entity: &EntityMetadata) -> Value {
    entity
        .actions
        .iter()
        .map(|action| {
            let mut out = json!({
                "name": action.name,
                "method": action.method,
                "href": expand(prefix, &action.href, key),
            });
            if let Some(class) = &action.class {
                out["class"] = json!([class]);
            }
            if let Some(title) = &action.title {
                out["title"] = json!(title);
            }
            if let Some(content_type) = &action.content_type {
                out["type"] = json!(content_type);
            }
            out
        })
        .collect()
}
