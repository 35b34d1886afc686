//! Cache key policy.
//!
//! A key is `entity:operation` followed by `:name=value` for each parameter,
//! in the order the call site adds them. Every parameter is always rendered,
//! defaults included, so the same query can only ever produce one key.
//! Values are percent-escaped for `%`, `:` and `=`, which keeps distinct
//! parameter tuples from rendering to the same string.

use std::fmt::{self, Write};

use serde::Serialize;

use crate::store::{Filter, Sort};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey {
    entity: &'static str,
    operation: &'static str,
    params: Vec<(&'static str, String)>,
}

impl CacheKey {
    pub fn new(entity: &'static str, operation: &'static str) -> Self {
        Self {
            entity,
            operation,
            params: Vec::new(),
        }
    }

    /// The prefix shared by every key for `entity:operation`.
    pub fn prefix(entity: &str, operation: &str) -> String {
        format!("{}:{}:", entity, operation)
    }

    pub fn param(mut self, name: &'static str, value: impl fmt::Display) -> Self {
        self.params.push((name, value.to_string()));
        self
    }

    /// Add a structured parameter as JSON. Object keys come out sorted, so
    /// field order in the source value never matters.
    pub fn json_param<T: Serialize>(self, name: &'static str, value: &T) -> Self {
        // Round-trip through Value: its maps are ordered by key.
        let rendered = serde_json::to_value(value)
            .and_then(|v| serde_json::to_string(&v))
            .unwrap_or_default();
        self.param(name, rendered)
    }

    /// Add a filter in its canonical form.
    pub fn filter(self, filter: &Filter) -> Self {
        self.json_param("filter", &filter.canonical())
    }

    /// Add the sort as two parameters. Without a sort field the direction
    /// carries no meaning and is pinned to ascending.
    pub fn sort(self, sort: Option<&Sort>) -> Self {
        match sort {
            Some(sort) => self.param("sort", &sort.field).param("asc", sort.ascending),
            None => self.param("sort", "").param("asc", true),
        }
    }

    pub fn render(&self) -> String {
        let mut out = Self::prefix(self.entity, self.operation);
        for (i, (name, value)) in self.params.iter().enumerate() {
            if i > 0 {
                out.push(':');
            }
            out.push_str(name);
            out.push('=');
            escape_into(&mut out, value);
        }
        out
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn escape_into(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '%' | ':' | '=' => {
                let _ = write!(out, "%{:02X}", c as u32);
            }
            _ => out.push(c),
        }
    }
}
