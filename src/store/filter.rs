//! Query shapes understood by every record store.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Document, RecordId, ID_FIELD};

/// One condition a document must satisfy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// Field equals the value exactly.
    Eq { field: String, value: Value },
    /// At least one of the string fields contains `needle`, ignoring case.
    ContainsIgnoreCase { fields: Vec<String>, needle: String },
    /// The document id is one of `ids`.
    IdIn { ids: Vec<RecordId> },
}

impl Predicate {
    fn matches(&self, doc: &Document) -> bool {
        match self {
            Predicate::Eq { field, value } => doc.get(field) == Some(value),
            Predicate::ContainsIgnoreCase { fields, needle } => {
                let needle = needle.to_lowercase();
                fields.iter().any(|field| {
                    doc.get(field)
                        .and_then(Value::as_str)
                        .map(|s| s.to_lowercase().contains(&needle))
                        .unwrap_or(false)
                })
            }
            Predicate::IdIn { ids } => doc
                .get(ID_FIELD)
                .and_then(Value::as_str)
                .and_then(RecordId::parse)
                .map(|id| ids.contains(&id))
                .unwrap_or(false),
        }
    }

    fn canonical(&self) -> Predicate {
        match self {
            Predicate::Eq { .. } => self.clone(),
            Predicate::ContainsIgnoreCase { fields, needle } => {
                let mut fields = fields.clone();
                fields.sort();
                fields.dedup();
                Predicate::ContainsIgnoreCase {
                    fields,
                    needle: needle.clone(),
                }
            }
            Predicate::IdIn { ids } => {
                let mut ids = ids.clone();
                ids.sort();
                ids.dedup();
                Predicate::IdIn { ids }
            }
        }
    }
}

/// A conjunction of predicates. The empty filter matches every document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    all: Vec<Predicate>,
}

impl Filter {
    /// The match-everything filter.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.all.push(Predicate::Eq {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn contains_ignore_case(mut self, fields: &[&str], needle: impl Into<String>) -> Self {
        self.all.push(Predicate::ContainsIgnoreCase {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            needle: needle.into(),
        });
        self
    }

    pub fn id_in(mut self, ids: Vec<RecordId>) -> Self {
        self.all.push(Predicate::IdIn { ids });
        self
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.all
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.all.iter().all(|p| p.matches(doc))
    }

    /// Equivalent filter in a single canonical shape: predicates sorted,
    /// id sets and field lists sorted and de-duplicated.
    ///
    /// Two filters that select the same documents because they differ only
    /// in predicate order canonicalize to the same value.
    pub fn canonical(&self) -> Filter {
        let mut all: Vec<Predicate> = self.all.iter().map(Predicate::canonical).collect();
        all.sort_by_cached_key(|p| serde_json::to_string(p).unwrap_or_default());
        all.dedup();
        Filter { all }
    }
}

/// Sort on a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub field: String,
    pub ascending: bool,
}

impl Sort {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ascending: true,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ascending: false,
        }
    }

    pub fn compare(&self, a: &Document, b: &Document) -> Ordering {
        let ord = compare_values(a.get(&self.field), b.get(&self.field));
        if self.ascending {
            ord
        } else {
            ord.reverse()
        }
    }
}

/// A filtered, optionally sorted, paged read.
///
/// `limit == 0` means no limit. Without a sort the store's natural order
/// (insertion order) applies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindQuery {
    pub filter: Filter,
    pub sort: Option<Sort>,
    pub limit: u64,
    pub skip: u64,
}

impl FindQuery {
    pub fn new(filter: Filter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    pub fn sort(mut self, sort: Option<Sort>) -> Self {
        self.sort = sort;
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = skip;
        self
    }

    /// Apply skip and limit to an already filtered and sorted sequence.
    pub fn page<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        let iter = items.into_iter().skip(self.skip as usize);
        if self.limit == 0 {
            iter.collect()
        } else {
            iter.take(self.limit as usize).collect()
        }
    }
}

// Missing < null < bool < number < string < anything else.
fn rank(value: Option<&Value>) -> u8 {
    match value {
        None => 0,
        Some(Value::Null) => 1,
        Some(Value::Bool(_)) => 2,
        Some(Value::Number(_)) => 3,
        Some(Value::String(_)) => 4,
        Some(_) => 5,
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}
