//! Plain task records produced by the parser.
//!
//! Records reference each other by identity key only. They are mutated by
//! the patcher and then read once by the materializer in `core::dag`.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::HashMap;

use super::identity::TaskIdentity;
use crate::{Error, Result};

/// Name to value parameter map that keeps insertion order.
///
/// Overwriting an existing name keeps its original position, so the bundle
/// handed to an operator lists parameters in the order they were authored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters(Vec<(String, String)>);

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.0.iter().any(|(key, _)| key == name)
    }

    /// Insert or overwrite, returning the previous value.
    pub fn insert(&mut self, name: &str, value: &str) -> Option<String> {
        match self.0.iter_mut().find(|(key, _)| key == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value.to_string())),
            None => {
                self.0.push((name.to_string(), value.to_string()));
                None
            }
        }
    }

    /// Overwrite an existing value only. Returns the previous value, or
    /// `None` without inserting when the name is absent.
    pub fn replace(&mut self, name: &str, value: &str) -> Option<String> {
        self.0
            .iter_mut()
            .find(|(key, _)| key == name)
            .map(|(_, slot)| std::mem::replace(slot, value.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Parameters::new();
        for (k, v) in iter {
            params.insert(k.as_ref(), v.as_ref());
        }
        params
    }
}

impl Serialize for Parameters {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

/// One `<node>` of the graph description, before linking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskRecord {
    pub name: String,
    pub nr: String,
    /// Empty for tasks without an `<operator>` element.
    pub operator: String,
    pub parameters: Parameters,
    /// Upstream tasks, in the order the `<sources>` section lists them.
    pub sources: Vec<TaskIdentity>,
    /// Downstream tasks, derived by [`TaskRecords::link_next_tasks`].
    pub next_tasks: Vec<TaskIdentity>,
}

impl TaskRecord {
    pub fn new(identity: &TaskIdentity) -> Self {
        Self {
            name: identity.name.clone(),
            nr: identity.nr.clone(),
            operator: String::new(),
            parameters: Parameters::new(),
            sources: Vec::new(),
            next_tasks: Vec::new(),
        }
    }

    pub fn identity(&self) -> TaskIdentity {
        TaskIdentity::new(&self.name, &self.nr)
    }

    pub fn key(&self) -> String {
        format!("{}{}", self.name, self.nr)
    }

    /// Add an upstream reference; a repeated key keeps its first position.
    pub fn add_source(&mut self, source: TaskIdentity) {
        insert_edge(&mut self.sources, source);
    }

    pub fn add_next_task(&mut self, next: TaskIdentity) {
        insert_edge(&mut self.next_tasks, next);
    }
}

fn insert_edge(edges: &mut Vec<TaskIdentity>, identity: TaskIdentity) {
    let key = identity.key();
    match edges.iter_mut().find(|e| e.key() == key) {
        Some(existing) => *existing = identity,
        None => edges.push(identity),
    }
}

/// All task records of a graph, keyed by identity and kept in file order.
#[derive(Debug, Clone, Default)]
pub struct TaskRecords {
    records: Vec<TaskRecord>,
    index: HashMap<String, usize>,
}

impl TaskRecords {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record. A record with the same key is replaced in place and
    /// returned.
    pub fn insert(&mut self, record: TaskRecord) -> Option<TaskRecord> {
        let key = record.key();
        match self.index.get(&key) {
            Some(&i) => Some(std::mem::replace(&mut self.records[i], record)),
            None => {
                self.index.insert(key, self.records.len());
                self.records.push(record);
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&TaskRecord> {
        self.index.get(key).map(|&i| &self.records[i])
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut TaskRecord> {
        match self.index.get(key) {
            Some(&i) => self.records.get_mut(i),
            None => None,
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Identity keys in file order.
    pub fn keys(&self) -> impl Iterator<Item = String> + '_ {
        self.records.iter().map(TaskRecord::key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaskRecord> {
        self.records.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut TaskRecord> {
        self.records.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Fill every record's `next_tasks` by inverting all `sources` edges.
    ///
    /// # Errors
    /// Returns [`Error::DanglingSource`] if a source names a task that does
    /// not exist.
    pub fn link_next_tasks(&mut self) -> Result<()> {
        let mut edges = Vec::new();
        for record in &self.records {
            for source in &record.sources {
                let key = source.key();
                let &target = self.index.get(&key).ok_or_else(|| Error::DanglingSource {
                    task: record.key(),
                    source_key: key.clone(),
                })?;
                edges.push((target, record.identity()));
            }
        }

        for (target, next) in edges {
            self.records[target].add_next_task(next);
        }
        Ok(())
    }
}

impl Serialize for TaskRecords {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.records.len()))?;
        for record in &self.records {
            map.serialize_entry(&record.key(), record)?;
        }
        map.end()
    }
}
