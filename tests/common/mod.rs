#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::sync::Mutex;

use serde_json::Value;

use pdb_summary::domain::{EntryId, ExperimentalMethod};
use pdb_summary::error::FetchError;
use pdb_summary::rcsb::{RcsbClient, parse_search_ids};

pub fn fixture(name: &str) -> Value {
    let raw = fs::read_to_string(format!("tests/fixtures/{name}")).unwrap();
    serde_json::from_str(&raw).unwrap()
}

pub fn id(value: &str) -> EntryId {
    value.parse().unwrap()
}

#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    Status(u16),
    Transport,
}

impl Reply {
    fn into_result(self) -> Result<Value, FetchError> {
        match self {
            Reply::Json(value) => Ok(value),
            Reply::Status(status) => Err(FetchError::DataStatus {
                status,
                message: "mock".to_string(),
            }),
            Reply::Transport => Err(FetchError::DataHttp("connection refused".to_string())),
        }
    }
}

/// Scripted RCSB service. Unscripted lookups answer 404, unscripted search
/// pages are empty. Every call is recorded as `kind:detail`.
#[derive(Default)]
pub struct MockRcsb {
    pages: Vec<Reply>,
    graphql: HashMap<String, Reply>,
    entities: HashMap<String, Reply>,
    entries: HashMap<String, Reply>,
    calls: Mutex<Vec<String>>,
}

impl MockRcsb {
    pub fn with_page(mut self, reply: Reply) -> Self {
        self.pages.push(reply);
        self
    }

    pub fn with_graphql(mut self, id: &str, reply: Reply) -> Self {
        self.graphql.insert(id.to_string(), reply);
        self
    }

    pub fn with_entities(mut self, id: &str, reply: Reply) -> Self {
        self.entities.insert(id.to_string(), reply);
        self
    }

    pub fn with_entry(mut self, id: &str, reply: Reply) -> Self {
        self.entries.insert(id.to_string(), reply);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn lookup(
        &self,
        kind: &str,
        table: &HashMap<String, Reply>,
        id: &EntryId,
    ) -> Result<Value, FetchError> {
        self.record(format!("{kind}:{id}"));
        table
            .get(id.as_str())
            .cloned()
            .unwrap_or(Reply::Status(404))
            .into_result()
    }
}

impl RcsbClient for MockRcsb {
    fn search_entry_ids(
        &self,
        _methods: &[ExperimentalMethod],
        start: usize,
        rows: usize,
    ) -> Result<Vec<EntryId>, FetchError> {
        let index = self
            .calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.starts_with("search:"))
            .count();
        self.record(format!("search:{start}:{rows}"));
        match self.pages.get(index).cloned() {
            Some(reply) => reply.into_result().map(|payload| parse_search_ids(&payload)),
            None => Ok(Vec::new()),
        }
    }

    fn polymer_entity_sources(&self, id: &EntryId) -> Result<Value, FetchError> {
        self.lookup("graphql", &self.graphql, id)
    }

    fn polymer_entities(&self, id: &EntryId) -> Result<Value, FetchError> {
        self.lookup("entities", &self.entities, id)
    }

    fn entry(&self, id: &EntryId) -> Result<Value, FetchError> {
        self.lookup("entry", &self.entries, id)
    }
}

/// A search page holding `ids`.
pub fn page(ids: &[&str]) -> Reply {
    Reply::Json(serde_json::json!({
        "result_set": ids
            .iter()
            .map(|id| serde_json::json!({"identifier": id, "score": 1.0}))
            .collect::<Vec<_>>()
    }))
}
