use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use crate::domain::{EntryId, ExperimentalMethod};
use crate::error::FetchError;

pub const DEFAULT_SEARCH_URL: &str = "https://search.rcsb.org/rcsbsearch/v2/query";
pub const DEFAULT_GRAPHQL_URL: &str = "https://data.rcsb.org/graphql";
pub const DEFAULT_DATA_URL: &str = "https://data.rcsb.org/rest/v1/core";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const POLYMER_SOURCES_QUERY: &str = r#"
query($pdb_id: String!) {
  entry(entry_id: $pdb_id) {
    polymer_entities {
      rcsb_entity_source_organism {
        ncbi_scientific_name
        scientific_name
      }
      entity_src_gen {
        pdbx_host_org_scientific_name
      }
      entity_src_nat {
        pdbx_organism_scientific
      }
      rcsb_entity_host_organism {
        ncbi_scientific_name
        scientific_name
      }
    }
  }
}
"#;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    pub search_url: String,
    pub graphql_url: String,
    pub data_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            search_url: DEFAULT_SEARCH_URL.to_string(),
            graphql_url: DEFAULT_GRAPHQL_URL.to_string(),
            data_url: DEFAULT_DATA_URL.to_string(),
        }
    }
}

/// Remote operations against the RCSB search, GraphQL and REST services.
///
/// Every call is a single attempt; callers decide how a failure degrades.
pub trait RcsbClient: Send + Sync {
    /// One page of entry identifiers, best score first. An empty page means the
    /// result set is exhausted.
    fn search_entry_ids(
        &self,
        methods: &[ExperimentalMethod],
        start: usize,
        rows: usize,
    ) -> Result<Vec<EntryId>, FetchError>;

    /// The `data` member of the polymer-entity source GraphQL query.
    fn polymer_entity_sources(&self, id: &EntryId) -> Result<Value, FetchError>;

    /// Polymer entities of an entry, as returned (object or array).
    fn polymer_entities(&self, id: &EntryId) -> Result<Value, FetchError>;

    /// The core entry document.
    fn entry(&self, id: &EntryId) -> Result<Value, FetchError>;
}

#[derive(Clone)]
pub struct RcsbHttpClient {
    client: Client,
    endpoints: Endpoints,
}

impl RcsbHttpClient {
    pub fn new(endpoints: Endpoints, timeout: Duration) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("pdb-summary/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| FetchError::DataHttp(err.to_string()))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|err| FetchError::DataHttp(err.to_string()))?;
        Ok(Self { client, endpoints })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    fn data_url(&self, resource: &str, id: &EntryId) -> String {
        format!(
            "{}/{}/{}",
            self.endpoints.data_url.trim_end_matches('/'),
            resource,
            id.as_str()
        )
    }

    fn handle_status(
        response: Response,
        on_error: fn(u16, String) -> FetchError,
    ) -> Result<Response, FetchError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response
            .text()
            .unwrap_or_else(|_| "RCSB request failed".to_string());
        Err(on_error(status, message))
    }

    fn get_data(&self, resource: &str, id: &EntryId) -> Result<Value, FetchError> {
        let url = self.data_url(resource, id);
        debug!(%url, "GET");
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|err| FetchError::DataHttp(err.to_string()))?;
        let response = Self::handle_status(response, |status, message| {
            FetchError::DataStatus { status, message }
        })?;
        response
            .json()
            .map_err(|err| FetchError::Decode(err.to_string()))
    }
}

impl RcsbClient for RcsbHttpClient {
    fn search_entry_ids(
        &self,
        methods: &[ExperimentalMethod],
        start: usize,
        rows: usize,
    ) -> Result<Vec<EntryId>, FetchError> {
        let body = search_query(methods, start, rows);
        debug!(url = %self.endpoints.search_url, start, rows, "POST search");
        let response = self
            .client
            .post(&self.endpoints.search_url)
            .json(&body)
            .send()
            .map_err(|err| FetchError::SearchHttp(err.to_string()))?;
        let response = Self::handle_status(response, |status, message| {
            FetchError::SearchStatus { status, message }
        })?;
        // The search service answers an exhausted query with an empty 204.
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(Vec::new());
        }
        let payload: Value = response
            .json()
            .map_err(|err| FetchError::Decode(err.to_string()))?;
        Ok(parse_search_ids(&payload))
    }

    fn polymer_entity_sources(&self, id: &EntryId) -> Result<Value, FetchError> {
        let body = json!({
            "query": POLYMER_SOURCES_QUERY,
            "variables": { "pdb_id": id.as_str() },
        });
        let response = self
            .client
            .post(&self.endpoints.graphql_url)
            .json(&body)
            .send()
            .map_err(|err| FetchError::GraphqlHttp(err.to_string()))?;
        let response = Self::handle_status(response, |status, message| {
            FetchError::GraphqlStatus { status, message }
        })?;
        let mut payload: Value = response
            .json()
            .map_err(|err| FetchError::Decode(err.to_string()))?;
        if let Some(errors) = payload.get("errors").filter(|errors| !errors.is_null()) {
            return Err(FetchError::GraphqlErrors(errors.to_string()));
        }
        Ok(payload
            .get_mut("data")
            .map(Value::take)
            .unwrap_or(Value::Null))
    }

    fn polymer_entities(&self, id: &EntryId) -> Result<Value, FetchError> {
        self.get_data("polymer_entities", id)
    }

    fn entry(&self, id: &EntryId) -> Result<Value, FetchError> {
        self.get_data("entry", id)
    }
}

/// Search request for entries solved by any of `methods`, sorted by relevance.
pub fn search_query(methods: &[ExperimentalMethod], start: usize, rows: usize) -> Value {
    let methods = methods
        .iter()
        .map(ExperimentalMethod::as_str)
        .collect::<Vec<_>>();
    json!({
        "query": {
            "type": "terminal",
            "service": "text",
            "parameters": {
                "attribute": "exptl.method",
                "operator": "in",
                "value": methods,
            }
        },
        "request_options": {
            "paginate": { "start": start, "rows": rows },
            "sort": [{ "sort_by": "score", "direction": "desc" }]
        },
        "return_type": "entry"
    })
}

/// Result-set items are objects carrying `identifier` or bare strings.
pub fn parse_search_ids(payload: &Value) -> Vec<EntryId> {
    let Some(items) = payload.get("result_set").and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(id) => Some(id.as_str()),
            Value::Object(_) => item.get("identifier").and_then(Value::as_str),
            _ => None,
        })
        .filter_map(|id| id.parse().ok())
        .collect()
}
