//! Source-organism resolution.
//!
//! Three independent lookups are tried in order and the first acceptable name
//! wins. The GraphQL lookup rejects names starting with `j `; the two REST
//! lookups reject names containing a journal fragment.

use serde_json::Value;
use tracing::debug;

use crate::domain::EntryId;
use crate::error::FetchError;
use crate::json_path::{JsonPath, Seg, describe, first_or_self, lookup, non_blank};
use crate::rcsb::RcsbClient;

pub const UNKNOWN_ORGANISM: &str = "Unknown";

const JOURNAL_MARKERS: [&str; 4] = ["j mol", "nature", "science", "proc natl"];

/// (group, field) pairs scanned per polymer entity in the GraphQL payload.
static GRAPHQL_FIELDS: [(&str, &str); 6] = [
    ("rcsb_entity_source_organism", "ncbi_scientific_name"),
    ("rcsb_entity_source_organism", "scientific_name"),
    ("entity_src_nat", "pdbx_organism_scientific"),
    ("entity_src_gen", "pdbx_host_org_scientific_name"),
    ("rcsb_entity_host_organism", "ncbi_scientific_name"),
    ("rcsb_entity_host_organism", "scientific_name"),
];

const GRAPHQL_ENTITIES: JsonPath = &[Seg::Key("entry"), Seg::Key("polymer_entities")];

static ENTITY_PATHS: [JsonPath; 5] = [
    &[
        Seg::Key("rcsb_entity_source_organism"),
        Seg::Index(0),
        Seg::Key("ncbi_scientific_name"),
    ],
    &[
        Seg::Key("rcsb_entity_source_organism"),
        Seg::Index(0),
        Seg::Key("scientific_name"),
    ],
    &[
        Seg::Key("entity_src_gen"),
        Seg::Index(0),
        Seg::Key("pdbx_host_org_scientific_name"),
    ],
    &[
        Seg::Key("entity_src_nat"),
        Seg::Index(0),
        Seg::Key("pdbx_organism_scientific"),
    ],
    &[
        Seg::Key("rcsb_entity_host_organism"),
        Seg::Index(0),
        Seg::Key("ncbi_scientific_name"),
    ],
];

static ENTRY_PATHS: [JsonPath; 2] = [
    &[
        Seg::Key("rcsb_entry_info"),
        Seg::Key("source_organism_names"),
        Seg::Index(0),
    ],
    &[
        Seg::Key("rcsb_entry_info"),
        Seg::Key("polymer_composition"),
        Seg::Key("source_organism_names"),
        Seg::Index(0),
    ],
];

/// A raw organism string and where it was found. Lives for one resolution only.
#[derive(Debug, Clone, PartialEq)]
pub struct OrganismCandidate<'a> {
    pub source: String,
    pub value: &'a Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalFilter {
    /// Rejects values starting with `j ` in any case (e.g. "J Biol Chem").
    AbbreviationPrefix,
    /// Rejects values containing any known journal fragment in any case.
    MarkerSubstring,
}

impl JournalFilter {
    /// Returns the trimmed name when the value is a non-blank string that passes
    /// the filter. The prefix check looks at the raw text, so leading whitespace
    /// lets a name through.
    pub fn accept<'a>(&self, value: &'a Value) -> Option<&'a str> {
        let raw = value.as_str()?;
        let name = non_blank(raw)?;
        let rejected = match self {
            JournalFilter::AbbreviationPrefix => raw.to_lowercase().starts_with("j "),
            JournalFilter::MarkerSubstring => {
                let lowered = name.to_lowercase();
                JOURNAL_MARKERS.iter().any(|marker| lowered.contains(marker))
            }
        };
        (!rejected).then_some(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Polymer-entity source groups from the GraphQL service.
    StructuredQuery,
    /// Polymer entities from the REST service.
    PolymerEntities,
    /// Entry-level organism summaries from the REST service.
    EntryInfo,
}

impl Strategy {
    pub const CHAIN: [Strategy; 3] = [
        Strategy::StructuredQuery,
        Strategy::PolymerEntities,
        Strategy::EntryInfo,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::StructuredQuery => "graphql",
            Strategy::PolymerEntities => "polymer_entities",
            Strategy::EntryInfo => "entry",
        }
    }

    pub fn filter(&self) -> JournalFilter {
        match self {
            Strategy::StructuredQuery => JournalFilter::AbbreviationPrefix,
            Strategy::PolymerEntities | Strategy::EntryInfo => JournalFilter::MarkerSubstring,
        }
    }

    fn fetch<C: RcsbClient + ?Sized>(&self, client: &C, id: &EntryId) -> Result<Value, FetchError> {
        match self {
            Strategy::StructuredQuery => client.polymer_entity_sources(id),
            Strategy::PolymerEntities => client.polymer_entities(id),
            Strategy::EntryInfo => client.entry(id),
        }
    }

    /// Lazily yields candidates from `doc` in priority order.
    pub fn candidates<'a>(
        &self,
        doc: &'a Value,
    ) -> Box<dyn Iterator<Item = OrganismCandidate<'a>> + 'a> {
        match self {
            Strategy::StructuredQuery => {
                let entities = lookup(doc, GRAPHQL_ENTITIES)
                    .and_then(Value::as_array)
                    .map(|items| items.as_slice())
                    .unwrap_or_default();
                Box::new(entities.iter().flat_map(|entity| {
                    GRAPHQL_FIELDS.iter().filter_map(move |(group, field)| {
                        let group_value = first_or_self(entity.get(*group)?)?;
                        let value = group_value.as_object()?.get(*field)?;
                        Some(OrganismCandidate {
                            source: format!("{group}.{field}"),
                            value,
                        })
                    })
                }))
            }
            Strategy::PolymerEntities => {
                let entities: &'a [Value] = match doc {
                    Value::Array(items) => items.as_slice(),
                    single => std::slice::from_ref(single),
                };
                Box::new(
                    entities
                        .iter()
                        .filter(|entity| entity.is_object())
                        .flat_map(|entity| probe_paths(entity, &ENTITY_PATHS)),
                )
            }
            Strategy::EntryInfo => Box::new(probe_paths(doc, &ENTRY_PATHS)),
        }
    }

    /// First candidate in `doc` accepted by this strategy's filter.
    pub fn pick(&self, doc: &Value) -> Option<String> {
        let filter = self.filter();
        self.candidates(doc).find_map(|candidate| {
            let name = filter.accept(candidate.value);
            if name.is_none() {
                debug!(strategy = self.name(), source = %candidate.source, "candidate rejected");
            }
            name.map(str::to_string)
        })
    }
}

fn probe_paths<'a>(
    doc: &'a Value,
    paths: &'static [JsonPath],
) -> impl Iterator<Item = OrganismCandidate<'a>> + 'a {
    paths.iter().filter_map(move |path| {
        let value = lookup(doc, path)?;
        Some(OrganismCandidate {
            source: describe(path),
            value,
        })
    })
}

pub struct OrganismResolver<'a, C: RcsbClient + ?Sized> {
    client: &'a C,
}

impl<'a, C: RcsbClient + ?Sized> OrganismResolver<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Never fails: errors inside a strategy only move resolution on to the next
    /// one, and exhaustion yields [`UNKNOWN_ORGANISM`].
    pub fn resolve(&self, id: &EntryId) -> String {
        Strategy::CHAIN
            .iter()
            .find_map(|strategy| self.try_strategy(*strategy, id))
            .unwrap_or_else(|| UNKNOWN_ORGANISM.to_string())
    }

    fn try_strategy(&self, strategy: Strategy, id: &EntryId) -> Option<String> {
        let doc = match strategy.fetch(self.client, id) {
            Ok(doc) => doc,
            Err(err) => {
                debug!(%id, strategy = strategy.name(), error = %err, "organism lookup failed");
                return None;
            }
        };
        let organism = strategy.pick(&doc);
        match &organism {
            Some(name) => debug!(%id, strategy = strategy.name(), organism = %name, "organism resolved"),
            None => debug!(%id, strategy = strategy.name(), "no organism candidate"),
        }
        organism
    }
}
