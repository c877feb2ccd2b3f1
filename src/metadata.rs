use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FetchError;
use crate::json_path::{JsonPath, Seg, lookup_array, lookup_f64, lookup_str, non_blank};

pub const UNKNOWN_PROTEIN: &str = "Unknown Protein";
pub const UNKNOWN_METHOD: &str = "Unknown";

const RCSB_ID: JsonPath = &[Seg::Key("rcsb_id")];
const STRUCT_TITLE: JsonPath = &[Seg::Key("struct"), Seg::Key("title")];
const CITATION_TITLE: JsonPath = &[Seg::Key("rcsb_primary_citation"), Seg::Key("title")];
const RESOLUTION: JsonPath = &[
    Seg::Key("rcsb_entry_info"),
    Seg::Key("resolution_combined"),
    Seg::Index(0),
];
const METHOD: JsonPath = &[Seg::Key("exptl"), Seg::Index(0), Seg::Key("method")];
const RELEASE_DATE: JsonPath = &[
    Seg::Key("rcsb_accession_info"),
    Seg::Key("initial_release_date"),
];
const MOLECULAR_WEIGHT: JsonPath = &[Seg::Key("rcsb_entry_info"), Seg::Key("molecular_weight")];
const KEYWORDS: JsonPath = &[Seg::Key("struct_keywords"), Seg::Key("pdbx_keywords")];
const AUTHORS: JsonPath = &[Seg::Key("audit_author")];

/// Flat summary of one entry, as written to the output file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub pdb_id: String,
    pub protein_name: String,
    pub organism: String,
    pub resolution: Option<f64>,
    pub method: String,
    pub release_date: Option<String>,
    pub structure_title: String,
    pub molecular_weight: Option<f64>,
    pub keywords: Vec<String>,
    pub classification: String,
    pub authors: Vec<String>,
}

/// Projects a core entry document onto a [`MetadataRecord`].
///
/// `rcsb_id` is the only required field; everything else falls back to a
/// default when missing or mistyped.
pub fn extract_metadata(raw: &Value, organism: &str) -> Result<MetadataRecord, FetchError> {
    let pdb_id = lookup_str(raw, RCSB_ID)
        .filter(|id| non_blank(id).is_some())
        .ok_or(FetchError::MissingIdentifier)?
        .to_string();

    let structure_title = lookup_str(raw, STRUCT_TITLE).unwrap_or_default();
    let protein_name = [STRUCT_TITLE, CITATION_TITLE]
        .into_iter()
        .filter_map(|path| lookup_str(raw, path))
        .find(|title| !title.is_empty())
        .unwrap_or(UNKNOWN_PROTEIN)
        .to_string();

    let classification = lookup_str(raw, KEYWORDS).unwrap_or_default();

    let authors: Vec<String> = lookup_array(raw, AUTHORS)
        .map(|authors| {
            authors
                .iter()
                .map(|author| {
                    lookup_str(author, &[Seg::Key("name")])
                        .unwrap_or_default()
                        .to_string()
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(MetadataRecord {
        pdb_id,
        protein_name,
        organism: organism.to_string(),
        resolution: lookup_f64(raw, RESOLUTION),
        method: lookup_str(raw, METHOD)
            .unwrap_or(UNKNOWN_METHOD)
            .to_string(),
        release_date: lookup_str(raw, RELEASE_DATE).map(str::to_string),
        structure_title: structure_title.to_string(),
        molecular_weight: lookup_f64(raw, MOLECULAR_WEIGHT),
        keywords: split_keywords(classification),
        classification: classification.to_string(),
        authors,
    })
}

/// Comma-separated classification to trimmed keywords. An empty classification
/// has no keywords.
pub fn split_keywords(classification: &str) -> Vec<String> {
    if classification.is_empty() {
        return Vec::new();
    }
    classification
        .split(',')
        .map(|keyword| keyword.trim().to_string())
        .collect()
}
