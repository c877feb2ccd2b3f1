use std::time::Duration;

use assert_matches::assert_matches;
use httpmock::prelude::*;
use serde_json::json;

use pdb_summary::domain::{EntryId, ExperimentalMethod};
use pdb_summary::error::FetchError;
use pdb_summary::rcsb::{Endpoints, RcsbClient, RcsbHttpClient};

fn client(server: &MockServer) -> RcsbHttpClient {
    let endpoints = Endpoints {
        search_url: server.url("/rcsbsearch/v2/query"),
        graphql_url: server.url("/graphql"),
        data_url: server.url("/rest/v1/core"),
    };
    RcsbHttpClient::new(endpoints, Duration::from_secs(5)).unwrap()
}

fn id(value: &str) -> EntryId {
    value.parse().unwrap()
}

#[test]
fn search_posts_paginated_query() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/rcsbsearch/v2/query")
            .header_exists("user-agent")
            .json_body_partial(
                r#"{"request_options": {"paginate": {"start": 100, "rows": 50}}, "return_type": "entry"}"#,
            );
        then.status(200).json_body(json!({
            "query_id": "q",
            "result_type": "entry",
            "total_count": 2,
            "result_set": [
                {"identifier": "1ABC", "score": 1.0},
                {"identifier": "2DEF", "score": 0.9}
            ]
        }));
    });

    let ids = client(&server)
        .search_entry_ids(&ExperimentalMethod::ALL, 100, 50)
        .unwrap();

    mock.assert();
    assert_eq!(ids, vec![id("1ABC"), id("2DEF")]);
}

#[test]
fn search_no_content_is_exhaustion() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/rcsbsearch/v2/query");
        then.status(204);
    });

    let ids = client(&server)
        .search_entry_ids(&ExperimentalMethod::ALL, 0, 100)
        .unwrap();
    assert!(ids.is_empty());
}

#[test]
fn search_error_status_is_reported() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/rcsbsearch/v2/query");
        then.status(400).body("bad query");
    });

    let err = client(&server)
        .search_entry_ids(&ExperimentalMethod::ALL, 0, 100)
        .unwrap_err();
    assert_matches!(err, FetchError::SearchStatus { status: 400, .. });
}

#[test]
fn graphql_sends_entry_variable_and_returns_data() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/graphql")
            .json_body_partial(r#"{"variables": {"pdb_id": "1ABC"}}"#);
        then.status(200).json_body(json!({
            "data": {"entry": {"polymer_entities": []}}
        }));
    });

    let data = client(&server).polymer_entity_sources(&id("1ABC")).unwrap();

    mock.assert();
    assert_eq!(data, json!({"entry": {"polymer_entities": []}}));
}

#[test]
fn graphql_error_envelope_is_an_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/graphql");
        then.status(200).json_body(json!({
            "errors": [{"message": "Cannot query field"}],
            "data": null
        }));
    });

    let err = client(&server)
        .polymer_entity_sources(&id("1ABC"))
        .unwrap_err();
    assert_matches!(err, FetchError::GraphqlErrors(_));
}

#[test]
fn rest_lookups_use_entry_paths() {
    let server = MockServer::start();
    let entry = server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/core/entry/4HHB")
            .header("accept", "application/json");
        then.status(200).json_body(json!({"rcsb_id": "4HHB"}));
    });
    let entities = server.mock(|when, then| {
        when.method(GET).path("/rest/v1/core/polymer_entities/4HHB");
        then.status(404).body("not found");
    });

    let rcsb = client(&server);
    assert_eq!(rcsb.entry(&id("4HHB")).unwrap(), json!({"rcsb_id": "4HHB"}));
    let err = rcsb.polymer_entities(&id("4HHB")).unwrap_err();

    entry.assert();
    entities.assert();
    assert_matches!(err, FetchError::DataStatus { status: 404, .. });
}

#[test]
fn malformed_body_is_a_decode_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/rest/v1/core/entry/1ABC");
        then.status(200).body("<html>maintenance</html>");
    });

    let err = client(&server).entry(&id("1ABC")).unwrap_err();
    assert_matches!(err, FetchError::Decode(_));
}
