mod common;

use common::*;
use serde::{Deserialize, Serialize};
use serde_json::json;
use stayhub_client::{GraphQLOperation, NormalizedCache, Operation, OperationKind};
use stayhub_core::config::{ClientConfig, FetchPolicy, RefreshPolicy};
use stayhub_core::storage::KeyValueStore;
use stayhub_infrastructure::MemoryStore;
use std::sync::Arc;

#[derive(Debug, Deserialize, PartialEq)]
struct User {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct MeData {
    me: User,
}

struct MeQuery;

impl GraphQLOperation for MeQuery {
    const OPERATION_NAME: &'static str = "Me";
    const QUERY: &'static str = "query Me { me { __typename id name } }";
    type Variables = ();
    type Data = MeData;
}

#[derive(Serialize)]
struct RenameVars {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenameData {
    update_profile: User,
}

struct RenameMutation;

impl GraphQLOperation for RenameMutation {
    const OPERATION_NAME: &'static str = "Rename";
    const QUERY: &'static str =
        "mutation Rename($name: String!) { updateProfile(name: $name) { __typename id name } }";
    const KIND: OperationKind = OperationKind::Mutation;
    type Variables = RenameVars;
    type Data = RenameData;
}

fn user(name: &str) -> serde_json::Value {
    json!({ "__typename": "User", "id": "user-1", "name": name })
}

#[tokio::test]
async fn test_cache_first_query_hits_network_once() {
    let (session, _store) = logged_in("access-1", "refresh-1").await;
    let transport = Arc::new(ScriptedTransport::new());
    transport.push(data(json!({ "me": user("Mika") })));
    let client = client(
        session,
        Arc::clone(&transport),
        Arc::new(CountingRefresher::new()),
        RefreshPolicy::SingleFlight,
    );

    let first = client.query::<MeQuery>(&()).await.unwrap();
    let second = client.query::<MeQuery>(&()).await.unwrap();

    assert_eq!(first.me, second.me);
    assert_eq!(second.me.name, "Mika");
    assert_eq!(transport.count(), 1);
}

#[tokio::test]
async fn test_network_only_bypasses_cache_read() {
    let (session, _store) = logged_in("access-1", "refresh-1").await;
    let transport = Arc::new(ScriptedTransport::new());
    transport.push(data(json!({ "me": user("Mika") })));
    transport.push(data(json!({ "me": user("Mika K.") })));
    let client = client(
        session,
        Arc::clone(&transport),
        Arc::new(CountingRefresher::new()),
        RefreshPolicy::SingleFlight,
    );

    client.query::<MeQuery>(&()).await.unwrap();
    let fresh = client
        .query_with_policy::<MeQuery>(&(), FetchPolicy::NetworkOnly)
        .await
        .unwrap();
    let cached = client.query::<MeQuery>(&()).await.unwrap();

    assert_eq!(fresh.me.name, "Mika K.");
    assert_eq!(cached.me.name, "Mika K.");
    assert_eq!(transport.count(), 2);
}

#[tokio::test]
async fn test_no_cache_leaves_cache_untouched() {
    let (session, _store) = logged_in("access-1", "refresh-1").await;
    let transport = Arc::new(ScriptedTransport::new());
    transport.push(data(json!({ "me": user("Mika") })));
    let client = client(
        session,
        Arc::clone(&transport),
        Arc::new(CountingRefresher::new()),
        RefreshPolicy::SingleFlight,
    );

    client
        .query_with_policy::<MeQuery>(&(), FetchPolicy::NoCache)
        .await
        .unwrap();

    assert!(client.cache().snapshot().await.is_empty());
}

#[tokio::test]
async fn test_mutation_result_updates_cached_query() {
    let (session, _store) = logged_in("access-1", "refresh-1").await;
    let transport = Arc::new(ScriptedTransport::new());
    transport.push(data(json!({ "me": user("Mika") })));
    transport.push(data(json!({ "updateProfile": user("Mika K.") })));
    let client = client(
        session,
        Arc::clone(&transport),
        Arc::new(CountingRefresher::new()),
        RefreshPolicy::SingleFlight,
    );

    client.query::<MeQuery>(&()).await.unwrap();
    let renamed = client
        .mutate::<RenameMutation>(&RenameVars {
            name: "Mika K.".to_string(),
        })
        .await
        .unwrap();
    let cached = client.query::<MeQuery>(&()).await.unwrap();

    assert_eq!(renamed.update_profile.name, "Mika K.");
    assert_eq!(cached.me.name, "Mika K.");
    assert_eq!(transport.count(), 2);
}

#[tokio::test]
async fn test_error_responses_are_not_cached() {
    let (session, _store) = logged_in("access-1", "refresh-1").await;
    let transport = Arc::new(ScriptedTransport::new());
    transport.push(Ok(stayhub_core::graphql::GraphQLResponse::from_errors(vec![
        stayhub_core::graphql::GraphQLError::new("boom"),
    ])));
    transport.push(data(json!({ "me": user("Mika") })));
    let client = client(
        session,
        Arc::clone(&transport),
        Arc::new(CountingRefresher::new()),
        RefreshPolicy::SingleFlight,
    );

    assert!(client.query::<MeQuery>(&()).await.is_err());
    let me = client.query::<MeQuery>(&()).await.unwrap();

    assert_eq!(me.me.name, "Mika");
    assert_eq!(transport.count(), 2);
}

#[tokio::test]
async fn test_persistent_cache_survives_restart() {
    let (session, _store) = logged_in("access-1", "refresh-1").await;
    let cache_store = MemoryStore::new();
    let backing: Arc<dyn KeyValueStore> = Arc::new(cache_store.clone());

    let transport = Arc::new(ScriptedTransport::new());
    transport.push(data(json!({ "me": user("Mika") })));
    let config = ClientConfig::default();
    let cache = Arc::new(NormalizedCache::with_persistence(Arc::clone(&backing)).await.unwrap());
    let client = stayhub_client::ApiClient::builder(&config, session.clone())
        .transport(transport.clone())
        .refresher(Arc::new(CountingRefresher::new()))
        .cache(cache)
        .build();
    client.query::<MeQuery>(&()).await.unwrap();
    drop(client);

    let offline = Arc::new(ScriptedTransport::new());
    let restored = Arc::new(NormalizedCache::with_persistence(backing).await.unwrap());
    let client = stayhub_client::ApiClient::builder(&config, session)
        .transport(offline.clone())
        .cache(restored)
        .build();
    let me = client.query::<MeQuery>(&()).await.unwrap();

    assert_eq!(me.me.name, "Mika");
    assert_eq!(offline.count(), 0);

    client.reset_store().await.unwrap();
    assert_eq!(cache_store.get("graphql-cache").await.unwrap(), None);
}

#[tokio::test]
async fn test_stage_order() {
    let (session, _store) = session().await;
    let client = client(
        session,
        Arc::new(ScriptedTransport::new()),
        Arc::new(CountingRefresher::new()),
        RefreshPolicy::SingleFlight,
    );

    assert_eq!(client.stages(), vec!["cache", "error", "auth", "scripted"]);
}

#[tokio::test]
async fn test_raw_operation_with_variables() {
    let (session, _store) = session().await;
    let transport = Arc::new(ScriptedTransport::with_responder(|operation| {
        data(json!({ "listing": { "__typename": "Listing", "id": operation.request.variables["id"] } }))
    }));
    let client = client(
        session,
        Arc::clone(&transport),
        Arc::new(CountingRefresher::new()),
        RefreshPolicy::SingleFlight,
    );

    let listing = |id: &str| {
        Operation::query("query Listing($id: ID!) { listing(id: $id) { __typename id } }")
            .with_name("Listing")
            .with_variables(json!({ "id": id }))
    };
    let a = client.execute(listing("l-1")).await.unwrap();
    let b = client.execute(listing("l-2")).await.unwrap();
    client.execute(listing("l-1")).await.unwrap();

    assert_eq!(a["listing"]["id"], "l-1");
    assert_eq!(b["listing"]["id"], "l-2");
    assert_eq!(transport.count(), 2);
}
