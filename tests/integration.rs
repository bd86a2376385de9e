//! End-to-end scenarios against a mock record store: authentication,
//! transparent token renewal mid-session, schema-driven materialization,
//! and cursor pagination.

use forcedata::{AuthMode, Client, ClientConfig, FieldValue};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::builder()
        .with_consumer_key("consumer_key")
        .with_consumer_secret("consumer_secret")
        .with_login_host(server.uri())
        .build()
}

async fn mount_password_grant(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/services/oauth2/token"))
        .and(query_param("grant_type", "password"))
        .and(query_param("client_id", "consumer_key"))
        .and(query_param("client_secret", "consumer_secret"))
        .and(query_param("username", "user@example.com"))
        .and(query_param("password", "password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": token,
            "instance_url": server.uri(),
            "id": format!("{}/id/00Dorg/005xyz", server.uri())
        })))
        .mount(server)
        .await;
}

async fn mount_account_describe(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/services/data/v23.0/sobjects/Account/describe"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Account",
            "fields": [
                {"name": "Id", "label": "Record Id", "type": "id",
                 "createable": false, "updateable": false},
                {"name": "Name", "label": "Name", "type": "string",
                 "createable": true, "updateable": true},
                {"name": "FoundedOn__c", "label": "Founded On", "type": "date",
                 "createable": true, "updateable": true},
                {"name": "Tags__c", "label": "Tags", "type": "multipicklist",
                 "createable": true, "updateable": true}
            ]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn password_authentication_end_to_end() {
    let server = MockServer::start().await;
    mount_password_grant(&server, "TOK").await;

    let client = Client::new(config_for(&server)).unwrap();
    let token = client
        .authenticate(AuthMode::Password {
            username: "user@example.com".into(),
            password: "password".into(),
        })
        .await
        .unwrap();

    assert_eq!(token, "TOK");
    let session = client.connection().session();
    assert_eq!(session.instance_url(), Some(server.uri()));
    assert_eq!(session.user_id().as_deref(), Some("005xyz"));
    assert_eq!(session.org_id().as_deref(), Some("00Dorg"));
}

#[tokio::test]
async fn expired_token_is_renewed_mid_session() {
    let server = MockServer::start().await;
    mount_password_grant(&server, "TOK").await;
    mount_account_describe(&server).await;

    // The store rejects the first token once, then accepts the renewed one.
    Mock::given(method("GET"))
        .and(path("/services/data/v23.0/sobjects/Account/001abc"))
        .and(header("Authorization", "OAuth TOK"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!([{
            "errorCode": "INVALID_SESSION_ID",
            "message": "Session expired or invalid"
        }])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/services/data/v23.0/sobjects/Account/001abc"))
        .and(header("Authorization", "OAuth FRESH"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "attributes": {"type": "Account"},
            "Id": "001abc",
            "Name": "Acme"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/services/oauth2/token"))
        .and(query_param("grant_type", "refresh_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "FRESH",
            "instance_url": server.uri()
        })))
        .mount(&server)
        .await;

    let client = Client::new(config_for(&server)).unwrap();
    client
        .authenticate(AuthMode::Delegated(json!({
            "credentials": {
                "token": "TOK",
                "instance_url": server.uri(),
                "refresh_token": "REFRESH"
            }
        })))
        .await
        .unwrap();

    let record = client.find("Account", "001abc").await.unwrap();
    assert_eq!(record.id(), Some("001abc".to_string()));
    assert_eq!(
        client.connection().session().access_token().as_deref(),
        Some("FRESH")
    );
}

#[tokio::test]
async fn records_materialize_with_typed_fields() {
    let server = MockServer::start().await;
    mount_account_describe(&server).await;
    Mock::given(method("GET"))
        .and(path("/services/data/v23.0/sobjects/Account/001abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "attributes": {"type": "Account"},
            "Id": "001abc",
            "Name": "Acme",
            "FoundedOn__c": "1999-03-15",
            "Tags__c": "customer;emea"
        })))
        .mount(&server)
        .await;

    let client = Client::new(config_for(&server)).unwrap();
    client
        .authenticate(AuthMode::ExternalToken {
            token: "TOK".into(),
            instance_url: server.uri(),
        })
        .await
        .unwrap();

    let record = client.find("Account", "001abc").await.unwrap();
    match record.get("FoundedOn__c").unwrap() {
        FieldValue::Date(d) => assert_eq!(d.to_string(), "1999-03-15"),
        other => panic!("unexpected value: {other:?}"),
    }
    assert_eq!(
        record.get("Tags__c").unwrap(),
        FieldValue::Picklist(vec!["customer".into(), "emea".into()])
    );
    // Label-derived key reads the same field.
    assert_eq!(
        record.get("Founded_On").unwrap(),
        record.get("FoundedOn__c").unwrap()
    );
}

#[tokio::test]
async fn query_pages_walk_forward_to_a_terminal_page() {
    let server = MockServer::start().await;
    mount_account_describe(&server).await;

    let cursor = "/services/data/v23.0/query/01g-2";
    Mock::given(method("GET"))
        .and(path("/services/data/v23.0/query"))
        .and(query_param("q", "SELECT Name FROM Account"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalSize": 2,
            "nextRecordsUrl": format!("{}{}", server.uri(), cursor),
            "records": [
                {"attributes": {"type": "Account"}, "Id": "001a", "Name": "Acme"}
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(cursor))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalSize": 2,
            "records": [
                {"attributes": {"type": "Account"}, "Id": "001b", "Name": "Globex"}
            ]
        })))
        .mount(&server)
        .await;

    let client = Client::new(config_for(&server)).unwrap();
    client
        .authenticate(AuthMode::ExternalToken {
            token: "TOK".into(),
            instance_url: server.uri(),
        })
        .await
        .unwrap();

    let first = client.query("SELECT Name FROM Account").await.unwrap();
    assert_eq!(first.total_size(), 2);
    assert!(first.has_next());

    let second = first.next().await.unwrap();
    assert_eq!(second.records()[0].id(), Some("001b".to_string()));
    assert!(!second.has_next());

    let terminal = second.next().await.unwrap();
    assert!(terminal.is_empty());
}

#[tokio::test]
async fn create_joins_multipicklist_attributes() {
    let server = MockServer::start().await;
    mount_account_describe(&server).await;
    Mock::given(method("POST"))
        .and(path("/services/data/v23.0/sobjects/Account"))
        .and(wiremock::matchers::body_json(json!({
            "Name": "Acme",
            "Tags__c": "customer;emea"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "001new", "success": true, "errors": []
        })))
        .mount(&server)
        .await;

    let client = Client::new(config_for(&server)).unwrap();
    client
        .authenticate(AuthMode::ExternalToken {
            token: "TOK".into(),
            instance_url: server.uri(),
        })
        .await
        .unwrap();

    let attrs = json!({"Name": "Acme", "Tags__c": ["customer", "emea"]});
    let record = client
        .create("Account", attrs.as_object().unwrap())
        .await
        .unwrap();
    assert_eq!(record.id(), Some("001new".to_string()));
}
