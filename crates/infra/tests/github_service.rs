//! GitHub API client against a mock server

mod support;

use std::time::Duration;

use chrono::Duration as ChronoDuration;
use dulynoted_domain::{DulyNotedError, NewIssue, Project, Provider, ResourceKind};
use dulynoted_infra::{GitHubService, HttpClient};
use serde_json::json;
use support::TestProvider;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn http() -> HttpClient {
    HttpClient::builder().base_backoff(Duration::from_millis(1)).build().unwrap()
}

fn repo_json(id: u64, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "full_name": format!("octo/{name}"),
        "description": null,
        "private": false,
        "html_url": format!("https://github.com/octo/{name}"),
        "owner": { "login": "octo" }
    })
}

#[tokio::test]
async fn repositories_are_served_from_cache_until_forced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/repos"))
        .and(query_param("per_page", "100"))
        .and(query_param("sort", "updated"))
        .and(header("authorization", "Bearer gho_abc"))
        .and(header("accept", "application/vnd.github.v3+json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([repo_json(1, "hello")])))
        .expect(2)
        .mount(&server)
        .await;

    let p = TestProvider::signed_in(Provider::GitHub, &server.uri(), "gho_abc").await;
    let github = GitHubService::new(p.adapter.clone(), http());

    let first = github.fetch_repositories(false).await.unwrap();
    let second = github.fetch_repositories(false).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first[0].full_name, "octo/hello");

    github.fetch_repositories(true).await.unwrap();
}

#[tokio::test]
async fn expired_cache_goes_back_to_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/repos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([repo_json(1, "hello")])))
        .expect(2)
        .mount(&server)
        .await;

    let p = TestProvider::signed_in(Provider::GitHub, &server.uri(), "gho_abc").await;
    let github = GitHubService::new(p.adapter.clone(), http());

    github.fetch_repositories(false).await.unwrap();
    p.clock.advance(ChronoDuration::hours(24));
    github.fetch_repositories(false).await.unwrap();
    p.clock.advance(ChronoDuration::milliseconds(1));
    github.fetch_repositories(false).await.unwrap();
}

#[tokio::test]
async fn signed_out_calls_fail_without_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;

    let p = TestProvider::new(
        Provider::GitHub,
        &server.uri(),
        dulynoted_core::testing::MockAuthorizer::cancelled(),
    );
    let github = GitHubService::new(p.adapter.clone(), http());

    let err = github.fetch_repositories(false).await.unwrap_err();
    assert_eq!(err, DulyNotedError::NotAuthenticated(Provider::GitHub));
}

#[tokio::test]
async fn labels_are_cached_per_repository() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/hello/labels"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "name": "bug", "color": "d73a4a" }])),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/other/labels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let p = TestProvider::signed_in(Provider::GitHub, &server.uri(), "gho_abc").await;
    let github = GitHubService::new(p.adapter.clone(), http());

    assert_eq!(github.repo_labels("octo", "hello", false).await.unwrap()[0].name, "bug");
    assert!(github.repo_labels("octo", "other", false).await.unwrap().is_empty());
    assert_eq!(github.repo_labels("octo", "hello", false).await.unwrap().len(), 1);

    p.adapter.sign_out().await.unwrap();
    assert!(p.store.is_empty(), "sign-out drops scoped caches too");
}

#[tokio::test]
async fn milestones_and_assignees() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/hello/milestones"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "number": 3, "title": "v1.0", "state": "open" }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/hello/assignees"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "login": "octocat", "avatar_url": "https://avatars.test/1" }
        ])))
        .mount(&server)
        .await;

    let p = TestProvider::signed_in(Provider::GitHub, &server.uri(), "gho_abc").await;
    let github = GitHubService::new(p.adapter.clone(), http());

    assert_eq!(github.repo_milestones("octo", "hello", false).await.unwrap()[0].number, 3);
    assert_eq!(github.repo_assignees("octo", "hello", false).await.unwrap()[0].login, "octocat");
}

#[tokio::test]
async fn creating_an_issue_marks_the_repository_recently_used() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/repos/octo/hello/issues"))
        .and(body_partial_json(json!({ "title": "Voice note", "labels": ["bug"] })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "number": 42,
            "title": "Voice note",
            "html_url": "https://github.com/octo/hello/issues/42"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let p = TestProvider::signed_in(Provider::GitHub, &server.uri(), "gho_abc").await;
    let github = GitHubService::new(p.adapter.clone(), http());

    let issue = NewIssue {
        title: "Voice note".into(),
        body: Some("transcript".into()),
        labels: vec!["bug".into()],
        ..NewIssue::default()
    };
    let created = github.create_issue("octo", "hello", &issue).await.unwrap();
    assert_eq!(created.number, 42);

    let recent = p.adapter.cache().get_recently_used(Provider::GitHub, ResourceKind::Repos).await;
    assert_eq!(recent.unwrap(), vec!["octo/hello".to_string()]);
}

#[tokio::test]
async fn api_errors_carry_status_and_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/repos/octo/hello/issues"))
        .respond_with(
            ResponseTemplate::new(410).set_body_json(json!({ "message": "Issues are disabled" })),
        )
        .mount(&server)
        .await;

    let p = TestProvider::signed_in(Provider::GitHub, &server.uri(), "gho_abc").await;
    let github = GitHubService::new(p.adapter.clone(), http());

    let err = github
        .create_issue("octo", "hello", &NewIssue { title: "x".into(), ..NewIssue::default() })
        .await
        .unwrap_err();
    assert_eq!(
        err,
        DulyNotedError::Api {
            provider: Provider::GitHub,
            status: 410,
            message: "Issues are disabled".into()
        }
    );
    let recent = p.adapter.cache().get_recently_used(Provider::GitHub, ResourceKind::Repos).await;
    assert!(recent.unwrap().is_empty());
}

#[tokio::test]
async fn projects_come_from_graphql() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "viewer": { "projectsV2": { "nodes": [
                { "id": "PVT_1", "title": "Roadmap", "url": "https://github.com/users/octo/projects/1",
                  "shortDescription": "Q3", "public": true },
                null
            ] } } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let p = TestProvider::signed_in(Provider::GitHub, &server.uri(), "gho_abc").await;
    let github = GitHubService::new(p.adapter.clone(), http());

    let projects = github.fetch_projects(false).await.unwrap();
    assert_eq!(
        projects,
        vec![Project {
            id: "PVT_1".into(),
            title: "Roadmap".into(),
            url: "https://github.com/users/octo/projects/1".into(),
            description: Some("Q3".into()),
            public: true,
        }]
    );
    assert_eq!(github.fetch_projects(false).await.unwrap().len(), 1);
}

#[tokio::test]
async fn graphql_errors_fail_with_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "errors": [{ "message": "Could not resolve to a node with the global id of 'PVT_x'" }]
        })))
        .mount(&server)
        .await;

    let p = TestProvider::signed_in(Provider::GitHub, &server.uri(), "gho_abc").await;
    let github = GitHubService::new(p.adapter.clone(), http());

    let err = github.create_project_draft_issue("PVT_x", "Note", None).await.unwrap_err();
    match err {
        DulyNotedError::Api { status, message, .. } => {
            assert_eq!(status, 200);
            assert!(message.contains("Could not resolve"));
        }
        other => panic!("expected api error, got {other:?}"),
    }
    let recent =
        p.adapter.cache().get_recently_used(Provider::GitHub, ResourceKind::Projects).await;
    assert!(recent.unwrap().is_empty());
}

#[tokio::test]
async fn draft_issue_marks_project_recently_used() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_partial_json(json!({ "variables": { "projectId": "PVT_1", "title": "Note" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "addProjectV2DraftIssue": { "projectItem": {
                "id": "PVTI_9",
                "content": { "title": "Note", "body": "text" }
            } } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let p = TestProvider::signed_in(Provider::GitHub, &server.uri(), "gho_abc").await;
    let github = GitHubService::new(p.adapter.clone(), http());

    let draft = github.create_project_draft_issue("PVT_1", "Note", Some("text")).await.unwrap();
    assert_eq!(draft.id, "PVTI_9");
    assert_eq!(draft.body.as_deref(), Some("text"));

    let recent =
        p.adapter.cache().get_recently_used(Provider::GitHub, ResourceKind::Projects).await;
    assert_eq!(recent.unwrap(), vec!["PVT_1".to_string()]);
}

#[test]
fn search_filters_are_pure() {
    let repos: Vec<dulynoted_domain::Repository> =
        serde_json::from_value(json!([repo_json(1, "voice-notes"), repo_json(2, "website")]))
            .unwrap();

    assert_eq!(GitHubService::search_repositories("", &repos).len(), 2);
    let hits = GitHubService::search_repositories("VOICE", &repos);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "voice-notes");
    assert!(GitHubService::search_projects("x", &[]).is_empty());
}
