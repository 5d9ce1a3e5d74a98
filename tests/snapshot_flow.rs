use epochwatch::config::{DashboardArgs, FileConfig, Settings};
use epochwatch::snapshot;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LOG: &str = "\
# Epoch Dashboard Log

| Time | Service | Status | Last Seen |
| ---- | ------- | ------ | --------- |
| 2024-01-01 10:00:00 | Website | Online | 2024-01-01 10:00:00 |
| 2024-01-01 10:00:00 | Kezan (PvE) | Online | 2024-01-01 10:00:00 |
| 2024-01-01 10:05:00 | Kezan (PvE) | Offline | N/A |
| 2024-01-01 10:05:00 | Gurubashi (PvP) | Offline | N/A |
";

fn settings_for(server: &MockServer) -> Settings {
    let args = DashboardArgs {
        log_source: Some(format!("{}/epoch_dashboard_log.md", server.uri())),
        github_api: Some(server.uri()),
        timezone: Some("Europe/Berlin".to_string()),
        ..Default::default()
    };
    Settings::resolve(&args, &FileConfig::default()).unwrap()
}

async fn mount_commits(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/repos/Project-Epoch/TrinityCore/commits"))
        .and(query_param("sha", "only-fixes"))
        .respond_with(ResponseTemplate::new(502))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/Project-Epoch/TrinityCore/commits"))
        .and(query_param("sha", "epoch-core"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "sha": "abcdef0123456789",
                "html_url": "https://github.com/Project-Epoch/TrinityCore/commit/abcdef0",
                "commit": {
                    "message": "Core: guard <null> creature\n\ndetails",
                    "author": { "name": "Linus", "date": "2024-01-02T09:30:00Z" }
                }
            }
        ])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn snapshot_renders_services_and_isolated_feed_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/epoch_dashboard_log.md"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LOG))
        .mount(&server)
        .await;
    mount_commits(&server).await;

    let page = snapshot::take(&settings_for(&server)).await.unwrap();

    assert_eq!(page.matches("class=\"service-card\"").count(), 3);
    // Kezan's last row is N/A, so the earlier stamp is shown
    assert!(page.contains("<div class=\"status offline\">Offline</div>"));
    assert!(page.contains("1.1.2024, 11:00:00 CET"));
    assert_eq!(page.matches("<br>N/A</div>").count(), 1);

    assert_eq!(page.matches("Failed to load only-fixes commits.").count(), 1);
    assert!(page.contains("Core: guard &lt;null&gt; creature"));
    assert!(page.contains(">abcdef0</a>"));
    assert!(page.find("only-fixes").unwrap() < page.find(">epoch-core<").unwrap());
}

#[tokio::test]
async fn snapshot_survives_missing_log() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/epoch_dashboard_log.md"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_commits(&server).await;

    let page = snapshot::take(&settings_for(&server)).await.unwrap();

    assert!(!page.contains("class=\"service-card\""));
    assert!(page.contains("Updated: <span id=\"lastUpdated\">never</span>"));
    assert!(page.contains("Core: guard &lt;null&gt; creature"));
}
