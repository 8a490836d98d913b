//! Integration tests for the fetch-then-notify pipeline
//!
//! These tests use wiremock to stand in for both the summary API and the
//! Telegram Bot API, and drive the pipeline end-to-end.

use serde_json::{json, Value};
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;
use wiki_relay::config::{Config, TelegramCredentials};
use wiki_relay::notify::{TelegramNotifier, MESSAGE_LIMIT};
use wiki_relay::pipeline::{
    build_http_client, run_pipeline, Coordinator, FetchOutcome, RunSummary, SummaryFetcher,
};
use wiki_relay::topics::{parse_topics, Topic};
use wiki_relay::RelayError;
use wiki_relay::ConfigError;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const TOKEN: &str = "123:abc";
const CHAT_ID: &str = "42";
const SEND_PATH: &str = "/bot123:abc/sendMessage";

fn summary_path(topic: &str) -> String {
    format!("/api/rest_v1/page/summary/{}", topic)
}

fn summary_body(title: &str, extract: &str) -> Value {
    json!({
        "title": title,
        "extract": extract,
        "content_urls": {
            "desktop": {"page": format!("https://en.wikipedia.org/wiki/{}", title)}
        }
    })
}

/// Creates a test configuration pointing at the given mock servers
fn create_test_config(wiki: &MockServer, telegram: &MockServer) -> Config {
    Config {
        concurrency: 4,
        max_retries: 3,
        telegram_enabled: true,
        wiki_api_url: wiki.uri(),
        telegram_api_url: telegram.uri(),
        ..Config::default()
    }
}

fn credentials() -> Option<TelegramCredentials> {
    Some(TelegramCredentials {
        token: TOKEN.to_string(),
        chat_id: CHAT_ID.to_string(),
    })
}

fn topic(name: &str) -> Topic {
    Topic::new(name).unwrap()
}

async fn mount_telegram_ok(telegram: &MockServer) {
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(telegram)
        .await;
}

async fn sent_messages(telegram: &MockServer) -> Vec<Value> {
    telegram
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r: &Request| r.body_json::<Value>().expect("sendMessage body is JSON"))
        .collect()
}

#[tokio::test]
async fn test_found_topic_is_notified_with_button() {
    let wiki = MockServer::start().await;
    let telegram = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(summary_path("Cat")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(summary_body("Cat", "The cat is small.")),
        )
        .expect(1)
        .mount(&wiki)
        .await;
    mount_telegram_ok(&telegram).await;

    let config = create_test_config(&wiki, &telegram);
    let coordinator = Coordinator::new(&config, credentials()).unwrap();
    let summary = coordinator.run(vec![topic("Cat")]).await;

    assert_eq!(
        summary,
        RunSummary {
            found: 1,
            not_found: 0,
            exhausted: 0,
        }
    );

    let messages = sent_messages(&telegram).await;
    assert_eq!(messages.len(), 1);

    let message = &messages[0];
    assert_eq!(message["chat_id"], CHAT_ID);
    assert_eq!(message["parse_mode"], "MarkdownV2");
    assert_eq!(
        message["text"],
        "✅ *Topic:* Cat\n📄 *Summary:* The cat is small\\.\n🔗 https://en\\.wikipedia\\.org/wiki/Cat"
    );
    assert_eq!(
        message["reply_markup"]["inline_keyboard"][0][0]["url"],
        "https://en.wikipedia.org/wiki/Cat"
    );
}

#[tokio::test]
async fn test_not_found_is_terminal_without_retry_or_notification() {
    let wiki = MockServer::start().await;
    let telegram = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(summary_path("Zzyzxqq")))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&wiki)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&telegram)
        .await;

    let config = create_test_config(&wiki, &telegram);
    let coordinator = Coordinator::new(&config, credentials()).unwrap();
    let summary = coordinator.run(vec![topic("Zzyzxqq")]).await;

    assert_eq!(summary.not_found, 1);
    assert_eq!(summary.total(), 1);
}

#[tokio::test]
async fn test_server_errors_exhaust_exactly_max_retries() {
    let wiki = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(summary_path("Dog")))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&wiki)
        .await;

    let config = Config {
        max_retries: 3,
        wiki_api_url: wiki.uri(),
        ..Config::default()
    };
    let fetcher = SummaryFetcher::new(build_http_client().unwrap(), &config).unwrap();

    assert_eq!(
        fetcher.fetch(&topic("Dog")).await,
        FetchOutcome::ExhaustedRetries
    );
}

#[tokio::test]
async fn test_transient_failures_then_success() {
    let wiki = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(summary_path("Dog")))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&wiki)
        .await;
    Mock::given(method("GET"))
        .and(path(summary_path("Dog")))
        .respond_with(ResponseTemplate::new(200).set_body_json(summary_body("Dog", "Woof.")))
        .expect(1)
        .mount(&wiki)
        .await;

    let config = Config {
        max_retries: 3,
        wiki_api_url: wiki.uri(),
        ..Config::default()
    };
    let fetcher = SummaryFetcher::new(build_http_client().unwrap(), &config).unwrap();

    match fetcher.fetch(&topic("Dog")).await {
        FetchOutcome::Success(summary) => {
            assert_eq!(summary.title, "Dog");
            assert_eq!(summary.extract, "Woof.");
        }
        other => panic!("expected success, got {:?}", other),
    }
}

#[tokio::test]
async fn test_undecodable_body_is_retried() {
    let wiki = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .expect(2)
        .mount(&wiki)
        .await;

    let config = Config {
        max_retries: 2,
        wiki_api_url: wiki.uri(),
        ..Config::default()
    };
    let fetcher = SummaryFetcher::new(build_http_client().unwrap(), &config).unwrap();

    assert_eq!(
        fetcher.fetch(&topic("Cat")).await,
        FetchOutcome::ExhaustedRetries
    );
}

#[tokio::test]
async fn test_attempt_timeout_counts_as_failure() {
    let wiki = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(summary_body("Cat", "Slow."))
                .set_delay(Duration::from_millis(500)),
        )
        .expect(2)
        .mount(&wiki)
        .await;

    let config = Config {
        max_retries: 2,
        wiki_api_url: wiki.uri(),
        ..Config::default()
    };
    let fetcher = SummaryFetcher::new(build_http_client().unwrap(), &config)
        .unwrap()
        .with_attempt_timeout(Duration::from_millis(50));

    assert_eq!(
        fetcher.fetch(&topic("Cat")).await,
        FetchOutcome::ExhaustedRetries
    );
}

#[tokio::test]
async fn test_missing_fields_use_defaults() {
    let wiki = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&wiki)
        .await;

    let config = Config {
        wiki_api_url: wiki.uri(),
        ..Config::default()
    };
    let fetcher = SummaryFetcher::new(build_http_client().unwrap(), &config).unwrap();

    match fetcher.fetch(&topic("Cat")).await {
        FetchOutcome::Success(summary) => {
            assert_eq!(summary.title, "No Title");
            assert_eq!(summary.extract, "No summary available.");
            assert!(summary.page_url.is_none());
        }
        other => panic!("expected success, got {:?}", other),
    }
}

#[tokio::test]
async fn test_topic_with_spaces_is_percent_encoded() {
    let wiki = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/rest_v1/page/summary/Alan%20Turing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(summary_body("Alan_Turing", "")))
        .expect(1)
        .mount(&wiki)
        .await;

    let config = Config {
        wiki_api_url: wiki.uri(),
        ..Config::default()
    };
    let fetcher = SummaryFetcher::new(build_http_client().unwrap(), &config).unwrap();

    assert!(matches!(
        fetcher.fetch(&topic("Alan Turing")).await,
        FetchOutcome::Success(_)
    ));
}

#[tokio::test]
async fn test_blank_lines_in_topics_file_are_not_fetched() {
    let wiki = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/api/rest_v1/page/summary/.+$"))
        .respond_with(ResponseTemplate::new(404))
        .expect(2)
        .mount(&wiki)
        .await;

    let mut topics_file = NamedTempFile::new().unwrap();
    topics_file.write_all(b"Cat\n\nDog\n").unwrap();
    topics_file.flush().unwrap();

    let config = Config {
        topics_file: topics_file.path().to_path_buf(),
        telegram_enabled: false,
        wiki_api_url: wiki.uri(),
        ..Config::default()
    };
    let summary = run_pipeline(&config, None).await.unwrap();
    assert_eq!(summary.not_found, 2);

    let mut paths: Vec<String> = wiki
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| r.url.path().to_string())
        .collect();
    paths.sort();
    assert_eq!(paths, vec![summary_path("Cat"), summary_path("Dog")]);
}

#[tokio::test]
async fn test_missing_topics_file_is_startup_error() {
    let config = Config {
        topics_file: "/nonexistent/topics.txt".into(),
        telegram_enabled: false,
        ..Config::default()
    };
    let result = run_pipeline(&config, None).await;
    assert!(matches!(result, Err(RelayError::Io(_))));
}

#[test]
fn test_enabled_notifications_require_credentials() {
    let result = Coordinator::new(&Config::default(), None);
    assert!(matches!(
        result,
        Err(RelayError::Config(ConfigError::MissingSecret(_)))
    ));
}

#[tokio::test]
async fn test_disabled_notifications_send_nothing() {
    let wiki = MockServer::start().await;
    let telegram = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(summary_body("Cat", "Meow.")))
        .mount(&wiki)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&telegram)
        .await;

    let config = Config {
        telegram_enabled: false,
        ..create_test_config(&wiki, &telegram)
    };
    // Credentials are ignored when notifications are off
    let coordinator = Coordinator::new(&config, credentials()).unwrap();
    let summary = coordinator
        .run(parse_topics("Cat\nDog\nBird\n"))
        .await;

    assert_eq!(summary.found, 3);
}

#[tokio::test]
async fn test_oversized_message_is_split_without_button() {
    let wiki = MockServer::start().await;
    let telegram = MockServer::start().await;

    let extract = "A sentence about cats.\n".repeat(300);
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(summary_body("Cat", &extract)))
        .mount(&wiki)
        .await;
    mount_telegram_ok(&telegram).await;

    let config = create_test_config(&wiki, &telegram);
    let coordinator = Coordinator::new(&config, credentials()).unwrap();
    coordinator.run(vec![topic("Cat")]).await;

    let messages = sent_messages(&telegram).await;
    assert!(messages.len() > 1);
    for message in &messages {
        let text = message["text"].as_str().unwrap();
        assert!(!text.is_empty());
        assert!(text.chars().count() <= MESSAGE_LIMIT);
        assert!(message.get("reply_markup").is_none());
    }
}

#[tokio::test]
async fn test_notification_failure_does_not_fail_topic() {
    let wiki = MockServer::start().await;
    let telegram = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(summary_body("Cat", "Meow.")))
        .expect(1)
        .mount(&wiki)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Bad Request: can't parse"))
        .expect(1)
        .mount(&telegram)
        .await;

    let config = create_test_config(&wiki, &telegram);
    let coordinator = Coordinator::new(&config, credentials()).unwrap();
    let summary = coordinator.run(vec![topic("Cat")]).await;

    assert_eq!(summary.found, 1);
}

#[tokio::test]
async fn test_unreachable_telegram_is_swallowed() {
    let wiki = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(summary_body("Cat", "Meow.")))
        .mount(&wiki)
        .await;

    let config = Config {
        wiki_api_url: wiki.uri(),
        telegram_api_url: "http://127.0.0.1:9".to_string(),
        ..Config::default()
    };
    let client = build_http_client().unwrap();
    let fetcher = SummaryFetcher::new(client.clone(), &config).unwrap();
    let notifier = TelegramNotifier::new(client, &config, credentials())
        .unwrap()
        .with_timeout(Duration::from_millis(200));
    let coordinator = Coordinator::from_parts(fetcher, notifier, 2);

    let summary = coordinator.run(vec![topic("Cat")]).await;
    assert_eq!(summary.found, 1);
}

#[tokio::test]
async fn test_mixed_outcomes_all_reach_terminal_state() {
    let wiki = MockServer::start().await;
    let telegram = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(summary_path("Cat")))
        .respond_with(ResponseTemplate::new(200).set_body_json(summary_body("Cat", "Meow.")))
        .mount(&wiki)
        .await;
    Mock::given(method("GET"))
        .and(path(summary_path("Zzyzxqq")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&wiki)
        .await;
    Mock::given(method("GET"))
        .and(path(summary_path("Flaky")))
        .respond_with(ResponseTemplate::new(502))
        .expect(3)
        .mount(&wiki)
        .await;
    mount_telegram_ok(&telegram).await;

    let config = Config {
        concurrency: 2,
        ..create_test_config(&wiki, &telegram)
    };
    let coordinator = Coordinator::new(&config, credentials()).unwrap();
    let summary = coordinator
        .run(parse_topics("Cat\nZzyzxqq\nFlaky\n"))
        .await;

    assert_eq!(
        summary,
        RunSummary {
            found: 1,
            not_found: 1,
            exhausted: 1,
        }
    );
    assert_eq!(sent_messages(&telegram).await.len(), 1);
}
