mod common;

use tin_metrics::relay::Reply;
use tin_metrics::{serialize, Error, RelayClient, Role, Session};

const REPORT: &str = "timestamp,container_name,cpu_usage_percentage,memory_usage_mb,network_received_mb,network_sent_mb,disk_read_mb,disk_write_mb,runtime_seconds,code_execution_time_seconds
2024-11-02 12:00:00,Ubuntu20.04,12.5,48.2,0.01,0.0,3.1,1.0,20.4,1.0
2024-11-02 12:00:00,Debian11,9.75,51.0,0.02,0.0,2.2,0.5,21.9,2.0
2024-11-02 12:00:05,\"Alpine \"\"edge\"\"\",30,10,0,0,0,0,5,0.5
";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn relay(url: &str) -> RelayClient {
    RelayClient::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build(url)
        .unwrap()
}

#[tokio::test]
async fn answer_is_appended() {
    init_tracing();
    let stub = common::serve(vec![(200, r#"{"response":"Alpine finished first."}"#)]).await;
    let relay = relay(&stub.url("/chat"));

    let mut session = Session::new();
    assert_eq!(session.load(REPORT), 3);

    let reply = session
        .ask(&relay, "Which distribution finished first?")
        .await
        .unwrap();
    assert_eq!(reply.answer(), Some("Alpine finished first."));

    let turns = session.conversation().turns();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].role, Role::User);
    assert_eq!(turns[0].content, "Which distribution finished first?");
    assert_eq!(turns[1].role, Role::Assistant);
    assert_eq!(turns[1].content, "Alpine finished first.");

    let requests = stub.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].path, "/chat");

    let body = requests[0].json();
    assert_eq!(body["user_prompt"], "Which distribution finished first?");
    assert_eq!(
        body["csv_data"].as_str().unwrap(),
        serialize(session.dataset())
    );
}

#[tokio::test]
async fn whole_dataset_is_sent_regardless_of_metric() {
    let stub = common::serve(vec![(200, r#"{"response":"ok"}"#)]).await;
    let relay = relay(&stub.url("/chat"));

    let mut session = Session::new();
    session.load(REPORT);
    session.select_metric(tin_metrics::Metric::DiskWrite);
    session.ask(&relay, "summarize").await.unwrap();

    let body = stub.requests()[0].json();
    let csv = body["csv_data"].as_str().unwrap();
    assert_eq!(csv.lines().count(), 4);
    assert!(csv.contains(r#""Alpine ""edge""""#));

    // what the service receives parses back to the same records
    assert_eq!(&tin_metrics::ingest(csv), session.dataset());
}

#[tokio::test]
async fn server_error_becomes_assistant_turn() {
    init_tracing();
    let stub = common::serve(vec![(500, r#"{"error":"model unavailable"}"#)]).await;
    let relay = relay(&stub.url("/chat"));

    let mut session = Session::new();
    session.load(REPORT);

    let reply = session.ask(&relay, "Why is Debian slower?").await.unwrap();
    match reply {
        Reply::Failed(e) => {
            assert!(e.is_transport());
            assert!(matches!(e, Error::WebServer(500, _)));
        }
        other => panic!("expected failure, got {other:?}"),
    }

    let turns = session.conversation().turns();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].role, Role::User);
    assert_eq!(turns[1].role, Role::Assistant);
    assert!(turns[1].content.starts_with("Error:"));
    assert!(turns[1].content.contains("model unavailable"));
}

#[tokio::test]
async fn malformed_response_becomes_assistant_turn() {
    let stub = common::serve(vec![(200, r#"{"answer":"wrong field"}"#), (200, "not json")]).await;
    let relay = relay(&stub.url("/chat"));

    let mut session = Session::new();
    session.load(REPORT);

    for question in ["first?", "second?"] {
        let reply = session.ask(&relay, question).await.unwrap();
        assert!(matches!(reply, Reply::Failed(Error::MalformedResponse(_))));
    }

    let roles: Vec<Role> = session.conversation().iter().map(|t| t.role).collect();
    assert_eq!(
        roles,
        vec![Role::User, Role::Assistant, Role::User, Role::Assistant]
    );
    assert_eq!(session.conversation().turns()[2].content, "second?");
}

#[tokio::test]
async fn unreachable_service() {
    let relay = relay(&format!("{}/chat", common::closed_port().await));

    let mut session = Session::new();
    session.load(REPORT);

    let reply = session.ask(&relay, "hello?").await.unwrap();
    assert!(matches!(reply, Reply::Failed(ref e) if e.is_transport()));
    assert_eq!(session.conversation().len(), 2);
}

#[tokio::test]
async fn timeout_is_a_transport_failure() {
    let stub = common::serve_silent().await;
    let relay = RelayClient::builder()
        .timeout(std::time::Duration::from_millis(200))
        .build(&stub.url("/chat"))
        .unwrap();

    let mut session = Session::new();
    session.load(REPORT);

    let reply = session.ask(&relay, "still there?").await.unwrap();
    assert!(matches!(reply, Reply::Failed(Error::HTTPClient(ref e)) if e.is_timeout()));
    assert_eq!(session.conversation().len(), 2);
}

#[tokio::test]
async fn empty_dataset_makes_no_request() {
    let stub = common::serve(vec![(200, r#"{"response":"unused"}"#)]).await;
    let relay = relay(&stub.url("/chat"));

    let mut session = Session::new();
    session.load("timestamp,container_name\n,Ubuntu20.04\n");

    let res = session.ask(&relay, "anything?").await;
    assert!(matches!(res, Err(Error::EmptyDataset)));
    assert!(session.conversation().is_empty());
    assert!(stub.requests().is_empty());
}

#[tokio::test]
async fn blank_question_is_a_no_op() {
    let stub = common::serve(vec![(200, r#"{"response":"unused"}"#)]).await;
    let relay = relay(&stub.url("/chat"));

    let mut session = Session::new();
    session.load(REPORT);

    let reply = session.ask(&relay, " \n\t").await.unwrap();
    assert!(matches!(reply, Reply::Skipped));
    assert!(session.conversation().is_empty());
    assert!(stub.requests().is_empty());
}
