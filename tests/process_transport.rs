use serde_json::json;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, Lines, ReadHalf, WriteHalf};
use zentao_desk::bridge::{Command, Outcome, ProcessTransport, Reply, Request, BACKEND_CLOSED};
use zentao_desk::{CommandBridge, Failure};

/// The backend end of an in-memory pipe.
struct FakeBackend {
    requests: Lines<BufReader<ReadHalf<DuplexStream>>>,
    replies: WriteHalf<DuplexStream>,
}

impl FakeBackend {
    async fn next_request(&mut self) -> Request {
        let line = self.requests.next_line().await.unwrap().unwrap();
        serde_json::from_str(&line).unwrap()
    }

    async fn reply(&mut self, reply: &Reply) {
        let mut line = serde_json::to_string(reply).unwrap();
        line.push('\n');
        self.replies.write_all(line.as_bytes()).await.unwrap();
    }

    async fn send_raw(&mut self, line: &str) {
        self.replies.write_all(line.as_bytes()).await.unwrap();
    }
}

fn connect_transport() -> (Arc<ProcessTransport>, FakeBackend) {
    let (client, backend) = tokio::io::duplex(64 * 1024);
    let (client_read, client_write) = tokio::io::split(client);
    let (backend_read, backend_write) = tokio::io::split(backend);

    let transport = ProcessTransport::from_io(client_read, client_write);
    let fake = FakeBackend {
        requests: BufReader::new(backend_read).lines(),
        replies: backend_write,
    };
    (Arc::new(transport), fake)
}

fn connect() -> (CommandBridge, FakeBackend) {
    let (transport, fake) = connect_transport();
    (CommandBridge::new(transport), fake)
}

#[tokio::test]
async fn request_carries_command_and_camel_case_args() {
    let (bridge, mut backend) = connect();

    let call = tokio::spawn(async move { bridge.get_bugs_by_product(&[3, 1]).await });
    let request = backend.next_request().await;

    assert_eq!(
        request.call,
        Command::GetBugsByProduct {
            product_ids: vec![3, 1]
        }
    );
    assert_eq!(
        serde_json::to_value(&request.call).unwrap(),
        json!({ "command": "get_bugs_by_product", "args": { "productIds": [3, 1] } })
    );

    backend
        .reply(&Reply {
            id: request.id,
            outcome: Outcome::Ok(json!([])),
        })
        .await;
    assert!(call.await.unwrap().unwrap().is_empty());
}

#[tokio::test]
async fn replies_are_matched_by_id() {
    let (bridge, mut backend) = connect();

    let status = tokio::spawn({
        let bridge = bridge.clone();
        async move { bridge.check_login_status().await }
    });
    let first = backend.next_request().await;
    let image = tokio::spawn({
        let bridge = bridge.clone();
        async move { bridge.get_image("file-7.png").await }
    });
    let second = backend.next_request().await;
    assert_ne!(first.id, second.id);

    // Answer in reverse order.
    backend
        .reply(&Reply {
            id: second.id,
            outcome: Outcome::Ok(json!("data:image/png;base64,AAAA")),
        })
        .await;
    backend
        .reply(&Reply {
            id: first.id,
            outcome: Outcome::Ok(json!(true)),
        })
        .await;

    assert_eq!(image.await.unwrap().unwrap(), "data:image/png;base64,AAAA");
    assert!(status.await.unwrap().unwrap());
}

#[tokio::test]
async fn backend_failure_value_is_kept_verbatim() {
    let (bridge, mut backend) = connect();

    let call = tokio::spawn(async move { bridge.get_products().await });
    let request = backend.next_request().await;
    backend.send_raw("this is not a reply\n").await;
    backend
        .reply(&Reply {
            id: request.id,
            outcome: Outcome::Err(json!("Token expired")),
        })
        .await;

    assert_eq!(call.await.unwrap().unwrap_err(), Failure::from("Token expired"));
}

#[tokio::test]
async fn closing_backend_fails_pending_and_later_calls() {
    let (bridge, mut backend) = connect();

    let pending = tokio::spawn({
        let bridge = bridge.clone();
        async move { bridge.get_user_info().await }
    });
    backend.next_request().await;
    drop(backend);

    let failure = pending.await.unwrap().unwrap_err();
    assert_eq!(failure.as_str(), Some(BACKEND_CLOSED));

    let later = bridge.check_login_status().await.unwrap_err();
    assert_eq!(later.as_str(), Some(BACKEND_CLOSED));
}

#[tokio::test]
async fn abandoned_call_leaves_nothing_pending() {
    let (transport, mut backend) = connect_transport();
    let bridge = CommandBridge::new(transport.clone());

    let abandoned = tokio::spawn({
        let bridge = bridge.clone();
        async move { bridge.get_products().await }
    });
    let request = backend.next_request().await;
    assert_eq!(transport.pending(), 1);

    abandoned.abort();
    assert!(abandoned.await.unwrap_err().is_cancelled());
    assert_eq!(transport.pending(), 0);

    // A late answer to the abandoned call does not disturb the next one.
    backend
        .reply(&Reply {
            id: request.id,
            outcome: Outcome::Ok(json!([])),
        })
        .await;
    let next = tokio::spawn(async move { bridge.check_login_status().await });
    let second = backend.next_request().await;
    backend
        .reply(&Reply {
            id: second.id,
            outcome: Outcome::Ok(json!(false)),
        })
        .await;

    assert!(!next.await.unwrap().unwrap());
    assert_eq!(transport.pending(), 0);
}
