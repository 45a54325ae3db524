use std::time::Duration;

use prequal_core::domain::{Draft, FieldUpdate};
use prequal_core::errors::DeliveryError;
use prequal_core::notify::{EmailJsCredentials, EmailJsNotifier, Notifier, TemplateParams};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serves exactly one HTTP response and hands back the raw request body.
async fn one_shot_server(
    status_line: &'static str,
    body: &'static str,
) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buffer = Vec::new();
        let mut chunk = [0u8; 4096];
        let request_body = loop {
            let read = socket.read(&mut chunk).await.unwrap();
            buffer.extend_from_slice(&chunk[..read]);
            let text = String::from_utf8_lossy(&buffer).to_string();
            if let Some(split) = text.find("\r\n\r\n") {
                let length = text[..split]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                let body_start = split + 4;
                if buffer.len() >= body_start + length {
                    break String::from_utf8_lossy(&buffer[body_start..body_start + length])
                        .to_string();
                }
            }
            if read == 0 {
                break String::new();
            }
        };

        let response = format!(
            "{status_line}\r\ncontent-type: text/plain\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        request_body
    });

    (format!("http://{addr}/api/v1.0/email/send"), handle)
}

fn credentials() -> EmailJsCredentials {
    EmailJsCredentials {
        service_id: "service_abc".into(),
        template_id: "template_xyz".into(),
        public_key: "pk_123".into(),
    }
}

fn sample_params() -> TemplateParams {
    let mut draft = Draft::default();
    draft.apply(FieldUpdate::FullName("Ana Ruiz".into()));
    draft.apply(FieldUpdate::Email("ana@example.com".into()));
    TemplateParams::from(&draft)
}

#[tokio::test]
async fn accepted_request_posts_the_emailjs_body() {
    let (endpoint, server) = one_shot_server("HTTP/1.1 200 OK", "OK").await;
    let notifier = EmailJsNotifier::new(credentials())
        .with_endpoint(endpoint)
        .with_access_token(Some("private".into()));

    let result = tokio::time::timeout(Duration::from_secs(5), notifier.send(&sample_params()))
        .await
        .unwrap();
    assert_eq!(result, Ok(()));

    let body: serde_json::Value = serde_json::from_str(&server.await.unwrap()).unwrap();
    assert_eq!(body["service_id"], "service_abc");
    assert_eq!(body["template_id"], "template_xyz");
    assert_eq!(body["user_id"], "pk_123");
    assert_eq!(body["accessToken"], "private");
    assert_eq!(body["template_params"]["fullName"], "Ana Ruiz");
    assert_eq!(body["template_params"]["budget"], "No estoy seguro");
}

#[tokio::test]
async fn rejected_request_surfaces_status_and_body() {
    let (endpoint, server) =
        one_shot_server("HTTP/1.1 400 Bad Request", "The Public Key is invalid").await;
    let notifier = EmailJsNotifier::new(credentials()).with_endpoint(endpoint);

    let result = notifier.send(&sample_params()).await;
    assert_eq!(
        result,
        Err(DeliveryError::Rejected {
            status: 400,
            body: "The Public Key is invalid".into()
        })
    );
    server.await.unwrap();
}

#[tokio::test]
async fn unreachable_endpoint_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let notifier = EmailJsNotifier::new(credentials()).with_endpoint(format!("http://{addr}/"));
    let result = notifier.send(&sample_params()).await;
    assert!(matches!(result, Err(DeliveryError::Transport(_))));
}
