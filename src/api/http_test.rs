use super::*;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

// =========================================================================
// One-shot HTTP stub
// =========================================================================

/// Accept a single connection, answer with `status_line` + `body`, and
/// return the raw request text from the join handle.
async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let raw = read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
        raw
    });
    (format!("http://{addr}"), handle)
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0_u8; 1024];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
            let body_len = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + body_len {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn api(base_url: &str) -> HttpApi {
    HttpApi::new(base_url, Timeouts { request_secs: 5, connect_secs: 2 }).unwrap()
}

// =========================================================================
// Tests
// =========================================================================

#[test]
fn new_trims_trailing_slash() {
    let api = api("http://127.0.0.1:9/");
    assert_eq!(api.base_url(), "http://127.0.0.1:9");
    assert_eq!(api.url(LOGIN_PATH), "http://127.0.0.1:9/api/auth/login");
}

#[tokio::test]
async fn login_posts_credentials_and_decodes_payload() {
    let (base_url, server) = serve_once(
        "200 OK",
        r#"{"status":"success","data":{"token":"T","user":{"isAdmin":true,"isPersonal":false}}}"#,
    )
    .await;

    let creds = Credentials { email: "a@b.com".into(), password: "pw".into() };
    let payload = api(&base_url).login(&creds).await.unwrap();
    assert_eq!(payload.token.as_deref(), Some("T"));
    assert!(payload.user.unwrap().is_admin);

    let raw = server.await.unwrap();
    assert!(raw.starts_with("POST /api/auth/login HTTP/1.1"), "request: {raw}");
    assert!(raw.contains(r#""email":"a@b.com""#));
    assert!(raw.contains(r#""password":"pw""#));
}

#[tokio::test]
async fn login_error_envelope_is_rejected() {
    let (base_url, server) = serve_once("401 Unauthorized", r#"{"status":"error","message":"bad creds"}"#).await;

    let creds = Credentials { email: "a@b.com".into(), password: "wrong".into() };
    let err = api(&base_url).login(&creds).await.unwrap_err();
    assert!(matches!(err, ApiError::Rejected { message: Some(ref m) } if m == "bad creds"));
    server.await.unwrap();
}

#[tokio::test]
async fn fetch_profile_sends_bearer_token() {
    let (base_url, server) =
        serve_once("200 OK", r#"{"status":"success","data":{"user":{"name":"Bo","isPersonal":true}}}"#).await;

    let user = api(&base_url).fetch_profile("tok-123").await.unwrap();
    assert!(user.is_personal);
    assert_eq!(user.name(), Some("Bo"));

    let raw = server.await.unwrap().to_ascii_lowercase();
    assert!(raw.starts_with("get /api/users/profile http/1.1"));
    assert!(raw.contains("authorization: bearer tok-123"));
}

#[tokio::test]
async fn change_password_returns_server_message() {
    let (base_url, server) = serve_once("200 OK", r#"{"status":"success","message":"Password updated"}"#).await;

    let change = PasswordChange { current: "old-pw".into(), new: "new-pw".into() };
    let message = api(&base_url).change_password("T", &change).await.unwrap();
    assert_eq!(message.as_deref(), Some("Password updated"));

    let raw = server.await.unwrap();
    assert!(raw.starts_with("PUT /api/users/password HTTP/1.1"));
    assert!(raw.contains(r#""currentPassword":"old-pw""#));
}

#[tokio::test]
async fn update_profile_without_user_returns_none() {
    let (base_url, server) = serve_once("200 OK", r#"{"status":"success"}"#).await;

    let update = ProfileUpdate { name: Some("Ana".into()), ..ProfileUpdate::default() };
    assert!(api(&base_url).update_profile("T", &update).await.unwrap().is_none());
    server.await.unwrap();
}

#[tokio::test]
async fn unreachable_server_is_request_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let creds = Credentials { email: "a@b.com".into(), password: "pw".into() };
    let err = api(&format!("http://{addr}")).login(&creds).await.unwrap_err();
    assert!(matches!(err, ApiError::Request(_)));
}
