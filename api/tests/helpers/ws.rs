use axum::Router;
use futures::StreamExt;
use serde_json::Value;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message,
    tungstenite::client::IntoClientRequest,
};

pub type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Spawns the app on a random local port.
pub async fn spawn_server(app: Router) -> std::net::SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    addr
}

/// Connects to `/ws/attendance/{label}` with an optional `key` query parameter.
pub async fn connect_ws(
    addr: &std::net::SocketAddr,
    label: &str,
    key: Option<&str>,
) -> Result<Socket, tokio_tungstenite::tungstenite::Error> {
    let mut url = url::Url::parse(&format!("ws://{addr}/ws/attendance/")).unwrap();
    url.path_segments_mut().unwrap().pop_if_empty().push(label);
    if let Some(key) = key {
        url.query_pairs_mut().append_pair("key", key);
    }
    let req = url.as_str().into_client_request().unwrap();
    connect_async(req).await.map(|(socket, _)| socket)
}

/// Reads frames until one whose `event` (or `type`) equals `name`.
pub async fn next_event(socket: &mut Socket, name: &str) -> Value {
    loop {
        let frame = timeout(Duration::from_secs(3), socket.next())
            .await
            .expect("timed out waiting for ws frame")
            .expect("socket closed")
            .expect("ws error");
        if let Message::Text(text) = frame {
            let v: Value = serde_json::from_str(text.as_str()).unwrap();
            if v["event"] == name || v["type"] == name {
                return v;
            }
        }
    }
}
