// Server loop module
// Accepts connections until the shutdown future resolves

use std::future::Future;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// Main accept loop.
///
/// Each accepted connection is served on its own task. Once `shutdown`
/// resolves the listener is dropped; connections already in flight finish in
/// the background.
pub async fn start_server_loop<S>(listener: TcpListener, state: Arc<AppState>, shutdown: S)
where
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => accept_connection(stream, peer_addr, &state),
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            () = &mut shutdown => {
                logger::log_shutdown(state.active_connections.load(Ordering::SeqCst));
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::server::create_listener;
    use httpmock::prelude::*;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::sync::oneshot;

    struct TestServer {
        base: String,
        addr: std::net::SocketAddr,
        state: Arc<AppState>,
        stop: oneshot::Sender<()>,
        handle: tokio::task::JoinHandle<()>,
    }

    impl TestServer {
        async fn shutdown(self) {
            self.stop.send(()).unwrap();
            self.handle.await.unwrap();
        }

        async fn wait_for_connections(&self, expected: usize) {
            for _ in 0..200 {
                if self.state.active_connections.load(Ordering::SeqCst) == expected {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            panic!(
                "expected {expected} active connections, found {}",
                self.state.active_connections.load(Ordering::SeqCst)
            );
        }
    }

    fn client() -> reqwest::Client {
        reqwest::Client::builder().no_proxy().build().unwrap()
    }

    fn config_for(upstream_url: String) -> Config {
        let mut cfg = Config::defaults().unwrap();
        cfg.upstream.url = upstream_url;
        cfg
    }

    fn spawn_server(cfg: &Config) -> TestServer {
        let state = Arc::new(AppState::new(cfg).unwrap());

        let listener = create_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();

        let (stop, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(start_server_loop(listener, Arc::clone(&state), async move {
            let _ = rx.await;
        }));
        TestServer {
            base: format!("http://{addr}"),
            addr,
            state,
            stop,
            handle,
        }
    }

    #[tokio::test]
    async fn test_serves_both_endpoints_over_tcp() {
        let upstream = MockServer::start_async().await;
        upstream
            .mock_async(|when, then| {
                when.method(GET).path("/ahsanselisecontainer/dummyfile.txt");
                then.status(200)
                    .header("Content-Type", "text/plain")
                    .body("relayed over the wire");
            })
            .await;

        let server = spawn_server(&config_for(
            upstream.url("/ahsanselisecontainer/dummyfile.txt"),
        ));
        let http = client();

        let resp = http.get(format!("{}/api", server.base)).send().await.unwrap();
        assert_eq!(resp.status().as_u16(), 200);
        assert_eq!(resp.text().await.unwrap(), r#"{"message":"Hello, World!"}"#);

        let resp = http.get(format!("{}/pub/dummyfile", server.base)).send().await.unwrap();
        assert_eq!(resp.status().as_u16(), 200);
        assert_eq!(resp.text().await.unwrap(), "relayed over the wire");

        let resp = http.get(format!("{}/nope", server.base)).send().await.unwrap();
        assert_eq!(resp.status().as_u16(), 404);

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_upstream_down_over_tcp() {
        let server = spawn_server(&config_for("http://127.0.0.1:1/dummyfile.txt".to_string()));

        let resp = client()
            .get(format!("{}/pub/dummyfile", server.base))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 500);
        assert_eq!(resp.text().await.unwrap(), "Error fetching the file");

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_slow_upstream_outlives_header_timeout() {
        let upstream = MockServer::start_async().await;
        upstream
            .mock_async(|when, then| {
                when.method(GET).path("/slow.txt");
                then.status(200)
                    .body("worth the wait")
                    .delay(Duration::from_millis(1500));
            })
            .await;

        let mut cfg = config_for(upstream.url("/slow.txt"));
        cfg.performance.header_read_timeout = 1;
        let server = spawn_server(&cfg);

        let resp = client()
            .get(format!("{}/pub/dummyfile", server.base))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 200);
        assert_eq!(resp.text().await.unwrap(), "worth the wait");

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_keep_alive_request_near_timeout_completes() {
        let upstream = MockServer::start_async().await;
        upstream
            .mock_async(|when, then| {
                when.method(GET).path("/blob.txt");
                then.status(200)
                    .body("second request")
                    .delay(Duration::from_millis(600));
            })
            .await;

        let mut cfg = config_for(upstream.url("/blob.txt"));
        cfg.performance.header_read_timeout = 1;
        let server = spawn_server(&cfg);

        // Same pooled client, so both requests share one connection
        let http = client();
        let resp = http.get(format!("{}/api", server.base)).send().await.unwrap();
        assert_eq!(resp.status().as_u16(), 200);
        resp.bytes().await.unwrap();

        tokio::time::sleep(Duration::from_millis(700)).await;

        let resp = http
            .get(format!("{}/pub/dummyfile", server.base))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 200);
        assert_eq!(resp.text().await.unwrap(), "second request");

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_max_connections_rejects_then_recovers() {
        let mut cfg = config_for("http://127.0.0.1:1/unused".to_string());
        cfg.performance.max_connections = Some(1);
        let server = spawn_server(&cfg);

        let held = TcpStream::connect(server.addr).await.unwrap();
        server.wait_for_connections(1).await;

        // Over the limit: closed without a response, counter rolled back
        let mut rejected = TcpStream::connect(server.addr).await.unwrap();
        let _ = rejected
            .write_all(b"GET /api HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await;
        let mut buf = Vec::new();
        let read = tokio::time::timeout(Duration::from_secs(5), rejected.read_to_end(&mut buf))
            .await
            .expect("rejected connection should be closed");
        assert!(read.is_err() || buf.is_empty(), "unexpected response: {buf:?}");
        assert_eq!(server.state.active_connections.load(Ordering::SeqCst), 1);

        drop(held);
        server.wait_for_connections(0).await;

        let resp = client().get(format!("{}/api", server.base)).send().await.unwrap();
        assert_eq!(resp.status().as_u16(), 200);

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_stops_accepting() {
        let server = spawn_server(&config_for("http://127.0.0.1:1/unused".to_string()));
        let base = server.base.clone();
        server.shutdown().await;

        let result = client().get(format!("{base}/api")).send().await;
        assert!(result.is_err());
    }
}
