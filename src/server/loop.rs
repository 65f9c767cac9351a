// Server loop module
// Accepts connections until shutdown, then drains in-flight requests

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// How often the drain phase re-checks the active connection count
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Run the accept loop until `shutdown` resolves.
///
/// After shutdown the listener is closed and in-flight connections get up to
/// `max(read_timeout, write_timeout)` seconds to finish.
pub async fn run_server<S>(listener: TcpListener, state: Arc<AppState>, shutdown: S)
where
    S: Future<Output = &'static str>,
{
    let active_connections = Arc::new(AtomicUsize::new(0));
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            reason = &mut shutdown => {
                logger::log_shutdown(reason);
                break;
            }
        }
    }

    drop(listener);

    let performance = &state.config.performance;
    let grace = Duration::from_secs(performance.read_timeout.max(performance.write_timeout));
    drain_connections(&active_connections, grace).await;
}

/// Wait for active connections to reach zero or for `grace` to elapse
async fn drain_connections(active_connections: &AtomicUsize, grace: Duration) {
    let deadline = tokio::time::Instant::now() + grace;

    loop {
        let remaining = active_connections.load(Ordering::SeqCst);
        if remaining == 0 {
            logger::log_info("[Shutdown] All connections closed");
            return;
        }
        if tokio::time::Instant::now() >= deadline {
            logger::log_warning(&format!(
                "[Shutdown] Grace period over with {remaining} connection(s) still open"
            ));
            return;
        }
        tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::server::create_reusable_listener;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn test_serves_health_check_then_shuts_down() {
        let mut config = Config::default();
        config.logging.access_log = false;
        let state = Arc::new(AppState::new(&config, reqwest::Client::new()));

        let listener =
            create_reusable_listener("127.0.0.1:0".parse().expect("valid addr")).expect("bind");
        let addr = listener.local_addr().expect("local addr");

        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
        let server = tokio::spawn(run_server(listener, state, async move {
            let _ = stop_rx.await;
            "test finished"
        }));

        let mut stream = tokio::net::TcpStream::connect(addr).await.expect("connect");
        stream
            .write_all(b"GET /healthz HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .expect("write request");
        let mut raw = String::new();
        stream.read_to_string(&mut raw).await.expect("read response");
        assert!(raw.starts_with("HTTP/1.1 200"), "got: {raw}");
        assert!(raw.contains(r#"{"status":"ok"}"#));

        stop_tx.send(()).expect("server still running");
        tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .expect("server stops")
            .expect("server task");
    }

    #[tokio::test]
    async fn test_drain_returns_when_idle() {
        let counter = AtomicUsize::new(0);
        tokio::time::timeout(
            Duration::from_secs(1),
            drain_connections(&counter, Duration::from_secs(30)),
        )
        .await
        .expect("drain finishes immediately");
    }
}
