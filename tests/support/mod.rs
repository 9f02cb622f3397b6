//! Shared test support: a scripted mock SMTP server and stub MX resolvers.

#![allow(dead_code)]

use futures::future::BoxFuture;
use futures::FutureExt;
use mailprobe::{Config, MailExchange, MxLookup};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// How the mock server treats each incoming connection.
#[derive(Clone)]
pub enum ServerBehavior {
    /// Send `greeting`, then for each `(expected, response)` pair read one
    /// command line, assert its prefix, and write the response verbatim
    /// (responses carry their own CRLFs, so multiline replies are one
    /// string). Trailing commands such as QUIT are drained silently.
    Script {
        greeting: String,
        steps: Vec<(String, String)>,
    },
    /// Accept and never write anything; the client's timeout must fire.
    Silent,
    /// Send `greeting`, then drop the connection.
    CloseAfterGreeting { greeting: String },
}

pub struct MockSmtpServer {
    addr: SocketAddr,
    connections: Arc<AtomicUsize>,
    handle: JoinHandle<()>,
}

impl MockSmtpServer {
    pub async fn start(behavior: ServerBehavior) -> Self {
        Self::start_on("127.0.0.1:0", behavior).await
    }

    /// Binds to an explicit address, e.g. to pair two servers on the same
    /// port across loopback aliases.
    pub async fn start_on(bind: &str, behavior: ServerBehavior) -> Self {
        let listener = TcpListener::bind(bind).await.expect("bind mock server");
        let addr = listener.local_addr().expect("mock server addr");
        let connections = Arc::new(AtomicUsize::new(0));
        let counter = connections.clone();
        let handle = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                counter.fetch_add(1, Ordering::SeqCst);
                let behavior = behavior.clone();
                tokio::spawn(async move {
                    let _ = handle_connection(stream, behavior).await;
                });
            }
        });
        Self {
            addr,
            connections,
            handle,
        }
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

impl Drop for MockSmtpServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn handle_connection(
    mut stream: TcpStream,
    behavior: ServerBehavior,
) -> std::io::Result<()> {
    match behavior {
        ServerBehavior::Silent => {
            let mut sink = [0u8; 256];
            while stream.read(&mut sink).await? > 0 {}
            Ok(())
        }
        ServerBehavior::CloseAfterGreeting { greeting } => {
            stream.write_all(format!("{greeting}\r\n").as_bytes()).await?;
            stream.flush().await
        }
        ServerBehavior::Script { greeting, steps } => {
            stream.write_all(format!("{greeting}\r\n").as_bytes()).await?;
            stream.flush().await?;
            let mut reader = BufReader::new(stream);
            for (expected, response) in steps {
                let mut line = String::new();
                if reader.read_line(&mut line).await? == 0 {
                    return Ok(());
                }
                assert!(
                    line.starts_with(&expected),
                    "mock server expected a command starting with '{expected}', got '{line}'"
                );
                reader.get_mut().write_all(response.as_bytes()).await?;
                reader.get_mut().flush().await?;
            }
            let mut rest = String::new();
            let _ = reader.read_line(&mut rest).await;
            Ok(())
        }
    }
}

/// A server that walks the full EHLO / MAIL FROM / RCPT TO exchange and
/// answers RCPT TO with `rcpt_response` (no CRLF).
pub fn rcpt_script(rcpt_response: &str) -> ServerBehavior {
    ServerBehavior::Script {
        greeting: "220 mock.test ESMTP ready".to_string(),
        steps: vec![
            (
                "EHLO".to_string(),
                "250-mock.test\r\n250 PIPELINING\r\n".to_string(),
            ),
            ("MAIL FROM:".to_string(), "250 2.1.0 Ok\r\n".to_string()),
            ("RCPT TO:".to_string(), format!("{rcpt_response}\r\n")),
        ],
    }
}

pub fn accept_all() -> ServerBehavior {
    rcpt_script("250 2.1.5 Ok")
}

/// Resolver stub returning the same records for every domain.
pub struct StaticMx(pub Vec<MailExchange>);

impl MxLookup for StaticMx {
    fn lookup_mx<'a>(&'a self, _domain: &'a str) -> BoxFuture<'a, Vec<MailExchange>> {
        let records = self.0.clone();
        async move { records }.boxed()
    }
}

/// Resolver stub with per-domain records; unknown domains resolve empty,
/// and domains listed in `panic_domains` blow up the lookup to simulate a
/// batch-wide fault.
pub struct MapMx {
    pub map: HashMap<String, Vec<MailExchange>>,
    pub panic_domains: Vec<String>,
}

impl MapMx {
    pub fn new(map: HashMap<String, Vec<MailExchange>>) -> Self {
        Self {
            map,
            panic_domains: Vec::new(),
        }
    }
}

impl MxLookup for MapMx {
    fn lookup_mx<'a>(&'a self, domain: &'a str) -> BoxFuture<'a, Vec<MailExchange>> {
        if self.panic_domains.iter().any(|d| d == domain) {
            panic!("injected resolver failure for {domain}");
        }
        let records = self.map.get(domain).cloned().unwrap_or_default();
        async move { records }.boxed()
    }
}

/// Resolver stub that must never be consulted.
pub struct NoLookupExpected;

impl MxLookup for NoLookupExpected {
    fn lookup_mx<'a>(&'a self, domain: &'a str) -> BoxFuture<'a, Vec<MailExchange>> {
        panic!("unexpected MX lookup for {domain}");
    }
}

pub fn mx(host: &str, priority: u16) -> MailExchange {
    MailExchange {
        host: host.to_string(),
        priority,
    }
}

/// Config tuned for talking to loopback mocks: short timeouts, quick
/// backoff, generous rate limits.
pub fn test_config(port: u16) -> Config {
    let mut config = Config::default();
    config.smtp_port = port;
    config.smtp_timeout = Duration::from_millis(500);
    config.inter_batch_delay = Duration::from_millis(10);
    config.retry_backoff = Duration::from_millis(20);
    config.rate_limit_max = 100;
    config
}
