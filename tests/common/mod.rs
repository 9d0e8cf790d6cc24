#![allow(dead_code)]

use gatepost::accounts::{DynAccounts, sqlite::SqliteAccounts};
use gatepost::clock::Clock;
use gatepost::config::{Config, OperatorConfig};
use gatepost::handle_client;
use gatepost::ledger::{Ledger, OperatorCredential};
use gatepost::posts::{DynPosts, sqlite::SqlitePosts};
use rcgen::{CertifiedKey, generate_simple_self_signed};
use std::sync::Arc;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader, ReadHalf, WriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::RwLock;
use tokio_rustls::{TlsAcceptor, TlsConnector, rustls};

pub const OPERATOR_NAME: &str = "boss";
pub const OPERATOR_PASS: &str = "sesame";

pub fn test_clock() -> Clock {
    Clock::from_offset_hours(8).unwrap()
}

pub fn operator_credential() -> OperatorCredential {
    OperatorCredential {
        username: OPERATOR_NAME.to_string(),
        password: OPERATOR_PASS.to_string(),
    }
}

/// Create a test configuration with minimal settings.
pub fn test_config() -> Config {
    Config {
        addr: "127.0.0.1:0".to_string(),
        site_name: "test".to_string(),
        accounts_db_path: "sqlite::memory:".to_string(),
        posts_db_path: "sqlite::memory:".to_string(),
        idle_timeout_secs: 600,
        utc_offset_hours: 8,
        default_extension_days: 30,
        allow_auth_insecure: true,
        payment_url: Some("https://pay.example/renew".to_string()),
        operator: OperatorConfig {
            username: OPERATOR_NAME.to_string(),
            password: OPERATOR_PASS.to_string(),
        },
        tls_addr: None,
        tls_cert: None,
        tls_key: None,
        image_host: None,
    }
}

/// Create in-memory stores and a ledger wired to them.
pub async fn setup() -> (DynAccounts, DynPosts, Arc<Ledger>) {
    let accounts: DynAccounts = Arc::new(SqliteAccounts::new("sqlite::memory:").await.unwrap());
    let posts: DynPosts = Arc::new(SqlitePosts::new("sqlite::memory:").await.unwrap());
    let ledger = Arc::new(Ledger::new(
        accounts.clone(),
        operator_credential(),
        test_clock(),
    ));
    (accounts, posts, ledger)
}

pub async fn setup_server(
    posts: DynPosts,
    ledger: Arc<Ledger>,
) -> (std::net::SocketAddr, tokio::task::JoinHandle<()>) {
    setup_server_with_cfg(posts, ledger, Arc::new(RwLock::new(test_config()))).await
}

pub async fn setup_server_with_cfg(
    posts: DynPosts,
    ledger: Arc<Ledger>,
    cfg: Arc<RwLock<Config>>,
) -> (std::net::SocketAddr, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (sock, _) = listener.accept().await.unwrap();
        handle_client(sock, posts, ledger, cfg, false).await.unwrap();
    });
    (addr, handle)
}

pub async fn connect(
    addr: std::net::SocketAddr,
) -> (
    BufReader<tokio::net::tcp::OwnedReadHalf>,
    tokio::net::tcp::OwnedWriteHalf,
) {
    let stream = TcpStream::connect(addr).await.unwrap();
    let (r, w) = stream.into_split();
    (BufReader::new(r), w)
}

/// Self-signed loopback certificate for the TLS tests.
pub fn self_signed() -> (rustls::Certificate, rustls::PrivateKey) {
    let CertifiedKey { cert, signing_key } =
        generate_simple_self_signed(["localhost".to_string()]).unwrap();
    (
        rustls::Certificate(cert.der().to_vec()),
        rustls::PrivateKey(signing_key.serialize_der()),
    )
}

/// One-connection TLS server with insecure auth disabled, so the tests can
/// show TLS sessions may still log in.
pub async fn setup_tls_server(
    posts: DynPosts,
    ledger: Arc<Ledger>,
) -> (
    std::net::SocketAddr,
    rustls::Certificate,
    tokio::task::JoinHandle<()>,
) {
    let (cert, key) = self_signed();
    let acceptor = TlsAcceptor::from(Arc::new(
        rustls::ServerConfig::builder()
            .with_safe_defaults()
            .with_no_client_auth()
            .with_single_cert(vec![cert.clone()], key)
            .unwrap(),
    ));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let cfg = Arc::new(RwLock::new(Config {
        allow_auth_insecure: false,
        ..test_config()
    }));
    let handle = tokio::spawn(async move {
        let (sock, _) = listener.accept().await.unwrap();
        let stream = acceptor.accept(sock).await.unwrap();
        handle_client(stream, posts, ledger, cfg, true).await.unwrap();
    });
    (addr, cert, handle)
}

pub async fn connect_tls(
    addr: std::net::SocketAddr,
    cert: rustls::Certificate,
) -> (
    BufReader<ReadHalf<tokio_rustls::client::TlsStream<TcpStream>>>,
    WriteHalf<tokio_rustls::client::TlsStream<TcpStream>>,
) {
    let mut roots = rustls::RootCertStore::empty();
    roots.add(&cert).unwrap();
    let connector = TlsConnector::from(Arc::new(
        rustls::ClientConfig::builder()
            .with_safe_defaults()
            .with_root_certificates(roots)
            .with_no_client_auth(),
    ));
    let stream = TcpStream::connect(addr).await.unwrap();
    let tls_stream = connector
        .connect(rustls::ServerName::try_from("localhost").unwrap(), stream)
        .await
        .unwrap();
    let (r, w) = io::split(tls_stream);
    (BufReader::new(r), w)
}

/// Read one response line, trimmed.
pub async fn read_line<R: AsyncBufReadExt + Unpin>(reader: &mut R) -> String {
    let mut line = String::new();
    reader.read_line(&mut line).await.unwrap();
    line.trim_end_matches(['\r', '\n']).to_string()
}

/// Read lines until the terminating dot, exclusive.
pub async fn read_until_dot<R: AsyncBufReadExt + Unpin>(reader: &mut R) -> Vec<String> {
    let mut lines = Vec::new();
    loop {
        let line = read_line(reader).await;
        if line == "." {
            break;
        }
        lines.push(line);
    }
    lines
}

/// Send one command line.
pub async fn send<W: AsyncWriteExt + Unpin>(writer: &mut W, line: &str) {
    writer.write_all(format!("{line}\r\n").as_bytes()).await.unwrap();
}

/// Drive the USER/PASS flow, asserting it succeeds.
pub async fn login<R, W>(reader: &mut R, writer: &mut W, user: &str, pass: &str)
where
    R: AsyncBufReadExt + Unpin,
    W: AsyncWriteExt + Unpin,
{
    send(writer, &format!("USER {user}")).await;
    assert!(read_line(reader).await.starts_with("381"));
    send(writer, &format!("PASS {pass}")).await;
    assert!(read_line(reader).await.starts_with("281"));
}
