//! Service lifecycle: open the stores, build the ledger, run the listeners.

use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::net::SocketAddr;
use std::sync::Arc;

use rustls_pemfile::{certs, pkcs8_private_keys};
use tokio::net::TcpListener;
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::RwLock;
use tokio_rustls::{TlsAcceptor, rustls};
use tracing::{debug, error, info};

use crate::accounts;
use crate::clock::Clock;
use crate::config::Config;
use crate::ledger::{Ledger, OperatorCredential};
use crate::posts::{self, DynPosts};

/// The handles every accepted connection shares.
#[derive(Clone)]
struct Shared {
    posts: DynPosts,
    ledger: Arc<Ledger>,
    cfg: Arc<RwLock<Config>>,
}

/// The acceptor lives behind a lock so a SIGHUP reload can swap
/// certificates without rebinding the listener.
type AcceptorSlot = Arc<RwLock<Option<TlsAcceptor>>>;

fn load_tls_config(
    cert_path: &str,
    key_path: &str,
) -> Result<rustls::ServerConfig, Box<dyn Error + Send + Sync>> {
    let certs: Vec<rustls::Certificate> = certs(&mut BufReader::new(File::open(cert_path)?))?
        .into_iter()
        .map(rustls::Certificate)
        .collect();
    let mut keys = pkcs8_private_keys(&mut BufReader::new(File::open(key_path)?))?;
    if keys.is_empty() {
        return Err(format!("no PKCS#8 private key in {key_path}").into());
    }
    Ok(rustls::ServerConfig::builder()
        .with_safe_defaults()
        .with_no_client_auth()
        .with_single_cert(certs, rustls::PrivateKey(keys.remove(0)))?)
}

fn listen_addr(raw: &str) -> String {
    if raw.parse::<SocketAddr>().is_ok() {
        return raw.to_string();
    }
    let port = raw.strip_prefix(':').unwrap_or(raw);
    format!("0.0.0.0:{port}")
}

/// Accept connections forever, one task per client. With an acceptor slot
/// the socket is TLS-wrapped first; an empty slot drops the connection.
fn spawn_listener(listener: TcpListener, shared: Shared, tls: Option<AcceptorSlot>) {
    tokio::spawn(async move {
        loop {
            let (socket, peer) = match listener.accept().await {
                Ok(conn) => conn,
                Err(e) => {
                    error!("accept error: {e}");
                    continue;
                }
            };
            debug!(%peer, secure = tls.is_some(), "accepted connection");
            let conn = shared.clone();
            let tls = tls.clone();
            tokio::spawn(async move {
                let served = match tls {
                    Some(slot) => {
                        let Some(acceptor) = slot.read().await.clone() else {
                            return;
                        };
                        match acceptor.accept(socket).await {
                            Ok(stream) => {
                                crate::handle_client(stream, conn.posts, conn.ledger, conn.cfg, true)
                                    .await
                            }
                            Err(e) => {
                                error!(%peer, "tls handshake failed: {e}");
                                return;
                            }
                        }
                    }
                    None => {
                        crate::handle_client(socket, conn.posts, conn.ledger, conn.cfg, false).await
                    }
                };
                if let Err(e) = served {
                    error!(%peer, "client error: {e}");
                }
            });
        }
    });
}

/// Run the service until ctrl-c: open both stores, build the ledger, accept
/// connections, and reload runtime-adjustable settings on SIGHUP.
///
/// # Errors
///
/// Returns an error if a store cannot be opened or a listener cannot bind.
pub async fn run(cfg_initial: Config, cfg_path: String) -> Result<(), Box<dyn Error + Send + Sync>> {
    let operator = OperatorCredential {
        username: cfg_initial.operator.username.clone(),
        password: cfg_initial.operator.password.clone(),
    };
    let clock = Clock::from_offset_hours(cfg_initial.utc_offset_hours)?;
    let account_store = accounts::open(&cfg_initial.accounts_db_path).await?;
    let post_store = posts::open(&cfg_initial.posts_db_path).await?;

    let addr = listen_addr(&cfg_initial.addr);
    let tls_bind = match (
        cfg_initial.tls_addr.as_deref(),
        cfg_initial.tls_cert.as_deref(),
        cfg_initial.tls_key.as_deref(),
    ) {
        (Some(a), Some(c), Some(k)) => Some((listen_addr(a), c.to_string(), k.to_string())),
        _ => None,
    };

    let cfg = Arc::new(RwLock::new(cfg_initial));
    let shared = Shared {
        posts: post_store,
        ledger: Arc::new(Ledger::new(account_store, operator, clock)),
        cfg: cfg.clone(),
    };

    info!("listening on {addr}");
    spawn_listener(TcpListener::bind(&addr).await?, shared.clone(), None);

    let tls_acceptor: AcceptorSlot = Arc::new(RwLock::new(None));
    if let Some((tls_addr, cert, key)) = tls_bind {
        *tls_acceptor.write().await = Some(TlsAcceptor::from(Arc::new(load_tls_config(
            &cert, &key,
        )?)));
        info!("listening on {tls_addr} (tls)");
        spawn_listener(
            TcpListener::bind(&tls_addr).await?,
            shared.clone(),
            Some(tls_acceptor.clone()),
        );
    }

    let reload_cfg = cfg.clone();
    let reload_tls = tls_acceptor.clone();
    tokio::spawn(async move {
        let Ok(mut hup) = signal(SignalKind::hangup()) else {
            return;
        };
        while hup.recv().await.is_some() {
            let new_cfg = match Config::from_file(&cfg_path) {
                Ok(c) => c,
                Err(e) => {
                    error!("config reload failed: {e}");
                    continue;
                }
            };
            if let (Some(cert), Some(key)) = (new_cfg.tls_cert.as_deref(), new_cfg.tls_key.as_deref())
            {
                match load_tls_config(cert, key) {
                    Ok(tls_cfg) => {
                        *reload_tls.write().await = Some(TlsAcceptor::from(Arc::new(tls_cfg)));
                    }
                    Err(e) => error!("tls reload failed: {e}"),
                }
            }
            reload_cfg.write().await.update_runtime(new_cfg);
            info!("configuration reloaded");
        }
    });

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");
    Ok(())
}
