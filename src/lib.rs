//! gatepost is a membership-gated content service. Visitors register an
//! account, pay off-platform, the operator extends their subscription
//! expiry, and active subscribers read gated posts while everyone else sees
//! teasers.
//!
//! The subscription ledger ([`ledger`]) owns every account and expiry rule;
//! the post store ([`posts`]) is an append-only log of published posts. Both
//! sit on sqlx backends selected by connection URI and opened once at
//! startup. [`handle_client`] runs the line protocol one connection at a
//! time: read a command, dispatch it, answer with a numeric response line.

pub mod accounts;
pub mod clock;
pub mod config;
pub mod error;
pub mod handlers;
pub mod image_host;
pub mod ledger;
pub mod parse;
pub mod posts;
pub mod prelude;
pub mod responses;
pub mod server;
pub mod session;

pub use parse::{Command, parse_command};

use crate::config::Config;
use crate::handlers::{HandlerContext, dispatch_command};
use crate::ledger::Ledger;
use crate::posts::DynPosts;
use crate::responses::{RESP_400_IDLE, RESP_501_SYNTAX};
use crate::session::Session;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{self, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::RwLock;
use tokio::time::timeout;

/// Serve one client connection until QUIT, disconnect, or idle timeout.
///
/// # Errors
///
/// Returns an error if the socket fails while writing a response; read
/// failures and protocol errors end the connection without an error.
pub async fn handle_client<S>(
    socket: S,
    posts: DynPosts,
    ledger: Arc<Ledger>,
    config: Arc<RwLock<Config>>,
    is_tls: bool,
) -> Result<(), Box<dyn Error + Send + Sync>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (read_half, write_half) = io::split(socket);
    let reader = BufReader::new(read_half);

    let (idle_timeout, allow_auth_insecure, site_name) = {
        let cfg = config.read().await;
        (
            Duration::from_secs(cfg.idle_timeout_secs),
            cfg.allow_auth_insecure,
            cfg.site_name.clone(),
        )
    };

    let mut ctx = HandlerContext {
        reader,
        writer: write_half,
        posts,
        ledger,
        config,
        session: Session::new(is_tls, allow_auth_insecure),
    };

    ctx.writer
        .write_all(format!("200 {site_name} service ready\r\n").as_bytes())
        .await?;

    let mut line = String::new();
    loop {
        line.clear();
        let n = match timeout(idle_timeout, ctx.reader.read_line(&mut line)).await {
            Ok(Ok(n)) => n,
            Ok(Err(e)) => {
                tracing::debug!(error = %e, "read failed, closing connection");
                break;
            }
            Err(_) => {
                let _ = ctx.writer.write_all(RESP_400_IDLE.as_bytes()).await;
                break;
            }
        };
        if n == 0 {
            break;
        }
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed.is_empty() {
            continue;
        }
        let Ok((_, cmd)) = parse_command(trimmed) else {
            ctx.writer.write_all(RESP_501_SYNTAX.as_bytes()).await?;
            continue;
        };
        if let Err(e) = dispatch_command(&mut ctx, &cmd).await {
            tracing::debug!(error = %e, "closing connection");
            break;
        }
    }
    Ok(())
}
