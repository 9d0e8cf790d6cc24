//! Command handlers module.
//!
//! This module contains handlers for all protocol commands, organized by
//! category.

pub mod auth;
pub mod info;
pub mod member;
pub mod post;
pub mod utils;

use crate::config::Config;
use crate::ledger::Ledger;
use crate::parse::Command;
use crate::posts::DynPosts;
use crate::prelude::*;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncWrite};
use tokio::sync::RwLock;

/// Result type for command handlers.
pub type HandlerResult = Result<()>;

/// Context passed to command handlers.
pub struct HandlerContext<R, W> {
    pub reader: R,
    pub writer: W,
    pub posts: DynPosts,
    pub ledger: Arc<Ledger>,
    pub config: Arc<RwLock<Config>>,
    pub session: Session,
}

/// Trait for command handlers.
#[allow(async_fn_in_trait)]
pub trait CommandHandler {
    async fn handle<R, W>(ctx: &mut HandlerContext<R, W>, args: &[String]) -> HandlerResult
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin;
}

/// Dispatch a command to the appropriate handler.
pub async fn dispatch_command<R, W>(ctx: &mut HandlerContext<R, W>, cmd: &Command) -> HandlerResult
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    match cmd.name.as_str() {
        // Login and registration
        "USER" => auth::UserHandler::handle(ctx, &cmd.args).await,
        "PASS" => auth::PassHandler::handle(ctx, &cmd.args).await,
        "REGISTER" => auth::RegisterHandler::handle(ctx, &cmd.args).await,
        "LOGOUT" => auth::LogoutHandler::handle(ctx, &cmd.args).await,

        // Subscription commands
        "STATUS" => member::StatusHandler::handle(ctx, &cmd.args).await,
        "EXTEND" => member::ExtendHandler::handle(ctx, &cmd.args).await,
        "ACCOUNTS" => member::AccountsHandler::handle(ctx, &cmd.args).await,

        // Content commands
        "LIST" => post::ListHandler::handle(ctx, &cmd.args).await,
        "ARTICLE" => post::ArticleHandler::handle(ctx, &cmd.args).await,
        "POST" => post::PostHandler::handle(ctx, &cmd.args).await,

        // Information commands
        "DATE" => info::DateHandler::handle(ctx, &cmd.args).await,
        "HELP" => info::HelpHandler::handle(ctx, &cmd.args).await,
        "QUIT" => info::QuitHandler::handle(ctx, &cmd.args).await,

        // Unknown command
        _ => {
            use crate::responses::RESP_500_UNKNOWN_CMD;
            use tokio::io::AsyncWriteExt;
            ctx.writer
                .write_all(RESP_500_UNKNOWN_CMD.as_bytes())
                .await?;
            Ok(())
        }
    }
}
