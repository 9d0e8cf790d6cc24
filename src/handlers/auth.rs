//! Login and registration command handlers.

use super::utils::write_simple;
use super::{CommandHandler, HandlerContext, HandlerResult};
use crate::error::{LedgerError, SiteError};
use crate::responses::*;
use tokio::io::{AsyncBufRead, AsyncWrite};

/// Handler for the USER command.
pub struct UserHandler;

impl CommandHandler for UserHandler {
    async fn handle<R, W>(ctx: &mut HandlerContext<R, W>, args: &[String]) -> HandlerResult
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        if !ctx.session.can_authenticate() {
            write_simple(&mut ctx.writer, RESP_482_AUTH_UNAVAILABLE).await?;
            return Ok(());
        }
        if args.is_empty() {
            write_simple(&mut ctx.writer, RESP_501_NOT_ENOUGH).await?;
            return Ok(());
        }
        ctx.session.set_pending_username(args[0].clone());
        write_simple(&mut ctx.writer, RESP_381_PASSWORD_REQ).await?;
        Ok(())
    }
}

/// Handler for the PASS command.
pub struct PassHandler;

impl CommandHandler for PassHandler {
    async fn handle<R, W>(ctx: &mut HandlerContext<R, W>, args: &[String]) -> HandlerResult
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        if args.is_empty() {
            write_simple(&mut ctx.writer, RESP_501_NOT_ENOUGH).await?;
            return Ok(());
        }

        let Some(username) = ctx.session.pending_username() else {
            write_simple(&mut ctx.writer, RESP_481_AUTH_REJECTED).await?;
            return Ok(());
        };
        let username = username.to_string();

        match ctx.ledger.authenticate(&username, &args[0]).await {
            Ok(true) => {
                let operator = ctx.ledger.is_operator(&username);
                ctx.session.confirm_authentication(operator);
                write_simple(&mut ctx.writer, RESP_281_AUTH_OK).await?;
            }
            Ok(false) => {
                tracing::info!(user = %username, "authentication failed");
                write_simple(&mut ctx.writer, RESP_481_AUTH_REJECTED).await?;
            }
            // A store outage reads the same as a bad credential to the
            // client; the log keeps the distinction.
            Err(e) => {
                tracing::warn!(error = %e, "account store unreachable during login");
                write_simple(&mut ctx.writer, RESP_481_AUTH_REJECTED).await?;
            }
        }
        Ok(())
    }
}

/// Handler for the REGISTER command.
pub struct RegisterHandler;

impl CommandHandler for RegisterHandler {
    async fn handle<R, W>(ctx: &mut HandlerContext<R, W>, args: &[String]) -> HandlerResult
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        if !ctx.session.can_authenticate() {
            write_simple(&mut ctx.writer, RESP_482_AUTH_UNAVAILABLE).await?;
            return Ok(());
        }
        if args.len() < 3 {
            write_simple(&mut ctx.writer, RESP_501_NOT_ENOUGH).await?;
            return Ok(());
        }
        if args[1] != args[2] {
            write_simple(&mut ctx.writer, RESP_451_PASSWORD_MISMATCH).await?;
            return Ok(());
        }

        match ctx.ledger.register(&args[0], &args[1]).await {
            Ok(()) => {
                write_simple(&mut ctx.writer, RESP_250_REGISTERED).await?;
            }
            Err(e @ LedgerError::AlreadyExists(_)) => {
                write_simple(&mut ctx.writer, &SiteError::from(e).to_response()).await?;
            }
            Err(e) => {
                tracing::warn!(error = %e, "registration failed");
                write_simple(&mut ctx.writer, &SiteError::from(e).to_response()).await?;
            }
        }
        Ok(())
    }
}

/// Handler for the LOGOUT command.
pub struct LogoutHandler;

impl CommandHandler for LogoutHandler {
    async fn handle<R, W>(ctx: &mut HandlerContext<R, W>, _args: &[String]) -> HandlerResult
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        ctx.session.logout();
        write_simple(&mut ctx.writer, RESP_252_LOGGED_OUT).await?;
        Ok(())
    }
}
