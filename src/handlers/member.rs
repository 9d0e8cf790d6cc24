//! Subscription command handlers.

use super::utils::write_simple;
use super::{CommandHandler, HandlerContext, HandlerResult};
use crate::error::{LedgerError, SiteError};
use crate::ledger::SubscriptionStatus;
use crate::responses::*;
use tokio::io::{AsyncBufRead, AsyncWrite, AsyncWriteExt};

/// Handler for the STATUS command.
pub struct StatusHandler;

impl CommandHandler for StatusHandler {
    async fn handle<R, W>(ctx: &mut HandlerContext<R, W>, _args: &[String]) -> HandlerResult
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let Some(username) = ctx.session.username().map(str::to_string) else {
            write_simple(&mut ctx.writer, RESP_480_LOGIN_REQ).await?;
            return Ok(());
        };

        match ctx.ledger.check_subscription(&username).await {
            Ok(SubscriptionStatus::Permanent) => {
                write_simple(&mut ctx.writer, &format!("{RESP_211_STATUS} permanent\r\n")).await?;
            }
            Ok(SubscriptionStatus::Active { until }) => {
                write_simple(
                    &mut ctx.writer,
                    &format!("{RESP_211_STATUS} active until {until}\r\n"),
                )
                .await?;
            }
            Ok(SubscriptionStatus::Lapsed { until }) => {
                let payment = ctx.config.read().await.payment_url.clone();
                let line = match payment {
                    Some(url) => format!("{RESP_428_LAPSED} expired {until}, renew at {url}\r\n"),
                    None => format!("{RESP_428_LAPSED} expired {until}\r\n"),
                };
                write_simple(&mut ctx.writer, &line).await?;
            }
            Err(e) => {
                tracing::warn!(user = %username, error = %e, "subscription check failed");
                write_simple(&mut ctx.writer, &SiteError::from(e).to_response()).await?;
            }
        }
        Ok(())
    }
}

/// Handler for the EXTEND command.
pub struct ExtendHandler;

impl CommandHandler for ExtendHandler {
    async fn handle<R, W>(ctx: &mut HandlerContext<R, W>, args: &[String]) -> HandlerResult
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        if !ctx.session.is_authenticated() {
            write_simple(&mut ctx.writer, RESP_480_LOGIN_REQ).await?;
            return Ok(());
        }
        if !ctx.session.is_operator() {
            write_simple(&mut ctx.writer, RESP_440_OPERATOR_REQ).await?;
            return Ok(());
        }
        let Some(username) = args.first() else {
            write_simple(&mut ctx.writer, RESP_501_NOT_ENOUGH).await?;
            return Ok(());
        };
        let days = match args.get(1) {
            Some(raw) => match raw.parse::<i64>() {
                Ok(n) => n,
                Err(_) => {
                    write_simple(&mut ctx.writer, RESP_501_SYNTAX).await?;
                    return Ok(());
                }
            },
            None => ctx.config.read().await.default_extension_days,
        };

        match ctx.ledger.extend_subscription(username, days).await {
            Ok(new_expiry) => {
                write_simple(
                    &mut ctx.writer,
                    &format!("{RESP_251_EXTENDED} {username} active until {new_expiry}\r\n"),
                )
                .await?;
            }
            Err(e @ LedgerError::NoSuchAccount(_)) => {
                write_simple(&mut ctx.writer, &SiteError::from(e).to_response()).await?;
            }
            Err(e) => {
                tracing::warn!(user = %username, error = %e, "extension failed");
                write_simple(&mut ctx.writer, &SiteError::from(e).to_response()).await?;
            }
        }
        Ok(())
    }
}

/// Handler for the ACCOUNTS command.
pub struct AccountsHandler;

impl CommandHandler for AccountsHandler {
    async fn handle<R, W>(ctx: &mut HandlerContext<R, W>, _args: &[String]) -> HandlerResult
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        if !ctx.session.is_authenticated() {
            write_simple(&mut ctx.writer, RESP_480_LOGIN_REQ).await?;
            return Ok(());
        }
        if !ctx.session.is_operator() {
            write_simple(&mut ctx.writer, RESP_440_OPERATOR_REQ).await?;
            return Ok(());
        }

        match ctx.ledger.list_accounts().await {
            Ok(accounts) => {
                write_simple(&mut ctx.writer, RESP_215_ACCOUNTS_FOLLOW).await?;
                for account in accounts {
                    let line = format!("{} {}\r\n", account.username, account.expiry);
                    ctx.writer.write_all(line.as_bytes()).await?;
                }
                ctx.writer.write_all(RESP_DOT_CRLF.as_bytes()).await?;
            }
            Err(e) => {
                tracing::warn!(error = %e, "account listing failed");
                write_simple(&mut ctx.writer, &SiteError::from(e).to_response()).await?;
            }
        }
        Ok(())
    }
}
