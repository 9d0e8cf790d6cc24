//! Information command handlers (DATE, HELP, QUIT).

use super::utils::write_simple;
use super::{CommandHandler, HandlerContext, HandlerResult};
use crate::responses::*;
use tokio::io::{AsyncBufRead, AsyncWrite};

/// Handler for the DATE command.
pub struct DateHandler;

impl CommandHandler for DateHandler {
    async fn handle<R, W>(ctx: &mut HandlerContext<R, W>, _args: &[String]) -> HandlerResult
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let now = ctx.ledger.clock().wire_stamp();
        write_simple(&mut ctx.writer, &format!("{RESP_111_DATE} {now}\r\n")).await?;
        Ok(())
    }
}

/// Handler for the HELP command.
pub struct HelpHandler;

impl CommandHandler for HelpHandler {
    async fn handle<R, W>(ctx: &mut HandlerContext<R, W>, _args: &[String]) -> HandlerResult
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        write_simple(&mut ctx.writer, RESP_100_HELP_FOLLOWS).await?;
        write_simple(&mut ctx.writer, RESP_HELP_TEXT).await?;
        write_simple(&mut ctx.writer, RESP_DOT_CRLF).await?;
        Ok(())
    }
}

/// Handler for the QUIT command.
pub struct QuitHandler;

impl CommandHandler for QuitHandler {
    async fn handle<R, W>(ctx: &mut HandlerContext<R, W>, _args: &[String]) -> HandlerResult
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        write_simple(&mut ctx.writer, RESP_205_CLOSING).await?;
        // The connection loop closes on any handler error.
        Err(anyhow::anyhow!("client quit"))
    }
}
