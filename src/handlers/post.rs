//! Content command handlers.

use super::utils::{read_block, send_body, write_simple};
use super::{CommandHandler, HandlerContext, HandlerResult};
use crate::error::{PostError, SiteError};
use crate::parse::parse_payload;
use crate::posts::Post;
use crate::responses::*;
use tokio::io::{AsyncBufRead, AsyncWrite, AsyncWriteExt};

/// Handler for the LIST command. Teasers only: number, date and title, so a
/// lapsed member can see what they are missing without reading it.
pub struct ListHandler;

impl CommandHandler for ListHandler {
    async fn handle<R, W>(ctx: &mut HandlerContext<R, W>, _args: &[String]) -> HandlerResult
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        if !ctx.session.is_authenticated() {
            write_simple(&mut ctx.writer, RESP_480_LOGIN_REQ).await?;
            return Ok(());
        }

        match ctx.posts.list_all().await {
            Ok(posts) => {
                write_simple(&mut ctx.writer, RESP_215_POSTS_FOLLOW).await?;
                // Newest first: the store hands back append order.
                for (number, post) in posts.iter().rev() {
                    let line = format!("{number} {} | {}\r\n", post.date, post.title);
                    ctx.writer.write_all(line.as_bytes()).await?;
                }
                ctx.writer.write_all(RESP_DOT_CRLF.as_bytes()).await?;
            }
            Err(e) => {
                tracing::warn!(error = %e, "post listing failed");
                let err = SiteError::from(PostError::Backend(e));
                write_simple(&mut ctx.writer, &err.to_response()).await?;
            }
        }
        Ok(())
    }
}

/// Handler for the ARTICLE command. Gated: an active subscription (or the
/// operator) is required to read a full post.
pub struct ArticleHandler;

impl CommandHandler for ArticleHandler {
    async fn handle<R, W>(ctx: &mut HandlerContext<R, W>, args: &[String]) -> HandlerResult
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let Some(username) = ctx.session.username().map(str::to_string) else {
            write_simple(&mut ctx.writer, RESP_480_LOGIN_REQ).await?;
            return Ok(());
        };

        let active = match ctx.ledger.check_subscription(&username).await {
            Ok(status) => status.is_active(),
            // Fail closed: if the ledger cannot answer, the content stays
            // gated.
            Err(e) => {
                tracing::warn!(user = %username, error = %e, "subscription check failed");
                false
            }
        };
        if !active {
            write_simple(&mut ctx.writer, RESP_483_SUBSCRIPTION_REQ).await?;
            return Ok(());
        }

        let Some(number) = args.first().and_then(|a| a.parse::<u64>().ok()) else {
            write_simple(&mut ctx.writer, RESP_501_SYNTAX).await?;
            return Ok(());
        };

        match ctx.posts.get(number).await {
            Ok(Some(post)) => {
                let line = format!("{RESP_220_POST} {number} post follows\r\n");
                ctx.writer.write_all(line.as_bytes()).await?;
                ctx.writer
                    .write_all(format!("Date: {}\r\n", post.date).as_bytes())
                    .await?;
                ctx.writer
                    .write_all(format!("Title: {}\r\n", post.title).as_bytes())
                    .await?;
                for image in &post.image_refs {
                    ctx.writer
                        .write_all(format!("Image: {image}\r\n").as_bytes())
                        .await?;
                }
                ctx.writer.write_all(RESP_CRLF.as_bytes()).await?;
                send_body(&mut ctx.writer, &post.body).await?;
                ctx.writer.write_all(RESP_DOT_CRLF.as_bytes()).await?;
            }
            Ok(None) => {
                let err = SiteError::from(PostError::NoSuchPost(number));
                write_simple(&mut ctx.writer, &err.to_response()).await?;
            }
            Err(e) => {
                tracing::warn!(number, error = %e, "post read failed");
                let err = SiteError::from(PostError::Backend(e));
                write_simple(&mut ctx.writer, &err.to_response()).await?;
            }
        }
        Ok(())
    }
}

/// Handler for the POST command. Operator only; the payload is accepted as
/// given, with no validation beyond parsing.
pub struct PostHandler;

impl CommandHandler for PostHandler {
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

        write_simple(&mut ctx.writer, RESP_340_SEND_POST).await?;

        let raw = read_block(&mut ctx.reader).await?;
        let Ok((_, payload)) = parse_payload(&raw) else {
            write_simple(&mut ctx.writer, RESP_441_POST_FAILED).await?;
            return Ok(());
        };

        let post = Post {
            date: ctx.ledger.clock().post_stamp(),
            title: payload.header("Title").unwrap_or_default().to_string(),
            image_refs: payload.values("Image"),
            body: payload.body,
        };

        match ctx.posts.append(&post).await {
            Ok(number) => {
                tracing::info!(number, title = %post.title, "post published");
                write_simple(&mut ctx.writer, RESP_240_POST_RECEIVED).await?;
            }
            Err(e) => {
                tracing::warn!(error = %e, "post append failed");
                let err = SiteError::from(PostError::Backend(e));
                write_simple(&mut ctx.writer, &err.to_response()).await?;
            }
        }
        Ok(())
    }
}
