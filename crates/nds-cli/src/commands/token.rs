use nds_core::NdsApi;

use crate::cli::TokenSetArgs;
use crate::client::{AppContext, CliError, CliResult, MISSING_TOKEN_MESSAGE};

pub(crate) async fn handle_token_fetch(ctx: &AppContext) -> CliResult<()> {
    let token = ctx.api.fetch_token().await?;
    ctx.tokens.set(&token)?;
    tracing::info!("token stored");
    println!("{token}");
    Ok(())
}

pub(crate) fn handle_token_set(ctx: &AppContext, args: &TokenSetArgs) -> CliResult<()> {
    ctx.tokens.set(&args.token)?;
    println!("Token stored.");
    Ok(())
}

pub(crate) fn handle_token_show(ctx: &AppContext) -> CliResult<()> {
    let token = ctx
        .tokens
        .get()
        .ok_or_else(|| CliError::validation(MISSING_TOKEN_MESSAGE))?;
    println!("{token}");
    Ok(())
}

pub(crate) fn handle_token_clear(ctx: &AppContext) -> CliResult<()> {
    ctx.tokens.clear()?;
    println!("Token cleared.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{context_with, context_with_token};
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn fetch_stores_the_issued_token() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET).path("/token");
            then.status(200).json_body(json!({"token": "fresh"}));
        });

        let ctx = context_with(&server, None);
        handle_token_fetch(&ctx)
            .await
            .expect("token fetch should succeed");
        mock.assert();
        assert_eq!(ctx.tokens.get().as_deref(), Some("fresh"));
    }

    #[tokio::test]
    async fn failed_fetch_keeps_previous_token() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/token");
            then.status(503).json_body(json!({"message": "Maintenance"}));
        });

        let ctx = context_with_token(&server);
        let err = handle_token_fetch(&ctx)
            .await
            .expect_err("fetch should fail");
        assert_eq!(err.exit_code(), 3);
        assert!(err.display_message().starts_with("Maintenance"));
        assert_eq!(ctx.tokens.get().as_deref(), Some("test-token"));
    }

    #[test]
    fn empty_token_is_rejected() {
        let server = MockServer::start();
        let ctx = context_with(&server, None);
        let err = handle_token_set(
            &ctx,
            &TokenSetArgs {
                token: String::new(),
            },
        )
        .expect_err("empty token should fail");
        assert!(matches!(err, CliError::Validation(_)));
        assert!(!ctx.tokens.has_token());
    }

    #[test]
    fn show_and_clear_follow_the_store() {
        let server = MockServer::start();
        let ctx = context_with_token(&server);
        handle_token_show(&ctx).expect("token present");

        handle_token_clear(&ctx).expect("clear succeeds");
        let err = handle_token_show(&ctx).expect_err("token gone");
        assert_eq!(err.exit_code(), 2);
        handle_token_clear(&ctx).expect("clearing twice is fine");
    }
}
