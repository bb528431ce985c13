//! Argument parsing and command dispatch for the `nds` client.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use nds_config::ClientSettings;
use nds_config::defaults::{DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS};
use nds_config::settings::{default_storage_path, parse_base_url};
use nds_core::RecordFilter;
use nds_telemetry::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, init_logging};
use url::Url;
use uuid::Uuid;

use crate::client::{AppContext, CliResult};
use crate::commands::records::{
    handle_create, handle_edit, handle_list, handle_purge, handle_restore, handle_show,
    handle_soft_delete,
};
use crate::commands::shell::handle_shell;
use crate::commands::token::{
    handle_token_clear, handle_token_fetch, handle_token_set, handle_token_show,
};

/// Parses CLI arguments, installs logging, and executes the requested
/// command. Returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    let command_name = command_label(&cli.command);
    let trace_id = Uuid::new_v4().to_string();

    let logging = LoggingConfig {
        level: DEFAULT_LOG_LEVEL,
        format: cli
            .log_format
            .as_deref()
            .map_or_else(LogFormat::infer, LogFormat::from_name),
        trace_id: &trace_id,
    };
    if let Err(err) = init_logging(&logging) {
        eprintln!("warning: {err:#}");
    }

    match dispatch(cli, &trace_id).await {
        Ok(()) => {
            tracing::debug!(command = command_name, "command completed");
            0
        }
        Err(err) => {
            let exit_code = err.exit_code();
            tracing::debug!(command = command_name, exit_code, "command failed");
            eprintln!("error: {}", err.display_message());
            exit_code
        }
    }
}

async fn dispatch(cli: Cli, trace_id: &str) -> CliResult<()> {
    let storage_path = cli.storage_file.unwrap_or_else(default_storage_path);
    let settings = ClientSettings::new(cli.api_url, cli.timeout, storage_path);
    let ctx = AppContext::from_settings(&settings, trace_id, cli.output)?;

    match cli.command {
        Command::Token(token) => match token {
            TokenCommand::Fetch => handle_token_fetch(&ctx).await,
            TokenCommand::Set(args) => handle_token_set(&ctx, &args),
            TokenCommand::Show => handle_token_show(&ctx),
            TokenCommand::Clear => handle_token_clear(&ctx),
        },
        Command::Ls(args) => handle_list(&ctx, args).await,
        Command::Show(args) => handle_show(&ctx, args).await,
        Command::Create(args) => handle_create(&ctx, args).await,
        Command::Edit(args) => handle_edit(&ctx, args).await,
        Command::Delete(args) => handle_soft_delete(&ctx, args).await,
        Command::Restore(args) => handle_restore(&ctx, args).await,
        Command::Purge(args) => handle_purge(&ctx, args).await,
        Command::Shell => handle_shell(&ctx).await,
    }
}

#[derive(Parser)]
#[command(name = "nds", about = "Administer the NDS (VAT rate) reference table")]
pub(crate) struct Cli {
    #[arg(
        long,
        global = true,
        env = "NDS_API_URL",
        value_parser = parse_url,
        default_value = DEFAULT_API_URL
    )]
    pub(crate) api_url: Url,
    #[arg(
        long,
        global = true,
        env = "NDS_STORAGE_FILE",
        help = "Key/value file holding the API token [default: ~/.config/nds/storage.json]"
    )]
    pub(crate) storage_file: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        env = "NDS_HTTP_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS
    )]
    pub(crate) timeout: u64,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render records"
    )]
    pub(crate) output: OutputFormat,
    #[arg(
        long,
        global = true,
        env = "NDS_LOG_FORMAT",
        value_parser = ["pretty", "json"],
        help = "Log format written to stderr"
    )]
    pub(crate) log_format: Option<String>,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Manage the stored API token.
    #[command(subcommand)]
    Token(TokenCommand),
    /// List records.
    Ls(ListArgs),
    /// Show a single record.
    Show(RecordArgs),
    /// Create a record.
    Create(CreateArgs),
    /// Edit an active record.
    Edit(EditArgs),
    /// Mark a record as deleted.
    Delete(RecordArgs),
    /// Clear a record's deleted marker.
    Restore(RecordArgs),
    /// Permanently remove a deleted record.
    Purge(RecordArgs),
    /// Interactive session over a single loaded list.
    Shell,
}

#[derive(Subcommand)]
pub(crate) enum TokenCommand {
    /// Request a token from the server and store it.
    Fetch,
    /// Store a token obtained elsewhere.
    Set(TokenSetArgs),
    /// Print the stored token.
    Show,
    /// Remove the stored token.
    Clear,
}

#[derive(Args)]
pub(crate) struct TokenSetArgs {
    pub(crate) token: String,
}

#[derive(Args, Default)]
pub(crate) struct ListArgs {
    #[arg(long, default_value_t = RecordFilter::All, help = "all, active, or deleted")]
    pub(crate) filter: RecordFilter,
}

#[derive(Args)]
pub(crate) struct RecordArgs {
    pub(crate) id: String,
}

#[derive(Args)]
pub(crate) struct CreateArgs {
    #[arg(long, help = "Rate in percent, e.g. 20 or 7.5")]
    pub(crate) rate: String,
    #[arg(long)]
    pub(crate) name: Option<String>,
    #[arg(long)]
    pub(crate) description: Option<String>,
}

#[derive(Args)]
pub(crate) struct EditArgs {
    pub(crate) id: String,
    #[arg(long)]
    pub(crate) rate: Option<String>,
    #[arg(long)]
    pub(crate) name: Option<String>,
    #[arg(long)]
    pub(crate) description: Option<String>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}

const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Token(TokenCommand::Fetch) => "token_fetch",
        Command::Token(TokenCommand::Set(_)) => "token_set",
        Command::Token(TokenCommand::Show) => "token_show",
        Command::Token(TokenCommand::Clear) => "token_clear",
        Command::Ls(_) => "ls",
        Command::Show(_) => "show",
        Command::Create(_) => "create",
        Command::Edit(_) => "edit",
        Command::Delete(_) => "delete",
        Command::Restore(_) => "restore",
        Command::Purge(_) => "purge",
        Command::Shell => "shell",
    }
}

fn parse_url(input: &str) -> Result<Url, String> {
    parse_base_url(input).map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("arguments should parse")
    }

    #[test]
    fn defaults_apply_without_flags() {
        let cli = parse(&["nds", "ls"]);
        assert_eq!(cli.api_url.as_str(), "http://127.0.0.1:8080/");
        assert_eq!(cli.timeout, DEFAULT_TIMEOUT_SECS);
        assert_eq!(cli.output, OutputFormat::Table);
        assert!(cli.log_format.is_none());
        assert!(matches!(
            cli.command,
            Command::Ls(ListArgs {
                filter: RecordFilter::All
            })
        ));
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = parse(&[
            "nds",
            "ls",
            "--filter",
            "deleted",
            "--output",
            "json",
            "--api-url",
            "https://nds.example/admin/",
            "--log-format",
            "json",
        ]);
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.api_url.path(), "/admin/");
        assert_eq!(cli.log_format.as_deref(), Some("json"));
        assert!(matches!(
            cli.command,
            Command::Ls(ListArgs {
                filter: RecordFilter::Deleted
            })
        ));
    }

    #[test]
    fn unsupported_url_scheme_is_rejected() {
        assert!(Cli::try_parse_from(["nds", "--api-url", "ftp://nds.example", "ls"]).is_err());
    }

    #[test]
    fn create_keeps_rate_as_text() {
        let cli = parse(&["nds", "create", "--rate", "abc", "--name", "Broken"]);
        let Command::Create(args) = cli.command else {
            panic!("expected create");
        };
        assert_eq!(args.rate, "abc");
        assert_eq!(args.name.as_deref(), Some("Broken"));
        assert!(args.description.is_none());
    }

    #[test]
    fn command_label_matches_variants() {
        assert_eq!(command_label(&Command::Token(TokenCommand::Fetch)), "token_fetch");
        assert_eq!(
            command_label(&Command::Purge(RecordArgs {
                id: "a".to_string()
            })),
            "purge"
        );
        assert_eq!(command_label(&Command::Shell), "shell");
    }
}
