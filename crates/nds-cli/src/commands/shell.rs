//! Interactive session over one page controller.
//!
//! # Design
//! - The list is loaded once on entry; later commands work on the in-memory
//!   collection and only `refresh` reloads it.
//! - Action failures are printed and the session continues.
//! - Form prompts show the current value as the default; an empty answer keeps
//!   it, `-` clears it, and `:cancel` (or end of input) abandons the form.

use std::fmt::Display;
use std::io::Write;

use anyhow::anyhow;
use clap::{Parser, Subcommand};
use nds_api_models::RecordId;
use nds_core::{
    NdsApi, PageController, PageError, PageResult, RecordFilter, RowAction, available_actions,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

use crate::cli::OutputFormat;
use crate::client::{AppContext, CliError, CliResult};
use crate::commands::records::refusal;
use crate::output::format_records_table;

const PROMPT: &str = "nds> ";
const CANCEL: &str = ":cancel";
const CLEAR: &str = "-";
const HELP: &str = "\
Commands:
  ls                 show records matching the current filter
  filter <mode>      switch filter: all, active, deleted
  refresh            reload records from the server
  create             add a record (prompts for fields)
  edit <id>          change an active record (prompts for fields)
  delete <id>        mark a record as deleted
  restore <id>       clear a record's deleted marker
  purge <id>         permanently remove a deleted record
  help               show this text
  quit               leave the shell
In forms: Enter keeps the shown value, '-' clears it, ':cancel' aborts.";

pub(crate) async fn handle_shell(ctx: &AppContext) -> CliResult<()> {
    let page = ctx.page()?;
    let input = BufReader::new(tokio::io::stdin());
    let mut shell = Shell::new(page, input, std::io::stdout(), ctx.output);
    shell.run().await
}

#[derive(Parser)]
#[command(
    no_binary_name = true,
    disable_help_flag = true,
    disable_help_subcommand = true
)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand)]
enum ShellCommand {
    Ls,
    Filter { mode: RecordFilter },
    Refresh,
    Create,
    Edit { id: String },
    Delete { id: String },
    Restore { id: String },
    Purge { id: String },
    Help,
    #[command(alias = "exit")]
    Quit,
}

enum Flow {
    Continue,
    Quit,
}

pub(crate) struct Shell<A, R, W> {
    page: PageController<A>,
    lines: Lines<R>,
    out: W,
    output: OutputFormat,
}

impl<A, R, W> Shell<A, R, W>
where
    A: NdsApi,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub(crate) fn new(page: PageController<A>, input: R, out: W, output: OutputFormat) -> Self {
        Self {
            page,
            lines: input.lines(),
            out,
            output,
        }
    }

    pub(crate) async fn run(&mut self) -> CliResult<()> {
        let loaded = self.page.activate().await;
        self.report(loaded, None)?;
        self.show_list()?;

        loop {
            self.write(PROMPT)?;
            let Some(line) = self.read_line().await? else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }
            let command = match ShellLine::try_parse_from(line.split_whitespace()) {
                Ok(parsed) => parsed.command,
                Err(err) => {
                    self.say(err.render())?;
                    continue;
                }
            };
            if matches!(self.execute(command).await?, Flow::Quit) {
                break;
            }
        }
        Ok(())
    }

    async fn execute(&mut self, command: ShellCommand) -> CliResult<Flow> {
        match command {
            ShellCommand::Ls => self.show_list()?,
            ShellCommand::Filter { mode } => {
                self.page.set_filter(mode);
                self.show_list()?;
            }
            ShellCommand::Refresh => {
                let result = self.page.refresh().await;
                if self.report(result, Some("Records reloaded."))? {
                    self.show_list()?;
                }
            }
            ShellCommand::Create => {
                self.page.open_create_form();
                self.fill_form().await?;
            }
            ShellCommand::Edit { id } => {
                let id = RecordId::from(id);
                if self.allowed(&id, RowAction::Edit)? {
                    let opened = self.page.open_edit_form(&id);
                    if self.report(opened, None)? {
                        self.fill_form().await?;
                    }
                }
            }
            ShellCommand::Delete { id } => {
                self.toggle(RecordId::from(id), RowAction::SoftDelete).await?;
            }
            ShellCommand::Restore { id } => {
                self.toggle(RecordId::from(id), RowAction::Restore).await?;
            }
            ShellCommand::Purge { id } => {
                let id = RecordId::from(id);
                let result = self.page.hard_delete(&id).await;
                self.report(result, Some(&format!("Record {id} removed.")))?;
            }
            ShellCommand::Help => self.say(HELP)?,
            ShellCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    async fn toggle(&mut self, id: RecordId, action: RowAction) -> CliResult<()> {
        if !self.allowed(&id, action)? {
            return Ok(());
        }
        let result = self.page.toggle_deleted(&id).await;
        let done = match action {
            RowAction::Restore => format!("Record {id} restored."),
            _ => format!("Record {id} deleted."),
        };
        self.report(result, Some(&done))?;
        Ok(())
    }

    /// Whether `action` is offered for `id`; prints the refusal otherwise.
    fn allowed(&mut self, id: &RecordId, action: RowAction) -> CliResult<bool> {
        let message = match self.page.record(id) {
            None => format!("Record {id} is not in the list."),
            Some(record) if available_actions(record).contains(&action) => return Ok(true),
            Some(_) => refusal(id, action),
        };
        self.say(format_args!("error: {message}"))?;
        Ok(false)
    }

    async fn fill_form(&mut self) -> CliResult<()> {
        while let Some(form) = self.page.form() {
            let title = if form.is_edit() { "Edit record" } else { "New record" };
            let current = [
                form.name().to_string(),
                form.description().to_string(),
                form.rate().to_string(),
            ];
            self.say(title)?;

            let mut answers = Vec::with_capacity(current.len());
            for (label, value) in ["Name", "Description", "Rate (%)"].into_iter().zip(current) {
                match self.ask(label, value).await? {
                    Some(answer) => answers.push(answer),
                    None => {
                        self.page.cancel_form();
                        return self.say("Cancelled.");
                    }
                }
            }

            if let (Some(form), [name, description, rate]) =
                (self.page.form_mut(), answers.as_slice())
            {
                form.set_name(name.as_str());
                form.set_description(description.as_str());
                form.set_rate(rate.as_str());
            }

            match self.page.submit_form().await {
                Ok(()) => {
                    self.say("Saved.")?;
                    return self.show_list();
                }
                Err(PageError::Validation(_)) => {
                    let message = self
                        .page
                        .form()
                        .and_then(|form| form.error())
                        .map(ToString::to_string)
                        .unwrap_or_default();
                    self.say(format_args!("error: {message}"))?;
                }
                Err(err) => {
                    let message = self.failure_text(&err);
                    self.say(format_args!("error: {message}"))?;
                }
            }
        }
        Ok(())
    }

    /// Prompt for one field. `None` means the form should be abandoned.
    async fn ask(&mut self, label: &str, current: String) -> CliResult<Option<String>> {
        if current.is_empty() {
            self.write(&format!("{label}: "))?;
        } else {
            self.write(&format!("{label} [{current}]: "))?;
        }
        let Some(line) = self.read_line().await? else {
            return Ok(None);
        };
        let answer = line.trim();
        Ok(match answer {
            CANCEL => None,
            "" => Some(current),
            CLEAR => Some(String::new()),
            other => Some(other.to_string()),
        })
    }

    /// Print the outcome of an action; returns whether it succeeded.
    fn report(&mut self, result: PageResult<()>, success: Option<&str>) -> CliResult<bool> {
        match result {
            Ok(()) => {
                if let Some(message) = success {
                    self.say(message)?;
                }
                Ok(true)
            }
            Err(err) => {
                let message = self.failure_text(&err);
                self.say(format_args!("error: {message}"))?;
                Ok(false)
            }
        }
    }

    fn failure_text(&self, err: &PageError) -> String {
        self.page
            .error_message()
            .map_or_else(|| err.to_string(), str::to_string)
    }

    fn show_list(&mut self) -> CliResult<()> {
        let filter = self.page.filter();
        let visible = self.page.visible_records();
        let text = match self.output {
            OutputFormat::Table => format_records_table(&visible),
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(&visible)
                    .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
                format!("{json}\n")
            }
        };
        if filter != RecordFilter::All {
            self.say(format_args!("filter: {filter}"))?;
        }
        self.write(&text)
    }

    async fn read_line(&mut self) -> CliResult<Option<String>> {
        self.lines
            .next_line()
            .await
            .map_err(|err| CliError::failure(anyhow!("failed to read input: {err}")))
    }

    fn say(&mut self, message: impl Display) -> CliResult<()> {
        writeln!(self.out, "{message}")
            .map_err(|err| CliError::failure(anyhow!("failed to write output: {err}")))
    }

    fn write(&mut self, text: &str) -> CliResult<()> {
        self.out
            .write_all(text.as_bytes())
            .and_then(|()| self.out.flush())
            .map_err(|err| CliError::failure(anyhow!("failed to write output: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use nds_test_support::fixtures::{active_record, deleted_record, ids};
    use nds_test_support::mocks::{ApiCall, CallKind, ScriptedApi};

    fn two_records() -> ScriptedApi {
        ScriptedApi::with_records(vec![active_record("a", 20.0), deleted_record("b", 10.0)])
    }

    async fn run_script(
        api: ScriptedApi,
        script: &'static str,
    ) -> Result<(PageController<ScriptedApi>, String)> {
        let mut shell = Shell::new(
            PageController::new(api),
            script.as_bytes(),
            Vec::new(),
            OutputFormat::Table,
        );
        shell.run().await?;
        Ok((shell.page, String::from_utf8(shell.out)?))
    }

    #[tokio::test]
    async fn filter_narrows_the_loaded_list() -> Result<()> {
        let (page, output) = run_script(two_records(), "filter deleted\nls\nquit\n").await?;
        assert!(output.contains("filter: deleted"));
        assert!(output.contains("15.01.2024, 09:30"));
        assert_eq!(ids(page.visible_records()), vec!["b"]);
        assert_eq!(page.api().calls(), vec![ApiCall::List]);
        Ok(())
    }

    #[tokio::test]
    async fn create_prompts_and_prepends() -> Result<()> {
        let (page, output) = run_script(two_records(), "create\nReduced\n\n7.5\nquit\n").await?;
        assert!(output.contains("New record"));
        assert!(output.contains("Saved."));
        let created = &page.records()[0];
        assert_eq!(created.name.as_deref(), Some("Reduced"));
        assert!(created.description.is_none());
        assert!((created.value - 7.5).abs() < f64::EPSILON);
        Ok(())
    }

    #[tokio::test]
    async fn invalid_rate_keeps_the_form_until_cancelled() -> Result<()> {
        let (page, output) =
            run_script(two_records(), "create\nBroken\n\nabc\n\n\n:cancel\nquit\n").await?;
        assert!(output.contains("error: Enter a valid non-negative number"));
        assert!(output.contains("Rate (%) [abc]: "));
        assert!(output.contains("Cancelled."));
        assert!(page.form().is_none());
        assert_eq!(page.api().mutation_count(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn edit_keeps_defaults_and_clears_with_dash() -> Result<()> {
        let (page, output) = run_script(two_records(), "edit a\n\n-\n21\nquit\n").await?;
        assert!(output.contains("Name [Rate a]: "));

        let calls = page.api().calls();
        let Some(ApiCall::Update(id, sent)) = calls.last() else {
            panic!("expected an update call, got {calls:?}");
        };
        assert_eq!(id.as_str(), "a");
        assert_eq!(sent.name.as_deref(), Some("Rate a"));
        assert!(sent.description.is_none());
        assert!((sent.value - 21.0).abs() < f64::EPSILON);
        assert!(page.records()[0].description.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn purge_requires_a_prior_delete() -> Result<()> {
        let (page, output) =
            run_script(two_records(), "purge a\ndelete a\npurge a\nquit\n").await?;
        assert!(output.contains("must be deleted before it can be removed permanently"));
        assert!(output.contains("Record a deleted."));
        assert!(output.contains("Record a removed."));
        assert_eq!(ids(page.records()), vec!["b"]);
        Ok(())
    }

    #[tokio::test]
    async fn bad_input_keeps_the_session_alive() -> Result<()> {
        let (page, output) = run_script(two_records(), "bogus\nedit b\nrestore a\nhelp\n").await?;
        assert!(output.contains("bogus"));
        assert!(output.contains("restore it before editing"));
        assert!(output.contains("Record a is not deleted."));
        assert!(output.contains("Commands:"));
        assert_eq!(page.api().mutation_count(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn remote_failures_are_printed() -> Result<()> {
        let api = two_records();
        api.fail_next_with_status(CallKind::Update, 500, Some("Server down"));
        let (page, output) = run_script(api, "delete a\nquit\n").await?;
        assert!(output.contains("error: Server down"));
        assert!(!page.records()[0].is_deleted());
        Ok(())
    }
}
