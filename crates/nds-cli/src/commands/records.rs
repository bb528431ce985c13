use nds_api_models::{NdsRecord, RecordId};
use nds_client::HttpNdsApi;
use nds_core::{NdsApi, PageController, RowAction, available_actions};

use crate::cli::{CreateArgs, EditArgs, ListArgs, RecordArgs};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::{render_record, render_records};

async fn loaded_page(ctx: &AppContext) -> CliResult<PageController<HttpNdsApi>> {
    let mut page = ctx.page()?;
    page.activate().await?;
    Ok(page)
}

/// Look up a loaded record and check that `action` is offered for it.
fn ensure_action(
    page: &PageController<HttpNdsApi>,
    id: &RecordId,
    action: RowAction,
) -> CliResult<()> {
    let record = loaded_record(page, id)?;
    if available_actions(&record).contains(&action) {
        Ok(())
    } else {
        Err(CliError::validation(refusal(id, action)))
    }
}

/// Why `action` is not offered for an existing record.
pub(crate) fn refusal(id: &RecordId, action: RowAction) -> String {
    match action {
        RowAction::Edit => format!("Record {id} is deleted; restore it before editing."),
        RowAction::SoftDelete => format!("Record {id} is already deleted."),
        RowAction::Restore => format!("Record {id} is not deleted."),
        RowAction::HardDelete => {
            format!("Record {id} must be deleted before it can be removed permanently.")
        }
    }
}

fn loaded_record(page: &PageController<HttpNdsApi>, id: &RecordId) -> CliResult<NdsRecord> {
    page.record(id)
        .cloned()
        .ok_or_else(|| CliError::validation(format!("Record {id} is not in the list.")))
}

pub(crate) async fn handle_list(ctx: &AppContext, args: ListArgs) -> CliResult<()> {
    let mut page = loaded_page(ctx).await?;
    page.set_filter(args.filter);
    render_records(&page.visible_records(), ctx.output)
}

pub(crate) async fn handle_show(ctx: &AppContext, args: RecordArgs) -> CliResult<()> {
    ctx.require_token()?;
    let record = ctx.api.get_record(&RecordId::from(args.id)).await?;
    render_record(&record, ctx.output)
}

pub(crate) async fn handle_create(ctx: &AppContext, args: CreateArgs) -> CliResult<()> {
    let mut page = ctx.page()?;
    page.open_create_form();
    if let Some(form) = page.form_mut() {
        form.set_name(args.name.unwrap_or_default());
        form.set_description(args.description.unwrap_or_default());
        form.set_rate(args.rate);
    }
    page.submit_form().await?;
    let created = page
        .records()
        .first()
        .ok_or_else(|| CliError::failure(anyhow::anyhow!("created record missing from list")))?;
    render_record(created, ctx.output)
}

pub(crate) async fn handle_edit(ctx: &AppContext, args: EditArgs) -> CliResult<()> {
    let mut page = loaded_page(ctx).await?;
    let id = RecordId::from(args.id);
    ensure_action(&page, &id, RowAction::Edit)?;

    page.open_edit_form(&id)?;
    if let Some(form) = page.form_mut() {
        if let Some(name) = args.name {
            form.set_name(name);
        }
        if let Some(description) = args.description {
            form.set_description(description);
        }
        if let Some(rate) = args.rate {
            form.set_rate(rate);
        }
    }
    page.submit_form().await?;
    render_record(&loaded_record(&page, &id)?, ctx.output)
}

pub(crate) async fn handle_soft_delete(ctx: &AppContext, args: RecordArgs) -> CliResult<()> {
    toggle(ctx, RecordId::from(args.id), RowAction::SoftDelete).await
}

pub(crate) async fn handle_restore(ctx: &AppContext, args: RecordArgs) -> CliResult<()> {
    toggle(ctx, RecordId::from(args.id), RowAction::Restore).await
}

async fn toggle(ctx: &AppContext, id: RecordId, action: RowAction) -> CliResult<()> {
    let mut page = loaded_page(ctx).await?;
    ensure_action(&page, &id, action)?;
    page.toggle_deleted(&id).await?;
    render_record(&loaded_record(&page, &id)?, ctx.output)
}

pub(crate) async fn handle_purge(ctx: &AppContext, args: RecordArgs) -> CliResult<()> {
    let mut page = loaded_page(ctx).await?;
    let id = RecordId::from(args.id);
    page.hard_delete(&id).await?;
    println!("Record {id} removed.");
    Ok(())
}
