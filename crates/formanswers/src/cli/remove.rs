//! `delete-form`, `prepare-remove` and `remove`.

use anyhow::Result;
use formanswers::PageScope;
use serde_json::json;

use super::context::CliContext;
use super::error::HelpfulError;
use super::output::print_json;

/// Soft delete; rows stay until `remove` purges them.
pub async fn delete_form(ctx: &CliContext, form: &str, scope: i64) -> Result<()> {
    let manager = ctx.manager().await?;
    let marked = manager
        .delete_form_variant(form, PageScope::new(scope))
        .await?;
    if marked == 0 {
        println!("No active entries of '{}' in scope {}.", form, scope);
    } else {
        println!(
            "Marked {} entr{} of '{}' in scope {} as deleted.",
            marked,
            if marked == 1 { "y" } else { "ies" },
            form,
            scope
        );
        println!("Run `formanswers remove --scope {} --yes` to purge them.", scope);
    }
    Ok(())
}

pub async fn prepare_remove(ctx: &CliContext, scope: i64, json: bool) -> Result<()> {
    let manager = ctx.manager().await?;
    let pending = manager.pending_purge_count(PageScope::new(scope)).await?;

    if json {
        return print_json(&json!({ "scope": scope, "pending": pending }));
    }
    if pending == 0 {
        println!("Nothing to remove in scope {}.", scope);
    } else {
        println!("{} deleted entries in scope {} can be removed.", pending, scope);
    }
    Ok(())
}

pub async fn remove(ctx: &CliContext, scope: i64, yes: bool) -> Result<()> {
    if !yes {
        return Err(HelpfulError::new("Removing entries cannot be undone")
            .with_context(format!("Scope: {}", scope))
            .with_suggestion(format!("TRY: formanswers prepare-remove --scope {}", scope))
            .with_suggestion(format!("TRY: formanswers remove --scope {} --yes", scope))
            .into());
    }

    let manager = ctx.manager().await?;
    let removed = manager.purge_marked_deleted(PageScope::new(scope)).await?;
    if removed == 0 {
        println!("Nothing to remove in scope {}.", scope);
    } else {
        println!("Removed {} entries from scope {}.", removed, scope);
    }
    Ok(())
}
