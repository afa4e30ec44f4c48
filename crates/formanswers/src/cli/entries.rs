//! `submit`, `list` and `show`.

use anyhow::{Context, Result};
use formanswers::{Answers, NewSubmission, PageScope, SubmissionId};
use serde_json::json;
use std::io::Read;

use super::context::CliContext;
use super::error::HelpfulError;
use super::output::{format_timestamp, print_json, print_table};
use super::table_cell;

pub struct SubmitArgs {
    pub scope: i64,
    pub form: String,
    /// JSON object, or `-` to read it from stdin.
    pub answers: String,
    pub json: bool,
}

pub async fn submit(ctx: &CliContext, args: SubmitArgs) -> Result<()> {
    let raw = if args.answers == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read answers from stdin")?;
        buf
    } else {
        args.answers
    };
    let answers = Answers::from_json(&raw).map_err(|e| HelpfulError::invalid_answers(e))?;

    let manager = ctx.manager().await?;
    let id = manager
        .submit(NewSubmission::new(PageScope::new(args.scope), args.form.clone(), answers))
        .await?;
    let stored = manager.show(id).await?;

    if args.json {
        return print_json(&json!({
            "id": id,
            "submitUid": stored.as_ref().map(|s| s.submit_uid),
            "fieldFingerprint": stored.as_ref().map(|s| s.field_fingerprint().as_str()),
        }));
    }

    match stored {
        Some(entry) => println!(
            "Stored submission {} ({} #{} in scope {})",
            id, entry.form_name, entry.submit_uid, entry.page_scope
        ),
        None => println!("Stored submission {}", id),
    }
    Ok(())
}

pub async fn list(ctx: &CliContext, json: bool) -> Result<()> {
    let manager = ctx.manager().await?;
    let overview = manager.overview().await?;

    if json {
        return print_json(&overview);
    }
    if overview.is_empty() {
        println!("No submissions stored.");
        return Ok(());
    }

    let rows = overview
        .iter()
        .map(|summary| {
            vec![
                summary.page_scope.to_string(),
                summary.form_name.clone(),
                summary.active.to_string(),
                summary.exported.to_string(),
                summary.pending().to_string(),
                summary.deleted.to_string(),
            ]
        })
        .collect();
    print_table(
        &["SCOPE", "FORM", "ACTIVE", "EXPORTED", "PENDING", "DELETED"],
        rows,
    );
    Ok(())
}

pub async fn show(ctx: &CliContext, id: i64, json: bool) -> Result<()> {
    let manager = ctx.manager().await?;
    let entry = manager
        .show(SubmissionId::new(id))
        .await?
        .ok_or_else(|| HelpfulError::submission_not_found(id))?;

    if json {
        return print_json(&entry);
    }

    println!("Submission {}", entry.id);
    println!("  Form:        {} #{}", entry.form_name, entry.submit_uid);
    println!("  Scope:       {}", entry.page_scope);
    println!("  Created:     {}", format_timestamp(&entry.created_at));
    println!("  Fingerprint: {}", entry.field_fingerprint());
    println!(
        "  State:       {}{}",
        if entry.exported { "exported" } else { "pending" },
        if entry.deleted { ", deleted" } else { "" }
    );
    println!();

    if entry.answers().is_empty() {
        println!("(no answers)");
        return Ok(());
    }
    let rows = entry
        .answers()
        .iter()
        .map(|(field, value)| vec![field.to_string(), table_cell(value)])
        .collect();
    print_table(&["FIELD", "VALUE"], rows);
    Ok(())
}
