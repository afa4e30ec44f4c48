//! `forms` and `variants`.

use anyhow::Result;
use formanswers::PageScope;

use super::context::CliContext;
use super::output::{print_json, print_table};

pub async fn forms(ctx: &CliContext, scope: i64, json: bool) -> Result<()> {
    let manager = ctx.manager().await?;
    let names = manager.form_names(PageScope::new(scope)).await?;

    if json {
        return print_json(&names);
    }
    if names.is_empty() {
        println!("No forms with submissions in scope {}.", scope);
        return Ok(());
    }
    let rows = names.into_iter().map(|name| vec![name]).collect();
    print_table(&["FORM"], rows);
    Ok(())
}

/// Distinct field sets a form has been submitted with, across all scopes.
pub async fn variants(ctx: &CliContext, form: &str, json: bool) -> Result<()> {
    let manager = ctx.manager().await?;
    let fingerprints = manager.form_variants(form).await?;

    if json {
        return print_json(&fingerprints);
    }
    if fingerprints.is_empty() {
        println!("Form '{}' has no submissions.", form);
        return Ok(());
    }
    let rows = fingerprints
        .iter()
        .map(|fp| vec![fp.to_string()])
        .collect();
    print_table(&["FIELD FINGERPRINT"], rows);
    println!();
    println!("Export one variant with: formanswers export --scope <scope> --fingerprint <hash>");
    Ok(())
}
