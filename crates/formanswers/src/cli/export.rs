//! `export`: render a demand to a file, then flag the rows as exported.

use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;
use formanswers::{Demand, FieldFingerprint, MarkingStatus, OutputFormat, PageScope};
use formanswers_sinks::write_export;
use serde_json::json;
use std::path::PathBuf;

use super::context::CliContext;
use super::output::{format_size, print_json};

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Page scope to export from
    #[arg(long)]
    pub scope: i64,

    /// Restrict to a form (repeatable)
    #[arg(long = "form")]
    pub forms: Vec<String>,

    /// Restrict to a field fingerprint (repeatable)
    #[arg(long = "fingerprint")]
    pub fingerprints: Vec<FieldFingerprint>,

    /// First day to include (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Only entries exported before
    #[arg(long)]
    pub exported_only: bool,

    /// Include soft-deleted entries
    #[arg(long)]
    pub include_deleted: bool,

    /// csv, xlsx or xml
    #[arg(long, default_value = "csv")]
    pub format: OutputFormat,

    /// Base name of the written file
    #[arg(long)]
    pub file_name: Option<String>,

    /// Output charset for csv and xml (utf-8, iso-8859-1, windows-1252, us-ascii)
    #[arg(long)]
    pub charset: Option<String>,

    /// Directory to write into
    #[arg(short, long, default_value = ".")]
    pub out: PathBuf,

    /// Output summary as JSON
    #[arg(long)]
    pub json: bool,
}

impl ExportArgs {
    pub fn demand(&self) -> Demand {
        let mut demand = Demand::new(PageScope::new(self.scope), self.format)
            .with_date_range(self.from, self.to)
            .exported_only(self.exported_only)
            .include_deleted(self.include_deleted);
        for form in &self.forms {
            demand = demand.with_form(form.clone());
        }
        for fingerprint in &self.fingerprints {
            demand = demand.with_fingerprint(fingerprint.clone());
        }
        if let Some(name) = &self.file_name {
            demand = demand.with_file_name(name.clone());
        }
        if let Some(charset) = &self.charset {
            demand = demand.with_charset(charset.clone());
        }
        demand
    }
}

pub async fn run(ctx: &CliContext, args: ExportArgs) -> Result<()> {
    let demand = args.demand();
    let manager = ctx.manager().await?;
    let pending = manager.prepare_export(&demand).await?;

    // Rows are flagged only once the file is in place.
    let path = write_export(&args.out, &pending.export)?;
    let outcome = manager.mark_delivered(pending).await;
    let entries = outcome.submission_ids.len();

    if args.json {
        let (marked, marking_error) = match &outcome.marking {
            MarkingStatus::Marked(n) => (Some(*n), None),
            MarkingStatus::Failed(reason) => (None, Some(reason.as_str())),
        };
        return print_json(&json!({
            "path": path,
            "format": demand.output_format.as_str(),
            "charset": outcome.export.charset,
            "bytes": outcome.export.bytes.len(),
            "entries": entries,
            "marked": marked,
            "markingError": marking_error,
        }));
    }

    println!(
        "Exported {} entr{} to {} ({}, {})",
        entries,
        if entries == 1 { "y" } else { "ies" },
        path.display(),
        outcome.export.charset,
        format_size(outcome.export.bytes.len() as u64)
    );
    if let MarkingStatus::Failed(reason) = &outcome.marking {
        eprintln!(
            "WARNING: The file was written but the entries were not marked as exported: {}",
            reason
        );
        eprintln!("They will be selected again by the next export.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: ExportArgs,
    }

    #[test]
    fn test_args_build_demand() {
        let wrapper = Wrapper::parse_from([
            "export",
            "--scope",
            "7",
            "--form",
            "contact",
            "--form",
            "survey",
            "--from",
            "2024-01-01",
            "--format",
            "xml",
            "--charset",
            "utf-8",
            "--exported-only",
        ]);
        let demand = wrapper.args.demand();

        assert_eq!(demand.page_scope, PageScope::new(7));
        assert_eq!(demand.form_names.len(), 2);
        assert_eq!(demand.output_format, OutputFormat::MarkupXml);
        assert_eq!(demand.date_from, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(demand.date_to, None);
        assert!(demand.exported_only);
        assert!(!demand.include_deleted);
        assert_eq!(demand.charset, "utf-8");
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        assert!(Wrapper::try_parse_from(["export", "--scope", "1", "--format", "pdf"]).is_err());
    }
}
