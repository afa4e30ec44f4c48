//! Demand resolution: from a caller's export request to a store query.
//!
//! Pure translation, no I/O. Date bounds are calendar days in UTC; the
//! inclusive `date_to` becomes an exclusive bound at the following midnight.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use formanswers_db::SubmissionQuery;
use formanswers_protocol::{Demand, PageScope};
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidDemand {
    #[error("page scope must be positive, got {0}")]
    PageScope(PageScope),

    #[error("date_from {from} is after date_to {to}")]
    DateRange { from: NaiveDate, to: NaiveDate },

    #[error("date {0} is out of range")]
    DateOutOfRange(NaiveDate),
}

/// Resolve `demand` into the query the store runs.
pub fn resolve(demand: &Demand) -> Result<SubmissionQuery, InvalidDemand> {
    if !demand.page_scope.is_valid() {
        return Err(InvalidDemand::PageScope(demand.page_scope));
    }
    if let (Some(from), Some(to)) = (demand.date_from, demand.date_to) {
        if from > to {
            return Err(InvalidDemand::DateRange { from, to });
        }
    }

    let form_names: BTreeSet<String> = demand
        .form_names
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();

    let created_before = match demand.date_to {
        Some(to) => {
            let next = to.succ_opt().ok_or(InvalidDemand::DateOutOfRange(to))?;
            Some(start_of_day(next))
        }
        None => None,
    };

    Ok(SubmissionQuery {
        page_scope: demand.page_scope,
        form_names: form_names.into_iter().collect(),
        field_fingerprints: demand.field_fingerprints.iter().cloned().collect(),
        created_from: demand.date_from.map(start_of_day),
        created_before,
        exported_only: demand.exported_only,
        include_deleted: demand.include_deleted,
    })
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use formanswers_protocol::{fingerprint, Answers, OutputFormat};

    fn demand(scope: i64) -> Demand {
        Demand::new(PageScope::new(scope), OutputFormat::DelimitedText)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_minimal_demand() {
        let query = resolve(&demand(5)).unwrap();
        assert_eq!(query, SubmissionQuery::for_scope(PageScope::new(5)));
    }

    #[test]
    fn test_rejects_non_positive_scope() {
        assert_eq!(
            resolve(&demand(0)).unwrap_err(),
            InvalidDemand::PageScope(PageScope::new(0))
        );
        assert!(resolve(&demand(-3)).is_err());
    }

    #[test]
    fn test_rejects_inverted_date_range() {
        let err = resolve(&demand(5).with_date_range(Some(date(2024, 3, 2)), Some(date(2024, 3, 1))))
            .unwrap_err();
        assert!(matches!(err, InvalidDemand::DateRange { .. }));
    }

    #[test]
    fn test_same_day_range_is_valid() {
        let day = date(2024, 3, 1);
        let query = resolve(&demand(5).with_date_range(Some(day), Some(day))).unwrap();
        assert_eq!(
            query.created_from,
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(
            query.created_before,
            Some(Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_open_ended_ranges() {
        let query = resolve(&demand(5).with_date_range(None, Some(date(2024, 12, 31)))).unwrap();
        assert_eq!(query.created_from, None);
        assert_eq!(
            query.created_before,
            Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_blank_form_names_are_dropped() {
        let query = resolve(&demand(5).with_form("contact").with_form("  ").with_form(" contact "))
            .unwrap();
        assert_eq!(query.form_names, vec!["contact".to_string()]);
    }

    #[test]
    fn test_flags_and_fingerprints_carry_over() {
        let print = fingerprint(&[("name", "")].into_iter().collect::<Answers>());
        let query = resolve(
            &demand(5)
                .with_fingerprint(print.clone())
                .exported_only(true)
                .include_deleted(true),
        )
        .unwrap();
        assert_eq!(query.field_fingerprints, vec![print]);
        assert!(query.exported_only);
        assert!(query.include_deleted);
    }
}
