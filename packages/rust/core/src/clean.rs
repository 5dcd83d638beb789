//! Turn classified records into [`CleanedRecord`] rows.
//!
//! Cleaning parses the budget year, drops rows that have none or fall
//! before the policy cutoff, and parses the monetary field that belongs to
//! the row's category.

use tenderstat_shared::{Category, CleanedRecord, PipelinePolicy, RawRecord};

use crate::currency;
use crate::winners::WinnerRow;
use crate::year;

/// Rows dropped while cleaning.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CleanStats {
    /// No 4-digit year could be extracted.
    pub invalid_year: usize,
    /// Year earlier than [`PipelinePolicy::min_year`].
    pub below_min_year: usize,
}

impl CleanStats {
    fn admit(&mut self, year: Option<i32>, policy: &PipelinePolicy) -> Option<i32> {
        match year {
            None => {
                self.invalid_year += 1;
                None
            }
            Some(y) if y < policy.min_year => {
                self.below_min_year += 1;
                None
            }
            Some(y) => Some(y),
        }
    }
}

/// Clean tender or non-tender records, valued by their negotiated price.
pub fn clean_priced(
    records: &[&RawRecord],
    category: Category,
    policy: &PipelinePolicy,
    stats: &mut CleanStats,
) -> Vec<CleanedRecord> {
    records
        .iter()
        .filter_map(|record| {
            let year = stats.admit(year::extract_field(&record.budget_year_raw), policy)?;
            Some(CleanedRecord {
                procurement_kind: kind_of(record),
                procurement_type: record.procurement_type.clone(),
                budget_year_raw: record.budget_year_raw.clone(),
                value_raw: record.negotiated_price_raw.clone(),
                winner_name: record.winners.name().map(str::to_string),
                fields: record.extra.clone(),
                ..CleanedRecord::new(
                    record.id.clone(),
                    category,
                    year,
                    currency::parse_field(&record.negotiated_price_raw),
                )
            })
        })
        .collect()
}

/// Clean resolved pencatatan rows, valued by their realized value.
///
/// The winner's own realized value wins over the parent's.
pub fn clean_resolved(
    rows: &[WinnerRow<'_>],
    policy: &PipelinePolicy,
    stats: &mut CleanStats,
) -> Vec<CleanedRecord> {
    rows.iter()
        .filter_map(|row| {
            let parent = row.parent;
            let year = stats.admit(year::extract_field(&parent.budget_year_raw), policy)?;
            let realized = if row.winner.realized_value_raw.is_missing() {
                &parent.realized_value_raw
            } else {
                &row.winner.realized_value_raw
            };
            Some(CleanedRecord {
                procurement_kind: kind_of(parent),
                procurement_type: parent.procurement_type.clone(),
                budget_year_raw: parent.budget_year_raw.clone(),
                value_raw: realized.clone(),
                winner: Some(row.winner.clone()),
                fields: parent.extra.clone(),
                ..CleanedRecord::new(
                    parent.id.clone(),
                    Category::Pencatatan,
                    year,
                    currency::parse_field(realized),
                )
            })
        })
        .collect()
}

fn kind_of(record: &RawRecord) -> Option<String> {
    record.procurement_kind.non_empty_text().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tenderstat_shared::{Winner, WinnerField};

    fn tender(id: i64, year: &str, price: &str) -> RawRecord {
        let mut record = RawRecord::new(id, "tender");
        record.budget_year_raw = year.into();
        record.negotiated_price_raw = price.into();
        record.procurement_kind = "Pekerjaan Konstruksi".into();
        record
    }

    #[test]
    fn priced_rows_parse_year_and_price() {
        let record = tender(1, "APBD 2021", "Rp. 100.000,00");
        let mut stats = CleanStats::default();
        let rows = clean_priced(&[&record], Category::Tender, &PipelinePolicy::default(), &mut stats);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].year, 2021);
        assert_eq!(rows[0].value, 100000.0);
        assert_eq!(rows[0].category, Category::Tender);
        assert_eq!(rows[0].procurement_kind.as_deref(), Some("Pekerjaan Konstruksi"));
        assert_eq!(stats, CleanStats::default());
    }

    #[test]
    fn priced_rows_keep_raw_texts_and_winner_name() {
        let mut record = tender(1, "APBD 2021", "Rp. 100.000,00");
        record.winners = WinnerField::Name("PT ACME Indonesia".into());
        let mut stats = CleanStats::default();
        let rows = clean_priced(&[&record], Category::Tender, &PipelinePolicy::default(), &mut stats);

        assert_eq!(rows[0].winner_name.as_deref(), Some("PT ACME Indonesia"));
        assert_eq!(rows[0].provider_name(), Some("PT ACME Indonesia"));
        assert_eq!(rows[0].procurement_type.as_text(), Some("tender"));
        assert_eq!(rows[0].budget_year_raw.as_text(), Some("APBD 2021"));
        assert_eq!(rows[0].value_raw.as_text(), Some("Rp. 100.000,00"));
        assert!(rows[0].winner.is_none());
    }

    #[test]
    fn drops_invalid_and_early_years() {
        let records = [
            tender(1, "TA 2019", "Rp. 1,00"),
            tender(2, "N/A", "Rp. 1,00"),
            tender(3, "2020", "Rp. 1,00"),
        ];
        let refs: Vec<&RawRecord> = records.iter().collect();
        let mut stats = CleanStats::default();
        let rows = clean_priced(&refs, Category::Tender, &PipelinePolicy::default(), &mut stats);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].year, 2020);
        assert_eq!(stats.invalid_year, 1);
        assert_eq!(stats.below_min_year, 1);
    }

    #[test]
    fn cutoff_comes_from_policy() {
        let record = tender(1, "2021", "Rp. 1,00");
        let policy = PipelinePolicy {
            min_year: 2022,
            ..PipelinePolicy::default()
        };
        let mut stats = CleanStats::default();
        assert!(clean_priced(&[&record], Category::Tender, &policy, &mut stats).is_empty());
        assert_eq!(stats.below_min_year, 1);
    }

    #[test]
    fn malformed_price_becomes_zero() {
        let record = tender(1, "2021", "gratis");
        let mut stats = CleanStats::default();
        let rows = clean_priced(&[&record], Category::Tender, &PipelinePolicy::default(), &mut stats);
        assert_eq!(rows[0].value, 0.0);
    }

    #[test]
    fn resolved_rows_prefer_winner_realized_value() {
        let mut parent = RawRecord::new("P-1", "pencatatan");
        parent.budget_year_raw = "2023".into();
        parent.realized_value_raw = "Rp. 1.000,00".into();
        parent.extra.insert("instansi".into(), json!("Dinas PU"));
        let with_value = Winner {
            realized_value_raw: "Rp. 40.000,00".into(),
            ..Winner::named("PT ACME")
        };
        let without_value = Winner::named("PT ACME Lain");
        parent.winners = WinnerField::Entries(vec![with_value.clone(), without_value.clone()]);

        let rows = [
            WinnerRow { parent: &parent, winner: &with_value },
            WinnerRow { parent: &parent, winner: &without_value },
        ];
        let mut stats = CleanStats::default();
        let cleaned = clean_resolved(&rows, &PipelinePolicy::default(), &mut stats);
        assert_eq!(cleaned.len(), 2);
        assert_eq!(cleaned[0].value, 40000.0);
        assert_eq!(cleaned[1].value, 1000.0);
        assert_eq!(cleaned[0].value_raw.as_text(), Some("Rp. 40.000,00"));
        assert_eq!(cleaned[1].value_raw.as_text(), Some("Rp. 1.000,00"));
        assert_eq!(cleaned[0].provider_name(), Some("PT ACME"));
        assert_eq!(cleaned[1].fields.get("instansi"), Some(&json!("Dinas PU")));
        assert!(cleaned.iter().all(|r| r.category == Category::Pencatatan));
    }
}
