//! Plain-text rendering of pipeline outcomes.

use tenderstat_core::{PipelineOutcome, PipelineResult};
use tenderstat_shared::{AggregateRow, Category};

/// Render an outcome as the text report printed by `tenderstat report`.
pub(crate) fn render_outcome(company: &str, outcome: &PipelineOutcome) -> String {
    match outcome {
        PipelineOutcome::NoData { reason } => format!("No data for {company}: {reason}\n"),
        PipelineOutcome::Data(result) => render_result(result),
    }
}

fn render_result(result: &PipelineResult) -> String {
    let sizes: Vec<String> = Category::ALL
        .into_iter()
        .map(|c| format!("{c} {}", result.tables.get(c).len()))
        .collect();

    let report = &result.report;
    let mut out = format!(
        "Procurement statistics for {}\n\nCleaned rows: {}\n",
        result.organization,
        sizes.join(", ")
    );
    out.push_str(&format!(
        "Dropped: {} rejected, {} unknown type, {} invalid year, {} before cutoff, {} unmatched winners\n",
        report.rejected_elements,
        report.ignored_records,
        report.invalid_year_rows,
        report.below_min_year_rows,
        report.unmatched_winner_rows,
    ));

    let aggregates = &result.aggregates;
    let count = |n: &u64| n.to_string();
    out.push_str(&render_table("Entries by category", "Count", &aggregates.counts_by_category, count));
    out.push_str(&render_table("Value by category", "Value", &aggregates.values_by_category, format_value));
    out.push_str(&render_table("Entries by procurement kind", "Count", &aggregates.counts_by_kind, count));
    out.push_str(&render_table("Value by procurement kind", "Value", &aggregates.values_by_kind, format_value));

    out
}

/// One titled table, preceded by a blank line.
fn render_table<M>(
    title: &str,
    metric_header: &str,
    rows: &[AggregateRow<M>],
    format_metric: impl Fn(&M) -> String,
) -> String {
    let mut out = format!("\n{title}\n");

    if rows.is_empty() {
        out.push_str("  (none)\n");
        return out;
    }

    let metrics: Vec<String> = rows.iter().map(|r| format_metric(&r.metric)).collect();
    let group_width = rows
        .iter()
        .map(|r| r.group.chars().count())
        .chain(std::iter::once("Group".len()))
        .max()
        .unwrap_or_default();
    let metric_width = metrics
        .iter()
        .map(String::len)
        .chain(std::iter::once(metric_header.len()))
        .max()
        .unwrap_or_default();

    out.push_str(&format!("  Year  {:<group_width$}  {:>metric_width$}\n", "Group", metric_header));
    for (row, metric) in rows.iter().zip(&metrics) {
        out.push_str(&format!(
            "  {:<4}  {:<group_width$}  {:>metric_width$}\n",
            row.year, row.group, metric
        ));
    }
    out
}

fn format_value(value: &f64) -> String {
    format!("{value:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tenderstat_core::NoDataReason;
    use tenderstat_shared::{PipelinePolicy, RawField, RawRecord};

    fn tender(id: i64, year: &str, kind: &str, price: &str) -> RawRecord {
        let mut record = RawRecord::new(id, "tender");
        record.budget_year_raw = RawField::from(year);
        record.procurement_kind = RawField::from(kind);
        record.negotiated_price_raw = RawField::from(price);
        record
    }

    #[test]
    fn no_data_is_one_line() {
        let outcome = PipelineOutcome::NoData {
            reason: NoDataReason::EmptyInput,
        };
        assert_eq!(render_outcome("acme", &outcome), "No data for acme: no records returned\n");
    }

    #[test]
    fn tables_are_rendered() {
        let records = vec![
            tender(1, "APBD 2021", "Pekerjaan Konstruksi", "Rp. 100.000,00"),
            tender(2, "APBD 2021", "Pekerjaan Konstruksi", "Rp. 100.000,00"),
        ];
        let outcome = tenderstat_core::run(&records, "acme", &PipelinePolicy::default());
        let text = render_outcome("acme", &outcome);

        assert!(text.contains("Cleaned rows: tender 2, non-tender 0, pencatatan 0"));
        assert!(text.contains("Entries by category"));
        assert!(text.contains("  2021  Tender"));
        assert!(text.contains("200000.00"));
        assert!(text.contains("Pekerjaan Konstruksi"));
    }

    #[test]
    fn empty_table_says_none() {
        let rows: Vec<AggregateRow<u64>> = Vec::new();
        assert_eq!(render_table("Entries by category", "Count", &rows, |n| n.to_string()), "\nEntries by category\n  (none)\n");
    }

    #[test]
    fn table_columns_are_aligned() {
        let rows = vec![
            AggregateRow { year: 2021, group: "Tender".to_string(), metric: 2u64 },
            AggregateRow { year: 2022, group: "Non-Tender".to_string(), metric: 10u64 },
        ];
        let text = render_table("Entries", "Count", &rows, |n| n.to_string());
        assert_eq!(
            text,
            "\nEntries\n  Year  Group       Count\n  2021  Tender          2\n  2022  Non-Tender     10\n"
        );
    }
}
