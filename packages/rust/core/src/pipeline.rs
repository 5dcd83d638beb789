//! End-to-end pipeline: raw records → classify → clean → resolve → aggregate.
//!
//! Every entry point is a pure function of its inputs. All degradation
//! (bad currency, missing years, unknown types, rejected elements) is
//! recorded in [`RunReport`] rather than surfaced as an error.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use tenderstat_shared::{
    Category, PipelinePolicy, RawRecord, RecordId, Result, parse_records,
};

use crate::aggregate::{self, Aggregates, CategoryTables};
use crate::classify;
use crate::clean::{self, CleanStats};
use crate::winners;

/// Why a run produced no tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "kebab-case")]
pub enum NoDataReason {
    /// The fetch collaborator failed; carries its error message.
    FetchFailed(String),
    /// The upstream body was not a JSON array.
    NotAList,
    /// The upstream array was empty.
    EmptyInput,
    /// Records arrived but none survived classification and cleaning.
    NothingAfterCleaning,
}

impl std::fmt::Display for NoDataReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FetchFailed(e) => write!(f, "fetch failed: {e}"),
            Self::NotAList => f.write_str("response was not a list of records"),
            Self::EmptyInput => f.write_str("no records returned"),
            Self::NothingAfterCleaning => f.write_str("no records left after cleaning"),
        }
    }
}

/// Counters describing what each stage dropped or produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Records that passed boundary validation.
    pub input_records: usize,
    /// Upstream elements rejected at the boundary.
    pub rejected_elements: usize,
    /// Records with an unrecognized procurement type.
    pub ignored_records: usize,
    /// Rows without a usable budget year.
    pub invalid_year_rows: usize,
    /// Rows before the policy's minimum year.
    pub below_min_year_rows: usize,
    /// Pencatatan winner rows produced by flattening.
    pub winner_rows: usize,
    /// Winner rows whose provider did not match the organization.
    pub unmatched_winner_rows: usize,
    /// Pencatatan ids shared by several parent records.
    pub duplicate_ids: Vec<RecordId>,
    /// Cleaned rows left out of the by-kind tables for lack of a kind.
    pub rows_without_kind: usize,
}

/// Tables produced by a successful run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineResult {
    pub organization: String,
    pub tables: CategoryTables,
    pub aggregates: Aggregates,
    pub report: RunReport,
}

/// Outcome of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum PipelineOutcome {
    NoData { reason: NoDataReason },
    Data(Box<PipelineResult>),
}

impl PipelineOutcome {
    fn no_data(reason: NoDataReason) -> Self {
        Self::NoData { reason }
    }

    /// The result, if the run produced data.
    pub fn data(&self) -> Option<&PipelineResult> {
        match self {
            Self::Data(result) => Some(result),
            Self::NoData { .. } => None,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData { .. })
    }
}

/// Run the pipeline over already-validated records.
#[instrument(skip_all, fields(records = records.len(), organization = %organization))]
pub fn run(records: &[RawRecord], organization: &str, policy: &PipelinePolicy) -> PipelineOutcome {
    if records.is_empty() {
        return PipelineOutcome::no_data(NoDataReason::EmptyInput);
    }
    process(records, 0, organization, policy)
}

/// Run the pipeline over an upstream response body.
///
/// A body that is not an array yields [`NoDataReason::NotAList`]. Elements
/// that fail validation are counted and skipped.
#[instrument(skip_all, fields(organization = %organization))]
pub fn run_json(body: &Value, organization: &str, policy: &PipelinePolicy) -> PipelineOutcome {
    let Some(parsed) = parse_records(body) else {
        debug!("upstream body is not an array");
        return PipelineOutcome::no_data(NoDataReason::NotAList);
    };

    if parsed.records.is_empty() && parsed.rejected.is_empty() {
        return PipelineOutcome::no_data(NoDataReason::EmptyInput);
    }

    process(&parsed.records, parsed.rejected.len(), organization, policy)
}

/// Run the pipeline over the result of a fetch.
///
/// A failed fetch is logged and treated as "no data".
pub fn run_fetched(
    fetched: Result<Value>,
    organization: &str,
    policy: &PipelinePolicy,
) -> PipelineOutcome {
    match fetched {
        Ok(body) => run_json(&body, organization, policy),
        Err(e) => {
            warn!(error = %e, organization, "fetch failed, treating as no data");
            PipelineOutcome::no_data(NoDataReason::FetchFailed(e.to_string()))
        }
    }
}

fn process(
    records: &[RawRecord],
    rejected: usize,
    organization: &str,
    policy: &PipelinePolicy,
) -> PipelineOutcome {
    let mut report = RunReport {
        input_records: records.len(),
        rejected_elements: rejected,
        ..RunReport::default()
    };

    // --- Classify ---
    let classified = classify::classify(records);
    report.ignored_records = classified.ignored.len();

    // --- Clean tender / non-tender ---
    let mut stats = CleanStats::default();
    let tender = clean::clean_priced(&classified.tender, Category::Tender, policy, &mut stats);
    let non_tender =
        clean::clean_priced(&classified.non_tender, Category::NonTender, policy, &mut stats);

    // --- Resolve and clean pencatatan ---
    let resolution = winners::resolve(&classified.pencatatan, organization);
    report.winner_rows = resolution.flattened;
    report.unmatched_winner_rows = resolution.unmatched;
    report.duplicate_ids = resolution.duplicate_ids.clone();
    let pencatatan = clean::clean_resolved(&resolution.rows, policy, &mut stats);

    report.invalid_year_rows = stats.invalid_year;
    report.below_min_year_rows = stats.below_min_year;

    let tables = CategoryTables {
        tender,
        non_tender,
        pencatatan,
    };

    if tables.is_empty() {
        debug!(?report, "every category empty after cleaning");
        return PipelineOutcome::no_data(NoDataReason::NothingAfterCleaning);
    }

    // --- Aggregate ---
    report.rows_without_kind = tables
        .iter()
        .filter(|r| r.procurement_kind.is_none())
        .count();
    let aggregates = aggregate::aggregate(&tables, policy);

    info!(
        tender = tables.tender.len(),
        non_tender = tables.non_tender.len(),
        pencatatan = tables.pencatatan.len(),
        ignored = report.ignored_records,
        rejected = report.rejected_elements,
        "pipeline complete"
    );

    PipelineOutcome::Data(Box::new(PipelineResult {
        organization: organization.to_string(),
        tables,
        aggregates,
        report,
    }))
}
