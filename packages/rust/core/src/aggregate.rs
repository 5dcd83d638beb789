//! Tidy aggregate tables over the cleaned category tables.
//!
//! Two groupings are produced, each as a count table and a summed-value
//! table:
//! - by category: a dense `(year, category)` grid, zero-filled
//! - by procurement kind: observed `(year, kind)` pairs across all categories

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use tenderstat_shared::{AggregateRow, Category, CleanedRecord, CountRow, PipelinePolicy, ValueRow};

/// Cleaned rows for each category.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryTables {
    pub tender: Vec<CleanedRecord>,
    pub non_tender: Vec<CleanedRecord>,
    pub pencatatan: Vec<CleanedRecord>,
}

impl CategoryTables {
    /// The table for one category.
    pub fn get(&self, category: Category) -> &[CleanedRecord] {
        match category {
            Category::Tender => &self.tender,
            Category::NonTender => &self.non_tender,
            Category::Pencatatan => &self.pencatatan,
        }
    }

    /// True when all three tables are empty.
    pub fn is_empty(&self) -> bool {
        Category::ALL.iter().all(|c| self.get(*c).is_empty())
    }

    /// All rows, category by category.
    pub fn iter(&self) -> impl Iterator<Item = &CleanedRecord> {
        Category::ALL.into_iter().flat_map(move |c| self.get(c).iter())
    }

    /// Total number of rows.
    pub fn len(&self) -> usize {
        Category::ALL.iter().map(|c| self.get(*c).len()).sum()
    }
}

/// The four aggregate tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Aggregates {
    pub counts_by_category: Vec<CountRow>,
    pub values_by_category: Vec<ValueRow>,
    pub counts_by_kind: Vec<CountRow>,
    pub values_by_kind: Vec<ValueRow>,
}

impl Aggregates {
    pub fn is_empty(&self) -> bool {
        self.counts_by_category.is_empty()
            && self.values_by_category.is_empty()
            && self.counts_by_kind.is_empty()
            && self.values_by_kind.is_empty()
    }
}

/// Running count and sum for one cell.
#[derive(Debug, Default, Clone, Copy)]
struct Cell {
    count: u64,
    total: f64,
}

impl Cell {
    fn add(&mut self, value: f64) {
        self.count += 1;
        self.total += value;
    }
}

/// Compute all four tables.
///
/// Rows are ordered by year, then by category (in [`Category::ALL`] order)
/// or by kind (lexicographically). Rows without a procurement kind are left
/// out of the by-kind tables.
pub fn aggregate(tables: &CategoryTables, policy: &PipelinePolicy) -> Aggregates {
    let (counts_by_category, values_by_category) = by_category(tables, policy);
    let (counts_by_kind, values_by_kind) = by_kind(tables);

    Aggregates {
        counts_by_category,
        values_by_category,
        counts_by_kind,
        values_by_kind,
    }
}

fn by_category(tables: &CategoryTables, policy: &PipelinePolicy) -> (Vec<CountRow>, Vec<ValueRow>) {
    let columns: Vec<Category> = Category::ALL
        .into_iter()
        .filter(|c| policy.zero_fill_empty_categories || !tables.get(*c).is_empty())
        .collect();

    let years: BTreeSet<i32> = tables.iter().map(|r| r.year).collect();

    let mut cells: BTreeMap<(i32, Category), Cell> = BTreeMap::new();
    for row in tables.iter() {
        cells.entry((row.year, row.category)).or_default().add(row.value);
    }

    let mut counts = Vec::with_capacity(years.len() * columns.len());
    let mut values = Vec::with_capacity(years.len() * columns.len());

    for &year in &years {
        for &category in &columns {
            let cell = cells.get(&(year, category)).copied().unwrap_or_default();
            let group = policy.labels.get(category).to_string();
            counts.push(AggregateRow {
                year,
                group: group.clone(),
                metric: cell.count,
            });
            values.push(AggregateRow {
                year,
                group,
                metric: cell.total,
            });
        }
    }

    (counts, values)
}

fn by_kind(tables: &CategoryTables) -> (Vec<CountRow>, Vec<ValueRow>) {
    let mut cells: BTreeMap<(i32, &str), Cell> = BTreeMap::new();
    for row in tables.iter() {
        if let Some(kind) = row.procurement_kind.as_deref() {
            cells.entry((row.year, kind)).or_default().add(row.value);
        }
    }

    cells
        .into_iter()
        .map(|((year, kind), cell)| {
            (
                AggregateRow {
                    year,
                    group: kind.to_string(),
                    metric: cell.count,
                },
                AggregateRow {
                    year,
                    group: kind.to_string(),
                    metric: cell.total,
                },
            )
        })
        .unzip()
}
