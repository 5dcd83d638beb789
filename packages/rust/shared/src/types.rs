//! Core domain types for procurement records and aggregate tables.
//!
//! Upstream records are loosely typed JSON. They are validated once, at the
//! [`RawRecord`] boundary, into explicit variants ([`RawField`],
//! [`RecordId`], [`WinnerField`]) so downstream stages never have to guess
//! what a missing or oddly-typed attribute means.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Wire field names
// ---------------------------------------------------------------------------

/// Accepted keys per attribute, canonical name first. The second name is the
/// one the upstream scraper emits.
const ID_KEYS: &[&str] = &["id"];
const TYPE_KEYS: &[&str] = &["procurementType", "tipePengadaan"];
const YEAR_KEYS: &[&str] = &["budgetYearRaw", "tahunAnggaran"];
const KIND_KEYS: &[&str] = &["procurementKind", "jenisPengadaan"];
const PRICE_KEYS: &[&str] = &["negotiatedPriceRaw", "hargaNegosiasi"];
const REALIZED_KEYS: &[&str] = &["realizedValueRaw", "nilaiRealisasi"];
const WINNERS_KEYS: &[&str] = &["winners", "namaPemenang"];
const PROVIDER_KEYS: &[&str] = &["providerName", "namaPenyedia"];

// ---------------------------------------------------------------------------
// RawField
// ---------------------------------------------------------------------------

/// A loosely-typed scalar attribute as received from upstream.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RawField {
    /// Key absent, or explicitly `null`.
    #[default]
    Missing,
    /// A JSON string.
    Text(String),
    /// Anything else: number, bool, array, object.
    NonText(Value),
}

impl RawField {
    /// The string payload, if this field is a JSON string.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Trimmed, non-empty text.
    pub fn non_empty_text(&self) -> Option<&str> {
        self.as_text().map(str::trim).filter(|s| !s.is_empty())
    }
}

impl From<Value> for RawField {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Missing,
            Value::String(s) => Self::Text(s),
            other => Self::NonText(other),
        }
    }
}

impl From<&str> for RawField {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl Serialize for RawField {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Missing => serializer.serialize_none(),
            Self::Text(s) => serializer.serialize_str(s),
            Self::NonText(v) => v.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for RawField {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Ok(Self::from(Value::deserialize(deserializer)?))
    }
}

// ---------------------------------------------------------------------------
// RecordId
// ---------------------------------------------------------------------------

/// Opaque record identifier. Unique per parent record within one fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl RecordId {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(Self::Int),
            Value::String(s) if !s.trim().is_empty() => Some(Self::Text(s.clone())),
            _ => None,
        }
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// The three mutually exclusive procurement categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Tender,
    NonTender,
    Pencatatan,
}

impl Category {
    /// All categories, in output column order.
    pub const ALL: [Category; 3] = [Self::Tender, Self::NonTender, Self::Pencatatan];

    /// Map a declared `procurementType` to a category.
    ///
    /// Surrounding whitespace and ASCII case are ignored. Anything else
    /// returns `None`.
    pub fn from_type_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.type_tag().eq_ignore_ascii_case(tag))
    }

    /// The upstream `procurementType` value for this category.
    pub fn type_tag(self) -> &'static str {
        match self {
            Self::Tender => "tender",
            Self::NonTender => "non-tender",
            Self::Pencatatan => "pencatatan",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_tag())
    }
}

// ---------------------------------------------------------------------------
// Winner
// ---------------------------------------------------------------------------

/// One nested winner (provider) entry of a `pencatatan` record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Winner {
    #[serde(skip_serializing_if = "RawField::is_missing")]
    pub provider_name: RawField,
    /// Realized value of this realization row, when upstream reports it per winner.
    #[serde(skip_serializing_if = "RawField::is_missing")]
    pub realized_value_raw: RawField,
    /// Every other attribute of the winner object.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Winner {
    /// A winner carrying only a provider name.
    pub fn named(provider_name: &str) -> Self {
        Self {
            provider_name: provider_name.into(),
            ..Self::default()
        }
    }

    fn from_map(mut map: Map<String, Value>) -> Self {
        let provider_name = take_field(&mut map, PROVIDER_KEYS);
        let realized_value_raw = take_field(&mut map, REALIZED_KEYS);
        Self {
            provider_name,
            realized_value_raw,
            extra: map,
        }
    }
}

/// The winners attribute of a record, in whichever shape upstream sent it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WinnerField {
    #[default]
    Absent,
    /// A single flat winner name (tender/non-tender rows).
    Name(String),
    /// Nested winner objects (pencatatan rows). Non-object elements are dropped.
    Entries(Vec<Winner>),
}

impl WinnerField {
    /// Nested winner entries; empty unless this is [`WinnerField::Entries`].
    pub fn entries(&self) -> &[Winner] {
        match self {
            Self::Entries(v) => v,
            _ => &[],
        }
    }

    /// The flat winner name; `None` unless this is [`WinnerField::Name`].
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    fn from_value(value: Value) -> Self {
        match value {
            Value::String(s) => Self::Name(s),
            Value::Array(items) => Self::Entries(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::Object(map) => Some(Winner::from_map(map)),
                        _ => None,
                    })
                    .collect(),
            ),
            _ => Self::Absent,
        }
    }
}

// ---------------------------------------------------------------------------
// RawRecord
// ---------------------------------------------------------------------------

/// Why a single upstream element was not accepted as a [`RawRecord`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RejectReason {
    #[error("element is not a JSON object")]
    NotAnObject,
    #[error("record has no id")]
    MissingId,
    #[error("record id {0} is not a string or integer")]
    InvalidId(Value),
}

/// One procurement entry as received from the record source.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
    pub id: RecordId,
    #[serde(skip_serializing_if = "RawField::is_missing")]
    pub procurement_type: RawField,
    #[serde(skip_serializing_if = "RawField::is_missing")]
    pub budget_year_raw: RawField,
    #[serde(skip_serializing_if = "RawField::is_missing")]
    pub procurement_kind: RawField,
    #[serde(skip_serializing_if = "RawField::is_missing")]
    pub negotiated_price_raw: RawField,
    #[serde(skip_serializing_if = "RawField::is_missing")]
    pub realized_value_raw: RawField,
    #[serde(skip_serializing_if = "WinnerField::is_absent")]
    pub winners: WinnerField,
    /// Every other attribute of the upstream object, carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawRecord {
    /// A record with only an id and a declared type; other fields missing.
    pub fn new(id: impl Into<RecordId>, procurement_type: &str) -> Self {
        Self {
            id: id.into(),
            procurement_type: procurement_type.into(),
            budget_year_raw: RawField::Missing,
            procurement_kind: RawField::Missing,
            negotiated_price_raw: RawField::Missing,
            realized_value_raw: RawField::Missing,
            winners: WinnerField::Absent,
            extra: Map::new(),
        }
    }

    /// Validate one upstream JSON element.
    pub fn from_value(value: &Value) -> std::result::Result<Self, RejectReason> {
        let Value::Object(map) = value else {
            return Err(RejectReason::NotAnObject);
        };
        let mut map = map.clone();

        let id = match take_value(&mut map, ID_KEYS) {
            None | Some(Value::Null) => return Err(RejectReason::MissingId),
            Some(v) => RecordId::from_value(&v).ok_or(RejectReason::InvalidId(v))?,
        };

        Ok(Self {
            id,
            procurement_type: take_field(&mut map, TYPE_KEYS),
            budget_year_raw: take_field(&mut map, YEAR_KEYS),
            procurement_kind: take_field(&mut map, KIND_KEYS),
            negotiated_price_raw: take_field(&mut map, PRICE_KEYS),
            realized_value_raw: take_field(&mut map, REALIZED_KEYS),
            winners: take_value(&mut map, WINNERS_KEYS)
                .map(WinnerField::from_value)
                .unwrap_or_default(),
            extra: map,
        })
    }

    /// The declared category, or `None` for an unrecognized type.
    pub fn category(&self) -> Option<Category> {
        self.procurement_type.as_text().and_then(Category::from_type_tag)
    }
}

impl<'de> Deserialize<'de> for RawRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).map_err(serde::de::Error::custom)
    }
}

/// Remove the first present key among `keys` (and any aliases after it).
fn take_value(map: &mut Map<String, Value>, keys: &[&str]) -> Option<Value> {
    let mut found = None;
    for key in keys {
        if let Some(v) = map.remove(*key) {
            found.get_or_insert(v);
        }
    }
    found
}

fn take_field(map: &mut Map<String, Value>, keys: &[&str]) -> RawField {
    take_value(map, keys).map(RawField::from).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Boundary parsing
// ---------------------------------------------------------------------------

/// An upstream element that failed boundary validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedElement {
    /// Position in the upstream array.
    pub index: usize,
    pub reason: String,
}

/// Result of validating an upstream JSON array.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedRecords {
    pub records: Vec<RawRecord>,
    pub rejected: Vec<RejectedElement>,
}

/// Validate an upstream response body.
///
/// Returns `None` when the value is not a JSON array at all. Individual
/// elements that fail validation are collected in
/// [`ParsedRecords::rejected`] instead of failing the whole batch.
pub fn parse_records(value: &Value) -> Option<ParsedRecords> {
    let items = value.as_array()?;
    let mut parsed = ParsedRecords::default();

    for (index, item) in items.iter().enumerate() {
        match RawRecord::from_value(item) {
            Ok(record) => parsed.records.push(record),
            Err(reason) => {
                tracing::warn!(index, %reason, "rejecting upstream element");
                parsed.rejected.push(RejectedElement {
                    index,
                    reason: reason.to_string(),
                });
            }
        }
    }

    Some(parsed)
}

// ---------------------------------------------------------------------------
// CleanedRecord
// ---------------------------------------------------------------------------

/// A record after year extraction, year filtering, and currency parsing.
///
/// The raw texts the parsed columns came from stay on the row for
/// inspection. For [`Category::Pencatatan`] every row corresponds to exactly
/// one winner of its parent record, so several rows may share an `id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanedRecord {
    pub id: RecordId,
    pub category: Category,
    pub year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub procurement_kind: Option<String>,
    /// Negotiated price (tender/non-tender) or realized value (pencatatan).
    pub value: f64,
    #[serde(skip_serializing_if = "RawField::is_missing")]
    pub procurement_type: RawField,
    #[serde(skip_serializing_if = "RawField::is_missing")]
    pub budget_year_raw: RawField,
    /// Monetary text `value` was parsed from.
    #[serde(skip_serializing_if = "RawField::is_missing")]
    pub value_raw: RawField,
    /// Flat winner name of a tender or non-tender record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<Winner>,
    /// Parent attributes without a dedicated column, nested under `fields`.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub fields: Map<String, Value>,
}

impl CleanedRecord {
    /// A row with only its computed columns set.
    pub fn new(id: RecordId, category: Category, year: i32, value: f64) -> Self {
        Self {
            id,
            category,
            year,
            procurement_kind: None,
            value,
            procurement_type: RawField::Missing,
            budget_year_raw: RawField::Missing,
            value_raw: RawField::Missing,
            winner_name: None,
            winner: None,
            fields: Map::new(),
        }
    }

    /// Provider name of the attached winner, or the flat winner name.
    pub fn provider_name(&self) -> Option<&str> {
        match &self.winner {
            Some(winner) => winner.provider_name.as_text(),
            None => self.winner_name.as_deref(),
        }
    }
}

// ---------------------------------------------------------------------------
// AggregateRow
// ---------------------------------------------------------------------------

/// One observation of a tidy aggregate table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow<M> {
    pub year: i32,
    /// Category label or procurement kind.
    pub group: String,
    pub metric: M,
}

/// Entry count per `(year, group)`.
pub type CountRow = AggregateRow<u64>;

/// Summed monetary value per `(year, group)`.
pub type ValueRow = AggregateRow<f64>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn raw_field_variants_from_json() {
        assert_eq!(RawField::from(Value::Null), RawField::Missing);
        assert_eq!(RawField::from(json!("TA 2022")), RawField::Text("TA 2022".into()));
        assert_eq!(RawField::from(json!(2022)), RawField::NonText(json!(2022)));
        assert_eq!(RawField::from(json!("  ")).non_empty_text(), None);
    }

    #[test]
    fn category_from_type_tag() {
        assert_eq!(Category::from_type_tag("tender"), Some(Category::Tender));
        assert_eq!(Category::from_type_tag(" Non-Tender "), Some(Category::NonTender));
        assert_eq!(Category::from_type_tag("pencatatan"), Some(Category::Pencatatan));
        assert_eq!(Category::from_type_tag("swakelola"), None);
    }

    #[test]
    fn record_from_canonical_keys() {
        let value = json!({
            "id": 42,
            "procurementType": "tender",
            "budgetYearRaw": "TA 2022",
            "procurementKind": "Konstruksi",
            "negotiatedPriceRaw": "Rp. 1.000,00",
            "instansi": "Dinas PU"
        });
        let record = RawRecord::from_value(&value).expect("valid record");
        assert_eq!(record.id, RecordId::Int(42));
        assert_eq!(record.category(), Some(Category::Tender));
        assert_eq!(record.budget_year_raw.as_text(), Some("TA 2022"));
        assert_eq!(record.extra.get("instansi"), Some(&json!("Dinas PU")));
        assert!(record.winners.is_absent());
    }

    #[test]
    fn record_from_upstream_keys() {
        let value = json!({
            "id": "10293",
            "tipePengadaan": "pencatatan",
            "tahunAnggaran": "APBD 2023",
            "jenisPengadaan": "Pengadaan Barang",
            "namaPemenang": [
                { "namaPenyedia": "PT ACME Indonesia", "nilaiRealisasi": "Rp. 5.000,00", "npwp": "01.234" },
                "junk",
                { "namaPenyedia": "CV Lain" }
            ]
        });
        let record = RawRecord::from_value(&value).expect("valid record");
        assert_eq!(record.id, RecordId::Text("10293".into()));
        assert_eq!(record.category(), Some(Category::Pencatatan));
        let winners = record.winners.entries();
        assert_eq!(winners.len(), 2);
        assert_eq!(winners[0].provider_name.as_text(), Some("PT ACME Indonesia"));
        assert_eq!(winners[0].realized_value_raw.as_text(), Some("Rp. 5.000,00"));
        assert_eq!(winners[0].extra.get("npwp"), Some(&json!("01.234")));
    }

    #[test]
    fn flat_winner_name_has_no_entries() {
        let value = json!({ "id": 1, "tipePengadaan": "tender", "namaPemenang": "PT ACME" });
        let record = RawRecord::from_value(&value).expect("valid record");
        assert_eq!(record.winners, WinnerField::Name("PT ACME".into()));
        assert!(record.winners.entries().is_empty());
    }

    #[test]
    fn record_rejections() {
        assert_eq!(RawRecord::from_value(&json!("x")), Err(RejectReason::NotAnObject));
        assert_eq!(RawRecord::from_value(&json!({ "tipePengadaan": "tender" })), Err(RejectReason::MissingId));
        assert_eq!(RawRecord::from_value(&json!({ "id": null })), Err(RejectReason::MissingId));
        assert_eq!(
            RawRecord::from_value(&json!({ "id": 1.5 })),
            Err(RejectReason::InvalidId(json!(1.5)))
        );
    }

    #[test]
    fn parse_records_collects_rejections() {
        let parsed = parse_records(&json!([
            { "id": 1, "procurementType": "tender" },
            42,
            { "procurementType": "tender" }
        ]))
        .expect("array input");
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.rejected.len(), 2);
        assert_eq!(parsed.rejected[0].index, 1);
        assert_eq!(parsed.rejected[1].index, 2);
    }

    #[test]
    fn parse_records_rejects_non_array() {
        assert!(parse_records(&json!({ "error": "Scraping failed" })).is_none());
        assert!(parse_records(&Value::Null).is_none());
    }

    #[test]
    fn raw_record_deserializes_from_json_text() {
        let records: Vec<RawRecord> = serde_json::from_str(
            r#"[{"id": 7, "tipePengadaan": "non-tender", "hargaNegosiasi": "Rp. 2.500,50"}]"#,
        )
        .expect("deserialize");
        assert_eq!(records[0].negotiated_price_raw.as_text(), Some("Rp. 2.500,50"));
    }

    #[test]
    fn raw_record_serializes_canonical_keys() {
        let mut record = RawRecord::new(3, "tender");
        record.budget_year_raw = "2021".into();
        let json = serde_json::to_value(&record).expect("serialize");
        assert_eq!(json["id"], json!(3));
        assert_eq!(json["procurementType"], json!("tender"));
        assert_eq!(json["budgetYearRaw"], json!("2021"));
        assert!(json.get("winners").is_none());
    }

    #[test]
    fn cleaned_record_nests_carried_fields() {
        let mut row = CleanedRecord::new(RecordId::Int(1), Category::Tender, 2021, 1000.0);
        row.fields.insert("year".into(), json!("bogus"));
        row.fields.insert("instansi".into(), json!("Dinas PU"));

        let text = serde_json::to_string(&row).expect("serialize");
        let back: Value = serde_json::from_str(&text).expect("parse back");
        assert_eq!(back["year"], json!(2021));
        assert_eq!(back["fields"]["year"], json!("bogus"));
        assert_eq!(back["fields"]["instansi"], json!("Dinas PU"));
        assert_eq!(text.matches("\"year\"").count(), 2);
    }

    #[test]
    fn cleaned_record_provider_name_falls_back_to_flat_name() {
        let mut row = CleanedRecord::new(RecordId::Int(1), Category::Tender, 2021, 0.0);
        assert_eq!(row.provider_name(), None);
        row.winner_name = Some("PT ACME Indonesia".into());
        assert_eq!(row.provider_name(), Some("PT ACME Indonesia"));
        row.winner = Some(Winner::named("CV Lain"));
        assert_eq!(row.provider_name(), Some("CV Lain"));
    }

    #[test]
    fn records_fixture_validates() {
        let fixture = std::fs::read_to_string("../../../fixtures/json/records.fixture.json")
            .expect("read fixture");
        let value: Value = serde_json::from_str(&fixture).expect("fixture is json");
        let parsed = parse_records(&value).expect("fixture is an array");
        assert_eq!(parsed.records.len(), 8);
        assert_eq!(parsed.rejected.len(), 1);
    }
}
