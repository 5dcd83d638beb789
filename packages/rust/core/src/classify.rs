//! Partition raw records into the three procurement categories.

use tenderstat_shared::{Category, RawRecord};

/// Records split by declared `procurementType`, input order kept per bucket.
#[derive(Debug, Default)]
pub struct Classified<'a> {
    pub tender: Vec<&'a RawRecord>,
    pub non_tender: Vec<&'a RawRecord>,
    pub pencatatan: Vec<&'a RawRecord>,
    /// Records whose type matched no category.
    pub ignored: Vec<&'a RawRecord>,
}

impl<'a> Classified<'a> {
    /// The bucket for one category.
    pub fn bucket(&self, category: Category) -> &[&'a RawRecord] {
        match category {
            Category::Tender => &self.tender,
            Category::NonTender => &self.non_tender,
            Category::Pencatatan => &self.pencatatan,
        }
    }

    /// Number of records placed in one of the three categories.
    pub fn classified_len(&self) -> usize {
        self.tender.len() + self.non_tender.len() + self.pencatatan.len()
    }
}

/// Split records by category. Unknown or missing types go to
/// [`Classified::ignored`].
pub fn classify(records: &[RawRecord]) -> Classified<'_> {
    let mut out = Classified::default();

    for record in records {
        match record.category() {
            Some(Category::Tender) => out.tender.push(record),
            Some(Category::NonTender) => out.non_tender.push(record),
            Some(Category::Pencatatan) => out.pencatatan.push(record),
            None => out.ignored.push(record),
        }
    }

    tracing::debug!(
        tender = out.tender.len(),
        non_tender = out.non_tender.len(),
        pencatatan = out.pencatatan.len(),
        ignored = out.ignored.len(),
        "records classified"
    );

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tenderstat_shared::{RawField, RecordId};

    fn ids(bucket: &[&RawRecord]) -> Vec<RecordId> {
        bucket.iter().map(|r| r.id.clone()).collect()
    }

    #[test]
    fn partitions_preserving_order() {
        let records = vec![
            RawRecord::new(1, "tender"),
            RawRecord::new(2, "pencatatan"),
            RawRecord::new(3, "non-tender"),
            RawRecord::new(4, "tender"),
            RawRecord::new(5, "pencatatan"),
        ];
        let out = classify(&records);
        assert_eq!(ids(&out.tender), vec![RecordId::Int(1), RecordId::Int(4)]);
        assert_eq!(ids(&out.non_tender), vec![RecordId::Int(3)]);
        assert_eq!(ids(&out.pencatatan), vec![RecordId::Int(2), RecordId::Int(5)]);
        assert!(out.ignored.is_empty());
        assert_eq!(out.classified_len(), records.len());
    }

    #[test]
    fn unknown_types_are_ignored() {
        let mut missing_type = RawRecord::new(4, "tender");
        missing_type.procurement_type = RawField::Missing;
        let records = vec![
            RawRecord::new(1, "tender"),
            RawRecord::new(2, "swakelola"),
            RawRecord::new(3, ""),
            missing_type,
        ];
        let out = classify(&records);
        assert_eq!(out.classified_len(), 1);
        assert_eq!(out.ignored.len(), 3);
        assert!(out.classified_len() < records.len());
    }

    #[test]
    fn empty_input_gives_empty_buckets() {
        let out = classify(&[]);
        for category in Category::ALL {
            assert!(out.bucket(category).is_empty());
        }
        assert!(out.ignored.is_empty());
    }
}
