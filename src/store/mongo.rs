use bson::{doc, Document};
use mongodb::sync::{Client, Collection, Database};
use mongodb::IndexModel;

use super::{study_of, DocumentStore, METRICS_COLLECTION, RECORDS_COLLECTION, RECORD_INDEXES};
use crate::error::StoreError;
use crate::model::MeasurementEvent;

/// [`DocumentStore`] backed by the blocking MongoDB driver.
pub struct MongoStore {
    database: Database,
    records: Collection<Document>,
    metrics: Collection<Document>,
}

impl MongoStore {
    /// The connection string must name the target database
    /// (`mongodb://host:27017/dbname`).
    pub fn connect(uri: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri)?;
        let database = client
            .default_database()
            .ok_or_else(|| StoreError::NoDatabase(uri.to_owned()))?;

        Ok(Self {
            records: database.collection(RECORDS_COLLECTION),
            metrics: database.collection(METRICS_COLLECTION),
            database,
        })
    }

    pub fn database_name(&self) -> &str {
        self.database.name()
    }
}

/// Ascending compound index specification over `fields`, in order.
fn index_keys(fields: &[&str]) -> Document {
    let mut keys = Document::new();
    for field in fields {
        keys.insert(*field, 1);
    }
    keys
}

impl DocumentStore for MongoStore {
    fn reset(&mut self) -> Result<(), StoreError> {
        log::info!(
            "Dropping database {} before loading new data",
            self.database.name()
        );
        self.database.drop().run()?;

        for fields in RECORD_INDEXES {
            let index = IndexModel::builder().keys(index_keys(fields)).build();
            let created = self.records.create_index(index).run()?;
            log::debug!("Created index {}", created.index_name);
        }
        Ok(())
    }

    fn insert_records(&mut self, records: Vec<Document>) -> Result<usize, StoreError> {
        let submitted = records.len();
        let result = self.records.insert_many(records).run()?;
        let acknowledged = result.inserted_ids.len();
        if acknowledged != submitted {
            return Err(StoreError::Rejected(format!(
                "{acknowledged} of {submitted} documents acknowledged"
            )));
        }
        Ok(acknowledged)
    }

    fn insert_events(&mut self, events: &[MeasurementEvent]) -> Result<usize, StoreError> {
        let documents = events
            .iter()
            .map(bson::to_document)
            .collect::<Result<Vec<_>, _>>()?;
        let result = self.metrics.insert_many(documents).run()?;
        Ok(result.inserted_ids.len())
    }

    fn distinct_studies(&self) -> Result<Vec<u32>, StoreError> {
        let values = self.records.distinct("meta.study", doc! {}).run()?;
        Ok(values.iter().filter_map(study_of).collect())
    }

    fn count_study(&self, study: u32) -> Result<u64, StoreError> {
        let mut count = 0;
        for document in self.records.find(doc! { "meta.study": study }).run()? {
            let document = document?;
            log::trace!("doc: {:?}", document.get("_id"));
            count += 1;
        }
        Ok(count)
    }

    fn find_one_by_study(&self, study: u32) -> Result<Option<Document>, StoreError> {
        Ok(self
            .records
            .find_one(doc! { "meta.study": study })
            .run()?)
    }

    fn count_records(&self) -> Result<u64, StoreError> {
        Ok(self.records.count_documents(doc! {}).run()?)
    }

    fn find_at(&self, offset: u64) -> Result<Option<Document>, StoreError> {
        let mut cursor = self.records.find(doc! {}).skip(offset).limit(1).run()?;
        Ok(cursor.next().transpose()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_string_must_name_a_database() {
        let result = MongoStore::connect("mongodb://localhost:27017");
        assert!(matches!(result, Err(StoreError::NoDatabase(_))));

        let store = MongoStore::connect("mongodb://localhost:27017/dicom").unwrap();
        assert_eq!(store.database_name(), "dicom");
    }

    #[test]
    fn malformed_uri_is_a_driver_error() {
        let result = MongoStore::connect("localhost:27017/dicom");
        assert!(matches!(result, Err(StoreError::Driver(_))));
    }

    #[test]
    fn index_keys_keep_field_order() {
        let keys = index_keys(RECORD_INDEXES[1]);
        assert_eq!(
            keys,
            doc! { "meta.studyInstanceUID": 1, "meta.seriesInstanceUID": 1, "meta.version": 1 }
        );
        assert_eq!(
            keys.keys().collect::<Vec<_>>(),
            ["meta.studyInstanceUID", "meta.seriesInstanceUID", "meta.version"]
        );
    }
}
