//! The record store.

use chrono::NaiveDate;
use tokio::sync::RwLock;

use crate::domain::{FrequentRoute, RecordDraft, RecordId, RouteDraft, TravelRecord};

use super::error::StoreError;
use super::file::{StoreDocument, StoreFile};
use super::ids::IdGenerator;

/// Owns all travel records and frequent routes.
///
/// Records are kept newest-insert-first. Every successful mutation is
/// written through to the data file before it becomes visible; a mutation
/// whose write fails leaves the store unchanged.
pub struct RecordStore {
    file: Option<StoreFile>,
    state: RwLock<StoreDocument>,
    ids: IdGenerator,
}

impl RecordStore {
    /// Open the store backed by `file`, loading whatever it holds.
    pub fn open(file: StoreFile) -> Self {
        let document = file.load();
        tracing::info!(
            path = %file.path().display(),
            records = document.travel_records.len(),
            routes = document.frequent_routes.len(),
            "record store loaded"
        );
        Self::with_document(Some(file), document)
    }

    /// A store that is never written to disk.
    pub fn in_memory(document: StoreDocument) -> Self {
        Self::with_document(None, document)
    }

    fn with_document(file: Option<StoreFile>, document: StoreDocument) -> Self {
        let ids = IdGenerator::after_existing(
            document
                .travel_records
                .iter()
                .map(|r| &r.id)
                .chain(document.frequent_routes.iter().map(|r| &r.id)),
        );
        Self {
            file,
            state: RwLock::new(document),
            ids,
        }
    }

    pub async fn all_records(&self) -> Vec<TravelRecord> {
        self.state.read().await.travel_records.clone()
    }

    pub async fn record(&self, id: &RecordId) -> Option<TravelRecord> {
        let state = self.state.read().await;
        state.travel_records.iter().find(|r| &r.id == id).cloned()
    }

    pub async fn all_routes(&self) -> Vec<FrequentRoute> {
        self.state.read().await.frequent_routes.clone()
    }

    pub async fn route(&self, id: &RecordId) -> Option<FrequentRoute> {
        let state = self.state.read().await;
        state.frequent_routes.iter().find(|r| &r.id == id).cloned()
    }

    /// Add a record with a fresh id at the front of the list.
    pub async fn insert_record(&self, draft: RecordDraft) -> Result<TravelRecord, StoreError> {
        let record = TravelRecord::from_route(self.ids.next_id(), draft.date, draft.route);
        self.mutate(|doc| {
            doc.travel_records.insert(0, record.clone());
            Ok(record)
        })
        .await
    }

    /// Replace the record with `id`, keeping its position.
    pub async fn replace_record(
        &self,
        id: &RecordId,
        draft: RecordDraft,
    ) -> Result<TravelRecord, StoreError> {
        self.mutate(|doc| {
            let slot = doc
                .travel_records
                .iter_mut()
                .find(|r| &r.id == id)
                .ok_or_else(|| StoreError::RecordNotFound(id.clone()))?;
            *slot = TravelRecord::from_route(id.clone(), draft.date, draft.route);
            Ok(slot.clone())
        })
        .await
    }

    pub async fn delete_record(&self, id: &RecordId) -> Result<TravelRecord, StoreError> {
        self.mutate(|doc| {
            let index = doc
                .travel_records
                .iter()
                .position(|r| &r.id == id)
                .ok_or_else(|| StoreError::RecordNotFound(id.clone()))?;
            Ok(doc.travel_records.remove(index))
        })
        .await
    }

    /// Log the trip of an existing record again on `date`.
    pub async fn reuse_record(
        &self,
        id: &RecordId,
        date: NaiveDate,
    ) -> Result<TravelRecord, StoreError> {
        let new_id = self.ids.next_id();
        self.mutate(|doc| {
            let source = doc
                .travel_records
                .iter()
                .find(|r| &r.id == id)
                .ok_or_else(|| StoreError::RecordNotFound(id.clone()))?;
            let record = TravelRecord::from_route(new_id, date, source.route());
            doc.travel_records.insert(0, record.clone());
            Ok(record)
        })
        .await
    }

    /// Add a frequent route at the end of the list.
    pub async fn insert_route(&self, draft: RouteDraft) -> Result<FrequentRoute, StoreError> {
        let route = FrequentRoute::new(self.ids.next_id(), draft.name, draft.route);
        self.mutate(|doc| {
            doc.frequent_routes.push(route.clone());
            Ok(route)
        })
        .await
    }

    pub async fn replace_route(
        &self,
        id: &RecordId,
        draft: RouteDraft,
    ) -> Result<FrequentRoute, StoreError> {
        self.mutate(|doc| {
            let slot = doc
                .frequent_routes
                .iter_mut()
                .find(|r| &r.id == id)
                .ok_or_else(|| StoreError::RouteNotFound(id.clone()))?;
            *slot = FrequentRoute::new(id.clone(), draft.name, draft.route);
            Ok(slot.clone())
        })
        .await
    }

    pub async fn delete_route(&self, id: &RecordId) -> Result<FrequentRoute, StoreError> {
        self.mutate(|doc| {
            let index = doc
                .frequent_routes
                .iter()
                .position(|r| &r.id == id)
                .ok_or_else(|| StoreError::RouteNotFound(id.clone()))?;
            Ok(doc.frequent_routes.remove(index))
        })
        .await
    }

    /// Log a trip on `date` from the frequent route `id`.
    pub async fn use_route(&self, id: &RecordId, date: NaiveDate) -> Result<TravelRecord, StoreError> {
        let new_id = self.ids.next_id();
        self.mutate(|doc| {
            let route = doc
                .frequent_routes
                .iter()
                .find(|r| &r.id == id)
                .ok_or_else(|| StoreError::RouteNotFound(id.clone()))?;
            let record = route.to_record(new_id, date);
            doc.travel_records.insert(0, record.clone());
            Ok(record)
        })
        .await
    }

    /// Apply `change` to a copy of the document, persist it, then publish it.
    async fn mutate<T>(
        &self,
        change: impl FnOnce(&mut StoreDocument) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut state = self.state.write().await;
        let mut next = state.clone();
        let out = change(&mut next)?;

        if let Some(file) = &self.file {
            file.save(&next).inspect_err(|e| {
                tracing::error!(path = %file.path().display(), error = %e, "failed to save data file");
            })?;
        }

        *state = next;
        Ok(out)
    }
}

#[cfg(test)]
#[path = "records_tests.rs"]
mod tests;
