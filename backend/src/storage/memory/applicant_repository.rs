use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::domain::models::{Applicant, ApplicantPredicate};
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::memory::connection::SharedStore;
use crate::storage::memory::unit_of_work::{Change, SharedMemoryContext};
use crate::storage::traits::Repository;

/// In-memory applicant repository, bound to one unit of work
pub struct MemoryApplicantRepository {
    store: SharedStore,
    context: SharedMemoryContext,
}

impl MemoryApplicantRepository {
    pub(crate) fn new(store: SharedStore, context: SharedMemoryContext) -> Self {
        Self { store, context }
    }

    async fn view(&self) -> StorageResult<BTreeMap<i64, Applicant>> {
        let ctx = self.context.lock().await;
        ctx.ensure_open()?;
        let store = self.store.lock().await;
        store.check_reads()?;
        Ok(ctx.view(&store))
    }
}

#[async_trait]
impl Repository<Applicant, ApplicantPredicate> for MemoryApplicantRepository {
    async fn get_all(&self) -> StorageResult<Vec<Applicant>> {
        Ok(self.view().await?.into_values().collect())
    }

    async fn get_by_id(&self, id: i64) -> StorageResult<Option<Applicant>> {
        Ok(self.view().await?.remove(&id))
    }

    async fn exists(&self, id: i64) -> StorageResult<bool> {
        Ok(self.view().await?.contains_key(&id))
    }

    async fn add(&self, entity: &Applicant) -> StorageResult<Applicant> {
        let mut ctx = self.context.lock().await;
        ctx.ensure_open()?;

        if let Err(err) = entity.validate() {
            let err = StorageError::from(err);
            ctx.record_failure(&err);
            return Err(err);
        }

        let mut store = self.store.lock().await;
        let stored = Applicant {
            id: store.next_id(),
            ..entity.clone()
        };
        ctx.stage(Change::Insert(stored.clone()));
        Ok(stored)
    }

    async fn update(&self, entity: &Applicant) -> StorageResult<Applicant> {
        let mut ctx = self.context.lock().await;
        ctx.ensure_open()?;

        if let Err(err) = entity.validate() {
            let err = StorageError::from(err);
            ctx.record_failure(&err);
            return Err(err);
        }

        let store = self.store.lock().await;
        if !ctx.view(&store).contains_key(&entity.id) {
            let err = StorageError::MissingRow(entity.id);
            ctx.record_failure(&err);
            return Err(err);
        }

        ctx.stage(Change::Update(entity.clone()));
        Ok(entity.clone())
    }

    async fn delete(&self, id: i64) -> StorageResult<bool> {
        let mut ctx = self.context.lock().await;
        ctx.ensure_open()?;

        let store = self.store.lock().await;
        if !ctx.view(&store).contains_key(&id) {
            return Ok(false);
        }

        ctx.stage(Change::Delete(id));
        Ok(true)
    }

    async fn find(&self, predicate: ApplicantPredicate) -> StorageResult<Vec<Applicant>> {
        Ok(self
            .view()
            .await?
            .into_values()
            .filter(|applicant| predicate.matches(applicant))
            .collect())
    }
}
