use crate::core::batch::{Batch, BatchStatus, FileOutcome, FileReference};
use crate::storage::{
    BatchFilter, BatchStore, SaveAction, check_file_outcome, check_mark_unpollable, check_save,
};
use crate::utils::error::{ImporterError, Result};
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

use super::super::entities::{self, batch, batch_file};
use super::types::SeaOrmDatabase;

fn to_db_count(value: u64, field: &str) -> Result<i64> {
    i64::try_from(value)
        .map_err(|_| ImporterError::validation(format!("{} {} is out of range", field, value)))
}

fn from_db_count(value: i64, field: &str) -> Result<u64> {
    u64::try_from(value)
        .map_err(|_| ImporterError::internal(format!("Stored {} {} is negative", field, value)))
}

fn file_from_model(model: batch_file::Model) -> Result<FileReference> {
    let outcome = match (model.success_count, model.error_count) {
        (Some(success_count), Some(error_count)) => Some(FileOutcome {
            success_count: from_db_count(success_count, "success count")?,
            error_count: from_db_count(error_count, "error count")?,
            error_url: model.error_url,
        }),
        _ => None,
    };

    Ok(FileReference {
        filename: model.filename,
        line_count: from_db_count(model.line_count, "line count")?,
        is_last_in_request: model.is_last_in_request,
        outcome,
    })
}

fn batch_from_model(model: batch::Model, files: Vec<batch_file::Model>) -> Result<Batch> {
    let files = files
        .into_iter()
        .map(file_from_model)
        .collect::<Result<Vec<_>>>()?;

    Ok(Batch {
        batch_id: model.id,
        status: model.status.parse()?,
        total_resource_count: from_db_count(model.total_resource_count, "resource count")?,
        files,
        status_handle: model.status_handle,
        total_success_count: from_db_count(model.total_success_count, "success count")?,
        total_error_count: from_db_count(model.total_error_count, "error count")?,
        closed: model.closed,
        pollable: model.pollable,
        last_error: model.last_error,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
        version: model.version,
    })
}

/// Mutable batch columns, stamped with the next version
fn batch_changes(batch: &Batch, version: i64) -> Result<batch::ActiveModel> {
    Ok(batch::ActiveModel {
        status: Set(batch.status.as_str().to_string()),
        total_resource_count: Set(to_db_count(batch.total_resource_count, "resource count")?),
        status_handle: Set(batch.status_handle.clone()),
        total_success_count: Set(to_db_count(batch.total_success_count, "success count")?),
        total_error_count: Set(to_db_count(batch.total_error_count, "error count")?),
        closed: Set(batch.closed),
        pollable: Set(batch.pollable),
        last_error: Set(batch.last_error.clone()),
        version: Set(version),
        updated_at: Set(Utc::now().into()),
        ..Default::default()
    })
}

fn file_model(
    batch_id: Uuid,
    position: usize,
    file: &FileReference,
) -> Result<batch_file::ActiveModel> {
    let position = i32::try_from(position).map_err(|_| {
        ImporterError::validation(format!("Batch {} holds too many files", batch_id))
    })?;
    let (success_count, error_count, error_url) = match &file.outcome {
        Some(outcome) => (
            Some(to_db_count(outcome.success_count, "success count")?),
            Some(to_db_count(outcome.error_count, "error count")?),
            outcome.error_url.clone(),
        ),
        None => (None, None, None),
    };

    Ok(batch_file::ActiveModel {
        batch_id: Set(batch_id),
        filename: Set(file.filename.clone()),
        position: Set(position),
        line_count: Set(to_db_count(file.line_count, "line count")?),
        is_last_in_request: Set(file.is_last_in_request),
        success_count: Set(success_count),
        error_count: Set(error_count),
        error_url: Set(error_url),
    })
}

/// Unique violations mean a concurrent writer got there first
fn write_error(err: DbErr, batch_id: Uuid) -> ImporterError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => ImporterError::conflict(format!(
            "Concurrent write to batch {}: {}",
            batch_id, detail
        )),
        _ => ImporterError::Database(err),
    }
}

async fn load_batch<C: ConnectionTrait>(conn: &C, batch_id: Uuid) -> Result<Option<Batch>> {
    let Some(model) = entities::Batch::find_by_id(batch_id).one(conn).await? else {
        return Ok(None);
    };

    let files = entities::BatchFile::find()
        .filter(batch_file::Column::BatchId.eq(batch_id))
        .order_by_asc(batch_file::Column::Position)
        .all(conn)
        .await?;

    batch_from_model(model, files).map(Some)
}

async fn write_files<C: ConnectionTrait>(conn: &C, batch: &Batch) -> Result<()> {
    let upsert = OnConflict::columns([batch_file::Column::BatchId, batch_file::Column::Filename])
        .update_columns([
            batch_file::Column::SuccessCount,
            batch_file::Column::ErrorCount,
            batch_file::Column::ErrorUrl,
        ])
        .to_owned();

    for (position, file) in batch.files.iter().enumerate() {
        entities::BatchFile::insert(file_model(batch.batch_id, position, file)?)
            .on_conflict(upsert.clone())
            .exec_without_returning(conn)
            .await
            .map_err(|e| write_error(e, batch.batch_id))?;
    }
    Ok(())
}

fn not_found(batch_id: Uuid) -> ImporterError {
    ImporterError::not_found(format!("Batch {} not found", batch_id))
}

#[async_trait]
impl BatchStore for SeaOrmDatabase {
    async fn load_active_batch(&self) -> Result<Option<Batch>> {
        let Some(model) = entities::Batch::find()
            .filter(batch::Column::Status.eq(BatchStatus::Staging.as_str()))
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };
        load_batch(&self.db, model.id).await
    }

    async fn get_batch(&self, batch_id: Uuid) -> Result<Option<Batch>> {
        load_batch(&self.db, batch_id).await
    }

    async fn list_batches(&self, filter: &BatchFilter) -> Result<Vec<Batch>> {
        debug!("Listing batches: {:?}", filter);

        let mut query = entities::Batch::find();
        if !filter.statuses.is_empty() {
            query = query.filter(
                batch::Column::Status.is_in(filter.statuses.iter().map(|status| status.as_str())),
            );
        }
        if let Some(pollable) = filter.pollable {
            query = query.filter(batch::Column::Pollable.eq(pollable));
        }
        if let Some(limit) = filter.limit {
            query = query.limit(limit as u64);
        }

        let models = query
            .order_by_asc(batch::Column::CreatedAt)
            .all(&self.db)
            .await?;
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let mut files: HashMap<Uuid, Vec<batch_file::Model>> = HashMap::new();
        for file in entities::BatchFile::find()
            .filter(batch_file::Column::BatchId.is_in(models.iter().map(|m| m.id)))
            .order_by_asc(batch_file::Column::Position)
            .all(&self.db)
            .await?
        {
            files.entry(file.batch_id).or_default().push(file);
        }

        models
            .into_iter()
            .map(|model| {
                let batch_files = files.remove(&model.id).unwrap_or_default();
                batch_from_model(model, batch_files)
            })
            .collect()
    }

    async fn save_batch(&self, batch: &Batch) -> Result<Batch> {
        let txn = self.db.begin().await?;

        let stored = load_batch(&txn, batch.batch_id).await?;
        let other_staging = entities::Batch::find()
            .filter(batch::Column::Status.eq(BatchStatus::Staging.as_str()))
            .one(&txn)
            .await?
            .map(|model| model.id);

        match check_save(stored.as_ref(), batch, other_staging)? {
            SaveAction::Unchanged => {
                txn.rollback().await?;
                debug!("Batch {} unchanged, skipping write", batch.batch_id);
                return stored.ok_or_else(|| not_found(batch.batch_id));
            }
            SaveAction::Insert => {
                let mut model = batch_changes(batch, 1)?;
                model.id = Set(batch.batch_id);
                model.created_at = Set(batch.created_at.into());
                entities::Batch::insert(model)
                    .exec_without_returning(&txn)
                    .await
                    .map_err(|e| write_error(e, batch.batch_id))?;
            }
            SaveAction::Update => {
                let updated = entities::Batch::update_many()
                    .set(batch_changes(batch, batch.version + 1)?)
                    .filter(batch::Column::Id.eq(batch.batch_id))
                    .filter(batch::Column::Version.eq(batch.version))
                    .exec(&txn)
                    .await
                    .map_err(|e| write_error(e, batch.batch_id))?;
                if updated.rows_affected == 0 {
                    return Err(ImporterError::conflict(format!(
                        "Batch {} changed since version {}",
                        batch.batch_id, batch.version
                    )));
                }
            }
        }

        write_files(&txn, batch).await?;
        let saved = load_batch(&txn, batch.batch_id).await?;
        txn.commit().await?;

        saved.ok_or_else(|| not_found(batch.batch_id))
    }

    async fn save_file_outcome(&self, batch_id: Uuid, file: &FileReference) -> Result<()> {
        let txn = self.db.begin().await?;
        let stored = load_batch(&txn, batch_id)
            .await?
            .ok_or_else(|| not_found(batch_id))?;

        if check_file_outcome(&stored, file)?.is_none() {
            txn.rollback().await?;
            return Ok(());
        }
        let Some(outcome) = &file.outcome else {
            return Err(ImporterError::validation(format!(
                "No outcome given for {}",
                file.filename
            )));
        };

        let written = entities::BatchFile::update_many()
            .set(batch_file::ActiveModel {
                success_count: Set(Some(to_db_count(outcome.success_count, "success count")?)),
                error_count: Set(Some(to_db_count(outcome.error_count, "error count")?)),
                error_url: Set(outcome.error_url.clone()),
                ..Default::default()
            })
            .filter(batch_file::Column::BatchId.eq(batch_id))
            .filter(batch_file::Column::Filename.eq(file.filename.as_str()))
            .filter(batch_file::Column::SuccessCount.is_null())
            .exec(&txn)
            .await?;
        if written.rows_affected == 0 {
            return Err(ImporterError::conflict(format!(
                "Outcome of {} in batch {} is already recorded",
                file.filename, batch_id
            )));
        }

        entities::Batch::update_many()
            .set(batch::ActiveModel {
                updated_at: Set(Utc::now().into()),
                ..Default::default()
            })
            .filter(batch::Column::Id.eq(batch_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        Ok(())
    }

    async fn mark_unpollable(&self, batch_id: Uuid, reason: &str) -> Result<Batch> {
        let txn = self.db.begin().await?;
        let stored = load_batch(&txn, batch_id)
            .await?
            .ok_or_else(|| not_found(batch_id))?;
        check_mark_unpollable(&stored)?;

        let updated = entities::Batch::update_many()
            .set(batch::ActiveModel {
                pollable: Set(false),
                last_error: Set(Some(reason.to_string())),
                version: Set(stored.version + 1),
                updated_at: Set(Utc::now().into()),
                ..Default::default()
            })
            .filter(batch::Column::Id.eq(batch_id))
            .filter(batch::Column::Version.eq(stored.version))
            .exec(&txn)
            .await?;
        if updated.rows_affected == 0 {
            return Err(ImporterError::conflict(format!(
                "Batch {} changed while being flagged",
                batch_id
            )));
        }

        let flagged = load_batch(&txn, batch_id).await?;
        txn.commit().await?;
        flagged.ok_or_else(|| not_found(batch_id))
    }

    async fn health_check(&self) -> Result<()> {
        debug!("Performing database health check");

        // Simple query to check database connectivity
        let _result = entities::Batch::find()
            .limit(1)
            .all(&self.db)
            .await
            .map_err(ImporterError::Database)?;

        debug!("Database health check passed");
        Ok(())
    }
}
