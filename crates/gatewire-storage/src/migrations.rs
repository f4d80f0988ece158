use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, DatabaseConnection, Schema, Statement, TransactionTrait};

use crate::entities;
use crate::storage::StorageResult;

/// Ensures `schema_version` exists, then applies every migration whose
/// version is greater than the highest recorded one, strictly in order,
/// each inside its own transaction. Schema changes only ever add tables,
/// columns, or indexes; nothing here rewrites data already committed by an
/// earlier version.
pub async fn run(db: &DatabaseConnection) -> StorageResult<()> {
    ensure_schema_version_table(db).await?;
    let current = current_version(db).await?;

    for migration in MIGRATIONS {
        if migration.version <= current {
            continue;
        }
        let txn = db.begin().await?;
        (migration.apply)(&txn).await?;
        record_version(&txn, migration.version).await?;
        txn.commit().await?;
    }
    Ok(())
}

struct Migration {
    version: i64,
    apply: for<'a> fn(
        &'a sea_orm::DatabaseTransaction,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = StorageResult<()>> + Send + 'a>,
    >,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    apply: |txn| Box::pin(migrate_v1(txn)),
}];

async fn ensure_schema_version_table(db: &DatabaseConnection) -> StorageResult<()> {
    let backend = db.get_database_backend();
    let sql = match backend {
        sea_orm::DatabaseBackend::Sqlite => {
            "CREATE TABLE IF NOT EXISTS schema_version (\
                version BIGINT PRIMARY KEY, \
                applied_at TEXT NOT NULL\
            )"
        }
        _ => {
            "CREATE TABLE IF NOT EXISTS schema_version (\
                version BIGINT PRIMARY KEY, \
                applied_at TIMESTAMPTZ NOT NULL\
            )"
        }
    };
    db.execute(Statement::from_string(backend, sql)).await?;
    Ok(())
}

async fn current_version(db: &DatabaseConnection) -> StorageResult<i64> {
    #[derive(sea_orm::FromQueryResult)]
    struct MaxVersion {
        version: Option<i64>,
    }
    let backend = db.get_database_backend();
    let row = MaxVersion::find_by_statement(Statement::from_string(
        backend,
        "SELECT MAX(version) AS version FROM schema_version",
    ))
    .one(db)
    .await?;
    Ok(row.and_then(|r| r.version).unwrap_or(0))
}

async fn record_version(
    txn: &sea_orm::DatabaseTransaction,
    version: i64,
) -> StorageResult<()> {
    let backend = txn.get_database_backend();
    let now = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .map_err(|e| sea_orm::DbErr::Custom(e.to_string()))?;
    txn.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO schema_version (version, applied_at) VALUES (?, ?)",
        [version.into(), now.into()],
    ))
    .await?;
    Ok(())
}

/// Initial schema: every catalog table plus the indexes request-path and
/// usage-aggregation queries rely on.
async fn migrate_v1(txn: &sea_orm::DatabaseTransaction) -> StorageResult<()> {
    let backend = txn.get_database_backend();
    let schema = Schema::new(backend);

    for stmt in [
        schema.create_table_from_entity(entities::Providers),
        schema.create_table_from_entity(entities::ModelFamilies),
        schema.create_table_from_entity(entities::Models),
        schema.create_table_from_entity(entities::Credentials),
        schema.create_table_from_entity(entities::Clients),
        schema.create_table_from_entity(entities::Aliases),
        schema.create_table_from_entity(entities::RemapRules),
        schema.create_table_from_entity(entities::ClientRateLimits),
        schema.create_table_from_entity(entities::RequestLogs),
        schema.create_table_from_entity(entities::UsageRecords),
        schema.create_table_from_entity(entities::GlobalConfig),
    ] {
        txn.execute(backend.build(&table_if_not_exists(stmt)))
            .await?;
    }

    use entities::request_logs::Column as RequestLogColumn;
    use entities::usage_records::Column as UsageColumn;

    for index in [
        Index::create()
            .name("idx_request_logs_client_created")
            .table(entities::RequestLogs)
            .col(RequestLogColumn::ClientId)
            .col(RequestLogColumn::CreatedAt)
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_request_logs_created")
            .table(entities::RequestLogs)
            .col(RequestLogColumn::CreatedAt)
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_usage_records_bucket")
            .table(entities::UsageRecords)
            .col(UsageColumn::BucketStartedAt)
            .if_not_exists()
            .to_owned(),
    ] {
        txn.execute(backend.build(&index)).await?;
    }

    Ok(())
}

fn table_if_not_exists(
    mut stmt: sea_orm::sea_query::TableCreateStatement,
) -> sea_orm::sea_query::TableCreateStatement {
    stmt.if_not_exists().to_owned()
}
