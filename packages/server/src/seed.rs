use sea_orm::*;
use sea_query::{Index, PostgresQueryBuilder};
use tracing::info;

use crate::entity::{solve, submission};

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't support composite non-unique indexes,
/// so we create them manually on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Achievement rules scan a user's solves:
    // SELECT * FROM solve WHERE user_id = ?
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_solve_user")
        .table(solve::Entity)
        .col(solve::Column::UserId)
        .to_string(PostgresQueryBuilder);

    match db.execute_unprepared(&stmt).await {
        Ok(_) => {
            info!("Ensured index idx_solve_user exists");
        }
        Err(e) => {
            tracing::warn!("Failed to create index idx_solve_user: {}", e);
        }
    }

    // Frozen standings cut the ledger by time:
    // SELECT * FROM solve WHERE solved_at <= ?
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_solve_solved_at")
        .table(solve::Entity)
        .col(solve::Column::SolvedAt)
        .to_string(PostgresQueryBuilder);

    match db.execute_unprepared(&stmt).await {
        Ok(_) => {
            info!("Ensured index idx_solve_solved_at exists");
        }
        Err(e) => {
            tracing::warn!("Failed to create index idx_solve_solved_at: {}", e);
        }
    }

    // Attempt history per challenge and user, for audit queries.
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_submission_challenge_user")
        .table(submission::Entity)
        .col(submission::Column::ChallengeId)
        .col(submission::Column::UserId)
        .to_string(PostgresQueryBuilder);

    match db.execute_unprepared(&stmt).await {
        Ok(_) => {
            info!("Ensured index idx_submission_challenge_user exists");
        }
        Err(e) => {
            tracing::warn!("Failed to create index idx_submission_challenge_user: {}", e);
        }
    }

    Ok(())
}
