use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

/// A question row. Its serialized form is the record returned to clients.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub difficulty: i64,
    pub category: i64,
}

pub async fn get_all_questions(pool: &SqlitePool) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
SELECT id, question, answer, difficulty, category
FROM questions
ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn count_questions(pool: &SqlitePool) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM questions")
        .fetch_one(pool)
        .await
}

pub async fn get_question_by_id(pool: &SqlitePool, id: i64) -> sqlx::Result<Question> {
    sqlx::query_as::<_, Question>(
        r#"
SELECT id, question, answer, difficulty, category
FROM questions
WHERE questions.id = ?1
        "#,
    )
    .bind(id)
    .fetch_one(pool)
    .await
}

pub async fn get_questions_for_category(
    pool: &SqlitePool,
    category: i64,
) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
SELECT id, question, answer, difficulty, category
FROM questions
WHERE questions.category = ?1
ORDER BY id
        "#,
    )
    .bind(category)
    .fetch_all(pool)
    .await
}

/// Questions whose text contains `term`, ignoring case.
///
/// SQLite's `LIKE` only folds ASCII, so the match runs here with Unicode
/// lowercasing over every row.
pub async fn search_questions(pool: &SqlitePool, term: &str) -> sqlx::Result<Vec<Question>> {
    let needle = term.to_lowercase();
    Ok(get_all_questions(pool)
        .await?
        .into_iter()
        .filter(|q| q.question.to_lowercase().contains(&needle))
        .collect())
}

pub async fn create_question(
    pool: &SqlitePool,
    question: &str,
    answer: &str,
    category: i64,
    difficulty: i64,
) -> sqlx::Result<i64> {
    let mut conn = pool.acquire().await?;

    let id = sqlx::query(
        r#"
INSERT INTO questions (question, answer, category, difficulty) VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(question)
    .bind(answer)
    .bind(category)
    .bind(difficulty)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    Ok(id)
}

pub async fn delete_question(pool: &SqlitePool, id: i64) -> sqlx::Result<()> {
    let deleted = sqlx::query(
        r#"
DELETE FROM questions WHERE questions.id = ?1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?
    .rows_affected();

    if deleted == 0 {
        return Err(sqlx::Error::RowNotFound);
    }
    Ok(())
}

/// Draws one question at random among those not listed in `seen`.
///
/// `category` of `None` draws from every category. Returns `None` once every
/// candidate has been seen.
pub async fn random_unseen_question(
    pool: &SqlitePool,
    category: Option<i64>,
    seen: &[i64],
) -> sqlx::Result<Option<Question>> {
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT id, question, answer, difficulty, category FROM questions WHERE 1 = 1",
    );
    if let Some(category) = category {
        builder.push(" AND category = ").push_bind(category);
    }
    if !seen.is_empty() {
        builder.push(" AND id NOT IN (");
        let mut ids = builder.separated(", ");
        for id in seen {
            ids.push_bind(*id);
        }
        ids.push_unseparated(")");
    }
    builder.push(" ORDER BY RANDOM() LIMIT 1");

    builder
        .build_query_as::<Question>()
        .fetch_optional(pool)
        .await
}

pub async fn import_questions(
    conn: &mut SqliteConnection,
    questions: &[Question],
) -> sqlx::Result<()> {
    for question in questions {
        sqlx::query(
            r#"
INSERT INTO questions (id, question, answer, category, difficulty) VALUES (?1, ?2, ?3, ?4, ?5)
ON CONFLICT (id) DO UPDATE SET
    question = excluded.question,
    answer = excluded.answer,
    category = excluded.category,
    difficulty = excluded.difficulty
            "#,
        )
        .bind(question.id)
        .bind(&question.question)
        .bind(&question.answer)
        .bind(question.category)
        .bind(question.difficulty)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::db::test_pool;

    async fn seed(pool: &SqlitePool, rows: &[(&str, i64)]) -> Vec<i64> {
        let mut ids = Vec::new();
        for (text, category) in rows {
            ids.push(
                create_question(pool, text, "answer", *category, 1)
                    .await
                    .unwrap(),
            );
        }
        ids
    }

    #[tokio::test]
    async fn search_ignores_case_and_keeps_id_order() {
        let pool = test_pool().await;
        let ids = seed(
            &pool,
            &[
                ("What is the Title of the book?", 2),
                ("Who painted it?", 2),
                ("Which title won?", 5),
            ],
        )
        .await;

        let found = search_questions(&pool, "TITLE").await.unwrap();
        let found: Vec<i64> = found.iter().map(|q| q.id).collect();
        assert_eq!(found, vec![ids[0], ids[2]]);
    }

    #[tokio::test]
    async fn search_treats_wildcards_literally() {
        let pool = test_pool().await;
        seed(&pool, &[("Is 100% of it water?", 1), ("Is 1000 big?", 1)]).await;

        let found = search_questions(&pool, "100%").await.unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].question.contains("100%"));
    }

    #[tokio::test]
    async fn search_folds_non_ascii_case() {
        let pool = test_pool().await;
        let ids = seed(
            &pool,
            &[
                ("Où se trouve l'ÉCOLE polytechnique?", 3),
                ("Where is the school?", 3),
                ("Wie heißt die STRAßE?", 3),
            ],
        )
        .await;

        let found = search_questions(&pool, "école").await.unwrap();
        assert_eq!(found.iter().map(|q| q.id).collect::<Vec<_>>(), vec![ids[0]]);

        let found = search_questions(&pool, "straße").await.unwrap();
        assert_eq!(found.iter().map(|q| q.id).collect::<Vec<_>>(), vec![ids[2]]);
    }

    #[tokio::test]
    async fn delete_missing_question_is_row_not_found() {
        let pool = test_pool().await;
        let err = delete_question(&pool, 42).await.unwrap_err();
        assert!(matches!(err, sqlx::Error::RowNotFound));
    }

    #[tokio::test]
    async fn concurrent_deletes_succeed_once() {
        let pool = test_pool().await;
        let ids = seed(&pool, &[("Gone?", 1)]).await;

        let (first, second) = tokio::join!(
            delete_question(&pool, ids[0]),
            delete_question(&pool, ids[0])
        );
        let outcomes = [first, second];
        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(outcomes
            .iter()
            .any(|r| matches!(r, Err(sqlx::Error::RowNotFound))));
    }

    #[tokio::test]
    async fn create_and_delete_change_the_count() {
        let pool = test_pool().await;
        let ids = seed(&pool, &[("One?", 1), ("Two?", 1)]).await;
        assert_eq!(count_questions(&pool).await.unwrap(), 2);

        delete_question(&pool, ids[0]).await.unwrap();
        assert_eq!(count_questions(&pool).await.unwrap(), 1);
        assert!(get_question_by_id(&pool, ids[0]).await.is_err());
    }

    #[tokio::test]
    async fn unknown_category_violates_foreign_key() {
        let pool = test_pool().await;
        let err = create_question(&pool, "Orphan?", "yes", 99, 1)
            .await
            .unwrap_err();
        let db_error = err.as_database_error().unwrap();
        assert!(db_error.is_foreign_key_violation());
    }

    #[tokio::test]
    async fn random_question_skips_seen_and_other_categories() {
        let pool = test_pool().await;
        let ids = seed(
            &pool,
            &[("A?", 3), ("B?", 3), ("C?", 3), ("D?", 4), ("E?", 4)],
        )
        .await;
        let seen = [ids[0], ids[1]];

        for _ in 0..20 {
            let question = random_unseen_question(&pool, Some(3), &seen)
                .await
                .unwrap()
                .unwrap();
            assert_eq!(question.id, ids[2]);
        }

        let mut drawn = HashSet::new();
        for _ in 0..50 {
            let question = random_unseen_question(&pool, None, &seen)
                .await
                .unwrap()
                .unwrap();
            assert!(!seen.contains(&question.id));
            drawn.insert(question.id);
        }
        assert!(drawn.is_subset(&HashSet::from([ids[2], ids[3], ids[4]])));
    }

    #[tokio::test]
    async fn random_question_is_none_when_everything_was_seen() {
        let pool = test_pool().await;
        let ids = seed(&pool, &[("A?", 6), ("B?", 6)]).await;
        let question = random_unseen_question(&pool, Some(6), &ids).await.unwrap();
        assert!(question.is_none());
    }
}
