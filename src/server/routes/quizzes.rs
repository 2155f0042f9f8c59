use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_number_from_string;
use sqlx::SqlitePool;

use crate::{
    db::{queries::questions, Question},
    server::{app::AppState, extractors::JsonBody},
    telemetry::QUIZ_QUESTIONS_CNTR,
};

use super::{ApiError, ApiResponse};

/// Category id that stands for "any category".
const ALL_CATEGORIES: i64 = 0;

#[derive(Deserialize)]
struct QuizRequest {
    previous_questions: Option<Vec<i64>>,
    quiz_category: Option<QuizCategory>,
}

#[derive(Deserialize)]
struct QuizCategory {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    id: i64,
}

// no `question` means the player has seen everything in the category
#[derive(Serialize)]
struct QuizQuestion {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    question: Option<Question>,
}

async fn play_quiz(
    State(pool): State<SqlitePool>,
    JsonBody(request): JsonBody<QuizRequest>,
) -> ApiResponse<Json<QuizQuestion>> {
    // an empty history counts as missing
    let (Some(previous), Some(QuizCategory { id })) =
        (request.previous_questions, request.quiz_category)
    else {
        return Err(ApiError::BadRequest);
    };
    if previous.is_empty() {
        return Err(ApiError::BadRequest);
    }
    let category = (id != ALL_CATEGORIES).then_some(id);

    let question = questions::random_unseen_question(&pool, category, &previous)
        .await
        .map_err(|e| {
            tracing::warn!("Cannot draw a quiz question: {e}");
            ApiError::BadRequest
        })?;

    match &question {
        Some(q) => {
            let label = category.map_or_else(|| "all".to_owned(), |c| c.to_string());
            QUIZ_QUESTIONS_CNTR.with_label_values(&[label.as_str()]).inc();
            tracing::debug!("Quiz question {} after {} seen", q.id, previous.len());
        }
        None => tracing::debug!("Quiz exhausted after {} questions", previous.len()),
    }

    Ok(Json(QuizQuestion {
        success: true,
        question,
    }))
}

pub fn quizzes_router(state: AppState) -> Router {
    Router::new()
        .route("/quizzes", post(play_quiz))
        .with_state(state)
}
