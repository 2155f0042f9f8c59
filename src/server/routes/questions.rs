use std::collections::BTreeMap;

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_option_number_from_string;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{categories::get_category_labels, questions},
        Question,
    },
    server::{
        app::AppState,
        deserializers::deserialize_non_empty_string,
        extractors::{JsonBody, PathParam, QueryParams},
        pagination::{paginate, PageQuery},
    },
    telemetry::{CREATED_QUESTIONS_CNTR, DELETED_QUESTIONS_CNTR},
};

use super::{ApiError, ApiResponse};

/// Body of `POST /questions`, which either searches or creates.
///
/// Category and difficulty come as numbers or numeric strings depending on the client.
#[derive(Deserialize)]
struct QuestionPayload {
    #[serde(rename = "searchTerm", default)]
    #[serde(deserialize_with = "deserialize_non_empty_string")]
    search_term: Option<String>,
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    #[serde(deserialize_with = "deserialize_option_number_from_string")]
    category: Option<i64>,
    #[serde(default)]
    #[serde(deserialize_with = "deserialize_option_number_from_string")]
    difficulty: Option<i64>,
}

struct NewQuestion {
    question: String,
    answer: String,
    category: i64,
    difficulty: i64,
}

impl QuestionPayload {
    fn into_new_question(self) -> Result<NewQuestion, ApiError> {
        match (self.question, self.answer, self.category, self.difficulty) {
            (Some(question), Some(answer), Some(category), Some(difficulty)) => Ok(NewQuestion {
                question,
                answer,
                category,
                difficulty,
            }),
            _ => Err(ApiError::BadRequest),
        }
    }
}

#[derive(Deserialize)]
struct SearchRequest {
    #[serde(rename = "searchTerm")]
    search_term: Option<String>,
}

#[derive(Serialize)]
struct QuestionsPage {
    success: bool,
    questions: Vec<Question>,
    total_questions: i64,
    categories: BTreeMap<i64, String>,
}

#[derive(Serialize)]
struct SearchResults {
    success: bool,
    questions: Vec<Question>,
    total_questions: i64,
}

#[derive(Serialize)]
struct CreatedQuestion {
    success: bool,
    question: i64,
    total_questions: i64,
}

#[derive(Serialize)]
struct DeletedQuestion {
    success: bool,
    deleted: i64,
    total_questions: i64,
}

async fn get_questions(
    State(pool): State<SqlitePool>,
    QueryParams(PageQuery { page }): QueryParams<PageQuery>,
) -> ApiResponse<Json<QuestionsPage>> {
    let questions = questions::get_all_questions(&pool).await?;
    Ok(Json(QuestionsPage {
        success: true,
        questions: paginate(questions, page),
        total_questions: questions::count_questions(&pool).await?,
        categories: get_category_labels(&pool).await?,
    }))
}

async fn delete_question(
    State(pool): State<SqlitePool>,
    PathParam(id): PathParam<i64>,
) -> ApiResponse<Json<DeletedQuestion>> {
    questions::delete_question(&pool, id).await?;
    DELETED_QUESTIONS_CNTR.inc();
    tracing::info!("Deleted question {id}");

    Ok(Json(DeletedQuestion {
        success: true,
        deleted: id,
        total_questions: questions::count_questions(&pool).await?,
    }))
}

// total_questions is the size of the whole store, not the number of matches
async fn search_questions(pool: &SqlitePool, term: &str) -> ApiResponse<Json<SearchResults>> {
    let questions = questions::search_questions(pool, term).await?;
    tracing::debug!("Search for {term:?} matched {} questions", questions.len());
    Ok(Json(SearchResults {
        success: true,
        questions,
        total_questions: questions::count_questions(pool).await?,
    }))
}

async fn create_question(
    pool: &SqlitePool,
    new_question: NewQuestion,
) -> ApiResponse<Json<CreatedQuestion>> {
    let id = questions::create_question(
        pool,
        &new_question.question,
        &new_question.answer,
        new_question.category,
        new_question.difficulty,
    )
    .await?;
    CREATED_QUESTIONS_CNTR.inc();
    tracing::info!("Created question {id} in category {}", new_question.category);

    Ok(Json(CreatedQuestion {
        success: true,
        question: id,
        total_questions: questions::count_questions(pool).await?,
    }))
}

async fn create_or_search_question(
    State(pool): State<SqlitePool>,
    JsonBody(mut payload): JsonBody<QuestionPayload>,
) -> ApiResponse<Response> {
    let response = match payload.search_term.take() {
        Some(term) => search_questions(&pool, &term).await?.into_response(),
        None => create_question(&pool, payload.into_new_question()?)
            .await?
            .into_response(),
    };
    Ok(response)
}

async fn search(
    State(pool): State<SqlitePool>,
    JsonBody(SearchRequest { search_term }): JsonBody<SearchRequest>,
) -> ApiResponse<Json<SearchResults>> {
    let term = search_term.ok_or(ApiError::BadRequest)?;
    search_questions(&pool, &term).await
}

pub fn questions_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/questions",
            get(get_questions).post(create_or_search_question),
        )
        .route("/questions/search", post(search))
        .route("/questions/{id}", delete(delete_question))
        .with_state(state)
}
