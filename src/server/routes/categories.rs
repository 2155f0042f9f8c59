use std::collections::BTreeMap;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{categories::get_category_labels, questions},
        Question,
    },
    server::{
        app::AppState,
        extractors::{PathParam, QueryParams},
        pagination::{paginate, PageQuery},
    },
};

use super::ApiResponse;

#[derive(Serialize)]
struct CategoriesResponse {
    success: bool,
    categories: BTreeMap<i64, String>,
}

#[derive(Serialize)]
struct CategoryQuestionsPage {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
    current_category: i64,
}

async fn get_categories(State(pool): State<SqlitePool>) -> ApiResponse<Json<CategoriesResponse>> {
    Ok(Json(CategoriesResponse {
        success: true,
        categories: get_category_labels(&pool).await?,
    }))
}

async fn questions_for_category(
    State(pool): State<SqlitePool>,
    PathParam(id): PathParam<i64>,
    QueryParams(PageQuery { page }): QueryParams<PageQuery>,
) -> ApiResponse<Json<CategoryQuestionsPage>> {
    let questions = questions::get_questions_for_category(&pool, id).await?;
    let total_questions = questions.len();
    Ok(Json(CategoryQuestionsPage {
        success: true,
        questions: paginate(questions, page),
        total_questions,
        current_category: id,
    }))
}

pub fn category_router(state: AppState) -> Router {
    Router::new()
        .route("/categories", get(get_categories))
        .route("/categories/{id}/questions", get(questions_for_category))
        .with_state(state)
}
