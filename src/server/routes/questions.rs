use std::collections::BTreeMap;

use axum::{
    extract::State,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_option_number_from_string;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{categories::get_category_at, questions},
        Question,
    },
    server::app::AppState,
};

use super::{category_map, ApiError, ApiJson, ApiPath, ApiQuery, ApiResponse, PageQuery};

#[derive(Deserialize)]
struct SearchBody {
    #[serde(rename = "searchTerm")]
    search_term: Option<String>,
}

#[derive(Deserialize)]
struct NewQuestion {
    question: Option<String>,
    answer: Option<String>,
    // zero-based position in the category list the client renders
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    category: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    difficulty: Option<i64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QuestionsPage {
    success: bool,
    questions: Vec<Question>,
    total_questions: i64,
    categories: BTreeMap<i64, String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Deleted {
    success: bool,
    deleted: i64,
    total_questions: i64,
}

#[derive(Serialize)]
struct Created {
    success: bool,
    created: i64,
    questions: Vec<Question>,
    total_questions: i64,
}

fn required_text(value: Option<String>) -> Result<String, ApiError> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(ApiError::Unprocessable),
    }
}

async fn list_questions(
    State(pool): State<SqlitePool>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResponse<Json<QuestionsPage>> {
    let questions = questions::get_questions_page(&pool, query.page()).await?;
    Ok(Json(QuestionsPage {
        success: true,
        questions,
        total_questions: questions::count_questions(&pool).await?,
        categories: category_map(&pool).await?,
    }))
}

async fn search_questions(
    State(pool): State<SqlitePool>,
    ApiQuery(query): ApiQuery<PageQuery>,
    ApiJson(body): ApiJson<SearchBody>,
) -> ApiResponse<Json<QuestionsPage>> {
    let term = body.search_term.ok_or(ApiError::NotFound)?;
    tracing::debug!("Searching questions for {term:?}");
    let matches = questions::search_questions(&pool, &term).await?;
    let total_questions = i64::try_from(matches.len()).unwrap_or(i64::MAX);
    Ok(Json(QuestionsPage {
        success: true,
        questions: query.page().slice(matches),
        total_questions,
        categories: category_map(&pool).await?,
    }))
}

async fn delete_question(
    State(pool): State<SqlitePool>,
    ApiPath(question_id): ApiPath<i64>,
) -> ApiResponse<Json<Deleted>> {
    questions::delete_question(&pool, question_id).await?;
    tracing::info!("Deleted question {question_id}");
    Ok(Json(Deleted {
        success: true,
        deleted: question_id,
        total_questions: questions::count_questions(&pool).await?,
    }))
}

async fn create_question(
    State(pool): State<SqlitePool>,
    ApiQuery(query): ApiQuery<PageQuery>,
    ApiJson(new_question): ApiJson<NewQuestion>,
) -> ApiResponse<Json<Created>> {
    let question = required_text(new_question.question)?;
    let answer = required_text(new_question.answer)?;
    let difficulty = new_question.difficulty.ok_or(ApiError::Unprocessable)?;
    let position = new_question.category.ok_or(ApiError::Unprocessable)?;
    let category = get_category_at(&pool, position)
        .await
        .map_err(|error| match error {
            sqlx::Error::RowNotFound => ApiError::Unprocessable,
            error => error.into(),
        })?;

    let id = questions::create_question(&pool, &question, &answer, category.id, difficulty).await?;
    tracing::info!("Created question {id} in category {}", category.kind);

    Ok(Json(Created {
        success: true,
        created: id,
        questions: questions::get_questions_page(&pool, query.page()).await?,
        total_questions: questions::count_questions(&pool).await?,
    }))
}

pub fn questions_router(state: AppState) -> Router {
    Router::new()
        .route("/questions", get(list_questions).post(search_questions))
        .route("/questions/{question_id}", delete(delete_question))
        .route("/add", post(create_question))
        .with_state(state)
}
