use std::collections::{BTreeMap, HashSet};

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_number_from_string;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::questions::{get_all_questions, get_questions_for_category},
        Question,
    },
    quiz::pick_next_question,
    server::app::AppState,
    telemetry::QUIZ_QUESTIONS_SERVED,
};

use super::{category_map, ApiError, ApiJson, ApiResponse};

/// Category id that stands for "all categories".
const ALL_CATEGORIES: i64 = 0;

#[derive(Deserialize)]
struct QuizCategory {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    id: i64,
}

#[derive(Deserialize)]
struct NextQuestionRequest {
    #[serde(default)]
    previous_questions: Option<Vec<i64>>,
    quiz_category: Option<QuizCategory>,
}

#[derive(Serialize)]
struct PlayCategories {
    success: bool,
    categories: BTreeMap<i64, String>,
}

#[derive(Serialize)]
struct NextQuestion {
    success: bool,
    question: Option<Question>,
}

async fn play_categories(State(pool): State<SqlitePool>) -> ApiResponse<Json<PlayCategories>> {
    Ok(Json(PlayCategories {
        success: true,
        categories: category_map(&pool).await?,
    }))
}

async fn next_question(
    State(pool): State<SqlitePool>,
    ApiJson(body): ApiJson<NextQuestionRequest>,
) -> ApiResponse<Json<NextQuestion>> {
    let category_id = body.quiz_category.ok_or(ApiError::BadRequest)?.id;
    let previous: HashSet<i64> = body
        .previous_questions
        .unwrap_or_default()
        .into_iter()
        .collect();

    let candidates = if category_id == ALL_CATEGORIES {
        get_all_questions(&pool).await?
    } else {
        get_questions_for_category(&pool, category_id).await?
    };
    let question = pick_next_question(candidates, &previous, &mut rand::thread_rng());

    match &question {
        Some(question) => {
            let label = if category_id == ALL_CATEGORIES {
                "all".to_owned()
            } else {
                category_id.to_string()
            };
            QUIZ_QUESTIONS_SERVED
                .with_label_values(&[label.as_str()])
                .inc();
            tracing::debug!("Serving question {} to quiz", question.id);
        }
        None => tracing::debug!("Quiz over, {} questions asked", previous.len()),
    }

    Ok(Json(NextQuestion {
        success: true,
        question,
    }))
}

pub fn quizzes_router(state: AppState) -> Router {
    Router::new()
        .route("/play", get(play_categories))
        .route("/play/getnextquestion", post(next_question))
        .with_state(state)
}
