use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{
            categories::get_all_categories,
            questions::{count_questions_for_category, get_questions_for_category_page},
        },
        Category, Question,
    },
    server::app::AppState,
};

use super::{ApiError, ApiPath, ApiQuery, ApiResponse, PageQuery};

#[derive(Serialize)]
struct CategoriesList {
    success: bool,
    categories: Vec<Category>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CategoryQuestions {
    success: bool,
    questions: Vec<Question>,
    page: i64,
    total_questions: i64,
    current_category: i64,
}

async fn list_categories(State(pool): State<SqlitePool>) -> ApiResponse<Json<CategoriesList>> {
    let categories = get_all_categories(&pool).await?;
    if categories.is_empty() {
        return Err(ApiError::NotFound);
    }
    Ok(Json(CategoriesList {
        success: true,
        categories,
    }))
}

async fn category_questions(
    State(pool): State<SqlitePool>,
    ApiPath(category_id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResponse<Json<CategoryQuestions>> {
    let page = query.page();
    let questions = get_questions_for_category_page(&pool, category_id, page).await?;
    let total_questions = count_questions_for_category(&pool, category_id).await?;
    Ok(Json(CategoryQuestions {
        success: true,
        questions,
        page: page.number(),
        total_questions,
        current_category: category_id,
    }))
}

pub fn category_router(state: AppState) -> Router {
    Router::new()
        .route("/categories", get(list_categories))
        .route("/categories/{category_id}", get(category_questions))
        .with_state(state)
}
