use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
}

pub async fn get_all_categories(pool: &SqlitePool) -> sqlx::Result<Vec<Category>> {
    sqlx::query_as::<_, Category>(
        r#"
SELECT id, type
FROM categories
ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
}

/// Category at zero-based `position` in id order, the way clients list them.
pub async fn get_category_at(pool: &SqlitePool, position: i64) -> sqlx::Result<Category> {
    if position < 0 {
        return Err(sqlx::Error::RowNotFound);
    }
    sqlx::query_as::<_, Category>(
        r#"
        SELECT id, type FROM categories ORDER BY id LIMIT 1 OFFSET ?1
        "#,
    )
    .bind(position)
    .fetch_one(pool)
    .await
}

async fn insert_category(conn: &mut SqliteConnection, category: &Category) -> sqlx::Result<()> {
    sqlx::query(
        r#"
INSERT INTO categories (id, type) VALUES (?1, ?2)
        "#,
    )
    .bind(category.id)
    .bind(&category.kind)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn update_category(conn: &mut SqliteConnection, category: &Category) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        UPDATE categories SET type=?1 WHERE categories.id = ?2
        "#,
    )
    .bind(&category.kind)
    .bind(category.id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

// questions of the category go with it
async fn delete_category(conn: &mut SqliteConnection, id: i64) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        DELETE FROM categories WHERE categories.id = ?1
        "#,
    )
    .bind(id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Makes the table hold exactly `categories`, keeping their ids.
///
/// Runs on the caller's connection so a restore can share one transaction.
pub async fn import_categories(
    conn: &mut SqliteConnection,
    categories: Vec<Category>,
) -> sqlx::Result<()> {
    let existing_ids: HashSet<i64> = sqlx::query_scalar::<_, i64>("SELECT id FROM categories")
        .fetch_all(&mut *conn)
        .await?
        .into_iter()
        .collect();
    let new_ids: HashSet<i64> = categories.iter().map(|c| c.id).collect();
    for id in existing_ids.difference(&new_ids) {
        delete_category(conn, *id).await?;
    }
    for category in categories {
        if existing_ids.contains(&category.id) {
            update_category(conn, &category).await?;
        } else {
            insert_category(conn, &category).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn lists_categories_in_id_order() {
        let pool = test_pool().await;
        let categories = get_all_categories(&pool).await.unwrap();
        let names: Vec<&str> = categories.iter().map(|c| c.kind.as_str()).collect();
        assert_eq!(
            names,
            ["Science", "Art", "Geography", "History", "Entertainment", "Sports"]
        );
    }

    #[tokio::test]
    async fn position_resolves_against_id_order() {
        let pool = test_pool().await;
        assert_eq!(get_category_at(&pool, 0).await.unwrap().kind, "Science");
        assert_eq!(get_category_at(&pool, 2).await.unwrap().id, 3);
        assert!(matches!(
            get_category_at(&pool, 6).await,
            Err(sqlx::Error::RowNotFound)
        ));
        assert!(matches!(
            get_category_at(&pool, -1).await,
            Err(sqlx::Error::RowNotFound)
        ));
    }

    #[tokio::test]
    async fn import_replaces_table_contents() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        import_categories(
            &mut *conn,
            vec![
                Category {
                    id: 2,
                    kind: "Painting".to_owned(),
                },
                Category {
                    id: 42,
                    kind: "Music".to_owned(),
                },
            ],
        )
        .await
        .unwrap();
        drop(conn);

        let categories = get_all_categories(&pool).await.unwrap();
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].kind, "Painting");
        assert_eq!(categories[1].id, 42);
    }

    #[test]
    fn serializes_label_as_type() {
        let category = Category {
            id: 1,
            kind: "Science".to_owned(),
        };
        assert_eq!(
            serde_json::to_value(&category).unwrap(),
            serde_json::json!({"id": 1, "type": "Science"})
        );
    }
}
