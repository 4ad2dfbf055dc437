//! CSV import and export of the trivia tables, for seeding and backups.

use std::path::Path;

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::db::queries::categories::{get_all_categories, import_categories};
use crate::db::queries::questions::{get_all_questions, import_questions};
use crate::db::{Category, Question};

const CATEGORIES_FILE: &str = "categories.csv";
const QUESTIONS_FILE: &str = "questions.csv";

fn write_to(path: &Path, data: Vec<impl Serialize>) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Cannot create {}", path.display()))?;
    let mut wtr = csv::Writer::from_writer(file);
    for line in data {
        wtr.serialize(line)?;
    }
    wtr.flush()?;
    Ok(())
}

fn read_from<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    let file =
        std::fs::File::open(path).with_context(|| format!("Cannot open {}", path.display()))?;
    let mut rdr = csv::Reader::from_reader(file);
    let mut out = Vec::new();
    for record in rdr.deserialize() {
        let record: T = record.with_context(|| format!("Malformed row in {}", path.display()))?;
        out.push(record);
    }
    Ok(out)
}

pub async fn export_data(pool: &SqlitePool, path: &Path) -> anyhow::Result<()> {
    let categories = get_all_categories(pool).await?;
    let questions = get_all_questions(pool).await?;
    if !path.exists() {
        std::fs::create_dir_all(path)?
    }
    tracing::info!(
        "Exporting {} categories and {} questions to {}",
        categories.len(),
        questions.len(),
        path.display()
    );
    write_to(&path.join(CATEGORIES_FILE), categories)?;
    write_to(&path.join(QUESTIONS_FILE), questions)?;
    Ok(())
}

/// Replaces both tables with the files' contents in one transaction; nothing changes when any row fails.
pub async fn import_data(pool: &SqlitePool, path: &Path) -> anyhow::Result<()> {
    let categories: Vec<Category> = read_from(&path.join(CATEGORIES_FILE))?;
    let questions: Vec<Question> = read_from(&path.join(QUESTIONS_FILE))?;
    tracing::info!(
        "Importing {} categories and {} questions from {}",
        categories.len(),
        questions.len(),
        path.display()
    );
    let mut tx = pool.begin().await?;
    import_categories(&mut *tx, categories).await?;
    import_questions(&mut *tx, questions).await?;
    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::queries::questions::create_question;
    use crate::db::test_pool;

    #[tokio::test]
    async fn export_then_import_restores_tables() {
        let pool = test_pool().await;
        create_question(&pool, "Who painted the Mona Lisa?", "Da Vinci", 2, 3)
            .await
            .unwrap();
        create_question(&pool, "What is the heaviest organ?", "The liver", 1, 4)
            .await
            .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let backup = dir.path().join("backup");
        export_data(&pool, &backup).await.unwrap();

        let restored = test_pool().await;
        import_data(&restored, &backup).await.unwrap();

        assert_eq!(
            get_all_categories(&restored).await.unwrap(),
            get_all_categories(&pool).await.unwrap()
        );
        assert_eq!(
            get_all_questions(&restored).await.unwrap(),
            get_all_questions(&pool).await.unwrap()
        );
    }

    #[tokio::test]
    async fn failed_import_leaves_tables_untouched() {
        let pool = test_pool().await;
        for category in 1..=6 {
            create_question(&pool, &format!("question {category}"), "answer", category, 1)
                .await
                .unwrap();
        }
        let categories_before = get_all_categories(&pool).await.unwrap();
        let questions_before = get_all_questions(&pool).await.unwrap();

        // the only question refers to a category the file drops
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CATEGORIES_FILE), "id,type\n1,Science\n").unwrap();
        std::fs::write(
            dir.path().join(QUESTIONS_FILE),
            "id,question,answer,category,difficulty\n1,question 1,answer,2,1\n",
        )
        .unwrap();
        assert!(import_data(&pool, dir.path()).await.is_err());

        assert_eq!(get_all_categories(&pool).await.unwrap(), categories_before);
        assert_eq!(get_all_questions(&pool).await.unwrap(), questions_before);
    }

    #[tokio::test]
    async fn import_fails_without_files() {
        let pool = test_pool().await;
        let dir = tempfile::tempdir().unwrap();
        assert!(import_data(&pool, dir.path()).await.is_err());
    }

    #[test]
    fn category_csv_uses_type_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CATEGORIES_FILE);
        write_to(
            &path,
            vec![Category {
                id: 1,
                kind: "Science".to_owned(),
            }],
        )
        .unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "id,type\n1,Science\n");
    }
}
