//! PostgreSQL Store
//!
//! sqlx-backed implementation of the catalog stores.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::{SoilFormula, SoilFormulaLine, SoilType};

use super::{SoilFormulaStore, SoilTypeStore, StoreError};

type FormulaRow = (Uuid, String, DateTime<Utc>, DateTime<Utc>);
type LineRow = (Uuid, i32, i32, i32);

/// PostgreSQL store for soil types and formulas
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_lines(
        &self,
        formula_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<SoilFormulaLine>>, StoreError> {
        let rows: Vec<LineRow> = sqlx::query_as(
            r#"
            SELECT formula_id, soil_type_id, percentage, sort_order
            FROM soil_formula_items
            WHERE formula_id = ANY($1)
            ORDER BY formula_id, sort_order, soil_type_id
            "#,
        )
        .bind(formula_ids.to_vec())
        .fetch_all(&self.pool)
        .await?;

        let mut lines: HashMap<Uuid, Vec<SoilFormulaLine>> = HashMap::new();
        for (formula_id, soil_type_id, percentage, sort_order) in rows {
            lines
                .entry(formula_id)
                .or_default()
                .push(SoilFormulaLine::new(soil_type_id, percentage, sort_order));
        }
        Ok(lines)
    }

    async fn assemble(&self, rows: Vec<FormulaRow>) -> Result<Vec<SoilFormula>, StoreError> {
        let ids: Vec<Uuid> = rows.iter().map(|(id, ..)| *id).collect();
        let mut lines = self.load_lines(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|(id, name, created_at, updated_at)| {
                let items = lines.remove(&id).unwrap_or_default();
                SoilFormula::restore(id, name, items, created_at, updated_at)
            })
            .collect())
    }

    async fn insert_lines(
        tx: &mut Transaction<'_, Postgres>,
        formula: &SoilFormula,
    ) -> Result<(), StoreError> {
        for line in formula.items() {
            sqlx::query(
                r#"
                INSERT INTO soil_formula_items (formula_id, soil_type_id, percentage, sort_order)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(formula.id())
            .bind(line.soil_type_id())
            .bind(line.percentage())
            .bind(line.order())
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl SoilTypeStore for PgStore {
    async fn list_soil_types(&self) -> Result<Vec<SoilType>, StoreError> {
        let rows: Vec<(i32, String)> =
            sqlx::query_as(r#"SELECT id, name FROM soil_types ORDER BY name COLLATE "C", id"#)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(soil_type_from_row).collect())
    }

    async fn get_soil_type(&self, id: i32) -> Result<Option<SoilType>, StoreError> {
        let row: Option<(i32, String)> =
            sqlx::query_as("SELECT id, name FROM soil_types WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(soil_type_from_row))
    }

    async fn find_soil_type_by_name(&self, name: &str) -> Result<Option<SoilType>, StoreError> {
        let row: Option<(i32, String)> =
            sqlx::query_as("SELECT id, name FROM soil_types WHERE name = $1")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(soil_type_from_row))
    }

    async fn insert_soil_type(&self, name: &str) -> Result<SoilType, StoreError> {
        let id: i32 = sqlx::query_scalar("INSERT INTO soil_types (name) VALUES ($1) RETURNING id")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;

        Ok(SoilType::restore(id, name.to_string()))
    }

    async fn update_soil_type(&self, soil_type: &SoilType) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE soil_types SET name = $2 WHERE id = $1")
            .bind(soil_type.id())
            .bind(soil_type.name())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_soil_type(&self, id: i32) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM soil_types WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn is_soil_type_referenced(&self, id: i32) -> Result<bool, StoreError> {
        let referenced: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM soil_formula_items WHERE soil_type_id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(referenced)
    }

    async fn soil_type_names(&self, ids: &[i32]) -> Result<HashMap<i32, String>, StoreError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(i32, String)> =
            sqlx::query_as("SELECT id, name FROM soil_types WHERE id = ANY($1)")
                .bind(ids.to_vec())
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().collect())
    }
}

#[async_trait]
impl SoilFormulaStore for PgStore {
    async fn list_soil_formulas(&self) -> Result<Vec<SoilFormula>, StoreError> {
        let rows: Vec<FormulaRow> = sqlx::query_as(
            r#"SELECT id, name, created_at, updated_at FROM soil_formulas ORDER BY name COLLATE "C", id"#,
        )
        .fetch_all(&self.pool)
        .await?;

        self.assemble(rows).await
    }

    async fn get_soil_formula(&self, id: Uuid) -> Result<Option<SoilFormula>, StoreError> {
        let row: Option<FormulaRow> = sqlx::query_as(
            "SELECT id, name, created_at, updated_at FROM soil_formulas WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.assemble(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn find_soil_formula_by_name(
        &self,
        name: &str,
    ) -> Result<Option<SoilFormula>, StoreError> {
        let row: Option<FormulaRow> = sqlx::query_as(
            "SELECT id, name, created_at, updated_at FROM soil_formulas WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.assemble(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn insert_soil_formula(&self, formula: &SoilFormula) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO soil_formulas (id, name, created_at, updated_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(formula.id())
        .bind(formula.name())
        .bind(formula.created_at())
        .bind(formula.updated_at())
        .execute(&mut *tx)
        .await?;

        Self::insert_lines(&mut tx, formula).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn update_soil_formula(&self, formula: &SoilFormula) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("UPDATE soil_formulas SET name = $2, updated_at = $3 WHERE id = $1")
            .bind(formula.id())
            .bind(formula.name())
            .bind(formula.updated_at())
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        // Lines are replaced wholesale
        sqlx::query("DELETE FROM soil_formula_items WHERE formula_id = $1")
            .bind(formula.id())
            .execute(&mut *tx)
            .await?;

        Self::insert_lines(&mut tx, formula).await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn delete_soil_formula(&self, id: Uuid) -> Result<bool, StoreError> {
        // Lines go with the formula (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM soil_formulas WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn soil_type_from_row((id, name): (i32, String)) -> SoilType {
    SoilType::restore(id, name)
}
