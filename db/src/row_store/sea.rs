use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, Set,
};

use super::{HEADER_ROW, RowStore, StoreError, check_cell};
use crate::models::sheet_cell::{ActiveModel, Column, Entity, Model};

/// Row Store backed by the `sheet_cells` table.
#[derive(Clone)]
pub struct SeaOrmRowStore {
    db: DatabaseConnection,
}

impl SeaOrmRowStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

fn to_index(v: usize) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}

/// Lays sparse cells of consecutive rows out as dense string rows.
fn densify(cells: Vec<Model>, first_row: i64) -> Vec<Vec<String>> {
    let mut out: Vec<Vec<String>> = Vec::new();
    for cell in cells {
        let r = (cell.row_idx - first_row) as usize;
        let c = (cell.col_idx - 1) as usize;
        if out.len() <= r {
            out.resize_with(r + 1, Vec::new);
        }
        let row = &mut out[r];
        if row.len() <= c {
            row.resize(c + 1, String::new());
        }
        row[c] = cell.value;
    }
    out
}

#[async_trait]
impl RowStore for SeaOrmRowStore {
    async fn header_row(&self) -> Result<Vec<String>, StoreError> {
        let cells = Entity::find()
            .filter(Column::RowIdx.eq(to_index(HEADER_ROW)))
            .filter(Column::ColIdx.gte(1))
            .order_by_asc(Column::ColIdx)
            .all(&self.db)
            .await?;
        Ok(densify(cells, to_index(HEADER_ROW))
            .into_iter()
            .next()
            .unwrap_or_default())
    }

    async fn find_row(&self, col: usize, value: &str) -> Result<Option<usize>, StoreError> {
        check_cell(HEADER_ROW, col)?;
        let hit = Entity::find()
            .filter(Column::ColIdx.eq(to_index(col)))
            .filter(Column::Value.eq(value))
            .filter(Column::RowIdx.gt(to_index(HEADER_ROW)))
            .order_by_asc(Column::RowIdx)
            .one(&self.db)
            .await?;
        Ok(hit.map(|c| c.row_idx as usize))
    }

    async fn read_cell(&self, row: usize, col: usize) -> Result<String, StoreError> {
        check_cell(row, col)?;
        let cell = Entity::find_by_id((to_index(row), to_index(col)))
            .one(&self.db)
            .await?;
        Ok(cell.map(|c| c.value).unwrap_or_default())
    }

    async fn write_cell(&self, row: usize, col: usize, value: &str) -> Result<(), StoreError> {
        check_cell(row, col)?;
        let cell = ActiveModel {
            row_idx: Set(to_index(row)),
            col_idx: Set(to_index(col)),
            value: Set(value.to_owned()),
            updated_at: Set(Utc::now()),
        };
        Entity::insert(cell)
            .on_conflict(
                OnConflict::columns([Column::RowIdx, Column::ColIdx])
                    .update_columns([Column::Value, Column::UpdatedAt])
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn records(&self) -> Result<Vec<Vec<String>>, StoreError> {
        let first = to_index(HEADER_ROW) + 1;
        let cells = Entity::find()
            .filter(Column::RowIdx.gte(first))
            .filter(Column::ColIdx.gte(1))
            .order_by_asc(Column::RowIdx)
            .order_by_asc(Column::ColIdx)
            .all(&self.db)
            .await?;
        Ok(densify(cells, first))
    }
}
