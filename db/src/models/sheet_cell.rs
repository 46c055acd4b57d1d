use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// One non-empty cell of the attendance sheet. Row 1 is the header row.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "sheet_cells")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub row_idx: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub col_idx: i64,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
