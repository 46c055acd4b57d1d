// migration: create_sheet_cells
//
// Local stand-in for the attendance spreadsheet: one row per non-empty cell,
// addressed by 1-based (row_idx, col_idx). Row 1 holds the header.
use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202510010001_create_sheet_cells"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("sheet_cells"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("row_idx"))
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("col_idx"))
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("value"))
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Alias::new("updated_at"))
                            .timestamp()
                            .not_null()
                            .default(Expr::cust("CURRENT_TIMESTAMP")),
                    )
                    .primary_key(
                        Index::create()
                            .col(Alias::new("row_idx"))
                            .col(Alias::new("col_idx")),
                    )
                    .to_owned(),
            )
            .await?;

        // find_row scans one column for an exact value
        manager
            .create_index(
                Index::create()
                    .name("idx_sheet_cells_col_value")
                    .table(Alias::new("sheet_cells"))
                    .col(Alias::new("col_idx"))
                    .col(Alias::new("value"))
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(Alias::new("sheet_cells"))
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}
