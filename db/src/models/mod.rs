pub mod sheet_cell;

pub use sheet_cell::Entity as SheetCell;
