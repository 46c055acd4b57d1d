pub mod m202510010001_create_sheet_cells;
