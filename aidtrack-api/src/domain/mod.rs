pub mod models;
pub mod project_date;
pub mod project_row;
