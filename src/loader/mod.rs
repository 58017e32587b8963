pub mod csv_export;
pub mod parser;
pub mod reservation_file;
