pub mod csv;
pub mod las;
pub mod report;

pub use crate::csv::write_csv;
pub use crate::las::{write_las, LasExportOptions};
pub use crate::report::write_report;
