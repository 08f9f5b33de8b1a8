//! Reading price workbooks.

mod workbook;

pub use workbook::{load_workbook, Cell, LoadOptions, RawTable, Workbook};
