pub mod common;
pub mod u001_import_commissions;
