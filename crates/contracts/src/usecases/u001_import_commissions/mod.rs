pub mod request;
pub mod response;
pub mod row;

pub use request::ImportCommissionsRequest;
pub use response::{ImportCommissionsResponse, SkippedRow};
pub use row::{ImportColumn, ImportRow};

use crate::usecases::common::UseCaseMetadata;

pub struct ImportCommissions;

impl UseCaseMetadata for ImportCommissions {
    fn usecase_index() -> &'static str {
        "u001"
    }

    fn usecase_name() -> &'static str {
        "import_commissions"
    }

    fn display_name() -> &'static str {
        "Import commissions"
    }

    fn description() -> &'static str {
        "Пакетная загрузка сделок из таблицы (строки уже разобраны клиентом или CSV)"
    }
}
