/// Метаданные UseCase для идентификации и логирования
pub trait UseCaseMetadata {
    /// Индекс UseCase (например, "u001")
    fn usecase_index() -> &'static str;

    /// Техническое имя (например, "import_commissions")
    fn usecase_name() -> &'static str;

    /// Отображаемое имя для UI
    fn display_name() -> &'static str;

    fn description() -> &'static str {
        ""
    }

    /// Полное имя вида "u001_import_commissions"
    fn full_name() -> String {
        format!("{}_{}", Self::usecase_index(), Self::usecase_name())
    }
}
