//! Разделение комиссии между продавцами.
//!
//! Планировщик не делает I/O: по доле основного продавца, ранее загруженному
//! набору связанных записей и текущему списку участников он строит наборы
//! обновлений, вставок и удалений. Применяет план backend в одной транзакции.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::aggregate::{SalesCommissionId, SplitParticipantDto};
use crate::domain::a003_salesperson::aggregate::SalespersonId;
use crate::domain::common::AggregateId;

/// Требуемая сумма долей
pub const SPLIT_TOTAL: f64 = 100.0;
/// Допуск при сравнении суммы долей
pub const SPLIT_TOLERANCE: f64 = 0.01;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SplitError {
    #[error("Split percentages must total 100% (currently {total}%)")]
    TotalNot100 { total: f64 },

    #[error("Splits for client '{client}' total {total}% instead of 100%")]
    ClientTotalNot100 { client: String, total: f64 },

    #[error("Split percentage {value}% for client '{client}' must be greater than 0 and at most 100")]
    OutOfRange { client: String, value: f64 },

    #[error("Invalid split participant: {0}")]
    InvalidParticipant(String),
}

/// Предупреждение, не блокирующее сохранение
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SplitWarning {
    /// Единственный владелец сделки с долей не 100%
    SingleOwnerNot100 { client: String, split_percentage: f64 },
}

impl std::fmt::Display for SplitWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SplitWarning::SingleOwnerNot100 {
                client,
                split_percentage,
            } => write!(
                f,
                "Client '{}' has a single owner with a {}% split",
                client, split_percentage
            ),
        }
    }
}

/// Участник разделения
#[derive(Debug, Clone, PartialEq)]
pub struct SplitParticipant {
    pub id: Option<SalesCommissionId>,
    pub salesperson_id: Option<SalespersonId>,
    pub split_percentage: f64,
}

impl SplitParticipant {
    pub fn existing(id: SalesCommissionId, salesperson_id: Option<SalespersonId>, pct: f64) -> Self {
        Self {
            id: Some(id),
            salesperson_id,
            split_percentage: pct,
        }
    }

    pub fn new_for(salesperson_id: SalespersonId, pct: f64) -> Self {
        Self {
            id: None,
            salesperson_id: Some(salesperson_id),
            split_percentage: pct,
        }
    }
}

impl TryFrom<&SplitParticipantDto> for SplitParticipant {
    type Error = SplitError;

    fn try_from(dto: &SplitParticipantDto) -> Result<Self, Self::Error> {
        let id = non_blank(&dto.id)
            .map(SalesCommissionId::from_string)
            .transpose()
            .map_err(SplitError::InvalidParticipant)?;
        let salesperson_id = non_blank(&dto.salesperson_id)
            .map(SalespersonId::from_string)
            .transpose()
            .map_err(SplitError::InvalidParticipant)?;
        Ok(Self {
            id,
            salesperson_id,
            split_percentage: dto.split_percentage,
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Обновление доли существующей записи
#[derive(Debug, Clone, PartialEq)]
pub struct SplitUpdate {
    pub id: SalesCommissionId,
    /// `None`: продавец не меняется
    pub salesperson_id: Option<SalespersonId>,
    pub split_percentage: f64,
}

/// Новая запись для участника
#[derive(Debug, Clone, PartialEq)]
pub struct SplitInsert {
    pub salesperson_id: SalespersonId,
    pub split_percentage: f64,
}

/// Наборы операций, применяемые в порядке update → insert → delete
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SplitPlan {
    pub updates: Vec<SplitUpdate>,
    pub inserts: Vec<SplitInsert>,
    pub deletes: Vec<SalesCommissionId>,
}

/// P₀ + Σ долей участников
pub fn split_total(primary_split_percentage: f64, participants: &[SplitParticipant]) -> f64 {
    primary_split_percentage
        + participants
            .iter()
            .map(|p| p.split_percentage)
            .sum::<f64>()
}

fn is_hundred(total: f64) -> bool {
    (total - SPLIT_TOTAL).abs() <= SPLIT_TOLERANCE
}

/// Проверка суммы долей в диалоге. Без участников проверка не выполняется.
pub fn check_split_total(
    primary_split_percentage: f64,
    participants: &[SplitParticipant],
) -> Result<(), SplitError> {
    if participants.is_empty() {
        return Ok(());
    }
    let total = split_total(primary_split_percentage, participants);
    if !is_hundred(total) {
        return Err(SplitError::TotalNot100 {
            total: round_pct(total),
        });
    }
    Ok(())
}

/// Построить план изменений разделения.
///
/// `previous_related`: связанные записи, загруженные при открытии диалога
/// (без основной записи). Участники без id и без продавца пропускаются.
/// Повторяющиеся продавцы не отклоняются.
pub fn plan_split_changes(
    primary_split_percentage: f64,
    previous_related: &[SalesCommissionId],
    participants: &[SplitParticipant],
) -> Result<SplitPlan, SplitError> {
    check_split_total(primary_split_percentage, participants)?;

    let mut plan = SplitPlan::default();
    let mut retained: HashSet<SalesCommissionId> = HashSet::new();

    for participant in participants {
        match (participant.id, participant.salesperson_id) {
            (Some(id), salesperson_id) => {
                retained.insert(id);
                plan.updates.push(SplitUpdate {
                    id,
                    salesperson_id,
                    split_percentage: participant.split_percentage,
                });
            }
            (None, Some(salesperson_id)) => plan.inserts.push(SplitInsert {
                salesperson_id,
                split_percentage: participant.split_percentage,
            }),
            (None, None) => {}
        }
    }

    plan.deletes = previous_related
        .iter()
        .filter(|id| !retained.contains(id))
        .copied()
        .collect();

    Ok(plan)
}

/// Ключ группы клиента: имя без внешних пробелов в нижнем регистре (Unicode).
/// Хранится в `a001_sales_commission.client_key`, по нему ищутся связанные записи.
pub fn client_key(client_name: &str) -> String {
    client_name.trim().to_lowercase()
}

/// Единая проверка инварианта разделения для всех путей изменения
/// (добавление сделки, редактирование разделения, импорт).
///
/// `rows`: пары (client_name, split_percentage) итогового набора записей.
pub fn validate_split_total<'a, I>(rows: I) -> Result<Vec<SplitWarning>, SplitError>
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let mut groups: BTreeMap<String, (String, Vec<f64>)> = BTreeMap::new();

    for (client_name, pct) in rows {
        let display = client_name.trim();
        if pct <= 0.0 || pct > SPLIT_TOTAL {
            return Err(SplitError::OutOfRange {
                client: display.to_string(),
                value: pct,
            });
        }
        groups
            .entry(client_key(display))
            .or_insert_with(|| (display.to_string(), Vec::new()))
            .1
            .push(pct);
    }

    let mut warnings = Vec::new();
    for (display, shares) in groups.into_values() {
        let total: f64 = shares.iter().sum();
        if shares.len() > 1 {
            if !is_hundred(total) {
                return Err(SplitError::ClientTotalNot100 {
                    client: display,
                    total: round_pct(total),
                });
            }
        } else if !is_hundred(total) {
            warnings.push(SplitWarning::SingleOwnerNot100 {
                client: display,
                split_percentage: total,
            });
        }
    }

    Ok(warnings)
}

fn round_pct(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> SalesCommissionId {
        SalesCommissionId::new_v4()
    }

    fn person() -> SalespersonId {
        SalespersonId::new_v4()
    }

    #[test]
    fn plan_counts_updates_inserts_and_deletes() {
        let kept = id();
        let dropped_a = id();
        let dropped_b = id();
        let previous = vec![kept, dropped_a, dropped_b];

        let participants = vec![
            SplitParticipant::existing(kept, None, 30.0),
            SplitParticipant::new_for(person(), 20.0),
        ];

        let plan = plan_split_changes(50.0, &previous, &participants).unwrap();
        assert_eq!(plan.updates.len(), 1);
        assert_eq!(plan.updates[0].id, kept);
        assert_eq!(plan.updates[0].split_percentage, 30.0);
        assert_eq!(plan.inserts.len(), 1);
        assert_eq!(plan.inserts[0].split_percentage, 20.0);
        assert_eq!(plan.deletes, vec![dropped_a, dropped_b]);
    }

    #[test]
    fn rejects_total_other_than_hundred() {
        let participants = vec![SplitParticipant::new_for(person(), 40.0)];
        let err = plan_split_changes(50.0, &[], &participants).unwrap_err();
        assert_eq!(err, SplitError::TotalNot100 { total: 90.0 });
        assert_eq!(
            err.to_string(),
            "Split percentages must total 100% (currently 90%)"
        );
    }

    #[test]
    fn no_participants_skips_sum_check() {
        let previous = vec![id()];
        let plan = plan_split_changes(70.0, &previous, &[]).unwrap();
        assert!(plan.updates.is_empty());
        assert!(plan.inserts.is_empty());
        assert_eq!(plan.deletes, previous);
    }

    #[test]
    fn tolerates_rounding_noise() {
        let participants = vec![
            SplitParticipant::new_for(person(), 33.33),
            SplitParticipant::new_for(person(), 33.33),
        ];
        assert!(check_split_total(33.34, &participants).is_ok());
    }

    #[test]
    fn participant_without_id_or_salesperson_is_ignored() {
        let participants = vec![
            SplitParticipant {
                id: None,
                salesperson_id: None,
                split_percentage: 0.0,
            },
            SplitParticipant::new_for(person(), 50.0),
        ];
        let plan = plan_split_changes(50.0, &[], &participants).unwrap();
        assert_eq!(plan.inserts.len(), 1);
        assert!(plan.updates.is_empty());
    }

    #[test]
    fn duplicate_salespeople_are_not_rejected() {
        let same = person();
        let participants = vec![
            SplitParticipant::new_for(same, 25.0),
            SplitParticipant::new_for(same, 25.0),
        ];
        let plan = plan_split_changes(50.0, &[], &participants).unwrap();
        assert_eq!(plan.inserts.len(), 2);
    }

    #[test]
    fn parses_participant_dto() {
        let dto = SplitParticipantDto {
            id: Some("  ".into()),
            salesperson_id: Some(person().to_string()),
            split_percentage: 25.0,
        };
        let participant = SplitParticipant::try_from(&dto).unwrap();
        assert!(participant.id.is_none());
        assert!(participant.salesperson_id.is_some());

        let bad = SplitParticipantDto {
            id: Some("nope".into()),
            ..Default::default()
        };
        assert!(matches!(
            SplitParticipant::try_from(&bad),
            Err(SplitError::InvalidParticipant(_))
        ));
    }

    #[test]
    fn validator_groups_by_client_name() {
        let rows = vec![
            ("Harbor View HOA", 60.0),
            ("harbor view hoa ", 40.0),
            ("Lakeside Plaza", 100.0),
        ];
        let warnings = validate_split_total(rows).unwrap();
        assert!(warnings.is_empty());
    }

    #[test]
    fn client_key_folds_unicode_case() {
        assert_eq!(client_key("  ÉCOLE du Nord "), "école du nord");
        let rows = vec![("ÉCOLE DU NORD", 60.0), ("école du nord", 30.0)];
        assert!(matches!(
            validate_split_total(rows),
            Err(SplitError::ClientTotalNot100 { .. })
        ));
    }

    #[test]
    fn validator_rejects_bad_group_and_warns_on_single_owner() {
        let err = validate_split_total(vec![("Acme", 60.0), ("Acme", 30.0)]).unwrap_err();
        assert_eq!(
            err,
            SplitError::ClientTotalNot100 {
                client: "Acme".into(),
                total: 90.0
            }
        );

        let warnings = validate_split_total(vec![("Solo", 80.0)]).unwrap();
        assert_eq!(
            warnings,
            vec![SplitWarning::SingleOwnerNot100 {
                client: "Solo".into(),
                split_percentage: 80.0
            }]
        );
    }

    #[test]
    fn validator_rejects_out_of_range_share() {
        assert!(matches!(
            validate_split_total(vec![("Acme", 0.0), ("Acme", 100.0)]),
            Err(SplitError::OutOfRange { .. })
        ));
        assert!(matches!(
            validate_split_total(vec![("Acme", 120.0)]),
            Err(SplitError::OutOfRange { .. })
        ));
    }
}
