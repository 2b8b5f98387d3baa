//! Проверка прав: директор видит и меняет все, менеджер только записи
//! своего продавца.

use contracts::domain::a003_salesperson::SalespersonId;
use contracts::domain::common::AggregateId;
use contracts::system::auth::TokenClaims;

use crate::shared::error::ServiceError;

/// Продавец, к которому привязан пользователь
pub fn linked_salesperson(claims: &TokenClaims) -> Option<SalespersonId> {
    claims
        .salesperson_id
        .as_deref()
        .and_then(|id| SalespersonId::from_string(id).ok())
}

pub fn ensure_director(claims: &TokenClaims, action: &str) -> anyhow::Result<()> {
    if claims.is_director() {
        return Ok(());
    }
    Err(ServiceError::forbidden(format!(
        "Only a sales director can {}",
        action
    )))
}

/// Запись продавца `owner` доступна пользователю
pub fn ensure_owner(claims: &TokenClaims, owner: SalespersonId) -> anyhow::Result<()> {
    if claims.is_director() || linked_salesperson(claims) == Some(owner) {
        return Ok(());
    }
    Err(ServiceError::forbidden(
        "You can only access your own records",
    ))
}

/// Фильтр по продавцу для списков: менеджер всегда ограничен собой
pub fn scope_salesperson(
    claims: &TokenClaims,
    requested: Option<SalespersonId>,
) -> anyhow::Result<Option<SalespersonId>> {
    if claims.is_director() {
        return Ok(requested);
    }
    let own = linked_salesperson(claims)
        .ok_or_else(|| ServiceError::forbidden("Your account is not linked to a salesperson"))?;
    match requested {
        Some(other) if other != own => Err(ServiceError::forbidden(
            "You can only access your own records",
        )),
        _ => Ok(Some(own)),
    }
}

/// Владелец новой записи: указанный явно или продавец пользователя
pub fn resolve_owner(
    claims: &TokenClaims,
    requested: Option<SalespersonId>,
) -> anyhow::Result<SalespersonId> {
    scope_salesperson(claims, requested)?
        .or_else(|| linked_salesperson(claims))
        .ok_or_else(|| ServiceError::validation("Salesperson is required"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::test_support::{director, rep};

    #[test]
    fn directors_pass_everything() {
        let claims = director();
        let someone = SalespersonId::new_v4();
        assert!(ensure_director(&claims, "approve plans").is_ok());
        assert!(ensure_owner(&claims, someone).is_ok());
        assert_eq!(scope_salesperson(&claims, None).unwrap(), None);
        assert_eq!(resolve_owner(&claims, Some(someone)).unwrap(), someone);
        assert!(resolve_owner(&claims, None).is_err());
    }

    #[test]
    fn reps_are_limited_to_themselves() {
        let own = SalespersonId::new_v4();
        let other = SalespersonId::new_v4();
        let claims = rep(own);

        assert!(ensure_director(&claims, "approve plans").is_err());
        assert!(ensure_owner(&claims, own).is_ok());
        assert!(ensure_owner(&claims, other).is_err());
        assert_eq!(scope_salesperson(&claims, None).unwrap(), Some(own));
        assert!(scope_salesperson(&claims, Some(other)).is_err());
        assert_eq!(resolve_owner(&claims, None).unwrap(), own);
    }
}
