use contracts::domain::a003_salesperson::SalespersonId;
use contracts::domain::a004_adjuster::AdjusterId;
use contracts::domain::a007_claim::{Claim, ClaimDto, ClaimId, ClaimListQuery};
use contracts::domain::common::AggregateRoot;
use contracts::enums::ClaimStatus;
use contracts::system::auth::TokenClaims;
use sea_orm::DatabaseConnection;

use super::repository;
use crate::domain::a001_sales_commission::service::ensure_salesperson_exists;
use crate::domain::a004_adjuster;
use crate::shared::error::{parse_optional_id, ServiceError};
use crate::system::auth::access;

/// Менеджер видит только дела, закрепленные за ним
fn ensure_visible(actor: &TokenClaims, claim: &Claim) -> anyhow::Result<()> {
    if actor.is_director() {
        return Ok(());
    }
    match claim.salesperson_id {
        Some(owner) => access::ensure_owner(actor, owner),
        None => Err(ServiceError::forbidden("You can only access your own records")),
    }
}

/// Ссылки дела: оценщик должен существовать, у менеджера продавцом всегда будет он сам
async fn resolve_links(
    db: &DatabaseConnection,
    dto: &ClaimDto,
    actor: &TokenClaims,
) -> anyhow::Result<(Option<AdjusterId>, Option<SalespersonId>)> {
    let adjuster_id = parse_optional_id::<AdjusterId>(&dto.adjuster_id)?;
    if let Some(id) = adjuster_id {
        if a004_adjuster::repository::get_by_id(db, id).await?.is_none() {
            return Err(ServiceError::validation(format!("Adjuster {} does not exist", id)));
        }
    }

    let requested = parse_optional_id::<SalespersonId>(&dto.salesperson_id)?;
    let salesperson_id = if actor.is_director() {
        requested
    } else {
        Some(access::resolve_owner(actor, requested)?)
    };
    if let Some(id) = salesperson_id {
        ensure_salesperson_exists(db, id).await?;
    }

    Ok((adjuster_id, salesperson_id))
}

async fn ensure_unique_number(
    db: &DatabaseConnection,
    claim: &Claim,
) -> anyhow::Result<()> {
    if let Some(existing) = repository::find_by_number(db, &claim.claim_number).await? {
        if existing.id != claim.id {
            return Err(ServiceError::conflict(format!(
                "Claim number {} already exists",
                claim.claim_number
            )));
        }
    }
    Ok(())
}

pub async fn create(
    db: &DatabaseConnection,
    dto: ClaimDto,
    actor: &TokenClaims,
) -> anyhow::Result<Claim> {
    let (adjuster_id, salesperson_id) = resolve_links(db, &dto, actor).await?;
    let mut claim = Claim::new_for_insert(&dto, adjuster_id, salesperson_id);
    claim.validate().map_err(ServiceError::validation)?;
    ensure_unique_number(db, &claim).await?;

    claim.before_write();
    repository::insert(db, &claim).await?;
    tracing::info!("Created claim {} ({})", claim.claim_number, claim.id);
    Ok(claim)
}

pub async fn update(
    db: &DatabaseConnection,
    id: ClaimId,
    dto: ClaimDto,
    actor: &TokenClaims,
) -> anyhow::Result<Claim> {
    let mut claim = get_by_id(db, id, actor).await?;
    let (adjuster_id, salesperson_id) = resolve_links(db, &dto, actor).await?;

    claim.update(&dto, adjuster_id, salesperson_id);
    claim.validate().map_err(ServiceError::validation)?;
    ensure_unique_number(db, &claim).await?;

    claim.before_write();
    repository::update(db, &claim).await?;
    Ok(claim)
}

pub async fn get_by_id(
    db: &DatabaseConnection,
    id: ClaimId,
    actor: &TokenClaims,
) -> anyhow::Result<Claim> {
    let claim = repository::get_by_id(db, id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Claim"))?;
    ensure_visible(actor, &claim)?;
    Ok(claim)
}

pub async fn list(
    db: &DatabaseConnection,
    query: ClaimListQuery,
    actor: &TokenClaims,
) -> anyhow::Result<Vec<Claim>> {
    let status = match query.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(code) => Some(ClaimStatus::from_code(code).ok_or_else(|| {
            ServiceError::validation(format!("Unknown claim status '{}'", code))
        })?),
        None => None,
    };
    let requested = parse_optional_id::<SalespersonId>(&query.salesperson_id)?;
    let scope = access::scope_salesperson(actor, requested)?;
    repository::list(db, status, scope).await
}

pub async fn delete(
    db: &DatabaseConnection,
    id: ClaimId,
    actor: &TokenClaims,
) -> anyhow::Result<()> {
    let claim = get_by_id(db, id, actor).await?;
    repository::delete(db, claim.id).await?;
    tracing::info!("Deleted claim {} ({})", claim.claim_number, id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::test_support::{director, rep, seed_salesperson, test_db};
    use contracts::domain::common::AggregateId;
    use contracts::enums::SalesRole;

    fn dto(number: &str) -> ClaimDto {
        ClaimDto {
            claim_number: number.into(),
            client_name: "Harbor View HOA".into(),
            loss_type: Some("Hurricane".into()),
            estimated_amount: Some(250000.0),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn duplicate_claim_number_conflicts() {
        let db = test_db().await;
        create(&db, dto("CLM-001"), &director()).await.unwrap();

        let err = create(&db, dto(" CLM-001 "), &director()).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ServiceError>(),
            Some(ServiceError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn update_keeps_status_unless_given() {
        let db = test_db().await;
        let claim = create(&db, dto("CLM-002"), &director()).await.unwrap();
        assert_eq!(claim.status, ClaimStatus::Open);

        let mut change = dto("CLM-002");
        change.status = Some(ClaimStatus::Settled);
        let claim = update(&db, claim.id, change, &director()).await.unwrap();
        assert_eq!(claim.status, ClaimStatus::Settled);

        let claim = update(&db, claim.id, dto("CLM-002"), &director())
            .await
            .unwrap();
        assert_eq!(claim.status, ClaimStatus::Settled);
    }

    #[tokio::test]
    async fn reps_are_pinned_to_their_claims() {
        let db = test_db().await;
        let dana = seed_salesperson(&db, "Dana", SalesRole::SalesRep).await;
        let eli = seed_salesperson(&db, "Eli", SalesRole::SalesRep).await;

        let mine = create(&db, dto("CLM-010"), &rep(dana.id)).await.unwrap();
        assert_eq!(mine.salesperson_id, Some(dana.id));

        let mut theirs = dto("CLM-011");
        theirs.salesperson_id = Some(eli.id.as_string());
        let theirs = create(&db, theirs, &director()).await.unwrap();
        let unassigned = create(&db, dto("CLM-012"), &director()).await.unwrap();

        let listed = list(&db, ClaimListQuery::default(), &rep(dana.id))
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert!(get_by_id(&db, theirs.id, &rep(dana.id)).await.is_err());
        assert!(get_by_id(&db, unassigned.id, &rep(dana.id)).await.is_err());

        let all = list(&db, ClaimListQuery::default(), &director()).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn filters_by_status_and_rejects_unknown() {
        let db = test_db().await;
        let mut closed = dto("CLM-020");
        closed.status = Some(ClaimStatus::Closed);
        create(&db, closed, &director()).await.unwrap();
        create(&db, dto("CLM-021"), &director()).await.unwrap();

        let query = ClaimListQuery {
            status: Some("closed".into()),
            salesperson_id: None,
        };
        let found = list(&db, query, &director()).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].claim_number, "CLM-020");

        let query = ClaimListQuery {
            status: Some("lost".into()),
            salesperson_id: None,
        };
        assert!(list(&db, query, &director()).await.is_err());
    }

    #[tokio::test]
    async fn unknown_adjuster_is_rejected() {
        let db = test_db().await;
        let mut claim = dto("CLM-030");
        claim.adjuster_id = Some(AdjusterId::new_v4().as_string());
        let err = create(&db, claim, &director()).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ServiceError>(),
            Some(ServiceError::Validation(_))
        ));
    }
}
