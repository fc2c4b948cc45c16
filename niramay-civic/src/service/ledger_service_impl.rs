use niramay::db::AppDbHandle;
use uuid::Uuid;

use crate::{
    entity::{EcoPoints, EcoStoreItem, TransactionKind},
    repository::{NewPointTransaction, Repositories},
    service::{AwardCommand, LedgerServiceTx},
};

pub const COMPLETION_DESCRIPTION: &str = "Cleanup completed";

pub fn redemption_description(item: &EcoStoreItem) -> String {
    format!("Redeemed: {}", item.name)
}

pub struct LedgerServiceImpl {
    pub repos: Repositories,
}

impl LedgerServiceImpl {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }
}

#[async_trait::async_trait]
impl LedgerServiceTx for LedgerServiceImpl {
    async fn award_completion(
        &self,
        h: &mut AppDbHandle<'_>,
        command: AwardCommand,
    ) -> niramay::Result<EcoPoints> {
        if command.points <= 0 {
            tracing::debug!(points = command.points, "reward disabled");
            return Ok(self
                .repos
                .points
                .find_account(h, command.user_id)
                .await?
                .unwrap_or_else(|| EcoPoints::empty(command.user_id)));
        }

        self.repos
            .points
            .insert_transaction(
                h,
                NewPointTransaction {
                    user_id: command.user_id,
                    kind: TransactionKind::Earned,
                    points: command.points,
                    description: COMPLETION_DESCRIPTION.to_string(),
                    complaint_id: Some(command.complaint_id),
                    task_id: Some(command.task_id),
                },
            )
            .await?;
        let balance =
            self.repos.points.credit(h, command.user_id, command.points).await?;
        tracing::info!(
            user_id = %command.user_id,
            points = command.points,
            balance = balance.points,
            "points awarded"
        );
        Ok(balance)
    }

    async fn spend(
        &self,
        h: &mut AppDbHandle<'_>,
        user_id: Uuid,
        item: &EcoStoreItem,
    ) -> niramay::Result<EcoPoints> {
        self.repos
            .points
            .insert_transaction(
                h,
                NewPointTransaction {
                    user_id,
                    kind: TransactionKind::Redeemed,
                    points: item.points_cost,
                    description: redemption_description(item),
                    complaint_id: None,
                    task_id: None,
                },
            )
            .await?;
        self.repos
            .points
            .debit(h, user_id, item.points_cost)
            .await?
            .ok_or_else(|| {
                niramay::Error::Validation(format!(
                    "insufficient points: {} needed",
                    item.points_cost
                ))
            })
    }
}
