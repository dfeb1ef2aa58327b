//! Captain's orders and ship alert status.

use std::sync::Arc;

use starbridge_domain::{
    Actor, AlertStatus, DomainError, LogEntryKind, Order, OrderId, OrderTarget, Ship, ShipId,
    MAX_ORDERS_PER_SHIP,
};

use super::{load_campaign, load_ship, ShipLogWriter};
use crate::infrastructure::ports::{
    CampaignRepo, Change, ChangeSet, ClockPort, OrderRepo, RepoError, ShipRepo, UnitOfWork,
};

#[derive(Debug, thiserror::Error)]
pub enum OrdersError {
    #[error("{}", .0.reason())]
    Rule(#[from] DomainError),
    #[error("This order is not addressed to your station")]
    NotAddressee,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

pub struct OrdersOps {
    orders: Arc<dyn OrderRepo>,
    ships: Arc<dyn ShipRepo>,
    campaigns: Arc<dyn CampaignRepo>,
    unit_of_work: Arc<dyn UnitOfWork>,
    clock: Arc<dyn ClockPort>,
    log: Arc<ShipLogWriter>,
}

impl OrdersOps {
    pub fn new(
        orders: Arc<dyn OrderRepo>,
        ships: Arc<dyn ShipRepo>,
        campaigns: Arc<dyn CampaignRepo>,
        unit_of_work: Arc<dyn UnitOfWork>,
        clock: Arc<dyn ClockPort>,
        log: Arc<ShipLogWriter>,
    ) -> Self {
        Self {
            orders,
            ships,
            campaigns,
            unit_of_work,
            clock,
            log,
        }
    }

    /// Record an order, trimming the ship's command log to the newest
    /// [`MAX_ORDERS_PER_SHIP`].
    pub async fn issue(
        &self,
        ship_id: ShipId,
        target: OrderTarget,
        text: &str,
        requires_ack: bool,
        issued_by: &str,
    ) -> Result<Order, OrdersError> {
        let ship = load_ship(self.ships.as_ref(), ship_id).await?;
        let campaign = load_campaign(self.campaigns.as_ref(), ship.campaign_id).await?;
        let order = Order::new(
            ship.id,
            target,
            text,
            requires_ack,
            self.clock.now(),
            campaign.current_time,
        )?;

        let existing = self.orders.list_for_ship(ship.id).await?;
        let excess = (existing.len() + 1).saturating_sub(MAX_ORDERS_PER_SHIP);
        let mut changes = ChangeSet::new().with(Change::Order(order.clone()));
        for stale in existing.iter().take(excess) {
            changes.push(Change::RemoveOrder(stale.id));
        }
        self.unit_of_work.commit(changes).await?;
        if excess > 0 {
            tracing::debug!(ship_id = %ship.id, evicted = excess, "Evicted oldest orders");
        }

        self.log
            .record(
                &ship,
                LogEntryKind::Orders,
                issued_by,
                format!("Order to {target}: {}", order.text),
            )
            .await;
        Ok(order)
    }

    /// Acknowledge an order. Returns the order and whether this call changed it;
    /// a repeat acknowledgement is a no-op.
    pub async fn acknowledge(
        &self,
        ship_id: ShipId,
        order_id: OrderId,
        actor: Actor,
        by: &str,
    ) -> Result<(Order, bool), OrdersError> {
        let mut order = self
            .orders
            .get(order_id)
            .await?
            .filter(|order| order.ship_id == ship_id)
            .ok_or_else(|| RepoError::not_found("Order", order_id))?;

        if !order.can_acknowledge(actor.role, actor.is_gm) {
            return Err(OrdersError::NotAddressee);
        }
        let changed = order.acknowledge(by, self.clock.now());
        if changed {
            self.orders.save(&order).await?;
        }
        Ok((order, changed))
    }

    pub async fn list(&self, ship_id: ShipId) -> Result<Vec<Order>, OrdersError> {
        Ok(self.orders.list_for_ship(ship_id).await?)
    }

    pub async fn set_alert(&self, ship_id: ShipId, status: AlertStatus) -> Result<Ship, OrdersError> {
        let mut ship = load_ship(self.ships.as_ref(), ship_id).await?;
        ship.alert_status = status;
        self.ships.save(&ship).await?;
        tracing::info!(ship_id = %ship.id, status = ?status, "Alert status changed");
        Ok(ship)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::ports::{
        MockCampaignRepo, MockOrderRepo, MockShipLogRepo, MockShipRepo, MockUnitOfWork,
    };
    use chrono::Utc;
    use starbridge_domain::{Campaign, CampaignTime, CrewRole, ShipTemplate};

    fn ops(orders: MockOrderRepo, ships: MockShipRepo, campaign: Option<Campaign>) -> OrdersOps {
        ops_with(orders, ships, campaign, MockUnitOfWork::new())
    }

    fn ops_with(
        orders: MockOrderRepo,
        ships: MockShipRepo,
        campaign: Option<Campaign>,
        unit_of_work: MockUnitOfWork,
    ) -> OrdersOps {
        let mut campaigns = MockCampaignRepo::new();
        if let Some(campaign) = campaign {
            campaigns
                .expect_get()
                .returning(move |_| Ok(Some(campaign.clone())));
        }
        let campaigns = Arc::new(campaigns);
        let clock = Arc::new(FixedClock(Utc::now()));
        let mut log = MockShipLogRepo::new();
        log.expect_append().returning(|_| Ok(()));
        let writer = Arc::new(ShipLogWriter::new(
            Arc::new(log),
            campaigns.clone(),
            clock.clone(),
        ));
        OrdersOps::new(
            Arc::new(orders),
            Arc::new(ships),
            campaigns,
            Arc::new(unit_of_work),
            clock,
            writer,
        )
    }

    fn pilot_order(ship_id: ShipId) -> Order {
        Order::new(
            ship_id,
            OrderTarget::Role(CrewRole::Pilot),
            "Bring us about",
            true,
            Utc::now(),
            CampaignTime::default(),
        )
        .expect("order")
    }

    #[tokio::test]
    async fn when_log_exceeds_cap_then_oldest_orders_are_evicted() {
        let campaign = Campaign::new("Outbound", "Sam", Utc::now()).expect("campaign");
        let ship = Ship::from_template(campaign.id, "Kestrel", ShipTemplate::Scout, Utc::now())
            .expect("ship");
        let ship_id = ship.id;
        let mut ships = MockShipRepo::new();
        ships.expect_get().returning(move |_| Ok(Some(ship.clone())));

        let history: Vec<Order> = (0..MAX_ORDERS_PER_SHIP + 1)
            .map(|_| pilot_order(ship_id))
            .collect();
        let oldest = [history[0].id, history[1].id];
        let mut orders = MockOrderRepo::new();
        orders
            .expect_list_for_ship()
            .returning(move |_| Ok(history.clone()));
        let mut unit_of_work = MockUnitOfWork::new();
        unit_of_work
            .expect_commit()
            .withf(move |changes| {
                matches!(
                    changes.changes(),
                    [Change::Order(issued), Change::RemoveOrder(first), Change::RemoveOrder(second)]
                        if issued.text == "Battle stations"
                            && [*first, *second] == oldest
                )
            })
            .times(1)
            .returning(|_| Ok(()));

        ops_with(orders, ships, Some(campaign), unit_of_work)
            .issue(ship_id, OrderTarget::All, "Battle stations", true, "Captain")
            .await
            .expect("issue");
    }

    #[tokio::test]
    async fn when_wrong_station_acknowledges_then_not_addressee() {
        let ship_id = ShipId::new();
        let order = pilot_order(ship_id);
        let order_id = order.id;
        let mut orders = MockOrderRepo::new();
        orders
            .expect_get()
            .returning(move |_| Ok(Some(order.clone())));
        orders.expect_save().times(0);

        let err = ops(orders, MockShipRepo::new(), None)
            .acknowledge(ship_id, order_id, Actor::crew(CrewRole::Gunner), "Gunner")
            .await
            .expect_err("wrong station");
        assert!(matches!(err, OrdersError::NotAddressee));
    }

    #[tokio::test]
    async fn when_acknowledged_twice_then_second_call_changes_nothing() {
        let ship_id = ShipId::new();
        let mut order = pilot_order(ship_id);
        order.acknowledge("Pilot", Utc::now());
        let order_id = order.id;
        let mut orders = MockOrderRepo::new();
        orders
            .expect_get()
            .returning(move |_| Ok(Some(order.clone())));
        orders.expect_save().times(0);

        let (order, changed) = ops(orders, MockShipRepo::new(), None)
            .acknowledge(ship_id, order_id, Actor::crew(CrewRole::Pilot), "Pilot")
            .await
            .expect("idempotent");
        assert!(!changed);
        assert_eq!(order.acknowledged_by.as_deref(), Some("Pilot"));
    }

    #[tokio::test]
    async fn when_order_belongs_to_another_ship_then_not_found() {
        let order = pilot_order(ShipId::new());
        let order_id = order.id;
        let mut orders = MockOrderRepo::new();
        orders
            .expect_get()
            .returning(move |_| Ok(Some(order.clone())));

        let err = ops(orders, MockShipRepo::new(), None)
            .acknowledge(ShipId::new(), order_id, Actor::gm(), "GM")
            .await
            .expect_err("other ship");
        assert!(matches!(err, OrdersError::Repo(RepoError::NotFound { .. })));
    }
}
