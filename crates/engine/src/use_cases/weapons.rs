//! Weapons use cases: rules of engagement, fire resolution and combat rounds.

use std::sync::Arc;

use starbridge_domain::{
    damage_total, skill_check, Actor, CheckResult, Contact, ContactId, CrewRole, Disposition,
    DomainError, LogEntryKind, Ship, ShipId, ShipLogEntry, ShipSystem, WeaponKind, WeaponsMode,
    STANDARD_TARGET,
};

use super::{load_contact, load_ship, ShipLogWriter};
use crate::infrastructure::clock::{roll_d6, roll_d6s};
use crate::infrastructure::ports::{
    Change, ChangeSet, ContactRepo, RandomPort, RepoError, ShipRepo, UnitOfWork,
};

#[derive(Debug, thiserror::Error)]
pub enum WeaponsError {
    #[error("{}", .0.reason())]
    Rule(#[from] DomainError),
    /// Firing outside the rules of engagement by someone who may not override them.
    #[error("{0}")]
    RoeDenied(String),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// A weapon selection on a ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FireSelection {
    pub turret: usize,
    pub weapon: usize,
    pub target: ContactId,
}

#[derive(Debug, Clone)]
pub struct FireOutcome {
    pub ship: Ship,
    pub selection: FireSelection,
    pub kind: WeaponKind,
    /// Target after damage. Already deleted from the store when `destroyed`.
    pub contact: Contact,
    pub attack: CheckResult,
    pub damage: u32,
    pub destroyed: bool,
    pub roe_violation: bool,
    /// Entry for the GM when the shot broke the rules of engagement.
    pub roe_entry: Option<ShipLogEntry>,
}

pub struct WeaponsOps {
    ships: Arc<dyn ShipRepo>,
    contacts: Arc<dyn ContactRepo>,
    unit_of_work: Arc<dyn UnitOfWork>,
    log: Arc<ShipLogWriter>,
    random: Arc<dyn RandomPort>,
}

impl WeaponsOps {
    pub fn new(
        ships: Arc<dyn ShipRepo>,
        contacts: Arc<dyn ContactRepo>,
        unit_of_work: Arc<dyn UnitOfWork>,
        log: Arc<ShipLogWriter>,
        random: Arc<dyn RandomPort>,
    ) -> Self {
        Self {
            ships,
            contacts,
            unit_of_work,
            log,
            random,
        }
    }

    pub async fn set_mode(&self, ship_id: ShipId, mode: WeaponsMode) -> Result<Ship, WeaponsError> {
        let mut ship = load_ship(self.ships.as_ref(), ship_id).await?;
        ship.weapons_mode = mode;
        self.ships.save(&ship).await?;
        tracing::info!(ship_id = %ship.id, mode = ?mode, "Weapons authorization changed");
        Ok(ship)
    }

    /// Resolve one shot.
    ///
    /// Gunners may fire outside the rules of engagement; the violation entry
    /// commits with the shot. Captains may not. The GM is never restricted.
    pub async fn fire(
        &self,
        ship_id: ShipId,
        actor: Actor,
        actor_label: &str,
        selection: FireSelection,
    ) -> Result<FireOutcome, WeaponsError> {
        let mut ship = load_ship(self.ships.as_ref(), ship_id).await?;
        ship.require_system(ShipSystem::Weapons, "fire")?;

        let weapon = ship.weapon(selection.turret, selection.weapon)?;
        let kind = weapon.kind;
        if weapon.fired_this_turn {
            return Err(DomainError::constraint(format!(
                "{} has already fired this turn",
                kind.display_name()
            ))
            .into());
        }

        let mut contact =
            load_contact(self.contacts.as_ref(), ship.campaign_id, selection.target).await?;
        if !contact.is_targetable {
            return Err(
                DomainError::constraint(format!("{} is not a valid target", contact.name)).into(),
            );
        }
        if contact.range_band > kind.max_range() {
            return Err(DomainError::constraint(format!(
                "{} cannot reach {} at {} range",
                kind.display_name(),
                contact.name,
                contact.range_band.display_name()
            ))
            .into());
        }

        let roe_violation = match engagement_refusal(ship.weapons_mode, &contact) {
            None => false,
            Some(_) if actor.is_gm => false,
            Some(_) if actor.role == Some(CrewRole::Gunner) => true,
            Some(reason) => return Err(WeaponsError::RoeDenied(reason)),
        };

        let dice = [roll_d6(self.random.as_ref()), roll_d6(self.random.as_ref())];
        let modifier = contact.range_band.attack_modifier() + kind.attack_modifier();
        let attack = skill_check(dice, modifier, STANDARD_TARGET);

        let damage = if attack.success {
            let rolls = roll_d6s(self.random.as_ref(), kind.damage_dice());
            u32::try_from(damage_total(&rolls, attack.effect)).unwrap_or(0)
        } else {
            0
        };

        let destroyed = damage > 0 && contact.apply_damage(damage);
        ship.mark_weapon_fired(selection.turret, selection.weapon)?;

        let mut changes = ChangeSet::new();
        if destroyed {
            changes.push(Change::RemoveContact(contact.id));
        } else if damage > 0 && contact.health.is_some() {
            changes.push(Change::Contact(contact.clone()));
        }
        changes.push(Change::Ship(ship.clone()));

        // A violation is part of the shot: no entry, no shot.
        let roe_entry = if roe_violation {
            let entry = self
                .log
                .entry(
                    &ship,
                    LogEntryKind::RoeViolation,
                    actor_label,
                    format!(
                        "Fired on {} while weapons were {}",
                        contact.name,
                        mode_label(ship.weapons_mode)
                    ),
                )
                .await?;
            changes.push(Change::LogEntry(entry.clone()));
            Some(entry)
        } else {
            None
        };

        self.unit_of_work.commit(changes).await?;

        if roe_violation {
            tracing::warn!(
                ship_id = %ship.id,
                contact_id = %contact.id,
                mode = ?ship.weapons_mode,
                "Weapons fired outside rules of engagement"
            );
        }

        let summary = match (attack.success, destroyed) {
            (false, _) => format!("{} fired at {} and missed", kind.display_name(), contact.name),
            (true, false) => format!(
                "{} hit {} for {damage} damage",
                kind.display_name(),
                contact.name
            ),
            (true, true) => format!(
                "{} hit {} for {damage} damage, target destroyed",
                kind.display_name(),
                contact.name
            ),
        };
        self.log
            .record(&ship, LogEntryKind::Combat, actor_label, summary)
            .await;

        Ok(FireOutcome {
            ship,
            selection,
            kind,
            contact,
            attack,
            damage,
            destroyed,
            roe_violation,
            roe_entry,
        })
    }

    /// Start the next combat round; every weapon may fire again.
    pub async fn end_turn(&self, ship_id: ShipId) -> Result<(Ship, u32), WeaponsError> {
        let mut ship = load_ship(self.ships.as_ref(), ship_id).await?;
        let round = ship.start_turn();
        self.ships.save(&ship).await?;
        tracing::debug!(ship_id = %ship.id, round, "Combat round started");
        Ok((ship, round))
    }
}

/// Why the current rules of engagement forbid engaging `contact`, if they do.
fn engagement_refusal(mode: WeaponsMode, contact: &Contact) -> Option<String> {
    match mode {
        WeaponsMode::Free => None,
        WeaponsMode::Defensive if contact.disposition == Disposition::Hostile => None,
        WeaponsMode::Defensive => Some(format!(
            "Weapons are defensive - {} is not marked hostile",
            contact.name
        )),
        WeaponsMode::Hold => Some("Weapons are on hold".to_string()),
    }
}

fn mode_label(mode: WeaponsMode) -> &'static str {
    match mode {
        WeaponsMode::Free => "free",
        WeaponsMode::Hold => "on hold",
        WeaponsMode::Defensive => "defensive",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::{FixedClock, FixedRandom};
    use crate::infrastructure::ports::{
        CampaignRepo, MockCampaignRepo, MockContactRepo, MockShipLogRepo, MockShipRepo,
        MockUnitOfWork,
    };
    use crate::infrastructure::state_store::SqliteStore;
    use chrono::Utc;
    use starbridge_domain::{Campaign, ContactKind, RangeBand, ShipTemplate};

    struct Fixture {
        campaign: Campaign,
        ship: Ship,
        contact: Contact,
    }

    fn fixture(mode: WeaponsMode, range: RangeBand) -> Fixture {
        let campaign = Campaign::new("Outbound", "Sam", Utc::now()).expect("campaign");
        let mut ship = Ship::from_template(campaign.id, "Kestrel", ShipTemplate::Scout, Utc::now())
            .expect("ship");
        ship.weapons_mode = mode;
        let contact = Contact::new(campaign.id, "Corsair", ContactKind::Ship, range, 45)
            .expect("contact")
            .with_health(10);
        Fixture {
            campaign,
            ship,
            contact,
        }
    }

    fn log_writer(campaign: &Campaign, appends: usize) -> Arc<ShipLogWriter> {
        let campaign = campaign.clone();
        let mut campaigns = MockCampaignRepo::new();
        campaigns
            .expect_get()
            .returning(move |_| Ok(Some(campaign.clone())));
        let mut log = MockShipLogRepo::new();
        log.expect_append().times(appends).returning(|_| Ok(()));
        Arc::new(ShipLogWriter::new(
            Arc::new(log),
            Arc::new(campaigns),
            Arc::new(FixedClock(Utc::now())),
        ))
    }

    fn selection(f: &Fixture) -> FireSelection {
        FireSelection {
            turret: 0,
            weapon: 0,
            target: f.contact.id,
        }
    }

    fn ships_returning(ship: &Ship) -> MockShipRepo {
        let ship = ship.clone();
        let mut ships = MockShipRepo::new();
        ships.expect_get().returning(move |_| Ok(Some(ship.clone())));
        ships
    }

    fn contacts_returning(contact: &Contact) -> MockContactRepo {
        let contact = contact.clone();
        let mut contacts = MockContactRepo::new();
        contacts
            .expect_get()
            .returning(move |_| Ok(Some(contact.clone())));
        contacts
    }

    fn committing(times: usize) -> MockUnitOfWork {
        let mut unit_of_work = MockUnitOfWork::new();
        unit_of_work
            .expect_commit()
            .times(times)
            .returning(|_| Ok(()));
        unit_of_work
    }

    #[tokio::test]
    async fn when_gunner_fires_under_hold_then_shot_and_violation_commit_together() {
        let f = fixture(WeaponsMode::Hold, RangeBand::Close);
        let target = f.contact.id;
        let mut unit_of_work = MockUnitOfWork::new();
        unit_of_work
            .expect_commit()
            .withf(move |changes| {
                matches!(
                    changes.changes(),
                    [Change::RemoveContact(removed), Change::Ship(ship), Change::LogEntry(entry)]
                        if *removed == target
                            && ship.turrets[0].weapons[0].fired_this_turn
                            && entry.kind == LogEntryKind::RoeViolation
                )
            })
            .times(1)
            .returning(|_| Ok(()));

        let ops = WeaponsOps::new(
            Arc::new(ships_returning(&f.ship)),
            Arc::new(contacts_returning(&f.contact)),
            Arc::new(unit_of_work),
            log_writer(&f.campaign, 1),
            Arc::new(FixedRandom(6)),
        );
        let outcome = ops
            .fire(f.ship.id, Actor::crew(CrewRole::Gunner), "Gunner", selection(&f))
            .await
            .expect("gunner override");

        assert!(outcome.attack.success);
        assert!(outcome.destroyed);
        assert!(outcome.roe_violation);
        let entry = outcome.roe_entry.expect("violation entry");
        assert_eq!(entry.kind, LogEntryKind::RoeViolation);
        assert_eq!(entry.message, "Fired on Corsair while weapons were on hold");
    }

    #[tokio::test]
    async fn when_violation_cannot_be_recorded_then_shot_is_undone() {
        let f = fixture(WeaponsMode::Hold, RangeBand::Close);
        let store = Arc::new(
            SqliteStore::in_memory(Arc::new(FixedClock(Utc::now())))
                .await
                .expect("store"),
        );
        CampaignRepo::save(store.as_ref(), &f.campaign)
            .await
            .expect("save");
        ShipRepo::save(store.as_ref(), &f.ship).await.expect("save");
        ContactRepo::save(store.as_ref(), &f.contact)
            .await
            .expect("save");
        store.reject_writes_of("log_entry").await;

        let writer = Arc::new(ShipLogWriter::new(
            store.clone(),
            store.clone(),
            Arc::new(FixedClock(Utc::now())),
        ));
        let ops = WeaponsOps::new(
            store.clone(),
            store.clone(),
            store.clone(),
            writer,
            Arc::new(FixedRandom(6)),
        );
        let err = ops
            .fire(f.ship.id, Actor::crew(CrewRole::Gunner), "Gunner", selection(&f))
            .await
            .expect_err("violation entry rejected");
        assert!(matches!(err, WeaponsError::Repo(RepoError::Database { .. })));

        let contact = ContactRepo::get(store.as_ref(), f.contact.id)
            .await
            .expect("get");
        assert_eq!(contact, Some(f.contact.clone()));
        let ship = ShipRepo::get(store.as_ref(), f.ship.id)
            .await
            .expect("get")
            .expect("ship");
        assert!(!ship.turrets[0].weapons[0].fired_this_turn);
    }

    #[tokio::test]
    async fn when_captain_fires_under_hold_then_denied_without_rolling() {
        let f = fixture(WeaponsMode::Hold, RangeBand::Close);

        let ops = WeaponsOps::new(
            Arc::new(ships_returning(&f.ship)),
            Arc::new(contacts_returning(&f.contact)),
            Arc::new(committing(0)),
            log_writer(&f.campaign, 0),
            Arc::new(FixedRandom(6)),
        );
        let err = ops
            .fire(f.ship.id, Actor::crew(CrewRole::Captain), "Captain", selection(&f))
            .await
            .expect_err("hold applies to captain");
        assert!(matches!(err, WeaponsError::RoeDenied(_)));
        assert_eq!(err.to_string(), "Weapons are on hold");
    }

    #[tokio::test]
    async fn when_gm_fires_under_defensive_at_unknown_then_no_violation() {
        let f = fixture(WeaponsMode::Defensive, RangeBand::Close);
        let mut unit_of_work = MockUnitOfWork::new();
        unit_of_work
            .expect_commit()
            .withf(|changes| matches!(changes.changes(), [Change::Ship(_)]))
            .times(1)
            .returning(|_| Ok(()));

        let ops = WeaponsOps::new(
            Arc::new(ships_returning(&f.ship)),
            Arc::new(contacts_returning(&f.contact)),
            Arc::new(unit_of_work),
            log_writer(&f.campaign, 1),
            Arc::new(FixedRandom(1)),
        );
        let outcome = ops
            .fire(f.ship.id, Actor::gm(), "GM", selection(&f))
            .await
            .expect("gm unrestricted");
        assert!(!outcome.roe_violation);
        assert!(!outcome.attack.success);
        assert_eq!(outcome.damage, 0);
    }

    #[tokio::test]
    async fn when_target_beyond_weapon_reach_then_rejected() {
        let f = fixture(WeaponsMode::Free, RangeBand::VeryLong);

        let ops = WeaponsOps::new(
            Arc::new(ships_returning(&f.ship)),
            Arc::new(contacts_returning(&f.contact)),
            Arc::new(committing(0)),
            log_writer(&f.campaign, 0),
            Arc::new(FixedRandom(6)),
        );
        let err = ops
            .fire(f.ship.id, Actor::gm(), "GM", selection(&f))
            .await
            .expect_err("out of range");
        assert!(matches!(err, WeaponsError::Rule(DomainError::Constraint(_))));
    }

    #[tokio::test]
    async fn when_weapon_already_fired_then_second_shot_rejected() {
        let mut f = fixture(WeaponsMode::Free, RangeBand::Close);
        f.ship.mark_weapon_fired(0, 0).expect("weapon exists");

        let ops = WeaponsOps::new(
            Arc::new(ships_returning(&f.ship)),
            Arc::new(MockContactRepo::new()),
            Arc::new(committing(0)),
            log_writer(&f.campaign, 0),
            Arc::new(FixedRandom(6)),
        );
        let err = ops
            .fire(f.ship.id, Actor::gm(), "GM", selection(&f))
            .await
            .expect_err("already fired");
        assert!(err.to_string().ends_with("has already fired this turn"));
    }

    #[tokio::test]
    async fn when_turn_ends_then_weapons_rearm() {
        let mut f = fixture(WeaponsMode::Free, RangeBand::Close);
        f.ship.mark_weapon_fired(0, 0).expect("weapon exists");
        let mut ships = ships_returning(&f.ship);
        ships
            .expect_save()
            .withf(|ship| !ship.turrets[0].weapons[0].fired_this_turn)
            .times(1)
            .returning(|_| Ok(()));

        let ops = WeaponsOps::new(
            Arc::new(ships),
            Arc::new(MockContactRepo::new()),
            Arc::new(committing(0)),
            log_writer(&f.campaign, 0),
            Arc::new(FixedRandom(6)),
        );
        let (_, round) = ops.end_turn(f.ship.id).await.expect("end turn");
        assert_eq!(round, 1);
    }
}
