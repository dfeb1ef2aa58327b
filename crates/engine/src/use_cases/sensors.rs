//! Sensor contacts: scanning, marking and GM contact management.

use std::sync::Arc;

use starbridge_domain::{
    CampaignId, Contact, ContactId, ContactKind, Disposition, DomainError, RangeBand, ShipId,
    ShipSystem,
};

use super::{load_contact, load_ship};
use crate::infrastructure::ports::{ContactRepo, RepoError, ShipRepo};

#[derive(Debug, thiserror::Error)]
pub enum SensorsError {
    #[error("{}", .0.reason())]
    Rule(#[from] DomainError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// GM-supplied fields for a new contact.
#[derive(Debug, Clone)]
pub struct NewContact {
    pub name: String,
    pub kind: ContactKind,
    pub range_band: RangeBand,
    pub bearing: u16,
    pub disposition: Disposition,
    pub health: Option<u32>,
}

pub struct SensorsOps {
    contacts: Arc<dyn ContactRepo>,
    ships: Arc<dyn ShipRepo>,
}

impl SensorsOps {
    pub fn new(contacts: Arc<dyn ContactRepo>, ships: Arc<dyn ShipRepo>) -> Self {
        Self { contacts, ships }
    }

    pub async fn list(&self, campaign_id: CampaignId) -> Result<Vec<Contact>, SensorsError> {
        Ok(self.contacts.list_in_campaign(campaign_id).await?)
    }

    /// Raise the scan tier by one. At the ceiling this succeeds without change.
    pub async fn scan(
        &self,
        ship_id: ShipId,
        contact_id: ContactId,
    ) -> Result<(Contact, bool), SensorsError> {
        let ship = load_ship(self.ships.as_ref(), ship_id).await?;
        ship.require_system(ShipSystem::Sensors, "scan")?;
        let mut contact =
            load_contact(self.contacts.as_ref(), ship.campaign_id, contact_id).await?;
        let advanced = contact.advance_scan();
        if advanced {
            self.contacts.save(&contact).await?;
        }
        Ok((contact, advanced))
    }

    pub async fn mark(
        &self,
        campaign_id: CampaignId,
        contact_id: ContactId,
        disposition: Disposition,
    ) -> Result<Contact, SensorsError> {
        let mut contact = load_contact(self.contacts.as_ref(), campaign_id, contact_id).await?;
        contact.disposition = disposition;
        self.contacts.save(&contact).await?;
        Ok(contact)
    }

    pub async fn spawn(
        &self,
        campaign_id: CampaignId,
        new: NewContact,
    ) -> Result<Contact, SensorsError> {
        let mut contact = Contact::new(campaign_id, new.name, new.kind, new.range_band, new.bearing)?
            .with_disposition(new.disposition);
        contact.health = new.health;
        self.contacts.save(&contact).await?;
        tracing::info!(campaign_id = %campaign_id, contact_id = %contact.id, "Contact spawned");
        Ok(contact)
    }

    pub async fn remove(
        &self,
        campaign_id: CampaignId,
        contact_id: ContactId,
    ) -> Result<ContactId, SensorsError> {
        let contact = load_contact(self.contacts.as_ref(), campaign_id, contact_id).await?;
        self.contacts.delete(contact.id).await?;
        Ok(contact.id)
    }

    pub async fn reset_scan(
        &self,
        campaign_id: CampaignId,
        contact_id: ContactId,
    ) -> Result<Contact, SensorsError> {
        let mut contact = load_contact(self.contacts.as_ref(), campaign_id, contact_id).await?;
        contact.reset_scan();
        self.contacts.save(&contact).await?;
        Ok(contact)
    }

    pub async fn set_targetable(
        &self,
        campaign_id: CampaignId,
        contact_id: ContactId,
        targetable: bool,
    ) -> Result<Contact, SensorsError> {
        let mut contact = load_contact(self.contacts.as_ref(), campaign_id, contact_id).await?;
        contact.is_targetable = targetable;
        self.contacts.save(&contact).await?;
        Ok(contact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{MockContactRepo, MockShipRepo};
    use chrono::Utc;
    use starbridge_domain::{ScanLevel, Ship, ShipTemplate};

    fn setup(scan_level: ScanLevel) -> (Ship, Contact) {
        let campaign_id = CampaignId::new();
        let ship = Ship::from_template(campaign_id, "Kestrel", ShipTemplate::Scout, Utc::now())
            .expect("ship");
        let mut contact =
            Contact::new(campaign_id, "Beacon", ContactKind::Station, RangeBand::Long, 10)
                .expect("contact");
        contact.scan_level = scan_level;
        (ship, contact)
    }

    fn repos(ship: &Ship, contact: &Contact) -> (MockShipRepo, MockContactRepo) {
        let ship = ship.clone();
        let mut ships = MockShipRepo::new();
        ships.expect_get().returning(move |_| Ok(Some(ship.clone())));
        let contact = contact.clone();
        let mut contacts = MockContactRepo::new();
        contacts
            .expect_get()
            .returning(move |_| Ok(Some(contact.clone())));
        (ships, contacts)
    }

    #[tokio::test]
    async fn when_scan_then_one_tier_gained() {
        let (ship, contact) = setup(ScanLevel::Passive);
        let (ships, mut contacts) = repos(&ship, &contact);
        contacts
            .expect_save()
            .withf(|c| c.scan_level == ScanLevel::Active)
            .times(1)
            .returning(|_| Ok(()));

        let (contact, advanced) = SensorsOps::new(Arc::new(contacts), Arc::new(ships))
            .scan(ship.id, contact.id)
            .await
            .expect("scan");
        assert!(advanced);
        assert_eq!(contact.scan_level, ScanLevel::Active);
    }

    #[tokio::test]
    async fn when_scan_at_ceiling_then_success_without_write() {
        let (ship, contact) = setup(ScanLevel::Deep);
        let (ships, mut contacts) = repos(&ship, &contact);
        contacts.expect_save().times(0);

        let (contact, advanced) = SensorsOps::new(Arc::new(contacts), Arc::new(ships))
            .scan(ship.id, contact.id)
            .await
            .expect("ceiling is not an error");
        assert!(!advanced);
        assert_eq!(contact.scan_level, ScanLevel::Deep);
    }

    #[tokio::test]
    async fn when_sensors_destroyed_then_scan_rejected() {
        let (mut ship, contact) = setup(ScanLevel::None);
        ship.systems.damage(ShipSystem::Sensors, 100);
        let (ships, mut contacts) = repos(&ship, &contact);
        contacts.expect_save().times(0);

        let err = SensorsOps::new(Arc::new(contacts), Arc::new(ships))
            .scan(ship.id, contact.id)
            .await
            .expect_err("sensors out");
        assert_eq!(err.to_string(), "Sensors destroyed - cannot scan");
    }

    #[tokio::test]
    async fn when_spawned_with_bad_bearing_then_rejected() {
        let mut contacts = MockContactRepo::new();
        contacts.expect_save().times(0);
        let err = SensorsOps::new(Arc::new(contacts), Arc::new(MockShipRepo::new()))
            .spawn(
                CampaignId::new(),
                NewContact {
                    name: "Ghost".into(),
                    kind: ContactKind::Ship,
                    range_band: RangeBand::Medium,
                    bearing: 400,
                    disposition: Disposition::Unknown,
                    health: Some(20),
                },
            )
            .await
            .expect_err("bearing");
        assert!(matches!(err, SensorsError::Rule(DomainError::Validation(_))));
    }
}
