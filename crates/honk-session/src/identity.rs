//! Identity supplied by the host shell

use honk_core::{DisplayName, DomainError, IdentityProvider, ParticipantId};

/// Identity fixed for the lifetime of the process
#[derive(Debug, Clone)]
pub struct FixedIdentity {
    id: ParticipantId,
    name: DisplayName,
}

impl FixedIdentity {
    /// Use an identity issued elsewhere
    pub fn new(id: &str, name: DisplayName) -> Result<Self, DomainError> {
        Ok(Self {
            id: ParticipantId::parse(id)?,
            name,
        })
    }

    /// Fresh anonymous identity with a random display name
    pub fn anonymous() -> Self {
        Self::anonymous_named(DisplayName::random())
    }

    /// Fresh anonymous identity shown under `name`
    pub fn anonymous_named(name: DisplayName) -> Self {
        let id = format!("co_z{}", uuid::Uuid::new_v4().simple());
        Self {
            id: ParticipantId::parse(id).unwrap_or_else(|_| unreachable!("uuid is never blank")),
            name,
        }
    }

    pub fn display_name(&self) -> &DisplayName {
        &self.name
    }
}

impl IdentityProvider for FixedIdentity {
    fn current_participant_id(&self) -> ParticipantId {
        self.id.clone()
    }
}
