//! Client entity and onboarding payload.

use serde::{Deserialize, Serialize};

use tripbook_core::{ClientId, DomainError, DomainResult, Entity, ValueObject};

/// Polish national identification number (PESEL).
///
/// Unique across all clients; format is exactly 11 ASCII digits. The checksum
/// is not verified here, only the shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pesel(String);

impl Pesel {
    pub fn parse(s: impl Into<String>) -> DomainResult<Self> {
        let s = s.into();
        if s.len() != 11 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::validation("PESEL must be exactly 11 digits"));
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for Pesel {}

// Deserialization goes through `parse`, so a decoded Pesel is always
// well-formed.
impl TryFrom<String> for Pesel {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<Pesel> for String {
    fn from(pesel: Pesel) -> Self {
        pesel.0
    }
}

impl core::fmt::Display for Pesel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Onboarding payload for a new client, before an identity is assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewClient {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub telephone: String,
    pub pesel: String,
}

/// A person who can register for trips. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub telephone: String,
    pub pesel: Pesel,
}

impl Client {
    /// Validate an onboarding payload and mint a client with a fresh identity.
    pub fn onboard(id: ClientId, new: NewClient) -> DomainResult<Self> {
        if new.first_name.trim().is_empty() {
            return Err(DomainError::validation("first name cannot be empty"));
        }
        if new.last_name.trim().is_empty() {
            return Err(DomainError::validation("last name cannot be empty"));
        }
        if !new.email.contains('@') {
            return Err(DomainError::validation("email must contain '@'"));
        }
        let pesel = Pesel::parse(new.pesel)?;

        Ok(Self {
            id,
            first_name: new.first_name,
            last_name: new.last_name,
            email: new.email,
            telephone: new.telephone,
            pesel,
        })
    }
}

impl Entity for Client {
    type Id = ClientId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
