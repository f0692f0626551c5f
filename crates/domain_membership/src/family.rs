//! Families and their members

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{FamilyId, MemberId};

use crate::error::MembershipError;

/// A household paying for its members' activities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Family {
    /// Unique identifier
    pub id: FamilyId,
    /// Family (household) name
    pub name: String,
    /// Contact email
    pub email: Option<String>,
    /// Contact phone
    pub phone: Option<String>,
    /// Postal address
    pub address: Option<String>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl Family {
    /// Creates a new family with no contact details
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: FamilyId::new_v7(),
            name: name.into(),
            email: None,
            phone: None,
            address: None,
            created_at: Utc::now(),
        }
    }

    /// Sets the contact email
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets the contact phone
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Sets the postal address
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }
}

/// Legal guardian of a minor member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guardian {
    pub last_name: String,
    pub first_name: String,
}

/// Input for creating a member
#[derive(Debug, Clone, Default)]
pub struct NewMember {
    pub family_id: Option<FamilyId>,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: Option<NaiveDate>,
    pub is_minor: bool,
    pub guardian_last_name: Option<String>,
    pub guardian_first_name: Option<String>,
}

/// A person taking part in the association's activities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Unique identifier
    pub id: MemberId,
    /// Owning family, if any
    pub family_id: Option<FamilyId>,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: Option<NaiveDate>,
    pub is_minor: bool,
    /// Required for minors
    pub guardian: Option<Guardian>,
    pub created_at: DateTime<Utc>,
}

impl Member {
    /// Creates a member, enforcing that minors carry guardian names
    ///
    /// # Errors
    ///
    /// Returns `MembershipError::GuardianRequired` if the member is a minor
    /// and either guardian name is missing or blank.
    pub fn create(input: NewMember) -> Result<Self, MembershipError> {
        let guardian = match (input.guardian_last_name, input.guardian_first_name) {
            (Some(last), Some(first)) if !last.trim().is_empty() && !first.trim().is_empty() => {
                Some(Guardian {
                    last_name: last.trim().to_string(),
                    first_name: first.trim().to_string(),
                })
            }
            _ => None,
        };

        if input.is_minor && guardian.is_none() {
            return Err(MembershipError::GuardianRequired);
        }

        Ok(Self {
            id: MemberId::new_v7(),
            family_id: input.family_id,
            first_name: input.first_name,
            last_name: input.last_name,
            birth_date: input.birth_date,
            is_minor: input.is_minor,
            guardian,
            created_at: Utc::now(),
        })
    }

    /// "First Last"
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Returns true if the member belongs to the given family
    pub fn belongs_to(&self, family_id: FamilyId) -> bool {
        self.family_id == Some(family_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minor(guardian_last: Option<&str>, guardian_first: Option<&str>) -> NewMember {
        NewMember {
            first_name: "Léa".to_string(),
            last_name: "Martin".to_string(),
            is_minor: true,
            guardian_last_name: guardian_last.map(str::to_string),
            guardian_first_name: guardian_first.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_minor_without_guardian_is_rejected() {
        assert_eq!(Member::create(minor(None, None)), Err(MembershipError::GuardianRequired));
        assert_eq!(Member::create(minor(Some("Martin"), Some("  "))), Err(MembershipError::GuardianRequired));
    }

    #[test]
    fn test_minor_with_guardian_is_accepted() {
        let member = Member::create(minor(Some("Martin"), Some("Paul"))).unwrap();
        assert_eq!(member.guardian.unwrap().first_name, "Paul");
    }

    #[test]
    fn test_adult_ignores_blank_guardian() {
        let member = Member::create(NewMember {
            first_name: "Anne".to_string(),
            last_name: "Roy".to_string(),
            guardian_last_name: Some(String::new()),
            ..Default::default()
        })
        .unwrap();

        assert!(member.guardian.is_none());
        assert_eq!(member.full_name(), "Anne Roy");
    }
}
