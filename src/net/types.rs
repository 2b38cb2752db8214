//! Wire DTOs for the identity service boundary.
//!
//! DESIGN
//! ======
//! The registration form speaks in client-facing user kinds (`job_seeker`,
//! `employer`) while the identity service speaks in roles (`jobseeker`,
//! `employer`). [`UserKind::role`] is the one mapping table between the two;
//! registration payloads are only built through it.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// =============================================================================
// ROLES
// =============================================================================

/// Server-side role of an authenticated user.
///
/// Roles this client does not know are kept verbatim in [`Role::Other`] so a
/// newer server never breaks session rehydration.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    JobSeeker,
    Employer,
    Other(String),
}

impl Role {
    /// Wire name of the role (e.g. `"jobseeker"`).
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::JobSeeker => "jobseeker",
            Self::Employer => "employer",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for Role {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "jobseeker" => Self::JobSeeker,
            "employer" => Self::Employer,
            _ => Self::Other(raw),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

impl FromStr for Role {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_owned()))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of account picked on the registration form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserKind {
    JobSeeker,
    Employer,
}

impl UserKind {
    pub const ALL: [Self; 2] = [Self::JobSeeker, Self::Employer];

    /// Client kind to server role mapping table.
    ///
    /// New account kinds must be added here and nowhere else.
    #[must_use]
    pub fn role(self) -> Role {
        match self {
            Self::JobSeeker => Role::JobSeeker,
            Self::Employer => Role::Employer,
        }
    }

    /// Form value of the kind (e.g. `"job_seeker"`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::JobSeeker => "job_seeker",
            Self::Employer => "employer",
        }
    }
}

impl FromStr for UserKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown user type: {s}"))
    }
}

impl fmt::Display for UserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// IDENTITY
// =============================================================================

/// An authenticated user as returned by the identity service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Server-assigned identifier, if the service sends one.
    #[serde(default)]
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Login email.
    pub email: String,
    /// Server-side role.
    pub role: Role,
}

/// Credential and identity returned by login and registration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Opaque bearer token.
    pub token: String,
    pub user: User,
}

/// Success envelope wrapping every identity service response body.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// Error body sent by the identity service on non-success statuses.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

// =============================================================================
// REGISTRATION
// =============================================================================

/// Flat registration form shape covering both account kinds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegistrationInput {
    pub user_type: UserKind,
    /// Full name; split into given and family name for job seekers.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub company_description: Option<String>,
}

impl RegistrationInput {
    /// Empty form for `kind`.
    #[must_use]
    pub fn new(kind: UserKind) -> Self {
        Self {
            user_type: kind,
            name: None,
            email: String::new(),
            password: String::new(),
            phone: None,
            company_name: None,
            company_description: None,
        }
    }
}

/// Role-specific fields of a registration payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RegistrationProfile {
    #[serde(rename_all = "camelCase")]
    JobSeeker {
        first_name: String,
        last_name: String,
        phone: String,
    },
    #[serde(rename_all = "camelCase")]
    Employer {
        company_name: String,
        company_description: String,
        phone: String,
    },
}

/// Server-facing registration body: a role tag plus only that role's fields.
///
/// Built exclusively by [`RegistrationPayload::from_input`] so the role tag
/// and the profile fields always agree.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RegistrationPayload {
    role: Role,
    email: String,
    password: String,
    #[serde(flatten)]
    profile: RegistrationProfile,
}

impl RegistrationPayload {
    /// Map a registration form into the payload for its declared kind.
    ///
    /// Every server field is populated; absent form values become `""`.
    #[must_use]
    pub fn from_input(input: &RegistrationInput) -> Self {
        let phone = input.phone.clone().unwrap_or_default();
        let profile = match input.user_type {
            UserKind::JobSeeker => {
                let (first_name, last_name) = split_full_name(input.name.as_deref().unwrap_or_default());
                RegistrationProfile::JobSeeker { first_name, last_name, phone }
            }
            UserKind::Employer => RegistrationProfile::Employer {
                company_name: input.company_name.clone().unwrap_or_default(),
                company_description: input.company_description.clone().unwrap_or_default(),
                phone,
            },
        };

        Self {
            role: input.user_type.role(),
            email: input.email.clone(),
            password: input.password.clone(),
            profile,
        }
    }

    #[must_use]
    pub fn role(&self) -> &Role {
        &self.role
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn profile(&self) -> &RegistrationProfile {
        &self.profile
    }
}

/// Split a combined name at its first whitespace boundary.
///
/// The first token is the given name; the remaining tokens, rejoined with
/// single spaces, are the family name (empty when there are none).
#[must_use]
pub fn split_full_name(full: &str) -> (String, String) {
    let mut parts = full.split_whitespace();
    let first = parts.next().unwrap_or_default().to_owned();
    let rest = parts.collect::<Vec<_>>().join(" ");
    (first, rest)
}
