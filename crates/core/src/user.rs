//! Users, roles, and external identities.
//!
//! A [`User`] is created the first time an external identity resolves and is
//! matched on subsequent sign-ins by email. Identity fields supplied by the
//! provider never overwrite an existing record.

use serde::{Deserialize, Serialize};

use crate::avatar::AvatarConfig;
use crate::error::CoreError;
use crate::types::{Timestamp, UserId};

/// Minimum display-name length after trimming.
pub const DISPLAY_NAME_MIN: usize = 2;
/// Maximum display-name length after trimming.
pub const DISPLAY_NAME_MAX: usize = 20;

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// A participant's role. Starts at [`Role::Learner`]; the transition to
/// [`Role::Facilitator`] is one-way — no demotion operation exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Learner,
    Facilitator,
}

impl Role {
    /// Stable string form, matching the serialized representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Learner => "learner",
            Role::Facilitator => "facilitator",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "learner" => Ok(Role::Learner),
            "facilitator" => Ok(Role::Facilitator),
            other => Err(CoreError::InvalidArgument(format!(
                "Unknown role: '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// ExternalIdentity
// ---------------------------------------------------------------------------

/// The verified identity triple supplied by the external identity provider
/// on sign-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalIdentity {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Validate the shape of an external identity: non-empty id and a
/// minimally well-formed email (`local@domain`, both parts non-empty).
pub fn validate_external_identity(identity: &ExternalIdentity) -> Result<(), CoreError> {
    if identity.id.trim().is_empty() {
        return Err(CoreError::InvalidArgument(
            "External identity id must not be empty".to_string(),
        ));
    }
    let email = identity.email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(CoreError::InvalidArgument(format!(
            "Malformed email: '{}'",
            identity.email
        ))),
    }
}

/// The substring of an email before the `@`, used as the default display
/// name when the provider supplies none.
pub fn email_local_part(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

/// Lowercased email, the roster's lookup key. Matching is case-insensitive.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate a user-chosen display name, returning the trimmed form.
pub fn validate_display_name(name: &str) -> Result<String, CoreError> {
    let trimmed = name.trim();
    let len = trimmed.chars().count();
    if !(DISPLAY_NAME_MIN..=DISPLAY_NAME_MAX).contains(&len) {
        return Err(CoreError::InvalidArgument(format!(
            "Display name must be {DISPLAY_NAME_MIN}-{DISPLAY_NAME_MAX} characters, got {len}"
        )));
    }
    Ok(trimmed.to_string())
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A roster participant.
///
/// Exactly one `User` exists per distinct email. `points` is never negative
/// and is mutated only through the points ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Opaque stable id issued by the identity provider; immutable.
    pub id: UserId,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub points: i64,
    pub avatar: AvatarConfig,
    pub joined_at: Timestamp,
    /// Refreshed whenever the same identity resolves again.
    pub last_active_at: Timestamp,
}

impl User {
    /// Build the learner record for a first-time identity resolution.
    ///
    /// `role = Learner`, `points = 0`, baseline avatar; the display name is
    /// the provider's, falling back to the email local-part.
    pub fn from_identity(identity: &ExternalIdentity, now: Timestamp) -> Self {
        let display_name = identity
            .display_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| email_local_part(&identity.email).to_string());

        User {
            id: identity.id.clone(),
            email: identity.email.trim().to_string(),
            display_name,
            role: Role::Learner,
            points: 0,
            avatar: AvatarConfig::default(),
            joined_at: now,
            last_active_at: now,
        }
    }

    pub fn is_facilitator(&self) -> bool {
        self.role == Role::Facilitator
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
