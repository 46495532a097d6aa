//! Stored OAuth credentials and the per-call request credentials derived
//! from them.
//!
//! [`StoredCredential`] is what the user record keeps. [`RequestCredentials`]
//! is what every gateway call takes. The conversion between them is pure: no
//! I/O, no refresh. An expired access token is refreshed by the gateway during
//! the call that needs it, and the refreshed token is not written back.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Number of refreshes a freshly stored credential is budgeted for.
pub const DEFAULT_REFRESH_BUDGET: u32 = 50;

/// Margin subtracted from the provider's expiry so a token is never sent in
/// its last minute.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Long-lived OAuth credential as persisted on the user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredential {
    pub refresh_token: String,
    pub access_token: String,
    pub access_token_expires_at: DateTime<Utc>,
    /// Remaining refreshes before the owner should force a new consent.
    #[serde(default = "default_refresh_budget")]
    pub refresh_count: u32,
}

fn default_refresh_budget() -> u32 {
    DEFAULT_REFRESH_BUDGET
}

impl StoredCredential {
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        access_token_expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            refresh_token: refresh_token.into(),
            access_token: access_token.into(),
            access_token_expires_at,
            refresh_count: DEFAULT_REFRESH_BUDGET,
        }
    }

    /// Returns true if the access token is expired or inside the margin.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.access_token_expires_at - Duration::seconds(EXPIRY_MARGIN_SECS)
    }

    /// Records a completed refresh: new access token and expiry, one less
    /// refresh in the budget.
    ///
    /// A rotated refresh token replaces the stored one; Google usually omits
    /// it, in which case the old one is kept.
    pub fn record_refresh(
        &mut self,
        access_token: impl Into<String>,
        expires_at: DateTime<Utc>,
        rotated_refresh_token: Option<String>,
    ) {
        self.access_token = access_token.into();
        self.access_token_expires_at = expires_at;
        if let Some(token) = rotated_refresh_token {
            self.refresh_token = token;
        }
        self.refresh_count = self.refresh_count.saturating_sub(1);
    }

    /// Returns true once the refresh budget is spent.
    pub fn needs_reconsent(&self) -> bool {
        self.refresh_count == 0
    }
}

/// Credentials attached to a single gateway call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestCredentials {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl RequestCredentials {
    /// Credentials carrying only an access token (no refresh possible).
    pub fn bearer(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            expires_at: None,
        }
    }

    /// Returns true if the access token is known to be expired.
    ///
    /// Credentials without an expiry are assumed valid.
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|at| Utc::now() >= at - Duration::seconds(EXPIRY_MARGIN_SECS))
    }

    /// Returns the refresh token when the access token needs replacing.
    pub fn refresh_needed(&self) -> Option<&str> {
        if self.is_expired() {
            self.refresh_token.as_deref()
        } else {
            None
        }
    }
}

/// Converts a stored credential into request credentials.
pub fn to_request_credentials(stored: &StoredCredential) -> RequestCredentials {
    RequestCredentials {
        access_token: stored.access_token.clone(),
        refresh_token: Some(stored.refresh_token.clone()).filter(|t| !t.is_empty()),
        expires_at: Some(stored.access_token_expires_at),
    }
}

impl From<&StoredCredential> for RequestCredentials {
    fn from(stored: &StoredCredential) -> Self {
        to_request_credentials(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(expires_in: Duration) -> StoredCredential {
        StoredCredential::new("access", "refresh", Utc::now() + expires_in)
    }

    #[test]
    fn conversion_copies_tokens() {
        let cred = stored(Duration::hours(1));
        let request = to_request_credentials(&cred);
        assert_eq!(request.access_token, "access");
        assert_eq!(request.refresh_token.as_deref(), Some("refresh"));
        assert_eq!(request.expires_at, Some(cred.access_token_expires_at));
        assert!(!request.is_expired());
        assert!(request.refresh_needed().is_none());
    }

    #[test]
    fn empty_refresh_token_is_dropped() {
        let cred = StoredCredential::new("access", "", Utc::now());
        let request = RequestCredentials::from(&cred);
        assert!(request.refresh_token.is_none());
        assert!(request.refresh_needed().is_none());
    }

    #[test]
    fn expired_credentials_ask_for_refresh() {
        let cred = stored(-Duration::minutes(5));
        assert!(cred.is_expired());
        let request = to_request_credentials(&cred);
        assert!(request.is_expired());
        assert_eq!(request.refresh_needed(), Some("refresh"));
    }

    #[test]
    fn expiry_margin_applies() {
        let cred = stored(Duration::seconds(30));
        assert!(cred.is_expired());
        assert!(to_request_credentials(&cred).is_expired());
    }

    #[test]
    fn bearer_never_expires() {
        let request = RequestCredentials::bearer("token");
        assert!(!request.is_expired());
        assert!(request.refresh_needed().is_none());
    }

    #[test]
    fn record_refresh_spends_budget() {
        let mut cred = stored(-Duration::minutes(5));
        let later = Utc::now() + Duration::hours(1);
        cred.record_refresh("new-access", later, None);
        assert_eq!(cred.access_token, "new-access");
        assert_eq!(cred.refresh_token, "refresh");
        assert_eq!(cred.refresh_count, DEFAULT_REFRESH_BUDGET - 1);
        assert!(!cred.is_expired());

        cred.record_refresh("again", later, Some("rotated".to_string()));
        assert_eq!(cred.refresh_token, "rotated");
    }

    #[test]
    fn refresh_budget_saturates() {
        let mut cred = stored(Duration::hours(1));
        cred.refresh_count = 1;
        assert!(!cred.needs_reconsent());
        cred.record_refresh("a", Utc::now(), None);
        cred.record_refresh("b", Utc::now(), None);
        assert_eq!(cred.refresh_count, 0);
        assert!(cred.needs_reconsent());
    }

    #[test]
    fn refresh_count_defaults_when_missing() {
        let json = r#"{
            "refresh_token": "r",
            "access_token": "a",
            "access_token_expires_at": "2024-03-15T10:00:00Z"
        }"#;
        let cred: StoredCredential = serde_json::from_str(json).unwrap();
        assert_eq!(cred.refresh_count, DEFAULT_REFRESH_BUDGET);
    }
}
