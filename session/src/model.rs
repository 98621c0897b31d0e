use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use docstore::Document;

use crate::error::SessionStorageError;
use crate::scopes::AuthScopes;

pub type SessionId = String;

/// Serialized names of the fields `Session` declares itself.
const DECLARED_FIELDS: [&str; 8] = [
    "id",
    "shop",
    "state",
    "isOnline",
    "scope",
    "expires",
    "accessToken",
    "onlineAccessInfo",
];

/// Details attached to an online (per-user) session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnlineAccessInfo {
    /// Token lifetime in seconds, as granted.
    pub expires_in: i64,
    pub associated_user_scope: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub associated_user: Option<AssociatedUser>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AssociatedUser {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub email_verified: bool,
    pub account_owner: bool,
    pub locale: String,
    pub collaborator: bool,
}

/// An authenticated session for one shop.
///
/// Serialized field names follow the camelCase shape the session documents
/// have always used. Unknown fields survive a load/store cycle via `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: SessionId,
    pub shop: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub is_online: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub online_access_info: Option<OnlineAccessInfo>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Session {
    pub fn new(
        id: impl Into<SessionId>,
        shop: impl Into<String>,
        state: impl Into<String>,
        is_online: bool,
    ) -> Self {
        Self {
            id: id.into(),
            shop: shop.into(),
            state: state.into(),
            is_online,
            scope: None,
            expires: None,
            access_token: None,
            online_access_info: None,
            extra: Map::new(),
        }
    }

    /// Id of the shop's single offline session.
    pub fn offline_id(shop: &str) -> SessionId {
        format!("offline_{shop}")
    }

    /// Id of a user's online session on a shop.
    pub fn online_id(shop: &str, user_id: i64) -> SessionId {
        format!("{shop}_{user_id}")
    }

    pub fn scopes(&self) -> AuthScopes {
        // AuthScopes parsing is infallible
        self.scope
            .as_deref()
            .unwrap_or_default()
            .parse()
            .unwrap_or_default()
    }

    /// True when the session expires before `now + within`.
    pub fn is_expired(&self, now: DateTime<Utc>, within: TimeDelta) -> bool {
        self.expires.is_some_and(|exp| exp - within < now)
    }

    /// Usable for requests needing `required`: has a token, has not expired,
    /// and was granted at least those scopes.
    pub fn is_active(&self, required: &AuthScopes, now: DateTime<Utc>) -> bool {
        self.access_token.as_deref().is_some_and(|t| !t.is_empty())
            && !self.is_expired(now, TimeDelta::zero())
            && self.scopes().has(required)
    }

    /// Flatten into the raw document stored under `self.id`.
    ///
    /// `extra` may not shadow a declared field, or the stored `id` and
    /// `shop` could drift from the document key.
    pub fn to_document(&self) -> Result<Document, SessionStorageError> {
        if let Some(key) = self.extra.keys().find(|k| DECLARED_FIELDS.contains(&k.as_str())) {
            return Err(SessionStorageError::InvalidSession(format!(
                "extra field {key:?} shadows a session field"
            )));
        }

        match serde_json::to_value(self)? {
            Value::Object(doc) => Ok(doc),
            _ => Err(SessionStorageError::InvalidSession(
                "session did not serialize to an object".to_string(),
            )),
        }
    }

    /// Rebuild a session from its raw document. `id` and `shop` must be
    /// non-empty strings.
    pub fn from_document(doc: Document) -> Result<Self, SessionStorageError> {
        let session: Session = serde_json::from_value(Value::Object(doc))
            .map_err(|e| SessionStorageError::Decode(e.to_string()))?;

        if session.id.is_empty() {
            return Err(SessionStorageError::Decode("empty session id".to_string()));
        }
        if session.shop.is_empty() {
            return Err(SessionStorageError::Decode(format!(
                "session {} has no shop",
                session.id
            )));
        }

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn online_session() -> Session {
        let mut s = Session::new(
            Session::online_id("a.myshopify.com", 42),
            "a.myshopify.com",
            "nonce-1",
            true,
        );
        s.scope = Some("write_products,read_orders".into());
        s.expires = Some(now() + TimeDelta::hours(1));
        s.access_token = Some("shpua_abc".into());
        s.online_access_info = Some(OnlineAccessInfo {
            expires_in: 3600,
            associated_user_scope: "write_products".into(),
            associated_user: Some(AssociatedUser {
                id: 42,
                first_name: "Ada".into(),
                email: "ada@example.com".into(),
                account_owner: true,
                ..Default::default()
            }),
        });
        s
    }

    #[test]
    fn ids_follow_shop_conventions() {
        assert_eq!(Session::offline_id("a.myshopify.com"), "offline_a.myshopify.com");
        assert_eq!(Session::online_id("a.myshopify.com", 7), "a.myshopify.com_7");
    }

    #[test]
    fn document_uses_camel_case_and_omits_unset_fields() {
        let doc = Session::new("offline_a", "a", "st", false).to_document().unwrap();
        assert_eq!(
            Value::Object(doc),
            json!({ "id": "offline_a", "shop": "a", "state": "st", "isOnline": false })
        );
    }

    #[test]
    fn document_round_trip_keeps_everything() {
        let mut s = online_session();
        s.extra.insert("userId".into(), json!(42));

        let doc = s.to_document().unwrap();
        assert_eq!(doc["accessToken"], "shpua_abc");
        assert_eq!(doc["onlineAccessInfo"]["associatedUser"]["firstName"], "Ada");
        assert_eq!(doc["userId"], 42);

        assert_eq!(Session::from_document(doc).unwrap(), s);
    }

    #[test]
    fn extra_fields_may_not_shadow_declared_ones() {
        for key in DECLARED_FIELDS {
            let mut s = Session::new("s1", "shopA", "st", false);
            s.extra.insert(key.to_string(), json!("other"));
            assert!(
                matches!(s.to_document(), Err(SessionStorageError::InvalidSession(_))),
                "{key} was accepted"
            );
        }
    }

    #[test]
    fn from_document_requires_id_and_shop() {
        let doc = |v: Value| match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        };

        assert!(Session::from_document(doc(json!({ "shop": "a" }))).is_err());
        assert!(Session::from_document(doc(json!({ "id": "", "shop": "a" }))).is_err());
        assert!(Session::from_document(doc(json!({ "id": "s1", "shop": "" }))).is_err());
        assert!(Session::from_document(doc(json!({ "id": "s1", "shop": 3 }))).is_err());

        let minimal = Session::from_document(doc(json!({ "id": "s1", "shop": "a" }))).unwrap();
        assert_eq!(minimal, Session::new("s1", "a", "", false));
    }

    #[test]
    fn expiry_honours_slack() {
        let s = online_session();
        assert!(!s.is_expired(now(), TimeDelta::zero()));
        assert!(!s.is_expired(now(), TimeDelta::minutes(59)));
        assert!(s.is_expired(now(), TimeDelta::minutes(61)));
        assert!(!Session::new("s", "a", "", false).is_expired(now(), TimeDelta::days(365)));
    }

    #[test]
    fn active_needs_token_time_and_scopes() {
        let s = online_session();
        let products: AuthScopes = "read_products".parse().unwrap();
        let customers: AuthScopes = "read_customers".parse().unwrap();

        assert!(s.is_active(&products, now()));
        assert!(!s.is_active(&customers, now()));
        assert!(!s.is_active(&products, now() + TimeDelta::hours(2)));

        let mut no_token = s.clone();
        no_token.access_token = None;
        assert!(!no_token.is_active(&products, now()));
    }
}
