use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::auth::repo::User;
use crate::config::RemoteConfig;
use crate::plans::repo::Plan;

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("remote request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("remote returned status {0}")]
    Status(StatusCode),
}

/// A user document as stored in the remote users collection. Field defaults
/// mirror how a half-filled document is tolerated rather than rejected.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteUser {
    #[serde(default)]
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub vorname: String,
    #[serde(default)]
    pub nachname: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub geburtstag: String,
    #[serde(default)]
    pub password_hash: String,
}

/// Client for the remote document store. Plans live in a per-user, per-weekday
/// collection keyed `"<email>_<tag>"`; users live in a collection keyed by
/// email. Every operation is a stateless request with no version token, so
/// concurrent writers resolve to last-write-wins.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn save_plan(&self, email: &str, plan: &Plan) -> Result<(), RemoteError>;
    async fn delete_plan(&self, email: &str, tag: &str) -> Result<(), RemoteError>;
    async fn load_plans(&self, user_id: i64) -> Result<Vec<Plan>, RemoteError>;
    async fn save_user(&self, user: &User) -> Result<(), RemoteError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<RemoteUser>, RemoteError>;
}

#[derive(Clone)]
pub struct DocumentStore {
    http: reqwest::Client,
    base_url: String,
    plans_collection: String,
    users_collection: String,
}

impl DocumentStore {
    pub fn new(config: &RemoteConfig) -> anyhow::Result<Self> {
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            plans_collection: config.plans_collection.clone(),
            users_collection: config.users_collection.clone(),
        })
    }

    fn doc_url(&self, collection: &str, doc_id: &str) -> String {
        format!("{}/{}/{}", self.base_url, collection, doc_id)
    }

    fn plan_doc_id(email: &str, tag: &str) -> String {
        format!("{email}_{tag}")
    }
}

/// Translates one remote plan document back into a local record. Documents
/// missing `tag`, `datenJson` or `erstelltAm` are dropped; the local id is
/// forced to 0 so a subsequent insert never collides with another user's
/// local id space.
fn doc_to_plan(doc: &Value, user_id: i64) -> Option<Plan> {
    let tag = doc.get("tag")?.as_str()?.to_string();
    let daten_json = doc.get("datenJson")?.as_str()?.to_string();
    let erstellt_am = doc.get("erstelltAm")?.as_str()?.to_string();
    let aktualisiert_am = doc
        .get("aktualisiertAm")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    Some(Plan {
        id: 0,
        tag,
        erstellt_am,
        aktualisiert_am,
        daten_json,
        user_id,
    })
}

#[async_trait]
impl RemoteStore for DocumentStore {
    async fn save_plan(&self, email: &str, plan: &Plan) -> Result<(), RemoteError> {
        let doc_id = Self::plan_doc_id(email, &plan.tag);
        // The remote field map substitutes "" for an absent aktualisiertAm.
        let body = json!({
            "tag": plan.tag,
            "datenJson": plan.daten_json,
            "erstelltAm": plan.erstellt_am,
            "aktualisiertAm": plan.aktualisiert_am.clone().unwrap_or_default(),
            "userId": plan.user_id,
        });
        let res = self
            .http
            .put(self.doc_url(&self.plans_collection, &doc_id))
            .json(&body)
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(RemoteError::Status(res.status()));
        }
        debug!(%doc_id, "plan mirrored to remote store");
        Ok(())
    }

    async fn delete_plan(&self, email: &str, tag: &str) -> Result<(), RemoteError> {
        let doc_id = Self::plan_doc_id(email, tag);
        let res = self
            .http
            .delete(self.doc_url(&self.plans_collection, &doc_id))
            .send()
            .await?;
        // Deleting a document that no longer exists is vacuously successful.
        if !res.status().is_success() && res.status() != StatusCode::NOT_FOUND {
            return Err(RemoteError::Status(res.status()));
        }
        debug!(%doc_id, "plan removed from remote store");
        Ok(())
    }

    async fn load_plans(&self, user_id: i64) -> Result<Vec<Plan>, RemoteError> {
        let res = self
            .http
            .get(format!("{}/{}", self.base_url, self.plans_collection))
            .query(&[("userId", user_id)])
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(RemoteError::Status(res.status()));
        }
        let docs: Vec<Value> = res.json().await?;
        let plans = docs
            .iter()
            .filter_map(|doc| {
                let plan = doc_to_plan(doc, user_id);
                if plan.is_none() {
                    warn!(user_id, "malformed remote plan document skipped");
                }
                plan
            })
            .collect();
        Ok(plans)
    }

    async fn save_user(&self, user: &User) -> Result<(), RemoteError> {
        let body = json!({
            "id": user.id,
            "vorname": user.vorname,
            "nachname": user.nachname,
            "email": user.email,
            "phone": user.phone,
            "geburtstag": user.geburtstag,
            "password_hash": user.password_hash,
        });
        let res = self
            .http
            .put(self.doc_url(&self.users_collection, &user.email))
            .json(&body)
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(RemoteError::Status(res.status()));
        }
        debug!(email = %user.email, "user mirrored to remote store");
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<RemoteUser>, RemoteError> {
        let res = self
            .http
            .get(self.doc_url(&self.users_collection, email))
            .send()
            .await?;
        if res.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !res.status().is_success() {
            return Err(RemoteError::Status(res.status()));
        }
        match res.json::<RemoteUser>().await {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                warn!(%email, error = %e, "malformed remote user document ignored");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doc_to_plan_maps_fields_and_forces_local_id() {
        let doc = json!({
            "tag": "Montag",
            "datenJson": "[]",
            "erstelltAm": "1700000000000",
            "aktualisiertAm": "1700000100000",
            "userId": 7,
        });
        let plan = doc_to_plan(&doc, 7).expect("complete document should map");
        assert_eq!(plan.id, 0);
        assert_eq!(plan.tag, "Montag");
        assert_eq!(plan.erstellt_am, "1700000000000");
        assert_eq!(plan.aktualisiert_am.as_deref(), Some("1700000100000"));
        assert_eq!(plan.user_id, 7);
    }

    #[test]
    fn doc_to_plan_drops_documents_missing_required_fields() {
        let missing_tag = json!({"datenJson": "[]", "erstelltAm": "1"});
        let missing_json = json!({"tag": "Montag", "erstelltAm": "1"});
        let missing_created = json!({"tag": "Montag", "datenJson": "[]"});
        assert!(doc_to_plan(&missing_tag, 1).is_none());
        assert!(doc_to_plan(&missing_json, 1).is_none());
        assert!(doc_to_plan(&missing_created, 1).is_none());
    }

    #[test]
    fn doc_to_plan_treats_empty_aktualisiert_am_as_absent() {
        let doc = json!({
            "tag": "Dienstag",
            "datenJson": "[]",
            "erstelltAm": "1700000000000",
            "aktualisiertAm": "",
        });
        let plan = doc_to_plan(&doc, 3).unwrap();
        assert_eq!(plan.aktualisiert_am, None);
    }

    #[test]
    fn plan_doc_id_is_email_underscore_tag() {
        assert_eq!(
            DocumentStore::plan_doc_id("a@b.de", "Montag"),
            "a@b.de_Montag"
        );
    }
}
