//! Document repository for farm records.
//!
//! Every record is a JSON object stored under a collection name. Writes
//! stamp RFC 3339 timestamps both into the body and into the indexed
//! columns, and listings come back newest first with the document id
//! folded into the body.

use std::fmt;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rusqlite::{OptionalExtension, Row, params};
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use crate::storage::database::Database;
use crate::storage::error::{StorageError, StorageResult};

/// JSON object body of a document.
pub type Body = Map<String, Value>;

/// Default page size for analysis history.
pub const DEFAULT_ANALYSES_LIMIT: usize = 50;

/// Default look-back window for sensor readings.
pub const DEFAULT_SENSOR_HOURS: i64 = 24;

/// The collections the store knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    /// Farm profiles, keyed by caller-chosen ids.
    Farms,
    /// Crops planted on a farm.
    Crops,
    /// Saved agent outputs.
    Analyses,
    /// Raw sensor readings.
    SensorData,
    /// Irrigation schedules, at most one flagged `active`.
    IrrigationSchedules,
    /// Farm alerts with a read flag.
    Alerts,
}

impl Collection {
    /// Table-level name of the collection.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Farms => "farms",
            Self::Crops => "crops",
            Self::Analyses => "analyses",
            Self::SensorData => "sensor_data",
            Self::IrrigationSchedules => "irrigation_schedules",
            Self::Alerts => "alerts",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Document id, unique within its collection.
    pub id: String,
    /// Owning farm, when the document belongs to one.
    pub farm_id: Option<String>,
    /// JSON body.
    pub body: Body,
    /// Creation timestamp (RFC 3339).
    pub created_at: String,
    /// Last update timestamp (RFC 3339).
    pub updated_at: String,
}

impl Document {
    /// The body with `id` added, as returned to API callers.
    pub fn into_json(self) -> Body {
        let mut body = self.body;
        body.insert("id".to_string(), Value::String(self.id));
        body
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<(Self, String)> {
        let body_json: String = row.get(2)?;
        Ok((
            Self {
                id: row.get(0)?,
                farm_id: row.get(1)?,
                body: Map::new(),
                created_at: row.get(3)?,
                updated_at: row.get(4)?,
            },
            body_json,
        ))
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_body(raw: &str) -> StorageResult<Body> {
    match serde_json::from_str(raw)? {
        Value::Object(body) => Ok(body),
        other => Err(StorageError::InvalidData(format!("document body is not an object: {other}"))),
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Repository over the `documents` table.
pub struct DocumentRepository<'a> {
    db: &'a Database,
}

impl<'a> DocumentRepository<'a> {
    /// Creates a repository borrowing `db`.
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    // ------------------------------------------------------------------
    // Generic document access
    // ------------------------------------------------------------------

    fn put(
        &self,
        collection: Collection,
        id: &str,
        farm_id: Option<&str>,
        body: &Body,
        at: DateTime<Utc>,
    ) -> StorageResult<()> {
        let stamp = timestamp(at);
        self.db.conn().execute(
            r#"
            INSERT OR REPLACE INTO documents (collection, id, farm_id, body_json, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            "#,
            params![collection.as_str(), id, farm_id, serde_json::to_string(body)?, stamp],
        )?;
        debug!(collection = %collection, id = %id, "Stored document");
        Ok(())
    }

    /// Fetches one document.
    ///
    /// # Errors
    /// Returns a `StorageError` on database or decoding failure.
    pub fn get(&self, collection: Collection, id: &str) -> StorageResult<Option<Document>> {
        let row = self
            .db
            .conn()
            .query_row(
                r#"
                SELECT id, farm_id, body_json, created_at, updated_at
                FROM documents WHERE collection = ?1 AND id = ?2
                "#,
                params![collection.as_str(), id],
                Document::from_row,
            )
            .optional()?;

        row.map(|(mut doc, raw)| -> StorageResult<Document> {
            doc.body = parse_body(&raw)?;
            Ok(doc)
        })
        .transpose()
    }

    fn require(&self, collection: Collection, id: &str) -> StorageResult<Document> {
        self.get(collection, id)?
            .ok_or_else(|| StorageError::NotFound(format!("{collection}/{id}")))
    }

    /// Shallow-merges `updates` into an existing document and bumps `updated_at`.
    fn merge(
        &self,
        collection: Collection,
        id: &str,
        mut updates: Body,
        at: DateTime<Utc>,
    ) -> StorageResult<()> {
        let mut doc = self.require(collection, id)?;
        updates.remove("id");
        let stamp = timestamp(at);
        doc.body.extend(updates);
        doc.body.insert("updated_at".to_string(), Value::String(stamp.clone()));

        self.db.conn().execute(
            r#"
            UPDATE documents SET body_json = ?1, updated_at = ?2
            WHERE collection = ?3 AND id = ?4
            "#,
            params![serde_json::to_string(&doc.body)?, stamp, collection.as_str(), id],
        )?;
        debug!(collection = %collection, id = %id, "Updated document");
        Ok(())
    }

    /// Lists a collection newest first, optionally scoped to a farm and a minimum creation time.
    fn list(
        &self,
        collection: Collection,
        farm_id: Option<&str>,
        since: Option<DateTime<Utc>>,
    ) -> StorageResult<Vec<Document>> {
        let since = since.map(timestamp);
        let mut stmt = self.db.conn().prepare(
            r#"
            SELECT id, farm_id, body_json, created_at, updated_at
            FROM documents
            WHERE collection = ?1
              AND (?2 IS NULL OR farm_id = ?2)
              AND (?3 IS NULL OR created_at >= ?3)
            ORDER BY created_at DESC, rowid DESC
            "#,
        )?;

        let rows = stmt
            .query_map(params![collection.as_str(), farm_id, since], Document::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(mut doc, raw)| -> StorageResult<Document> {
                doc.body = parse_body(&raw)?;
                Ok(doc)
            })
            .collect()
    }

    /// Inserts a new document with a generated id, stamping `stamp_keys` with the write time.
    fn create(
        &self,
        collection: Collection,
        farm_id: Option<&str>,
        mut body: Body,
        stamp_keys: &[&str],
    ) -> StorageResult<String> {
        let now = Utc::now();
        for key in stamp_keys {
            body.insert((*key).to_string(), Value::String(timestamp(now)));
        }
        if let Some(farm_id) = farm_id {
            body.insert("farm_id".to_string(), Value::String(farm_id.to_string()));
        }
        let id = new_id();
        self.put(collection, &id, farm_id, &body, now)?;
        Ok(id)
    }

    // ------------------------------------------------------------------
    // Farms
    // ------------------------------------------------------------------

    /// Creates (or replaces) a farm under a caller-chosen id.
    ///
    /// # Errors
    /// Returns a `StorageError` on database failure.
    pub fn create_farm(&self, farm_id: &str, mut data: Body) -> StorageResult<String> {
        let now = Utc::now();
        data.insert("created_at".to_string(), Value::String(timestamp(now)));
        data.insert("updated_at".to_string(), Value::String(timestamp(now)));
        self.put(Collection::Farms, farm_id, Some(farm_id), &data, now)?;
        Ok(farm_id.to_string())
    }

    /// Fetches a farm body with its id.
    ///
    /// # Errors
    /// Returns a `StorageError` on database failure.
    pub fn get_farm(&self, farm_id: &str) -> StorageResult<Option<Body>> {
        Ok(self.get(Collection::Farms, farm_id)?.map(Document::into_json))
    }

    /// Merges `updates` into a farm.
    ///
    /// # Errors
    /// Returns `StorageError::NotFound` when the farm does not exist.
    pub fn update_farm(&self, farm_id: &str, updates: Body) -> StorageResult<()> {
        self.merge(Collection::Farms, farm_id, updates, Utc::now())
    }

    /// Lists farms, optionally only those whose `user_id` matches.
    ///
    /// # Errors
    /// Returns a `StorageError` on database failure.
    pub fn list_farms(&self, user_id: Option<&str>) -> StorageResult<Vec<Body>> {
        Ok(self
            .list(Collection::Farms, None, None)?
            .into_iter()
            .filter(|doc| {
                user_id.is_none_or(|user| doc.body.get("user_id").and_then(Value::as_str) == Some(user))
            })
            .map(Document::into_json)
            .collect())
    }

    // ------------------------------------------------------------------
    // Crops
    // ------------------------------------------------------------------

    /// Adds a crop to a farm and returns its generated id.
    ///
    /// # Errors
    /// Returns a `StorageError` on database failure.
    pub fn add_crop(&self, farm_id: &str, data: Body) -> StorageResult<String> {
        self.create(Collection::Crops, Some(farm_id), data, &["created_at"])
    }

    /// All crops of a farm.
    ///
    /// # Errors
    /// Returns a `StorageError` on database failure.
    pub fn get_crops(&self, farm_id: &str) -> StorageResult<Vec<Body>> {
        Ok(self.list(Collection::Crops, Some(farm_id), None)?.into_iter().map(Document::into_json).collect())
    }

    /// Merges `updates` into a crop.
    ///
    /// # Errors
    /// Returns `StorageError::NotFound` when the crop does not exist.
    pub fn update_crop(&self, crop_id: &str, updates: Body) -> StorageResult<()> {
        self.merge(Collection::Crops, crop_id, updates, Utc::now())
    }

    // ------------------------------------------------------------------
    // Analyses
    // ------------------------------------------------------------------

    /// Saves an analysis result tagged with `analysis_type`.
    ///
    /// The owning farm is read from the body's `farm_id`, if any.
    ///
    /// # Errors
    /// Returns a `StorageError` on database failure.
    pub fn save_analysis(&self, analysis_type: &str, mut data: Body) -> StorageResult<String> {
        data.insert("type".to_string(), Value::String(analysis_type.to_string()));
        let farm_id = data.get("farm_id").and_then(Value::as_str).map(ToString::to_string);
        self.create(Collection::Analyses, farm_id.as_deref(), data, &["timestamp"])
    }

    /// Analysis history of a farm, newest first.
    ///
    /// # Errors
    /// Returns a `StorageError` on database failure.
    pub fn get_analyses(
        &self,
        farm_id: &str,
        analysis_type: Option<&str>,
        limit: usize,
    ) -> StorageResult<Vec<Body>> {
        Ok(self
            .list(Collection::Analyses, Some(farm_id), None)?
            .into_iter()
            .filter(|doc| {
                analysis_type.is_none_or(|t| doc.body.get("type").and_then(Value::as_str) == Some(t))
            })
            .take(limit)
            .map(Document::into_json)
            .collect())
    }

    // ------------------------------------------------------------------
    // Sensor data
    // ------------------------------------------------------------------

    /// Saves one sensor reading.
    ///
    /// # Errors
    /// Returns a `StorageError` on database failure.
    pub fn save_sensor_data(&self, farm_id: &str, data: Body) -> StorageResult<String> {
        self.create(Collection::SensorData, Some(farm_id), data, &["timestamp"])
    }

    /// Readings from the last `hours` hours, newest first.
    ///
    /// # Errors
    /// Returns a `StorageError` on database failure.
    pub fn get_sensor_data(
        &self,
        farm_id: &str,
        sensor_type: Option<&str>,
        hours: i64,
    ) -> StorageResult<Vec<Body>> {
        let cutoff = Utc::now() - Duration::hours(hours.max(0));
        Ok(self
            .list(Collection::SensorData, Some(farm_id), Some(cutoff))?
            .into_iter()
            .filter(|doc| {
                sensor_type
                    .is_none_or(|t| doc.body.get("sensor_type").and_then(Value::as_str) == Some(t))
            })
            .map(Document::into_json)
            .collect())
    }

    // ------------------------------------------------------------------
    // Irrigation schedules
    // ------------------------------------------------------------------

    /// Saves an irrigation schedule.
    ///
    /// # Errors
    /// Returns a `StorageError` on database failure.
    pub fn save_irrigation_schedule(&self, farm_id: &str, data: Body) -> StorageResult<String> {
        self.create(Collection::IrrigationSchedules, Some(farm_id), data, &["created_at"])
    }

    /// The newest schedule with `active == true`.
    ///
    /// # Errors
    /// Returns a `StorageError` on database failure.
    pub fn get_active_irrigation_schedule(&self, farm_id: &str) -> StorageResult<Option<Body>> {
        Ok(self
            .list(Collection::IrrigationSchedules, Some(farm_id), None)?
            .into_iter()
            .find(|doc| doc.body.get("active").and_then(Value::as_bool) == Some(true))
            .map(Document::into_json))
    }

    // ------------------------------------------------------------------
    // Alerts
    // ------------------------------------------------------------------

    /// Creates an unread alert.
    ///
    /// # Errors
    /// Returns a `StorageError` on database failure.
    pub fn create_alert(&self, farm_id: &str, mut data: Body) -> StorageResult<String> {
        data.insert("read".to_string(), Value::Bool(false));
        self.create(Collection::Alerts, Some(farm_id), data, &["created_at"])
    }

    /// Alerts of a farm, newest first.
    ///
    /// # Errors
    /// Returns a `StorageError` on database failure.
    pub fn get_alerts(&self, farm_id: &str, unread_only: bool) -> StorageResult<Vec<Body>> {
        Ok(self
            .list(Collection::Alerts, Some(farm_id), None)?
            .into_iter()
            .filter(|doc| !unread_only || doc.body.get("read").and_then(Value::as_bool) != Some(true))
            .map(Document::into_json)
            .collect())
    }

    /// Flags an alert as read and stamps `read_at`.
    ///
    /// # Errors
    /// Returns `StorageError::NotFound` when the alert does not exist.
    pub fn mark_alert_read(&self, alert_id: &str) -> StorageResult<()> {
        let now = Utc::now();
        let mut updates = Map::new();
        updates.insert("read".to_string(), Value::Bool(true));
        updates.insert("read_at".to_string(), Value::String(timestamp(now)));
        self.merge(Collection::Alerts, alert_id, updates, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> Body {
        match value {
            Value::Object(map) => map,
            _ => panic!("test body must be an object"),
        }
    }

    #[test]
    fn test_farm_create_get_update() {
        let db = Database::open_in_memory().unwrap();
        let repo = DocumentRepository::new(&db);

        let id = repo
            .create_farm("fazenda-boa-vista", body(json!({"name": "Boa Vista", "area": 120})))
            .unwrap();
        assert_eq!(id, "fazenda-boa-vista");

        let farm = repo.get_farm("fazenda-boa-vista").unwrap().unwrap();
        assert_eq!(farm["name"], "Boa Vista");
        assert_eq!(farm["id"], "fazenda-boa-vista");
        let created = farm["created_at"].as_str().unwrap().to_string();

        repo.update_farm("fazenda-boa-vista", body(json!({"area": 150, "id": "ignored"}))).unwrap();
        let farm = repo.get_farm("fazenda-boa-vista").unwrap().unwrap();
        assert_eq!(farm["area"], 150);
        assert_eq!(farm["name"], "Boa Vista");
        assert_eq!(farm["id"], "fazenda-boa-vista");
        assert_eq!(farm["created_at"], created.as_str());
        assert!(farm["updated_at"].as_str().unwrap() >= created.as_str());
    }

    #[test]
    fn test_missing_documents() {
        let db = Database::open_in_memory().unwrap();
        let repo = DocumentRepository::new(&db);

        assert!(repo.get_farm("nope").unwrap().is_none());
        assert!(matches!(repo.update_farm("nope", Map::new()), Err(StorageError::NotFound(_))));
        assert!(matches!(repo.update_crop("nope", Map::new()), Err(StorageError::NotFound(_))));
        assert!(matches!(repo.mark_alert_read("nope"), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_list_farms_by_user() {
        let db = Database::open_in_memory().unwrap();
        let repo = DocumentRepository::new(&db);
        repo.create_farm("a", body(json!({"user_id": "u1"}))).unwrap();
        repo.create_farm("b", body(json!({"user_id": "u2"}))).unwrap();
        repo.create_farm("c", body(json!({"user_id": "u1"}))).unwrap();

        assert_eq!(repo.list_farms(None).unwrap().len(), 3);
        let mine = repo.list_farms(Some("u1")).unwrap();
        let mut ids: Vec<&str> = mine.iter().map(|f| f["id"].as_str().unwrap()).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_crops_are_scoped_to_farm() {
        let db = Database::open_in_memory().unwrap();
        let repo = DocumentRepository::new(&db);

        let soja = repo.add_crop("f1", body(json!({"crop_type": "Soja"}))).unwrap();
        repo.add_crop("f2", body(json!({"crop_type": "Milho"}))).unwrap();

        let crops = repo.get_crops("f1").unwrap();
        assert_eq!(crops.len(), 1);
        assert_eq!(crops[0]["farm_id"], "f1");
        assert_eq!(crops[0]["id"], soja.as_str());

        repo.update_crop(&soja, body(json!({"stage": "R1"}))).unwrap();
        assert_eq!(repo.get_crops("f1").unwrap()[0]["stage"], "R1");
    }

    #[test]
    fn test_analyses_filter_limit_and_order() {
        let db = Database::open_in_memory().unwrap();
        let repo = DocumentRepository::new(&db);

        let first = repo.save_analysis("climate", body(json!({"farm_id": "f1", "n": 1}))).unwrap();
        repo.save_analysis("crop", body(json!({"farm_id": "f1", "n": 2}))).unwrap();
        let third = repo.save_analysis("climate", body(json!({"farm_id": "f1", "n": 3}))).unwrap();
        repo.save_analysis("climate", body(json!({"farm_id": "f2", "n": 4}))).unwrap();

        let all = repo.get_analyses("f1", None, DEFAULT_ANALYSES_LIMIT).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0]["id"], third.as_str());

        let climate = repo.get_analyses("f1", Some("climate"), DEFAULT_ANALYSES_LIMIT).unwrap();
        assert_eq!(climate.len(), 2);
        assert!(climate.iter().all(|a| a["type"] == "climate"));
        assert!(climate[0].contains_key("timestamp"));
        assert_eq!(climate[1]["id"], first.as_str());

        assert_eq!(repo.get_analyses("f1", None, 1).unwrap().len(), 1);
    }

    #[test]
    fn test_sensor_data_window_and_type() {
        let db = Database::open_in_memory().unwrap();
        let repo = DocumentRepository::new(&db);

        repo.save_sensor_data("f1", body(json!({"sensor_type": "soil_moisture", "value": 31}))).unwrap();
        repo.save_sensor_data("f1", body(json!({"sensor_type": "temperature", "value": 24}))).unwrap();

        let old = Utc::now() - Duration::hours(48);
        repo.put(
            Collection::SensorData,
            "old-reading",
            Some("f1"),
            &body(json!({"sensor_type": "soil_moisture", "value": 10})),
            old,
        )
        .unwrap();

        assert_eq!(repo.get_sensor_data("f1", None, DEFAULT_SENSOR_HOURS).unwrap().len(), 2);
        assert_eq!(repo.get_sensor_data("f1", None, 72).unwrap().len(), 3);

        let moisture = repo.get_sensor_data("f1", Some("soil_moisture"), DEFAULT_SENSOR_HOURS).unwrap();
        assert_eq!(moisture.len(), 1);
        assert_eq!(moisture[0]["value"], 31);
    }

    #[test]
    fn test_active_irrigation_schedule() {
        let db = Database::open_in_memory().unwrap();
        let repo = DocumentRepository::new(&db);

        assert!(repo.get_active_irrigation_schedule("f1").unwrap().is_none());
        repo.save_irrigation_schedule("f1", body(json!({"active": false, "name": "old"}))).unwrap();
        let active = repo
            .save_irrigation_schedule("f1", body(json!({"active": true, "name": "current"})))
            .unwrap();

        let schedule = repo.get_active_irrigation_schedule("f1").unwrap().unwrap();
        assert_eq!(schedule["id"], active.as_str());
        assert_eq!(schedule["name"], "current");
        assert!(repo.get_active_irrigation_schedule("f2").unwrap().is_none());
    }

    #[test]
    fn test_alerts_read_flow() {
        let db = Database::open_in_memory().unwrap();
        let repo = DocumentRepository::new(&db);

        let frost = repo.create_alert("f1", body(json!({"kind": "frost"}))).unwrap();
        repo.create_alert("f1", body(json!({"kind": "pest"}))).unwrap();

        let alerts = repo.get_alerts("f1", false).unwrap();
        assert_eq!(alerts.len(), 2);
        assert!(alerts.iter().all(|a| a["read"] == false));

        repo.mark_alert_read(&frost).unwrap();
        let unread = repo.get_alerts("f1", true).unwrap();
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0]["kind"], "pest");

        let all = repo.get_alerts("f1", false).unwrap();
        let read = all.iter().find(|a| a["id"] == frost.as_str()).unwrap();
        assert_eq!(read["read"], true);
        assert!(read.contains_key("read_at"));
    }
}
