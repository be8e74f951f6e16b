use crate::app::ports::SavedEventsPort;
use crate::domain::{Address, Event, EventImage, GeoPoint, Venue};
use crate::error::Result;
use crate::infra::sqlite::SqliteDatabase;
use crate::observability::metrics;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, instrument, warn};

/// Saved events persisted as one row per event plus joined venue and venue-image rows.
///
/// Nested value objects without their own identity (dates, images, prices,
/// classifications, place, attractions) are stored as JSON columns.
pub struct SqliteSavedEventsStore {
    db: SqliteDatabase,
    updates: Arc<watch::Sender<Vec<Event>>>,
}

impl SqliteSavedEventsStore {
    pub fn new(db: SqliteDatabase) -> Result<Self> {
        let initial = {
            let conn = db.lock()?;
            load_events(&conn)?
        };
        let (updates, _) = watch::channel(initial);
        Ok(Self {
            db,
            updates: Arc::new(updates),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::new(SqliteDatabase::open_in_memory()?)
    }
}

#[async_trait]
impl SavedEventsPort for SqliteSavedEventsStore {
    #[instrument(skip(self, event), fields(event_id = %event.id))]
    async fn save_event(&self, event: &Event) -> Result<()> {
        let event = event.clone();
        let updates = Arc::clone(&self.updates);
        self.db
            .call(move |conn| {
                insert_event(conn, &event)?;
                publish(conn, &updates)
            })
            .await?;
        metrics::stores::saved_event_write("save");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove_event(&self, event_id: &str) -> Result<()> {
        let event_id = event_id.to_string();
        let updates = Arc::clone(&self.updates);
        self.db
            .call(move |conn| {
                let tx = conn.transaction()?;
                delete_rows(&tx, &event_id)?;
                tx.commit()?;
                publish(conn, &updates)
            })
            .await?;
        metrics::stores::saved_event_write("remove");
        Ok(())
    }

    async fn saved_ids(&self) -> Result<HashSet<String>> {
        self.db
            .call(|conn| {
                let mut stmt = conn.prepare("SELECT event_id FROM saved_events")?;
                let ids = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<rusqlite::Result<HashSet<_>>>()?;
                Ok(ids)
            })
            .await
    }

    async fn saved_events(&self) -> Result<Vec<Event>> {
        self.db.call(|conn| load_events(conn)).await
    }

    fn subscribe(&self) -> watch::Receiver<Vec<Event>> {
        self.updates.subscribe()
    }
}

// Runs with the connection still locked, so snapshots reach subscribers in write order
fn publish(conn: &Connection, updates: &watch::Sender<Vec<Event>>) -> Result<()> {
    let events = load_events(conn)?;
    debug!("Publishing {} saved events", events.len());
    updates.send_replace(events);
    Ok(())
}

fn insert_event(conn: &mut Connection, event: &Event) -> Result<()> {
    let tx = conn.transaction()?;
    delete_rows(&tx, &event.id)?;

    let next_order: i64 = tx.query_row(
        "SELECT COALESCE(MAX(saved_at), 0) + 1 FROM saved_events",
        [],
        |row| row.get(0),
    )?;
    tx.execute(
        "INSERT INTO saved_events (
            event_id, name, url, description, additional_info, info, please_note,
            dates, images, price_ranges, classifications, place, attractions,
            latitude, longitude, saved_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
        params![
            event.id,
            event.name,
            event.url,
            event.description,
            event.additional_info,
            event.info,
            event.please_note,
            to_json_opt(&event.dates)?,
            to_json(&event.images)?,
            to_json(&event.price_ranges)?,
            to_json(&event.classifications)?,
            to_json_opt(&event.place)?,
            to_json(&event.attractions)?,
            event.location.map(|p| p.latitude),
            event.location.map(|p| p.longitude),
            next_order,
        ],
    )?;

    for (position, venue) in event.venues.iter().enumerate() {
        tx.execute(
            "INSERT OR REPLACE INTO venues (
                event_id, venue_id, position, name, url, description, address,
                parking_detail, general_rule, child_rule
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                event.id,
                venue.id,
                position as i64,
                venue.name,
                venue.url,
                venue.description,
                to_json(&venue.address)?,
                venue.parking_detail,
                venue.general_rule,
                venue.child_rule,
            ],
        )?;
        for (image_position, image) in venue.images.iter().enumerate() {
            tx.execute(
                "INSERT OR REPLACE INTO venue_images (event_id, venue_id, position, image)
                 VALUES (?1, ?2, ?3, ?4)",
                params![event.id, venue.id, image_position as i64, to_json(image)?],
            )?;
        }
    }
    tx.commit()?;
    Ok(())
}

fn delete_rows(conn: &Connection, event_id: &str) -> Result<()> {
    conn.execute("DELETE FROM venue_images WHERE event_id = ?1", params![event_id])?;
    conn.execute("DELETE FROM venues WHERE event_id = ?1", params![event_id])?;
    conn.execute("DELETE FROM saved_events WHERE event_id = ?1", params![event_id])?;
    Ok(())
}

struct EventRow {
    event: Event,
    dates: Option<String>,
    images: String,
    price_ranges: String,
    classifications: String,
    place: Option<String>,
    attractions: String,
}

fn load_events(conn: &Connection) -> Result<Vec<Event>> {
    let mut venues = load_venues(conn)?;

    let mut stmt = conn.prepare(
        "SELECT event_id, name, url, description, additional_info, info, please_note,
                dates, images, price_ranges, classifications, place, attractions,
                latitude, longitude
         FROM saved_events ORDER BY saved_at DESC",
    )?;
    let rows = stmt
        .query_map([], |row| {
            let latitude: Option<f64> = row.get(13)?;
            let longitude: Option<f64> = row.get(14)?;
            Ok(EventRow {
                event: Event {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    url: row.get(2)?,
                    description: row.get(3)?,
                    additional_info: row.get(4)?,
                    info: row.get(5)?,
                    please_note: row.get(6)?,
                    location: latitude.zip(longitude).map(|(lat, lon)| GeoPoint::new(lat, lon)),
                    saved: true,
                    ..Default::default()
                },
                dates: row.get(7)?,
                images: row.get(8)?,
                price_ranges: row.get(9)?,
                classifications: row.get(10)?,
                place: row.get(11)?,
                attractions: row.get(12)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut events = Vec::with_capacity(rows.len());
    for row in rows {
        let mut event = row.event;
        event.dates = from_json_opt(row.dates.as_deref(), &event.id);
        event.images = from_json(&row.images, &event.id);
        event.price_ranges = from_json(&row.price_ranges, &event.id);
        event.classifications = from_json(&row.classifications, &event.id);
        event.place = from_json_opt(row.place.as_deref(), &event.id);
        event.attractions = from_json(&row.attractions, &event.id);
        event.venues = venues.remove(&event.id).unwrap_or_default();
        events.push(event);
    }
    Ok(events)
}

fn load_venues(conn: &Connection) -> Result<HashMap<String, Vec<Venue>>> {
    let mut images: HashMap<(String, String), Vec<EventImage>> = HashMap::new();
    {
        let mut stmt = conn.prepare(
            "SELECT event_id, venue_id, image FROM venue_images
             ORDER BY event_id, venue_id, position",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;
        for row in rows {
            let (event_id, venue_id, raw) = row?;
            if let Some(image) = from_json_opt::<EventImage>(Some(&raw), &event_id) {
                images.entry((event_id, venue_id)).or_default().push(image);
            }
        }
    }

    let mut stmt = conn.prepare(
        "SELECT event_id, venue_id, name, url, description, address,
                parking_detail, general_rule, child_rule
         FROM venues ORDER BY event_id, position",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            Venue {
                id: row.get(1)?,
                name: row.get(2)?,
                url: row.get(3)?,
                description: row.get(4)?,
                parking_detail: row.get(6)?,
                general_rule: row.get(7)?,
                child_rule: row.get(8)?,
                ..Default::default()
            },
            row.get::<_, String>(5)?,
        ))
    })?;

    let mut venues: HashMap<String, Vec<Venue>> = HashMap::new();
    for row in rows {
        let (event_id, mut venue, address) = row?;
        venue.address = from_json::<Address>(&address, &event_id);
        venue.images = images
            .remove(&(event_id.clone(), venue.id.clone()))
            .unwrap_or_default();
        venues.entry(event_id).or_default().push(venue);
    }
    Ok(venues)
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

fn to_json_opt<T: Serialize>(value: &Option<T>) -> Result<Option<String>> {
    value.as_ref().map(to_json).transpose()
}

// Unreadable JSON columns degrade to empty values rather than hiding the saved event
fn from_json<T: DeserializeOwned + Default>(raw: &str, event_id: &str) -> T {
    from_json_opt(Some(raw), event_id).unwrap_or_default()
}

fn from_json_opt<T: DeserializeOwned>(raw: Option<&str>, event_id: &str) -> Option<T> {
    let raw = raw?;
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Unreadable column for saved event {}: {}", event_id, e);
            None
        }
    }
}
