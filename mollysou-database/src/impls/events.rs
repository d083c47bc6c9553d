use anyhow::Context as _;

use crate::cache::{CATALOG_CACHE_TTL, event_key, events_key};
use crate::database::Database;
use crate::model::catalog::Event;

/// How many events the popular list shows.
pub const POPULAR_EVENTS_LIMIT: usize = 4;

#[derive(sqlx::FromRow)]
struct EventRow {
    id: i64,
    title: String,
    description: Option<String>,
    starts_at: Option<i64>,
    price_cents: Option<i64>,
    image: Option<String>,
    location: Option<String>,
    rating: f64,
    event_type: Option<String>,
}

/// All events, soonest first. Undated events sort last.
pub async fn list_events(db: &Database) -> anyhow::Result<Vec<Event>> {
    let cache_key = events_key(db.cache());
    db.cache()
        .read_through(&cache_key, CATALOG_CACHE_TTL, || async {
            let rows: Vec<EventRow> = sqlx::query_as(
                "SELECT id, title, description, starts_at, price_cents, image, location, rating, event_type
                 FROM events
                 ORDER BY starts_at ASC NULLS LAST, id ASC",
            )
            .fetch_all(db.pool())
            .await?;

            rows.into_iter().map(to_event).collect()
        })
        .await
}

/// The first few events by date.
pub async fn list_popular_events(db: &Database) -> anyhow::Result<Vec<Event>> {
    Ok(popular(list_events(db).await?))
}

/// Keep the first [`POPULAR_EVENTS_LIMIT`] of an already date-ordered list.
pub fn popular(mut events: Vec<Event>) -> Vec<Event> {
    events.truncate(POPULAR_EVENTS_LIMIT);
    events
}

pub async fn get_event(db: &Database, event_id: u64) -> anyhow::Result<Option<Event>> {
    let cache_key = event_key(db.cache(), event_id);
    db.cache()
        .read_through(&cache_key, CATALOG_CACHE_TTL, || async {
            let event_id_i64 = i64::try_from(event_id).context("event_id out of i64 range")?;

            let row: Option<EventRow> = sqlx::query_as(
                "SELECT id, title, description, starts_at, price_cents, image, location, rating, event_type
                 FROM events
                 WHERE id = $1",
            )
            .bind(event_id_i64)
            .fetch_optional(db.pool())
            .await?;

            row.map(to_event).transpose()
        })
        .await
}

fn to_event(row: EventRow) -> anyhow::Result<Event> {
    Ok(Event {
        id: u64::try_from(row.id).context("id row out of u64 range")?,
        title: row.title,
        description: row.description,
        starts_at: row
            .starts_at
            .map(u64::try_from)
            .transpose()
            .context("starts_at row out of u64 range")?,
        price_cents: row.price_cents,
        image: row.image,
        location: row.location,
        rating: row.rating,
        event_type: row.event_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: u64) -> Event {
        Event {
            id,
            title: format!("event {id}"),
            description: None,
            starts_at: Some(1_700_000_000 + id),
            price_cents: None,
            image: None,
            location: None,
            rating: 0.0,
            event_type: None,
        }
    }

    #[test]
    fn popular_keeps_the_first_four_in_order() {
        let events = (1..=6).map(event).collect();
        let ids: Vec<u64> = popular(events).iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn popular_with_fewer_events_keeps_them_all() {
        let ids: Vec<u64> = popular(vec![event(9), event(2)])
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec![9, 2]);
        assert!(popular(Vec::new()).is_empty());
    }
}
