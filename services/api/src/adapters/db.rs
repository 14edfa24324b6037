//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use concierge_core::domain::{
    CartSelection, FlightSelection, HotelSelection, Session, TourStep,
};
use concierge_core::ports::{DatabaseService, PortError, PortResult};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// Cart slot names as stored in the `cart_selections` table.
const SLOT_OUTBOUND: &str = "outbound";
const SLOT_RETURN: &str = "return";
const SLOT_HOTEL: &str = "hotel";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Upserts one cart slot. Last write wins; the payload is never merged.
    async fn put_slot(&self, session_id: Uuid, slot: &str, payload: String) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO cart_selections (session_id, slot, payload, updated_at) \
             VALUES ($1, $2, $3, now()) \
             ON CONFLICT (session_id, slot) \
             DO UPDATE SET payload = EXCLUDED.payload, updated_at = now()",
        )
        .bind(session_id)
        .bind(slot)
        .bind(payload)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct SessionRecord {
    id: Uuid,
    current_step: String,
    paused: bool,
    declined: bool,
    thanks_shown: bool,
    created_at: DateTime<Utc>,
    last_accessed_at: DateTime<Utc>,
}

impl SessionRecord {
    fn to_domain(self) -> PortResult<Session> {
        let current_step = TourStep::from_str(&self.current_step).ok_or_else(|| {
            PortError::Unexpected(format!("Unknown tour step in database: {}", self.current_step))
        })?;
        Ok(Session {
            id: self.id,
            current_step,
            paused: self.paused,
            declined: self.declined,
            thanks_shown: self.thanks_shown,
            created_at: self.created_at,
            last_accessed_at: self.last_accessed_at,
        })
    }
}

#[derive(FromRow)]
struct CartSlotRecord {
    slot: String,
    payload: String,
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_session(&self) -> PortResult<Session> {
        let record = sqlx::query_as::<_, SessionRecord>(
            "INSERT INTO sessions (id) VALUES ($1) \
             RETURNING id, current_step, paused, declined, thanks_shown, created_at, last_accessed_at",
        )
        .bind(Uuid::new_v4())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        record.to_domain()
    }

    async fn get_session_by_id(&self, session_id: Uuid) -> PortResult<Session> {
        let record = sqlx::query_as::<_, SessionRecord>(
            "UPDATE sessions SET last_accessed_at = now() WHERE id = $1 \
             RETURNING id, current_step, paused, declined, thanks_shown, created_at, last_accessed_at",
        )
        .bind(session_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => {
                PortError::NotFound(format!("Session {} not found", session_id))
            }
            _ => PortError::Unexpected(e.to_string()),
        })?;
        record.to_domain()
    }

    async fn update_tour_state(
        &self,
        session_id: Uuid,
        current_step: TourStep,
        paused: bool,
        declined: bool,
        thanks_shown: bool,
    ) -> PortResult<()> {
        sqlx::query(
            "UPDATE sessions \
             SET current_step = $1, paused = $2, declined = $3, thanks_shown = $4, \
                 last_accessed_at = now() \
             WHERE id = $5",
        )
        .bind(current_step.as_str())
        .bind(paused)
        .bind(declined)
        .bind(thanks_shown)
        .bind(session_id)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }

    async fn put_outbound_flight(
        &self,
        session_id: Uuid,
        selection: &FlightSelection,
    ) -> PortResult<()> {
        let payload = serde_json::to_string(selection)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        self.put_slot(session_id, SLOT_OUTBOUND, payload).await
    }

    async fn put_return_flight(
        &self,
        session_id: Uuid,
        selection: &FlightSelection,
    ) -> PortResult<()> {
        let payload = serde_json::to_string(selection)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        self.put_slot(session_id, SLOT_RETURN, payload).await
    }

    async fn put_hotel(&self, session_id: Uuid, selection: &HotelSelection) -> PortResult<()> {
        let payload = serde_json::to_string(selection)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        self.put_slot(session_id, SLOT_HOTEL, payload).await
    }

    async fn get_cart(&self, session_id: Uuid) -> PortResult<CartSelection> {
        let records = sqlx::query_as::<_, CartSlotRecord>(
            "SELECT slot, payload FROM cart_selections WHERE session_id = $1",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let mut cart = CartSelection::default();
        for record in records {
            match record.slot.as_str() {
                SLOT_OUTBOUND => {
                    cart.outbound = Some(
                        serde_json::from_str(&record.payload)
                            .map_err(|e| PortError::Unexpected(e.to_string()))?,
                    );
                }
                SLOT_RETURN => {
                    cart.return_flight = Some(
                        serde_json::from_str(&record.payload)
                            .map_err(|e| PortError::Unexpected(e.to_string()))?,
                    );
                }
                SLOT_HOTEL => {
                    cart.hotel = Some(
                        serde_json::from_str(&record.payload)
                            .map_err(|e| PortError::Unexpected(e.to_string()))?,
                    );
                }
                other => {
                    return Err(PortError::Unexpected(format!("Unknown cart slot: {}", other)))
                }
            }
        }
        Ok(cart)
    }

    async fn clear_cart(&self, session_id: Uuid) -> PortResult<()> {
        sqlx::query("DELETE FROM cart_selections WHERE session_id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }
}
