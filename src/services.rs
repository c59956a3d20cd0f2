//! Business-handler seam. Everything past validation (persistence, email,
//! PDF generation) lives behind [`BackOffice`]; the pipeline only ever hands
//! it fully transformed data. The in-memory implementation records payloads
//! and is used by tests and local development.

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Sink for validated request data. Implementations may perform I/O; the
/// pipeline itself never does.
#[async_trait]
pub trait BackOffice: Send + Sync {
    async fn submit_contact(&self, message: Value) -> anyhow::Result<()>;
    async fn track_container(&self, container_id: &str) -> anyhow::Result<Option<Value>>;
    async fn save_invoice(&self, invoice: Value) -> anyhow::Result<Uuid>;
    async fn save_testimonial(&self, testimonial: Value) -> anyhow::Result<Uuid>;
    async fn create_user(&self, user: Value) -> anyhow::Result<Uuid>;
    async fn update_settings(&self, settings: Value) -> anyhow::Result<()>;
}

/// Recording implementation used in tests and development.
#[derive(Default)]
pub struct InMemoryBackOffice {
    pub contacts: Mutex<Vec<Value>>,
    pub invoices: DashMap<Uuid, Value>,
    pub testimonials: DashMap<Uuid, Value>,
    pub users: DashMap<Uuid, Value>,
    pub settings: Mutex<Option<Value>>,
    pub shipments: DashMap<String, Value>,
}

impl InMemoryBackOffice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Seed a shipment so tracking lookups can succeed.
    pub fn insert_shipment(&self, container_id: impl Into<String>, status: Value) {
        self.shipments.insert(container_id.into(), status);
    }
}

#[async_trait]
impl BackOffice for InMemoryBackOffice {
    async fn submit_contact(&self, message: Value) -> anyhow::Result<()> {
        self.contacts.lock().await.push(message);
        Ok(())
    }

    async fn track_container(&self, container_id: &str) -> anyhow::Result<Option<Value>> {
        Ok(self.shipments.get(container_id).map(|entry| {
            json!({
                "container_id": container_id,
                "status": entry.clone(),
            })
        }))
    }

    async fn save_invoice(&self, invoice: Value) -> anyhow::Result<Uuid> {
        let id = Uuid::new_v4();
        self.invoices.insert(id, invoice);
        Ok(id)
    }

    async fn save_testimonial(&self, testimonial: Value) -> anyhow::Result<Uuid> {
        let id = Uuid::new_v4();
        self.testimonials.insert(id, testimonial);
        Ok(id)
    }

    async fn create_user(&self, user: Value) -> anyhow::Result<Uuid> {
        let id = Uuid::new_v4();
        self.users.insert(id, user);
        Ok(id)
    }

    async fn update_settings(&self, settings: Value) -> anyhow::Result<()> {
        *self.settings.lock().await = Some(settings);
        Ok(())
    }
}
