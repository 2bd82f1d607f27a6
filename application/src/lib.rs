use async_trait::async_trait;
use domain::{Category, Contact, ContactId, DomainError, Settings, SortOrder};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

// --- Application Errors ---
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Storage operation failed: {0}")]
    Storage(String),
    #[error("Serialization failed: {0}")]
    Serialization(String),
    #[error("Domain validation error: {0}")]
    Domain(#[from] DomainError),
}

// --- Persisted key namespace ---

/// Key under which the full contact collection is stored.
pub const CONTACTS_KEY: &str = "contacts";
/// Key under which the settings record is stored (dark mode excluded).
pub const SETTINGS_KEY: &str = "settings";
/// Key owned by the theme collaborator, persisted independently of the
/// settings record.
pub const DARK_MODE_KEY: &str = "darkMode";

// --- Infrastructure Interface (Trait) ---

/// Interface to the device's durable key-value storage. Implementations
/// guarantee last-write-wins per key; no ordering is promised across
/// different keys.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`, `None` if absent.
    async fn get(&self, key: &str) -> Result<Option<String>, ApplicationError>;
    /// Writes `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), ApplicationError>;
    /// Erases every key in the application's namespace. Irreversible.
    async fn clear(&self) -> Result<(), ApplicationError>;
}

// --- Contact Store (Use Case) ---

/// Authoritative in-memory contact collection, kept synchronized with
/// durable storage. Hydrated once via `load`, then every mutation rewrites
/// the full collection under [`CONTACTS_KEY`].
///
/// Storage failures are absorbed here: a failed read hydrates an empty
/// collection, a failed write leaves the in-memory mutation in place and is
/// only logged. Losing a local cache is recoverable by re-entry, so neither
/// case is surfaced to the caller.
pub struct ContactStore {
    storage: Arc<dyn KeyValueStore>,
    contacts: Vec<Contact>,
}

impl ContactStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            contacts: Vec::new(),
        }
    }

    /// Hydrates the collection from durable storage. Best effort: an absent
    /// key, unreadable storage, or an undecodable payload all leave the
    /// collection empty.
    #[instrument(skip(self))]
    pub async fn load(&mut self) {
        self.contacts = match self.storage.get(CONTACTS_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(contacts) => contacts,
                Err(e) => {
                    warn!("Stored contact collection is undecodable, starting empty: {e}");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Failed to read contact collection, starting empty: {e}");
                Vec::new()
            }
        };
        debug!(count = self.contacts.len(), "Contact collection hydrated");
    }

    /// Rewrites the full collection to durable storage. A failure is logged
    /// and the in-memory state kept; durable state may lag until the next
    /// successful save.
    async fn save(&self) {
        let raw = match serde_json::to_string(&self.contacts) {
            Ok(raw) => raw,
            Err(e) => {
                error!("Failed to encode contact collection, skipping save: {e}");
                return;
            }
        };
        if let Err(e) = self.storage.set(CONTACTS_KEY, &raw).await {
            error!("Failed to persist contact collection, in-memory state retained: {e}");
        }
    }

    /// Appends a new contact and saves. Returns the assigned id, or `None`
    /// when name or phone is empty after trimming — a silent no-op by
    /// design; preventing empty submissions is the presentation layer's
    /// concern.
    #[instrument(skip(self, name, phone))]
    pub async fn create(
        &mut self,
        name: &str,
        phone: &str,
        category: Category,
    ) -> Option<ContactId> {
        let contact = match Contact::new(ContactId::generate(), name, phone, category) {
            Ok(contact) => contact,
            Err(e) => {
                warn!("Rejected contact creation: {e}");
                return None;
            }
        };
        let id = contact.id().clone();
        self.contacts.push(contact);
        self.save().await;
        info!(contact_id = %id.as_str(), "Contact created");
        Some(id)
    }

    /// Replaces the fields of the contact with `id` and saves. Returns
    /// `false` without touching anything when validation rejects the input
    /// or no contact carries `id` — the latter legitimately happens when
    /// the record was deleted in the UI before the edit was confirmed.
    #[instrument(skip(self, name, phone))]
    pub async fn update(
        &mut self,
        id: &ContactId,
        name: &str,
        phone: &str,
        category: Category,
    ) -> bool {
        let Some(existing) = self.contacts.iter_mut().find(|c| c.id() == id) else {
            debug!(contact_id = %id.as_str(), "Update target not found, ignoring");
            return false;
        };
        if let Err(e) = existing.replace(name, phone, category) {
            warn!(contact_id = %id.as_str(), "Rejected contact update: {e}");
            return false;
        }
        self.save().await;
        info!(contact_id = %id.as_str(), "Contact updated");
        true
    }

    /// Removes the contact with `id` and saves; `false` if absent.
    #[instrument(skip(self))]
    pub async fn delete(&mut self, id: &ContactId) -> bool {
        let before = self.contacts.len();
        self.contacts.retain(|c| c.id() != id);
        if self.contacts.len() == before {
            debug!(contact_id = %id.as_str(), "Delete target not found, ignoring");
            return false;
        }
        self.save().await;
        info!(contact_id = %id.as_str(), "Contact deleted");
        true
    }

    /// Lazy, restartable view of the contacts whose name or phone contains
    /// `query` case-insensitively, in stored order. An empty query yields
    /// the full collection.
    pub fn search(&self, query: &str) -> impl Iterator<Item = &Contact> + '_ {
        let query = query.to_string();
        self.contacts.iter().filter(move |c| c.matches(&query))
    }

    /// Derived ordered projection of the collection. Pure: stored order is
    /// untouched.
    pub fn sorted_view(&self, order: SortOrder) -> Vec<&Contact> {
        let mut view: Vec<&Contact> = self.contacts.iter().collect();
        view.sort_by(|a, b| order.compare(a, b));
        view
    }

    /// Filter-then-sort projection, the shape a list screen renders.
    pub fn view(&self, query: &str, order: SortOrder) -> Vec<&Contact> {
        let mut view: Vec<&Contact> = self.search(query).collect();
        view.sort_by(|a, b| order.compare(a, b));
        view
    }

    pub fn get(&self, id: &ContactId) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.id() == id)
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }
}

// --- Settings Store (Use Case) ---

/// Singleton preferences record, persisted under [`SETTINGS_KEY`]. The
/// dark-mode flag is deliberately not part of this record (see
/// [`ThemeStore`]); this store never writes that key.
pub struct SettingsStore {
    storage: Arc<dyn KeyValueStore>,
    settings: Settings,
}

impl SettingsStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            settings: Settings::default(),
        }
    }

    /// Hydrates the record. Absent or partial payloads fall back to the
    /// documented defaults per field; an unreadable payload falls back
    /// entirely.
    #[instrument(skip(self))]
    pub async fn load(&mut self) {
        self.settings = match self.storage.get(SETTINGS_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(settings) => settings,
                Err(e) => {
                    warn!("Stored settings are undecodable, using defaults: {e}");
                    Settings::default()
                }
            },
            Ok(None) => Settings::default(),
            Err(e) => {
                warn!("Failed to read settings, using defaults: {e}");
                Settings::default()
            }
        };
        debug!(settings = ?self.settings, "Settings hydrated");
    }

    async fn save(&self) {
        let raw = match serde_json::to_string(&self.settings) {
            Ok(raw) => raw,
            Err(e) => {
                error!("Failed to encode settings, skipping save: {e}");
                return;
            }
        };
        if let Err(e) = self.storage.set(SETTINGS_KEY, &raw).await {
            error!("Failed to persist settings, in-memory state retained: {e}");
        }
    }

    #[instrument(skip(self))]
    pub async fn set_notifications_enabled(&mut self, enabled: bool) {
        self.settings.notifications_enabled = enabled;
        self.save().await;
        info!(enabled, "Notification preference changed");
    }

    #[instrument(skip(self))]
    pub async fn set_order_by(&mut self, order: SortOrder) {
        self.settings.order_by = order;
        self.save().await;
        info!(?order, "Sort preference changed");
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn notifications_enabled(&self) -> bool {
        self.settings.notifications_enabled
    }

    pub fn order_by(&self) -> SortOrder {
        self.settings.order_by
    }

    /// Erases all durable storage under the application's namespace —
    /// contacts, settings, and the theme key alike — and resets the
    /// in-memory record to defaults. Irreversible; the presentation layer
    /// is responsible for confirming first. Unlike every other storage
    /// failure, a failure here propagates because the outcome is
    /// user-visible.
    #[instrument(skip(self))]
    pub async fn clear_all(&mut self) -> Result<(), ApplicationError> {
        self.storage.clear().await?;
        self.settings = Settings::default();
        info!("All persisted data cleared");
        Ok(())
    }
}

// --- Theme Store (Collaborator) ---

/// Owner of the dark-mode flag. Persisted under its own key
/// ([`DARK_MODE_KEY`]) so toggling the theme never rewrites the settings
/// record, and vice versa. Other components only read the flag.
pub struct ThemeStore {
    storage: Arc<dyn KeyValueStore>,
    dark_mode: bool,
}

impl ThemeStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            dark_mode: false,
        }
    }

    /// Hydrates the flag; defaults to light mode on any failure.
    #[instrument(skip(self))]
    pub async fn load(&mut self) {
        self.dark_mode = match self.storage.get(DARK_MODE_KEY).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("Stored theme flag is undecodable, using light mode: {e}");
                false
            }),
            Ok(None) => false,
            Err(e) => {
                warn!("Failed to read theme flag, using light mode: {e}");
                false
            }
        };
        debug!(dark_mode = self.dark_mode, "Theme hydrated");
    }

    async fn save(&self) {
        if let Err(e) = self
            .storage
            .set(DARK_MODE_KEY, if self.dark_mode { "true" } else { "false" })
            .await
        {
            error!("Failed to persist theme flag, in-memory state retained: {e}");
        }
    }

    /// Flips the flag, saves, and returns the new value.
    #[instrument(skip(self))]
    pub async fn toggle(&mut self) -> bool {
        self.dark_mode = !self.dark_mode;
        self.save().await;
        info!(dark_mode = self.dark_mode, "Theme toggled");
        self.dark_mode
    }

    #[instrument(skip(self))]
    pub async fn set_dark_mode(&mut self, dark_mode: bool) {
        self.dark_mode = dark_mode;
        self.save().await;
    }

    pub fn is_dark_mode(&self) -> bool {
        self.dark_mode
    }
}
