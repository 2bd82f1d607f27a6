use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error; // For domain-specific errors

// --- Domain Errors ---
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DomainError {
    #[error("Field '{field}' must not be empty")]
    EmptyField { field: &'static str },
}

// --- Contact ID ---

/// Opaque unique identifier of a contact. Assigned at creation time,
/// immutable afterwards, never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContactId(String);

impl ContactId {
    pub fn new(id: String) -> Self {
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Generates a fresh id from milliseconds since the Unix epoch.
    /// A monotonic bump keeps ids unique within the process even when
    /// several contacts are created inside the same millisecond.
    pub fn generate() -> Self {
        static LAST_ISSUED: AtomicU64 = AtomicU64::new(0);

        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or_default();

        let mut prev = LAST_ISSUED.load(AtomicOrdering::Relaxed);
        let token = loop {
            let next = now_ms.max(prev + 1);
            match LAST_ISSUED.compare_exchange_weak(
                prev,
                next,
                AtomicOrdering::Relaxed,
                AtomicOrdering::Relaxed,
            ) {
                Ok(_) => break next,
                Err(observed) => prev = observed,
            }
        };

        Self(token.to_string())
    }
}

impl From<String> for ContactId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

impl From<ContactId> for String {
    fn from(id: ContactId) -> Self {
        id.0
    }
}

// --- Category ---

/// Fixed classification tag for a contact. Variant order is the display
/// order used when grouping sorted views by category.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[serde(rename_all = "lowercase")] // Persisted as "work" / "personal" / "family"
pub enum Category {
    Work,
    #[default]
    Personal,
    Family,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Work => "Work",
            Category::Personal => "Personal",
            Category::Family => "Family",
        }
    }

    /// Accent color a renderer should use for this category's avatar.
    /// The enum is closed, so every category always has a color; an
    /// unrecognized value in stored data fails deserialization instead
    /// of rendering unstyled.
    pub fn color_hex(&self) -> &'static str {
        match self {
            Category::Work => "#007bff",
            Category::Personal => "#28a745",
            Category::Family => "#dc3545",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Category::Work => "briefcase",
            Category::Personal => "account",
            Category::Family => "home-heart",
        }
    }
}

// --- Contact ---

/// One address-book entry. Construction and field replacement go through
/// validation, so a persisted contact always carries a non-empty name and
/// phone.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    id: ContactId,
    name: String,
    phone: String,
    #[serde(default)]
    category: Category,
}

impl Contact {
    /// Creates a contact, trimming surrounding whitespace from name and
    /// phone. Rejects inputs that are empty after trimming.
    pub fn new(
        id: ContactId,
        name: &str,
        phone: &str,
        category: Category,
    ) -> Result<Self, DomainError> {
        let name = validated("name", name)?;
        let phone = validated("phone", phone)?;
        Ok(Self {
            id,
            name,
            phone,
            category,
        })
    }

    pub fn id(&self) -> &ContactId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Replaces the mutable fields in place, keeping the id. Validation
    /// mirrors `new`: the replacement is rejected wholesale if name or
    /// phone is empty after trimming.
    pub fn replace(
        &mut self,
        name: &str,
        phone: &str,
        category: Category,
    ) -> Result<(), DomainError> {
        let name = validated("name", name)?;
        let phone = validated("phone", phone)?;
        self.name = name;
        self.phone = phone;
        self.category = category;
        Ok(())
    }

    /// Case-insensitive substring match over name and phone. An empty
    /// query matches every contact.
    pub fn matches(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query) || self.phone.to_lowercase().contains(&query)
    }
}

fn validated(field: &'static str, value: &str) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::EmptyField { field });
    }
    Ok(trimmed.to_string())
}

// --- Sort order ---

/// User preference for ordering the contact list.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Name,
    Category,
}

impl SortOrder {
    /// Comparator backing sorted views. By name: case-insensitive
    /// lexicographic. By category: category rank first, then name within
    /// each group.
    pub fn compare(&self, a: &Contact, b: &Contact) -> Ordering {
        let by_name = |a: &Contact, b: &Contact| a.name.to_lowercase().cmp(&b.name.to_lowercase());
        match self {
            SortOrder::Name => by_name(a, b),
            SortOrder::Category => a.category.cmp(&b.category).then_with(|| by_name(a, b)),
        }
    }
}

// --- Settings ---

/// Singleton user-preferences record. Every field defaults independently,
/// so a partial persisted payload still loads. The dark-mode flag is not
/// part of this record: it belongs to the theme collaborator and is
/// persisted under its own key.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")] // Stored shape: {notificationsEnabled, orderBy}
pub struct Settings {
    #[serde(default = "default_notifications_enabled")]
    pub notifications_enabled: bool,
    #[serde(default)]
    pub order_by: SortOrder,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            notifications_enabled: true,
            order_by: SortOrder::Name,
        }
    }
}

fn default_notifications_enabled() -> bool {
    true
}
