//! Queue item definition and related types.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Identifier of a queue item.
///
/// Assigned sequentially from 0 by the backend and never reissued until the
/// queue is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(pub u64);

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An item with its payload and lease state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item<T> {
    /// Unique item identifier.
    pub id: ItemId,
    /// The producer's payload. Never inspected by the queue.
    pub payload: T,
    /// Timestamp when the item was created (Unix timestamp in seconds).
    pub created_at: i64,
    /// Lease expiry (Unix timestamp in seconds), `None` while unleased.
    pub lease_expiry: Option<i64>,
}

impl<T> Item<T> {
    /// Create a new, unleased item.
    pub fn new(id: ItemId, payload: T, created_at: i64) -> Self {
        Self {
            id,
            payload,
            created_at,
            lease_expiry: None,
        }
    }

    /// Whether the item currently carries a lease.
    ///
    /// An expired lease still counts: only a release or a reclaim makes the
    /// item claimable again.
    pub fn is_leased(&self) -> bool {
        self.lease_expiry.is_some()
    }

    /// Whether the item is leased and its lease ended before `now`.
    pub fn is_lease_expired(&self, now: i64) -> bool {
        matches!(self.lease_expiry, Some(expiry) if now > expiry)
    }

    /// Replace the payload, keeping id and lease state.
    pub fn map_payload<U>(self, f: impl FnOnce(T) -> U) -> Item<U> {
        Item {
            id: self.id,
            payload: f(self.payload),
            created_at: self.created_at,
            lease_expiry: self.lease_expiry,
        }
    }
}

impl Item<String> {
    /// Decode a stored item whose payload is JSON text.
    pub fn decode<T: DeserializeOwned>(self) -> Result<Item<T>, serde_json::Error> {
        let payload = serde_json::from_str(&self.payload)?;
        Ok(self.map_payload(|_| payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct TestPayload {
        message: String,
    }

    #[test]
    fn test_item_creation_is_unleased() {
        let item = Item::new(ItemId(0), "hello".to_string(), 1_700_000_000);
        assert_eq!(item.id, ItemId(0));
        assert_eq!(item.created_at, 1_700_000_000);
        assert!(!item.is_leased());
        assert!(!item.is_lease_expired(i64::MAX));
    }

    #[test]
    fn test_expired_lease_is_still_leased() {
        let mut item = Item::new(ItemId(1), (), 0);
        item.lease_expiry = Some(100);

        assert!(item.is_leased());
        assert!(!item.is_lease_expired(99));
        assert!(!item.is_lease_expired(100));
        assert!(item.is_lease_expired(101));
    }

    #[test]
    fn test_item_id_display() {
        assert_eq!(format!("{}", ItemId(42)), "42");
    }

    #[test]
    fn test_item_id_ordering() {
        assert!(ItemId(1) < ItemId(2));
        assert_eq!(ItemId(7).max(ItemId(3)), ItemId(7));
    }

    #[test]
    fn test_decode_payload() {
        let mut raw = Item::new(ItemId(3), r#"{"message":"test"}"#.to_string(), 10);
        raw.lease_expiry = Some(3610);

        let item: Item<TestPayload> = raw.decode().unwrap();
        assert_eq!(item.id, ItemId(3));
        assert_eq!(item.payload.message, "test");
        assert_eq!(item.created_at, 10);
        assert_eq!(item.lease_expiry, Some(3610));
    }

    #[test]
    fn test_decode_wrong_shape_fails() {
        let raw = Item::new(ItemId(0), "[1,2,3]".to_string(), 0);
        assert!(raw.decode::<TestPayload>().is_err());
    }

    #[test]
    fn test_item_serialization() {
        let item = Item::new(ItemId(5), vec![0u32, 1, 2], 99);
        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"lease_expiry\":null"));
        let back: Item<Vec<u32>> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, item);
    }
}
