use uuid::Uuid;

/// Returns a fresh random UUID for identifiers.
pub fn new_uuid() -> Uuid {
    Uuid::new_v4()
}
