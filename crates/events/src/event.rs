use chrono::{DateTime, Utc};

/// A fact recorded by an item or transaction aggregate.
///
/// Events are never edited once accepted. Names are dotted and scoped by
/// aggregate, e.g. `inventory.item.stock_adjusted` or
/// `workflow.transaction.approved`.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    fn event_type(&self) -> &'static str;

    /// Payload schema version. Bump when the serialized shape changes.
    fn version(&self) -> u32 {
        1
    }

    /// Business time supplied by the caller, not the wall clock at publish.
    fn occurred_at(&self) -> DateTime<Utc>;
}
