/// Something a manager can own and release.
///
/// Arrays and sub-managers both implement this so a manager's table can hold
/// either, and closing the manager closes them in the order they were
/// attached.
pub trait Resource: Send + Sync {
    fn uid(&self) -> &str;

    /// Release whatever the resource holds. Must be idempotent.
    fn close(&self);
}
