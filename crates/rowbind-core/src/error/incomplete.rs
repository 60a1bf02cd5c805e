/// A result map references another result map that has not been registered.
///
/// Raised while definitions are still being loaded. The registry keeps the
/// referrer parked and retries once more definitions arrive, so this kind is
/// the one recoverable error in the taxonomy.
#[derive(Debug)]
pub(super) struct IncompleteError {
    pub(super) referrer: String,
    pub(super) missing: String,
}

impl std::error::Error for IncompleteError {}

impl core::fmt::Display for IncompleteError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "result map `{}` references unregistered result map `{}`",
            self.referrer, self.missing
        )
    }
}
