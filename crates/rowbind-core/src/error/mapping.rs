/// Statement-scoped materialization failure.
///
/// Raised once per statement and aborts the whole result; callers never see a
/// partially populated graph.
#[derive(Debug)]
pub(super) struct MappingError {
    pub(super) message: String,
}

impl std::error::Error for MappingError {}

impl core::fmt::Display for MappingError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "result mapping failed: {}", self.message)
    }
}
