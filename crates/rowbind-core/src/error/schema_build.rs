/// Configuration-time error while assembling a result map: no matching
/// constructor, conflicting foreign result-set definitions, bad references.
#[derive(Debug)]
pub(super) struct SchemaBuildError {
    pub(super) message: String,
}

impl std::error::Error for SchemaBuildError {}

impl core::fmt::Display for SchemaBuildError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "result map build failed: {}", self.message)
    }
}
