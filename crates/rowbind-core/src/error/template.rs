/// Render-time error: malformed token, unknown tag, bad expression text.
///
/// Always fatal and never retried.
#[derive(Debug)]
pub(super) struct TemplateError {
    pub(super) message: String,
}

impl std::error::Error for TemplateError {}

impl core::fmt::Display for TemplateError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "malformed template: {}", self.message)
    }
}
