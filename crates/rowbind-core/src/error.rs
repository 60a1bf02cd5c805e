mod adhoc;
mod incomplete;
mod mapping;
mod schema_build;
mod template;
mod type_conversion;

use adhoc::AdhocError;
use incomplete::IncompleteError;
use mapping::MappingError;
use schema_build::SchemaBuildError;
use std::sync::Arc;
use template::TemplateError;
use type_conversion::TypeConversionError;

use crate::value::Value;

/// Returns early with a mapping-stage error built from the format arguments.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::Error::from_args(format_args!($($arg)*)))
    };
}

/// Creates an ad-hoc error from the format arguments.
#[macro_export]
macro_rules! err {
    ($($arg:tt)*) => {
        $crate::Error::from_args(format_args!($($arg)*))
    };
}

/// An error that can occur in rowbind.
#[derive(Clone)]
pub struct Error {
    inner: Option<Arc<ErrorInner>>,
}

#[derive(Debug)]
struct ErrorInner {
    kind: ErrorKind,
    cause: Option<Error>,
}

#[derive(Debug)]
enum ErrorKind {
    Anyhow(anyhow::Error),
    Adhoc(AdhocError),
    Template(TemplateError),
    SchemaBuild(SchemaBuildError),
    Incomplete(IncompleteError),
    Mapping(MappingError),
    TypeConversion(TypeConversionError),
    Unknown,
}

impl Error {
    /// Render-time failure: unknown tag, malformed expression, bad token.
    pub fn template(message: impl Into<String>) -> Error {
        Error::from(ErrorKind::Template(TemplateError {
            message: message.into(),
        }))
    }

    /// Configuration-time failure while assembling a result map.
    pub fn schema_build(message: impl Into<String>) -> Error {
        Error::from(ErrorKind::SchemaBuild(SchemaBuildError {
            message: message.into(),
        }))
    }

    /// A result map references a schema id that is not registered yet.
    ///
    /// Recoverable: the registry retries deferred builds as more definitions
    /// arrive. It only turns fatal if the reference never resolves.
    pub fn incomplete(referrer: impl Into<String>, missing: impl Into<String>) -> Error {
        Error::from(ErrorKind::Incomplete(IncompleteError {
            referrer: referrer.into(),
            missing: missing.into(),
        }))
    }

    /// Statement-scoped materialization failure. Aborts the whole result.
    pub fn mapping(message: impl Into<String>) -> Error {
        Error::from(ErrorKind::Mapping(MappingError {
            message: message.into(),
        }))
    }

    /// A value could not be converted to the requested scalar type.
    pub fn type_conversion(value: Value, to_type: &'static str) -> Error {
        Error::from(ErrorKind::TypeConversion(TypeConversionError {
            value,
            to_type,
        }))
    }

    #[doc(hidden)]
    pub fn from_args(args: core::fmt::Arguments<'_>) -> Error {
        Error::from(ErrorKind::Adhoc(AdhocError {
            message: args.to_string(),
        }))
    }

    pub fn is_template(&self) -> bool {
        matches!(self.kind(), ErrorKind::Template(_))
    }

    pub fn is_schema_build(&self) -> bool {
        matches!(self.kind(), ErrorKind::SchemaBuild(_))
    }

    pub fn is_incomplete(&self) -> bool {
        matches!(self.kind(), ErrorKind::Incomplete(_))
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self.kind(), ErrorKind::Mapping(_))
    }

    pub fn is_type_conversion(&self) -> bool {
        matches!(self.kind(), ErrorKind::TypeConversion(_))
    }

    /// Adds context to this error.
    ///
    /// Context is displayed outermost-first: the most recently added context
    /// leads, ending with the root cause.
    pub fn context(self, consequent: Error) -> Error {
        let mut err = consequent;
        if err.inner.is_none() {
            err = Error::from(ErrorKind::Unknown);
        }
        let inner = err.inner.as_mut().unwrap();
        assert!(
            inner.cause.is_none(),
            "consequent error must not already have a cause"
        );
        Arc::get_mut(inner).unwrap().cause = Some(self);
        err
    }

    fn chain(&self) -> impl Iterator<Item = &Error> {
        let mut err = self;
        core::iter::once(err).chain(core::iter::from_fn(move || {
            err = err.inner.as_ref().and_then(|inner| inner.cause.as_ref())?;
            Some(err)
        }))
    }

    fn kind(&self) -> &ErrorKind {
        self.inner
            .as_ref()
            .map(|inner| &inner.kind)
            .unwrap_or(&ErrorKind::Unknown)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self.kind() {
            ErrorKind::Anyhow(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let mut it = self.chain().peekable();
        while let Some(err) = it.next() {
            core::fmt::Display::fmt(err.kind(), f)?;
            if it.peek().is_some() {
                f.write_str(": ")?;
            }
        }
        Ok(())
    }
}

impl core::fmt::Debug for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        if !f.alternate() {
            core::fmt::Display::fmt(self, f)
        } else {
            let Some(ref inner) = self.inner else {
                return f.debug_struct("Error").field("kind", &"None").finish();
            };
            f.debug_struct("Error")
                .field("kind", &inner.kind)
                .field("cause", &inner.cause)
                .finish()
        }
    }
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        use self::ErrorKind::*;

        match self {
            Anyhow(err) => core::fmt::Display::fmt(err, f),
            Adhoc(err) => core::fmt::Display::fmt(err, f),
            Template(err) => core::fmt::Display::fmt(err, f),
            SchemaBuild(err) => core::fmt::Display::fmt(err, f),
            Incomplete(err) => core::fmt::Display::fmt(err, f),
            Mapping(err) => core::fmt::Display::fmt(err, f),
            TypeConversion(err) => core::fmt::Display::fmt(err, f),
            Unknown => f.write_str("unknown rowbind error"),
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error {
            inner: Some(Arc::new(ErrorInner { kind, cause: None })),
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Error {
        Error::from(ErrorKind::Anyhow(err))
    }
}

impl From<std::num::ParseIntError> for Error {
    fn from(err: std::num::ParseIntError) -> Error {
        Error::from(anyhow::Error::from(err))
    }
}

impl From<std::num::ParseFloatError> for Error {
    fn from(err: std::num::ParseFloatError) -> Error {
        Error::from(anyhow::Error::from(err))
    }
}
