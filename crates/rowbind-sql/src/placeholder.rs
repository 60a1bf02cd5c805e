use rowbind_core::{Error, Result, ScalarType};

/// Binding direction of a placeholder, for callable statements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParamMode {
    #[default]
    In,
    Out,
    InOut,
}

/// One bound-parameter occurrence in the rendered SQL, in order.
///
/// Carries what later scalar binding needs: the property to resolve, the
/// declared type, and the binding mode.
#[derive(Debug, Clone, PartialEq)]
pub struct Placeholder {
    pub property: String,
    pub ty: Option<ScalarType>,
    pub mode: ParamMode,
}

impl Placeholder {
    /// Parses a `#{…}` token body: `property[,type=…][,mode=…]`.
    pub(crate) fn parse(body: &str) -> Result<Placeholder> {
        let mut parts = body.split(',');
        let property = parts.next().unwrap_or("").trim().to_string();
        if property.is_empty() {
            return Err(Error::template("empty `#{}` placeholder"));
        }

        let mut placeholder = Placeholder {
            property,
            ty: None,
            mode: ParamMode::In,
        };
        for part in parts {
            let (key, value) = part
                .split_once('=')
                .ok_or_else(|| Error::template(format!("malformed placeholder option `{part}`")))?;
            match key.trim() {
                "type" => placeholder.ty = Some(ScalarType::parse(value.trim())?),
                "mode" => {
                    placeholder.mode = match value.trim() {
                        "in" => ParamMode::In,
                        "out" => ParamMode::Out,
                        "inout" => ParamMode::InOut,
                        other => {
                            return Err(Error::template(format!(
                                "unknown placeholder mode `{other}`"
                            )))
                        }
                    }
                }
                other => {
                    return Err(Error::template(format!(
                        "unknown placeholder option `{other}`"
                    )))
                }
            }
        }
        Ok(placeholder)
    }
}
