use std::fmt::{self, Display};

/// Returned when an `RsyncSource` spec can't be turned into a template. This is always returned
/// before any of the child resources get built, so callers never see a partial set of children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidSpec {
    /// path of the offending field, for example `spec.volume.name`
    pub field: &'static str,
    pub reason: String,
}

impl InvalidSpec {
    pub fn new(field: &'static str, reason: impl Into<String>) -> InvalidSpec {
        InvalidSpec {
            field,
            reason: reason.into(),
        }
    }
}

impl Display for InvalidSpec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Invalid spec: {}: {}", self.field, self.reason)
    }
}

impl std::error::Error for InvalidSpec {}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display_includes_field_and_reason() {
        let err = InvalidSpec::new("spec.image", "must not be empty");
        assert_eq!("Invalid spec: spec.image: must not be empty", err.to_string());
    }
}
