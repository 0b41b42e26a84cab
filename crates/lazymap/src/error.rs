use crate::loader::LoadError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Attribute not found: {0}")]
    AttributeNotFound(String),

    #[error("{0}")]
    Invocation(String),

    #[error("{0}")]
    Execution(String),

    #[error("Loader failed{}", .key.as_ref().map(|k| format!(" for key {k}")).unwrap_or_default())]
    Load {
        key: Option<String>,
        #[source]
        source: LoadError,
    },
}

impl Error {
    #[must_use]
    pub fn key_not_found(key: &(impl std::fmt::Debug + ?Sized)) -> Self {
        Self::KeyNotFound(format!("{key:?}"))
    }

    #[must_use]
    pub fn attribute_not_found(name: &(impl std::fmt::Debug + ?Sized)) -> Self {
        Self::AttributeNotFound(format!("{name:?}"))
    }

    pub(crate) fn load(key: Option<&(impl std::fmt::Debug + ?Sized)>, source: LoadError) -> Self {
        Self::Load {
            key: key.map(|k| format!("{k:?}")),
            source,
        }
    }

    /// Returns `true` if the error signals an absent key or attribute, as
    /// opposed to a caller or loader failure.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::KeyNotFound(_) | Self::AttributeNotFound(_))
    }
}

#[cfg(test)]
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        if std::mem::discriminant(self) != std::mem::discriminant(other) {
            return false;
        }

        // Good enough for testing purposes
        format!("{self:?}") == format!("{other:?}")
    }
}
