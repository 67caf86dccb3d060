use serde::{Deserialize, Serialize};

/// A per-user decision on one coarse module key.
///
/// `Inherit` is explicit rather than "key absent", so an unloaded override
/// set is never mistaken for one that inherits the ceiling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "enabled")]
pub enum Override {
    #[default]
    Inherit,
    Set(bool),
}

impl Override {
    /// The stored value, if this is an explicit assignment.
    pub fn value(&self) -> Option<bool> {
        match self {
            Self::Inherit => None,
            Self::Set(v) => Some(*v),
        }
    }

    /// Applies this override to an inherited value.
    pub fn apply(&self, inherited: bool) -> bool {
        self.value().unwrap_or(inherited)
    }
}

impl From<bool> for Override {
    fn from(enabled: bool) -> Self {
        Self::Set(enabled)
    }
}
