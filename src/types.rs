//! Core types for the AudioSwitch agent.

use serde::{Deserialize, Serialize};

/// A single audio output endpoint as reported by the controller.
///
/// `id` is the ordinal position from one enumeration call. It is only
/// meaningful within the snapshot it came from and must never be
/// cached across a later re-enumeration; `name` is the stable identity
/// used for persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: u32,
    pub name: String,
    /// True when this device is the currently active output.
    pub active: bool,
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.active {
            write!(f, "{} [{}] (active)", self.name, self.id)
        } else {
            write!(f, "{} [{}]", self.name, self.id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_marks_active_device() {
        let active = Device {
            id: 1,
            name: "Speakers".to_string(),
            active: true,
        };
        let idle = Device {
            id: 2,
            name: "Headset".to_string(),
            active: false,
        };

        assert_eq!(active.to_string(), "Speakers [1] (active)");
        assert_eq!(idle.to_string(), "Headset [2]");
    }
}
