//! Toggle registry: UI trigger ids mapped to scene mutations
//!
//! Every toggle reads the current presence (or flag), negates it and applies
//! the matching mutation. Membership in the scene graph or pass list is the
//! state; only auto-rotate keeps a scalar flag, on the orbit controls.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::lights::LightKey;
use crate::model::ModelRole;
use crate::passes::PassKind;
use crate::viewer::Viewer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToggleId {
    LightA,
    LightB,
    LightC,
    DepthOfField,
    Bloom,
    AutoRotate,
    SecondaryModel,
}

impl ToggleId {
    pub const ALL: [ToggleId; 7] = [
        ToggleId::LightA,
        ToggleId::LightB,
        ToggleId::LightC,
        ToggleId::DepthOfField,
        ToggleId::Bloom,
        ToggleId::AutoRotate,
        ToggleId::SecondaryModel,
    ];
}

impl fmt::Display for ToggleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ToggleId::LightA => "light_a",
            ToggleId::LightB => "light_b",
            ToggleId::LightC => "light_c",
            ToggleId::DepthOfField => "depth_of_field",
            ToggleId::Bloom => "bloom",
            ToggleId::AutoRotate => "auto_rotate",
            ToggleId::SecondaryModel => "secondary_model",
        };
        f.write_str(name)
    }
}

/// Flips one toggle and returns its new state
pub type ToggleEffect = fn(&mut Viewer) -> bool;

/// Reads the current state of one toggle
pub type ToggleReader = fn(&Viewer) -> bool;

/// One row of the registry
#[derive(Clone, Copy)]
pub struct ToggleBinding {
    pub id: ToggleId,
    /// Id of the UI element that triggers this toggle
    pub trigger_id: &'static str,
    pub label: &'static str,
    pub(crate) effect: ToggleEffect,
    pub(crate) read: ToggleReader,
}

impl fmt::Debug for ToggleBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToggleBinding")
            .field("id", &self.id)
            .field("trigger_id", &self.trigger_id)
            .field("label", &self.label)
            .finish()
    }
}

/// Result of applying a toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub id: ToggleId,
    /// State after the toggle; a model counts as active from the moment its
    /// load is requested
    pub active: bool,
}

const STANDARD: [ToggleBinding; 7] = [
    ToggleBinding {
        id: ToggleId::LightA,
        trigger_id: "toggleSpotlight1",
        label: "Spotlight 1",
        effect: |v| v.toggle_light(LightKey::A),
        read: |v| v.is_light_present(LightKey::A),
    },
    ToggleBinding {
        id: ToggleId::LightB,
        trigger_id: "toggleSpotlight2",
        label: "Spotlight 2",
        effect: |v| v.toggle_light(LightKey::B),
        read: |v| v.is_light_present(LightKey::B),
    },
    ToggleBinding {
        id: ToggleId::LightC,
        trigger_id: "toggleSpotlight3",
        label: "Spotlight 3",
        effect: |v| v.toggle_light(LightKey::C),
        read: |v| v.is_light_present(LightKey::C),
    },
    ToggleBinding {
        id: ToggleId::DepthOfField,
        trigger_id: "toggleSpotlight4",
        label: "Depth of field",
        effect: |v| v.toggle_pass(PassKind::DepthOfField),
        read: |v| v.passes().contains(PassKind::DepthOfField),
    },
    ToggleBinding {
        id: ToggleId::Bloom,
        trigger_id: "toggleBloom",
        label: "Bloom",
        effect: |v| v.toggle_pass(PassKind::Bloom),
        read: |v| v.passes().contains(PassKind::Bloom),
    },
    ToggleBinding {
        id: ToggleId::AutoRotate,
        trigger_id: "toggleAutoRotate",
        label: "Auto rotate",
        effect: |v| v.toggle_auto_rotate(),
        read: |v| v.controls().auto_rotate(),
    },
    ToggleBinding {
        id: ToggleId::SecondaryModel,
        trigger_id: "spawnTownhallButton",
        label: "Town hall",
        effect: |v| v.toggle_model(ModelRole::Secondary),
        read: |v| v.is_model_requested(ModelRole::Secondary),
    },
];

/// Declarative table of toggles, built once at startup
#[derive(Debug, Clone)]
pub struct ToggleRegistry {
    bindings: Vec<ToggleBinding>,
}

impl ToggleRegistry {
    /// The viewer's fixed set of toggles
    pub fn standard() -> Self {
        Self {
            bindings: STANDARD.to_vec(),
        }
    }

    pub fn bindings(&self) -> &[ToggleBinding] {
        &self.bindings
    }

    pub fn get(&self, id: ToggleId) -> Option<&ToggleBinding> {
        self.bindings.iter().find(|b| b.id == id)
    }

    pub fn by_trigger(&self, trigger_id: &str) -> Option<&ToggleBinding> {
        self.bindings.iter().find(|b| b.trigger_id == trigger_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_toggle_bound_exactly_once() {
        let registry = ToggleRegistry::standard();
        for id in ToggleId::ALL {
            assert_eq!(registry.bindings().iter().filter(|b| b.id == id).count(), 1);
        }
        let triggers: HashSet<_> = registry.bindings().iter().map(|b| b.trigger_id).collect();
        assert_eq!(triggers.len(), registry.bindings().len());
    }

    #[test]
    fn test_lookup_by_trigger() {
        let registry = ToggleRegistry::standard();
        assert_eq!(
            registry.by_trigger("spawnTownhallButton").map(|b| b.id),
            Some(ToggleId::SecondaryModel)
        );
        assert_eq!(
            registry.by_trigger("toggleSpotlight4").map(|b| b.id),
            Some(ToggleId::DepthOfField)
        );
        assert!(registry.by_trigger("settingsButton").is_none());
    }
}
