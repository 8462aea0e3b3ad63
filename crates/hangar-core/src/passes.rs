//! Post-processing pass list
//!
//! The render pass is always first. Optional passes are appended at the end
//! when enabled and removed when disabled, so their relative order follows
//! the order in which they were switched on.

use serde::{Deserialize, Serialize};

/// One stage of the per-frame pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PassKind {
    /// Base scene render
    Render,
    Bloom,
    DepthOfField,
}

impl PassKind {
    /// Passes that own render targets sized to the viewport
    pub fn is_size_dependent(self) -> bool {
        matches!(self, PassKind::Bloom | PassKind::DepthOfField)
    }

    pub fn is_optional(self) -> bool {
        !matches!(self, PassKind::Render)
    }
}

/// Bloom parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BloomSettings {
    pub strength: f32,
    pub radius: f32,
    pub threshold: f32,
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self {
            strength: 4.5,
            radius: 0.4,
            threshold: 0.85,
        }
    }
}

/// Depth-of-field (bokeh) parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthOfFieldSettings {
    /// Focal distance in world units
    pub focus: f32,
    pub aperture: f32,
    pub max_blur: f32,
}

impl Default for DepthOfFieldSettings {
    fn default() -> Self {
        Self {
            focus: 1.0,
            aperture: 0.00025,
            max_blur: 0.01,
        }
    }
}

/// Ordered list of passes plus the size of every size-dependent target
#[derive(Debug, Clone)]
pub struct PassList {
    passes: Vec<PassKind>,
    target_size: (u32, u32),
}

impl PassList {
    /// A list holding only the base render pass
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            passes: vec![PassKind::Render],
            target_size: (width, height),
        }
    }

    pub fn contains(&self, pass: PassKind) -> bool {
        self.passes.contains(&pass)
    }

    /// Append an optional pass; returns false if it was already present
    pub fn add(&mut self, pass: PassKind) -> bool {
        if !pass.is_optional() || self.contains(pass) {
            return false;
        }
        self.passes.push(pass);
        true
    }

    /// Remove an optional pass; returns false if it was absent
    pub fn remove(&mut self, pass: PassKind) -> bool {
        if !pass.is_optional() {
            return false;
        }
        let before = self.passes.len();
        self.passes.retain(|p| *p != pass);
        self.passes.len() != before
    }

    /// Flip presence of an optional pass, returning the new presence
    pub fn toggle(&mut self, pass: PassKind) -> bool {
        if self.contains(pass) {
            self.remove(pass);
            false
        } else {
            self.add(pass);
            true
        }
    }

    pub fn passes(&self) -> &[PassKind] {
        &self.passes
    }

    /// Resize every size-dependent target, active or not
    pub fn set_size(&mut self, width: u32, height: u32) {
        self.target_size = (width, height);
    }

    /// Target size of a size-dependent pass
    pub fn target_size(&self, pass: PassKind) -> Option<(u32, u32)> {
        pass.is_size_dependent().then_some(self.target_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_pass_is_fixed() {
        let mut list = PassList::new(800, 600);
        assert!(!list.remove(PassKind::Render));
        assert!(!list.add(PassKind::Render));
        assert_eq!(list.passes(), &[PassKind::Render]);
    }

    #[test]
    fn test_optional_passes_append_in_order() {
        let mut list = PassList::new(800, 600);
        assert!(list.add(PassKind::Bloom));
        assert!(list.add(PassKind::DepthOfField));
        assert!(!list.add(PassKind::Bloom));
        assert_eq!(
            list.passes(),
            &[PassKind::Render, PassKind::Bloom, PassKind::DepthOfField]
        );

        assert!(!list.toggle(PassKind::Bloom));
        assert!(list.toggle(PassKind::Bloom));
        assert_eq!(
            list.passes(),
            &[PassKind::Render, PassKind::DepthOfField, PassKind::Bloom]
        );
    }

    #[test]
    fn test_size_tracks_inactive_passes() {
        let mut list = PassList::new(800, 600);
        list.set_size(1024, 768);
        assert_eq!(list.target_size(PassKind::DepthOfField), Some((1024, 768)));
        assert_eq!(list.target_size(PassKind::Render), None);
    }
}
