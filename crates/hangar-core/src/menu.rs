//! Settings dropdown open/close state

/// Element id of the settings trigger
pub const SETTINGS_TRIGGER_ID: &str = "settingsButton";
/// Element id of the dropdown panel
pub const DROPDOWN_ID: &str = "dropdownMenu";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SettingsMenu {
    open: bool,
}

impl SettingsMenu {
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Settings trigger clicked
    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    /// Any click that did not land on the settings trigger
    pub fn click_outside(&mut self) {
        self.open = false;
    }

    /// Route a click by the id of the element it landed on
    pub fn click(&mut self, element_id: Option<&str>) {
        if element_id == Some(SETTINGS_TRIGGER_ID) {
            self.toggle();
        } else {
            self.click_outside();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_toggles_and_outside_closes() {
        let mut menu = SettingsMenu::default();
        assert!(!menu.is_open());

        menu.click(Some(SETTINGS_TRIGGER_ID));
        assert!(menu.is_open());

        menu.click(Some("toggleBloom"));
        assert!(!menu.is_open());

        menu.click(Some(SETTINGS_TRIGGER_ID));
        menu.click(Some(SETTINGS_TRIGGER_ID));
        assert!(!menu.is_open());

        menu.click_outside();
        assert!(!menu.is_open());
    }
}
