use super::document::{Document, ElementId, HIDDEN_CLASS};

pub const MAIN_MENU_TITLE: &str = "Actions";
pub const PLANT_MENU_TITLE: &str = "Choose a Seed";

/// Which of the two panels in the actions block is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MenuState {
    #[default]
    Main,
    Plant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEvent {
    PlantTrigger,
    BackTrigger,
}

impl MenuState {
    /// Each trigger leads to the same state no matter where it fires from
    pub fn transition(self, event: MenuEvent) -> Self {
        match event {
            MenuEvent::PlantTrigger => MenuState::Plant,
            MenuEvent::BackTrigger => MenuState::Main,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            MenuState::Main => MAIN_MENU_TITLE,
            MenuState::Plant => PLANT_MENU_TITLE,
        }
    }
}

/// Elements touched when the menu state changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuElements {
    pub main_menu: ElementId,
    pub plant_menu: ElementId,
    pub back_button: ElementId,
    pub title: ElementId,
}

fn set_hidden(doc: &mut Document, id: ElementId, hidden: bool) {
    if hidden {
        doc.add_class(id, HIDDEN_CLASS);
    } else {
        doc.remove_class(id, HIDDEN_CLASS);
    }
}

/// Push `state` into the document: panel visibility, back button, title
pub fn apply(doc: &mut Document, elements: &MenuElements, state: MenuState) {
    let plant_active = state == MenuState::Plant;
    set_hidden(doc, elements.main_menu, plant_active);
    set_hidden(doc, elements.plant_menu, !plant_active);
    set_hidden(doc, elements.back_button, !plant_active);
    doc.set_text(elements.title, state.title());
}
