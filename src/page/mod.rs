//! The farm page: element lookup, initialization and click dispatch
//!
//! [`initialize`] takes the element handles explicitly and refuses to start
//! when one is missing, instead of failing later on the first click.

pub mod document;
pub mod hearts;
pub mod menu;

use std::collections::BTreeMap;
use thiserror::Error;

use document::{Document, ElementId, SelectorError};
use hearts::HeartVariant;
use menu::{MenuElements, MenuEvent, MenuState};

pub const PLANT_TRIGGER_SELECTOR: &str = ".action.primary";
pub const BACK_TRIGGER_SELECTOR: &str = ".back-button";
pub const ACTIONS_BLOCK_SELECTOR: &str = ".actions-block";
pub const MAIN_MENU_SELECTOR: &str = ".main-menu";
pub const PLANT_MENU_SELECTOR: &str = ".plant-menu";
pub const TITLE_SELECTOR: &str = ".actions-title";
pub const HEARTS_CONTAINER_ID: &str = "hearts-container";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InitError {
    #[error("required element '{element}' is missing from the page")]
    Missing { element: &'static str },
    #[error("element '{element}' appears {count} times, expected exactly once")]
    Duplicate { element: &'static str, count: usize },
    #[error("element '{element}' is not attached to the page")]
    Detached { element: &'static str },
    #[error("'{first}' and '{second}' are the same element")]
    Aliased {
        first: &'static str,
        second: &'static str,
    },
    #[error("invalid selector for '{element}': {source}")]
    Selector {
        element: &'static str,
        #[source]
        source: SelectorError,
    },
}

/// Everything dispatched by a click on a bound element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageAction {
    ShowPlantMenu,
    ShowMainMenu,
    PlantSeed(String),
    Harvest,
    Sleep,
}

/// Handles for every element the page needs. A `None` means the element was
/// not found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiHandles {
    pub plant_trigger: Option<ElementId>,
    pub back_trigger: Option<ElementId>,
    pub actions_block: Option<ElementId>,
    pub main_menu: Option<ElementId>,
    pub plant_menu: Option<ElementId>,
    pub title: Option<ElementId>,
    pub hearts_container: Option<ElementId>,
}

fn locate_one(
    doc: &Document,
    element: &'static str,
    selector: &str,
) -> Result<Option<ElementId>, InitError> {
    let found = doc
        .query_selector_all(selector)
        .map_err(|source| InitError::Selector { element, source })?;
    match found.as_slice() {
        [] => Ok(None),
        [id] => Ok(Some(*id)),
        many => Err(InitError::Duplicate {
            element,
            count: many.len(),
        }),
    }
}

impl UiHandles {
    /// Look every element up by its stable selector
    pub fn locate(doc: &Document) -> Result<Self, InitError> {
        Ok(Self {
            plant_trigger: locate_one(doc, "plant trigger", PLANT_TRIGGER_SELECTOR)?,
            back_trigger: locate_one(doc, "back trigger", BACK_TRIGGER_SELECTOR)?,
            actions_block: locate_one(doc, "actions block", ACTIONS_BLOCK_SELECTOR)?,
            main_menu: locate_one(doc, "main menu", MAIN_MENU_SELECTOR)?,
            plant_menu: locate_one(doc, "plant menu", PLANT_MENU_SELECTOR)?,
            title: locate_one(doc, "title", TITLE_SELECTOR)?,
            hearts_container: doc.get_element_by_id(HEARTS_CONTAINER_ID),
        })
    }
}

/// Resolved handles, all known to be present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageElements {
    pub plant_trigger: ElementId,
    pub back_trigger: ElementId,
    pub actions_block: ElementId,
    pub main_menu: ElementId,
    pub plant_menu: ElementId,
    pub title: ElementId,
    pub hearts_container: ElementId,
}

impl PageElements {
    fn roles(&self) -> [(&'static str, ElementId); 7] {
        [
            ("plant trigger", self.plant_trigger),
            ("back trigger", self.back_trigger),
            ("actions block", self.actions_block),
            ("main menu", self.main_menu),
            ("plant menu", self.plant_menu),
            ("title", self.title),
            ("hearts container", self.hearts_container),
        ]
    }

    /// Every role needs its own element
    fn check_distinct(&self) -> Result<(), InitError> {
        let roles = self.roles();
        for (i, &(first, id)) in roles.iter().enumerate() {
            if let Some(&(second, _)) = roles[i + 1..].iter().find(|(_, other)| *other == id) {
                return Err(InitError::Aliased { first, second });
            }
        }
        Ok(())
    }

    fn menu(&self) -> MenuElements {
        MenuElements {
            main_menu: self.main_menu,
            plant_menu: self.plant_menu,
            back_button: self.back_trigger,
            title: self.title,
        }
    }
}

fn require(
    doc: &Document,
    element: &'static str,
    handle: Option<ElementId>,
) -> Result<ElementId, InitError> {
    let id = handle.ok_or(InitError::Missing { element })?;
    if !doc.is_attached(id) {
        return Err(InitError::Detached { element });
    }
    Ok(id)
}

pub struct Page {
    doc: Document,
    elements: PageElements,
    menu: MenuState,
    listeners: BTreeMap<ElementId, PageAction>,
    asset_dir: String,
}

/// Validate the handles, bind the triggers and show the main menu.
pub fn initialize(
    doc: Document,
    handles: UiHandles,
    asset_dir: &str,
) -> Result<Page, InitError> {
    let elements = PageElements {
        plant_trigger: require(&doc, "plant trigger", handles.plant_trigger)?,
        back_trigger: require(&doc, "back trigger", handles.back_trigger)?,
        actions_block: require(&doc, "actions block", handles.actions_block)?,
        main_menu: require(&doc, "main menu", handles.main_menu)?,
        plant_menu: require(&doc, "plant menu", handles.plant_menu)?,
        title: require(&doc, "title", handles.title)?,
        hearts_container: require(&doc, "hearts container", handles.hearts_container)?,
    };
    elements.check_distinct()?;

    let mut listeners = BTreeMap::new();
    listeners.insert(elements.plant_trigger, PageAction::ShowPlantMenu);
    listeners.insert(elements.back_trigger, PageAction::ShowMainMenu);

    let seeds = doc
        .query_selector_all(".seed")
        .map_err(|source| InitError::Selector { element: "seed", source })?;
    // Only controls inside the actions block are bound
    let block = elements.actions_block;
    for id in seeds.into_iter().filter(|id| doc.is_descendant_of(*id, block)) {
        if let Some(name) = doc.attribute(id, "data-seed") {
            listeners.insert(id, PageAction::PlantSeed(name.to_string()));
        }
    }

    let actions = doc
        .query_selector_all(".action")
        .map_err(|source| InitError::Selector { element: "action", source })?;
    for id in actions.into_iter().filter(|id| doc.is_descendant_of(*id, block)) {
        match doc.attribute(id, "data-action") {
            Some("sleep") => {
                listeners.insert(id, PageAction::Sleep);
            }
            Some("harvest") => {
                listeners.insert(id, PageAction::Harvest);
            }
            _ => {}
        }
    }

    let mut page = Page {
        doc,
        elements,
        menu: MenuState::Main,
        listeners,
        asset_dir: asset_dir.to_string(),
    };
    page.apply_menu();

    tracing::info!("Page initialized with {} bound elements", page.listeners.len());
    Ok(page)
}

impl Page {
    /// Build the default farm page and initialize it
    pub fn farm(seeds: &[crate::farm::Seed], asset_dir: &str) -> Result<Self, InitError> {
        let doc = Document::farm_page(seeds);
        let handles = UiHandles::locate(&doc)?;
        initialize(doc, handles, asset_dir)
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn elements(&self) -> &PageElements {
        &self.elements
    }

    pub fn menu_state(&self) -> MenuState {
        self.menu
    }

    fn apply_menu(&mut self) {
        menu::apply(&mut self.doc, &self.elements.menu(), self.menu);
    }

    fn handle_menu_event(&mut self, event: MenuEvent) {
        let next = self.menu.transition(event);
        if next != self.menu {
            tracing::debug!("Menu {:?} -> {:?}", self.menu, next);
        }
        self.menu = next;
        self.apply_menu();
    }

    pub fn show_plant_menu(&mut self) {
        self.handle_menu_event(MenuEvent::PlantTrigger);
    }

    pub fn show_main_menu(&mut self) {
        self.handle_menu_event(MenuEvent::BackTrigger);
    }

    pub fn render_hearts(&mut self, value: f64) {
        hearts::render_hearts(
            &mut self.doc,
            self.elements.hearts_container,
            value,
            &self.asset_dir,
        );
    }

    /// Hearts as currently shown in the document
    pub fn hearts(&self) -> Vec<HeartVariant> {
        hearts::read_hearts(&self.doc, self.elements.hearts_container)
    }

    /// Activate an element. Unbound or hidden elements ignore the click.
    pub fn click(&mut self, id: ElementId) -> Option<PageAction> {
        if !self.doc.is_rendered(id) {
            return None;
        }
        let action = self.listeners.get(&id)?.clone();
        tracing::debug!("Click on {:?} -> {:?}", id, action);

        match action {
            PageAction::ShowPlantMenu => self.show_plant_menu(),
            PageAction::ShowMainMenu => self.show_main_menu(),
            PageAction::PlantSeed(_) | PageAction::Harvest | PageAction::Sleep => {}
        }
        Some(action)
    }

    /// Bound and rendered elements, in document order
    pub fn clickable(&self) -> Vec<ElementId> {
        self.doc
            .descendants()
            .into_iter()
            .filter(|id| self.listeners.contains_key(id) && self.doc.is_rendered(*id))
            .collect()
    }

    pub fn label(&self, id: ElementId) -> &str {
        self.doc.text(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::farm::default_seeds;
    use super::document::HIDDEN_CLASS;
    use super::hearts::HEART_SLOTS;

    fn farm_page() -> Page {
        Page::farm(&default_seeds(), "assets").unwrap()
    }

    fn assert_consistent(page: &Page) {
        let doc = page.document();
        let el = page.elements();
        let main_visible = !doc.has_class(el.main_menu, HIDDEN_CLASS);
        let plant_visible = !doc.has_class(el.plant_menu, HIDDEN_CLASS);
        let back_visible = !doc.has_class(el.back_trigger, HIDDEN_CLASS);

        assert!(main_visible ^ plant_visible, "exactly one panel is visible");
        assert_eq!(back_visible, plant_visible);
        assert_eq!(plant_visible, page.menu_state() == MenuState::Plant);
        assert_eq!(doc.text(el.title), page.menu_state().title());
    }

    #[test]
    fn test_initial_state_is_main_menu() {
        let page = farm_page();
        assert_eq!(page.menu_state(), MenuState::Main);
        assert_consistent(&page);
        assert_eq!(page.document().text(page.elements().title), "Actions");
    }

    #[test]
    fn test_initialize_syncs_view_with_state() {
        // Plant panel left visible in the markup gets hidden on init
        let mut doc = Document::farm_page(&default_seeds());
        let plant_menu = doc.query_selector(".plant-menu").unwrap().unwrap();
        doc.remove_class(plant_menu, HIDDEN_CLASS);

        let handles = UiHandles::locate(&doc).unwrap();
        let page = initialize(doc, handles, "assets").unwrap();
        assert_consistent(&page);
    }

    #[test]
    fn test_show_plant_and_main_menu() {
        let mut page = farm_page();
        page.show_plant_menu();
        let (doc, el) = (page.document(), page.elements());
        assert!(doc.is_rendered(el.plant_menu));
        assert!(!doc.is_rendered(el.main_menu));
        assert!(doc.is_rendered(el.back_trigger));
        assert_eq!(doc.text(el.title), "Choose a Seed");

        page.show_main_menu();
        let (doc, el) = (page.document(), page.elements());
        assert!(doc.is_rendered(el.main_menu));
        assert!(!doc.is_rendered(el.plant_menu));
        assert!(!doc.is_rendered(el.back_trigger));
        assert_eq!(doc.text(el.title), "Actions");
    }

    #[test]
    fn test_trigger_sequences_follow_state_machine() {
        // Every plant/back sequence up to six clicks, bit set = plant trigger
        for len in 0..=6u32 {
            for bits in 0..(1u32 << len) {
                let mut page = farm_page();
                let plant = page.elements().plant_trigger;
                let back = page.elements().back_trigger;
                let mut expected = MenuState::Main;

                for step in 0..len {
                    let (target, event) = if bits & (1 << step) != 0 {
                        (plant, MenuEvent::PlantTrigger)
                    } else {
                        (back, MenuEvent::BackTrigger)
                    };
                    // Hidden triggers ignore the click, so the model only
                    // moves when the page handled it
                    if page.click(target).is_some() {
                        expected = expected.transition(event);
                    }
                    assert_eq!(
                        page.menu_state(),
                        expected,
                        "sequence {:0width$b}",
                        bits,
                        width = len as usize
                    );
                    assert_consistent(&page);
                }
            }
        }
    }

    #[test]
    fn test_click_dispatch() {
        let mut page = farm_page();
        let plant = page.elements().plant_trigger;
        assert_eq!(page.click(plant), Some(PageAction::ShowPlantMenu));
        assert_eq!(page.menu_state(), MenuState::Plant);

        let seeds: Vec<_> = page
            .clickable()
            .into_iter()
            .filter(|id| *id != page.elements().back_trigger)
            .collect();
        assert_eq!(seeds.len(), 3);
        assert_eq!(
            page.click(seeds[2]),
            Some(PageAction::PlantSeed("pumpkin".to_string()))
        );

        let back = page.elements().back_trigger;
        assert_eq!(page.click(back), Some(PageAction::ShowMainMenu));
        assert_eq!(page.menu_state(), MenuState::Main);
    }

    #[test]
    fn test_hidden_and_unbound_clicks_are_ignored() {
        let mut page = farm_page();
        let back = page.elements().back_trigger;
        assert_eq!(page.click(back), None);

        let title = page.elements().title;
        assert_eq!(page.click(title), None);
        assert_eq!(page.menu_state(), MenuState::Main);
    }

    #[test]
    fn test_clickable_follows_visible_panel() {
        let mut page = farm_page();
        let labels: Vec<String> = page
            .clickable()
            .into_iter()
            .map(|id| page.label(id).to_string())
            .collect();
        assert_eq!(labels, vec!["Plant", "Harvest", "Sleep"]);

        page.show_plant_menu();
        let clickable = page.clickable();
        assert_eq!(clickable.len(), 4);
        assert_eq!(clickable.last(), Some(&page.elements().back_trigger));
    }

    #[test]
    fn test_render_hearts_through_page() {
        let mut page = farm_page();
        page.render_hearts(12.5);
        assert_eq!(page.hearts(), hearts::heart_strip(12.5).to_vec());

        page.render_hearts(3.0);
        let shown = page.hearts();
        assert_eq!(shown.len(), HEART_SLOTS);
        assert_eq!(shown, hearts::heart_strip(3.0).to_vec());
    }

    #[test]
    fn test_missing_elements_fail_fast() {
        let doc = Document::farm_page(&default_seeds());
        let handles = UiHandles::locate(&doc).unwrap();

        let cases: [(&str, fn(&mut UiHandles)); 7] = [
            ("plant trigger", |h| h.plant_trigger = None),
            ("back trigger", |h| h.back_trigger = None),
            ("actions block", |h| h.actions_block = None),
            ("main menu", |h| h.main_menu = None),
            ("plant menu", |h| h.plant_menu = None),
            ("title", |h| h.title = None),
            ("hearts container", |h| h.hearts_container = None),
        ];
        for (element, strip) in cases {
            let mut broken = handles;
            strip(&mut broken);
            let err = initialize(doc.clone(), broken, "assets").err();
            assert_eq!(err, Some(InitError::Missing { element }));
        }
    }

    #[test]
    fn test_locate_reports_missing_as_none() {
        let mut doc = Document::farm_page(&default_seeds());
        let block = doc.query_selector(".actions-block").unwrap().unwrap();
        let back = doc.query_selector(".back-button").unwrap().unwrap();
        doc.clear_children(block);

        let handles = UiHandles::locate(&doc).unwrap();
        assert!(handles.back_trigger.is_none());
        assert!(handles.hearts_container.is_some());
        assert!(!doc.contains(back));

        let err = initialize(doc, handles, "assets").err();
        assert_eq!(err, Some(InitError::Missing { element: "plant trigger" }));
    }

    #[test]
    fn test_duplicate_elements_rejected() {
        let mut doc = Document::farm_page(&default_seeds());
        let root = doc.root();
        let extra = doc.create_element("h2");
        doc.add_class(extra, "actions-title");
        doc.append_child(root, extra);

        assert_eq!(
            UiHandles::locate(&doc),
            Err(InitError::Duplicate { element: "title", count: 2 })
        );
    }

    #[test]
    fn test_seeds_outside_actions_block_are_not_bound() {
        let mut doc = Document::farm_page(&default_seeds());
        let root = doc.root();
        let stray = doc.create_element("button");
        doc.add_class(stray, "seed");
        doc.set_attribute(stray, "data-seed", "wheat");
        doc.append_child(root, stray);

        let handles = UiHandles::locate(&doc).unwrap();
        let mut page = initialize(doc, handles, "assets").unwrap();
        assert_eq!(page.click(stray), None);
    }

    #[test]
    fn test_detached_handle_rejected() {
        let mut doc = Document::farm_page(&default_seeds());
        let mut handles = UiHandles::locate(&doc).unwrap();
        handles.title = Some(doc.create_element("h2"));

        let err = initialize(doc, handles, "assets").err();
        assert_eq!(err, Some(InitError::Detached { element: "title" }));
    }

    #[test]
    fn test_aliased_handles_rejected() {
        let doc = Document::farm_page(&default_seeds());
        let handles = UiHandles::locate(&doc).unwrap();

        let mut same_panel = handles;
        same_panel.plant_menu = same_panel.main_menu;
        let err = initialize(doc.clone(), same_panel, "assets").err();
        assert_eq!(
            err,
            Some(InitError::Aliased { first: "main menu", second: "plant menu" })
        );

        let mut same_trigger = handles;
        same_trigger.back_trigger = same_trigger.plant_trigger;
        let err = initialize(doc, same_trigger, "assets").err();
        assert_eq!(
            err,
            Some(InitError::Aliased { first: "plant trigger", second: "back trigger" })
        );
    }

    #[test]
    fn test_harvest_button_is_bound() {
        let mut page = farm_page();
        let harvest = page.clickable()[1];
        assert_eq!(page.click(harvest), Some(PageAction::Harvest));
        assert_eq!(page.menu_state(), MenuState::Main);
        assert_consistent(&page);
    }
}
