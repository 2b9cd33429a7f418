use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use std::time::{Duration, Instant};

use crate::config::AppConfig;
use crate::farm::{find_seed, Farm, FarmError, Seed, Stamina, Wallet};
use crate::page::document::ElementId;
use crate::page::{Page, PageAction};
use crate::theme::Theme;

/// Status messages clear themselves after this long
const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

/// Health change per +/- key press (half a heart)
const HEALTH_STEP: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    Help,
}

pub struct App {
    pub page: Page,
    pub popup: Popup,
    pub theme: Theme,

    // Player state
    pub stamina: Stamina,
    pub wallet: Wallet,
    pub farm: Farm,
    pub seeds: Vec<Seed>,

    // Cursor over the clickable elements of the visible panel
    pub selected: usize,

    // Status message (shown in info line, auto-clears after timeout)
    pub status_message: Option<String>,
    pub status_message_time: Option<Instant>,
}

impl App {
    pub async fn new(health: Option<f64>) -> Result<Self> {
        let config = AppConfig::load().await.unwrap_or_default();
        Self::with_config(config, health)
    }

    pub fn with_config(config: AppConfig, health: Option<f64>) -> Result<Self> {
        let page = Page::farm(&config.seeds, &config.asset_dir)?;
        let stamina = Stamina::new(
            health.unwrap_or(config.initial_health),
            config.max_health,
        );

        let mut app = Self {
            page,
            popup: Popup::None,
            theme: Theme::load(&config.theme),
            stamina,
            wallet: Wallet::new(config.starting_money),
            farm: Farm::default(),
            seeds: config.seeds,
            selected: 0,
            status_message: None,
            status_message_time: None,
        };
        app.page.render_hearts(app.stamina.current);

        tracing::info!(
            "Deck ready: stamina {}/{}, ${}, {} seeds",
            app.stamina.current,
            app.stamina.max,
            app.wallet.money,
            app.seeds.len()
        );
        Ok(app)
    }

    /// Set a status message (auto-clears after 3 seconds)
    fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
        self.status_message_time = Some(Instant::now());
    }

    /// Periodic housekeeping
    pub fn tick(&mut self) {
        if let Some(since) = self.status_message_time {
            if since.elapsed() >= STATUS_TIMEOUT {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }

    pub fn selected_element(&self) -> Option<ElementId> {
        self.page.clickable().get(self.selected).copied()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if self.popup == Popup::Help {
            if matches!(
                key.code,
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('h') | KeyCode::Enter | KeyCode::Char('q')
            ) {
                self.popup = Popup::None;
            }
            return Ok(());
        }

        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.move_down(),
            KeyCode::Char('k') | KeyCode::Up => self.move_up(),

            KeyCode::Char(' ') | KeyCode::Enter => {
                if let Some(id) = self.selected_element() {
                    self.click(id)?;
                }
            }

            // Shortcuts for the two triggers
            KeyCode::Char('p') => {
                let id = self.page.elements().plant_trigger;
                self.click(id)?;
            }
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('b') => {
                let id = self.page.elements().back_trigger;
                self.click(id)?;
            }

            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.stamina.restore(HEALTH_STEP);
                self.page.render_hearts(self.stamina.current);
            }
            KeyCode::Char('-') => {
                self.stamina.drain(HEALTH_STEP);
                self.page.render_hearts(self.stamina.current);
            }

            KeyCode::Char('?') | KeyCode::Char('h') => self.popup = Popup::Help,

            _ => {}
        }
        Ok(())
    }

    fn move_down(&mut self) {
        let count = self.page.clickable().len();
        if count > 0 {
            self.selected = (self.selected + 1) % count;
        }
    }

    fn move_up(&mut self) {
        let count = self.page.clickable().len();
        if count > 0 {
            self.selected = self.selected.checked_sub(1).unwrap_or(count - 1);
        }
    }

    /// Click an element and run whatever it dispatches
    fn click(&mut self, id: ElementId) -> Result<()> {
        let before = self.page.menu_state();
        let result = match self.page.click(id) {
            Some(action) => self.perform(action),
            None => Ok(()),
        };

        if self.page.menu_state() != before {
            self.selected = 0;
        } else {
            let count = self.page.clickable().len();
            self.selected = self.selected.min(count.saturating_sub(1));
        }
        result
    }

    fn perform(&mut self, action: PageAction) -> Result<()> {
        match action {
            PageAction::ShowPlantMenu | PageAction::ShowMainMenu => Ok(()),
            PageAction::PlantSeed(name) => self.plant(&name),
            PageAction::Harvest => {
                self.harvest(Instant::now());
                Ok(())
            }
            PageAction::Sleep => {
                self.stamina.full_restore();
                self.page.render_hearts(self.stamina.current);
                self.set_status("You slept well. Stamina restored");
                Ok(())
            }
        }
    }

    /// Pay for a seed, plant it and go back to the main menu.
    /// Nothing changes unless every check passes.
    fn plant(&mut self, name: &str) -> Result<()> {
        let seed = find_seed(&self.seeds, name)?.clone();
        if self.farm.free_plots() == 0 {
            return Err(FarmError::NoFreePlot.into());
        }
        if !self.stamina.has(seed.stamina_cost) {
            return Err(FarmError::NotEnoughStamina {
                needed: seed.stamina_cost,
                available: self.stamina.current,
            }
            .into());
        }
        if !self.wallet.can_afford(seed.cost) {
            return Err(FarmError::NotEnoughMoney {
                needed: seed.cost,
                available: self.wallet.money,
            }
            .into());
        }

        self.wallet.spend(seed.cost)?;
        self.stamina.spend(seed.stamina_cost)?;
        let plot = self.farm.plant(&seed, Instant::now())?;
        self.page.render_hearts(self.stamina.current);
        self.page.show_main_menu();

        tracing::info!("Planted {} in plot {}", seed.name, plot + 1);
        self.set_status(format!("Planted {} in plot {}", seed.name, plot + 1));
        Ok(())
    }

    fn harvest(&mut self, now: Instant) {
        let harvest = self.farm.harvest_ready(now);
        if harvest.plots == 0 {
            self.set_status("Nothing is ready to harvest");
            return;
        }

        self.wallet.earn(harvest.earned);
        tracing::info!("Harvested {} plots for ${}", harvest.plots, harvest.earned);
        self.set_status(format!(
            "Harvested {} crops for ${} (now ${})",
            harvest.plots, harvest.earned, self.wallet.money
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::hearts::{heart_strip, HeartVariant, HEART_SLOTS};
    use crate::farm::default_seeds;
    use crate::page::menu::MenuState;

    fn app(health: f64) -> App {
        App::with_config(AppConfig::default(), Some(health)).unwrap()
    }

    fn press(app: &mut App, code: KeyCode) -> Result<()> {
        app.handle_key(KeyEvent::from(code))
    }

    #[test]
    fn test_starts_on_main_menu_with_rendered_hearts() {
        let app = App::with_config(AppConfig::default(), None).unwrap();
        assert_eq!(app.page.menu_state(), MenuState::Main);
        assert_eq!(app.page.hearts(), heart_strip(12.5).to_vec());
    }

    #[test]
    fn test_plant_shortcut_and_back() {
        let mut app = app(10.0);
        press(&mut app, KeyCode::Char('p')).unwrap();
        assert_eq!(app.page.menu_state(), MenuState::Plant);

        press(&mut app, KeyCode::Esc).unwrap();
        assert_eq!(app.page.menu_state(), MenuState::Main);

        // Back trigger is hidden on the main menu, nothing happens
        press(&mut app, KeyCode::Char('b')).unwrap();
        assert_eq!(app.page.menu_state(), MenuState::Main);
    }

    #[test]
    fn test_planting_spends_stamina_and_returns_to_main() {
        let mut app = app(10.0);
        press(&mut app, KeyCode::Char('p')).unwrap();

        // Third seed is pumpkin (1 stamina)
        press(&mut app, KeyCode::Down).unwrap();
        press(&mut app, KeyCode::Down).unwrap();
        press(&mut app, KeyCode::Enter).unwrap();

        assert_eq!(app.stamina.current, 9.0);
        assert_eq!(app.wallet.money, 10);
        assert_eq!(app.farm.plots[0].as_ref().map(|p| p.crop.as_str()), Some("pumpkin"));
        assert_eq!(app.page.menu_state(), MenuState::Main);
        assert_eq!(app.page.hearts(), heart_strip(9.0).to_vec());
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn test_planting_without_stamina_changes_nothing() {
        let mut app = app(0.5);
        press(&mut app, KeyCode::Char('p')).unwrap();
        press(&mut app, KeyCode::Up).unwrap(); // wraps to the back button
        press(&mut app, KeyCode::Up).unwrap(); // pumpkin
        let before = app.page.hearts();

        assert!(press(&mut app, KeyCode::Enter).is_err());
        assert_eq!(app.stamina.current, 0.5);
        assert_eq!(app.wallet.money, 50);
        assert_eq!(app.page.hearts(), before);
        assert_eq!(app.farm.free_plots(), crate::farm::DEFAULT_PLOTS);
        assert_eq!(app.page.menu_state(), MenuState::Plant);
    }

    #[test]
    fn test_sleep_restores_full_bar() {
        let mut app = app(2.0);
        // Plant, Harvest, Sleep
        press(&mut app, KeyCode::Down).unwrap();
        press(&mut app, KeyCode::Down).unwrap();
        press(&mut app, KeyCode::Enter).unwrap();
        assert_eq!(app.stamina.current, 16.0);
        assert_eq!(app.page.hearts(), vec![HeartVariant::Full; HEART_SLOTS]);
        assert!(app.status_message.is_some());
    }

    #[test]
    fn test_planting_without_money_changes_nothing() {
        let config = AppConfig {
            starting_money: 30,
            ..AppConfig::default()
        };
        let mut app = App::with_config(config, Some(10.0)).unwrap();
        press(&mut app, KeyCode::Char('p')).unwrap();
        press(&mut app, KeyCode::Down).unwrap();
        press(&mut app, KeyCode::Down).unwrap(); // pumpkin, $40

        let err = press(&mut app, KeyCode::Enter).unwrap_err();
        assert_eq!(
            err.downcast_ref::<FarmError>(),
            Some(&FarmError::NotEnoughMoney { needed: 40, available: 30 })
        );
        assert_eq!(app.wallet.money, 30);
        assert_eq!(app.stamina.current, 10.0);
        assert_eq!(app.farm.free_plots(), crate::farm::DEFAULT_PLOTS);
        assert_eq!(app.page.menu_state(), MenuState::Plant);

        // Corn at $20 still fits
        press(&mut app, KeyCode::Up).unwrap();
        press(&mut app, KeyCode::Enter).unwrap();
        assert_eq!(app.wallet.money, 10);
        assert_eq!(app.stamina.current, 9.5);
    }

    #[test]
    fn test_harvest_pays_for_ready_crops() {
        let mut seeds = default_seeds();
        seeds.push(Seed {
            name: "radish".to_string(),
            cost: 5,
            growth_time: 0,
            value: 12,
            stamina_cost: 0.5,
        });
        let config = AppConfig {
            seeds,
            ..AppConfig::default()
        };
        let mut app = App::with_config(config, Some(10.0)).unwrap();

        // Nothing planted yet
        press(&mut app, KeyCode::Down).unwrap();
        press(&mut app, KeyCode::Enter).unwrap();
        assert_eq!(app.wallet.money, 50);

        app.plant("radish").unwrap();
        app.plant("wheat").unwrap();
        assert_eq!(app.wallet.money, 35);

        // Cursor is still on Harvest
        press(&mut app, KeyCode::Enter).unwrap();
        assert_eq!(app.wallet.money, 47);
        assert!(app.farm.plots[0].is_none());
        assert!(app.farm.plots[1].is_some());
        assert_eq!(app.page.menu_state(), MenuState::Main);
    }

    #[test]
    fn test_restore_key_keeps_health_above_max() {
        let mut app = app(20.0);
        press(&mut app, KeyCode::Char('+')).unwrap();
        assert_eq!(app.stamina.current, 20.0);
        assert_eq!(app.page.hearts(), vec![HeartVariant::Full; HEART_SLOTS]);
    }

    #[test]
    fn test_health_keys_rerender() {
        let mut app = app(12.0);
        press(&mut app, KeyCode::Char('+')).unwrap();
        assert_eq!(app.page.hearts()[12], HeartVariant::Half);

        for _ in 0..40 {
            press(&mut app, KeyCode::Char('-')).unwrap();
        }
        assert_eq!(app.stamina.current, 0.0);
        assert_eq!(app.page.hearts(), vec![HeartVariant::Empty; HEART_SLOTS]);
    }

    #[test]
    fn test_help_popup_swallows_keys() {
        let mut app = app(5.0);
        press(&mut app, KeyCode::Char('?')).unwrap();
        assert_eq!(app.popup, Popup::Help);

        press(&mut app, KeyCode::Char('p')).unwrap();
        assert_eq!(app.page.menu_state(), MenuState::Main);

        press(&mut app, KeyCode::Esc).unwrap();
        assert_eq!(app.popup, Popup::None);
    }
}
