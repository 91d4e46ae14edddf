//! Main application state and update logic

use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;
use iced::widget::{button, canvas, column, container, row, space, text};
use iced::{Alignment, Element, Length, Subscription, Task, Theme};
use parking_lot::Mutex;
use tracing::{debug, info, trace, warn};

use crate::config::Config;
use crate::contact::{ContactForm, Field, FormError};
use crate::content::Portfolio;
use crate::geometry::{Point, Viewport};
use crate::page::{PageLayout, CONTACT_SUBMIT_KEY, SCROLL_TO_TOP_KEY, THEME_TOGGLE_KEY};
use crate::pointer::PointerHub;
use crate::scene::{FrameSnapshot, Scene};
use crate::target::TargetSelector;
use crate::theme::{Palette, ResolvedTheme, ThemeChange, ThemeStore};

use super::canvas::PageCanvas;
use super::message::{KeyInput, Message};
use super::theme as app_theme;

/// Longest frame step; longer gaps (window hidden, debugger) are clamped
const MAX_FRAME_SECS: f32 = 0.1;
const DEFAULT_FRAME_SECS: f32 = 1.0 / 60.0;
/// How often the system appearance is re-read
const TICK_INTERVAL: Duration = Duration::from_secs(2);

/// What a click on the page does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageAction {
    /// Flip light/dark
    ToggleTheme,
    /// Scroll back to the top
    ScrollToTop,
    /// Scroll a section under the header
    ScrollTo(String),
    /// Give a contact field keyboard focus
    Focus(Field),
    /// Submit the contact form
    Submit,
    /// Open a link in the browser
    Open(String),
}

/// Contact field for an input element key
pub fn field_for_key(key: &str) -> Option<Field> {
    match key.strip_prefix("contact/")? {
        "name" => Some(Field::Name),
        "email" => Some(Field::Email),
        "subject" => Some(Field::Subject),
        "message" => Some(Field::Message),
        _ => None,
    }
}

/// Action bound to a single element key, if any
pub fn action_for(portfolio: &Portfolio, key: &str) -> Option<PageAction> {
    match key {
        THEME_TOGGLE_KEY => return Some(PageAction::ToggleTheme),
        SCROLL_TO_TOP_KEY | "header/home" => return Some(PageAction::ScrollToTop),
        CONTACT_SUBMIT_KEY => return Some(PageAction::Submit),
        "hero/work" => return Some(PageAction::ScrollTo("projects".to_string())),
        "hero/connect" => return Some(PageAction::ScrollTo("contact".to_string())),
        _ => {}
    }

    if let Some(anchor) = key.strip_prefix("nav/") {
        return Some(PageAction::ScrollTo(anchor.to_string()));
    }
    if let Some(field) = field_for_key(key) {
        return Some(PageAction::Focus(field));
    }
    if let Some(rest) = key.strip_prefix("project/") {
        let project = |id: &str| portfolio.projects.iter().find(|p| p.id == id);
        if let Some(id) = rest.strip_suffix("/code") {
            return project(id).map(|p| PageAction::Open(p.github_url.clone()));
        }
        if let Some(id) = rest.strip_suffix("/demo") {
            return project(id)
                .and_then(|p| p.live_url.clone())
                .map(PageAction::Open);
        }
    }
    if let Some(index) = key.strip_prefix("social/") {
        let index: usize = index.parse().ok()?;
        return portfolio
            .contact
            .social_links
            .get(index)
            .map(|link| PageAction::Open(link.url.clone()));
    }
    None
}

/// Message shown in the status bar
#[derive(Debug, Clone)]
struct Status {
    text: String,
    is_error: bool,
}

/// Everything needed to start the window
#[derive(Debug, Clone)]
pub struct Boot {
    /// Effective configuration
    pub config: Config,
    /// Page content
    pub portfolio: Portfolio,
    /// First layout pass
    pub page: PageLayout,
    /// Process-wide theme store
    pub theme: &'static Mutex<ThemeStore>,
}

impl Boot {
    /// Initial application state
    pub fn app(&self) -> (PortfolioApp, Task<Message>) {
        (PortfolioApp::new(self.clone()), Task::none())
    }
}

/// Desktop rendition of the portfolio page
pub struct PortfolioApp {
    portfolio: Portfolio,
    page: PageLayout,
    viewport: Viewport,
    scroll_y: f32,
    hub: PointerHub,
    scene: Scene,
    snapshot: Option<FrameSnapshot>,
    theme: &'static Mutex<ThemeStore>,
    theme_changes: Receiver<ThemeChange>,
    resolved: ResolvedTheme,
    palette: &'static Palette,
    form: ContactForm,
    focused: Option<Field>,
    status: Option<Status>,
    last_frame: Option<Instant>,
}

impl PortfolioApp {
    /// Create the application from boot data
    pub fn new(boot: Boot) -> Self {
        let Boot {
            config,
            portfolio,
            page,
            theme,
        } = boot;

        let settings = config.scene_settings();
        let selector = settings
            .cursor
            .target_selector
            .parse::<TargetSelector>()
            .unwrap_or_else(|e| {
                warn!("{}; using the default selector", e);
                TargetSelector::default()
            });

        let hub = PointerHub::new();
        let scene = Scene::with_selector(&hub, settings, selector, page.tree().clone());

        let (theme_changes, resolved, palette) = {
            let mut store = theme.lock();
            (store.subscribe(), store.resolved(), store.palette())
        };

        info!(
            "Window ready: {} elements, theme {}",
            page.tree().len(),
            resolved
        );

        Self {
            portfolio,
            viewport: page.viewport(),
            scroll_y: page.scroll_y(),
            page,
            hub,
            scene,
            snapshot: None,
            theme,
            theme_changes,
            resolved,
            palette,
            form: ContactForm::new(),
            focused: None,
            status: None,
            last_frame: None,
        }
    }

    /// Window title
    pub fn title(&self) -> String {
        format!("{} | {}", self.portfolio.personal.name, self.portfolio.personal.title)
    }

    /// Iced theme for widgets outside the canvas
    pub fn theme(&self) -> Theme {
        app_theme::iced_theme(self.resolved)
    }

    /// Handle a message
    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::PointerMoved(position) => {
                self.hub.publish(position);
                Task::none()
            }
            Message::PointerLeft => {
                trace!("Pointer left the page");
                Task::none()
            }
            Message::Pressed(position) => self.press(position),
            Message::Scrolled(dy) => {
                self.scroll_to(self.scroll_y + dy);
                Task::none()
            }
            Message::Resized(viewport) => {
                if viewport != self.viewport {
                    debug!("Page resized to {}x{}", viewport.width, viewport.height);
                    self.viewport = viewport;
                    self.relayout();
                }
                Task::none()
            }
            Message::Frame(now) => {
                let dt = self
                    .last_frame
                    .map_or(DEFAULT_FRAME_SECS, |last| {
                        now.saturating_duration_since(last).as_secs_f32()
                    })
                    .min(MAX_FRAME_SECS);
                self.last_frame = Some(now);
                self.snapshot = Some(self.scene.advance(dt));
                Task::none()
            }
            Message::Tick => {
                self.theme.lock().refresh_system();
                self.apply_theme_changes();
                Task::none()
            }
            Message::Key(input) => self.edit(input),
            Message::ToggleTheme => {
                self.toggle_theme();
                Task::none()
            }
            Message::DismissStatus => {
                self.status = None;
                Task::none()
            }
            Message::Opened(result) => {
                if let Err(e) = result {
                    warn!("Failed to open link: {}", e);
                    self.set_status(format!("Could not open link: {}", e), true);
                }
                Task::none()
            }
        }
    }

    fn press(&mut self, position: Point) -> Task<Message> {
        let tree = self.page.tree();
        let action = tree.hit_test(position).and_then(|id| {
            tree.ancestors(id)
                .find_map(|element| action_for(&self.portfolio, element.key().as_str()))
        });
        debug!("Click at ({:.0}, {:.0}): {:?}", position.x, position.y, action);

        if !matches!(action, Some(PageAction::Focus(_))) {
            self.focused = None;
        }

        match action {
            Some(PageAction::ToggleTheme) => {
                self.toggle_theme();
                Task::none()
            }
            Some(PageAction::ScrollToTop) => {
                self.scroll_to(0.0);
                Task::none()
            }
            Some(PageAction::ScrollTo(anchor)) => {
                if let Some(y) = self.page.anchor(&anchor) {
                    self.scroll_to(y);
                }
                Task::none()
            }
            Some(PageAction::Focus(field)) => {
                self.focused = Some(field);
                Task::none()
            }
            Some(PageAction::Submit) => self.submit(),
            Some(PageAction::Open(url)) => open_external(url),
            None => Task::none(),
        }
    }

    fn edit(&mut self, input: KeyInput) -> Task<Message> {
        let Some(field) = self.focused else {
            return Task::none();
        };

        match input {
            KeyInput::Text(typed) => {
                let value = format!("{}{}", self.form.get(field), typed);
                self.form.set(field, value);
            }
            KeyInput::Backspace => {
                let mut value = self.form.get(field).to_string();
                value.pop();
                self.form.set(field, value);
            }
            KeyInput::NextField => {
                let next = Field::ALL
                    .iter()
                    .position(|f| *f == field)
                    .map_or(Field::Name, |i| Field::ALL[(i + 1) % Field::ALL.len()]);
                self.focused = Some(next);
            }
            KeyInput::Enter if field == Field::Message => {
                let value = format!("{}\n", self.form.get(field));
                self.form.set(field, value);
            }
            KeyInput::Enter => return self.submit(),
            KeyInput::Escape => self.focused = None,
        }
        Task::none()
    }

    fn submit(&mut self) -> Task<Message> {
        match self.form.submit(&self.portfolio.contact.email) {
            Ok(link) => {
                self.focused = None;
                self.set_status("Opening your mail client".to_string(), false);
                open_external(link)
            }
            Err(FormError::Invalid(errors)) => {
                self.focused = errors.iter().map(|(field, _)| field).next();
                self.set_status(format!("{} field(s) need attention", errors.len()), true);
                Task::none()
            }
        }
    }

    fn toggle_theme(&mut self) {
        let result = self.theme.lock().toggle();
        if let Err(e) = result {
            warn!("Theme preference not saved: {}", e);
            self.set_status("Theme changed but could not be saved".to_string(), true);
        }
        self.apply_theme_changes();
    }

    fn apply_theme_changes(&mut self) {
        while let Ok(change) = self.theme_changes.try_recv() {
            debug!("Theme change: {} ({})", change.preference, change.resolved);
            self.resolved = change.resolved;
            self.palette = Palette::for_theme(change.resolved);
        }
    }

    fn scroll_to(&mut self, y: f32) {
        let y = y.clamp(0.0, self.page.max_scroll());
        if (y - self.scroll_y).abs() > f32::EPSILON {
            self.scroll_y = y;
            self.relayout();
        }
    }

    fn relayout(&mut self) {
        match PageLayout::build(&self.portfolio, self.viewport, self.scroll_y) {
            Ok(page) => {
                // A smaller viewport can shrink the scroll range
                let clamped = self.scroll_y.min(page.max_scroll());
                if clamped < self.scroll_y {
                    self.scroll_y = clamped;
                    return self.relayout();
                }
                self.scene.set_layout(page.tree().clone());
                self.page = page;
            }
            Err(e) => warn!("Layout failed, keeping the previous pass: {}", e),
        }
    }

    fn set_status(&mut self, text: String, is_error: bool) {
        self.status = Some(Status { text, is_error });
    }

    /// Render the main view
    pub fn view(&self) -> Element<'_, Message> {
        let page = canvas(PageCanvas {
            page: &self.page,
            snapshot: self.snapshot.as_ref(),
            palette: self.palette,
            resolved: self.resolved,
            form: &self.form,
            focused: self.focused,
        })
        .width(Length::Fill)
        .height(Length::Fill);

        column![page, self.view_status_bar()].spacing(0).into()
    }

    /// Render the status bar
    fn view_status_bar(&self) -> Element<'_, Message> {
        let palette = self.palette;

        let message: Element<'_, Message> = match &self.status {
            Some(status) => {
                let tint = if status.is_error {
                    palette.error
                } else {
                    palette.primary
                };
                row![
                    text(status.text.as_str())
                        .size(12)
                        .style(move |_theme| text::Style {
                            color: Some(app_theme::color(tint)),
                        }),
                    button(text("x").size(12))
                        .on_press(Message::DismissStatus)
                        .padding([2, 6]),
                ]
                .spacing(8)
                .align_y(Alignment::Center)
                .into()
            }
            None => {
                let hint = match self.snapshot.as_ref().map(|s| &s.cursor.state) {
                    Some(state) => format!("cursor: {}", state.name()),
                    None => "Move the pointer over the page".to_string(),
                };
                text(hint).size(12).into()
            }
        };

        let (preference, toggle_label) = {
            let store = self.theme.lock();
            (store.preference(), store.toggle_label())
        };

        container(
            row![
                message,
                space().width(Length::Fill),
                text(format!("theme: {} ({})", preference, self.resolved)).size(12),
                button(text(toggle_label).size(12))
                    .on_press(Message::ToggleTheme)
                    .padding([4, 10])
                    .style(app_theme::primary_button_style(palette)),
            ]
            .spacing(12)
            .align_y(Alignment::Center)
            .padding([6, 16]),
        )
        .style(app_theme::status_bar_style(palette))
        .width(Length::Fill)
        .into()
    }

    /// Subscriptions for frame and housekeeping events
    pub fn subscription(&self) -> Subscription<Message> {
        Subscription::batch([
            iced::window::frames().map(Message::Frame),
            iced::time::every(TICK_INTERVAL).map(|_| Message::Tick),
        ])
    }
}

/// Hand a URL (web or mailto) to the desktop
fn open_external(url: String) -> Task<Message> {
    let opener = if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    };
    info!("Opening {}", url);
    Task::perform(
        async move {
            tokio::process::Command::new(opener)
                .arg(&url)
                .status()
                .await
                .map_err(|e| format!("{}: {}", opener, e))
                .and_then(|status| {
                    if status.success() {
                        Ok(())
                    } else {
                        Err(format!("{} exited with {}", opener, status))
                    }
                })
        },
        Message::Opened,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn portfolio() -> Portfolio {
        Portfolio::bundled().unwrap()
    }

    #[test]
    fn test_field_for_key() {
        assert_eq!(field_for_key("contact/email"), Some(Field::Email));
        assert_eq!(field_for_key("contact/form"), None);
        assert_eq!(field_for_key("email"), None);
    }

    #[test]
    fn test_navigation_actions() {
        let portfolio = portfolio();
        assert_eq!(action_for(&portfolio, THEME_TOGGLE_KEY), Some(PageAction::ToggleTheme));
        assert_eq!(action_for(&portfolio, SCROLL_TO_TOP_KEY), Some(PageAction::ScrollToTop));
        assert_eq!(
            action_for(&portfolio, "nav/skills"),
            Some(PageAction::ScrollTo("skills".to_string()))
        );
        assert_eq!(
            action_for(&portfolio, "hero/connect"),
            Some(PageAction::ScrollTo("contact".to_string()))
        );
        assert_eq!(action_for(&portfolio, "experience"), None);
    }

    #[test]
    fn test_link_actions() {
        let portfolio = portfolio();
        let project = &portfolio.projects[0];
        assert_eq!(
            action_for(&portfolio, &format!("project/{}/code", project.id)),
            Some(PageAction::Open(project.github_url.clone()))
        );
        assert_eq!(
            action_for(&portfolio, "social/0"),
            Some(PageAction::Open(portfolio.contact.social_links[0].url.clone()))
        );
        assert_eq!(action_for(&portfolio, "social/99"), None);
        assert_eq!(action_for(&portfolio, "project/missing/code"), None);
    }
}
