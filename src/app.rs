use crate::auth::{AuthGate, MemoryCredentialStore};
use crate::charts::pie::CountSource;
use crate::charts::scatter3d::{self, Orbit, Scatter3d};
use crate::charts::{bar, pie, Figure};
use crate::config::Settings;
use crate::controls::{Checklist, Dropdown};
use crate::data::{DisasterTable, ThresholdCount};
use crate::event::{DashEvent, ExportKind};
use crate::export;
use crate::map::{CityFilter, MapFrame, MapRenderer, MapViewState, Viewport};
use crate::routes::Route;
use crate::timer::Interval;
use crate::treemap::{hit_test, Tile, TreemapNavigator};
use crate::ui;
use anyhow::Result;
use crossterm::event::{KeyCode, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Longest the event loop waits for input before checking timers again
const MAX_POLL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    Email,
    Password,
    LoginButton,
    SignupButton,
}

impl LoginField {
    const ORDER: [LoginField; 4] = [
        LoginField::Email,
        LoginField::Password,
        LoginField::LoginButton,
        LoginField::SignupButton,
    ];

    fn step(self, step: isize) -> Self {
        let i = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0) as isize;
        Self::ORDER[(i + step).rem_euclid(Self::ORDER.len() as isize) as usize]
    }
}

/// Login view inputs and the last auth message
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub focus: LoginField,
    pub message: Option<String>,
}

pub struct TreemapPage {
    pub nav: TreemapNavigator,
    /// Index into the visible figure's tiles
    pub focus: usize,
}

/// Map page state plus its two timers; exists only while the page is mounted
pub struct MapPage {
    pub view: MapViewState,
    pub years: Dropdown<i32>,
    pub month_timer: Interval,
    pub blink_timer: Interval,
    /// City whose hover block is shown
    pub hover: Option<&'static str>,
}

pub struct BarPage {
    pub cities: Checklist,
    pub year: Dropdown<i32>,
    pub disasters: Checklist,
    pub focus: usize,
}

impl BarPage {
    pub const PANES: usize = 3;

    fn new(table: &DisasterTable) -> Self {
        let cities: Vec<String> = table.cities().into_iter().map(String::from).collect();
        let first = cities.first().cloned();
        let mut city_list = Checklist::new(cities, false);
        if let Some(first) = first {
            city_list.set(&first, true);
        }
        Self {
            cities: city_list,
            year: Dropdown::new(bar::years(table)),
            disasters: Checklist::new(table.disasters().into_iter().map(String::from), true),
            focus: 0,
        }
    }
}

pub struct PiePage {
    pub city: Dropdown<String>,
    pub year: Dropdown<i32>,
    pub disasters: Checklist,
    pub focus: usize,
}

impl PiePage {
    pub const PANES: usize = 3;

    fn new(source: CountSource<'_>) -> Self {
        Self {
            city: Dropdown::new(source.cities()),
            year: Dropdown::new(source.years()),
            disasters: Checklist::new(source.disasters(), true),
            focus: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceView {
    /// Several cities, one disaster, value on z
    ByCities,
    /// One city, every disaster, scale on z
    ByDisaster,
}

pub struct SurfacePage {
    pub view: SurfaceView,
    pub cities: Checklist,
    pub disaster: Dropdown<String>,
    pub city: Dropdown<String>,
    pub orbit: Orbit,
    pub focus: usize,
}

impl SurfacePage {
    fn new(table: &DisasterTable) -> Self {
        let names: Vec<String> = table.cities().into_iter().map(String::from).collect();
        let mut cities = Checklist::new(names.clone(), false);
        if let Some(first) = names.first() {
            cities.set(first, true);
        }
        Self {
            view: SurfaceView::ByCities,
            cities,
            disaster: Dropdown::new(table.disasters().into_iter().map(String::from).collect()),
            city: Dropdown::new(names),
            orbit: Orbit::default(),
            focus: 0,
        }
    }

    pub fn panes(&self) -> usize {
        match self.view {
            SurfaceView::ByCities => 2,
            SurfaceView::ByDisaster => 1,
        }
    }
}

/// Application state
pub struct App {
    settings: Settings,
    table: DisasterTable,
    thresholds: Option<Vec<ThresholdCount>>,
    pub map_renderer: MapRenderer,
    auth: AuthGate<MemoryCredentialStore>,
    pub login: LoginForm,
    route: Route,
    pub treemap: TreemapPage,
    pub map: Option<MapPage>,
    pub bar: BarPage,
    pub pie: PiePage,
    pub surface: SurfacePage,
    /// One-line feedback shown in the status bar
    pub status: Option<String>,
    screen: Rect,
    pub should_quit: bool,
    /// Last mouse position for drag tracking
    last_mouse: Option<(u16, u16)>,
}

impl App {
    pub fn new(
        settings: Settings,
        table: DisasterTable,
        thresholds: Option<Vec<ThresholdCount>>,
        map_renderer: MapRenderer,
    ) -> Self {
        let years = settings.years.iter().map(|y| y.to_string()).collect();
        let treemap = TreemapPage {
            nav: TreemapNavigator::new(years, &table),
            focus: 0,
        };
        let bar = BarPage::new(&table);
        let pie = PiePage::new(CountSource::new(&table, thresholds.as_deref()));
        let surface = SurfacePage::new(&table);

        Self {
            settings,
            table,
            thresholds,
            map_renderer,
            auth: AuthGate::new(MemoryCredentialStore::default()),
            login: LoginForm::default(),
            route: Route::Home,
            treemap,
            map: None,
            bar,
            pie,
            surface,
            status: None,
            screen: Rect::default(),
            should_quit: false,
            last_mouse: None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn table(&self) -> &DisasterTable {
        &self.table
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn is_logged_in(&self) -> bool {
        self.auth.is_logged_in()
    }

    pub fn user_email(&self) -> Option<&str> {
        self.auth.session().email.as_deref()
    }

    pub fn screen(&self) -> Rect {
        self.screen
    }

    /// Update layout size when the terminal resizes
    pub fn resize(&mut self, width: u16, height: u16) {
        self.screen = Rect::new(0, 0, width, height);
    }

    /// Apply one event. Every state change goes through here.
    pub fn dispatch(&mut self, event: DashEvent) {
        match event {
            DashEvent::Quit => self.should_quit = true,
            DashEvent::Signup { email, password } => match self.auth.signup(&email, &password) {
                Ok(msg) => {
                    self.login.message = Some(msg.to_string());
                    self.login.password.clear();
                    self.mount(self.settings.start_page);
                }
                Err(e) => self.login.message = Some(e.to_string()),
            },
            DashEvent::Login { email, password } => match self.auth.login(&email, &password) {
                Ok(msg) => {
                    self.login.message = Some(msg.to_string());
                    self.login.password.clear();
                    self.mount(self.settings.start_page);
                }
                Err(e) => self.login.message = Some(e.to_string()),
            },
            _ if !self.is_logged_in() => {
                tracing::trace!(?event, "ignored while logged out");
            }
            DashEvent::Navigate(route) => self.navigate(route),
            DashEvent::ClickYear(_)
            | DashEvent::ClickMonth(_)
            | DashEvent::ClickCity(_)
            | DashEvent::ClickDisaster(_) => {
                if self.route != Route::Treemaps {
                    return;
                }
                if let Some((level, label)) = event.as_treemap_click() {
                    if self.treemap.nav.click(level, label, &self.table) {
                        self.treemap.focus = first_leaf(&self.treemap_tiles());
                    }
                }
            }
            DashEvent::Tick => {
                if let Some(map) = &mut self.map {
                    if map.view.playing {
                        map.view.on_tick();
                    }
                }
            }
            DashEvent::BlinkTick => {
                if let Some(map) = &mut self.map {
                    map.view.on_blink_tick();
                }
            }
            DashEvent::TogglePlay => {
                if let Some(map) = &mut self.map {
                    map.view.toggle_play();
                    map.month_timer.set_enabled(map.view.playing, Instant::now());
                }
            }
            DashEvent::SetMapYear(year) => {
                if let Some(map) = &mut self.map {
                    if map.years.select(&year) {
                        map.view.set_year(year);
                    }
                }
            }
            DashEvent::SetCityFilter(filter) => {
                if let Some(map) = &mut self.map {
                    map.view.set_city_filter(filter);
                    map.hover = None;
                }
            }
            DashEvent::SetMonth(month) => {
                if let Some(map) = &mut self.map {
                    map.view.set_month(month);
                }
            }
            DashEvent::UserCamera(camera) => {
                if let Some(map) = &mut self.map {
                    if !map.view.record_user_camera(camera) {
                        self.status = Some(format!("View locked to {}", map.view.city_filter));
                    }
                }
            }
            DashEvent::Export(kind) => {
                self.status = Some(match self.export(kind) {
                    Ok(Some(path)) => format!("Saved {}", path.display()),
                    Ok(None) => "Nothing to export".to_string(),
                    Err(e) => {
                        tracing::error!("export failed: {e:#}");
                        format!("Export failed: {e:#}")
                    }
                });
            }
        }
    }

    fn navigate(&mut self, route: Route) {
        if route == Route::Logout {
            self.auth.logout();
            self.treemap.nav.reset(&self.table);
            self.map = None;
            self.route = Route::Home;
            self.login = LoginForm::default();
            return;
        }
        if route == self.route {
            return;
        }
        self.mount(route);
    }

    /// Enter a page with fresh page-local state
    fn mount(&mut self, route: Route) {
        tracing::debug!(from = ?self.route, to = ?route, "navigate");
        self.status = None;
        if self.route == Route::Map && route != Route::Map {
            self.map = None;
        }
        self.route = route;

        match route {
            Route::Treemaps => {
                self.treemap.nav.reset(&self.table);
                self.treemap.focus = first_leaf(&self.treemap_tiles());
            }
            Route::Map => {
                let now = Instant::now();
                let fallback = self.settings.years.first().copied().unwrap_or_default();
                let mut years = self.table.years();
                if years.is_empty() {
                    years.push(fallback);
                }
                let view = MapViewState::new(&years, fallback);
                let mut years = Dropdown::new(years);
                years.select(&view.selected_year);
                self.map = Some(MapPage {
                    view,
                    years,
                    month_timer: Interval::new(self.settings.tick, false, now),
                    blink_timer: Interval::new(self.settings.blink, true, now),
                    hover: None,
                });
            }
            Route::BarCharts => self.bar = BarPage::new(&self.table),
            Route::PieChart => self.pie = PiePage::new(self.count_source()),
            Route::Surface3d => self.surface = SurfacePage::new(&self.table),
            Route::Home | Route::Logout => {}
        }
    }

    /// Fire due timers
    pub fn poll_timers(&mut self, now: Instant) {
        let Some(map) = &mut self.map else {
            return;
        };
        let tick = map.month_timer.poll(now);
        let blink = map.blink_timer.poll(now);
        if tick {
            self.dispatch(DashEvent::Tick);
        }
        if blink {
            self.dispatch(DashEvent::BlinkTick);
        }
    }

    /// How long the event loop may block on input
    pub fn poll_timeout(&self, now: Instant) -> Duration {
        self.map
            .as_ref()
            .into_iter()
            .flat_map(|m| [m.month_timer.remaining(now), m.blink_timer.remaining(now)])
            .flatten()
            .fold(MAX_POLL, Duration::min)
    }

    pub fn count_source(&self) -> CountSource<'_> {
        CountSource::new(&self.table, self.thresholds.as_deref())
    }

    pub fn bar_figure(&self) -> Figure<bar::BarChart> {
        bar::build(
            &self.table,
            &self.bar.cities.checked(),
            self.bar.year.selected().copied(),
            &self.bar.disasters.checked(),
        )
    }

    pub fn pie_figure(&self) -> Figure<pie::PieChart> {
        pie::build(
            self.count_source(),
            self.pie.city.selected().map(String::as_str),
            self.pie.year.selected().copied(),
            &self.pie.disasters.checked(),
        )
    }

    pub fn surface_figure(&self) -> Figure<Scatter3d> {
        match self.surface.view {
            SurfaceView::ByCities => scatter3d::by_cities(
                &self.table,
                &self.surface.cities.checked(),
                self.surface.disaster.selected().map(String::as_str),
            ),
            SurfaceView::ByDisaster => {
                scatter3d::by_disaster(&self.table, self.surface.city.selected().map(String::as_str))
            }
        }
    }

    pub fn map_frame(&self) -> Option<MapFrame> {
        self.map.as_ref().map(|m| m.view.render(&self.table))
    }

    /// Tiles of the visible treemap figure at the current screen size
    pub fn treemap_tiles(&self) -> Vec<Tile> {
        let area = ui::treemap::chart_area(ui::body_area(self.screen));
        self.treemap.nav.visible_figure().layout(area)
    }

    fn has_figure(&self) -> bool {
        match self.route {
            Route::Home | Route::Logout => false,
            Route::Treemaps => true,
            Route::Map => self.map.is_some(),
            Route::BarCharts => self.bar_figure().ready().is_some(),
            Route::PieChart => self.pie_figure().ready().is_some(),
            Route::Surface3d => self.surface_figure().ready().is_some(),
        }
    }

    fn export(&self, kind: ExportKind) -> Result<Option<PathBuf>> {
        let dir = &self.settings.export_dir;
        match kind {
            ExportKind::Snapshot => {
                if !self.has_figure() {
                    return Ok(None);
                }
                let buf = ui::render_to_buffer(self)?;
                export::write_snapshot(dir, self.route.slug(), &buf).map(Some)
            }
            ExportKind::Pdf => match self.route {
                Route::BarCharts => match self.bar_figure() {
                    Figure::Ready(chart) => {
                        let mut lines = vec![chart.writeup.clone(), String::new()];
                        lines.extend(bar::report_lines(&chart));
                        export::write_pdf(dir, "weather_report.pdf", &chart.title, &lines).map(Some)
                    }
                    Figure::Empty { .. } => Ok(None),
                },
                Route::PieChart => match self.pie_figure() {
                    Figure::Ready(chart) => {
                        export::write_pdf(dir, "pie_chart.pdf", &chart.title, &pie::report_lines(&chart))
                            .map(Some)
                    }
                    Figure::Empty { .. } => Ok(None),
                },
                _ => Ok(None),
            },
        }
    }

    /// Translate a key press into events for the current view
    pub fn handle_key(&mut self, code: KeyCode) {
        if !self.is_logged_in() {
            self.handle_login_key(code);
            return;
        }

        match code {
            KeyCode::Esc | KeyCode::Char('q') => return self.dispatch(DashEvent::Quit),
            KeyCode::Char(c @ '1'..='7') => {
                let idx = c as usize - '1' as usize;
                return self.dispatch(DashEvent::Navigate(Route::NAV[idx]));
            }
            KeyCode::Char('e') => return self.dispatch(DashEvent::Export(ExportKind::Snapshot)),
            KeyCode::Char('p') => return self.dispatch(DashEvent::Export(ExportKind::Pdf)),
            _ => {}
        }

        match self.route {
            Route::Treemaps => self.treemap_key(code),
            Route::Map => self.map_key(code),
            Route::BarCharts => self.bar_key(code),
            Route::PieChart => self.pie_key(code),
            Route::Surface3d => self.surface_key(code),
            Route::Home | Route::Logout => {}
        }
    }

    fn handle_login_key(&mut self, code: KeyCode) {
        let form = &mut self.login;
        match code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab | KeyCode::Down => form.focus = form.focus.step(1),
            KeyCode::BackTab | KeyCode::Up => form.focus = form.focus.step(-1),
            KeyCode::Backspace => match form.focus {
                LoginField::Email => {
                    form.email.pop();
                }
                LoginField::Password => {
                    form.password.pop();
                }
                _ => {}
            },
            KeyCode::Char(c) => match form.focus {
                LoginField::Email => form.email.push(c),
                LoginField::Password => form.password.push(c),
                _ => {}
            },
            KeyCode::Enter => {
                let email = form.email.trim().to_string();
                let password = form.password.clone();
                let event = if form.focus == LoginField::SignupButton {
                    DashEvent::Signup { email, password }
                } else {
                    DashEvent::Login { email, password }
                };
                self.dispatch(event);
            }
            _ => {}
        }
    }

    fn treemap_key(&mut self, code: KeyCode) {
        let tiles = self.treemap_tiles();
        if tiles.is_empty() {
            return;
        }
        let n = tiles.len();
        let level = self.treemap.nav.level();
        match code {
            KeyCode::Right | KeyCode::Down | KeyCode::Tab => {
                self.treemap.focus = (self.treemap.focus + 1) % n;
            }
            KeyCode::Left | KeyCode::Up | KeyCode::BackTab => {
                self.treemap.focus = (self.treemap.focus + n - 1) % n;
            }
            KeyCode::Enter => {
                if let Some(tile) = tiles.get(self.treemap.focus) {
                    self.dispatch(DashEvent::treemap_click(level, tile.label.clone()));
                }
            }
            KeyCode::Backspace => {
                if let Some(root) = tiles.iter().find(|t| t.leaf.is_none()) {
                    self.dispatch(DashEvent::treemap_click(level, root.label.clone()));
                }
            }
            _ => {}
        }
    }

    fn map_key(&mut self, code: KeyCode) {
        let Some(map) = &self.map else {
            return;
        };
        let (month, filter, hover) = (map.view.current_month, map.view.city_filter, map.hover);
        let mut years = map.years.clone();
        match code {
            KeyCode::Char(' ') => self.dispatch(DashEvent::TogglePlay),
            KeyCode::Left => self.dispatch(DashEvent::SetMonth(month.saturating_sub(1))),
            KeyCode::Right => self.dispatch(DashEvent::SetMonth(month + 1)),
            KeyCode::Char('[') | KeyCode::Char(']') => {
                let step = if code == KeyCode::Char(']') { 1 } else { -1 };
                years.cycle(step);
                if let Some(&year) = years.selected() {
                    self.dispatch(DashEvent::SetMapYear(year));
                }
            }
            KeyCode::Char('c') | KeyCode::Char('C') => {
                let step = if code == KeyCode::Char('c') { 1 } else { -1 };
                if let Some(filter) = step_value(&CityFilter::options(), &filter, step) {
                    self.dispatch(DashEvent::SetCityFilter(filter));
                }
            }
            KeyCode::Tab => {
                let names: Vec<&'static str> = self
                    .map_frame()
                    .map(|f| f.markers.iter().map(|m| m.city.name).collect())
                    .unwrap_or_default();
                let next = match hover {
                    Some(h) => step_value(&names, &h, 1),
                    None => names.first().copied(),
                };
                if let Some(map) = &mut self.map {
                    map.hover = next;
                }
            }
            KeyCode::Char('h') => self.adjust_camera(|vp| vp.pan(-10, 0)),
            KeyCode::Char('l') => self.adjust_camera(|vp| vp.pan(10, 0)),
            KeyCode::Char('k') => self.adjust_camera(|vp| vp.pan(0, -6)),
            KeyCode::Char('j') => self.adjust_camera(|vp| vp.pan(0, 6)),
            KeyCode::Char('+') | KeyCode::Char('=') => self.adjust_camera(|vp| {
                let (cx, cy) = (vp.width as i32 / 2, vp.height as i32 / 2);
                vp.zoom_at(cx, cy, 1.0);
            }),
            KeyCode::Char('-') | KeyCode::Char('_') => self.adjust_camera(|vp| {
                let (cx, cy) = (vp.width as i32 / 2, vp.height as i32 / 2);
                vp.zoom_at(cx, cy, -1.0);
            }),
            _ => {}
        }
    }

    fn bar_key(&mut self, code: KeyCode) {
        let page = &mut self.bar;
        match code {
            KeyCode::Tab => page.focus = (page.focus + 1) % BarPage::PANES,
            KeyCode::BackTab => page.focus = (page.focus + BarPage::PANES - 1) % BarPage::PANES,
            KeyCode::Up | KeyCode::Down => {
                let step = if code == KeyCode::Down { 1 } else { -1 };
                match page.focus {
                    0 => page.cities.move_cursor(step),
                    1 => page.year.cycle(step),
                    _ => page.disasters.move_cursor(step),
                }
            }
            KeyCode::Char(' ') | KeyCode::Enter => match page.focus {
                0 => page.cities.toggle(),
                2 => page.disasters.toggle(),
                _ => {}
            },
            _ => {}
        }
    }

    fn pie_key(&mut self, code: KeyCode) {
        let page = &mut self.pie;
        match code {
            KeyCode::Tab => page.focus = (page.focus + 1) % PiePage::PANES,
            KeyCode::BackTab => page.focus = (page.focus + PiePage::PANES - 1) % PiePage::PANES,
            KeyCode::Up | KeyCode::Down => {
                let step = if code == KeyCode::Down { 1 } else { -1 };
                match page.focus {
                    0 => page.city.cycle(step),
                    1 => page.year.cycle(step),
                    _ => page.disasters.move_cursor(step),
                }
            }
            KeyCode::Char(' ') | KeyCode::Enter if page.focus == 2 => page.disasters.toggle(),
            _ => {}
        }
    }

    fn surface_key(&mut self, code: KeyCode) {
        let page = &mut self.surface;
        let panes = page.panes();
        match code {
            KeyCode::Char('v') => {
                page.view = match page.view {
                    SurfaceView::ByCities => SurfaceView::ByDisaster,
                    SurfaceView::ByDisaster => SurfaceView::ByCities,
                };
                page.focus = 0;
            }
            KeyCode::Tab => page.focus = (page.focus + 1) % panes,
            KeyCode::BackTab => page.focus = (page.focus + panes - 1) % panes,
            KeyCode::Up | KeyCode::Down => {
                let step = if code == KeyCode::Down { 1 } else { -1 };
                match (page.view, page.focus) {
                    (SurfaceView::ByCities, 0) => page.cities.move_cursor(step),
                    (SurfaceView::ByCities, _) => page.disaster.cycle(step),
                    (SurfaceView::ByDisaster, _) => page.city.cycle(step),
                }
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                if (page.view, page.focus) == (SurfaceView::ByCities, 0) {
                    page.cities.toggle();
                }
            }
            KeyCode::Char('h') => page.orbit.rotate(-0.15, 0.0),
            KeyCode::Char('l') => page.orbit.rotate(0.15, 0.0),
            KeyCode::Char('k') => page.orbit.rotate(0.0, 0.1),
            KeyCode::Char('j') => page.orbit.rotate(0.0, -0.1),
            _ => {}
        }
    }

    /// Handle mouse events for clicks, hover, panning and zooming
    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if !self.is_logged_in() {
            return;
        }
        let (col, row) = (mouse.column, mouse.row);

        if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
            if let Some(route) = ui::nav_hit(self.screen, col, row) {
                return self.dispatch(DashEvent::Navigate(route));
            }
        }

        match self.route {
            Route::Treemaps => self.treemap_mouse(mouse),
            Route::Map => self.map_mouse(mouse),
            Route::Surface3d => match mouse.kind {
                MouseEventKind::Down(MouseButton::Left) => self.last_mouse = Some((col, row)),
                MouseEventKind::Drag(MouseButton::Left) => {
                    if let Some((last_x, last_y)) = self.last_mouse {
                        let dx = col as f64 - last_x as f64;
                        let dy = last_y as f64 - row as f64;
                        self.surface.orbit.rotate(dx * 0.05, dy * 0.05);
                    }
                    self.last_mouse = Some((col, row));
                }
                MouseEventKind::Up(MouseButton::Left) => self.last_mouse = None,
                _ => {}
            },
            _ => {}
        }
    }

    fn treemap_mouse(&mut self, mouse: MouseEvent) {
        let tiles = self.treemap_tiles();
        let Some(index) = hit_test(&tiles, mouse.column, mouse.row)
            .and_then(|hit| tiles.iter().position(|t| t == hit))
        else {
            return;
        };
        match mouse.kind {
            MouseEventKind::Moved => self.treemap.focus = index,
            MouseEventKind::Down(MouseButton::Left) => {
                let level = self.treemap.nav.level();
                self.dispatch(DashEvent::treemap_click(level, tiles[index].label.clone()));
            }
            _ => {}
        }
    }

    fn map_mouse(&mut self, mouse: MouseEvent) {
        let area = self.map_canvas();
        let inside = mouse.column >= area.x
            && mouse.column < area.x + area.width
            && mouse.row >= area.y
            && mouse.row < area.y + area.height;
        // Braille gives 2x4 dots per cell
        let px = (mouse.column.saturating_sub(area.x) as i32) * 2;
        let py = (mouse.row.saturating_sub(area.y) as i32) * 4;

        match mouse.kind {
            MouseEventKind::Moved if inside => {
                let hover = self.marker_at(mouse.column - area.x, mouse.row - area.y);
                if let Some(map) = &mut self.map {
                    map.hover = hover;
                }
            }
            MouseEventKind::ScrollUp if inside => self.adjust_camera(|vp| vp.zoom_at(px, py, 1.0)),
            MouseEventKind::ScrollDown if inside => self.adjust_camera(|vp| vp.zoom_at(px, py, -1.0)),
            MouseEventKind::ScrollLeft => self.adjust_camera(|vp| vp.pan(-15, 0)),
            MouseEventKind::ScrollRight => self.adjust_camera(|vp| vp.pan(15, 0)),
            MouseEventKind::Down(MouseButton::Left) if inside => {
                self.last_mouse = Some((mouse.column, mouse.row));
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some((last_x, last_y)) = self.last_mouse {
                    let dx = (last_x as i32 - mouse.column as i32) * 2;
                    let dy = (last_y as i32 - mouse.row as i32) * 4;
                    self.adjust_camera(|vp| vp.pan(dx, dy));
                }
                self.last_mouse = Some((mouse.column, mouse.row));
            }
            MouseEventKind::Up(MouseButton::Left) => self.last_mouse = None,
            _ => {}
        }
    }

    fn map_canvas(&self) -> Rect {
        ui::map::canvas_area(ui::body_area(self.screen))
    }

    fn map_viewport(&self) -> Option<Viewport> {
        let area = self.map_canvas();
        self.map.as_ref().map(|m| {
            Viewport::new(m.view.camera(), area.width as usize * 2, area.height as usize * 4)
        })
    }

    /// Marker under a cell of the map canvas
    fn marker_at(&self, col: u16, row: u16) -> Option<&'static str> {
        let viewport = self.map_viewport()?;
        let frame = self.map_frame()?;
        frame.markers.iter().map(|m| m.city).find_map(|city| {
            let (px, py) = viewport.project(city.coord);
            (px >= 0 && py >= 0 && (px / 2) as u16 == col && (py / 4) as u16 == row).then_some(city.name)
        })
    }

    /// Pan or zoom from the camera the map currently shows
    fn adjust_camera(&mut self, f: impl FnOnce(&mut Viewport)) {
        let Some(mut viewport) = self.map_viewport() else {
            return;
        };
        f(&mut viewport);
        self.dispatch(DashEvent::UserCamera(viewport.camera));
    }
}

fn first_leaf(tiles: &[Tile]) -> usize {
    tiles.iter().position(|t| t.leaf.is_some()).unwrap_or(0)
}

/// Neighbour of `current` in `options`, wrapping
fn step_value<T: Clone + PartialEq>(options: &[T], current: &T, step: isize) -> Option<T> {
    if options.is_empty() {
        return None;
    }
    let n = options.len() as isize;
    let i = options.iter().position(|o| o == current).unwrap_or(0) as isize;
    options.get((i + step).rem_euclid(n) as usize).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::tests::sample_table;
    use crate::map::controller::CITY_ZOOM;
    use crate::treemap::Level;

    fn app() -> App {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            export_dir: dir.into_path(),
            ..Settings::default()
        };
        let mut app = App::new(settings, sample_table(), None, MapRenderer::new());
        app.resize(120, 40);
        app
    }

    fn logged_in() -> App {
        let mut app = app();
        app.dispatch(DashEvent::Signup {
            email: "a@x.com".into(),
            password: "pw1".into(),
        });
        app.dispatch(DashEvent::Login {
            email: "a@x.com".into(),
            password: "pw1".into(),
        });
        app
    }

    #[test]
    fn test_routes_gated_until_login() {
        let mut app = app();
        app.dispatch(DashEvent::Navigate(Route::Treemaps));
        assert_eq!(app.route(), Route::Home);
        assert!(!app.is_logged_in());

        app.dispatch(DashEvent::Login {
            email: "a@x.com".into(),
            password: "pw1".into(),
        });
        assert_eq!(app.login.message.as_deref(), Some("Invalid login"));

        let mut app = logged_in();
        assert_eq!(app.login.message.as_deref(), Some("Login successful!"));
        app.dispatch(DashEvent::Navigate(Route::Treemaps));
        assert_eq!(app.route(), Route::Treemaps);
    }

    #[test]
    fn test_login_form_keys() {
        let mut app = app();
        for c in "a@x.com".chars() {
            app.handle_key(KeyCode::Char(c));
        }
        app.handle_key(KeyCode::Tab);
        for c in "pw1".chars() {
            app.handle_key(KeyCode::Char(c));
        }
        app.handle_key(KeyCode::Tab);
        app.handle_key(KeyCode::Tab);
        app.handle_key(KeyCode::Enter);
        assert_eq!(app.login.message.as_deref(), Some("Signup successful!"));
        assert!(app.is_logged_in());
        assert_eq!(app.user_email(), Some("a@x.com"));
    }

    #[test]
    fn test_login_button_after_logout() {
        let mut app = app();
        app.dispatch(DashEvent::Signup {
            email: "a@x.com".into(),
            password: "pw1".into(),
        });
        app.dispatch(DashEvent::Navigate(Route::Logout));
        assert!(!app.is_logged_in());

        for c in "a@x.com".chars() {
            app.handle_key(KeyCode::Char(c));
        }
        app.handle_key(KeyCode::Tab);
        for c in "pw1".chars() {
            app.handle_key(KeyCode::Char(c));
        }
        app.handle_key(KeyCode::Tab);
        app.handle_key(KeyCode::Enter);
        assert_eq!(app.login.message.as_deref(), Some("Login successful!"));
        assert!(app.is_logged_in());
    }

    #[test]
    fn test_signup_opens_start_page() {
        let mut app = App::new(
            Settings {
                start_page: Route::Map,
                ..Settings::default()
            },
            sample_table(),
            None,
            MapRenderer::new(),
        );
        app.dispatch(DashEvent::Signup {
            email: "a@x.com".into(),
            password: "pw1".into(),
        });
        assert!(app.is_logged_in());
        assert_eq!(app.route(), Route::Map);
        assert!(app.map.is_some());

        app.dispatch(DashEvent::Navigate(Route::Logout));
        app.dispatch(DashEvent::Signup {
            email: "a@x.com".into(),
            password: "pw2".into(),
        });
        assert_eq!(app.login.message.as_deref(), Some("User already exists"));
        assert!(!app.is_logged_in());
    }

    #[test]
    fn test_treemap_clicks_only_on_treemap_page() {
        let mut app = logged_in();
        app.dispatch(DashEvent::ClickYear("2026".into()));
        assert_eq!(app.treemap.nav.level(), Level::Year);

        app.dispatch(DashEvent::Navigate(Route::Treemaps));
        app.dispatch(DashEvent::ClickYear("2026".into()));
        app.dispatch(DashEvent::ClickMonth("2026-02".into()));
        assert_eq!(app.treemap.nav.level(), Level::City);

        // hidden chart
        app.dispatch(DashEvent::ClickYear("2027".into()));
        assert_eq!(app.treemap.nav.level(), Level::City);
    }

    #[test]
    fn test_treemap_reset_on_remount_and_logout() {
        let mut app = logged_in();
        app.dispatch(DashEvent::Navigate(Route::Treemaps));
        app.dispatch(DashEvent::ClickYear("2026".into()));
        app.dispatch(DashEvent::Navigate(Route::Home));
        app.dispatch(DashEvent::Navigate(Route::Treemaps));
        assert_eq!(app.treemap.nav.level(), Level::Year);

        app.dispatch(DashEvent::ClickYear("2026".into()));
        app.dispatch(DashEvent::Navigate(Route::Logout));
        assert!(!app.is_logged_in());
        assert_eq!(app.treemap.nav.level(), Level::Year);
    }

    #[test]
    fn test_treemap_keyboard_drill_and_back() {
        let mut app = logged_in();
        app.dispatch(DashEvent::Navigate(Route::Treemaps));
        // first leaf is the first year
        app.handle_key(KeyCode::Enter);
        assert_eq!(app.treemap.nav.state().selected_year.as_deref(), Some("2026"));
        app.handle_key(KeyCode::Backspace);
        assert_eq!(app.treemap.nav.level(), Level::Year);
    }

    #[test]
    fn test_treemap_mouse_click_uses_hit_test() {
        let mut app = logged_in();
        app.dispatch(DashEvent::Navigate(Route::Treemaps));
        let tile = app.treemap_tiles()[0].clone();
        app.handle_mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: tile.rect.x,
            row: tile.rect.y,
            modifiers: crossterm::event::KeyModifiers::NONE,
        });
        assert_eq!(app.treemap.nav.state().selected_year.as_deref(), Some(tile.label.as_str()));
    }

    #[test]
    fn test_map_state_lifecycle() {
        let mut app = logged_in();
        app.dispatch(DashEvent::Navigate(Route::Map));
        let map = app.map.as_ref().unwrap();
        assert_eq!(map.view.selected_year, 2026);
        assert!(!map.month_timer.is_enabled());
        assert!(map.blink_timer.is_enabled());

        app.dispatch(DashEvent::TogglePlay);
        assert!(app.map.as_ref().unwrap().month_timer.is_enabled());
        app.dispatch(DashEvent::Tick);
        assert_eq!(app.map.as_ref().unwrap().view.current_month, 2);

        app.dispatch(DashEvent::Navigate(Route::Home));
        assert!(app.map.is_none());
        app.dispatch(DashEvent::Navigate(Route::Map));
        assert_eq!(app.map.as_ref().unwrap().view.current_month, 1);
    }

    #[test]
    fn test_paused_map_ignores_tick_but_blinks() {
        let mut app = logged_in();
        app.dispatch(DashEvent::Navigate(Route::Map));
        app.dispatch(DashEvent::Tick);
        app.dispatch(DashEvent::BlinkTick);
        let view = &app.map.as_ref().unwrap().view;
        assert_eq!(view.current_month, 1);
        assert!(view.blink_phase);
    }

    #[test]
    fn test_poll_timers_drives_blink() {
        let mut app = logged_in();
        app.dispatch(DashEvent::Navigate(Route::Map));
        let later = Instant::now() + Duration::from_secs(5);
        app.poll_timers(later);
        let view = &app.map.as_ref().unwrap().view;
        assert!(view.blink_phase);
        assert_eq!(view.current_month, 1);
        assert!(app.poll_timeout(later) <= MAX_POLL);
    }

    #[test]
    fn test_map_pan_locked_while_city_focused() {
        let mut app = logged_in();
        app.dispatch(DashEvent::Navigate(Route::Map));
        app.handle_key(KeyCode::Char('l'));
        assert!(app.map.as_ref().unwrap().view.user_camera.is_some());

        app.dispatch(DashEvent::SetCityFilter(CityFilter::parse("Tokyo").unwrap()));
        app.handle_key(KeyCode::Char('+'));
        assert_eq!(app.map.as_ref().unwrap().view.camera().zoom, CITY_ZOOM);
        assert_eq!(app.status.as_deref(), Some("View locked to Tokyo"));
    }

    #[test]
    fn test_map_keys() {
        let mut app = logged_in();
        app.dispatch(DashEvent::Navigate(Route::Map));
        app.handle_key(KeyCode::Left);
        assert_eq!(app.map.as_ref().unwrap().view.current_month, 1);
        app.handle_key(KeyCode::Right);
        app.handle_key(KeyCode::Char('c'));
        app.handle_key(KeyCode::Char(' '));
        let view = &app.map.as_ref().unwrap().view;
        assert_eq!(view.current_month, 2);
        assert_ne!(view.city_filter, CityFilter::All);
        assert!(view.playing);
    }

    #[test]
    fn test_map_year_keys_cycle_loaded_years() {
        use crate::data::{read_year, tests::SAMPLE_2026};
        let mut records = read_year(SAMPLE_2026.as_bytes(), 2026).unwrap();
        records.extend(read_year(SAMPLE_2026.as_bytes(), 2028).unwrap());
        let mut app = App::new(Settings::default(), DisasterTable::new(records), None, MapRenderer::new());
        app.dispatch(DashEvent::Signup {
            email: "a@x.com".into(),
            password: "pw1".into(),
        });
        app.dispatch(DashEvent::Navigate(Route::Map));

        app.handle_key(KeyCode::Char(']'));
        assert_eq!(app.map.as_ref().unwrap().view.selected_year, 2028);
        app.handle_key(KeyCode::Char(']'));
        assert_eq!(app.map.as_ref().unwrap().view.selected_year, 2026);
        app.handle_key(KeyCode::Char('['));
        assert_eq!(app.map.as_ref().unwrap().years.selected(), Some(&2028));

        // Years without rows are not offered
        app.dispatch(DashEvent::SetMapYear(2027));
        assert_eq!(app.map.as_ref().unwrap().view.selected_year, 2028);
    }

    #[test]
    fn test_bar_page_defaults_and_pdf() {
        let mut app = logged_in();
        app.dispatch(DashEvent::Navigate(Route::BarCharts));
        assert_eq!(app.bar.cities.checked(), vec!["Houston".to_string()]);
        assert!(app.bar_figure().ready().is_some());

        app.dispatch(DashEvent::Export(ExportKind::Pdf));
        let path = app.settings().export_dir.join("weather_report.pdf");
        assert!(path.exists());
        assert!(app.status.as_deref().unwrap_or_default().starts_with("Saved"));
    }

    #[test]
    fn test_export_without_figure_is_noop() {
        let mut app = logged_in();
        app.dispatch(DashEvent::Navigate(Route::PieChart));
        assert_eq!(app.pie.city.selected().map(String::as_str), Some("Tokyo"));
        assert!(app.pie_figure().ready().is_some());

        // uncheck Flood and Typhoon
        for code in [KeyCode::Tab, KeyCode::Tab, KeyCode::Char(' '), KeyCode::Down, KeyCode::Char(' ')] {
            app.handle_key(code);
        }
        assert!(app.pie.disasters.checked().is_empty());
        app.handle_key(KeyCode::Char('p'));
        assert_eq!(app.status.as_deref(), Some("Nothing to export"));
        assert!(!app.settings().export_dir.join("pie_chart.pdf").exists());
    }

    #[test]
    fn test_snapshot_export_of_treemap() {
        let mut app = logged_in();
        app.dispatch(DashEvent::Navigate(Route::Treemaps));
        app.handle_key(KeyCode::Char('e'));
        let path = app.settings().export_dir.join("treemaps.txt");
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.contains("Select Year"));
    }

    #[test]
    fn test_number_keys_navigate() {
        let mut app = logged_in();
        app.handle_key(KeyCode::Char('6'));
        assert_eq!(app.route(), Route::Map);
        app.handle_key(KeyCode::Char('7'));
        assert!(!app.is_logged_in());
    }
}
