//! Drill-down navigation over the year -> month -> city -> disaster hierarchy.
//!
//! [`NavigationState::transition`] is the whole state machine: a pure function
//! of the previous state, the chart that was clicked and the clicked label.
//! [`TreemapNavigator`] wraps it with the four figure slots the page draws.

use crate::data::{parse_month, DisasterTable};
use crate::treemap::figure::TreemapFigure;
use std::fmt;

/// Which of the four charts is visible. Also names the chart a click came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Level {
    Year,
    Month,
    City,
    Disaster,
}

impl Level {
    pub const ALL: [Level; 4] = [Level::Year, Level::Month, Level::City, Level::Disaster];

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Level::Year => "year",
            Level::Month => "month",
            Level::City => "city",
            Level::Disaster => "disaster",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NavigationState {
    pub selected_year: Option<String>,
    pub selected_month: Option<String>,
    pub selected_city: Option<String>,
}

impl NavigationState {
    /// Level implied by how many selections are set
    pub fn level(&self) -> Level {
        match (&self.selected_year, &self.selected_month, &self.selected_city) {
            (None, _, _) => Level::Year,
            (Some(_), None, _) => Level::Month,
            (Some(_), Some(_), None) => Level::City,
            (Some(_), Some(_), Some(_)) => Level::Disaster,
        }
    }

    /// Apply a click on `trigger`'s chart. `None` means the click is ignored.
    pub fn transition(&self, years: &[String], trigger: Level, label: &str) -> Option<NavigationState> {
        if trigger != self.level() || label.is_empty() {
            return None;
        }
        let is_year = |l: &str| years.iter().any(|y| y == l);

        match trigger {
            Level::Year => is_year(label).then(|| NavigationState {
                selected_year: Some(label.to_string()),
                ..Default::default()
            }),
            Level::Month => {
                if is_year(label) {
                    return Some(NavigationState::default());
                }
                let year = self.selected_year.as_deref()?;
                let (month_year, _) = parse_month(label).ok()?;
                (month_year.to_string() == year).then(|| NavigationState {
                    selected_year: Some(year.to_string()),
                    selected_month: Some(label.to_string()),
                    selected_city: None,
                })
            }
            Level::City => {
                if self.selected_month.as_deref() == Some(label) {
                    Some(NavigationState {
                        selected_year: self.selected_year.clone(),
                        ..Default::default()
                    })
                } else {
                    Some(NavigationState {
                        selected_city: Some(label.to_string()),
                        ..self.clone()
                    })
                }
            }
            Level::Disaster => (self.selected_city.as_deref() == Some(label)).then(|| NavigationState {
                selected_city: None,
                ..self.clone()
            }),
        }
    }
}

/// Treemap page state: the selections plus one figure slot per level
pub struct TreemapNavigator {
    years: Vec<String>,
    state: NavigationState,
    figures: [TreemapFigure; 4],
}

impl TreemapNavigator {
    /// Initial render: nothing selected, year chart visible
    pub fn new(years: Vec<String>, table: &DisasterTable) -> Self {
        let mut nav = Self {
            years,
            state: NavigationState::default(),
            figures: Default::default(),
        };
        nav.rebuild(table);
        nav
    }

    pub fn years(&self) -> &[String] {
        &self.years
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn level(&self) -> Level {
        self.state.level()
    }

    pub fn is_visible(&self, level: Level) -> bool {
        self.level() == level
    }

    pub fn figure(&self, level: Level) -> &TreemapFigure {
        &self.figures[level.index()]
    }

    pub fn visible_figure(&self) -> &TreemapFigure {
        self.figure(self.level())
    }

    /// Back to the year chart with nothing selected
    pub fn reset(&mut self, table: &DisasterTable) {
        self.state = NavigationState::default();
        self.rebuild(table);
    }

    /// Handle a click. Returns true when the state changed and figures were rebuilt.
    pub fn click(&mut self, trigger: Level, label: &str, table: &DisasterTable) -> bool {
        match self.state.transition(&self.years, trigger, label) {
            Some(next) => {
                tracing::debug!(%trigger, label, from = %self.level(), to = %next.level(), "treemap transition");
                self.state = next;
                self.rebuild(table);
                true
            }
            None => {
                tracing::trace!(%trigger, label, "treemap click ignored");
                false
            }
        }
    }

    /// Fill slots up to the current level; deeper slots get the empty placeholder
    fn rebuild(&mut self, table: &DisasterTable) {
        let state = &self.state;
        let level = state.level();
        let year = state.selected_year.as_deref();
        let year_num = year.and_then(|y| y.parse::<i32>().ok()).unwrap_or_default();
        let month = state.selected_month.as_deref();
        let city = state.selected_city.as_deref();

        self.figures = Level::ALL.map(|slot| {
            if slot > level {
                return TreemapFigure::placeholder();
            }
            match (slot, year, month, city) {
                (Level::Year, ..) => TreemapFigure::years(&self.years),
                (Level::Month, Some(y), ..) => TreemapFigure::months(y),
                (Level::City, Some(_), Some(m), _) => TreemapFigure::cities(table, year_num, m),
                (Level::Disaster, Some(_), Some(m), Some(c)) => {
                    TreemapFigure::disasters(table, year_num, m, c)
                }
                _ => TreemapFigure::placeholder(),
            }
        });
    }
}
