//! Keyboard-driven form controls shared by the chart pages.

/// Single-select list; nothing is selected only when there are no options
#[derive(Debug, Clone, PartialEq)]
pub struct Dropdown<T> {
    options: Vec<T>,
    selected: Option<usize>,
}

impl<T: Clone + PartialEq> Dropdown<T> {
    /// Starts on the first option, if any
    pub fn new(options: Vec<T>) -> Self {
        let selected = if options.is_empty() { None } else { Some(0) };
        Self { options, selected }
    }

    pub fn selected(&self) -> Option<&T> {
        self.selected.and_then(|i| self.options.get(i))
    }

    pub fn select(&mut self, value: &T) -> bool {
        match self.options.iter().position(|o| o == value) {
            Some(i) => {
                self.selected = Some(i);
                true
            }
            None => false,
        }
    }

    /// Step through the options, wrapping at either end
    pub fn cycle(&mut self, step: isize) {
        if self.options.is_empty() {
            return;
        }
        let n = self.options.len() as isize;
        let current = self.selected.unwrap_or(0) as isize;
        self.selected = Some((current + step).rem_euclid(n) as usize);
    }
}

/// Multi-select list with a cursor
#[derive(Debug, Clone, PartialEq)]
pub struct Checklist {
    items: Vec<(String, bool)>,
    cursor: usize,
}

impl Checklist {
    pub fn new(items: impl IntoIterator<Item = String>, checked: bool) -> Self {
        Self {
            items: items.into_iter().map(|i| (i, checked)).collect(),
            cursor: 0,
        }
    }

    pub fn items(&self) -> &[(String, bool)] {
        &self.items
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Checked items in list order
    pub fn checked(&self) -> Vec<String> {
        self.items
            .iter()
            .filter(|(_, on)| *on)
            .map(|(item, _)| item.clone())
            .collect()
    }

    pub fn move_cursor(&mut self, step: isize) {
        if self.items.is_empty() {
            return;
        }
        let n = self.items.len() as isize;
        self.cursor = (self.cursor as isize + step).rem_euclid(n) as usize;
    }

    pub fn toggle(&mut self) {
        if let Some((_, on)) = self.items.get_mut(self.cursor) {
            *on = !*on;
        }
    }

    pub fn set(&mut self, item: &str, on: bool) {
        if let Some(entry) = self.items.iter_mut().find(|(i, _)| i == item) {
            entry.1 = on;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dropdown_cycle_wraps() {
        let mut d = Dropdown::new(vec![2026, 2027, 2028]);
        assert_eq!(d.selected(), Some(&2026));
        d.cycle(-1);
        assert_eq!(d.selected(), Some(&2028));
        d.cycle(1);
        assert_eq!(d.selected(), Some(&2026));
    }

    #[test]
    fn test_empty_dropdown_stays_unselected() {
        let mut d: Dropdown<i32> = Dropdown::new(Vec::new());
        d.cycle(1);
        assert!(d.selected().is_none());
        assert!(!d.select(&2026));
    }

    #[test]
    fn test_dropdown_select_unknown() {
        let mut d = Dropdown::new(vec!["Tokyo"]);
        assert!(!d.select(&"Atlantis"));
        assert_eq!(d.selected(), Some(&"Tokyo"));
    }

    #[test]
    fn test_dropdown_select_then_cycle() {
        let mut d = Dropdown::new(vec![2026, 2027, 2028]);
        assert!(d.select(&2028));
        d.cycle(1);
        assert_eq!(d.selected(), Some(&2026));
    }

    #[test]
    fn test_checklist_toggle() {
        let mut c = Checklist::new(["Flood".to_string(), "Storm".to_string()], true);
        c.move_cursor(1);
        c.toggle();
        assert_eq!(c.checked(), vec!["Flood".to_string()]);
        c.move_cursor(1);
        assert_eq!(c.cursor(), 0);
        c.set("Storm", true);
        assert_eq!(c.checked().len(), 2);
    }
}
