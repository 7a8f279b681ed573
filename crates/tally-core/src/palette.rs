//! Ordinal colour scale over record names.
//!
//! Colours are assigned by position of a name in the domain, cycling through
//! the range. Names not yet in the domain are appended on first lookup, so a
//! colour is always available.

/// The twelve-colour `Set3` qualitative scheme.
pub const SCHEME_SET3: [&str; 12] = [
    "#8dd3c7", "#ffffb3", "#bebada", "#fb8072", "#80b1d3", "#fdb462", "#b3de69", "#fccde5",
    "#d9d9d9", "#bc80bd", "#ccebc5", "#ffed6f",
];

/// Ordinal scale from names to colours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    range: Vec<String>,
    domain: Vec<String>,
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Palette {
    /// Build a scale over `range`. An empty range falls back to
    /// [`SCHEME_SET3`].
    pub fn new(range: Vec<String>) -> Self {
        let range = if range.is_empty() {
            SCHEME_SET3.iter().map(|&c| c.to_owned()).collect()
        } else {
            range
        };
        Self {
            range,
            domain: Vec::new(),
        }
    }

    /// Replace the domain. Duplicate names keep their first position.
    pub fn set_domain<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) {
        self.domain.clear();
        for name in names {
            if !self.domain.iter().any(|d| d == name) {
                self.domain.push(name.to_owned());
            }
        }
    }

    /// Colour for `name`, growing the domain if the name is new.
    pub fn colour(&mut self, name: &str) -> String {
        let position = match self.domain.iter().position(|d| d == name) {
            Some(position) => position,
            None => {
                self.domain.push(name.to_owned());
                self.domain.len().saturating_sub(1)
            }
        };
        self.colour_at(position)
    }

    /// The current domain in order.
    pub fn domain(&self) -> &[String] {
        &self.domain
    }

    fn colour_at(&self, position: usize) -> String {
        position
            .checked_rem(self.range.len())
            .and_then(|i| self.range.get(i))
            .cloned()
            .unwrap_or_default()
    }
}
