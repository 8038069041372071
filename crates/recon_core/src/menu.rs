//! Selection menus.
//!
//! The editor shows three pickers: the slash-command menu, the link-type menu
//! and the page selector. They share the same keyboard model: up and down
//! wrap around, Enter confirms the highlighted item, Escape cancels. A menu
//! only ever *yields* a choice; the caller applies it, so cancelling commits
//! nothing.

use crate::block::LinkType;
use crate::protocol::{SlashCommand, filter_commands};

/// A list of items with one highlighted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Menu<T> {
    items: Vec<T>,
    selected: usize,
}

impl<T> Menu<T> {
    /// A menu over `items` with the first one highlighted.
    pub fn new(items: Vec<T>) -> Self {
        Self { items, selected: 0 }
    }

    /// All items, in order.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Whether there is nothing to pick.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Index of the highlighted item.
    pub fn selected_index(&self) -> usize {
        self.selected
    }

    /// The highlighted item.
    pub fn selected(&self) -> Option<&T> {
        self.items.get(self.selected)
    }

    /// Move the highlight down, wrapping to the top.
    pub fn select_next(&mut self) {
        if !self.items.is_empty() {
            self.selected = (self.selected + 1) % self.items.len();
        }
    }

    /// Move the highlight up, wrapping to the bottom.
    pub fn select_previous(&mut self) {
        if !self.items.is_empty() {
            self.selected = self
                .selected
                .checked_sub(1)
                .unwrap_or(self.items.len() - 1);
        }
    }

    /// Highlight an item directly (mouse hover). Out of range is ignored.
    pub fn select(&mut self, index: usize) {
        if index < self.items.len() {
            self.selected = index;
        }
    }

    /// Take the highlighted item. `None` if the menu is empty.
    pub fn confirm(mut self) -> Option<T> {
        if self.selected < self.items.len() {
            Some(self.items.swap_remove(self.selected))
        } else {
            None
        }
    }

    /// Close without choosing.
    pub fn cancel(self) -> Option<T> {
        None
    }

    fn replace_items(&mut self, items: Vec<T>) {
        self.items = items;
        self.selected = 0;
    }
}

impl Menu<LinkType> {
    /// The link-type menu: page, then URL.
    pub fn link_types() -> Self {
        Self::new(vec![LinkType::Page, LinkType::Url])
    }
}

impl Menu<String> {
    /// The page selector over the given document titles.
    pub fn pages(titles: Vec<String>) -> Self {
        Self::new(titles)
    }
}

/// The slash-command menu: a [`Menu`] filtered by the text typed after `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMenu {
    query: String,
    menu: Menu<SlashCommand>,
}

impl Default for CommandMenu {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandMenu {
    /// An open menu with an empty query, listing every command.
    pub fn new() -> Self {
        Self {
            query: String::new(),
            menu: Menu::new(filter_commands("")),
        }
    }

    /// The typed query.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// The commands matching the query.
    pub fn commands(&self) -> &[SlashCommand] {
        self.menu.items()
    }

    /// The highlighted command.
    pub fn selected(&self) -> Option<SlashCommand> {
        self.menu.selected().copied()
    }

    /// Append a typed character; the highlight returns to the top.
    pub fn push(&mut self, c: char) {
        self.query.push(c);
        self.refilter();
    }

    /// Remove the last typed character. Returns `false` when the query was
    /// already empty.
    pub fn pop(&mut self) -> bool {
        if self.query.pop().is_none() {
            return false;
        }
        self.refilter();
        true
    }

    /// Move the highlight down.
    pub fn select_next(&mut self) {
        self.menu.select_next();
    }

    /// Move the highlight up.
    pub fn select_previous(&mut self) {
        self.menu.select_previous();
    }

    /// Take the highlighted command. `None` when nothing matches.
    pub fn confirm(self) -> Option<SlashCommand> {
        self.menu.confirm()
    }

    /// Close without choosing.
    pub fn cancel(self) -> Option<SlashCommand> {
        None
    }

    fn refilter(&mut self) {
        self.menu.replace_items(filter_commands(&self.query));
    }
}
