//! Generic item list shown over the play screen.
//!
//! Used for viewing the inventory, and for picking items to drop, pick up
//! or eat. Rows are lettered by their index in the list, so absent entries
//! keep the letters of the others stable.

use std::collections::{BTreeMap, BTreeSet};

use hecs::Entity;
use tracing::debug;

use items::Item;

use super::{Screen, ScreenContext, ScreenId};
use crate::input::{InputEvent, KeyCode};
use crate::renderer::Display;

const LETTERS: &str = "abcdefghijklmnopqrstuvwxyz";

/// Selected items by list index.
pub type Selection = BTreeMap<usize, Item>;

/// Completion callback. Returning `true` means the player's turn is used up.
pub type OkFn = Box<dyn FnMut(&mut ScreenContext, Entity, &Selection) -> bool>;

pub struct ItemListScreen {
    caption: String,
    ok: OkFn,
    can_select: bool,
    can_select_multiple: bool,
    owner: Option<Entity>,
    items: Vec<Option<Item>>,
    selected: BTreeSet<usize>,
}

impl std::fmt::Debug for ItemListScreen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemListScreen")
            .field("caption", &self.caption)
            .field("can_select", &self.can_select)
            .field("can_select_multiple", &self.can_select_multiple)
            .field("items", &self.items.len())
            .field("selected", &self.selected)
            .finish()
    }
}

impl ItemListScreen {
    pub fn new(
        caption: impl Into<String>,
        can_select: bool,
        can_select_multiple: bool,
        ok: impl FnMut(&mut ScreenContext, Entity, &Selection) -> bool + 'static,
    ) -> Self {
        Self {
            caption: caption.into(),
            ok: Box::new(ok),
            can_select,
            can_select_multiple,
            owner: None,
            items: Vec::new(),
            selected: BTreeSet::new(),
        }
    }

    /// A list that only shows items.
    pub fn viewer(caption: impl Into<String>) -> Self {
        Self::new(caption, false, false, |_, _, _| false)
    }

    /// Must be called before the list is opened. Clears any selection.
    pub fn setup(&mut self, owner: Entity, items: Vec<Option<Item>>) {
        self.owner = Some(owner);
        self.items = items;
        self.selected.clear();
    }

    fn cancel(&mut self, ctx: &mut ScreenContext) {
        ctx.close_sub_screen();
    }

    fn execute_ok(&mut self, ctx: &mut ScreenContext) {
        let selection: Selection = self
            .selected
            .iter()
            .filter_map(|&i| self.items.get(i).cloned().flatten().map(|item| (i, item)))
            .collect();
        ctx.close_sub_screen();

        let Some(owner) = self.owner else {
            return;
        };
        if (self.ok)(ctx, owner, &selection) {
            ctx.gate.unlock();
        }
        debug!(caption = %self.caption, selected = selection.len(), "item_list_ok");
    }

    fn toggle(&mut self, index: usize) {
        if !self.selected.remove(&index) {
            self.selected.insert(index);
        }
    }
}

impl Screen for ItemListScreen {
    fn id(&self) -> ScreenId {
        ScreenId::ItemList
    }

    fn render(&mut self, _ctx: &ScreenContext, display: &mut dyn Display) {
        display.draw_text(0, 0, &self.caption);
        let mut row = 0;
        for (i, (letter, item)) in LETTERS.chars().zip(&self.items).enumerate() {
            let Some(item) = item else {
                continue;
            };
            let ticked = self.can_select_multiple && self.selected.contains(&i);
            let marker = if self.can_select && ticked { '+' } else { '-' };
            display.draw_text(0, 2 + row, &format!("{} {} {}", letter, marker, item.describe()));
            row += 1;
        }
    }

    fn handle_input(&mut self, ctx: &mut ScreenContext, event: &InputEvent) {
        let InputEvent::KeyDown(code) = *event else {
            return;
        };
        match code {
            KeyCode::Esc => self.cancel(ctx),
            KeyCode::Enter if !self.can_select || self.selected.is_empty() => self.cancel(ctx),
            KeyCode::Enter => self.execute_ok(ctx),
            KeyCode::Char(c) if self.can_select && c.is_ascii_lowercase() => {
                let index = (c as u8 - b'a') as usize;
                if !matches!(self.items.get(index), Some(Some(_))) {
                    return;
                }
                if self.can_select_multiple {
                    self.toggle(index);
                    ctx.request_refresh();
                } else {
                    self.selected.insert(index);
                    self.execute_ok(ctx);
                }
            }
            _ => {}
        }
    }
}
