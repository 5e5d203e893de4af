//! Name-addressed mutation of the item tree.
//!
//! Every operation searches depth-first in child order and only descends
//! into container items. The first item whose name matches wins.
//!
//! ## Search order
//!
//! - **Move / delete / lookup**: each child's name is checked before
//!   recursing into that child, so the search is a plain preorder walk.
//!
//! - **Insert before / after**: the direct children of a container are
//!   checked first, then the search recurses into each child container.
//!
//! Moves only ever swap with a neighbour in the sibling list that holds
//! the match; items never change parent through a move.

use crate::item::Item;

impl Item {
    /// Append a child while building a tree. Marks this item a container.
    pub fn add_child(&mut self, mut child: Item) {
        child.parent = Some(self.name.clone());
        self.container = true;
        self.children.push(child);
    }

    /// Swap the named item with its previous sibling.
    ///
    /// Returns whether the item was found; an item already first in its
    /// parent stays put and still counts as found.
    pub fn move_child_up(&mut self, name: &str) -> bool {
        for i in 0..self.children.len() {
            if self.children[i].name == name {
                if i > 0 {
                    self.children.swap(i - 1, i);
                    log::debug!("Moved \"{}\" up in \"{}\"", name, self.name);
                }
                return true;
            }
            if self.children[i].container && self.children[i].move_child_up(name) {
                return true;
            }
        }
        false
    }

    /// Swap the named item with its next sibling. See [`move_child_up`].
    ///
    /// [`move_child_up`]: Item::move_child_up
    pub fn move_child_down(&mut self, name: &str) -> bool {
        for i in 0..self.children.len() {
            if self.children[i].name == name {
                if i + 1 < self.children.len() {
                    self.children.swap(i, i + 1);
                    log::debug!("Moved \"{}\" down in \"{}\"", name, self.name);
                }
                return true;
            }
            if self.children[i].container && self.children[i].move_child_down(name) {
                return true;
            }
        }
        false
    }

    /// Insert `item` at runtime.
    ///
    /// With an empty `before`, the item is appended to the container named
    /// `parent`. Otherwise it goes immediately before the item named
    /// `before`, wherever that lives, and `parent` is ignored. On failure
    /// the item is handed back.
    pub fn add_runtime_child(&mut self, parent: &str, before: &str, item: Item) -> Result<(), Item> {
        if parent.is_empty() && before.is_empty() {
            return Err(item);
        }
        let mut slot = Some(item);
        self.insert_runtime(parent, before, &mut slot);
        match slot {
            None => Ok(()),
            Some(item) => Err(item),
        }
    }

    fn insert_runtime(&mut self, parent: &str, before: &str, slot: &mut Option<Item>) -> bool {
        if before.is_empty() {
            if self.name == parent {
                if let Some(item) = slot.take() {
                    log::debug!("Appending \"{}\" to \"{}\"", item.name, self.name);
                    self.add_child(item);
                    return true;
                }
                return false;
            }
        } else if let Some(index) = self.children.iter().position(|c| c.name == before) {
            if let Some(item) = slot.take() {
                log::debug!("Inserting \"{}\" before \"{}\"", item.name, before);
                self.insert_at(index, item);
                return true;
            }
            return false;
        }

        self.children
            .iter_mut()
            .filter(|child| child.container)
            .any(|child| child.insert_runtime(parent, before, slot))
    }

    /// Insert `item` immediately after the item named `prev`. On failure
    /// the item is handed back.
    pub fn add_child_after(&mut self, prev: &str, item: Item) -> Result<(), Item> {
        if prev.is_empty() {
            return Err(item);
        }
        let mut slot = Some(item);
        self.insert_after(prev, &mut slot);
        match slot {
            None => Ok(()),
            Some(item) => Err(item),
        }
    }

    fn insert_after(&mut self, prev: &str, slot: &mut Option<Item>) -> bool {
        if let Some(index) = self.children.iter().position(|c| c.name == prev) {
            if let Some(item) = slot.take() {
                log::debug!("Inserting \"{}\" after \"{}\"", item.name, prev);
                self.insert_at(index + 1, item);
                return true;
            }
            return false;
        }

        self.children
            .iter_mut()
            .filter(|child| child.container)
            .any(|child| child.insert_after(prev, slot))
    }

    fn insert_at(&mut self, index: usize, mut item: Item) {
        item.parent = Some(self.name.clone());
        self.container = true;
        self.children.insert(index, item);
    }

    /// Remove the named item and its whole subtree. Returns whether
    /// anything was deleted.
    pub fn delete_child(&mut self, name: &str) -> bool {
        for i in 0..self.children.len() {
            if self.children[i].name == name {
                let removed = self.children.remove(i);
                log::debug!("Deleted \"{}\" from \"{}\"", removed.name, self.name);
                return true;
            }
            if self.children[i].container && self.children[i].delete_child(name) {
                return true;
            }
        }
        false
    }

    /// Remove every child of this item.
    pub fn delete_children(&mut self) {
        self.children.clear();
    }

    pub fn get_child(&self, name: &str) -> Option<&Item> {
        for child in &self.children {
            if child.name == name {
                return Some(child);
            }
            if child.container {
                if let Some(found) = child.get_child(name) {
                    return Some(found);
                }
            }
        }
        None
    }

    pub fn get_child_mut(&mut self, name: &str) -> Option<&mut Item> {
        for child in &mut self.children {
            if child.name == name {
                return Some(child);
            }
            if child.container {
                if let Some(found) = child.get_child_mut(name) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// This item if it has the name, else the first descendant that does.
    pub fn find_mut(&mut self, name: &str) -> Option<&mut Item> {
        if self.name == name {
            Some(self)
        } else {
            self.get_child_mut(name)
        }
    }

    pub fn find(&self, name: &str) -> Option<&Item> {
        if self.name == name {
            Some(self)
        } else {
            self.get_child(name)
        }
    }

    /// Names of the direct children, in order.
    pub fn child_names(&self) -> Vec<&str> {
        self.children.iter().map(|c| c.name.as_str()).collect()
    }

    /// Visit this item and every descendant in preorder.
    pub fn walk(&self, f: &mut dyn FnMut(&Item)) {
        f(self);
        for child in &self.children {
            child.walk(f);
        }
    }

    pub fn walk_mut(&mut self, f: &mut dyn FnMut(&mut Item)) {
        f(self);
        for child in &mut self.children {
            child.walk_mut(f);
        }
    }

    /// Visit every item with its depth below this one (this item is 0).
    pub fn walk_with_depth(&self, f: &mut dyn FnMut(&Item, usize)) {
        self.walk_depth(0, f);
    }

    fn walk_depth(&self, depth: usize, f: &mut dyn FnMut(&Item, usize)) {
        f(self, depth);
        for child in &self.children {
            child.walk_depth(depth + 1, f);
        }
    }

    /// Number of items in this subtree, this one included.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Item::subtree_len).sum::<usize>()
    }
}
