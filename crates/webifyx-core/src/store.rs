//! Builder document store and editing session state.

use crate::element::{
    Element, ElementId, ElementUpdate, collect_ids, find_in, find_in_mut, remove_from,
    sibling_list_mut, validate_elements,
};
use crate::error::{BuilderError, BuilderResult};
use crate::history::History;
use crate::site::Site;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Minimum canvas zoom factor.
pub const MIN_ZOOM: f64 = 0.25;
/// Maximum canvas zoom factor.
pub const MAX_ZOOM: f64 = 2.0;

/// Device preview mode for the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Viewport {
    #[default]
    Desktop,
    Tablet,
    Mobile,
}

/// A snapshot of the current site taken when a save starts.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    /// Id the site is stored under.
    pub site_id: String,
    /// Site record with the live element list.
    pub site: Site,
    /// Store revision at the time of the snapshot.
    pub revision: u64,
}

/// State of one editing session: the element list, selection, history and
/// UI flags.
///
/// Every successful mutation marks the store dirty and records exactly one
/// history entry. Failed mutations change nothing.
#[derive(Debug, Clone)]
pub struct BuilderStore {
    current_site: Option<Site>,
    elements: Vec<Element>,
    selected: Option<ElementId>,
    history: History,
    dirty: bool,
    dragging: bool,
    drag_over: Option<ElementId>,
    viewport: Viewport,
    zoom: f64,
    revision: u64,
}

impl Default for BuilderStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BuilderStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::with_history(History::new())
    }

    /// Create an empty store using the given history (e.g. a custom limit).
    pub fn with_history(history: History) -> Self {
        Self {
            current_site: None,
            elements: Vec::new(),
            selected: None,
            history,
            dirty: false,
            dragging: false,
            drag_over: None,
            viewport: Viewport::default(),
            zoom: 1.0,
            revision: 0,
        }
    }

    pub fn current_site(&self) -> Option<&Site> {
        self.current_site.as_ref()
    }

    /// Top-level elements in document order.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Counter bumped whenever the element list changes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Find an element anywhere in the document.
    pub fn find_element(&self, id: &str) -> Option<&Element> {
        find_in(&self.elements, id)
    }

    /// Index of a top-level element.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.elements.iter().position(|element| element.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find_element(id).is_some()
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// The selected element, resolved against the live document.
    pub fn selected_element(&self) -> Option<&Element> {
        self.selected.as_deref().and_then(|id| self.find_element(id))
    }

    pub fn drag_over_id(&self) -> Option<&str> {
        self.drag_over.as_deref()
    }

    pub fn drag_over_element(&self) -> Option<&Element> {
        self.drag_over.as_deref().and_then(|id| self.find_element(id))
    }

    /// Record a mutation: bump the revision, mark dirty, push history.
    fn commit(&mut self, description: impl Into<String>) {
        let description = description.into();
        log::debug!("{description}");
        self.revision += 1;
        self.dirty = true;
        self.history.push(description, &self.elements);
    }

    /// Drop references to elements that no longer exist.
    fn prune_references(&mut self) {
        if self.selected.as_deref().is_some_and(|id| !self.contains(id)) {
            self.selected = None;
        }
        if self.drag_over.as_deref().is_some_and(|id| !self.contains(id)) {
            self.drag_over = None;
        }
    }

    /// Replace the whole element list (e.g. on load). Clears the selection.
    ///
    /// A list with repeated ids or children under a leaf kind is refused and
    /// the store is left as it was.
    pub fn set_document(&mut self, elements: Vec<Element>) -> BuilderResult<()> {
        validate_elements(&elements)?;
        self.elements = elements;
        self.selected = None;
        self.drag_over = None;
        self.revision += 1;
        self.history.push("Site loaded", &self.elements);
        Ok(())
    }

    /// Make `site` the edited site and load its elements.
    ///
    /// The loaded document matches storage, so the store is clean afterwards.
    /// An invalid element list leaves the store untouched.
    pub fn set_current_site(&mut self, site: Option<Site>) -> BuilderResult<()> {
        let elements = site
            .as_ref()
            .map(|site| site.content.elements.clone())
            .unwrap_or_default();
        self.set_document(elements)?;
        if let Some(site) = &site {
            log::info!("Editing site {} ({} elements)", site.id, self.elements.len());
        }
        self.current_site = site;
        self.dirty = false;
        Ok(())
    }

    /// Close the current site.
    pub fn clear_site(&mut self) {
        self.current_site = None;
        self.elements.clear();
        self.selected = None;
        self.drag_over = None;
        self.dirty = false;
        self.revision += 1;
        self.history.push("Cleared site", &self.elements);
    }

    /// Insert an element at `index` (clamped), or append when `None`.
    pub fn add_element(&mut self, element: Element, index: Option<usize>) -> BuilderResult<()> {
        element.validate_containment()?;
        let existing = collect_ids(&self.elements);
        let mut incoming = HashSet::new();
        for id in element.subtree_ids() {
            if existing.contains(id) || !incoming.insert(id) {
                return Err(BuilderError::DuplicateId(id.to_string()));
            }
        }

        let kind = element.kind();
        let index = index.map_or(self.elements.len(), |i| i.min(self.elements.len()));
        self.elements.insert(index, element);
        self.commit(format!("Added {kind} element"));
        Ok(())
    }

    /// Apply a partial update to the element with `id`, wherever it lives.
    pub fn update_element(&mut self, id: &str, update: ElementUpdate) -> BuilderResult<()> {
        let target = self
            .find_element(id)
            .ok_or_else(|| BuilderError::ElementNotFound(id.to_string()))?;

        if let Some(children) = &update.children {
            if !children.is_empty() && !target.kind().is_container() {
                return Err(BuilderError::NotAContainer(id.to_string()));
            }
            // New children may reuse ids of the children they replace, nothing else.
            let replaced: HashSet<&str> = collect_ids(&target.children);
            let mut others = collect_ids(&self.elements);
            others.retain(|existing| !replaced.contains(existing));
            let mut incoming = HashSet::new();
            for child in children {
                child.validate_containment()?;
                for child_id in child.subtree_ids() {
                    if others.contains(child_id) || !incoming.insert(child_id) {
                        return Err(BuilderError::DuplicateId(child_id.to_string()));
                    }
                }
            }
        }

        if let Some(element) = find_in_mut(&mut self.elements, id) {
            element.apply(update);
        }
        self.commit("Updated element");
        Ok(())
    }

    /// Remove the element with `id` and its subtree. Returns the removed element.
    pub fn delete_element(&mut self, id: &str) -> BuilderResult<Element> {
        let removed = remove_from(&mut self.elements, id)
            .ok_or_else(|| BuilderError::ElementNotFound(id.to_string()))?;
        self.prune_references();
        self.commit("Deleted element");
        Ok(removed)
    }

    /// Duplicate the element with `id` right after itself. Returns the new id.
    pub fn duplicate_element(&mut self, id: &str) -> BuilderResult<ElementId> {
        let (siblings, index) = sibling_list_mut(&mut self.elements, id)
            .ok_or_else(|| BuilderError::ElementNotFound(id.to_string()))?;
        let copy = siblings[index].duplicate();
        let new_id = copy.id().to_string();
        let kind = copy.kind();
        siblings.insert(index + 1, copy);

        self.commit(format!("Duplicated {kind} element"));
        Ok(new_id)
    }

    /// Move a top-level element to `new_index` (clamped).
    ///
    /// Moving an element onto its own index still records a history entry.
    pub fn move_element(&mut self, id: &str, new_index: usize) -> BuilderResult<()> {
        let from = self
            .index_of(id)
            .ok_or_else(|| BuilderError::ElementNotFound(id.to_string()))?;
        let element = self.elements.remove(from);
        let to = new_index.min(self.elements.len());
        self.elements.insert(to, element);
        self.commit("Moved element");
        Ok(())
    }

    /// Reorder a child within its container's `children`.
    pub fn move_child(&mut self, parent_id: &str, child_id: &str, new_index: usize) -> BuilderResult<()> {
        let parent = find_in_mut(&mut self.elements, parent_id)
            .ok_or_else(|| BuilderError::ElementNotFound(parent_id.to_string()))?;
        if !parent.kind().is_container() {
            return Err(BuilderError::NotAContainer(parent_id.to_string()));
        }
        let from = parent
            .children
            .iter()
            .position(|child| child.id() == child_id)
            .ok_or_else(|| BuilderError::ElementNotFound(child_id.to_string()))?;
        let child = parent.children.remove(from);
        let to = new_index.min(parent.children.len());
        parent.children.insert(to, child);

        self.commit("Moved element");
        Ok(())
    }

    /// Step back in history. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo() else {
            log::debug!("Nothing to undo");
            return false;
        };
        self.elements = snapshot.to_vec();
        self.after_rollback();
        true
    }

    /// Step forward in history. Returns false when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo() else {
            log::debug!("Nothing to redo");
            return false;
        };
        self.elements = snapshot.to_vec();
        self.after_rollback();
        true
    }

    fn after_rollback(&mut self) {
        self.revision += 1;
        self.dirty = true;
        self.prune_references();
    }

    /// Select an element by id, or clear the selection with `None`.
    /// Returns false (leaving the selection unchanged) for an unknown id.
    pub fn set_selected_element(&mut self, id: Option<&str>) -> bool {
        match id {
            Some(id) if !self.contains(id) => {
                log::warn!("Cannot select missing element {id}");
                false
            }
            Some(id) => {
                self.selected = Some(id.to_string());
                true
            }
            None => {
                self.selected = None;
                true
            }
        }
    }

    pub fn set_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
    }

    pub fn set_dragging(&mut self, dragging: bool) {
        self.dragging = dragging;
    }

    /// Highlight the element under the drag, or clear with `None`.
    pub fn set_drag_over_element(&mut self, id: Option<&str>) {
        self.drag_over = id.filter(|id| self.contains(id)).map(str::to_string);
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Set the zoom factor, clamped to [`MIN_ZOOM`]..=[`MAX_ZOOM`].
    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom.is_finite() {
            self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        }
    }

    /// Snapshot the current site with the live elements for saving.
    /// Returns None when no site is loaded.
    pub fn save_request(&self) -> Option<SaveRequest> {
        let site = self.current_site.as_ref()?;
        let mut site = site.clone();
        site.content.elements = self.elements.clone();
        Some(SaveRequest {
            site_id: site.id.clone(),
            site,
            revision: self.revision,
        })
    }

    /// Adopt the record returned by a completed save.
    ///
    /// The store becomes clean only if nothing changed since `request` was
    /// taken. Returns whether the store is clean afterwards.
    pub fn apply_saved(&mut self, request: &SaveRequest, saved: Site) -> bool {
        if self.current_site.as_ref().map(|site| site.id.as_str()) != Some(request.site_id.as_str()) {
            log::warn!("Discarding save result for {}: site no longer open", request.site_id);
            return !self.dirty;
        }
        self.current_site = Some(saved);
        if self.revision == request.revision {
            self.dirty = false;
        } else {
            log::debug!("Document changed during save; still dirty");
        }
        !self.dirty
    }
}
