//! Drag and drop placement: palette insertion and canvas reordering.

use crate::element::{Element, ElementId, ElementKind};
use crate::store::BuilderStore;
use kurbo::{Point, Rect, Vec2};

/// Offset from the drop point to a natively dropped element's top-left corner.
pub const NATIVE_DROP_OFFSET: Vec2 = Vec2::new(100.0, 50.0);

/// What is being dragged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragPayload {
    /// A new element of `kind` dragged from the palette.
    Palette { kind: ElementKind },
    /// An existing canvas element.
    Canvas { id: ElementId },
}

/// A droppable element and its on-screen rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct DropTarget {
    pub id: ElementId,
    pub rect: Rect,
}

impl DropTarget {
    pub fn new(id: impl Into<ElementId>, rect: Rect) -> Self {
        Self { id: id.into(), rect }
    }
}

/// Result of finishing a drag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// A palette element was created at `index`.
    Inserted { id: ElementId, index: usize },
    /// A canvas element was moved to `index`.
    Moved { id: ElementId, index: usize },
    /// The drop resolved to nothing to do (self-drop, unknown ids).
    Ignored,
    /// Released over no target, or no drag was active.
    Cancelled,
}

/// Whether two rectangles overlap with positive area.
fn overlaps(a: Rect, b: Rect) -> bool {
    a.x0 < b.x1 && b.x0 < a.x1 && a.y0 < b.y1 && b.y0 < a.y1
}

/// The target overlapping `active` whose center is nearest `active`'s center.
/// Ties keep the earlier target.
pub fn closest_intersecting<'a>(active: Rect, targets: &'a [DropTarget]) -> Option<&'a DropTarget> {
    let center = active.center();
    let mut best: Option<(&DropTarget, f64)> = None;
    for target in targets.iter().filter(|target| overlaps(active, target.rect)) {
        let distance = center.distance(target.rect.center());
        if best.is_none_or(|(_, closest)| distance < closest) {
            best = Some((target, distance));
        }
    }
    best.map(|(target, _)| target)
}

/// Tracks one drag gesture and applies its result to a [`BuilderStore`].
#[derive(Debug, Clone, Default)]
pub struct DragDropEngine {
    active: Option<DragPayload>,
    over: Option<ElementId>,
}

impl DragDropEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The payload of the drag in progress.
    pub fn active(&self) -> Option<&DragPayload> {
        self.active.as_ref()
    }

    /// Id of the element currently under the drag.
    pub fn over_id(&self) -> Option<&str> {
        self.over.as_deref()
    }

    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    /// Begin a drag.
    pub fn drag_start(&mut self, store: &mut BuilderStore, payload: DragPayload) {
        log::debug!("Drag start: {payload:?}");
        self.active = Some(payload);
        self.over = None;
        store.set_dragging(true);
        store.set_drag_over_element(None);
    }

    /// Update the hover target as the dragged rectangle moves.
    /// Returns the id of the top-level element under the drag.
    pub fn drag_over(
        &mut self,
        store: &mut BuilderStore,
        active_rect: Rect,
        targets: &[DropTarget],
    ) -> Option<ElementId> {
        if self.active.is_none() {
            return None;
        }
        self.over = closest_intersecting(active_rect, targets)
            .map(|target| target.id.clone())
            .filter(|id| store.index_of(id).is_some());
        store.set_drag_over_element(self.over.as_deref());
        self.over.clone()
    }

    /// Abort the drag without touching the document.
    pub fn drag_cancel(&mut self, store: &mut BuilderStore) {
        self.active = None;
        self.over = None;
        store.set_dragging(false);
        store.set_drag_over_element(None);
    }

    /// Finish the drag. Collision is recomputed on the final rectangle.
    pub fn drag_end(
        &mut self,
        store: &mut BuilderStore,
        active_rect: Rect,
        targets: &[DropTarget],
    ) -> DropOutcome {
        let payload = self.active.take();
        self.over = None;
        store.set_dragging(false);
        store.set_drag_over_element(None);

        let Some(payload) = payload else {
            return DropOutcome::Cancelled;
        };
        let Some(target) = closest_intersecting(active_rect, targets) else {
            log::debug!("Drop over empty space, cancelled");
            return DropOutcome::Cancelled;
        };

        match payload {
            DragPayload::Palette { kind } => {
                let index = store
                    .index_of(&target.id)
                    .map_or(store.elements().len(), |index| index + 1);
                let element = Element::new(kind).with_z_index(z_index_for(store));
                insert(store, element, Some(index))
            }
            DragPayload::Canvas { id } => {
                if id == target.id {
                    return DropOutcome::Ignored;
                }
                let (Some(_), Some(index)) = (store.index_of(&id), store.index_of(&target.id)) else {
                    log::debug!("Drop of {id} onto {} did not resolve", target.id);
                    return DropOutcome::Ignored;
                };
                match store.move_element(&id, index) {
                    Ok(()) => DropOutcome::Moved { id, index },
                    Err(err) => {
                        log::warn!("Move failed: {err}");
                        DropOutcome::Ignored
                    }
                }
            }
        }
    }

    /// Drop a palette element at a viewport point, outside any drag gesture.
    /// The element is centered on the point and appended.
    pub fn drop_at_point(&mut self, store: &mut BuilderStore, kind: ElementKind, point: Point) -> DropOutcome {
        let element = Element::new(kind)
            .with_position(point - NATIVE_DROP_OFFSET)
            .with_z_index(z_index_for(store));
        insert(store, element, None)
    }
}

fn z_index_for(store: &BuilderStore) -> i32 {
    i32::try_from(store.elements().len()).unwrap_or(i32::MAX)
}

fn insert(store: &mut BuilderStore, element: Element, index: Option<usize>) -> DropOutcome {
    let id = element.id().to_string();
    match store.add_element(element, index) {
        Ok(()) => {
            let index = store.index_of(&id).unwrap_or_default();
            DropOutcome::Inserted { id, index }
        }
        Err(err) => {
            log::warn!("Drop insert failed: {err}");
            DropOutcome::Ignored
        }
    }
}
