//! Conversion between native selections and logical cursors.
//!
//! [`CursorResolver::resolve`] walks from each selection endpoint up to the
//! root, collecting marker attributes, and returns the key paths outermost
//! first. [`CursorResolver::apply`] does the reverse: it finds the elements
//! marked with each endpoint's innermost key and selects inside their text.
//!
//! Neither direction fails. A selection outside marked content resolves to
//! `None`; a cursor whose target is not rendered is reported as
//! [`ApplyOutcome::TargetMissing`]. Both happen routinely while the rendered
//! tree and the store are briefly out of step.

use flatdoc::Key;

use crate::cursor::{Cursor, Position};
use crate::host::{NativePoint, NativeSelection, SelectionHost};

pub const DEFAULT_MARKER_ATTRIBUTE: &str = "data-key";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Attribute the render layer writes each entry's key into.
    pub marker_attribute: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            marker_attribute: DEFAULT_MARKER_ATTRIBUTE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The native selection already matched; nothing was written.
    Unchanged,
    Applied,
    /// An endpoint's node is not rendered. The native selection was cleared.
    TargetMissing,
}

#[derive(Debug, Clone, Default)]
pub struct CursorResolver {
    config: ResolverConfig,
}

impl CursorResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Cursor for the host's current native selection.
    pub fn resolve<H: SelectionHost>(&self, host: &H) -> Option<Cursor> {
        let selection = host.selection()?;
        self.resolve_selection(host, &selection)
    }

    pub fn resolve_selection<H: SelectionHost>(
        &self,
        host: &H,
        selection: &NativeSelection<H::Node>,
    ) -> Option<Cursor> {
        let anchor = self.position(host, &selection.anchor)?;
        let focus = self.position(host, &selection.focus)?;
        Some(Cursor::new(anchor, focus))
    }

    fn position<H: SelectionHost>(&self, host: &H, point: &NativePoint<H::Node>) -> Option<Position> {
        Position::new(self.key_path(host, &point.node), point.offset)
    }

    /// Marker keys on `node` and its ancestors, outermost first.
    pub fn key_path<H: SelectionHost>(&self, host: &H, node: &H::Node) -> Vec<Key> {
        let mut keys = Vec::new();
        let mut current = Some(node.clone());
        while let Some(node) = current {
            if let Some(marker) = host.attribute(&node, &self.config.marker_attribute) {
                match marker.parse::<Key>() {
                    Ok(key) => keys.push(key),
                    Err(err) => tracing::debug!(%err, ?node, "skipping unparseable marker"),
                }
            }
            current = host.parent(&node);
        }
        keys.reverse();
        keys
    }

    /// Drive the host's native selection to `cursor`.
    pub fn apply<H: SelectionHost>(&self, host: &mut H, cursor: &Cursor) -> ApplyOutcome {
        if self.resolve(host).as_ref() == Some(cursor) {
            return ApplyOutcome::Unchanged;
        }
        host.clear_selection();

        let Some(anchor) = self.locate(host, &cursor.anchor) else {
            tracing::debug!(key = %cursor.anchor.innermost(), "anchor target not rendered");
            return ApplyOutcome::TargetMissing;
        };
        let Some(focus) = self.locate(host, &cursor.focus) else {
            tracing::debug!(key = %cursor.focus.innermost(), "focus target not rendered");
            return ApplyOutcome::TargetMissing;
        };
        host.set_selection(NativeSelection::new(anchor, focus));
        ApplyOutcome::Applied
    }

    /// Native point for `position`: inside the marked element's first text
    /// child (offset clamped to its length), or at the element itself.
    fn locate<H: SelectionHost>(&self, host: &H, position: &Position) -> Option<NativePoint<H::Node>> {
        let marker = position.innermost().to_string();
        let element = host.find_by_attribute(&self.config.marker_attribute, &marker)?;
        let point = match host.first_text_child(&element) {
            Some(text) => {
                let offset = position.offset().min(host.text_len(&text));
                NativePoint::new(text, offset)
            }
            None => NativePoint::new(element, 0),
        };
        Some(point)
    }
}
