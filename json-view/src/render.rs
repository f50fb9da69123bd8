use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::error::{Result, ViewError};
use crate::format;
use crate::screen::Screen;
use crate::search::SearchState;
use crate::style::{Role, SchemeId};
use crate::tree::{NodeId, Tree};

/// Redraw strategy chosen for one frame, in decreasing order of cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Clear the viewport and repaint every row in view.
    Full,
    /// Repaint from the selected row downward only.
    Partial,
    /// Shift already-rendered rows and paint only the exposed edge.
    ScrollShift,
    /// Repaint only the previous and current selection rows.
    SelectionOnly,
}

/// Column range of a clickable key hint on the status line.
#[derive(Debug, Clone, Copy)]
pub struct ClickHint {
    pub key: char,
    pub start: usize,
    pub end: usize,
}

/// Per-session render context: previous frame state, dirty flags, display
/// options and the transient status message. One instance lives for the
/// whole interactive session; nothing here is global.
pub struct RenderEngine {
    scroll_offset: usize,
    prev_selected: Option<usize>,
    prev_scroll: Option<usize>,
    need_full: bool,
    need_partial: bool,
    ascii: bool,
    scheme: SchemeId,
    /// Document origin name -> raw byte size, for root-row labels.
    sizes: HashMap<String, u64>,
    transient: Option<(String, Instant)>,
    hints: Vec<ClickHint>,
}

impl RenderEngine {
    pub fn new(ascii: bool, scheme: SchemeId, sizes: HashMap<String, u64>) -> Self {
        Self {
            scroll_offset: 0,
            prev_selected: None,
            prev_scroll: None,
            need_full: true,
            need_partial: false,
            ascii,
            scheme,
            sizes,
            transient: None,
            hints: Vec::new(),
        }
    }

    /// Structural change invalidating the whole viewport (search, bulk
    /// expansion, scheme change, resize, overlay dismissed).
    pub fn mark_full_redraw(&mut self) {
        self.need_full = true;
    }

    /// Single-node expand/collapse: rows at or after the selected row may
    /// have changed, rows above have not.
    pub fn mark_partial_redraw(&mut self) {
        self.need_partial = true;
    }

    pub fn ascii(&self) -> bool {
        self.ascii
    }

    pub fn scheme(&self) -> SchemeId {
        self.scheme
    }

    pub fn set_scheme(&mut self, scheme: SchemeId) {
        self.scheme = scheme;
        self.need_full = true;
    }

    pub fn cycle_scheme(&mut self) -> SchemeId {
        self.set_scheme(self.scheme.next());
        self.scheme
    }

    /// First row index currently at the top of the viewport.
    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Show `message` on the status line for `duration`, overriding the
    /// normal status content.
    pub fn show_transient_status(&mut self, message: impl Into<String>, duration: Duration) {
        self.transient = Some((message.into(), Instant::now() + duration));
    }

    fn active_transient(&self) -> Option<&str> {
        match &self.transient {
            Some((msg, deadline)) if Instant::now() < *deadline => Some(msg.as_str()),
            _ => None,
        }
    }

    /// Remaining lifetime of the transient status, for use as the input
    /// poll timeout so the message can expire without a keypress.
    pub fn status_timeout(&self) -> Option<Duration> {
        let (_, deadline) = self.transient.as_ref()?;
        let now = Instant::now();
        if *deadline <= now {
            None
        } else {
            Some((*deadline - now).max(Duration::from_millis(1)))
        }
    }

    /// Key bound to the status-line hint under the given column, if any.
    pub fn hint_at(&self, col: u16) -> Option<char> {
        let col = col as usize;
        self.hints
            .iter()
            .find(|h| col >= h.start && col < h.end)
            .map(|h| h.key)
    }

    /// Render one frame. `visible` is the freshly recomputed flattened row
    /// list and `selected` has already been clamped into its range by the
    /// caller; both are re-checked here since tree mutations can shrink the
    /// sequence between frames.
    pub fn render(
        &mut self,
        screen: &mut dyn Screen,
        tree: &Tree<'_>,
        visible: &[NodeId],
        selected: usize,
        search: &SearchState,
    ) -> Result<Strategy> {
        if visible.is_empty() {
            return Err(ViewError::EmptyVisibleSet);
        }
        let (cols, rows) = screen.size();
        let selected = selected.min(visible.len() - 1);
        let viewport = rows.saturating_sub(1) as usize;

        // Keep the selected row inside the viewport.
        let mut scroll = self.scroll_offset;
        if selected < scroll {
            scroll = selected;
        }
        if viewport > 0 && selected >= scroll + viewport {
            scroll = selected + 1 - viewport;
        }

        let scroll_changed = self.prev_scroll != Some(scroll);
        let delta = self
            .prev_scroll
            .map(|p| scroll as i64 - p as i64)
            .unwrap_or(0);
        self.scroll_offset = scroll;

        let strategy = if self.need_full || self.prev_scroll.is_none() {
            self.draw_full(screen, tree, visible, selected, search, viewport, cols)?;
            self.need_full = false;
            Strategy::Full
        } else if self.need_partial {
            self.need_partial = false;
            let row = selected as i64 - scroll as i64;
            if row >= 0 && (row as usize) < viewport {
                self.draw_from_row(
                    screen, tree, visible, selected, search, viewport, cols, row as usize,
                )?;
                Strategy::Partial
            } else {
                // Selection scrolled out of view, repaint everything.
                self.draw_full(screen, tree, visible, selected, search, viewport, cols)?;
                Strategy::Full
            }
        } else if scroll_changed && (delta.unsigned_abs() as usize) < viewport {
            self.draw_shifted(
                screen,
                tree,
                visible,
                selected,
                search,
                viewport,
                cols,
                delta as i32,
            )?;
            Strategy::ScrollShift
        } else if scroll_changed {
            // Jumped at least a full page; shifting would not be cheaper.
            self.draw_full(screen, tree, visible, selected, search, viewport, cols)?;
            Strategy::Full
        } else {
            self.draw_selection_only(screen, tree, visible, selected, search, viewport, cols)?;
            Strategy::SelectionOnly
        };

        self.prev_selected = Some(selected);
        self.prev_scroll = Some(scroll);
        Ok(strategy)
    }

    fn draw_row(
        &self,
        screen: &mut dyn Screen,
        tree: &Tree<'_>,
        visible: &[NodeId],
        idx: usize,
        row: usize,
        selected: usize,
        search: &SearchState,
        cols: u16,
    ) -> Result<()> {
        let id = visible[idx];
        let spans = format::row_spans(tree, id, search, cols as usize, self.ascii, &self.sizes);

        let is_selected = idx == selected;
        let is_match = search.is_active() && search.contains(id);
        let override_role = match (is_selected, is_match) {
            (true, true) => Some(Role::SelectionMatch),
            (true, false) => Some(Role::Selection),
            (false, true) => Some(Role::SearchMatch),
            (false, false) => None,
        };

        screen.clear_row(row as u16)?;
        let mut col = 0usize;
        for span in &spans {
            if col >= cols as usize {
                break;
            }
            let text = format::truncate_to_width(&span.text, cols as usize - col);
            if text.is_empty() {
                continue;
            }
            screen.draw_text(
                row as u16,
                col as u16,
                text,
                override_role.unwrap_or(span.role),
            )?;
            col += format::display_width(text);
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_full(
        &mut self,
        screen: &mut dyn Screen,
        tree: &Tree<'_>,
        visible: &[NodeId],
        selected: usize,
        search: &SearchState,
        viewport: usize,
        cols: u16,
    ) -> Result<()> {
        screen.clear_all()?;
        for row in 0..viewport {
            let idx = self.scroll_offset + row;
            if idx >= visible.len() {
                break;
            }
            self.draw_row(screen, tree, visible, idx, row, selected, search, cols)?;
        }
        self.draw_status(screen, tree, visible, selected, search, viewport, cols)
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_from_row(
        &mut self,
        screen: &mut dyn Screen,
        tree: &Tree<'_>,
        visible: &[NodeId],
        selected: usize,
        search: &SearchState,
        viewport: usize,
        cols: u16,
        start_row: usize,
    ) -> Result<()> {
        for row in start_row..viewport {
            screen.clear_row(row as u16)?;
        }
        for row in start_row..viewport {
            let idx = self.scroll_offset + row;
            if idx >= visible.len() {
                break;
            }
            self.draw_row(screen, tree, visible, idx, row, selected, search, cols)?;
        }
        self.draw_status(screen, tree, visible, selected, search, viewport, cols)
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_shifted(
        &mut self,
        screen: &mut dyn Screen,
        tree: &Tree<'_>,
        visible: &[NodeId],
        selected: usize,
        search: &SearchState,
        viewport: usize,
        cols: u16,
        delta: i32,
    ) -> Result<()> {
        screen.shift_rows(0, viewport as u16 - 1, delta)?;

        if delta > 0 {
            // Content moved up, fresh rows at the bottom edge.
            let count = delta as usize;
            for i in 0..count {
                let row = viewport - count + i;
                let idx = self.scroll_offset + row;
                if idx < visible.len() {
                    self.draw_row(screen, tree, visible, idx, row, selected, search, cols)?;
                } else {
                    screen.clear_row(row as u16)?;
                }
            }
        } else {
            // Content moved down, fresh rows at the top edge.
            for row in 0..(-delta) as usize {
                let idx = self.scroll_offset + row;
                if idx < visible.len() {
                    self.draw_row(screen, tree, visible, idx, row, selected, search, cols)?;
                }
            }
        }

        // Selection highlight moved with the content; repaint both rows.
        if let Some(prev) = self.prev_selected {
            if prev != selected {
                let prev_row = prev as i64 - self.scroll_offset as i64;
                if prev_row >= 0 && (prev_row as usize) < viewport && prev < visible.len() {
                    self.draw_row(
                        screen, tree, visible, prev, prev_row as usize, selected, search, cols,
                    )?;
                }
                let cur_row = selected as i64 - self.scroll_offset as i64;
                if cur_row >= 0 && (cur_row as usize) < viewport {
                    self.draw_row(
                        screen, tree, visible, selected, cur_row as usize, selected, search, cols,
                    )?;
                }
            }
        }

        self.draw_status(screen, tree, visible, selected, search, viewport, cols)
    }

    fn draw_selection_only(
        &mut self,
        screen: &mut dyn Screen,
        tree: &Tree<'_>,
        visible: &[NodeId],
        selected: usize,
        search: &SearchState,
        viewport: usize,
        cols: u16,
    ) -> Result<()> {
        if let Some(prev) = self.prev_selected {
            if prev != selected {
                let prev_row = prev as i64 - self.scroll_offset as i64;
                if prev_row >= 0 && (prev_row as usize) < viewport && prev < visible.len() {
                    self.draw_row(
                        screen, tree, visible, prev, prev_row as usize, selected, search, cols,
                    )?;
                }
            }
        }
        let cur_row = selected as i64 - self.scroll_offset as i64;
        if cur_row >= 0 && (cur_row as usize) < viewport {
            self.draw_row(
                screen, tree, visible, selected, cur_row as usize, selected, search, cols,
            )?;
        }
        // The status line shows the selection path, so it always changes.
        self.draw_status(screen, tree, visible, selected, search, viewport, cols)
    }

    fn draw_status(
        &mut self,
        screen: &mut dyn Screen,
        tree: &Tree<'_>,
        visible: &[NodeId],
        selected: usize,
        search: &SearchState,
        viewport: usize,
        cols: u16,
    ) -> Result<()> {
        let status_row = viewport as u16;
        self.hints.clear();

        if let Some(message) = self.active_transient() {
            let message = format::truncate_to_width(message, cols as usize).to_string();
            screen.clear_row(status_row)?;
            screen.draw_text(status_row, 0, &message, Role::StatusBar)?;
            return Ok(());
        }

        let mut status = tree.path_string(visible[selected.min(visible.len() - 1)]);
        let mut width = format::display_width(&status);

        let add_hint = |status: &mut String,
                            width: &mut usize,
                            hints: &mut Vec<ClickHint>,
                            key: char,
                            label: &str,
                            comma: bool| {
            if comma {
                status.push_str(", ");
                *width += 2;
            }
            let start = *width;
            let token = format!("{key}:{label}");
            *width += format::display_width(&token);
            status.push_str(&token);
            hints.push(ClickHint {
                key,
                start,
                end: *width,
            });
        };

        if search.is_active() {
            let total = search.matches.len();
            let current = if total == 0 { 0 } else { search.current + 1 };
            status.push_str(&format!("   [search '{}' {current}/{total}]", search.term));
            width = format::display_width(&status);
            status.push_str("   (");
            width += 4;
            add_hint(&mut status, &mut width, &mut self.hints, 'n', "next", false);
            add_hint(&mut status, &mut width, &mut self.hints, 'N', "prev", true);
            add_hint(&mut status, &mut width, &mut self.hints, 'c', "clear", true);
            status.push(')');
        } else {
            status.push_str("   (");
            width += 4;
            add_hint(&mut status, &mut width, &mut self.hints, '?', "help", false);
            add_hint(&mut status, &mut width, &mut self.hints, 'q', "quit", true);
            status.push(')');
        }

        let status = format::truncate_to_width(&status, cols as usize).to_string();
        screen.clear_row(status_row)?;
        screen.draw_text(status_row, 0, &status, Role::StatusBar)?;
        Ok(())
    }
}
