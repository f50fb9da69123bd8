use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use json_view::*;

fn doc(name: &str, json: &str) -> Document {
    Document::parse(name, json).unwrap()
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Op {
    ClearAll,
    ClearRow(u16),
    Draw { row: u16, col: u16, text: String },
    Shift { top: u16, bottom: u16, delta: i32 },
}

/// Screen that records every write so tests can assert exactly which rows a
/// frame touched.
struct RecordingScreen {
    cols: u16,
    rows: u16,
    ops: Vec<Op>,
}

impl RecordingScreen {
    fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols,
            rows,
            ops: Vec::new(),
        }
    }

    fn reset(&mut self) {
        self.ops.clear();
    }

    fn cleared_everything(&self) -> bool {
        self.ops.contains(&Op::ClearAll)
    }

    fn shifts(&self) -> Vec<(u16, u16, i32)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Shift { top, bottom, delta } => Some((*top, *bottom, *delta)),
                _ => None,
            })
            .collect()
    }

    fn drawn_rows(&self) -> BTreeSet<u16> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Draw { row, .. } => Some(*row),
                _ => None,
            })
            .collect()
    }

    fn row_text(&self, row: u16) -> String {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Draw { row: r, text, .. } if *r == row => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Screen for RecordingScreen {
    fn size(&self) -> (u16, u16) {
        (self.cols, self.rows)
    }

    fn clear_all(&mut self) -> Result<()> {
        self.ops.push(Op::ClearAll);
        Ok(())
    }

    fn clear_row(&mut self, row: u16) -> Result<()> {
        self.ops.push(Op::ClearRow(row));
        Ok(())
    }

    fn draw_text(&mut self, row: u16, col: u16, text: &str, _role: Role) -> Result<()> {
        self.ops.push(Op::Draw {
            row,
            col,
            text: text.to_string(),
        });
        Ok(())
    }

    fn shift_rows(&mut self, top: u16, bottom: u16, delta: i32) -> Result<()> {
        self.ops.push(Op::Shift { top, bottom, delta });
        Ok(())
    }
}

fn small_setup() -> Vec<Document> {
    vec![doc("test.json", r#"{"a": 1, "b": [1, 2, 3]}"#)]
}

fn long_setup() -> Vec<Document> {
    let items: Vec<String> = (0..30).map(|i| i.to_string()).collect();
    vec![doc("long.json", &format!("[{}]", items.join(", ")))]
}

fn engine() -> RenderEngine {
    RenderEngine::new(false, SchemeId::Monochrome, HashMap::new())
}

#[test]
fn first_frame_is_a_full_redraw() {
    let docs = small_setup();
    let tree = Tree::from_documents(&docs);
    let visible = tree.collect_visible();
    let search = SearchState::default();
    let mut screen = RecordingScreen::new(80, 10);
    let mut engine = engine();

    let strategy = engine
        .render(&mut screen, &tree, &visible, 0, &search)
        .unwrap();
    assert_eq!(strategy, Strategy::Full);
    assert!(screen.cleared_everything());
    // Three content rows plus the status line.
    assert!(screen.drawn_rows().contains(&0));
    assert!(screen.drawn_rows().contains(&2));
    assert!(screen.drawn_rows().contains(&9));
}

#[test]
fn moving_the_selection_repaints_only_two_rows_and_the_status() {
    let docs = small_setup();
    let tree = Tree::from_documents(&docs);
    let visible = tree.collect_visible();
    let search = SearchState::default();
    let mut screen = RecordingScreen::new(80, 10);
    let mut engine = engine();

    engine.render(&mut screen, &tree, &visible, 0, &search).unwrap();
    screen.reset();

    let strategy = engine
        .render(&mut screen, &tree, &visible, 1, &search)
        .unwrap();
    assert_eq!(strategy, Strategy::SelectionOnly);
    assert!(!screen.cleared_everything());
    assert!(screen.shifts().is_empty());
    // Previous selection row, new selection row, status line. Nothing else.
    assert_eq!(screen.drawn_rows(), BTreeSet::from([0, 1, 9]));
}

#[test]
fn expanding_a_node_repaints_from_its_row_downward() {
    let docs = small_setup();
    let mut tree = Tree::from_documents(&docs);
    let search = SearchState::default();
    let mut screen = RecordingScreen::new(80, 10);
    let mut engine = engine();

    let visible = tree.collect_visible();
    engine.render(&mut screen, &tree, &visible, 2, &search).unwrap();
    screen.reset();

    // Expand "b" at row 2.
    let b = visible[2];
    tree.set_expanded(b, true);
    engine.mark_partial_redraw();
    let visible = tree.collect_visible();

    let strategy = engine
        .render(&mut screen, &tree, &visible, 2, &search)
        .unwrap();
    assert_eq!(strategy, Strategy::Partial);
    assert!(!screen.cleared_everything());
    // Rows above the expanded node are untouched.
    let content_rows: BTreeSet<u16> = screen
        .drawn_rows()
        .into_iter()
        .filter(|&r| r < 9)
        .collect();
    assert_eq!(content_rows, BTreeSet::from([2, 3, 4, 5]));
}

#[test]
fn small_scrolls_shift_the_viewport_and_paint_the_edge() {
    let docs = long_setup();
    let mut tree = Tree::from_documents(&docs);
    tree.expand_all(tree.roots()[0]);
    let visible = tree.collect_visible();
    assert_eq!(visible.len(), 31);
    let search = SearchState::default();
    let mut screen = RecordingScreen::new(80, 10);
    let mut engine = engine();

    // Land the selection on the bottom row of a 9-row viewport.
    engine.render(&mut screen, &tree, &visible, 8, &search).unwrap();
    assert_eq!(engine.scroll_offset(), 0);
    screen.reset();

    // Move down by three rows: the scroll offset becomes 3.
    let strategy = engine
        .render(&mut screen, &tree, &visible, 11, &search)
        .unwrap();
    assert_eq!(strategy, Strategy::ScrollShift);
    assert_eq!(engine.scroll_offset(), 3);
    assert_eq!(screen.shifts(), vec![(0, 8, 3)]);
    assert!(!screen.cleared_everything());

    // Three newly exposed rows at the bottom, the two selection rows, and
    // the status line. The seven shifted rows are not rewritten.
    let content_rows: BTreeSet<u16> = screen
        .drawn_rows()
        .into_iter()
        .filter(|&r| r < 9)
        .collect();
    assert_eq!(content_rows, BTreeSet::from([5, 6, 7, 8]));
}

#[test]
fn scrolling_a_full_page_or_more_redraws_everything() {
    let docs = long_setup();
    let mut tree = Tree::from_documents(&docs);
    tree.expand_all(tree.roots()[0]);
    let visible = tree.collect_visible();
    let search = SearchState::default();
    let mut screen = RecordingScreen::new(80, 10);
    let mut engine = engine();

    engine.render(&mut screen, &tree, &visible, 0, &search).unwrap();
    screen.reset();

    // End key: jump to the last row, 22 rows away.
    let strategy = engine
        .render(&mut screen, &tree, &visible, 30, &search)
        .unwrap();
    assert_eq!(strategy, Strategy::Full);
    assert!(screen.cleared_everything());
    assert!(screen.shifts().is_empty());
}

#[test]
fn scrolling_upward_shifts_content_down() {
    let docs = long_setup();
    let mut tree = Tree::from_documents(&docs);
    tree.expand_all(tree.roots()[0]);
    let visible = tree.collect_visible();
    let search = SearchState::default();
    let mut screen = RecordingScreen::new(80, 10);
    let mut engine = engine();

    engine.render(&mut screen, &tree, &visible, 11, &search).unwrap();
    assert_eq!(engine.scroll_offset(), 3);
    screen.reset();

    // Selection moves above the viewport top; scroll goes 3 -> 1.
    let strategy = engine
        .render(&mut screen, &tree, &visible, 1, &search)
        .unwrap();
    assert_eq!(strategy, Strategy::ScrollShift);
    assert_eq!(engine.scroll_offset(), 1);
    assert_eq!(screen.shifts(), vec![(0, 8, -2)]);
    // Fresh rows 0 and 1 at the top plus the old selection row (11 - 1).
    let content_rows: BTreeSet<u16> = screen
        .drawn_rows()
        .into_iter()
        .filter(|&r| r < 9)
        .collect();
    assert!(content_rows.contains(&0));
    assert!(content_rows.contains(&1));
    assert!(!content_rows.contains(&5));
}

#[test]
fn unchanged_frame_repaints_the_selection_row_only() {
    let docs = small_setup();
    let tree = Tree::from_documents(&docs);
    let visible = tree.collect_visible();
    let search = SearchState::default();
    let mut screen = RecordingScreen::new(80, 10);
    let mut engine = engine();

    engine.render(&mut screen, &tree, &visible, 1, &search).unwrap();
    screen.reset();

    let strategy = engine
        .render(&mut screen, &tree, &visible, 1, &search)
        .unwrap();
    assert_eq!(strategy, Strategy::SelectionOnly);
    assert_eq!(screen.drawn_rows(), BTreeSet::from([1, 9]));
}

#[test]
fn empty_visible_set_is_an_error() {
    let docs = small_setup();
    let tree = Tree::from_documents(&docs);
    let search = SearchState::default();
    let mut screen = RecordingScreen::new(80, 10);
    let mut engine = engine();

    let err = engine.render(&mut screen, &tree, &[], 0, &search);
    assert!(matches!(err, Err(ViewError::EmptyVisibleSet)));
}

#[test]
fn status_line_shows_the_path_and_clickable_hints() {
    let docs = small_setup();
    let tree = Tree::from_documents(&docs);
    let visible = tree.collect_visible();
    let search = SearchState::default();
    let mut screen = RecordingScreen::new(80, 10);
    let mut engine = engine();

    engine.render(&mut screen, &tree, &visible, 1, &search).unwrap();
    let status = screen.row_text(9);
    assert_eq!(status, "test.json/a   (?:help, q:quit)");

    // Hint ranges line up with the rendered text.
    let help_col = status.find("?:help").unwrap() as u16;
    let quit_col = status.find("q:quit").unwrap() as u16;
    assert_eq!(engine.hint_at(help_col), Some('?'));
    assert_eq!(engine.hint_at(quit_col + 2), Some('q'));
    assert_eq!(engine.hint_at(0), None);
}

#[test]
fn status_line_shows_search_progress_while_active() {
    let docs = small_setup();
    let mut tree = Tree::from_documents(&docs);
    tree.expand_all(tree.roots()[0]);
    let visible = tree.collect_visible();
    let search = SearchState::build(&tree, "b", SearchScope::Keys);
    assert_eq!(search.matches.len(), 1);
    let selected = visible.iter().position(|&id| id == search.matches[0]).unwrap();
    let mut screen = RecordingScreen::new(80, 10);
    let mut engine = engine();

    engine
        .render(&mut screen, &tree, &visible, selected, &search)
        .unwrap();
    let status = screen.row_text(9);
    assert!(status.contains("[search 'b' 1/1]"), "got: {status}");
    assert!(status.contains("n:next, N:prev, c:clear"), "got: {status}");

    let next_col = status.find("n:next").unwrap() as u16;
    assert_eq!(engine.hint_at(next_col), Some('n'));
}

#[test]
fn transient_status_overrides_the_path_until_it_expires() {
    let docs = small_setup();
    let tree = Tree::from_documents(&docs);
    let visible = tree.collect_visible();
    let search = SearchState::default();
    let mut screen = RecordingScreen::new(80, 10);
    let mut engine = engine();

    engine.show_transient_status("Color scheme: none", Duration::from_secs(5));
    assert!(engine.status_timeout().is_some());

    engine.render(&mut screen, &tree, &visible, 0, &search).unwrap();
    assert_eq!(screen.row_text(9), "Color scheme: none");
    // Hints are not clickable while the override is up.
    assert_eq!(engine.hint_at(0), None);
}

#[test]
fn selected_search_matches_use_the_combined_highlight() {
    let docs = small_setup();
    let mut tree = Tree::from_documents(&docs);
    tree.expand_all(tree.roots()[0]);
    let visible = tree.collect_visible();
    let search = SearchState::build(&tree, "a", SearchScope::Keys);
    let selected = visible.iter().position(|&id| id == search.matches[0]).unwrap();

    struct RoleScreen {
        roles: Vec<(u16, Role)>,
    }
    impl Screen for RoleScreen {
        fn size(&self) -> (u16, u16) {
            (80, 10)
        }
        fn clear_all(&mut self) -> Result<()> {
            Ok(())
        }
        fn clear_row(&mut self, _row: u16) -> Result<()> {
            Ok(())
        }
        fn draw_text(&mut self, row: u16, _col: u16, _text: &str, role: Role) -> Result<()> {
            self.roles.push((row, role));
            Ok(())
        }
        fn shift_rows(&mut self, _top: u16, _bottom: u16, _delta: i32) -> Result<()> {
            Ok(())
        }
    }

    let mut screen = RoleScreen { roles: Vec::new() };
    let mut engine = engine();
    engine
        .render(&mut screen, &tree, &visible, selected, &search)
        .unwrap();

    let row = selected as u16;
    assert!(screen
        .roles
        .iter()
        .filter(|(r, _)| *r == row)
        .all(|(_, role)| *role == Role::SelectionMatch));
    // Unselected rows never use the selection roles.
    assert!(!screen
        .roles
        .iter()
        .any(|(r, role)| *r != row && (*role == Role::Selection || *role == Role::SelectionMatch)));
}
