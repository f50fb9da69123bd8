use std::collections::HashMap;
use std::env;
use std::io::{self, Read};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::Parser;
use crossterm::cursor::{Hide, Show};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyModifiers,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, DisableLineWrap, EnableLineWrap, EnterAlternateScreen,
    LeaveAlternateScreen,
};

use json_view::*;

const DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(400);
const TRANSIENT_STATUS_LIFETIME: Duration = Duration::from_secs(3);

#[derive(Parser, Debug)]
#[command(
    name = "json-view",
    version,
    about = "Interactive JSON viewer with tree navigation"
)]
struct Cli {
    /// JSON files to open; reads standard input when omitted
    files: Vec<PathBuf>,

    /// Parse input and pretty-print JSON, then exit
    #[arg(short = 'p', long)]
    parse_only: bool,

    /// Validate JSON input and exit with status
    #[arg(long)]
    validate: bool,

    /// Disable mouse support
    #[arg(long)]
    no_mouse: bool,

    /// Draw tree glyphs and indicators with plain ASCII
    #[arg(long)]
    ascii: bool,

    /// Color scheme: default, colorblind or none
    #[arg(long, value_name = "NAME")]
    color_scheme: Option<String>,
}

fn env_flag(name: &str) -> bool {
    env::var_os(name).is_some_and(|v| !v.is_empty() && v != "0")
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let ascii = cli.ascii || env_flag("JSON_VIEW_ASCII");
    let mouse = !(cli.no_mouse || env_flag("JSON_VIEW_NO_MOUSE"));
    let scheme = cli
        .color_scheme
        .or_else(|| env::var("JSON_VIEW_COLOR_SCHEME").ok())
        .map(|name| SchemeId::parse(&name))
        .unwrap_or(SchemeId::Default);

    let mut docs: Vec<Document> = Vec::new();
    let mut any_failed = false;

    for path in &cli.files {
        match Document::load(path) {
            Ok(doc) => {
                if cli.parse_only {
                    println!("{}", doc.value.to_pretty_string());
                }
                docs.push(doc);
            }
            Err(err) => {
                eprintln!("Error parsing JSON in {}: {}", path.display(), err);
                any_failed = true;
            }
        }
    }

    if cli.files.is_empty() {
        let mut contents = String::new();
        io::stdin()
            .read_to_string(&mut contents)
            .context("reading standard input")?;
        if !contents.is_empty() {
            match Document::parse("(stdin)", &contents) {
                Ok(doc) => {
                    if cli.parse_only {
                        println!("{}", doc.value.to_pretty_string());
                    }
                    docs.push(doc);
                }
                Err(err) => {
                    eprintln!("Error parsing JSON from stdin: {err}");
                    any_failed = true;
                }
            }
        }
    }

    if cli.validate {
        if docs.is_empty() || any_failed {
            std::process::exit(1);
        }
        return Ok(());
    }

    if docs.is_empty() {
        bail!("No valid JSON documents provided.");
    }

    if cli.parse_only {
        return Ok(());
    }

    run_viewer(&docs, ascii, mouse, scheme)
}

/// Terminal session wrapper: raw mode and screen state are set up here and
/// torn down in reverse order even when the inner loop fails.
fn run_viewer(docs: &[Document], ascii: bool, mouse: bool, scheme: SchemeId) -> Result<()> {
    enable_raw_mode()?;
    let mut out = io::stdout();
    execute!(out, EnterAlternateScreen, Hide, DisableLineWrap)?;
    if mouse {
        execute!(out, EnableMouseCapture)?;
    }

    let result = view_loop(docs, ascii, mouse, scheme);

    let mut out = io::stdout();
    if mouse {
        let _ = execute!(out, DisableMouseCapture);
    }
    let _ = execute!(out, EnableLineWrap, Show, LeaveAlternateScreen);
    let _ = disable_raw_mode();
    result
}

struct App<'v> {
    tree: Tree<'v>,
    visible: Vec<NodeId>,
    selected: usize,
    search: SearchState,
    engine: RenderEngine,
    last_click: Option<(u16, Instant)>,
    running: bool,
}

impl<'v> App<'v> {
    fn new(docs: &'v [Document], ascii: bool, scheme: SchemeId) -> Self {
        let sizes: HashMap<String, u64> = docs
            .iter()
            .map(|d| (d.name.clone(), d.byte_size))
            .collect();
        let tree = Tree::from_documents(docs);
        let search = SearchState::build(&tree, "", SearchScope::Both);
        Self {
            tree,
            visible: Vec::new(),
            selected: 0,
            search,
            engine: RenderEngine::new(ascii, scheme, sizes),
            last_click: None,
            running: true,
        }
    }

    fn refresh_visible(&mut self) {
        self.visible = self.tree.collect_visible();
        if !self.visible.is_empty() && self.selected >= self.visible.len() {
            self.selected = self.visible.len() - 1;
        }
    }

    fn select_node(&mut self, id: NodeId) {
        if let Some(idx) = self.visible.iter().position(|&n| n == id) {
            self.selected = idx;
        } else {
            self.selected = 0;
        }
    }

    fn selected_node(&self) -> NodeId {
        self.visible[self.selected]
    }

    fn handle_key(&mut self, key: KeyEvent, screen: &mut dyn Screen) -> Result<()> {
        let (_, rows) = screen.size();
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.running = false;
            return Ok(());
        }
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.visible.len() {
                    self.selected += 1;
                }
            }
            KeyCode::PageUp => {
                let page = rows.saturating_sub(2) as usize;
                self.selected = self.selected.saturating_sub(page);
            }
            KeyCode::PageDown => {
                let page = rows.saturating_sub(2) as usize;
                self.selected = (self.selected + page).min(self.visible.len() - 1);
            }
            KeyCode::Home => self.selected = 0,
            KeyCode::End => self.selected = self.visible.len() - 1,
            KeyCode::Left | KeyCode::Char('h') => {
                let id = self.selected_node();
                let node = self.tree.node(id);
                if node.expanded && !node.children.is_empty() {
                    self.tree.set_expanded(id, false);
                    self.engine.mark_partial_redraw();
                } else if let Some(parent) = node.parent {
                    self.select_node(parent);
                }
            }
            KeyCode::Right | KeyCode::Char('l') => {
                let id = self.selected_node();
                if !self.tree.node(id).children.is_empty() {
                    self.tree.set_expanded(id, true);
                    self.engine.mark_partial_redraw();
                }
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                for root in self.tree.roots().to_vec() {
                    self.tree.expand_all(root);
                }
                self.engine.mark_full_redraw();
            }
            KeyCode::Char('-') | KeyCode::Char('_') => {
                let id = self.selected_node();
                for root in self.tree.roots().to_vec() {
                    self.tree.collapse_all(root, true);
                }
                self.tree.expand_path(id);
                self.refresh_visible();
                self.select_node(id);
                self.engine.mark_full_redraw();
            }
            KeyCode::Char(ch @ '0'..='9') => {
                let level = ch as usize - '0' as usize;
                let id = self.selected_node();
                for root in self.tree.roots().to_vec() {
                    self.tree.expand_to_level(root, level);
                }
                if level == 0 || self.tree.level(id) <= level {
                    self.tree.expand_path(id);
                }
                self.refresh_visible();
                self.select_node(id);
                self.engine.mark_full_redraw();
            }
            KeyCode::Char('s') | KeyCode::Char('/') => {
                self.run_search(screen, "Search key: ", SearchScope::Keys)?;
            }
            KeyCode::Char('S') => {
                self.run_search(screen, "Search value: ", SearchScope::Values)?;
            }
            KeyCode::Char('n') => self.advance_search(1),
            KeyCode::Char('N') => self.advance_search(-1),
            KeyCode::Char('c') => {
                self.search = SearchState::build(&self.tree, "", SearchScope::Both);
                self.engine.mark_full_redraw();
            }
            KeyCode::Char('t') => {
                let scheme = self.engine.cycle_scheme();
                self.engine
                    .show_transient_status(scheme.status_message(), TRANSIENT_STATUS_LIFETIME);
            }
            KeyCode::Char('y') => {
                let text = self.tree.node(self.selected_node()).value.to_pretty_string();
                let _ = copy_to_clipboard(&text);
                self.engine.show_transient_status(
                    clipboard_status_message(),
                    TRANSIENT_STATUS_LIFETIME,
                );
                self.engine.mark_full_redraw();
            }
            KeyCode::Char('?') => {
                show_help(screen, self.engine.ascii())?;
                self.engine.mark_full_redraw();
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => self.running = false,
            _ => {}
        }
        Ok(())
    }

    fn run_search(
        &mut self,
        screen: &mut dyn Screen,
        prompt: &str,
        scope: SearchScope,
    ) -> Result<()> {
        if let Some(term) = prompt_search(screen, prompt)? {
            self.search = SearchState::build(&self.tree, &term, scope);
            if let Some(&first) = self.search.matches.first() {
                self.tree.expand_path(first);
                self.refresh_visible();
                self.select_node(first);
            }
        }
        self.engine.mark_full_redraw();
        Ok(())
    }

    fn advance_search(&mut self, direction: i32) {
        if let Some(target) = self.search.advance(self.selected_node(), direction) {
            self.tree.expand_path(target);
            self.refresh_visible();
            self.select_node(target);
            self.engine.mark_full_redraw();
        }
    }

    fn handle_mouse(&mut self, ev: MouseEvent, screen: &mut dyn Screen) -> Result<()> {
        let (_, rows) = screen.size();
        let viewport = rows.saturating_sub(1);
        match ev.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let now = Instant::now();
                let double = matches!(
                    self.last_click,
                    Some((row, at)) if row == ev.row && now.duration_since(at) < DOUBLE_CLICK_WINDOW
                );
                self.last_click = Some((ev.row, now));

                if ev.row < viewport {
                    let idx = self.engine.scroll_offset() + ev.row as usize;
                    if idx < self.visible.len() {
                        self.selected = idx;
                        let id = self.visible[idx];
                        let node = self.tree.node(id);
                        if node.children.is_empty() {
                            return Ok(());
                        }
                        let prefix = tree_prefix(&self.tree, id, self.engine.ascii());
                        let toggle_zone = display_width(&prefix) + 2;
                        if double || (ev.column as usize) < toggle_zone {
                            let expanded = node.expanded;
                            self.tree.set_expanded(id, !expanded);
                            self.engine.mark_partial_redraw();
                        }
                    }
                } else if ev.row == viewport {
                    if let Some(key) = self.engine.hint_at(ev.column) {
                        let synthetic = KeyEvent::new(KeyCode::Char(key), KeyModifiers::empty());
                        self.handle_key(synthetic, screen)?;
                    }
                }
            }
            MouseEventKind::ScrollUp => {
                self.selected = self.selected.saturating_sub(1);
            }
            MouseEventKind::ScrollDown => {
                if self.selected + 1 < self.visible.len() {
                    self.selected += 1;
                }
            }
            _ => {}
        }
        Ok(())
    }
}

fn view_loop(docs: &[Document], ascii: bool, mouse: bool, scheme: SchemeId) -> Result<()> {
    let mut screen = TerminalScreen::new(io::stdout(), scheme)?;
    let mut app = App::new(docs, ascii, scheme);

    while app.running {
        app.refresh_visible();
        if app.visible.is_empty() {
            // Roots are never hidden, so this indicates a logic error.
            screen.clear_all()?;
            screen.draw_text(0, 0, "No data to display", Role::Normal)?;
            screen.flush()?;
            event::read()?;
            break;
        }

        screen.set_scheme(app.engine.scheme());
        app.engine
            .render(&mut screen, &app.tree, &app.visible, app.selected, &app.search)?;
        screen.flush()?;

        let ev = if let Some(timeout) = app.engine.status_timeout() {
            if !event::poll(timeout)? {
                // Transient status expired; redraw the status line.
                continue;
            }
            event::read()?
        } else {
            event::read()?
        };

        match ev {
            Event::Key(key) => app.handle_key(key, &mut screen)?,
            Event::Mouse(me) if mouse => app.handle_mouse(me, &mut screen)?,
            Event::Resize(cols, rows) => {
                screen.set_size(cols, rows);
                app.engine.mark_full_redraw();
            }
            _ => {}
        }
    }
    Ok(())
}

/// Bottom-row line editor. Returns the trimmed term, or `None` when the
/// prompt is cancelled with Escape.
fn prompt_search(screen: &mut dyn Screen, prompt: &str) -> Result<Option<String>> {
    let (cols, rows) = screen.size();
    let row = rows.saturating_sub(1);
    let mut buffer = String::new();

    loop {
        screen.clear_row(row)?;
        let line = format!("{prompt}{buffer}");
        let line = truncate_to_width(&line, cols as usize);
        screen.draw_text(row, 0, line, Role::Normal)?;
        screen.flush()?;

        match event::read()? {
            Event::Key(key) => match key.code {
                KeyCode::Enter => return Ok(Some(buffer.trim().to_string())),
                KeyCode::Esc => return Ok(None),
                KeyCode::Backspace => {
                    buffer.pop();
                }
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    return Ok(None);
                }
                KeyCode::Char(ch) => buffer.push(ch),
                _ => {}
            },
            Event::Resize(_, _) => return Ok(None),
            _ => {}
        }
    }
}

/// Centered key-binding overlay; any key or click dismisses it.
fn show_help(screen: &mut dyn Screen, ascii: bool) -> Result<()> {
    let supported = osc52_likely();
    let mut copy_line = String::from("  y                Copy selected JSON to clipboard");
    if !supported {
        if env::var_os("TMUX").is_some() {
            copy_line.push_str(" (tmux: requires OSC 52 config)");
        } else {
            copy_line.push_str(" (no terminal support)");
        }
    }

    let arrows = if ascii { "Up/Down" } else { "\u{2191}/\u{2193}" };
    let left = if ascii { "<-" } else { "\u{2190}" };
    let right = if ascii { "->" } else { "\u{2192}" };
    let lines: Vec<String> = vec![
        "JSON Viewer Key Bindings:".into(),
        String::new(),
        format!("  {arrows:<16} Move selection up or down"),
        "  PgUp/PgDn        Move one page up or down".into(),
        "  Home/End         Jump to first or last item".into(),
        format!("  {left:<16} Collapse the current item or go to its parent"),
        format!("  {right:<16} Expand the current item"),
        "  +                Expand all items".into(),
        "  -                Collapse all items".into(),
        "  0-9              Expand to nesting level (0=collapse all, 1=first level, etc.)".into(),
        "  s                Search keys".into(),
        "  S                Search values".into(),
        "  n / N            Next / previous search match".into(),
        "  c                Clear search results".into(),
        "  t                Cycle color scheme".into(),
        copy_line,
        "  ?                Show this help screen".into(),
        "  q                Quit the program".into(),
        String::new(),
        "Press any key to return...".into(),
    ];

    let (cols, rows) = screen.size();
    let max_width = lines.iter().map(|l| display_width(l)).max().unwrap_or(0);
    let box_width = max_width + 4;
    let box_height = lines.len() + 2;
    let start_row = (rows as usize).saturating_sub(box_height) / 2;
    let start_col = (cols as usize).saturating_sub(box_width) / 2;

    let (tl, tr, bl, br, hor, ver) = if ascii {
        ("+", "+", "+", "+", "-", "|")
    } else {
        ("\u{250c}", "\u{2510}", "\u{2514}", "\u{2518}", "\u{2500}", "\u{2502}")
    };

    screen.clear_all()?;
    let horizontal = hor.repeat(box_width - 2);
    screen.draw_text(
        start_row as u16,
        start_col as u16,
        &format!("{tl}{horizontal}{tr}"),
        Role::Normal,
    )?;
    for (i, line) in lines.iter().enumerate() {
        let row = (start_row + 1 + i) as u16;
        screen.draw_text(row, start_col as u16, ver, Role::Normal)?;
        if !supported && line.contains("Copy selected JSON") {
            // Dim the unsupported-clipboard annotation.
            if let Some(pos) = line.find(" (") {
                let (main, suffix) = line.split_at(pos);
                screen.draw_text(row, (start_col + 1) as u16, &format!(" {main}"), Role::Normal)?;
                screen.draw_text(
                    row,
                    (start_col + 2 + display_width(main)) as u16,
                    suffix,
                    Role::TreeStructure,
                )?;
            } else {
                screen.draw_text(row, (start_col + 1) as u16, &format!(" {line}"), Role::Normal)?;
            }
        } else {
            screen.draw_text(row, (start_col + 1) as u16, &format!(" {line}"), Role::Normal)?;
        }
        screen.draw_text(row, (start_col + box_width - 1) as u16, ver, Role::Normal)?;
    }
    screen.draw_text(
        (start_row + box_height - 1) as u16,
        start_col as u16,
        &format!("{bl}{horizontal}{br}"),
        Role::Normal,
    )?;
    screen.flush()?;

    loop {
        match event::read()? {
            Event::Key(_) | Event::Resize(_, _) => return Ok(()),
            Event::Mouse(me) if matches!(me.kind, MouseEventKind::Down(_)) => return Ok(()),
            _ => {}
        }
    }
}
