//! Terminal-independent UI state.
//!
//! `AppState` owns the catalog controller, the classification tree, image
//! slots and every cursor. Key presses mutate it directly; anything that
//! needs the outside world comes back as an [`Effect`] for the actor.
use crate::view::{
    CardSnap, DetailSnap, GridMetrics, ImageSnap, MainSnap, ResultsSnap, StatusSnap, TreeLine,
    TreeSnap, ViewSnap,
};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use url::Url;
use zoolight_actors::DatasetReply;
use zoolight_catalog::{
    AnimalDetail, AnimalRecord, DetailAction, DisclosureNode, LoadState, NOT_AVAILABLE, Panel,
    ResultsView, SearchController, animal_kingdom,
    image::{ImageKind, ImageSlots, ResolvedImage},
    tree::{RowKind, TREE_TITLE},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Search,
    Results,
    Tree,
}

const RESULTS_RING: &[Focus] = &[Focus::Search, Focus::Results, Focus::Tree];
const DETAIL_RING: &[Focus] = &[Focus::Results, Focus::Tree];

/// Work a key press hands back to the actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Quit,
    Open(Url),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub error: bool,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            error: true,
        }
    }
}

pub struct AppState {
    catalog: SearchController,
    tree: DisclosureNode,
    images: ImageSlots,
    search_url: Url,
    backdrops: Vec<String>,

    focus: Focus,
    input_cursor: usize,
    card_cursor: usize,
    scroll_row: usize,
    grid: GridMetrics,
    tree_cursor: usize,

    notice: Option<Notice>,
    dirty: bool,
}

impl AppState {
    pub fn new(images: ImageSlots, search_url: Url, backdrops: Vec<String>) -> Self {
        Self {
            catalog: SearchController::new(),
            tree: animal_kingdom(),
            images,
            search_url,
            backdrops,
            focus: Focus::Search,
            input_cursor: 0,
            card_cursor: 0,
            scroll_row: 0,
            grid: GridMetrics::default(),
            tree_cursor: 0,
            notice: None,
            dirty: true,
        }
    }

    pub fn catalog(&self) -> &SearchController {
        &self.catalog
    }

    pub fn tree(&self) -> &DisclosureNode {
        &self.tree
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn card_cursor(&self) -> usize {
        self.card_cursor
    }

    pub fn tree_cursor(&self) -> usize {
        self.tree_cursor
    }

    pub fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.catalog.load_state(), LoadState::Pending)
    }

    /// `false` when the fetch was already started.
    pub fn begin_load(&mut self) -> bool {
        self.dirty = true;
        self.catalog.begin_load()
    }

    pub fn apply_dataset(&mut self, reply: DatasetReply) {
        match reply {
            Ok(records) => {
                let count = records.len();
                if self.catalog.load(records) {
                    tracing::info!(records = count, "catalog ready");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "catalog unavailable");
                self.catalog.fail_load(e.to_string());
            }
        }
        self.card_cursor = 0;
        self.scroll_row = 0;
        self.dirty = true;
    }

    pub fn apply_probe(&mut self, url: &str, reachable: bool) {
        self.images.record(url, reachable);
        self.dirty = true;
    }

    /// Record the geometry of the last draw.
    pub fn set_grid(&mut self, metrics: GridMetrics) {
        if self.grid != metrics {
            self.grid = metrics;
            self.keep_cursor_visible();
            self.dirty = true;
        }
    }

    /// Image URLs on screen that have not been probed yet, claimed so
    /// each is asked for only once.
    pub fn claim_probes(&mut self) -> Vec<String> {
        let mut urls: Vec<String> = match self.catalog.panel() {
            Panel::Detail => self
                .catalog
                .selected()
                .and_then(AnimalRecord::image)
                .map(str::to_string)
                .into_iter()
                .collect(),
            Panel::Results => {
                let cols = self.grid.columns.max(1);
                let start = self.scroll_row * cols;
                let end = (start + cols * self.grid.rows.max(1)).min(self.catalog.filtered_len());
                (start..end)
                    .filter_map(|i| self.catalog.filtered_record(i))
                    .filter_map(AnimalRecord::image)
                    .map(str::to_string)
                    .collect()
            }
        };
        urls.dedup();
        urls.retain(|url| self.images.request_probe(url));
        urls
    }

    /// Search URL for the selected animal.
    pub fn learn_more(&self) -> Option<Url> {
        self.catalog
            .selected()
            .map(|record| AnimalDetail::new(record).learn_more_url(&self.search_url))
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Effect> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        self.dirty = true;

        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL)
            | (KeyCode::Char('q'), KeyModifiers::CONTROL) => return Some(Effect::Quit),
            (KeyCode::Char('s'), KeyModifiers::CONTROL) => {
                if self.catalog.panel() == Panel::Results {
                    self.commit_search();
                }
                return None;
            }
            (KeyCode::Tab, _) => {
                self.cycle_focus(true);
                return None;
            }
            (KeyCode::BackTab, _) => {
                self.cycle_focus(false);
                return None;
            }
            _ => {}
        }

        match (self.focus, self.catalog.panel()) {
            (Focus::Search, _) => self.search_key(key),
            (Focus::Results, Panel::Results) => self.grid_key(key),
            (Focus::Results, Panel::Detail) => self.detail_key(key),
            (Focus::Tree, _) => self.tree_key(key),
        }
    }

    fn ring(&self) -> &'static [Focus] {
        match self.catalog.panel() {
            Panel::Results => RESULTS_RING,
            Panel::Detail => DETAIL_RING,
        }
    }

    fn cycle_focus(&mut self, forward: bool) {
        let ring = self.ring();
        let pos = ring.iter().position(|f| *f == self.focus).unwrap_or(0);
        let next = if forward {
            (pos + 1) % ring.len()
        } else {
            (pos + ring.len() - 1) % ring.len()
        };
        self.focus = ring[next];
    }

    fn commit_search(&mut self) {
        self.catalog.run_search();
        self.card_cursor = 0;
        self.scroll_row = 0;
    }

    fn edit_query(&mut self, edit: impl FnOnce(&mut String, &mut usize)) {
        let mut text = self.catalog.query().to_string();
        let mut cursor = self.input_cursor.min(text.len());
        edit(&mut text, &mut cursor);
        self.input_cursor = cursor;
        self.catalog.set_query(text);
    }

    fn search_key(&mut self, key: KeyEvent) -> Option<Effect> {
        let len = self.catalog.query().len();
        match (key.code, key.modifiers) {
            (KeyCode::Enter, _) => self.commit_search(),
            (KeyCode::Esc, _) => {
                self.catalog.set_query("");
                self.input_cursor = 0;
            }
            (KeyCode::Down, _) => self.focus = Focus::Results,
            (KeyCode::Left, _) => self.input_cursor = prev_boundary(self.catalog.query(), self.input_cursor),
            (KeyCode::Right, _) => self.input_cursor = next_boundary(self.catalog.query(), self.input_cursor),
            (KeyCode::Home, _) => self.input_cursor = 0,
            (KeyCode::End, _) => self.input_cursor = len,
            (KeyCode::Backspace, _) => self.edit_query(|text, cursor| {
                if *cursor == 0 {
                    return;
                }
                let prev = prev_boundary(text, *cursor);
                text.drain(prev..*cursor);
                *cursor = prev;
            }),
            (KeyCode::Delete, _) => self.edit_query(|text, cursor| {
                if *cursor >= text.len() {
                    return;
                }
                let end = next_boundary(text, *cursor);
                text.drain(*cursor..end);
            }),
            (KeyCode::Char(ch), m) if !m.contains(KeyModifiers::CONTROL) => {
                self.edit_query(|text, cursor| {
                    text.insert(*cursor, ch);
                    *cursor += ch.len_utf8();
                })
            }
            _ => {}
        }
        None
    }

    fn grid_key(&mut self, key: KeyEvent) -> Option<Effect> {
        let len = self.catalog.filtered_len();
        if len == 0 {
            if key.code == KeyCode::Up {
                self.focus = Focus::Search;
            }
            return None;
        }

        let cols = self.grid.columns.max(1);
        let page = cols * self.grid.rows.max(1);
        let last = len - 1;
        let cur = self.card_cursor.min(last);
        self.card_cursor = match key.code {
            KeyCode::Left => cur.saturating_sub(1),
            KeyCode::Right => (cur + 1).min(last),
            KeyCode::Up if cur < cols => {
                self.focus = Focus::Search;
                cur
            }
            KeyCode::Up => cur - cols,
            KeyCode::Down if cur / cols < last / cols => (cur + cols).min(last),
            KeyCode::PageUp => cur.saturating_sub(page),
            KeyCode::PageDown => (cur + page).min(last),
            KeyCode::Home => 0,
            KeyCode::End => last,
            KeyCode::Enter => {
                if let Some(record) = self.catalog.select(cur) {
                    tracing::info!(animal = record.common_name().unwrap_or(NOT_AVAILABLE), "showing detail");
                }
                cur
            }
            _ => cur,
        };
        self.keep_cursor_visible();
        None
    }

    fn detail_key(&mut self, key: KeyEvent) -> Option<Effect> {
        match key.code {
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('b') => {
                self.catalog.deselect();
                None
            }
            KeyCode::Char('l') => self.learn_more().map(Effect::Open),
            KeyCode::Char('c') => {
                tracing::debug!("contact pressed; nothing to do");
                None
            }
            _ => None,
        }
    }

    fn tree_key(&mut self, key: KeyEvent) -> Option<Effect> {
        let (count, target) = {
            let rows = self.tree.visible_rows();
            let target = rows.get(self.tree_cursor).and_then(|row| match row.kind {
                RowKind::Node { expanded, .. } => Some((row.path.clone(), expanded)),
                RowKind::Leaf(_) => None,
            });
            (rows.len(), target)
        };
        let last = count.saturating_sub(1);

        match key.code {
            KeyCode::Up => self.tree_cursor = self.tree_cursor.saturating_sub(1),
            KeyCode::Down => self.tree_cursor = (self.tree_cursor + 1).min(last),
            KeyCode::Home => self.tree_cursor = 0,
            KeyCode::End => self.tree_cursor = last,
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some((path, _)) = target {
                    self.tree.toggle_at(&path);
                }
            }
            KeyCode::Right => {
                if let Some((path, false)) = target {
                    self.tree.toggle_at(&path);
                }
            }
            KeyCode::Left => {
                if let Some((path, true)) = target {
                    self.tree.toggle_at(&path);
                }
            }
            _ => {}
        }
        self.tree_cursor = self
            .tree_cursor
            .min(self.tree.visible_rows().len().saturating_sub(1));
        None
    }

    fn keep_cursor_visible(&mut self) {
        let cols = self.grid.columns.max(1);
        let rows = self.grid.rows.max(1);
        let row = self.card_cursor / cols;
        if row < self.scroll_row {
            self.scroll_row = row;
        } else if row >= self.scroll_row + rows {
            self.scroll_row = row + 1 - rows;
        }
    }

    pub fn snapshot(&self, spinner: &'static str) -> ViewSnap {
        let main = match self.catalog.selected() {
            Some(record) => MainSnap::Detail(self.detail_snap(record)),
            None => MainSnap::Results(self.results_snap()),
        };

        let rows = self
            .tree
            .visible_rows()
            .iter()
            .map(|row| TreeLine {
                depth: row.depth,
                text: row.text(),
                node: row.is_node(),
            })
            .collect();

        ViewSnap {
            top_backdrop: self.backdrops.first().cloned(),
            bottom_backdrop: self.backdrops.get(1).cloned(),
            focus: self.focus,
            main,
            tree: TreeSnap {
                title: TREE_TITLE,
                rows,
                cursor: self.tree_cursor,
            },
            status: self.status_snap(spinner),
        }
    }

    fn image_snap(&self, image: Option<&str>, kind: ImageKind) -> ImageSnap {
        let ResolvedImage {
            url,
            placeholder,
            checking,
        } = self.images.resolve(image, kind);
        ImageSnap {
            url: url.to_string(),
            placeholder,
            checking,
        }
    }

    fn results_snap(&self) -> ResultsSnap {
        let (cards, empty) = match self.catalog.results() {
            ResultsView::Cards(records) => {
                let cards = records
                    .into_iter()
                    .map(|record| CardSnap {
                        name: record.common_name().unwrap_or(NOT_AVAILABLE).to_string(),
                        image: self.image_snap(record.image(), ImageKind::Card),
                    })
                    .collect();
                (cards, None)
            }
            ResultsView::Empty { message, hint } => (Vec::new(), Some((message, hint))),
        };
        ResultsSnap {
            query: self.catalog.query().to_string(),
            input_cursor: self.input_cursor.min(self.catalog.query().len()),
            cards,
            selected: self.card_cursor,
            scroll_row: self.scroll_row,
            empty,
        }
    }

    fn detail_snap(&self, record: &AnimalRecord) -> DetailSnap {
        let detail = AnimalDetail::new(record);
        DetailSnap {
            title: detail.title().to_string(),
            taxonomy: detail.taxonomy_line(),
            habitat: detail.habitat_line(),
            image: self.image_snap(record.image(), ImageKind::Detail),
            back_label: DetailAction::BackToResults.label(),
            actions: [DetailAction::LearnMore.label(), DetailAction::Contact.label()],
        }
    }

    fn status_snap(&self, spinner: &'static str) -> StatusSnap {
        let (load, load_failed) = match self.catalog.load_state() {
            LoadState::NotStarted => ("Starting…".to_string(), false),
            LoadState::Pending => ("Loading animals…".to_string(), false),
            LoadState::Loaded => (
                format!(
                    "{} of {} animals",
                    self.catalog.filtered_len(),
                    self.catalog.dataset().len()
                ),
                false,
            ),
            LoadState::Failed(reason) => (format!("Could not load animals: {reason}"), true),
        };
        StatusSnap {
            spinner,
            load,
            load_failed,
            notice: self.notice.clone(),
            hints: self.hints(),
        }
    }

    fn hints(&self) -> &'static str {
        match (self.focus, self.catalog.panel()) {
            (Focus::Search, _) => "Enter or Ctrl-S search • Esc clear • Tab next panel • Ctrl-Q quit",
            (Focus::Results, Panel::Results) => "Arrows move • Enter open • Tab next panel • Ctrl-Q quit",
            (Focus::Results, Panel::Detail) => "Esc back • l Learn More • c Contact • Tab next panel",
            (Focus::Tree, _) => "Up/Down move • Enter/Space toggle • Tab next panel",
        }
    }
}

fn prev_boundary(s: &str, i: usize) -> usize {
    let mut j = i.min(s.len()).saturating_sub(1);
    while j > 0 && !s.is_char_boundary(j) {
        j -= 1;
    }
    j
}

fn next_boundary(s: &str, i: usize) -> usize {
    if i >= s.len() {
        return s.len();
    }
    let mut j = i + 1;
    while j < s.len() && !s.is_char_boundary(j) {
        j += 1;
    }
    j
}
