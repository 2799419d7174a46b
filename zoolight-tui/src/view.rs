use crate::{
    state::{Focus, Notice},
    styles,
};
use anyhow::Result;
use ratatui::{
    Frame, Terminal,
    backend::Backend,
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};
use textwrap::wrap;

/// Minimum width of one result card, borders included.
pub const CARD_WIDTH: u16 = 28;
/// Border, name, image, border.
pub const CARD_HEIGHT: u16 = 4;

/// Grid geometry from the last draw; drives arrow-key movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridMetrics {
    pub columns: usize,
    pub rows: usize,
}

impl Default for GridMetrics {
    fn default() -> Self {
        Self {
            columns: 1,
            rows: 1,
        }
    }
}

pub struct ViewSnap {
    pub top_backdrop: Option<String>,
    pub bottom_backdrop: Option<String>,
    pub focus: Focus,
    pub main: MainSnap,
    pub tree: TreeSnap,
    pub status: StatusSnap,
}

pub enum MainSnap {
    Results(ResultsSnap),
    Detail(DetailSnap),
}

pub struct ResultsSnap {
    pub query: String,
    pub input_cursor: usize,
    pub cards: Vec<CardSnap>,
    pub selected: usize,
    pub scroll_row: usize,
    /// Set when the grid is empty: message plus an optional dim hint.
    pub empty: Option<(&'static str, Option<&'static str>)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSnap {
    pub url: String,
    pub placeholder: bool,
    pub checking: bool,
}

pub struct CardSnap {
    pub name: String,
    pub image: ImageSnap,
}

pub struct DetailSnap {
    pub title: String,
    pub taxonomy: String,
    pub habitat: String,
    pub image: ImageSnap,
    pub back_label: &'static str,
    pub actions: [&'static str; 2],
}

pub struct TreeSnap {
    pub title: &'static str,
    pub rows: Vec<TreeLine>,
    pub cursor: usize,
}

pub struct TreeLine {
    pub depth: usize,
    pub text: String,
    pub node: bool,
}

pub struct StatusSnap {
    pub spinner: &'static str,
    pub load: String,
    pub load_failed: bool,
    pub notice: Option<Notice>,
    pub hints: &'static str,
}

pub fn draw<B: Backend>(term: &mut Terminal<B>, snap: &ViewSnap) -> Result<GridMetrics> {
    let mut metrics = GridMetrics::default();
    term.draw(|frame| {
        metrics = render(frame, snap);
    })?;
    Ok(metrics)
}

fn render(frame: &mut Frame, snap: &ViewSnap) -> GridMetrics {
    let area = frame.area();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(6),
            Constraint::Length(4),
            Constraint::Length(1),
        ])
        .split(area);

    render_backdrop(frame, layout[0], snap.top_backdrop.as_deref());
    render_backdrop(frame, layout[3], snap.bottom_backdrop.as_deref());

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(layout[1]);

    let metrics = match &snap.main {
        MainSnap::Results(results) => render_results(frame, body[0], results, snap.focus),
        MainSnap::Detail(detail) => {
            render_detail(frame, body[0], detail, snap.focus);
            GridMetrics::default()
        }
    };
    render_tree(frame, body[1], &snap.tree, snap.focus == Focus::Tree);
    render_status(frame, layout[2], &snap.status);
    metrics
}

fn panel_block(title: &str, focused: bool) -> Block<'_> {
    let block = Block::default().borders(Borders::ALL).title(title);
    if focused {
        block.border_style(styles::focused_border())
    } else {
        block
    }
}

fn render_backdrop(frame: &mut Frame, area: Rect, url: Option<&str>) {
    let Some(url) = url else { return };
    let line = Line::from(vec![
        Span::styled(" 🦁 Zoolight ", styles::banner()),
        Span::styled(format!(" {url}"), styles::dim()),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_results(frame: &mut Frame, area: Rect, snap: &ResultsSnap, focus: Focus) -> GridMetrics {
    let split = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    // Search bar
    let search_focused = focus == Focus::Search;
    let text = if snap.query.is_empty() && !search_focused {
        Line::from(Span::styled("Search animals...", styles::dim()))
    } else {
        Line::from(snap.query.as_str())
    };
    let input = Paragraph::new(text).block(
        panel_block(" Search ", search_focused)
            .title(Line::from(Span::styled(" Search [Ctrl-S] ", styles::button())).right_aligned()),
    );
    frame.render_widget(Clear, split[0]);
    frame.render_widget(input, split[0]);
    if search_focused {
        frame.set_cursor_position(Position {
            x: split[0].x + 1 + visual_caret_col(&snap.query, snap.input_cursor),
            y: split[0].y + 1,
        });
    }

    // Result grid
    let grid_focused = focus == Focus::Results;
    let title = format!(" Results ({}) ", snap.cards.len());
    let block = panel_block(&title, grid_focused);
    let inner = block.inner(split[1]);
    frame.render_widget(block, split[1]);

    let metrics = GridMetrics {
        columns: usize::from((inner.width / CARD_WIDTH).max(1)),
        rows: usize::from((inner.height / CARD_HEIGHT).max(1)),
    };

    if let Some((message, hint)) = snap.empty {
        let mut lines = vec![Line::from(""), Line::from(message).centered()];
        if let Some(hint) = hint {
            lines.push(Line::from(Span::styled(hint, styles::dim())).centered());
        }
        frame.render_widget(Paragraph::new(lines), inner);
        return metrics;
    }

    let cursor_row = snap.selected / metrics.columns;
    let first_row = if cursor_row < snap.scroll_row {
        cursor_row
    } else if cursor_row >= snap.scroll_row + metrics.rows {
        cursor_row + 1 - metrics.rows
    } else {
        snap.scroll_row
    };

    let card_width = inner.width / metrics.columns as u16;
    for row in 0..metrics.rows {
        for col in 0..metrics.columns {
            let index = (first_row + row) * metrics.columns + col;
            let Some(card) = snap.cards.get(index) else { break };
            let rect = Rect {
                x: inner.x + col as u16 * card_width,
                y: inner.y + row as u16 * CARD_HEIGHT,
                width: card_width,
                height: CARD_HEIGHT,
            }
            .intersection(inner);
            render_card(frame, rect, card, grid_focused && index == snap.selected);
        }
    }
    metrics
}

fn render_card(frame: &mut Frame, area: Rect, card: &CardSnap, highlighted: bool) {
    let block = Block::default().borders(Borders::ALL);
    let (block, name_style) = if highlighted {
        (block.border_style(styles::focused_border()), styles::selected())
    } else {
        (block, styles::card_title())
    };
    let lines = vec![
        Line::from(Span::styled(card.name.as_str(), name_style)),
        image_line(&card.image),
    ];
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn image_line(image: &ImageSnap) -> Line<'_> {
    if image.checking {
        Line::from(Span::styled(format!("… {}", image.url), styles::dim()))
    } else if image.placeholder {
        Line::from(Span::styled(format!("🖼 {}", image.url), styles::dim()))
    } else {
        Line::from(format!("🖼 {}", image.url))
    }
}

fn render_detail(frame: &mut Frame, area: Rect, snap: &DetailSnap, focus: Focus) {
    let split = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(5)])
        .split(area);

    let back = Line::from(vec![
        Span::styled(format!(" {} ", snap.back_label), styles::back_button()),
        Span::styled("  Esc", styles::dim()),
    ]);
    frame.render_widget(Paragraph::new(back), split[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(split[1]);

    let info_block = panel_block(" Details ", focus == Focus::Results);
    let width = usize::from(info_block.inner(columns[0]).width.max(1));
    let mut lines = vec![
        Line::from(Span::styled(snap.title.as_str(), styles::detail_title())),
        Line::from(""),
    ];
    lines.extend(wrapped(&snap.taxonomy, width, styles::value()));
    lines.push(Line::from(""));
    lines.extend(wrapped(&snap.habitat, width, styles::value()));
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(format!(" {} ", snap.actions[0]), styles::button()),
        Span::raw(" "),
        Span::styled(format!(" {} ", snap.actions[1]), styles::inert_button()),
    ]));
    lines.push(Line::from(Span::styled("l / c", styles::dim())));
    frame.render_widget(Paragraph::new(lines).block(info_block), columns[0]);

    let image_block = panel_block(" Image ", false);
    let width = usize::from(image_block.inner(columns[1]).width.max(1));
    let mut lines = Vec::new();
    if snap.image.placeholder {
        lines.push(Line::from(Span::styled("No Image", styles::label())));
    } else if snap.image.checking {
        lines.push(Line::from(Span::styled("checking…", styles::dim())));
    }
    let style = if snap.image.placeholder {
        styles::dim()
    } else {
        Style::default()
    };
    lines.extend(wrapped(&snap.image.url, width, style));
    frame.render_widget(Paragraph::new(lines).block(image_block), columns[1]);
}

fn render_tree(frame: &mut Frame, area: Rect, snap: &TreeSnap, focused: bool) {
    let items: Vec<ListItem> = snap
        .rows
        .iter()
        .map(|row| {
            let style = if row.node {
                styles::tree_node()
            } else {
                styles::value()
            };
            ListItem::new(Line::from(Span::styled(
                format!("{}{}", "  ".repeat(row.depth), row.text),
                style,
            )))
        })
        .collect();

    let title = format!(" {} ", snap.title);
    let mut list = List::new(items).block(panel_block(&title, focused));
    if focused {
        list = list.highlight_style(styles::selected());
    }
    let mut state = ListState::default().with_selected(Some(snap.cursor));
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_status(frame: &mut Frame, area: Rect, snap: &StatusSnap) {
    let load_style = if snap.load_failed {
        styles::error()
    } else {
        styles::label()
    };
    let mut first = vec![
        Span::raw(" "),
        Span::styled(snap.spinner, styles::focused_border()),
        Span::raw(" "),
        Span::styled(snap.load.as_str(), load_style),
    ];
    if let Some(notice) = &snap.notice {
        let style = if notice.error {
            styles::error()
        } else {
            styles::dim()
        };
        first.push(Span::raw(" • "));
        first.push(Span::styled(notice.text.as_str(), style));
    }
    let lines = vec![
        Line::from(first),
        Line::from(Span::styled(format!(" {}", snap.hints), styles::dim())),
    ];
    let status = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Status "));
    frame.render_widget(status, area);
}

fn wrapped(text: &str, width: usize, style: Style) -> Vec<Line<'static>> {
    wrap(text, width)
        .into_iter()
        .map(|seg| Line::from(Span::styled(seg.into_owned(), style)))
        .collect()
}

fn visual_caret_col(input: &str, cursor: usize) -> u16 {
    use unicode_width::UnicodeWidthStr;
    UnicodeWidthStr::width(&input[..cursor.min(input.len())]) as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::backend::TestBackend;
    use url::Url;
    use zoolight_catalog::{AnimalRecord, image::ImageSlots};

    fn state_with(records: Vec<AnimalRecord>) -> AppState {
        let mut state = AppState::new(
            ImageSlots::new("card-ph", "detail-ph", true),
            Url::parse("https://www.google.com/search").unwrap(),
            vec!["https://backdrop.test/top.png".into()],
        );
        state.begin_load();
        state.apply_dataset(Ok(records));
        state
    }

    fn screen(state: &AppState) -> (String, GridMetrics) {
        let mut term = Terminal::new(TestBackend::new(120, 32)).unwrap();
        let metrics = draw(&mut term, &state.snapshot(" ")).unwrap();
        let text = term
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>();
        (text, metrics)
    }

    #[test]
    fn empty_catalog_renders_the_message() {
        let (text, _) = screen(&state_with(Vec::new()));
        assert!(text.contains("No animals found."));
        assert!(text.contains("https://backdrop.test/top.png"));
    }

    #[test]
    fn cards_fill_the_grid_and_report_columns() {
        let records = ["Lion", "Tiger", "Zebra"]
            .into_iter()
            .map(|name| AnimalRecord::new().with("Common Name", name))
            .collect();
        let (text, metrics) = screen(&state_with(records));
        assert!(metrics.columns >= 2, "{metrics:?}");
        assert!(metrics.rows >= 2, "{metrics:?}");
        for name in ["Lion", "Tiger", "Zebra"] {
            assert!(text.contains(name), "missing {name}");
        }
        assert!(text.contains("card-ph"));
    }

    #[test]
    fn detail_replaces_the_search_panel() {
        let mut state = state_with(vec![AnimalRecord::new().with("Common Name", "Lion")]);
        state.handle_key(KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE));
        state.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));

        let (text, _) = screen(&state);
        assert!(text.contains("Back to Results"));
        assert!(text.contains("Habitat: N/A. Diet: N/A."));
        assert!(text.contains("Learn More"));
        assert!(!text.contains("Search animals..."));
    }
}
