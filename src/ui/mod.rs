//! Terminal renderer for the dropdown table.
//!
//! Draws the input box, the result table beneath it while the control is not
//! closed, and a status line. Every frame records hit-test rectangles in a
//! [`UiLayout`] so the binary can translate mouse events into intents.

use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Row as TableRow, Table, TableState},
};
use unicode_width::UnicodeWidthStr;

use crate::control::DropdownTable;
use crate::state::{Column, ColumnWidth, Lifecycle, SortDirection};

mod layout;

pub use layout::{CellRect, Hit, UiLayout, contains};

/// Color palette used by the renderer.
#[derive(Clone, Copy, Debug)]
pub struct Palette {
    /// Canvas background.
    pub base: Color,
    /// Primary text.
    pub text: Color,
    /// Borders and low-emphasis text.
    pub overlay: Color,
    /// Focus and highlight accent.
    pub accent: Color,
    /// Selected-row marker.
    pub selected: Color,
    /// Loading indicator.
    pub loading: Color,
    /// Errors.
    pub error: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            base: Color::Rgb(0x1e, 0x1e, 0x2e),
            text: Color::Rgb(0xcd, 0xd6, 0xf4),
            overlay: Color::Rgb(0x7f, 0x84, 0x9c),
            accent: Color::Rgb(0x74, 0xc7, 0xec),
            selected: Color::Rgb(0xa6, 0xe3, 0xa1),
            loading: Color::Rgb(0xf9, 0xe2, 0xaf),
            error: Color::Rgb(0xf3, 0x8b, 0xa8),
        }
    }
}

/// Column spacing shared by the table widget and header hit-testing.
const COLUMN_SPACING: u16 = 1;

/// What: Draw one frame and record hit-test rectangles.
///
/// Inputs:
/// - `f`: Frame to draw into
/// - `table`: Control to render
/// - `layout`: Receives the rectangles of this frame
/// - `status`: Text for the status line
///
/// Details:
/// - The table scrolls so the highlighted row stays visible; the resulting
///   offset is recorded for row hit-testing.
pub fn render(f: &mut Frame, table: &DropdownTable, layout: &mut UiLayout, status: &str) {
    let th = Palette::default();
    let area = f.area();
    layout.reset();
    f.render_widget(Block::default().style(Style::default().bg(th.base)), area);

    let [input_area, body_area, status_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_input(f, table, input_area, &th);
    layout.input_rect = Some(rect_tuple(input_area));

    let state = table.state();
    if state.lifecycle != Lifecycle::Closed {
        let rows = state.presented_len();
        let wanted = u16::try_from(rows.max(1)).unwrap_or(u16::MAX).saturating_add(3);
        let height = wanted.min(body_area.height);
        let dropdown = Rect {
            height,
            ..body_area
        };
        render_dropdown(f, table, dropdown, layout, &th);
    }

    let line = Line::from(Span::styled(status.to_string(), Style::default().fg(th.overlay)));
    f.render_widget(Paragraph::new(line), status_area);
}

/// Draw the input box and place the cursor after the text.
fn render_input(f: &mut Frame, table: &DropdownTable, area: Rect, th: &Palette) {
    let state = table.state();
    let border = if state.disabled { th.overlay } else { th.accent };
    let title = if state.settings.multiselect {
        " Search (multi) "
    } else {
        " Search "
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border))
        .title(Span::styled(title, Style::default().fg(th.overlay)));
    let text = Paragraph::new(Span::styled(
        table.value().to_string(),
        Style::default().fg(th.text),
    ))
    .block(block);
    f.render_widget(text, area);
    if !state.disabled {
        let width = u16::try_from(table.value().width()).unwrap_or(u16::MAX);
        let x = area
            .x
            .saturating_add(1)
            .saturating_add(width)
            .min(area.right().saturating_sub(2));
        f.set_cursor_position((x, area.y.saturating_add(1)));
    }
}

/// Draw the result table inside a bordered dropdown frame.
fn render_dropdown(
    f: &mut Frame,
    table: &DropdownTable,
    area: Rect,
    layout: &mut UiLayout,
    th: &Palette,
) {
    let state = table.state();
    let presented = state.presented();
    let title = match state.lifecycle {
        Lifecycle::Loading => Span::styled(" Loading… ", Style::default().fg(th.loading)),
        _ if presented.is_empty() => Span::styled(" No results ", Style::default().fg(th.error)),
        _ => Span::styled(
            format!(" Results ({}) ", presented.len()),
            Style::default().fg(th.overlay),
        ),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(th.overlay))
        .title(title);
    let inner = block.inner(area);
    f.render_widget(Clear, area);

    let columns = &state.settings.columns;
    let widths = column_constraints(columns);
    let header_cells: Vec<Line> = columns
        .iter()
        .map(|c| {
            let arrow = match &state.sort {
                Some(s) if s.column == c.key => match s.direction {
                    SortDirection::Ascending => " ▲",
                    SortDirection::Descending => " ▼",
                },
                _ => "",
            };
            Line::from(format!("{}{arrow}", c.title))
        })
        .collect();
    let header = TableRow::new(header_cells).style(
        Style::default()
            .fg(th.accent)
            .add_modifier(Modifier::BOLD),
    );

    let body: Vec<TableRow> = presented
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let cells: Vec<String> = columns.iter().map(|c| c.cell_text(row, i)).collect();
            let style = if state.is_selected(row) {
                Style::default().fg(th.selected)
            } else {
                Style::default().fg(th.text)
            };
            TableRow::new(cells).style(style)
        })
        .collect();

    let widget = Table::new(body, widths.clone())
        .header(header)
        .block(block)
        .column_spacing(COLUMN_SPACING)
        .flex(Flex::Start)
        .row_highlight_style(
            Style::default()
                .bg(th.accent)
                .fg(th.base)
                .add_modifier(Modifier::BOLD),
        );
    let mut ts = TableState::default().with_selected(state.highlight);
    f.render_stateful_widget(widget, area, &mut ts);

    layout.dropdown_rect = Some(rect_tuple(area));
    layout.row_offset = ts.offset();
    layout.row_count = presented.len();
    if inner.height > 0 {
        let header_row = Rect { height: 1, ..inner };
        let cells = Layout::horizontal(widths)
            .flex(Flex::Start)
            .spacing(COLUMN_SPACING)
            .split(header_row);
        layout.header_cells = columns
            .iter()
            .zip(cells.iter())
            .map(|(c, r)| (c.key.clone(), rect_tuple(*r)))
            .collect();
        layout.rows_rect = Some(rect_tuple(Rect {
            y: inner.y.saturating_add(1),
            height: inner.height.saturating_sub(1),
            ..inner
        }));
    }
}

/// What: Translate column width hints into layout constraints.
///
/// Inputs:
/// - `columns`: Configured columns
///
/// Output:
/// - One constraint per column; auto columns share the remaining space.
#[must_use]
pub fn column_constraints(columns: &[Column]) -> Vec<Constraint> {
    columns
        .iter()
        .map(|c| match c.width {
            ColumnWidth::Auto => Constraint::Fill(1),
            ColumnWidth::Fixed(w) => Constraint::Length(w),
            ColumnWidth::Percent(p) => Constraint::Percentage(p.min(100)),
        })
        .collect()
}

/// Convert a ratatui rect into a hit-test tuple.
const fn rect_tuple(r: Rect) -> CellRect {
    (r.x, r.y, r.width, r.height)
}
