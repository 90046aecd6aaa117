use crate::route::Route;
use tourney_api::Identifiable;
use tui::buffer::Buffer;
use tui::layout::{Constraint, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::Line;
use tui::widgets::{Block, Paragraph, Row, StatefulWidget, Table, TableState, Widget, Wrap};

/// Per-row control that acts on the record without opening it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    Delete,
}

impl RowAction {
    pub fn label(self) -> &'static str {
        match self {
            RowAction::Delete => "[d]elete",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollectionRow {
    /// Id of the record; stable across re-renders.
    pub key: u64,
    pub target: Route,
    pub cells: Vec<String>,
    pub actions: Vec<RowAction>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CollectionView {
    /// Nothing to list: still loading, or loaded but empty.
    Fallback(String),
    Rows(Vec<CollectionRow>),
}

impl CollectionView {
    pub fn rows(&self) -> &[CollectionRow] {
        match self {
            CollectionView::Fallback(_) => &[],
            CollectionView::Rows(rows) => rows,
        }
    }

    pub fn position(&self, key: u64) -> Option<usize> {
        self.rows().iter().position(|row| row.key == key)
    }
}

pub type RowActions<'a, T> = &'a dyn Fn(&T) -> Vec<RowAction>;

/// Build the view of a collection. `None` and an empty slice both produce
/// the fallback message; otherwise rows follow input order.
pub fn render_collection<T: Identifiable>(
    items: Option<&[T]>,
    target: impl Fn(&T) -> Route,
    content: impl Fn(&T) -> Vec<String>,
    actions: Option<RowActions<'_, T>>,
    fallback: &str,
) -> CollectionView {
    let items = match items {
        Some(items) if !items.is_empty() => items,
        _ => return CollectionView::Fallback(fallback.to_string()),
    };

    let rows = items
        .iter()
        .map(|item| CollectionRow {
            key: item.id(),
            target: target(item),
            cells: content(item),
            actions: actions.map(|build| build(item)).unwrap_or_default(),
        })
        .collect();
    CollectionView::Rows(rows)
}

/// Draws a [`CollectionView`] as a table with a header row. The selected
/// row is looked up by key.
pub struct CollectionTable<'a> {
    pub view: &'a CollectionView,
    pub headers: &'a [&'a str],
    pub selected: Option<u64>,
    pub block: Option<Block<'a>>,
}

impl Widget for CollectionTable<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let rows = match self.view {
            CollectionView::Fallback(message) => {
                let mut paragraph = Paragraph::new(message.as_str())
                    .style(Style::default().fg(Color::DarkGray))
                    .wrap(Wrap { trim: true });
                if let Some(block) = self.block {
                    paragraph = paragraph.block(block);
                }
                paragraph.render(area, buf);
                return;
            }
            CollectionView::Rows(rows) => rows,
        };

        let with_actions = rows.iter().any(|row| !row.actions.is_empty());
        let mut header: Vec<Line> = self.headers.iter().map(|h| Line::from(*h)).collect();
        let mut widths: Vec<Constraint> = self.headers.iter().map(|_| Constraint::Fill(1)).collect();
        if with_actions {
            header.push(Line::from(""));
            widths.push(Constraint::Length(10));
        }

        let body = rows.iter().map(|row| {
            let mut cells: Vec<Line> = row.cells.iter().map(|c| Line::from(c.as_str())).collect();
            if with_actions {
                let labels: Vec<&str> = row.actions.iter().map(|a| a.label()).collect();
                cells.push(Line::from(labels.join(" ")).style(Style::default().fg(Color::DarkGray)));
            }
            Row::new(cells)
        });

        let mut table = Table::new(body, widths)
            .header(Row::new(header).style(Style::default().add_modifier(Modifier::BOLD)))
            .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        if let Some(block) = self.block {
            table = table.block(block);
        }

        let mut state = TableState::default().with_selected(self.selected.and_then(|key| self.view.position(key)));
        StatefulWidget::render(table, area, buf, &mut state);
    }
}
