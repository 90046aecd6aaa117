use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs, Wrap};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::App;
use crate::components::collection::CollectionTable;
use crate::route::Route;
use crate::state::detail::DetailPhase;
use crate::state::entity::{Entity, EntityKind, with_entity};
use crate::state::form::{FieldKind, FormState};
use crate::state::network::{ERROR_CHAR, LoadingState};
use crate::state::page::Collections;
use crate::ui::layout::LayoutAreas;

const HELP_TEXT: &str = "\
Global
  1-6         switch collection
  ?           toggle this help
  \"           toggle log pane
  f           full screen
  q / Ctrl-C  quit

Collection page
  j/k ↑/↓     move selection
  Enter       open selected record
  n           new record
  d           delete selected record
  r           reload
  t           cycle tournament filter
  h / a       cycle home / away team filter (games)
  m           cycle tournament team filter (tournament players)
  c           clear filters

Detail page
  e           edit
  d           delete
  r           reload
  Esc / b     back to the collection

Forms
  Tab/↓ ⇧Tab/↑  next / previous field
  ←/→         pick an option
  Enter       submit
  Esc         cancel";

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let result = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
        }

        let route = app.state.route;
        match route {
            Route::Collection(kind) => {
                with_entity!(kind, E => draw_collection::<E>(f, layout.main, app))
            }
            Route::Detail(kind, id) => {
                with_entity!(kind, E => draw_detail::<E>(f, layout.main, app, id))
            }
        }

        if let Some(log_area) = layout.logs {
            draw_logs(f, log_area);
        }
        if let Some(confirm) = app.state.confirm {
            draw_confirm(f, f.area(), confirm.prompt());
        }
        if app.state.show_help {
            draw_help(f, f.area());
        }

        draw_loading_spinner(f, f.area(), app, loading);
    });
    if let Err(e) = result {
        log::error!("draw failed: {e}");
    }
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let titles: Vec<Line> = EntityKind::ALL
        .iter()
        .enumerate()
        .map(|(i, kind)| Line::from(format!("{} {}", i + 1, kind.title())))
        .collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(app.state.route.kind().index())
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let help = Paragraph::new("Help: ? ")
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

fn draw_collection<E: Entity>(f: &mut Frame, area: Rect, app: &mut App) {
    let block = default_border(Color::White).title(format!(" {} ", E::KIND.title()));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let form_height = app
        .page::<E>()
        .form
        .as_ref()
        .map(|form| form.specs().len() as u16 + 4)
        .unwrap_or(0);
    let [filter_bar, status, form_area, table_area] = Layout::vertical([
        Constraint::Length(if E::FILTERS.is_empty() { 0 } else { 1 }),
        Constraint::Length(1),
        Constraint::Length(form_height),
        Constraint::Fill(1),
    ])
    .areas(inner);

    if !E::FILTERS.is_empty() {
        let filters = app.page::<E>().filters;
        let mut spans = Vec::new();
        for spec in E::FILTERS {
            let options = app.state.collections.filter_options(spec.slot, &filters);
            let value = filters
                .get(spec.slot)
                .and_then(|id| options.into_iter().find(|(option, _)| *option == id))
                .map(|(_, label)| label)
                .unwrap_or_else(|| "All".to_string());
            spans.push(Span::styled(format!("[{}] ", spec.key), Style::default().fg(Color::DarkGray)));
            spans.push(Span::raw(format!("{}: {value}   ", spec.label)));
        }
        if !filters.is_empty() {
            spans.push(Span::styled("[c] clear", Style::default().fg(Color::DarkGray)));
        }
        f.render_widget(Paragraph::new(Line::from(spans)), filter_bar);
    }

    let list = &app.page::<E>().list;
    let status_line = if list.loading() {
        Line::from("Loading...")
    } else if let Some(error) = list.error() {
        Line::from(format!("Error: {error}")).style(Style::default().fg(Color::Red))
    } else {
        Line::from("j/k=move  Enter=open  n=new  d=delete  r=reload")
            .style(Style::default().fg(Color::DarkGray))
    };
    f.render_widget(Paragraph::new(status_line), status);

    if let Some(form) = app.page::<E>().form.as_ref() {
        draw_form(f, form_area, form, &app.state.collections, &format!(" New {} ", E::KIND.noun()));
    }

    let selected = app.page_mut::<E>().selected();
    let view = app.collection_view::<E>();
    f.render_widget(
        CollectionTable { view: &view, headers: E::COLUMNS, selected, block: None },
        table_area,
    );
}

fn draw_detail<E: Entity>(f: &mut Frame, area: Rect, app: &App, id: u64) {
    let title = format!(" {} #{id} ", E::KIND.title());
    let block = default_border(Color::White).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let detail = &app.page::<E>().detail;
    let [body, error_line, hint] =
        Layout::vertical([Constraint::Fill(1), Constraint::Length(1), Constraint::Length(1)])
            .areas(inner);

    let muted = Style::default().fg(Color::DarkGray);
    match (detail.phase(), detail.record()) {
        (DetailPhase::Editing, _) => {
            if let Some(form) = detail.form() {
                let heading = if detail.saving { " Saving... " } else { " Edit " };
                draw_form(f, body, form, &app.state.collections, heading);
            }
        }
        (DetailPhase::Viewing, Some(record)) => {
            let lines: Vec<Line> = record
                .detail_rows()
                .into_iter()
                .map(|(label, value)| {
                    Line::from(vec![Span::styled(format!("{label:<14}"), muted), Span::raw(value)])
                })
                .collect();
            f.render_widget(Paragraph::new(lines), body);
        }
        (DetailPhase::NotFound | DetailPhase::Failed, _) => {}
        _ => f.render_widget(Paragraph::new("Loading..."), body),
    }

    if let Some(error) = detail.error() {
        f.render_widget(
            Paragraph::new(error).style(Style::default().fg(Color::Red)),
            error_line,
        );
    }

    let hint_text = match detail.phase() {
        DetailPhase::Editing => "Enter=save  Esc=cancel  Tab=next field  ←/→=choose",
        DetailPhase::Viewing => "e=edit  d=delete  r=reload  Esc=back",
        _ => "r=reload  Esc=back",
    };
    f.render_widget(Paragraph::new(hint_text).style(muted), hint);
}

fn draw_form(f: &mut Frame, area: Rect, form: &FormState, collections: &Collections, title: &str) {
    if area.height == 0 {
        return;
    }
    let block = default_border(Color::Cyan).title(title.to_string());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let muted = Style::default().fg(Color::DarkGray);
    let mut lines: Vec<Line> = Vec::new();
    for (idx, spec) in form.specs().iter().enumerate() {
        let focused = idx == form.focus();
        let marker = if focused { "> " } else { "  " };
        let label_style = if focused {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };

        let value = match spec.kind {
            FieldKind::Choice(_) => form.choice(idx).map(|id| {
                collections
                    .field_options(form, idx)
                    .into_iter()
                    .find(|(option, _)| *option == id)
                    .map(|(_, label)| label)
                    .unwrap_or_else(|| format!("#{id}"))
            }),
            FieldKind::Text | FieldKind::Number | FieldKind::Date => {
                Some(form.value(idx).to_string()).filter(|v| !v.is_empty())
            }
        };
        let value_span = match value {
            Some(value) if spec.is_choice() => Span::raw(format!("‹ {value} ›")),
            Some(value) if focused => Span::raw(format!("{value}_")),
            Some(value) => Span::raw(value),
            None => Span::styled(spec.placeholder, muted),
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{marker}{:<16}", spec.label), label_style),
            value_span,
        ]));
    }

    match form.error.as_deref() {
        Some(error) => lines.push(Line::from(error).style(Style::default().fg(Color::Red))),
        None if form.submitting => lines.push(Line::from("Submitting...").style(muted)),
        None => lines.push(Line::from("")),
    }
    lines.push(Line::from("Enter=submit  Esc=cancel").style(muted));
    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let widget = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Cyan))
        .style_debug(Style::default().fg(Color::Gray));
    f.render_widget(widget, area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn draw_confirm(f: &mut Frame, area: Rect, prompt: &str) {
    let popup = centered(area, 60, 5);
    f.render_widget(Clear, popup);
    let text = vec![
        Line::from(prompt),
        Line::from(""),
        Line::from("y=yes  n/Esc=no").style(Style::default().fg(Color::DarkGray)),
    ];
    f.render_widget(
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(default_border(Color::Yellow).title(" Confirm ")),
        popup,
    );
}

fn draw_help(f: &mut Frame, area: Rect) {
    let popup = centered(area, 60, HELP_TEXT.lines().count() as u16 + 2);
    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(HELP_TEXT).block(default_border(Color::White).title(" Help ")),
        popup,
    );
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(11), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}
