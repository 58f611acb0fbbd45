//! Dashboard rendering

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs, Wrap},
    Frame,
};

use super::app::{App, AppTab, ConnectionStatus};
use super::forms::{ClusterForm, ClusterFormField};
use clusterdeck_core::form::FormMode;
use clusterdeck_core::tag_list::{TagList, EMPTY_PLACEHOLDER};

const PRIMARY_COLOR: Color = Color::Cyan;
const SUCCESS_COLOR: Color = Color::Green;
const WARNING_COLOR: Color = Color::Yellow;
const ERROR_COLOR: Color = Color::Red;
const MUTED_COLOR: Color = Color::DarkGray;
const TEXT_COLOR: Color = Color::White;

pub fn render(f: &mut Frame, app: &App) {
    let size = f.size();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Tab bar
            Constraint::Min(0),    // Main content
            Constraint::Length(3), // Status bar
        ])
        .split(size);

    render_header(f, chunks[0], app);
    render_tab_bar(f, chunks[1], app);
    match app.current_tab {
        AppTab::Clusters => render_cluster_table(f, chunks[2], app),
        AppTab::Help => render_help(f, chunks[2]),
    }
    render_status_bar(f, chunks[3], app);

    if let Some(form) = &app.form {
        render_cluster_form(f, form);
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let (connection, color) = match app.connection {
        ConnectionStatus::Unknown => ("connecting", WARNING_COLOR),
        ConnectionStatus::Connected => ("connected", SUCCESS_COLOR),
        ConnectionStatus::Unreachable => ("unreachable", ERROR_COLOR),
    };
    let line = Line::from(vec![
        Span::styled("clusterdeck", Style::default().fg(PRIMARY_COLOR).add_modifier(Modifier::BOLD)),
        Span::styled(" | ", Style::default().fg(TEXT_COLOR)),
        Span::styled(app.endpoint.as_str(), Style::default().fg(TEXT_COLOR)),
        Span::styled(" | ", Style::default().fg(TEXT_COLOR)),
        Span::styled(connection, Style::default().fg(color)),
    ]);
    let paragraph = Paragraph::new(line)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
    f.render_widget(paragraph, area);
}

fn render_tab_bar(f: &mut Frame, area: Rect, app: &App) {
    let selected = match app.current_tab {
        AppTab::Clusters => 0,
        AppTab::Help => 1,
    };
    let tabs = Tabs::new(vec!["1 Clusters", "2 Help"])
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().fg(TEXT_COLOR))
        .highlight_style(Style::default().fg(PRIMARY_COLOR).add_modifier(Modifier::BOLD))
        .select(selected);
    f.render_widget(tabs, area);
}

fn render_cluster_table(f: &mut Frame, area: Rect, app: &App) {
    let header_style = Style::default().fg(PRIMARY_COLOR).add_modifier(Modifier::BOLD);
    let header = Row::new(vec![
        Cell::from("Name").style(header_style),
        Cell::from("Mode").style(header_style),
        Cell::from("Ready").style(header_style),
        Cell::from("Version").style(header_style),
        Cell::from("Labels").style(header_style),
    ]);

    let rows: Vec<Row> = app
        .clusters
        .iter()
        .map(|cluster| {
            let tags = cluster.label_tags();
            let ready = if cluster.ready {
                Cell::from("Ready").style(Style::default().fg(SUCCESS_COLOR))
            } else {
                Cell::from("NotReady").style(Style::default().fg(ERROR_COLOR))
            };
            Row::new(vec![
                Cell::from(cluster.name().to_string()),
                Cell::from(cluster.sync_mode.as_str()),
                ready,
                Cell::from(
                    cluster
                        .kubernetes_version
                        .clone()
                        .unwrap_or_else(|| EMPTY_PLACEHOLDER.to_string()),
                ),
                Cell::from(TagList::new(&tags, app.tag_max_len).render_inline()),
            ])
        })
        .collect();

    let title = if app.loading {
        format!("Clusters ({}) - loading", app.clusters.len())
    } else {
        format!("Clusters ({})", app.clusters.len())
    };

    let table = Table::new(
        rows,
        [
            Constraint::Min(20),    // Name
            Constraint::Length(6),  // Mode
            Constraint::Length(9),  // Ready
            Constraint::Length(10), // Version
            Constraint::Min(20),    // Labels
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(PRIMARY_COLOR)),
    )
    .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
    .highlight_symbol(">> ");

    f.render_stateful_widget(table, area, &mut app.cluster_table_state.clone());
}

fn render_help(f: &mut Frame, area: Rect) {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(SUCCESS_COLOR).add_modifier(Modifier::BOLD));
    let text = |t: &'static str| Span::styled(t, Style::default().fg(TEXT_COLOR));
    let lines = vec![
        Line::from(Span::styled("Cluster list", Style::default().fg(PRIMARY_COLOR))),
        Line::from(vec![key("  n"), text("  register a cluster")]),
        Line::from(vec![key("  e"), text("  edit the selected cluster")]),
        Line::from(vec![key("  r"), text("  refresh")]),
        Line::from(vec![key("  q"), text("  quit")]),
        Line::from(""),
        Line::from(Span::styled("Form", Style::default().fg(PRIMARY_COLOR))),
        Line::from(vec![key("  Tab / Shift-Tab"), text("  move between fields")]),
        Line::from(vec![key("  ← / →"), text("  change sync mode or taint effect")]),
        Line::from(vec![key("  Ctrl-L / Ctrl-T"), text("  add a label / taint")]),
        Line::from(vec![key("  Ctrl-D"), text("  remove the focused row")]),
        Line::from(vec![key("  Ctrl-A"), text("  show or hide labels and taints")]),
        Line::from(vec![key("  Ctrl-O"), text("  load kubeconfig from the file path")]),
        Line::from(vec![key("  Enter / Esc"), text("  confirm / cancel")]),
    ];
    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Help"))
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let (text, style) = if let Some(msg) = &app.error_message {
        (msg.clone(), Style::default().fg(ERROR_COLOR))
    } else if let Some(msg) = &app.status_message {
        (msg.clone(), Style::default().fg(SUCCESS_COLOR))
    } else if app.form.is_some() {
        (
            "Enter confirm | Esc cancel | Ctrl-A labels/taints".to_string(),
            Style::default().fg(TEXT_COLOR),
        )
    } else {
        (
            "n register | e edit | r refresh | q quit".to_string(),
            Style::default().fg(TEXT_COLOR),
        )
    };

    let paragraph = Paragraph::new(text)
        .style(style)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
    f.render_widget(paragraph, area);
}

fn render_cluster_form(f: &mut Frame, form: &ClusterForm) {
    let area = centered_rect(70, 80, f.size());
    f.render_widget(Clear, area);

    let title = match form.mode() {
        FormMode::Create => " Register cluster ",
        FormMode::Edit => " Edit cluster ",
    };
    let border_color = if form.controller.is_submitting() {
        WARNING_COLOR
    } else {
        PRIMARY_COLOR
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));
    f.render_widget(block, area);

    let inner_area = area.inner(&Margin {
        vertical: 1,
        horizontal: 2,
    });
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(inner_area);

    let mut lines = Vec::new();
    let mut section = None;
    for field in form.fields() {
        let heading = match field {
            ClusterFormField::LabelKey(_) | ClusterFormField::LabelValue(_) => Some("Labels"),
            ClusterFormField::TaintKey(_)
            | ClusterFormField::TaintValue(_)
            | ClusterFormField::TaintEffect(_) => Some("Taints"),
            _ => None,
        };
        if heading.is_some() && heading != section {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                heading.unwrap_or_default(),
                Style::default().fg(PRIMARY_COLOR).add_modifier(Modifier::BOLD),
            )));
            section = heading;
        }
        lines.extend(field_lines(form, field));
    }
    if !form.controller.show_advanced() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(
                "Labels: {}  Taints: {}  (Ctrl-A to show)",
                form.controller.state().labels.len(),
                form.controller.state().taints.len()
            ),
            Style::default().fg(MUTED_COLOR),
        )));
    }

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), chunks[0]);

    let footer = if form.controller.is_submitting() {
        Span::styled("Submitting...", Style::default().fg(WARNING_COLOR))
    } else {
        Span::styled(
            "Enter confirm | Esc cancel | Ctrl-L label | Ctrl-T taint | Ctrl-D remove",
            Style::default().fg(MUTED_COLOR),
        )
    };
    f.render_widget(Paragraph::new(Line::from(footer)), chunks[1]);
}

fn field_lines(form: &ClusterForm, field: ClusterFormField) -> Vec<Line<'static>> {
    let focused = form.current_field == field;
    let read_only = form.is_read_only(field);
    let style = if focused {
        Style::default().fg(PRIMARY_COLOR).add_modifier(Modifier::BOLD)
    } else if read_only {
        Style::default().fg(MUTED_COLOR)
    } else {
        Style::default().fg(TEXT_COLOR)
    };

    let marker = if focused { "> " } else { "  " };
    let mut value = form.value(field);
    if field == ClusterFormField::Kubeconfig && value.lines().count() > 1 {
        value = format!("<{} lines loaded>", value.lines().count());
    }
    if focused && !read_only {
        value.push('_');
    }
    let suffix = if read_only { " (read-only)" } else { "" };

    let mut lines = vec![Line::from(vec![
        Span::styled(format!("{}{}{}: ", marker, field.title(), suffix), style),
        Span::styled(value, style),
    ])];

    let error = field
        .path()
        .and_then(|path| form.controller.error_for(path));
    if let Some(error) = error {
        lines.push(Line::from(Span::styled(
            format!("    {} {}", field.title(), error),
            Style::default().fg(ERROR_COLOR),
        )));
    }
    lines
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
