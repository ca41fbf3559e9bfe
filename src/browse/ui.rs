//! UI rendering

use {
    super::app::{App, Field, Form, FormKind, Mode},
    ratatui::{
        layout::{Constraint, Direction, Flex, Layout, Rect},
        style::{Modifier, Style},
        text::{Line, Span},
        widgets::{Block, Borders, Clear, Paragraph, Row, Table, TableState},
        Frame,
    },
};

/// Main UI rendering function
pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(frame.area());

    draw_contacts(frame, app, chunks[0]);
    draw_status_bar(frame, app, chunks[1]);

    match &app.mode {
        Mode::Normal => {}
        Mode::Form(form) => draw_form(frame, app, form),
        Mode::Filter { input, .. } => draw_filter(frame, input),
        Mode::ConfirmDelete(name) => draw_confirm_delete(frame, name),
        Mode::About => draw_about(frame),
    }
}

fn draw_contacts(frame: &mut Frame, app: &App, area: Rect) {
    let title = if app.filter.is_empty() {
        format!(" Contacts ({}) ", app.rows.len())
    } else {
        format!(
            " Contacts ({}/{}) filter: {} ",
            app.rows.len(),
            app.store.len(),
            app.filter
        )
    };

    let header = Row::new(["Name", "Email"]).style(Style::default().add_modifier(Modifier::BOLD));
    let rows = app
        .rows
        .iter()
        .map(|(name, email)| Row::new([name.as_str(), email.as_str()]));

    let table = Table::new(rows, [Constraint::Percentage(40), Constraint::Percentage(60)])
        .header(header)
        .block(Block::default().title(title).borders(Borders::ALL))
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = TableState::default();
    if !app.rows.is_empty() {
        state.select(Some(app.selected));
    }

    frame.render_stateful_widget(table, area, &mut state);
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let line = match &app.status {
        Some(status) => Line::from(status.as_str()),
        None if app.store.is_empty() => {
            Line::from("You do not have any contacts. Press n to create one.")
        }
        None => Line::from(Span::styled(
            "n new  e edit  d delete  / filter  r reload  ? about  q quit",
            Style::default().add_modifier(Modifier::DIM),
        )),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_form(frame: &mut Frame, app: &App, form: &Form) {
    let title = match form.kind {
        FormKind::New => " New Contact ",
        FormKind::Edit => " Edit Contact ",
    };

    let field_line = |label: &'static str, value: &str, active: bool| {
        let style = if active {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let cursor = if active { "_" } else { "" };
        Line::from(vec![
            Span::styled(label, style),
            Span::raw(format!("{value}{cursor}")),
        ])
    };

    let mut lines = vec![
        field_line("Full name:     ", &form.name, form.field == Field::Name),
        field_line("Email address: ", &form.email, form.field == Field::Email),
        Line::from(""),
    ];
    match form.problem(&app.store) {
        Some(problem) => lines.push(Line::from(problem)),
        None => lines.push(Line::from(Span::styled(
            "Enter save  Tab switch field  Esc cancel",
            Style::default().add_modifier(Modifier::DIM),
        ))),
    }

    draw_popup(frame, title, lines, 60, 6);
}

fn draw_filter(frame: &mut Frame, input: &str) {
    let lines = vec![
        Line::from(format!("{input}_")),
        Line::from(Span::styled(
            "Enter keep  Esc cancel",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];
    draw_popup(frame, " Filter ", lines, 50, 4);
}

fn draw_confirm_delete(frame: &mut Frame, name: &str) {
    let lines = vec![Line::from(format!("Delete {name}? (y/n)"))];
    draw_popup(frame, " Delete ", lines, 50, 3);
}

fn draw_about(frame: &mut Frame) {
    let lines = vec![
        Line::from(Span::styled(
            format!("Contacts {}", env!("CARGO_PKG_VERSION")),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from("Store your contacts."),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];
    draw_popup(frame, " About ", lines, 40, 6);
}

fn draw_popup(frame: &mut Frame, title: &str, lines: Vec<Line>, width: u16, height: u16) {
    let area = centered(frame.area(), width, height);
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().title(title).borders(Borders::ALL)),
        area,
    );
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [area] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    area
}
