//! UI rendering for the debugger.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, List, ListItem},
    style::{Color, Style, Modifier},
};
use crate::cpu::memory::MEMORY_SIZE;
use crate::Register;
use super::app::{DebuggerApp, MEM_ROW_WORDS};

/// Main draw function.
pub fn draw(frame: &mut Frame, app: &DebuggerApp) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(50),
            Constraint::Percentage(50),
        ])
        .split(frame.area());

    // Left side: listing, registers, status
    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),
            Constraint::Length(8),
            Constraint::Length(3),
        ])
        .split(chunks[0]);

    draw_listing(frame, left_chunks[0], app);
    draw_registers(frame, left_chunks[1], app);
    draw_status(frame, left_chunks[2], app);

    // Right side: memory and help
    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),
            Constraint::Length(4),
        ])
        .split(chunks[1]);

    draw_memory(frame, right_chunks[0], app);
    draw_help(frame, right_chunks[1]);
}

/// Draw the decoded listing around PC.
fn draw_listing(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let listing = app.get_listing((area.height as usize).saturating_sub(2));

    let items: Vec<ListItem> = listing
        .iter()
        .map(|(addr, text, is_current)| {
            let prefix = if *is_current { "▶ " } else { "  " };
            let bp = if app.breakpoints.contains(addr) { "●" } else { " " };

            let style = if *is_current {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else if app.breakpoints.contains(addr) {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            };

            ListItem::new(format!("{} {}{:04x}: {}", bp, prefix, addr, text)).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default()
            .title(" Listing ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)));

    frame.render_widget(list, area);
}

/// Draw register state.
fn draw_registers(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let regs = &app.cpu.regs;
    let general = |names: [Register; 4]| {
        let mut spans = Vec::new();
        for reg in names {
            spans.push(Span::raw(format!("{:>2}: ", reg)));
            spans.push(Span::styled(format!("{:04x}  ", regs.get(reg)), Style::default().fg(Color::White)));
        }
        Line::from(spans)
    };

    let content = vec![
        general([Register::A, Register::B, Register::C, Register::X]),
        general([Register::Y, Register::Z, Register::I, Register::J]),
        Line::from(vec![
            Span::raw("SP: "),
            Span::styled(format!("{:04x}", regs.sp), Style::default().fg(Color::White)),
            Span::raw("  PC: "),
            Span::styled(format!("{:04x}", regs.pc), Style::default().fg(Color::Yellow)),
            Span::raw("  EX: "),
            Span::styled(format!("{:04x}", regs.ex), Style::default().fg(Color::Magenta)),
            Span::raw("  Skip: "),
            Span::styled(
                if app.cpu.pending_skip() { "yes" } else { "no" },
                if app.cpu.pending_skip() {
                    Style::default().fg(Color::Red)
                } else {
                    Style::default().fg(Color::DarkGray)
                },
            ),
        ]),
        Line::from(vec![
            Span::raw("Steps: "),
            Span::styled(format!("{}", app.cpu.steps), Style::default().fg(Color::Cyan)),
            Span::raw("   State: "),
            Span::styled(format!("{:?}", app.cpu.state),
                if app.cpu.is_running() {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default().fg(Color::Red)
                }),
        ]),
        Line::from(Span::styled(app.progress(), Style::default().fg(Color::DarkGray))),
    ];

    let paragraph = Paragraph::new(content)
        .block(Block::default()
            .title(" Registers ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green)));

    frame.render_widget(paragraph, area);
}

/// Draw memory view, `MEM_ROW_WORDS` words per row.
fn draw_memory(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let visible_rows = (area.height as usize).saturating_sub(2);
    let start = app.mem_scroll;
    let end = (start + visible_rows).min(MEMORY_SIZE / MEM_ROW_WORDS);
    let regs = &app.cpu.regs;

    let items: Vec<ListItem> = (start..end)
        .map(|row| {
            let base = (row * MEM_ROW_WORDS) as u16;
            let cells = app.cpu.mem.dump(base, MEM_ROW_WORDS);
            let words: Vec<String> = cells.iter().map(|(_, w)| format!("{:04x}", w)).collect();
            let text = format!("{:04x}: {}", base, words.join(" "));

            let holds = |addr: u16| cells.iter().any(|(a, _)| *a == addr);
            let style = if holds(regs.pc) {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else if holds(regs.sp) && regs.sp != 0xFFFF {
                Style::default().fg(Color::Magenta)
            } else if cells.iter().any(|(_, w)| *w != 0) {
                Style::default().fg(Color::White)
            } else {
                Style::default().fg(Color::DarkGray)
            };

            ListItem::new(text).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default()
            .title(" Memory ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta)));

    frame.render_widget(list, area);
}

/// Draw status bar.
fn draw_status(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let status = Paragraph::new(app.status.clone())
        .style(Style::default().fg(Color::White))
        .block(Block::default()
            .title(" Status ")
            .borders(Borders::ALL));

    frame.render_widget(status, area);
}

/// Draw help panel.
fn draw_help(frame: &mut Frame, area: Rect) {
    let help = Paragraph::new(vec![
        Line::from("s: Step  r: Run  p: Pause  b: Breakpoint  x: Reset"),
        Line::from("↑↓/PgUp/PgDn: Scroll memory  q: Quit"),
    ])
    .style(Style::default().fg(Color::DarkGray))
    .block(Block::default()
        .title(" Help ")
        .borders(Borders::ALL));

    frame.render_widget(help, area);
}
