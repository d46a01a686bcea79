//! Debugger application state and logic.

use crate::cpu::decode::decode;
use crate::cpu::memory::MEMORY_SIZE;
use crate::{Cpu, Word};
use std::collections::HashSet;

/// Words shown per memory view row.
pub const MEM_ROW_WORDS: usize = 8;

/// Debugger application state.
pub struct DebuggerApp {
    /// The CPU being debugged.
    pub cpu: Cpu,
    /// Breakpoints (by address).
    pub breakpoints: HashSet<Word>,
    /// Is the debugger running continuously?
    pub running: bool,
    /// Should we quit?
    pub should_quit: bool,
    /// Status message to display.
    pub status: String,
    /// Memory view scroll offset, in rows.
    pub mem_scroll: usize,
}

impl DebuggerApp {
    /// Create a new debugger with a loaded program.
    pub fn new(cpu: Cpu) -> Self {
        Self {
            cpu,
            breakpoints: HashSet::new(),
            running: false,
            should_quit: false,
            status: "Ready. Press 's' to step, 'r' to run, 'q' to quit.".into(),
            mem_scroll: 0,
        }
    }

    /// Step one instruction.
    pub fn step(&mut self) {
        if !self.cpu.is_running() {
            self.status = format!("CPU stopped: {:?}", self.cpu.state);
            self.running = false;
            return;
        }

        let pc = self.cpu.regs.pc;
        let skipping = self.cpu.pending_skip();
        match self.cpu.step() {
            Ok(instr) if skipping => {
                self.status = format!("PC={:04x}: {} (skipped)", pc, instr);
            }
            Ok(instr) => {
                self.status = format!("PC={:04x}: {}", pc, instr);
            }
            Err(e) => {
                self.status = format!("Fault: {}", e);
                self.running = false;
            }
        }
    }

    /// Run until halt, breakpoint, or fault.
    pub fn run(&mut self) {
        self.running = true;
        self.status = "Running...".into();
    }

    /// Run one iteration of continuous execution.
    pub fn tick(&mut self) {
        if !self.running {
            return;
        }

        if !self.cpu.is_running() {
            self.running = false;
            self.status = format!("Stopped after {} steps: {:?}", self.cpu.steps, self.cpu.state);
            return;
        }

        let pc = self.cpu.regs.pc;
        if self.breakpoints.contains(&pc) {
            self.running = false;
            self.status = format!("Breakpoint at PC={:04x}", pc);
            return;
        }

        self.step();
    }

    /// Toggle breakpoint at current PC.
    pub fn toggle_breakpoint(&mut self) {
        let pc = self.cpu.regs.pc;
        if self.breakpoints.remove(&pc) {
            self.status = format!("Removed breakpoint at PC={:04x}", pc);
        } else {
            self.breakpoints.insert(pc);
            self.status = format!("Set breakpoint at PC={:04x}", pc);
        }
    }

    /// Reset CPU to its freshly loaded state.
    pub fn reset(&mut self) {
        self.cpu.reset();
        self.running = false;
        self.status = "Reset. Ready.".into();
    }

    /// Scroll the memory view, clamped to the address space.
    pub fn scroll_memory(&mut self, delta: isize) {
        let max_row = MEMORY_SIZE / MEM_ROW_WORDS - 1;
        self.mem_scroll = self.mem_scroll.saturating_add_signed(delta).min(max_row);
    }

    /// PC against the loaded image size, plus the last instruction executed.
    pub fn progress(&self) -> String {
        let last = match self.cpu.last_instruction() {
            Some(instr) => instr.to_string(),
            None => "-".into(),
        };
        format!("PC {:04x} / {:04x}   Last: {}", self.cpu.regs.pc, self.cpu.program_len(), last)
    }

    /// Words around PC with their decoded fields.
    ///
    /// Each word is decoded as if it were an instruction; extra operand
    /// words show up as their own (meaningless) decodes.
    pub fn get_listing(&self, lines: usize) -> Vec<(Word, String, bool)> {
        let pc = self.cpu.regs.pc;
        let start = pc.saturating_sub((lines / 2) as Word);

        (0..lines)
            .map_while(|i| {
                let addr = start.checked_add(i as Word)?;
                let word = self.cpu.mem.read(addr);
                let text = format!("{:04x}  {}", word, decode(word));
                Some((addr, text, addr == pc))
            })
            .collect()
    }
}

/// Run the debugger with a program.
pub fn run_debugger(program: &[Word]) -> std::io::Result<()> {
    use crossterm::{
        event::{self, Event, KeyCode, KeyEventKind},
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
        ExecutableCommand,
    };
    use ratatui::prelude::*;
    use std::io::stdout;
    use std::time::Duration;

    let cpu = Cpu::with_program(program)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut app = DebuggerApp::new(cpu);

    loop {
        terminal.draw(|frame| {
            super::ui::draw(frame, &app);
        })?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') => app.should_quit = true,
                        KeyCode::Char('s') => {
                            app.running = false;
                            app.step();
                        }
                        KeyCode::Char('r') => app.run(),
                        KeyCode::Char('p') => {
                            app.running = false;
                            app.status = "Paused.".into();
                        }
                        KeyCode::Char('b') => app.toggle_breakpoint(),
                        KeyCode::Char('x') => app.reset(),
                        KeyCode::Up => app.scroll_memory(-1),
                        KeyCode::Down => app.scroll_memory(1),
                        KeyCode::PageUp => app.scroll_memory(-32),
                        KeyCode::PageDown => app.scroll_memory(32),
                        _ => {}
                    }
                }
            }
        }

        if app.running {
            app.tick();
        }

        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
}
