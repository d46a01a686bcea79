//! CPU execution engine for the DCPU-16.
//!
//! Implements the fetch-decode-execute cycle and all instruction behaviors.

use crate::cpu::{Memory, Registers};
use crate::cpu::decode::{self, DecodeError, Instruction, Opcode, Operation, SpecialOpcode};
use crate::cpu::memory::MemoryError;
use crate::cpu::operand::Operand;
use crate::cpu::registers::Register;
use crate::word::{arith, Word};
use log::{debug, trace, warn};
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// CPU execution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CpuState {
    /// CPU is running normally.
    Running,
    /// PC has left the loaded program.
    Halted,
    /// CPU hit a decode fault.
    Faulted,
}

/// The DCPU-16 CPU.
#[derive(Clone, Serialize, Deserialize)]
pub struct Cpu {
    /// CPU registers.
    pub regs: Registers,
    /// Main memory.
    pub mem: Memory,
    /// Current execution state.
    pub state: CpuState,
    /// Instructions consumed so far, skipped ones included.
    pub steps: u64,
    /// Set by a failed IFE/IFN; the next instruction is consumed without effect.
    pending_skip: bool,
    /// The loaded image, kept for reset and the termination rule.
    program: Vec<Word>,
    /// Last executed instruction (for debugging).
    last_instr: Option<Instruction>,
}

impl Cpu {
    /// Create a new CPU with zeroed memory and no program.
    pub fn new() -> Self {
        Self {
            regs: Registers::new(),
            mem: Memory::new(),
            state: CpuState::Halted,
            steps: 0,
            pending_skip: false,
            program: Vec::new(),
            last_instr: None,
        }
    }

    /// Create a CPU with `program` loaded at address 0.
    pub fn with_program(program: &[Word]) -> Result<Self, MemoryError> {
        let mut cpu = Self::new();
        cpu.load_program(program)?;
        Ok(cpu)
    }

    /// Load a program into memory at address 0 and reset the machine.
    ///
    /// PC starts at 0 and SP at 0xFFFF; every other register is zeroed.
    pub fn load_program(&mut self, program: &[Word]) -> Result<(), MemoryError> {
        let mut mem = Memory::new();
        mem.load_program(program)?;

        self.mem = mem;
        self.regs.reset();
        self.steps = 0;
        self.pending_skip = false;
        self.program = program.to_vec();
        self.last_instr = None;
        self.state = if self.within_program() {
            CpuState::Running
        } else {
            CpuState::Halted
        };
        Ok(())
    }

    /// Reset the CPU to the freshly loaded state.
    pub fn reset(&mut self) {
        let program = std::mem::take(&mut self.program);
        if self.load_program(&program).is_err() {
            self.state = CpuState::Faulted;
        }
    }

    /// Execute a single instruction.
    ///
    /// Returns the instruction that was consumed, or the fault that stopped
    /// the machine.
    pub fn step(&mut self) -> Result<Instruction, CpuError> {
        if self.state != CpuState::Running {
            return Err(CpuError::NotRunning(self.state));
        }

        match self.cycle() {
            Ok(instr) => {
                self.steps += 1;
                self.last_instr = Some(instr);
                if !self.within_program() {
                    self.state = CpuState::Halted;
                }
                trace!("{}", self.regs);
                Ok(instr)
            }
            Err(e) => {
                warn!("fault at step {}: {}", self.steps, e);
                self.state = CpuState::Faulted;
                Err(e)
            }
        }
    }

    /// Run until PC leaves the loaded program, or a fault.
    ///
    /// Returns the number of instructions consumed.
    pub fn run(&mut self) -> Result<u64, CpuError> {
        let start_steps = self.steps;

        while self.state == CpuState::Running {
            self.step()?;
        }

        Ok(self.steps - start_steps)
    }

    /// Run for at most `max_steps` instructions.
    pub fn run_limited(&mut self, max_steps: u64) -> Result<u64, CpuError> {
        self.run_observed(max_steps, |_, _| {})
    }

    /// Run for at most `max_steps` instructions, calling `observe` after each
    /// one with the PC it was fetched from.
    ///
    /// On a fault the error is returned with `state` set to `Faulted`.
    pub fn run_observed<F>(&mut self, max_steps: u64, mut observe: F) -> Result<u64, CpuError>
    where
        F: FnMut(Word, &Cpu),
    {
        let start_steps = self.steps;
        let limit = self.steps.saturating_add(max_steps);

        while self.state == CpuState::Running && self.steps < limit {
            let pc = self.regs.pc;
            self.step()?;
            observe(pc, self);
        }

        Ok(self.steps - start_steps)
    }

    /// Fetch, resolve operands, then apply (or skip) one instruction.
    fn cycle(&mut self) -> Result<Instruction, CpuError> {
        let instr = decode::decode(self.next_word());

        if self.pending_skip {
            self.consume(instr)?;
            self.pending_skip = false;
            debug!("skip {}", instr);
            return Ok(instr);
        }

        // Validate before resolving so a fault leaves SP untouched.
        match instr.operation()? {
            Operation::Special(op) => {
                let src = self.resolve_source(instr.a);
                let value = self.read_operand(src);
                debug!("{}", instr);
                self.execute_special(op, value);
            }
            Operation::Basic(op) => {
                let dest = self.resolve_destination(instr.b)?;
                let src = self.resolve_source(instr.a);
                let value = self.read_operand(src);
                debug!("{}", instr);
                self.execute(op, dest, value)?;
            }
        }

        Ok(instr)
    }

    /// Step over an instruction's extra words without any other effect.
    ///
    /// Both fields are resolved as operands, the special family included, so
    /// a sub-opcode field like 0x1e still swallows a word.
    fn consume(&mut self, instr: Instruction) -> Result<(), DecodeError> {
        let sp = self.regs.sp;
        self.resolve_destination(instr.b)?;
        self.resolve_source(instr.a);
        self.regs.sp = sp;
        Ok(())
    }

    fn execute_special(&mut self, op: SpecialOpcode, value: Word) {
        match op {
            SpecialOpcode::Jsr => self.regs.pc = value,
        }
    }

    /// Apply a basic opcode to destination `dest` and source value `s`.
    fn execute(&mut self, op: Opcode, dest: Operand, s: Word) -> Result<(), DecodeError> {
        let d = self.read_operand(dest);

        match op {
            Opcode::Set => self.write_operand(dest, s)?,

            // ==================== Arithmetic ====================

            Opcode::Add => self.write_with_ex(dest, arith::add(d, s))?,
            Opcode::Sub => {
                // Historical quirk: subtracting from PC takes one extra.
                let from_pc = dest == Operand::Register(Register::Pc);
                self.write_with_ex(dest, arith::subtract(d, s, from_pc))?;
            }
            Opcode::Mul => self.write_with_ex(dest, arith::multiply(d, s))?,
            Opcode::Mli => self.write_with_ex(dest, arith::multiply_signed(d, s))?,
            Opcode::Div => self.write_with_ex(dest, arith::divide(d, s))?,
            Opcode::Dvi => self.write_with_ex(dest, arith::divide_signed(d, s))?,
            Opcode::Mod => self.write_operand(dest, arith::modulo(d, s))?,
            Opcode::Mdi => self.write_operand(dest, arith::modulo_signed(d, s))?,

            // ==================== Bitwise ====================

            Opcode::And => self.write_operand(dest, d & s)?,
            Opcode::Bor => self.write_operand(dest, d | s)?,
            Opcode::Xor => self.write_operand(dest, d ^ s)?,

            // ==================== Conditional ====================

            Opcode::Ife => self.pending_skip = d != s,
            Opcode::Ifn => self.pending_skip = d == s,

            Opcode::Special => return Err(DecodeError::InvalidOpcode(op as u8)),
        }

        Ok(())
    }

    /// Store a result, then its EX word. EX wins if it was the destination.
    fn write_with_ex(&mut self, dest: Operand, (result, ex): (Word, Word)) -> Result<(), DecodeError> {
        self.write_operand(dest, result)?;
        self.regs.ex = ex;
        Ok(())
    }

    /// Whether PC still indexes into the loaded program.
    fn within_program(&self) -> bool {
        usize::from(self.regs.pc) < self.program.len()
    }

    /// Number of words in the loaded program.
    pub fn program_len(&self) -> usize {
        self.program.len()
    }

    /// Whether the next instruction will be skipped.
    pub fn pending_skip(&self) -> bool {
        self.pending_skip
    }

    /// Get the last executed instruction.
    pub fn last_instruction(&self) -> Option<Instruction> {
        self.last_instr
    }

    /// Check if the CPU is halted.
    pub fn is_halted(&self) -> bool {
        self.state == CpuState::Halted
    }

    /// Check if the CPU is running.
    pub fn is_running(&self) -> bool {
        self.state == CpuState::Running
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Cpu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cpu")
            .field("state", &self.state)
            .field("steps", &self.steps)
            .field("pending_skip", &self.pending_skip)
            .field("regs", &self.regs)
            .finish()
    }
}

/// Errors that can occur during CPU execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CpuError {
    #[error("CPU not running: {0:?}")]
    NotRunning(CpuState),

    #[error("decode fault: {0}")]
    Decode(#[from] DecodeError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::decode::encode;
    use crate::cpu::operand::{INDIRECT_NEXT, NEXT_LITERAL, PC, PEEK, PICK, PUSH_POP, SP};
    use proptest::prelude::*;

    const A: u8 = 0x00;
    const B: u8 = 0x01;
    const C: u8 = 0x02;
    const X: u8 = 0x03;

    /// Small literal operand code for -1..=30.
    fn lit(value: i8) -> u8 {
        (i16::from(value) + 0x21) as u8
    }

    fn op(opcode: Opcode, b: u8, a: u8) -> Word {
        encode(opcode as u8, b, a)
    }

    fn jsr(a: u8) -> Word {
        encode(Opcode::Special as u8, SpecialOpcode::Jsr as u8, a)
    }

    fn run(program: &[Word]) -> Cpu {
        let mut cpu = Cpu::with_program(program).unwrap();
        cpu.run().unwrap();
        cpu
    }

    #[test]
    fn test_set_next_word() {
        let cpu = run(&[op(Opcode::Set, B, NEXT_LITERAL), 42]);
        assert_eq!(cpu.regs.get(Register::B), 42);
        assert!(cpu.is_halted());
        assert_eq!(cpu.steps, 1);
    }

    #[test]
    fn test_add_carry_into_ex() {
        let cpu = run(&[
            op(Opcode::Set, A, NEXT_LITERAL), 0xFFFF,
            op(Opcode::Add, A, lit(2)),
        ]);
        assert_eq!(cpu.regs.get(Register::A), 0x0001);
        assert_eq!(cpu.regs.ex, 0x0001);
    }

    #[test]
    fn test_sub_with_and_without_borrow() {
        let cpu = run(&[
            op(Opcode::Set, A, lit(5)),
            op(Opcode::Sub, A, lit(3)),
        ]);
        assert_eq!(cpu.regs.get(Register::A), 2);
        assert_eq!(cpu.regs.ex, 0);

        let cpu = run(&[op(Opcode::Sub, A, lit(1))]);
        assert_eq!(cpu.regs.get(Register::A), 0xFFFF);
        assert_eq!(cpu.regs.ex, 0xFFFF);
    }

    #[test]
    fn test_sub_from_pc_takes_one_extra() {
        let mut cpu = Cpu::with_program(&[op(Opcode::Set, A, A), op(Opcode::Sub, PC, lit(0))]).unwrap();
        cpu.step().unwrap();
        cpu.step().unwrap();
        // PC was 2 after the fetch; 2 - 0 - 1 = 1.
        assert_eq!(cpu.regs.pc, 1);
        assert_eq!(cpu.regs.ex, 0);
        assert!(cpu.is_running());
    }

    #[test]
    fn test_mul_and_mli() {
        let cpu = run(&[
            op(Opcode::Set, B, NEXT_LITERAL), 0x1000,
            op(Opcode::Mul, B, lit(20)),
        ]);
        assert_eq!(cpu.regs.get(Register::B), 0x4000);
        assert_eq!(cpu.regs.ex, 0x0001);

        let cpu = run(&[
            op(Opcode::Set, B, lit(7)),
            op(Opcode::Mli, B, lit(-1)),
        ]);
        assert_eq!(cpu.regs.get(Register::B), 0xFFF9);
        assert_eq!(cpu.regs.ex, 0xFFFF);
    }

    #[test]
    fn test_div_and_dvi() {
        let cpu = run(&[
            op(Opcode::Set, A, lit(7)),
            op(Opcode::Div, A, lit(2)),
        ]);
        assert_eq!(cpu.regs.get(Register::A), 3);
        assert_eq!(cpu.regs.ex, 0);

        let cpu = run(&[
            op(Opcode::Set, A, NEXT_LITERAL), (-9i16) as Word,
            op(Opcode::Dvi, A, lit(2)),
        ]);
        assert_eq!(cpu.regs.get(Register::A), (-4i16) as Word);
        assert_eq!(cpu.regs.ex, 0);
    }

    #[test]
    fn test_division_by_zero_clears_result_and_ex() {
        for opcode in [Opcode::Div, Opcode::Dvi] {
            let cpu = run(&[
                op(Opcode::Set, A, NEXT_LITERAL), 1234,
                op(Opcode::Set, 0x1d, lit(9)),
                op(opcode, A, lit(0)),
            ]);
            assert_eq!(cpu.regs.get(Register::A), 0, "{:?}", opcode);
            assert_eq!(cpu.regs.ex, 0, "{:?}", opcode);
        }
    }

    #[test]
    fn test_mod_and_mdi() {
        let cpu = run(&[
            op(Opcode::Set, A, lit(17)),
            op(Opcode::Mod, A, lit(5)),
            op(Opcode::Set, B, lit(-1)),
            op(Opcode::Mdi, B, lit(16)),
            op(Opcode::Set, C, lit(9)),
            op(Opcode::Mod, C, lit(0)),
        ]);
        assert_eq!(cpu.regs.get(Register::A), 2);
        assert_eq!(cpu.regs.get(Register::B), 0xFFFF);
        assert_eq!(cpu.regs.get(Register::C), 0);
        assert_eq!(cpu.regs.ex, 0);
    }

    #[test]
    fn test_bitwise() {
        let cpu = run(&[
            op(Opcode::Set, A, lit(12)),
            op(Opcode::And, A, lit(10)),
            op(Opcode::Set, B, lit(12)),
            op(Opcode::Bor, B, lit(10)),
            op(Opcode::Set, C, lit(12)),
            op(Opcode::Xor, C, lit(10)),
        ]);
        assert_eq!(cpu.regs.get(Register::A), 8);
        assert_eq!(cpu.regs.get(Register::B), 14);
        assert_eq!(cpu.regs.get(Register::C), 6);
    }

    #[test]
    fn test_ife_skips_whole_next_instruction() {
        let mut cpu = Cpu::with_program(&[
            op(Opcode::Set, A, lit(1)),
            op(Opcode::Set, B, lit(2)),
            op(Opcode::Ife, A, B),
            op(Opcode::Set, C, NEXT_LITERAL), 0x1234,
            op(Opcode::Set, X, lit(5)),
        ])
        .unwrap();

        for _ in 0..3 {
            cpu.step().unwrap();
        }
        assert!(cpu.pending_skip());

        cpu.step().unwrap();
        assert!(!cpu.pending_skip());
        assert_eq!(cpu.regs.pc, 5);
        assert_eq!(cpu.regs.get(Register::C), 0);

        cpu.run().unwrap();
        assert_eq!(cpu.regs.get(Register::X), 5);
        assert!(cpu.is_halted());
    }

    #[test]
    fn test_ife_equal_does_not_skip() {
        let cpu = run(&[
            op(Opcode::Set, A, lit(-1)),
            op(Opcode::Ife, A, NEXT_LITERAL), 0xFFFF,
            op(Opcode::Set, B, lit(3)),
        ]);
        assert_eq!(cpu.regs.get(Register::B), 3);
    }

    #[test]
    fn test_ifn_skips_when_equal() {
        let cpu = run(&[
            op(Opcode::Ifn, A, lit(0)),
            op(Opcode::Set, B, lit(3)),
            op(Opcode::Ifn, A, lit(1)),
            op(Opcode::Set, C, lit(4)),
        ]);
        assert_eq!(cpu.regs.get(Register::B), 0);
        assert_eq!(cpu.regs.get(Register::C), 4);
    }

    #[test]
    fn test_skipped_pop_leaves_sp() {
        let cpu = run(&[
            op(Opcode::Set, PUSH_POP, lit(7)),
            op(Opcode::Ife, A, lit(1)),
            op(Opcode::Set, B, PUSH_POP),
        ]);
        assert_eq!(cpu.regs.get(Register::B), 0);
        assert_eq!(cpu.regs.sp, 0xFFFE);
    }

    #[test]
    fn test_skipped_undefined_opcode_is_consumed() {
        let cpu = run(&[
            op(Opcode::Ife, A, lit(1)),
            encode(0x0d, A, A),
            op(Opcode::Set, B, lit(2)),
        ]);
        assert_eq!(cpu.state, CpuState::Halted);
        assert_eq!(cpu.regs.get(Register::B), 2);
    }

    #[test]
    fn test_skipped_special_consumes_sub_opcode_word() {
        // The skipped special's 0x1e field swallows the SET B word.
        let cpu = run(&[
            op(Opcode::Ife, A, lit(1)),
            encode(Opcode::Special as u8, INDIRECT_NEXT, lit(-1)),
            op(Opcode::Set, B, lit(7)),
            op(Opcode::Set, C, lit(5)),
        ]);
        assert_eq!(cpu.state, CpuState::Halted);
        assert_eq!(cpu.regs.get(Register::B), 0);
        assert_eq!(cpu.regs.get(Register::C), 5);
        assert_eq!(cpu.steps, 3);
    }

    #[test]
    fn test_stack_discipline() {
        let cpu = run(&[
            op(Opcode::Set, PUSH_POP, lit(10)),
            op(Opcode::Set, PUSH_POP, lit(11)),
            op(Opcode::Set, C, PICK), 1,
            op(Opcode::Set, X, PEEK),
            op(Opcode::Set, B, PUSH_POP),
        ]);
        assert_eq!(cpu.regs.get(Register::C), 10);
        assert_eq!(cpu.regs.get(Register::X), 11);
        assert_eq!(cpu.regs.get(Register::B), 11);
        assert_eq!(cpu.regs.sp, 0xFFFE);
        assert_eq!(cpu.mem.read(0xFFFE), 10);
    }

    #[test]
    fn test_memory_operands() {
        let cpu = run(&[
            op(Opcode::Set, A, NEXT_LITERAL), 0x2000,
            op(Opcode::Set, 0x08, NEXT_LITERAL), 43,
            op(Opcode::Set, 0x10, lit(5)), 1,
            op(Opcode::Set, C, 0x08),
            op(Opcode::Set, 0x1e, lit(9)), 0x3000,
            op(Opcode::Add, 0x1e, 0x1e), 0x3000, 0x3000,
        ]);
        assert_eq!(cpu.mem.read(0x2000), 43);
        assert_eq!(cpu.mem.read(0x2001), 5);
        assert_eq!(cpu.regs.get(Register::C), 43);
        assert_eq!(cpu.mem.read(0x3000), 18);
    }

    #[test]
    fn test_literal_destination_faults() {
        let mut cpu = Cpu::with_program(&[op(Opcode::Set, NEXT_LITERAL, lit(3)), 44]).unwrap();

        let err = cpu.step().unwrap_err();
        assert_eq!(err, CpuError::Decode(DecodeError::LiteralDestination(NEXT_LITERAL)));
        assert_eq!(cpu.state, CpuState::Faulted);
        assert_eq!(cpu.mem.read(44), 0);
        assert_eq!(cpu.step(), Err(CpuError::NotRunning(CpuState::Faulted)));
    }

    #[test]
    fn test_undefined_opcode_faults_without_side_effects() {
        let mut cpu = Cpu::with_program(&[encode(0x0d, PUSH_POP, lit(1))]).unwrap();

        assert_eq!(cpu.run(), Err(CpuError::Decode(DecodeError::InvalidOpcode(0x0d))));
        assert_eq!(cpu.regs.sp, 0xFFFF);
        assert_eq!(cpu.state, CpuState::Faulted);
    }

    #[test]
    fn test_undefined_special_opcode_faults() {
        let mut cpu = Cpu::with_program(&[encode(0x00, 0x08, lit(1))]).unwrap();
        assert_eq!(cpu.run(), Err(CpuError::Decode(DecodeError::InvalidSpecialOpcode(0x08))));
    }

    #[test]
    fn test_jsr_jumps_without_pushing() {
        let cpu = run(&[
            jsr(lit(4)),
            op(Opcode::Set, A, lit(1)),
            op(Opcode::Set, B, lit(1)),
            op(Opcode::Set, C, lit(1)),
            op(Opcode::Set, X, lit(1)),
        ]);
        assert_eq!(cpu.regs.get(Register::A), 0);
        assert_eq!(cpu.regs.get(Register::C), 0);
        assert_eq!(cpu.regs.get(Register::X), 1);
        assert_eq!(cpu.regs.sp, 0xFFFF);
        assert_eq!(cpu.mem.read(0xFFFF), 0);
        assert_eq!(cpu.steps, 2);
    }

    #[test]
    fn test_jump_past_program_halts() {
        let mut cpu = Cpu::with_program(&[jsr(NEXT_LITERAL), 0x0100, op(Opcode::Set, A, lit(1))]).unwrap();
        assert_eq!(cpu.run(), Ok(1));
        assert!(cpu.is_halted());
        assert_eq!(cpu.regs.pc, 0x0100);
        assert_eq!(cpu.regs.get(Register::A), 0);
    }

    #[test]
    fn test_backward_jump_loop() {
        // ADD A, 1 ; IFN A, 3 ; SET PC, 0
        let cpu = run(&[
            op(Opcode::Add, A, lit(1)),
            op(Opcode::Ifn, A, lit(3)),
            op(Opcode::Set, PC, lit(0)),
        ]);
        assert_eq!(cpu.regs.get(Register::A), 3);
        assert_eq!(cpu.regs.pc, 3);
    }

    #[test]
    fn test_sp_and_ex_as_operands() {
        let cpu = run(&[
            op(Opcode::Set, SP, lit(16)),
            op(Opcode::Set, A, SP),
            op(Opcode::Set, 0x1d, lit(1)),
            op(Opcode::Add, 0x1d, NEXT_LITERAL), 0xFFFF,
        ]);
        assert_eq!(cpu.regs.get(Register::A), 16);
        // The carry lands in EX after the sum does.
        assert_eq!(cpu.regs.ex, 1);
    }

    #[test]
    fn test_run_limited_stops_infinite_loop() {
        let mut cpu = Cpu::with_program(&[op(Opcode::Set, PC, lit(0))]).unwrap();
        assert_eq!(cpu.run_limited(10), Ok(10));
        assert!(cpu.is_running());
    }

    #[test]
    fn test_run_limited_unbounded_after_step() {
        let mut cpu = Cpu::with_program(&[
            op(Opcode::Set, A, lit(1)),
            op(Opcode::Set, B, lit(2)),
        ]).unwrap();
        cpu.step().unwrap();
        assert_eq!(cpu.run_limited(u64::MAX), Ok(1));
        assert!(cpu.is_halted());
        assert_eq!(cpu.regs.get(Register::B), 2);
    }

    #[test]
    fn test_run_observed_reports_fetch_pc() {
        let mut cpu = Cpu::with_program(&[
            op(Opcode::Set, A, NEXT_LITERAL), 300,
            op(Opcode::Set, B, lit(2)),
        ]).unwrap();
        let mut seen = Vec::new();
        let steps = cpu.run_observed(u64::MAX, |pc, cpu| seen.push((pc, cpu.regs.pc)));
        assert_eq!(steps, Ok(2));
        assert_eq!(seen, vec![(0, 2), (2, 3)]);
    }

    #[test]
    fn test_empty_program_is_halted() {
        let mut cpu = Cpu::with_program(&[]).unwrap();
        assert!(cpu.is_halted());
        assert_eq!(cpu.run(), Ok(0));
    }

    #[test]
    fn test_reset_reloads_program() {
        let mut cpu = Cpu::with_program(&[op(Opcode::Set, PUSH_POP, lit(3))]).unwrap();
        cpu.run().unwrap();
        assert_eq!(cpu.regs.sp, 0xFFFE);

        cpu.reset();
        assert!(cpu.is_running());
        assert_eq!(cpu.regs.sp, 0xFFFF);
        assert_eq!(cpu.regs.pc, 0);
        assert_eq!(cpu.mem.read(0xFFFE), 0);
        assert_eq!(cpu.steps, 0);
    }

    #[test]
    fn test_snapshot_serializes() {
        let cpu = run(&[op(Opcode::Set, A, lit(30))]);
        let json = serde_json::to_string(&cpu).unwrap();
        let restored: Cpu = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.regs, cpu.regs);
        assert_eq!(restored.state, CpuState::Halted);
    }

    proptest! {
        #[test]
        fn prop_set_then_read(reg in 0u8..8, value: u16) {
            let cpu = run(&[op(Opcode::Set, reg, NEXT_LITERAL), value]);
            prop_assert_eq!(cpu.regs.get(Register::general(reg)), value);
        }

        #[test]
        fn prop_add_sets_sum_and_carry(a: u16, b: u16) {
            let cpu = run(&[
                op(Opcode::Set, A, NEXT_LITERAL), a,
                op(Opcode::Add, A, NEXT_LITERAL), b,
            ]);
            let sum = u32::from(a) + u32::from(b);
            prop_assert_eq!(cpu.regs.get(Register::A), (sum % 65536) as u16);
            prop_assert_eq!(cpu.regs.ex, (sum / 65536) as u16);
        }

        #[test]
        fn prop_jsr_only_moves_pc(target in 2u16..=u16::MAX) {
            let cpu = run(&[jsr(NEXT_LITERAL), target]);
            prop_assert_eq!(cpu.regs.pc, target);
            prop_assert_eq!(cpu.regs.sp, 0xFFFF);
            prop_assert_eq!(cpu.regs.general, [0; 8]);
        }
    }
}
