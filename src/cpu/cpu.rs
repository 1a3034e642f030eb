use crate::{
    bus::Bus,
    cpu::cycles,
    cpu::flags::{
        FLAG_BREAK, FLAG_CARRY, FLAG_DECIMAL, FLAG_INTERRUPT_DISABLE, FLAG_NEGATIVE, FLAG_OVERFLOW,
        FLAG_UNUSED, FLAG_ZERO,
    },
};

use ansi_term::Colour::Red;

/// Outcome of a donated cycle budget.
///
/// `Continue` means the budget ran dry mid-program and the caller should
/// donate again; `Break` means the program halted (BRK or an opcode outside
/// the documented set).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunResult {
    Continue,
    Break,
}

pub struct CPU<B: Bus> {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub pc: u16,
    pub status: u8,
    /// Signed running balance of donated cycles. Instructions are withdrawn
    /// lazily, so the balance may dip below zero before the loop yields.
    pub cycles_available: i32,
    pub bus: B,
    pub halted: bool,
    page_crossed: bool,
    branch_taken: bool,
    branch_page_crossed: bool,
}

impl<B: Bus> CPU<B> {
    /// Fresh CPU in the running state: PC at 0x0000, stack at 0x01FF, all
    /// flags clear, empty cycle balance.
    pub fn new(bus: B) -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            sp: 0xFF,
            pc: 0,
            status: 0,
            cycles_available: 0,
            bus,
            halted: false,
            page_crossed: false,
            branch_taken: false,
            branch_page_crossed: false,
        }
    }

    /// Position the CPU before the first `run` call.
    pub fn set_instruction_pointer(&mut self, pc: u16) {
        self.pc = pc;
    }

    /// Set the stack pointer from a 16-bit value; only the low byte is
    /// architectural, the stack always lives in page 1.
    pub fn set_stack_pointer(&mut self, sp: u16) {
        self.sp = sp as u8;
    }

    /// Deposit `cycles_donated` into the balance and dispatch instructions
    /// until the balance is exhausted or the program halts. A residual
    /// negative balance carries into the next call, so repeated donations
    /// converge on the donated rate.
    pub fn run(&mut self, cycles_donated: i32) -> RunResult {
        if self.halted {
            return RunResult::Break;
        }

        self.cycles_available += cycles_donated;

        while self.cycles_available > 0 {
            if self.step() == RunResult::Break {
                return RunResult::Break;
            }
        }

        RunResult::Continue
    }

    /// Fetch, dispatch, and charge a single instruction.
    fn step(&mut self) -> RunResult {
        self.page_crossed = false;
        self.branch_taken = false;
        self.branch_page_crossed = false;

        // Interrupt poll hook: IRQ/NMI checks land here once the surrounding
        // system grows an interrupt source.

        let pc = self.pc;
        let opcode = self.bus.read(pc);
        self.pc = self.pc.wrapping_add(1);
        self.trace(pc, opcode);

        let result = self.execute(opcode);

        self.cycles_available -= cycles::cost(
            opcode,
            self.page_crossed,
            self.branch_taken,
            self.branch_page_crossed,
        );

        result
    }

    fn trace(&self, pc: u16, opcode: u8) {
        log::trace!(
            "N{} V{} B{} D{} I{} Z{} C{}  PC:{:04X} SP:{:02X} A:{:02X} X:{:02X} Y:{:02X}  {}",
            (self.status & FLAG_NEGATIVE != 0) as u8,
            (self.status & FLAG_OVERFLOW != 0) as u8,
            (self.status & FLAG_BREAK != 0) as u8,
            (self.status & FLAG_DECIMAL != 0) as u8,
            (self.status & FLAG_INTERRUPT_DISABLE != 0) as u8,
            (self.status & FLAG_ZERO != 0) as u8,
            (self.status & FLAG_CARRY != 0) as u8,
            pc,
            self.sp,
            self.a,
            self.x,
            self.y,
            cycles::INSTRUCTION_NAMES[opcode as usize],
        );
    }

    fn execute(&mut self, opcode: u8) -> RunResult {
        match opcode {
            0xA9 => self.lda_immediate(),
            0xA5 => self.lda_zeropage(),
            0xB5 => self.lda_zeropage_x(),
            0xAD => self.lda_absolute(),
            0xBD => self.lda_absolute_x(),
            0xB9 => self.lda_absolute_y(),
            0xA1 => self.lda_indirect_x(),
            0xB1 => self.lda_indirect_y(),
            0xA2 => self.ldx_immediate(),
            0xA6 => self.ldx_zeropage(),
            0xB6 => self.ldx_zeropage_y(),
            0xAE => self.ldx_absolute(),
            0xBE => self.ldx_absolute_y(),
            0xA0 => self.ldy_immediate(),
            0xA4 => self.ldy_zeropage(),
            0xB4 => self.ldy_zeropage_x(),
            0xAC => self.ldy_absolute(),
            0xBC => self.ldy_absolute_x(),
            0x85 => self.sta_zeropage(),
            0x95 => self.sta_zeropage_x(),
            0x8D => self.sta_absolute(),
            0x9D => self.sta_absolute_x(),
            0x99 => self.sta_absolute_y(),
            0x81 => self.sta_indirect_x(),
            0x91 => self.sta_indirect_y(),
            0x86 => self.stx_zeropage(),
            0x96 => self.stx_zeropage_y(),
            0x8E => self.stx_absolute(),
            0x84 => self.sty_zeropage(),
            0x94 => self.sty_zeropage_x(),
            0x8C => self.sty_absolute(),
            0xAA => self.tax(),
            0xA8 => self.tay(),
            0x8A => self.txa(),
            0x98 => self.tya(),
            0xBA => self.tsx(),
            0x9A => self.txs(),
            0xE8 => self.inx(),
            0xC8 => self.iny(),
            0xCA => self.dex(),
            0x88 => self.dey(),
            0xE6 => self.inc_zeropage(),
            0xF6 => self.inc_zeropage_x(),
            0xEE => self.inc_absolute(),
            0xFE => self.inc_absolute_x(),
            0xC6 => self.dec_zeropage(),
            0xD6 => self.dec_zeropage_x(),
            0xCE => self.dec_absolute(),
            0xDE => self.dec_absolute_x(),
            0x69 => self.adc_immediate(),
            0x65 => self.adc_zeropage(),
            0x75 => self.adc_zeropage_x(),
            0x6D => self.adc_absolute(),
            0x7D => self.adc_absolute_x(),
            0x79 => self.adc_absolute_y(),
            0x61 => self.adc_indirect_x(),
            0x71 => self.adc_indirect_y(),
            0xE9 => self.sbc_immediate(),
            0xE5 => self.sbc_zeropage(),
            0xF5 => self.sbc_zeropage_x(),
            0xED => self.sbc_absolute(),
            0xFD => self.sbc_absolute_x(),
            0xF9 => self.sbc_absolute_y(),
            0xE1 => self.sbc_indirect_x(),
            0xF1 => self.sbc_indirect_y(),
            0x29 => self.and_immediate(),
            0x25 => self.and_zeropage(),
            0x35 => self.and_zeropage_x(),
            0x2D => self.and_absolute(),
            0x3D => self.and_absolute_x(),
            0x39 => self.and_absolute_y(),
            0x21 => self.and_indirect_x(),
            0x31 => self.and_indirect_y(),
            0x09 => self.ora_immediate(),
            0x05 => self.ora_zeropage(),
            0x15 => self.ora_zeropage_x(),
            0x0D => self.ora_absolute(),
            0x1D => self.ora_absolute_x(),
            0x19 => self.ora_absolute_y(),
            0x01 => self.ora_indirect_x(),
            0x11 => self.ora_indirect_y(),
            0x49 => self.eor_immediate(),
            0x45 => self.eor_zeropage(),
            0x55 => self.eor_zeropage_x(),
            0x4D => self.eor_absolute(),
            0x5D => self.eor_absolute_x(),
            0x59 => self.eor_absolute_y(),
            0x41 => self.eor_indirect_x(),
            0x51 => self.eor_indirect_y(),
            0xC9 => self.cmp_immediate(),
            0xC5 => self.cmp_zeropage(),
            0xD5 => self.cmp_zeropage_x(),
            0xCD => self.cmp_absolute(),
            0xDD => self.cmp_absolute_x(),
            0xD9 => self.cmp_absolute_y(),
            0xC1 => self.cmp_indirect_x(),
            0xD1 => self.cmp_indirect_y(),
            0xE0 => self.cpx_immediate(),
            0xE4 => self.cpx_zeropage(),
            0xEC => self.cpx_absolute(),
            0xC0 => self.cpy_immediate(),
            0xC4 => self.cpy_zeropage(),
            0xCC => self.cpy_absolute(),
            0x24 => self.bit_zeropage(),
            0x2C => self.bit_absolute(),
            0x0A => self.asl_accumulator(),
            0x06 => self.asl_zeropage(),
            0x16 => self.asl_zeropage_x(),
            0x0E => self.asl_absolute(),
            0x1E => self.asl_absolute_x(),
            0x4A => self.lsr_accumulator(),
            0x46 => self.lsr_zeropage(),
            0x56 => self.lsr_zeropage_x(),
            0x4E => self.lsr_absolute(),
            0x5E => self.lsr_absolute_x(),
            0x2A => self.rol_accumulator(),
            0x26 => self.rol_zeropage(),
            0x36 => self.rol_zeropage_x(),
            0x2E => self.rol_absolute(),
            0x3E => self.rol_absolute_x(),
            0x6A => self.ror_accumulator(),
            0x66 => self.ror_zeropage(),
            0x76 => self.ror_zeropage_x(),
            0x6E => self.ror_absolute(),
            0x7E => self.ror_absolute_x(),
            0x10 => self.bpl(),
            0x30 => self.bmi(),
            0x50 => self.bvc(),
            0x70 => self.bvs(),
            0x90 => self.bcc(),
            0xB0 => self.bcs(),
            0xD0 => self.bne(),
            0xF0 => self.beq(),
            0x4C => self.jmp_absolute(),
            0x6C => self.jmp_indirect(),
            0x20 => self.jsr_absolute(),
            0x60 => self.rts(),
            0x48 => self.pha(),
            0x08 => self.php(),
            0x68 => self.pla(),
            0x28 => self.plp(),
            0x18 => self.clc(),
            0x38 => self.sec(),
            0x58 => self.cli(),
            0x78 => self.sei(),
            0xB8 => self.clv(),
            0xD8 => self.cld(),
            0xF8 => self.sed(),
            0xEA => self.nop(),
            0x00 => return self.brk(),
            _ => {
                eprintln!(
                    "{} unknown opcode: ${:02X} at ${:04X}",
                    Red.bold().paint("ERROR"),
                    opcode,
                    self.pc.wrapping_sub(1)
                );
                self.halted = true;
                return RunResult::Break;
            }
        }

        RunResult::Continue
    }

    fn lda_immediate(&mut self) {
        self.a = self.operand_immediate();
        self.pc = self.pc.wrapping_add(1);
        self.update_zero_and_negative_flags(self.a);
    }

    fn lda_zeropage(&mut self) {
        self.a = self.operand_zeropage();
        self.pc = self.pc.wrapping_add(1);
        self.update_zero_and_negative_flags(self.a);
    }

    fn lda_zeropage_x(&mut self) {
        self.a = self.operand_zeropage_indexed(self.x);
        self.pc = self.pc.wrapping_add(1);
        self.update_zero_and_negative_flags(self.a);
    }

    fn lda_absolute(&mut self) {
        self.a = self.operand_absolute();
        self.pc = self.pc.wrapping_add(2);
        self.update_zero_and_negative_flags(self.a);
    }

    fn lda_absolute_x(&mut self) {
        self.a = self.operand_absolute_indexed(self.x);
        self.pc = self.pc.wrapping_add(2);
        self.update_zero_and_negative_flags(self.a);
    }

    fn lda_absolute_y(&mut self) {
        self.a = self.operand_absolute_indexed(self.y);
        self.pc = self.pc.wrapping_add(2);
        self.update_zero_and_negative_flags(self.a);
    }

    fn lda_indirect_x(&mut self) {
        self.a = self.operand_indexed_indirect();
        self.pc = self.pc.wrapping_add(1);
        self.update_zero_and_negative_flags(self.a);
    }

    fn lda_indirect_y(&mut self) {
        self.a = self.operand_indirect_indexed();
        self.pc = self.pc.wrapping_add(1);
        self.update_zero_and_negative_flags(self.a);
    }

    fn ldx_immediate(&mut self) {
        self.x = self.operand_immediate();
        self.pc = self.pc.wrapping_add(1);
        self.update_zero_and_negative_flags(self.x);
    }

    fn ldx_zeropage(&mut self) {
        self.x = self.operand_zeropage();
        self.pc = self.pc.wrapping_add(1);
        self.update_zero_and_negative_flags(self.x);
    }

    fn ldx_zeropage_y(&mut self) {
        self.x = self.operand_zeropage_indexed(self.y);
        self.pc = self.pc.wrapping_add(1);
        self.update_zero_and_negative_flags(self.x);
    }

    fn ldx_absolute(&mut self) {
        self.x = self.operand_absolute();
        self.pc = self.pc.wrapping_add(2);
        self.update_zero_and_negative_flags(self.x);
    }

    fn ldx_absolute_y(&mut self) {
        self.x = self.operand_absolute_indexed(self.y);
        self.pc = self.pc.wrapping_add(2);
        self.update_zero_and_negative_flags(self.x);
    }

    fn ldy_immediate(&mut self) {
        self.y = self.operand_immediate();
        self.pc = self.pc.wrapping_add(1);
        self.update_zero_and_negative_flags(self.y);
    }

    fn ldy_zeropage(&mut self) {
        self.y = self.operand_zeropage();
        self.pc = self.pc.wrapping_add(1);
        self.update_zero_and_negative_flags(self.y);
    }

    fn ldy_zeropage_x(&mut self) {
        self.y = self.operand_zeropage_indexed(self.x);
        self.pc = self.pc.wrapping_add(1);
        self.update_zero_and_negative_flags(self.y);
    }

    fn ldy_absolute(&mut self) {
        self.y = self.operand_absolute();
        self.pc = self.pc.wrapping_add(2);
        self.update_zero_and_negative_flags(self.y);
    }

    fn ldy_absolute_x(&mut self) {
        self.y = self.operand_absolute_indexed(self.x);
        self.pc = self.pc.wrapping_add(2);
        self.update_zero_and_negative_flags(self.y);
    }

    fn sta_zeropage(&mut self) {
        let addr = self.addr_zeropage();
        self.pc = self.pc.wrapping_add(1);
        self.bus.write(addr, self.a);
    }

    fn sta_zeropage_x(&mut self) {
        let addr = self.addr_zeropage_indexed(self.x);
        self.pc = self.pc.wrapping_add(1);
        self.bus.write(addr, self.a);
    }

    fn sta_absolute(&mut self) {
        let addr = self.addr_absolute();
        self.pc = self.pc.wrapping_add(2);
        self.bus.write(addr, self.a);
    }

    fn sta_absolute_x(&mut self) {
        let addr = self.addr_absolute_indexed(self.x);
        self.pc = self.pc.wrapping_add(2);
        self.bus.write(addr, self.a);
    }

    fn sta_absolute_y(&mut self) {
        let addr = self.addr_absolute_indexed(self.y);
        self.pc = self.pc.wrapping_add(2);
        self.bus.write(addr, self.a);
    }

    fn sta_indirect_x(&mut self) {
        let addr = self.addr_indexed_indirect();
        self.pc = self.pc.wrapping_add(1);
        self.bus.write(addr, self.a);
    }

    fn sta_indirect_y(&mut self) {
        let addr = self.addr_indirect_indexed();
        self.pc = self.pc.wrapping_add(1);
        self.bus.write(addr, self.a);
    }

    fn stx_zeropage(&mut self) {
        let addr = self.addr_zeropage();
        self.pc = self.pc.wrapping_add(1);
        self.bus.write(addr, self.x);
    }

    fn stx_zeropage_y(&mut self) {
        let addr = self.addr_zeropage_indexed(self.y);
        self.pc = self.pc.wrapping_add(1);
        self.bus.write(addr, self.x);
    }

    fn stx_absolute(&mut self) {
        let addr = self.addr_absolute();
        self.pc = self.pc.wrapping_add(2);
        self.bus.write(addr, self.x);
    }

    fn sty_zeropage(&mut self) {
        let addr = self.addr_zeropage();
        self.pc = self.pc.wrapping_add(1);
        self.bus.write(addr, self.y);
    }

    fn sty_zeropage_x(&mut self) {
        let addr = self.addr_zeropage_indexed(self.x);
        self.pc = self.pc.wrapping_add(1);
        self.bus.write(addr, self.y);
    }

    fn sty_absolute(&mut self) {
        let addr = self.addr_absolute();
        self.pc = self.pc.wrapping_add(2);
        self.bus.write(addr, self.y);
    }

    fn tax(&mut self) {
        self.x = self.a;
        self.update_zero_and_negative_flags(self.x);
    }

    fn tay(&mut self) {
        self.y = self.a;
        self.update_zero_and_negative_flags(self.y);
    }

    fn txa(&mut self) {
        self.a = self.x;
        self.update_zero_and_negative_flags(self.a);
    }

    fn tya(&mut self) {
        self.a = self.y;
        self.update_zero_and_negative_flags(self.a);
    }

    fn tsx(&mut self) {
        self.x = self.sp;
        self.update_zero_and_negative_flags(self.x);
    }

    // TXS is the one transfer that leaves the flags alone.
    fn txs(&mut self) {
        self.sp = self.x;
    }

    fn inx(&mut self) {
        self.x = self.x.wrapping_add(1);
        self.update_zero_and_negative_flags(self.x);
    }

    fn iny(&mut self) {
        self.y = self.y.wrapping_add(1);
        self.update_zero_and_negative_flags(self.y);
    }

    fn dex(&mut self) {
        self.x = self.x.wrapping_sub(1);
        self.update_zero_and_negative_flags(self.x);
    }

    fn dey(&mut self) {
        self.y = self.y.wrapping_sub(1);
        self.update_zero_and_negative_flags(self.y);
    }

    fn inc_zeropage(&mut self) {
        let addr = self.addr_zeropage();
        self.pc = self.pc.wrapping_add(1);
        let value = self.bus.read(addr).wrapping_add(1);
        self.bus.write(addr, value);
        self.update_zero_and_negative_flags(value);
    }

    fn inc_zeropage_x(&mut self) {
        let addr = self.addr_zeropage_indexed(self.x);
        self.pc = self.pc.wrapping_add(1);
        let value = self.bus.read(addr).wrapping_add(1);
        self.bus.write(addr, value);
        self.update_zero_and_negative_flags(value);
    }

    fn inc_absolute(&mut self) {
        let addr = self.addr_absolute();
        self.pc = self.pc.wrapping_add(2);
        let value = self.bus.read(addr).wrapping_add(1);
        self.bus.write(addr, value);
        self.update_zero_and_negative_flags(value);
    }

    fn inc_absolute_x(&mut self) {
        let addr = self.addr_absolute_indexed(self.x);
        self.pc = self.pc.wrapping_add(2);
        let value = self.bus.read(addr).wrapping_add(1);
        self.bus.write(addr, value);
        self.update_zero_and_negative_flags(value);
    }

    fn dec_zeropage(&mut self) {
        let addr = self.addr_zeropage();
        self.pc = self.pc.wrapping_add(1);
        let value = self.bus.read(addr).wrapping_sub(1);
        self.bus.write(addr, value);
        self.update_zero_and_negative_flags(value);
    }

    fn dec_zeropage_x(&mut self) {
        let addr = self.addr_zeropage_indexed(self.x);
        self.pc = self.pc.wrapping_add(1);
        let value = self.bus.read(addr).wrapping_sub(1);
        self.bus.write(addr, value);
        self.update_zero_and_negative_flags(value);
    }

    fn dec_absolute(&mut self) {
        let addr = self.addr_absolute();
        self.pc = self.pc.wrapping_add(2);
        let value = self.bus.read(addr).wrapping_sub(1);
        self.bus.write(addr, value);
        self.update_zero_and_negative_flags(value);
    }

    fn dec_absolute_x(&mut self) {
        let addr = self.addr_absolute_indexed(self.x);
        self.pc = self.pc.wrapping_add(2);
        let value = self.bus.read(addr).wrapping_sub(1);
        self.bus.write(addr, value);
        self.update_zero_and_negative_flags(value);
    }

    fn adc_immediate(&mut self) {
        let value = self.operand_immediate();
        self.pc = self.pc.wrapping_add(1);
        self.add_with_carry(value);
    }

    fn adc_zeropage(&mut self) {
        let value = self.operand_zeropage();
        self.pc = self.pc.wrapping_add(1);
        self.add_with_carry(value);
    }

    fn adc_zeropage_x(&mut self) {
        let value = self.operand_zeropage_indexed(self.x);
        self.pc = self.pc.wrapping_add(1);
        self.add_with_carry(value);
    }

    fn adc_absolute(&mut self) {
        let value = self.operand_absolute();
        self.pc = self.pc.wrapping_add(2);
        self.add_with_carry(value);
    }

    fn adc_absolute_x(&mut self) {
        let value = self.operand_absolute_indexed(self.x);
        self.pc = self.pc.wrapping_add(2);
        self.add_with_carry(value);
    }

    fn adc_absolute_y(&mut self) {
        let value = self.operand_absolute_indexed(self.y);
        self.pc = self.pc.wrapping_add(2);
        self.add_with_carry(value);
    }

    fn adc_indirect_x(&mut self) {
        let value = self.operand_indexed_indirect();
        self.pc = self.pc.wrapping_add(1);
        self.add_with_carry(value);
    }

    fn adc_indirect_y(&mut self) {
        let value = self.operand_indirect_indexed();
        self.pc = self.pc.wrapping_add(1);
        self.add_with_carry(value);
    }

    fn sbc_immediate(&mut self) {
        let value = self.operand_immediate();
        self.pc = self.pc.wrapping_add(1);
        self.sub_with_carry(value);
    }

    fn sbc_zeropage(&mut self) {
        let value = self.operand_zeropage();
        self.pc = self.pc.wrapping_add(1);
        self.sub_with_carry(value);
    }

    fn sbc_zeropage_x(&mut self) {
        let value = self.operand_zeropage_indexed(self.x);
        self.pc = self.pc.wrapping_add(1);
        self.sub_with_carry(value);
    }

    fn sbc_absolute(&mut self) {
        let value = self.operand_absolute();
        self.pc = self.pc.wrapping_add(2);
        self.sub_with_carry(value);
    }

    fn sbc_absolute_x(&mut self) {
        let value = self.operand_absolute_indexed(self.x);
        self.pc = self.pc.wrapping_add(2);
        self.sub_with_carry(value);
    }

    fn sbc_absolute_y(&mut self) {
        let value = self.operand_absolute_indexed(self.y);
        self.pc = self.pc.wrapping_add(2);
        self.sub_with_carry(value);
    }

    fn sbc_indirect_x(&mut self) {
        let value = self.operand_indexed_indirect();
        self.pc = self.pc.wrapping_add(1);
        self.sub_with_carry(value);
    }

    fn sbc_indirect_y(&mut self) {
        let value = self.operand_indirect_indexed();
        self.pc = self.pc.wrapping_add(1);
        self.sub_with_carry(value);
    }

    fn and_immediate(&mut self) {
        let value = self.operand_immediate();
        self.pc = self.pc.wrapping_add(1);
        self.a &= value;
        self.update_zero_and_negative_flags(self.a);
    }

    fn and_zeropage(&mut self) {
        let value = self.operand_zeropage();
        self.pc = self.pc.wrapping_add(1);
        self.a &= value;
        self.update_zero_and_negative_flags(self.a);
    }

    fn and_zeropage_x(&mut self) {
        let value = self.operand_zeropage_indexed(self.x);
        self.pc = self.pc.wrapping_add(1);
        self.a &= value;
        self.update_zero_and_negative_flags(self.a);
    }

    fn and_absolute(&mut self) {
        let value = self.operand_absolute();
        self.pc = self.pc.wrapping_add(2);
        self.a &= value;
        self.update_zero_and_negative_flags(self.a);
    }

    fn and_absolute_x(&mut self) {
        let value = self.operand_absolute_indexed(self.x);
        self.pc = self.pc.wrapping_add(2);
        self.a &= value;
        self.update_zero_and_negative_flags(self.a);
    }

    fn and_absolute_y(&mut self) {
        let value = self.operand_absolute_indexed(self.y);
        self.pc = self.pc.wrapping_add(2);
        self.a &= value;
        self.update_zero_and_negative_flags(self.a);
    }

    fn and_indirect_x(&mut self) {
        let value = self.operand_indexed_indirect();
        self.pc = self.pc.wrapping_add(1);
        self.a &= value;
        self.update_zero_and_negative_flags(self.a);
    }

    fn and_indirect_y(&mut self) {
        let value = self.operand_indirect_indexed();
        self.pc = self.pc.wrapping_add(1);
        self.a &= value;
        self.update_zero_and_negative_flags(self.a);
    }

    fn ora_immediate(&mut self) {
        let value = self.operand_immediate();
        self.pc = self.pc.wrapping_add(1);
        self.a |= value;
        self.update_zero_and_negative_flags(self.a);
    }

    fn ora_zeropage(&mut self) {
        let value = self.operand_zeropage();
        self.pc = self.pc.wrapping_add(1);
        self.a |= value;
        self.update_zero_and_negative_flags(self.a);
    }

    fn ora_zeropage_x(&mut self) {
        let value = self.operand_zeropage_indexed(self.x);
        self.pc = self.pc.wrapping_add(1);
        self.a |= value;
        self.update_zero_and_negative_flags(self.a);
    }

    fn ora_absolute(&mut self) {
        let value = self.operand_absolute();
        self.pc = self.pc.wrapping_add(2);
        self.a |= value;
        self.update_zero_and_negative_flags(self.a);
    }

    fn ora_absolute_x(&mut self) {
        let value = self.operand_absolute_indexed(self.x);
        self.pc = self.pc.wrapping_add(2);
        self.a |= value;
        self.update_zero_and_negative_flags(self.a);
    }

    fn ora_absolute_y(&mut self) {
        let value = self.operand_absolute_indexed(self.y);
        self.pc = self.pc.wrapping_add(2);
        self.a |= value;
        self.update_zero_and_negative_flags(self.a);
    }

    fn ora_indirect_x(&mut self) {
        let value = self.operand_indexed_indirect();
        self.pc = self.pc.wrapping_add(1);
        self.a |= value;
        self.update_zero_and_negative_flags(self.a);
    }

    fn ora_indirect_y(&mut self) {
        let value = self.operand_indirect_indexed();
        self.pc = self.pc.wrapping_add(1);
        self.a |= value;
        self.update_zero_and_negative_flags(self.a);
    }

    fn eor_immediate(&mut self) {
        let value = self.operand_immediate();
        self.pc = self.pc.wrapping_add(1);
        self.a ^= value;
        self.update_zero_and_negative_flags(self.a);
    }

    fn eor_zeropage(&mut self) {
        let value = self.operand_zeropage();
        self.pc = self.pc.wrapping_add(1);
        self.a ^= value;
        self.update_zero_and_negative_flags(self.a);
    }

    fn eor_zeropage_x(&mut self) {
        let value = self.operand_zeropage_indexed(self.x);
        self.pc = self.pc.wrapping_add(1);
        self.a ^= value;
        self.update_zero_and_negative_flags(self.a);
    }

    fn eor_absolute(&mut self) {
        let value = self.operand_absolute();
        self.pc = self.pc.wrapping_add(2);
        self.a ^= value;
        self.update_zero_and_negative_flags(self.a);
    }

    fn eor_absolute_x(&mut self) {
        let value = self.operand_absolute_indexed(self.x);
        self.pc = self.pc.wrapping_add(2);
        self.a ^= value;
        self.update_zero_and_negative_flags(self.a);
    }

    fn eor_absolute_y(&mut self) {
        let value = self.operand_absolute_indexed(self.y);
        self.pc = self.pc.wrapping_add(2);
        self.a ^= value;
        self.update_zero_and_negative_flags(self.a);
    }

    fn eor_indirect_x(&mut self) {
        let value = self.operand_indexed_indirect();
        self.pc = self.pc.wrapping_add(1);
        self.a ^= value;
        self.update_zero_and_negative_flags(self.a);
    }

    fn eor_indirect_y(&mut self) {
        let value = self.operand_indirect_indexed();
        self.pc = self.pc.wrapping_add(1);
        self.a ^= value;
        self.update_zero_and_negative_flags(self.a);
    }

    fn cmp_immediate(&mut self) {
        let value = self.operand_immediate();
        self.pc = self.pc.wrapping_add(1);
        self.compare(self.a, value);
    }

    fn cmp_zeropage(&mut self) {
        let value = self.operand_zeropage();
        self.pc = self.pc.wrapping_add(1);
        self.compare(self.a, value);
    }

    fn cmp_zeropage_x(&mut self) {
        let value = self.operand_zeropage_indexed(self.x);
        self.pc = self.pc.wrapping_add(1);
        self.compare(self.a, value);
    }

    fn cmp_absolute(&mut self) {
        let value = self.operand_absolute();
        self.pc = self.pc.wrapping_add(2);
        self.compare(self.a, value);
    }

    fn cmp_absolute_x(&mut self) {
        let value = self.operand_absolute_indexed(self.x);
        self.pc = self.pc.wrapping_add(2);
        self.compare(self.a, value);
    }

    fn cmp_absolute_y(&mut self) {
        let value = self.operand_absolute_indexed(self.y);
        self.pc = self.pc.wrapping_add(2);
        self.compare(self.a, value);
    }

    fn cmp_indirect_x(&mut self) {
        let value = self.operand_indexed_indirect();
        self.pc = self.pc.wrapping_add(1);
        self.compare(self.a, value);
    }

    fn cmp_indirect_y(&mut self) {
        let value = self.operand_indirect_indexed();
        self.pc = self.pc.wrapping_add(1);
        self.compare(self.a, value);
    }

    fn cpx_immediate(&mut self) {
        let value = self.operand_immediate();
        self.pc = self.pc.wrapping_add(1);
        self.compare(self.x, value);
    }

    fn cpx_zeropage(&mut self) {
        let value = self.operand_zeropage();
        self.pc = self.pc.wrapping_add(1);
        self.compare(self.x, value);
    }

    fn cpx_absolute(&mut self) {
        let value = self.operand_absolute();
        self.pc = self.pc.wrapping_add(2);
        self.compare(self.x, value);
    }

    fn cpy_immediate(&mut self) {
        let value = self.operand_immediate();
        self.pc = self.pc.wrapping_add(1);
        self.compare(self.y, value);
    }

    fn cpy_zeropage(&mut self) {
        let value = self.operand_zeropage();
        self.pc = self.pc.wrapping_add(1);
        self.compare(self.y, value);
    }

    fn cpy_absolute(&mut self) {
        let value = self.operand_absolute();
        self.pc = self.pc.wrapping_add(2);
        self.compare(self.y, value);
    }

    fn bit_zeropage(&mut self) {
        let value = self.operand_zeropage();
        self.pc = self.pc.wrapping_add(1);
        self.bit_test(value);
    }

    fn bit_absolute(&mut self) {
        let value = self.operand_absolute();
        self.pc = self.pc.wrapping_add(2);
        self.bit_test(value);
    }

    fn asl_accumulator(&mut self) {
        self.a = self.shift_left(self.a);
    }

    fn asl_zeropage(&mut self) {
        let addr = self.addr_zeropage();
        self.pc = self.pc.wrapping_add(1);
        let value = self.bus.read(addr);
        let result = self.shift_left(value);
        self.bus.write(addr, result);
    }

    fn asl_zeropage_x(&mut self) {
        let addr = self.addr_zeropage_indexed(self.x);
        self.pc = self.pc.wrapping_add(1);
        let value = self.bus.read(addr);
        let result = self.shift_left(value);
        self.bus.write(addr, result);
    }

    fn asl_absolute(&mut self) {
        let addr = self.addr_absolute();
        self.pc = self.pc.wrapping_add(2);
        let value = self.bus.read(addr);
        let result = self.shift_left(value);
        self.bus.write(addr, result);
    }

    fn asl_absolute_x(&mut self) {
        let addr = self.addr_absolute_indexed(self.x);
        self.pc = self.pc.wrapping_add(2);
        let value = self.bus.read(addr);
        let result = self.shift_left(value);
        self.bus.write(addr, result);
    }

    fn lsr_accumulator(&mut self) {
        self.a = self.shift_right(self.a);
    }

    fn lsr_zeropage(&mut self) {
        let addr = self.addr_zeropage();
        self.pc = self.pc.wrapping_add(1);
        let value = self.bus.read(addr);
        let result = self.shift_right(value);
        self.bus.write(addr, result);
    }

    fn lsr_zeropage_x(&mut self) {
        let addr = self.addr_zeropage_indexed(self.x);
        self.pc = self.pc.wrapping_add(1);
        let value = self.bus.read(addr);
        let result = self.shift_right(value);
        self.bus.write(addr, result);
    }

    fn lsr_absolute(&mut self) {
        let addr = self.addr_absolute();
        self.pc = self.pc.wrapping_add(2);
        let value = self.bus.read(addr);
        let result = self.shift_right(value);
        self.bus.write(addr, result);
    }

    fn lsr_absolute_x(&mut self) {
        let addr = self.addr_absolute_indexed(self.x);
        self.pc = self.pc.wrapping_add(2);
        let value = self.bus.read(addr);
        let result = self.shift_right(value);
        self.bus.write(addr, result);
    }

    fn rol_accumulator(&mut self) {
        self.a = self.rotate_left(self.a);
    }

    fn rol_zeropage(&mut self) {
        let addr = self.addr_zeropage();
        self.pc = self.pc.wrapping_add(1);
        let value = self.bus.read(addr);
        let result = self.rotate_left(value);
        self.bus.write(addr, result);
    }

    fn rol_zeropage_x(&mut self) {
        let addr = self.addr_zeropage_indexed(self.x);
        self.pc = self.pc.wrapping_add(1);
        let value = self.bus.read(addr);
        let result = self.rotate_left(value);
        self.bus.write(addr, result);
    }

    fn rol_absolute(&mut self) {
        let addr = self.addr_absolute();
        self.pc = self.pc.wrapping_add(2);
        let value = self.bus.read(addr);
        let result = self.rotate_left(value);
        self.bus.write(addr, result);
    }

    fn rol_absolute_x(&mut self) {
        let addr = self.addr_absolute_indexed(self.x);
        self.pc = self.pc.wrapping_add(2);
        let value = self.bus.read(addr);
        let result = self.rotate_left(value);
        self.bus.write(addr, result);
    }

    fn ror_accumulator(&mut self) {
        self.a = self.rotate_right(self.a);
    }

    fn ror_zeropage(&mut self) {
        let addr = self.addr_zeropage();
        self.pc = self.pc.wrapping_add(1);
        let value = self.bus.read(addr);
        let result = self.rotate_right(value);
        self.bus.write(addr, result);
    }

    fn ror_zeropage_x(&mut self) {
        let addr = self.addr_zeropage_indexed(self.x);
        self.pc = self.pc.wrapping_add(1);
        let value = self.bus.read(addr);
        let result = self.rotate_right(value);
        self.bus.write(addr, result);
    }

    fn ror_absolute(&mut self) {
        let addr = self.addr_absolute();
        self.pc = self.pc.wrapping_add(2);
        let value = self.bus.read(addr);
        let result = self.rotate_right(value);
        self.bus.write(addr, result);
    }

    fn ror_absolute_x(&mut self) {
        let addr = self.addr_absolute_indexed(self.x);
        self.pc = self.pc.wrapping_add(2);
        let value = self.bus.read(addr);
        let result = self.rotate_right(value);
        self.bus.write(addr, result);
    }

    fn bpl(&mut self) {
        let negative = self.status & FLAG_NEGATIVE != 0;
        self.branch(!negative);
    }

    fn bmi(&mut self) {
        let negative = self.status & FLAG_NEGATIVE != 0;
        self.branch(negative);
    }

    fn bvc(&mut self) {
        let overflow = self.status & FLAG_OVERFLOW != 0;
        self.branch(!overflow);
    }

    fn bvs(&mut self) {
        let overflow = self.status & FLAG_OVERFLOW != 0;
        self.branch(overflow);
    }

    fn bcc(&mut self) {
        let carry = self.status & FLAG_CARRY != 0;
        self.branch(!carry);
    }

    fn bcs(&mut self) {
        let carry = self.status & FLAG_CARRY != 0;
        self.branch(carry);
    }

    fn bne(&mut self) {
        let zero = self.status & FLAG_ZERO != 0;
        self.branch(!zero);
    }

    fn beq(&mut self) {
        let zero = self.status & FLAG_ZERO != 0;
        self.branch(zero);
    }

    fn jmp_absolute(&mut self) {
        self.pc = self.word_at(self.pc);
    }

    fn jmp_indirect(&mut self) {
        let ptr = self.word_at(self.pc);

        let lo = self.bus.read(ptr) as u16;
        // The 6502 increments only the low byte of the pointer, so a pointer
        // ending in 0xFF fetches its high byte from the start of the same page.
        let hi_addr = (ptr & 0xFF00) | (ptr.wrapping_add(1) & 0x00FF);
        let hi = self.bus.read(hi_addr) as u16;

        self.pc = (hi << 8) | lo;
    }

    fn jsr_absolute(&mut self) {
        let target = self.word_at(self.pc);

        // The pushed address is the last byte of this instruction; RTS adds
        // one to land on the instruction after the JSR.
        self.pc = self.pc.wrapping_add(1);
        self.push((self.pc >> 8) as u8);
        self.push(self.pc as u8);

        self.pc = target;
    }

    fn rts(&mut self) {
        let lo = self.pop() as u16;
        let hi = self.pop() as u16;
        self.pc = ((hi << 8) | lo).wrapping_add(1);
    }

    fn pha(&mut self) {
        self.push(self.a);
    }

    fn php(&mut self) {
        let status = self.status | FLAG_UNUSED;
        self.push(status);
    }

    fn pla(&mut self) {
        self.a = self.pop();
        self.update_zero_and_negative_flags(self.a);
    }

    fn plp(&mut self) {
        self.status = self.pop();
    }

    fn clc(&mut self) {
        self.status &= !FLAG_CARRY;
    }

    fn sec(&mut self) {
        self.status |= FLAG_CARRY;
    }

    fn cli(&mut self) {
        self.status &= !FLAG_INTERRUPT_DISABLE;
    }

    fn sei(&mut self) {
        self.status |= FLAG_INTERRUPT_DISABLE;
    }

    fn clv(&mut self) {
        self.status &= !FLAG_OVERFLOW;
    }

    fn cld(&mut self) {
        self.status &= !FLAG_DECIMAL;
    }

    fn sed(&mut self) {
        self.status |= FLAG_DECIMAL;
    }

    fn nop(&mut self) {}

    fn brk(&mut self) -> RunResult {
        self.status |= FLAG_BREAK;

        self.push((self.pc >> 8) as u8);
        self.push(self.pc as u8);
        let status = self.status | FLAG_UNUSED;
        self.push(status);

        log::debug!("BRK at ${:04X}", self.pc.wrapping_sub(1));
        self.halted = true;
        RunResult::Break
    }

    // Addressing-mode fetchers. Each reads its operand bytes at the current
    // PC without advancing it; the dispatch arm advances PC afterwards.
    // Fetchers for the indexed read modes record a page crossing so the cycle
    // table can charge the penalty.

    fn operand_immediate(&mut self) -> u8 {
        self.bus.read(self.pc)
    }

    fn operand_zeropage(&mut self) -> u8 {
        let addr = self.addr_zeropage();
        self.bus.read(addr)
    }

    fn operand_zeropage_indexed(&mut self, index: u8) -> u8 {
        let addr = self.addr_zeropage_indexed(index);
        self.bus.read(addr)
    }

    fn operand_absolute(&mut self) -> u8 {
        let addr = self.addr_absolute();
        self.bus.read(addr)
    }

    fn operand_absolute_indexed(&mut self, index: u8) -> u8 {
        let base = self.word_at(self.pc);
        let addr = base.wrapping_add(index as u16);

        if (base & 0xFF00) != (addr & 0xFF00) {
            self.page_crossed = true;
        }

        self.bus.read(addr)
    }

    fn operand_indexed_indirect(&mut self) -> u8 {
        let addr = self.addr_indexed_indirect();
        self.bus.read(addr)
    }

    fn operand_indirect_indexed(&mut self) -> u8 {
        let zp = self.bus.read(self.pc);
        let base = self.word_zpg_wrap(zp);
        let addr = base.wrapping_add(self.y as u16);

        if (base & 0xFF00) != (addr & 0xFF00) {
            self.page_crossed = true;
        }

        self.bus.read(addr)
    }

    // Effective-address variants for stores and read-modify-writes. These
    // never pay a crossing penalty, so none is recorded.

    fn addr_zeropage(&mut self) -> u16 {
        self.bus.read(self.pc) as u16
    }

    fn addr_zeropage_indexed(&mut self, index: u8) -> u16 {
        self.bus.read(self.pc).wrapping_add(index) as u16
    }

    fn addr_absolute(&mut self) -> u16 {
        self.word_at(self.pc)
    }

    fn addr_absolute_indexed(&mut self, index: u8) -> u16 {
        self.word_at(self.pc).wrapping_add(index as u16)
    }

    fn addr_indexed_indirect(&mut self) -> u16 {
        let zp = self.bus.read(self.pc).wrapping_add(self.x);
        self.word_zpg_wrap(zp)
    }

    fn addr_indirect_indexed(&mut self) -> u16 {
        let zp = self.bus.read(self.pc);
        self.word_zpg_wrap(zp).wrapping_add(self.y as u16)
    }

    /// Little-endian word at `addr`.
    fn word_at(&mut self, addr: u16) -> u16 {
        let lo = self.bus.read(addr) as u16;
        let hi = self.bus.read(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }

    /// Little-endian word read entirely from the zero page: a low byte at
    /// 0x00FF takes its high byte from 0x0000.
    fn word_zpg_wrap(&mut self, zp: u8) -> u16 {
        let lo = self.bus.read(zp as u16) as u16;
        let hi = self.bus.read(zp.wrapping_add(1) as u16) as u16;
        (hi << 8) | lo
    }

    /// Binary-mode add feeding the accumulator; shared by ADC and SBC. The D
    /// flag is stored but never consulted here.
    ///
    /// Overflow follows the two's-complement rule explained at
    /// <http://www.righto.com/2012/12/the-6502-overflow-flag-explained.html>:
    /// set when both inputs share a sign and the result does not.
    fn add_with_carry(&mut self, value: u8) {
        let carry_in = if self.status & FLAG_CARRY != 0 { 1u16 } else { 0 };
        let sum = self.a as u16 + value as u16 + carry_in;
        let result = sum as u8;

        if sum > 0xFF {
            self.status |= FLAG_CARRY;
        } else {
            self.status &= !FLAG_CARRY;
        }

        if ((self.a ^ result) & (value ^ result) & 0x80) != 0 {
            self.status |= FLAG_OVERFLOW;
        } else {
            self.status &= !FLAG_OVERFLOW;
        }

        self.a = result;
        self.update_zero_and_negative_flags(self.a);
    }

    /// SBC is ADC of the one's complement: A - M - (1 - C) with the carry
    /// acting as an inverted borrow.
    fn sub_with_carry(&mut self, value: u8) {
        self.add_with_carry(!value);
    }

    fn compare(&mut self, register: u8, value: u8) {
        let difference = register as i32 - value as i32;

        if difference >= 0 {
            self.status |= FLAG_CARRY;
        } else {
            self.status &= !FLAG_CARRY;
        }

        if difference == 0 {
            self.status |= FLAG_ZERO;
        } else {
            self.status &= !FLAG_ZERO;
        }

        if difference & 0x80 != 0 {
            self.status |= FLAG_NEGATIVE;
        } else {
            self.status &= !FLAG_NEGATIVE;
        }
    }

    fn bit_test(&mut self, value: u8) {
        if self.a & value == 0 {
            self.status |= FLAG_ZERO;
        } else {
            self.status &= !FLAG_ZERO;
        }

        if value & 0x80 != 0 {
            self.status |= FLAG_NEGATIVE;
        } else {
            self.status &= !FLAG_NEGATIVE;
        }

        if value & 0x40 != 0 {
            self.status |= FLAG_OVERFLOW;
        } else {
            self.status &= !FLAG_OVERFLOW;
        }
    }

    fn shift_left(&mut self, value: u8) -> u8 {
        if value & 0x80 != 0 {
            self.status |= FLAG_CARRY;
        } else {
            self.status &= !FLAG_CARRY;
        }

        let result = value << 1;
        self.update_zero_and_negative_flags(result);
        result
    }

    fn shift_right(&mut self, value: u8) -> u8 {
        if value & 0x01 != 0 {
            self.status |= FLAG_CARRY;
        } else {
            self.status &= !FLAG_CARRY;
        }

        let result = value >> 1;
        self.update_zero_and_negative_flags(result);
        result
    }

    fn rotate_left(&mut self, value: u8) -> u8 {
        let old_carry = if self.status & FLAG_CARRY != 0 { 1 } else { 0 };

        if value & 0x80 != 0 {
            self.status |= FLAG_CARRY;
        } else {
            self.status &= !FLAG_CARRY;
        }

        let result = (value << 1) | old_carry;
        self.update_zero_and_negative_flags(result);
        result
    }

    fn rotate_right(&mut self, value: u8) -> u8 {
        let old_carry = if self.status & FLAG_CARRY != 0 { 1 } else { 0 };

        if value & 0x01 != 0 {
            self.status |= FLAG_CARRY;
        } else {
            self.status &= !FLAG_CARRY;
        }

        let result = (value >> 1) | (old_carry << 7);
        self.update_zero_and_negative_flags(result);
        result
    }

    fn update_zero_and_negative_flags(&mut self, value: u8) {
        if value == 0 {
            self.status |= FLAG_ZERO;
        } else {
            self.status &= !FLAG_ZERO;
        }

        if value & 0x80 != 0 {
            self.status |= FLAG_NEGATIVE;
        } else {
            self.status &= !FLAG_NEGATIVE;
        }
    }

    /// Shared tail of the eight conditional branches. The signed displacement
    /// is applied to the PC of the following instruction with modular 16-bit
    /// arithmetic; the page comparison is against that same PC.
    fn branch(&mut self, condition: bool) {
        let offset = self.operand_immediate() as i8;
        self.pc = self.pc.wrapping_add(1);

        if condition {
            let base = self.pc;
            self.pc = base.wrapping_add(offset as u16);
            self.branch_taken = true;

            if (base & 0xFF00) != (self.pc & 0xFF00) {
                self.branch_page_crossed = true;
            }
        }
    }

    fn push(&mut self, value: u8) {
        let addr = 0x0100 | self.sp as u16;
        self.bus.write(addr, value);
        self.sp = self.sp.wrapping_sub(1);
    }

    fn pop(&mut self) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        let addr = 0x0100 | self.sp as u16;
        self.bus.read(addr)
    }
}
