//! 6502 processor status register (P) flag bits.
//!
//! Stack pushes pack the flags as N V 1 B D I Z C (bit 7 down to bit 0);
//! bit 5 reads as 1 whenever the byte is pushed.

pub const FLAG_CARRY: u8 = 1 << 0;
pub const FLAG_ZERO: u8 = 1 << 1;
pub const FLAG_INTERRUPT_DISABLE: u8 = 1 << 2;
pub const FLAG_DECIMAL: u8 = 1 << 3; // Stored and pushed, no arithmetic effect
pub const FLAG_BREAK: u8 = 1 << 4;   // Set when BRK halts the program
pub const FLAG_UNUSED: u8 = 1 << 5;  // Forced to 1 in every pushed flag byte
pub const FLAG_OVERFLOW: u8 = 1 << 6;
pub const FLAG_NEGATIVE: u8 = 1 << 7;
