//! Byte-addressable memory bus.
//!
//! The CPU core performs every memory access through the [`Bus`] trait, so a
//! surrounding system can interpose memory-mapped devices later without
//! touching the dispatcher. [`FlatBus`] is the plain 64 KiB backing store used
//! by the stand-alone interpreter and the test suite.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

pub trait Bus {
    fn read(&mut self, addr: u16) -> u8;
    fn write(&mut self, addr: u16, data: u8);
}

/// Flat 64 KiB address space with no device mappings. Every address is plain
/// RAM; reads and writes have no side effects.
pub struct FlatBus {
    pub mem: [u8; 65536],
}

impl FlatBus {
    pub fn new() -> Self {
        Self { mem: [0; 65536] }
    }

    /// Copy a ROM image from `path` into memory starting at address 0.
    ///
    /// At most 65 535 bytes are taken; shorter files leave the remainder of
    /// memory zeroed. Returns the number of bytes copied.
    pub fn load_rom<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let path = path.as_ref();
        let image = fs::read(path)
            .with_context(|| format!("failed to read ROM file {}", path.display()))?;

        let len = image.len().min(0xFFFF);
        self.mem[..len].copy_from_slice(&image[..len]);
        Ok(len)
    }

    /// Format `len` bytes starting at `start` as 16-byte hex rows.
    pub fn hexdump(&self, start: u16, len: usize) -> String {
        let mut out = String::new();
        for row in 0..len.div_ceil(16) {
            let base = start as usize + row * 16;
            out.push_str(&format!("{:04X}:", base));
            for offset in 0..16.min(len - row * 16) {
                out.push_str(&format!(" {:02X}", self.mem[(base + offset) & 0xFFFF]));
            }
            out.push('\n');
        }
        out
    }
}

impl Default for FlatBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for FlatBus {
    fn read(&mut self, addr: u16) -> u8 {
        self.mem[addr as usize]
    }

    fn write(&mut self, addr: u16, data: u8) {
        self.mem[addr as usize] = data;
    }
}

#[cfg(test)]
mod tests {
    use super::{Bus, FlatBus};

    #[test]
    fn read_returns_written_value() {
        let mut bus = FlatBus::new();
        bus.write(0x1234, 0xAB);
        assert_eq!(bus.read(0x1234), 0xAB);
    }

    #[test]
    fn load_rom_copies_file_into_low_memory() {
        let path = std::env::temp_dir().join("talos_load_rom_test.bin");
        std::fs::write(&path, [0xA9, 0x01, 0x00]).unwrap();

        let mut bus = FlatBus::new();
        let loaded = bus.load_rom(&path).unwrap();

        assert_eq!(loaded, 3);
        assert_eq!(bus.mem[0], 0xA9);
        assert_eq!(bus.mem[1], 0x01);
        assert_eq!(bus.mem[2], 0x00);
        assert_eq!(bus.mem[3], 0x00);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn load_rom_reports_missing_file() {
        let mut bus = FlatBus::new();
        assert!(bus.load_rom("/nonexistent/talos.bin").is_err());
    }

    #[test]
    fn hexdump_formats_rows_of_sixteen() {
        let mut bus = FlatBus::new();
        bus.write(0x0200, 0x01);
        bus.write(0x020F, 0xFF);

        let dump = bus.hexdump(0x0200, 32);
        let mut lines = dump.lines();
        let first = lines.next().unwrap();
        let second = lines.next().unwrap();

        assert!(first.starts_with("0200: 01"));
        assert!(first.ends_with("FF"));
        assert!(second.starts_with("0210: 00"));
    }
}
