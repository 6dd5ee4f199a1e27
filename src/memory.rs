//! Peripheral memory models.
//!
//! Each model is a flat, fixed-capacity word array owned by the testbench
//! that built it. The `react` methods are the combinational half of a
//! memory-mapped slave: called once per tick, before the clock edge, they
//! read the device's request pins and drive the response pins so the device
//! sees the data within the same tick.
//!
//! Addressing outside a model's capacity is a harness misconfiguration and
//! panics.

use std::fs;

use camino::Utf8Path;
use eyre::{ensure, eyre, Result, WrapErr};
use log::{debug, warn};

use crate::pins::{FifoMemoryPort, MemoryAdapterPort, Word};

#[derive(Debug, Clone)]
struct Cells {
    kind: &'static str,
    words: Vec<Word>,
}

impl Cells {
    fn new(kind: &'static str, capacity: usize) -> Self {
        Self {
            kind,
            words: vec![0; capacity],
        }
    }

    fn read(&self, addr: usize) -> Word {
        self.check(addr);
        self.words[addr]
    }

    fn write(&mut self, addr: usize, word: Word) {
        self.check(addr);
        self.words[addr] = word;
    }

    fn check(&self, addr: usize) {
        assert!(
            addr < self.words.len(),
            "{} address {:#x} outside capacity {:#x}",
            self.kind,
            addr,
            self.words.len()
        );
    }
}

/// Read-only memory, contents fixed at construction.
#[derive(Debug, Clone)]
pub struct Rom {
    cells: Cells,
}

impl Rom {
    /// A zero-filled ROM.
    pub fn new(capacity: usize) -> Self {
        Self {
            cells: Cells::new("ROM", capacity),
        }
    }

    /// A ROM holding `image` from address 0, zero-filled above it.
    pub fn from_image(capacity: usize, image: &[Word]) -> Result<Self> {
        ensure!(
            image.len() <= capacity,
            "ROM image of {} words does not fit in {} words",
            image.len(),
            capacity
        );
        let mut cells = Cells::new("ROM", capacity);
        cells.words[..image.len()].copy_from_slice(image);
        Ok(Self { cells })
    }

    /// Loads a `$readmemh`-style hex file.
    pub fn load_readmemh(capacity: usize, path: &Utf8Path) -> Result<Self> {
        let text =
            fs::read_to_string(path).wrap_err_with(|| format!("reading ROM image {path}"))?;
        let mut cells = Cells::new("ROM", capacity);
        let loaded = parse_readmemh(&text, &mut cells.words)
            .wrap_err_with(|| format!("parsing ROM image {path}"))?;
        debug!("loaded {loaded} ROM words from {path}");
        Ok(Self { cells })
    }

    pub fn capacity(&self) -> usize {
        self.cells.words.len()
    }

    /// # Panics
    /// If `addr` is not below [`capacity`](Self::capacity).
    pub fn read(&self, addr: usize) -> Word {
        self.cells.read(addr)
    }
}

/// Read/write memory.
#[derive(Debug, Clone)]
pub struct Ram {
    cells: Cells,
}

impl Ram {
    pub fn new(capacity: usize) -> Self {
        Self {
            cells: Cells::new("RAM", capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.cells.words.len()
    }

    /// # Panics
    /// If `addr` is not below [`capacity`](Self::capacity).
    pub fn read(&self, addr: usize) -> Word {
        self.cells.read(addr)
    }

    /// # Panics
    /// If `addr` is not below [`capacity`](Self::capacity).
    pub fn write(&mut self, addr: usize, word: Word) {
        self.cells.write(addr, word);
    }
}

/// Storage array behind a FIFO peripheral that keeps its slots outside the
/// design.
#[derive(Debug, Clone)]
pub struct FifoStore {
    cells: Cells,
}

impl FifoStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            cells: Cells::new("FIFO", capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.cells.words.len()
    }

    pub fn read(&self, addr: usize) -> Word {
        self.cells.read(addr)
    }

    pub fn write(&mut self, addr: usize, word: Word) {
        self.cells.write(addr, word);
    }

    /// Services one tick of the FIFO's memory port. A write requested this
    /// tick lands before the read data is driven.
    pub fn react<P: FifoMemoryPort>(&mut self, port: &mut P) {
        if port.mem_we() {
            self.write(port.mem_addr_w(), port.mem_data_write());
        }
        port.set_mem_data_read(self.read(port.mem_addr_r()));
    }
}

/// ROM and RAM sharing one flat address space: addresses below the ROM size
/// hit ROM, the rest hit RAM at `addr - rom_size`.
#[derive(Debug, Clone)]
pub struct AddressSpace {
    rom: Rom,
    ram: Ram,
}

impl AddressSpace {
    pub fn new(rom: Rom, ram: Ram) -> Self {
        Self { rom, ram }
    }

    pub fn rom(&self) -> &Rom {
        &self.rom
    }

    pub fn ram(&self) -> &Ram {
        &self.ram
    }

    pub fn rom_size(&self) -> usize {
        self.rom.capacity()
    }

    /// Bus address of RAM word `ram_addr`.
    pub fn ram_address(&self, ram_addr: usize) -> usize {
        self.rom.capacity() + ram_addr
    }

    /// Reads a word by bus address without involving any device.
    pub fn peek(&self, addr: usize) -> Word {
        if addr < self.rom.capacity() {
            self.rom.read(addr)
        } else {
            self.ram.read(addr - self.rom.capacity())
        }
    }

    /// Services one tick of a memory adapter's ROM and RAM ports.
    pub fn react<P: MemoryAdapterPort>(&mut self, port: &mut P) {
        if port.rom_stb() {
            port.set_rom_data(self.rom.read(port.rom_addr()));
        }

        if port.ram_stb() {
            let addr = port.ram_addr();
            if port.ram_wr() {
                let data = port.ram_data_out();
                debug!("written {data:#04x} into RAM address {addr:#04x}");
                self.ram.write(addr, data);
            } else {
                let data = self.ram.read(addr);
                debug!("read from RAM address {addr:#04x} value {data:#04x}");
                port.set_ram_data_in(data);
            }
        }
    }
}

/// Parses `$readmemh` text into `words`, honouring `@addr` directives, `//`
/// comments and `_` separators. Returns the number of words loaded.
pub fn parse_readmemh(text: &str, words: &mut [Word]) -> Result<usize> {
    let mut addr = 0usize;
    let mut loaded = 0;

    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;
        let code = line.split("//").next().unwrap_or_default();
        for token in code.split_whitespace() {
            if let Some(target) = token.strip_prefix('@') {
                addr = usize::from_str_radix(&target.replace('_', ""), 16)
                    .wrap_err_with(|| format!("line {line_no}: bad address `{token}`"))?;
                continue;
            }

            let value = Word::from_str_radix(&token.replace('_', ""), 16)
                .wrap_err_with(|| format!("line {line_no}: bad word `{token}`"))?;
            let capacity = words.len();
            let slot = words.get_mut(addr).ok_or_else(|| {
                eyre!("line {line_no}: address {addr:#x} outside image of {capacity} words")
            })?;
            if *slot != 0 {
                warn!("line {line_no}: overwriting word at {addr:#x}");
            }
            *slot = value;
            addr += 1;
            loaded += 1;
        }
    }

    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeFifoPort {
        we: bool,
        addr_w: usize,
        addr_r: usize,
        data_write: Word,
        data_read: Word,
    }

    impl FifoMemoryPort for FakeFifoPort {
        fn mem_we(&self) -> bool {
            self.we
        }
        fn mem_addr_w(&self) -> usize {
            self.addr_w
        }
        fn mem_addr_r(&self) -> usize {
            self.addr_r
        }
        fn mem_data_write(&self) -> Word {
            self.data_write
        }
        fn set_mem_data_read(&mut self, data: Word) {
            self.data_read = data;
        }
    }

    #[derive(Default)]
    struct FakeAdapterPort {
        rom_stb: bool,
        rom_addr: usize,
        rom_data: Word,
        ram_stb: bool,
        ram_wr: bool,
        ram_addr: usize,
        ram_out: Word,
        ram_in: Word,
    }

    impl MemoryAdapterPort for FakeAdapterPort {
        fn rom_stb(&self) -> bool {
            self.rom_stb
        }
        fn rom_addr(&self) -> usize {
            self.rom_addr
        }
        fn set_rom_data(&mut self, data: Word) {
            self.rom_data = data;
        }
        fn ram_stb(&self) -> bool {
            self.ram_stb
        }
        fn ram_wr(&self) -> bool {
            self.ram_wr
        }
        fn ram_addr(&self) -> usize {
            self.ram_addr
        }
        fn ram_data_out(&self) -> Word {
            self.ram_out
        }
        fn set_ram_data_in(&mut self, data: Word) {
            self.ram_in = data;
        }
    }

    #[test]
    fn test_ram_read_after_write() {
        let mut ram = Ram::new(16);
        ram.write(3, 0xdead);
        assert_eq!(ram.read(3), 0xdead);
        assert_eq!(ram.read(4), 0);
    }

    #[test]
    #[should_panic(expected = "RAM address 0x10 outside capacity 0x10")]
    fn test_ram_out_of_range_is_fatal() {
        let ram = Ram::new(16);
        ram.read(16);
    }

    #[test]
    #[should_panic(expected = "ROM address")]
    fn test_rom_out_of_range_is_fatal() {
        let rom = Rom::new(4);
        rom.read(4);
    }

    #[test]
    fn test_rom_image_must_fit() {
        assert!(Rom::from_image(2, &[1, 2, 3]).is_err());
        let rom = Rom::from_image(4, &[1, 2, 3]).unwrap();
        assert_eq!(rom.read(2), 3);
        assert_eq!(rom.read(3), 0);
    }

    #[test]
    fn test_fifo_store_writes_before_read() {
        let mut store = FifoStore::new(8);
        let mut port = FakeFifoPort {
            we: true,
            addr_w: 5,
            addr_r: 5,
            data_write: 42,
            ..Default::default()
        };
        store.react(&mut port);
        assert_eq!(port.data_read, 42);
        assert_eq!(store.read(5), 42);
    }

    #[test]
    fn test_address_space_partitions_rom_and_ram() {
        let rom = Rom::from_image(4, &[10, 11, 12, 13]).unwrap();
        let mut space = AddressSpace::new(rom, Ram::new(8));
        assert_eq!(space.ram_address(0), 4);

        let mut port = FakeAdapterPort {
            ram_stb: true,
            ram_wr: true,
            ram_addr: 2,
            ram_out: 99,
            ..Default::default()
        };
        space.react(&mut port);
        assert_eq!(space.peek(space.ram_address(2)), 99);
        assert_eq!(space.peek(2), 12);

        port.ram_wr = false;
        port.rom_stb = true;
        port.rom_addr = 1;
        space.react(&mut port);
        assert_eq!(port.ram_in, 99);
        assert_eq!(port.rom_data, 11);
    }

    #[test]
    fn test_idle_ports_leave_inputs_alone() {
        let mut space = AddressSpace::new(Rom::new(4), Ram::new(4));
        let mut port = FakeAdapterPort {
            rom_data: 7,
            ram_in: 8,
            ..Default::default()
        };
        space.react(&mut port);
        assert_eq!(port.rom_data, 7);
        assert_eq!(port.ram_in, 8);
    }

    #[test]
    fn test_parse_readmemh() {
        let text = "// boot image\n01 02_03 ff\n@10\nAB // tail\n";
        let mut words = vec![0; 32];
        let loaded = parse_readmemh(text, &mut words).unwrap();
        assert_eq!(loaded, 4);
        assert_eq!(&words[..3], &[0x01, 0x0203, 0xff]);
        assert_eq!(words[0x10], 0xab);
    }

    #[test]
    fn test_parse_readmemh_rejects_bad_input() {
        let mut words = vec![0; 4];
        assert!(parse_readmemh("zz", &mut words).is_err());
        assert!(parse_readmemh("@4 01", &mut words).is_err());
    }

    fn image_file(text: &str) -> tempfile::NamedTempFile {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_readmemh_from_file() {
        let file = image_file("@2\n0a 0b // vectors\n@6 1_00\n");
        let path = Utf8Path::from_path(file.path()).unwrap();

        let rom = Rom::load_readmemh(8, path).unwrap();
        assert_eq!(rom.capacity(), 8);
        assert_eq!(rom.read(2), 0x0a);
        assert_eq!(rom.read(3), 0x0b);
        assert_eq!(rom.read(6), 0x100);
        assert_eq!(rom.read(0), 0);
    }

    #[test]
    fn test_load_readmemh_errors_name_the_file() {
        let missing = Utf8Path::new("/nonexistent/wb-sim/boot.hex");
        let err = Rom::load_readmemh(8, missing).unwrap_err();
        assert!(format!("{err}").contains("reading ROM image /nonexistent/wb-sim/boot.hex"));

        let file = image_file("@20 01\n");
        let path = Utf8Path::from_path(file.path()).unwrap();
        let err = Rom::load_readmemh(8, path).unwrap_err();
        assert!(format!("{err}").contains("parsing ROM image"));
    }
}
