//! Board behaviour through the public `Cartridge` API.
//!
//! Images are built in memory with every PRG page filled with its page
//! number and every CHR page filled with `0x80 | page`, so a read tells
//! you which bank is mapped.

use nes_cartridge::{Cartridge, CartridgeError, ChrBus, Mirroring};

/// iNES image with numbered PRG (16K) and CHR (8K) pages.
fn build_image(mapper: u8, prg_pages: u8, chr_pages: u8, flags6_low: u8) -> Vec<u8> {
    let prg_size = usize::from(prg_pages) * 0x4000;
    let chr_size = usize::from(chr_pages) * 0x2000;
    let mut data = vec![0u8; 16 + prg_size + chr_size];
    data[..4].copy_from_slice(b"NES\x1A");
    data[4] = prg_pages;
    data[5] = chr_pages;
    data[6] = (mapper << 4) | (flags6_low & 0x0F);
    data[7] = mapper & 0xF0;

    for (i, byte) in data[16..16 + prg_size].iter_mut().enumerate() {
        *byte = (i / 0x4000) as u8;
    }
    for (i, byte) in data[16 + prg_size..].iter_mut().enumerate() {
        *byte = 0x80 | (i / 0x2000) as u8;
    }
    data
}

fn load(mapper: u8, prg_pages: u8, chr_pages: u8) -> Cartridge {
    Cartridge::from_ines(&build_image(mapper, prg_pages, chr_pages, 0)).expect("valid image")
}

/// Write an MMC1 register through the five-write serial port, LSB first.
fn mmc1_write(cart: &mut Cartridge, addr: u16, value: u8) {
    for bit in 0..5 {
        cart.cpu_write(addr, (value >> bit) & 1);
    }
}

#[test]
fn nrom_16k_mirrors_prg() {
    let mut cart = load(0, 1, 1);
    assert_eq!(cart.mapper_name(), "NROM");
    assert_eq!(cart.cpu_read(0x8000), Some(0));
    assert_eq!(cart.cpu_read(0xC000), Some(0));
    assert_eq!(cart.cpu_read(0xFFFF), Some(0));
}

#[test]
fn nrom_32k_maps_both_pages() {
    let mut cart = load(0, 2, 1);
    assert_eq!(cart.cpu_read(0x8000), Some(0));
    assert_eq!(cart.cpu_read(0xC000), Some(1));
}

#[test]
fn prg_ram_round_trips() {
    let mut cart = load(0, 1, 1);
    cart.cpu_write(0x6123, 0x5A);
    assert_eq!(cart.cpu_read(0x6123), Some(0x5A));
    assert_eq!(cart.peek(0x6123), Some(0x5A));
}

#[test]
fn unmapped_expansion_area_is_open_bus() {
    let mut cart = load(0, 1, 1);
    assert_eq!(cart.cpu_read(0x4020), None);
    assert_eq!(cart.cpu_read(0x5FFF), None);
}

#[test]
fn rom_writes_are_ignored_without_registers() {
    let mut cart = load(0, 1, 1);
    cart.cpu_write(0x8000, 0xFF);
    assert_eq!(cart.cpu_read(0x8000), Some(0));
}

#[test]
fn chr_rom_is_read_only() {
    let mut cart = load(0, 1, 1);
    assert_eq!(cart.chr_read(0x0000), 0x80);
    cart.chr_write(0x0000, 0x11);
    assert_eq!(cart.chr_read(0x0000), 0x80);
}

#[test]
fn missing_chr_gives_chr_ram() {
    let mut cart = load(0, 1, 0);
    assert_eq!(cart.chr_read(0x1ABC), 0);
    cart.chr_write(0x1ABC, 0x33);
    assert_eq!(cart.chr_read(0x1ABC), 0x33);
}

#[test]
fn header_mirroring_is_reported() {
    let vertical = Cartridge::from_ines(&build_image(0, 1, 1, 0x01)).expect("valid image");
    assert_eq!(vertical.mirroring(), Mirroring::Vertical);
    let horizontal = load(0, 1, 1);
    assert_eq!(horizontal.mirroring(), Mirroring::Horizontal);
}

#[test]
fn mmc1_powers_on_with_last_bank_fixed() {
    let mut cart = load(1, 4, 2);
    assert_eq!(cart.mapper_name(), "MMC1");
    assert_eq!(cart.cpu_read(0xC000), Some(3));
}

#[test]
fn mmc1_serial_prg_switch() {
    let mut cart = load(1, 4, 2);
    mmc1_write(&mut cart, 0xE000, 2);
    assert_eq!(cart.cpu_read(0x8000), Some(2));
    assert_eq!(cart.cpu_read(0xC000), Some(3));
}

#[test]
fn mmc1_bit7_resets_shift_register() {
    let mut cart = load(1, 4, 2);
    cart.cpu_write(0xE000, 1);
    cart.cpu_write(0xE000, 1);
    cart.cpu_write(0xE000, 0x80);
    mmc1_write(&mut cart, 0xE000, 1);
    assert_eq!(cart.cpu_read(0x8000), Some(1));
}

#[test]
fn mmc1_control_sets_mirroring_and_32k_mode() {
    let mut cart = load(1, 4, 2);
    // Vertical mirroring, 32K PRG mode, 8K CHR mode.
    mmc1_write(&mut cart, 0x8000, 0x02);
    assert_eq!(cart.mirroring(), Mirroring::Vertical);
    mmc1_write(&mut cart, 0xE000, 3);
    assert_eq!(cart.cpu_read(0x8000), Some(2));
    assert_eq!(cart.cpu_read(0xC000), Some(3));

    mmc1_write(&mut cart, 0x8000, 0x03);
    assert_eq!(cart.mirroring(), Mirroring::Horizontal);
}

#[test]
fn mmc1_4k_chr_banks() {
    let mut cart = load(1, 2, 2);
    // 4K CHR mode.
    mmc1_write(&mut cart, 0x8000, 0x1C);
    mmc1_write(&mut cart, 0xA000, 2);
    mmc1_write(&mut cart, 0xC000, 1);
    // 4K bank 2 is the first half of 8K page 1.
    assert_eq!(cart.chr_read(0x0000), 0x81);
    assert_eq!(cart.chr_read(0x1000), 0x80);
}

#[test]
fn uxrom_switches_lower_bank() {
    let mut cart = load(2, 8, 0);
    assert_eq!(cart.mapper_name(), "UxROM");
    assert_eq!(cart.cpu_read(0x8000), Some(0));
    assert_eq!(cart.cpu_read(0xC000), Some(7));
    // $C000 reads 0x07, which passes 0x05 through the bus conflict.
    cart.cpu_write(0xC000, 0x05);
    assert_eq!(cart.cpu_read(0x8000), Some(5));
    assert_eq!(cart.cpu_read(0xC000), Some(7));
}

#[test]
fn uxrom_bus_conflict_ands_with_rom() {
    let mut cart = load(2, 8, 0);
    // $C000 reads 0x07, so 0x0E & 0x07 latches bank 6.
    cart.cpu_write(0xC000, 0x0E);
    assert_eq!(cart.cpu_read(0x8000), Some(6));
}

#[test]
fn cnrom_switches_chr() {
    let mut cart = load(3, 2, 4);
    assert_eq!(cart.mapper_name(), "CNROM");
    assert_eq!(cart.chr_read(0x0000), 0x80);
    // $C000 reads 0x01, so only bit 0 survives the conflict.
    cart.cpu_write(0xC000, 0x03);
    assert_eq!(cart.chr_read(0x0000), 0x81);
}

#[test]
fn axrom_switches_32k_and_single_screen() {
    let mut cart = load(7, 8, 0);
    assert_eq!(cart.mapper_name(), "AxROM");
    assert_eq!(cart.mirroring(), Mirroring::SingleScreenLower);
    assert_eq!(cart.cpu_read(0x8000), Some(0));
    assert_eq!(cart.cpu_read(0xC000), Some(1));

    cart.cpu_write(0x8000, 0x12);
    assert_eq!(cart.cpu_read(0x8000), Some(4));
    assert_eq!(cart.cpu_read(0xC000), Some(5));
    assert_eq!(cart.mirroring(), Mirroring::SingleScreenUpper);
}

#[test]
fn gxrom_register_write_conflicts_with_rom() {
    let mut cart = load(66, 8, 4);
    assert_eq!(cart.mapper_name(), "GxROM");
    // $8000 reads 0x00, so the conflict latches bank 0 for both.
    cart.cpu_write(0x8000, 0x31);
    assert_eq!(cart.cpu_read(0x8000), Some(0));
    assert_eq!(cart.chr_read(0x0000), 0x80);
}

#[test]
fn gxrom_without_conflict() {
    let mut image = build_image(66, 8, 4, 0);
    image[16..16 + 0x4000].fill(0xFF);
    let mut cart = Cartridge::from_ines(&image).expect("valid image");
    cart.cpu_write(0x8000, 0x31);
    assert_eq!(cart.cpu_read(0x8000), Some(6));
    assert_eq!(cart.cpu_read(0xC000), Some(7));
    assert_eq!(cart.chr_read(0x0000), 0x81);
}

#[test]
fn unrom180_switches_upper_bank() {
    let mut image = build_image(180, 8, 0, 0);
    image[16..16 + 0x4000].fill(0xFF);
    let mut cart = Cartridge::from_ines(&image).expect("valid image");
    assert_eq!(cart.mapper_name(), "UNROM-180");
    assert_eq!(cart.cpu_read(0xC000), Some(0xFF));

    cart.cpu_write(0x8000, 0x03);
    assert_eq!(cart.cpu_read(0x8000), Some(0xFF));
    assert_eq!(cart.cpu_read(0xC000), Some(3));
}

#[test]
fn unsupported_mapper_is_rejected() {
    let image = build_image(4, 2, 1, 0);
    assert_eq!(
        Cartridge::from_ines(&image).map(|_| ()),
        Err(CartridgeError::UnsupportedMapper(4))
    );
}

#[test]
fn bad_magic_is_rejected() {
    let mut image = build_image(0, 1, 1, 0);
    image[3] = 0;
    assert!(matches!(
        Cartridge::from_ines(&image),
        Err(CartridgeError::InvalidHeader { .. })
    ));
}
