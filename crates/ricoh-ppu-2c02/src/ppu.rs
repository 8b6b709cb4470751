//! NES PPU (2C02) emulation.
//!
//! Dot-based rendering. One `tick()` = one PPU dot. Each frame is 341 dots
//! x 262 scanlines, with the last dot of the pre-render line skipped on odd
//! frames while rendering is enabled.
//!
//! ## Scanline layout
//! - 0-239: visible scanlines (render pixels)
//! - 240: post-render (idle)
//! - 241-260: `VBlank`
//! - 261: pre-render

#![allow(clippy::cast_possible_truncation, clippy::struct_excessive_bools)]

use emu_core::{Observable, Value};

use crate::memory::{ChrBus, Vram};
use crate::registers::{Ctrl, Mask, VramAddress, status};
use crate::sprites::SpriteLine;

/// Framebuffer dimensions.
pub const FB_WIDTH: usize = 256;
pub const FB_HEIGHT: usize = 240;

pub const DOTS_PER_SCANLINE: u16 = 341;
pub const SCANLINES_PER_FRAME: u16 = 262;

const VBLANK_LINE: u16 = 241;
const PRE_RENDER_LINE: u16 = 261;

/// Which part of the frame the PPU is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    Visible,
    PostRender,
    VBlank,
    PreRender,
}

impl RenderState {
    #[must_use]
    pub const fn for_scanline(scanline: u16) -> Self {
        match scanline {
            0..=239 => Self::Visible,
            240 => Self::PostRender,
            241..=260 => Self::VBlank,
            _ => Self::PreRender,
        }
    }
}

/// PPU 2C02.
pub struct Ppu {
    vram: Vram,
    oam: [u8; 256],

    // Registers
    ctrl: Ctrl,
    mask: Mask,
    status: u8,
    oam_addr: u8,

    // Loopy scroll/address registers
    v: VramAddress,
    t: VramAddress,
    fine_x: u8,
    w: bool,

    // Data read buffer ($2007)
    read_buffer: u8,
    /// Last value driven on the CPU data lines; write-only registers read
    /// back as this.
    io_latch: u8,

    // Rendering position
    scanline: u16,
    dot: u16,
    frame: u64,
    odd_frame: bool,

    // Background shift registers
    bg_shift_pattern_lo: u16,
    bg_shift_pattern_hi: u16,
    bg_shift_attrib_lo: u16,
    bg_shift_attrib_hi: u16,
    bg_next_tile_id: u8,
    bg_next_tile_attrib: u8,
    bg_next_tile_lo: u8,
    bg_next_tile_hi: u8,

    sprites: SpriteLine,

    // Output
    framebuffer: Vec<u8>,
    nmi_occurred: bool,
    /// Level of (vblank flag AND NMI enable) as of the last check.
    nmi_line: bool,
    nmi_pending: bool,
    vblank_entered: bool,
}

impl Ppu {
    /// Power-on state: scanline 0, dot 0, all registers clear.
    #[must_use]
    pub fn new() -> Self {
        Self {
            vram: Vram::new(),
            oam: [0; 256],

            ctrl: Ctrl::default(),
            mask: Mask::default(),
            status: 0,
            oam_addr: 0,

            v: VramAddress::default(),
            t: VramAddress::default(),
            fine_x: 0,
            w: false,

            read_buffer: 0,
            io_latch: 0,

            scanline: 0,
            dot: 0,
            frame: 0,
            odd_frame: false,

            bg_shift_pattern_lo: 0,
            bg_shift_pattern_hi: 0,
            bg_shift_attrib_lo: 0,
            bg_shift_attrib_hi: 0,
            bg_next_tile_id: 0,
            bg_next_tile_attrib: 0,
            bg_next_tile_lo: 0,
            bg_next_tile_hi: 0,

            sprites: SpriteLine::new(),

            framebuffer: vec![0; FB_WIDTH * FB_HEIGHT],
            nmi_occurred: false,
            nmi_line: false,
            nmi_pending: false,
            vblank_entered: false,
        }
    }

    /// Reset line: clears PPUCTRL, PPUMASK, the scroll latch and the read
    /// buffer. Position and memory are untouched.
    pub fn reset(&mut self) {
        self.ctrl = Ctrl::default();
        self.mask = Mask::default();
        self.t = VramAddress::default();
        self.fine_x = 0;
        self.w = false;
        self.read_buffer = 0;
        self.odd_frame = false;
        self.check_nmi();
    }

    /// One PPU dot.
    pub fn tick<C: ChrBus + ?Sized>(&mut self, chr: &mut C) {
        match RenderState::for_scanline(self.scanline) {
            RenderState::PreRender => self.tick_prerender(chr),
            RenderState::Visible => self.tick_visible(chr),
            RenderState::VBlank if self.scanline == VBLANK_LINE && self.dot == 1 => {
                self.status |= status::VBLANK;
                self.nmi_occurred = true;
                self.vblank_entered = true;
                self.check_nmi();
            }
            RenderState::VBlank | RenderState::PostRender => {}
        }

        self.dot += 1;
        if self.dot >= DOTS_PER_SCANLINE {
            self.dot = 0;
            self.scanline += 1;
            if self.scanline >= SCANLINES_PER_FRAME {
                self.scanline = 0;
                self.frame += 1;
                self.odd_frame = !self.odd_frame;
            }
        }
    }

    fn tick_prerender<C: ChrBus + ?Sized>(&mut self, chr: &mut C) {
        if self.dot == 1 {
            self.status &= !(status::VBLANK | status::SPRITE_ZERO_HIT | status::SPRITE_OVERFLOW);
            self.nmi_occurred = false;
            self.check_nmi();
            self.sprites.clear();
        }

        if !self.mask.rendering_enabled() {
            return;
        }

        if (1..=256).contains(&self.dot) || (321..=336).contains(&self.dot) {
            self.bg_fetch_cycle(chr);
            self.shift_registers();
        }
        if self.dot == 256 {
            self.v.increment_y();
        }
        if self.dot == 257 {
            self.v.copy_horizontal(self.t);
        }
        if (280..=304).contains(&self.dot) {
            self.v.copy_vertical(self.t);
        }

        // Odd frames drop the last dot of the pre-render line.
        if self.dot == 339 && self.odd_frame {
            self.dot = 340;
        }
    }

    fn tick_visible<C: ChrBus + ?Sized>(&mut self, chr: &mut C) {
        if !self.mask.rendering_enabled() {
            if (1..=256).contains(&self.dot) {
                let backdrop = self.vram.palette[0];
                self.put_pixel(self.dot - 1, backdrop);
            }
            return;
        }

        if (1..=256).contains(&self.dot) {
            self.render_pixel();
            self.bg_fetch_cycle(chr);
            self.shift_registers();
        }
        if self.dot == 256 {
            self.v.increment_y();
        }
        if self.dot == 257 {
            self.v.copy_horizontal(self.t);
            self.evaluate_sprites(chr);
        }
        if (321..=336).contains(&self.dot) {
            self.bg_fetch_cycle(chr);
            self.shift_registers();
        }
    }

    // === Background ===

    fn bg_fetch_cycle<C: ChrBus + ?Sized>(&mut self, chr: &mut C) {
        let cycle = if self.dot >= 321 {
            self.dot - 321
        } else {
            self.dot - 1
        };

        match cycle & 0x07 {
            0 => {
                // Latched tile enters the shifters every 8 dots, except on
                // the first prefetch dot.
                if self.dot != 321 {
                    self.load_bg_shift_registers();
                }
                self.bg_next_tile_id = self.vram.read(self.v.tile_address(), chr);
            }
            2 => {
                let attr = self.vram.read(self.v.attribute_address(), chr);
                self.bg_next_tile_attrib = (attr >> self.v.attribute_shift()) & 0x03;
            }
            4 => {
                let addr = self.bg_pattern_address();
                self.bg_next_tile_lo = self.vram.read(addr, chr);
            }
            6 => {
                let addr = self.bg_pattern_address() + 8;
                self.bg_next_tile_hi = self.vram.read(addr, chr);
            }
            7 => self.v.increment_x(),
            _ => {}
        }
    }

    fn bg_pattern_address(&self) -> u16 {
        self.ctrl.background_table() + u16::from(self.bg_next_tile_id) * 16 + self.v.fine_y()
    }

    fn load_bg_shift_registers(&mut self) {
        self.bg_shift_pattern_lo =
            (self.bg_shift_pattern_lo & 0xFF00) | u16::from(self.bg_next_tile_lo);
        self.bg_shift_pattern_hi =
            (self.bg_shift_pattern_hi & 0xFF00) | u16::from(self.bg_next_tile_hi);

        let spread = |bit: u8| if self.bg_next_tile_attrib & bit != 0 { 0xFF } else { 0x00 };
        self.bg_shift_attrib_lo = (self.bg_shift_attrib_lo & 0xFF00) | spread(0x01);
        self.bg_shift_attrib_hi = (self.bg_shift_attrib_hi & 0xFF00) | spread(0x02);
    }

    fn shift_registers(&mut self) {
        self.bg_shift_pattern_lo <<= 1;
        self.bg_shift_pattern_hi <<= 1;
        self.bg_shift_attrib_lo <<= 1;
        self.bg_shift_attrib_hi <<= 1;
    }

    /// Background (pattern, palette) at the current dot; pattern 0 is
    /// transparent.
    fn background_pixel(&self) -> (u8, u8) {
        if !self.mask.show_background() || (self.dot <= 8 && !self.mask.background_left()) {
            return (0, 0);
        }

        let bit_select = 0x8000 >> self.fine_x;
        let bit = |reg: u16| u8::from(reg & bit_select != 0);
        let pattern = (bit(self.bg_shift_pattern_hi) << 1) | bit(self.bg_shift_pattern_lo);
        let palette = (bit(self.bg_shift_attrib_hi) << 1) | bit(self.bg_shift_attrib_lo);
        (pattern, palette)
    }

    // === Sprites ===

    fn evaluate_sprites<C: ChrBus + ?Sized>(&mut self, chr: &mut C) {
        let height = self.ctrl.sprite_height();
        if self.sprites.evaluate(&self.oam, self.scanline, height) {
            self.status |= status::SPRITE_OVERFLOW;
        }

        let table = self.ctrl.sprite_table();
        for i in 0..usize::from(self.sprites.count) {
            let addr = self.sprites.pattern_address(i, self.scanline, height, table);
            let lo = self.vram.read(addr, chr);
            let hi = self.vram.read(addr + 8, chr);
            self.sprites.load(i, lo, hi);
        }
    }

    // === Pixel output ===

    fn render_pixel(&mut self) {
        let x = self.dot - 1;
        let (bg_pattern, bg_palette) = self.background_pixel();

        let sprite = if self.mask.show_sprites() && (x >= 8 || self.mask.sprites_left()) {
            self.sprites.pixel(x)
        } else {
            None
        };

        let (pattern, palette) = match sprite {
            None => (bg_pattern, bg_palette),
            Some(sp) if bg_pattern == 0 => (sp.pattern, sp.palette),
            Some(sp) => {
                if sp.sprite_zero && x != 255 {
                    self.status |= status::SPRITE_ZERO_HIT;
                }
                if sp.behind_background {
                    (bg_pattern, bg_palette)
                } else {
                    (sp.pattern, sp.palette)
                }
            }
        };

        let colour_addr = if pattern == 0 {
            0
        } else {
            usize::from((palette << 2) | pattern)
        };
        let colour = self.vram.palette[colour_addr];
        self.put_pixel(x, colour);
    }

    fn put_pixel(&mut self, x: u16, colour: u8) {
        let colour = if self.mask.greyscale() {
            colour & 0x30
        } else {
            colour & 0x3F
        };
        let index = usize::from(self.scanline) * FB_WIDTH + usize::from(x);
        if let Some(pixel) = self.framebuffer.get_mut(index) {
            *pixel = colour;
        }
    }

    // === Register access (CPU side) ===

    /// CPU read from PPU register ($2000-$2007 mirrored).
    pub fn cpu_read<C: ChrBus + ?Sized>(&mut self, reg: u16, chr: &mut C) -> u8 {
        let value = match reg & 0x07 {
            // $2002 - PPUSTATUS
            2 => {
                let result = (self.status & 0xE0) | (self.io_latch & 0x1F);
                self.status &= !status::VBLANK;
                self.nmi_occurred = false;
                self.check_nmi();
                self.w = false;
                result
            }
            // $2004 - OAMDATA
            4 => self.oam[usize::from(self.oam_addr)],
            // $2007 - PPUDATA
            7 => {
                let addr = self.v.0 & 0x3FFF;
                let result = if addr >= 0x3F00 {
                    // Palette reads bypass the buffer, which instead gets the
                    // nametable byte underneath.
                    self.read_buffer = self.vram.read(addr & 0x2FFF, chr);
                    (self.vram.read(addr, chr) & 0x3F) | (self.io_latch & 0xC0)
                } else {
                    let buffered = self.read_buffer;
                    self.read_buffer = self.vram.read(addr, chr);
                    buffered
                };
                self.increment_vram_address();
                result
            }
            // Write-only registers
            _ => self.io_latch,
        };
        self.io_latch = value;
        value
    }

    /// CPU write to PPU register ($2000-$2007 mirrored).
    pub fn cpu_write<C: ChrBus + ?Sized>(&mut self, reg: u16, val: u8, chr: &mut C) {
        self.io_latch = val;
        match reg & 0x07 {
            // $2000 - PPUCTRL
            0 => {
                self.ctrl = Ctrl(val);
                self.t.0 = (self.t.0 & !0x0C00) | (u16::from(self.ctrl.nametable()) << 10);
                self.check_nmi();
            }
            // $2001 - PPUMASK
            1 => self.mask = Mask(val),
            // $2002 - PPUSTATUS
            2 => log::warn!("write ${val:02X} to read-only PPUSTATUS ignored"),
            // $2003 - OAMADDR
            3 => self.oam_addr = val,
            // $2004 - OAMDATA
            4 => self.write_oam_data(val),
            // $2005 - PPUSCROLL
            5 => {
                if self.w {
                    self.t.0 = (self.t.0 & !0x73E0)
                        | (u16::from(val & 0x07) << 12)
                        | (u16::from(val >> 3) << 5);
                } else {
                    self.t.0 = (self.t.0 & !0x001F) | (u16::from(val) >> 3);
                    self.fine_x = val & 0x07;
                }
                self.w = !self.w;
            }
            // $2006 - PPUADDR
            6 => {
                if self.w {
                    self.t.0 = (self.t.0 & 0xFF00) | u16::from(val);
                    self.v = self.t;
                } else {
                    self.t.0 = (self.t.0 & 0x00FF) | (u16::from(val & 0x3F) << 8);
                }
                self.w = !self.w;
            }
            // $2007 - PPUDATA
            _ => {
                self.vram.write(self.v.0 & 0x3FFF, val, chr);
                self.increment_vram_address();
            }
        }
    }

    fn increment_vram_address(&mut self) {
        self.v.0 = self.v.0.wrapping_add(self.ctrl.vram_increment()) & 0x7FFF;
    }

    /// OAMDATA write, also the path OAM DMA takes.
    pub fn write_oam_data(&mut self, value: u8) {
        self.oam[usize::from(self.oam_addr)] = value;
        self.oam_addr = self.oam_addr.wrapping_add(1);
    }

    fn check_nmi(&mut self) {
        let nmi_active = self.nmi_occurred && self.ctrl.nmi_enabled();
        if nmi_active && !self.nmi_line {
            self.nmi_pending = true;
        }
        self.nmi_line = nmi_active;
    }

    /// Take the pending NMI edge (used by the NES bus to signal the CPU).
    pub fn take_nmi(&mut self) -> bool {
        std::mem::take(&mut self.nmi_pending)
    }

    /// True once per frame, on the dot the vblank flag is raised.
    pub fn take_vblank_entered(&mut self) -> bool {
        std::mem::take(&mut self.vblank_entered)
    }

    // === Observation ===

    /// Palette indices (0-63), 256x240, row-major.
    #[must_use]
    pub fn framebuffer(&self) -> &[u8] {
        &self.framebuffer
    }

    #[must_use]
    pub fn scanline(&self) -> u16 {
        self.scanline
    }

    #[must_use]
    pub fn dot(&self) -> u16 {
        self.dot
    }

    /// Completed frames since power-on.
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    #[must_use]
    pub fn render_state(&self) -> RenderState {
        RenderState::for_scanline(self.scanline)
    }

    #[must_use]
    pub fn status(&self) -> u8 {
        self.status
    }

    #[must_use]
    pub fn read_oam(&self, offset: u8) -> u8 {
        self.oam[usize::from(offset)]
    }

    /// Palette RAM entry, with the backdrop mirrors applied.
    #[must_use]
    pub fn read_palette(&self, addr: u16) -> u8 {
        self.vram.palette[crate::memory::palette_offset(addr)]
    }
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}

impl Observable for Ppu {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "scanline" => Some(self.scanline.into()),
            "dot" => Some(self.dot.into()),
            "frame" => Some(self.frame.into()),
            "ctrl" => Some(self.ctrl.0.into()),
            "mask" => Some(self.mask.0.into()),
            "status" => Some(self.status.into()),
            "oam_addr" => Some(self.oam_addr.into()),
            "v" => Some(self.v.0.into()),
            "t" => Some(self.t.0.into()),
            "fine_x" => Some(self.fine_x.into()),
            "w" => Some(self.w.into()),
            "odd_frame" => Some(self.odd_frame.into()),
            "render_state" => Some(format!("{:?}", self.render_state()).into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "scanline",
            "dot",
            "frame",
            "ctrl",
            "mask",
            "status",
            "oam_addr",
            "v",
            "t",
            "fine_x",
            "w",
            "odd_frame",
            "render_state",
        ]
    }
}
