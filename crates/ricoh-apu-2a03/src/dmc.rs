//! Delta modulation channel ($4010-$4013).

/// Plays 1-bit delta-encoded samples fetched from CPU memory.
///
/// The output unit shifts one bit per timer period, stepping the 7-bit
/// level up or down by 2. When the sample buffer empties and bytes remain,
/// the channel requests a DMA; the bus performs the read, stalls the CPU
/// and hands the byte back through [`Dmc::receive_dma_byte`].
#[derive(Debug)]
pub(crate) struct Dmc {
    level: u8,
    irq_enabled: bool,
    pub(crate) irq_flag: bool,
    looping: bool,
    timer: u16,
    period: u16,
    rates: &'static [u16; 16],

    sample_address: u16,
    sample_length: u16,
    current_address: u16,
    pub(crate) bytes_remaining: u16,

    buffer: Option<u8>,
    shift: u8,
    bits_remaining: u8,
    silence: bool,
    dma_pending: bool,
}

impl Dmc {
    pub(crate) fn new(rates: &'static [u16; 16]) -> Self {
        Self {
            level: 0,
            irq_enabled: false,
            irq_flag: false,
            looping: false,
            timer: rates[0],
            period: rates[0],
            rates,
            sample_address: 0xC000,
            sample_length: 1,
            current_address: 0xC000,
            bytes_remaining: 0,
            buffer: None,
            shift: 0,
            bits_remaining: 8,
            silence: true,
            dma_pending: false,
        }
    }

    pub(crate) fn write(&mut self, reg: u16, value: u8) {
        match reg & 0x03 {
            0 => {
                self.irq_enabled = value & 0x80 != 0;
                self.looping = value & 0x40 != 0;
                self.period = self.rates[usize::from(value & 0x0F)];
                if !self.irq_enabled {
                    self.irq_flag = false;
                }
            }
            1 => self.level = value & 0x7F,
            2 => self.sample_address = 0xC000 | (u16::from(value) << 6),
            _ => self.sample_length = (u16::from(value) << 4) + 1,
        }
    }

    /// $4015 bit 4.
    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.irq_flag = false;
        if !enabled {
            self.bytes_remaining = 0;
        } else if self.bytes_remaining == 0 {
            self.current_address = self.sample_address;
            self.bytes_remaining = self.sample_length;
            if self.buffer.is_none() {
                self.dma_pending = true;
            }
        }
    }

    /// One CPU cycle.
    pub(crate) fn tick(&mut self) {
        self.timer = self.timer.saturating_sub(1);
        if self.timer == 0 {
            self.timer = self.period;
            self.clock_output();
        }
    }

    fn clock_output(&mut self) {
        if !self.silence {
            if self.shift & 1 != 0 {
                if self.level <= 125 {
                    self.level += 2;
                }
            } else if self.level >= 2 {
                self.level -= 2;
            }
            self.shift >>= 1;
        }

        self.bits_remaining -= 1;
        if self.bits_remaining == 0 {
            self.bits_remaining = 8;
            match self.buffer.take() {
                Some(byte) => {
                    self.silence = false;
                    self.shift = byte;
                }
                None => self.silence = true,
            }
            if self.bytes_remaining > 0 {
                self.dma_pending = true;
            }
        }
    }

    /// Address to fetch, if the sample buffer wants a byte.
    pub(crate) fn dma_request(&self) -> Option<u16> {
        (self.dma_pending && self.bytes_remaining > 0).then_some(self.current_address)
    }

    pub(crate) fn receive_dma_byte(&mut self, byte: u8) {
        self.buffer = Some(byte);
        self.dma_pending = false;

        // Address wraps from $FFFF to $8000.
        self.current_address = self.current_address.checked_add(1).unwrap_or(0x8000);

        self.bytes_remaining -= 1;
        if self.bytes_remaining == 0 {
            if self.looping {
                self.current_address = self.sample_address;
                self.bytes_remaining = self.sample_length;
            } else if self.irq_enabled {
                self.irq_flag = true;
            }
        }
    }

    pub(crate) fn output(&self) -> u8 {
        self.level
    }

    pub(crate) fn current_address(&self) -> u16 {
        self.current_address
    }
}
