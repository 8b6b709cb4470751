//! Television standard.

/// Video region: determines clock rates and chip lookup tables.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    /// NTSC: 60 Hz, 1,789,773 Hz CPU, exactly 3 PPU dots per CPU cycle.
    #[default]
    Ntsc,
    /// PAL: 50 Hz, 1,662,607 Hz CPU, 3.2 PPU dots per CPU cycle.
    Pal,
}

impl Region {
    /// CPU frequency in Hz.
    #[must_use]
    pub const fn cpu_hz(self) -> u32 {
        match self {
            Self::Ntsc => 1_789_773,
            Self::Pal => 1_662_607,
        }
    }

    /// Nominal frame rate.
    #[must_use]
    pub const fn frames_per_second(self) -> u32 {
        match self {
            Self::Ntsc => 60,
            Self::Pal => 50,
        }
    }

    /// Every `n`th CPU cycle gets one extra PPU dot, or `None` for an
    /// exact 3:1 ratio.
    #[must_use]
    pub const fn extra_dot_interval(self) -> Option<u32> {
        match self {
            Self::Ntsc => None,
            Self::Pal => Some(5),
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ntsc => write!(f, "NTSC"),
            Self::Pal => write!(f, "PAL"),
        }
    }
}
