//! Classified junction records and per-gene tallies.

use std::fmt;

use crate::error::Error;

/// Reading-frame class of a hit relative to the gene's ORF start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FrameClass {
    InFrame = 0,
    NotInFrame = 1,
    Intron = 2,
    Backwards = 3,
}

impl FrameClass {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InFrame => "in_frame",
            Self::NotInFrame => "not_in_frame",
            Self::Intron => "intron",
            Self::Backwards => "backwards",
        }
    }

    #[must_use]
    pub fn to_byte(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for FrameClass {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::InFrame),
            1 => Ok(Self::NotInFrame),
            2 => Ok(Self::Intron),
            3 => Ok(Self::Backwards),
            _ => Err(Error::Parse(format!("invalid frame class byte: {value}"))),
        }
    }
}

impl fmt::Display for FrameClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of a hit relative to the gene's ORF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OrfClass {
    InOrf = 0,
    Upstream = 1,
    Downstream = 2,
}

impl OrfClass {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InOrf => "in_orf",
            Self::Upstream => "upstream",
            Self::Downstream => "downstream",
        }
    }

    #[must_use]
    pub fn to_byte(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for OrfClass {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::InOrf),
            1 => Ok(Self::Upstream),
            2 => Ok(Self::Downstream),
            _ => Err(Error::Parse(format!("invalid ORF class byte: {value}"))),
        }
    }
}

impl fmt::Display for OrfClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Frame and ORF class of a single accepted hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub frame: FrameClass,
    pub orf: OrfClass,
}

impl Classification {
    #[must_use]
    pub fn in_frame_in_orf(&self) -> bool {
        self.frame == FrameClass::InFrame && self.orf == OrfClass::InOrf
    }
}

/// A deduplicated junction: one row per (gene, position, query start).
#[derive(Debug, Clone, PartialEq)]
pub struct Junction {
    /// Index into the run's gene table.
    pub gene: usize,
    pub position: i64,
    pub query_start: i64,
    pub frame: FrameClass,
    pub orf: OrfClass,
    pub in_frame_in_orf: bool,
    pub count: u32,
    /// Parts per million of the file's accepted hits.
    pub ppm: f64,
}

/// Tallies over one gene's junction rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneStats {
    pub gene: usize,
    pub total: u32,
    pub in_frame: u32,
    pub not_in_frame: u32,
    pub intron: u32,
    pub backwards: u32,
    pub in_orf: u32,
    pub upstream: u32,
    pub downstream: u32,
    pub in_frame_in_orf: u32,
}

impl GeneStats {
    #[must_use]
    pub fn new(gene: usize) -> Self {
        Self {
            gene,
            ..Self::default()
        }
    }

    pub fn add(&mut self, junction: &Junction) {
        self.total += 1;
        match junction.frame {
            FrameClass::InFrame => self.in_frame += 1,
            FrameClass::NotInFrame => self.not_in_frame += 1,
            FrameClass::Intron => self.intron += 1,
            FrameClass::Backwards => self.backwards += 1,
        }
        match junction.orf {
            OrfClass::InOrf => self.in_orf += 1,
            OrfClass::Upstream => self.upstream += 1,
            OrfClass::Downstream => self.downstream += 1,
        }
        if junction.in_frame_in_orf {
            self.in_frame_in_orf += 1;
        }
    }
}
