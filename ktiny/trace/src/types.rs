//! Trace record types

/// Longest payload carried by one trace entry
pub const PAYLOAD_MAX: usize = 8;

/// Kind of a trace record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TraceRecord {
    // non-maskable
    Empty = 0,
    TargetInfo = 1,

    // lifecycle
    KnlInit = 2,
    KnlStart = 3,

    // interrupt context
    IsrEntry = 4,
    IsrExit = 5,

    // scheduler
    SchedLock = 6,
    SchedUnlock = 7,
    SchedNext = 8,
    SchedIdle = 9,

    // power management
    Tickless = 10,
}

impl TraceRecord {
    /// Records that bypass the global filter
    pub const fn is_non_maskable(self) -> bool {
        matches!(self, Self::Empty | Self::TargetInfo)
    }

    /// Raw record id
    pub const fn id(self) -> u8 {
        self as u8
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TraceRecord {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Empty => defmt::write!(fmt, "Empty"),
            Self::TargetInfo => defmt::write!(fmt, "TargetInfo"),
            Self::KnlInit => defmt::write!(fmt, "KnlInit"),
            Self::KnlStart => defmt::write!(fmt, "KnlStart"),
            Self::IsrEntry => defmt::write!(fmt, "IsrEntry"),
            Self::IsrExit => defmt::write!(fmt, "IsrExit"),
            Self::SchedLock => defmt::write!(fmt, "SchedLock"),
            Self::SchedUnlock => defmt::write!(fmt, "SchedUnlock"),
            Self::SchedNext => defmt::write!(fmt, "SchedNext"),
            Self::SchedIdle => defmt::write!(fmt, "SchedIdle"),
            Self::Tickless => defmt::write!(fmt, "Tickless"),
        }
    }
}

/// One recorded trace event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceEntry {
    pub record: TraceRecord,
    /// Sequence number, wraps
    pub seq: u16,
    payload: [u8; PAYLOAD_MAX],
    len: u8,
}

impl TraceEntry {
    /// Build an entry; payload bytes past [`PAYLOAD_MAX`] are cut off
    pub fn new(record: TraceRecord, seq: u16, data: &[u8]) -> Self {
        let len = data.len().min(PAYLOAD_MAX);
        let mut payload = [0; PAYLOAD_MAX];
        payload[..len].copy_from_slice(&data[..len]);
        Self {
            record,
            seq,
            payload,
            len: len as u8,
        }
    }

    /// Recorded payload bytes
    pub fn payload(&self) -> &[u8] {
        &self.payload[..self.len as usize]
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TraceEntry {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "#{} {} {=[u8]:x}", self.seq, self.record, self.payload());
    }
}

/// Signature of a function that receives kernel trace records
pub type TraceHook = fn(TraceRecord, &[u8]);
