//! Kernel object header
//!
//! Every kernel primitive (task, timer, semaphore, queue, ...) embeds one
//! [`KnlObj`]. The header answers two questions:
//!
//! - *Is this really a live object of the kind I expect?* With the
//!   `object-verify` feature the header stores an [`ObjType`] tag that the
//!   constructor stamps and the destructor wipes back to [`ObjType::None`].
//!   Without the feature the tag does not exist and every check passes.
//! - *Where did its memory come from?* With the `mmheap` feature the header
//!   records an [`AllocType`] so that the primitive's destroy path knows
//!   whether to hand the memory back to the allocator. Without the feature
//!   the field and its operations do not exist.
//!
//! Public operations on a primitive call [`KnlObj::check`] (or the
//! [`obj_verify!`](crate::obj_verify) macro) before touching anything else.

use core::fmt;

use crate::{KError, KResult};

/// Type tag identifying the kind of a kernel object
///
/// `None` is the tag of a header that was never initialized or has been
/// destroyed. It is the zero value; no real kind shares it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u16)]
pub enum ObjType {
    #[default]
    None = 0x0000,
    Task = 0xDAD1,
    Timer = 0xDAD2,
    MsgQueue = 0xDAD3,
    MmblkPool = 0xDAD4,
    RingQueue = 0xDAD5,
    BinaryHeap = 0xDAD6,
    PriorityQueue = 0xDAD7,
    CharFifo = 0xDAD8,

    // ipc objects
    Semaphore = 0x1BEE,
    Mutex = 0x2BEE,
    Event = 0x3BEE,
    MailQueue = 0x4BEE,
    MessageQueue = 0x5BEE,
    PriorityMailQueue = 0x6BEE,
    PriorityMessageQueue = 0x7BEE,
    CountdownLatch = 0x8BEE,
    Completion = 0x9BEE,
}

impl ObjType {
    /// Every real object kind (excludes `None`)
    pub const ALL: [ObjType; 17] = [
        ObjType::Task,
        ObjType::Timer,
        ObjType::MsgQueue,
        ObjType::MmblkPool,
        ObjType::RingQueue,
        ObjType::BinaryHeap,
        ObjType::PriorityQueue,
        ObjType::CharFifo,
        ObjType::Semaphore,
        ObjType::Mutex,
        ObjType::Event,
        ObjType::MailQueue,
        ObjType::MessageQueue,
        ObjType::PriorityMailQueue,
        ObjType::PriorityMessageQueue,
        ObjType::CountdownLatch,
        ObjType::Completion,
    ];

    /// Raw tag value
    pub const fn raw(self) -> u16 {
        self as u16
    }

    /// Decode a raw tag value
    pub fn from_raw(raw: u16) -> Option<Self> {
        if raw == ObjType::None.raw() {
            return Some(ObjType::None);
        }
        Self::ALL.iter().copied().find(|ty| ty.raw() == raw)
    }

    /// Check if this is the "no object" tag
    pub const fn is_none(self) -> bool {
        matches!(self, ObjType::None)
    }

    /// Check if this kind is an inter-task communication primitive
    pub const fn is_ipc(self) -> bool {
        matches!(
            self,
            ObjType::Semaphore
                | ObjType::Mutex
                | ObjType::Event
                | ObjType::MailQueue
                | ObjType::MessageQueue
                | ObjType::PriorityMailQueue
                | ObjType::PriorityMessageQueue
                | ObjType::CountdownLatch
                | ObjType::Completion
        )
    }
}

impl fmt::Display for ObjType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:#06x})", self, self.raw())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ObjType {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "ObjType({=u16:#x})", self.raw());
    }
}

/// Origin of a kernel object's backing memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AllocType {
    /// Not recorded yet
    #[default]
    None,
    /// User-supplied static storage; never returned to the allocator
    Static,
    /// Obtained from the dynamic allocator
    Dynamic,
}

#[cfg(feature = "defmt")]
impl defmt::Format for AllocType {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            AllocType::None => defmt::write!(fmt, "None"),
            AllocType::Static => defmt::write!(fmt, "Static"),
            AllocType::Dynamic => defmt::write!(fmt, "Dynamic"),
        }
    }
}

/// Header embedded in every kernel primitive
///
/// The owning primitive exclusively owns its header. A fresh header reports
/// [`ObjType::None`] and [`AllocType::None`].
#[derive(Debug, Default, PartialEq, Eq)]
pub struct KnlObj {
    #[cfg(feature = "mmheap")]
    alloc_type: AllocType,
    #[cfg(feature = "object-verify")]
    obj_type: ObjType,
}

impl KnlObj {
    /// Create an uninitialized header
    pub const fn new() -> Self {
        Self {
            #[cfg(feature = "mmheap")]
            alloc_type: AllocType::None,
            #[cfg(feature = "object-verify")]
            obj_type: ObjType::None,
        }
    }

    /// Stamp the header as a live object of kind `ty`
    ///
    /// First mutation of every primitive constructor. Also forgets any
    /// previously recorded allocation origin.
    pub fn init(&mut self, ty: ObjType) {
        #[cfg(feature = "object-verify")]
        {
            self.obj_type = ty;
        }
        #[cfg(not(feature = "object-verify"))]
        let _ = ty;

        #[cfg(feature = "mmheap")]
        self.alloc_reset();
    }

    /// Mark the header as no longer describing a live object
    ///
    /// Last action of every primitive destructor, before its memory is
    /// released or reused.
    pub fn deinit(&mut self) {
        #[cfg(feature = "object-verify")]
        {
            self.obj_type = ObjType::None;
        }
    }

    /// Check if the header is stamped with `ty`
    ///
    /// Always `true` when object verification is compiled out.
    #[inline]
    pub fn verify(&self, ty: ObjType) -> bool {
        #[cfg(feature = "object-verify")]
        {
            self.obj_type == ty
        }
        #[cfg(not(feature = "object-verify"))]
        {
            let _ = ty;
            true
        }
    }

    /// Like [`verify`](Self::verify), but as a result
    #[inline]
    pub fn check(&self, ty: ObjType) -> KResult<()> {
        if self.verify(ty) {
            Ok(())
        } else {
            Err(KError::ObjInvalid)
        }
    }

    /// Stored type tag
    #[cfg(feature = "object-verify")]
    pub const fn obj_type(&self) -> ObjType {
        self.obj_type
    }
}

#[cfg(feature = "mmheap")]
impl KnlObj {
    /// Forget the allocation origin
    pub fn alloc_reset(&mut self) {
        self.alloc_type = AllocType::None;
    }

    /// Record that the object lives in user-supplied static storage
    pub fn alloc_set_static(&mut self) {
        self.alloc_type = AllocType::Static;
    }

    /// Record that the object was obtained from the dynamic allocator
    pub fn alloc_set_dynamic(&mut self) {
        self.alloc_type = AllocType::Dynamic;
    }

    pub fn alloc_is_static(&self) -> bool {
        self.alloc_type == AllocType::Static
    }

    pub fn alloc_is_dynamic(&self) -> bool {
        self.alloc_type == AllocType::Dynamic
    }

    pub const fn alloc_type(&self) -> AllocType {
        self.alloc_type
    }

    /// Guard for the static destroy path
    pub fn check_static(&self) -> KResult<()> {
        if self.alloc_is_static() {
            Ok(())
        } else {
            Err(KError::ObjInvalidAllocType)
        }
    }

    /// Guard for the dynamic destroy path
    pub fn check_dynamic(&self) -> KResult<()> {
        if self.alloc_is_dynamic() {
            Ok(())
        } else {
            Err(KError::ObjInvalidAllocType)
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for KnlObj {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "KnlObj{{");
        #[cfg(feature = "object-verify")]
        defmt::write!(fmt, " type: {}", self.obj_type);
        #[cfg(feature = "mmheap")]
        defmt::write!(fmt, " alloc: {}", self.alloc_type);
        defmt::write!(fmt, " }}");
    }
}

/// A kernel primitive that embeds a [`KnlObj`]
pub trait KnlObject {
    /// Kind stamped into the header by the constructor
    const TYPE: ObjType;

    fn knl_obj(&self) -> &KnlObj;

    fn knl_obj_mut(&mut self) -> &mut KnlObj;

    /// Check if this is a live object of kind [`Self::TYPE`]
    fn obj_is_valid(&self) -> bool {
        self.knl_obj().verify(Self::TYPE)
    }

    /// Fail with [`KError::ObjInvalid`] unless this is a live object of kind [`Self::TYPE`]
    fn obj_check(&self) -> KResult<()> {
        self.knl_obj().check(Self::TYPE)
    }
}

/// Return `Err(KError::ObjInvalid)` from the enclosing function unless the
/// header is stamped with the given type
///
/// ```
/// use ktiny_core::{obj_verify, KResult, KnlObj, ObjType};
///
/// fn touch(header: &KnlObj) -> KResult<()> {
///     obj_verify!(header, ObjType::Semaphore);
///     Ok(())
/// }
///
/// let mut header = KnlObj::new();
/// header.init(ObjType::Semaphore);
/// assert!(touch(&header).is_ok());
/// ```
#[macro_export]
macro_rules! obj_verify {
    ($obj:expr, $ty:expr) => {
        if !$crate::KnlObj::verify(&$obj, $ty) {
            return Err($crate::KError::ObjInvalid);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_distinct_and_nonzero() {
        for (i, a) in ObjType::ALL.iter().enumerate() {
            assert_ne!(a.raw(), 0);
            for b in &ObjType::ALL[i + 1..] {
                assert_ne!(a.raw(), b.raw());
            }
        }
    }

    #[test]
    fn raw_tags_decode() {
        assert_eq!(ObjType::from_raw(0), Some(ObjType::None));
        assert_eq!(ObjType::from_raw(0xDAD1), Some(ObjType::Task));
        assert_eq!(ObjType::from_raw(0x9BEE), Some(ObjType::Completion));
        assert_eq!(ObjType::from_raw(0x1234), None);
    }

    #[test]
    fn ipc_kinds() {
        assert!(ObjType::Mutex.is_ipc());
        assert!(!ObjType::Timer.is_ipc());
        assert!(ObjType::default().is_none());
    }

    #[cfg(feature = "object-verify")]
    #[test]
    fn init_then_deinit_clears_tag() {
        let mut obj = KnlObj::new();
        obj.init(ObjType::Task);
        assert!(obj.verify(ObjType::Task));
        assert!(!obj.verify(ObjType::Timer));

        obj.deinit();
        assert!(!obj.verify(ObjType::Task));
        assert_eq!(obj.obj_type(), ObjType::None);
    }

    #[cfg(not(feature = "object-verify"))]
    #[test]
    fn verify_always_passes_when_disabled() {
        let obj = KnlObj::new();
        assert!(obj.verify(ObjType::Task));
        assert_eq!(obj.check(ObjType::Mutex), Ok(()));
    }

    #[cfg(feature = "mmheap")]
    #[test]
    fn init_resets_alloc_type() {
        let mut obj = KnlObj::new();
        obj.alloc_set_dynamic();
        obj.init(ObjType::Semaphore);
        assert_eq!(obj.alloc_type(), AllocType::None);
    }
}
