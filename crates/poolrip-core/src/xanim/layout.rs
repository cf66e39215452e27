//! Memory layout constants for xanim structures
//!
//! All structures are little-endian with 8-byte packing. Offsets are in bytes
//! from the start of the structure.

/// Fixed substitute for every present pointer in exported files
pub const SENTINEL_POINTER: u64 = 0x4C554C38304335;

/// Name of the pool's unused-slot template record
pub const VOID_NAME: &str = "void";

/// Animation header (XAnimParts)
pub mod header {
    pub const SIZE: usize = 0xF8;

    pub const NAME: usize = 0x00;
    pub const RANDOM_DATA_BYTE_COUNT: usize = 0x08;
    pub const DATA_SHORT_COUNT: usize = 0x0C;
    pub const EXTRA_CHANNEL_DATA_COUNT: usize = 0x10;
    pub const DATA_BYTE_COUNT: usize = 0x14;
    pub const DATA_INT_COUNT: usize = 0x18;
    pub const RANDOM_DATA_INT_COUNT: usize = 0x1C;
    pub const FRAME_COUNT: usize = 0x20;
    pub const BONE_COUNT: usize = 0x22;

    pub const FLAGS: usize = 0x24;
    pub const FLAGS_LEN: usize = 12;

    /// Per part-type bone counts (u16 each)
    pub const PART_BONE_COUNTS: usize = 0x30;
    pub const PART_TYPE_COUNT: usize = 10;

    /// Secondary flags; byte 0 is the animation type
    pub const FLAGS2: usize = 0x44;
    pub const FLAGS2_LEN: usize = 4;

    pub const RANDOM_DATA_SHORT_COUNT: usize = 0x48;
    pub const INDEX_COUNT: usize = 0x4C;
    pub const FRAME_RATE: usize = 0x50;
    pub const FREQUENCY: usize = 0x54;
    pub const PRIMED_LENGTH: usize = 0x58;
    pub const LOOP_ENTRY_TIME: usize = 0x5C;
    pub const IK_PITCH_LAYER_COUNT: usize = 0x60;
    pub const IK_PITCH_BONE_COUNT: usize = 0x64;

    pub const NAMES: usize = 0x68;
    pub const DATA_BYTE: usize = 0x70;
    pub const DATA_SHORT: usize = 0x78;
    pub const DATA_INT: usize = 0x80;
    pub const RANDOM_DATA_SHORT: usize = 0x88;
    pub const RANDOM_DATA_BYTE: usize = 0x90;
    pub const RANDOM_DATA_INT: usize = 0x98;
    pub const EXTRA_CHANNEL_DATA: usize = 0xA0;
    pub const INDICES: usize = 0xA8;
    pub const IK_PITCH_LAYERS: usize = 0xB0;
    pub const IK_PITCH_BONES: usize = 0xB8;

    /// Note, startup and shutdown notify descriptors
    pub const NOTIFY_TRACKS: usize = 0xC0;
    pub const NOTIFY_TRACK_COUNT: usize = 3;

    pub const DELTA_PARTS: usize = 0xF0;
}

/// Notify track descriptor embedded in the header
pub mod notify_track {
    pub const SIZE: usize = 0x10;

    pub const INFO: usize = 0x00;
    pub const COUNT: usize = 0x08;
}

/// One notify event
pub mod notify_info {
    pub const SIZE: usize = 0x10;

    pub const TYPE: usize = 0x00;
    pub const TIME: usize = 0x04;
    pub const PARAM1: usize = 0x08;
    pub const PARAM2: usize = 0x0C;
}

/// Element widths of the raw header blocks
pub mod element {
    pub const BONE_NAME_ID: usize = 4;
    pub const IK_PITCH_LAYER: usize = 8;
    pub const IK_PITCH_BONE: usize = 28;
}

/// Delta part block (three optional track pointers)
pub mod delta_part {
    pub const SIZE: usize = 0x18;

    pub const TRANSLATIONS: usize = 0x00;
    pub const QUATERNIONS_2D: usize = 0x08;
    pub const QUATERNIONS: usize = 0x10;
}

/// Delta translation track.
///
/// `FRAME0` and `MIN` share storage: a single-sample track stores its only
/// vector where a multi-sample track stores its minimum.
pub mod translation {
    pub const SIZE: u64 = 0x00;
    pub const SMALL_TRANS: u64 = 0x02;
    pub const FRAME0: u64 = 0x08;
    pub const MIN: u64 = 0x08;
    pub const MAX: u64 = 0x14;
    pub const FRAMES: u64 = 0x20;
    pub const INDICES: u64 = 0x28;

    pub const VEC3_SIZE: usize = 12;
}

/// Delta rotation track (half and full quaternions share this shape).
///
/// `FRAME0` and `FRAMES` share storage, selected by the sample count.
pub mod rotation {
    pub const SIZE: u64 = 0x00;
    pub const FRAME0: u64 = 0x08;
    pub const FRAMES: u64 = 0x08;
    pub const INDICES: u64 = 0x10;
}
