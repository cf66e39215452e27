use byteorder::{ByteOrder, LittleEndian};
use serde::{Serialize, Serializer};
use strum::{Display, EnumIter, FromRepr, IntoStaticStr};

use super::layout::{delta_part, header, notify_info, notify_track};
use crate::error::{Error, Result};

/// A pointer into the game's address space, or absent (zero)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RemotePtr(u64);

impl RemotePtr {
    pub const NULL: Self = Self(0);

    pub fn new(address: u64) -> Self {
        Self(address)
    }

    pub fn is_present(self) -> bool {
        self.0 != 0
    }

    /// The address, if present
    pub(crate) fn address(self) -> Option<u64> {
        self.is_present().then_some(self.0)
    }

    pub(crate) fn raw(self) -> u64 {
        self.0
    }

    fn read_at(bytes: &[u8], offset: usize) -> Self {
        Self(LittleEndian::read_u64(&bytes[offset..]))
    }
}

impl Serialize for RemotePtr {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.address() {
            Some(address) => serializer.serialize_some(&format!("0x{address:X}")),
            None => serializer.serialize_none(),
        }
    }
}

/// Playback type selected by the first secondary flag byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, IntoStaticStr, Display)]
#[repr(u8)]
pub enum AnimType {
    #[strum(serialize = "absolute")]
    Absolute = 0,
    #[strum(serialize = "relative")]
    Relative = 1,
    #[strum(serialize = "delta")]
    Delta = 2,
    #[strum(serialize = "mp_torso")]
    MpTorso = 3,
    #[strum(serialize = "mp_legs")]
    MpLegs = 4,
    #[strum(serialize = "mp_fullbody")]
    MpFullbody = 5,
    #[strum(serialize = "additive")]
    Additive = 6,
    #[strum(serialize = "delta3d")]
    Delta3d = 7,
}

impl AnimType {
    pub fn from_u8(value: u8) -> Result<Self> {
        Self::from_repr(value).ok_or(Error::InvalidAnimType(value))
    }

    pub fn label(&self) -> &'static str {
        self.into()
    }
}

/// Which of the three notify tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, IntoStaticStr, Display)]
pub enum NotifyTrackKind {
    #[strum(serialize = "note")]
    Note,
    #[strum(serialize = "startup")]
    Startup,
    #[strum(serialize = "shutdown")]
    Shutdown,
}

/// Notify track descriptor: pointer to `count` events
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NotifyTrack {
    pub info: RemotePtr,
    pub count: u8,
}

impl NotifyTrack {
    fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            info: RemotePtr::read_at(bytes, notify_track::INFO),
            count: bytes[notify_track::COUNT],
        }
    }

    fn write_bytes(&self, out: &mut [u8]) {
        LittleEndian::write_u64(&mut out[notify_track::INFO..], self.info.raw());
        out[notify_track::COUNT] = self.count;
    }
}

/// One timed notify event; ids resolve through the string table
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NotifyEvent {
    pub type_id: u32,
    pub time: f32,
    pub param1_id: u32,
    pub param2_id: u32,
}

impl NotifyEvent {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            type_id: LittleEndian::read_u32(&bytes[notify_info::TYPE..]),
            time: LittleEndian::read_f32(&bytes[notify_info::TIME..]),
            param1_id: LittleEndian::read_u32(&bytes[notify_info::PARAM1..]),
            param2_id: LittleEndian::read_u32(&bytes[notify_info::PARAM2..]),
        }
    }
}

/// Pointers to the optional delta tracks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeltaPart {
    pub translations: RemotePtr,
    pub quaternions_2d: RemotePtr,
    pub quaternions: RemotePtr,
}

impl DeltaPart {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        ensure_len(bytes, delta_part::SIZE, "delta part")?;
        Ok(Self {
            translations: RemotePtr::read_at(bytes, delta_part::TRANSLATIONS),
            quaternions_2d: RemotePtr::read_at(bytes, delta_part::QUATERNIONS_2D),
            quaternions: RemotePtr::read_at(bytes, delta_part::QUATERNIONS),
        })
    }

    pub fn to_bytes(&self) -> [u8; delta_part::SIZE] {
        let mut out = [0u8; delta_part::SIZE];
        LittleEndian::write_u64(&mut out[delta_part::TRANSLATIONS..], self.translations.raw());
        LittleEndian::write_u64(&mut out[delta_part::QUATERNIONS_2D..], self.quaternions_2d.raw());
        LittleEndian::write_u64(&mut out[delta_part::QUATERNIONS..], self.quaternions.raw());
        out
    }
}

/// Animation asset header as laid out in the pool
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnimationRecord {
    pub name: RemotePtr,
    pub random_data_byte_count: i32,
    pub data_short_count: i32,
    pub extra_channel_data_count: i32,
    pub data_byte_count: i32,
    pub data_int_count: i32,
    pub random_data_int_count: i32,
    pub frame_count: u16,
    pub bone_count: u16,
    pub flags: [u8; header::FLAGS_LEN],
    pub part_bone_counts: [u16; header::PART_TYPE_COUNT],
    pub flags2: [u8; header::FLAGS2_LEN],
    pub random_data_short_count: i32,
    pub index_count: i32,
    pub frame_rate: f32,
    pub frequency: f32,
    pub primed_length: f32,
    pub loop_entry_time: f32,
    pub ik_pitch_layer_count: i32,
    pub ik_pitch_bone_count: i32,
    pub names: RemotePtr,
    pub data_byte: RemotePtr,
    pub data_short: RemotePtr,
    pub data_int: RemotePtr,
    pub random_data_short: RemotePtr,
    pub random_data_byte: RemotePtr,
    pub random_data_int: RemotePtr,
    pub extra_channel_data: RemotePtr,
    pub indices: RemotePtr,
    pub ik_pitch_layers: RemotePtr,
    pub ik_pitch_bones: RemotePtr,
    pub notify_tracks: [NotifyTrack; header::NOTIFY_TRACK_COUNT],
    pub delta_parts: RemotePtr,
}

impl AnimationRecord {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        ensure_len(bytes, header::SIZE, "animation header")?;

        let i32_at = |offset: usize| LittleEndian::read_i32(&bytes[offset..]);
        let u16_at = |offset: usize| LittleEndian::read_u16(&bytes[offset..]);
        let f32_at = |offset: usize| LittleEndian::read_f32(&bytes[offset..]);
        let ptr_at = |offset: usize| RemotePtr::read_at(bytes, offset);

        let mut flags = [0u8; header::FLAGS_LEN];
        flags.copy_from_slice(&bytes[header::FLAGS..header::FLAGS + header::FLAGS_LEN]);

        let mut part_bone_counts = [0u16; header::PART_TYPE_COUNT];
        for (i, count) in part_bone_counts.iter_mut().enumerate() {
            *count = u16_at(header::PART_BONE_COUNTS + i * 2);
        }

        let mut flags2 = [0u8; header::FLAGS2_LEN];
        flags2.copy_from_slice(&bytes[header::FLAGS2..header::FLAGS2 + header::FLAGS2_LEN]);

        let notify_tracks = std::array::from_fn(|i| {
            let start = header::NOTIFY_TRACKS + i * notify_track::SIZE;
            NotifyTrack::from_bytes(&bytes[start..start + notify_track::SIZE])
        });

        Ok(Self {
            name: ptr_at(header::NAME),
            random_data_byte_count: i32_at(header::RANDOM_DATA_BYTE_COUNT),
            data_short_count: i32_at(header::DATA_SHORT_COUNT),
            extra_channel_data_count: i32_at(header::EXTRA_CHANNEL_DATA_COUNT),
            data_byte_count: i32_at(header::DATA_BYTE_COUNT),
            data_int_count: i32_at(header::DATA_INT_COUNT),
            random_data_int_count: i32_at(header::RANDOM_DATA_INT_COUNT),
            frame_count: u16_at(header::FRAME_COUNT),
            bone_count: u16_at(header::BONE_COUNT),
            flags,
            part_bone_counts,
            flags2,
            random_data_short_count: i32_at(header::RANDOM_DATA_SHORT_COUNT),
            index_count: i32_at(header::INDEX_COUNT),
            frame_rate: f32_at(header::FRAME_RATE),
            frequency: f32_at(header::FREQUENCY),
            primed_length: f32_at(header::PRIMED_LENGTH),
            loop_entry_time: f32_at(header::LOOP_ENTRY_TIME),
            ik_pitch_layer_count: i32_at(header::IK_PITCH_LAYER_COUNT),
            ik_pitch_bone_count: i32_at(header::IK_PITCH_BONE_COUNT),
            names: ptr_at(header::NAMES),
            data_byte: ptr_at(header::DATA_BYTE),
            data_short: ptr_at(header::DATA_SHORT),
            data_int: ptr_at(header::DATA_INT),
            random_data_short: ptr_at(header::RANDOM_DATA_SHORT),
            random_data_byte: ptr_at(header::RANDOM_DATA_BYTE),
            random_data_int: ptr_at(header::RANDOM_DATA_INT),
            extra_channel_data: ptr_at(header::EXTRA_CHANNEL_DATA),
            indices: ptr_at(header::INDICES),
            ik_pitch_layers: ptr_at(header::IK_PITCH_LAYERS),
            ik_pitch_bones: ptr_at(header::IK_PITCH_BONES),
            notify_tracks,
            delta_parts: ptr_at(header::DELTA_PARTS),
        })
    }

    /// Packed little-endian image of the header; padding bytes are zero
    pub fn to_bytes(&self) -> [u8; header::SIZE] {
        let mut out = [0u8; header::SIZE];

        let pointers = [
            (header::NAME, self.name),
            (header::NAMES, self.names),
            (header::DATA_BYTE, self.data_byte),
            (header::DATA_SHORT, self.data_short),
            (header::DATA_INT, self.data_int),
            (header::RANDOM_DATA_SHORT, self.random_data_short),
            (header::RANDOM_DATA_BYTE, self.random_data_byte),
            (header::RANDOM_DATA_INT, self.random_data_int),
            (header::EXTRA_CHANNEL_DATA, self.extra_channel_data),
            (header::INDICES, self.indices),
            (header::IK_PITCH_LAYERS, self.ik_pitch_layers),
            (header::IK_PITCH_BONES, self.ik_pitch_bones),
            (header::DELTA_PARTS, self.delta_parts),
        ];
        for (offset, ptr) in pointers {
            LittleEndian::write_u64(&mut out[offset..], ptr.raw());
        }

        let counts = [
            (header::RANDOM_DATA_BYTE_COUNT, self.random_data_byte_count),
            (header::DATA_SHORT_COUNT, self.data_short_count),
            (header::EXTRA_CHANNEL_DATA_COUNT, self.extra_channel_data_count),
            (header::DATA_BYTE_COUNT, self.data_byte_count),
            (header::DATA_INT_COUNT, self.data_int_count),
            (header::RANDOM_DATA_INT_COUNT, self.random_data_int_count),
            (header::RANDOM_DATA_SHORT_COUNT, self.random_data_short_count),
            (header::INDEX_COUNT, self.index_count),
            (header::IK_PITCH_LAYER_COUNT, self.ik_pitch_layer_count),
            (header::IK_PITCH_BONE_COUNT, self.ik_pitch_bone_count),
        ];
        for (offset, value) in counts {
            LittleEndian::write_i32(&mut out[offset..], value);
        }

        let floats = [
            (header::FRAME_RATE, self.frame_rate),
            (header::FREQUENCY, self.frequency),
            (header::PRIMED_LENGTH, self.primed_length),
            (header::LOOP_ENTRY_TIME, self.loop_entry_time),
        ];
        for (offset, value) in floats {
            LittleEndian::write_f32(&mut out[offset..], value);
        }

        LittleEndian::write_u16(&mut out[header::FRAME_COUNT..], self.frame_count);
        LittleEndian::write_u16(&mut out[header::BONE_COUNT..], self.bone_count);
        out[header::FLAGS..header::FLAGS + header::FLAGS_LEN].copy_from_slice(&self.flags);
        for (i, count) in self.part_bone_counts.iter().enumerate() {
            LittleEndian::write_u16(&mut out[header::PART_BONE_COUNTS + i * 2..], *count);
        }
        out[header::FLAGS2..header::FLAGS2 + header::FLAGS2_LEN].copy_from_slice(&self.flags2);

        for (i, track) in self.notify_tracks.iter().enumerate() {
            let start = header::NOTIFY_TRACKS + i * notify_track::SIZE;
            track.write_bytes(&mut out[start..start + notify_track::SIZE]);
        }

        out
    }

    pub fn anim_type(&self) -> Result<AnimType> {
        AnimType::from_u8(self.flags2[0])
    }

    /// Listing summary, e.g. `Bones: 86 Frames: 31 Type: relative`
    pub fn summary(&self) -> Result<String> {
        Ok(format!(
            "Bones: {} Frames: {} Type: {}",
            self.bone_count,
            self.frame_count,
            self.anim_type()?
        ))
    }

    /// The six data pointers compared against the void record
    fn occupancy_fields(&self) -> [RemotePtr; 6] {
        [
            self.data_byte,
            self.data_short,
            self.data_int,
            self.random_data_byte,
            self.random_data_short,
            self.random_data_int,
        ]
    }

    /// True only if every compared field differs from the template's
    pub fn differs_from(&self, template: &AnimationRecord) -> bool {
        self.occupancy_fields()
            .iter()
            .zip(template.occupancy_fields().iter())
            .all(|(ours, theirs)| ours != theirs)
    }
}

fn ensure_len(bytes: &[u8], expected: usize, what: &str) -> Result<()> {
    if bytes.len() < expected {
        return Err(Error::DecodeInconsistency(format!(
            "{what} needs {expected} bytes, got {}",
            bytes.len()
        )));
    }
    Ok(())
}
