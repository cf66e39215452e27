//! Serialization of one decoded animation into the `.xanim_raw` layout.
//!
//! Decoding reads every block out of the game first; nothing touches the
//! filesystem until the whole asset is in hand. The file is then written to
//! a temporary sibling and renamed into place.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, WriteBytesExt};
use serde::Serialize;
use strum::{EnumIter, IntoEnumIterator, IntoStaticStr};
use tempfile::NamedTempFile;
use tracing::debug;

use super::delta::{DeltaCurveDecoder, DeltaCurves};
use super::layout::{element, notify_info};
use super::sentinel::SentinelConvert;
use super::types::{AnimationRecord, NotifyEvent, NotifyTrack, NotifyTrackKind, RemotePtr};
use crate::cancel::CancelToken;
use crate::config::limits::MAX_BLOCK_SIZE;
use crate::error::{Error, Result};
use crate::memory::ReadMemory;
use crate::strings::StringTable;

/// Extension of exported animation files
pub const FILE_EXTENSION: &str = "xanim_raw";

/// Raw header blocks copied verbatim, in file order
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, IntoStaticStr)]
pub enum RawBlock {
    #[strum(serialize = "data_byte")]
    DataByte,
    #[strum(serialize = "data_short")]
    DataShort,
    #[strum(serialize = "data_int")]
    DataInt,
    #[strum(serialize = "random_data_byte")]
    RandomDataByte,
    #[strum(serialize = "random_data_short")]
    RandomDataShort,
    #[strum(serialize = "random_data_int")]
    RandomDataInt,
    #[strum(serialize = "extra_channel_data")]
    ExtraChannelData,
    #[strum(serialize = "ik_pitch_layers")]
    IkPitchLayers,
    #[strum(serialize = "ik_pitch_bones")]
    IkPitchBones,
}

impl RawBlock {
    pub fn element_size(self) -> usize {
        match self {
            Self::DataByte | Self::RandomDataByte | Self::ExtraChannelData => 1,
            Self::DataShort | Self::RandomDataShort => 2,
            Self::DataInt | Self::RandomDataInt => 4,
            Self::IkPitchLayers => element::IK_PITCH_LAYER,
            Self::IkPitchBones => element::IK_PITCH_BONE,
        }
    }

    /// Source pointer and element count of this block in `record`
    pub fn source(self, record: &AnimationRecord) -> (RemotePtr, i32) {
        match self {
            Self::DataByte => (record.data_byte, record.data_byte_count),
            Self::DataShort => (record.data_short, record.data_short_count),
            Self::DataInt => (record.data_int, record.data_int_count),
            Self::RandomDataByte => (record.random_data_byte, record.random_data_byte_count),
            Self::RandomDataShort => (record.random_data_short, record.random_data_short_count),
            Self::RandomDataInt => (record.random_data_int, record.random_data_int_count),
            Self::ExtraChannelData => (record.extra_channel_data, record.extra_channel_data_count),
            Self::IkPitchLayers => (record.ik_pitch_layers, record.ik_pitch_layer_count),
            Self::IkPitchBones => (record.ik_pitch_bones, record.ik_pitch_bone_count),
        }
    }

    pub fn label(self) -> &'static str {
        self.into()
    }
}

/// A notify event with its string ids resolved
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedNotify {
    pub time: f32,
    pub name: String,
    pub param1: String,
    pub param2: String,
}

/// Everything the output file is built from
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAnimation {
    pub record: AnimationRecord,
    pub name: String,
    pub bone_names: Vec<String>,
    /// One entry per [`RawBlock`], in iteration order
    pub blocks: Vec<Vec<u8>>,
    /// Note, startup, shutdown
    pub notify_tracks: [Vec<ResolvedNotify>; 3],
    pub delta: Option<DeltaCurves>,
}

impl DecodedAnimation {
    /// Write the file layout into `out`
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(&self.record.sentinel_converted().to_bytes())?;
        write_cstr(out, &self.name)?;

        for bone in &self.bone_names {
            write_cstr(out, bone)?;
        }

        for block in &self.blocks {
            out.write_all(block)?;
        }

        for track in &self.notify_tracks {
            for event in track {
                out.write_f32::<LittleEndian>(event.time)?;
                write_cstr(out, &event.name)?;
                write_cstr(out, &event.param1)?;
                write_cstr(out, &event.param2)?;
            }
        }

        if let Some(delta) = &self.delta {
            out.write_all(&delta.part.sentinel_converted().to_bytes())?;
            if let Some(track) = &delta.translation {
                track.write_to(out)?;
            }
            if let Some(track) = &delta.rotation_2d {
                track.write_to(out)?;
            }
            if let Some(track) = &delta.rotation_3d {
                track.write_to(out)?;
            }
        }

        Ok(())
    }
}

/// Reads every block an animation header points at.
pub struct AssetSerializer<'a, R: ReadMemory, S: StringTable> {
    reader: &'a R,
    strings: &'a S,
    cancel: &'a CancelToken,
}

impl<'a, R: ReadMemory, S: StringTable> AssetSerializer<'a, R, S> {
    pub fn new(reader: &'a R, strings: &'a S, cancel: &'a CancelToken) -> Self {
        Self {
            reader,
            strings,
            cancel,
        }
    }

    /// Decode all data of `record`, whose name has already been read as `name`
    pub fn decode(&self, record: AnimationRecord, name: String) -> Result<DecodedAnimation> {
        let bone_names = self.read_bone_names(&record)?;

        let blocks = RawBlock::iter()
            .map(|block| {
                let (ptr, count) = block.source(&record);
                let bytes = self.read_block(ptr, count, block.element_size())?;
                debug!("{}: {} bytes", block.label(), bytes.len());
                Ok(bytes)
            })
            .collect::<Result<Vec<_>>>()?;

        let mut notify_tracks: [Vec<ResolvedNotify>; 3] = Default::default();
        let tracks = notify_tracks.iter_mut().zip(&record.notify_tracks);
        for (kind, (events, track)) in NotifyTrackKind::iter().zip(tracks) {
            *events = self.read_notify_track(track)?;
            debug!("{} notify track: {} events", kind, events.len());
        }

        let delta = match record.delta_parts.address() {
            Some(address) => Some(
                DeltaCurveDecoder::new(self.reader, record.frame_count, self.cancel)
                    .decode(address)?,
            ),
            None => None,
        };

        Ok(DecodedAnimation {
            record,
            name,
            bone_names,
            blocks,
            notify_tracks,
            delta,
        })
    }

    /// Copy `count` elements of `width` bytes; an absent pointer yields nothing
    pub fn read_block(&self, ptr: RemotePtr, count: i32, width: usize) -> Result<Vec<u8>> {
        let Some(address) = ptr.address() else {
            return Ok(Vec::new());
        };
        let count = usize::try_from(count).map_err(|_| {
            Error::DecodeInconsistency(format!("negative element count {count} at 0x{address:X}"))
        })?;
        let size = count
            .checked_mul(width)
            .filter(|&size| size <= MAX_BLOCK_SIZE)
            .ok_or_else(|| {
                Error::DecodeInconsistency(format!(
                    "block of {count} x {width} bytes at 0x{address:X} exceeds {MAX_BLOCK_SIZE}"
                ))
            })?;

        self.cancel.check()?;
        self.reader.read_bytes(address, size)
    }

    fn read_bone_names(&self, record: &AnimationRecord) -> Result<Vec<String>> {
        let Some(names) = record.names.address() else {
            return Ok(Vec::new());
        };

        self.cancel.check()?;
        let ids: Vec<u32> = self
            .reader
            .read_array(names, usize::from(record.bone_count))?;
        ids.into_iter()
            .map(|id| {
                self.cancel.check()?;
                self.strings.resolve(id)
            })
            .collect()
    }

    fn read_notify_track(&self, track: &NotifyTrack) -> Result<Vec<ResolvedNotify>> {
        let Some(info) = track.info.address() else {
            return Ok(Vec::new());
        };

        self.cancel.check()?;
        let bytes = self
            .reader
            .read_bytes(info, usize::from(track.count) * notify_info::SIZE)?;

        bytes
            .chunks_exact(notify_info::SIZE)
            .map(NotifyEvent::from_bytes)
            .map(|event| {
                Ok(ResolvedNotify {
                    time: event.time,
                    name: self.strings.resolve(event.type_id)?,
                    param1: self.strings.resolve(event.param1_id)?,
                    param2: self.strings.resolve(event.param2_id)?,
                })
            })
            .collect()
    }
}

/// `<root>/<game>/share/raw/xanim/<name>.xanim_raw`
pub fn output_path(root: &Path, game: &str, name: &str) -> Result<PathBuf> {
    let unsafe_name = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if unsafe_name {
        return Err(Error::DecodeInconsistency(format!(
            "asset name {name:?} is not a valid file name"
        )));
    }

    Ok(root
        .join(game)
        .join("share")
        .join("raw")
        .join("xanim")
        .join(format!("{name}.{FILE_EXTENSION}")))
}

/// Write `animation` to `path`, replacing any existing file only on success.
///
/// Returns the number of bytes written.
pub fn write_atomic(path: &Path, animation: &DecodedAnimation) -> Result<u64> {
    let parent = path.parent().ok_or_else(|| {
        Error::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} has no parent directory", path.display()),
        ))
    })?;
    fs::create_dir_all(parent)?;

    let mut temp = NamedTempFile::new_in(parent)?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        animation.write_to(&mut writer)?;
        writer.flush()?;
    }
    let bytes = temp.as_file().metadata()?.len();

    temp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(bytes)
}

fn write_cstr<W: Write>(out: &mut W, value: &str) -> io::Result<()> {
    out.write_all(value.as_bytes())?;
    out.write_u8(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MockMemoryBuilder, MockMemoryReader};
    use crate::strings::MapStringTable;
    use crate::xanim::layout::{SENTINEL_POINTER, header};
    use tempfile::TempDir;

    fn encode(decoded: &DecodedAnimation) -> Vec<u8> {
        let mut out = Vec::new();
        decoded.write_to(&mut out).unwrap();
        out
    }

    const NAMES: u64 = 0x2000;
    const DATA_BYTE: u64 = 0x3000;
    const DATA_SHORT: u64 = 0x3100;
    const IK_BONES: u64 = 0x3200;
    const NOTIFY: u64 = 0x4000;
    const DELTA: u64 = 0x5000;
    const TRACK: u64 = 0x5100;

    fn strings() -> MapStringTable {
        [
            (1, "tag_origin"),
            (2, "j_spine"),
            (7, "sound"),
            (8, "fly_step"),
            (0, ""),
        ]
        .into_iter()
        .map(|(id, value)| (id, value.to_string()))
        .collect()
    }

    fn full_record() -> AnimationRecord {
        let mut record = AnimationRecord {
            name: RemotePtr::new(0x1000),
            bone_count: 2,
            frame_count: 10,
            names: RemotePtr::new(NAMES),
            data_byte: RemotePtr::new(DATA_BYTE),
            data_byte_count: 3,
            data_short: RemotePtr::new(DATA_SHORT),
            data_short_count: 2,
            ik_pitch_bones: RemotePtr::new(IK_BONES),
            ik_pitch_bone_count: 1,
            delta_parts: RemotePtr::new(DELTA),
            ..Default::default()
        };
        record.notify_tracks[0] = NotifyTrack {
            info: RemotePtr::new(NOTIFY),
            count: 1,
        };
        record
    }

    fn full_memory() -> MockMemoryReader {
        MockMemoryBuilder::new()
            .write_u32(NAMES, 1)
            .write_u32(NAMES + 4, 2)
            .write_bytes(DATA_BYTE, &[1, 2, 3])
            .write_bytes(DATA_SHORT, &[4, 5, 6, 7])
            .write_bytes(IK_BONES, &[9; 28])
            .write_u32(NOTIFY, 7)
            .write_f32(NOTIFY + 4, 0.5)
            .write_u32(NOTIFY + 8, 8)
            .write_u32(NOTIFY + 12, 0)
            .write_u64(DELTA, 0)
            .write_u64(DELTA + 8, TRACK)
            .write_u64(DELTA + 16, 0)
            .write_u16(TRACK, 0)
            .write_bytes(TRACK + 8, &[0xA, 0xB, 0xC, 0xD])
            .build()
    }

    #[test]
    fn test_output_path_layout() {
        let path = output_path(Path::new("exported_files"), "BlackOps3", "ai_run_f").unwrap();
        assert_eq!(
            path,
            PathBuf::from("exported_files/BlackOps3/share/raw/xanim/ai_run_f.xanim_raw")
        );
    }

    #[test]
    fn test_output_path_rejects_traversal() {
        for name in ["", "..", "../evil", "a/b", "a\\b"] {
            let err = output_path(Path::new("out"), "BlackOps3", name).unwrap_err();
            assert!(matches!(err, Error::DecodeInconsistency(_)), "{name:?}");
        }
    }

    #[test]
    fn test_output_path_allows_inner_dots() {
        let path = output_path(Path::new("out"), "BlackOps3", "ai..run").unwrap();
        assert_eq!(
            path,
            PathBuf::from("out/BlackOps3/share/raw/xanim/ai..run.xanim_raw")
        );
    }

    #[test]
    fn test_all_optional_pointers_null_writes_mandatory_parts_only() {
        let reader = MockMemoryBuilder::new().write_u32(NAMES, 1).build();
        let strings = strings();
        let cancel = CancelToken::new();
        let record = AnimationRecord {
            name: RemotePtr::new(0x1000),
            bone_count: 1,
            names: RemotePtr::new(NAMES),
            ..Default::default()
        };

        let decoded = AssetSerializer::new(&reader, &strings, &cancel)
            .decode(record, "idle".to_string())
            .unwrap();
        assert!(decoded.delta.is_none());
        assert!(decoded.blocks.iter().all(Vec::is_empty));

        let bytes = encode(&decoded);
        assert_eq!(bytes.len(), header::SIZE + "idle\0".len() + "tag_origin\0".len());
        assert_eq!(&bytes[header::SIZE..header::SIZE + 5], b"idle\0");
        assert_eq!(&bytes[header::SIZE + 5..], b"tag_origin\0");
    }

    #[test]
    fn test_ordered_layout() {
        let reader = full_memory();
        let strings = strings();
        let cancel = CancelToken::new();

        let decoded = AssetSerializer::new(&reader, &strings, &cancel)
            .decode(full_record(), "walk".to_string())
            .unwrap();
        let bytes = encode(&decoded);

        let mut expected = full_record().sentinel_converted().to_bytes().to_vec();
        expected.extend_from_slice(b"walk\0tag_origin\0j_spine\0");
        expected.extend_from_slice(&[1, 2, 3]);
        expected.extend_from_slice(&[4, 5, 6, 7]);
        expected.extend_from_slice(&[9; 28]);
        expected.extend_from_slice(&0.5f32.to_le_bytes());
        expected.extend_from_slice(b"sound\0fly_step\0\0");
        let mut part = [0u8; 24];
        part[8..16].copy_from_slice(&SENTINEL_POINTER.to_le_bytes());
        expected.extend_from_slice(&part);
        expected.extend_from_slice(&1u32.to_le_bytes());
        expected.extend_from_slice(&[0xA, 0xB, 0xC, 0xD]);

        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_negative_count_is_inconsistent() {
        let reader = full_memory();
        let strings = strings();
        let cancel = CancelToken::new();
        let serializer = AssetSerializer::new(&reader, &strings, &cancel);

        let err = serializer
            .read_block(RemotePtr::new(DATA_BYTE), -1, 1)
            .unwrap_err();
        assert!(matches!(err, Error::DecodeInconsistency(_)));
        assert!(serializer.read_block(RemotePtr::NULL, 50, 4).unwrap().is_empty());
    }

    #[test]
    fn test_unmapped_block_is_read_fault() {
        let reader = full_memory();
        let strings = strings();
        let cancel = CancelToken::new();
        let mut record = full_record();
        record.data_int = RemotePtr::new(0xDEAD_0000);
        record.data_int_count = 4;

        let err = AssetSerializer::new(&reader, &strings, &cancel)
            .decode(record, "walk".to_string())
            .unwrap_err();
        assert!(err.is_read_fault());
    }

    #[test]
    fn test_cancel_stops_before_reading() {
        let reader = full_memory();
        let strings = strings();
        let cancel = CancelToken::new();
        cancel.cancel();

        let err = AssetSerializer::new(&reader, &strings, &cancel)
            .decode(full_record(), "walk".to_string())
            .unwrap_err();
        assert!(err.is_interrupted());
        assert_eq!(reader.read_count(), 0);
    }

    #[test]
    fn test_write_atomic_creates_directories() {
        let dir = TempDir::new().unwrap();
        let reader = full_memory();
        let strings = strings();
        let cancel = CancelToken::new();
        let decoded = AssetSerializer::new(&reader, &strings, &cancel)
            .decode(full_record(), "walk".to_string())
            .unwrap();

        let path = output_path(dir.path(), "BlackOps3", "walk").unwrap();
        let written = write_atomic(&path, &decoded).unwrap();

        let on_disk = fs::read(&path).unwrap();
        assert_eq!(written, on_disk.len() as u64);
        assert_eq!(on_disk, encode(&decoded));

        let leftovers = fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }
}
