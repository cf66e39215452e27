//! Delta animation tracks: root translation and rotation curves.
//!
//! A track whose sample count is 1 stores its single value inline. Larger
//! tracks carry a frame buffer behind a pointer and an inline index buffer
//! whose element width depends on the animation's frame count.

use std::io::{self, Write};

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use tracing::debug;

use super::layout::{delta_part, rotation, translation};
use super::types::{DeltaPart, RemotePtr};
use crate::cancel::CancelToken;
use crate::error::{Error, Result};
use crate::memory::ReadMemory;

pub type Vec3 = [f32; 3];

/// Width of one frame index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexWidth {
    One,
    Two,
}

impl IndexWidth {
    /// Animations with 256 or more frames need 16-bit indices
    pub fn for_frame_count(frame_count: u16) -> Self {
        if frame_count >= 0x100 {
            Self::Two
        } else {
            Self::One
        }
    }

    pub fn bytes(self) -> usize {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }

    pub fn buffer_size(self, count: u32) -> usize {
        count as usize * self.bytes()
    }
}

/// Storage precision of one translation frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameWidth {
    /// Byte-quantized (3 bytes per frame)
    Compact,
    /// 16-bit quantized (6 bytes per frame)
    Full,
}

impl FrameWidth {
    pub fn from_flag(small_trans: u16) -> Self {
        if small_trans == 0 {
            Self::Full
        } else {
            Self::Compact
        }
    }

    pub fn bytes(self) -> usize {
        match self {
            Self::Compact => 3,
            Self::Full => 6,
        }
    }

    pub fn buffer_size(self, count: u32) -> usize {
        count as usize * self.bytes()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TranslationFrames {
    /// The same vector for the whole animation
    Constant(Vec3),
    Animated {
        min: Vec3,
        max: Vec3,
        frames: Vec<u8>,
        indices: Vec<u8>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranslationTrack {
    /// Sample count (stored in memory as count - 1)
    pub count: u32,
    pub small_trans: u16,
    pub frames: TranslationFrames,
}

impl TranslationTrack {
    pub fn frame_width(&self) -> FrameWidth {
        FrameWidth::from_flag(self.small_trans)
    }

    /// Bytes of the track body, excluding the count prefix
    pub fn payload_len(&self) -> usize {
        match &self.frames {
            TranslationFrames::Constant(_) => translation::VEC3_SIZE,
            TranslationFrames::Animated {
                frames, indices, ..
            } => translation::VEC3_SIZE * 2 + frames.len() + indices.len(),
        }
    }

    pub fn write_payload<W: Write>(&self, out: &mut W) -> io::Result<()> {
        match &self.frames {
            TranslationFrames::Constant(value) => write_vec3(out, value),
            TranslationFrames::Animated {
                min,
                max,
                frames,
                indices,
            } => {
                write_vec3(out, min)?;
                write_vec3(out, max)?;
                out.write_all(frames)?;
                out.write_all(indices)
            }
        }
    }

    /// Count as u32, compact flag as u16, then the body
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        out.write_u32::<LittleEndian>(self.count)?;
        out.write_u16::<LittleEndian>(self.small_trans)?;
        self.write_payload(out)
    }
}

/// Quaternion precision of a rotation track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationKind {
    /// Two stored components (4 bytes per frame)
    Half,
    /// Four stored components (8 bytes per frame)
    Full,
}

impl RotationKind {
    pub fn frame_bytes(self) -> usize {
        match self {
            Self::Half => 4,
            Self::Full => 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RotationFrames {
    Constant(Vec<u8>),
    Animated { frames: Vec<u8>, indices: Vec<u8> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RotationTrack {
    pub kind: RotationKind,
    pub count: u32,
    pub frames: RotationFrames,
}

impl RotationTrack {
    pub fn payload_len(&self) -> usize {
        match &self.frames {
            RotationFrames::Constant(value) => value.len(),
            RotationFrames::Animated { frames, indices } => frames.len() + indices.len(),
        }
    }

    pub fn write_payload<W: Write>(&self, out: &mut W) -> io::Result<()> {
        match &self.frames {
            RotationFrames::Constant(value) => out.write_all(value),
            RotationFrames::Animated { frames, indices } => {
                out.write_all(frames)?;
                out.write_all(indices)
            }
        }
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        out.write_u32::<LittleEndian>(self.count)?;
        self.write_payload(out)
    }
}

/// Everything reachable from an animation's delta part pointer
#[derive(Debug, Clone, PartialEq)]
pub struct DeltaCurves {
    pub part: DeltaPart,
    pub translation: Option<TranslationTrack>,
    pub rotation_2d: Option<RotationTrack>,
    pub rotation_3d: Option<RotationTrack>,
}

/// Reads delta tracks for one animation.
pub struct DeltaCurveDecoder<'a, R: ReadMemory> {
    reader: &'a R,
    index_width: IndexWidth,
    cancel: &'a CancelToken,
}

impl<'a, R: ReadMemory> DeltaCurveDecoder<'a, R> {
    pub fn new(reader: &'a R, frame_count: u16, cancel: &'a CancelToken) -> Self {
        Self {
            reader,
            index_width: IndexWidth::for_frame_count(frame_count),
            cancel,
        }
    }

    /// Decode the delta part block at `address` and each present track
    pub fn decode(&self, address: u64) -> Result<DeltaCurves> {
        self.cancel.check()?;
        let part = DeltaPart::from_bytes(&self.reader.read_bytes(address, delta_part::SIZE)?)?;
        debug!(
            "Delta part at 0x{:X}: translations={} quat2d={} quat={}",
            address,
            part.translations.is_present(),
            part.quaternions_2d.is_present(),
            part.quaternions.is_present()
        );

        let translation = part
            .translations
            .address()
            .map(|a| self.decode_translation(a))
            .transpose()?;
        let rotation_2d = part
            .quaternions_2d
            .address()
            .map(|a| self.decode_rotation(a, RotationKind::Half))
            .transpose()?;
        let rotation_3d = part
            .quaternions
            .address()
            .map(|a| self.decode_rotation(a, RotationKind::Full))
            .transpose()?;

        Ok(DeltaCurves {
            part,
            translation,
            rotation_2d,
            rotation_3d,
        })
    }

    pub fn decode_translation(&self, address: u64) -> Result<TranslationTrack> {
        self.cancel.check()?;
        let count = self.read_count(address + translation::SIZE)?;
        let small_trans = self.reader.read_u16(address + translation::SMALL_TRANS)?;

        if count == 1 {
            let value = self.read_vec3(address + translation::FRAME0)?;
            return Ok(TranslationTrack {
                count,
                small_trans,
                frames: TranslationFrames::Constant(value),
            });
        }

        let frame_width = FrameWidth::from_flag(small_trans);
        let min = self.read_vec3(address + translation::MIN)?;
        let max = self.read_vec3(address + translation::MAX)?;
        let frames_ptr = self.read_frames_pointer(address + translation::FRAMES)?;

        self.cancel.check()?;
        let frames = self
            .reader
            .read_bytes(frames_ptr, frame_width.buffer_size(count))?;
        let indices = self.reader.read_bytes(
            address + translation::INDICES,
            self.index_width.buffer_size(count),
        )?;

        debug!(
            "Translation track: {} samples, {:?} frames ({} bytes), {:?} indices ({} bytes)",
            count,
            frame_width,
            frames.len(),
            self.index_width,
            indices.len()
        );

        Ok(TranslationTrack {
            count,
            small_trans,
            frames: TranslationFrames::Animated {
                min,
                max,
                frames,
                indices,
            },
        })
    }

    pub fn decode_rotation(&self, address: u64, kind: RotationKind) -> Result<RotationTrack> {
        self.cancel.check()?;
        let count = self.read_count(address + rotation::SIZE)?;

        if count == 1 {
            let value = self
                .reader
                .read_bytes(address + rotation::FRAME0, kind.frame_bytes())?;
            return Ok(RotationTrack {
                kind,
                count,
                frames: RotationFrames::Constant(value),
            });
        }

        let frames_ptr = self.read_frames_pointer(address + rotation::FRAMES)?;

        self.cancel.check()?;
        let frames = self
            .reader
            .read_bytes(frames_ptr, count as usize * kind.frame_bytes())?;
        let indices = self.reader.read_bytes(
            address + rotation::INDICES,
            self.index_width.buffer_size(count),
        )?;

        debug!(
            "{:?} rotation track: {} samples, {} frame bytes, {} index bytes",
            kind,
            count,
            frames.len(),
            indices.len()
        );

        Ok(RotationTrack {
            kind,
            count,
            frames: RotationFrames::Animated { frames, indices },
        })
    }

    fn read_count(&self, address: u64) -> Result<u32> {
        Ok(u32::from(self.reader.read_u16(address)?) + 1)
    }

    fn read_vec3(&self, address: u64) -> Result<Vec3> {
        let bytes = self.reader.read_bytes(address, translation::VEC3_SIZE)?;
        Ok([
            LittleEndian::read_f32(&bytes[0..]),
            LittleEndian::read_f32(&bytes[4..]),
            LittleEndian::read_f32(&bytes[8..]),
        ])
    }

    fn read_frames_pointer(&self, address: u64) -> Result<u64> {
        RemotePtr::new(self.reader.read_u64(address)?)
            .address()
            .ok_or_else(|| {
                Error::DecodeInconsistency(format!(
                    "track at 0x{:X} has several samples but no frame buffer",
                    address
                ))
            })
    }
}

fn write_vec3<W: Write>(out: &mut W, value: &Vec3) -> io::Result<()> {
    for component in value {
        out.write_f32::<LittleEndian>(*component)?;
    }
    Ok(())
}
