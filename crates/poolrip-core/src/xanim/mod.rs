//! Animation (xanim) assets.
//!
//! Decoding of the pooled header, the delta curve tracks, pointer sentinel
//! conversion and the `.xanim_raw` writer.

mod delta;
mod export;
pub mod layout;
mod pool;
mod sentinel;
mod types;

pub use delta::{
    DeltaCurveDecoder, DeltaCurves, FrameWidth, IndexWidth, RotationFrames, RotationKind,
    RotationTrack, TranslationFrames, TranslationTrack, Vec3,
};
pub use export::{
    AssetSerializer, DecodedAnimation, FILE_EXTENSION, RawBlock, ResolvedNotify, output_path,
    write_atomic,
};
pub use layout::SENTINEL_POINTER;
pub use pool::{POOL_NAME, SETTING_GROUP, ScanContext, SlotClass, XAnimPool};
pub use sentinel::SentinelConvert;
pub use types::{
    AnimType, AnimationRecord, DeltaPart, NotifyEvent, NotifyTrack, NotifyTrackKind, RemotePtr,
};
