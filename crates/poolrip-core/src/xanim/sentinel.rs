//! Replacement of live pointers with a fixed marker before writing.
//!
//! Exported pointer fields only say "this block follows"; the addresses
//! themselves mean nothing outside the game process.

use super::layout::SENTINEL_POINTER;
use super::types::{AnimationRecord, DeltaPart, NotifyTrack, RemotePtr};

/// Values whose remote pointers can be replaced by [`SENTINEL_POINTER`]
pub trait SentinelConvert {
    /// Copy with every present pointer replaced and absent pointers kept zero
    fn sentinel_converted(&self) -> Self;
}

impl SentinelConvert for RemotePtr {
    fn sentinel_converted(&self) -> Self {
        if self.is_present() {
            RemotePtr::new(SENTINEL_POINTER)
        } else {
            RemotePtr::NULL
        }
    }
}

impl SentinelConvert for NotifyTrack {
    fn sentinel_converted(&self) -> Self {
        Self {
            info: self.info.sentinel_converted(),
            count: self.count,
        }
    }
}

impl SentinelConvert for DeltaPart {
    fn sentinel_converted(&self) -> Self {
        Self {
            translations: self.translations.sentinel_converted(),
            quaternions_2d: self.quaternions_2d.sentinel_converted(),
            quaternions: self.quaternions.sentinel_converted(),
        }
    }
}

impl SentinelConvert for AnimationRecord {
    fn sentinel_converted(&self) -> Self {
        Self {
            name: self.name.sentinel_converted(),
            names: self.names.sentinel_converted(),
            data_byte: self.data_byte.sentinel_converted(),
            data_short: self.data_short.sentinel_converted(),
            data_int: self.data_int.sentinel_converted(),
            random_data_short: self.random_data_short.sentinel_converted(),
            random_data_byte: self.random_data_byte.sentinel_converted(),
            random_data_int: self.random_data_int.sentinel_converted(),
            extra_channel_data: self.extra_channel_data.sentinel_converted(),
            indices: self.indices.sentinel_converted(),
            ik_pitch_layers: self.ik_pitch_layers.sentinel_converted(),
            ik_pitch_bones: self.ik_pitch_bones.sentinel_converted(),
            notify_tracks: self.notify_tracks.map(|t| t.sentinel_converted()),
            delta_parts: self.delta_parts.sentinel_converted(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn populated_record() -> AnimationRecord {
        let mut record = AnimationRecord {
            name: RemotePtr::new(0x1000),
            names: RemotePtr::new(0x1100),
            data_byte: RemotePtr::new(0x1200),
            data_int: RemotePtr::new(0x1300),
            random_data_int: RemotePtr::new(0x1400),
            ik_pitch_bones: RemotePtr::new(0x1500),
            delta_parts: RemotePtr::new(0x1600),
            bone_count: 12,
            frame_count: 40,
            data_byte_count: 99,
            ..Default::default()
        };
        record.notify_tracks[2] = NotifyTrack {
            info: RemotePtr::new(0x1700),
            count: 4,
        };
        record
    }

    fn pointers(record: &AnimationRecord) -> Vec<RemotePtr> {
        let mut all = vec![
            record.name,
            record.names,
            record.data_byte,
            record.data_short,
            record.data_int,
            record.random_data_short,
            record.random_data_byte,
            record.random_data_int,
            record.extra_channel_data,
            record.indices,
            record.ik_pitch_layers,
            record.ik_pitch_bones,
            record.delta_parts,
        ];
        all.extend(record.notify_tracks.iter().map(|t| t.info));
        all
    }

    #[test]
    fn test_present_pointers_become_sentinel() {
        let record = populated_record();
        let converted = record.sentinel_converted();

        for (before, after) in pointers(&record).into_iter().zip(pointers(&converted)) {
            if before.is_present() {
                assert_eq!(after.raw(), SENTINEL_POINTER);
            } else {
                assert_eq!(after, RemotePtr::NULL);
            }
        }
    }

    #[test]
    fn test_non_pointer_fields_untouched() {
        let record = populated_record();
        let converted = record.sentinel_converted();

        assert_eq!(converted.bone_count, 12);
        assert_eq!(converted.frame_count, 40);
        assert_eq!(converted.data_byte_count, 99);
        assert_eq!(converted.notify_tracks[2].count, 4);
    }

    #[test]
    fn test_conversion_is_idempotent() {
        let once = populated_record().sentinel_converted();
        assert_eq!(once.sentinel_converted(), once);

        let empty = AnimationRecord::default();
        assert_eq!(empty.sentinel_converted(), empty);
    }

    #[test]
    fn test_delta_part_conversion() {
        let part = DeltaPart {
            translations: RemotePtr::new(0x2000),
            quaternions_2d: RemotePtr::NULL,
            quaternions: RemotePtr::new(0x3000),
        };
        let converted = part.sentinel_converted();

        assert_eq!(converted.translations.raw(), SENTINEL_POINTER);
        assert!(!converted.quaternions_2d.is_present());
        assert_eq!(converted.quaternions.raw(), SENTINEL_POINTER);
        assert_eq!(converted.sentinel_converted(), converted);
    }
}
