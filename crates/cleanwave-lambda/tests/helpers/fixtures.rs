//! Audio and record fixtures.

use cleanwave_core::models::{FileRecord, FileVariant};
use std::io::Cursor;

/// A 16-bit PCM WAV with a short ramp signal.
pub fn wav_bytes(channels: u16, sample_rate: u32, frames: u32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for i in 0..frames * channels as u32 {
            writer.write_sample(((i % 200) as i16 - 100) * 50).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

/// One second of mono audio at the model's rate.
pub fn mono_wav_48k() -> Vec<u8> {
    wav_bytes(1, 48_000, 48_000)
}

pub fn uploaded_record(file_id: &str, user_id: &str, s3_key: &str) -> FileRecord {
    FileRecord {
        file_id: file_id.to_string(),
        user_id: Some(user_id.to_string()),
        s3_key: Some(s3_key.to_string()),
        filename: s3_key.rsplit('/').next().map(String::from),
        content_type: Some("audio/wav".to_string()),
        file_size: None,
        duration: None,
        parent_file_id: None,
        variant: FileVariant::Original,
        created_at: None,
    }
}
