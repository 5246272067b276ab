use lofty::config::ParseOptions;
use lofty::prelude::*;
use lofty::probe::Probe;
use std::path::Path;
use std::time::Duration;

/// Reads the playing time encoded in the audio stream itself.
pub fn probe_duration(path: &Path) -> Result<Duration, String> {
    let tagged_file = Probe::open(path)
        .and_then(|probe| probe.options(ParseOptions::new()).read())
        .map_err(|err| err.to_string())?;

    let duration = tagged_file.properties().duration();
    if duration.is_zero() {
        return Err("audio stream reports no duration".to_string());
    }
    Ok(duration)
}

/// Writes `frames` silent MPEG-1 Layer III frames, 128 kbps at 44.1 kHz.
#[cfg(test)]
pub(super) fn write_test_mp3(path: &Path, frames: usize) {
    const FRAME_HEADER: [u8; 4] = [0xFF, 0xFB, 0x90, 0x00];
    const FRAME_LENGTH: usize = 417;

    let mut frame = vec![0u8; FRAME_LENGTH];
    frame[..FRAME_HEADER.len()].copy_from_slice(&FRAME_HEADER);
    std::fs::write(path, frame.repeat(frames)).unwrap();
}
