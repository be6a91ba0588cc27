//! Reading recorded camera frames and writing replay output.
//!
//! Input is JSON Lines, one camera frame per line:
//! `{"camera_id": "cam1", "tracks": [{"local_track_id": 1, "bbox": [x1, y1, x2, y2],
//! "confirmed": true, "embedding": [..]}]}`

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use serde::Serialize;

use multicam_core::shared::ids::CameraId;
use multicam_core::shared::track::{CameraFrame, ResolvedTrack};

/// A camera frame together with its position in the input stream.
#[derive(Debug)]
pub struct IndexedFrame {
    pub index: usize,
    pub frame: CameraFrame,
}

/// Resolved output of one input frame, as written to the tracks file.
#[derive(Serialize)]
pub struct FrameOutput<'a> {
    pub frame_index: usize,
    pub camera_id: &'a CameraId,
    pub tracks: &'a [ResolvedTrack],
}

pub fn open_input(path: &Path) -> Result<Box<dyn BufRead>, Box<dyn std::error::Error>> {
    if path.as_os_str() == "-" {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    let file = File::open(path).map_err(|e| format!("cannot open {}: {e}", path.display()))?;
    Ok(Box::new(BufReader::new(file)))
}

/// Parses every non-blank line into a camera frame.
pub fn read_frames(
    reader: impl BufRead,
) -> Result<Vec<IndexedFrame>, Box<dyn std::error::Error>> {
    let mut frames = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let frame: CameraFrame = serde_json::from_str(&line)
            .map_err(|e| format!("line {}: invalid camera frame: {e}", line_no + 1))?;
        frames.push(IndexedFrame {
            index: frames.len(),
            frame,
        });
    }
    Ok(frames)
}

/// Keeps every `skip_frames`-th frame of each camera, starting with its first.
pub fn thin_frames(frames: Vec<IndexedFrame>, skip_frames: usize) -> Vec<IndexedFrame> {
    let skip = skip_frames.max(1);
    let mut seen: HashMap<CameraId, usize> = HashMap::new();
    frames
        .into_iter()
        .filter(|f| {
            let count = seen.entry(f.frame.camera_id.clone()).or_insert(0);
            let keep = *count % skip == 0;
            *count += 1;
            keep
        })
        .collect()
}

/// Splits frames into per-camera streams, each in input order.
pub fn split_by_camera(frames: Vec<IndexedFrame>) -> Vec<(CameraId, Vec<IndexedFrame>)> {
    let mut order: Vec<CameraId> = Vec::new();
    let mut streams: HashMap<CameraId, Vec<IndexedFrame>> = HashMap::new();
    for f in frames {
        let camera = f.frame.camera_id.clone();
        if !streams.contains_key(&camera) {
            order.push(camera.clone());
        }
        streams.entry(camera).or_default().push(f);
    }
    order
        .into_iter()
        .map(|camera| {
            let stream = streams.remove(&camera).unwrap_or_default();
            (camera, stream)
        })
        .collect()
}

pub fn write_json(
    out: &mut dyn Write,
    value: &impl Serialize,
    pretty: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if pretty {
        serde_json::to_writer_pretty(&mut *out, value)?;
    } else {
        serde_json::to_writer(&mut *out, value)?;
    }
    writeln!(out)?;
    Ok(())
}
