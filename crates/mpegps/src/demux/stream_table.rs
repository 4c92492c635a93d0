use crate::constants::{AC3_INFER_RANGE, AUDIO_STARTCODE_RANGE, VIDEO_STARTCODE_RANGE};
use crate::stream::{AudioCodec, ElementaryKind, VideoCodec};

/// A PES stream discovered while demuxing, lazily created the first time
/// its effective id is seen (spec.md §3 "Lifecycle").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamDescriptor {
    /// The raw video/audio PES startcode (`0x1C0..=0x1EF`), or, for AC-3,
    /// the bare `private_stream_1` sub-id (`0x80..=0x9F`) rather than
    /// `0x1BD` itself — `private_stream_1` always coalesces to whichever
    /// sub-id is actually carried.
    pub id: u32,
    pub kind: ElementaryKind,
}

/// Maps a discovered effective stream id to its lazily-created
/// descriptor. Entries are created on first sighting and live for the
/// lifetime of the table; unknown ids are never registered (the caller
/// skips their payload instead).
#[derive(Debug, Default)]
pub struct StreamTable {
    streams: Vec<StreamDescriptor>,
}

impl StreamTable {
    pub fn new() -> Self {
        Self {
            streams: Vec::new(),
        }
    }

    /// Streams discovered so far, in first-sighting order.
    pub fn streams(&self) -> &[StreamDescriptor] {
        &self.streams
    }

    /// Look up `effective_id`'s stream index, registering a new
    /// descriptor on first sighting if the id is classifiable as audio
    /// or video. Returns `None` for ids that are neither already
    /// registered nor classifiable, in which case the caller should
    /// discard the packet's payload and resync.
    pub(crate) fn index_for(&mut self, effective_id: u32) -> Option<usize> {
        if let Some(pos) = self.streams.iter().position(|s| s.id == effective_id) {
            return Some(pos);
        }
        let kind = classify(effective_id)?;
        self.streams.push(StreamDescriptor {
            id: effective_id,
            kind,
        });
        Some(self.streams.len() - 1)
    }
}

fn classify(effective_id: u32) -> Option<ElementaryKind> {
    if VIDEO_STARTCODE_RANGE.contains(&effective_id) {
        Some(ElementaryKind::Video(VideoCodec::Mpeg1))
    } else if AUDIO_STARTCODE_RANGE.contains(&effective_id) {
        Some(ElementaryKind::Audio(AudioCodec::Mp2))
    } else if AC3_INFER_RANGE.contains(&effective_id) {
        Some(ElementaryKind::Audio(AudioCodec::Ac3))
    } else {
        None
    }
}
