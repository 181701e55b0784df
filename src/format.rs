//! Media format descriptors.
//!
//! A [`FormatDescriptor`] is an immutable attribute bag: a major kind
//! (video, audio, ...), a sub-kind (pixel format, sample format or codec)
//! and an ordered set of kind-specific parameters such as frame geometry.
//!
//! # Comparison
//!
//! Descriptors are compared with [`FormatDescriptor::compare`], which yields
//! a [`FormatMatch`]:
//!
//! - [`FormatMatch::Identical`]: same kind, sub-kind and attributes
//! - [`FormatMatch::CompatibleWithGaps`]: same kind and sub-kind, every
//!   attribute present on both sides agrees, but some attributes are only
//!   present on one side
//! - [`FormatMatch::Incompatible`]: anything else
//!
//! ```rust
//! use topoloader::format::{FormatDescriptor, FormatMatch, PixelFormat};
//!
//! let full = FormatDescriptor::video_raw(PixelFormat::Nv12, 1920, 1080);
//! let partial = FormatDescriptor::video(PixelFormat::Nv12.into());
//!
//! assert_eq!(full.compare(&full.clone()), FormatMatch::Identical);
//! assert_eq!(full.compare(&partial), FormatMatch::CompatibleWithGaps);
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

// ============================================================================
// Kinds
// ============================================================================

/// Major kind of a media stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MajorType {
    /// Video frames (raw or compressed).
    Video,
    /// Audio samples (raw or compressed).
    Audio,
    /// Timed text.
    Subtitle,
    /// Opaque data stream.
    Data,
}

impl fmt::Display for MajorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Subtitle => "subtitle",
            Self::Data => "data",
        };
        f.write_str(name)
    }
}

/// Pixel formats (color space and memory layout).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub enum PixelFormat {
    /// YUV 4:2:0 planar.
    #[default]
    I420,
    /// YUV 4:2:0 semi-planar (Y plane, then interleaved UV plane).
    /// Common for hardware decoders.
    Nv12,
    /// YUV 4:2:0 semi-planar, 10-bit.
    P010,
    /// YUV 4:2:2 packed (Y0 U Y1 V).
    Yuyv,
    /// RGB 8-bit per channel, packed.
    Rgb24,
    /// RGBA 8-bit per channel, packed.
    Rgba,
    /// BGRA 8-bit per channel, packed.
    Bgra,
    /// 8-bit grayscale.
    Gray8,
}

/// Video codecs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VideoCodec {
    /// H.264 / AVC.
    H264,
    /// H.265 / HEVC.
    H265,
    /// VP8.
    Vp8,
    /// VP9.
    Vp9,
    /// AV1.
    Av1,
    /// MPEG-4 Part 2.
    Mpeg4,
}

/// Audio sample formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub enum SampleFormat {
    /// Signed 16-bit integer.
    #[default]
    S16,
    /// Signed 32-bit integer.
    S32,
    /// 32-bit floating point.
    F32,
    /// Unsigned 8-bit integer.
    U8,
}

/// Audio codecs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AudioCodec {
    /// AAC.
    Aac,
    /// MP3.
    Mp3,
    /// Opus.
    Opus,
    /// FLAC.
    Flac,
    /// Vorbis.
    Vorbis,
}

/// Sub-kind of a format.
///
/// Raw sub-kinds (pixel and sample formats) are what renderers consume;
/// compressed sub-kinds need a decoder in front of them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Subtype {
    /// Uncompressed video.
    Pixel(PixelFormat),
    /// Compressed video.
    VideoCodec(VideoCodec),
    /// Uncompressed audio.
    Sample(SampleFormat),
    /// Compressed audio.
    AudioCodec(AudioCodec),
    /// Anything else, identified by a four-character code.
    FourCc([u8; 4]),
}

impl Subtype {
    /// Whether this sub-kind carries compressed data.
    pub fn is_compressed(&self) -> bool {
        matches!(self, Self::VideoCodec(_) | Self::AudioCodec(_))
    }
}

impl From<PixelFormat> for Subtype {
    fn from(value: PixelFormat) -> Self {
        Self::Pixel(value)
    }
}

impl From<VideoCodec> for Subtype {
    fn from(value: VideoCodec) -> Self {
        Self::VideoCodec(value)
    }
}

impl From<SampleFormat> for Subtype {
    fn from(value: SampleFormat) -> Self {
        Self::Sample(value)
    }
}

impl From<AudioCodec> for Subtype {
    fn from(value: AudioCodec) -> Self {
        Self::AudioCodec(value)
    }
}

impl fmt::Display for Subtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pixel(p) => write!(f, "{p:?}"),
            Self::VideoCodec(c) => write!(f, "{c:?}"),
            Self::Sample(s) => write!(f, "{s:?}"),
            Self::AudioCodec(c) => write!(f, "{c:?}"),
            Self::FourCc(code) => write!(f, "{}", String::from_utf8_lossy(code)),
        }
    }
}

// ============================================================================
// Attributes
// ============================================================================

/// Frame rate as numerator/denominator.
///
/// Using a fraction allows exact representation of common framerates
/// like 29.97 fps (30000/1001).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Framerate {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (time units).
    pub den: u32,
}

impl Framerate {
    /// Create a new framerate.
    pub const fn new(num: u32, den: u32) -> Self {
        Self { num, den }
    }

    /// 25 fps (PAL).
    pub const FPS_25: Self = Self::new(25, 1);
    /// 30 fps.
    pub const FPS_30: Self = Self::new(30, 1);
    /// 60 fps.
    pub const FPS_60: Self = Self::new(60, 1);
    /// 29.97 fps (NTSC).
    pub const FPS_29_97: Self = Self::new(30000, 1001);
}

/// Key of a format attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttributeKey {
    /// Frame geometry ([`AttributeValue::Size`]).
    FrameSize,
    /// Frame rate ([`AttributeValue::Ratio`]).
    FrameRate,
    /// Pixel aspect ratio ([`AttributeValue::Ratio`]).
    PixelAspectRatio,
    /// Progressive vs interlaced ([`AttributeValue::Flag`]).
    Interlaced,
    /// Audio sample rate in Hz.
    SampleRate,
    /// Audio channel count.
    Channels,
    /// Average bitrate in bits per second.
    Bitrate,
    /// Out-of-band codec initialization data (SPS/PPS, AudioSpecificConfig).
    CodecData,
}

/// Value of a format attribute.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AttributeValue {
    /// Unsigned integer.
    UInt(u64),
    /// Width and height.
    Size {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
    },
    /// Rational value.
    Ratio(Framerate),
    /// Boolean flag.
    Flag(bool),
    /// Opaque bytes.
    Blob(Arc<[u8]>),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UInt(v) => write!(f, "{v}"),
            Self::Size { width, height } => write!(f, "{width}x{height}"),
            Self::Ratio(r) => write!(f, "{}/{}", r.num, r.den),
            Self::Flag(b) => write!(f, "{b}"),
            Self::Blob(bytes) => write!(f, "<{} bytes>", bytes.len()),
        }
    }
}

// ============================================================================
// FormatDescriptor
// ============================================================================

/// Outcome of comparing two format descriptors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FormatMatch {
    /// No conversion needed.
    Identical,
    /// Same kind, agreeing attributes, but some attributes only on one side.
    CompatibleWithGaps,
    /// An intermediate transform is needed.
    Incompatible,
}

/// The (major kind, sub-kind) pair used to query codec registries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeInfo {
    /// Major kind.
    pub major: MajorType,
    /// Sub-kind.
    pub subtype: Subtype,
}

impl TypeInfo {
    /// Create a new type info.
    pub fn new(major: MajorType, subtype: impl Into<Subtype>) -> Self {
        Self {
            major,
            subtype: subtype.into(),
        }
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.major, self.subtype)
    }
}

/// Immutable description of a data format.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FormatDescriptor {
    major: MajorType,
    subtype: Subtype,
    attributes: BTreeMap<AttributeKey, AttributeValue>,
}

impl FormatDescriptor {
    /// Create a descriptor with no attributes.
    pub fn new(major: MajorType, subtype: impl Into<Subtype>) -> Self {
        Self {
            major,
            subtype: subtype.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Video descriptor with no attributes.
    pub fn video(subtype: Subtype) -> Self {
        Self::new(MajorType::Video, subtype)
    }

    /// Audio descriptor with no attributes.
    pub fn audio(subtype: Subtype) -> Self {
        Self::new(MajorType::Audio, subtype)
    }

    /// Raw video with a frame size.
    pub fn video_raw(pixel_format: PixelFormat, width: u32, height: u32) -> Self {
        Self::video(pixel_format.into()).with_frame_size(width, height)
    }

    /// Compressed video with a frame size.
    pub fn video_encoded(codec: VideoCodec, width: u32, height: u32) -> Self {
        Self::video(codec.into()).with_frame_size(width, height)
    }

    /// Raw audio with sample rate and channel count.
    pub fn audio_raw(sample_format: SampleFormat, sample_rate: u32, channels: u16) -> Self {
        Self::audio(sample_format.into())
            .with_attribute(AttributeKey::SampleRate, AttributeValue::UInt(sample_rate.into()))
            .with_attribute(AttributeKey::Channels, AttributeValue::UInt(channels.into()))
    }

    /// Compressed audio with sample rate and channel count.
    pub fn audio_encoded(codec: AudioCodec, sample_rate: u32, channels: u16) -> Self {
        Self::audio(codec.into())
            .with_attribute(AttributeKey::SampleRate, AttributeValue::UInt(sample_rate.into()))
            .with_attribute(AttributeKey::Channels, AttributeValue::UInt(channels.into()))
    }

    /// Return a copy with an attribute set.
    pub fn with_attribute(mut self, key: AttributeKey, value: AttributeValue) -> Self {
        self.attributes.insert(key, value);
        self
    }

    /// Return a copy with the frame size set.
    pub fn with_frame_size(self, width: u32, height: u32) -> Self {
        self.with_attribute(AttributeKey::FrameSize, AttributeValue::Size { width, height })
    }

    /// Return a copy with the frame rate set.
    pub fn with_frame_rate(self, rate: Framerate) -> Self {
        self.with_attribute(AttributeKey::FrameRate, AttributeValue::Ratio(rate))
    }

    /// Major kind.
    pub fn major(&self) -> MajorType {
        self.major
    }

    /// Sub-kind.
    pub fn subtype(&self) -> Subtype {
        self.subtype
    }

    /// The (major, sub) pair for registry lookups.
    pub fn type_info(&self) -> TypeInfo {
        TypeInfo {
            major: self.major,
            subtype: self.subtype,
        }
    }

    /// Whether the sub-kind is compressed.
    pub fn is_compressed(&self) -> bool {
        self.subtype.is_compressed()
    }

    /// Look up an attribute.
    pub fn attribute(&self, key: AttributeKey) -> Option<&AttributeValue> {
        self.attributes.get(&key)
    }

    /// Iterate over attributes in key order.
    pub fn attributes(&self) -> impl Iterator<Item = (AttributeKey, &AttributeValue)> {
        self.attributes.iter().map(|(k, v)| (*k, v))
    }

    /// Frame size, if set.
    pub fn frame_size(&self) -> Option<(u32, u32)> {
        match self.attributes.get(&AttributeKey::FrameSize) {
            Some(AttributeValue::Size { width, height }) => Some((*width, *height)),
            _ => None,
        }
    }

    /// Compare against another descriptor.
    pub fn compare(&self, other: &FormatDescriptor) -> FormatMatch {
        if self.major != other.major || self.subtype != other.subtype {
            return FormatMatch::Incompatible;
        }

        let mut gaps = false;
        for (key, value) in &self.attributes {
            match other.attributes.get(key) {
                Some(theirs) if theirs == value => {}
                Some(_) => return FormatMatch::Incompatible,
                None => gaps = true,
            }
        }
        if other
            .attributes
            .keys()
            .any(|key| !self.attributes.contains_key(key))
        {
            gaps = true;
        }

        if gaps {
            FormatMatch::CompatibleWithGaps
        } else {
            FormatMatch::Identical
        }
    }

    /// Whether [`compare`](Self::compare) yields anything but `Incompatible`.
    pub fn is_compatible_with(&self, other: &FormatDescriptor) -> bool {
        self.compare(other) != FormatMatch::Incompatible
    }
}

impl fmt::Display for FormatDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.major, self.subtype)?;
        for (key, value) in &self.attributes {
            write!(f, " {key:?}={value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical() {
        let a = FormatDescriptor::video_raw(PixelFormat::I420, 1280, 720)
            .with_frame_rate(Framerate::FPS_30);
        let b = a.clone();
        assert_eq!(a.compare(&b), FormatMatch::Identical);
    }

    #[test]
    fn test_compatible_with_gaps_is_symmetric() {
        let full = FormatDescriptor::video_raw(PixelFormat::I420, 1280, 720)
            .with_frame_rate(Framerate::FPS_30);
        let partial = FormatDescriptor::video_raw(PixelFormat::I420, 1280, 720);

        assert_eq!(full.compare(&partial), FormatMatch::CompatibleWithGaps);
        assert_eq!(partial.compare(&full), FormatMatch::CompatibleWithGaps);
    }

    #[test]
    fn test_conflicting_attribute() {
        let a = FormatDescriptor::video_raw(PixelFormat::I420, 1280, 720);
        let b = FormatDescriptor::video_raw(PixelFormat::I420, 1920, 1080);
        assert_eq!(a.compare(&b), FormatMatch::Incompatible);
    }

    #[test]
    fn test_different_subtype() {
        let a = FormatDescriptor::video_raw(PixelFormat::I420, 1280, 720);
        let b = FormatDescriptor::video_raw(PixelFormat::Nv12, 1280, 720);
        assert_eq!(a.compare(&b), FormatMatch::Incompatible);
        assert!(!a.is_compatible_with(&b));
    }

    #[test]
    fn test_different_major() {
        let a = FormatDescriptor::new(MajorType::Video, Subtype::FourCc(*b"ABCD"));
        let b = FormatDescriptor::new(MajorType::Data, Subtype::FourCc(*b"ABCD"));
        assert_eq!(a.compare(&b), FormatMatch::Incompatible);
    }

    #[test]
    fn test_compressed() {
        assert!(FormatDescriptor::video_encoded(VideoCodec::H264, 640, 480).is_compressed());
        assert!(FormatDescriptor::audio_encoded(AudioCodec::Aac, 48000, 2).is_compressed());
        assert!(!FormatDescriptor::audio_raw(SampleFormat::F32, 48000, 2).is_compressed());
    }

    #[test]
    fn test_display() {
        let f = FormatDescriptor::video_raw(PixelFormat::Nv12, 640, 480);
        assert_eq!(f.to_string(), "video/Nv12 FrameSize=640x480");
        assert_eq!(f.type_info().to_string(), "video/Nv12");
    }

    #[test]
    fn test_frame_size_accessor() {
        let f = FormatDescriptor::video_encoded(VideoCodec::Vp9, 3840, 2160);
        assert_eq!(f.frame_size(), Some((3840, 2160)));
        assert_eq!(FormatDescriptor::audio(AudioCodec::Opus.into()).frame_size(), None);
    }
}
