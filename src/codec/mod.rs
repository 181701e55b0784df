//! Codec plugins: instances, factories and registries.
//!
//! The resolver never constructs codecs itself. It asks a [`CodecRegistry`]
//! for the factories that can bridge a format gap, instantiates them
//! through [`CodecFactory`], and wires the resulting [`Transform`] into the
//! output topology.
//!
//! ```text
//! CodecRegistry::enumerate(category, input, output)
//!        │
//!        ▼
//!   [CodecFactory, CodecFactory, ...]   (registry order)
//!        │ instantiate()
//!        ▼
//!   TransformHandle ── input_caps(i) / output_caps(i)
//! ```

mod copier;
mod registry;

pub use copier::SampleCopier;
pub use registry::StaticCodecRegistry;

use crate::caps::CapsRef;
use crate::error::InstantiateError;
use crate::format::{MajorType, TypeInfo};
use std::fmt;
use std::sync::Arc;

/// Shared handle to an instantiated codec.
pub type TransformHandle = Arc<dyn Transform>;

/// Shared handle to a codec factory.
pub type FactoryRef = Arc<dyn CodecFactory>;

/// An instantiated codec (decoder, converter, effect, copier).
///
/// Stream indices are zero-based and dense.
pub trait Transform: Send + Sync {
    /// Human-readable name.
    fn name(&self) -> &str;

    /// Number of input streams.
    fn input_count(&self) -> usize {
        1
    }

    /// Number of output streams.
    fn output_count(&self) -> usize {
        1
    }

    /// Capability provider of an input stream.
    fn input_caps(&self, index: usize) -> Option<CapsRef>;

    /// Capability provider of an output stream.
    fn output_caps(&self, index: usize) -> Option<CapsRef>;

    /// Whether the codec keeps its output in hardware memory.
    fn hardware_resident(&self) -> bool {
        false
    }
}

/// Creates codec instances.
pub trait CodecFactory: Send + Sync {
    /// Name of the codec this factory produces.
    fn name(&self) -> &str;

    /// Create a new instance.
    ///
    /// May block (hardware initialization); the resolver treats it as a
    /// synchronous, non-cancelable call.
    fn instantiate(&self) -> Result<TransformHandle, InstantiateError>;
}

type BuildFn = dyn Fn() -> Result<TransformHandle, InstantiateError> + Send + Sync;

/// [`CodecFactory`] backed by a closure.
#[derive(Clone)]
pub struct FnFactory {
    name: String,
    build: Arc<BuildFn>,
}

impl FnFactory {
    /// Create a factory from a name and a constructor.
    pub fn new<F>(name: impl Into<String>, build: F) -> Self
    where
        F: Fn() -> Result<TransformHandle, InstantiateError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            build: Arc::new(build),
        }
    }

    /// Wrap into a shared handle.
    pub fn into_ref(self) -> FactoryRef {
        Arc::new(self)
    }
}

impl CodecFactory for FnFactory {
    fn name(&self) -> &str {
        &self.name
    }

    fn instantiate(&self) -> Result<TransformHandle, InstantiateError> {
        (self.build)()
    }
}

impl fmt::Debug for FnFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnFactory")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Processing category used to query a registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CodecCategory {
    /// Compressed video to raw video.
    VideoDecoder,
    /// Raw video to raw video (scaling, color conversion).
    VideoProcessor,
    /// Compressed audio to raw audio.
    AudioDecoder,
    /// Raw audio to raw audio (resampling, channel mixing).
    AudioEffect,
}

impl CodecCategory {
    /// Converter category for a major kind.
    pub fn converter_for(major: MajorType) -> Option<Self> {
        match major {
            MajorType::Video => Some(Self::VideoProcessor),
            MajorType::Audio => Some(Self::AudioEffect),
            MajorType::Subtitle | MajorType::Data => None,
        }
    }

    /// Decoder category for a major kind.
    pub fn decoder_for(major: MajorType) -> Option<Self> {
        match major {
            MajorType::Video => Some(Self::VideoDecoder),
            MajorType::Audio => Some(Self::AudioDecoder),
            MajorType::Subtitle | MajorType::Data => None,
        }
    }

    /// Whether this is a decoder category.
    pub fn is_decoder(&self) -> bool {
        matches!(self, Self::VideoDecoder | Self::AudioDecoder)
    }
}

impl fmt::Display for CodecCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::VideoDecoder => "video-decoder",
            Self::VideoProcessor => "video-processor",
            Self::AudioDecoder => "audio-decoder",
            Self::AudioEffect => "audio-effect",
        };
        f.write_str(name)
    }
}

/// Source of codec factories.
///
/// Injected into the resolver; tests supply fixed candidate lists.
pub trait CodecRegistry: Send + Sync {
    /// Factories of `category` accepting `input` and producing `output`.
    ///
    /// A `None` constraint matches anything. The returned order is the
    /// order in which candidates are tried.
    fn enumerate(
        &self,
        category: CodecCategory,
        input: Option<&TypeInfo>,
        output: Option<&TypeInfo>,
    ) -> Vec<FactoryRef>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_by_major() {
        assert_eq!(
            CodecCategory::converter_for(MajorType::Video),
            Some(CodecCategory::VideoProcessor)
        );
        assert_eq!(
            CodecCategory::converter_for(MajorType::Audio),
            Some(CodecCategory::AudioEffect)
        );
        assert_eq!(
            CodecCategory::decoder_for(MajorType::Video),
            Some(CodecCategory::VideoDecoder)
        );
        assert_eq!(CodecCategory::decoder_for(MajorType::Data), None);
        assert!(CodecCategory::AudioDecoder.is_decoder());
        assert!(!CodecCategory::AudioEffect.is_decoder());
    }

    #[test]
    fn test_fn_factory() {
        let factory = FnFactory::new("broken", || Err(InstantiateError::new("broken", "no device")));
        assert_eq!(factory.name(), "broken");
        let err = factory.instantiate().err().unwrap();
        assert_eq!(err.reason, "no device");
    }
}
