//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use topoloader::caps::{CapabilityProvider, CapsRef, FormatList};
use topoloader::codec::{CodecFactory, FactoryRef, FnFactory, Transform, TransformHandle};
use topoloader::error::{FormatError, InstantiateError};
use topoloader::format::{
    AudioCodec, FormatDescriptor, PixelFormat, SampleFormat, VideoCodec,
};
use topoloader::topology::{Node, NodeId, StreamDescriptor, StreamSink};

static TRACING: Once = Once::new();

/// Install a test subscriber honoring `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn h264() -> FormatDescriptor {
    FormatDescriptor::video_encoded(VideoCodec::H264, 640, 480)
}

pub fn nv12() -> FormatDescriptor {
    FormatDescriptor::video_raw(PixelFormat::Nv12, 640, 480)
}

pub fn i420() -> FormatDescriptor {
    FormatDescriptor::video_raw(PixelFormat::I420, 640, 480)
}

pub fn rgba() -> FormatDescriptor {
    FormatDescriptor::video_raw(PixelFormat::Rgba, 640, 480)
}

pub fn mp3() -> FormatDescriptor {
    FormatDescriptor::audio_encoded(AudioCodec::Mp3, 44_100, 2)
}

pub fn pcm_44k() -> FormatDescriptor {
    FormatDescriptor::audio_raw(SampleFormat::S16, 44_100, 2)
}

pub fn float_48k() -> FormatDescriptor {
    FormatDescriptor::audio_raw(SampleFormat::F32, 48_000, 2)
}

/// Sink accepting a fixed list of formats.
pub struct TestSink {
    caps: CapsRef,
    hardware: bool,
}

impl TestSink {
    pub fn new(formats: Vec<FormatDescriptor>) -> Self {
        Self {
            caps: FormatList::new(formats).into_ref(),
            hardware: false,
        }
    }

    pub fn hardware(mut self) -> Self {
        self.hardware = true;
        self
    }
}

impl StreamSink for TestSink {
    fn caps(&self) -> CapsRef {
        self.caps.clone()
    }

    fn hardware_resident(&self) -> bool {
        self.hardware
    }
}

/// 1-in/1-out codec over fixed input and output format lists.
pub struct TestCodec {
    name: String,
    input: CapsRef,
    output: CapsRef,
}

impl Transform for TestCodec {
    fn name(&self) -> &str {
        &self.name
    }

    fn input_caps(&self, index: usize) -> Option<CapsRef> {
        (index == 0).then(|| self.input.clone())
    }

    fn output_caps(&self, index: usize) -> Option<CapsRef> {
        (index == 0).then(|| self.output.clone())
    }
}

/// Factory producing a fresh [`TestCodec`] per instantiation.
pub fn codec(
    name: &'static str,
    inputs: Vec<FormatDescriptor>,
    outputs: Vec<FormatDescriptor>,
) -> FactoryRef {
    FnFactory::new(name, move || {
        Ok(Arc::new(TestCodec {
            name: name.to_string(),
            input: FormatList::new(inputs.clone()).into_ref(),
            output: FormatList::new(outputs.clone()).into_ref(),
        }) as TransformHandle)
    })
    .into_ref()
}

/// Factory whose instantiation always fails.
pub fn broken(name: &'static str) -> FactoryRef {
    FnFactory::new(name, move || Err(InstantiateError::new(name, "device lost"))).into_ref()
}

/// Factory wrapper counting instantiations.
pub struct Counting {
    inner: FactoryRef,
    calls: AtomicUsize,
}

impl Counting {
    pub fn new(inner: FactoryRef) -> Arc<Self> {
        Arc::new(Self {
            inner,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CodecFactory for Counting {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn instantiate(&self) -> Result<TransformHandle, InstantiateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.instantiate()
    }
}

/// Provider listing formats it refuses to configure.
pub struct Refusing {
    formats: Vec<FormatDescriptor>,
    refused: FormatDescriptor,
    inner: FormatList,
}

impl Refusing {
    pub fn new(formats: Vec<FormatDescriptor>, refused: FormatDescriptor) -> Self {
        Self {
            inner: FormatList::new(formats.clone()),
            formats,
            refused,
        }
    }
}

impl CapabilityProvider for Refusing {
    fn list_formats(&self) -> Vec<FormatDescriptor> {
        self.formats.clone()
    }

    fn is_compatible(&self, format: &FormatDescriptor) -> bool {
        self.inner.is_compatible(format)
    }

    fn current(&self) -> Option<FormatDescriptor> {
        self.inner.current()
    }

    fn set_current(&self, format: &FormatDescriptor) -> Result<(), FormatError> {
        if *format == self.refused {
            return Err(FormatError::Rejected {
                format: format.to_string(),
            });
        }
        self.inner.set_current(format)
    }
}

/// Source node offering `formats`, none current.
pub fn source(id: u64, formats: Vec<FormatDescriptor>) -> Node {
    Node::source(
        NodeId(id),
        StreamDescriptor::new(0, FormatList::new(formats).into_ref()),
    )
}

/// Output node accepting `formats`.
pub fn sink(id: u64, formats: Vec<FormatDescriptor>) -> Node {
    Node::output(NodeId(id), Arc::new(TestSink::new(formats)))
}
