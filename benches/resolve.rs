//! Benchmarks for topology resolution.
//!
//! Run with:
//!   cargo bench -- resolve

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::sync::Arc;
use topoloader::caps::{CapsRef, FormatList};
use topoloader::codec::{
    CodecCategory, FactoryRef, FnFactory, StaticCodecRegistry, Transform, TransformHandle,
};
use topoloader::format::{FormatDescriptor, PixelFormat, VideoCodec};
use topoloader::topology::{Node, NodeId, StreamDescriptor, StreamSink, Topology};
use topoloader::resolve::{LoaderConfig, TopologyLoader};

/// Number of independent source -> output branches
const WIDTHS: &[usize] = &[1, 8, 32, 128];

struct Codec {
    input: CapsRef,
    output: CapsRef,
}

impl Transform for Codec {
    fn name(&self) -> &str {
        "bench-codec"
    }

    fn input_caps(&self, index: usize) -> Option<CapsRef> {
        (index == 0).then(|| self.input.clone())
    }

    fn output_caps(&self, index: usize) -> Option<CapsRef> {
        (index == 0).then(|| self.output.clone())
    }
}

struct Sink(CapsRef);

impl StreamSink for Sink {
    fn caps(&self) -> CapsRef {
        self.0.clone()
    }
}

fn h264() -> FormatDescriptor {
    FormatDescriptor::video_encoded(VideoCodec::H264, 1920, 1080)
}

fn nv12() -> FormatDescriptor {
    FormatDescriptor::video_raw(PixelFormat::Nv12, 1920, 1080)
}

fn rgba() -> FormatDescriptor {
    FormatDescriptor::video_raw(PixelFormat::Rgba, 1920, 1080)
}

fn factory(name: &'static str, input: FormatDescriptor, output: FormatDescriptor) -> FactoryRef {
    FnFactory::new(name, move || {
        Ok(Arc::new(Codec {
            input: FormatList::new(vec![input.clone()]).into_ref(),
            output: FormatList::new(vec![output.clone()]).into_ref(),
        }) as TransformHandle)
    })
    .into_ref()
}

fn registry() -> StaticCodecRegistry {
    let mut registry = StaticCodecRegistry::new();
    // Dead ends first so every branch backtracks once per stage
    registry.register(
        CodecCategory::VideoDecoder,
        vec![],
        vec![],
        factory("vp9dec", FormatDescriptor::video_encoded(VideoCodec::Vp9, 1920, 1080), nv12()),
    );
    registry.register(
        CodecCategory::VideoDecoder,
        vec![],
        vec![],
        factory("h264dec", h264(), nv12()),
    );
    registry.register(
        CodecCategory::VideoProcessor,
        vec![],
        vec![],
        factory("nv12-to-i420", nv12(), FormatDescriptor::video_raw(PixelFormat::I420, 1920, 1080)),
    );
    registry.register(
        CodecCategory::VideoProcessor,
        vec![],
        vec![],
        factory("nv12-to-rgba", nv12(), rgba()),
    );
    registry
}

fn topology(width: usize) -> Topology {
    let mut topo = Topology::new();
    for i in 0..width as u64 {
        let (src, sink) = (NodeId(2 * i + 1), NodeId(2 * i + 2));
        let caps = FormatList::new(vec![h264()]).into_ref();
        topo.add_node(Node::source(src, StreamDescriptor::new(0, caps)))
            .unwrap();
        let sink_caps = FormatList::new(vec![rgba()]).into_ref();
        topo.add_node(Node::output(sink, Arc::new(Sink(sink_caps))))
            .unwrap();
        topo.connect(src, 0, sink, 0).unwrap();
    }
    topo
}

fn bench_decode_and_convert(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_decode_convert");
    let loader = TopologyLoader::new(Arc::new(registry()));

    for &width in WIDTHS {
        group.throughput(Throughput::Elements(width as u64));

        group.bench_with_input(BenchmarkId::new("branches", width), &width, |b, &width| {
            b.iter_batched(
                || topology(width),
                |input| std::hint::black_box(loader.resolve(&input).unwrap()),
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_direct(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_direct");
    let loader = TopologyLoader::new(Arc::new(StaticCodecRegistry::new()))
        .with_config(LoaderConfig::default().with_insert_copiers(false));

    for &width in WIDTHS {
        group.throughput(Throughput::Elements(width as u64));

        group.bench_with_input(BenchmarkId::new("branches", width), &width, |b, &width| {
            b.iter_batched(
                || {
                    let mut topo = Topology::new();
                    for i in 0..width as u64 {
                        let (src, sink) = (NodeId(2 * i + 1), NodeId(2 * i + 2));
                        let caps = FormatList::new(vec![nv12()]).into_ref();
                        topo.add_node(Node::source(src, StreamDescriptor::new(0, caps)))
                            .unwrap();
                        let sink_caps = FormatList::new(vec![nv12()]).into_ref();
                        topo.add_node(Node::output(sink, Arc::new(Sink(sink_caps))))
                            .unwrap();
                        topo.connect(src, 0, sink, 0).unwrap();
                    }
                    topo
                },
                |input| std::hint::black_box(loader.resolve(&input).unwrap()),
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_decode_and_convert, bench_direct);

criterion_main!(benches);
