use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use gsp_decoder::{DecoderConfig, decode_fragments};
use gsp_encoder::GspEncoder;
use gsp_tests::module_transcript;

fn fragments(text: &str, size: usize) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    while start < text.len() {
        let mut end = (start + size).min(text.len());
        while !text.is_char_boundary(end) {
            end += 1;
        }
        out.push(&text[start..end]);
        start = end;
    }
    out
}

fn bench_decode_module(c: &mut Criterion) {
    let text = module_transcript();

    c.bench_function("decode_module_whole", |b| {
        b.iter(|| decode_fragments([black_box(text.as_str())], DecoderConfig::default()));
    });
}

fn bench_fragment_sizes(c: &mut Criterion) {
    let content = "    public function hookDisplayHome($params) { return ''; }\n".repeat(400);
    let text = GspEncoder::new()
        .plan(["1. a", "2. b", "3. c"])
        .add_artifact("Big/Big.php", &content)
        .add_artifact("Big/config.xml", "<module/>")
        .success("done")
        .encode()
        .unwrap();

    let mut group = c.benchmark_group("decode_fragment_size");
    group.throughput(Throughput::Bytes(text.len() as u64));

    for size in [1usize, 16, 256, 4096] {
        let chunks = fragments(&text, size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &chunks, |b, chunks| {
            b.iter(|| decode_fragments(chunks.iter().copied(), DecoderConfig::default()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_decode_module, bench_fragment_sizes);
criterion_main!(benches);
