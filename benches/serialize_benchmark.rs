//! Benchmarks for PDF assembly and serialization.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use slidepdf::detect_image_from_bytes;
use slidepdf::pdf::{ColorMode, Document, Metadata, PageSize, RasterImage};

/// Creates a JPEG-shaped payload of roughly `size` bytes.
fn synthetic_jpeg(width: u16, height: u16, size: usize) -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
    data.extend_from_slice(b"JFIF\0\x01\x01\0\0\x01\0\x01\0\0");
    data.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x11, 0x08]);
    data.extend_from_slice(&height.to_be_bytes());
    data.extend_from_slice(&width.to_be_bytes());
    data.push(3);
    data.extend_from_slice(&[1, 0x11, 0, 2, 0x11, 0, 3, 0x11, 0]);
    data.resize(size.max(data.len()), 0x5A);
    data.extend_from_slice(&[0xFF, 0xD9]);
    data
}

fn build_document(pages: usize, image: &[u8]) -> Document {
    let mut doc = Document::with_metadata(&Metadata::new().with_title("Benchmark").without_dates());
    for _ in 0..pages {
        doc.add_image(
            RasterImage::jpeg(ColorMode::Rgb, 1024, 768, image.to_vec()),
            PageSize::from_pixels(1024, 768, 72.0),
        );
    }
    doc
}

fn bench_serialize(c: &mut Criterion) {
    let image = synthetic_jpeg(1024, 768, 64 * 1024);
    let mut group = c.benchmark_group("serialize");

    for pages in [1usize, 10, 50] {
        let doc = build_document(pages, &image);
        group.throughput(Throughput::Bytes((pages * image.len()) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(pages), &doc, |b, doc| {
            b.iter(|| black_box(doc.serialize()))
        });
    }

    group.finish();
}

fn bench_build(c: &mut Criterion) {
    let image = synthetic_jpeg(1024, 768, 64 * 1024);

    c.bench_function("build_50_pages", |b| {
        b.iter(|| black_box(build_document(50, &image)))
    });
}

fn bench_detect(c: &mut Criterion) {
    let image = synthetic_jpeg(1920, 1080, 256 * 1024);

    c.bench_function("detect_jpeg_header", |b| {
        b.iter(|| black_box(detect_image_from_bytes(black_box(&image))))
    });
}

criterion_group!(benches, bench_serialize, bench_build, bench_detect);
criterion_main!(benches);
