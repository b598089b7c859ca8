use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use fluoro_analysis_rs::microscopy::raster::ChannelPlane;
use fluoro_analysis_rs::microscopy::segmentation::{SegmentationModel, SegmentationRequest, Segmenter};

/// Grid of bright square cells on a dim background.
fn generate_cell_plane(size: usize, cell: usize) -> ChannelPlane {
    let pitch = cell * 2;
    let data = (0..size * size)
        .map(|i| {
            let (x, y) = (i % size, i / size);
            if x % pitch < cell && y % pitch < cell { 200 } else { 20 }
        })
        .collect();
    ChannelPlane::new(size, size, data).unwrap()
}

fn benchmark_models(c: &mut Criterion) {
    let mut group = c.benchmark_group("segmentation_models");
    let plane = generate_cell_plane(512, 12);

    for model in [
        SegmentationModel::Cellpose,
        SegmentationModel::StarDist,
        SegmentationModel::Threshold,
        SegmentationModel::UNet,
    ] {
        let segmenter = Segmenter::new(SegmentationRequest::new(model.default_params()));
        group.bench_with_input(BenchmarkId::from_parameter(model), &plane, |b, plane| {
            b.iter(|| segmenter.segment(black_box(plane)));
        });
    }

    group.finish();
}

fn benchmark_single_region(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_region_by_size");
    group.sample_size(10);

    for size in [512, 1024, 2048] {
        let plane = ChannelPlane::filled(size, size, 255);
        let segmenter = Segmenter::new(
            SegmentationRequest::new(SegmentationModel::Threshold.default_params()).with_opening_kernel(1),
        );
        group.bench_with_input(BenchmarkId::from_parameter(size), &plane, |b, plane| {
            b.iter(|| segmenter.segment(black_box(plane)));
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_models, benchmark_single_region);
criterion_main!(benches);
