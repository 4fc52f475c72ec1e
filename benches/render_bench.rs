//! 渲染性能基准测试
//!
//! 测试场景合成与角点重算的性能。
//! 运行: `cargo bench --bench render_bench`

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use scene_canvas::object::shapes;
use scene_canvas::StaticCanvas;

/// 测试整场重绘的性能
fn bench_render_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("StaticCanvas renderAll");

    for count in [10usize, 100, 500] {
        let mut canvas = StaticCanvas::new(800, 600).unwrap();
        for i in 0..count {
            let x = (i % 40) as f64 * 20.0 + 10.0;
            let y = (i / 40) as f64 * 20.0 + 10.0;
            canvas.add(shapes::rect(x, y, 16.0, 16.0));
        }
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| {
                canvas.render_all();
                black_box(canvas.take_events().len())
            });
        });
    }
    group.finish();
}

/// 测试角点缓存重算的性能
fn bench_set_coords(c: &mut Criterion) {
    let mut obj = shapes::rect(100.0, 100.0, 50.0, 50.0);
    obj.set_angle(30.0);

    c.bench_function("SceneObject set_coords", |b| {
        b.iter(|| {
            obj.set_coords();
            black_box(obj.corner_coords().is_some())
        });
    });
}

/// 测试命中测试的性能
fn bench_contains_point(c: &mut Criterion) {
    let mut obj = shapes::rect(100.0, 100.0, 50.0, 50.0);
    obj.set_angle(45.0);
    obj.set_coords();

    c.bench_function("SceneObject contains_point", |b| {
        b.iter(|| black_box(obj.contains_point(black_box(110.0), black_box(95.0))));
    });
}

criterion_group!(
    benches,
    bench_render_all,
    bench_set_coords,
    bench_contains_point
);
criterion_main!(benches);
