use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use overlap::*;

fn hit_tests(c: &mut Criterion) {
    let config = CollisionConfig::default();
    let circle_a = Shape::Circle(Circle::new(1.0, 0.0, 0.0));
    let circle_b = Shape::Circle(Circle::new(1.0, 1.5, 0.2));
    let quad_a = Shape::Box(Quad::axis_aligned(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0)));
    let quad_b = Shape::Box(Quad::new(
        Vec2::ZERO,
        Vec2::new(1.0, 0.5),
        Affine2::from_angle_translation(0.3, Vec2::new(1.5, 0.2)),
    ));

    c.bench_function("circle circle hit", |b| b.iter(|| {
        black_box(&circle_a).hit_test(black_box(&circle_b), black_box(Vec2::new(0.1, 0.0)), &config)
    }));
    c.bench_function("circle box hit", |b| b.iter(|| {
        black_box(&circle_b).hit_test(black_box(&quad_a), black_box(Vec2::ZERO), &config)
    }));
    c.bench_function("box box hit", |b| b.iter(|| {
        black_box(&quad_a).hit_test(black_box(&quad_b), black_box(Vec2::new(0.1, 0.0)), &config)
    }));
}

fn manager_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("manager update");
    for n in [16u32, 64, 256] {
        let mut manager = CollisionManager::new(LayerRegistry::default(), &[], CollisionConfig::default()).unwrap();
        let mut scene = BodySet::new();
        let default = manager.layers().default_layer();

        // a loose grid, every other body overlapping its neighbour
        for i in 0..n {
            let pos = Vec2::new((i % 16) as Fp * 1.5, (i / 16) as Fp * 3.0);
            let body = scene.insert(pos);
            let desc = if i % 2 == 0 { ShapeDesc::circle(1.0) } else { ShapeDesc::quad(0.8, 0.8) };
            manager.attach(body, desc, default, i % 5 == 0).unwrap();
        }

        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| b.iter(|| {
            scene.begin_step();
            manager.update(&mut scene);
            scene.take_events().len()
        }));
    }
    group.finish();
}

criterion_group!(benches, hit_tests, manager_update);
criterion_main!(benches);
