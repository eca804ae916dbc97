use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kdvote::{KDTree, Point};
use rand::{thread_rng, Rng};

fn random_points(count: usize) -> Vec<(Point<2>, u8)> {
    let mut rng = thread_rng();
    (0..count)
        .map(|_| {
            (
                Point::new([
                    rng.gen_range(-100000.0..100000.0),
                    rng.gen_range(-100000.0..100000.0),
                ]),
                rng.gen_range(0..10),
            )
        })
        .collect()
}

fn build_bench(c: &mut Criterion) {
    let points = black_box(random_points(10000));
    c.bench_function("kdtree_build_10000", |b| {
        b.iter(|| points.iter().cloned().collect::<KDTree<2, u8>>())
    });
}

fn knn_bench(c: &mut Criterion) {
    let points = random_points(10000);
    let tree: KDTree<2, u8> = points.iter().cloned().collect();
    let mut rng = thread_rng();
    let mut needles = Vec::with_capacity(100);
    for _ in 0..needles.capacity() {
        needles.push(points[rng.gen_range(0..points.len())].0)
    }
    let needles = black_box(needles);
    c.bench_function("kdtree_knn_value_k50", |b| {
        b.iter(|| {
            for needle in needles.iter() {
                tree.knn_value(needle, 50);
            }
        })
    });
    c.bench_function("kdtree_nearest_neighbor", |b| {
        b.iter(|| {
            for needle in needles.iter() {
                tree.nearest_neighbor(needle);
            }
        })
    });
}

criterion_group!(benches, build_bench, knn_bench);
criterion_main!(benches);
