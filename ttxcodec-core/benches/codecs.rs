use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ttxcodec_core::{
    triplet::mode, FormatId, FormatRegistry, LevelOnePage, PageSet, Triplet,
};

fn busy_page() -> LevelOnePage {
    let mut page = LevelOnePage::new();
    for row in 1..24 {
        for column in 0..40 {
            page.set_character(row, column, b'A' + ((row + column) % 26) as u8);
        }
    }
    for row in 1..24u8 {
        page.enhancements_mut()
            .append(Triplet::new(40 + row, mode::SET_ACTIVE_POSITION, 0))
            .unwrap();
        page.enhancements_mut()
            .append(Triplet::new(5, mode::G0_DIACRITICAL_FIRST + 2, b'e'))
            .unwrap();
    }
    page
}

fn bench_formats(c: &mut Criterion) {
    let registry = FormatRegistry::new();
    let mut set = PageSet::new(0x100);
    for _ in 0..8 {
        set.subpages.push(busy_page());
    }

    for id in FormatId::ALL {
        let format = registry.get(id).unwrap();
        let saved = format.save(&set);
        let mut group = c.benchmark_group(id.name());
        group.throughput(Throughput::Bytes(saved.data.len() as u64));

        group.bench_with_input(BenchmarkId::new("save", set.len()), &set, |b, set| {
            b.iter(|| format.save(black_box(set)));
        });
        group.bench_with_input(BenchmarkId::new("load", saved.data.len()), &saved.data, |b, data| {
            b.iter(|| format.load(black_box(data)).unwrap());
        });
        group.finish();
    }
}

fn bench_fingerprint(c: &mut Criterion) {
    let page = busy_page();
    c.bench_function("fingerprint", |b| b.iter(|| black_box(&page).fingerprint()));
}

criterion_group!(benches, bench_formats, bench_fingerprint);
criterion_main!(benches);
