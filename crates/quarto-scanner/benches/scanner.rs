use criterion::{Criterion, criterion_group, criterion_main};
use quarto_scanner::{ScanSession, Scanner};

fn generate_prose(paragraphs: usize) -> String {
    let base = "Some *emphasis* and **strong** text with snake_case_names,\n\
                an escaped \\* star, __underscored__ and ***both*** at once.\n  \
                A *dangling opener and a closer* later.\n\n";
    base.repeat(paragraphs)
}

fn bench_session(c: &mut Criterion) {
    let mut group = c.benchmark_group("session");
    group.sample_size(10);

    let scanner = Scanner::default();
    let content = generate_prose(200);

    group.bench_function("tokenize", |b| {
        b.iter(|| {
            let count = ScanSession::new(&scanner, std::hint::black_box(&content)).count();
            std::hint::black_box(count);
        });
    });

    group.bench_function("snapshot_every_lexeme", |b| {
        b.iter(|| {
            let mut session = ScanSession::new(&scanner, std::hint::black_box(&content));
            while session.next().is_some() {
                std::hint::black_box(session.snapshot().ok());
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_session);
criterion_main!(benches);
