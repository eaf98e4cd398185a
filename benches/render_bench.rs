use criterion::{criterion_group, criterion_main, Criterion};
use mindsnap::{render_page, transform, RenderRequest};

fn sample_markdown() -> String {
    let mut markdown = String::from("# Root\n\n");
    for branch in 0..12 {
        markdown.push_str(&format!("## Branch {branch}\n\n"));
        for leaf in 0..8 {
            markdown.push_str(&format!("- leaf {branch}-{leaf} with *some* inline `markup`\n"));
        }
        markdown.push('\n');
    }
    markdown
}

fn bench_transform(c: &mut Criterion) {
    let markdown = sample_markdown();
    c.bench_function("transform", |b| {
        b.iter(|| transform(&markdown))
    });
}

fn bench_render_page(c: &mut Criterion) {
    let request = RenderRequest {
        markdown: sample_markdown(),
        ..Default::default()
    };
    c.bench_function("render_page", |b| {
        b.iter(|| render_page(&request).unwrap())
    });
}

criterion_group!(benches, bench_transform, bench_render_page);
criterion_main!(benches);
