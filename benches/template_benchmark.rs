use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use tagpage::TemplateEngine;

const SHELL: &str = "<!DOCTYPE html><html><head><title>{TITLE}</title>\
    {ADMINSTYLESHEET}<link href=\"{BASEURL}{ADMINFOLDER}admin.css\">{/ADMINSTYLESHEET}\
    {EXTRASTYLESHEETS}{/EXTRASTYLESHEETS}</head>\
    <body><main>{PAGE}</main><footer>{THISYEAR}</footer></body></html>";

fn parse_tags_benchmark(c: &mut Criterion) {
    let engine = TemplateEngine::new();
    let tags = [
        ("{TITLE}", "TagPage :: Home"),
        ("{PAGE}", "<h1>Welcome</h1><p>{BASEURL}</p>"),
        ("{BASEURL}", "http://localhost:7878/"),
        ("{THISYEAR}", "2026"),
        ("{ADMINFOLDER}", "admin/"),
    ];

    c.bench_function("parse_tags_shell", |b| {
        b.iter(|| {
            let mut output = black_box(SHELL.to_string());
            engine.parse_tags(&tags, &mut output);
        });
    });
}

fn parse_tags_page_size_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_tags_page_size");
    let engine = TemplateEngine::new();
    let tags = [("{BASEURL}", "http://localhost:7878/"), ("{THISYEAR}", "2026")];

    for repeat in [1, 10, 100].iter() {
        let page = "<a href=\"{BASEURL}x\">link</a> &copy; {THISYEAR} ".repeat(*repeat);
        group.bench_with_input(BenchmarkId::from_parameter(repeat), &page, |b, page| {
            b.iter(|| {
                let mut output = black_box(page.clone());
                engine.parse_tags(&tags, &mut output);
            });
        });
    }

    group.finish();
}

fn logic_tag_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("logic_tag");
    let engine = TemplateEngine::new();

    group.bench_function("remove_logic_tag", |b| {
        b.iter(|| {
            let mut output = black_box(SHELL.to_string());
            engine.remove_logic_tag("{ADMINSTYLESHEET}", "{/ADMINSTYLESHEET}", &mut output);
            engine.remove_logic_tag("{EXTRASTYLESHEETS}", "{/EXTRASTYLESHEETS}", &mut output);
        });
    });

    group.bench_function("logic_tag", |b| {
        b.iter(|| {
            let _ = engine.logic_tag("{ADMINSTYLESHEET}", "{/ADMINSTYLESHEET}", black_box(SHELL));
        });
    });

    group.bench_function("remove_tags", |b| {
        b.iter(|| {
            let mut output = black_box(SHELL.to_string());
            engine.remove_tags(&["{ADMINSTYLESHEET}", "{/ADMINSTYLESHEET}"], &mut output);
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    parse_tags_benchmark,
    parse_tags_page_size_benchmark,
    logic_tag_benchmark
);
criterion_main!(benches);
