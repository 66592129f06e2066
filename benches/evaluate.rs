use criterion::{black_box, criterion_group, criterion_main, Criterion};
use a11yql::{parse_rules, KindMap, RuleSet, RuleSetBuilder, WidgetNode, WidgetTree};

/// `n` rules, each reading a distinct property and walking the children.
fn rules_source(n: usize) -> String {
    (0..n)
        .map(|i| {
            format!(
                r#"rule "r{i}" on role(button) || kind(input) {{
    meta {{ severity: "warning" }}
    when: enabled && !hidden
    ensure: prop("p{i}").is_resolved && (p{i} >= 1 || children.any(focusable))
    report: "rule {i} failed"
}}
"#
            )
        })
        .collect()
}

fn build_ruleset(n: usize) -> RuleSet {
    RuleSetBuilder::new()
        .kinds(KindMap::new().with_kind("input", ["textField"]))
        .source(&rules_source(n))
        .try_build()
        .unwrap()
}

/// A balanced tree with `fanout` children per node, `depth` levels deep.
fn build_tree(fanout: usize, depth: usize, props: usize) -> WidgetTree {
    fn node(fanout: usize, depth: usize, props: usize) -> WidgetNode {
        let widget = (0..props).fold(
            WidgetNode::new("button", "ElevatedButton")
                .tap(true)
                .focusable(depth % 2 == 0),
            |w, i| w.set(&format!("p{i}"), 10_i64),
        );
        if depth == 0 {
            widget
        } else {
            widget.children((0..fanout).map(|_| node(fanout, depth - 1, props)))
        }
    }
    WidgetTree::new(node(fanout, depth, props))
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    for &n in &[5, 20, 50] {
        let source = rules_source(n);
        group.bench_function(&format!("{n}_rules"), |b| {
            b.iter(|| parse_rules(black_box(&source)));
        });
    }

    group.finish();
}

fn bench_single_node(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_node");

    for &n in &[5, 20, 50] {
        let ruleset = build_ruleset(n);
        let tree = build_tree(4, 1, n);
        let root = tree.root();
        group.bench_function(&format!("{n}_rules"), |b| {
            b.iter(|| ruleset.check(black_box(&root)));
        });
    }

    group.finish();
}

fn bench_audit_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("audit_tree");
    let ruleset = build_ruleset(10);

    for &(fanout, depth) in &[(2, 4), (4, 4), (8, 3)] {
        let tree = build_tree(fanout, depth, 10);
        group.bench_function(&format!("{}_nodes", tree.len()), |b| {
            b.iter(|| ruleset.audit_tree(black_box(tree.root())));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse, bench_single_node, bench_audit_tree);
criterion_main!(benches);
