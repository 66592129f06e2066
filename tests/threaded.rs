use std::sync::Arc;
use std::thread;

use a11yql::{
    AuditReport, Interpreter, KindMap, Rule, RuleSet, RuleSetBuilder, WidgetNode, WidgetTree,
};

const RULES: &str = r#"
rule "action_focusable" on kind(action) {
    when: enabled
    ensure: focusable
    report: "Actions must be focusable"
}

rule "label_present" on role(button) || role(image) {
    ensure: prop("label").is_resolved || merges_descendants
    report: "Needs a label"
}

rule "checkbox_state" on role(checkbox) {
    ensure: checked || !toggled
    report: "Toggled checkboxes report checked"
}
"#;

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn shared_types_are_send_and_sync() {
    assert_send_sync::<Rule>();
    assert_send_sync::<RuleSet>();
    assert_send_sync::<Interpreter>();
    assert_send_sync::<KindMap>();
    assert_send_sync::<WidgetTree>();
    assert_send_sync::<AuditReport>();
}

fn screen(buttons: usize, labelled: bool) -> WidgetTree {
    WidgetTree::new(
        WidgetNode::new("column", "Column").children((0..buttons).map(|i| {
            let button = WidgetNode::new("button", "ElevatedButton")
                .tap(true)
                .focusable(i % 2 == 0);
            if labelled {
                button.set("label", format!("Button {i}"))
            } else {
                button
            }
        })),
    )
}

#[test]
fn audit_across_threads() {
    let ruleset = Arc::new(
        RuleSetBuilder::new()
            .kinds(KindMap::new().with_kind("action", ["button"]))
            .source(RULES)
            .try_build()
            .unwrap(),
    );

    let mut handles = vec![];

    // Thread 1: labelled buttons, half unfocusable
    let rs = Arc::clone(&ruleset);
    handles.push(thread::spawn(move || {
        let tree = screen(10, true);
        rs.audit_tree(tree.root())
    }));

    // Thread 2: unlabelled buttons fail both rules where unfocusable
    let rs = Arc::clone(&ruleset);
    handles.push(thread::spawn(move || {
        let tree = screen(10, false);
        rs.audit_tree(tree.root())
    }));

    // Thread 3: an empty screen
    let rs = Arc::clone(&ruleset);
    handles.push(thread::spawn(move || {
        let tree = screen(0, false);
        rs.audit_tree(tree.root())
    }));

    let reports: Vec<AuditReport> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(reports[0].violations().len(), 5);
    assert!(reports[0]
        .violations()
        .iter()
        .all(|v| v.rule == "action_focusable"));
    assert_eq!(reports[1].violations().len(), 15);
    assert_eq!(reports[1].violations_of("label_present").count(), 10);
    assert!(reports[2].is_clean());
    assert!(reports.iter().all(|r| r.faults().is_empty()));
}

#[test]
fn shared_tree_and_ruleset_agree_across_threads() {
    let ruleset = Arc::new(
        RuleSetBuilder::new()
            .kinds(KindMap::new().with_kind("action", ["button"]))
            .source(RULES)
            .build(),
    );
    let tree = Arc::new(screen(64, false));
    let expected = ruleset.audit_tree(tree.root());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let rs = Arc::clone(&ruleset);
            let tree = Arc::clone(&tree);
            thread::spawn(move || rs.audit(tree.nodes()).violations().to_vec())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected.violations());
    }
}
