use lazyfield::{analyze, analyze_source, parse_class, reports_to_json, ClassReport, Defect};
use pretty_assertions::assert_eq;

fn report(source: &str) -> ClassReport {
    let mut reports = analyze_source(source).unwrap();
    assert_eq!(reports.len(), 1);
    reports.remove(0)
}

fn summary(report: &ClassReport) -> Vec<(&str, Option<&str>, &Defect)> {
    report
        .findings
        .iter()
        .map(|f| (f.field.as_str(), f.method.as_deref(), &f.defect))
        .collect()
}

const COUNTER: &str = r"
class demo/Counter extends java/lang/Object

field private x I

method public <init> ()V {
    aload_0
    invokespecial java/lang/Object.<init> ()V
    return
}

method public init ()V {
    aload_0
    getfield demo/Counter.x I
    ifne L0
    aload_0
    aload_0
    invokevirtual demo/Counter.compute ()I
    putfield demo/Counter.x I
L0:
    return
}

method private compute ()I {
    bipush 42
    ireturn
}
";

#[test]
fn test_zero_guard_with_local_computation() {
    assert!(report(COUNTER).is_clean());
}

#[test]
fn test_foreign_clock_value() {
    let source = r"
class demo/Clock

field private started J

method public start ()V {
    aload_0
    getfield demo/Clock.started J
    lconst_0
    lcmp
    ifne L0
    aload_0
    invokestatic java/lang/System.nanoTime ()J
    putfield demo/Clock.started J
L0:
    return
}
";
    let report = report(source);
    assert_eq!(
        summary(&report),
        vec![("started", Some("start"), &Defect::NonDeterministicPrimitive)]
    );
    assert_eq!(report.findings[0].instruction, Some(6));
    assert_eq!(
        report.findings[0].to_string(),
        "demo/Clock.started in start @6: field can be reassigned with a non-deterministic value \
         (field can be reassigned)"
    );
}

fn cache_source(constructor_value: &str) -> String {
    format!(
        r"
class demo/Cache

field private cache Ljava/lang/Object;

method public <init> ()V {{
    aload_0
    invokespecial java/lang/Object.<init> ()V
    aload_0
    {}
    putfield demo/Cache.cache Ljava/lang/Object;
    return
}}

method public get ()Ljava/lang/Object; {{
    aload_0
    getfield demo/Cache.cache Ljava/lang/Object;
    ifnonnull L0
    aload_0
    aload_0
    invokevirtual demo/Cache.load ()Ljava/lang/Object;
    putfield demo/Cache.cache Ljava/lang/Object;
L0:
    aload_0
    getfield demo/Cache.cache Ljava/lang/Object;
    areturn
}}
",
        constructor_value
    )
}

#[test]
fn test_null_guard_against_constructor_value() {
    assert!(report(&cache_source("aconst_null")).is_clean());

    let report = report(&cache_source(
        "getstatic demo/Cache.DEFAULT Ljava/lang/Object;",
    ));
    assert_eq!(
        summary(&report),
        vec![("cache", Some("get"), &Defect::GuardShouldCheckNull)]
    );
    assert_eq!(
        report.findings[0].defect.message(),
        "guard should check against null, field may never initialize"
    );
}

#[test]
fn test_two_writers() {
    let source = r"
class demo/Settings

field private mode I

method public reset ()V {
    aload_0
    iconst_0
    putfield demo/Settings.mode I
    return
}

method public enable ()V {
    aload_0
    iconst_1
    putfield demo/Settings.mode I
    return
}
";
    let report = report(source);
    assert_eq!(
        summary(&report),
        vec![
            (
                "mode",
                Some("reset"),
                &Defect::ReassignedInMethod {
                    method: "reset".to_string()
                }
            ),
            (
                "mode",
                Some("enable"),
                &Defect::ReassignedInMethod {
                    method: "enable".to_string()
                }
            ),
        ]
    );
}

#[test]
fn test_alias_does_not_hide_foreign_call() {
    let aliased = r"
class demo/Seed

field private value I

method public get ()I {
    aload_0
    getfield demo/Seed.value I
    istore_1
    iload_1
    ifne L0
    invokestatic other/Clock.now ()I
    istore_1
    aload_0
    iload_1
    putfield demo/Seed.value I
L0:
    iload_1
    ireturn
}
";
    let direct = r"
class demo/Seed

field private value I

method public get ()I {
    aload_0
    getfield demo/Seed.value I
    ifne L0
    aload_0
    invokestatic other/Clock.now ()I
    putfield demo/Seed.value I
L0:
    aload_0
    getfield demo/Seed.value I
    ireturn
}
";
    let aliased = report(aliased);
    let direct = report(direct);
    assert_eq!(summary(&aliased), summary(&direct));
    assert_eq!(
        summary(&aliased),
        vec![("value", Some("get"), &Defect::NonDeterministicPrimitive)]
    );
    assert_eq!(aliased.findings[0].instruction, Some(5));
}

#[test]
fn test_inverted_zero_guard() {
    let source = COUNTER.replace("ifne L0", "ifeq L0");
    assert_eq!(
        summary(&report(&source)),
        vec![("x", Some("init"), &Defect::GuardMismatchesInitialValues)]
    );
}

#[test]
fn test_two_operand_guard() {
    let against_zero = COUNTER.replace(
        "    ifne L0\n",
        "    iconst_0\n    if_icmpne L0\n",
    );
    assert!(report(&against_zero).is_clean());

    let against_five = COUNTER.replace(
        "    ifne L0\n",
        "    iconst_5\n    if_icmpne L0\n",
    );
    assert_eq!(
        summary(&report(&against_five)),
        vec![("x", Some("init"), &Defect::GuardComparesNonInitialValue)]
    );
}

#[test]
fn test_unguarded_write() {
    let source = COUNTER.replace("    ifne L0\n", "    pop\n");
    assert_eq!(
        summary(&report(&source)),
        vec![("x", Some("init"), &Defect::MissingGuard)]
    );
}

fn early_return_source(branch: &str) -> String {
    format!(
        r"
class demo/Getter

field private x I

method public get ()I {{
    aload_0
    getfield demo/Getter.x I
    {} L0
    aload_0
    getfield demo/Getter.x I
    ireturn
L0:
    aload_0
    aload_0
    invokevirtual demo/Getter.compute ()I
    putfield demo/Getter.x I
    aload_0
    getfield demo/Getter.x I
    ireturn
}}

method private compute ()I {{
    bipush 42
    ireturn
}}
",
        branch
    )
}

#[test]
fn test_write_at_branch_target() {
    assert!(report(&early_return_source("ifeq")).is_clean());

    let report = report(&early_return_source("ifne"));
    assert_eq!(
        summary(&report),
        vec![("x", Some("get"), &Defect::GuardMismatchesInitialValues)]
    );
    assert_eq!(report.findings[0].instruction, Some(2));
}

#[test]
fn test_write_on_fall_through_behind_line_label() {
    let source = COUNTER.replace(
        "    ifne L0\n    aload_0\n    aload_0\n",
        "    ifne L0\nL1:\n    line 12 L1\n    aload_0\n    aload_0\n",
    );
    assert!(source.contains("line 12 L1"));
    assert!(report(&source).is_clean());

    let inverted = source.replace("ifne L0", "ifeq L0");
    assert_eq!(
        summary(&report(&inverted)),
        vec![("x", Some("init"), &Defect::GuardMismatchesInitialValues)]
    );
}

#[test]
fn test_branch_after_write_does_not_guard_it() {
    let source = r"
class demo/Late

field private x I

method public init ()V {
    aload_0
    aload_0
    invokevirtual demo/Late.compute ()I
    putfield demo/Late.x I
    aload_0
    getfield demo/Late.x I
    ifne L0
    nop
L0:
    return
}

method private compute ()I {
    bipush 42
    ireturn
}
";
    let report = report(source);
    assert_eq!(
        summary(&report),
        vec![("x", Some("init"), &Defect::MissingGuard)]
    );
    assert_eq!(report.findings[0].instruction, Some(3));
}

#[test]
fn test_builder_and_text_agree() {
    let class = parse_class(COUNTER).unwrap();
    assert_eq!(analyze(&class).unwrap(), report(COUNTER));
}

#[test]
fn test_json_output() {
    let reports = analyze_source(&COUNTER.replace(
        "invokevirtual demo/Counter.compute ()I",
        "invokevirtual demo/Counter.scaled (I)I",
    ))
    .unwrap();
    let json = reports_to_json(&reports).unwrap();
    assert!(json.contains("\"kind\": \"non_deterministic_primitive\""), "{}", json);
    assert!(json.contains("\"class_name\": \"demo/Counter\""));
}

#[test]
fn test_parse_failure_has_context() {
    let error = analyze_source("class A\nfield private\n").unwrap_err();
    assert_eq!(error.to_string(), "failed to parse class assembly");
}
