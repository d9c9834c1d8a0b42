use lazyfield_core::{
    format::format_class, AccessFlags, AnalysisConfig, CheckRunner, Class, ClassBuilder,
    ClassReport, Constant, Defect, Opcode,
};
use pretty_assertions::assert_eq;

const SINGLETON: &str = "com/example/Registry";
const OBJECT: &str = "Ljava/lang/Object;";

fn singleton_class(clinit_writes_null: bool) -> Class {
    let mut builder = ClassBuilder::new(SINGLETON);
    builder.field(
        "instance",
        OBJECT,
        AccessFlags::PRIVATE | AccessFlags::STATIC,
    );

    let mut clinit = builder.method("<clinit>", "()V", AccessFlags::STATIC);
    if clinit_writes_null {
        clinit.aconst_null().putstatic("instance", OBJECT);
    }
    clinit.op(Opcode::RETURN);
    let clinit = clinit.build().unwrap();

    let mut get = builder.method(
        "getInstance",
        "()Ljava/lang/Object;",
        AccessFlags::PUBLIC | AccessFlags::STATIC,
    );
    let done = get.new_label();
    get.getstatic("instance", OBJECT)
        .jump(Opcode::IFNONNULL, done)
        .invoke(Opcode::INVOKESTATIC, SINGLETON, "create", "()Ljava/lang/Object;")
        .putstatic("instance", OBJECT);
    get.place(done)
        .getstatic("instance", OBJECT)
        .op(Opcode::ARETURN);
    let get = get.build().unwrap();

    builder.add_method(clinit).add_method(get);
    builder.build().unwrap()
}

fn equals_guarded_class(constructor_value: &str) -> Class {
    let mut builder = ClassBuilder::new("com/example/Named");
    builder.field("name", "Ljava/lang/String;", AccessFlags::PRIVATE);

    let mut init = builder.method("<init>", "()V", AccessFlags::PUBLIC);
    init.aload(0)
        .invoke_constructor("java/lang/Object", "()V")
        .aload(0)
        .ldc(Constant::String(constructor_value.to_string()))
        .putfield("name", "Ljava/lang/String;")
        .op(Opcode::RETURN);
    let init = init.build().unwrap();

    let mut resolve = builder.method("resolve", "()V", AccessFlags::PUBLIC);
    let done = resolve.new_label();
    resolve
        .aload(0)
        .getfield("name", "Ljava/lang/String;")
        .ldc(Constant::String("unset".to_string()))
        .invoke(
            Opcode::INVOKEVIRTUAL,
            "java/lang/String",
            "equals",
            "(Ljava/lang/Object;)Z",
        )
        .jump(Opcode::IFEQ, done)
        .aload(0)
        .ldc(Constant::String("resolved".to_string()))
        .putfield("name", "Ljava/lang/String;");
    resolve.place(done).op(Opcode::RETURN);
    let resolve = resolve.build().unwrap();

    builder.add_method(init).add_method(resolve);
    builder.build().unwrap()
}

#[test]
fn test_static_singleton() {
    let report = CheckRunner::default()
        .run(&singleton_class(true))
        .unwrap();
    assert!(report.is_clean(), "{:?}", report.findings);
}

#[test]
fn test_static_initializer_as_ordinary_method() {
    let config = AnalysisConfig {
        static_initializer_is_constructor: false,
        ..AnalysisConfig::default()
    };
    let report = CheckRunner::with_default_checks(config)
        .run(&singleton_class(true))
        .unwrap();

    let methods: Vec<_> = report
        .findings
        .iter()
        .map(|finding| finding.method.as_deref().unwrap_or_default())
        .collect();
    assert_eq!(methods, vec!["<clinit>", "getInstance"]);
}

#[test]
fn test_equals_guard() {
    let mut runner = CheckRunner::default();
    assert!(runner.run(&equals_guarded_class("unset")).unwrap().is_clean());

    let report = runner.run(&equals_guarded_class("pending")).unwrap();
    assert_eq!(
        report.defects(),
        vec![&Defect::ComparedObjectNotInitialValue]
    );
    assert_eq!(report.findings[0].instruction, Some(4));
}

#[test]
fn test_class_survives_json() {
    let class = singleton_class(true);
    let json = serde_json::to_string(&class).unwrap();
    let restored: Class = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, class);
    assert_eq!(format_class(&restored), format_class(&class));
}

#[test]
fn test_report_json_shape() {
    let report = CheckRunner::default()
        .run(&equals_guarded_class("pending"))
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

    assert_eq!(value["class_name"], "com/example/Named");
    assert_eq!(value["findings"][0]["field"], "name");
    assert_eq!(
        value["findings"][0]["defect"]["kind"],
        "compared_object_not_initial_value"
    );

    let restored: ClassReport = serde_json::from_value(value).unwrap();
    assert_eq!(restored, report);
}

#[test]
fn test_config_from_json() {
    let config = AnalysisConfig::from_json(r#"{ "max_guard_operand_depth": 5 }"#).unwrap();
    assert_eq!(config.max_guard_operand_depth, 5);
    assert!(config.static_initializer_is_constructor);
    assert_eq!(config.equality_method.name, "equals");

    let error = AnalysisConfig::from_json(r#"{ "max_guard_operand_depth": 0 }"#).unwrap_err();
    assert!(error.to_string().starts_with("Invalid configuration"));
}
