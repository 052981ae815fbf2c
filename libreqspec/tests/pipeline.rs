//! End-to-end checks: text in, interpolated spec out.

use std::fs;

use libreqspec::{
    encode, interpolate_in_place, load_file, parse, resolve_variables, validate, LoadError,
    LoadOptions, ParseError, ResolveOptions, Severity, Value, Vars,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const CREATE_USER: &str = "\
version: 1
kind: http
name: users.create
request:
  method: POST
  url: \"{{base_url}}/users\"
  headers:
    Authorization: Bearer {{token}}
  timeout_ms: 3000
  body:
    mode: json
    json:
      id: \"{{uuid}}\"
      count: 2
      tags: [new, \"{{env}}\"]
";

fn vars(pairs: &[(&str, &str)]) -> Vars {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_indentation_widths() {
    for (doc, ok) in [
        ("a: 1\n", true),
        ("a:\n  b: 1\n", true),
        ("a:\n  b:\n    c: 1\n", true),
        ("a:\n b: 1\n", false),
        ("a:\n  b:\n     c: 1\n", false),
    ] {
        let result = libreqspec::parse_document(doc);
        assert_eq!(result.is_ok(), ok, "{:?}", doc);
        if let Err(e) = result {
            assert!(matches!(e, ParseError::OddIndent(_)), "{:?}", e);
        }
    }
}

#[test]
fn test_flow_list_scalars() {
    let (_, raw) = parse("name: x\ntags: [1, \"two\", true, null]\n").unwrap();
    assert_eq!(
        raw.get("tags"),
        Some(&Value::List(vec![
            Value::Int(1),
            Value::from("two"),
            Value::Bool(true),
            Value::Null,
        ]))
    );
}

#[test]
fn test_strict_changes_only_severity() {
    let doc = CREATE_USER.replace("  timeout_ms: 3000\n", "  mystery: 1\n");
    let (spec, raw) = parse(&doc).unwrap();
    let lenient = validate(&spec, &raw, false);
    let strict = validate(&spec, &raw, true);

    assert_eq!(lenient.len(), 1);
    assert_eq!(strict.len(), 1);
    assert_eq!(lenient[0].severity, Severity::Warning);
    assert_eq!(strict[0].severity, Severity::Error);
    assert_eq!(lenient[0].field, "request.mystery");
    assert_eq!(lenient[0].field, strict[0].field);
    assert_eq!(lenient[0].message, strict[0].message);
}

#[test]
fn test_interpolate_loaded_spec() {
    let (mut spec, raw) = parse(CREATE_USER).unwrap();
    let before = raw.clone();

    let vars = vars(&[
        ("base_url", "https://api.test"),
        ("token", "s3cret"),
        ("uuid", "u-1"),
        ("env", "dev"),
    ]);
    interpolate_in_place(&mut spec, &vars).unwrap();

    let request = spec.request.as_ref().unwrap();
    assert_eq!(request.url, "https://api.test/users");
    assert_eq!(
        request.headers.get("Authorization"),
        Some(&Value::from("Bearer s3cret"))
    );
    assert_eq!(request.timeout_ms, Some(3000));
    let json = request.body.as_ref().unwrap().json.as_ref().unwrap();
    let json = json.as_map().unwrap();
    assert_eq!(json.get("id"), Some(&Value::from("u-1")));
    assert_eq!(json.get("count"), Some(&Value::Int(2)));
    assert_eq!(
        json.get("tags"),
        Some(&Value::List(vec![Value::from("new"), Value::from("dev")]))
    );

    assert_eq!(raw, before);
}

#[test]
fn test_unresolved_variable_in_body() {
    let doc = CREATE_USER.replace("{{uuid}}", "{{missing}}");
    let (mut spec, _) = parse(&doc).unwrap();
    let vars = vars(&[("base_url", "b"), ("token", "t"), ("env", "e")]);

    let err = interpolate_in_place(&mut spec, &vars).unwrap_err();
    assert_eq!(err.names, vec!["missing".to_string()]);
    assert_eq!(err.to_string(), "unresolved variable(s): missing");
}

#[test]
fn test_encode_round_trip_is_lossless() {
    let (spec, _) = parse(CREATE_USER).unwrap();
    let (again, _) = parse(&encode(&spec)).unwrap();
    assert_eq!(again, spec);
}

#[test]
fn test_injected_defects_are_counted() {
    let doc = "\
version: 9
kind: http
name: \"\"
request:
  url: https://x.test
  body:
    mode: form
  extra_a: 1
extra_b: 2
";
    let (spec, raw) = parse(doc).unwrap();
    let issues = validate(&spec, &raw, false);
    let fields: Vec<&str> = issues.iter().map(|i| i.field.as_str()).collect();
    assert_eq!(
        fields,
        vec![
            "version",
            "name",
            "request.method",
            "request.body.form",
            "request.extra_a",
            "extra_b",
        ]
    );
}

#[test]
fn test_load_resolve_interpolate() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::write(root.join(".env"), "base_url=https://local.test\ntoken=dotenv\n").unwrap();
    fs::create_dir_all(root.join("env")).unwrap();
    fs::write(root.join("env/dev.env"), "token=\"shared\"\nenv=dev\n").unwrap();
    let spec_path = root.join("create.req.yaml");
    fs::write(&spec_path, CREATE_USER).unwrap();

    let loaded = load_file(&spec_path, &LoadOptions::default()).unwrap();
    let opts = ResolveOptions {
        env_name: Some("dev".into()),
        cli: vec![("token".into(), "cli".into())],
        ..ResolveOptions::rooted_at(root)
    };
    let vars = resolve_variables(&opts).unwrap();

    let mut spec = loaded.spec;
    interpolate_in_place(&mut spec, &vars).unwrap();
    let request = spec.request.unwrap();
    assert_eq!(request.url, "https://local.test/users");
    assert_eq!(
        request.headers.get("Authorization"),
        Some(&Value::from("Bearer cli"))
    );
    let json = request.body.unwrap().json.unwrap();
    let id = json.as_map().unwrap().get("id").unwrap().as_str().unwrap();
    assert_eq!(id, vars["uuid"]);
}

#[test]
fn test_wrong_extension_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("create.yaml");
    fs::write(&path, CREATE_USER).unwrap();
    let err = load_file(&path, &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, LoadError::Extension { .. }));
}
