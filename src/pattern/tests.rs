use super::{compile, pattern_source, CompileFlags, Segment};

fn strict() -> CompileFlags {
    CompileFlags::default()
}

fn tolerant() -> CompileFlags {
    CompileFlags {
        trailing_slash: true,
        extension: None,
    }
}

#[test]
fn test_root_path() {
    let (source, ci) = pattern_source(&[Segment::from("/")], &strict());
    assert_eq!(source, "^/$");
    assert!(!ci);
    let pattern = compile(&[Segment::from("/")], &strict()).unwrap();
    assert!(pattern.is_match("/"));
    assert!(!pattern.is_match(""));
}

#[test]
fn test_leading_slash_is_stripped() {
    let (source, _) = pattern_source(&[Segment::from("/home/room")], &strict());
    assert_eq!(source, "^home/room$");
}

#[test]
fn test_literals_are_escaped() {
    let pattern = compile(&[Segment::from("files/a.b")], &strict()).unwrap();
    assert!(pattern.is_match("files/a.b"));
    assert!(!pattern.is_match("files/aXb"));
}

#[test]
fn test_prefixes_are_joined_and_slashes_squeezed() {
    let segments = [
        Segment::from("/api/"),
        Segment::from("/v1/"),
        Segment::regex(r"^(\w+)/([0-9]+)$"),
    ];
    let (source, _) = pattern_source(&segments, &strict());
    assert_eq!(source, r"^api/v1/(\w+)/([0-9]+)$");
}

#[test]
fn test_escaped_slashes_are_squeezed() {
    let segments = [Segment::regex(r"^\/users\/\/"), Segment::regex(r"(\d+)")];
    let (source, _) = pattern_source(&segments, &strict());
    assert_eq!(source, r"^users/(\d+)$");
}

#[test]
fn test_empty_segments_are_ignored() {
    let segments = [Segment::from("home"), Segment::from("")];
    let (source, _) = pattern_source(&segments, &strict());
    assert_eq!(source, "^home$");
}

#[test]
fn test_trailing_slash_tolerance() {
    let pattern = compile(&[Segment::from("kitchen")], &tolerant()).unwrap();
    assert_eq!(pattern.as_str(), "^kitchen/?$");
    assert!(pattern.is_match("kitchen"));
    assert!(pattern.is_match("kitchen/"));
    assert!(!pattern.is_match("kitchen//"));

    let strict_pattern = compile(&[Segment::from("kitchen")], &strict()).unwrap();
    assert!(!strict_pattern.is_match("kitchen/"));
}

#[test]
fn test_extension_suffix() {
    let flags = CompileFlags {
        trailing_slash: false,
        extension: Some(".json".to_string()),
    };
    let pattern = compile(&[Segment::regex(r"pets/(\d+)")], &flags).unwrap();
    assert_eq!(pattern.as_str(), r"^pets/(\d+)(?:\.(?:json))?$");
    assert_eq!(pattern.captures("pets/7.json"), Some(vec![Some("7".into())]));
    assert_eq!(pattern.captures("pets/7"), Some(vec![Some("7".into())]));
    assert!(!pattern.is_match("pets/7.xml"));
}

#[test]
fn test_case_insensitivity_is_inherited() {
    let segments = [Segment::regex_ci("admin"), Segment::from("users")];
    let pattern = compile(&segments, &strict()).unwrap();
    assert!(pattern.case_insensitive());
    assert!(pattern.is_match("ADMIN/Users"));

    let sensitive = compile(&[Segment::from("admin")], &strict()).unwrap();
    assert!(!sensitive.case_insensitive());
    assert!(!sensitive.is_match("ADMIN"));
}

#[test]
fn test_escaped_dollar_is_kept() {
    let (source, _) = pattern_source(&[Segment::regex(r"price\$")], &strict());
    assert_eq!(source, r"^price\$$");
}

#[test]
fn test_unmatched_optional_groups() {
    let pattern = compile(&[Segment::regex(r"(\w+)(?:/(\d+))?")], &strict()).unwrap();
    assert_eq!(
        pattern.captures("pets"),
        Some(vec![Some("pets".to_string()), None])
    );
    assert_eq!(pattern.captures("pets/"), None);
}

#[test]
fn test_invalid_regex_is_a_build_error() {
    let err = compile(&[Segment::regex("(unclosed")], &strict()).unwrap_err();
    assert!(err.to_string().contains("invalid route pattern"));
}

#[test]
fn test_compilation_is_pure() {
    let segments = [Segment::from("a"), Segment::regex(r"(\d+)")];
    assert_eq!(
        pattern_source(&segments, &tolerant()),
        pattern_source(&segments, &tolerant())
    );
}
