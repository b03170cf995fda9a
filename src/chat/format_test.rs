use super::*;

fn t(s: &str) -> Segment {
    Segment::Text { text: s.into() }
}

fn l(p: &str) -> Segment {
    Segment::Link { path: p.into(), label: LINK_LABEL.into() }
}

#[test]
fn plain_text_is_single_segment() {
    assert_eq!(render("no links here"), vec![t("no links here")]);
}

#[test]
fn empty_text_has_no_segments() {
    assert!(render("").is_empty());
}

#[test]
fn single_token_keeps_surrounding_text() {
    assert_eq!(render("Hi [/studio] there"), vec![t("Hi "), l("/studio"), t(" there")]);
}

#[test]
fn token_only() {
    assert_eq!(render("[/calendar]"), vec![l("/calendar")]);
}

#[test]
fn multiple_tokens_adjacent_and_separated() {
    assert_eq!(
        render("[/a][/b] and [/tools/pdf]."),
        vec![l("/a"), l("/b"), t(" and "), l("/tools/pdf"), t(".")]
    );
}

#[test]
fn unterminated_token_is_literal() {
    assert_eq!(render("see [/studio for more"), vec![t("see [/studio for more")]);
}

#[test]
fn terminated_then_unterminated() {
    assert_eq!(render("[/x] then [/y"), vec![l("/x"), t(" then [/y")]);
}

#[test]
fn empty_path_is_literal() {
    assert_eq!(render("odd [/] token"), vec![t("odd [/] token")]);
}

#[test]
fn empty_path_followed_by_real_token() {
    assert_eq!(render("[/][/ok]"), vec![t("[/]"), l("/ok")]);
}

#[test]
fn brackets_without_slash_are_literal() {
    assert_eq!(render("[note] and [ /spaced]"), vec![t("[note] and [ /spaced]")]);
}

#[test]
fn nested_open_is_part_of_path() {
    assert_eq!(render("[/a[/b]"), vec![l("/a[/b")]);
}

#[test]
fn unicode_around_tokens() {
    assert_eq!(render("देखें [/exams] ✓"), vec![t("देखें "), l("/exams"), t(" ✓")]);
}

#[test]
fn link_paths_extracts_in_order() {
    assert_eq!(link_paths("x [/one] y [/two]"), vec!["/one".to_string(), "/two".to_string()]);
}

#[test]
fn segment_serializes_with_kind_tag() {
    let json = serde_json::to_value(l("/studio")).unwrap();
    assert_eq!(json["kind"], "link");
    assert_eq!(json["path"], "/studio");
    assert_eq!(json["label"], "Go to Tool");
}
