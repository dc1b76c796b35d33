use pinboard_engine::{classify, is_eligible, upgrade, ClassifierRules};
use pretty_assertions::assert_eq;

#[test]
fn upgrade_rewrites_each_thumbnail_segment() {
    for size in ["236x", "474x", "564x"] {
        let raw = format!("https://i.pinimg.com/{size}/3f/a1/9c/3fa19c.jpg?x=1");
        assert_eq!(
            upgrade(&raw),
            "https://i.pinimg.com/originals/3f/a1/9c/3fa19c.jpg?x=1"
        );
    }
}

#[test]
fn upgrade_leaves_unknown_sizes_alone() {
    let raw = "https://i.pinimg.com/736x/3f/a1/9c/3fa19c.jpg";
    assert_eq!(upgrade(raw), raw);
    assert_eq!(upgrade(""), "");
    let already = "https://i.pinimg.com/originals/3f/a1.jpg";
    assert_eq!(upgrade(already), already);
}

#[test]
fn upgrade_only_touches_slash_delimited_segments() {
    let raw = "https://i.pinimg.com/236x/aa/236x.jpg";
    assert_eq!(upgrade(raw), "https://i.pinimg.com/originals/aa/236x.jpg");
}

#[test]
fn eligibility_rules() {
    assert!(is_eligible("https://i.pinimg.com/236x/aa/bb.jpg"));
    assert!(!is_eligible(""));
    assert!(!is_eligible("https://example.com/236x/aa/bb.jpg"));
    assert!(!is_eligible("https://i.pinimg.com/75x75_RS/aa/bb.jpg"));
    assert!(!is_eligible("https://i.pinimg.com/profile_display/aa/bb.jpg"));
    assert!(!is_eligible("data:image/gif;base64,R0lGOD"));
}

#[test]
fn classify_combines_filter_and_upgrade() {
    assert_eq!(
        classify("https://i.pinimg.com/474x/aa/bb.jpg").as_deref(),
        Some("https://i.pinimg.com/originals/aa/bb.jpg")
    );
    assert_eq!(classify("https://i.pinimg.com/75x75_RS/aa/bb.jpg"), None);
}

#[test]
fn default_rules_match_the_free_functions() {
    let rules = ClassifierRules::default();
    for raw in [
        "",
        "https://i.pinimg.com/236x/aa/bb.jpg",
        "https://i.pinimg.com/564x/aa/bb.jpg",
        "https://i.pinimg.com/75x75_RS/aa/bb.jpg",
        "https://i.pinimg.com/profile_display/aa.jpg",
        "https://s.pinimg.com/logo.png",
    ] {
        assert_eq!(rules.classify(raw), classify(raw), "{raw}");
    }
}

#[test]
fn custom_rules_can_target_another_host() {
    let rules = ClassifierRules {
        host_marker: "cdn.example.net".to_string(),
        excluded_markers: vec!["avatar".to_string()],
        thumbnail_segments: vec!["/thumb/".to_string()],
        originals_segment: "/full/".to_string(),
    };
    assert_eq!(
        rules.classify("https://cdn.example.net/thumb/1.jpg").as_deref(),
        Some("https://cdn.example.net/full/1.jpg")
    );
    assert_eq!(rules.classify("https://cdn.example.net/avatar/1.jpg"), None);
    assert_eq!(rules.classify("https://i.pinimg.com/236x/1.jpg"), None);
}

