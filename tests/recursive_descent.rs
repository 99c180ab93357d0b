use json_path_query as jpq;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn recursive_test_json() -> Value {
    json!({
        "departments": [
            {
                "team": [
                    {
                        "name": "Alice Johnson",
                        "info": {
                            "position": "Software Engineer",
                            "age": 29,
                            "email": "alice.johnson@example.com"
                        }
                    },
                    {
                        "name": "Bob Smith",
                        "info": {
                            "position": "UI/UX Designer",
                            "age": 34,
                            "email": "bob.smith@example.com"
                        }
                    }
                ]
            },
            {
                "team": [
                    {
                        "name": "Carol Lee",
                        "info": {
                            "position": "Project Manager",
                            "age": 41,
                            "email": "carol.lee@example.com"
                        }
                    },
                    {
                        "name": "David Kim",
                        "info": {
                            "position": "QA Engineer",
                            "age": 27,
                            "email": "david.kim@example.com"
                        }
                    }
                ]
            }
        ]
    })
}

/// Number of nodes in the subtree rooted at `v`, itself included.
fn subtree_size(v: &Value) -> usize {
    1 + match v {
        Value::Array(a) => a.iter().map(subtree_size).sum(),
        Value::Object(m) => m.values().map(subtree_size).sum(),
        _ => 0,
    }
}

#[test]
fn test_recursive_descent_all_names() {
    let doc = recursive_test_json();
    assert_eq!(
        jpq::query(&doc, "$..name", None),
        vec![
            &json!("Alice Johnson"),
            &json!("Bob Smith"),
            &json!("Carol Lee"),
            &json!("David Kim")
        ]
    );
}

#[test]
fn test_recursive_descent_specific_name() {
    let doc = recursive_test_json();
    assert_eq!(
        jpq::query(&doc, "$.departments[0].team[0].name", None),
        vec![&json!("Alice Johnson")]
    );
}

#[test]
fn test_recursive_descent_then_filter() {
    let doc = recursive_test_json();
    assert_eq!(
        jpq::query(&doc, "$..team[?(@.name == 'Carol Lee')].info.age", None),
        vec![&json!(41)]
    );
    assert_eq!(
        jpq::query(&doc, "$..info[?(@ > 30)]", None),
        vec![&json!(34), &json!(41)]
    );
}

#[test]
fn test_recursive_descent_counts_whole_subtree() {
    let doc = recursive_test_json();
    let everything = jpq::nodes(&doc, "$..", None);
    assert_eq!(everything.len(), subtree_size(&doc));
    assert!(everything[0].path.is_empty());

    let team = &doc["departments"][1]["team"];
    let below = jpq::nodes(&doc, "$.departments[1].team..", None);
    assert_eq!(below.len(), subtree_size(team));
    assert!(std::ptr::eq(below[0].value, team));
}

#[test]
fn test_recursive_descent_star_skips_the_root() {
    let doc = json!({ "a": [1, { "b": 2 }] });
    let paths: Vec<String> = jpq::paths(&doc, "$..*", None)
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(paths, vec!["$.a", "$.a[0]", "$.a[1]", "$.a[1].b"]);
}

#[test]
fn test_every_result_path_resolves_to_its_value() {
    let doc = recursive_test_json();
    for node in jpq::nodes(&doc, "$..", None) {
        let found = jpq::resolve_path(&doc, &node.path).unwrap();
        assert!(std::ptr::eq(found, node.value), "{} did not resolve", node.path);
    }
}
