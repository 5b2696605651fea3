use serde::{Deserialize, Serialize};
use serde_json::json;
use tsp_utils::{dejsonify, jsonify, jsonify_internal};

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Record {
    zeta: u32,
    alpha: Vec<usize>,
    mid: f64,
}

#[test]
fn test_jsonify_sorts_keys() {
    let record = Record {
        zeta: 3,
        alpha: vec![0, 2, 1, 0],
        mid: 80.0,
    };
    assert_eq!(
        jsonify(&record).unwrap(),
        r#"{"alpha":[0,2,1,0],"mid":80.0,"zeta":3}"#
    );
}

#[test]
fn test_jsonify_internal_sorts_nested_objects() {
    let value = json!({"b": [{"y": 1, "x": 2}], "a": {"d": 1, "c": 2}});
    assert_eq!(
        jsonify_internal(&value).to_string(),
        r#"{"a":{"c":2,"d":1},"b":[{"x":2,"y":1}]}"#
    );
}

#[test]
fn test_dejsonify() {
    let record: Record = dejsonify(r#"{"zeta":1,"alpha":[1],"mid":0.5}"#).unwrap();
    assert_eq!(
        record,
        Record {
            zeta: 1,
            alpha: vec![1],
            mid: 0.5
        }
    );
    assert!(dejsonify::<Record>(r#"{"zeta":1}"#).is_err());
}
