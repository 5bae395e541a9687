// crates/ontocompiler/tests/decorator_tests.rs

mod common;

use common::template;
use ontocompiler::decorator::{
    file_extraction_name, CONTAINER_COLLECT, CONTAINER_WRAP, FILE_EXTRACTION_FUNCTION_TYPE,
};
use ontocompiler::{decorate, StageNames};
use ontocore::{CompileError, Direction, Stage, StageKind};
use serde_json::{json, Map};

fn resource(name: &str) -> Stage {
    Stage::from_template(&template(json!({"dataresource": {"downloadUrl": "x.csv"}})), name)
}

fn file_sink(name: &str, location: &str) -> Stage {
    Stage::from_template(
        &template(json!({"function": {"configuration": {"location": location}}})),
        name,
    )
}

fn conversion(name: &str) -> Stage {
    Stage::function(StageKind::ConversionFunction, name, "aiidacuds/datanode2file", Map::new())
}

fn names(output: &[&str], input: &[&str]) -> StageNames {
    let mut names = StageNames::default();
    for name in output {
        names.push(Direction::Output, *name);
    }
    for name in input {
        names.push(Direction::Input, *name);
    }
    names
}

#[test]
fn test_plain_resources_are_left_alone() {
    let stages = vec![resource("a"), resource("b")];
    let (stages, names) = decorate(stages, names(&["a", "b"], &[])).unwrap();

    assert_eq!(stages.len(), 2);
    assert_eq!(names.pipe(), "a | b");
}

#[test]
fn test_function_source_gets_container_wrap() {
    let stages = vec![conversion("convert"), resource("a")];
    let (stages, names) = decorate(stages, names(&["convert", "a"], &[])).unwrap();

    assert_eq!(names.output[0], CONTAINER_WRAP);
    let wrap = stages.iter().find(|s| s.name == CONTAINER_WRAP).unwrap();
    assert_eq!(wrap.kind, StageKind::AdapterFunction);
    assert_eq!(wrap.config["configuration"]["to_cuds"], json!(["convert", "a"]));
}

#[test]
fn test_one_extraction_adapter_per_location() {
    let stages = vec![
        resource("src"),
        file_sink("first", "shared.inp"),
        file_sink("second", "shared.inp"),
        file_sink("third", "other.inp"),
    ];
    let (stages, names) = decorate(stages, names(&["src"], &["first", "second", "third"])).unwrap();

    let adapters: Vec<&Stage> = stages
        .iter()
        .filter(|s| s.function_type() == Some(FILE_EXTRACTION_FUNCTION_TYPE))
        .collect();
    assert_eq!(adapters.len(), 2);
    assert_eq!(adapters[0].name, file_extraction_name("first"));
    assert_eq!(adapters[0].location(), Some("shared.inp"));
    assert_eq!(adapters[1].name, file_extraction_name("third"));

    assert_eq!(names.input.last().map(String::as_str), Some(CONTAINER_COLLECT));
    let collect = stages.iter().find(|s| s.name == CONTAINER_COLLECT).unwrap();
    assert_eq!(collect.config["configuration"]["from_cuds"], json!(["first", "third"]));
    assert_eq!(
        names.pipe(),
        "src | first | second | third | first_file2collection | third_file2collection | cuds2datanode"
    );
}

#[test]
fn test_decorate_is_idempotent() {
    let stages = vec![conversion("convert"), file_sink("sink", "in.inp")];
    let once = decorate(stages, names(&["convert"], &["sink"])).unwrap();
    let twice = decorate(once.0.clone(), once.1.clone()).unwrap();

    assert_eq!(once.0, twice.0);
    assert_eq!(once.1, twice.1);
}

#[test]
fn test_duplicate_names_conflict() {
    let stages = vec![resource("same"), resource("same")];
    let err = decorate(stages, names(&["same"], &[])).unwrap_err();
    match err {
        CompileError::Conflict(name) => assert_eq!(name, "same"),
        other => panic!("Expected Conflict, got {:?}", other),
    }
}
