// crates/ontostore/tests/sink_tests.rs

use ontocore::{ArtifactSink, Chain, PipelineFragment};
use ontostore::{DirectorySink, MemorySink};

#[test]
fn test_directory_sink_writes_yaml_files() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("nested").join("out");
    let mut sink = DirectorySink::new(&out).unwrap();

    let fragment = PipelineFragment::new(Vec::new(), "");
    sink.write_fragment("pipeline_final.yaml", &fragment).unwrap();
    sink.write_chain("workchain.yaml", &Chain::new()).unwrap();

    let written = std::fs::read_to_string(out.join("pipeline_final.yaml")).unwrap();
    assert!(written.contains("version: 1"));
    assert!(written.contains("strategies: []"));
    assert!(out.join("workchain.yaml").exists());
    assert_eq!(sink.dir(), out.as_path());
}

#[test]
fn test_memory_sink_keeps_write_order() {
    let mut sink = MemorySink::new();
    assert!(sink.is_empty());

    sink.write_chain("b.yaml", &Chain::new()).unwrap();
    sink.write_fragment("a.yaml", &PipelineFragment::default()).unwrap();

    assert_eq!(sink.names(), vec!["b.yaml", "a.yaml"]);
    assert!(sink.get("a.yaml").unwrap().contains("pipe: ''"));
    assert!(sink.get("missing.yaml").is_none());
}
