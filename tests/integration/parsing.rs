//! Graph files to task records.

use snapgraph::graph::{parse_file, ParseOptions, TaskIdentity};
use snapgraph::Error;

use crate::fixtures::{GraphFile, INSAR, SPLIT_CHAIN};

#[test]
fn test_split_chain_tasks_in_file_order() {
    let records = GraphFile::new(SPLIT_CHAIN).parse();
    assert_eq!(
        records.keys().collect::<Vec<_>>(),
        vec!["Read1", "TOPSAR-Split1", "Apply-Orbit-File1", "Write1"]
    );

    let read = records.get("Read1").unwrap();
    assert_eq!(read.operator, "Read");
    assert_eq!(read.parameters.get("file"), Some("/data/S1A_IW_SLC_a.zip"));
    assert_eq!(read.parameters.get("pixelRegion"), Some("0,0,25505,13579"));
    assert!(!read.parameters.contains_key("sourceBands"));
    assert!(read.sources.is_empty());

    let split = records.get("TOPSAR-Split1").unwrap();
    assert_eq!(split.parameters.get("selectedPolarisations"), Some("VV,VH"));
    assert!(!split.parameters.contains_key("wktAoi"));
}

#[test]
fn test_presentation_block_does_not_redefine_tasks() {
    let records = GraphFile::new(SPLIT_CHAIN).parse();
    // The presentation block repeats <node id="Read"> without an operator.
    assert_eq!(records.len(), 4);
    assert_eq!(records.get("Read1").unwrap().operator, "Read");
    assert_eq!(records.get("Write1").unwrap().parameters.len(), 2);
}

#[test]
fn test_tasks_after_presentation_marker_are_absent() {
    let text = r#"<graph id="Graph">
  <node id="Read">
    <operator>Read</operator>
  </node>
  <applicationData id="Presentation">
  </applicationData>
  <node id="Write">
    <operator>Write</operator>
    <sources>
      <sourceProduct refid="Read"/>
    </sources>
  </node>
</graph>"#;
    let records = GraphFile::new(text).parse();
    assert_eq!(records.keys().collect::<Vec<_>>(), vec!["Read1"]);
    assert!(records.get("Read1").unwrap().next_tasks.is_empty());
}

#[test]
fn test_next_tasks_invert_sources() {
    let records = GraphFile::new(INSAR).parse();
    for record in records.iter() {
        for source in &record.sources {
            let upstream = records.get(&source.key()).unwrap();
            assert!(
                upstream.next_tasks.contains(&record.identity()),
                "{} should list {} as next task",
                upstream.key(),
                record.key()
            );
        }
    }
    let read2 = records.get("Read2").unwrap();
    assert_eq!(read2.next_tasks, vec![TaskIdentity::new("TOPSAR-Split", "2")]);
}

#[test]
fn test_numbered_sources_keep_order() {
    let records = GraphFile::new(INSAR).parse();
    let bg = records.get("Back-Geocoding1").unwrap();
    assert_eq!(
        bg.sources,
        vec![
            TaskIdentity::new("TOPSAR-Split", "1"),
            TaskIdentity::new("TOPSAR-Split", "2"),
        ]
    );
}

#[test]
fn test_parameter_filtering() {
    let records = GraphFile::new(INSAR).parse();
    let tc = records.get("Terrain-Correction1").unwrap();
    assert_eq!(tc.parameters.get("sourceBands"), Some("placeholder"));
    assert_eq!(tc.parameters.get("pixelSpacingInMeter"), Some("13.93"));
    assert!(!tc.parameters.contains_key("mapProjection"));
}

#[test]
fn test_multiline_parameter_value() {
    let text = "<node id=\"BandMaths\">\n  <operator>BandMaths</operator>\n  <parameters>\n    <expression>Sigma0_VV *\n      2</expression>\n  </parameters>\n</node>\n";
    let records = GraphFile::new(text).parse();
    let params = &records.get("BandMaths1").unwrap().parameters;
    assert_eq!(params.get("expression"), Some("Sigma0_VV *\n2"));
}

#[test]
fn test_unnumbered_duplicates_collide() {
    let text = "<node id=\"Read\">\n<operator>Read</operator>\n</node>\n<node id=\"Read\">\n<operator>Read</operator>\n</node>\n";
    let file = GraphFile::new(text);
    assert_eq!(file.parse().len(), 1);

    let err = parse_file(
        &file.path,
        ParseOptions {
            strict_identities: true,
        },
    )
    .unwrap_err();
    assert!(matches!(err, Error::DuplicateTask(key) if key == "Read1"));
}

#[test]
fn test_missing_file_is_io_error() {
    let file = GraphFile::new("");
    let err = parse_file(
        &file.path.with_file_name("absent.xml"),
        ParseOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn test_json_export() {
    let records = GraphFile::new(SPLIT_CHAIN).parse();
    let json = serde_json::to_value(&records).unwrap();
    assert_eq!(json["TOPSAR-Split1"]["parameters"]["subswath"], "IW1");
    assert_eq!(json["Read1"]["next_tasks"][0]["name"], "TOPSAR-Split");
}
