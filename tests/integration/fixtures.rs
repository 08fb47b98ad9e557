//! Test fixtures for integration tests.
//!
//! Provides helpers for:
//! - Writing graph descriptions into temporary directories
//! - A recording product service
//! - Predefined graphs

use std::collections::HashMap;
use std::path::PathBuf;
use tempfile::TempDir;

use snapgraph::core::TaskGraph;
use snapgraph::graph::{parse_file, ParseOptions, Parameters};
use snapgraph::{Error, ProductService, Result, TaskRecords};

/// Read, split, orbit correction and write: the smallest useful chain.
pub const SPLIT_CHAIN: &str = r#"<graph id="Graph">
  <version>1.0</version>
  <node id="Read">
    <operator>Read</operator>
    <sources/>
    <parameters class="com.bc.ceres.binding.dom.XppDomElement">
      <file>/data/S1A_IW_SLC_a.zip</file>
      <formatName>SENTINEL-1</formatName>
      <sourceBands/>
      <pixelRegion>0,0,25505,13579</pixelRegion>
    </parameters>
  </node>
  <node id="TOPSAR-Split">
    <operator>TOPSAR-Split</operator>
    <sources>
      <sourceProduct refid="Read"/>
    </sources>
    <parameters class="com.bc.ceres.binding.dom.XppDomElement">
      <subswath>IW1</subswath>
      <selectedPolarisations>VV,VH</selectedPolarisations>
      <firstBurstIndex>1</firstBurstIndex>
      <lastBurstIndex>9</lastBurstIndex>
      <wktAoi/>
    </parameters>
  </node>
  <node id="Apply-Orbit-File">
    <operator>Apply-Orbit-File</operator>
    <sources>
      <sourceProduct refid="TOPSAR-Split"/>
    </sources>
    <parameters class="com.bc.ceres.binding.dom.XppDomElement">
      <orbitType>Sentinel Precise (Auto Download)</orbitType>
      <polyDegree>3</polyDegree>
      <continueOnFail>false</continueOnFail>
    </parameters>
  </node>
  <node id="Write">
    <operator>Write</operator>
    <sources>
      <sourceProduct refid="Apply-Orbit-File"/>
    </sources>
    <parameters class="com.bc.ceres.binding.dom.XppDomElement">
      <file>/out/split_orb.dim</file>
      <formatName>BEAM-DIMAP</formatName>
    </parameters>
  </node>
  <applicationData id="Presentation">
    <Description/>
    <node id="Read">
      <displayPosition x="37.0" y="134.0"/>
    </node>
    <node id="Write">
      <displayPosition x="455.0" y="135.0"/>
    </node>
  </applicationData>
</graph>
"#;

/// Two acquisitions through back-geocoding into a terrain-corrected
/// coherence and phase product.
pub const INSAR: &str = r#"<graph id="Graph">
  <version>1.0</version>
  <node id="Read">
    <operator>Read</operator>
    <sources/>
    <parameters class="com.bc.ceres.binding.dom.XppDomElement">
      <file>/data/master.zip</file>
    </parameters>
  </node>
  <node id="Read(2)">
    <operator>Read</operator>
    <sources/>
    <parameters class="com.bc.ceres.binding.dom.XppDomElement">
      <file>/data/slave.zip</file>
    </parameters>
  </node>
  <node id="TOPSAR-Split">
    <operator>TOPSAR-Split</operator>
    <sources>
      <sourceProduct refid="Read"/>
    </sources>
    <parameters class="com.bc.ceres.binding.dom.XppDomElement">
      <subswath>IW1</subswath>
      <selectedPolarisations>VV</selectedPolarisations>
    </parameters>
  </node>
  <node id="TOPSAR-Split(2)">
    <operator>TOPSAR-Split</operator>
    <sources>
      <sourceProduct refid="Read(2)"/>
    </sources>
    <parameters class="com.bc.ceres.binding.dom.XppDomElement">
      <subswath>IW1</subswath>
      <selectedPolarisations>VV</selectedPolarisations>
    </parameters>
  </node>
  <node id="Back-Geocoding">
    <operator>Back-Geocoding</operator>
    <sources>
      <sourceProduct refid="TOPSAR-Split"/>
      <sourceProduct.1 refid="TOPSAR-Split(2)"/>
    </sources>
    <parameters class="com.bc.ceres.binding.dom.XppDomElement">
      <demName>SRTM 3Sec</demName>
      <demResamplingMethod>BICUBIC_INTERPOLATION</demResamplingMethod>
      <maskOutAreaWithoutElevation>true</maskOutAreaWithoutElevation>
    </parameters>
  </node>
  <node id="Interferogram">
    <operator>Interferogram</operator>
    <sources>
      <sourceProduct refid="Back-Geocoding"/>
    </sources>
    <parameters class="com.bc.ceres.binding.dom.XppDomElement">
      <subtractFlatEarthPhase>true</subtractFlatEarthPhase>
      <includeCoherence>true</includeCoherence>
      <cohWinAz>3</cohWinAz>
      <cohWinRg>10</cohWinRg>
    </parameters>
  </node>
  <node id="Terrain-Correction">
    <operator>Terrain-Correction</operator>
    <sources>
      <sourceProduct refid="Interferogram"/>
    </sources>
    <parameters class="com.bc.ceres.binding.dom.XppDomElement">
      <sourceBands/>
      <sourceBands>placeholder</sourceBands>
      <demName>SRTM 3Sec</demName>
      <pixelSpacingInMeter>13.93</pixelSpacingInMeter>
      <mapProjection>GEOGCS[&quot;WGS84(DD)&quot;]</mapProjection>
    </parameters>
  </node>
  <node id="Write">
    <operator>Write</operator>
    <sources>
      <sourceProduct refid="Terrain-Correction"/>
    </sources>
    <parameters class="com.bc.ceres.binding.dom.XppDomElement">
      <file>/out/ifg_tc.dim</file>
      <formatName>BEAM-DIMAP</formatName>
    </parameters>
  </node>
  <applicationData id="Presentation">
    <Description/>
  </applicationData>
</graph>
"#;

/// A graph file inside a temporary directory.
pub struct GraphFile {
    /// Keeps the directory alive for the lifetime of the fixture.
    pub temp_dir: TempDir,
    pub path: PathBuf,
}

impl GraphFile {
    pub fn new(contents: &str) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("graph.xml");
        std::fs::write(&path, contents).expect("Failed to write graph file");
        Self { temp_dir, path }
    }

    pub fn parse(&self) -> TaskRecords {
        parse_file(&self.path, ParseOptions::default()).expect("Failed to parse graph")
    }

    /// Launcher-style argument list: the graph path followed by `overrides`.
    pub fn args(&self, overrides: &[&str]) -> Vec<String> {
        let mut args = vec![self.path.to_string_lossy().into_owned()];
        args.extend(overrides.iter().map(|s| s.to_string()));
        args
    }
}

/// A product produced by [`RecordingService`].
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub label: String,
    pub bands: Vec<String>,
}

/// Fake backend that records calls and the parameter bundles it receives.
pub struct RecordingService {
    /// Calls in the order received, e.g. `create:TOPSAR-Split`.
    pub calls: Vec<String>,
    pub bundles: HashMap<String, Parameters>,
    /// Bands exposed by products created by each operator.
    pub bands_by_operator: HashMap<String, Vec<String>>,
    pub fail_operator: Option<String>,
}

impl RecordingService {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            bundles: HashMap::new(),
            bands_by_operator: HashMap::new(),
            fail_operator: None,
        }
    }

    pub fn with_bands(mut self, operator: &str, bands: &[&str]) -> Self {
        self.bands_by_operator.insert(
            operator.to_string(),
            bands.iter().map(|b| b.to_string()).collect(),
        );
        self
    }

    pub fn position(&self, call: &str) -> usize {
        self.calls
            .iter()
            .position(|c| c == call)
            .unwrap_or_else(|| panic!("call {} not recorded", call))
    }
}

impl ProductService for RecordingService {
    type Product = Product;

    fn read_product(&mut self, file: &str) -> Result<Product> {
        self.calls.push(format!("read:{}", file));
        Ok(Product {
            label: file.to_string(),
            bands: vec!["i_VV".to_string(), "q_VV".to_string()],
        })
    }

    fn create_product(
        &mut self,
        operator: &str,
        parameters: &Parameters,
        sources: &[&Product],
    ) -> Result<Product> {
        if self.fail_operator.as_deref() == Some(operator) {
            return Err(Error::Service {
                operator: operator.to_string(),
                message: "simulated failure".to_string(),
            });
        }
        self.calls.push(format!("create:{}", operator));
        self.bundles.insert(operator.to_string(), parameters.clone());
        let labels: Vec<&str> = sources.iter().map(|s| s.label.as_str()).collect();
        Ok(Product {
            label: format!("{}({})", operator, labels.join(",")),
            bands: self
                .bands_by_operator
                .get(operator)
                .cloned()
                .unwrap_or_default(),
        })
    }

    fn write_product(&mut self, product: &Product, file: &str, format_name: &str) -> Result<()> {
        self.calls
            .push(format!("write:{}:{}:{}", product.label, file, format_name));
        Ok(())
    }

    fn band_names(&self, product: &Product) -> Vec<String> {
        product.bands.clone()
    }
}

/// Materialize records into a graph carrying [`Product`]s.
pub fn materialize(records: &TaskRecords) -> TaskGraph<Product> {
    let (graph, broken) = TaskGraph::materialize(records);
    assert!(broken.is_empty(), "unexpected broken edges: {:?}", broken);
    graph
}
