//! The processing backend the executor dispatches to.
//!
//! [`ProductService`] is the whole surface the executor needs: read a
//! product, run an operator on products, write a product, and list a
//! product's band names. [`DryRunService`] implements it without touching
//! any image data; it records every call and synthesizes products whose
//! band lists follow the graph, which is enough to inspect what a real run
//! would do.

use crate::core::bands::SOURCE_BANDS;
use crate::graph::Parameters;
use crate::{glog_debug, Result};

pub trait ProductService {
    /// Handle to a product produced by the backend.
    type Product;

    fn read_product(&mut self, file: &str) -> Result<Self::Product>;

    fn create_product(
        &mut self,
        operator: &str,
        parameters: &Parameters,
        sources: &[&Self::Product],
    ) -> Result<Self::Product>;

    fn write_product(&mut self, product: &Self::Product, file: &str, format_name: &str)
        -> Result<()>;

    fn band_names(&self, product: &Self::Product) -> Vec<String>;
}

/// Band names given to products read by [`DryRunService`] unless
/// configured otherwise.
pub const DEFAULT_READ_BANDS: [&str; 4] = ["i_VV", "q_VV", "i_VH", "q_VH"];

/// A synthetic product: a readable label and its band names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DryRunProduct {
    pub label: String,
    pub bands: Vec<String>,
}

/// One call received by [`DryRunService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceCall {
    Read {
        file: String,
    },
    Create {
        operator: String,
        parameters: Parameters,
        sources: Vec<String>,
    },
    Write {
        product: String,
        file: String,
        format_name: String,
    },
}

#[derive(Debug, Clone)]
pub struct DryRunService {
    read_bands: Vec<String>,
    calls: Vec<ServiceCall>,
}

impl DryRunService {
    pub fn new() -> Self {
        Self::with_read_bands(&DEFAULT_READ_BANDS)
    }

    pub fn with_read_bands<S: AsRef<str>>(bands: &[S]) -> Self {
        Self {
            read_bands: bands.iter().map(|b| b.as_ref().to_string()).collect(),
            calls: Vec::new(),
        }
    }

    pub fn calls(&self) -> &[ServiceCall] {
        &self.calls
    }
}

impl Default for DryRunService {
    fn default() -> Self {
        Self::new()
    }
}

impl ProductService for DryRunService {
    type Product = DryRunProduct;

    fn read_product(&mut self, file: &str) -> Result<DryRunProduct> {
        glog_debug!("dry-run: read {}", file);
        self.calls.push(ServiceCall::Read {
            file: file.to_string(),
        });
        Ok(DryRunProduct {
            label: file.to_string(),
            bands: self.read_bands.clone(),
        })
    }

    fn create_product(
        &mut self,
        operator: &str,
        parameters: &Parameters,
        sources: &[&DryRunProduct],
    ) -> Result<DryRunProduct> {
        glog_debug!("dry-run: {} on {} sources", operator, sources.len());
        let requested: Vec<String> = parameters
            .get(SOURCE_BANDS)
            .unwrap_or_default()
            .split(',')
            .filter(|b| !b.is_empty())
            .map(str::to_string)
            .collect();

        let bands = if requested.is_empty() {
            let mut bands: Vec<String> = Vec::new();
            for band in sources.iter().flat_map(|s| s.bands.iter()) {
                if !bands.contains(band) {
                    bands.push(band.clone());
                }
            }
            bands
        } else {
            requested
        };

        let labels: Vec<String> = sources.iter().map(|s| s.label.clone()).collect();
        self.calls.push(ServiceCall::Create {
            operator: operator.to_string(),
            parameters: parameters.clone(),
            sources: labels.clone(),
        });
        Ok(DryRunProduct {
            label: format!("{}({})", operator, labels.join(", ")),
            bands,
        })
    }

    fn write_product(
        &mut self,
        product: &DryRunProduct,
        file: &str,
        format_name: &str,
    ) -> Result<()> {
        glog_debug!("dry-run: write {} as {} to {}", product.label, format_name, file);
        self.calls.push(ServiceCall::Write {
            product: product.label.clone(),
            file: file.to_string(),
            format_name: format_name.to_string(),
        });
        Ok(())
    }

    fn band_names(&self, product: &DryRunProduct) -> Vec<String> {
        product.bands.clone()
    }
}
