//! Raiko2 Driver - block derivation and manifest creation.
//!
//! This module provides the `Driver` type that creates Taiko manifests
//! from L1 batch proposal events.

use raiko2_primitives::{ProofContext, RaikoResult, TaikoManifest, TaikoProverData};
use reth_ethereum_primitives::Block;
use tracing::info;

/// Block derivation driver.
#[derive(Debug, Clone, Default)]
pub struct Driver;

impl Driver {
    /// Create a new driver.
    pub fn new() -> Self {
        Self
    }

    /// Create taiko manifest from proof context and blocks.
    ///
    /// This function fetches L1 batch proposal data and constructs
    /// the manifest needed for guest program execution.
    pub async fn taiko_manifest(
        &self,
        ctx: &ProofContext,
        blocks: &[Block],
    ) -> RaikoResult<TaikoManifest> {
        info!(
            "Creating Taiko manifest for batch {} with {} blocks",
            ctx.request.batch_id,
            blocks.len()
        );

        // TODO: Implement actual L1 batch proposal fetching using raiko2-protocol
        // For now, return a placeholder manifest

        let prover_data = TaikoProverData {
            prover: ctx
                .request
                .prover
                .as_ref()
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            graffiti: ctx
                .request
                .graffiti
                .as_ref()
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
        };

        Ok(TaikoManifest {
            batch_id: ctx.request.batch_id,
            l1_header: alloy_consensus::Header::default(),
            tx_data_from_calldata: vec![],
            tx_data_from_blob: vec![],
            blob_commitments: None,
            blob_proofs: None,
            blob_proof_type: ctx
                .request
                .blob_proof_type
                .as_ref()
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            prover_data,
        })
    }
}
