//! The Caption Gemini node's item processor.
//!
//! Items are handled strictly in order, one request in flight at a time.
//! Each item resolves its own parameters, gets its own provider bound to its
//! own API key, and produces exactly one output record, unless the batch is
//! aborted by a failure with continue-on-failure disabled.

use crate::error::{NodeError, NodeResult};
use crate::gemini::{GeminiProviderFactory, ProviderFactory};
use crate::params::{NodeParameters, ParameterSource};
use crate::types::{InputItem, OutputItem};
use std::ops::ControlFlow;
use std::sync::Arc;

/// Host settings for one execution.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecuteOptions {
    /// Record failures as error items instead of aborting the batch
    pub continue_on_fail: bool,
}

/// Counts reported after a batch completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
    /// The output consumer ended the batch before every item was processed
    pub stopped: bool,
}

/// The Caption Gemini node.
#[derive(Clone)]
pub struct CaptionGeminiNode {
    factory: Arc<dyn ProviderFactory>,
}

impl CaptionGeminiNode {
    pub fn new(factory: Arc<dyn ProviderFactory>) -> Self {
        Self { factory }
    }

    /// Node talking to the Gemini REST API at `endpoint`.
    pub fn with_endpoint(endpoint: &str) -> Self {
        Self::new(Arc::new(GeminiProviderFactory::new(endpoint)))
    }

    /// Run the node over a batch, calling `on_output` for each record as it
    /// is produced.
    ///
    /// Records arrive in input order. When an item fails and
    /// `continue_on_fail` is off, the records already delivered stand and the
    /// error is returned with the failing item's index; later items are never
    /// processed. `on_output` returning `ControlFlow::Break` stops the batch
    /// after the current record, leaving the remaining items undispatched.
    pub async fn execute_with<F>(
        &self,
        items: &[InputItem],
        params: &dyn ParameterSource,
        options: ExecuteOptions,
        mut on_output: F,
    ) -> NodeResult<BatchSummary>
    where
        F: FnMut(OutputItem) -> ControlFlow<()>,
    {
        let mut summary = BatchSummary::default();

        for (index, item) in items.iter().enumerate() {
            let record = match self.process_item(index, item, params).await {
                Ok(record) => {
                    summary.succeeded += 1;
                    record
                }
                Err(e) if options.continue_on_fail => {
                    tracing::warn!("Item {index} failed, continuing: {}", e.message());
                    summary.failed += 1;
                    OutputItem::failure(item, index, e.message())
                }
                Err(e) => {
                    let e = e.with_item_index(index);
                    tracing::error!("Aborting batch: {e}");
                    return Err(e);
                }
            };

            if on_output(record).is_break() {
                summary.stopped = true;
                tracing::warn!(
                    "Output consumer stopped the batch after item {index}; {} item(s) not processed",
                    items.len() - index - 1
                );
                break;
            }
        }

        if summary.failed > 0 {
            tracing::warn!(
                "Caption batch: {} succeeded, {} failed",
                summary.succeeded,
                summary.failed
            );
        } else {
            tracing::info!("Caption batch: {} succeeded", summary.succeeded);
        }
        Ok(summary)
    }

    /// Run the node over a batch and collect every output record.
    pub async fn execute(
        &self,
        items: &[InputItem],
        params: &dyn ParameterSource,
        options: ExecuteOptions,
    ) -> NodeResult<Vec<OutputItem>> {
        let mut outputs = Vec::with_capacity(items.len());
        self.execute_with(items, params, options, |record| {
            outputs.push(record);
            ControlFlow::Continue(())
        })
        .await?;
        Ok(outputs)
    }

    async fn process_item(
        &self,
        index: usize,
        item: &InputItem,
        params: &dyn ParameterSource,
    ) -> Result<OutputItem, NodeError> {
        let parameters = NodeParameters::resolve(params, index, item)?;
        let request = parameters.to_request();

        let provider = self.factory.create(&parameters.api_key);
        tracing::debug!(
            item = index,
            provider = provider.name(),
            model = request.model.id(),
            mode = ?request.mode,
            "Dispatching caption request for {}",
            request.media.url
        );

        let result = provider.generate(&request).await?;
        Ok(OutputItem::success(&result, index))
    }
}

impl Default for CaptionGeminiNode {
    fn default() -> Self {
        Self::new(Arc::new(GeminiProviderFactory::default()))
    }
}
