//! Local ONNX Runtime models
//!
//! Every model is fetched from the HuggingFace hub into its own directory
//! under the cache root on first use, then run in-process. A session and its
//! tokenizer sit behind one mutex and are driven from `spawn_blocking`.

mod embedder;
mod ner;
mod nli;

pub use embedder::OnnxEmbedder;
pub use ner::OnnxNer;
pub use nli::OnnxNliScorer;

use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::{DynValue, Tensor};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokenizers::{Encoding, Tokenizer, TruncationParams, TruncationStrategy};

use crate::error::{Error, Result};

/// Hub repository for a model name; bare names are sentence-transformers models
fn hub_repo(model: &str) -> String {
    if model.contains('/') {
        model.to_string()
    } else {
        format!("sentence-transformers/{}", model)
    }
}

/// One loaded model: the runtime session plus its tokenizer
struct LocalModel {
    session: Session,
    tokenizer: Tokenizer,
    max_length: usize,
    token_types: bool,
    dir: PathBuf,
}

/// Padded model inputs for one batch
struct EncodedBatch {
    inputs: Vec<(&'static str, DynValue)>,
    attention_mask: Vec<i64>,
    batch_size: usize,
    seq_len: usize,
}

impl LocalModel {
    /// Download (if needed) and load `onnx/model.onnx` and `tokenizer.json`
    async fn load(
        model: &str,
        cache_root: &Path,
        max_length: usize,
        extra_files: &[&str],
    ) -> Result<Self> {
        let repo = hub_repo(model);
        let dir = cache_root.join(repo.replace('/', "--"));
        std::fs::create_dir_all(&dir)
            .map_err(|e| Error::Config(format!("Failed to create cache directory: {}", e)))?;

        let model_path = dir.join("model.onnx");
        let tokenizer_path = dir.join("tokenizer.json");

        if !model_path.exists() {
            download(&repo, "onnx/model.onnx", &model_path).await?;
        }
        if !tokenizer_path.exists() {
            download(&repo, "tokenizer.json", &tokenizer_path).await?;
        }
        for file in extra_files {
            let path = dir.join(file);
            if !path.exists() {
                download(&repo, file, &path).await?;
            }
        }

        let session = Session::builder()
            .map_err(|e| Error::internal(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| Error::internal(format!("Failed to set optimization level: {}", e)))?
            .with_intra_threads(4)
            .map_err(|e| Error::internal(format!("Failed to set threads: {}", e)))?
            .commit_from_file(&model_path)
            .map_err(|e| Error::internal(format!("Failed to load {}: {}", repo, e)))?;

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| Error::internal(format!("Failed to load tokenizer: {}", e)))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length,
                strategy: TruncationStrategy::LongestFirst,
                ..Default::default()
            }))
            .map_err(|e| Error::internal(format!("Failed to set truncation: {}", e)))?;

        let token_types = session
            .inputs
            .iter()
            .any(|input| input.name == "token_type_ids");

        tracing::info!("Loaded ONNX model {}", repo);

        Ok(Self {
            session,
            tokenizer,
            max_length,
            token_types,
            dir,
        })
    }

    /// Class names from the `id2label` table of the model's `config.json`
    fn id2label(&self) -> Result<Vec<String>> {
        let raw = std::fs::read_to_string(self.dir.join("config.json"))?;
        parse_id2label(&raw)
    }

    /// Pad encodings into `[batch, seq]` tensors
    fn batch(&self, encodings: &[Encoding]) -> Result<EncodedBatch> {
        let batch_size = encodings.len();
        let seq_len = encodings
            .iter()
            .map(|e| e.get_ids().len())
            .max()
            .unwrap_or(0)
            .min(self.max_length);

        let mut input_ids = vec![0i64; batch_size * seq_len];
        let mut attention_mask = vec![0i64; batch_size * seq_len];
        let mut token_type_ids = vec![0i64; batch_size * seq_len];

        for (i, encoding) in encodings.iter().enumerate() {
            let ids = encoding.get_ids();
            let mask = encoding.get_attention_mask();
            let types = encoding.get_type_ids();

            for j in 0..ids.len().min(seq_len) {
                input_ids[i * seq_len + j] = ids[j] as i64;
                attention_mask[i * seq_len + j] = mask[j] as i64;
                token_type_ids[i * seq_len + j] = types[j] as i64;
            }
        }

        let shape = vec![batch_size, seq_len];
        let mut inputs = vec![
            ("input_ids", tensor(&shape, input_ids)?),
            ("attention_mask", tensor(&shape, attention_mask.clone())?),
        ];
        if self.token_types {
            inputs.push(("token_type_ids", tensor(&shape, token_type_ids)?));
        }

        Ok(EncodedBatch {
            inputs,
            attention_mask,
            batch_size,
            seq_len,
        })
    }

    /// Run a batch and copy out the named output (or the first one)
    fn run(&mut self, batch: EncodedBatch, output: &str) -> Result<(Vec<usize>, Vec<f32>)> {
        let outputs = self
            .session
            .run(batch.inputs)
            .map_err(|e| Error::internal(format!("Inference failed: {}", e)))?;

        let output_iter: Vec<_> = outputs.iter().collect();
        let value = output_iter
            .iter()
            .find(|(name, _)| *name == output)
            .or_else(|| output_iter.first())
            .map(|(_, v)| v)
            .ok_or_else(|| Error::internal("No output tensor"))?;

        let (shape, data) = value
            .try_extract_tensor::<f32>()
            .map_err(|e| Error::internal(format!("Failed to extract tensor: {}", e)))?;

        Ok((shape.iter().map(|&d| d as usize).collect(), data.to_vec()))
    }
}

fn tensor(shape: &[usize], values: Vec<i64>) -> Result<DynValue> {
    Tensor::from_array((shape.to_vec(), values.into_boxed_slice()))
        .map(|t| t.into_dyn())
        .map_err(|e| Error::internal(format!("Tensor creation failed: {}", e)))
}

/// Order the `id2label` map of a HuggingFace model config by class id
fn parse_id2label(raw: &str) -> Result<Vec<String>> {
    #[derive(serde::Deserialize)]
    struct ModelConfig {
        id2label: HashMap<String, String>,
    }

    let config: ModelConfig = serde_json::from_str(raw)?;
    let mut labels: Vec<(usize, String)> = config
        .id2label
        .into_iter()
        .map(|(id, label)| {
            id.parse::<usize>()
                .map(|id| (id, label))
                .map_err(|_| Error::Config(format!("Invalid class id in id2label: {}", id)))
        })
        .collect::<Result<_>>()?;
    labels.sort_by_key(|(id, _)| *id);

    if labels.iter().enumerate().any(|(i, (id, _))| i != *id) {
        return Err(Error::Config("id2label class ids are not contiguous".to_string()));
    }
    Ok(labels.into_iter().map(|(_, label)| label).collect())
}

/// Fetch one file of a repository from the HuggingFace hub
async fn download(repo: &str, file: &str, path: &Path) -> Result<()> {
    let url = format!("https://huggingface.co/{}/resolve/main/{}", repo, file);

    tracing::info!("Downloading {} from: {}", file, url);

    let response = reqwest::get(&url)
        .await
        .map_err(|e| Error::internal(format!("Failed to download {}: {}", file, e)))?;

    if !response.status().is_success() {
        return Err(Error::internal(format!(
            "Download of {} failed: HTTP {}",
            file,
            response.status()
        )));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| Error::internal(format!("Failed to read {} bytes: {}", file, e)))?;

    std::fs::write(path, &bytes)
        .map_err(|e| Error::internal(format!("Failed to save {}: {}", file, e)))?;

    tracing::info!("Downloaded {} ({} bytes)", file, bytes.len());

    Ok(())
}
