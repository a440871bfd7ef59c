//! Post-processing of raw model outputs
//!
//! Pure functions over logits and hidden states, shared by the local ONNX
//! models and kept free of any runtime dependency.

use super::ner::NerSpan;

/// Mean of the token embeddings whose attention mask is set
///
/// `token_embeddings` holds one row of `hidden_size` values per mask entry.
pub fn mean_pool(
    token_embeddings: &[f32],
    attention_mask: &[i64],
    hidden_size: usize,
) -> Vec<f32> {
    let mut sum = vec![0.0f32; hidden_size];
    if hidden_size == 0 {
        return sum;
    }

    let mut count = 0.0f32;
    for (row, &mask) in token_embeddings.chunks(hidden_size).zip(attention_mask) {
        if mask <= 0 {
            continue;
        }
        let weight = mask as f32;
        for (slot, value) in sum.iter_mut().zip(row) {
            *slot += value * weight;
        }
        count += weight;
    }

    if count > 0.0 {
        for value in &mut sum {
            *value /= count;
        }
    }
    sum
}

/// Scale to unit length; zero vectors are left unchanged
pub fn l2_normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in vector.iter_mut() {
            *value /= norm;
        }
    }
}

/// Numerically stable softmax; a non-positive temperature falls back to 1
pub fn softmax(values: &[f32], temperature: f32) -> Vec<f32> {
    let temperature = if temperature > 0.0 { temperature } else { 1.0 };
    let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = values
        .iter()
        .map(|v| ((v - max) / temperature).exp())
        .collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Index of the entailment class in an NLI model's label list
pub fn entailment_index(id2label: &[String]) -> Option<usize> {
    id2label
        .iter()
        .position(|label| label.to_lowercase().starts_with("entail"))
}

/// Single-label zero-shot distribution from per-hypothesis NLI logits
///
/// Each row holds the class logits of one (premise, hypothesis) pair. The
/// entailment logits are compared across hypotheses with a softmax, so the
/// result sums to 1 over the candidate labels.
pub fn entailment_distribution(logits: &[Vec<f32>], entailment: usize) -> Vec<f32> {
    let entail: Vec<f32> = logits
        .iter()
        .map(|row| row.get(entailment).copied().unwrap_or(f32::NEG_INFINITY))
        .collect();
    softmax(&entail, 1.0)
}

/// Position of the largest value; 0 for an empty row
pub fn argmax(row: &[f32]) -> usize {
    row.iter()
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |best, (i, &v)| {
            if v > best.1 {
                (i, v)
            } else {
                best
            }
        })
        .0
}

/// Map token-classification tags onto the recognizer label set
fn entity_label(tag: &str) -> String {
    match tag {
        "PER" => "PERSON".to_string(),
        "LOC" => "GPE".to_string(),
        other => other.to_uppercase(),
    }
}

/// Split a `B-ORG` style tag into its prefix and entity type; `None` for `O`
fn split_tag(tag: &str) -> Option<(&str, &str)> {
    match tag.split_once('-') {
        Some((prefix, kind)) => Some((prefix, kind)),
        None if tag == "O" => None,
        None => Some(("B", tag)),
    }
}

/// Group per-token BIO tags into entity spans
///
/// `tokens` holds `(start, end, tag)` with byte offsets into `text`; special
/// tokens carry an empty range and are skipped. A token continues the open
/// entity when it has the same type and is either tagged `I-` or is a subword
/// directly adjacent to it.
pub fn decode_bio_spans(text: &str, tokens: &[(usize, usize, &str)]) -> Vec<NerSpan> {
    let mut spans = Vec::new();
    let mut open: Option<(usize, usize, &str)> = None;

    for &(start, end, tag) in tokens {
        if start >= end {
            continue;
        }
        let Some((prefix, kind)) = split_tag(tag) else {
            close_span(text, &mut open, &mut spans);
            continue;
        };

        let continues = match open {
            Some((_, open_end, open_kind)) => {
                open_kind == kind && (prefix == "I" || start == open_end)
            }
            None => false,
        };

        if continues {
            if let Some(current) = open.as_mut() {
                current.1 = end;
            }
        } else {
            close_span(text, &mut open, &mut spans);
            open = Some((start, end, kind));
        }
    }
    close_span(text, &mut open, &mut spans);

    spans
}

fn close_span(text: &str, open: &mut Option<(usize, usize, &str)>, spans: &mut Vec<NerSpan>) {
    let Some((start, end, kind)) = open.take() else {
        return;
    };
    let surface = text.get(start..end).map(str::trim).unwrap_or_default();
    if !surface.is_empty() {
        spans.push(NerSpan::new(surface, entity_label(kind)));
    }
}

/// Split `text` at line boundaries into pieces of at most `max_chars`
/// characters where possible; a single longer line becomes its own piece
pub fn text_segments(text: &str, max_chars: usize) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0usize;
    let mut pos = 0usize;
    let mut chars = 0usize;

    for line in text.split_inclusive('\n') {
        let line_chars = line.chars().count();
        if chars > 0 && chars + line_chars > max_chars {
            segments.push(&text[start..pos]);
            start = pos;
            chars = 0;
        }
        pos += line.len();
        chars += line_chars;
    }
    if start < text.len() {
        segments.push(&text[start..]);
    }

    segments
        .into_iter()
        .filter(|segment| !segment.trim().is_empty())
        .collect()
}
