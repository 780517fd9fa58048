//! Response extraction
//!
//! Turns raw model text plus provider citations into an `AnalysisResult`.
//! When the text holds several fenced JSON blocks the LAST one wins, since
//! the prompt asks for the block at the end of the reply.
//!
//! Fences are scanned in order, open then close, so a block body never
//! crosses a closing fence. A closing fence must end its line; backticks
//! in the middle of a line (e.g. inside a JSON string) do not close a block.
//! Blocks tagged `json` are always candidates; untagged blocks only when
//! their body starts with `{`.

use crate::error::PriceScoutError;
use crate::models::{AnalysisResult, Citation, ProductAnalysis, SourceCitation};
use crate::Result;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use tracing::{debug, warn};

lazy_static! {
    // Opening fence and its optional language tag.
    static ref OPEN_FENCE: Regex = Regex::new(r"```[ \t]*([A-Za-z0-9_+-]*)").unwrap();
    // Closing fence: only trailing whitespace allowed before end of line.
    static ref CLOSE_FENCE: Regex = Regex::new(r"(?m)```[ \t\r]*$").unwrap();
}

/// A closed fenced block: language tag and raw body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FencedBlock<'a> {
    pub tag: &'a str,
    pub body: &'a str,
}

impl FencedBlock<'_> {
    fn is_structured(&self) -> bool {
        if self.tag.eq_ignore_ascii_case("json") {
            return true;
        }
        self.tag.is_empty() && self.body.trim_start().starts_with('{')
    }
}

/// All closed fenced blocks in order of appearance. An unclosed trailing
/// fence is ignored.
pub fn fenced_blocks(text: &str) -> Vec<FencedBlock<'_>> {
    let mut blocks = Vec::new();
    let mut pos = 0;

    while let Some(open) = OPEN_FENCE.captures_at(text, pos) {
        let (Some(fence), Some(tag)) = (open.get(0), open.get(1)) else {
            break;
        };
        let Some(close) = CLOSE_FENCE.find_at(text, fence.end()) else {
            break;
        };

        blocks.push(FencedBlock {
            tag: tag.as_str(),
            body: &text[fence.end()..close.start()],
        });
        pos = close.end();
    }

    blocks
}

/// Trimmed body of the last structured block in `text`, if any
pub fn find_structured_block(text: &str) -> Option<&str> {
    fenced_blocks(text)
        .into_iter()
        .filter(FencedBlock::is_structured)
        .last()
        .map(|b| b.body.trim())
}

/// Extract the typed analysis and deduplicated citations from a model reply
pub fn extract_result(
    raw_text: Option<&str>,
    raw_citations: &[SourceCitation],
) -> Result<AnalysisResult> {
    let text = match raw_text {
        Some(t) if !t.trim().is_empty() => t,
        _ => return Err(PriceScoutError::EmptyResponse),
    };

    let block = find_structured_block(text).ok_or_else(|| {
        debug!(raw_len = text.len(), raw = %text, "No fenced JSON block in model reply");
        PriceScoutError::NoStructuredBlock
    })?;

    let analysis: ProductAnalysis = serde_json::from_str(block).map_err(|e| {
        warn!("Structured block rejected: {}", e);
        debug!(block = %block, "Rejected block contents");
        PriceScoutError::MalformedStructuredData(e.to_string())
    })?;

    Ok(AnalysisResult {
        analysis,
        citations: dedupe_citations(raw_citations),
    })
}

/// Drop citations without a uri and keep the first occurrence of each uri
pub fn dedupe_citations(raw: &[SourceCitation]) -> Vec<Citation> {
    let mut seen = HashSet::new();

    raw.iter()
        .filter_map(|c| {
            let uri = c.uri.as_deref().map(str::trim).filter(|u| !u.is_empty())?;
            if !seen.insert(uri.to_string()) {
                return None;
            }
            Some(Citation {
                uri: uri.to_string(),
                title: c.title.clone(),
            })
        })
        .collect()
}
