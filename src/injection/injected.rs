//! Injected documents and their shreds.

use std::fmt;
use std::sync::Arc;

use smol_str::SmolStr;
use text_size::{TextRange, TextSize};

use super::escaper::Escaper;
use crate::base::{
    DocumentId, LanguageId, NodeId, Result, TextEdit, TextRangeExt, TreeError,
    UnsupportedOperation,
};
use crate::document::TreeWriter;
use crate::manipulator;

/// One contiguous piece of an injected document and the host sub-range it
/// was decoded from.
#[derive(Clone)]
pub struct Shred {
    pub(crate) host: NodeId,
    pub(crate) host_start: TextSize,
    pub(crate) range_in_host: TextRange,
    pub(crate) prefix: SmolStr,
    pub(crate) suffix: SmolStr,
    pub(crate) escaper: Arc<dyn Escaper>,
    pub(crate) range: TextRange,
    pub(crate) value_range: TextRange,
    pub(crate) fully_decoded: bool,
}

impl fmt::Debug for Shred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shred")
            .field("host", &self.host)
            .field("range_in_host", &self.range_in_host)
            .field("prefix", &self.prefix)
            .field("suffix", &self.suffix)
            .field("range", &self.range)
            .field("fully_decoded", &self.fully_decoded)
            .finish()
    }
}

impl Shred {
    pub fn host(&self) -> NodeId {
        self.host
    }

    /// Source range, relative to the host node.
    pub fn range_in_host(&self) -> TextRange {
        self.range_in_host
    }

    /// Source range in host document coordinates.
    pub fn host_range(&self) -> TextRange {
        self.range_in_host + self.host_start
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Range in the injected text, prefix and suffix included.
    pub fn range(&self) -> TextRange {
        self.range
    }

    /// Range of the decoded host text in the injected text.
    pub fn value_range(&self) -> TextRange {
        self.value_range
    }

    pub fn escaper(&self) -> &Arc<dyn Escaper> {
        &self.escaper
    }

    /// `false` when the host range held text the escaper could not decode;
    /// such shreds refuse edits.
    pub fn is_fully_decoded(&self) -> bool {
        self.fully_decoded
    }

    /// Host offset (relative to the host node) of a value-relative offset.
    /// The end of the value maps to the end of the host range.
    fn value_to_host(&self, offset: TextSize) -> Option<TextSize> {
        if offset == self.value_range.len() {
            return Some(self.range_in_host.end());
        }
        self.escaper.host_offset_for(offset, self.range_in_host)
    }
}

/// Text in one language embedded in the hosts of another document,
/// assembled from shreds in host order.
///
/// A snapshot: once the host changes, the injection has to be computed
/// again and edits through a stale snapshot are rejected.
#[derive(Debug, Clone)]
pub struct InjectedDocument {
    pub(crate) language: LanguageId,
    pub(crate) host_document: DocumentId,
    pub(crate) host_stamp: u64,
    pub(crate) text: String,
    pub(crate) shreds: Vec<Shred>,
}

impl InjectedDocument {
    pub fn language(&self) -> &LanguageId {
        &self.language
    }

    pub fn host_document(&self) -> DocumentId {
        self.host_document
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn shreds(&self) -> &[Shred] {
        &self.shreds
    }

    /// The shred whose injected range covers `offset`. The end of the
    /// text belongs to the last shred.
    pub fn shred_at(&self, offset: TextSize) -> Option<&Shred> {
        self.shreds
            .iter()
            .find(|s| s.range.contains(offset))
            .or_else(|| self.shreds.last().filter(|s| s.range.end() == offset))
    }

    /// Host document offset of an injected offset. `None` inside a prefix
    /// or suffix, or where the escaper cannot map back.
    pub fn injected_to_host(&self, offset: TextSize) -> Option<TextSize> {
        let shred = self
            .shreds
            .iter()
            .find(|s| s.value_range.contains_inclusive(offset))?;
        let local = offset - shred.value_range.start();
        shred.value_to_host(local).map(|host| host + shred.host_start)
    }

    /// Injected offset of a host document offset. `None` outside every
    /// shred or inside an escape sequence.
    pub fn host_to_injected(&self, offset: TextSize) -> Option<TextSize> {
        self.shreds.iter().find_map(|shred| {
            if !shred.host_range().contains_inclusive(offset) {
                return None;
            }
            let local = offset - shred.host_start;
            let before = TextRange::new(shred.range_in_host.start(), local);
            let mut decoded = String::new();
            shred
                .escaper
                .decode(before, &mut decoded)
                .then(|| shred.value_range.start() + TextSize::of(decoded.as_str()))
        })
    }

    /// Replace `range` of the injected text with `text`, writing the change
    /// back into the host through the originating shred's escaper and the
    /// host's manipulator. Returns the host node after the edit.
    ///
    /// Only the changed part is re-encoded, so rewriting a shred with its
    /// own text leaves the host untouched. Edits that span shreds, touch a
    /// prefix or suffix, or cannot be encoded are rejected.
    pub fn replace(
        &self,
        writer: &mut TreeWriter<'_>,
        range: TextRange,
        text: &str,
    ) -> Result<NodeId> {
        let reject = |why: String| TreeError::unsupported(UnsupportedOperation::EditRejected(why));
        if writer.document().id() != self.host_document {
            return Err(TreeError::unsupported(UnsupportedOperation::CrossDocument));
        }
        if writer.tree().stamp() != self.host_stamp {
            return Err(reject(format!(
                "injection into {} is stale",
                self.host_document
            )));
        }
        let shred = self
            .shreds
            .iter()
            .find(|s| s.value_range.contains_range(range))
            .ok_or_else(|| {
                reject(format!("{range:?} spans shreds or touches a prefix or suffix"))
            })?;
        if !shred.fully_decoded {
            return Err(reject(format!("{} holds undecodable text", shred.host)));
        }

        let old_value = &self.text[shred.value_range];
        let local = range - shred.value_range.start();
        let new_value = local
            .replace_in(old_value, text)
            .ok_or_else(|| reject(format!("{range:?} is not on a character boundary")))?;
        let Some(edit) = TextEdit::between(old_value, &new_value) else {
            return Ok(shred.host);
        };

        let inserted = &new_value[edit.new_range()];
        let start = shred.value_to_host(edit.range.start());
        let end = shred.value_to_host(edit.range.end());
        let (Some(start), Some(end)) = (start, end) else {
            return Err(reject(format!("{:?} does not map back to the host", edit.range)));
        };
        let encoded = shred
            .escaper
            .encode(inserted)
            .ok_or_else(|| reject(format!("{inserted:?} cannot be written into the host")))?;

        let services = Arc::clone(writer.document().services());
        let manipulator = manipulator::require_for(&services, writer.tree(), shred.host)?;
        let host = manipulator.set_content(writer, shred.host, TextRange::new(start, end), &encoded)?;
        tracing::debug!(
            "[INJECTION] wrote {:?} into {} of {}",
            encoded,
            host,
            self.host_document
        );
        Ok(host)
    }
}
