//! Injector protocol.

use std::sync::Arc;

use smol_str::SmolStr;
use text_size::{TextRange, TextSize};

use super::injected::{InjectedDocument, Shred};
use crate::base::{LanguageId, NodeId, Result, TreeError, UnsupportedOperation};
use crate::manipulator::check_range;
use crate::tree::{SyntaxKind, SyntaxTree};
use crate::workspace::Services;

/// Places foreign-language documents inside host nodes. One injected
/// document may be assembled from several hosts.
pub trait MultiHostInjector: Send + Sync {
    /// Kinds (and their subtypes) this injector looks at.
    fn elements_to_inject_in(&self) -> Vec<SyntaxKind>;

    /// Register the injections rooted at `context`, through `registrar`.
    fn get_languages_to_inject(
        &self,
        registrar: &mut InjectionRegistrar<'_>,
        context: NodeId,
    ) -> Result<()>;
}

struct Pending {
    language: LanguageId,
    text: String,
    shreds: Vec<Shred>,
}

/// Collects injected documents from the injectors run over one host tree.
///
/// Each document is bracketed by [`start_injecting`](Self::start_injecting)
/// and [`done_injecting`](Self::done_injecting); places are added in host
/// order in between.
pub struct InjectionRegistrar<'a> {
    services: &'a Services,
    tree: &'a SyntaxTree,
    pending: Option<Pending>,
    done: Vec<InjectedDocument>,
}

impl<'a> InjectionRegistrar<'a> {
    pub fn new(services: &'a Services, tree: &'a SyntaxTree) -> Self {
        Self {
            services,
            tree,
            pending: None,
            done: Vec::new(),
        }
    }

    /// The host tree.
    pub fn tree(&self) -> &'a SyntaxTree {
        self.tree
    }

    pub fn start_injecting(&mut self, language: LanguageId) -> Result<&mut Self> {
        if self.pending.is_some() {
            return Err(TreeError::unsupported(UnsupportedOperation::Other(
                "start_injecting called twice without done_injecting".to_string(),
            )));
        }
        self.pending = Some(Pending {
            language,
            text: String::new(),
            shreds: Vec::new(),
        });
        Ok(self)
    }

    /// Add `range_in_host` of `host` (relative to the node) as the next
    /// piece of the current document, surrounded by `prefix` and `suffix`.
    /// Places must follow each other in host order without overlapping.
    pub fn add_place(
        &mut self,
        prefix: &str,
        suffix: &str,
        host: NodeId,
        range_in_host: TextRange,
    ) -> Result<&mut Self> {
        let tree = self.tree;
        let strategy = self.services.injection_hosts().require(tree.kind(host)?)?;
        if !strategy.is_valid_host(tree, host)? {
            return Err(TreeError::unsupported(UnsupportedOperation::Other(format!(
                "{host} cannot host an injection"
            ))));
        }
        check_range(tree, host, range_in_host)?;
        let escaper = strategy.create_escaper(tree, host)?;
        let host_start = tree.text_range(host)?.start();

        let pending = self.pending.as_mut().ok_or_else(|| {
            TreeError::unsupported(UnsupportedOperation::Other(
                "add_place called before start_injecting".to_string(),
            ))
        })?;
        let host_range = range_in_host + host_start;
        if let Some(last) = pending.shreds.last() {
            let previous_end = last.host_start + last.range_in_host.end();
            if host_range.start() < previous_end {
                return Err(TreeError::unsupported(UnsupportedOperation::Other(format!(
                    "place {host_range:?} of {host} starts before the previous place ends at {previous_end:?}"
                ))));
            }
        }
        let start = TextSize::of(pending.text.as_str());
        pending.text.push_str(prefix);
        let value_start = TextSize::of(pending.text.as_str());
        let fully_decoded = escaper.decode(range_in_host, &mut pending.text);
        if !fully_decoded {
            tracing::debug!("[INJECTION] {} has undecodable text in {:?}", host, range_in_host);
        }
        let value_len = TextSize::of(pending.text.as_str()) - value_start;
        pending.text.push_str(suffix);
        let end = TextSize::of(pending.text.as_str());

        pending.shreds.push(Shred {
            host,
            host_start,
            range_in_host,
            prefix: SmolStr::new(prefix),
            suffix: SmolStr::new(suffix),
            escaper: Arc::clone(&escaper),
            range: TextRange::new(start, end),
            value_range: TextRange::at(value_start, value_len),
            fully_decoded,
        });
        Ok(self)
    }

    pub fn done_injecting(&mut self) -> Result<()> {
        let pending = self.pending.take().ok_or_else(|| {
            TreeError::unsupported(UnsupportedOperation::Other(
                "done_injecting called before start_injecting".to_string(),
            ))
        })?;
        if pending.shreds.is_empty() {
            tracing::debug!("[INJECTION] dropped empty {} injection", pending.language);
            return Ok(());
        }
        tracing::debug!(
            "[INJECTION] {} injection with {} shred(s) in {}",
            pending.language,
            pending.shreds.len(),
            self.tree.document()
        );
        self.done.push(InjectedDocument {
            language: pending.language,
            host_document: self.tree.document(),
            host_stamp: self.tree.stamp(),
            text: pending.text,
            shreds: pending.shreds,
        });
        Ok(())
    }

    /// The documents registered so far. An injection left open is an error.
    pub fn finish(self) -> Result<Vec<InjectedDocument>> {
        if let Some(pending) = self.pending {
            return Err(TreeError::unsupported(UnsupportedOperation::Other(format!(
                "{} injection was never finished",
                pending.language
            ))));
        }
        Ok(self.done)
    }
}
